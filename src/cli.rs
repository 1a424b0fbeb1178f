use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

use crate::config::GeneratorConfig;
use crate::orchestrator::{Generator, RunSummary};

/// swag-from-source - Generate swag doc comments for Gin handlers from their source
#[derive(Parser, Debug)]
#[command(name = "swag-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// YAML config file; flags below override its values
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory searched for handler files
    #[arg(long = "handler-dir", value_name = "DIR")]
    pub handler_dir: Option<PathBuf>,

    /// Glob matched against handler file names
    #[arg(short = 'p', long = "pattern", value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Router file containing the route registrations
    #[arg(short = 'r', long = "router", value_name = "FILE")]
    pub router: Option<PathBuf>,

    /// Glob locating request-type sources (repeatable)
    #[arg(short = 't', long = "types", value_name = "GLOB")]
    pub types: Vec<String>,

    /// Security scheme emitted for authenticated routes
    #[arg(short = 's', long = "security", value_name = "NAME")]
    pub security: Option<String>,

    /// Path prefix prepended to every @Router path
    #[arg(long = "prefix", value_name = "PATH")]
    pub prefix: Option<String>,

    /// Number of files processed in parallel
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Show what would be documented without rewriting files
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Format of the final report
    #[arg(long = "report", value_enum, default_value = "text")]
    pub report: ReportFormat,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Report format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// One summary line
    Text,
    /// Per-file and total counters as JSON
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if let Some(ref config) = args.config {
        if !config.is_file() {
            anyhow::bail!("Config file does not exist: {}", config.display());
        }
        info!("Config file: {}", config.display());
    }
    if args.jobs == Some(0) {
        anyhow::bail!("--jobs must be at least 1");
    }
    if args.dry_run {
        info!("Dry run: no files will be rewritten");
    }

    Ok(args)
}

/// Builds the effective configuration: defaults, then the config file, then flags.
pub fn resolve_config(args: &CliArgs) -> Result<GeneratorConfig> {
    let mut config = match args.config {
        Some(ref path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    };

    if let Some(ref dir) = args.handler_dir {
        config.handler_dir = dir.clone();
    }
    if let Some(ref pattern) = args.pattern {
        config.handler_pattern = pattern.clone();
    }
    if let Some(ref router) = args.router {
        config.router_file = router.clone();
    }
    if !args.types.is_empty() {
        config.type_sources = args.types.clone();
    }
    if let Some(ref security) = args.security {
        config.security_scheme = security.clone();
    }
    if let Some(ref prefix) = args.prefix {
        config.api_prefix = prefix.clone();
    }
    if let Some(jobs) = args.jobs {
        config.workers = jobs;
    }
    if args.dry_run {
        config.dry_run = true;
    }

    config.validate()?;
    Ok(config)
}

/// Renders the final report.
pub fn render_report(summary: &RunSummary, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
        ReportFormat::Text => Ok(format!(
            "{} files ({} failed): {} declarations, {} handlers, {} already documented, {} newly documented",
            summary.files.len(),
            summary.failed_files,
            summary.total.total,
            summary.total.handlers,
            summary.total.already_documented,
            summary.total.newly_documented
        )),
    }
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting swag comment generation...");

    // Step 1: Resolve configuration
    let config = resolve_config(&args)?;
    info!("Handler directory: {}", config.handler_dir.display());
    info!("Handler pattern: {}", config.handler_pattern);
    info!("Router file: {}", config.router_file.display());
    info!("Type sources: {:?}", config.type_sources);
    info!("Workers: {}", config.workers);

    // Step 2: Load routes and set up caches
    let generator = Generator::new(config)?;

    // Step 3: Discover handler files
    info!("Scanning handler directory...");
    let files = generator.discover()?;

    // Step 4: Document handlers
    info!("Processing {} handler files...", files.len());
    let summary = generator.run(&files)?;

    // Step 5: Report
    println!("{}", render_report(&summary, args.report)?);

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files processed: {}", summary.files.len());
    info!("  - Files failed: {}", summary.failed_files);
    info!("  - Handlers found: {}", summary.total.handlers);
    info!("  - Newly documented: {}", summary.total.newly_documented);

    Ok(())
}
