//! Per-file documentation passes and run-level aggregation.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::comment_builder::CommentBuilder;
use crate::config::GeneratorConfig;
use crate::detector::HandlerDetector;
use crate::error::Error;
use crate::extractor::gin::GinExtractor;
use crate::extractor::{load_route_table, RouteTable};
use crate::parser::SyntaxCache;
use crate::scanner::{FileScanner, GlobPattern};
use crate::splicer::{splice_file, SpliceEdit};
use crate::type_resolver::TypeResolver;

/// Counters for one file, or for a whole run once summed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileStats {
    /// Top-level function declarations seen
    pub total: usize,
    /// Declarations recognized as handlers
    pub handlers: usize,
    pub already_documented: usize,
    pub newly_documented: usize,
}

impl Add for FileStats {
    type Output = FileStats;

    fn add(self, other: FileStats) -> FileStats {
        FileStats {
            total: self.total + other.total,
            handlers: self.handlers + other.handlers,
            already_documented: self.already_documented + other.already_documented,
            newly_documented: self.newly_documented + other.newly_documented,
        }
    }
}

impl AddAssign for FileStats {
    fn add_assign(&mut self, other: FileStats) {
        *self = *self + other;
    }
}

impl Sum for FileStats {
    fn sum<I: Iterator<Item = FileStats>>(iter: I) -> FileStats {
        iter.fold(FileStats::default(), Add::add)
    }
}

/// Outcome of one file pass.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<FileStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything a run produced, in the order the files were given.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
    pub total: FileStats,
    pub failed_files: usize,
}

/// Drives discovery, classification, synthesis and splicing.
///
/// The route table is read once when the generator is created; the syntax and request-type
/// caches live as long as the generator and are shared by all worker threads.
///
/// # Example
///
/// ```no_run
/// use swag_from_source::config::GeneratorConfig;
/// use swag_from_source::orchestrator::Generator;
///
/// let generator = Generator::new(GeneratorConfig::default()).unwrap();
/// let files = generator.discover().unwrap();
/// let summary = generator.run(&files).unwrap();
/// println!("{} handlers documented", summary.total.newly_documented);
/// ```
pub struct Generator {
    config: GeneratorConfig,
    routes: RouteTable,
    syntax_cache: Arc<SyntaxCache>,
    resolver: TypeResolver,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;

        let extractor = GinExtractor::new(&config.public_group, &config.secured_group);
        let (routes, router_error) = load_route_table(&config.router_file, &extractor);
        if let Some(e) = router_error {
            warn!("{}; falling back to name-based routes", e);
        } else {
            info!(
                "Loaded {} routes from {}",
                routes.len(),
                config.router_file.display()
            );
        }

        let type_sources = config
            .type_sources
            .iter()
            .map(|glob| GlobPattern::new(glob))
            .collect::<Result<Vec<_>>>()
            .context("Invalid type source pattern")?;

        let syntax_cache = Arc::new(SyntaxCache::new());
        let resolver = TypeResolver::new(type_sources, Arc::clone(&syntax_cache));

        Ok(Self {
            config,
            routes,
            syntax_cache,
            resolver,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Lists the handler files under the configured directory.
    ///
    /// # Errors
    ///
    /// [`Error::HandlerDirMissing`] when the directory does not exist and
    /// [`Error::NoHandlersFound`] when nothing matches the pattern.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let scanner = FileScanner::new(
            self.config.handler_dir.clone(),
            &self.config.handler_pattern,
        )?;
        let scan_result = scanner.scan()?;
        for warning in &scan_result.warnings {
            warn!("{}", warning);
        }

        if scan_result.files.is_empty() {
            return Err(Error::NoHandlersFound {
                dir: self.config.handler_dir.clone(),
                pattern: self.config.handler_pattern.clone(),
            }
            .into());
        }
        info!(
            "Found {} handler files in {}",
            scan_result.files.len(),
            self.config.handler_dir.display()
        );
        Ok(scan_result.files)
    }

    /// Documents every undocumented handler in one file.
    ///
    /// A file that cannot be parsed is an error and is left untouched. Splice failures of
    /// single handlers are logged and do not fail the file.
    pub fn process_file(&self, path: &Path) -> Result<FileStats> {
        let parsed = self.syntax_cache.get_tree(path)?;
        let builder = CommentBuilder::new(&self.config, &self.routes, &self.resolver);

        let mut stats = FileStats::default();
        let mut edits = Vec::new();

        for func in parsed.syntax_tree.funcs() {
            stats.total += 1;
            let handler = match HandlerDetector::classify(func) {
                Some(handler) => handler,
                None => continue,
            };
            stats.handlers += 1;

            if handler.documented {
                debug!("{} is already documented", handler.name);
                stats.already_documented += 1;
                continue;
            }

            edits.push(SpliceEdit {
                block: builder.build(&handler),
                handler: handler.name,
                doc_start: func.doc_start(),
                func_start: func.span.start,
            });
        }

        if self.config.dry_run {
            for edit in &edits {
                debug!("Would document {} in {}", edit.handler, path.display());
            }
            stats.newly_documented += edits.len();
        } else if !edits.is_empty() {
            stats.newly_documented += splice_file(path, &edits)
                .iter()
                .filter(|outcome| outcome.result.is_ok())
                .count();
            // offsets in the cached tree describe the file before the splice
            self.syntax_cache.invalidate(path);
        }

        info!(
            "{}: {} handlers, {} already documented, {} newly documented",
            path.display(),
            stats.handlers,
            stats.already_documented,
            stats.newly_documented
        );
        Ok(stats)
    }

    /// Processes `files` on a pool of `workers` threads.
    ///
    /// Reports come back in the order of `files` whichever file finishes first. A failed
    /// file is recorded in its report and the rest of the run continues. Paths naming a file
    /// already listed earlier (`a.go` and `./a.go`) are dropped, since two workers must never
    /// rewrite the same file.
    pub fn run(&self, files: &[PathBuf]) -> Result<RunSummary> {
        let mut seen = HashSet::new();
        let files: Vec<&PathBuf> = files
            .iter()
            .filter(|path| {
                let fresh = seen.insert(SyntaxCache::key_for(path));
                if !fresh {
                    debug!("Ignoring duplicate handler file {}", path.display());
                }
                fresh
            })
            .collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .context("Failed to start worker pool")?;

        let files: Vec<FileReport> = pool.install(|| {
            files
                .par_iter()
                .map(|&path| match self.process_file(path) {
                    Ok(stats) => FileReport {
                        path: path.clone(),
                        stats: Some(stats),
                        error: None,
                    },
                    Err(e) => {
                        warn!("Skipping {}: {:#}", path.display(), e);
                        FileReport {
                            path: path.clone(),
                            stats: None,
                            error: Some(format!("{:#}", e)),
                        }
                    }
                })
                .collect()
        });

        let total = files.iter().filter_map(|report| report.stats).sum();
        let failed_files = files.iter().filter(|report| report.error.is_some()).count();

        Ok(RunSummary {
            files,
            total,
            failed_files,
        })
    }
}
