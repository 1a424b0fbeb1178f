//! swag-from-source - swag doc comments for Gin handlers, inferred from the source.
//!
//! This library reads a Go service's router, request types and handler methods and writes
//! a swag comment block above every handler that lacks one. Nothing is compiled or
//! executed: routes come from a textual scan of the router, path parameter types from the
//! struct tags of request types, and everything else from handler names.
//!
//! # Architecture
//!
//! 1. [`syntax`] - Comment-preserving Go declaration parser
//! 2. [`parser`] - File parsing and the shared syntax cache
//! 3. [`scanner`] - Glob matching and handler file discovery
//! 4. [`extractor`] - Route table extraction from the router source
//! 5. [`type_resolver`] - Path parameter lookup in request structs
//! 6. [`detector`] - Recognizes handler methods and existing documentation
//! 7. [`naming`] - Route, summary and tag inference from names
//! 8. [`comment_builder`] - Assembles the comment block
//! 9. [`splicer`] - Atomic in-place rewriting of handler files
//! 10. [`orchestrator`] - Per-file passes on a worker pool and statistics
//!
//! # Example Usage
//!
//! ```no_run
//! use swag_from_source::{config::GeneratorConfig, orchestrator::Generator};
//! use std::path::PathBuf;
//!
//! let config = GeneratorConfig {
//!     handler_dir: PathBuf::from("internal/handler"),
//!     router_file: PathBuf::from("internal/router/router.go"),
//!     api_prefix: "/api/v1".to_string(),
//!     ..GeneratorConfig::default()
//! };
//!
//! let generator = Generator::new(config).unwrap();
//! let files = generator.discover().unwrap();
//! let summary = generator.run(&files).unwrap();
//! println!(
//!     "{} of {} handlers newly documented",
//!     summary.total.newly_documented, summary.total.handlers
//! );
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod comment_builder;
pub mod config;
pub mod detector;
pub mod error;
pub mod extractor;
pub mod naming;
pub mod orchestrator;
pub mod parser;
pub mod scanner;
pub mod splicer;
pub mod syntax;
pub mod type_resolver;
