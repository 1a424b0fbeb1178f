use anyhow::{Context, Result};
use log::{debug, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Error;
use crate::syntax::{parse_source, SourceFile};

/// AST parser for Go source files.
///
/// # Example
///
/// ```no_run
/// use swag_from_source::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("internal/handler/user_handler.go")).unwrap();
/// println!("Parsed {} declarations", parsed.syntax_tree.decls.len());
/// ```
pub struct AstParser;

/// A successfully parsed Go file with its abstract syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed syntax tree, comments included
    pub syntax_tree: SourceFile,
}

impl AstParser {
    /// Parses a single Go source file into an AST.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid Go syntax. The
    /// syntax case carries an [`Error::HandlerFileParse`] that callers can downcast to.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let syntax_tree = parse_source(&content)
            .map_err(|source| Error::HandlerFileParse {
                file: path.to_path_buf(),
                source,
            })
            .with_context(|| format!("Failed to parse Go syntax in file: {}", path.display()))?;

        debug!("Successfully parsed file: {}", path.display());

        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }
}

/// Process-wide memo of parsed trees keyed by absolute path.
///
/// Readers share the map; a miss parses outside the lock, so two threads missing the same
/// key may both parse it. The first tree inserted is kept and handed to both. Failures are
/// never stored, so a later call retries the parse.
#[derive(Default)]
pub struct SyntaxCache {
    trees: RwLock<HashMap<PathBuf, Arc<ParsedFile>>>,
}

impl SyntaxCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tree for `path`, parsing it on first use.
    pub fn get_tree(&self, path: &Path) -> Result<Arc<ParsedFile>> {
        let key = Self::key_for(path);

        if let Some(tree) = self.trees.read().get(&key) {
            debug!("Syntax cache hit: {}", key.display());
            return Ok(Arc::clone(tree));
        }

        let parsed = match AstParser::parse_file(&key) {
            Ok(parsed) => Arc::new(parsed),
            Err(e) => {
                warn!("Failed to parse {}: {:#}", key.display(), e);
                return Err(e);
            }
        };

        let mut trees = self.trees.write();
        let tree = trees.entry(key).or_insert(parsed);
        Ok(Arc::clone(tree))
    }

    /// Drops the tree for `path` so the next lookup re-reads the file.
    ///
    /// Callers that rewrite a cached file must call this, since byte offsets in the old
    /// tree no longer match the file.
    pub fn invalidate(&self, path: &Path) -> bool {
        let key = Self::key_for(path);
        let removed = self.trees.write().remove(&key).is_some();
        if removed {
            debug!("Syntax cache evicted: {}", key.display());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.trees.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.read().is_empty()
    }

    /// Canonical form of `path` used as the cache key.
    pub(crate) fn key_for(path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}
