use anyhow::{Context, Result};
use log::{debug, warn};
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::Error;

/// Shell-style glob compiled to an anchored regular expression.
///
/// `*` and `?` never match `/`; `**` matches across directories and `**/` also matches
/// zero directories.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    raw: String,
    regex: Regex,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
        let mut re = String::from("^");
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '*' if chars.peek() == Some(&'*') => {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        re.push_str("(?:.*/)?");
                    } else {
                        re.push_str(".*");
                    }
                }
                '*' => re.push_str("[^/]*"),
                '?' => re.push_str("[^/]"),
                other => re.push_str(&regex::escape(&other.to_string())),
            }
        }
        re.push('$');

        let regex = Regex::new(&re)
            .with_context(|| format!("Invalid glob pattern: {}", pattern))?;
        Ok(Self {
            raw: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern spans directories and must match whole relative paths.
    pub fn has_separator(&self) -> bool {
        self.raw.contains('/')
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// Leading directory components that contain no wildcard.
    fn literal_base(&self) -> PathBuf {
        let mut base = PathBuf::new();
        let path = Path::new(&self.raw);
        let mut components = path.components().peekable();
        while let Some(component) = components.next() {
            // the final component names files, never the base
            if components.peek().is_none() {
                break;
            }
            let text = component.as_os_str().to_string_lossy();
            if text.contains('*') || text.contains('?') {
                break;
            }
            base.push(component);
        }
        base
    }
}

/// Renders a path with `/` separators for glob matching.
fn slash_path(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::RootDir => out.push('/'),
            Component::CurDir => continue,
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}

/// Walks a handler directory for files matching a glob.
///
/// Hidden directories and `vendor` are never descended into.
///
/// # Example
///
/// ```no_run
/// use swag_from_source::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("internal/handler"), "*_handler.go").unwrap();
/// let result = scanner.scan().unwrap();
/// println!("Found {} handler files", result.files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    pattern: GlobPattern,
}

/// Result of directory scanning operation.
#[derive(Debug)]
pub struct ScanResult {
    /// Matching files, sorted
    pub files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf, pattern: &str) -> Result<Self> {
        Ok(Self {
            root_path,
            pattern: GlobPattern::new(pattern)?,
        })
    }

    /// Scans the directory tree and collects matching files.
    ///
    /// A pattern without `/` is matched against file names; otherwise it is matched
    /// against the path relative to the root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HandlerDirMissing`] if the root is not a directory.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            return Err(Error::HandlerDirMissing(self.root_path.clone()).into());
        }

        let mut files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
        {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let path = entry.path();
                    let candidate = if self.pattern.has_separator() {
                        slash_path(path.strip_prefix(&self.root_path).unwrap_or(path))
                    } else {
                        entry.file_name().to_string_lossy().into_owned()
                    };
                    if self.pattern.matches(&candidate) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        files.sort();
        debug!(
            "Found {} files matching '{}' under {}",
            files.len(),
            self.pattern.as_str(),
            self.root_path.display()
        );

        Ok(ScanResult { files, warnings })
    }
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "vendor"
}

/// Expands a glob such as `internal/types/*.go` into existing files, sorted.
///
/// Walking starts at the pattern's longest literal directory prefix; a missing prefix
/// yields no files.
pub fn expand_glob(pattern: &GlobPattern) -> Vec<PathBuf> {
    let base = pattern.literal_base();
    let walk_root = if base.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        base
    };

    if !walk_root.is_dir() {
        debug!("Glob base {} does not exist", walk_root.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(&walk_root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Failed to access path: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| pattern.matches(&slash_path(path)))
        .collect();

    files.sort();
    files
}
