//! Position-safe rewriting of handler files.
//!
//! A splice replaces the byte range `[doc_start, func_start)` of a file with a new
//! comment block and keeps every other byte. The new content is streamed into a sibling
//! temporary file which is renamed over the original only once it is complete, so a
//! failed splice never leaves a partially written handler file behind.

use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One pending rewrite, with offsets taken from the file as it was parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceEdit {
    /// Handler name, for reporting
    pub handler: String,
    pub doc_start: usize,
    pub func_start: usize,
    pub block: String,
}

/// Result of applying one [`SpliceEdit`].
#[derive(Debug)]
pub struct SpliceOutcome {
    pub handler: String,
    pub result: Result<()>,
}

/// Replaces `[doc_start, func_start)` of `path` with `block`, atomically.
///
/// # Errors
///
/// Returns [`Error::SpliceIo`] when the offsets do not fit the file or any step of
/// staging and renaming fails. The original file is untouched in that case.
pub fn insert_or_replace(path: &Path, doc_start: usize, func_start: usize, block: &str) -> Result<()> {
    let original = File::open(path).map_err(|e| Error::splice(path, e))?;
    let metadata = original.metadata().map_err(|e| Error::splice(path, e))?;
    let len = metadata.len();

    if doc_start > func_start || func_start as u64 > len {
        return Err(Error::splice(
            path,
            format!(
                "offsets {}..{} do not fit a file of {} bytes",
                doc_start, func_start, len
            ),
        ));
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let staged = NamedTempFile::new_in(&dir).map_err(|e| Error::splice(path, e))?;

    // the temp file is removed when `staged` drops on any early return below
    let staged = write_spliced(original, staged, doc_start as u64, func_start as u64, block)
        .map_err(|e| Error::splice(path, e))?;

    fs::set_permissions(staged.path(), metadata.permissions())
        .map_err(|e| Error::splice(path, e))?;

    staged
        .persist(path)
        .map_err(|e| Error::splice(path, e.error))?;

    debug!(
        "Spliced {} bytes into {} at {}..{}",
        block.len(),
        path.display(),
        doc_start,
        func_start
    );
    Ok(())
}

fn write_spliced(
    original: File,
    staged: NamedTempFile,
    doc_start: u64,
    func_start: u64,
    block: &str,
) -> io::Result<NamedTempFile> {
    let mut reader = BufReader::new(original);
    let mut writer = BufWriter::new(staged);

    let copied = io::copy(&mut reader.by_ref().take(doc_start), &mut writer)?;
    if copied != doc_start {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "file shrank while splicing",
        ));
    }
    writer.write_all(block.as_bytes())?;
    reader.seek(SeekFrom::Start(func_start))?;
    io::copy(&mut reader, &mut writer)?;

    let staged = writer.into_inner().map_err(|e| e.into_error())?;
    staged.as_file().sync_all()?;
    Ok(staged)
}

/// Applies several edits to one file, deepest offset first.
///
/// Offsets in every edit refer to the original file. Working from the end keeps the
/// offsets of earlier declarations valid after later ones have been rewritten. A failed
/// edit leaves the file as it was and the remaining edits still run.
pub fn splice_file(path: &Path, edits: &[SpliceEdit]) -> Vec<SpliceOutcome> {
    let mut ordered: Vec<&SpliceEdit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.func_start.cmp(&a.func_start));

    ordered
        .into_iter()
        .map(|edit| {
            let result = insert_or_replace(path, edit.doc_start, edit.func_start, &edit.block);
            if let Err(ref e) = result {
                warn!("Skipping {} in {}: {}", edit.handler, path.display(), e);
            }
            SpliceOutcome {
                handler: edit.handler.clone(),
                result,
            }
        })
        .collect()
}
