//! Temporary file list handed to the engine's index job
//!
//! One absolute path per line, UTF-8. The list lives in a `NamedTempFile`, so
//! dropping it removes the file on every exit path; removal errors are ignored.

use anyhow::{Context, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Write `files` to a new temp list inside `dir`
pub fn write_file_list(dir: &Path, files: &[PathBuf]) -> Result<NamedTempFile> {
    let list = tempfile::Builder::new()
        .prefix("fts-filelist-")
        .suffix(".lst")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create file list in {}", dir.display()))?;

    {
        let mut writer = BufWriter::new(list.as_file());
        for file in files {
            writeln!(writer, "{}", file.display()).context("Failed to write file list")?;
        }
        writer.flush().context("Failed to flush file list")?;
    }

    tracing::debug!("Wrote {} paths to {}", files.len(), list.path().display());
    Ok(list)
}

/// Read a file list back
pub fn read_file_list(path: &Path) -> Result<Vec<PathBuf>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file list {}", path.display()))?;

    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(PathBuf::from)
        .collect())
}
