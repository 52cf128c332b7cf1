//! Source enumeration and on-disk index detection

use anyhow::{Context, Result};
use glob::{glob_with, MatchOptions, Pattern};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions picked up when scanning a folder
pub const SOURCE_EXTENSIONS: [&str; 6] = ["txt", "pdf", "htm", "html", "doc", "docx"];

/// Collect every file to index, one glob pass per extension
///
/// Missing folders and missing single files are skipped. Paths are absolute
/// and deduplicated; within one extension the glob order is kept.
pub fn enumerate_sources(sources: &[super::IndexSource]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for source in sources {
        let path = std::path::absolute(&source.path)
            .with_context(|| format!("Failed to resolve {}", source.path.display()))?;

        if source.single_file {
            if !path.is_file() {
                tracing::debug!("Skipping missing file: {}", path.display());
            } else if seen.insert(path.clone()) {
                files.push(path);
            }
            continue;
        }

        if !path.is_dir() {
            tracing::debug!("Skipping missing folder: {}", path.display());
            continue;
        }

        for found in scan_folder(&path)? {
            if seen.insert(found.clone()) {
                files.push(found);
            }
        }
    }

    Ok(files)
}

fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let base = Pattern::escape(&folder.to_string_lossy());

    let mut files = Vec::new();
    for ext in SOURCE_EXTENSIONS {
        let pattern = format!("{}/**/*.{}", base, ext);
        let entries = glob_with(&pattern, options)
            .with_context(|| format!("Invalid source pattern: {}", pattern))?;

        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!("Unreadable entry under {}: {}", folder.display(), e),
            }
        }
    }
    Ok(files)
}

/// A directory is a valid index when it holds at least one marker file
pub fn looks_like_index(dir: &Path, marker_extension: &str) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };

    entries.flatten().any(|entry| {
        let path = entry.path();
        path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(marker_extension))
    })
}
