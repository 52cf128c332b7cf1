//! Index building - folder and single-file ingestion into a persistent index

pub mod file_list;
pub mod orchestrator;
pub mod sources;

pub use file_list::{read_file_list, write_file_list};
pub use orchestrator::IndexOrchestrator;
pub use sources::{enumerate_sources, looks_like_index, SOURCE_EXTENSIONS};

use std::path::{Path, PathBuf};

/// One source to ingest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSource {
    pub path: PathBuf,
    /// `path` is a single file rather than a folder to scan
    pub single_file: bool,
}

impl IndexSource {
    pub fn folder(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            single_file: false,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            single_file: true,
        }
    }
}

/// A request to build or update one index
#[derive(Debug, Clone)]
pub struct IndexRequest {
    pub index_path: PathBuf,
    pub sources: Vec<IndexSource>,
    /// Force a fresh build even over a valid index
    pub rebuild: bool,
}

impl IndexRequest {
    pub fn folders<P: AsRef<Path>>(index_path: impl Into<PathBuf>, folders: &[P], rebuild: bool) -> Self {
        Self {
            index_path: index_path.into(),
            sources: folders.iter().map(|f| IndexSource::folder(f.as_ref())).collect(),
            rebuild,
        }
    }

    pub fn single_file(index_path: impl Into<PathBuf>, file: impl Into<PathBuf>, rebuild: bool) -> Self {
        Self {
            index_path: index_path.into(),
            sources: vec![IndexSource::file(file)],
            rebuild,
        }
    }
}
