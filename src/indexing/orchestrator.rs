//! Index orchestrator
//!
//! Validate → ensure destination → enumerate sources → write file list →
//! configure job → execute → verify artifact. The file list is a
//! `NamedTempFile` owned by `run`, so it is removed on every exit path.

use super::{enumerate_sources, looks_like_index, write_file_list, IndexRequest};
use crate::config::{AdapterConfig, AdapterError, ErrorContextExt, Result};
use crate::diag;
use crate::engine::Value;
use crate::outcome::OperationOutcome;
use crate::probe::invoke::instantiate;
use crate::probe::{CapabilityResolver, ExecutableJob, Invoker, ProbeError, ProbedJob};
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Full type names of the engine's index job, in priority order
pub const INDEX_JOB_TYPES: [&str; 3] = ["SearchEngine.IndexJob", "SearchEngine.Engine.IndexJob", "IndexJob"];

const INDEX_PATH_PROPS: [&str; 2] = ["IndexPath", "IndexDirectory"];
const FILE_LIST_PROPS: [&str; 3] = ["ToAddFileListName", "FileListName", "FileList"];
const SCRATCH_DIR_PROPS: [&str; 2] = ["TempFileDir", "TempDir"];

/// Builds or updates persistent indexes through the engine's index job
pub struct IndexOrchestrator<'a> {
    resolver: &'a CapabilityResolver,
    config: &'a AdapterConfig,
}

impl<'a> IndexOrchestrator<'a> {
    pub fn new(resolver: &'a CapabilityResolver, config: &'a AdapterConfig) -> Self {
        Self { resolver, config }
    }

    /// Index every supported file found under `folders`
    pub fn index_folders<P: AsRef<Path>>(&self, index_path: &Path, folders: &[P], rebuild: bool) -> OperationOutcome {
        self.build(&IndexRequest::folders(index_path, folders, rebuild))
    }

    /// Index one file; the file must exist
    pub fn index_file(&self, index_path: &Path, file: &Path, rebuild: bool) -> OperationOutcome {
        if file.as_os_str().is_empty() {
            return OperationOutcome::failed(AdapterError::config("file path is empty"));
        }
        if !file.is_file() {
            return OperationOutcome::failed(AdapterError::config(format!(
                "file not found: {}",
                file.display()
            )));
        }
        self.build(&IndexRequest::single_file(index_path, file, rebuild))
    }

    /// Run one index request to completion
    pub fn build(&self, request: &IndexRequest) -> OperationOutcome {
        let started = Instant::now();
        let mut outcome = OperationOutcome::new();

        match self.run(request, &mut outcome) {
            Ok(file_count) => {
                outcome.succeed();
                tracing::info!(
                    "Indexed {} files into {} in {:?}",
                    file_count,
                    request.index_path.display(),
                    started.elapsed()
                );
            }
            Err(e) => outcome.fail(e),
        }

        diag!(
            "index {} finished: success={} elapsed={:?}",
            request.index_path.display(),
            outcome.success,
            started.elapsed()
        );
        outcome
    }

    fn run(&self, request: &IndexRequest, outcome: &mut OperationOutcome) -> Result<usize> {
        let index_path = &request.index_path;
        if index_path.to_string_lossy().trim().is_empty() {
            return Err(AdapterError::config("index path is empty"));
        }
        if request.sources.is_empty() {
            return Err(AdapterError::config("no sources given"));
        }

        fs::create_dir_all(index_path).file_context(index_path)?;

        let files = enumerate_sources(&request.sources)?;
        if files.is_empty() {
            return Err(AdapterError::config(format!(
                "no indexable files found in {} source(s)",
                request.sources.len()
            )));
        }

        let create = request.rebuild || !looks_like_index(index_path, &self.config.marker_extension);
        let list = write_file_list(&self.config.scratch_dir, &files)?;

        let job_type = self
            .resolver
            .find_type(&INDEX_JOB_TYPES)
            .ok_or_else(|| AdapterError::unsupported("an index job type"))?;
        let job = instantiate(&job_type)?;

        let invoker = Invoker::new(self.resolver);
        invoker
            .set_first(&job, &INDEX_PATH_PROPS, path_value(index_path))
            .map_err(required("setting the index path"))?;
        invoker
            .set_first(&job, &FILE_LIST_PROPS, path_value(list.path()))
            .map_err(required("setting the file list"))?;

        outcome.soft(invoker.try_set(&job, "ActionCreate", create));
        outcome.soft(invoker.try_set(&job, "ActionAdd", true));
        outcome.soft(invoker.try_set(&job, "ActionRemoveDeleted", true));
        outcome.soft(invoker.try_set(&job, "CreateRelativePaths", false));
        outcome.soft(invoker.set_first(&job, &SCRATCH_DIR_PROPS, path_value(&self.config.scratch_dir)));

        diag!(
            "index job {}: path={} files={} create={} list={}",
            job.type_name(),
            index_path.display(),
            files.len(),
            create,
            list.path().display()
        );

        let status = ProbedJob::new(invoker, &job).execute();
        if let Some(err) = status.error() {
            return Err(err);
        }

        if !looks_like_index(index_path, &self.config.marker_extension) {
            return Err(AdapterError::postcondition(format!(
                "job reported success but {} holds no .{} file",
                index_path.display(),
                self.config.marker_extension
            )));
        }

        Ok(files.len())
    }
}

fn path_value(path: &Path) -> Value {
    Value::Str(path.display().to_string())
}

fn required(step: &'static str) -> impl FnOnce(ProbeError) -> AdapterError {
    move |e| AdapterError::unsupported(format!("{}: {}", step, e))
}
