//! Host-facing entry point
//!
//! `EngineAdapter` owns the capability resolver and configuration, hands out
//! orchestrators per call, and keeps the outcome of the last call so hosts can
//! ask for the last error or warning after a boolean result.

use crate::config::{defaults, AdapterConfig, AdapterError, DefaultsHandle};
use crate::engine::{EngineRuntime, MemberKind, ObjectRef, Value};
use crate::indexing::orchestrator::INDEX_JOB_TYPES;
use crate::indexing::{IndexOrchestrator, IndexRequest};
use crate::outcome::OperationOutcome;
use crate::probe::invoke::instantiate;
use crate::probe::{CapabilityResolver, Invoker};
use crate::search::orchestrator::SEARCH_JOB_TYPES;
use crate::search::{SearchHit, SearchOptions, SearchOrchestrator, SearchOutcome, SearchRequest};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Engine types that carry process-level setup
pub const SETUP_TYPES: [&str; 3] = ["SearchEngine.Options", "SearchEngine.Server", "SearchEngine.Engine.Options"];

const ENGINE_PATH_PROPS: [&str; 2] = ["EnginePath", "LibraryPath"];
const ENGINE_PATH_METHODS: [&str; 2] = ["SetEnginePath", "SetLibraryPath"];
const HOME_DIR_PROPS: [&str; 2] = ["HomeDir", "HomeDirectory"];
const HOME_DIR_METHODS: [&str; 2] = ["SetHomeDir", "SetHomeDirectory"];
const SAVE_METHODS: [&str; 2] = ["Save", "Apply"];

/// Which engine types resolve in the current process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capabilities {
    pub index_job: Option<String>,
    pub search_job: Option<String>,
    pub setup: Option<String>,
}

pub struct EngineAdapter {
    resolver: CapabilityResolver,
    config: AdapterConfig,
    defaults: DefaultsHandle,
    last: Mutex<OperationOutcome>,
}

impl EngineAdapter {
    /// Adapter reading the process-wide defaults
    pub fn new(runtime: Arc<dyn EngineRuntime>, config: AdapterConfig) -> Self {
        Self::with_defaults(runtime, config, defaults::global().clone())
    }

    /// Adapter with an explicitly injected defaults handle
    ///
    /// Construction has no process-wide effects. The diagnostics toggle is set by
    /// [`crate::diagnostics::init_logging`] or [`crate::diagnostics::set_diagnostics`].
    pub fn with_defaults(runtime: Arc<dyn EngineRuntime>, config: AdapterConfig, defaults: DefaultsHandle) -> Self {
        Self {
            resolver: CapabilityResolver::new(runtime, config.engine_modules.clone()),
            config,
            defaults,
            last: Mutex::new(OperationOutcome::new()),
        }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn defaults(&self) -> &DefaultsHandle {
        &self.defaults
    }

    pub fn resolver(&self) -> &CapabilityResolver {
        &self.resolver
    }

    pub fn last_error(&self) -> Option<String> {
        self.last.lock().last_error.clone()
    }

    pub fn last_warning(&self) -> Option<String> {
        self.last.lock().last_warning.clone()
    }

    pub fn last_outcome(&self) -> OperationOutcome {
        self.last.lock().clone()
    }

    fn record(&self, outcome: OperationOutcome) -> OperationOutcome {
        *self.last.lock() = outcome.clone();
        outcome
    }

    /// Build or update `index_path` from every supported file under `folders`
    pub fn index_folders<P: AsRef<Path>>(&self, index_path: impl AsRef<Path>, folders: &[P], rebuild: bool) -> bool {
        let outcome = IndexOrchestrator::new(&self.resolver, &self.config).index_folders(
            index_path.as_ref(),
            folders,
            rebuild,
        );
        self.record(outcome).success
    }

    /// Add one file to `index_path`
    pub fn index_file(&self, index_path: impl AsRef<Path>, file: impl AsRef<Path>, rebuild: bool) -> bool {
        let outcome = IndexOrchestrator::new(&self.resolver, &self.config).index_file(
            index_path.as_ref(),
            file.as_ref(),
            rebuild,
        );
        self.record(outcome).success
    }

    pub fn build_index(&self, request: &IndexRequest) -> OperationOutcome {
        self.record(IndexOrchestrator::new(&self.resolver, &self.config).build(request))
    }

    /// Query `index_paths`; returns the hits, check `last_error` for failures
    pub fn search<P: Into<PathBuf>>(
        &self,
        index_paths: impl IntoIterator<Item = P>,
        query: &str,
        options: SearchOptions,
    ) -> Vec<SearchHit> {
        self.search_with(&SearchRequest::new(index_paths, query, options)).hits
    }

    pub fn search_with(&self, request: &SearchRequest) -> SearchOutcome {
        let defaults = self.defaults.snapshot();
        let result = SearchOrchestrator::new(&self.resolver).search(request, &defaults);
        self.record(result.outcome.clone());
        result
    }

    /// Forward the engine library location to whichever setup member exists
    pub fn set_engine_path(&self, path: impl AsRef<Path>) -> bool {
        self.forward_setup("engine path", path.as_ref(), &ENGINE_PATH_PROPS, &ENGINE_PATH_METHODS)
    }

    /// Forward the engine home directory to whichever setup member exists
    pub fn set_home_dir(&self, path: impl AsRef<Path>) -> bool {
        self.forward_setup("home directory", path.as_ref(), &HOME_DIR_PROPS, &HOME_DIR_METHODS)
    }

    /// Best-effort setup call; succeeds for any well-formed path
    fn forward_setup(&self, what: &str, path: &Path, props: &[&str], methods: &[&str]) -> bool {
        let mut outcome = OperationOutcome::new();
        let text = path.display().to_string();
        if text.trim().is_empty() {
            outcome.fail(AdapterError::config(format!("{} is empty", what)));
            return self.record(outcome).success;
        }

        match self.setup_object() {
            Some(setup) => {
                let invoker = Invoker::new(&self.resolver);
                let value = Value::Str(text.clone());
                let applied = invoker
                    .set_first(&setup, props, value.clone())
                    .or_else(|_| invoker.call_first(&setup, methods, &[value]).map(|_| ()));

                match applied {
                    Ok(()) => {
                        tracing::info!("Engine {} set to {}", what, text);
                        if self
                            .resolver
                            .find_first_member(setup.as_ref(), &SAVE_METHODS, MemberKind::Method)
                            .is_some()
                        {
                            outcome.soft(invoker.call_first(&setup, &SAVE_METHODS, &[]));
                        }
                    }
                    Err(e) => outcome.warn(format!("engine takes no {} configuration: {}", what, e)),
                }
            }
            None => outcome.warn(format!("engine takes no {} configuration", what)),
        }

        outcome.succeed();
        self.record(outcome).success
    }

    fn setup_object(&self) -> Option<ObjectRef> {
        let ty = self.resolver.find_type(&SETUP_TYPES)?;
        match instantiate(&ty) {
            Ok(object) => Some(object),
            Err(e) => {
                tracing::warn!("Failed to create setup object: {}", e);
                None
            }
        }
    }

    /// Report which engine types this process can reach
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            index_job: self.resolved_name(&INDEX_JOB_TYPES),
            search_job: self.resolved_name(&SEARCH_JOB_TYPES),
            setup: self.resolved_name(&SETUP_TYPES),
        }
    }

    fn resolved_name(&self, candidates: &[&str]) -> Option<String> {
        self.resolver
            .find_type(candidates)
            .map(|t| t.full_name().to_string())
    }
}
