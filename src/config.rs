//! Configuration management with environment variable support
//!
//! Provides the adapter configuration and the process-wide search defaults

pub mod defaults;
pub mod errors;

pub use defaults::{DefaultsHandle, EngineDefaults};
pub use errors::{AdapterError, ErrorContextExt, Result};

use std::env;
use std::path::PathBuf;

/// Module names tried, in order, when no loaded module exposes a wanted type
pub const DEFAULT_ENGINE_MODULES: [&str; 3] = ["SearchEngine.Net", "SearchEngine", "SearchEngineNetApi"];

/// Adapter configuration
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Known engine module names, probed after the already-loaded modules
    pub engine_modules: Vec<String>,
    /// Extension (without dot) of the files that mark a built index
    pub marker_extension: String,
    /// Scratch directory for job temp files and file lists
    pub scratch_dir: PathBuf,
    /// Emit diagnostic output
    pub diagnostics: bool,
    /// `EnvFilter` directive used by `init_logging`
    pub log_filter: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            engine_modules: DEFAULT_ENGINE_MODULES.iter().map(|s| s.to_string()).collect(),
            marker_extension: "ix".to_string(),
            scratch_dir: env::temp_dir(),
            diagnostics: false,
            log_filter: "info".to_string(),
        }
    }
}

impl AdapterConfig {
    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - FTS_ADAPTER_ENGINE_MODULES: comma-separated module names
    /// - FTS_ADAPTER_MARKER_EXT: index marker extension (default: ix)
    /// - FTS_ADAPTER_SCRATCH_DIR: scratch directory (default: system temp dir)
    /// - FTS_ADAPTER_DIAGNOSTICS: enable diagnostics (default: false)
    /// - FTS_ADAPTER_LOG: tracing filter directive (default: info)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(modules) = env::var("FTS_ADAPTER_ENGINE_MODULES") {
            let modules: Vec<String> = modules
                .split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if !modules.is_empty() {
                config.engine_modules = modules;
            }
        }

        if let Ok(ext) = env::var("FTS_ADAPTER_MARKER_EXT") {
            let ext = ext.trim().trim_start_matches('.');
            if !ext.is_empty() {
                config.marker_extension = ext.to_string();
            }
        }

        if let Ok(dir) = env::var("FTS_ADAPTER_SCRATCH_DIR") {
            if !dir.trim().is_empty() {
                config.scratch_dir = PathBuf::from(dir);
            }
        }

        if let Ok(debug) = env::var("FTS_ADAPTER_DIAGNOSTICS") {
            config.diagnostics = debug.eq_ignore_ascii_case("true") || debug == "1";
        }

        if let Ok(filter) = env::var("FTS_ADAPTER_LOG") {
            config.log_filter = filter;
        }

        config
    }
}
