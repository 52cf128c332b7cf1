//! Process-wide search defaults
//!
//! `EngineDefaults` fills every option a caller leaves unset. The host may
//! replace the whole object at any time; searches take a snapshot at call
//! time and never see a partially replaced set.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::{Arc, LazyLock};

/// Default values applied to unset search options
///
/// `None` means "keep the engine's own default" (the option is not pushed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineDefaults {
    pub timeout_ms: Option<u64>,
    pub use_stemming: Option<bool>,
    pub case_sensitive: Option<bool>,
    pub accent_sensitive: Option<bool>,
    pub max_context_bytes: Option<u32>,
    pub search_flags: Option<String>,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            use_stemming: Some(false),
            case_sensitive: Some(false),
            accent_sensitive: Some(false),
            max_context_bytes: Some(600),
            search_flags: None,
        }
    }
}

impl EngineDefaults {
    /// Parse from JSON; missing fields keep their built-in values
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load from environment variables
    ///
    /// Supported environment variables:
    /// - FTS_DEFAULT_TIMEOUT_MS
    /// - FTS_DEFAULT_STEMMING
    /// - FTS_DEFAULT_CASE_SENSITIVE
    /// - FTS_DEFAULT_ACCENT_SENSITIVE
    /// - FTS_DEFAULT_MAX_CONTEXT_BYTES
    /// - FTS_DEFAULT_SEARCH_FLAGS
    pub fn from_env() -> Self {
        let mut defaults = Self::default();

        if let Some(ms) = env_parse::<u64>("FTS_DEFAULT_TIMEOUT_MS") {
            defaults.timeout_ms = Some(ms);
        }
        if let Some(b) = env_bool("FTS_DEFAULT_STEMMING") {
            defaults.use_stemming = Some(b);
        }
        if let Some(b) = env_bool("FTS_DEFAULT_CASE_SENSITIVE") {
            defaults.case_sensitive = Some(b);
        }
        if let Some(b) = env_bool("FTS_DEFAULT_ACCENT_SENSITIVE") {
            defaults.accent_sensitive = Some(b);
        }
        if let Some(bytes) = env_parse::<u32>("FTS_DEFAULT_MAX_CONTEXT_BYTES") {
            defaults.max_context_bytes = Some(bytes);
        }
        if let Ok(flags) = env::var("FTS_DEFAULT_SEARCH_FLAGS") {
            if !flags.trim().is_empty() {
                defaults.search_flags = Some(flags);
            }
        }

        defaults
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

/// Shared, replaceable defaults
///
/// Replacement swaps the whole object; readers get an `Arc` snapshot.
#[derive(Debug, Clone, Default)]
pub struct DefaultsHandle {
    inner: Arc<RwLock<Arc<EngineDefaults>>>,
}

impl DefaultsHandle {
    pub fn new(defaults: EngineDefaults) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(defaults))),
        }
    }

    /// Current value at call time
    pub fn snapshot(&self) -> Arc<EngineDefaults> {
        Arc::clone(&self.inner.read())
    }

    /// Replace the whole set of defaults
    pub fn replace(&self, defaults: EngineDefaults) {
        *self.inner.write() = Arc::new(defaults);
    }
}

static GLOBAL_DEFAULTS: LazyLock<DefaultsHandle> = LazyLock::new(DefaultsHandle::default);

/// The process-wide defaults, initialized with built-in values on first use
pub fn global() -> &'static DefaultsHandle {
    &GLOBAL_DEFAULTS
}
