//! Search across one or more engine indexes
//!
//! Caller options are merged field by field with the process-wide
//! [`EngineDefaults`](crate::config::EngineDefaults); raw engine hits are
//! normalized into [`SearchHit`].

pub mod normalize;
pub mod orchestrator;

pub use normalize::{normalize_snippet, ResultNormalizer, SNIPPET_MAX_CHARS};
pub use orchestrator::SearchOrchestrator;

use crate::config::EngineDefaults;
use crate::outcome::OperationOutcome;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_TOP_K: usize = 20;

/// Caller-supplied search options; unset fields come from `EngineDefaults`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOptions {
    pub top_k: usize,
    pub timeout_ms: Option<u64>,
    pub use_stemming: Option<bool>,
    pub case_sensitive: Option<bool>,
    pub accent_sensitive: Option<bool>,
    pub search_flags: Option<String>,
    pub max_context_bytes: Option<u32>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            timeout_ms: None,
            use_stemming: None,
            case_sensitive: None,
            accent_sensitive: None,
            search_flags: None,
            max_context_bytes: None,
        }
    }
}

impl SearchOptions {
    pub fn with_top_k(top_k: usize) -> Self {
        Self {
            top_k,
            ..Self::default()
        }
    }

    /// Fill every unset field from `defaults`
    pub fn resolve(&self, defaults: &EngineDefaults) -> ResolvedOptions {
        ResolvedOptions {
            top_k: self.top_k.max(1),
            timeout_ms: self.timeout_ms.or(defaults.timeout_ms),
            use_stemming: self.use_stemming.or(defaults.use_stemming),
            case_sensitive: self.case_sensitive.or(defaults.case_sensitive),
            accent_sensitive: self.accent_sensitive.or(defaults.accent_sensitive),
            search_flags: self.search_flags.clone().or_else(|| defaults.search_flags.clone()),
            max_context_bytes: self.max_context_bytes.or(defaults.max_context_bytes),
        }
    }
}

/// Options after the per-field merge; `None` leaves the engine default
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub top_k: usize,
    pub timeout_ms: Option<u64>,
    pub use_stemming: Option<bool>,
    pub case_sensitive: Option<bool>,
    pub accent_sensitive: Option<bool>,
    pub search_flags: Option<String>,
    pub max_context_bytes: Option<u32>,
}

/// One normalized search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub file_path: String,
    pub page: i64,
    pub snippet: String,
    pub score: f64,
    pub title: String,
    pub hit_count: i64,
}

/// A query against one or more indexes
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub index_paths: Vec<PathBuf>,
    pub query: String,
    pub options: SearchOptions,
}

impl SearchRequest {
    pub fn new<P: Into<PathBuf>>(
        index_paths: impl IntoIterator<Item = P>,
        query: impl Into<String>,
        options: SearchOptions,
    ) -> Self {
        Self {
            index_paths: index_paths.into_iter().map(Into::into).collect(),
            query: query.into(),
            options,
        }
    }
}

/// Hits gathered by one search call plus its outcome
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub hits: Vec<SearchHit>,
    pub outcome: OperationOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_per_field() {
        let defaults = EngineDefaults {
            timeout_ms: Some(5000),
            use_stemming: Some(true),
            case_sensitive: Some(false),
            accent_sensitive: None,
            max_context_bytes: Some(200),
            search_flags: Some("Fuzzy".into()),
        };

        let resolved = SearchOptions::with_top_k(5).resolve(&defaults);
        assert_eq!(resolved.top_k, 5);
        assert_eq!(resolved.timeout_ms, defaults.timeout_ms);
        assert_eq!(resolved.use_stemming, defaults.use_stemming);
        assert_eq!(resolved.case_sensitive, defaults.case_sensitive);
        assert_eq!(resolved.accent_sensitive, defaults.accent_sensitive);
        assert_eq!(resolved.max_context_bytes, defaults.max_context_bytes);
        assert_eq!(resolved.search_flags, defaults.search_flags);
    }

    #[test]
    fn test_caller_fields_win() {
        let options = SearchOptions {
            case_sensitive: Some(true),
            max_context_bytes: Some(80),
            ..SearchOptions::default()
        };

        let resolved = options.resolve(&EngineDefaults::default());
        assert_eq!(resolved.top_k, DEFAULT_TOP_K);
        assert_eq!(resolved.case_sensitive, Some(true));
        assert_eq!(resolved.max_context_bytes, Some(80));
        assert_eq!(resolved.use_stemming, Some(false));
    }

    #[test]
    fn test_top_k_is_at_least_one() {
        let resolved = SearchOptions::with_top_k(0).resolve(&EngineDefaults::default());
        assert_eq!(resolved.top_k, 1);
    }

    #[test]
    fn test_options_from_json() {
        let options: SearchOptions = serde_json::from_str(r#"{"topK": 3, "useStemming": true}"#).unwrap();
        assert_eq!(options.top_k, 3);
        assert_eq!(options.use_stemming, Some(true));
        assert_eq!(options.timeout_ms, None);
    }
}
