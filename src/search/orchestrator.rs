//! Search orchestrator
//!
//! Creates a search job, attaches the indexes, sets the query, applies the
//! resolved options best-effort, executes, and collects hits from either an
//! enumerable results container or a count + indexed accessor pair.

use super::{ResolvedOptions, ResultNormalizer, SearchHit, SearchOutcome, SearchRequest};
use crate::config::{AdapterError, EngineDefaults, Result};
use crate::diag;
use crate::engine::{MemberKind, ObjectRef, Value};
use crate::outcome::OperationOutcome;
use crate::probe::invoke::instantiate;
use crate::probe::{CapabilityResolver, ExecutableJob, Invoker, ProbedJob};
use std::time::Instant;

/// Full type names of the engine's search job, in priority order
pub const SEARCH_JOB_TYPES: [&str; 3] = ["SearchEngine.SearchJob", "SearchEngine.Engine.SearchJob", "SearchJob"];

const INDEX_COLLECTION_PROPS: [&str; 3] = ["IndexesToSearch", "IndexPaths", "Indexes"];
const ADD_INDEX_METHODS: [&str; 2] = ["AddIndexToSearch", "AddIndex"];
const SINGLE_INDEX_PROPS: [&str; 2] = ["IndexPath", "Index"];
const QUERY_PROPS: [&str; 3] = ["Request", "Query", "SearchRequest"];
const QUERY_METHODS: [&str; 2] = ["SetRequest", "SetQuery"];

const RESULT_CAP_PROPS: [&str; 2] = ["MaxFilesToRetrieve", "MaxResults"];
const CONTEXT_CAP_PROPS: [&str; 2] = ["MaxContextBytes", "ContextBytes"];
const TIMEOUT_PROPS: [&str; 2] = ["TimeoutMs", "TimeoutMilliseconds"];
const STEMMING_PROPS: [&str; 2] = ["Stemming", "UseStemming"];
const CASE_PROPS: [&str; 2] = ["CaseSensitive", "IsCaseSensitive"];
const ACCENT_PROPS: [&str; 2] = ["AccentSensitive", "IsAccentSensitive"];
const FLAGS_PROPS: [&str; 2] = ["SearchFlags", "Flags"];

const RESULTS_PROPS: [&str; 2] = ["Results", "SearchResults"];
const COUNT_PROPS: [&str; 4] = ["Count", "TotalFiles", "Length", "Size"];
const ITEM_METHODS: [&str; 5] = ["GetItem", "Item", "GetAt", "Get", "ElementAt"];

/// Runs queries through the engine's search job
pub struct SearchOrchestrator<'a> {
    resolver: &'a CapabilityResolver,
}

impl<'a> SearchOrchestrator<'a> {
    pub fn new(resolver: &'a CapabilityResolver) -> Self {
        Self { resolver }
    }

    /// Execute `request`, filling unset options from `defaults`
    pub fn search(&self, request: &SearchRequest, defaults: &EngineDefaults) -> SearchOutcome {
        let started = Instant::now();
        let mut outcome = OperationOutcome::new();
        let options = request.options.resolve(defaults);

        let hits = match self.run(request, &options, &mut outcome) {
            Ok(hits) => {
                outcome.succeed();
                hits
            }
            Err(e) => {
                outcome.fail(e);
                Vec::new()
            }
        };

        tracing::debug!("Search '{}' returned {} hits", request.query, hits.len());
        diag!(
            "search '{}' finished: hits={} success={} elapsed={:?}",
            request.query,
            hits.len(),
            outcome.success,
            started.elapsed()
        );
        SearchOutcome { hits, outcome }
    }

    fn run(
        &self,
        request: &SearchRequest,
        options: &ResolvedOptions,
        outcome: &mut OperationOutcome,
    ) -> Result<Vec<SearchHit>> {
        let index_paths: Vec<String> = request
            .index_paths
            .iter()
            .map(|p| p.display().to_string())
            .filter(|p| !p.trim().is_empty())
            .collect();
        if index_paths.is_empty() {
            return Err(AdapterError::config("no index path given"));
        }
        if request.query.trim().is_empty() {
            return Err(AdapterError::config("query is empty"));
        }

        let job_type = self
            .resolver
            .find_type(&SEARCH_JOB_TYPES)
            .ok_or_else(|| AdapterError::unsupported("a search job type"))?;
        let job = instantiate(&job_type)?;

        let invoker = Invoker::new(self.resolver);

        let attached = self.attach_indexes(invoker, &job, &index_paths, outcome);
        if attached == 0 {
            return Err(AdapterError::unsupported("attaching any index to the search job"));
        }

        let query = Value::Str(request.query.clone());
        invoker
            .set_first(&job, &QUERY_PROPS, query.clone())
            .or_else(|_| invoker.call_first(&job, &QUERY_METHODS, &[query]).map(|_| ()))
            .map_err(|e| AdapterError::unsupported(format!("setting the query: {}", e)))?;

        self.apply_options(invoker, &job, options, outcome);

        diag!(
            "search job {}: indexes=[{}] query='{}' options={:?}",
            job.type_name(),
            index_paths.join(", "),
            request.query,
            options
        );

        let status = ProbedJob::new(invoker, &job).execute();
        if let Some(err) = status.error() {
            return Err(err);
        }

        Ok(self.collect(invoker, &job, options.top_k, outcome))
    }

    /// Attach every index path; returns how many were attached
    fn attach_indexes(
        &self,
        invoker: Invoker<'_>,
        job: &ObjectRef,
        paths: &[String],
        outcome: &mut OperationOutcome,
    ) -> usize {
        if let Some(member) = self
            .resolver
            .find_first_member(job.as_ref(), &INDEX_COLLECTION_PROPS, MemberKind::Property)
        {
            if member.readable {
                if let Some(Value::Object(collection)) = invoker.get(job, &member.name) {
                    let added = paths
                        .iter()
                        .filter(|p| outcome.soft(invoker.try_call(&collection, "Add", &[Value::Str(p.to_string())])))
                        .count();
                    if added > 0 {
                        return added;
                    }
                }
            }
            if member.writable && outcome.soft(invoker.try_set(job, &member.name, Value::from(paths.to_vec()))) {
                return paths.len();
            }
        }

        let mut attached = 0;
        for path in paths {
            let added = invoker.call_first(job, &ADD_INDEX_METHODS, &[Value::Str(path.clone())]);
            if outcome.soft(added) {
                attached += 1;
            }
        }

        if attached == 0 && paths.len() == 1 {
            let set = invoker.set_first(job, &SINGLE_INDEX_PROPS, Value::Str(paths[0].clone()));
            if outcome.soft(set) {
                attached = 1;
            }
        }
        attached
    }

    fn apply_options(
        &self,
        invoker: Invoker<'_>,
        job: &ObjectRef,
        options: &ResolvedOptions,
        outcome: &mut OperationOutcome,
    ) {
        let top_k = i64::try_from(options.top_k).unwrap_or(i64::MAX);
        mirror(invoker, job, &RESULT_CAP_PROPS, Value::Int(top_k), outcome);

        if let Some(bytes) = options.max_context_bytes {
            mirror(invoker, job, &CONTEXT_CAP_PROPS, Value::from(bytes), outcome);
        }
        if let Some(ms) = options.timeout_ms {
            let ms = i64::try_from(ms).unwrap_or(i64::MAX);
            outcome.soft(invoker.set_first(job, &TIMEOUT_PROPS, Value::Int(ms)));
        }
        if let Some(stemming) = options.use_stemming {
            outcome.soft(invoker.set_first(job, &STEMMING_PROPS, Value::Bool(stemming)));
        }
        if let Some(case) = options.case_sensitive {
            outcome.soft(invoker.set_first(job, &CASE_PROPS, Value::Bool(case)));
        }
        if let Some(accent) = options.accent_sensitive {
            outcome.soft(invoker.set_first(job, &ACCENT_PROPS, Value::Bool(accent)));
        }
        if let Some(flags) = options.search_flags.as_deref().filter(|f| !f.trim().is_empty()) {
            outcome.soft(invoker.set_first(job, &FLAGS_PROPS, Value::Str(flags.to_string())));
        }
    }

    /// Gather up to `top_k` hits in the engine's order
    fn collect(
        &self,
        invoker: Invoker<'_>,
        job: &ObjectRef,
        top_k: usize,
        outcome: &mut OperationOutcome,
    ) -> Vec<SearchHit> {
        let normalizer = ResultNormalizer::new(invoker);
        let Some(container) = invoker.get_first(job, &RESULTS_PROPS) else {
            outcome.warn(format!("{} exposes no results container", job.type_name()));
            return Vec::new();
        };

        let items = match &container {
            Value::List(items) => Some(items.clone()),
            Value::Object(results) => invoker.enumerate(results),
            _ => None,
        };
        if let Some(items) = items {
            return items
                .iter()
                .filter_map(|raw| normalizer.normalize(raw))
                .take(top_k)
                .collect();
        }

        let shape = container.kind_name();
        let Value::Object(results) = container else {
            outcome.warn(format!("results container is a {}", shape));
            return Vec::new();
        };
        let Some(count) = invoker.get_first(&results, &COUNT_PROPS).and_then(|v| count_of(&v)) else {
            outcome.warn(format!("{} is neither enumerable nor counted", results.type_name()));
            return Vec::new();
        };

        let mut hits = Vec::new();
        for index in 0..count.max(0) {
            if hits.len() >= top_k {
                break;
            }
            match invoker.call_first(&results, &ITEM_METHODS, &[Value::Int(index)]) {
                Ok(raw) => hits.extend(normalizer.normalize(&raw)),
                Err(e) => {
                    outcome.warn(format!("stopped reading results at item {}: {}", index, e));
                    break;
                }
            }
        }
        hits
    }
}

/// Item count from an integer, or from a finite non-negative float
fn count_of(value: &Value) -> Option<i64> {
    value.as_int().or_else(|| {
        value
            .as_number()
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n as i64)
    })
}

/// Write the same value to every candidate property; warn only if none took it
fn mirror(invoker: Invoker<'_>, job: &ObjectRef, candidates: &[&str], value: Value, outcome: &mut OperationOutcome) {
    let mut failures = Vec::new();
    let mut accepted = false;
    for name in candidates {
        match invoker.try_set(job, name, value.clone()) {
            Ok(()) => accepted = true,
            Err(e) => failures.push(e.to_string()),
        }
    }
    if !accepted {
        outcome.warn(failures.join("; "));
    }
}
