//! Result normalizer: raw engine hit record → `SearchHit`

use super::SearchHit;
use crate::engine::{ObjectRef, Value};
use crate::probe::Invoker;

pub const SNIPPET_MAX_CHARS: usize = 600;
pub const ELLIPSIS: &str = "…";

const PATH_FIELDS: [&str; 4] = ["FilePath", "Filename", "FileName", "DocPath"];
const PAGE_FIELDS: [&str; 2] = ["PageNumber", "Page"];
const SNIPPET_FIELDS: [&str; 4] = ["Summary", "Context", "Snippet", "DocSummary"];
const SNIPPET_FALLBACK_FIELDS: [&str; 2] = ["Report", "Highlights"];
const TITLE_FIELDS: [&str; 2] = ["Title", "DocTitle"];

/// Maps hit records of unknown shape onto `SearchHit`
pub struct ResultNormalizer<'a> {
    invoker: Invoker<'a>,
}

impl<'a> ResultNormalizer<'a> {
    pub fn new(invoker: Invoker<'a>) -> Self {
        Self { invoker }
    }

    /// `None` when the raw value is not a record at all
    pub fn normalize(&self, raw: &Value) -> Option<SearchHit> {
        let record = raw.as_object()?;

        let file_path = self.first_text(record, &PATH_FIELDS).unwrap_or_default();
        let page = self
            .invoker
            .get_first(record, &PAGE_FIELDS)
            .and_then(|v| v.as_int())
            .unwrap_or(0);
        let snippet = self
            .first_text(record, &SNIPPET_FIELDS)
            .or_else(|| self.first_text(record, &SNIPPET_FALLBACK_FIELDS))
            .map(|s| normalize_snippet(&s))
            .unwrap_or_default();
        let score = self
            .invoker
            .get(record, "Score")
            .and_then(|v| v.as_number())
            .unwrap_or(0.0);
        let hit_count = self
            .invoker
            .get(record, "HitCount")
            .and_then(|v| v.as_int())
            .unwrap_or(0);
        let title = self
            .first_text(record, &TITLE_FIELDS)
            .unwrap_or_else(|| title_from_path(&file_path));

        Some(SearchHit {
            file_path,
            page,
            snippet,
            score,
            title,
            hit_count,
        })
    }

    /// First candidate whose value renders to non-blank text
    fn first_text(&self, record: &ObjectRef, candidates: &[&str]) -> Option<String> {
        candidates
            .iter()
            .filter_map(|name| self.invoker.get(record, name))
            .filter_map(|value| text_of(&value))
            .find(|text| !text.trim().is_empty())
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Str(s) | Value::Enum(s) => Some(s.clone()),
        Value::List(items) => {
            let parts: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        _ => None,
    }
}

/// Collapse line breaks, trim, and cap at `SNIPPET_MAX_CHARS` characters
pub fn normalize_snippet(raw: &str) -> String {
    let flat = raw.replace("\r\n", " ").replace(['\r', '\n'], " ");
    let flat = flat.trim();

    if flat.chars().count() <= SNIPPET_MAX_CHARS {
        return flat.to_string();
    }
    let mut cut: String = flat.chars().take(SNIPPET_MAX_CHARS).collect();
    cut.push_str(ELLIPSIS);
    cut
}

/// File-name component of a path using either separator
pub fn title_from_path(path: &str) -> String {
    path.rsplit(['/', '\\']).next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DynObject, DynRuntime, ValueKind};
    use crate::probe::CapabilityResolver;

    fn resolver() -> CapabilityResolver {
        CapabilityResolver::new(DynRuntime::new(Vec::new(), Vec::new()), Vec::new())
    }

    #[test]
    fn test_snippet_normalization() {
        assert_eq!(normalize_snippet("  a\r\nb\nc\rd  "), "a b c d");

        let long = "x".repeat(700);
        let snippet = normalize_snippet(&long);
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS + 1);
        assert!(snippet.ends_with(ELLIPSIS));

        let exact = "y".repeat(SNIPPET_MAX_CHARS);
        assert_eq!(normalize_snippet(&exact), exact);
    }

    #[test]
    fn test_title_from_path() {
        assert_eq!(title_from_path("/data/docs/report.pdf"), "report.pdf");
        assert_eq!(title_from_path(r"C:\docs\memo.doc"), "memo.doc");
        assert_eq!(title_from_path(""), "");
    }

    #[test]
    fn test_fallback_chains() {
        let resolver = resolver();
        let normalizer = ResultNormalizer::new(Invoker::new(&resolver));
        let raw: ObjectRef = DynObject::builder("Hit")
            .read_only("DocPath", ValueKind::Str, "/docs/a.txt")
            .read_only("Page", ValueKind::Str, "3")
            .read_only("Summary", ValueKind::Str, "   ")
            .read_only("Highlights", ValueKind::StrList, vec!["one".to_string(), "two".to_string()])
            .read_only("Score", ValueKind::Int, 12i64)
            .read_only("HitCount", ValueKind::Float, 2.0)
            .build();

        let hit = normalizer.normalize(&Value::Object(raw)).unwrap();
        assert_eq!(hit.file_path, "/docs/a.txt");
        assert_eq!(hit.page, 0);
        assert_eq!(hit.snippet, "one two");
        assert_eq!(hit.score, 12.0);
        assert_eq!(hit.hit_count, 0);
        assert_eq!(hit.title, "a.txt");
    }

    #[test]
    fn test_preferred_fields() {
        let resolver = resolver();
        let normalizer = ResultNormalizer::new(Invoker::new(&resolver));
        let raw: ObjectRef = DynObject::builder("Hit")
            .read_only("filepath", ValueKind::Str, "/docs/b.pdf")
            .read_only("PageNumber", ValueKind::Int, 4i64)
            .read_only("Context", ValueKind::Str, "line one\nline two")
            .read_only("Score", ValueKind::Float, 0.75)
            .read_only("HitCount", ValueKind::Int, 9i64)
            .read_only("DocTitle", ValueKind::Str, "Budget")
            .build();

        let hit = normalizer.normalize(&Value::Object(raw)).unwrap();
        assert_eq!(hit.file_path, "/docs/b.pdf");
        assert_eq!(hit.page, 4);
        assert_eq!(hit.snippet, "line one line two");
        assert_eq!(hit.score, 0.75);
        assert_eq!(hit.hit_count, 9);
        assert_eq!(hit.title, "Budget");
    }

    #[test]
    fn test_non_record_is_skipped() {
        let resolver = resolver();
        let normalizer = ResultNormalizer::new(Invoker::new(&resolver));
        assert!(normalizer.normalize(&Value::Int(1)).is_none());
    }
}
