//! Metadata records.
//!
//! A page may carry a JSON object next to its template. The record has no
//! schema: every key is passed through to the templates as-is.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::content::ContentPath;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};

/// An open key/value record loaded for one render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a record from JSON text. The top level must be an object.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Map<String, Value>>(source).map(Self)
    }

    /// Look up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over top-level fields.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// String entries of an array field. Missing fields and non-string
    /// entries are skipped.
    pub fn strings(&self, key: &str) -> Vec<&str> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

impl From<Map<String, Value>> for Metadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// How to treat a record that exists but cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataPolicy {
    /// Fail the render (build mode)
    Strict,

    /// Render with an empty record and report a diagnostic (serve mode)
    Lenient,
}

/// Errors that can occur when loading metadata.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Failed to read metadata for {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse metadata for {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the metadata record for a page.
///
/// A missing record is an empty record. Under [`MetadataPolicy::Lenient`] an
/// unreadable or malformed record is also an empty record, reported to
/// `sink`; under [`MetadataPolicy::Strict`] it is an error.
pub fn load_metadata(
    root: &Path,
    content: &ContentPath,
    policy: MetadataPolicy,
    sink: &dyn DiagnosticSink,
) -> Result<Metadata, MetadataError> {
    let path = content.metadata_path(root);

    let result = match fs::read_to_string(&path) {
        Ok(source) => Metadata::from_json(&source).map_err(|e| MetadataError::Parse {
            path: content.to_string(),
            source: e,
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Metadata::new()),
        Err(e) => Err(MetadataError::Read {
            path: content.to_string(),
            source: e,
        }),
    };

    match (result, policy) {
        (Ok(metadata), _) => Ok(metadata),
        (Err(e), MetadataPolicy::Strict) => Err(e),
        (Err(e), MetadataPolicy::Lenient) => {
            sink.report(Diagnostic {
                content_path: content.to_string(),
                kind: DiagnosticKind::MetadataIgnored,
                message: e.to_string(),
            });
            Ok(Metadata::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use std::fs;
    use tempfile::tempdir;

    fn page(url: &str) -> ContentPath {
        ContentPath::from_url(url).unwrap()
    }

    #[test]
    fn missing_record_is_empty() {
        let temp = tempdir().unwrap();
        let sink = CollectingSink::new();

        let metadata =
            load_metadata(temp.path(), &page("/"), MetadataPolicy::Strict, &sink).unwrap();

        assert!(metadata.is_empty());
        assert!(sink.take().is_empty());
    }

    #[test]
    fn loads_nested_values() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("blog")).unwrap();
        fs::write(
            temp.path().join("blog/index.json"),
            r#"{"title": "Blog", "keywords": ["a", "b"], "author": {"name": "Ada"}}"#,
        )
        .unwrap();

        let metadata = load_metadata(
            temp.path(),
            &page("/blog/"),
            MetadataPolicy::Strict,
            &CollectingSink::new(),
        )
        .unwrap();

        assert_eq!(metadata.get("title"), Some(&Value::from("Blog")));
        assert_eq!(metadata.strings("keywords"), vec!["a", "b"]);
        assert!(metadata.get("author").unwrap().is_object());
    }

    #[test]
    fn strict_policy_rejects_malformed_record() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("index.json"), "{ not json").unwrap();

        let result = load_metadata(
            temp.path(),
            &page("/"),
            MetadataPolicy::Strict,
            &CollectingSink::new(),
        );

        assert!(matches!(result, Err(MetadataError::Parse { .. })));
    }

    #[test]
    fn lenient_policy_reports_and_continues() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("index.json"), "{ not json").unwrap();
        let sink = CollectingSink::new();

        let metadata =
            load_metadata(temp.path(), &page("/"), MetadataPolicy::Lenient, &sink).unwrap();

        assert!(metadata.is_empty());
        let diagnostics = sink.take();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MetadataIgnored);
        assert_eq!(diagnostics[0].content_path, "/");
    }

    #[test]
    fn non_object_record_is_malformed() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("about.json"), "[1, 2, 3]").unwrap();

        let result = load_metadata(
            temp.path(),
            &page("/about"),
            MetadataPolicy::Strict,
            &CollectingSink::new(),
        );

        assert!(result.is_err());
    }
}
