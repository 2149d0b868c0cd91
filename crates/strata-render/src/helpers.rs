//! Functions available to templates.
//!
//! | Name | Returns |
//! |---|---|
//! | `join(sep, items)` | `items` joined by `sep` |
//! | `markdown(text)` | `text` rendered as HTML, marked safe |
//! | `markdown_file(path)` | file next to the page rendered as HTML, marked safe |
//! | `path_starts_with(prefix)` | `prefix` if the page path starts with it, else `""` |
//! | `path_equals(candidate)` | `candidate` if it equals the page path, else `""` |
//!
//! The path predicates return strings rather than booleans so templates can
//! use them directly, e.g. `class="{{ path_starts_with('/blog/') and 'active' }}"`.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use minijinja::{Environment, Error, ErrorKind, Value};

use crate::content::ContentPath;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};

/// Helper set bound to the page currently being rendered.
///
/// A fresh set is created for every render, so concurrent renders never see
/// each other's page.
pub struct Helpers {
    content_path: String,
    content_dir: PathBuf,
    sink: Arc<dyn DiagnosticSink>,
}

impl Helpers {
    /// Bind helpers to `content` under `root`.
    pub fn new(root: &Path, content: &ContentPath, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            content_path: content.as_str().to_string(),
            content_dir: content.directory_path(root),
            sink,
        }
    }

    /// Join string items with a separator. No escaping is applied.
    pub fn join<S: AsRef<str>>(separator: &str, items: &[S]) -> String {
        items
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Render Markdown text to a safe HTML value.
    pub fn markdown(text: &str) -> Value {
        Value::from_safe_string(strata_markdown::to_html(text))
    }

    /// Render a Markdown file relative to the page's directory.
    ///
    /// Read failures produce an empty fragment and a diagnostic. Absolute
    /// paths and `..` segments are refused the same way.
    pub fn markdown_file(&self, relative: &str) -> Value {
        let escapes = Path::new(relative)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            self.report_unreadable(format!(
                "Refusing markdown file outside the page directory: {}",
                relative
            ));
            return Value::from_safe_string(String::new());
        }

        let path = self.content_dir.join(relative);

        match fs::read(&path) {
            Ok(bytes) => Self::markdown(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                self.report_unreadable(format!(
                    "Failed to read markdown file {}: {}",
                    path.display(),
                    e
                ));
                Value::from_safe_string(String::new())
            }
        }
    }

    fn report_unreadable(&self, message: String) {
        self.sink.report(Diagnostic {
            content_path: self.content_path.clone(),
            kind: DiagnosticKind::MarkdownFileUnreadable,
            message,
        });
    }

    /// `prefix` when the page path starts with it, otherwise an empty string.
    pub fn path_starts_with(&self, prefix: &str) -> String {
        if self.content_path.starts_with(prefix) {
            prefix.to_string()
        } else {
            String::new()
        }
    }

    /// `candidate` when it equals the page path, otherwise an empty string.
    pub fn path_equals(&self, candidate: &str) -> String {
        if self.content_path == candidate {
            candidate.to_string()
        } else {
            String::new()
        }
    }

    /// Install the helpers into a template environment.
    pub fn register(self: Arc<Self>, env: &mut Environment<'_>) {
        env.add_function("join", join_value);
        env.add_function("markdown", |text: Option<String>| {
            Self::markdown(text.as_deref().unwrap_or_default())
        });

        let helpers = Arc::clone(&self);
        env.add_function("markdown_file", move |relative: String| {
            helpers.markdown_file(&relative)
        });

        let helpers = Arc::clone(&self);
        env.add_function("path_starts_with", move |prefix: String| {
            helpers.path_starts_with(&prefix)
        });

        env.add_function("path_equals", move |candidate: String| {
            self.path_equals(&candidate)
        });
    }
}

/// Template-facing `join`: accepts any sequence, treats a missing value as empty.
fn join_value(separator: String, items: Value) -> Result<String, Error> {
    if items.is_undefined() || items.is_none() {
        return Ok(String::new());
    }

    if items.as_str().is_some() {
        return Err(Error::new(
            ErrorKind::InvalidOperation,
            "join expects a sequence, not a string",
        ));
    }

    let parts: Vec<String> = items.try_iter()?.map(|item| item.to_string()).collect();
    Ok(Helpers::join(&separator, &parts))
}
