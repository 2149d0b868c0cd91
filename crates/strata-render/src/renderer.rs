//! Page rendering.
//!
//! A page is composed from its [`LayoutChain`] with Jinja inheritance: every
//! template in the chain extends the next one out, and the outermost extends
//! an internal document whose only content is the `layout` block. Rendering
//! therefore emits exactly the `layout` block, with inner templates filling
//! the blocks (conventionally `body`) that outer layouts leave open.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use minijinja::{path_loader, Environment, Value};
use regex::Regex;

use crate::chain::LayoutChain;
use crate::content::{join_name, ContentPath};
use crate::diagnostics::DiagnosticSink;
use crate::helpers::Helpers;
use crate::metadata::Metadata;

/// Block every page must end up defining.
pub const ENTRY_BLOCK: &str = "layout";

/// Name of the synthetic template at the top of every chain.
const DOCUMENT_TEMPLATE: &str = "@document";

/// Errors that can occur when rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to read template {template} for {path}: {source}")]
    ReadTemplate {
        path: String,
        template: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid template {template} for {path}: {source}")]
    Syntax {
        path: String,
        template: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("No template in the chain for {path} defines a \"layout\" block")]
    MissingEntryPoint { path: String },

    #[error("Failed to render {path}: {source}")]
    Render {
        path: String,
        #[source]
        source: minijinja::Error,
    },
}

impl RenderError {
    /// Content path of the page that failed.
    pub fn content_path(&self) -> &str {
        match self {
            Self::ReadTemplate { path, .. }
            | Self::Syntax { path, .. }
            | Self::MissingEntryPoint { path }
            | Self::Render { path, .. } => path,
        }
    }
}

/// Renders pages found under a content root.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    root: PathBuf,
}

impl PageRenderer {
    /// Create a renderer for the given content root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The content root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a template exists for `content`.
    pub fn has_page(&self, content: &ContentPath) -> bool {
        content.template_path(&self.root).is_file()
    }

    /// Resolve the layout chain for `content` and render it into `out`.
    pub fn render<W: Write>(
        &self,
        content: &ContentPath,
        metadata: &Metadata,
        sink: Arc<dyn DiagnosticSink>,
        out: W,
    ) -> Result<(), RenderError> {
        let chain = LayoutChain::resolve(&self.root, content);
        self.render_chain(content, &chain, metadata, sink, out)
    }

    /// Render `content` with an already resolved chain.
    ///
    /// Output is streamed into `out`. If rendering fails part of the page may
    /// already have been written.
    pub fn render_chain<W: Write>(
        &self,
        content: &ContentPath,
        chain: &LayoutChain,
        metadata: &Metadata,
        sink: Arc<dyn DiagnosticSink>,
        out: W,
    ) -> Result<(), RenderError> {
        let path = content.to_string();
        let env = self.environment(content, chain, sink)?;

        let template = env
            .get_template(chain.page())
            .map_err(|e| RenderError::Render {
                path: path.clone(),
                source: e,
            })?;

        template
            .render_to_write(page_context(content, metadata), out)
            .map_err(|e| RenderError::Render { path, source: e })?;

        Ok(())
    }

    /// Build the per-render template environment.
    fn environment(
        &self,
        content: &ContentPath,
        chain: &LayoutChain,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Environment<'static>, RenderError> {
        let path = content.to_string();

        let mut env = Environment::new();
        env.set_loader(path_loader(&self.root));

        env.add_template_owned(
            DOCUMENT_TEMPLATE,
            format!("{{% block {} %}}{{% endblock %}}", ENTRY_BLOCK),
        )
        .map_err(|e| RenderError::Syntax {
            path: path.clone(),
            template: DOCUMENT_TEMPLATE.to_string(),
            source: e,
        })?;

        let mut has_entry = false;
        let templates = chain.templates();

        for (index, name) in templates.iter().enumerate() {
            let source = fs::read_to_string(join_name(&self.root, name)).map_err(|e| {
                RenderError::ReadTemplate {
                    path: path.clone(),
                    template: name.clone(),
                    source: e,
                }
            })?;

            has_entry |= defines_entry_block(&source);

            let parent = templates
                .get(index + 1)
                .map(String::as_str)
                .unwrap_or(DOCUMENT_TEMPLATE);

            let composed = format!("{{% extends {:?} %}}{}", parent, source);
            env.add_template_owned(name.clone(), composed)
                .map_err(|e| RenderError::Syntax {
                    path: path.clone(),
                    template: name.clone(),
                    source: e,
                })?;
        }

        if !has_entry {
            return Err(RenderError::MissingEntryPoint { path });
        }

        Arc::new(Helpers::new(&self.root, content, sink)).register(&mut env);

        Ok(env)
    }
}

/// Template variables for one page: every metadata field, plus `meta` and
/// `path` which take precedence over fields of the same name.
fn page_context(content: &ContentPath, metadata: &Metadata) -> Value {
    let mut ctx: BTreeMap<String, Value> = metadata
        .iter()
        .map(|(key, value)| (key.clone(), Value::from_serialize(value)))
        .collect();

    ctx.insert("meta".to_string(), Value::from_serialize(metadata));
    ctx.insert("path".to_string(), Value::from(content.as_str()));

    Value::from_serialize(&ctx)
}

/// Whether `source` opens the entry block outside of a `{# ... #}` comment.
fn defines_entry_block(source: &str) -> bool {
    static ENTRY: OnceLock<Option<Regex>> = OnceLock::new();
    static COMMENT: OnceLock<Option<Regex>> = OnceLock::new();

    let uncommented = match COMMENT
        .get_or_init(|| Regex::new(r"(?s)\{#.*?#\}").ok())
        .as_ref()
    {
        Some(re) => re.replace_all(source, ""),
        None => source.into(),
    };

    ENTRY
        .get_or_init(|| {
            Regex::new(&format!(r"\{{%[-+]?\s*block\s+{}\s*[-+]?%\}}", ENTRY_BLOCK)).ok()
        })
        .as_ref()
        .is_some_and(|re| re.is_match(&uncommented))
}
