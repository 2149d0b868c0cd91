//! Layout chain resolution.

use std::path::Path;

use crate::content::{join_name, ContentPath, LAYOUT_FILE};

/// Templates composing one page, innermost first.
///
/// The first entry is always the page's own template. Each following entry is
/// the `layout.html` of an ancestor directory, nearest first, ending with the
/// content root's layout when it exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutChain {
    templates: Vec<String>,
}

impl LayoutChain {
    /// Walk from the page's directory up to `root`, collecting layouts.
    ///
    /// Directories without a layout are skipped; the walk always continues to
    /// the root.
    pub fn resolve(root: &Path, content: &ContentPath) -> Self {
        let mut templates = vec![content.template_name().to_string()];

        let mut dir = Some(content.directory());
        while let Some(current) = dir {
            let name = if current.is_empty() {
                LAYOUT_FILE.to_string()
            } else {
                format!("{}/{}", current, LAYOUT_FILE)
            };

            if join_name(root, &name).is_file() {
                templates.push(name);
            }

            dir = if current.is_empty() {
                None
            } else {
                Some(current.rsplit_once('/').map_or("", |(parent, _)| parent))
            };
        }

        tracing::debug!("Layout chain for {}: {:?}", content, templates);

        Self { templates }
    }

    /// Template names, innermost first.
    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// The page's own template.
    pub fn page(&self) -> &str {
        &self.templates[0]
    }

    /// The outermost layout, or the page itself when no layout applies.
    pub fn outermost(&self) -> &str {
        &self.templates[self.templates.len() - 1]
    }

    /// Number of templates in the chain (at least one).
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Always false; a chain holds at least the page template.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
