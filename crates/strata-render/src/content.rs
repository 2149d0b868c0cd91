//! Mapping between content paths and files under the content root.
//!
//! A content path is the URL-style name of a page. Each one maps to exactly
//! one template file and at most one metadata record:
//!
//! | Content path | Template | Metadata |
//! |---|---|---|
//! | `/` | `index.html` | `index.json` |
//! | `/blog/post/` | `blog/post/index.html` | `blog/post/index.json` |
//! | `/about.html` | `about.html` | `about.json` |

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// File name that marks the layout for a directory subtree.
pub const LAYOUT_FILE: &str = "layout.html";

/// Template rendered for a directory request.
pub const INDEX_FILE: &str = "index.html";

/// Extension of page and layout templates.
pub const TEMPLATE_EXTENSION: &str = "html";

/// Extension of metadata records.
pub const METADATA_EXTENSION: &str = "json";

/// Files and directories starting with this prefix are never pages. They can
/// still be included from other templates.
pub const PRIVATE_PREFIX: char = '_';

/// A page identifier together with the template it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentPath {
    /// Canonical URL path, always starting with `/`
    url: String,

    /// Template name relative to the content root, `/`-separated
    template: String,
}

impl ContentPath {
    /// Translate a request path into a content path.
    ///
    /// Directory paths (trailing `/`) resolve to their index template. Other
    /// paths resolve to `<path>.html`, with an explicit `.html` suffix
    /// accepted as well. Returns `None` for paths that cannot name a page:
    /// traversal segments, backslashes, private segments or a layout file.
    pub fn from_url(url_path: &str) -> Option<Self> {
        let is_directory = url_path.is_empty() || url_path.ends_with('/');

        let mut segments = Vec::new();
        for segment in url_path.split('/').filter(|s| !s.is_empty()) {
            if !is_valid_segment(segment) {
                return None;
            }
            segments.push(segment);
        }

        let template = if is_directory {
            segments.push(INDEX_FILE);
            segments.join("/")
        } else {
            let joined = segments.join("/");
            let suffix = format!(".{}", TEMPLATE_EXTENSION);
            let stem = joined.strip_suffix(suffix.as_str()).unwrap_or(&joined);
            if stem.is_empty() || stem.ends_with('/') {
                return None;
            }
            format!("{}{}", stem, suffix)
        };

        Self::from_template_name(template)
    }

    /// Build a content path from a template path relative to the content root.
    ///
    /// Returns `None` for layout files, private files, non-template files and
    /// paths that leave the root.
    pub fn from_template(relative: &Path) -> Option<Self> {
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str()?;
                    if !is_valid_segment(part) {
                        return None;
                    }
                    segments.push(part);
                }
                Component::CurDir => {}
                _ => return None,
            }
        }

        Self::from_template_name(segments.join("/"))
    }

    fn from_template_name(template: String) -> Option<Self> {
        if template.split('/').any(|segment| segment.starts_with(PRIVATE_PREFIX)) {
            return None;
        }

        let file_name = template.rsplit('/').next()?;
        if file_name == LAYOUT_FILE {
            return None;
        }

        let suffix = format!(".{}", TEMPLATE_EXTENSION);
        let stem = file_name.strip_suffix(suffix.as_str())?;
        if stem.is_empty() {
            return None;
        }

        let url = if file_name == INDEX_FILE {
            let dir = &template[..template.len() - INDEX_FILE.len()];
            format!("/{}", dir)
        } else {
            format!("/{}", template)
        };

        Some(Self { url, template })
    }

    /// The canonical URL path of this page.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Template name relative to the content root.
    pub fn template_name(&self) -> &str {
        &self.template
    }

    /// Directory containing the template, relative to the content root.
    ///
    /// Empty for pages at the root.
    pub fn directory(&self) -> &str {
        match self.template.rfind('/') {
            Some(pos) => &self.template[..pos],
            None => "",
        }
    }

    /// Physical location of the template.
    pub fn template_path(&self, root: &Path) -> PathBuf {
        join_name(root, &self.template)
    }

    /// Physical location of the metadata record.
    pub fn metadata_path(&self, root: &Path) -> PathBuf {
        self.template_path(root).with_extension(METADATA_EXTENSION)
    }

    /// Physical directory of the template.
    pub fn directory_path(&self, root: &Path) -> PathBuf {
        join_name(root, self.directory())
    }
}

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Join a `/`-separated name onto a root directory.
pub(crate) fn join_name(root: &Path, name: &str) -> PathBuf {
    name.split('/')
        .filter(|s| !s.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

fn is_valid_segment(segment: &str) -> bool {
    segment != "." && segment != ".." && !segment.contains(['\\', '\0', '"'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn root_maps_to_index() {
        let path = ContentPath::from_url("/").unwrap();

        assert_eq!(path.as_str(), "/");
        assert_eq!(path.template_name(), "index.html");
        assert_eq!(path.directory(), "");
    }

    #[test]
    fn directory_maps_to_nested_index() {
        let path = ContentPath::from_url("/blog/post/").unwrap();

        assert_eq!(path.as_str(), "/blog/post/");
        assert_eq!(path.template_name(), "blog/post/index.html");
        assert_eq!(path.directory(), "blog/post");
    }

    #[test]
    fn file_paths_accept_optional_extension() {
        let bare = ContentPath::from_url("/about").unwrap();
        let explicit = ContentPath::from_url("/about.html").unwrap();

        assert_eq!(bare, explicit);
        assert_eq!(bare.as_str(), "/about.html");
        assert_eq!(bare.template_name(), "about.html");
    }

    #[test]
    fn explicit_index_is_canonicalised() {
        let path = ContentPath::from_url("/blog/index.html").unwrap();

        assert_eq!(path.as_str(), "/blog/");
    }

    #[test]
    fn rejects_traversal_and_layouts() {
        assert!(ContentPath::from_url("/../secret/").is_none());
        assert!(ContentPath::from_url("/a/./b").is_none());
        assert!(ContentPath::from_url("/a\\b").is_none());
        assert!(ContentPath::from_url("/blog/layout.html").is_none());
        assert!(ContentPath::from_url("/blog/layout").is_none());
        assert!(ContentPath::from_url("/_partials/nav").is_none());
    }

    #[test]
    fn maps_template_back_to_url() {
        let index = ContentPath::from_template(Path::new("blog/post/index.html")).unwrap();
        let page = ContentPath::from_template(Path::new("docs/intro.html")).unwrap();

        assert_eq!(index.as_str(), "/blog/post/");
        assert_eq!(page.as_str(), "/docs/intro.html");
        assert!(ContentPath::from_template(Path::new("blog/layout.html")).is_none());
        assert!(ContentPath::from_template(Path::new("blog/index.json")).is_none());
        assert!(ContentPath::from_template(Path::new("_partials/nav.html")).is_none());
        assert!(ContentPath::from_template(Path::new("blog/_card.html")).is_none());
    }

    #[test]
    fn metadata_sits_next_to_template() {
        let root = Path::new("/srv/site");
        let path = ContentPath::from_url("/blog/post/").unwrap();

        assert_eq!(
            path.metadata_path(root),
            PathBuf::from("/srv/site/blog/post/index.json")
        );
        assert_eq!(path.directory_path(root), PathBuf::from("/srv/site/blog/post"));
    }
}
