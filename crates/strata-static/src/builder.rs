//! Static site builder.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use walkdir::WalkDir;

use strata_render::{
    load_metadata, ContentPath, DiagnosticSink, MetadataError, MetadataPolicy, PageRenderer,
    RenderError, TracingSink, PRIVATE_PREFIX,
};

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Content root
    pub content_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("site"),
            output_dir: PathBuf::from("build"),
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages rendered
    pub pages: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Content directory not found: {0}")]
    MissingContent(PathBuf),

    #[error("Failed to read content directory: {0}")]
    ReadError(#[from] walkdir::Error),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Static site builder.
///
/// Pages are rendered one at a time, parents before children. The first
/// failure stops the build.
pub struct StaticBuilder {
    config: BuildConfig,
    renderer: PageRenderer,
    sink: Arc<dyn DiagnosticSink>,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink::new("build")))
    }

    /// Create a builder that reports diagnostics to `sink`.
    pub fn with_sink(config: BuildConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        let renderer = PageRenderer::new(&config.content_dir);
        Self {
            config,
            renderer,
            sink,
        }
    }

    /// Build the static site.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let content_dir = &self.config.content_dir;

        if !content_dir.is_dir() {
            return Err(BuildError::MissingContent(content_dir.clone()));
        }

        let output_dir = &self.config.output_dir;
        create_dir(output_dir)?;

        // An output tree nested in the content tree must not be walked.
        let skip = fs::canonicalize(output_dir).ok();

        let mut pages = 0;

        let walker = WalkDir::new(content_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| {
                if !entry.file_type().is_dir() || entry.depth() == 0 {
                    return true;
                }
                if is_private(entry) {
                    return false;
                }
                match &skip {
                    Some(skip) => fs::canonicalize(entry.path()).map_or(true, |p| &p != skip),
                    None => true,
                }
            });

        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            let relative = path.strip_prefix(content_dir).unwrap_or(path);

            if entry.file_type().is_dir() {
                create_dir(&output_dir.join(relative))?;
                continue;
            }

            let Some(content) = ContentPath::from_template(relative) else {
                continue;
            };

            self.build_page(&content, &output_dir.join(relative))?;
            pages += 1;
        }

        Ok(BuildResult {
            pages,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: output_dir.clone(),
        })
    }

    /// Render a single page into `output_path`.
    fn build_page(&self, content: &ContentPath, output_path: &Path) -> Result<(), BuildError> {
        let metadata = load_metadata(
            self.renderer.root(),
            content,
            MetadataPolicy::Strict,
            self.sink.as_ref(),
        )?;

        let write_error = |source| BuildError::WriteError {
            path: output_path.to_path_buf(),
            source,
        };

        let file = File::create(output_path).map_err(write_error)?;
        let mut writer = BufWriter::new(file);

        self.renderer
            .render(content, &metadata, Arc::clone(&self.sink), &mut writer)?;
        writer.flush().map_err(write_error)?;

        tracing::info!("Rendered {} -> {}", content, output_path.display());

        Ok(())
    }
}

/// Remove the output directory. Returns whether anything was removed.
pub fn clean(output_dir: &Path) -> Result<bool, BuildError> {
    match fs::remove_dir_all(output_dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BuildError::WriteError {
            path: output_dir.to_path_buf(),
            source: e,
        }),
    }
}

/// Private directories hold partials and never produce pages.
fn is_private(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with(PRIVATE_PREFIX))
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|e| BuildError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strata_render::{CollectingSink, DiagnosticKind};
    use tempfile::{tempdir, TempDir};

    const ROOT_LAYOUT: &str =
        "{% block layout %}<html><title>{{ title }}</title>{% block body %}{% endblock %}</html>{% endblock %}";

    fn write(root: &Path, name: &str, source: &str) {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, source).unwrap();
    }

    fn project() -> (TempDir, BuildConfig) {
        let temp = tempdir().unwrap();
        let config = BuildConfig {
            content_dir: temp.path().join("site"),
            output_dir: temp.path().join("build"),
        };
        (temp, config)
    }

    #[test]
    fn builds_simple_site() {
        let (_temp, config) = project();
        let site = &config.content_dir;
        write(site, "layout.html", ROOT_LAYOUT);
        write(site, "index.html", "{% block body %}home{% endblock %}");
        write(site, "index.json", r#"{"title": "Home"}"#);
        write(site, "blog/post/index.html", "{% block body %}post{% endblock %}");

        let result = StaticBuilder::new(config.clone()).build().unwrap();

        assert_eq!(result.pages, 2);
        assert_eq!(
            fs::read_to_string(config.output_dir.join("index.html")).unwrap(),
            "<html><title>Home</title>home</html>"
        );
        assert_eq!(
            fs::read_to_string(config.output_dir.join("blog/post/index.html")).unwrap(),
            "<html><title></title>post</html>"
        );
    }

    #[test]
    fn skips_layouts_records_and_private_files() {
        let (_temp, config) = project();
        let site = &config.content_dir;
        write(site, "layout.html", ROOT_LAYOUT);
        write(site, "index.html", r#"{% block body %}{% include "_nav.html" %}{% endblock %}"#);
        write(site, "_nav.html", "<nav></nav>");
        write(site, "notes.md", "# notes");
        write(site, "docs/layout.html", "{% block body %}{% endblock %}");

        let result = StaticBuilder::new(config.clone()).build().unwrap();

        assert_eq!(result.pages, 1);
        let out = &config.output_dir;
        assert!(out.join("index.html").exists());
        assert!(out.join("docs").is_dir());
        assert!(!out.join("layout.html").exists());
        assert!(!out.join("_nav.html").exists());
        assert!(!out.join("notes.md").exists());
        assert!(!out.join("docs/layout.html").exists());
    }

    #[test]
    fn private_directories_are_not_mirrored() {
        let (_temp, config) = project();
        let site = &config.content_dir;
        write(
            site,
            "index.html",
            r#"{% block layout %}{% include "_partials/nav.html" %}{% endblock %}"#,
        );
        write(site, "_partials/nav.html", "<nav></nav>");
        write(site, "_drafts/post/index.html", "{% block layout %}draft{% endblock %}");

        let result = StaticBuilder::new(config.clone()).build().unwrap();

        assert_eq!(result.pages, 1);
        assert_eq!(
            fs::read_to_string(config.output_dir.join("index.html")).unwrap(),
            "<nav></nav>"
        );
        assert!(!config.output_dir.join("_partials").exists());
        assert!(!config.output_dir.join("_drafts").exists());
    }

    #[test]
    fn malformed_metadata_aborts_build() {
        let (_temp, config) = project();
        let site = &config.content_dir;
        write(site, "index.html", "{% block layout %}x{% endblock %}");
        write(site, "index.json", "{ broken");

        let err = StaticBuilder::new(config).build().unwrap_err();

        assert!(matches!(err, BuildError::Metadata(MetadataError::Parse { .. })));
        assert!(err.to_string().contains('/'));
    }

    #[test]
    fn render_failure_aborts_build_with_page_path() {
        let (_temp, config) = project();
        let site = &config.content_dir;
        write(site, "broken/index.html", "{% block body %}no entry{% endblock %}");

        let err = StaticBuilder::new(config).build().unwrap_err();

        match err {
            BuildError::Render(render) => assert_eq!(render.content_path(), "/broken/"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_content_dir_is_an_error() {
        let (_temp, config) = project();

        let err = StaticBuilder::new(config).build().unwrap_err();

        assert!(matches!(err, BuildError::MissingContent(_)));
    }

    #[test]
    fn diagnostics_go_to_the_configured_sink() {
        let (_temp, config) = project();
        let site = &config.content_dir;
        write(
            site,
            "index.html",
            "{% block layout %}[{{ markdown_file('missing.md') }}]{% endblock %}",
        );
        let sink = Arc::new(CollectingSink::new());

        StaticBuilder::with_sink(config.clone(), sink.clone())
            .build()
            .unwrap();

        assert_eq!(
            fs::read_to_string(config.output_dir.join("index.html")).unwrap(),
            "[]"
        );
        let diagnostics = sink.take();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MarkdownFileUnreadable);
    }

    #[test]
    fn nested_output_dir_is_not_walked() {
        let temp = tempdir().unwrap();
        let site = temp.path().join("site");
        write(&site, "index.html", "{% block layout %}x{% endblock %}");
        let config = BuildConfig {
            content_dir: site.clone(),
            output_dir: site.join("out"),
        };

        StaticBuilder::new(config.clone()).build().unwrap();
        let second = StaticBuilder::new(config.clone()).build().unwrap();

        assert_eq!(second.pages, 1);
        assert!(!config.output_dir.join("out").exists());
    }

    #[test]
    fn clean_removes_output() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("build");
        write(&out, "index.html", "x");

        assert!(clean(&out).unwrap());
        assert!(!out.exists());
        assert!(!clean(&out).unwrap());
    }
}
