//! `Link: rel=preload` hints from page metadata.
//!
//! A page lists assets under the `preloads` key of its metadata record:
//!
//! ```json
//! { "preloads": ["/css/site.css", "/js/app.js"] }
//! ```
//!
//! Entries with an unrecognised extension are skipped.

use std::path::Path;

use strata_render::Metadata;

/// Metadata key holding preload URLs.
pub const PRELOADS_KEY: &str = "preloads";

/// The `as=` destination for an asset URL, if its extension is recognised.
pub fn preload_kind(url: &str) -> Option<&'static str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let extension = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();

    match extension.as_str() {
        "js" => Some("script"),
        "css" => Some("style"),
        "png" | "jpg" | "jpeg" | "gif" | "svg" => Some("image"),
        _ => None,
    }
}

/// `Link` header values for every recognised preload entry.
pub fn preload_links(metadata: &Metadata) -> Vec<String> {
    metadata
        .strings(PRELOADS_KEY)
        .into_iter()
        .filter_map(|url| {
            preload_kind(url).map(|kind| format!("<{}>; as={}; rel=preload", url, kind))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(preload_kind("/app.js"), Some("script"));
        assert_eq!(preload_kind("/site.CSS"), Some("style"));
        assert_eq!(preload_kind("/img/logo.svg?v=2"), Some("image"));
        assert_eq!(preload_kind("/font.woff2"), None);
        assert_eq!(preload_kind("/no-extension"), None);
    }

    #[test]
    fn builds_link_values() {
        let metadata = Metadata::from_json(
            r#"{"preloads": ["/site.css", "/font.woff2", 7, "/hero.jpg"]}"#,
        )
        .unwrap();

        assert_eq!(
            preload_links(&metadata),
            vec![
                "</site.css>; as=style; rel=preload".to_string(),
                "</hero.jpg>; as=image; rel=preload".to_string(),
            ]
        );
    }

    #[test]
    fn no_preloads_without_key() {
        assert!(preload_links(&Metadata::new()).is_empty());
    }
}
