//! HTML tag rendering for resolved assets.
//!
//! Server-rendered templates usually want `<script>`/`<link>` markup rather
//! than raw URLs; these helpers render it. URLs are attribute-escaped;
//! `attrs` is caller-supplied markup and is inserted verbatim.

use webpack_stats_core::Asset;

use crate::cache::StatsCache;
use crate::config::LoaderConfig;
use crate::error::Result;
use crate::loader::Loader;
use crate::store::AssetStore;

/// Renders the HTML tag for one asset.
///
/// `.js` files become `<script>` tags, `.css` files become stylesheet
/// `<link>` tags; anything else (fonts, images, maps that survived the
/// ignore list) returns `None`.
///
/// # Examples
///
/// ```
/// use webpack_stats_core::Asset;
/// use webpack_stats_loader::asset_tag;
///
/// let asset = Asset {
///     name: "main.js".into(),
///     url: "/static/webpack_bundles/main.js".into(),
///     extra: serde_json::Map::new(),
/// };
/// assert_eq!(
///     asset_tag(&asset, "").as_deref(),
///     Some(r#"<script src="/static/webpack_bundles/main.js"></script>"#)
/// );
/// assert_eq!(
///     asset_tag(&asset, "defer").as_deref(),
///     Some(r#"<script src="/static/webpack_bundles/main.js" defer></script>"#)
/// );
/// ```
pub fn asset_tag(asset: &Asset, attrs: &str) -> Option<String> {
    let url = escape_attr(&asset.url);
    if asset.name.ends_with(".js") {
        Some(if attrs.is_empty() {
            format!(r#"<script src="{url}"></script>"#)
        } else {
            format!(r#"<script src="{url}" {attrs}></script>"#)
        })
    } else if asset.name.ends_with(".css") {
        Some(if attrs.is_empty() {
            format!(r#"<link rel="stylesheet" href="{url}"/>"#)
        } else {
            format!(r#"<link rel="stylesheet" href="{url}" {attrs}/>"#)
        })
    } else {
        None
    }
}

/// Renders the newline-joined tags for a bundle.
///
/// Resolves the bundle through `loader` (so debug-mode polling and all
/// failure modes of [`Loader::get_bundle`] apply), then renders one tag per
/// taggable asset, optionally restricted to one file extension.
pub fn render_bundle<S: AssetStore, C: StatsCache>(
    loader: &Loader<S, C>,
    bundle_name: &str,
    extension: Option<&str>,
    attrs: &str,
    config: &LoaderConfig,
) -> Result<String> {
    let assets = loader.get_files(bundle_name, extension, config)?;
    let tags: Vec<String> = assets.iter().filter_map(|a| asset_tag(a, attrs)).collect();
    Ok(tags.join("\n"))
}

/// Escapes a string for use inside a double-quoted HTML attribute.
fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn asset(name: &str, url: &str) -> Asset {
        Asset {
            name: name.into(),
            url: url.into(),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_script_tag() {
        let tag = asset_tag(&asset("main.js", "/static/main.js"), "").unwrap();
        assert_eq!(tag, r#"<script src="/static/main.js"></script>"#);
    }

    #[test]
    fn test_link_tag_with_attrs() {
        let tag = asset_tag(&asset("styles.css", "/static/styles.css"), "media=\"print\"").unwrap();
        assert_eq!(
            tag,
            r#"<link rel="stylesheet" href="/static/styles.css" media="print"/>"#
        );
    }

    #[test]
    fn test_untaggable_asset() {
        assert!(asset_tag(&asset("logo.png", "/static/logo.png"), "").is_none());
    }

    #[test]
    fn test_url_is_escaped() {
        let tag = asset_tag(&asset("main.js", "/static/main.js?v=\"1\"&x=2"), "").unwrap();
        assert_eq!(
            tag,
            r#"<script src="/static/main.js?v=&quot;1&quot;&amp;x=2"></script>"#
        );
    }
}
