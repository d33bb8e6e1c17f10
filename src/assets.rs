//! Asset discovery in archived pages
//!
//! Only three kinds of reference are followed: stylesheet `<link href>`,
//! `<script src>` and `<img src>`. References are resolved against the page's
//! origin (scheme, host and port of the original site, never the archive).

use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Elements whose reference attribute names an asset
static ASSET_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| {
    Selector::parse(r#"link[rel="stylesheet"], script[src], img[src]"#).ok()
});

/// A reference that could not be turned into an absolute URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedReference {
    /// The attribute value as written in the markup
    pub reference: String,
    /// Why it was skipped
    pub reason: String,
}

/// Assets found on one page
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiscoveredAssets {
    /// Absolute asset URLs in document order, duplicates included
    pub urls: Vec<Url>,
    /// References that failed to resolve
    pub skipped: Vec<SkippedReference>,
}

/// Origin of a page's original URL, as a URL usable for joining
///
/// Returns `None` for URLs with an opaque origin (`data:`, `file:` and the like).
pub fn page_origin(original_url: &str) -> Option<Url> {
    let url = Url::parse(original_url).ok()?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return None;
    }
    Url::parse(&origin.ascii_serialization()).ok()
}

/// Extract the stylesheet, script and image URLs referenced by `html`
///
/// Each non-empty `href` (stylesheet links) or `src` (scripts, images) is
/// resolved against `base_origin`. Repeated references stay repeated. A
/// reference that does not resolve to an `http`/`https` URL is recorded in
/// [`DiscoveredAssets::skipped`] and the rest of the page is still processed.
///
/// ```
/// use url::Url;
/// use wayback_mirror::assets::extract_assets;
///
/// let origin = Url::parse("http://example.com").unwrap();
/// let found = extract_assets(r#"<link rel="stylesheet" href="/s.css">"#, &origin);
/// assert_eq!(found.urls[0].as_str(), "http://example.com/s.css");
/// ```
pub fn extract_assets(html: &str, base_origin: &Url) -> DiscoveredAssets {
    let mut found = DiscoveredAssets::default();
    let Some(selector) = ASSET_SELECTOR.as_ref() else {
        return found;
    };

    let document = Html::parse_document(html);
    for element in document.select(selector) {
        let value = element.value();
        let Some(reference) = [value.attr("href"), value.attr("src")]
            .into_iter()
            .flatten()
            .find(|reference| !reference.is_empty())
        else {
            continue;
        };

        match base_origin.join(reference) {
            Ok(url) if !matches!(url.scheme(), "http" | "https") => {
                found.skipped.push(SkippedReference {
                    reference: reference.to_string(),
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                });
            }
            Ok(mut url) => {
                url.set_fragment(None);
                found.urls.push(url);
            }
            Err(e) => {
                tracing::debug!(
                    reference = %reference,
                    error = %e,
                    "Skipping unresolvable asset reference"
                );
                found.skipped.push(SkippedReference {
                    reference: reference.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    found
}
