//! Images embedded in description markup.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// First `<img ... src=...>` plus at most one `<br>` right after it.
static IMG_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))[^>]*>(?:\s*<br\s*/?\s*>)?"#,
    )
    .expect("img pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub url: String,
    /// The description with the image tag (and trailing `<br>`) removed.
    pub remaining: String,
}

/// Finds the first embedded image with a non-empty `src`.
pub fn extract_embedded_image(html: &str, base_url: Option<&str>) -> Option<EmbeddedImage> {
    IMG_TAG.captures_iter(html).find_map(|caps| {
        let src = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))?
            .as_str()
            .trim();
        if src.is_empty() {
            return None;
        }

        let tag = caps.get(0)?;
        let mut remaining = String::with_capacity(html.len());
        remaining.push_str(&html[..tag.start()]);
        remaining.push_str(&html[tag.end()..]);

        Some(EmbeddedImage {
            url: resolve_image_url(src, base_url),
            remaining: remaining.trim().to_string(),
        })
    })
}

/// Resolves `src` against `base_url` when it is relative. Unresolvable
/// sources are returned unchanged.
pub fn resolve_image_url(src: &str, base_url: Option<&str>) -> String {
    if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("data:") {
        return src.to_string();
    }

    match base_url.and_then(|b| Url::parse(b).ok()) {
        Some(base) => base
            .join(src)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| src.to_string()),
        None if src.starts_with("//") => format!("https:{}", src),
        None => src.to_string(),
    }
}
