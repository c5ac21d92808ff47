//! Raw feed items → display-ready [`FeedItem`]s.
//!
//! Field resolution is fixed:
//!
//! - description: first non-empty of `description`, `content`, `content:encoded`
//! - image: `media:group/media:content[0]` → `media:content` → `media:thumbnail`
//!   → first `<img>` embedded in the description
//! - creator: `dc:creator` → `creator` → `"Unknown"`

pub mod image;
pub mod time;

use html_escape::decode_html_entities;
use serde::{Deserialize, Serialize};

use crate::domain::{FeedItem, MediaCandidate, RawItem, UNKNOWN_CREATOR};

pub use image::{extract_embedded_image, resolve_image_url, EmbeddedImage};
pub use time::parse_published;

/// When the first embedded `<img>` is removed from a description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StripPolicy {
    /// Only when that image became the item's `image_url`.
    #[default]
    WhenPromoted,
    /// Whenever one is present, even if declared media won.
    Always,
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    strip_policy: StripPolicy,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strip_policy(strip_policy: StripPolicy) -> Self {
        Self { strip_policy }
    }

    /// Returns `None` for items without a title or link; such items are
    /// dropped silently rather than reported.
    pub fn normalize(&self, raw: RawItem) -> Option<FeedItem> {
        let title = clean_text(raw.title.as_deref())?;
        let link = raw
            .link
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())?
            .to_string();

        let description = [raw.description, raw.content, raw.content_encoded]
            .into_iter()
            .flatten()
            .map(|d| d.trim().to_string())
            .find(|d| !d.is_empty());

        let declared = declared_image(&raw.media);
        let (image_url, description) = match (declared, description) {
            (Some(url), Some(desc)) if self.strip_policy == StripPolicy::Always => {
                let desc = extract_embedded_image(&desc, Some(&link))
                    .map(|found| found.remaining)
                    .unwrap_or(desc);
                (Some(url), Some(desc))
            }
            (Some(url), desc) => (Some(url), desc),
            (None, Some(desc)) => match extract_embedded_image(&desc, Some(&link)) {
                Some(found) => (Some(found.url), Some(found.remaining)),
                None => (None, Some(desc)),
            },
            (None, None) => (None, None),
        };

        let creator = clean_text(raw.dc_creator.as_deref())
            .or_else(|| clean_text(raw.creator.as_deref()))
            .unwrap_or_else(|| UNKNOWN_CREATOR.to_string());

        Some(FeedItem {
            title,
            link,
            published_at: raw.pub_date.as_deref().and_then(parse_published),
            description: description.filter(|d| !d.is_empty()),
            image_url,
            creator,
        })
    }

    /// Normalizes every item, preserving order and skipping validation gaps.
    pub fn normalize_all(&self, items: Vec<RawItem>) -> Vec<FeedItem> {
        let total = items.len();
        let ignored: usize = items.iter().map(|raw| raw.ignored_fields).sum();
        if ignored > 0 {
            tracing::debug!("Ignored {} unrecognised item fields", ignored);
        }
        let normalized: Vec<FeedItem> = items
            .into_iter()
            .filter_map(|raw| self.normalize(raw))
            .collect();
        if normalized.len() < total {
            tracing::debug!(
                "Dropped {} items without title or link",
                total - normalized.len()
            );
        }
        normalized
    }
}

/// Highest-priority declared media URL.
fn declared_image(media: &[MediaCandidate]) -> Option<String> {
    media
        .iter()
        .min_by_key(|candidate| candidate.rank())
        .map(|candidate| candidate.url().to_string())
}

fn clean_text(value: Option<&str>) -> Option<String> {
    let decoded = decode_html_entities(value?.trim()).trim().to_string();
    (!decoded.is_empty()).then_some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::FeedParser;

    fn raw(title: &str, link: &str) -> RawItem {
        RawItem {
            title: Some(title.into()),
            link: Some(link.into()),
            ..RawItem::default()
        }
    }

    #[test]
    fn test_missing_title_or_link_is_dropped() {
        let normalizer = Normalizer::new();
        assert!(normalizer.normalize(raw("", "https://e.com/a")).is_none());
        assert!(normalizer.normalize(raw("Title", "  ")).is_none());
        assert!(normalizer
            .normalize(RawItem {
                link: Some("https://e.com/a".into()),
                ..RawItem::default()
            })
            .is_none());
    }

    #[test]
    fn test_description_falls_back_in_order() {
        let normalizer = Normalizer::new();

        let mut item = raw("T", "https://e.com/a");
        item.description = Some("  ".into());
        item.content = Some("from content".into());
        item.content_encoded = Some("from encoded".into());
        assert_eq!(
            normalizer.normalize(item).unwrap().description.as_deref(),
            Some("from content")
        );

        let mut item = raw("T", "https://e.com/a");
        item.content_encoded = Some("from encoded".into());
        assert_eq!(
            normalizer.normalize(item).unwrap().description.as_deref(),
            Some("from encoded")
        );
    }

    #[test]
    fn test_image_priority_with_all_sources() {
        let mut item = raw("T", "https://e.com/a");
        item.media = vec![
            MediaCandidate::Thumbnail("thumb".into()),
            MediaCandidate::Content("content".into()),
            MediaCandidate::GroupContent("group".into()),
        ];
        item.description = Some(r#"<img src="https://e.com/desc.jpg">text"#.into());

        let normalized = Normalizer::new().normalize(item).unwrap();
        assert_eq!(normalized.image_url.as_deref(), Some("group"));
    }

    #[test]
    fn test_content_beats_thumbnail() {
        let mut item = raw("T", "https://e.com/a");
        item.media = vec![
            MediaCandidate::Content("content".into()),
            MediaCandidate::Thumbnail("thumb".into()),
        ];
        let normalized = Normalizer::new().normalize(item).unwrap();
        assert_eq!(normalized.image_url.as_deref(), Some("content"));
    }

    #[test]
    fn test_description_image_promoted_and_stripped() {
        let mut item = raw("T", "https://e.com/news/1");
        item.description = Some(r#"<img src="/pics/b.jpg"/><br />Story"#.into());

        let normalized = Normalizer::new().normalize(item).unwrap();
        assert_eq!(
            normalized.image_url.as_deref(),
            Some("https://e.com/pics/b.jpg")
        );
        assert_eq!(normalized.description.as_deref(), Some("Story"));
    }

    #[test]
    fn test_declared_thumbnail_wins_over_description_image() {
        let xml = r#"<rss xmlns:media="http://search.yahoo.com/mrss/"><channel><item>
            <title>T</title><link>https://e.com/a</link>
            <media:thumbnail url="A"/>
            <description>&lt;img src="B"/&gt;text</description>
        </item></channel></rss>"#;
        let raw = FeedParser::new().parse(xml).unwrap().items.remove(0);

        let kept = Normalizer::new().normalize(raw.clone()).unwrap();
        assert_eq!(kept.image_url.as_deref(), Some("A"));
        assert_eq!(kept.description.as_deref(), Some(r#"<img src="B"/>text"#));

        let stripped = Normalizer::with_strip_policy(StripPolicy::Always)
            .normalize(raw)
            .unwrap();
        assert_eq!(stripped.image_url.as_deref(), Some("A"));
        assert_eq!(stripped.description.as_deref(), Some("text"));
    }

    #[test]
    fn test_no_image_anywhere() {
        let mut item = raw("T", "https://e.com/a");
        item.description = Some("<p>plain</p>".into());
        let normalized = Normalizer::new().normalize(item).unwrap();
        assert_eq!(normalized.image_url, None);
        assert_eq!(normalized.description.as_deref(), Some("<p>plain</p>"));
    }

    #[test]
    fn test_image_only_description_becomes_absent() {
        let mut item = raw("T", "https://e.com/a");
        item.description = Some(r#"<img src="https://e.com/x.jpg">"#.into());
        let normalized = Normalizer::new().normalize(item).unwrap();
        assert_eq!(normalized.image_url.as_deref(), Some("https://e.com/x.jpg"));
        assert_eq!(normalized.description, None);
    }

    #[test]
    fn test_creator_resolution() {
        let normalizer = Normalizer::new();

        let mut item = raw("T", "https://e.com/a");
        item.creator = Some("Plain".into());
        assert_eq!(normalizer.normalize(item.clone()).unwrap().creator, "Plain");

        item.dc_creator = Some("Dublin &amp; Core".into());
        assert_eq!(
            normalizer.normalize(item).unwrap().creator,
            "Dublin & Core"
        );

        let item = raw("T", "https://e.com/a");
        assert_eq!(normalizer.normalize(item).unwrap().creator, UNKNOWN_CREATOR);
    }

    #[test]
    fn test_published_at_parsed_or_absent() {
        let normalizer = Normalizer::new();

        let mut item = raw("T", "https://e.com/a");
        item.pub_date = Some("Mon, 15 Jan 2024 10:00:00 +0000".into());
        assert!(normalizer.normalize(item).unwrap().published_at.is_some());

        let mut item = raw("T", "https://e.com/a");
        item.pub_date = Some("not a date".into());
        assert!(normalizer.normalize(item).unwrap().published_at.is_none());
    }

    #[test]
    fn test_normalize_all_keeps_order() {
        let items = vec![
            raw("One", "https://e.com/1"),
            raw("", "https://e.com/skip"),
            raw("Two", "https://e.com/2"),
        ];
        let titles: Vec<_> = Normalizer::new()
            .normalize_all(items)
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[test]
    fn test_title_entities_decoded() {
        let normalized = Normalizer::new()
            .normalize(raw("Rock &amp; Roll &#8211; Live", "https://e.com/a"))
            .unwrap();
        assert_eq!(normalized.title, "Rock & Roll \u{2013} Live");
    }
}
