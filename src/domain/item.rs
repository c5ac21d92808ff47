use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_CREATOR: &str = "Unknown";

/// A display-ready feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub creator: String,
}

impl FeedItem {
    pub fn display_description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn display_date(&self) -> String {
        self.published_at
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    }
}

/// An image declared by feed metadata rather than embedded in markup.
///
/// Variants are listed in resolution priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCandidate {
    /// `media:group/media:content`
    GroupContent(String),
    /// `media:content`
    Content(String),
    /// `media:thumbnail`
    Thumbnail(String),
}

impl MediaCandidate {
    pub fn rank(&self) -> u8 {
        match self {
            MediaCandidate::GroupContent(_) => 0,
            MediaCandidate::Content(_) => 1,
            MediaCandidate::Thumbnail(_) => 2,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            MediaCandidate::GroupContent(url)
            | MediaCandidate::Content(url)
            | MediaCandidate::Thumbnail(url) => url,
        }
    }
}

/// The recognised fields of one upstream `<item>`, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub pub_date: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub content_encoded: Option<String>,
    pub dc_creator: Option<String>,
    pub creator: Option<String>,
    pub media: Vec<MediaCandidate>,
    /// Number of child elements that were not recognised.
    pub ignored_fields: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> FeedItem {
        FeedItem {
            title: "Title".into(),
            link: "https://example.com/a".into(),
            published_at: None,
            description: None,
            image_url: None,
            creator: UNKNOWN_CREATOR.into(),
        }
    }

    #[test]
    fn test_display_description_empty_when_absent() {
        assert_eq!(item().display_description(), "");
    }

    #[test]
    fn test_display_date_formats_timestamp() {
        let mut item = item();
        item.published_at = Some("2024-01-15T10:30:00Z".parse().unwrap());
        assert_eq!(item.display_date(), "2024-01-15 10:30");
    }

    #[test]
    fn test_media_candidate_rank_order() {
        let group = MediaCandidate::GroupContent("a".into());
        let content = MediaCandidate::Content("b".into());
        let thumb = MediaCandidate::Thumbnail("c".into());
        assert!(group.rank() < content.rank());
        assert!(content.rank() < thumb.rank());
        assert_eq!(thumb.url(), "c");
    }
}
