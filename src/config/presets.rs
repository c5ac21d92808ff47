use serde::{Deserialize, Serialize};

pub const DEFAULT_FEED_URL: &str = "https://rss.nytimes.com/services/xml/rss/nyt/HomePage.xml";

/// A named feed offered in the feed picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPreset {
    pub label: String,
    pub url: String,
}

impl FeedPreset {
    pub fn new(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            url: url.to_string(),
        }
    }
}

pub fn default_presets() -> Vec<FeedPreset> {
    vec![
        FeedPreset::new("NY Times - Home Page", DEFAULT_FEED_URL),
        FeedPreset::new("BBC News", "http://feeds.bbci.co.uk/news/rss.xml"),
        FeedPreset::new("CNN", "http://rss.cnn.com/rss/edition.rss"),
        FeedPreset::new("BBC Brasil", "http://www.bbc.co.uk/portuguese/index.xml"),
        FeedPreset::new(
            "Gazeta do Povo - Política",
            "https://www.gazetadopovo.com.br/feed/rss/republica.xml",
        ),
        FeedPreset::new(
            "Gazeta do Povo - Economia",
            "https://www.gazetadopovo.com.br/feed/rss/economia.xml",
        ),
        FeedPreset::new(
            "Gazeta do Povo - Opiniões",
            "https://www.gazetadopovo.com.br/feed/rss/opiniao.xml",
        ),
    ]
}

/// Finds a preset by 1-based position or case-insensitive label.
pub fn find_preset<'a>(presets: &'a [FeedPreset], key: &str) -> Option<&'a FeedPreset> {
    if let Ok(n) = key.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| presets.get(i));
    }
    presets
        .iter()
        .find(|p| p.label.eq_ignore_ascii_case(key.trim()))
}
