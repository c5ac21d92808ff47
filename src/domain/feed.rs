use serde::{Deserialize, Serialize};

use crate::domain::{FeedItem, RawItem};

/// Result of parsing one feed document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub channel_image_url: Option<String>,
    pub items: Vec<RawItem>,
}

/// One page of normalized items plus the paging metadata views need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub page_number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub channel_title: Option<String>,
    pub channel_image_url: Option<String>,
}

impl FeedPage {
    pub fn empty() -> Self {
        Self {
            page_number: 1,
            ..Self::default()
        }
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_page_has_no_neighbours() {
        let page = FeedPage::empty();
        assert_eq!(page.page_number, 1);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_middle_page_neighbours() {
        let page = FeedPage {
            page_number: 2,
            total_pages: 3,
            ..FeedPage::default()
        };
        assert!(page.has_next());
        assert!(page.has_previous());
    }
}
