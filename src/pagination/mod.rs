//! 1-indexed, fixed-size pagination shared by the feed and station views.
//!
//! [`page`] never clamps; callers clamp with [`clamp_page`] against
//! [`total_pages`] first, and again whenever the list length changes.

/// Number of pages needed for `len` items, `ceil(len / page_size)`.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Clamps `page_number` into `[1, total_pages]`. With no pages the result is 1.
pub fn clamp_page(page_number: usize, total_pages: usize) -> usize {
    page_number.clamp(1, total_pages.max(1))
}

/// Items on page `page_number`. Pages outside `[1, total_pages]` are empty.
pub fn page<T>(items: &[T], page_number: usize, page_size: usize) -> &[T] {
    if page_number == 0 || page_size == 0 {
        return &[];
    }
    let start = match (page_number - 1).checked_mul(page_size) {
        Some(start) if start < items.len() => start,
        _ => return &[],
    };
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(1, 5), 1);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
        assert_eq!(total_pages(100, 0), 0);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(2, 3), 2);
        assert_eq!(clamp_page(9, 3), 3);
        assert_eq!(clamp_page(4, 0), 1);
    }

    #[test]
    fn test_page_slices() {
        let items: Vec<u32> = (1..=12).collect();
        assert_eq!(page(&items, 1, 5), &[1, 2, 3, 4, 5]);
        assert_eq!(page(&items, 3, 5), &[11, 12]);
    }

    #[test]
    fn test_out_of_range_pages_are_empty() {
        let items: Vec<u32> = (1..=12).collect();
        assert!(page(&items, 0, 5).is_empty());
        assert!(page(&items, 4, 5).is_empty());
        assert!(page(&items, usize::MAX, 5).is_empty());
        assert!(page(&items, 1, 0).is_empty());
        assert!(page::<u32>(&[], 1, 5).is_empty());
    }

    #[test]
    fn test_clamped_page_never_exceeds_items() {
        let items: Vec<u32> = (1..=7).collect();
        let pages = total_pages(items.len(), 3);
        for requested in 0..10 {
            let slice = page(&items, clamp_page(requested, pages), 3);
            assert!(!slice.is_empty());
            assert!(slice.len() <= 3);
        }
    }
}
