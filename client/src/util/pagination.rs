//! Page-number window for paginated lists.

#[cfg(test)]
#[path = "pagination_test.rs"]
mod pagination_test;

/// Maximum number of page links shown at once.
pub const PAGE_WINDOW: u32 = 5;

/// Up to [`PAGE_WINDOW`] consecutive page numbers centred on `current`,
/// clamped to `1..=total_pages`. Empty when there are no pages.
#[must_use]
pub fn page_numbers(current: u32, total_pages: u32) -> Vec<u32> {
    if total_pages == 0 {
        return Vec::new();
    }
    let half = PAGE_WINDOW / 2;
    let start = current.saturating_sub(half).max(1);
    let end = start.saturating_add(PAGE_WINDOW - 1).min(total_pages);
    let start = end.saturating_sub(PAGE_WINDOW - 1).max(1);
    (start..=end).collect()
}

/// Whether `page` is a valid move away from `current`.
#[must_use]
pub fn is_navigable(page: u32, current: u32, total_pages: u32) -> bool {
    (1..=total_pages).contains(&page) && page != current
}
