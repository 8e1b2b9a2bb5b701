use super::*;

#[test]
fn window_centres_on_current_page() {
    assert_eq!(page_numbers(5, 10), vec![3, 4, 5, 6, 7]);
}

#[test]
fn window_clamps_at_start() {
    assert_eq!(page_numbers(1, 10), vec![1, 2, 3, 4, 5]);
    assert_eq!(page_numbers(2, 10), vec![1, 2, 3, 4, 5]);
}

#[test]
fn window_clamps_at_end() {
    assert_eq!(page_numbers(10, 10), vec![6, 7, 8, 9, 10]);
    assert_eq!(page_numbers(9, 10), vec![6, 7, 8, 9, 10]);
}

#[test]
fn window_shrinks_to_total() {
    assert_eq!(page_numbers(1, 3), vec![1, 2, 3]);
    assert_eq!(page_numbers(1, 1), vec![1]);
}

#[test]
fn no_pages_no_window() {
    assert!(page_numbers(1, 0).is_empty());
}

#[test]
fn navigable_excludes_current_and_out_of_range() {
    assert!(is_navigable(2, 1, 2));
    assert!(!is_navigable(3, 1, 2));
    assert!(!is_navigable(0, 1, 2));
    assert!(!is_navigable(1, 1, 2));
}

#[test]
fn window_at_top_of_range_does_not_overflow() {
    let max = u32::MAX;
    assert_eq!(page_numbers(max, max), vec![max - 4, max - 3, max - 2, max - 1, max]);
}
