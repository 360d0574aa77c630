//! First-index bookkeeping for a paged word list.

/// Clamp the page offset back to the start when it has run past the end of
/// a non-empty collection (e.g. after a filter shrank it).
pub fn calculate_adjusted_first(first: usize, total: usize) -> usize {
    if first >= total && total > 0 { 0 } else { first }
}

pub fn paginate<T>(items: &[T], first: usize, rows: usize) -> &[T] {
    let first = calculate_adjusted_first(first, items.len());
    let end = (first + rows).min(items.len());
    &items[first.min(items.len())..end]
}

/// After a delete the current page may have vanished; step back one page.
pub fn adjust_after_delete(first: usize, rows: usize, total: usize) -> usize {
    if first + 1 >= total {
        first.saturating_sub(rows)
    } else {
        first
    }
}

pub fn adjust_after_add(first: usize, total: usize) -> usize {
    if first >= total { 0 } else { first }
}
