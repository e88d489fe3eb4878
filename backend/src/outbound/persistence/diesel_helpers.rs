//! Shared helpers for Diesel repository implementations.

use diesel::sql_types::Text;

use crate::domain::PageRequest;

diesel::define_sql_function! {
    /// SQL `lower()` for case-insensitive comparisons.
    fn lower(value: Text) -> Text;
}

/// `LIKE` pattern matching `term` anywhere, with wildcards escaped.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Offset and limit of a page as SQL integers.
pub fn page_bounds(page: PageRequest) -> (i64, i64) {
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (offset, i64::from(page.limit()))
}

/// Convert a SQL count into the unsigned counters used by the domain.
pub fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}
