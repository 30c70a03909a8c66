use std::collections::HashSet;

use chrono::NaiveDate;

use crate::types::RangeItem;

/// Identity of a dated item: trimmed, lower-cased name plus date.
#[must_use]
pub fn identity_key<T: RangeItem + ?Sized>(item: &T) -> (String, NaiveDate) {
    (item.identity_name().trim().to_lowercase(), item.date())
}

/// Drop items whose identity was already seen, keeping the first occurrence
/// and the original order.
pub fn dedup_by_name_and_date<T: RangeItem>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(identity_key(item)))
        .collect()
}
