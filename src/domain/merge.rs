//! Deduplicating append of newly extracted items onto a feed's stored items.
use std::collections::HashSet;

use crate::domain::model::SubjectItem;

/// Merges `incoming` into a copy of `existing`, deduplicating by title.
///
/// Existing entries keep their order and are never removed. Incoming items are
/// appended in probe order the first time their title is seen; the title set is
/// updated during the pass, so duplicates inside `incoming` itself are added
/// once. Returns the merged list and the number of items appended.
pub fn merge(existing: &[SubjectItem], incoming: &[SubjectItem]) -> (Vec<SubjectItem>, usize) {
    let mut merged = existing.to_vec();
    let mut seen: HashSet<String> = existing.iter().map(|item| item.title.clone()).collect();
    let mut added = 0usize;

    for item in incoming {
        if seen.insert(item.title.clone()) {
            merged.push(item.clone());
            added += 1;
        }
    }

    (merged, added)
}
