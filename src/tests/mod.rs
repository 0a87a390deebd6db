//! Internal test modules - whitebox tests with crate access
//!
//! Property tests over whole diff sequences and layout passes, plus
//! end-to-end scenarios through the container.

mod scenarios;

use crate::model::DiffResult;
use std::collections::HashSet;

/// Ordered, de-duplicated item keys drawn from a small universe.
pub(crate) fn keys_from(ids: &[u8]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(**id))
        .map(|id| format!("k{id}"))
        .collect()
}

/// Diff from `old` to `new`, marking every surviving key in `updated` as changed.
pub(crate) fn diff_between(old: &[String], new: &[String], updated: &HashSet<String>) -> DiffResult {
    let old_set: HashSet<&String> = old.iter().collect();
    let new_set: HashSet<&String> = new.iter().collect();
    let removals = (0..old.len()).filter(|&i| !new_set.contains(&old[i])).collect();
    let insertions = (0..new.len()).filter(|&i| !old_set.contains(&new[i])).collect();
    let mut update_from = Vec::new();
    let mut update_to = Vec::new();
    for (to, key) in new.iter().enumerate() {
        if !updated.contains(key) {
            continue;
        }
        if let Some(from) = old.iter().position(|k| k == key) {
            update_from.push(from);
            update_to.push(to);
        }
    }
    DiffResult {
        item_keys: new.to_vec(),
        insertions,
        removals,
        update_from,
        update_to,
        ..DiffResult::default()
    }
}
