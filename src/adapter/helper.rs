//! Derived bookkeeping for the latest data snapshot.

use crate::model::{DiffError, DiffResult};
use std::collections::{BTreeSet, HashMap};

/// Snapshot of the data source as of the last accepted diff.
///
/// Rebuilt wholesale on every [`update_data_source`](Self::update_data_source).
/// Layout and anchor code only read it.
///
/// Besides the raw index lists, the helper resolves each list against the
/// key sequence it refers to, so the adapter can act on keys directly:
/// removals and update sources against the previous keys, insertions and
/// update targets against the new ones.
#[derive(Debug, Clone, Default)]
pub struct ListAdapterHelper {
    item_keys: Vec<String>,
    item_key_map: HashMap<String, usize>,
    estimated_sizes: Vec<Option<f32>>,
    full_spans: BTreeSet<usize>,
    sticky_tops: Vec<usize>,
    sticky_bottoms: Vec<usize>,
    insertions: Vec<usize>,
    removals: Vec<usize>,
    update_from: Vec<usize>,
    update_to: Vec<usize>,
    removed_keys: Vec<String>,
    inserted_keys: Vec<String>,
    updated_keys: Vec<(String, String)>,
}

impl ListAdapterHelper {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with the state described by `diff`.
    ///
    /// # Errors
    ///
    /// Returns the validation error and leaves the snapshot untouched if
    /// `diff` does not fit the current key sequence.
    pub fn update_data_source(&mut self, diff: &DiffResult) -> Result<(), DiffError> {
        diff.validate(self.item_keys.len())?;

        let previous_keys = std::mem::take(&mut self.item_keys);
        self.removed_keys = diff
            .removals
            .iter()
            .map(|&i| previous_keys[i].clone())
            .collect();
        self.updated_keys = diff
            .update_from
            .iter()
            .zip(&diff.update_to)
            .map(|(&from, &to)| (previous_keys[from].clone(), diff.item_keys[to].clone()))
            .collect();
        self.inserted_keys = diff
            .insertions
            .iter()
            .map(|&i| diff.item_keys[i].clone())
            .collect();

        self.item_keys = diff.item_keys.clone();
        self.item_key_map = self
            .item_keys
            .iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), i))
            .collect();
        self.estimated_sizes = (0..self.item_keys.len())
            .map(|i| diff.estimated_size(i))
            .collect();
        self.full_spans = diff.full_spans.iter().copied().collect();
        self.sticky_tops = sorted_unique(&diff.sticky_tops);
        self.sticky_bottoms = sorted_unique(&diff.sticky_bottoms);
        self.insertions = diff.insertions.clone();
        self.removals = diff.removals.clone();
        self.update_from = diff.update_from.clone();
        self.update_to = diff.update_to.clone();
        Ok(())
    }

    /// Ordered item keys.
    pub fn item_keys(&self) -> &[String] {
        &self.item_keys
    }

    /// Key → index lookup.
    pub fn item_key_map(&self) -> &HashMap<String, usize> {
        &self.item_key_map
    }

    /// Per-item size estimates, `None` where unknown.
    pub fn estimated_sizes(&self) -> &[Option<f32>] {
        &self.estimated_sizes
    }

    /// Indices of full-span items.
    pub fn full_spans(&self) -> &BTreeSet<usize> {
        &self.full_spans
    }

    /// Indices of sticky-top items, ascending.
    pub fn sticky_tops(&self) -> &[usize] {
        &self.sticky_tops
    }

    /// Indices of sticky-bottom items, ascending.
    pub fn sticky_bottoms(&self) -> &[usize] {
        &self.sticky_bottoms
    }

    /// Inserted indices of the last diff (new sequence).
    pub fn insertions(&self) -> &[usize] {
        &self.insertions
    }

    /// Removed indices of the last diff (previous sequence).
    pub fn removals(&self) -> &[usize] {
        &self.removals
    }

    /// Update sources of the last diff (previous sequence).
    pub fn update_from(&self) -> &[usize] {
        &self.update_from
    }

    /// Update targets of the last diff (new sequence).
    pub fn update_to(&self) -> &[usize] {
        &self.update_to
    }

    /// Keys removed by the last diff.
    pub fn removed_keys(&self) -> &[String] {
        &self.removed_keys
    }

    /// Keys inserted by the last diff.
    pub fn inserted_keys(&self) -> &[String] {
        &self.inserted_keys
    }

    /// `(previous key, new key)` pairs updated by the last diff.
    pub fn updated_keys(&self) -> &[(String, String)] {
        &self.updated_keys
    }

    /// Number of items in the snapshot.
    pub fn data_count(&self) -> usize {
        self.item_keys.len()
    }

    /// Key at `index`, if in range.
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.item_keys.get(index).map(String::as_str)
    }

    /// Index of `key`, if present.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.item_key_map.get(key).copied()
    }

    /// Size estimate for `index`, if known.
    pub fn estimated_size(&self, index: usize) -> Option<f32> {
        self.estimated_sizes.get(index).copied().flatten()
    }

    /// Whether the item at `index` spans every column.
    pub fn is_full_span(&self, index: usize) -> bool {
        self.full_spans.contains(&index)
    }

    /// Whether the item at `index` sticks to the leading edge.
    pub fn is_sticky_top(&self, index: usize) -> bool {
        self.sticky_tops.binary_search(&index).is_ok()
    }

    /// Whether the item at `index` sticks to the trailing edge.
    pub fn is_sticky_bottom(&self, index: usize) -> bool {
        self.sticky_bottoms.binary_search(&index).is_ok()
    }
}

fn sorted_unique(indices: &[usize]) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}
