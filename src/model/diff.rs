//! Diff payload produced upstream and consumed by the list adapter.

use super::error::DiffError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One data-source update, as computed by the diff collaborator.
///
/// # Index spaces
/// - `removals` and `update_from` index the *previous* key sequence.
/// - `insertions`, `update_to`, the size lists and the metadata sets index
///   the *new* sequence in `item_keys`.
///
/// Negative estimated sizes mean "unknown".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffResult {
    /// Ordered item keys of the new data snapshot.
    #[serde(rename = "itemkeys")]
    pub item_keys: Vec<String>,

    /// New-sequence indices of inserted items.
    pub insertions: Vec<usize>,

    /// Previous-sequence indices of removed items.
    pub removals: Vec<usize>,

    /// Previous-sequence indices of items whose content changed.
    #[serde(rename = "updateFrom")]
    pub update_from: Vec<usize>,

    /// New-sequence indices paired positionally with `update_from`.
    #[serde(rename = "updateTo")]
    pub update_to: Vec<usize>,

    /// Estimated item heights.
    #[serde(rename = "estimatedHeightPx")]
    pub estimated_height_px: Vec<f32>,

    /// Estimated item sizes along the main axis. Preferred over heights.
    #[serde(rename = "estimatedMainAxisSizePx")]
    pub estimated_main_axis_size_px: Vec<f32>,

    /// Indices of items spanning every column.
    #[serde(rename = "fullspan")]
    pub full_spans: Vec<usize>,

    /// Indices of items pinned to the leading edge.
    #[serde(rename = "stickyTop")]
    pub sticky_tops: Vec<usize>,

    /// Indices of items pinned to the trailing edge.
    #[serde(rename = "stickyBottom")]
    pub sticky_bottoms: Vec<usize>,
}

impl DiffResult {
    /// Parse a payload from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::Json`] if the text is not a valid payload.
    pub fn from_json(text: &str) -> Result<Self, DiffError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Payload for an initial load: every key is an insertion.
    pub fn insert_all<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let item_keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        Self {
            insertions: (0..item_keys.len()).collect(),
            item_keys,
            ..Self::default()
        }
    }

    /// Attach main-axis size estimates.
    pub fn with_estimated_sizes(mut self, sizes: Vec<f32>) -> Self {
        self.estimated_main_axis_size_px = sizes;
        self
    }

    /// Attach the full-span index set.
    pub fn with_full_spans(mut self, full_spans: Vec<usize>) -> Self {
        self.full_spans = full_spans;
        self
    }

    /// Number of items in the new snapshot.
    pub fn item_count(&self) -> usize {
        self.item_keys.len()
    }

    /// Best available size estimate for the item at `index`, if known.
    pub fn estimated_size(&self, index: usize) -> Option<f32> {
        let known = |v: Option<&f32>| v.copied().filter(|size| *size >= 0.0);
        known(self.estimated_main_axis_size_px.get(index))
            .or_else(|| known(self.estimated_height_px.get(index)))
    }

    /// Check the payload against the length of the previous key sequence.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found: mismatched update pairs,
    /// duplicate keys, or an index outside the sequence it refers to.
    pub fn validate(&self, previous_len: usize) -> Result<(), DiffError> {
        if self.update_from.len() != self.update_to.len() {
            return Err(DiffError::UpdatePairMismatch {
                from: self.update_from.len(),
                to: self.update_to.len(),
            });
        }

        let mut seen = HashSet::with_capacity(self.item_keys.len());
        for key in &self.item_keys {
            if !seen.insert(key.as_str()) {
                return Err(DiffError::DuplicateKey(key.clone()));
            }
        }

        let new_len = self.item_keys.len();
        let checks: [(&'static str, &[usize], usize); 7] = [
            ("insertions", &self.insertions, new_len),
            ("removals", &self.removals, previous_len),
            ("updateFrom", &self.update_from, previous_len),
            ("updateTo", &self.update_to, new_len),
            ("fullspan", &self.full_spans, new_len),
            ("stickyTop", &self.sticky_tops, new_len),
            ("stickyBottom", &self.sticky_bottoms, new_len),
        ];
        for (field, indices, len) in checks {
            if let Some(&index) = indices.iter().find(|&&i| i >= len) {
                return Err(DiffError::IndexOutOfRange { field, index, len });
            }
        }
        Ok(())
    }
}
