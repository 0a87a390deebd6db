//! Single-column layout backed by an [`OffsetIndex`].

use super::{item_main_size, FillResult, LayoutBase, LayoutParams, ListLayoutManager, OffsetIndex};
use crate::adapter::ListAdapter;
use crate::children::is_visible;
use tracing::trace;

/// One item per line. Starts come from Fenwick prefix sums, and the first
/// visible item from a lower-bound search on the content offset, so no
/// anchor is needed to start a fill.
#[derive(Debug, Clone)]
pub struct LinearLayoutManager {
    base: LayoutBase,
    /// Item extent plus trailing gap, per index
    offsets: OffsetIndex,
    sizes: Vec<f32>,
}

impl LinearLayoutManager {
    /// Create a manager with no items laid out.
    pub fn new(params: LayoutParams) -> Self {
        Self {
            base: LayoutBase::new(LayoutParams {
                span_count: 1,
                ..params
            }),
            offsets: OffsetIndex::new(64),
            sizes: Vec::new(),
        }
    }

    /// Number of laid-out items.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// True if nothing is laid out.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    fn gap(&self) -> f32 {
        self.base.params().main_axis_gap
    }
}

impl ListLayoutManager for LinearLayoutManager {
    fn base(&self) -> &LayoutBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LayoutBase {
        &mut self.base
    }

    fn layout_invalid_item_holder(&mut self, from_index: usize, adapter: &mut dyn ListAdapter) {
        let data_count = adapter.data_count();
        let from_index = from_index.min(self.sizes.len()).min(data_count);
        self.offsets.truncate(from_index);
        self.sizes.truncate(from_index);

        let gap = self.gap();
        let cross_size = self.base.viewport_cross();
        for index in from_index..data_count {
            let size = item_main_size(adapter, index, &self.base);
            let start = self.offsets.total();
            self.offsets.push(size + gap);
            self.sizes.push(size);
            if let Some(holder) = adapter.item_holder_for_index_mut(index) {
                self.base
                    .orientation()
                    .set_frame(holder, start, size, 0.0, cross_size);
            }
            trace!(index, start, size, "Placed item");
        }

        let content_size = self.target_content_size();
        self.base.set_content_size(content_size);
    }

    fn target_content_size(&self) -> f32 {
        if self.sizes.is_empty() {
            0.0
        } else {
            (self.offsets.total() - self.gap()).max(0.0)
        }
    }

    fn item_main_bounds(&self, index: usize) -> Option<(f32, f32)> {
        let size = *self.sizes.get(index)?;
        let start = self.offsets.start_of(index);
        Some((start, start + size))
    }

    fn fill(&self, _anchor_index: Option<usize>) -> FillResult {
        let offset = self.base.content_offset();
        let viewport_main = self.base.viewport_main();
        let edge = self.base.viewport_edge();
        let mut visible = Vec::new();
        if let Some(first) = self.offsets.lower_bound(offset) {
            for index in first..self.sizes.len() {
                let Some((start, end)) = self.item_main_bounds(index) else {
                    break;
                };
                if start >= edge {
                    break;
                }
                if is_visible(start, end, offset, viewport_main) {
                    visible.push(index);
                }
            }
        }
        let preload = self.preload_around(&visible, self.sizes.len());
        FillResult { visible, preload }
    }
}
