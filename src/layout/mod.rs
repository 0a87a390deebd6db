//! Item positioning and viewport fill.
//!
//! A layout manager positions every live holder along the main axis, keeps
//! the scroll extent, and decides which indexes must be bound for the
//! current content offset:
//! - [`StaggeredGridLayoutManager`] for multi-column waterfall lists.
//! - [`LinearLayoutManager`] for single-column lists.

pub mod layout_state;
mod linear;
pub mod offset_index;
pub mod orientation;
mod staggered;

pub use layout_state::LayoutState;
pub use linear::LinearLayoutManager;
pub use offset_index::OffsetIndex;
pub use orientation::ListOrientationHelper;
pub use staggered::StaggeredGridLayoutManager;

use crate::adapter::ListAdapter;
use crate::model::{ListType, Orientation, Size};

/// Global parameters a layout depends on.
///
/// If the current params differ from the last layout's, a full relayout is
/// needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Scroll direction.
    pub orientation: Orientation,
    /// Number of columns; forced to 1 for linear lists.
    pub span_count: usize,
    /// Gap between consecutive items of one column.
    pub main_axis_gap: f32,
    /// Gap between adjacent columns.
    pub cross_axis_gap: f32,
    /// Main-axis size of items with neither a measurement nor an estimate.
    pub default_item_size: f32,
    /// Extra items kept bound beyond each viewport edge.
    pub preload_buffer_count: usize,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            span_count: 1,
            main_axis_gap: 0.0,
            cross_axis_gap: 0.0,
            default_item_size: 100.0,
            preload_buffer_count: 0,
        }
    }
}

/// Indexes a fill pass decided to keep bound, each ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillResult {
    /// Items intersecting the viewport.
    pub visible: Vec<usize>,
    /// Items kept bound beyond the viewport edges.
    pub preload: Vec<usize>,
}

impl FillResult {
    /// Every index of the result, ascending.
    pub fn all(&self) -> Vec<usize> {
        let mut all: Vec<usize> = self.visible.iter().chain(&self.preload).copied().collect();
        all.sort_unstable();
        all.dedup();
        all
    }
}

/// Scroll position and viewport shared by every layout manager.
#[derive(Debug, Clone)]
pub struct LayoutBase {
    params: LayoutParams,
    orientation: ListOrientationHelper,
    viewport: Size,
    content_offset: f32,
    content_size: f32,
}

impl LayoutBase {
    /// Create a base with the given params and an empty viewport.
    pub fn new(params: LayoutParams) -> Self {
        Self {
            orientation: ListOrientationHelper::new(params.orientation),
            params,
            viewport: Size::default(),
            content_offset: 0.0,
            content_size: 0.0,
        }
    }

    /// Layout parameters.
    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    /// Main/cross-axis mapping.
    pub fn orientation(&self) -> &ListOrientationHelper {
        &self.orientation
    }

    /// Viewport size.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Viewport extent along the main axis.
    pub fn viewport_main(&self) -> f32 {
        self.orientation.measurement(self.viewport)
    }

    /// Viewport extent along the cross axis.
    pub fn viewport_cross(&self) -> f32 {
        self.orientation.measurement_in_other(self.viewport)
    }

    /// Current scroll position.
    pub fn content_offset(&self) -> f32 {
        self.content_offset
    }

    /// Scrollable extent from the last layout.
    pub fn content_size(&self) -> f32 {
        self.content_size
    }

    /// Largest reachable content offset.
    pub fn max_content_offset(&self) -> f32 {
        (self.content_size - self.viewport_main()).max(0.0)
    }

    /// Clamp `offset` into the scrollable range.
    pub fn clamp_content_offset(&self, offset: f32) -> f32 {
        offset.clamp(0.0, self.max_content_offset())
    }

    pub(crate) fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub(crate) fn set_content_size(&mut self, content_size: f32) {
        self.content_size = content_size;
    }

    /// Unclamped; callers clamp once content size is known.
    pub(crate) fn set_raw_content_offset(&mut self, offset: f32) {
        self.content_offset = offset;
    }

    /// Main-axis edge of the viewport in content coordinates.
    pub fn viewport_edge(&self) -> f32 {
        self.content_offset + self.viewport_main()
    }
}

/// Positions items and decides what to bind.
pub trait ListLayoutManager {
    /// Shared scroll state.
    fn base(&self) -> &LayoutBase;

    /// Shared scroll state, mutably.
    fn base_mut(&mut self) -> &mut LayoutBase;

    /// Re-position every item from `from_index` to the end of the data set.
    ///
    /// Items before `from_index` keep their positions.
    fn layout_invalid_item_holder(&mut self, from_index: usize, adapter: &mut dyn ListAdapter);

    /// Scrollable extent implied by the current positions.
    fn target_content_size(&self) -> f32;

    /// Main-axis `(start, end)` of the item at `index` from the last layout.
    fn item_main_bounds(&self, index: usize) -> Option<(f32, f32)>;

    /// Indexes to keep bound for the current content offset.
    ///
    /// The fill grows from `anchor_index` when given, otherwise from the
    /// first item intersecting the viewport.
    fn fill(&self, anchor_index: Option<usize>) -> FillResult;

    /// Current scroll position.
    fn content_offset(&self) -> f32 {
        self.base().content_offset()
    }

    /// Scrollable extent from the last layout.
    fn content_size(&self) -> f32 {
        self.base().content_size()
    }

    /// Main/cross-axis mapping.
    fn orientation(&self) -> &ListOrientationHelper {
        self.base().orientation()
    }

    /// Move to `offset`, clamped to the scrollable range. Returns the new offset.
    fn set_content_offset(&mut self, offset: f32) -> f32 {
        let clamped = self.base().clamp_content_offset(offset);
        self.base_mut().set_raw_content_offset(clamped);
        clamped
    }

    /// Scroll by `delta`, clamped. Returns the distance actually moved.
    fn scroll_by(&mut self, delta: f32) -> f32 {
        let before = self.content_offset();
        self.set_content_offset(before + delta) - before
    }

    /// Resize the viewport. The caller relayouts afterwards.
    fn update_viewport(&mut self, viewport: Size) {
        self.base_mut().set_viewport(viewport);
    }

    /// Extend `visible` by the preload buffer on both sides.
    fn preload_around(&self, visible: &[usize], data_count: usize) -> Vec<usize> {
        let buffer = self.base().params().preload_buffer_count;
        let (Some(&first), Some(&last)) = (visible.first(), visible.last()) else {
            return Vec::new();
        };
        let before = first.saturating_sub(buffer)..first;
        let after = (last + 1)..(last + 1 + buffer).min(data_count);
        before
            .chain(after)
            .filter(|index| visible.binary_search(index).is_err())
            .collect()
    }
}

/// Build the layout manager for `list_type`.
pub fn new_layout_manager(list_type: ListType, params: LayoutParams) -> Box<dyn ListLayoutManager> {
    match list_type {
        ListType::Single => Box::new(LinearLayoutManager::new(params)),
        ListType::Waterfall => Box::new(StaggeredGridLayoutManager::new(params)),
    }
}

/// Main-axis size to position the item at `index` with.
pub(crate) fn item_main_size(adapter: &dyn ListAdapter, index: usize, base: &LayoutBase) -> f32 {
    let fallback = base.params().default_item_size;
    match adapter.item_holder_for_index(index) {
        Some(holder) => holder.layout_main_size(base.orientation(), fallback),
        None => adapter
            .list_adapter_helper()
            .estimated_size(index)
            .unwrap_or(fallback),
    }
}
