//! Scroll anchoring across data-source updates and relayouts.
//!
//! Before a layout pass the anchor manager picks one reference item and
//! records where it sits relative to the viewport. After the pass the
//! content offset is moved so that item lands in the same visual spot.

use crate::adapter::ListAdapter;
use crate::children::ListChildrenHelper;
use crate::layout::ListLayoutManager;
use crate::model::ScrollAlignment;
use tracing::debug;

/// One-shot state of the initial scroll index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialScrollStatus {
    /// No initial scroll index requested.
    #[default]
    Unset,
    /// Requested and not yet applied.
    Set,
    /// Applied; ignored until reset.
    Scrolled,
}

/// Reference item for one layout pass. Never stored long-term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorInfo {
    /// Whether an anchor was found.
    pub valid: bool,
    /// Index of the anchor item.
    pub index: Option<usize>,
    /// Key of the anchor item; the holder itself is looked up, never held.
    pub item_key: Option<String>,
    /// Main-axis start of the anchor item.
    pub start_offset: f32,
    /// Distance from the viewport start to the anchor's start.
    pub start_alignment_delta: f32,
}

impl AnchorInfo {
    /// An anchor that leaves the content offset alone.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Invalidate in place.
    pub fn reset(&mut self) {
        *self = Self::invalid();
    }
}

/// A pending `scrollToPosition` request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollToPositionParam {
    /// Target item index.
    pub index: usize,
    /// Where the item should land in the viewport.
    pub alignment: ScrollAlignment,
    /// Extra distance added to the aligned content offset.
    pub offset: f32,
    /// Animate toward the target instead of jumping.
    pub smooth: bool,
}

/// Chooses and restores the scroll anchor.
#[derive(Debug, Clone, Default)]
pub struct ListAnchorManager {
    initial_scroll_index: Option<usize>,
    initial_scroll_status: InitialScrollStatus,
    scroll_to_position: Option<ScrollToPositionParam>,
    scrolling_target_offset: Option<f32>,
    /// Key and viewport delta of the candidate seen right after the last diff
    diff_anchor_reference: Option<(String, f32)>,
}

impl ListAnchorManager {
    /// Create a manager with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the first layout shows `index` at the viewport start.
    ///
    /// Rejected once the initial scroll already happened.
    pub fn set_initial_scroll_index(&mut self, index: usize) -> bool {
        if self.initial_scroll_status == InitialScrollStatus::Scrolled {
            debug!(index, "Initial scroll index already consumed");
            return false;
        }
        self.initial_scroll_index = Some(index);
        self.initial_scroll_status = InitialScrollStatus::Set;
        true
    }

    /// Forget the initial scroll index so it may be set again.
    pub fn reset_initial_scroll_index(&mut self) {
        self.initial_scroll_index = None;
        self.initial_scroll_status = InitialScrollStatus::Unset;
    }

    /// Current initial-scroll state.
    pub fn initial_scroll_status(&self) -> InitialScrollStatus {
        self.initial_scroll_status
    }

    /// Whether a pending initial scroll index points into the data.
    pub fn is_valid_initial_scroll_index(&self, data_count: usize) -> bool {
        self.initial_scroll_status == InitialScrollStatus::Set
            && self.initial_scroll_index.map_or(false, |index| index < data_count)
    }

    /// Record that the initial scroll happened. Idempotent.
    pub fn mark_scrolled_initial_scroll_index(&mut self) {
        if self.initial_scroll_status == InitialScrollStatus::Set {
            self.initial_scroll_status = InitialScrollStatus::Scrolled;
        }
    }

    /// Queue a scroll-to-position request, replacing any pending one.
    pub fn init_scroll_to_position_param(
        &mut self,
        index: usize,
        alignment: ScrollAlignment,
        offset: f32,
        smooth: bool,
    ) {
        self.scroll_to_position = Some(ScrollToPositionParam {
            index,
            alignment,
            offset,
            smooth,
        });
        self.scrolling_target_offset = None;
    }

    /// The pending scroll-to-position request.
    pub fn scroll_to_position_param(&self) -> Option<&ScrollToPositionParam> {
        self.scroll_to_position.as_ref()
    }

    /// Drop any pending scroll-to-position request.
    pub fn reset_scroll_info(&mut self) {
        self.scroll_to_position = None;
        self.scrolling_target_offset = None;
    }

    /// Content offset the pending request resolves to, from current positions.
    ///
    /// Stores the result for [`smooth_scroll_target`](Self::smooth_scroll_target).
    pub fn calculate_target_scrolling_offset(
        &mut self,
        layout: &dyn ListLayoutManager,
    ) -> Option<f32> {
        let param = self.scroll_to_position?;
        let (start, end) = layout.item_main_bounds(param.index)?;
        let delta = alignment_delta(&param, end - start, layout.base().viewport_main());
        let target = layout.base().clamp_content_offset(start - delta);
        self.scrolling_target_offset = Some(target);
        Some(target)
    }

    /// Whether a smooth scroll with a resolved target is pending.
    pub fn is_valid_smooth_scroll_info(&self) -> bool {
        self.scroll_to_position.map_or(false, |param| param.smooth)
            && self.scrolling_target_offset.is_some()
    }

    /// Offset a pending smooth scroll animates toward.
    pub fn smooth_scroll_target(&self) -> Option<f32> {
        if self.is_valid_smooth_scroll_info() {
            self.scrolling_target_offset
        } else {
            None
        }
    }

    /// Snapshot the anchor candidate right after a diff, before layout.
    pub fn update_diff_anchor_reference(
        &mut self,
        adapter: &dyn ListAdapter,
        layout: &dyn ListLayoutManager,
        children: &ListChildrenHelper,
    ) {
        self.diff_anchor_reference = first_stable_on_screen(adapter, layout, children, None)
            .map(|(key, _, start)| (key, start - layout.content_offset()));
    }

    /// Pick the anchor for the coming layout pass.
    ///
    /// In priority order: a pending non-smooth scroll-to-position request,
    /// a pending initial scroll index, then the first bound, unchanged,
    /// on-screen item other than `exclude_index`.
    pub fn retrieve_anchor_info_before_layout(
        &mut self,
        adapter: &dyn ListAdapter,
        layout: &dyn ListLayoutManager,
        children: &ListChildrenHelper,
        exclude_index: Option<usize>,
    ) -> AnchorInfo {
        let data_count = adapter.data_count();
        let orientation = layout.orientation();
        let default_size = layout.base().params().default_item_size;
        // Only valid for the pass right after its diff, whichever anchor wins.
        let diff_reference = self.diff_anchor_reference.take();

        if let Some(param) = self.scroll_to_position.filter(|param| !param.smooth) {
            self.scroll_to_position = None;
            if param.index < data_count {
                let holder = adapter.item_holder_for_index(param.index);
                let (start, size) = match layout.item_main_bounds(param.index) {
                    Some((start, end)) => (start, end - start),
                    None => (
                        0.0,
                        holder.map_or(default_size, |h| h.layout_main_size(orientation, default_size)),
                    ),
                };
                return AnchorInfo {
                    valid: true,
                    index: Some(param.index),
                    item_key: holder.map(|h| h.item_key().to_string()),
                    start_offset: start,
                    start_alignment_delta: alignment_delta(
                        &param,
                        size,
                        layout.base().viewport_main(),
                    ),
                };
            }
            debug!(index = param.index, data_count, "Scroll target out of range");
        }

        if self.is_valid_initial_scroll_index(data_count) {
            if let Some(index) = self.initial_scroll_index {
                return AnchorInfo {
                    valid: true,
                    index: Some(index),
                    item_key: adapter
                        .item_holder_for_index(index)
                        .map(|h| h.item_key().to_string()),
                    start_offset: layout.item_main_bounds(index).map_or(0.0, |(start, _)| start),
                    start_alignment_delta: 0.0,
                };
            }
        }

        if let Some((key, delta)) = diff_reference {
            let reference = adapter
                .item_holder(&key)
                .filter(|holder| is_stable(holder))
                .and_then(|holder| holder.index().map(|index| (index, holder)))
                .filter(|(index, _)| Some(*index) != exclude_index);
            if let Some((index, holder)) = reference {
                return AnchorInfo {
                    valid: true,
                    index: Some(index),
                    start_offset: orientation.decorated_start(holder),
                    item_key: Some(key),
                    start_alignment_delta: delta,
                };
            }
        }

        match first_stable_on_screen(adapter, layout, children, exclude_index) {
            Some((key, index, start)) => AnchorInfo {
                valid: true,
                index: Some(index),
                item_key: Some(key),
                start_offset: start,
                start_alignment_delta: start - layout.content_offset(),
            },
            None => AnchorInfo::invalid(),
        }
    }

    /// Re-read the anchor's start from the positions of the pass just run.
    pub fn refresh_anchor_after_layout(
        &self,
        anchor: &mut AnchorInfo,
        adapter: &dyn ListAdapter,
        layout: &dyn ListLayoutManager,
    ) {
        if !anchor.valid {
            return;
        }
        let index = match &anchor.item_key {
            Some(key) => adapter.item_holder(key).and_then(|h| h.index()),
            None => anchor.index,
        };
        match index.and_then(|i| layout.item_main_bounds(i).map(|(start, _)| (i, start))) {
            Some((index, start)) => {
                anchor.index = Some(index);
                anchor.start_offset = start;
            }
            None => anchor.reset(),
        }
    }

    /// Move `content_offset` so the anchor keeps its viewport position.
    ///
    /// Leaves the offset untouched for an invalid anchor.
    pub fn adjust_content_offset_with_anchor(&self, anchor: &AnchorInfo, content_offset: &mut f32) {
        if anchor.valid {
            *content_offset = anchor.start_offset - anchor.start_alignment_delta;
        }
    }
}

/// Distance from the viewport start at which `param` wants its item.
fn alignment_delta(param: &ScrollToPositionParam, item_size: f32, viewport_main: f32) -> f32 {
    match param.alignment {
        ScrollAlignment::Start => -param.offset,
        ScrollAlignment::Center => (viewport_main - item_size) / 2.0 - param.offset,
        ScrollAlignment::End => viewport_main - item_size - param.offset,
    }
}

fn is_stable(holder: &crate::adapter::ItemHolder) -> bool {
    holder.is_finished_binding() && !holder.is_removed() && !holder.is_updated()
}

fn first_stable_on_screen(
    adapter: &dyn ListAdapter,
    layout: &dyn ListLayoutManager,
    children: &ListChildrenHelper,
    exclude_index: Option<usize>,
) -> Option<(String, usize, f32)> {
    children.on_screen_children().iter().find_map(|entry| {
        let holder = adapter.item_holder(&entry.item_key)?;
        let index = holder.index()?;
        if !is_stable(holder) || Some(index) == exclude_index {
            return None;
        }
        let start = layout.orientation().decorated_start(holder);
        Some((entry.item_key.clone(), index, start))
    })
}
