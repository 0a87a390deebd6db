//! The list container: wires adapter, layout, anchor and children together.
//!
//! Per data update:
//!
//! ```text
//! diff ─▶ adapter.update_data_source ─▶ update_item_holder_to_latest
//!      ─▶ anchor.update_diff_anchor_reference ─▶ sweep removed holders
//!      ─▶ anchor.retrieve_anchor_info_before_layout
//!      ─▶ layout.layout_invalid_item_holder ─▶ adjust_content_offset_with_anchor
//!      ─▶ fill ─▶ bind / recycle ─▶ children diff
//! ```
//!
//! Scrolling skips the relayout and only refills.

use crate::adapter::{new_adapter, BoundElement, ElementFactory, ListAdapter, PipelineOptions};
use crate::anchor::{AnchorInfo, ListAnchorManager};
use crate::children::{is_visible, ChildEntry, ListChildrenHelper};
use crate::config::ListConfig;
use crate::layout::{new_layout_manager, FillResult, ListLayoutManager};
use crate::model::{DiffError, DiffResult, ElementId, ScrollAlignment, Size};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, trace};

/// One bound child as the host should render it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedChild {
    /// Item key.
    pub item_key: String,
    /// Index in the current data source.
    pub index: usize,
    /// Element to show.
    pub element: Option<ElementId>,
    /// Main-axis start in content coordinates, after sticky pinning.
    pub main_start: f32,
    /// Main-axis end in content coordinates, after sticky pinning.
    pub main_end: f32,
    /// Cross-axis start.
    pub cross_start: f32,
    /// Cross-axis size.
    pub cross_size: f32,
    /// Pinned to a viewport edge.
    pub sticky: bool,
}

/// What the host scroller needs after an update or scroll.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutOutput {
    /// Scroll position.
    pub content_offset: f32,
    /// Scrollable extent.
    pub content_size: f32,
    /// Keys attached since the previous output.
    pub inserted: Vec<String>,
    /// Keys detached since the previous output.
    pub recycled: Vec<String>,
    /// Bound children, ascending by index.
    pub children: Vec<RenderedChild>,
    /// Offset a pending smooth scroll animates toward.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smooth_scroll_target: Option<f32>,
}

/// A virtualized list bound to one element factory.
pub struct ListContainer<F: ElementFactory> {
    adapter: Box<dyn ListAdapter>,
    layout: Box<dyn ListLayoutManager>,
    anchor: ListAnchorManager,
    children: ListChildrenHelper,
    factory: F,
    pinned: BTreeSet<usize>,
    inserted: Vec<String>,
    recycled: Vec<String>,
}

impl<F: ElementFactory> ListContainer<F> {
    /// Create an empty list.
    pub fn new(list_id: u32, config: &ListConfig, factory: F) -> Self {
        info!(
            list_id,
            list_type = ?config.list_type,
            span_count = config.layout_params().span_count,
            batch = config.enable_batch_render,
            "Creating list container"
        );
        Self {
            adapter: new_adapter(list_id, config.enable_batch_render),
            layout: new_layout_manager(config.list_type, config.layout_params()),
            anchor: ListAnchorManager::new(),
            children: ListChildrenHelper::new(),
            factory,
            pinned: BTreeSet::new(),
            inserted: Vec::new(),
            recycled: Vec::new(),
        }
    }

    /// The adapter owning every holder.
    pub fn adapter(&self) -> &dyn ListAdapter {
        self.adapter.as_ref()
    }

    /// The layout manager.
    pub fn layout(&self) -> &dyn ListLayoutManager {
        self.layout.as_ref()
    }

    /// The anchor manager.
    pub fn anchor_manager(&self) -> &ListAnchorManager {
        &self.anchor
    }

    /// Child bookkeeping.
    pub fn children(&self) -> &ListChildrenHelper {
        &self.children
    }

    /// The element factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The element factory, mutably.
    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    /// Current scroll position.
    pub fn content_offset(&self) -> f32 {
        self.layout.content_offset()
    }

    /// Current scrollable extent.
    pub fn content_size(&self) -> f32 {
        self.layout.content_size()
    }

    /// Resize the viewport and relayout, keeping the anchor in place.
    pub fn update_viewport(&mut self, viewport: Size) {
        self.layout.update_viewport(viewport);
        self.layout_pass(0);
    }

    /// Apply one data-source update and relayout.
    ///
    /// # Errors
    ///
    /// Returns the validation error and changes nothing if the payload does
    /// not fit the current data source.
    pub fn update_data_source(&mut self, diff: &DiffResult) -> Result<(), DiffError> {
        self.adapter.update_data_source(diff)?;
        self.adapter.update_item_holder_to_latest(&mut self.children);
        self.anchor.update_diff_anchor_reference(
            self.adapter.as_ref(),
            self.layout.as_ref(),
            &self.children,
        );
        let swept = self
            .adapter
            .recycle_removed_item_holders(&mut self.children, &mut self.factory);
        debug!(
            data_count = self.adapter.data_count(),
            swept,
            "Applied data-source update"
        );
        self.layout_pass(0);
        Ok(())
    }

    /// Request that the first layout with enough data starts at `index`.
    pub fn set_initial_scroll_index(&mut self, index: usize) -> bool {
        self.anchor.set_initial_scroll_index(index)
    }

    /// Scroll by `delta` and refill. Returns the distance actually moved.
    pub fn scroll_by(&mut self, delta: f32) -> f32 {
        let moved = self.layout.scroll_by(delta);
        trace!(delta, moved, offset = self.layout.content_offset(), "Scrolled");
        self.fill_and_bind(None);
        moved
    }

    /// Bring the item at `index` into view.
    ///
    /// A jump relayouts immediately and returns the new content offset. A
    /// smooth request returns the target the host should animate toward
    /// with [`scroll_by`](Self::scroll_by). `None` if `index` is out of range.
    pub fn scroll_to_position(
        &mut self,
        index: usize,
        alignment: ScrollAlignment,
        offset: f32,
        smooth: bool,
    ) -> Option<f32> {
        if index >= self.adapter.data_count() {
            debug!(index, data_count = self.adapter.data_count(), "Scroll target out of range");
            return None;
        }
        self.anchor
            .init_scroll_to_position_param(index, alignment, offset, smooth);
        if smooth {
            return self
                .anchor
                .calculate_target_scrolling_offset(self.layout.as_ref());
        }
        self.layout_pass(self.adapter.data_count());
        Some(self.layout.content_offset())
    }

    /// Offset a pending smooth scroll animates toward.
    pub fn smooth_scroll_target(&self) -> Option<f32> {
        self.anchor.smooth_scroll_target()
    }

    /// Forget a pending smooth scroll once the host finished animating.
    pub fn finish_smooth_scroll(&mut self) {
        self.anchor.reset_scroll_info();
    }

    /// Apply one asynchronous bind completion.
    ///
    /// If the element's measured size changes its item's extent, the list
    /// relayouts from that item, anchored so visible content does not jump.
    pub fn on_finish_bind(&mut self, element: BoundElement, options: &PipelineOptions) -> bool {
        let watched = options
            .operation_id
            .and_then(|op| self.adapter.pending_index(op))
            .into_iter()
            .collect::<Vec<_>>();
        let applied = self
            .adapter
            .on_finish_bind_item_holder(element, options, &mut self.factory);
        if applied {
            self.after_binds(&watched);
        }
        applied
    }

    /// Apply a batch of completions correlated with `options.operation_ids`.
    pub fn on_finish_bind_batch(
        &mut self,
        elements: &[BoundElement],
        options: &PipelineOptions,
    ) -> usize {
        let watched: Vec<usize> = options
            .operation_ids
            .iter()
            .filter_map(|&op| self.adapter.pending_index(op))
            .collect();
        let applied = self
            .adapter
            .on_finish_bind_item_holders(elements, options, &mut self.factory);
        if applied > 0 {
            self.after_binds(&watched);
        }
        applied
    }

    /// Build the host output, draining the inserted/recycled key lists.
    pub fn take_output(&mut self) -> LayoutOutput {
        let orientation = *self.layout.orientation();
        let offset = self.layout.content_offset();
        let edge = self.layout.base().viewport_edge();
        let children = self
            .window()
            .into_iter()
            .filter_map(|entry| {
                let holder = self.adapter.item_holder_for_index(entry.index)?;
                if !holder.is_bound() {
                    return None;
                }
                let size = orientation.decorated_measurement(holder);
                let mut main_start = orientation.decorated_start(holder);
                let sticky = self.pinned.contains(&entry.index);
                if sticky && holder.sticky_top() && main_start < offset {
                    main_start = offset;
                } else if sticky && holder.sticky_bottom() && main_start + size > edge {
                    main_start = edge - size;
                }
                Some(RenderedChild {
                    item_key: entry.item_key,
                    index: entry.index,
                    element: holder.element(),
                    main_start,
                    main_end: main_start + size,
                    cross_start: orientation.decorated_cross_start(holder),
                    cross_size: orientation.decorated_measurement_in_other(holder),
                    sticky,
                })
            })
            .collect();
        LayoutOutput {
            content_offset: offset,
            content_size: self.layout.content_size(),
            inserted: std::mem::take(&mut self.inserted),
            recycled: std::mem::take(&mut self.recycled),
            children,
            smooth_scroll_target: self.anchor.smooth_scroll_target(),
        }
    }

    /// Relayout from the first completed item whose extent changed, else just refill.
    fn after_binds(&mut self, completed: &[usize]) {
        let orientation = *self.layout.orientation();
        let fallback = self.layout.base().params().default_item_size;
        let changed = completed
            .iter()
            .copied()
            .filter(|&index| {
                let Some(holder) = self.adapter.item_holder_for_index(index) else {
                    return false;
                };
                let laid_out = self.layout.item_main_bounds(index).map(|(start, end)| end - start);
                laid_out != Some(holder.layout_main_size(&orientation, fallback))
            })
            .min();
        match changed {
            Some(from_index) => {
                debug!(from_index, "Measured size changed; relayout");
                self.layout_pass(from_index);
            }
            None => self.fill_and_bind(None),
        }
    }

    /// Anchored relayout from `from_index`, then refill.
    fn layout_pass(&mut self, from_index: usize) {
        let data_count = self.adapter.data_count();
        let consumes_initial = self.anchor.is_valid_initial_scroll_index(data_count);
        let mut anchor = self.anchor.retrieve_anchor_info_before_layout(
            self.adapter.as_ref(),
            self.layout.as_ref(),
            &self.children,
            None,
        );

        self.layout
            .layout_invalid_item_holder(from_index, self.adapter.as_mut());

        self.anchor
            .refresh_anchor_after_layout(&mut anchor, self.adapter.as_ref(), self.layout.as_ref());
        let mut offset = self.layout.content_offset();
        self.anchor.adjust_content_offset_with_anchor(&anchor, &mut offset);
        let offset = self.layout.set_content_offset(offset);
        trace!(?anchor, offset, "Anchored layout");

        if consumes_initial && anchor.valid {
            self.anchor.mark_scrolled_initial_scroll_index();
        }
        if self.anchor.scroll_to_position_param().is_some() {
            self.anchor
                .calculate_target_scrolling_offset(self.layout.as_ref());
        }
        self.fill_and_bind(self.visible_anchor(&anchor));
    }

    fn visible_anchor(&self, anchor: &AnchorInfo) -> Option<usize> {
        let index = anchor.index.filter(|_| anchor.valid)?;
        let (start, end) = self.layout.item_main_bounds(index)?;
        is_visible(
            start,
            end,
            self.layout.content_offset(),
            self.layout.base().viewport_main(),
        )
        .then_some(index)
    }

    /// Fill the viewport, bind what is needed and recycle what is not.
    fn fill_and_bind(&mut self, anchor_index: Option<usize>) {
        let FillResult { visible, preload } = self.layout.fill(anchor_index);
        let pinned = self.pinned_sticky_indexes();

        let entry = |index: usize| {
            self.adapter
                .list_adapter_helper()
                .key_at(index)
                .map(|key| ChildEntry::new(index, key))
        };
        let preload_entries: Vec<ChildEntry> = preload.iter().filter_map(|&i| entry(i)).collect();
        let sticky_entries: Vec<ChildEntry> = pinned.iter().filter_map(|&i| entry(i)).collect();

        let holders = visible
            .iter()
            .filter_map(|&index| self.adapter.item_holder_for_index(index));
        self.children.update_on_screen_children(
            holders,
            self.layout.orientation(),
            self.layout.content_offset(),
            self.layout.base().viewport_main(),
        );
        self.children.set_preload_children(preload_entries);
        self.children.set_sticky_children(sticky_entries);
        self.pinned = pinned;

        let keep: BTreeSet<usize> = visible
            .iter()
            .chain(&preload)
            .chain(&self.pinned)
            .copied()
            .collect();
        let indexes: Vec<usize> = keep.iter().copied().collect();
        let requested = self.adapter.bind_item_holders(&indexes, &mut self.factory);

        let departed: Vec<String> = self
            .adapter
            .item_holder_map()
            .values()
            .filter(|holder| holder.is_binding() || holder.element().is_some())
            .filter(|holder| holder.index().map_or(true, |index| !keep.contains(&index)))
            .map(|holder| holder.item_key().to_string())
            .collect();
        for key in &departed {
            self.adapter.recycle_item_holder(key, &mut self.factory);
            self.children.detach_child(key);
        }

        for &index in &indexes {
            if let Some(holder) = self.adapter.item_holder_for_index(index) {
                match holder.element().filter(|_| holder.is_bound()) {
                    Some(element) => {
                        self.children.attach_child(holder.item_key(), element);
                    }
                    None => {
                        self.children.detach_child(holder.item_key());
                    }
                }
            }
        }

        let (inserted, recycled) = (&mut self.inserted, &mut self.recycled);
        self.children.handle_layout_or_scroll_result(
            |key| inserted.push(key.to_string()),
            |key| recycled.push(key.to_string()),
            |_| {},
        );
        trace!(
            visible = visible.len(),
            preload = preload.len(),
            requested,
            recycled = departed.len(),
            "Filled viewport"
        );
    }

    /// Sticky items that must stay bound because they are pinned.
    ///
    /// The last sticky-top item above the viewport start and the first
    /// sticky-bottom item below the viewport end.
    fn pinned_sticky_indexes(&self) -> BTreeSet<usize> {
        let offset = self.layout.content_offset();
        let edge = self.layout.base().viewport_edge();
        let top = self
            .adapter
            .sticky_tops()
            .iter()
            .rev()
            .copied()
            .find(|&index| {
                self.layout
                    .item_main_bounds(index)
                    .map_or(false, |(start, _)| start < offset)
            });
        let bottom = self.adapter.sticky_bottoms().iter().copied().find(|&index| {
            self.layout
                .item_main_bounds(index)
                .map_or(false, |(_, end)| end > edge)
        });
        top.into_iter().chain(bottom).collect()
    }

    /// Every child of the current window, ascending by index.
    fn window(&self) -> Vec<ChildEntry> {
        let window: BTreeSet<ChildEntry> = self
            .children
            .on_screen_children()
            .iter()
            .chain(self.children.preload_children())
            .chain(self.children.sticky_children())
            .cloned()
            .collect();
        window.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::QueuedElementFactory;
    use crate::model::ListType;

    fn config(list_type: ListType, span_count: usize) -> ListConfig {
        ListConfig {
            list_type,
            span_count,
            ..ListConfig::default()
        }
    }

    fn keys(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("item-{i}")).collect()
    }

    fn container(list_type: ListType, span_count: usize, count: usize) -> ListContainer<QueuedElementFactory> {
        let mut list = ListContainer::new(1, &config(list_type, span_count), QueuedElementFactory::new());
        list.update_viewport(Size::new(300.0, 250.0));
        list.update_data_source(
            &DiffResult::insert_all(keys(count)).with_estimated_sizes(vec![100.0; count]),
        )
        .expect("valid diff");
        list
    }

    /// Complete every queued request with a fresh, unmeasured element.
    fn complete(list: &mut ListContainer<QueuedElementFactory>) -> usize {
        let mut applied = 0;
        for request in list.factory_mut().take_pending() {
            let element = BoundElement::new(list.factory_mut().create_element());
            if list.on_finish_bind(element, &PipelineOptions::single(request.operation_id)) {
                applied += 1;
            }
        }
        applied
    }

    fn child_keys(output: &LayoutOutput) -> Vec<&str> {
        output.children.iter().map(|c| c.item_key.as_str()).collect()
    }

    mod update_cycle {
        use super::*;

        #[test]
        fn first_update_binds_the_first_screen() {
            let mut list = container(ListType::Single, 1, 20);
            let pending: Vec<usize> = list.factory().pending().iter().map(|r| r.index).collect();
            assert_eq!(pending, vec![0, 1, 2], "Only rows intersecting 250px are bound");
            assert_eq!(complete(&mut list), 3);

            let output = list.take_output();
            assert_eq!(child_keys(&output), vec!["item-0", "item-1", "item-2"]);
            assert_eq!(output.inserted.len(), 3);
            assert_eq!(output.content_size, 2000.0);
            assert!(list.take_output().inserted.is_empty(), "Inserted keys are drained");
        }

        #[test]
        fn removed_items_are_swept_and_released() {
            let mut list = container(ListType::Single, 1, 10);
            complete(&mut list);
            let diff = DiffResult {
                item_keys: keys(10)[1..].to_vec(),
                removals: vec![0],
                ..DiffResult::default()
            }
            .with_estimated_sizes(vec![100.0; 9]);
            list.update_data_source(&diff).expect("valid diff");

            assert_eq!(list.adapter().item_holder_map().len(), 9);
            assert!(list.adapter().item_holder("item-0").is_none());
            assert_eq!(list.factory().released().len(), 1, "Swept element goes back");
        }

        #[test]
        fn rejected_diff_changes_nothing() {
            let mut list = container(ListType::Single, 1, 5);
            let bad = DiffResult {
                removals: vec![42],
                ..DiffResult::default()
            };
            assert!(list.update_data_source(&bad).is_err());
            assert_eq!(list.adapter().data_count(), 5);
        }

        #[test]
        fn insertion_above_keeps_visible_content_still() {
            let mut list = container(ListType::Single, 1, 20);
            complete(&mut list);
            list.scroll_by(450.0);
            complete(&mut list);
            let before = list
                .adapter()
                .item_holder("item-5")
                .map(|h| h.top() - list.content_offset());

            let mut new_keys = keys(20);
            new_keys.insert(0, "fresh".to_string());
            let diff = DiffResult {
                item_keys: new_keys,
                insertions: vec![0],
                ..DiffResult::default()
            }
            .with_estimated_sizes(vec![100.0; 21]);
            list.update_data_source(&diff).expect("valid diff");

            let after = list
                .adapter()
                .item_holder("item-5")
                .map(|h| h.top() - list.content_offset());
            assert_eq!(before, after, "Anchor keeps its screen position");
            assert_eq!(list.content_offset(), 550.0);
        }

        #[test]
        fn updated_items_moved_out_of_view_give_their_elements_back() {
            let mut list = container(ListType::Single, 1, 20);
            complete(&mut list);
            let bound: Vec<ElementId> = (0..3)
                .filter_map(|i| list.adapter().item_holder_for_index(i).and_then(|h| h.element()))
                .collect();
            assert_eq!(bound.len(), 3);

            let mut new_keys: Vec<String> = (0..5).map(|i| format!("fresh-{i}")).collect();
            new_keys.extend(keys(20));
            let diff = DiffResult {
                item_keys: new_keys,
                insertions: (0..5).collect(),
                update_from: vec![0, 1, 2],
                update_to: vec![5, 6, 7],
                ..DiffResult::default()
            }
            .with_estimated_sizes(vec![100.0; 25]);
            list.update_data_source(&diff).expect("valid diff");

            assert_eq!(list.content_offset(), 0.0, "No stable anchor, offset stands");
            for element in &bound {
                assert!(list.factory().released().contains(element), "{element:?} released");
            }
            for key in ["item-0", "item-1", "item-2"] {
                let holder = list.adapter().item_holder(key).expect("updated key survives");
                assert!(holder.is_recycled(), "{key} recycled off screen");
                assert_eq!(holder.element(), None);
                assert_eq!(list.children().attached_element(key), None);
            }
        }
    }

    mod scrolling {
        use super::*;

        #[test]
        fn scrolling_recycles_rows_that_leave() {
            let mut list = container(ListType::Single, 1, 20);
            complete(&mut list);
            list.take_output();

            assert_eq!(list.scroll_by(300.0), 300.0);
            complete(&mut list);
            let output = list.take_output();
            assert_eq!(child_keys(&output), vec!["item-3", "item-4", "item-5"]);
            assert_eq!(output.recycled, vec!["item-0", "item-1", "item-2"]);
            assert_eq!(list.factory().released().len(), 3);
        }

        #[test]
        fn scroll_is_clamped() {
            let mut list = container(ListType::Single, 1, 3);
            assert_eq!(list.scroll_by(-20.0), 0.0);
            assert_eq!(list.scroll_by(1000.0), 50.0);
        }

        #[test]
        fn initial_scroll_survives_the_next_relayout() {
            let mut list = container(ListType::Single, 1, 3);
            complete(&mut list);
            assert!(list.set_initial_scroll_index(1));

            let unchanged = DiffResult {
                item_keys: keys(3),
                ..DiffResult::default()
            }
            .with_estimated_sizes(vec![100.0; 3]);
            list.update_data_source(&unchanged).expect("valid diff");
            assert_eq!(list.content_offset(), 50.0, "Initial index clamped to the end");

            list.update_viewport(Size::new(300.0, 250.0));
            assert_eq!(list.content_offset(), 50.0, "Diff-time anchor is not replayed");
        }

        #[test]
        fn jump_to_position_aligns_the_item() {
            let mut list = container(ListType::Single, 1, 20);
            assert_eq!(list.scroll_to_position(8, ScrollAlignment::Start, 0.0, false), Some(800.0));
            assert_eq!(
                list.scroll_to_position(8, ScrollAlignment::End, 0.0, false),
                Some(650.0)
            );
            assert_eq!(list.scroll_to_position(99, ScrollAlignment::Start, 0.0, false), None);
        }

        #[test]
        fn smooth_scroll_reports_a_target() {
            let mut list = container(ListType::Single, 1, 20);
            assert_eq!(list.scroll_to_position(4, ScrollAlignment::Center, 0.0, true), Some(325.0));
            assert_eq!(list.content_offset(), 0.0, "Host animates; nothing moved yet");
            assert_eq!(list.take_output().smooth_scroll_target, Some(325.0));
            list.finish_smooth_scroll();
            assert_eq!(list.smooth_scroll_target(), None);
        }

        #[test]
        fn initial_scroll_index_applies_once() {
            let mut list = ListContainer::new(1, &ListConfig::default(), QueuedElementFactory::new());
            list.update_viewport(Size::new(300.0, 250.0));
            assert!(list.set_initial_scroll_index(5));
            list.update_data_source(&DiffResult::insert_all(keys(20)).with_estimated_sizes(vec![100.0; 20]))
                .expect("valid diff");
            assert_eq!(list.content_offset(), 500.0);
            assert!(!list.set_initial_scroll_index(2), "Already scrolled");
        }
    }

    mod binding {
        use super::*;

        #[test]
        fn measured_size_relayouts_without_moving_the_anchor() {
            let mut list = container(ListType::Single, 1, 20);
            complete(&mut list);
            list.scroll_by(200.0);

            let request = list
                .factory_mut()
                .take_pending()
                .into_iter()
                .find(|r| r.index == 4)
                .expect("row 4 requested");
            let element = BoundElement::measured(list.factory_mut().create_element(), Size::new(300.0, 40.0));
            assert!(list.on_finish_bind(element, &PipelineOptions::single(request.operation_id)));

            assert_eq!(list.layout().item_main_bounds(4), Some((400.0, 440.0)));
            assert_eq!(list.layout().item_main_bounds(5), Some((440.0, 540.0)));
            assert_eq!(list.content_offset(), 200.0);
            assert_eq!(list.content_size(), 1940.0);
        }

        #[test]
        fn stale_completion_is_released() {
            let mut list = container(ListType::Single, 1, 20);
            let stale = list.factory().pending()[0].operation_id;
            list.scroll_by(1000.0);
            let element = BoundElement::new(list.factory_mut().create_element());
            assert!(!list.on_finish_bind(element, &PipelineOptions::single(stale)));
            assert!(list.factory().released().contains(&element.id));
        }

        #[test]
        fn batch_render_dispatches_once_per_pass() {
            let config = ListConfig {
                enable_batch_render: true,
                ..ListConfig::default()
            };
            let mut list = ListContainer::new(1, &config, QueuedElementFactory::new());
            list.update_viewport(Size::new(300.0, 250.0));
            list.update_data_source(&DiffResult::insert_all(keys(10)).with_estimated_sizes(vec![100.0; 10]))
                .expect("valid diff");
            assert_eq!(list.factory().dispatches(), 1);

            let requests = list.factory_mut().take_pending();
            let elements: Vec<BoundElement> = requests
                .iter()
                .map(|_| BoundElement::new(list.factory_mut().create_element()))
                .collect();
            let options = PipelineOptions::batch(requests.iter().map(|r| r.operation_id).collect());
            assert_eq!(list.on_finish_bind_batch(&elements, &options), 3);
            assert_eq!(list.take_output().children.len(), 3);
        }
    }

    mod sticky {
        use super::*;

        #[test]
        fn sticky_top_is_pinned_while_scrolled_past() {
            let mut list = container(ListType::Single, 1, 20);
            let diff = DiffResult {
                item_keys: keys(20),
                sticky_tops: vec![0, 4],
                ..DiffResult::default()
            }
            .with_estimated_sizes(vec![100.0; 20]);
            list.update_data_source(&diff).expect("valid diff");
            complete(&mut list);

            list.scroll_by(650.0);
            complete(&mut list);
            let output = list.take_output();
            let pinned: Vec<&RenderedChild> = output.children.iter().filter(|c| c.sticky).collect();
            assert_eq!(pinned.len(), 1);
            assert_eq!(pinned[0].item_key, "item-4");
            assert_eq!(pinned[0].main_start, 650.0, "Pinned at the viewport start");
        }

        #[test]
        fn sticky_bottom_is_pinned_until_reached() {
            let mut list = container(ListType::Single, 1, 20);
            let diff = DiffResult {
                item_keys: keys(20),
                sticky_bottoms: vec![10],
                ..DiffResult::default()
            }
            .with_estimated_sizes(vec![100.0; 20]);
            list.update_data_source(&diff).expect("valid diff");
            complete(&mut list);
            let output = list.take_output();
            let pinned = output
                .children
                .iter()
                .find(|c| c.sticky)
                .expect("sticky bottom pinned");
            assert_eq!((pinned.index, pinned.main_start, pinned.main_end), (10, 150.0, 250.0));
        }
    }

    mod waterfall {
        use super::*;

        #[test]
        fn two_columns_bind_both_sides() {
            let mut list = container(ListType::Waterfall, 2, 20);
            let pending: Vec<usize> = list.factory().pending().iter().map(|r| r.index).collect();
            assert_eq!(pending, vec![0, 1, 2, 3, 4, 5]);
            complete(&mut list);
            let output = list.take_output();
            let columns: Vec<f32> = output.children.iter().map(|c| c.cross_start).collect();
            assert_eq!(columns, vec![0.0, 150.0, 0.0, 150.0, 0.0, 150.0]);
        }
    }
}
