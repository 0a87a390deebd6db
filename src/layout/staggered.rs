//! Greedy multi-column ("waterfall") layout.

use super::{item_main_size, FillResult, LayoutBase, LayoutParams, LayoutState, ListLayoutManager};
use crate::adapter::ListAdapter;
use crate::children::is_visible;
use crate::model::LayoutDirection;
use tracing::trace;

/// Where one item landed. `column` is `None` for full-span items.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    column: Option<usize>,
    start: f32,
    end: f32,
}

/// Staggered grid: each item goes to the currently shortest column.
///
/// # Column arenas
///
/// `column_indexes[c]` lists, ascending, the indexes placed in column `c`.
/// A full-span item appears in every column's arena. Arenas hold indexes
/// only, so they stay valid while holders are recycled.
#[derive(Debug, Clone)]
pub struct StaggeredGridLayoutManager {
    base: LayoutBase,
    span_count: usize,
    column_indexes: Vec<Vec<usize>>,
    column_ends: Vec<f32>,
    placements: Vec<Placement>,
}

impl StaggeredGridLayoutManager {
    /// Create a manager with no items laid out.
    pub fn new(params: LayoutParams) -> Self {
        let span_count = params.span_count.max(1);
        Self {
            base: LayoutBase::new(params),
            span_count,
            column_indexes: vec![Vec::new(); span_count],
            column_ends: vec![0.0; span_count],
            placements: Vec::new(),
        }
    }

    /// Number of columns.
    pub fn span_count(&self) -> usize {
        self.span_count
    }

    /// Per-column arenas from the last layout.
    pub fn column_indexes(&self) -> &[Vec<usize>] {
        &self.column_indexes
    }

    /// Running main-axis size of each column.
    pub fn column_ends(&self) -> &[f32] {
        &self.column_ends
    }

    /// Whether the item at `index` was laid out across every column.
    pub fn is_full_span(&self, index: usize) -> bool {
        self.placements
            .get(index)
            .map_or(false, |placement| placement.column.is_none())
    }

    /// Cross-axis size of one column.
    pub fn column_width(&self) -> f32 {
        let params = self.base.params();
        let gaps = params.cross_axis_gap * (self.span_count - 1) as f32;
        ((self.base.viewport_cross() - gaps) / self.span_count as f32).max(0.0)
    }

    /// Whether filling toward the end should continue with `next_index`.
    ///
    /// A full-span item, at the boundary or next, needs every column short
    /// of the viewport edge; otherwise any short column suffices.
    pub fn has_remain_space_to_fill_end(&self, next_index: usize, state: &LayoutState) -> bool {
        let edge = self.base.viewport_edge();
        if state.is_end_full_span || self.is_full_span(next_index) {
            state.end_lines.iter().all(|&line| line < edge)
        } else {
            state.end_lines.iter().any(|&line| line < edge)
        }
    }

    /// Whether filling toward the start should continue.
    pub fn has_remain_space_to_fill_start(&self, state: &LayoutState) -> bool {
        let offset = self.base.content_offset();
        if state.is_start_full_span {
            state.start_lines.iter().all(|&line| line > offset)
        } else {
            state.start_lines.iter().any(|&line| line > offset)
        }
    }

    /// Next index to place above the current start boundary.
    ///
    /// A full-span item is only returned once every column reaches it, so it
    /// is never placed across a partial boundary.
    pub fn find_next_index_to_fill_start(&self, state: &LayoutState) -> Option<usize> {
        if state.is_start_full_span {
            let first = *state.start_index.first()?;
            if first == 0 || state.start_index.iter().any(|&index| index != first) {
                return None;
            }
            return Some(first - 1);
        }

        let data_count = self.placements.len();
        let candidates: Vec<Option<usize>> = self
            .column_indexes
            .iter()
            .zip(&state.start_index)
            .map(|(column, &target)| {
                if target >= data_count {
                    column.last().copied().filter(|&last| self.ends_after_offset(last))
                } else {
                    self.get_item_index_before_target_index(column, target)
                }
            })
            .collect();

        let full_span = candidates
            .iter()
            .flatten()
            .copied()
            .find(|&index| self.is_full_span(index));
        if let Some(full_span) = full_span {
            if candidates.iter().all(|&candidate| candidate == Some(full_span)) {
                return Some(full_span);
            }
        }
        candidates
            .iter()
            .flatten()
            .copied()
            .filter(|&index| !self.is_full_span(index))
            .min()
    }

    /// Predecessor of `target_index` within one column arena.
    ///
    /// `None` if `target_index` is the column's first entry, is not in the
    /// column, or its predecessor is already scrolled past.
    pub fn get_item_index_before_target_index(
        &self,
        column: &[usize],
        target_index: usize,
    ) -> Option<usize> {
        let position = column.binary_search(&target_index).ok()?;
        let previous = *column.get(position.checked_sub(1)?)?;
        self.ends_after_offset(previous).then_some(previous)
    }

    fn ends_after_offset(&self, index: usize) -> bool {
        self.placements
            .get(index)
            .map_or(false, |placement| placement.end >= self.base.content_offset())
    }

    fn reset_columns(&mut self) {
        self.column_indexes = vec![Vec::new(); self.span_count];
        self.column_ends = vec![0.0; self.span_count];
        self.placements.clear();
    }

    /// Forget placements from `from_index` on.
    fn truncate(&mut self, from_index: usize) {
        if from_index == 0 {
            self.reset_columns();
            return;
        }
        self.placements.truncate(from_index);
        for (column, end) in self.column_indexes.iter_mut().zip(&mut self.column_ends) {
            let keep = column.partition_point(|&index| index < from_index);
            column.truncate(keep);
            *end = match column.last() {
                Some(&last) => self.placements[last].end,
                None => 0.0,
            };
        }
    }

    fn shortest_column(&self) -> usize {
        let mut shortest = 0;
        for (column, &end) in self.column_ends.iter().enumerate() {
            if end < self.column_ends[shortest] {
                shortest = column;
            }
        }
        shortest
    }

    fn place_in_shortest_column(&mut self, index: usize, size: f32) -> Placement {
        let column = self.shortest_column();
        let gap = if self.column_indexes[column].is_empty() {
            0.0
        } else {
            self.base.params().main_axis_gap
        };
        let start = self.column_ends[column] + gap;
        let end = start + size;
        self.column_ends[column] = end;
        self.column_indexes[column].push(index);
        Placement {
            column: Some(column),
            start,
            end,
        }
    }

    fn place_full_span(&mut self, index: usize, size: f32) -> Placement {
        let max_end = self.column_ends.iter().copied().fold(0.0, f32::max);
        let gap = if self.column_indexes.iter().any(|column| !column.is_empty()) {
            self.base.params().main_axis_gap
        } else {
            0.0
        };
        let start = max_end + gap;
        let end = start + size;
        for (column, column_end) in self.column_indexes.iter_mut().zip(&mut self.column_ends) {
            column.push(index);
            *column_end = end;
        }
        Placement {
            column: None,
            start,
            end,
        }
    }

    fn cross_extent(&self, column: Option<usize>) -> (f32, f32) {
        match column {
            None => (0.0, self.base.viewport_cross()),
            Some(column) => {
                let width = self.column_width();
                let gap = self.base.params().cross_axis_gap;
                (column as f32 * (width + gap), width)
            }
        }
    }

    /// Smallest index intersecting the viewport.
    fn first_visible_index(&self) -> Option<usize> {
        let offset = self.base.content_offset();
        let edge = self.base.viewport_edge();
        self.column_indexes
            .iter()
            .filter_map(|column| {
                let position =
                    column.partition_point(|&index| self.placements[index].end <= offset);
                column.get(position).copied()
            })
            .filter(|&index| self.placements[index].start < edge)
            .min()
    }

    fn columns_of(&self, placement: &Placement) -> Vec<usize> {
        match placement.column {
            Some(column) => vec![column],
            None => (0..self.span_count).collect(),
        }
    }
}

impl ListLayoutManager for StaggeredGridLayoutManager {
    fn base(&self) -> &LayoutBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LayoutBase {
        &mut self.base
    }

    fn layout_invalid_item_holder(&mut self, from_index: usize, adapter: &mut dyn ListAdapter) {
        let data_count = adapter.data_count();
        let from_index = from_index.min(self.placements.len()).min(data_count);
        self.truncate(from_index);

        for index in from_index..data_count {
            let size = item_main_size(adapter, index, &self.base);
            let placement = if adapter.list_adapter_helper().is_full_span(index) {
                self.place_full_span(index, size)
            } else {
                self.place_in_shortest_column(index, size)
            };
            let (cross_start, cross_size) = self.cross_extent(placement.column);
            if let Some(holder) = adapter.item_holder_for_index_mut(index) {
                self.base
                    .orientation()
                    .set_frame(holder, placement.start, size, cross_start, cross_size);
            }
            trace!(
                index,
                column = ?placement.column,
                start = placement.start,
                end = placement.end,
                "Placed item"
            );
            self.placements.push(placement);
        }

        let content_size = self.target_content_size();
        self.base.set_content_size(content_size);
    }

    fn target_content_size(&self) -> f32 {
        self.column_ends.iter().copied().fold(0.0, f32::max)
    }

    fn item_main_bounds(&self, index: usize) -> Option<(f32, f32)> {
        self.placements
            .get(index)
            .map(|placement| (placement.start, placement.end))
    }

    fn fill(&self, anchor_index: Option<usize>) -> FillResult {
        let data_count = self.placements.len();
        let anchor = anchor_index
            .filter(|&index| index < data_count)
            .or_else(|| self.first_visible_index());
        let Some(anchor) = anchor else {
            return FillResult::default();
        };
        let offset = self.base.content_offset();
        let viewport_main = self.base.viewport_main();
        let mut visible = Vec::new();

        let mut state = LayoutState::new(self.span_count, LayoutDirection::ToEnd);
        for (column, line) in self.column_indexes.iter().zip(&mut state.end_lines) {
            let before = column.partition_point(|&index| index < anchor);
            *line = match before.checked_sub(1) {
                Some(position) => self.placements[column[position]].end,
                None => 0.0,
            };
        }
        let mut next = anchor;
        while next < data_count && self.has_remain_space_to_fill_end(next, &state) {
            let placement = self.placements[next];
            state.advance_end(
                &self.columns_of(&placement),
                placement.end,
                placement.column.is_none(),
            );
            if is_visible(placement.start, placement.end, offset, viewport_main) {
                visible.push(next);
            }
            next += 1;
        }

        let mut state = LayoutState::new(self.span_count, LayoutDirection::ToStart);
        for (c, column) in self.column_indexes.iter().enumerate() {
            let position = column.partition_point(|&index| index < anchor);
            match column.get(position) {
                Some(&index) => {
                    state.start_index[c] = index;
                    state.start_lines[c] = self.placements[index].start;
                }
                None => {
                    state.start_index[c] = data_count;
                    state.start_lines[c] = column
                        .last()
                        .map_or(0.0, |&last| self.placements[last].end);
                }
            }
        }
        state.is_start_full_span = self.is_full_span(anchor);
        while self.has_remain_space_to_fill_start(&state) {
            let Some(index) = self.find_next_index_to_fill_start(&state) else {
                break;
            };
            let placement = self.placements[index];
            state.advance_start(
                &self.columns_of(&placement),
                index,
                placement.start,
                placement.column.is_none(),
            );
            if is_visible(placement.start, placement.end, offset, viewport_main) {
                visible.push(index);
            }
        }

        visible.sort_unstable();
        visible.dedup();
        let preload = self.preload_around(&visible, data_count);
        FillResult { visible, preload }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{DefaultListAdapter, ListAdapter};
    use crate::children::ListChildrenHelper;
    use crate::model::{DiffResult, Size};

    fn params(span_count: usize, main_axis_gap: f32) -> LayoutParams {
        LayoutParams {
            span_count,
            main_axis_gap,
            ..LayoutParams::default()
        }
    }

    fn adapter_with(sizes: &[f32], full_spans: &[usize]) -> DefaultListAdapter {
        let keys: Vec<String> = (0..sizes.len()).map(|i| format!("item-{i}")).collect();
        let diff = DiffResult::insert_all(keys)
            .with_estimated_sizes(sizes.to_vec())
            .with_full_spans(full_spans.to_vec());
        let mut adapter = DefaultListAdapter::new(1);
        adapter.update_data_source(&diff).expect("valid diff");
        adapter.update_item_holder_to_latest(&mut ListChildrenHelper::new());
        adapter
    }

    fn laid_out(
        sizes: &[f32],
        full_spans: &[usize],
        params: LayoutParams,
        viewport_main: f32,
    ) -> (StaggeredGridLayoutManager, DefaultListAdapter) {
        let mut adapter = adapter_with(sizes, full_spans);
        let mut manager = StaggeredGridLayoutManager::new(params);
        manager.update_viewport(Size::new(300.0, viewport_main));
        manager.layout_invalid_item_holder(0, &mut adapter);
        (manager, adapter)
    }

    fn render_arenas(manager: &StaggeredGridLayoutManager) -> String {
        manager
            .column_indexes()
            .iter()
            .enumerate()
            .map(|(c, column)| {
                let indexes: Vec<String> = column.iter().map(ToString::to_string).collect();
                format!("col {c}: {}", indexes.join(" "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    mod placement {
        use super::*;

        #[test]
        fn items_go_to_the_shortest_column() {
            let (manager, _) = laid_out(&[100.0, 50.0, 80.0, 60.0, 70.0], &[], params(2, 0.0), 500.0);
            insta::assert_snapshot!(render_arenas(&manager), @r"
            col 0: 0 3
            col 1: 1 2 4
            ");
            assert_eq!(manager.column_ends(), &[160.0, 200.0]);
            assert_eq!(manager.target_content_size(), 200.0);
        }

        #[test]
        fn ties_go_to_the_lowest_column() {
            let (manager, _) = laid_out(&[10.0, 10.0, 10.0, 10.0], &[], params(3, 0.0), 500.0);
            assert_eq!(manager.column_indexes(), &[vec![0, 3], vec![1], vec![2]]);
        }

        #[test]
        fn full_span_item_synchronises_every_column() {
            let (manager, _) =
                laid_out(&[100.0, 50.0, 30.0, 40.0], &[2], params(2, 0.0), 500.0);
            assert_eq!(manager.item_main_bounds(2), Some((100.0, 130.0)));
            assert_eq!(manager.column_indexes(), &[vec![0, 2, 3], vec![1, 2]]);
            assert_eq!(manager.item_main_bounds(3), Some((130.0, 170.0)));
            assert!(manager.is_full_span(2));
        }

        #[test]
        fn gaps_separate_items_within_a_column() {
            let (manager, _) = laid_out(&[100.0, 50.0, 80.0], &[], params(2, 10.0), 500.0);
            assert_eq!(manager.item_main_bounds(0), Some((0.0, 100.0)));
            assert_eq!(manager.item_main_bounds(1), Some((0.0, 50.0)));
            assert_eq!(manager.item_main_bounds(2), Some((60.0, 140.0)));
        }

        #[test]
        fn frames_are_written_to_holders() {
            let params = LayoutParams {
                cross_axis_gap: 20.0,
                ..params(2, 0.0)
            };
            let (manager, adapter) = laid_out(&[100.0, 50.0, 30.0], &[2], params, 500.0);
            assert_eq!(manager.column_width(), 140.0);
            let second = adapter.item_holder_for_index(1).expect("holder 1");
            assert_eq!((second.left(), second.top()), (160.0, 0.0));
            assert_eq!((second.width(), second.height()), (140.0, 50.0));
            let full = adapter.item_holder_for_index(2).expect("holder 2");
            assert_eq!((full.left(), full.width()), (0.0, 300.0));
        }

        #[test]
        fn items_without_estimates_use_default_size() {
            let mut adapter = DefaultListAdapter::new(1);
            adapter
                .update_data_source(&DiffResult::insert_all(["a", "b"]))
                .expect("valid diff");
            let mut manager = StaggeredGridLayoutManager::new(LayoutParams {
                default_item_size: 42.0,
                ..params(1, 0.0)
            });
            manager.layout_invalid_item_holder(0, &mut adapter);
            assert_eq!(manager.item_main_bounds(1), Some((42.0, 84.0)));
        }

        #[test]
        fn partial_relayout_matches_full_layout() {
            let sizes = [100.0, 50.0, 80.0, 60.0, 70.0, 20.0];
            let (mut manager, mut adapter) = laid_out(&sizes, &[3], params(2, 5.0), 500.0);
            let full = manager.column_indexes().to_vec();
            let bounds: Vec<_> = (0..6).map(|i| manager.item_main_bounds(i)).collect();
            manager.layout_invalid_item_holder(4, &mut adapter);
            assert_eq!(manager.column_indexes(), full.as_slice());
            let again: Vec<_> = (0..6).map(|i| manager.item_main_bounds(i)).collect();
            assert_eq!(again, bounds);
        }
    }

    mod fill_boundaries {
        use super::*;

        /// Twelve 100px items in three columns: rows of three.
        fn three_columns(full_spans: &[usize]) -> StaggeredGridLayoutManager {
            laid_out(&[100.0; 12], full_spans, params(3, 0.0), 3000.0).0
        }

        /// Same grid behind a 100px viewport, so it can scroll.
        fn scrollable_three_columns() -> StaggeredGridLayoutManager {
            laid_out(&[100.0; 12], &[], params(3, 0.0), 100.0).0
        }

        fn state_with_end_lines(lines: [f32; 3]) -> LayoutState {
            let mut state = LayoutState::new(3, LayoutDirection::ToEnd);
            state.end_lines = lines.to_vec();
            state
        }

        #[test]
        fn next_full_span_needs_every_column_short_of_the_edge() {
            let manager = three_columns(&[5]);
            let state = state_with_end_lines([2950.0, 3000.0, 3050.0]);
            assert!(!manager.has_remain_space_to_fill_end(5, &state));
            let state = state_with_end_lines([2850.0, 2900.0, 2950.0]);
            assert!(manager.has_remain_space_to_fill_end(5, &state));
        }

        #[test]
        fn regular_next_item_needs_any_short_column() {
            let manager = three_columns(&[]);
            let state = state_with_end_lines([2950.0, 3000.0, 3050.0]);
            assert!(manager.has_remain_space_to_fill_end(5, &state));
            let state = state_with_end_lines([3000.0, 3010.0, 3050.0]);
            assert!(!manager.has_remain_space_to_fill_end(5, &state));
        }

        #[test]
        fn full_span_end_boundary_needs_every_column_short() {
            let manager = three_columns(&[]);
            let mut state = state_with_end_lines([2900.0, 3000.0, 2900.0]);
            state.is_end_full_span = true;
            assert!(!manager.has_remain_space_to_fill_end(5, &state));
        }

        #[test]
        fn start_fill_rules() {
            let mut manager = scrollable_three_columns();
            manager.set_content_offset(50.0);
            let mut state = LayoutState::new(3, LayoutDirection::ToStart);
            state.start_lines = vec![40.0, 60.0, 30.0];
            assert!(manager.has_remain_space_to_fill_start(&state), "One column is below the offset");
            state.is_start_full_span = true;
            assert!(!manager.has_remain_space_to_fill_start(&state));
            state.start_lines = vec![60.0; 3];
            assert!(manager.has_remain_space_to_fill_start(&state));
        }

        #[test]
        fn full_span_boundary_at_the_top_has_nothing_before_it() {
            let manager = three_columns(&[0]);
            let mut state = LayoutState::new(3, LayoutDirection::ToStart);
            state.is_start_full_span = true;
            state.start_index = vec![0, 0, 0];
            assert_eq!(manager.find_next_index_to_fill_start(&state), None);
        }

        #[test]
        fn full_span_boundary_steps_to_the_previous_index() {
            let manager = three_columns(&[10]);
            let mut state = LayoutState::new(3, LayoutDirection::ToStart);
            state.is_start_full_span = true;
            state.start_index = vec![11, 11, 11];
            assert_eq!(manager.find_next_index_to_fill_start(&state), Some(10));
        }

        #[test]
        fn non_uniform_full_span_boundary_is_rejected() {
            let manager = three_columns(&[]);
            let mut state = LayoutState::new(3, LayoutDirection::ToStart);
            state.is_start_full_span = true;
            state.start_index = vec![6, 7, 6];
            assert_eq!(manager.find_next_index_to_fill_start(&state), None);
        }

        #[test]
        fn regular_boundary_takes_the_smallest_predecessor() {
            let manager = three_columns(&[]);
            let mut state = LayoutState::new(3, LayoutDirection::ToStart);
            state.start_index = vec![6, 7, 8];
            assert_eq!(manager.find_next_index_to_fill_start(&state), Some(3));
        }

        #[test]
        fn full_span_candidate_waits_for_every_column() {
            // 0..3 in a row, 3 full-span, 4..7 in a row.
            let manager = laid_out(&[100.0; 8], &[3], params(3, 0.0), 3000.0).0;
            let mut state = LayoutState::new(3, LayoutDirection::ToStart);
            state.start_index = vec![3, 5, 6];
            assert_eq!(manager.find_next_index_to_fill_start(&state), Some(0));
            state.start_index = vec![4, 5, 6];
            assert_eq!(manager.find_next_index_to_fill_start(&state), Some(3));
        }

        #[test]
        fn predecessor_lookup() {
            let mut manager = scrollable_three_columns();
            let column = manager.column_indexes()[0].clone();
            assert_eq!(column, vec![0, 3, 6, 9]);
            assert_eq!(manager.get_item_index_before_target_index(&column, 0), None, "First entry");
            assert_eq!(manager.get_item_index_before_target_index(&column, 4), None, "Not in column");
            assert_eq!(manager.get_item_index_before_target_index(&column, 6), Some(3));
            manager.set_content_offset(250.0);
            assert_eq!(
                manager.get_item_index_before_target_index(&column, 6),
                None,
                "Item 3 ends at 200, above the offset"
            );
        }
    }

    mod fill {
        use super::*;

        fn grid(offset: f32, preload: usize) -> StaggeredGridLayoutManager {
            let params = LayoutParams {
                preload_buffer_count: preload,
                ..params(2, 0.0)
            };
            let (mut manager, _) = laid_out(&[100.0; 20], &[], params, 300.0);
            manager.set_content_offset(offset);
            manager
        }

        #[test]
        fn fills_the_first_screen() {
            let fill = grid(0.0, 0).fill(None);
            assert_eq!(fill.visible, vec![0, 1, 2, 3, 4, 5]);
            assert!(fill.preload.is_empty());
        }

        #[test]
        fn fills_a_scrolled_window() {
            let fill = grid(250.0, 0).fill(None);
            assert_eq!(fill.visible, (4..=11).collect::<Vec<_>>());
        }

        #[test]
        fn preload_extends_both_sides() {
            let fill = grid(250.0, 1).fill(None);
            assert_eq!(fill.preload, vec![3, 12]);
            assert_eq!(fill.all(), (3..=12).collect::<Vec<_>>());
        }

        #[test]
        fn fills_back_across_a_full_span_boundary() {
            let (mut manager, _) = laid_out(&[100.0; 9], &[0], params(2, 0.0), 300.0);

            manager.set_content_offset(150.0);
            assert_eq!(manager.fill(Some(3)).visible, (1..=8).collect::<Vec<_>>());

            manager.set_content_offset(50.0);
            assert_eq!(manager.fill(Some(3)).visible, (0..=6).collect::<Vec<_>>());
        }

        #[test]
        fn empty_list_fills_nothing() {
            let (manager, _) = laid_out(&[], &[], params(2, 0.0), 300.0);
            assert_eq!(manager.fill(None), FillResult::default());
        }
    }
}
