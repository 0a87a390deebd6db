//! Per-pass fill cursor.

use crate::model::LayoutDirection;

/// Column boundaries of one fill pass. Never kept across passes.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState {
    /// Main-axis start of the earliest filled item, per column.
    pub start_lines: Vec<f32>,
    /// Main-axis end of the latest filled item, per column.
    pub end_lines: Vec<f32>,
    /// Index of the earliest filled item, per column.
    pub start_index: Vec<usize>,
    /// The start boundary is a full-span item.
    pub is_start_full_span: bool,
    /// The end boundary is a full-span item.
    pub is_end_full_span: bool,
    /// Direction the pass grows in.
    pub direction: LayoutDirection,
}

impl LayoutState {
    /// Empty state for `span_count` columns.
    pub fn new(span_count: usize, direction: LayoutDirection) -> Self {
        Self {
            start_lines: vec![0.0; span_count],
            end_lines: vec![0.0; span_count],
            start_index: vec![0; span_count],
            is_start_full_span: false,
            is_end_full_span: false,
            direction,
        }
    }

    /// Clear every boundary, resizing to `span_count` columns.
    pub fn reset(&mut self, span_count: usize) {
        *self = Self::new(span_count, self.direction);
    }

    /// Number of columns tracked.
    pub fn span_count(&self) -> usize {
        self.end_lines.len()
    }

    /// Move the start boundary of `columns` to the item at `index`.
    pub fn advance_start(&mut self, columns: &[usize], index: usize, start: f32, full_span: bool) {
        for &column in columns {
            self.start_index[column] = index;
            self.start_lines[column] = start;
        }
        self.is_start_full_span = full_span;
    }

    /// Move the end boundary of `columns` past an item ending at `end`.
    pub fn advance_end(&mut self, columns: &[usize], end: f32, full_span: bool) {
        for &column in columns {
            self.end_lines[column] = end;
        }
        self.is_end_full_span = full_span;
    }
}
