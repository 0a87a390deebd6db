//! Per-item virtualization slot.

use crate::layout::orientation::ListOrientationHelper;
use crate::model::{ElementId, OperationId, Size};

/// Binding lifecycle of an [`ItemHolder`].
///
/// Exactly one of these holds at a time. `removed` and `updated` are
/// orthogonal flags kept on the holder itself.
///
/// ```text
/// Dirty ──bind──▶ Binding ──finish──▶ FinishedBinding ──recycle──▶ Recycled
///   ▲                │                        │                        │
///   └──── update ────┴──────── update ────────┘          bind ─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindState {
    /// Needs an element (new, or content changed).
    #[default]
    Dirty,
    /// A bind request is in flight.
    Binding,
    /// An element is attached and up to date.
    FinishedBinding,
    /// Element handed back to the factory; may be rebound later.
    Recycled,
}

/// One virtualization slot, owned by the adapter's holder map.
///
/// Identity is the item key: the same holder survives reorders for as long
/// as its key stays in the data source.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemHolder {
    index: Option<usize>,
    item_key: String,
    element: Option<ElementId>,
    estimated_size: Option<f32>,
    measured_size: Option<Size>,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    state: BindState,
    operation_id: Option<OperationId>,
    updated: bool,
    removed: bool,
    sticky_top: bool,
    sticky_bottom: bool,
    full_span: bool,
}

impl ItemHolder {
    /// Create a fresh, dirty, unbound holder.
    pub fn new(index: Option<usize>, item_key: impl Into<String>) -> Self {
        Self {
            index,
            item_key: item_key.into(),
            element: None,
            estimated_size: None,
            measured_size: None,
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            state: BindState::Dirty,
            operation_id: None,
            updated: false,
            removed: false,
            sticky_top: false,
            sticky_bottom: false,
            full_span: false,
        }
    }

    /// Current position in the data source, `None` once removed.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Stable identity of the item.
    pub fn item_key(&self) -> &str {
        &self.item_key
    }

    /// Element currently attached, if any.
    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BindState {
        self.state
    }

    /// Waiting for a (re)bind.
    pub fn is_dirty(&self) -> bool {
        self.state == BindState::Dirty
    }

    /// A bind request is in flight.
    pub fn is_binding(&self) -> bool {
        self.state == BindState::Binding
    }

    /// Bound and up to date.
    pub fn is_finished_binding(&self) -> bool {
        self.state == BindState::FinishedBinding
    }

    /// Element was handed back to the factory.
    pub fn is_recycled(&self) -> bool {
        self.state == BindState::Recycled
    }

    /// Content changed in the last diff and has not been rebound yet.
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    /// Key left the data source; the holder awaits the sweep.
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Pinned to the leading edge while scrolled past.
    pub fn sticky_top(&self) -> bool {
        self.sticky_top
    }

    /// Pinned to the trailing edge until scrolled to.
    pub fn sticky_bottom(&self) -> bool {
        self.sticky_bottom
    }

    /// Occupies every column.
    pub fn full_span(&self) -> bool {
        self.full_span
    }

    /// Id of the in-flight bind request, if any.
    pub fn operation_id(&self) -> Option<OperationId> {
        self.operation_id
    }

    /// Main-axis size estimate from the diff payload.
    pub fn estimated_size(&self) -> Option<f32> {
        self.estimated_size
    }

    /// Size reported by the host for the attached element.
    pub fn measured_size(&self) -> Option<Size> {
        self.measured_size
    }

    /// Left edge of the laid-out frame.
    pub fn left(&self) -> f32 {
        self.left
    }

    /// Top edge of the laid-out frame.
    pub fn top(&self) -> f32 {
        self.top
    }

    /// Width of the laid-out frame.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Height of the laid-out frame.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// True once the holder carries an element that can be shown.
    pub fn is_bound(&self) -> bool {
        self.is_finished_binding() && self.element.is_some()
    }

    /// Main-axis size to lay this item out with.
    ///
    /// Prefers the host measurement, then the diff estimate, then `fallback`.
    pub fn layout_main_size(&self, orientation: &ListOrientationHelper, fallback: f32) -> f32 {
        self.measured_size
            .map(|size| orientation.main_of(size))
            .or(self.estimated_size)
            .unwrap_or(fallback)
    }

    pub(crate) fn set_index(&mut self, index: Option<usize>) {
        self.index = index;
    }

    pub(crate) fn set_item_key(&mut self, item_key: String) {
        self.item_key = item_key;
    }

    pub(crate) fn set_metadata(
        &mut self,
        estimated_size: Option<f32>,
        full_span: bool,
        sticky_top: bool,
        sticky_bottom: bool,
    ) {
        self.estimated_size = estimated_size;
        self.full_span = full_span;
        self.sticky_top = sticky_top;
        self.sticky_bottom = sticky_bottom;
    }

    pub(crate) fn set_frame(&mut self, left: f32, top: f32, width: f32, height: f32) {
        self.left = left;
        self.top = top;
        self.width = width;
        self.height = height;
    }

    /// Whether a bind request may be issued for this holder right now.
    pub fn can_bind(&self) -> bool {
        matches!(self.state, BindState::Dirty | BindState::Recycled)
    }

    /// Dirty/Recycled → Binding. Returns false if the holder is not bindable.
    pub(crate) fn begin_bind(&mut self, operation_id: OperationId) -> bool {
        if !self.can_bind() {
            return false;
        }
        self.state = BindState::Binding;
        self.operation_id = Some(operation_id);
        true
    }

    /// Binding → FinishedBinding. Returns the element that was displaced, if any.
    pub(crate) fn complete_bind(
        &mut self,
        element: ElementId,
        measured_size: Option<Size>,
    ) -> Option<ElementId> {
        self.state = BindState::FinishedBinding;
        self.operation_id = None;
        self.updated = false;
        if measured_size.is_some() {
            self.measured_size = measured_size;
        }
        self.element.replace(element).filter(|old| *old != element)
    }

    /// Content changed: back to Dirty, any in-flight request becomes stale.
    ///
    /// Returns the operation id that was invalidated.
    pub(crate) fn mark_updated(&mut self) -> Option<OperationId> {
        self.updated = true;
        self.state = BindState::Dirty;
        self.operation_id.take()
    }

    pub(crate) fn mark_removed(&mut self) {
        self.removed = true;
        self.index = None;
    }

    /// Key came back in the same diff that removed it.
    pub(crate) fn revive(&mut self) -> Option<OperationId> {
        self.removed = false;
        self.mark_updated()
    }

    /// Detach the element and move to Recycled.
    ///
    /// Returns `None` (and changes nothing) when there is nothing to recycle.
    /// Otherwise returns the detached element, if one was attached, and the
    /// operation id that became stale, if a bind was in flight.
    pub(crate) fn recycle(&mut self) -> Option<(Option<ElementId>, Option<OperationId>)> {
        let active = matches!(self.state, BindState::Binding | BindState::FinishedBinding);
        if !active && self.element.is_none() {
            return None;
        }
        self.state = BindState::Recycled;
        Some((self.element.take(), self.operation_id.take()))
    }

    /// Give up the element and any pending request before the holder is destroyed.
    pub(crate) fn into_parts(self) -> (String, Option<ElementId>, Option<OperationId>) {
        (self.item_key, self.element, self.operation_id)
    }
}
