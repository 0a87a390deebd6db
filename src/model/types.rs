//! Core list newtypes and small enums shared by every layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token correlating an asynchronous bind request with its completion.
///
/// The high 32 bits carry the owning list's id, the low 32 bits a per-list
/// sequence number, so ids from two lists never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationId(u64);

impl OperationId {
    /// Wrap a raw operation id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Id of the list that issued this operation.
    pub fn list_id(&self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}:{}", self.list_id(), self.0 as u32)
    }
}

/// Issues fresh operation ids for one list.
#[derive(Debug, Clone)]
pub struct OperationIdGenerator {
    list_id: u32,
    next: u32,
}

impl OperationIdGenerator {
    /// Create a generator for the list with the given id.
    pub fn new(list_id: u32) -> Self {
        Self { list_id, next: 0 }
    }

    /// Produce the next id. Sequence numbers wrap after `u32::MAX` requests.
    pub fn next_id(&mut self) -> OperationId {
        self.next = self.next.wrapping_add(1);
        OperationId(((self.list_id as u64) << 32) | self.next as u64)
    }
}

/// Non-owning handle to a UI element owned by the element factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(u64);

impl ElementId {
    /// Wrap a raw element id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Scroll direction of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Main axis is vertical; columns are laid out horizontally.
    #[default]
    Vertical,
    /// Main axis is horizontal; columns are rows.
    Horizontal,
}

/// Layout algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    /// One item per line along the main axis.
    #[default]
    Single,
    /// Staggered multi-column layout.
    Waterfall,
}

/// Direction a fill pass grows in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutDirection {
    /// Toward smaller indices.
    ToStart,
    /// Toward larger indices.
    ToEnd,
}

/// Where a scrolled-to item should land in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollAlignment {
    /// Item start flush with the viewport start.
    #[default]
    Start,
    /// Item centred in the viewport.
    Center,
    /// Item end flush with the viewport end.
    End,
}

/// Width and height of an element as measured by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in layout units.
    pub width: f32,
    /// Height in layout units.
    pub height: f32,
}

impl Size {
    /// Create a size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}
