//! Bookkeeping of which children are on screen, preloaded, pinned and attached.

use crate::adapter::ItemHolder;
use crate::layout::orientation::ListOrientationHelper;
use crate::model::ElementId;
use std::collections::{BTreeSet, HashMap};

/// A child slot, ordered by index then key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChildEntry {
    /// Index in the current data source.
    pub index: usize,
    /// Item key of the child.
    pub item_key: String,
}

impl ChildEntry {
    /// Create an entry.
    pub fn new(index: usize, item_key: impl Into<String>) -> Self {
        Self {
            index,
            item_key: item_key.into(),
        }
    }
}

/// Whether a main-axis span `[start, end)` intersects the viewport.
///
/// Zero-size items count as visible when they sit inside the viewport.
pub fn is_visible(start: f32, end: f32, content_offset: f32, viewport_main: f32) -> bool {
    let edge = content_offset + viewport_main;
    start < edge && (end > content_offset || (end <= start && start >= content_offset))
}

/// Tracks the list's children between layout passes.
#[derive(Debug, Clone, Default)]
pub struct ListChildrenHelper {
    on_screen: BTreeSet<ChildEntry>,
    in_preload: BTreeSet<ChildEntry>,
    in_sticky: BTreeSet<ChildEntry>,
    attached: HashMap<String, ElementId>,
    last_binding: BTreeSet<String>,
}

impl ListChildrenHelper {
    /// Create an empty helper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Children intersecting the viewport, in index order.
    pub fn on_screen_children(&self) -> &BTreeSet<ChildEntry> {
        &self.on_screen
    }

    /// Children kept bound beyond the viewport.
    pub fn preload_children(&self) -> &BTreeSet<ChildEntry> {
        &self.in_preload
    }

    /// Children pinned to a viewport edge.
    pub fn sticky_children(&self) -> &BTreeSet<ChildEntry> {
        &self.in_sticky
    }

    /// Children holding an element, by key.
    pub fn attached_children(&self) -> &HashMap<String, ElementId> {
        &self.attached
    }

    /// Number of attached children.
    pub fn child_count(&self) -> usize {
        self.attached.len()
    }

    /// Recompute the on-screen set from laid-out `holders`.
    pub fn update_on_screen_children<'a, I>(
        &mut self,
        holders: I,
        orientation: &ListOrientationHelper,
        content_offset: f32,
        viewport_main: f32,
    ) where
        I: IntoIterator<Item = &'a ItemHolder>,
    {
        self.on_screen.clear();
        for holder in holders {
            let Some(index) = holder.index() else {
                continue;
            };
            if holder.is_removed() {
                continue;
            }
            let start = orientation.decorated_start(holder);
            let end = orientation.decorated_end(holder);
            if is_visible(start, end, content_offset, viewport_main) {
                self.on_screen
                    .insert(ChildEntry::new(index, holder.item_key()));
            }
        }
    }

    /// Replace the preload set.
    pub fn set_preload_children(&mut self, entries: impl IntoIterator<Item = ChildEntry>) {
        self.in_preload = entries.into_iter().collect();
    }

    /// Replace the sticky set.
    pub fn set_sticky_children(&mut self, entries: impl IntoIterator<Item = ChildEntry>) {
        self.in_sticky = entries.into_iter().collect();
    }

    /// Re-derive indexes after a data-source change; unknown keys are dropped.
    pub fn update_indexes(&mut self, index_of: impl Fn(&str) -> Option<usize>) {
        for set in [&mut self.on_screen, &mut self.in_preload, &mut self.in_sticky] {
            *set = std::mem::take(set)
                .into_iter()
                .filter_map(|entry| {
                    index_of(&entry.item_key).map(|index| ChildEntry::new(index, entry.item_key))
                })
                .collect();
        }
    }

    /// Record that `key` now shows `element`. Returns the element it replaced.
    pub fn attach_child(&mut self, key: &str, element: ElementId) -> Option<ElementId> {
        self.attached
            .insert(key.to_string(), element)
            .filter(|old| *old != element)
    }

    /// Forget the element shown for `key`.
    pub fn detach_child(&mut self, key: &str) -> Option<ElementId> {
        self.attached.remove(key)
    }

    /// Element shown for `key`, if attached.
    pub fn attached_element(&self, key: &str) -> Option<ElementId> {
        self.attached.get(key).copied()
    }

    /// Drop `key` from every set.
    pub fn remove_child(&mut self, key: &str) {
        self.attached.remove(key);
        self.last_binding.remove(key);
        for set in [&mut self.on_screen, &mut self.in_preload, &mut self.in_sticky] {
            set.retain(|entry| entry.item_key != key);
        }
    }

    /// First on-screen child satisfying `predicate`.
    pub fn first_child(&self, predicate: impl Fn(&ChildEntry) -> bool) -> Option<&ChildEntry> {
        self.on_screen.iter().find(|entry| predicate(entry))
    }

    /// Last on-screen child satisfying `predicate`.
    pub fn last_child(&self, predicate: impl Fn(&ChildEntry) -> bool) -> Option<&ChildEntry> {
        self.on_screen.iter().rev().find(|entry| predicate(entry))
    }

    /// Diff the attached children of the on-screen, preload and sticky sets
    /// against the previous pass.
    ///
    /// `insert` sees children new to the set, `recycle` children that left
    /// it, and `update` every child in the new set.
    pub fn handle_layout_or_scroll_result(
        &mut self,
        mut insert: impl FnMut(&str),
        mut recycle: impl FnMut(&str),
        mut update: impl FnMut(&str),
    ) {
        let mut ordered: BTreeSet<&ChildEntry> = BTreeSet::new();
        ordered.extend(&self.on_screen);
        ordered.extend(&self.in_preload);
        ordered.extend(&self.in_sticky);

        let mut binding = BTreeSet::new();
        let mut in_order = Vec::new();
        for entry in ordered {
            if self.attached.contains_key(&entry.item_key)
                && binding.insert(entry.item_key.clone())
            {
                in_order.push(entry.item_key.as_str());
            }
        }

        for key in &in_order {
            if !self.last_binding.contains(*key) {
                insert(key);
            }
        }
        for key in self.last_binding.difference(&binding) {
            recycle(key);
        }
        for key in &in_order {
            update(key);
        }
        self.last_binding = binding;
    }
}
