//! Diff reconciliation and the bind/recycle state machine.
//!
//! The adapter exclusively owns every [`ItemHolder`]. Layout and anchor code
//! read holders through it and only ever write frame positions back.
//!
//! Two strategies share one [`AdapterCore`]:
//! - [`DefaultListAdapter`] dispatches one factory request per holder.
//! - [`BatchListAdapter`] coalesces a layout pass's binds into one dispatch.

mod batch;
mod default;
pub mod factory;
pub mod helper;
pub mod item_holder;

pub use batch::BatchListAdapter;
pub use default::DefaultListAdapter;
pub use factory::{BindRequest, BoundElement, ElementFactory, PipelineOptions, QueuedElementFactory};
pub use helper::ListAdapterHelper;
pub use item_holder::{BindState, ItemHolder};

use crate::children::ListChildrenHelper;
use crate::model::{DiffError, DiffResult, OperationId, OperationIdGenerator};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// State shared by every adapter strategy.
#[derive(Debug, Clone)]
pub struct AdapterCore {
    helper: ListAdapterHelper,
    item_holder_map: HashMap<String, ItemHolder>,
    id_generator: OperationIdGenerator,
    pending_binds: HashMap<OperationId, String>,
}

impl AdapterCore {
    /// Create an empty core for the list with the given id.
    pub fn new(list_id: u32) -> Self {
        Self {
            helper: ListAdapterHelper::new(),
            item_holder_map: HashMap::new(),
            id_generator: OperationIdGenerator::new(list_id),
            pending_binds: HashMap::new(),
        }
    }

    fn update_data_source(&mut self, diff: &DiffResult) -> Result<(), DiffError> {
        if let Err(err) = self.helper.update_data_source(diff) {
            warn!(error = %err, "Rejected diff payload");
            return Err(err);
        }

        for key in self.helper.removed_keys() {
            if let Some(holder) = self.item_holder_map.get_mut(key) {
                holder.mark_removed();
            }
        }

        let updated_keys = self.helper.updated_keys().to_vec();
        for (old_key, new_key) in updated_keys {
            if old_key != new_key && !self.item_holder_map.contains_key(&new_key) {
                if let Some(mut holder) = self.item_holder_map.remove(&old_key) {
                    holder.set_item_key(new_key.clone());
                    self.item_holder_map.insert(new_key.clone(), holder);
                }
            }
            if let Some(holder) = self.item_holder_map.get_mut(&new_key) {
                let stale = if holder.is_removed() {
                    holder.revive()
                } else {
                    holder.mark_updated()
                };
                if let Some(op) = stale {
                    self.pending_binds.remove(&op);
                }
            }
        }

        for key in self.helper.inserted_keys() {
            let index = self.helper.index_of(key);
            match self.item_holder_map.get_mut(key) {
                Some(holder) => {
                    if let Some(op) = holder.revive() {
                        self.pending_binds.remove(&op);
                    }
                    holder.set_index(index);
                }
                None => {
                    self.item_holder_map
                        .insert(key.clone(), ItemHolder::new(index, key.clone()));
                }
            }
        }

        // Keys the diff left implicit still need a consistent holder map.
        for (index, key) in self.helper.item_keys().iter().enumerate() {
            match self.item_holder_map.get_mut(key) {
                Some(holder) if holder.is_removed() => {
                    warn!(key = %key, "Live key had a removed holder; reviving");
                    if let Some(op) = holder.revive() {
                        self.pending_binds.remove(&op);
                    }
                }
                Some(_) => {}
                None => {
                    warn!(key = %key, "Live key had no holder; allocating");
                    self.item_holder_map
                        .insert(key.clone(), ItemHolder::new(Some(index), key.clone()));
                }
            }
        }
        let helper = &self.helper;
        for holder in self.item_holder_map.values_mut() {
            if !holder.is_removed() && helper.index_of(holder.item_key()).is_none() {
                holder.mark_removed();
            }
        }
        Ok(())
    }

    fn update_item_holder_to_latest(&mut self, children: &mut ListChildrenHelper) {
        let helper = &self.helper;
        for holder in self.item_holder_map.values_mut() {
            if holder.is_removed() {
                continue;
            }
            let index = helper.index_of(holder.item_key());
            holder.set_index(index);
            if let Some(index) = index {
                holder.set_metadata(
                    helper.estimated_size(index),
                    helper.is_full_span(index),
                    helper.is_sticky_top(index),
                    helper.is_sticky_bottom(index),
                );
            }
        }
        children.update_indexes(|key| helper.index_of(key));
    }

    fn item_holder_for_index(&self, index: usize) -> Option<&ItemHolder> {
        let key = self.helper.key_at(index)?;
        self.item_holder_map
            .get(key)
            .filter(|holder| !holder.is_removed())
    }

    fn item_holder_for_index_mut(&mut self, index: usize) -> Option<&mut ItemHolder> {
        let key = self.helper.key_at(index)?;
        self.item_holder_map
            .get_mut(key)
            .filter(|holder| !holder.is_removed())
    }

    fn pending_index(&self, operation_id: OperationId) -> Option<usize> {
        let key = self.pending_binds.get(&operation_id)?;
        self.helper.index_of(key)
    }

    /// Flip the holder at `index` into Binding and build its request.
    fn prepare_bind(&mut self, index: usize) -> Option<BindRequest> {
        let Some(key) = self.helper.key_at(index) else {
            debug!(index, "Bind skipped: index out of range");
            return None;
        };
        let holder = self.item_holder_map.get_mut(key)?;
        if holder.is_removed() || !holder.can_bind() {
            trace!(index, key, state = ?holder.state(), "Bind skipped");
            return None;
        }
        let operation_id = self.id_generator.next_id();
        holder.begin_bind(operation_id);
        self.pending_binds.insert(operation_id, key.to_string());
        Some(BindRequest {
            item_key: key.to_string(),
            index,
            operation_id,
        })
    }

    fn finish_bind(
        &mut self,
        operation_id: OperationId,
        element: BoundElement,
        factory: &mut dyn ElementFactory,
    ) -> bool {
        let holder = self
            .pending_binds
            .remove(&operation_id)
            .and_then(|key| self.item_holder_map.get_mut(&key))
            .filter(|holder| holder.operation_id() == Some(operation_id));
        let Some(holder) = holder else {
            debug!(%operation_id, "Dropping stale bind completion");
            factory.release_element(element.id);
            return false;
        };
        if let Some(displaced) = holder.complete_bind(element.id, element.size) {
            factory.release_element(displaced);
        }
        true
    }

    fn recycle_item_holder(&mut self, key: &str, factory: &mut dyn ElementFactory) -> bool {
        let Some(holder) = self.item_holder_map.get_mut(key) else {
            return false;
        };
        let Some((element, stale)) = holder.recycle() else {
            return false;
        };
        if let Some(element) = element {
            factory.release_element(element);
        }
        if let Some(op) = stale {
            self.pending_binds.remove(&op);
        }
        true
    }

    fn recycle_removed_item_holders(
        &mut self,
        children: &mut ListChildrenHelper,
        factory: &mut dyn ElementFactory,
    ) -> usize {
        let removed: Vec<String> = self
            .item_holder_map
            .values()
            .filter(|holder| holder.is_removed())
            .map(|holder| holder.item_key().to_string())
            .collect();
        for key in &removed {
            let Some(holder) = self.item_holder_map.remove(key) else {
                continue;
            };
            let (key, element, operation_id) = holder.into_parts();
            if let Some(element) = element {
                factory.release_element(element);
            }
            if let Some(op) = operation_id {
                self.pending_binds.remove(&op);
            }
            children.remove_child(&key);
        }
        removed.len()
    }
}

/// Capability set shared by the adapter strategies.
///
/// Strategies provide the bind dispatch; everything else is shared through
/// [`AdapterCore`].
pub trait ListAdapter {
    /// Shared state.
    fn core(&self) -> &AdapterCore;

    /// Shared state, mutably.
    fn core_mut(&mut self) -> &mut AdapterCore;

    /// Whether binds are coalesced into one factory dispatch.
    fn supports_batch(&self) -> bool;

    /// Bind every bindable holder among `indexes`, in the given order.
    ///
    /// Returns the number of bind requests issued.
    fn bind_item_holders(&mut self, indexes: &[usize], factory: &mut dyn ElementFactory) -> usize;

    /// Apply a batch of completions, correlated positionally with
    /// `options.operation_ids`.
    ///
    /// Returns the number of completions applied; stale ones are dropped.
    fn on_finish_bind_item_holders(
        &mut self,
        elements: &[BoundElement],
        options: &PipelineOptions,
        factory: &mut dyn ElementFactory,
    ) -> usize;

    /// Accept a new data snapshot and reconcile holders against it.
    ///
    /// Removed keys keep their holder (flagged removed) until the sweep;
    /// updated keys go back to dirty; inserted keys get a fresh dirty holder.
    ///
    /// # Errors
    ///
    /// Returns the validation error and leaves every holder untouched if the
    /// payload does not fit the current data source.
    fn update_data_source(&mut self, diff: &DiffResult) -> Result<(), DiffError> {
        self.core_mut().update_data_source(diff)
    }

    /// Refresh each live holder's index and metadata from the latest snapshot.
    fn update_item_holder_to_latest(&mut self, children: &mut ListChildrenHelper) {
        self.core_mut().update_item_holder_to_latest(children);
    }

    /// Holder currently at `index`, ignoring removed holders.
    fn item_holder_for_index(&self, index: usize) -> Option<&ItemHolder> {
        self.core().item_holder_for_index(index)
    }

    /// Mutable holder currently at `index`, ignoring removed holders.
    fn item_holder_for_index_mut(&mut self, index: usize) -> Option<&mut ItemHolder> {
        self.core_mut().item_holder_for_index_mut(index)
    }

    /// Holder for `key`, removed or not.
    fn item_holder(&self, key: &str) -> Option<&ItemHolder> {
        self.core().item_holder_map.get(key)
    }

    /// Every resident holder, keyed by item key.
    fn item_holder_map(&self) -> &HashMap<String, ItemHolder> {
        &self.core().item_holder_map
    }

    /// Snapshot of the latest data source.
    fn list_adapter_helper(&self) -> &ListAdapterHelper {
        &self.core().helper
    }

    /// Index of the holder still waiting on `operation_id`, if the request is live.
    fn pending_index(&self, operation_id: OperationId) -> Option<usize> {
        self.core().pending_index(operation_id)
    }

    /// Number of items in the latest data source.
    fn data_count(&self) -> usize {
        self.core().helper.data_count()
    }

    /// Issue a bind request for the holder at `index`.
    ///
    /// Returns false without side effects if the index is unknown or the
    /// holder is already binding or bound.
    fn bind_item_holder(&mut self, index: usize, factory: &mut dyn ElementFactory) -> bool {
        match self.core_mut().prepare_bind(index) {
            Some(request) => {
                factory.request_element(request);
                true
            }
            None => false,
        }
    }

    /// Apply a single completion.
    ///
    /// A completion whose operation id no longer matches its holder is
    /// dropped and its element handed straight back to `factory`.
    fn on_finish_bind_item_holder(
        &mut self,
        element: BoundElement,
        options: &PipelineOptions,
        factory: &mut dyn ElementFactory,
    ) -> bool {
        match options.operation_id {
            Some(operation_id) => self.core_mut().finish_bind(operation_id, element, factory),
            None => {
                debug!("Completion without operation id");
                factory.release_element(element.id);
                false
            }
        }
    }

    /// Detach the element of the holder for `key` and mark it recycled.
    fn recycle_item_holder(&mut self, key: &str, factory: &mut dyn ElementFactory) -> bool {
        self.core_mut().recycle_item_holder(key, factory)
    }

    /// Destroy every holder flagged removed, releasing their elements.
    ///
    /// Afterwards the holder map holds exactly one holder per live key.
    fn recycle_removed_item_holders(
        &mut self,
        children: &mut ListChildrenHelper,
        factory: &mut dyn ElementFactory,
    ) -> usize {
        self.core_mut()
            .recycle_removed_item_holders(children, factory)
    }

    /// Indices of sticky-top items, ascending.
    fn sticky_tops(&self) -> &[usize] {
        self.core().helper.sticky_tops()
    }

    /// Indices of sticky-bottom items, ascending.
    fn sticky_bottoms(&self) -> &[usize] {
        self.core().helper.sticky_bottoms()
    }

    /// Whether any item spans every column.
    fn has_full_span_items(&self) -> bool {
        !self.core().helper.full_spans().is_empty()
    }
}

/// Build the adapter strategy selected by `enable_batch_render`.
pub fn new_adapter(list_id: u32, enable_batch_render: bool) -> Box<dyn ListAdapter> {
    if enable_batch_render {
        Box::new(BatchListAdapter::new(list_id))
    } else {
        Box::new(DefaultListAdapter::new(list_id))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::model::ElementId;

    /// Complete every queued request with a fresh element.
    pub fn complete_all(adapter: &mut dyn ListAdapter, factory: &mut QueuedElementFactory) -> usize {
        let mut applied = 0;
        for request in factory.take_pending() {
            let element = BoundElement::new(factory.create_element());
            let options = PipelineOptions::single(request.operation_id);
            if adapter.on_finish_bind_item_holder(element, &options, factory) {
                applied += 1;
            }
        }
        applied
    }

    pub fn keys(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("key-{i}")).collect()
    }

    pub fn element(raw: u64) -> BoundElement {
        BoundElement::new(ElementId::new(raw))
    }
}
