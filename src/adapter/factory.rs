//! Interface to the external element factory.
//!
//! The factory owns every UI element. The adapter only ever holds
//! [`ElementId`] handles, asks for elements through [`ElementFactory`], and
//! hears back asynchronously through the adapter's finish-bind calls.

use crate::model::{ElementId, OperationId, Size};
use serde::{Deserialize, Serialize};

/// Request to create or refresh the element for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindRequest {
    /// Key of the item to render.
    pub item_key: String,
    /// Index of the item in the current data source.
    pub index: usize,
    /// Token the completion must echo back.
    pub operation_id: OperationId,
}

/// Element delivered by the factory on completion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundElement {
    /// Handle of the delivered element.
    pub id: ElementId,
    /// Size the host measured for the element, if already known.
    pub size: Option<Size>,
}

impl BoundElement {
    /// Element without a measurement.
    pub fn new(id: ElementId) -> Self {
        Self { id, size: None }
    }

    /// Element with a host measurement.
    pub fn measured(id: ElementId, size: Size) -> Self {
        Self {
            id,
            size: Some(size),
        }
    }
}

/// Completion metadata travelling with delivered elements.
///
/// Single completions carry `operation_id`; batch completions carry
/// `operation_ids`, positionally correlated with the delivered elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Id of a single completion.
    pub operation_id: Option<OperationId>,
    /// Ids of a batch completion.
    pub operation_ids: Vec<OperationId>,
}

impl PipelineOptions {
    /// Options for a single completion.
    pub fn single(operation_id: OperationId) -> Self {
        Self {
            operation_id: Some(operation_id),
            operation_ids: Vec::new(),
        }
    }

    /// Options for a batch completion.
    pub fn batch(operation_ids: Vec<OperationId>) -> Self {
        Self {
            operation_id: None,
            operation_ids,
        }
    }
}

/// The external collaborator that creates, refreshes and pools elements.
pub trait ElementFactory {
    /// Start creating (or refreshing) the element for one item.
    fn request_element(&mut self, request: BindRequest);

    /// Start creating elements for several items in one dispatch.
    ///
    /// Factories without a batch path fall back to one request per item.
    fn request_elements(&mut self, requests: Vec<BindRequest>) {
        for request in requests {
            self.request_element(request);
        }
    }

    /// Return an element to the factory's free pool.
    fn release_element(&mut self, element: ElementId);
}

/// Factory that queues requests for the caller to complete later.
///
/// Used by the replay binary, benches and tests to drive the asynchronous
/// bind protocol deterministically.
#[derive(Debug, Default, Clone)]
pub struct QueuedElementFactory {
    pending: Vec<BindRequest>,
    released: Vec<ElementId>,
    dispatches: usize,
    next_element: u64,
}

impl QueuedElementFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet completed, in dispatch order.
    pub fn pending(&self) -> &[BindRequest] {
        &self.pending
    }

    /// Drain the queued requests.
    pub fn take_pending(&mut self) -> Vec<BindRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Elements handed back so far.
    pub fn released(&self) -> &[ElementId] {
        &self.released
    }

    /// Number of dispatches received; a batch counts once.
    pub fn dispatches(&self) -> usize {
        self.dispatches
    }

    /// Mint a fresh element handle.
    pub fn create_element(&mut self) -> ElementId {
        self.next_element += 1;
        ElementId::new(self.next_element)
    }
}

impl ElementFactory for QueuedElementFactory {
    fn request_element(&mut self, request: BindRequest) {
        self.dispatches += 1;
        self.pending.push(request);
    }

    fn request_elements(&mut self, requests: Vec<BindRequest>) {
        self.dispatches += 1;
        self.pending.extend(requests);
    }

    fn release_element(&mut self, element: ElementId) {
        self.released.push(element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(key: &str, raw: u64) -> BindRequest {
        BindRequest {
            item_key: key.to_string(),
            index: 0,
            operation_id: OperationId::new(raw),
        }
    }

    #[test]
    fn batch_counts_as_one_dispatch() {
        let mut factory = QueuedElementFactory::new();
        factory.request_elements(vec![request("a", 1), request("b", 2)]);
        assert_eq!(factory.dispatches(), 1);
        assert_eq!(factory.pending().len(), 2);
    }

    #[test]
    fn take_pending_drains_queue() {
        let mut factory = QueuedElementFactory::new();
        factory.request_element(request("a", 1));
        assert_eq!(factory.take_pending().len(), 1);
        assert!(factory.pending().is_empty());
    }

    #[test]
    fn created_elements_are_unique() {
        let mut factory = QueuedElementFactory::new();
        assert_ne!(factory.create_element(), factory.create_element());
    }
}
