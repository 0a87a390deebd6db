use super::{AdapterCore, BoundElement, ElementFactory, ListAdapter, PipelineOptions};
use tracing::debug;

/// Adapter that coalesces the binds of one layout pass into one dispatch.
#[derive(Debug, Clone)]
pub struct BatchListAdapter {
    core: AdapterCore,
}

impl BatchListAdapter {
    /// Create an empty adapter for the list with the given id.
    pub fn new(list_id: u32) -> Self {
        Self {
            core: AdapterCore::new(list_id),
        }
    }
}

impl ListAdapter for BatchListAdapter {
    fn core(&self) -> &AdapterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AdapterCore {
        &mut self.core
    }

    fn supports_batch(&self) -> bool {
        true
    }

    fn bind_item_holders(&mut self, indexes: &[usize], factory: &mut dyn ElementFactory) -> usize {
        let requests: Vec<_> = indexes
            .iter()
            .filter_map(|&index| self.core.prepare_bind(index))
            .collect();
        let issued = requests.len();
        if issued > 0 {
            factory.request_elements(requests);
        }
        issued
    }

    fn on_finish_bind_item_holders(
        &mut self,
        elements: &[BoundElement],
        options: &PipelineOptions,
        factory: &mut dyn ElementFactory,
    ) -> usize {
        if elements.len() != options.operation_ids.len() {
            debug!(
                elements = elements.len(),
                operation_ids = options.operation_ids.len(),
                "Batch completion lengths differ; unmatched entries dropped"
            );
        }
        let mut applied = 0;
        for (i, element) in elements.iter().enumerate() {
            match options.operation_ids.get(i) {
                Some(&operation_id) => {
                    if self.core.finish_bind(operation_id, *element, factory) {
                        applied += 1;
                    }
                }
                None => factory.release_element(element.id),
            }
        }
        applied
    }
}
