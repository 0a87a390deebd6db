use super::{AdapterCore, BoundElement, ElementFactory, ListAdapter, PipelineOptions};

/// Adapter that binds and finishes each holder individually.
#[derive(Debug, Clone)]
pub struct DefaultListAdapter {
    core: AdapterCore,
}

impl DefaultListAdapter {
    /// Create an empty adapter for the list with the given id.
    pub fn new(list_id: u32) -> Self {
        Self {
            core: AdapterCore::new(list_id),
        }
    }
}

impl ListAdapter for DefaultListAdapter {
    fn core(&self) -> &AdapterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AdapterCore {
        &mut self.core
    }

    fn supports_batch(&self) -> bool {
        false
    }

    fn bind_item_holders(&mut self, indexes: &[usize], factory: &mut dyn ElementFactory) -> usize {
        let mut issued = 0;
        for &index in indexes {
            if self.bind_item_holder(index, factory) {
                issued += 1;
            }
        }
        issued
    }

    fn on_finish_bind_item_holders(
        &mut self,
        elements: &[BoundElement],
        options: &PipelineOptions,
        factory: &mut dyn ElementFactory,
    ) -> usize {
        let mut applied = 0;
        for (i, element) in elements.iter().enumerate() {
            let single = PipelineOptions {
                operation_id: options.operation_ids.get(i).copied(),
                operation_ids: Vec::new(),
            };
            if self.on_finish_bind_item_holder(*element, &single, factory) {
                applied += 1;
            }
        }
        applied
    }
}
