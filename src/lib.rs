//! listkit
//!
//! Virtualized list core: diff-driven reconciliation of item holders, an
//! asynchronous bind/recycle state machine, single-column and staggered
//! ("waterfall") layout, and scroll anchoring across updates.
//!
//! The crate never creates UI elements itself. Hosts implement
//! [`adapter::ElementFactory`] and drive a [`container::ListContainer`] with
//! diff payloads, viewport changes, scrolls and bind completions.

pub mod adapter;
pub mod anchor;
pub mod children;
pub mod config;
pub mod container;
pub mod layout;
pub mod logging;
pub mod model;

pub use adapter::{BoundElement, ElementFactory, ListAdapter, PipelineOptions};
pub use config::ListConfig;
pub use container::{LayoutOutput, ListContainer, RenderedChild};
pub use model::{DiffResult, ElementId, OperationId, ScrollAlignment, Size};

#[cfg(test)]
mod tests;
