//! Domain model - diff payloads, identifiers, and error types.

pub mod diff;
pub mod error;
pub mod types;

pub use diff::DiffResult;
pub use error::{AppError, DiffError};
pub use types::{
    ElementId, LayoutDirection, ListType, OperationId, OperationIdGenerator, Orientation,
    ScrollAlignment, Size,
};
