//! Deletion executor for twinsift.
//!
//! Takes the deletion plan produced by `twinsift-analyze` and applies it to
//! the filesystem: as a dry run (the default), by removing files, or by
//! moving them to the platform trash.

mod executor;
mod operation;

pub use executor::{DeletionExecutor, DeletionOutcome, DeletionProgress};
pub use operation::{DeletionFailure, DeletionMode, OperationError};
