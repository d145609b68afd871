//! Error types for duplicate analysis.

use std::path::PathBuf;

use thiserror::Error;

use twinsift_core::ContentHash;

/// Errors raised by the analysis engine.
///
/// Grouping, classification and co-occurrence are total over well-formed
/// input; these variants signal a broken upstream contract.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// A duplicate group was built from members that cannot form one.
    #[error("Invalid duplicate group {hash}: {reason}")]
    InvalidGroup { hash: ContentHash, reason: String },

    /// A member path does not live under the group's common ancestor.
    #[error("{path} is not under common ancestor {ancestor}")]
    OutsideAncestor { path: PathBuf, ancestor: PathBuf },
}

impl AnalyzeError {
    pub(crate) fn invalid_group(hash: &ContentHash, reason: impl Into<String>) -> Self {
        Self::InvalidGroup {
            hash: hash.clone(),
            reason: reason.into(),
        }
    }
}
