//! Error types for the gramdex engine.

use crate::index::types::SlotId;
use thiserror::Error;

/// Errors raised synchronously by engine operations.
///
/// None of these are transient: they signal a programming error in the caller
/// or a record/snapshot that does not fit the data model, so nothing retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A shingle length below 1 was requested.
    #[error("shingle length must be at least 1, got {0}")]
    InvalidShingleLength(usize),

    /// The shingle cutter was handed a value that is not text.
    #[error("cannot cut a non-text value ({kind}) into shingles")]
    NonTextualInput { kind: &'static str },

    /// The id was never allocated by this engine.
    #[error("record id {0} was never allocated")]
    UnknownRecordId(SlotId),

    /// The id was allocated once but its record has since been removed.
    #[error("record id {0} has been removed")]
    StaleRecordId(SlotId),

    /// A container was reached twice during one traversal.
    #[error("structural cycle detected at depth {depth}")]
    StructuralCycle { depth: usize },

    /// A snapshot does not describe a consistent engine state.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

pub type Result<T> = std::result::Result<T, Error>;
