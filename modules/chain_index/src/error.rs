//! Error algebra of the chain index core

use chain_index_common::{Point, Slot, Tip};
use thiserror::Error;

/// Rejections of an in-memory index insertion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertError {
    /// A state whose tip is genesis carries no slot to insert at
    #[error("cannot insert a block with no tip")]
    InsertUtxoNoTip,

    /// The new tip does not advance the chain
    #[error("block at slot {new} is not newer than the current tip at slot {tip}")]
    DuplicateBlock { new: Slot, tip: Slot },
}

/// Rejections of an in-memory rollback
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollbackError {
    /// The requested point is older than the oldest retained state
    #[error("rollback point {0} is older than the oldest retained state")]
    OldPointNotFound(Point),

    /// A retained state at the requested slot carries a different block
    #[error("rollback point {point} does not match the retained state at {found}")]
    TipMismatch { point: Point, found: Tip },
}

/// Failures surfaced by the control and query handlers
#[derive(Debug, Error)]
pub enum ChainIndexError {
    /// A block could not be appended; the sync loop should realign
    #[error("block insertion failed: {0}")]
    InsertionFailed(#[from] InsertError),

    /// A rollback could not be applied; the sync loop should realign
    #[error("rollback failed: {0}")]
    RollbackFailed(#[from] RollbackError),

    /// A membership query was made before any block was indexed
    #[error("query failed: no tip has been indexed yet")]
    QueryFailedNoTip,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored output body failed to decode
    #[error("value codec error: {0}")]
    Codec(#[from] serde_cbor::Error),

    /// A key column failed to decode
    #[error("corrupt row: {0}")]
    CorruptRow(String),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
