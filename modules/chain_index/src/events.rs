//! Structured log events of the chain index

use crate::error::ChainIndexError;
use chain_index_common::Tip;
use tracing::{error, info, warn};

/// Events emitted by the control and query handlers
#[derive(Debug)]
pub enum ChainIndexEvent<'a> {
    /// A block was appended; `position` is the window depth it landed at
    InsertionSuccess { tip: &'a Tip, position: usize },

    /// A rollback was applied
    RollbackSuccess { tip: &'a Tip },

    /// A set query arrived before any block was indexed
    TipIsGenesis,

    Err(&'a ChainIndexError),
}

impl ChainIndexEvent<'_> {
    pub fn emit(&self) {
        match self {
            ChainIndexEvent::InsertionSuccess { tip, position } => {
                info!(tip = %tip, position, "block inserted");
            }
            ChainIndexEvent::RollbackSuccess { tip } => {
                info!(tip = %tip, "rolled back");
            }
            ChainIndexEvent::TipIsGenesis => {
                warn!("query served from an unindexed chain, tip is genesis");
            }
            ChainIndexEvent::Err(err) => {
                error!(error = %err, "chain index error");
            }
        }
    }
}
