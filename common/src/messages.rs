//! Definition of the messages exchanged with the chain index core

use crate::types::{DataHash, RedeemerHash, ScriptHash, Tip, TxHash, TxOut, TxOutRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single decoded transaction, as delivered by the upstream follower
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainIndexTx {
    /// Transaction hash
    pub tx_id: TxHash,

    /// References spent by this transaction
    pub inputs: Vec<TxOutRef>,

    /// Outputs created by this transaction, in output-index order
    pub outputs: Vec<TxOut>,

    /// Witness datums carried by the transaction, by hash
    pub datums: BTreeMap<DataHash, Vec<u8>>,

    /// Scripts carried by the transaction, by hash
    pub scripts: BTreeMap<ScriptHash, Vec<u8>>,

    /// Redeemers carried by the transaction, by hash
    pub redeemers: BTreeMap<RedeemerHash, Vec<u8>>,
}

impl ChainIndexTx {
    /// References of the outputs this transaction creates
    pub fn out_refs(&self) -> impl Iterator<Item = TxOutRef> + '_ {
        self.outputs
            .iter()
            .enumerate()
            .map(|(index, _)| TxOutRef::new(self.tx_id, index as u16))
    }
}

/// Per-transaction processing options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxProcessOption {
    /// When false the transaction's balance still applies but its
    /// resolvable rows (outputs, datums, scripts, redeemers, address and
    /// asset indices) are not stored
    pub store_tx: bool,
}

impl Default for TxProcessOption {
    fn default() -> Self {
        TxProcessOption { store_tx: true }
    }
}

/// One block of the sync feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSyncBlock {
    /// Tip the block establishes
    pub tip: Tip,

    /// Transactions of the block, with their processing options
    pub transactions: Vec<(ChainIndexTx, TxProcessOption)>,
}

impl ChainSyncBlock {
    pub fn new(tip: Tip, transactions: Vec<(ChainIndexTx, TxProcessOption)>) -> Self {
        ChainSyncBlock { tip, transactions }
    }
}

/// Row counts of the projection, for monitoring
///
/// Counts are -1 when the underlying aggregate returned no row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Authoritative in-memory tip
    pub tip: Tip,
    pub num_scripts: i64,
    pub num_addresses: i64,
    pub num_asset_classes: i64,
    pub num_unspent_outputs: i64,
    pub num_unmatched_inputs: i64,
}
