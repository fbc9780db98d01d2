//! Startup recovery of the in-memory index from the projection

use crate::balance::{TxUtxoBalance, UtxoState};
use crate::error::ChainIndexError;
use crate::index::UtxoIndex;
use crate::store::ChainIndexStore;
use chain_index_common::Slot;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Rebuild the index purely from the database tables
///
/// Balance rows fold into per-slot deltas under the monoid; each tip row
/// then becomes one entry, empty when the slot carried no surviving rows.
pub fn restore_state_from_db(store: &ChainIndexStore) -> Result<UtxoIndex, ChainIndexError> {
    let mut balances: BTreeMap<Slot, TxUtxoBalance> = BTreeMap::new();

    for (slot, out_ref) in store.unspent_rows()? {
        balances.entry(slot).or_default().produced.insert(out_ref);
    }
    for (slot, out_ref) in store.unmatched_rows()? {
        balances.entry(slot).or_default().consumed.insert(out_ref);
    }

    let tips = store.tips_ascending()?;
    let mut entries = Vec::with_capacity(tips.len());
    for tip in tips {
        let balance = tip
            .slot()
            .and_then(|slot| balances.remove(&slot))
            .unwrap_or_default();
        entries.push(UtxoState::new(balance, tip));
    }

    if !balances.is_empty() {
        // Rows whose slot has no tip row violate the slot anchoring
        warn!(
            orphan_slots = balances.len(),
            "ignoring balance rows with no tip row"
        );
    }

    let index = UtxoIndex::from_entries(entries);
    info!(entries = index.len(), tip = %index.tip(), "restored UTxO index");
    Ok(index)
}
