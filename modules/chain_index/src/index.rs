//! Slot-indexed ledger of per-block UTxO deltas
//!
//! An ordered sequence of [`UtxoState`] entries with the newest tip at the
//! back. Rollbacks drop a suffix; depth reduction collapses the prefix
//! beyond the rollback window into one combined entry.

use crate::balance::{TxUtxoBalance, UtxoState};
use crate::error::{InsertError, RollbackError};
use chain_index_common::{Point, Tip, TxOutRef};

/// Outcome of a depth reduction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReduceResult {
    /// Entries older than the window were collapsed into `combined`
    Reduced { combined: UtxoState },
    NotReduced,
}

/// In-memory timeline of UTxO balances
#[derive(Debug, Clone, Default)]
pub struct UtxoIndex {
    /// Entries in ascending slot order; tips are never genesis
    entries: Vec<UtxoState>,

    /// Whether a consolidation snapshot exists; once set, rolling back to
    /// genesis would lose reduced history and is refused
    reduced: bool,
}

impl UtxoIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from restored entries, assumed slot-ascending
    pub(crate) fn from_entries(entries: Vec<UtxoState>) -> Self {
        UtxoIndex {
            entries,
            reduced: false,
        }
    }

    /// Tip of the rightmost entry
    pub fn tip(&self) -> Tip {
        match self.entries.last() {
            Some(entry) => entry.tip.clone(),
            None => Tip::Genesis,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The retained entries, oldest first
    pub fn states(&self) -> &[UtxoState] {
        &self.entries
    }

    /// Append a new state; only slot monotonicity is checked here, the
    /// predecessor hash is the follower's responsibility. Returns the
    /// entry count after insertion, used for logging.
    pub fn insert(&mut self, new: UtxoState) -> Result<usize, InsertError> {
        let new_slot = match new.tip.slot() {
            Some(slot) => slot,
            None => return Err(InsertError::InsertUtxoNoTip),
        };

        if let Some(tip_slot) = self.tip().slot() {
            if new_slot <= tip_slot {
                return Err(InsertError::DuplicateBlock {
                    new: new_slot,
                    tip: tip_slot,
                });
            }
        }

        self.entries.push(new);
        Ok(self.entries.len())
    }

    /// Drop every entry newer than `point`; returns the new tip
    pub fn rollback(&mut self, point: &Point) -> Result<Tip, RollbackError> {
        let slot = match point {
            Point::Genesis => {
                if self.reduced {
                    return Err(RollbackError::OldPointNotFound(point.clone()));
                }
                self.entries.clear();
                return Ok(Tip::Genesis);
            }
            Point::Specific(slot, _) => *slot,
        };

        let keep = self.entries.partition_point(|e| e.tip.slot() <= Some(slot));
        if keep == 0 {
            return Err(RollbackError::OldPointNotFound(point.clone()));
        }

        let found = self.entries[keep - 1].tip.clone();
        match (&found, point) {
            (Tip::Specific { slot: s, hash: h, .. }, Point::Specific(_, wanted))
                if *s == slot && h == wanted => {}
            _ => {
                return Err(RollbackError::TipMismatch {
                    point: point.clone(),
                    found,
                })
            }
        }

        self.entries.truncate(keep);
        Ok(found)
    }

    /// Collapse entries that have left the rollback window
    ///
    /// Entries whose tip is within `depth` blocks of the current tip stay
    /// individually rollbackable; anything older than those is combined
    /// into a single snapshot entry carrying the newest collapsed tip.
    pub fn reduce_block_count(&mut self, depth: u64) -> ReduceResult {
        let tip_number = match self.tip().number() {
            Some(number) => number,
            None => return ReduceResult::NotReduced,
        };

        let recent = self
            .entries
            .iter()
            .rev()
            .take_while(|e| {
                e.tip
                    .number()
                    .is_some_and(|n| tip_number.saturating_sub(n) < depth)
            })
            .count();

        if self.entries.len() <= recent + 1 {
            return ReduceResult::NotReduced;
        }

        let cut = self.entries.len() - recent;
        let mut balance = TxUtxoBalance::default();
        for entry in &self.entries[..cut] {
            balance = balance.combine(&entry.balance);
        }
        let combined = UtxoState::new(balance, self.entries[cut - 1].tip.clone());
        self.entries.splice(..cut, [combined.clone()]);
        self.reduced = true;

        ReduceResult::Reduced { combined }
    }

    /// Whether `out_ref` was created and not spent as of the tip
    ///
    /// Scanning newest to oldest, a delta consuming the ref decides before
    /// a delta producing it; a snapshot entry holding the ref in both sets
    /// therefore reads as spent, matching the projection's matched-pair
    /// deletion.
    pub fn is_unspent_output(&self, out_ref: &TxOutRef) -> bool {
        for entry in self.entries.iter().rev() {
            if entry.balance.consumed.contains(out_ref) {
                return false;
            }
            if entry.balance.produced.contains(out_ref) {
                return true;
            }
        }
        false
    }
}
