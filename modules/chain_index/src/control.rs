//! Control handler: applies follower transitions to both tiers
//!
//! Every transition is compute-then-swap: the successor index is built on
//! a clone, the database transaction commits, and only then is the shared
//! cell overwritten. A failure at either tier leaves both unchanged and is
//! surfaced to the follower, which realigns and retries.

use crate::balance::UtxoState;
use crate::error::ChainIndexError;
use crate::events::ChainIndexEvent;
use crate::index::{ReduceResult, UtxoIndex};
use crate::restore;
use crate::run_blocking;
use crate::store::{BlockProjection, ChainIndexStore};
use chain_index_common::{ChainSyncBlock, Diagnostics, Point, Tip};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct ControlHandler {
    state: Arc<Mutex<UtxoIndex>>,
    store: ChainIndexStore,
    depth: u64,
}

impl ControlHandler {
    pub(crate) fn new(state: Arc<Mutex<UtxoIndex>>, store: ChainIndexStore, depth: u64) -> Self {
        Self {
            state,
            store,
            depth,
        }
    }

    /// Append one block: validate against the in-memory index, compact
    /// history that left the rollback window, then project everything in a
    /// single database transaction
    pub async fn append_block(&self, block: &ChainSyncBlock) -> Result<(), ChainIndexError> {
        let mut index = self.state.lock().await;

        let new_state = UtxoState::from_block(block);
        let mut next = index.clone();
        let position = next.insert(new_state.clone()).map_err(|e| surface(e.into()))?;

        let reduce_to = match next.reduce_block_count(self.depth) {
            ReduceResult::Reduced { combined } => combined.tip.slot(),
            ReduceResult::NotReduced => None,
        };

        let projection =
            BlockProjection::from_block(block, &new_state).map_err(surface)?;
        let store = self.store.clone();
        run_blocking(move || store.apply_block(&projection, reduce_to))
            .await
            .map_err(surface)?;

        let tip = next.tip();
        *index = next;
        ChainIndexEvent::InsertionSuccess {
            tip: &tip,
            position,
        }
        .emit();
        Ok(())
    }

    /// Roll both tiers back to `point`; returns the new tip
    pub async fn rollback(&self, point: &Point) -> Result<Tip, ChainIndexError> {
        let mut index = self.state.lock().await;

        let mut next = index.clone();
        let tip = next.rollback(point).map_err(|e| surface(e.into()))?;

        let store = self.store.clone();
        let db_point = point.clone();
        run_blocking(move || store.rollback_to(&db_point))
            .await
            .map_err(surface)?;

        *index = next;
        ChainIndexEvent::RollbackSuccess { tip: &tip }.emit();
        Ok(tip)
    }

    /// Roll the database back to `point` and rebuild the in-memory index
    /// from it, discarding whatever the cell held
    pub async fn resume_sync(&self, point: &Point) -> Result<Tip, ChainIndexError> {
        let mut index = self.state.lock().await;

        let store = self.store.clone();
        let db_point = point.clone();
        let restored = run_blocking(move || {
            store.rollback_to(&db_point)?;
            restore::restore_state_from_db(&store)
        })
        .await
        .map_err(surface)?;

        let tip = restored.tip();
        *index = restored;
        ChainIndexEvent::RollbackSuccess { tip: &tip }.emit();
        Ok(tip)
    }

    /// Reclaim the space of the resolvable-history rows; has no effect on
    /// UTxO correctness and may run at any time
    pub async fn collect_garbage(&self) -> Result<(), ChainIndexError> {
        let store = self.store.clone();
        run_blocking(move || store.collect_garbage())
            .await
            .map_err(surface)
    }

    pub async fn diagnostics(&self) -> Result<Diagnostics, ChainIndexError> {
        let tip = self.state.lock().await.tip();
        let store = self.store.clone();
        run_blocking(move || store.diagnostics(tip)).await
    }

    /// Intersection candidates for the follower, newest first
    pub async fn resume_points(&self) -> Result<Vec<Point>, ChainIndexError> {
        let store = self.store.clone();
        run_blocking(move || store.resume_points()).await
    }
}

/// Log a failed transition before handing it to the caller
fn surface(err: ChainIndexError) -> ChainIndexError {
    ChainIndexEvent::Err(&err).emit();
    err
}
