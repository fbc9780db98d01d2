//! Query handler
//!
//! The in-memory tip is authoritative: membership answers come from the
//! index, set queries read the database snapshot, which may lag the cell
//! by at most one writer commit. Responses carry the in-memory tip so
//! callers can observe the skew.

use crate::error::ChainIndexError;
use crate::events::ChainIndexEvent;
use crate::index::UtxoIndex;
use crate::run_blocking;
use crate::store::ChainIndexStore;
use chain_index_common::{
    AssetClass, Credential, DataHash, Page, PageQuery, RedeemerHash, ScriptHash, Tip, TxOut,
    TxOutRef,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A page of live references together with the tip it was computed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtxosResponse {
    pub tip: Tip,
    pub page: Page<TxOutRef>,
}

/// A page of historical references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxosResponse {
    pub page: Page<TxOutRef>,
}

pub struct QueryHandler {
    state: Arc<Mutex<UtxoIndex>>,
    store: ChainIndexStore,
}

impl QueryHandler {
    pub(crate) fn new(state: Arc<Mutex<UtxoIndex>>, store: ChainIndexStore) -> Self {
        Self { state, store }
    }

    pub async fn datum_from_hash(
        &self,
        hash: &DataHash,
    ) -> Result<Option<Vec<u8>>, ChainIndexError> {
        let store = self.store.clone();
        let hash = hash.clone();
        run_blocking(move || store.datum_from_hash(&hash)).await
    }

    /// Scripts of all three kinds share one table and byte encoding
    pub async fn validator_from_hash(
        &self,
        hash: &ScriptHash,
    ) -> Result<Option<Vec<u8>>, ChainIndexError> {
        self.script_from_hash(hash).await
    }

    pub async fn minting_policy_from_hash(
        &self,
        hash: &ScriptHash,
    ) -> Result<Option<Vec<u8>>, ChainIndexError> {
        self.script_from_hash(hash).await
    }

    pub async fn stake_validator_from_hash(
        &self,
        hash: &ScriptHash,
    ) -> Result<Option<Vec<u8>>, ChainIndexError> {
        self.script_from_hash(hash).await
    }

    async fn script_from_hash(
        &self,
        hash: &ScriptHash,
    ) -> Result<Option<Vec<u8>>, ChainIndexError> {
        let store = self.store.clone();
        let hash = hash.clone();
        run_blocking(move || store.script_from_hash(&hash)).await
    }

    pub async fn redeemer_from_hash(
        &self,
        hash: &RedeemerHash,
    ) -> Result<Option<Vec<u8>>, ChainIndexError> {
        let store = self.store.clone();
        let hash = hash.clone();
        run_blocking(move || store.redeemer_from_hash(&hash)).await
    }

    /// Resolve a reference to its output body; not filtered by liveness,
    /// combine with `utxo_set_membership` when liveness matters
    pub async fn tx_out_from_ref(
        &self,
        out_ref: &TxOutRef,
    ) -> Result<Option<TxOut>, ChainIndexError> {
        let store = self.store.clone();
        let out_ref = *out_ref;
        run_blocking(move || store.tx_out_from_ref(&out_ref)).await
    }

    /// Resolve a reference only while it is live
    pub async fn unspent_tx_out_from_ref(
        &self,
        out_ref: &TxOutRef,
    ) -> Result<Option<TxOut>, ChainIndexError> {
        let unspent = self.state.lock().await.is_unspent_output(out_ref);
        if !unspent {
            return Ok(None);
        }
        self.tx_out_from_ref(out_ref).await
    }

    /// Whether a reference is in the UTxO set as of the in-memory tip
    pub async fn utxo_set_membership(
        &self,
        out_ref: &TxOutRef,
    ) -> Result<(Tip, bool), ChainIndexError> {
        let index = self.state.lock().await;
        let tip = index.tip();
        if tip.is_genesis() {
            return Err(ChainIndexError::QueryFailedNoTip);
        }
        Ok((tip, index.is_unspent_output(out_ref)))
    }

    /// Live references at a payment credential, paginated
    pub async fn utxo_set_at_address(
        &self,
        query: PageQuery<TxOutRef>,
        credential: &Credential,
    ) -> Result<UtxosResponse, ChainIndexError> {
        let tip = self.state.lock().await.tip();
        if tip.is_genesis() {
            ChainIndexEvent::TipIsGenesis.emit();
            return Ok(UtxosResponse {
                tip,
                page: Page::empty(query),
            });
        }

        let store = self.store.clone();
        let credential = credential.clone();
        let page =
            run_blocking(move || store.unspent_refs_at_credential(query, &credential)).await?;
        Ok(UtxosResponse { tip, page })
    }

    /// Live references carrying an asset class, paginated
    pub async fn utxo_set_with_currency(
        &self,
        query: PageQuery<TxOutRef>,
        asset_class: &AssetClass,
    ) -> Result<UtxosResponse, ChainIndexError> {
        let tip = self.state.lock().await.tip();
        if tip.is_genesis() {
            ChainIndexEvent::TipIsGenesis.emit();
            return Ok(UtxosResponse {
                tip,
                page: Page::empty(query),
            });
        }

        let store = self.store.clone();
        let asset_class = asset_class.clone();
        let page =
            run_blocking(move || store.unspent_refs_with_asset_class(query, &asset_class)).await?;
        Ok(UtxosResponse { tip, page })
    }

    /// Every reference ever observed at a credential, spent included
    pub async fn txo_set_at_address(
        &self,
        query: PageQuery<TxOutRef>,
        credential: &Credential,
    ) -> Result<TxosResponse, ChainIndexError> {
        let tip = self.state.lock().await.tip();
        if tip.is_genesis() {
            ChainIndexEvent::TipIsGenesis.emit();
            return Ok(TxosResponse {
                page: Page::empty(query),
            });
        }

        let store = self.store.clone();
        let credential = credential.clone();
        let page = run_blocking(move || store.refs_at_credential(query, &credential)).await?;
        Ok(TxosResponse { page })
    }

    /// The max-slot row of the tip table
    pub async fn get_tip(&self) -> Result<Tip, ChainIndexError> {
        let store = self.store.clone();
        run_blocking(move || store.get_tip()).await
    }
}
