//! SQLite projection of the chain index
//!
//! One store per connection; the control handler owns the writer, the
//! query handler a reader on the same file. Every write entry point runs a
//! single transaction so an abort leaves the database untouched.

use crate::balance::UtxoState;
use crate::error::{ChainIndexError, InsertError};
use crate::schema::{DbKey, SCHEMA_SQL};
use chain_index_common::{
    AssetClass, ChainSyncBlock, Credential, Diagnostics, Page, PageQuery, Point, Slot, Tip,
    TxOut, TxOutRef,
};
use parking_lot::Mutex;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::Arc;

const UNSPENT_AT_CREDENTIAL_SQL: &str = "\
    SELECT DISTINCT out_ref FROM addresses \
    WHERE credential = ?1 \
      AND (?2 IS NULL OR out_ref > ?2) \
      AND out_ref IN (SELECT out_ref FROM unspent_outputs) \
      AND out_ref NOT IN (SELECT out_ref FROM unmatched_inputs) \
    ORDER BY out_ref ASC LIMIT ?3";

const UNSPENT_WITH_ASSET_CLASS_SQL: &str = "\
    SELECT DISTINCT out_ref FROM asset_classes \
    WHERE asset_class = ?1 \
      AND (?2 IS NULL OR out_ref > ?2) \
      AND out_ref IN (SELECT out_ref FROM unspent_outputs) \
      AND out_ref NOT IN (SELECT out_ref FROM unmatched_inputs) \
    ORDER BY out_ref ASC LIMIT ?3";

const TXO_AT_CREDENTIAL_SQL: &str = "\
    SELECT DISTINCT out_ref FROM addresses \
    WHERE credential = ?1 \
      AND (?2 IS NULL OR out_ref > ?2) \
    ORDER BY out_ref ASC LIMIT ?3";

/// Rows a block contributes to the projection, computed before any
/// database work so the write itself is a straight transaction
#[derive(Debug, Clone)]
pub struct BlockProjection {
    tip_slot: i64,
    tip_hash: Vec<u8>,
    tip_number: i64,
    unspent: Vec<Vec<u8>>,
    unmatched: Vec<Vec<u8>>,
    tx_outs: Vec<(Vec<u8>, Vec<u8>)>,
    datums: Vec<(Vec<u8>, Vec<u8>)>,
    scripts: Vec<(Vec<u8>, Vec<u8>)>,
    redeemers: Vec<(Vec<u8>, Vec<u8>)>,
    addresses: Vec<(Vec<u8>, Vec<u8>)>,
    asset_classes: Vec<(Vec<u8>, Vec<u8>)>,
}

impl BlockProjection {
    /// Project a block and its computed delta into rows, respecting each
    /// transaction's `store_tx` flag
    pub fn from_block(
        block: &ChainSyncBlock,
        state: &UtxoState,
    ) -> Result<Self, ChainIndexError> {
        let (slot, hash, number) = match &state.tip {
            Tip::Specific { slot, hash, number } => (*slot, hash.to_vec(), *number),
            Tip::Genesis => return Err(InsertError::InsertUtxoNoTip.into()),
        };

        let mut projection = BlockProjection {
            tip_slot: slot as i64,
            tip_hash: hash,
            tip_number: number as i64,
            unspent: state.balance.produced.iter().map(DbKey::to_db_bytes).collect(),
            unmatched: state.balance.consumed.iter().map(DbKey::to_db_bytes).collect(),
            tx_outs: Vec::new(),
            datums: Vec::new(),
            scripts: Vec::new(),
            redeemers: Vec::new(),
            addresses: Vec::new(),
            asset_classes: Vec::new(),
        };

        for (tx, option) in &block.transactions {
            if !option.store_tx {
                continue;
            }

            for (out_ref, tx_out) in tx.out_refs().zip(&tx.outputs) {
                let key = out_ref.to_db_bytes();
                projection
                    .tx_outs
                    .push((key.clone(), serde_cbor::to_vec(tx_out)?));
                projection
                    .addresses
                    .push((tx_out.address.credential().to_db_bytes(), key.clone()));
                for asset_class in tx_out.value.asset_classes() {
                    projection
                        .asset_classes
                        .push((asset_class.to_db_bytes(), key.clone()));
                }
            }

            for (hash, datum) in &tx.datums {
                projection.datums.push((hash.clone(), datum.clone()));
            }
            for (hash, script) in &tx.scripts {
                projection.scripts.push((hash.clone(), script.clone()));
            }
            for (hash, redeemer) in &tx.redeemers {
                projection.redeemers.push((hash.clone(), redeemer.clone()));
            }
        }

        Ok(projection)
    }
}

/// SQLite-backed projection store
#[derive(Clone)]
pub struct ChainIndexStore {
    conn: Arc<Mutex<Connection>>,
    batch_size: usize,
}

impl ChainIndexStore {
    /// Open (or create) the database and apply the schema
    pub fn open<P: AsRef<Path>>(path: P, batch_size: usize) -> Result<Self, ChainIndexError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "wal")?;
        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            batch_size,
        })
    }

    // -- Control-side writes --

    /// Project one appended block, optionally compacting history below
    /// `reduce_to` first, all within one transaction
    pub fn apply_block(
        &self,
        projection: &BlockProjection,
        reduce_to: Option<Slot>,
    ) -> Result<(), ChainIndexError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        if let Some(slot) = reduce_to {
            Self::reduce_old_utxo(&tx, slot)?;
        }

        self.insert_pairs(&tx, "utxo_out_ref", &["out_ref", "tx_out"], &projection.tx_outs)?;
        self.insert_pairs(&tx, "datums", &["hash", "datum"], &projection.datums)?;
        self.insert_pairs(&tx, "scripts", &["hash", "script"], &projection.scripts)?;
        self.insert_pairs(&tx, "redeemers", &["hash", "redeemer"], &projection.redeemers)?;
        self.insert_pairs(&tx, "addresses", &["credential", "out_ref"], &projection.addresses)?;
        self.insert_pairs(
            &tx,
            "asset_classes",
            &["asset_class", "out_ref"],
            &projection.asset_classes,
        )?;

        tx.execute(
            "INSERT INTO tip (slot, block_id, block_no) VALUES (?1, ?2, ?3)",
            params![projection.tip_slot, projection.tip_hash, projection.tip_number],
        )?;
        self.insert_slot_refs(&tx, "unspent_outputs", projection.tip_slot, &projection.unspent)?;
        self.insert_slot_refs(
            &tx,
            "unmatched_inputs",
            projection.tip_slot,
            &projection.unmatched,
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Compact every slot below `slot` into it
    fn reduce_old_utxo(tx: &Transaction, slot: Slot) -> Result<(), ChainIndexError> {
        let slot = slot as i64;
        tx.execute("DELETE FROM tip WHERE slot < ?1", params![slot])?;
        tx.execute(
            "UPDATE unspent_outputs SET tip_slot = ?1 WHERE tip_slot < ?1",
            params![slot],
        )?;
        tx.execute(
            "UPDATE unmatched_inputs SET tip_slot = ?1 WHERE tip_slot < ?1",
            params![slot],
        )?;
        // The schema trigger cascades each delete to the pairing
        // unmatched_inputs row
        tx.execute(
            "DELETE FROM unspent_outputs WHERE tip_slot = ?1 AND out_ref IN \
             (SELECT out_ref FROM unmatched_inputs WHERE tip_slot = ?1)",
            params![slot],
        )?;
        Ok(())
    }

    /// Drop all UTxO state newer than `point`; the per-tx indices are
    /// address-anchored history and survive
    pub fn rollback_to(&self, point: &Point) -> Result<(), ChainIndexError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        match point {
            Point::Genesis => {
                tx.execute("DELETE FROM unmatched_inputs", [])?;
                tx.execute("DELETE FROM unspent_outputs", [])?;
                tx.execute("DELETE FROM tip", [])?;
            }
            Point::Specific(slot, _) => {
                let slot = *slot as i64;
                tx.execute(
                    "DELETE FROM unmatched_inputs WHERE tip_slot > ?1",
                    params![slot],
                )?;
                tx.execute(
                    "DELETE FROM unspent_outputs WHERE tip_slot > ?1",
                    params![slot],
                )?;
                tx.execute("DELETE FROM tip WHERE slot > ?1", params![slot])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Truncate the per-tx indices; UTxO state is untouched
    pub fn collect_garbage(&self) -> Result<(), ChainIndexError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        for table in [
            "datums",
            "scripts",
            "redeemers",
            "utxo_out_ref",
            "addresses",
            "asset_classes",
        ] {
            tx.execute(&format!("DELETE FROM {table}"), [])?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Row counts for monitoring; `tip` is supplied by the caller from the
    /// in-memory index
    pub fn diagnostics(&self, tip: Tip) -> Result<Diagnostics, ChainIndexError> {
        let conn = self.conn.lock();
        let count = |sql: &str| -> Result<i64, rusqlite::Error> {
            Ok(conn
                .query_row(sql, [], |row| row.get::<_, i64>(0))
                .optional()?
                .unwrap_or(-1))
        };

        Ok(Diagnostics {
            tip,
            num_scripts: count("SELECT COUNT(*) FROM scripts")?,
            num_addresses: count("SELECT COUNT(DISTINCT credential) FROM addresses")?,
            num_asset_classes: count("SELECT COUNT(DISTINCT asset_class) FROM asset_classes")?,
            num_unspent_outputs: count("SELECT COUNT(*) FROM unspent_outputs")?,
            num_unmatched_inputs: count("SELECT COUNT(*) FROM unmatched_inputs")?,
        })
    }

    // -- Query-side reads --

    /// The max-slot tip row, or genesis when the table is empty
    pub fn get_tip(&self) -> Result<Tip, ChainIndexError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT slot, block_id, block_no FROM tip ORDER BY slot DESC LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Vec<u8>>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((slot, hash, number)) => Ok(Tip::new(
                slot as Slot,
                block_hash(&hash)?,
                number as u64,
            )),
            None => Ok(Tip::Genesis),
        }
    }

    pub fn datum_from_hash(&self, hash: &[u8]) -> Result<Option<Vec<u8>>, ChainIndexError> {
        self.blob_from_hash("SELECT datum FROM datums WHERE hash = ?1", hash)
    }

    pub fn script_from_hash(&self, hash: &[u8]) -> Result<Option<Vec<u8>>, ChainIndexError> {
        self.blob_from_hash("SELECT script FROM scripts WHERE hash = ?1", hash)
    }

    pub fn redeemer_from_hash(&self, hash: &[u8]) -> Result<Option<Vec<u8>>, ChainIndexError> {
        self.blob_from_hash("SELECT redeemer FROM redeemers WHERE hash = ?1", hash)
    }

    fn blob_from_hash(
        &self,
        sql: &str,
        hash: &[u8],
    ) -> Result<Option<Vec<u8>>, ChainIndexError> {
        let conn = self.conn.lock();
        Ok(conn
            .query_row(sql, params![hash], |row| row.get::<_, Vec<u8>>(0))
            .optional()?)
    }

    /// Resolve a reference to its full output body, spent or not
    pub fn tx_out_from_ref(&self, out_ref: &TxOutRef) -> Result<Option<TxOut>, ChainIndexError> {
        let conn = self.conn.lock();
        let blob = conn
            .query_row(
                "SELECT tx_out FROM utxo_out_ref WHERE out_ref = ?1",
                params![out_ref.to_db_bytes()],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;

        match blob {
            Some(bytes) => Ok(Some(serde_cbor::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Live references indexed under a payment credential
    pub fn unspent_refs_at_credential(
        &self,
        query: PageQuery<TxOutRef>,
        credential: &Credential,
    ) -> Result<Page<TxOutRef>, ChainIndexError> {
        self.ref_page(UNSPENT_AT_CREDENTIAL_SQL, credential.to_db_bytes(), query)
    }

    /// Live references carrying a native asset class
    pub fn unspent_refs_with_asset_class(
        &self,
        query: PageQuery<TxOutRef>,
        asset_class: &AssetClass,
    ) -> Result<Page<TxOutRef>, ChainIndexError> {
        self.ref_page(UNSPENT_WITH_ASSET_CLASS_SQL, asset_class.to_db_bytes(), query)
    }

    /// Every reference ever indexed under a credential, spent included
    pub fn refs_at_credential(
        &self,
        query: PageQuery<TxOutRef>,
        credential: &Credential,
    ) -> Result<Page<TxOutRef>, ChainIndexError> {
        self.ref_page(TXO_AT_CREDENTIAL_SQL, credential.to_db_bytes(), query)
    }

    fn ref_page(
        &self,
        sql: &str,
        key: Vec<u8>,
        query: PageQuery<TxOutRef>,
    ) -> Result<Page<TxOutRef>, ChainIndexError> {
        let conn = self.conn.lock();
        let after = query.after_key.as_ref().map(DbKey::to_db_bytes);
        let limit = (query.page_size + 1) as i64;

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![key, after, limit], |row| row.get::<_, Vec<u8>>(0))?;

        let mut items = Vec::with_capacity(query.page_size);
        for row in rows {
            items.push(TxOutRef::from_db_bytes(&row?)?);
        }
        Ok(Page::from_items(query, items))
    }

    // -- Restore reads --

    /// All tip rows, oldest first
    pub fn tips_ascending(&self) -> Result<Vec<Tip>, ChainIndexError> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT slot, block_id, block_no FROM tip ORDER BY slot ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut tips = Vec::new();
        for row in rows {
            let (slot, hash, number) = row?;
            tips.push(Tip::new(slot as Slot, block_hash(&hash)?, number as u64));
        }
        Ok(tips)
    }

    pub fn unspent_rows(&self) -> Result<Vec<(Slot, TxOutRef)>, ChainIndexError> {
        self.slot_ref_rows("SELECT tip_slot, out_ref FROM unspent_outputs")
    }

    pub fn unmatched_rows(&self) -> Result<Vec<(Slot, TxOutRef)>, ChainIndexError> {
        self.slot_ref_rows("SELECT tip_slot, out_ref FROM unmatched_inputs")
    }

    fn slot_ref_rows(&self, sql: &str) -> Result<Vec<(Slot, TxOutRef)>, ChainIndexError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (slot, bytes) = row?;
            out.push((slot as Slot, TxOutRef::from_db_bytes(&bytes)?));
        }
        Ok(out)
    }

    /// Candidate intersection points for the follower, newest first, with
    /// genesis as the final fallback
    pub fn resume_points(&self) -> Result<Vec<Point>, ChainIndexError> {
        let mut points: Vec<Point> = {
            let conn = self.conn.lock();
            let mut stmt =
                conn.prepare("SELECT slot, block_id FROM tip ORDER BY slot DESC")?;
            let rows =
                stmt.query_map([], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?))
                })?;

            let mut points = Vec::new();
            for row in rows {
                let (slot, hash) = row?;
                points.push(Point::Specific(slot as Slot, block_hash(&hash)?));
            }
            points
        };
        points.push(Point::Genesis);
        Ok(points)
    }

    // -- Batched inserts --

    /// Hash-keyed and out-ref-keyed pair tables; upserts keep re-observed
    /// rows single while the non-unique index tables tolerate duplicates
    fn insert_pairs(
        &self,
        tx: &Transaction,
        table: &str,
        columns: &[&str; 2],
        pairs: &[(Vec<u8>, Vec<u8>)],
    ) -> Result<(), ChainIndexError> {
        let rows: Vec<[SqlValue; 2]> = pairs
            .iter()
            .map(|(a, b)| [SqlValue::Blob(a.clone()), SqlValue::Blob(b.clone())])
            .collect();
        self.insert_batched(tx, table, columns, &rows)
    }

    fn insert_slot_refs(
        &self,
        tx: &Transaction,
        table: &str,
        tip_slot: i64,
        refs: &[Vec<u8>],
    ) -> Result<(), ChainIndexError> {
        let rows: Vec<[SqlValue; 2]> = refs
            .iter()
            .map(|r| [SqlValue::Integer(tip_slot), SqlValue::Blob(r.clone())])
            .collect();
        self.insert_batched(tx, table, &["tip_slot", "out_ref"], &rows)
    }

    /// Multi-row inserts chunked to `batch_size` rows per statement, which
    /// keeps the bound-parameter count under the SQLite limit
    fn insert_batched(
        &self,
        tx: &Transaction,
        table: &str,
        columns: &[&str; 2],
        rows: &[[SqlValue; 2]],
    ) -> Result<(), ChainIndexError> {
        if rows.is_empty() {
            return Ok(());
        }

        for chunk in rows.chunks(self.batch_size) {
            let values = vec!["(?, ?)"; chunk.len()].join(", ");
            let sql = format!(
                "INSERT OR REPLACE INTO {} ({}, {}) VALUES {}",
                table, columns[0], columns[1], values
            );
            let params = rusqlite::params_from_iter(chunk.iter().flatten().cloned());
            tx.execute(&sql, params)?;
        }
        Ok(())
    }
}

fn block_hash(bytes: &[u8]) -> Result<[u8; 32], ChainIndexError> {
    bytes.try_into().map_err(|_| {
        ChainIndexError::CorruptRow(format!("block_id must be 32 bytes, got {}", bytes.len()))
    })
}

// -- Tests --
#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::TxUtxoBalance;
    use chain_index_common::{Address, ChainIndexTx, NativeAsset, TxProcessOption, Value};
    use imbl::OrdSet;
    use tempfile::tempdir;

    fn test_store(batch_size: usize) -> (tempfile::TempDir, ChainIndexStore) {
        let dir = tempdir().unwrap();
        let store = ChainIndexStore::open(dir.path().join("index.sqlite3"), batch_size).unwrap();
        (dir, store)
    }

    fn out_ref(n: u8) -> TxOutRef {
        TxOutRef::new([n; 32], 0)
    }

    fn state(slot: u64, number: u64, produced: &[TxOutRef], consumed: &[TxOutRef]) -> UtxoState {
        UtxoState::new(
            TxUtxoBalance {
                produced: produced.iter().copied().collect::<OrdSet<_>>(),
                consumed: consumed.iter().copied().collect::<OrdSet<_>>(),
            },
            Tip::new(slot, [slot as u8; 32], number),
        )
    }

    fn block_for(state: &UtxoState) -> ChainSyncBlock {
        ChainSyncBlock::new(state.tip.clone(), Vec::new())
    }

    fn apply(store: &ChainIndexStore, state: &UtxoState, reduce_to: Option<Slot>) {
        let projection = BlockProjection::from_block(&block_for(state), state).unwrap();
        store.apply_block(&projection, reduce_to).unwrap();
    }

    #[test]
    fn tip_round_trips_and_tracks_the_max_slot() {
        let (_dir, store) = test_store(400);
        assert_eq!(Tip::Genesis, store.get_tip().unwrap());

        apply(&store, &state(10, 1, &[out_ref(1)], &[]), None);
        apply(&store, &state(20, 2, &[out_ref(2)], &[out_ref(1)]), None);
        assert_eq!(Tip::new(20, [20; 32], 2), store.get_tip().unwrap());
    }

    #[test]
    fn rollback_drops_rows_above_the_point() {
        let (_dir, store) = test_store(400);
        apply(&store, &state(10, 1, &[out_ref(1)], &[]), None);
        apply(&store, &state(20, 2, &[out_ref(2)], &[out_ref(1)]), None);

        store.rollback_to(&Point::Specific(10, [10; 32])).unwrap();
        assert_eq!(Tip::new(10, [10; 32], 1), store.get_tip().unwrap());
        assert_eq!(vec![(10, out_ref(1))], store.unspent_rows().unwrap());
        assert!(store.unmatched_rows().unwrap().is_empty());
    }

    #[test]
    fn rollback_to_genesis_wipes_utxo_state_only() {
        let (_dir, store) = test_store(400);
        let produced = state(10, 1, &[out_ref(1)], &[]);
        let mut block = block_for(&produced);
        block.transactions.push((
            ChainIndexTx {
                tx_id: [1; 32],
                outputs: vec![TxOut {
                    address: Address::new(Credential::AddrKeyHash(vec![7])),
                    value: Value::new(5, Vec::new()),
                    datum_hash: None,
                }],
                ..Default::default()
            },
            TxProcessOption::default(),
        ));
        let projection = BlockProjection::from_block(&block, &produced).unwrap();
        store.apply_block(&projection, None).unwrap();

        store.rollback_to(&Point::Genesis).unwrap();
        assert_eq!(Tip::Genesis, store.get_tip().unwrap());
        assert!(store.unspent_rows().unwrap().is_empty());
        // History rows survive a rollback
        assert!(store.tx_out_from_ref(&out_ref(1)).unwrap().is_some());
    }

    #[test]
    fn reduction_reslots_history_and_the_trigger_drops_matched_pairs() {
        let (_dir, store) = test_store(400);
        apply(&store, &state(10, 1, &[out_ref(1), out_ref(2)], &[]), None);
        apply(&store, &state(20, 2, &[out_ref(3)], &[out_ref(1)]), None);
        // Third block arrives and the window compacts below slot 20
        apply(&store, &state(30, 3, &[], &[]), Some(20));

        let mut unspent = store.unspent_rows().unwrap();
        unspent.sort();
        // out_ref(1) was matched by its spend and both rows are gone
        assert_eq!(vec![(20, out_ref(2)), (20, out_ref(3))], unspent);
        assert!(store.unmatched_rows().unwrap().is_empty());

        let tips = store.tips_ascending().unwrap();
        assert_eq!(
            vec![Tip::new(20, [20; 32], 2), Tip::new(30, [30; 32], 3)],
            tips
        );
    }

    #[test]
    fn unmatched_spend_of_recent_output_survives_reduction() {
        let (_dir, store) = test_store(400);
        apply(&store, &state(10, 1, &[out_ref(1)], &[]), None);
        // The spend sits inside the window while the creation compacts
        apply(&store, &state(20, 2, &[], &[out_ref(1)]), None);
        apply(&store, &state(30, 3, &[], &[]), Some(10));

        assert_eq!(vec![(10, out_ref(1))], store.unspent_rows().unwrap());
        assert_eq!(vec![(20, out_ref(1))], store.unmatched_rows().unwrap());
    }

    #[test]
    fn batched_inserts_cover_more_rows_than_one_batch() {
        let (_dir, store) = test_store(7);
        let refs: Vec<TxOutRef> = (0..100u16).map(|i| TxOutRef::new([1; 32], i)).collect();
        apply(&store, &state(10, 1, &refs, &[]), None);
        assert_eq!(100, store.unspent_rows().unwrap().len());
    }

    #[test]
    fn collect_garbage_keeps_utxo_state() {
        let (_dir, store) = test_store(400);
        let produced = state(10, 1, &[TxOutRef::new([1; 32], 0)], &[]);
        let mut block = block_for(&produced);
        block.transactions.push((
            ChainIndexTx {
                tx_id: [1; 32],
                outputs: vec![TxOut {
                    address: Address::new(Credential::AddrKeyHash(vec![7])),
                    value: Value::new(
                        5,
                        vec![(
                            [2; 28],
                            vec![NativeAsset {
                                name: b"TOKEN".to_vec(),
                                amount: 1,
                            }],
                        )],
                    ),
                    datum_hash: None,
                }],
                datums: [(vec![9], vec![1, 2, 3])].into_iter().collect(),
                ..Default::default()
            },
            TxProcessOption::default(),
        ));
        let projection = BlockProjection::from_block(&block, &produced).unwrap();
        store.apply_block(&projection, None).unwrap();

        store.collect_garbage().unwrap();

        assert!(store.datum_from_hash(&[9]).unwrap().is_none());
        assert!(store.tx_out_from_ref(&TxOutRef::new([1; 32], 0)).unwrap().is_none());
        let diagnostics = store.diagnostics(Tip::Genesis).unwrap();
        assert_eq!(0, diagnostics.num_addresses);
        assert_eq!(1, diagnostics.num_unspent_outputs);
    }

    #[test]
    fn store_tx_flag_skips_resolvable_rows_only() {
        let (_dir, store) = test_store(400);
        let produced = state(10, 1, &[TxOutRef::new([1; 32], 0)], &[]);
        let mut block = block_for(&produced);
        block.transactions.push((
            ChainIndexTx {
                tx_id: [1; 32],
                outputs: vec![TxOut {
                    address: Address::new(Credential::AddrKeyHash(vec![7])),
                    value: Value::new(5, Vec::new()),
                    datum_hash: None,
                }],
                ..Default::default()
            },
            TxProcessOption { store_tx: false },
        ));
        let projection = BlockProjection::from_block(&block, &produced).unwrap();
        store.apply_block(&projection, None).unwrap();

        assert!(store.tx_out_from_ref(&TxOutRef::new([1; 32], 0)).unwrap().is_none());
        assert_eq!(1, store.unspent_rows().unwrap().len());
    }
}
