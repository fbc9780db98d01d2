//! Shared builders for the integration tests

use chain_index::{ChainIndex, ChainIndexConfig};
use chain_index_common::{
    Address, AssetClass, ChainIndexTx, ChainSyncBlock, Credential, NativeAsset, Tip, TxOut,
    TxOutRef, TxProcessOption, Value,
};
use tempfile::TempDir;

pub fn tip(slot: u64, hash_byte: u8, number: u64) -> Tip {
    Tip::new(slot, [hash_byte; 32], number)
}

pub fn address(n: u8) -> Address {
    Address::new(Credential::AddrKeyHash(vec![n]))
}

pub fn output(addr: u8, lovelace: u64) -> TxOut {
    TxOut {
        address: address(addr),
        value: Value::new(lovelace, Vec::new()),
        datum_hash: None,
    }
}

pub fn asset_output(addr: u8, asset_class: &AssetClass, amount: u64) -> TxOut {
    TxOut {
        address: address(addr),
        value: Value::new(
            1,
            vec![(
                asset_class.policy,
                vec![NativeAsset {
                    name: asset_class.name.clone(),
                    amount,
                }],
            )],
        ),
        datum_hash: None,
    }
}

pub fn tx(id: u8, inputs: Vec<TxOutRef>, outputs: Vec<TxOut>) -> ChainIndexTx {
    ChainIndexTx {
        tx_id: [id; 32],
        inputs,
        outputs,
        ..Default::default()
    }
}

pub fn block(tip: Tip, txs: Vec<ChainIndexTx>) -> ChainSyncBlock {
    ChainSyncBlock::new(
        tip,
        txs.into_iter().map(|tx| (tx, TxProcessOption::default())).collect(),
    )
}

pub fn out_ref(tx_id: u8, index: u16) -> TxOutRef {
    TxOutRef::new([tx_id; 32], index)
}

pub async fn open_index(dir: &TempDir, depth: u64) -> ChainIndex {
    let _ = tracing_subscriber::fmt::try_init();
    let config = ChainIndexConfig {
        depth,
        db_path: dir.path().join("chain-index.sqlite3"),
        batch_size: 400,
    };
    ChainIndex::open(config).await.expect("open chain index")
}
