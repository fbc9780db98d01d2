//! Per-block UTxO delta and its monoid

use chain_index_common::{ChainSyncBlock, Tip, TxOutRef};
use imbl::OrdSet;

/// Outputs created and inputs consumed by one block
///
/// An output created and spent within the same block cancels out and
/// appears in neither set. The sets use persistent trees so cloning a
/// whole window of balances stays cheap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxUtxoBalance {
    /// References created and still unmatched within this delta
    pub produced: OrdSet<TxOutRef>,

    /// References spent whose creation lies in an earlier delta
    pub consumed: OrdSet<TxOutRef>,
}

impl TxUtxoBalance {
    /// Componentwise union; `Default` is the identity
    pub fn combine(&self, other: &TxUtxoBalance) -> TxUtxoBalance {
        TxUtxoBalance {
            produced: self.produced.clone().union(other.produced.clone()),
            consumed: self.consumed.clone().union(other.consumed.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.produced.is_empty() && self.consumed.is_empty()
    }
}

/// The unit carried at each slot of the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtxoState {
    pub balance: TxUtxoBalance,
    pub tip: Tip,
}

impl UtxoState {
    pub fn new(balance: TxUtxoBalance, tip: Tip) -> Self {
        UtxoState { balance, tip }
    }

    /// Compute the block's delta from its transactions
    pub fn from_block(block: &ChainSyncBlock) -> UtxoState {
        let mut outs: OrdSet<TxOutRef> = OrdSet::new();
        let mut ins: OrdSet<TxOutRef> = OrdSet::new();

        for (tx, _) in &block.transactions {
            for out_ref in tx.out_refs() {
                outs.insert(out_ref);
            }
            for input in &tx.inputs {
                ins.insert(*input);
            }
        }

        // Intra-block created-and-spent pairs cancel on both sides
        let balance = TxUtxoBalance {
            produced: outs.clone().relative_complement(ins.clone()),
            consumed: ins.relative_complement(outs),
        };

        UtxoState {
            balance,
            tip: block.tip.clone(),
        }
    }
}

// -- Tests --
#[cfg(test)]
mod tests {
    use super::*;
    use chain_index_common::{
        Address, ChainIndexTx, Credential, TxHash, TxOut, TxProcessOption, Value,
    };

    fn hash(n: u8) -> TxHash {
        [n; 32]
    }

    fn out() -> TxOut {
        TxOut {
            address: Address::new(Credential::AddrKeyHash(vec![9])),
            value: Value::new(42, Vec::new()),
            datum_hash: None,
        }
    }

    fn tx(id: u8, inputs: Vec<TxOutRef>, n_outputs: usize) -> (ChainIndexTx, TxProcessOption) {
        (
            ChainIndexTx {
                tx_id: hash(id),
                inputs,
                outputs: (0..n_outputs).map(|_| out()).collect(),
                ..Default::default()
            },
            TxProcessOption::default(),
        )
    }

    fn balance(produced: &[TxOutRef], consumed: &[TxOutRef]) -> TxUtxoBalance {
        TxUtxoBalance {
            produced: produced.iter().copied().collect(),
            consumed: consumed.iter().copied().collect(),
        }
    }

    #[test]
    fn from_block_collects_outputs_and_inputs() {
        let spent = TxOutRef::new(hash(0), 0);
        let block = ChainSyncBlock::new(
            Tip::new(10, hash(1), 1),
            vec![tx(1, vec![spent], 2)],
        );

        let state = UtxoState::from_block(&block);
        assert_eq!(
            state.balance,
            balance(
                &[TxOutRef::new(hash(1), 0), TxOutRef::new(hash(1), 1)],
                &[spent]
            )
        );
        assert_eq!(state.tip, block.tip);
    }

    #[test]
    fn from_block_cancels_intra_block_pairs() {
        // tx 1 creates two outputs, tx 2 spends the first in the same block
        let block = ChainSyncBlock::new(
            Tip::new(10, hash(1), 1),
            vec![tx(1, vec![], 2), tx(2, vec![TxOutRef::new(hash(1), 0)], 1)],
        );

        let state = UtxoState::from_block(&block);
        assert_eq!(
            state.balance,
            balance(
                &[TxOutRef::new(hash(1), 1), TxOutRef::new(hash(2), 0)],
                &[]
            )
        );
    }

    #[test]
    fn combine_identity() {
        let b = balance(&[TxOutRef::new(hash(1), 0)], &[TxOutRef::new(hash(2), 0)]);
        assert_eq!(b, b.combine(&TxUtxoBalance::default()));
        assert_eq!(b, TxUtxoBalance::default().combine(&b));
    }

    #[test]
    fn combine_is_componentwise_union() {
        let a = balance(&[TxOutRef::new(hash(1), 0)], &[]);
        let b = balance(&[TxOutRef::new(hash(2), 0)], &[TxOutRef::new(hash(1), 0)]);
        let combined = a.combine(&b);
        assert_eq!(
            combined,
            balance(
                &[TxOutRef::new(hash(1), 0), TxOutRef::new(hash(2), 0)],
                &[TxOutRef::new(hash(1), 0)]
            )
        );
    }
}
