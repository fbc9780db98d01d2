//! Core type definitions for the chain index

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Slot number
pub type Slot = u64;

/// Block height
pub type BlockNumber = u64;

/// Block hash
pub type BlockHash = [u8; 32];

/// Transaction hash
pub type TxHash = [u8; 32];

/// Hash of a datum (script data)
pub type DataHash = Vec<u8>;

/// Script identifier
pub type ScriptHash = Vec<u8>;

/// Hash of a redeemer
pub type RedeemerHash = Vec<u8>;

/// Minting policy identifier
pub type PolicyId = [u8; 28];

/// Name of a native asset under a policy
pub type AssetName = Vec<u8>;

/// Amount of ada, in Lovelace
pub type Lovelace = u64;

/// The most recently applied block, or genesis when nothing has been
/// indexed yet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tip {
    Genesis,
    Specific {
        slot: Slot,
        hash: BlockHash,
        number: BlockNumber,
    },
}

impl Tip {
    pub fn new(slot: Slot, hash: BlockHash, number: BlockNumber) -> Self {
        Tip::Specific { slot, hash, number }
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self, Tip::Genesis)
    }

    /// Slot of the tip, if any
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Tip::Genesis => None,
            Tip::Specific { slot, .. } => Some(*slot),
        }
    }

    /// Block height of the tip, if any
    pub fn number(&self) -> Option<BlockNumber> {
        match self {
            Tip::Genesis => None,
            Tip::Specific { number, .. } => Some(*number),
        }
    }

    /// The same chain position with the block height dropped
    pub fn as_point(&self) -> Point {
        match self {
            Tip::Genesis => Point::Genesis,
            Tip::Specific { slot, hash, .. } => Point::Specific(*slot, *hash),
        }
    }
}

impl Ord for Tip {
    fn cmp(&self, other: &Self) -> Ordering {
        self.slot().cmp(&other.slot())
    }
}

impl PartialOrd for Tip {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Tip {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Tip::Genesis => write!(f, "genesis"),
            Tip::Specific { slot, hash, number } => {
                write!(f, "slot {} block {} ({})", slot, number, hex::encode(&hash[..8]))
            }
        }
    }
}

/// A chain position used for rollbacks and sync negotiation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Point {
    Genesis,
    Specific(Slot, BlockHash),
}

impl Point {
    pub fn is_genesis(&self) -> bool {
        matches!(self, Point::Genesis)
    }

    pub fn slot_or_default(&self) -> Slot {
        match self {
            Point::Genesis => 0,
            Point::Specific(slot, _) => *slot,
        }
    }
}

impl From<&Tip> for Point {
    fn from(tip: &Tip) -> Self {
        tip.as_point()
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Point::Genesis => write!(f, "genesis"),
            Point::Specific(slot, hash) => {
                write!(f, "slot {} ({})", slot, hex::encode(&hash[..8]))
            }
        }
    }
}

/// Reference to a transaction output
///
/// Ordering is `(tx_id, index)`, which matches the lexicographic order of
/// the 34-byte database encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxOutRef {
    pub tx_id: TxHash,
    pub index: u16,
}

impl TxOutRef {
    pub fn new(tx_id: TxHash, index: u16) -> Self {
        TxOutRef { tx_id, index }
    }
}

impl Display for TxOutRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", hex::encode(self.tx_id), self.index)
    }
}

/// Payment or stake credential carried by an address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Credential {
    AddrKeyHash(Vec<u8>),
    ScriptHash(Vec<u8>),
}

impl Credential {
    pub fn get_hash(&self) -> &[u8] {
        match self {
            Credential::AddrKeyHash(hash) => hash,
            Credential::ScriptHash(hash) => hash,
        }
    }
}

impl Display for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::AddrKeyHash(hash) => write!(f, "key:{}", hex::encode(hash)),
            Credential::ScriptHash(hash) => write!(f, "script:{}", hex::encode(hash)),
        }
    }
}

/// Address of an output, reduced to its credentials
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub payment: Credential,
    pub stake: Option<Credential>,
}

impl Address {
    pub fn new(payment: Credential) -> Self {
        Address {
            payment,
            stake: None,
        }
    }

    /// The credential outputs are indexed under
    pub fn credential(&self) -> &Credential {
        &self.payment
    }
}

/// Amount of a single native asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeAsset {
    pub name: AssetName,
    pub amount: u64,
}

/// Native assets grouped by policy
pub type NativeAssets = Vec<(PolicyId, Vec<NativeAsset>)>;

/// Output value - Lovelace plus native assets
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Value {
    pub lovelace: Lovelace,
    pub assets: NativeAssets,
}

impl Value {
    pub fn new(lovelace: Lovelace, assets: NativeAssets) -> Self {
        Value { lovelace, assets }
    }

    pub fn coin(&self) -> Lovelace {
        self.lovelace
    }

    /// All non-ada asset classes carried by this value
    pub fn asset_classes(&self) -> impl Iterator<Item = AssetClass> + '_ {
        self.assets.iter().flat_map(|(policy, assets)| {
            assets.iter().map(|asset| AssetClass {
                policy: *policy,
                name: asset.name.clone(),
            })
        })
    }
}

/// Non-ada native token identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetClass {
    pub policy: PolicyId,
    pub name: AssetName,
}

impl Display for AssetClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", hex::encode(self.policy), hex::encode(&self.name))
    }
}

/// Transaction output body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub address: Address,
    pub value: Value,
    pub datum_hash: Option<DataHash>,
}
