//! Table definitions and key-column codecs
//!
//! Every key column is a fixed, unambiguous byte encoding so that SQLite's
//! blob memcmp order equals the domain order.

use crate::error::ChainIndexError;
use chain_index_common::{AssetClass, Credential, PolicyId, TxHash, TxOutRef};

/// Schema SQL embedded at compile time
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Length of an encoded out-ref: 32-byte tx hash plus big-endian index
const OUT_REF_LEN: usize = 34;

/// Credential tag bytes
const TAG_ADDR_KEY_HASH: u8 = 0;
const TAG_SCRIPT_HASH: u8 = 1;

/// Bidirectional value-to-column coding for key types
pub trait DbKey: Sized {
    fn to_db_bytes(&self) -> Vec<u8>;
    fn from_db_bytes(bytes: &[u8]) -> Result<Self, ChainIndexError>;
}

impl DbKey for TxOutRef {
    fn to_db_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(OUT_REF_LEN);
        buf.extend_from_slice(&self.tx_id);
        buf.extend_from_slice(&self.index.to_be_bytes());
        buf
    }

    fn from_db_bytes(bytes: &[u8]) -> Result<Self, ChainIndexError> {
        if bytes.len() != OUT_REF_LEN {
            return Err(ChainIndexError::CorruptRow(format!(
                "out_ref must be {} bytes, got {}",
                OUT_REF_LEN,
                bytes.len()
            )));
        }
        let mut tx_id: TxHash = [0; 32];
        tx_id.copy_from_slice(&bytes[..32]);
        let index = u16::from_be_bytes([bytes[32], bytes[33]]);
        Ok(TxOutRef { tx_id, index })
    }
}

impl DbKey for Credential {
    fn to_db_bytes(&self) -> Vec<u8> {
        let (tag, hash) = match self {
            Credential::AddrKeyHash(hash) => (TAG_ADDR_KEY_HASH, hash),
            Credential::ScriptHash(hash) => (TAG_SCRIPT_HASH, hash),
        };
        let mut buf = Vec::with_capacity(1 + hash.len());
        buf.push(tag);
        buf.extend_from_slice(hash);
        buf
    }

    fn from_db_bytes(bytes: &[u8]) -> Result<Self, ChainIndexError> {
        match bytes.split_first() {
            Some((&TAG_ADDR_KEY_HASH, hash)) => Ok(Credential::AddrKeyHash(hash.to_vec())),
            Some((&TAG_SCRIPT_HASH, hash)) => Ok(Credential::ScriptHash(hash.to_vec())),
            Some((tag, _)) => Err(ChainIndexError::CorruptRow(format!(
                "unknown credential tag {tag}"
            ))),
            None => Err(ChainIndexError::CorruptRow("empty credential".to_string())),
        }
    }
}

impl DbKey for AssetClass {
    fn to_db_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.policy.len() + self.name.len());
        buf.extend_from_slice(&self.policy);
        buf.extend_from_slice(&self.name);
        buf
    }

    fn from_db_bytes(bytes: &[u8]) -> Result<Self, ChainIndexError> {
        if bytes.len() < 28 {
            return Err(ChainIndexError::CorruptRow(format!(
                "asset_class must hold a 28-byte policy, got {} bytes",
                bytes.len()
            )));
        }
        let mut policy: PolicyId = [0; 28];
        policy.copy_from_slice(&bytes[..28]);
        Ok(AssetClass {
            policy,
            name: bytes[28..].to_vec(),
        })
    }
}

// -- Tests --
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_ref_byte_order_matches_domain_order() {
        let mut refs = vec![
            TxOutRef::new([2; 32], 0),
            TxOutRef::new([1; 32], 300),
            TxOutRef::new([1; 32], 2),
        ];
        let mut encoded: Vec<Vec<u8>> = refs.iter().map(DbKey::to_db_bytes).collect();
        refs.sort();
        encoded.sort();
        let decoded: Vec<TxOutRef> = encoded
            .iter()
            .map(|b| TxOutRef::from_db_bytes(b).unwrap())
            .collect();
        assert_eq!(refs, decoded);
    }

    #[test]
    fn out_ref_rejects_a_wrong_length() {
        assert!(TxOutRef::from_db_bytes(&[0; 33]).is_err());
        assert!(TxOutRef::from_db_bytes(&[0; 35]).is_err());
    }

    #[test]
    fn credential_tags_keep_key_and_script_hashes_apart() {
        let key = Credential::AddrKeyHash(vec![7; 28]);
        let script = Credential::ScriptHash(vec![7; 28]);
        assert_ne!(key.to_db_bytes(), script.to_db_bytes());
        assert_eq!(key, Credential::from_db_bytes(&key.to_db_bytes()).unwrap());
        assert_eq!(
            script,
            Credential::from_db_bytes(&script.to_db_bytes()).unwrap()
        );
        assert!(Credential::from_db_bytes(&[9, 1, 2]).is_err());
    }

    #[test]
    fn asset_class_splits_at_the_policy_boundary() {
        let class = AssetClass {
            policy: [3; 28],
            name: b"TOKEN".to_vec(),
        };
        let decoded = AssetClass::from_db_bytes(&class.to_db_bytes()).unwrap();
        assert_eq!(class, decoded);
        assert!(AssetClass::from_db_bytes(&[0; 27]).is_err());
    }
}
