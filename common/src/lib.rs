// Chain index common library - main library exports

pub mod messages;
pub mod pagination;
pub mod types;

// Flattened re-exports
pub use self::messages::{ChainIndexTx, ChainSyncBlock, Diagnostics, TxProcessOption};
pub use self::pagination::{Page, PageQuery};
pub use self::types::*;
