//! Chain index core: a rollback-aware UTxO index with a SQLite projection
//!
//! The in-memory [`UtxoIndex`] answers tip and membership queries and
//! bounds rollbacks to a configured depth window; the database mirrors it
//! across append / rollback / resume / garbage-collection transitions and
//! serves the bulk lookups. [`ChainIndex::open`] restores the index from
//! the tables and hands out the two handler objects the follower and the
//! RPC shell consume.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task;

pub mod balance;
pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod index;
pub mod query;
pub mod restore;
pub mod schema;
pub mod store;

pub use balance::{TxUtxoBalance, UtxoState};
pub use config::ChainIndexConfig;
pub use control::ControlHandler;
pub use error::{ChainIndexError, InsertError, RollbackError};
pub use events::ChainIndexEvent;
pub use index::{ReduceResult, UtxoIndex};
pub use query::{QueryHandler, TxosResponse, UtxosResponse};
pub use store::{BlockProjection, ChainIndexStore};

/// Run blocking database work off the async executor
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ChainIndexError>
where
    F: FnOnce() -> Result<T, ChainIndexError> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(f).await?
}

/// The assembled chain index: one writer handler, one reader handler,
/// sharing the in-memory index cell
pub struct ChainIndex {
    control: ControlHandler,
    query: QueryHandler,
}

impl ChainIndex {
    /// Open the database, apply the schema, restore the in-memory index
    /// from the tables and wire up the handlers
    pub async fn open(config: ChainIndexConfig) -> Result<Self, ChainIndexError> {
        let writer = ChainIndexStore::open(&config.db_path, config.batch_size)?;
        let reader = ChainIndexStore::open(&config.db_path, config.batch_size)?;

        let restorer = writer.clone();
        let index = run_blocking(move || restore::restore_state_from_db(&restorer)).await?;
        let state = Arc::new(Mutex::new(index));

        Ok(Self {
            control: ControlHandler::new(state.clone(), writer, config.depth),
            query: QueryHandler::new(state, reader),
        })
    }

    /// Handler consumed by the upstream follower
    pub fn control(&self) -> &ControlHandler {
        &self.control
    }

    /// Handler consumed by the RPC shell
    pub fn query(&self) -> &QueryHandler {
        &self.query
    }
}
