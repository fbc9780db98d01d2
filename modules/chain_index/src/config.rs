//! Chain index configuration

use config::Config;
use std::path::PathBuf;

// Configuration defaults
const DEFAULT_DEPTH: (&str, i64) = ("depth", 2160);
const DEFAULT_DB_PATH: (&str, &str) = ("db-path", "chain-index.sqlite3");
const DEFAULT_BATCH_SIZE: (&str, i64) = ("batch-size", 400);

/// Structured configuration of the chain index core
#[derive(Debug, Clone)]
pub struct ChainIndexConfig {
    /// Rollback window in blocks; history older than this is compacted
    pub depth: u64,

    /// Path of the SQLite database file
    pub db_path: PathBuf,

    /// Rows per insert statement; bounded by the SQLite bound-parameter
    /// limit, raise only on engines with a higher one
    pub batch_size: usize,
}

impl ChainIndexConfig {
    /// Read the configuration with keyed defaults
    pub fn from_config(config: &Config) -> Self {
        let depth = config.get_int(DEFAULT_DEPTH.0).unwrap_or(DEFAULT_DEPTH.1).max(1) as u64;
        let db_path = config
            .get_string(DEFAULT_DB_PATH.0)
            .unwrap_or_else(|_| DEFAULT_DB_PATH.1.to_string());
        let batch_size = config
            .get_int(DEFAULT_BATCH_SIZE.0)
            .unwrap_or(DEFAULT_BATCH_SIZE.1)
            .max(1) as usize;

        Self {
            depth,
            db_path: PathBuf::from(db_path),
            batch_size,
        }
    }
}

impl Default for ChainIndexConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH.1 as u64,
            db_path: PathBuf::from(DEFAULT_DB_PATH.1),
            batch_size: DEFAULT_BATCH_SIZE.1 as usize,
        }
    }
}

// -- Tests --
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_keys_are_absent() {
        let config = Config::builder().build().unwrap();
        let parsed = ChainIndexConfig::from_config(&config);
        assert_eq!(2160, parsed.depth);
        assert_eq!(400, parsed.batch_size);
        assert_eq!(PathBuf::from("chain-index.sqlite3"), parsed.db_path);
    }

    #[test]
    fn keys_override_the_defaults() {
        let config = Config::builder()
            .set_override("depth", 10)
            .unwrap()
            .set_override("batch-size", 100)
            .unwrap()
            .set_override("db-path", "/tmp/index.db")
            .unwrap()
            .build()
            .unwrap();
        let parsed = ChainIndexConfig::from_config(&config);
        assert_eq!(10, parsed.depth);
        assert_eq!(100, parsed.batch_size);
        assert_eq!(PathBuf::from("/tmp/index.db"), parsed.db_path);
    }
}
