//! Backend selection for the planner store.
//!
//! # Responsibility
//! - Describe which persistence backend to use and where it lives.
//! - Open the selected backend behind the common store interface.

use crate::store::{JsonPlannerStore, PlannerStore, SqlitePlannerStore, StoreResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persistence backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Durable SQLite database file.
    Sqlite { db_path: PathBuf },
    /// Directory of per-collection JSON blobs.
    LocalJson { dir: PathBuf },
}

impl StoreConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Opens the configured backend.
///
/// Both backends satisfy the same store contract; callers never branch on
/// which one they were given.
pub fn open_store(config: &StoreConfig) -> StoreResult<Box<dyn PlannerStore>> {
    match config {
        StoreConfig::Sqlite { db_path } => Ok(Box::new(SqlitePlannerStore::open(db_path)?)),
        StoreConfig::LocalJson { dir } => Ok(Box::new(JsonPlannerStore::open(dir)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::StoreConfig;
    use std::path::PathBuf;

    #[test]
    fn config_round_trips_through_json() {
        let config = StoreConfig::Sqlite {
            db_path: PathBuf::from("/tmp/board.db"),
        };
        let text = serde_json::to_string(&config).unwrap();
        assert!(text.contains("\"backend\":\"sqlite\""));
        let parsed: StoreConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn local_json_variant_parses_from_tagged_object() {
        let parsed: StoreConfig =
            serde_json::from_str(r#"{"backend":"local_json","dir":"/tmp/board"}"#).unwrap();
        assert_eq!(
            parsed,
            StoreConfig::LocalJson {
                dir: PathBuf::from("/tmp/board"),
            }
        );
    }
}
