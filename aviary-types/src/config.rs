//! Store configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::date::Date;
use crate::error::ConfigError;

/// Sizing and loading options for a store.
///
/// Block capacities are element counts for entity and relation pools and
/// byte counts for string pools. Missing keys in a JSON file fall back to
/// [`StoreConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Users per block.
    pub user_block_capacity: usize,
    /// Flights per block.
    pub flight_block_capacity: usize,
    /// Reservations per block.
    pub reservation_block_capacity: usize,
    /// Relation nodes per block.
    pub relation_block_capacity: usize,
    /// Bytes per string pool block.
    pub string_block_capacity: usize,
    /// Skip the first line of every dataset file.
    pub skip_header: bool,
    /// The day ages are computed against.
    pub reference_date: Date,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            user_block_capacity: 1 << 14,
            flight_block_capacity: 1 << 12,
            reservation_block_capacity: 1 << 15,
            relation_block_capacity: 1 << 16,
            string_block_capacity: 1 << 20, // 1 MiB
            skip_header: true,
            reference_date: Date::new(2023, 10, 1).unwrap_or(Date::MIN),
        }
    }
}

impl StoreConfig {
    /// Reads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Returns a copy with every block capacity set to `capacity`.
    ///
    /// Tiny capacities force many blocks, which is useful in tests.
    pub fn with_block_capacity(mut self, capacity: usize) -> Self {
        self.user_block_capacity = capacity;
        self.flight_block_capacity = capacity;
        self.reservation_block_capacity = capacity;
        self.relation_block_capacity = capacity;
        self.string_block_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_config_defaults() {
        let config = StoreConfig::default();
        assert!(config.skip_header);
        assert_eq!(config.reference_date.to_string(), "2023/10/01");
        assert_eq!(config.string_block_capacity, 1 << 20);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: StoreConfig =
            serde_json::from_str(r#"{ "user_block_capacity": 8, "reference_date": "2024/01/31" }"#)
                .unwrap();
        assert_eq!(config.user_block_capacity, 8);
        assert_eq!(config.reference_date.to_string(), "2024/01/31");
        assert_eq!(
            config.flight_block_capacity,
            StoreConfig::default().flight_block_capacity
        );
    }

    #[test]
    fn test_bad_reference_date_is_rejected() {
        let err = serde_json::from_str::<StoreConfig>(r#"{ "reference_date": "2024-01-31" }"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let config = StoreConfig::default().with_block_capacity(4);
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = StoreConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(matches!(
            StoreConfig::from_json_file(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
