//! Store Configuration
//!
//! Persists the remote store endpoint and API key as a JSON file in the
//! application data directory.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// File name the configuration is stored under
pub const CONFIG_FILE: &str = "store_config.json";

/// Remote store connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the hosted store
    pub url: String,
    /// API key sent with every request
    pub key: String,
}

/// Save store configuration into the given directory
pub fn configure(dir: &Path, url: String, key: String) -> DomainResult<()> {
    if url.is_empty() {
        return Err(DomainError::InvalidInput("store url is empty".to_string()));
    }
    let config = StoreConfig { url, key };
    let json = serde_json::to_string_pretty(&config)
        .map_err(|e| DomainError::Internal(format!("failed to encode config: {}", e)))?;
    fs::write(dir.join(CONFIG_FILE), json)
        .map_err(|e| DomainError::Internal(format!("failed to write config: {}", e)))?;
    Ok(())
}

/// Load store configuration from the given directory, if present
pub fn load_config(dir: &Path) -> Option<StoreConfig> {
    let json = fs::read_to_string(dir.join(CONFIG_FILE)).ok()?;
    serde_json::from_str(&json).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        configure(
            dir.path(),
            "https://store.example.com".to_string(),
            "secret".to_string(),
        )
        .expect("configure failed");

        let loaded = load_config(dir.path()).expect("config missing");
        assert_eq!(loaded.url, "https://store.example.com");
        assert_eq!(loaded.key, "secret");
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(load_config(dir.path()).is_none());
    }

    #[test]
    fn test_empty_url_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = configure(dir.path(), String::new(), "key".to_string());
        assert!(result.is_err());
    }
}
