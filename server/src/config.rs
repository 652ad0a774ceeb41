//! TOML-driven server configuration.
//!
//! Loaded once at startup from a config file (or defaults when none is
//! given); CLI flags override individual values. All knobs have working
//! defaults so `medledger-server` runs with no file at all.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use medledger_contracts::{LedgerError, LedgerResult};

/// Runtime configuration for the MedLedger server.
///
/// ```toml
/// bind = "127.0.0.1:8000"
/// data_path = "data/ledger.jsonl"
/// cors_origin = "http://localhost:3000"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Path of the JSON-lines ledger file. When absent the server runs on
    /// the in-memory store and the ledger dies with the process.
    #[serde(default)]
    pub data_path: Option<PathBuf>,

    /// Origin allowed by the CORS layer (the excluded browser client).
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            data_path: None,
            cors_origin: default_cors_origin(),
        }
    }
}

impl ServerConfig {
    /// Parse `s` as TOML configuration.
    ///
    /// Returns `LedgerError::Config` if the TOML is malformed or does not
    /// match the expected schema.
    pub fn from_toml_str(s: &str) -> LedgerResult<Self> {
        toml::from_str(s).map_err(|e| LedgerError::Config {
            reason: format!("failed to parse server config TOML: {e}"),
        })
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> LedgerResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| LedgerError::Config {
            reason: format!("failed to read config file '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use medledger_contracts::LedgerError;

    use super::ServerConfig;

    #[test]
    fn defaults_apply_when_fields_are_absent() {
        let config = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(config.bind, "127.0.0.1:8000");
        assert!(config.data_path.is_none());
        assert_eq!(config.cors_origin, "http://localhost:3000");
    }

    #[test]
    fn explicit_values_win() {
        let config = ServerConfig::from_toml_str(
            r#"
            bind = "0.0.0.0:9001"
            data_path = "/var/lib/medledger/ledger.jsonl"
            cors_origin = "https://ehr.example.org"
            "#,
        )
        .unwrap();
        assert_eq!(config.bind, "0.0.0.0:9001");
        assert_eq!(
            config.data_path.as_deref().unwrap().to_str().unwrap(),
            "/var/lib/medledger/ledger.jsonl"
        );
        assert_eq!(config.cors_origin, "https://ehr.example.org");
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = ServerConfig::from_toml_str("bind = [not toml").unwrap_err();
        assert!(matches!(err, LedgerError::Config { .. }));
    }
}
