// Operator configuration - persisted JSON, created with defaults on first run
//
// Credentials are stored in plaintext next to the ledger; the file is
// operator-local.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Device API base URL used until the operator changes it
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub credentials: Credentials,

    /// Upper bound on every device call. The device is allowed to be slow,
    /// not to hang the caller forever.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            credentials: Credentials {
                username: "admin".to_string(),
                password: "0000".to_string(),
            },
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Load the config, writing defaults first when the file does not exist
    pub fn load_or_init(path: &Path) -> Result<Config> {
        if path.exists() {
            Config::load(path)
        } else {
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }
}
