// ⚙️ Configuration - read from environment variables
//
// SEAFOOD_COST_PRODUCTS_CSV  optional products CSV replacing the sample products
// SEAFOOD_COST_RATES_CSV     optional rates CSV replacing the sample rate chart
// SEAFOOD_COST_ADDR          server bind address (default 0.0.0.0:3000)

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

pub const PRODUCTS_CSV_VAR: &str = "SEAFOOD_COST_PRODUCTS_CSV";
pub const RATES_CSV_VAR: &str = "SEAFOOD_COST_RATES_CSV";
pub const ADDR_VAR: &str = "SEAFOOD_COST_ADDR";

fn default_addr() -> String {
    "0.0.0.0:3000".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    pub products_csv: Option<PathBuf>,
    pub rates_csv: Option<PathBuf>,
    #[serde(default = "default_addr")]
    pub server_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            products_csv: None,
            rates_csv: None,
            server_addr: default_addr(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        AppConfig {
            products_csv: get(PRODUCTS_CSV_VAR).map(PathBuf::from),
            rates_csv: get(RATES_CSV_VAR).map(PathBuf::from),
            server_addr: get(ADDR_VAR).unwrap_or_else(default_addr),
        }
    }
}
