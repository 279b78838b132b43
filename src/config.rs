//! Service configuration from the environment (and `.env`).

use std::path::PathBuf;

use tracing::warn;

use crate::{
    chain::{Address, CitizenContracts, SeasonContracts},
    foundation::error::{CitizenError, CitizenResult},
};

pub const DEFAULT_HOST: &str = "0.0.0.0:8080";
pub const DEFAULT_ASSETS_DIR: &str = "assets";
pub const DEFAULT_CACHE_DIR: &str = "images";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    /// JSON-RPC endpoint.
    pub rpc: String,
    pub contracts: CitizenContracts,
    pub host: String,
    pub assets_dir: PathBuf,
    pub cache_dir: PathBuf,
}

/// Load `.env` if present, returning the file that was applied.
///
/// A missing file is the normal case in deployment and yields `Ok(None)`.
/// Runs before logging is installed, so the caller reports the outcome.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

impl ServiceConfig {
    pub fn from_env() -> CitizenResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CitizenResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| CitizenError::validation(format!("{key} is not set")))
        };
        let address = |key: &str| -> CitizenResult<Address> {
            required(key)?
                .parse::<Address>()
                .map_err(|e| CitizenError::validation(format!("{key}: {e}")))
        };

        if get("CERT").is_some() || get("KEY").is_some() {
            warn!("CERT/KEY are set but TLS is not terminated here; run behind a TLS proxy");
        }

        Ok(Self {
            rpc: required("RPC")?,
            contracts: CitizenContracts {
                season_one: SeasonContracts {
                    legacy: address("S1_CONTRACT")?,
                    current: address("S1V2_CONTRACT")?,
                },
                season_two: SeasonContracts {
                    legacy: address("S2_CONTRACT")?,
                    current: address("S2V2_CONTRACT")?,
                },
            },
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            assets_dir: get("ASSETS_DIR")
                .unwrap_or_else(|| DEFAULT_ASSETS_DIR.to_string())
                .into(),
            cache_dir: get("CACHE_DIR")
                .unwrap_or_else(|| DEFAULT_CACHE_DIR.to_string())
                .into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full() -> HashMap<String, String> {
        env(&[
            ("RPC", "http://localhost:8545"),
            ("S1_CONTRACT", "0x0101010101010101010101010101010101010101"),
            ("S1V2_CONTRACT", "0x0202020202020202020202020202020202020202"),
            ("S2_CONTRACT", "0x0303030303030303030303030303030303030303"),
            ("S2V2_CONTRACT", "0x0404040404040404040404040404040404040404"),
        ])
    }

    #[test]
    fn defaults_apply() {
        let vars = full();
        let cfg = ServiceConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(cfg.host, DEFAULT_HOST);
        assert_eq!(cfg.assets_dir, PathBuf::from("assets"));
        assert_eq!(cfg.cache_dir, PathBuf::from("images"));
        assert_eq!(cfg.contracts.season_two.current, Address([4; 20]));
        assert_eq!(cfg.contracts.season_one.legacy, Address([1; 20]));
    }

    #[test]
    fn missing_variable_is_named() {
        let mut vars = full();
        vars.remove("S2V2_CONTRACT");
        let err = ServiceConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("S2V2_CONTRACT"));
    }

    #[test]
    fn invalid_address_is_named() {
        let mut vars = full();
        vars.insert("S1_CONTRACT".into(), "0xnothex".into());
        let err = ServiceConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("S1_CONTRACT"));
    }

    #[test]
    fn overrides_are_read() {
        let mut vars = full();
        vars.insert("HOST".into(), "127.0.0.1:9000".into());
        vars.insert("CACHE_DIR".into(), "/tmp/c".into());
        let cfg = ServiceConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(cfg.host, "127.0.0.1:9000");
        assert_eq!(cfg.cache_dir, PathBuf::from("/tmp/c"));
    }
}
