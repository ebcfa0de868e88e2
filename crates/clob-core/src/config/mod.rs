//! Configuration for the CLOB signing client and the Safe relayer.
//!
//! Runtime settings come from the environment (with `.env` support) or from
//! a config file with `POLY__`-prefixed environment overrides. Contract
//! addresses are static per chain, see [`contracts`].

pub mod contracts;

pub use contracts::{
    ContractConfig, NEG_RISK_ADAPTER_ADDRESS, POLYGON_AMOY_CHAIN_ID, POLYGON_CHAIN_ID,
};

use crate::auth::{ApiCredentials, BuilderConfig};
use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Default CLOB API base URL.
pub const DEFAULT_CLOB_URL: &str = "https://clob.polymarket.com";
/// Default relayer base URL.
pub const DEFAULT_RELAYER_URL: &str = "https://relayer-v2.polymarket.com";
/// Default Polygon JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://polygon-rpc.com";

/// Application settings.
#[derive(Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_clob_url")]
    pub clob_url: String,
    #[serde(default = "default_relayer_url")]
    pub relayer_url: String,
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Hex private key for local signing.
    #[serde(default)]
    pub private_key: Option<String>,
    /// L2 API credentials, if already provisioned.
    #[serde(default)]
    pub api_credentials: Option<ApiCredentials>,
    /// Builder credentials for order-flow attribution.
    #[serde(default)]
    pub builder: Option<BuilderConfig>,
    /// Take request timestamps from the server clock instead of the local one.
    #[serde(default)]
    pub use_server_time: bool,
}

fn default_chain_id() -> u64 {
    POLYGON_CHAIN_ID
}

fn default_clob_url() -> String {
    DEFAULT_CLOB_URL.to_string()
}

fn default_relayer_url() -> String {
    DEFAULT_RELAYER_URL.to_string()
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

impl Settings {
    /// Load settings from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load settings from a file (TOML, YAML or JSON by extension), with
    /// `POLY__CHAIN_ID`-style environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("POLY").separator("__"))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Build settings from a variable lookup.
    pub fn from_vars<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let chain_id = match get("POLY_CHAIN_ID") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| Error::Config {
                message: format!("POLY_CHAIN_ID is not a number: {}", raw),
            })?,
            None => POLYGON_CHAIN_ID,
        };

        let api_credentials = match (
            get("POLY_API_KEY"),
            get("POLY_API_SECRET"),
            get("POLY_API_PASSPHRASE"),
        ) {
            (Some(key), Some(secret), Some(passphrase)) => {
                Some(ApiCredentials::new(key, secret, passphrase))
            }
            (None, None, None) => None,
            _ => {
                return Err(Error::Config {
                    message: "POLY_API_KEY, POLY_API_SECRET and POLY_API_PASSPHRASE must be set together"
                        .to_string(),
                })
            }
        };

        let builder = match (
            get("POLY_BUILDER_API_KEY"),
            get("POLY_BUILDER_SECRET"),
            get("POLY_BUILDER_PASSPHRASE"),
        ) {
            (Some(key), Some(secret), Some(passphrase)) => {
                Some(BuilderConfig::new(key, secret, passphrase))
            }
            (None, None, None) => None,
            _ => {
                return Err(Error::Config {
                    message: "POLY_BUILDER_API_KEY, POLY_BUILDER_SECRET and POLY_BUILDER_PASSPHRASE must be set together"
                        .to_string(),
                })
            }
        };

        let settings = Self {
            chain_id,
            clob_url: get("POLY_CLOB_URL").unwrap_or_else(default_clob_url),
            relayer_url: get("POLY_RELAYER_URL").unwrap_or_else(default_relayer_url),
            rpc_url: get("POLYGON_RPC_URL").unwrap_or_else(default_rpc_url),
            private_key: get("WALLET_PRIVATE_KEY"),
            api_credentials,
            builder,
            use_server_time: get("POLY_USE_SERVER_TIME")
                .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
                .unwrap_or(false),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Contract table for the configured chain.
    pub fn contracts(&self) -> Result<&'static ContractConfig> {
        ContractConfig::for_chain(self.chain_id)
    }

    fn validate(&self) -> Result<()> {
        ContractConfig::for_chain(self.chain_id)?;
        if let Some(builder) = &self.builder {
            if !builder.is_valid() {
                return Err(Error::Config {
                    message: "builder credentials must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Settings for tests (Amoy, no credentials).
    #[cfg(test)]
    pub fn test_settings() -> Self {
        Self {
            chain_id: POLYGON_AMOY_CHAIN_ID,
            clob_url: "http://localhost:8080".to_string(),
            relayer_url: "http://localhost:8081".to_string(),
            rpc_url: "http://localhost:8545".to_string(),
            private_key: None,
            api_credentials: None,
            builder: None,
            use_server_time: false,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("chain_id", &self.chain_id)
            .field("clob_url", &self.clob_url)
            .field("relayer_url", &self.relayer_url)
            .field("rpc_url", &self.rpc_url)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_credentials", &self.api_credentials)
            .field("builder", &self.builder)
            .field("use_server_time", &self.use_server_time)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_vars(lookup(&[])).unwrap();
        assert_eq!(settings.chain_id, 137);
        assert_eq!(settings.clob_url, DEFAULT_CLOB_URL);
        assert_eq!(settings.relayer_url, DEFAULT_RELAYER_URL);
        assert!(settings.api_credentials.is_none());
        assert!(settings.builder.is_none());
        assert!(!settings.use_server_time);
    }

    #[test]
    fn test_full_credentials() {
        let settings = Settings::from_vars(lookup(&[
            ("POLY_CHAIN_ID", "80002"),
            ("POLY_API_KEY", "key"),
            ("POLY_API_SECRET", "c2VjcmV0"),
            ("POLY_API_PASSPHRASE", "pass"),
            ("POLY_BUILDER_API_KEY", "bkey"),
            ("POLY_BUILDER_SECRET", "YnNlY3JldA=="),
            ("POLY_BUILDER_PASSPHRASE", "bpass"),
            ("POLY_USE_SERVER_TIME", "true"),
        ]))
        .unwrap();

        assert_eq!(settings.chain_id, 80002);
        assert_eq!(settings.api_credentials.unwrap().api_key, "key");
        assert_eq!(settings.builder.unwrap().key, "bkey");
        assert!(settings.use_server_time);
    }

    #[test]
    fn test_partial_credentials_rejected() {
        let err = Settings::from_vars(lookup(&[("POLY_API_KEY", "key")])).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_unknown_chain_rejected() {
        let err = Settings::from_vars(lookup(&[("POLY_CHAIN_ID", "1")])).unwrap_err();
        assert!(err.to_string().contains("invalid chain id"));

        let err = Settings::from_vars(lookup(&[("POLY_CHAIN_ID", "polygon")])).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("polysign-settings-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
chain_id = 80002
clob_url = "http://localhost:9000"

[builder]
key = "bkey"
secret = "YnNlY3JldA=="
passphrase = "bpass"
"#,
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.chain_id, 80002);
        assert_eq!(settings.clob_url, "http://localhost:9000");
        assert_eq!(settings.relayer_url, DEFAULT_RELAYER_URL);
        assert!(settings.builder.unwrap().is_valid());
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let mut settings = Settings::test_settings();
        settings.private_key = Some("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string());
        let debug_str = format!("{:?}", settings);
        assert!(!debug_str.contains("ac0974"));
        assert!(debug_str.contains("REDACTED"));
    }
}
