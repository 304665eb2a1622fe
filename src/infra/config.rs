//! Centralized configuration (environment variables + defaults).

use std::net::SocketAddr;

use crate::error::ConfigError;

pub const DEFAULT_SUI_RPC_URL: &str = "https://fullnode.testnet.sui.io:443";
pub const DEFAULT_WALRUS_AGGREGATOR_URL: &str = "https://aggregator.walrus-testnet.walrus.space";
pub const DEFAULT_WALRUS_ENCODER_URL: &str = "http://127.0.0.1:31416";

pub const DEFAULT_PACKAGE_ID: &str =
    "0xd7da3d972c99d9318eb56df786b8b04e120a7769d572f537d920f40334388dd6";
/// Shared registry object passed to `add_file_id` / `remove_file_id`.
pub const DEFAULT_REGISTRY_OBJECT_ID: &str =
    "0xa2b58dd03872c5bd0f337b13056eb50f9160848329efd9ad965f63e8aac1bc67";
/// Parent object whose dynamic fields hold each owner's blob ids.
pub const DEFAULT_TABLE_OBJECT_ID: &str =
    "0x9801afde129050adb0573fadfd798fa9733104d4521bb8936991e59a2ad706f0";
pub const DEFAULT_MODULE_NAME: &str = "goldfish_backend";

pub const DEFAULT_GAS_BUDGET: u64 = 100_000_000;
pub const DEFAULT_STORAGE_EPOCHS: u32 = 3;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Where the application's file registry lives on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub package_id: String,
    pub module: String,
    pub registry_object_id: String,
    pub table_object_id: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            package_id: DEFAULT_PACKAGE_ID.to_string(),
            module: DEFAULT_MODULE_NAME.to_string(),
            registry_object_id: DEFAULT_REGISTRY_OBJECT_ID.to_string(),
            table_object_id: DEFAULT_TABLE_OBJECT_ID.to_string(),
        }
    }
}

/// Storage-network endpoints and on-ledger ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalrusConfig {
    pub aggregator_url: String,
    pub encoder_url: String,
    pub storage_nodes: Vec<String>,
    pub package_id: Option<String>,
    pub system_object_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub wallet_address: String,
    pub private_key_hex: Option<String>,
    pub sui_rpc_url: String,
    pub gas_budget: u64,
    pub default_epochs: u32,
    pub bind_addr: SocketAddr,
    pub registry: RegistryConfig,
    pub walrus: WalrusConfig,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// `wallet_address` and `private_key_hex` are fallbacks for when the
    /// corresponding environment variables are unset (e.g. positional CLI args).
    pub fn from_env(
        wallet_address: Option<String>,
        private_key_hex: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok(), wallet_address, private_key_hex)
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(
        lookup: F,
        wallet_address: Option<String>,
        private_key_hex: Option<String>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let wallet_address = var("GOLDFISH_WALLET_ADDRESS")
            .or(wallet_address)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingWalletAddress)?;
        let private_key_hex = var("GOLDFISH_SERVER_PRIVATE_KEY_HEX")
            .or(private_key_hex)
            .filter(|v| !v.trim().is_empty());

        let gas_budget = match var("GAS_BUDGET") {
            Some(v) => v.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "GAS_BUDGET",
                expected: "u64",
                value: v,
            })?,
            None => DEFAULT_GAS_BUDGET,
        };

        let default_epochs = match var("GOLDFISH_DEFAULT_EPOCHS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|e| *e > 0)
                .ok_or(ConfigError::Invalid {
                    name: "GOLDFISH_DEFAULT_EPOCHS",
                    expected: "positive u32",
                    value: v,
                })?,
            None => DEFAULT_STORAGE_EPOCHS,
        };

        let bind_raw = var("GOLDFISH_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            name: "GOLDFISH_BIND_ADDR",
            expected: "socket address",
            value: bind_raw.clone(),
        })?;

        let storage_nodes = var("WALRUS_STORAGE_NODES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().trim_end_matches('/').to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            wallet_address: wallet_address.trim().to_string(),
            private_key_hex,
            sui_rpc_url: var("SUI_RPC_URL").unwrap_or_else(|| DEFAULT_SUI_RPC_URL.to_string()),
            gas_budget,
            default_epochs,
            bind_addr,
            registry: RegistryConfig {
                package_id: var("GOLDFISH_PACKAGE_ID")
                    .unwrap_or_else(|| DEFAULT_PACKAGE_ID.to_string()),
                module: var("GOLDFISH_MODULE_NAME")
                    .unwrap_or_else(|| DEFAULT_MODULE_NAME.to_string()),
                registry_object_id: var("GOLDFISH_REGISTRY_OBJECT_ID")
                    .unwrap_or_else(|| DEFAULT_REGISTRY_OBJECT_ID.to_string()),
                table_object_id: var("GOLDFISH_TABLE_OBJECT_ID")
                    .unwrap_or_else(|| DEFAULT_TABLE_OBJECT_ID.to_string()),
            },
            walrus: WalrusConfig {
                aggregator_url: var("WALRUS_AGGREGATOR_URL")
                    .unwrap_or_else(|| DEFAULT_WALRUS_AGGREGATOR_URL.to_string()),
                encoder_url: var("WALRUS_ENCODER_URL")
                    .unwrap_or_else(|| DEFAULT_WALRUS_ENCODER_URL.to_string()),
                storage_nodes,
                package_id: var("WALRUS_PACKAGE_ID"),
                system_object_id: var("WALRUS_SYSTEM_OBJECT_ID"),
            },
        })
    }
}
