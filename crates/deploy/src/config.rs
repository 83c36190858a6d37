//! Network configuration.
//!
//! Networks are declared in a TOML file:
//!
//! ```toml
//! [named_accounts]
//! deployer = 0
//!
//! [networks.localhost]
//! rpc_url = "http://127.0.0.1:8545"
//! chain_id = 31337
//!
//! [networks.sepolia]
//! rpc_url = "https://sepolia.example.org"
//! private_keys = ["0x..."]
//! named_accounts = { deployer = 0 }
//! ```
//!
//! Without a file the built-in `localhost` network is used.

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use alloy_primitives::B256;
use alloy_signer_local::PrivateKeySigner;
use serde::Deserialize;
use url::Url;

use crate::{
    AccountRef, DEFAULT_MNEMONIC_COUNT, DEFAULT_RECEIPT_TIMEOUT, DEPLOYER, DeployError,
    NamedAccountsConfig, Result, TEST_MNEMONIC, signers_from_keys, signers_from_mnemonic,
};

/// Name of the built-in development network.
pub const LOCALHOST: &str = "localhost";

/// RPC endpoint of the built-in development network.
pub const LOCALHOST_RPC_URL: &str = "http://127.0.0.1:8545";

/// Contents of a deployment configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    /// Named-account bindings shared by every network.
    #[serde(default)]
    pub named_accounts: BTreeMap<String, AccountRef>,
    /// Declared networks.
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkEntry>,
}

/// One `[networks.<name>]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkEntry {
    /// JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Expected chain id.
    pub chain_id: Option<u64>,
    /// BIP-39 phrase to derive signers from.
    pub mnemonic: Option<String>,
    /// Number of signers derived from the mnemonic.
    pub mnemonic_count: Option<u32>,
    /// Raw signer keys; take precedence over the mnemonic.
    #[serde(default)]
    pub private_keys: Vec<B256>,
    /// Network-specific named-account bindings.
    #[serde(default)]
    pub named_accounts: BTreeMap<String, AccountRef>,
    /// Seconds to wait for deployment receipts.
    pub receipt_timeout_secs: Option<u64>,
}

/// Where signers come from.
#[derive(Clone, PartialEq, Eq)]
pub enum AccountsConfig {
    /// Derive `count` signers from a mnemonic.
    Mnemonic {
        /// Phrase.
        phrase: String,
        /// Number of derived signers.
        count: u32,
    },
    /// Use these keys, in order.
    PrivateKeys(Vec<B256>),
}

impl std::fmt::Debug for AccountsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mnemonic { count, .. } => {
                f.debug_struct("Mnemonic").field("count", count).finish_non_exhaustive()
            }
            Self::PrivateKeys(keys) => f.debug_tuple("PrivateKeys").field(&keys.len()).finish(),
        }
    }
}

impl AccountsConfig {
    /// Builds the signers.
    pub fn signers(&self) -> Result<Vec<PrivateKeySigner>> {
        match self {
            Self::Mnemonic { phrase, count } => signers_from_mnemonic(phrase, *count),
            Self::PrivateKeys(keys) => signers_from_keys(keys),
        }
    }
}

/// A fully resolved network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name; also the deployments subdirectory.
    pub name: String,
    /// JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Expected chain id.
    pub chain_id: Option<u64>,
    /// Signer source.
    pub accounts: AccountsConfig,
    /// Named-account bindings.
    pub named_accounts: NamedAccountsConfig,
    /// Time to wait for deployment receipts.
    pub receipt_timeout: Duration,
}

impl NetworkConfig {
    /// The built-in development network: Anvil defaults with `deployer` bound to signer 0.
    pub fn localhost() -> Self {
        Self {
            name: LOCALHOST.to_string(),
            rpc_url: Url::parse(LOCALHOST_RPC_URL).expect("valid localhost url"),
            chain_id: None,
            accounts: AccountsConfig::Mnemonic {
                phrase: TEST_MNEMONIC.to_string(),
                count: DEFAULT_MNEMONIC_COUNT,
            },
            named_accounts: default_named_accounts(),
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
        }
    }

    /// Replaces the RPC endpoint.
    pub fn with_rpc_url(mut self, rpc_url: Url) -> Self {
        self.rpc_url = rpc_url;
        self
    }

    /// Replaces the signers with a single private key.
    pub fn with_private_key(mut self, key: B256) -> Self {
        self.accounts = AccountsConfig::PrivateKeys(vec![key]);
        self
    }
}

fn default_named_accounts() -> NamedAccountsConfig {
    NamedAccountsConfig::new(BTreeMap::from([(DEPLOYER.to_string(), AccountRef::Index(0))]))
}

impl DeployConfig {
    /// Reads a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| DeployError::io(path, e))?;
        Self::parse(&contents)
            .map_err(|e| DeployError::Config(format!("{}: {e}", path.display())))
    }

    /// Parses configuration from TOML text.
    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Resolves the network called `name`.
    pub fn network(&self, name: &str) -> Result<NetworkConfig> {
        let Some(entry) = self.networks.get(name) else {
            if name == LOCALHOST {
                let mut network = NetworkConfig::localhost();
                if !self.named_accounts.is_empty() {
                    network.named_accounts = NamedAccountsConfig::new(self.named_accounts.clone());
                }
                return Ok(network);
            }
            return Err(DeployError::Config(format!("unknown network: {name}")));
        };

        let accounts = if !entry.private_keys.is_empty() {
            AccountsConfig::PrivateKeys(entry.private_keys.clone())
        } else if let Some(phrase) = &entry.mnemonic {
            AccountsConfig::Mnemonic {
                phrase: phrase.clone(),
                count: entry.mnemonic_count.unwrap_or(DEFAULT_MNEMONIC_COUNT),
            }
        } else if name == LOCALHOST {
            AccountsConfig::Mnemonic {
                phrase: TEST_MNEMONIC.to_string(),
                count: entry.mnemonic_count.unwrap_or(DEFAULT_MNEMONIC_COUNT),
            }
        } else {
            return Err(DeployError::Config(format!(
                "network {name} declares neither private_keys nor mnemonic"
            )));
        };

        let named_accounts = if self.named_accounts.is_empty() {
            default_named_accounts()
        } else {
            NamedAccountsConfig::new(self.named_accounts.clone())
        }
        .with_overrides(entry.named_accounts.clone());

        Ok(NetworkConfig {
            name: name.to_string(),
            rpc_url: entry.rpc_url.clone(),
            chain_id: entry.chain_id,
            accounts,
            named_accounts,
            receipt_timeout: entry
                .receipt_timeout_secs
                .map_or(DEFAULT_RECEIPT_TIMEOUT, Duration::from_secs),
        })
    }
}
