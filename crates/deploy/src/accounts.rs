//! Signer derivation and named-account resolution.

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256};
use alloy_signer_local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{DeployError, NamedAccounts, Result};

/// Standard Anvil/Hardhat test mnemonic.
pub const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Number of accounts derived from a mnemonic when no count is configured.
pub const DEFAULT_MNEMONIC_COUNT: u32 = 10;

/// Derives the signer at `index` on the standard Ethereum path.
pub fn derive_signer(phrase: &str, index: u32) -> Result<PrivateKeySigner> {
    let path = format!("m/44'/60'/0'/0/{index}");
    MnemonicBuilder::<English>::default()
        .phrase(phrase)
        .derivation_path(&path)
        .map_err(|e| DeployError::Config(format!("invalid derivation path {path}: {e}")))?
        .build()
        .map_err(|e| DeployError::Config(format!("invalid mnemonic: {e}")))
}

/// Derives the first `count` signers of a mnemonic.
pub fn signers_from_mnemonic(phrase: &str, count: u32) -> Result<Vec<PrivateKeySigner>> {
    (0..count).map(|index| derive_signer(phrase, index)).collect()
}

/// Builds signers from raw private keys.
pub fn signers_from_keys(keys: &[B256]) -> Result<Vec<PrivateKeySigner>> {
    keys.iter()
        .map(|key| {
            PrivateKeySigner::from_bytes(key)
                .map_err(|e| DeployError::Config(format!("invalid private key: {e}")))
        })
        .collect()
}

/// How a named account is bound to an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountRef {
    /// Index into the configured signer list.
    Index(usize),
    /// A literal address.
    Address(Address),
}

/// Named-account bindings, with an optional per-network layer on top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedAccountsConfig {
    defaults: BTreeMap<String, AccountRef>,
    overrides: BTreeMap<String, AccountRef>,
}

impl NamedAccountsConfig {
    /// Creates bindings from global defaults.
    pub const fn new(defaults: BTreeMap<String, AccountRef>) -> Self {
        Self { defaults, overrides: BTreeMap::new() }
    }

    /// Layers network-specific bindings over the defaults.
    pub fn with_overrides(mut self, overrides: BTreeMap<String, AccountRef>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Resolves the bindings against the signer addresses.
    ///
    /// An index past the signer list leaves that name unresolved; looking it up
    /// later fails with [`DeployError::SignerIndexOutOfRange`].
    pub fn resolve(&self, signers: &[Address]) -> NamedAccounts {
        let mut bindings = self.defaults.clone();
        bindings.extend(self.overrides.iter().map(|(name, r)| (name.clone(), *r)));

        let mut accounts = NamedAccounts::default();
        for (name, account) in bindings {
            match account {
                AccountRef::Address(address) => accounts.insert(name, address),
                AccountRef::Index(index) => match signers.get(index) {
                    Some(address) => accounts.insert(name, *address),
                    None => {
                        debug!(target: "deploy", %name, index, "Named account has no signer");
                        accounts.insert_out_of_range(name, index, signers.len());
                    }
                },
            }
        }
        accounts
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;
    use crate::DEPLOYER;

    #[test]
    fn test_mnemonic_derivation() {
        let expected_addresses = [
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"),
            address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"),
        ];

        let signers = signers_from_mnemonic(TEST_MNEMONIC, 3).unwrap();

        for (i, (expected, signer)) in expected_addresses.iter().zip(signers.iter()).enumerate() {
            assert_eq!(*expected, signer.address(), "account {i} address mismatch");
        }
    }

    #[test]
    fn private_key_signer_matches_mnemonic() {
        let derived = derive_signer(TEST_MNEMONIC, 0).unwrap();
        let key = B256::from_slice(derived.credential().to_bytes().as_slice());

        let signers = signers_from_keys(&[key]).unwrap();
        assert_eq!(signers[0].address(), derived.address());
    }

    #[test]
    fn zero_private_key_is_rejected() {
        assert!(matches!(signers_from_keys(&[B256::ZERO]), Err(DeployError::Config(_))));
    }

    #[test]
    fn resolves_index_and_address_bindings() {
        let signers = [
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"),
        ];
        let treasury = address!("a0Ee7A142d267C1f36714E4a8F75612F20a79720");
        let config = NamedAccountsConfig::new(BTreeMap::from([
            (DEPLOYER.to_string(), AccountRef::Index(1)),
            ("treasury".to_string(), AccountRef::Address(treasury)),
        ]));

        let accounts = config.resolve(&signers);
        assert_eq!(accounts.deployer().unwrap(), signers[1]);
        assert_eq!(accounts.get("treasury").unwrap(), treasury);
    }

    #[test]
    fn network_overrides_replace_defaults() {
        let signers = [
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"),
        ];
        let config =
            NamedAccountsConfig::new(BTreeMap::from([(DEPLOYER.to_string(), AccountRef::Index(0))]))
                .with_overrides(BTreeMap::from([(DEPLOYER.to_string(), AccountRef::Index(1))]));

        assert_eq!(config.resolve(&signers).deployer().unwrap(), signers[1]);
    }

    #[test]
    fn index_past_signers_fails_on_lookup() {
        let bindings = BTreeMap::from([(DEPLOYER.to_string(), AccountRef::Index(3))]);
        let config = NamedAccountsConfig::new(bindings);

        let err = config.resolve(&[Address::ZERO]).deployer().unwrap_err();
        assert!(matches!(
            err,
            DeployError::SignerIndexOutOfRange { index: 3, available: 1, .. }
        ));
    }

    #[test]
    fn unrelated_out_of_range_binding_keeps_deployer() {
        let deployer = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let config = NamedAccountsConfig::new(BTreeMap::from([
            (DEPLOYER.to_string(), AccountRef::Index(0)),
            ("treasury".to_string(), AccountRef::Index(1)),
        ]));

        let accounts = config.resolve(&[deployer]);

        assert_eq!(accounts.deployer().unwrap(), deployer);
        assert!(matches!(
            accounts.get("treasury"),
            Err(DeployError::SignerIndexOutOfRange { name, index: 1, available: 1 })
                if name == "treasury"
        ));
    }

    #[test]
    fn account_ref_deserializes_untagged() {
        let index: AccountRef = serde_json::from_str("0").unwrap();
        assert_eq!(index, AccountRef::Index(0));

        let addr: AccountRef =
            serde_json::from_str("\"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266\"").unwrap();
        assert_eq!(addr, AccountRef::Address(address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")));
    }
}
