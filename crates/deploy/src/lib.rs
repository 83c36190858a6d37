#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod error;
pub use error::{DeployError, Result};

mod environment;
#[cfg(test)]
pub use environment::MockDeployments;
pub use environment::{
    DEPLOYER, DeployEnvironment, DeployOptions, Deployment, Deployments, NamedAccounts,
    ReceiptSummary, render_arg,
};

mod accounts;
pub use accounts::{
    AccountRef, DEFAULT_MNEMONIC_COUNT, NamedAccountsConfig, TEST_MNEMONIC, derive_signer,
    signers_from_keys, signers_from_mnemonic,
};

mod artifacts;
pub use artifacts::{ArtifactStore, ContractArtifact};

mod store;
pub use store::{DeploymentRecord, DeploymentStore};

mod chain;
#[cfg(test)]
pub use chain::MockDeployClient;
pub use chain::{
    ChainDeployments, DEFAULT_RECEIPT_TIMEOUT, DeployClient, DeployReceipt, ProviderClient,
    connect,
};

mod config;
pub use config::{
    AccountsConfig, DeployConfig, LOCALHOST, LOCALHOST_RPC_URL, NetworkConfig, NetworkEntry,
};

mod runtime;
pub use runtime::RuntimeEnvironment;

pub mod scripts;
pub use scripts::{DeployScript, all_scripts};

mod runner;
pub use runner::DeployRunner;

#[cfg(test)]
mod test_utils;
