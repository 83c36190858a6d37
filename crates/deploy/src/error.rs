//! Error types for contract deployment.

use std::{io, path::PathBuf};

use alloy_primitives::{Address, B256};
use alloy_provider::PendingTransactionError;
use alloy_transport::TransportError;
use thiserror::Error;

/// Result alias used across the deployment crate.
pub type Result<T, E = DeployError> = std::result::Result<T, E>;

/// Errors that can occur while resolving, deploying, or recording contracts.
#[derive(Debug, Error)]
pub enum DeployError {
    /// No compiled artifact was found for the contract.
    #[error("artifact not found for contract {contract} in {dir}")]
    ArtifactNotFound {
        /// Contract name that was looked up.
        contract: String,
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// The artifact carries no creation bytecode (interface or abstract contract).
    #[error("artifact for {0} has no creation bytecode")]
    EmptyBytecode(String),

    /// Constructor arguments were given for a contract without a constructor.
    #[error("contract {contract} has no constructor but {got} argument(s) were supplied")]
    ConstructorArgs {
        /// Contract name.
        contract: String,
        /// Number of supplied arguments.
        got: usize,
    },

    /// Constructor arguments failed to ABI-encode.
    #[error("failed to encode constructor arguments: {0}")]
    AbiEncode(#[from] alloy_dyn_abi::Error),

    /// A named account was requested that is not configured.
    #[error("unknown named account: {0}")]
    UnknownNamedAccount(String),

    /// A named account points at a signer index that does not exist.
    #[error("named account {name} refers to signer #{index} but only {available} signer(s) are configured")]
    SignerIndexOutOfRange {
        /// Named account.
        name: String,
        /// Configured signer index.
        index: usize,
        /// Number of available signers.
        available: usize,
    },

    /// The deployment was requested from an address with no local signer.
    #[error("no signer available for {0}")]
    UnknownSigner(Address),

    /// JSON-RPC request failed.
    #[error("rpc request failed: {0}")]
    Transport(#[from] TransportError),

    /// Watching a sent transaction failed before its receipt arrived.
    #[error("failed to fetch deployment receipt: {0}")]
    PendingTransaction(#[from] PendingTransactionError),

    /// The deployment transaction was mined but reverted.
    #[error("deployment transaction {0} reverted")]
    Reverted(B256),

    /// The receipt did not include a contract address.
    #[error("no contract address in receipt for {0}")]
    MissingContractAddress(B256),

    /// Waiting for the receipt exceeded the configured timeout.
    #[error("timed out waiting for receipt of {0}")]
    ReceiptTimeout(B256),

    /// The deployments directory belongs to a different chain.
    #[error("deployments for network {network} were recorded on chain {recorded}, connected to {actual}")]
    ChainIdMismatch {
        /// Network name.
        network: String,
        /// Chain id stored next to the records.
        recorded: u64,
        /// Chain id reported by the node.
        actual: u64,
    },

    /// Filesystem failure.
    #[error("io error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// JSON (de)serialization failure.
    #[error("invalid json at {path}: {source}")]
    Json {
        /// Path being parsed or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A script depends on a tag that no script carries.
    #[error("script {script} depends on tag {tag} which no script provides")]
    MissingDependency {
        /// Script id.
        script: String,
        /// Missing tag.
        tag: String,
    },

    /// Script dependencies form a cycle.
    #[error("dependency cycle detected at script {0}")]
    DependencyCycle(String),
}

impl DeployError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json { path: path.into(), source }
    }
}
