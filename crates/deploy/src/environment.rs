//! Capabilities injected into deployment scripts.
//!
//! A script never talks to the chain directly. It receives a [`DeployEnvironment`]
//! that resolves named accounts and hands out a [`Deployments`] handle, so the same
//! script runs against a live node or a recording stub in tests.

use std::collections::BTreeMap;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, hex};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DeployError, Result};

/// Name of the account that signs and pays for deployments.
pub const DEPLOYER: &str = "deployer";

/// Options for a single contract deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployOptions {
    /// Account the deployment transaction is sent from.
    pub from: Address,
    /// Name of the compiled contract artifact to deploy.
    pub contract: String,
    /// Constructor arguments, in declaration order.
    pub args: Vec<DynSolValue>,
    /// Emit a log line describing the deployment.
    pub log: bool,
    /// Ask a development node to mine immediately after sending.
    pub auto_mine: bool,
}

impl DeployOptions {
    /// Creates options deploying `contract` from `from` with no constructor arguments.
    pub fn new(from: Address, contract: impl Into<String>) -> Self {
        Self { from, contract: contract.into(), args: Vec::new(), log: false, auto_mine: false }
    }

    /// Sets the constructor arguments.
    pub fn with_args(mut self, args: Vec<DynSolValue>) -> Self {
        self.args = args;
        self
    }

    /// Enables or disables deployment logging.
    pub const fn with_log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    /// Enables or disables `evm_mine` after sending.
    pub const fn with_auto_mine(mut self, auto_mine: bool) -> Self {
        self.auto_mine = auto_mine;
        self
    }

    /// Returns the constructor arguments rendered as JSON values.
    pub fn rendered_args(&self) -> Vec<Value> {
        self.args.iter().map(render_arg).collect()
    }
}

/// Summary of the receipt that created a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSummary {
    /// Block the deployment was included in.
    pub block_number: Option<u64>,
    /// Gas consumed by the deployment.
    pub gas_used: u64,
}

/// Result of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// Address of the deployed contract.
    pub address: Address,
    /// Hash of the creating transaction, when known.
    pub transaction_hash: Option<B256>,
    /// Constructor arguments as recorded.
    pub args: Vec<Value>,
    /// `false` when an existing deployment was reused.
    pub newly_deployed: bool,
    /// Receipt of the creating transaction, when known.
    pub receipt: Option<ReceiptSummary>,
}

impl Deployment {
    /// Creates a freshly deployed result at `address` with no further metadata.
    pub const fn at(address: Address) -> Self {
        Self {
            address,
            transaction_hash: None,
            args: Vec::new(),
            newly_deployed: true,
            receipt: None,
        }
    }
}

/// Resolved named accounts.
///
/// Bindings that could not be resolved are kept aside and only reported when
/// a script asks for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedAccounts {
    accounts: BTreeMap<String, Address>,
    unresolved: BTreeMap<String, UnresolvedAccount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UnresolvedAccount {
    index: usize,
    available: usize,
}

impl NamedAccounts {
    /// Returns the address registered under `name`.
    pub fn get(&self, name: &str) -> Result<Address> {
        if let Some(address) = self.accounts.get(name) {
            return Ok(*address);
        }
        match self.unresolved.get(name) {
            Some(&UnresolvedAccount { index, available }) => {
                Err(DeployError::SignerIndexOutOfRange { name: name.to_string(), index, available })
            }
            None => Err(DeployError::UnknownNamedAccount(name.to_string())),
        }
    }

    /// Returns the [`DEPLOYER`] account.
    pub fn deployer(&self) -> Result<Address> {
        self.get(DEPLOYER)
    }

    /// Registers `address` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, address: Address) {
        let name = name.into();
        self.unresolved.remove(&name);
        self.accounts.insert(name, address);
    }

    /// Marks `name` as bound to signer `index` when only `available` signers exist.
    pub fn insert_out_of_range(&mut self, name: impl Into<String>, index: usize, available: usize) {
        let name = name.into();
        self.accounts.remove(&name);
        self.unresolved.insert(name, UnresolvedAccount { index, available });
    }

    /// Iterates over resolved `(name, address)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.accounts.iter().map(|(name, address)| (name.as_str(), *address))
    }
}

impl<S: Into<String>> FromIterator<(S, Address)> for NamedAccounts {
    fn from_iter<I: IntoIterator<Item = (S, Address)>>(iter: I) -> Self {
        let mut accounts = Self::default();
        for (name, address) in iter {
            accounts.insert(name, address);
        }
        accounts
    }
}

/// Deploys contracts by name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Deployments: Send + Sync {
    /// Deploys `name` with the given options and returns the resulting deployment.
    async fn deploy(&self, name: &str, options: DeployOptions) -> Result<Deployment>;
}

/// Everything a deployment script may use.
#[async_trait]
pub trait DeployEnvironment: Send + Sync {
    /// Resolves the configured named accounts.
    async fn named_accounts(&self) -> Result<NamedAccounts>;

    /// Returns the deployment capability.
    fn deployments(&self) -> &dyn Deployments;
}

/// Renders a constructor argument the way it is stored in deployment records.
pub fn render_arg(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Int(i, _) => Value::String(i.to_string()),
        DynSolValue::Uint(u, _) => Value::String(u.to_string()),
        DynSolValue::FixedBytes(word, size) => Value::String(hex::encode_prefixed(&word[..*size])),
        DynSolValue::Address(address) => Value::String(address.to_checksum(None)),
        DynSolValue::Bytes(bytes) => Value::String(hex::encode_prefixed(bytes)),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Array(values)
        | DynSolValue::FixedArray(values)
        | DynSolValue::Tuple(values) => Value::Array(values.iter().map(render_arg).collect()),
        other => Value::String(format!("{other:?}")),
    }
}
