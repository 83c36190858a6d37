//! On-disk deployment records, one directory per network.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, B256, Bytes};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DeployError, Deployment, ReceiptSummary, Result};

const CHAIN_ID_FILE: &str = ".chainId";

/// Persisted description of a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Contract address.
    pub address: Address,
    /// Contract ABI.
    pub abi: JsonAbi,
    /// Creating transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<B256>,
    /// Receipt of the creating transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ReceiptSummary>,
    /// Constructor arguments.
    pub args: Vec<Value>,
    /// Creation bytecode without constructor arguments.
    pub bytecode: Bytes,
}

impl DeploymentRecord {
    /// Returns true when this record was produced by the same bytecode and arguments.
    pub fn matches(&self, bytecode: &Bytes, args: &[Value]) -> bool {
        &self.bytecode == bytecode && self.args == args
    }

    /// Converts the record into a [`Deployment`].
    pub fn to_deployment(&self, newly_deployed: bool) -> Deployment {
        Deployment {
            address: self.address,
            transaction_hash: self.transaction_hash,
            args: self.args.clone(),
            newly_deployed,
            receipt: self.receipt,
        }
    }
}

/// Deployment records for one network.
#[derive(Debug, Clone)]
pub struct DeploymentStore {
    dir: PathBuf,
    network: String,
}

impl DeploymentStore {
    /// Creates a store for `network` below `root`.
    pub fn new(root: impl AsRef<Path>, network: impl Into<String>) -> Self {
        let network = network.into();
        Self { dir: root.as_ref().join(&network), network }
    }

    /// Returns the network directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the network name.
    pub fn network(&self) -> &str {
        &self.network
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Loads the record for `name`, if any.
    pub fn get(&self, name: &str) -> Result<Option<DeploymentRecord>> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(None);
        }
        read_record(&path).map(Some)
    }

    /// Writes the record for `name`.
    pub fn save(&self, name: &str, record: &DeploymentRecord) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| DeployError::io(&self.dir, e))?;
        let path = self.record_path(name);
        let contents =
            serde_json::to_string_pretty(record).map_err(|e| DeployError::json(&path, e))?;
        fs::write(&path, contents).map_err(|e| DeployError::io(&path, e))
    }

    /// Returns every record in name order.
    pub fn all(&self) -> Result<Vec<(String, DeploymentRecord)>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| DeployError::io(&self.dir, e))? {
            let path = entry.map_err(|e| DeployError::io(&self.dir, e))?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            records.push((name.to_string(), read_record(&path)?));
        }
        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }

    /// Deletes every record for the network.
    pub fn reset(&self) -> Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir).map_err(|e| DeployError::io(&self.dir, e))?;
        }
        Ok(())
    }

    /// Records `chain_id` for the network, or checks it against the recorded one.
    pub fn ensure_chain_id(&self, chain_id: u64) -> Result<()> {
        let path = self.dir.join(CHAIN_ID_FILE);
        if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| DeployError::io(&path, e))?;
            let recorded: u64 = contents.trim().parse().map_err(|_| {
                DeployError::Config(format!("invalid chain id in {}", path.display()))
            })?;
            if recorded != chain_id {
                return Err(DeployError::ChainIdMismatch {
                    network: self.network.clone(),
                    recorded,
                    actual: chain_id,
                });
            }
            return Ok(());
        }

        fs::create_dir_all(&self.dir).map_err(|e| DeployError::io(&self.dir, e))?;
        fs::write(&path, chain_id.to_string()).map_err(|e| DeployError::io(&path, e))
    }
}

fn read_record(path: &Path) -> Result<DeploymentRecord> {
    let contents = fs::read_to_string(path).map_err(|e| DeployError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| DeployError::json(path, e))
}
