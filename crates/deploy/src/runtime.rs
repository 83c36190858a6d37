//! The live [`DeployEnvironment`].

use std::path::Path;

use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::info;

use crate::{
    ArtifactStore, ChainDeployments, DeployEnvironment, DeployError, DeploymentStore,
    Deployments, NamedAccounts, NamedAccountsConfig, NetworkConfig, ProviderClient, Result,
    connect,
};

/// Environment connected to a network's node, artifacts, and deployment records.
#[derive(Debug)]
pub struct RuntimeEnvironment {
    network: String,
    chain_id: u64,
    signers: Vec<Address>,
    named_accounts: NamedAccountsConfig,
    deployments: ChainDeployments,
}

impl RuntimeEnvironment {
    /// Connects to `network`.
    ///
    /// With `reset`, recorded deployments for the network are deleted first.
    pub async fn connect(
        network: &NetworkConfig,
        artifacts_dir: impl AsRef<Path>,
        deployments_dir: impl AsRef<Path>,
        reset: bool,
    ) -> Result<Self> {
        let signers = network.accounts.signers()?;
        let (provider, addresses) = connect(network.rpc_url.clone(), signers)?;

        let store = DeploymentStore::new(deployments_dir, &network.name);
        if reset {
            info!(target: "deploy", dir = %store.dir().display(), "Removing recorded deployments");
            store.reset()?;
        }

        let deployments = ChainDeployments::new(
            ProviderClient::new(provider),
            addresses.clone(),
            ArtifactStore::new(artifacts_dir.as_ref()),
            store,
        )
        .with_receipt_timeout(network.receipt_timeout);

        let chain_id = deployments.chain_id().await?;
        if let Some(expected) = network.chain_id.filter(|&expected| expected != chain_id) {
            return Err(DeployError::Config(format!(
                "network {} expects chain id {expected} but the node reports {chain_id}",
                network.name
            )));
        }
        deployments.store().ensure_chain_id(chain_id)?;

        info!(
            target: "deploy",
            network = %network.name,
            chain_id,
            rpc_url = %network.rpc_url,
            signers = addresses.len(),
            "Connected"
        );

        Ok(Self {
            network: network.name.clone(),
            chain_id,
            signers: addresses,
            named_accounts: network.named_accounts.clone(),
            deployments,
        })
    }

    /// Returns the network name.
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Returns the connected chain id.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

#[async_trait]
impl DeployEnvironment for RuntimeEnvironment {
    async fn named_accounts(&self) -> Result<NamedAccounts> {
        Ok(self.named_accounts.resolve(&self.signers))
    }

    fn deployments(&self) -> &dyn Deployments {
        &self.deployments
    }
}
