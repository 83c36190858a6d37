//! [`Deployments`] backed by a JSON-RPC node.

use std::{fmt, time::Duration};

use alloy_network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, B256, Bytes};
use alloy_provider::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, info};
use url::Url;

use crate::{
    ArtifactStore, DeployError, DeployOptions, Deployment, DeploymentRecord, DeploymentStore,
    Deployments, ReceiptSummary, Result,
};

/// Default time to wait for a deployment receipt.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connects to `rpc_url` with a wallet holding every signer.
///
/// Returns the provider and the signer addresses in configuration order.
pub fn connect(
    rpc_url: Url,
    signers: Vec<PrivateKeySigner>,
) -> Result<(DynProvider, Vec<Address>)> {
    let addresses: Vec<Address> = signers.iter().map(|signer| signer.address()).collect();

    let mut signers = signers.into_iter();
    let first =
        signers.next().ok_or_else(|| DeployError::Config("no signers configured".to_string()))?;
    let mut wallet = EthereumWallet::from(first);
    for signer in signers {
        wallet.register_signer(signer);
    }

    let provider = ProviderBuilder::new().wallet(wallet).connect_http(rpc_url).erased();
    Ok((provider, addresses))
}

/// The parts of a receipt a deployment cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployReceipt {
    /// `false` when the creation reverted.
    pub status: bool,
    /// Address of the created contract.
    pub contract_address: Option<Address>,
    /// Gas consumed.
    pub gas_used: u64,
    /// Block the transaction landed in.
    pub block_number: Option<u64>,
}

/// Node operations needed to create a contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeployClient: Send + Sync {
    /// Returns the chain id reported by the node.
    async fn chain_id(&self) -> Result<u64>;

    /// Returns the runtime code at `address`.
    async fn code_at(&self, address: Address) -> Result<Bytes>;

    /// Sends a contract-creation transaction and returns its hash.
    async fn send_deployment(&self, from: Address, code: Bytes) -> Result<B256>;

    /// Asks a development node to mine a block.
    async fn mine(&self) -> Result<()>;

    /// Waits until `tx_hash` is included and returns its receipt.
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<DeployReceipt>;
}

/// [`DeployClient`] over an alloy provider.
#[derive(Clone)]
pub struct ProviderClient {
    provider: DynProvider,
}

impl ProviderClient {
    /// Wraps `provider`.
    pub const fn new(provider: DynProvider) -> Self {
        Self { provider }
    }
}

impl fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl DeployClient for ProviderClient {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes> {
        Ok(self.provider.get_code_at(address).await?)
    }

    async fn send_deployment(&self, from: Address, code: Bytes) -> Result<B256> {
        let tx = TransactionRequest::default().with_from(from).with_deploy_code(code);
        let pending = self.provider.send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn mine(&self) -> Result<()> {
        self.provider.raw_request::<_, serde_json::Value>("evm_mine".into(), ()).await?;
        Ok(())
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<DeployReceipt> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await?;
        Ok(DeployReceipt {
            status: receipt.status(),
            contract_address: receipt.contract_address(),
            gas_used: receipt.gas_used(),
            block_number: receipt.block_number(),
        })
    }
}

/// Deploys compiled artifacts through a node and records the results.
#[derive(Clone)]
pub struct ChainDeployments<C = ProviderClient> {
    client: C,
    signers: Vec<Address>,
    artifacts: ArtifactStore,
    store: DeploymentStore,
    receipt_timeout: Duration,
}

impl<C: DeployClient> ChainDeployments<C> {
    /// Creates a deployment backend sending from `signers`.
    pub fn new(
        client: C,
        signers: Vec<Address>,
        artifacts: ArtifactStore,
        store: DeploymentStore,
    ) -> Self {
        Self { client, signers, artifacts, store, receipt_timeout: DEFAULT_RECEIPT_TIMEOUT }
    }

    /// Sets the receipt timeout.
    pub fn with_receipt_timeout(mut self, receipt_timeout: Duration) -> Self {
        self.receipt_timeout = receipt_timeout;
        self
    }

    /// Returns the deployment store.
    pub const fn store(&self) -> &DeploymentStore {
        &self.store
    }

    /// Returns the chain id reported by the node.
    pub async fn chain_id(&self) -> Result<u64> {
        self.client.chain_id().await
    }

    /// Returns the stored record for `name` when it matches and its code is still on chain.
    async fn reusable(
        &self,
        name: &str,
        bytecode: &Bytes,
        args: &[serde_json::Value],
    ) -> Result<Option<DeploymentRecord>> {
        let Some(existing) = self.store.get(name)? else {
            return Ok(None);
        };
        if existing.matches(bytecode, args) {
            let code = self.client.code_at(existing.address).await?;
            if !code.is_empty() {
                return Ok(Some(existing));
            }
        }
        debug!(target: "deploy", name, "Recorded deployment is stale, redeploying");
        Ok(None)
    }
}

impl<C> fmt::Debug for ChainDeployments<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainDeployments")
            .field("signers", &self.signers)
            .field("artifacts", &self.artifacts)
            .field("store", &self.store)
            .field("receipt_timeout", &self.receipt_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<C: DeployClient> Deployments for ChainDeployments<C> {
    async fn deploy(&self, name: &str, options: DeployOptions) -> Result<Deployment> {
        if !self.signers.contains(&options.from) {
            return Err(DeployError::UnknownSigner(options.from));
        }

        let artifact = self.artifacts.load(&options.contract)?;
        let code = artifact.deploy_code(&options.args)?;
        let args = options.rendered_args();

        if let Some(existing) = self.reusable(name, &artifact.bytecode, &args).await? {
            if options.log {
                info!(target: "deploy", "reusing \"{name}\" at {}", existing.address);
            }
            return Ok(existing.to_deployment(false));
        }

        let tx_hash = self.client.send_deployment(options.from, code).await?;
        debug!(
            target: "deploy",
            name,
            %tx_hash,
            from = %options.from,
            "Sent deployment transaction"
        );

        if options.auto_mine {
            if let Err(err) = self.client.mine().await {
                debug!(target: "deploy", %err, "evm_mine not supported by node");
            }
        }

        let receipt = timeout(self.receipt_timeout, self.client.wait_for_receipt(tx_hash))
            .await
            .map_err(|_| DeployError::ReceiptTimeout(tx_hash))??;

        if !receipt.status {
            return Err(DeployError::Reverted(tx_hash));
        }
        let address =
            receipt.contract_address.ok_or(DeployError::MissingContractAddress(tx_hash))?;
        let gas_used = receipt.gas_used;

        let record = DeploymentRecord {
            address,
            abi: artifact.abi,
            transaction_hash: Some(tx_hash),
            receipt: Some(ReceiptSummary { block_number: receipt.block_number, gas_used }),
            args,
            bytecode: artifact.bytecode,
        };
        self.store.save(name, &record)?;

        if options.log {
            info!(
                target: "deploy",
                "deploying \"{name}\" (tx: {tx_hash})...: deployed at {address} with {gas_used} gas"
            );
        }

        Ok(record.to_deployment(true))
    }
}
