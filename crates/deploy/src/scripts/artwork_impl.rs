use async_trait::async_trait;
use tracing::info;

use super::DeployScript;
use crate::{DeployEnvironment, DeployOptions, Deployment, Result};

/// Contract name and tag of the artwork implementation.
pub const ARTWORK_IMPL: &str = "ArtworkImpl";

/// Deploys `ArtworkImpl` with no constructor arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtworkImplDeploy;

#[async_trait]
impl DeployScript for ArtworkImplDeploy {
    fn id(&self) -> &'static str {
        "00_deploy_artwork_impl"
    }

    fn tags(&self) -> &'static [&'static str] {
        &[ARTWORK_IMPL]
    }

    async fn run(&self, env: &dyn DeployEnvironment) -> Result<Deployment> {
        let deployer = env.named_accounts().await?.deployer()?;

        let options =
            DeployOptions::new(deployer, ARTWORK_IMPL).with_log(true).with_auto_mine(true);
        let result = env.deployments().deploy(ARTWORK_IMPL, options).await?;

        info!(target: "deploy", "ArtworkImpl deployed at: {}", result.address);
        Ok(result)
    }
}
