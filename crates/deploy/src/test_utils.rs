//! Test doubles for the deployment environment.

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::{DEPLOYER, DeployEnvironment, Deployments, MockDeployments, NamedAccounts, Result};

/// Environment with fixed named accounts and mocked deployments.
pub(crate) struct MockEnvironment {
    accounts: NamedAccounts,
    deployments: MockDeployments,
}

impl MockEnvironment {
    pub(crate) fn new(deployer: Address, deployments: MockDeployments) -> Self {
        Self { accounts: [(DEPLOYER, deployer)].into_iter().collect(), deployments }
    }

    pub(crate) fn without_accounts(deployments: MockDeployments) -> Self {
        Self { accounts: NamedAccounts::default(), deployments }
    }
}

#[async_trait]
impl DeployEnvironment for MockEnvironment {
    async fn named_accounts(&self) -> Result<NamedAccounts> {
        Ok(self.accounts.clone())
    }

    fn deployments(&self) -> &dyn Deployments {
        &self.deployments
    }
}
