use alloy_dyn_abi::DynSolValue;
use alloy_primitives::U256;
use async_trait::async_trait;
use tracing::info;

use super::DeployScript;
use crate::{DeployEnvironment, DeployOptions, Deployment, Result};

/// Contract name and tag of the mock stablecoin.
pub const MOCK_USDC: &str = "MockUSDC";

/// Token name passed to the constructor.
pub const MOCK_USDC_NAME: &str = "Mock USDC";

/// Token symbol passed to the constructor.
pub const MOCK_USDC_SYMBOL: &str = "mUSDC";

/// Initial supply passed to the constructor (1,000,000 mUSDC).
pub const MOCK_USDC_INITIAL_SUPPLY: u64 = 1_000_000;

/// Deploys `MockUSDC(name, symbol, initialSupply)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockUsdcDeploy;

impl MockUsdcDeploy {
    /// Constructor arguments in declaration order.
    pub fn constructor_args() -> Vec<DynSolValue> {
        vec![
            DynSolValue::String(MOCK_USDC_NAME.to_string()),
            DynSolValue::String(MOCK_USDC_SYMBOL.to_string()),
            DynSolValue::Uint(U256::from(MOCK_USDC_INITIAL_SUPPLY), 256),
        ]
    }
}

#[async_trait]
impl DeployScript for MockUsdcDeploy {
    fn id(&self) -> &'static str {
        "05_deploy_mock_usdc"
    }

    fn tags(&self) -> &'static [&'static str] {
        &[MOCK_USDC]
    }

    async fn run(&self, env: &dyn DeployEnvironment) -> Result<Deployment> {
        let deployer = env.named_accounts().await?.deployer()?;

        let options = DeployOptions::new(deployer, MOCK_USDC)
            .with_args(Self::constructor_args())
            .with_log(true)
            .with_auto_mine(true);
        let result = env.deployments().deploy(MOCK_USDC, options).await?;

        info!(target: "deploy", "MockUSDC deployed at: {}", result.address);
        Ok(result)
    }
}
