//! Deployment scripts.
//!
//! Each script deploys one contract from the `deployer` named account and is
//! selectable by its tags.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{DeployEnvironment, Deployment, Result};

mod artwork_impl;
pub use artwork_impl::{ARTWORK_IMPL, ArtworkImplDeploy};

mod mock_usdc;
pub use mock_usdc::{
    MOCK_USDC, MOCK_USDC_INITIAL_SUPPLY, MOCK_USDC_NAME, MOCK_USDC_SYMBOL, MockUsdcDeploy,
};

/// A deployment procedure plus the tags that select it.
#[async_trait]
pub trait DeployScript: Debug + Send + Sync {
    /// Unique id; scripts run in lexicographic id order.
    fn id(&self) -> &'static str;

    /// Tags that select this script.
    fn tags(&self) -> &'static [&'static str];

    /// Tags whose scripts must run before this one.
    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    /// Runs the script.
    async fn run(&self, env: &dyn DeployEnvironment) -> Result<Deployment>;
}

/// Returns every known script in id order.
pub fn all_scripts() -> Vec<Box<dyn DeployScript>> {
    vec![Box::new(ArtworkImplDeploy), Box::new(MockUsdcDeploy)]
}
