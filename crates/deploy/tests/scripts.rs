//! Deployment scripts run against a recording environment.

use std::sync::{Mutex, Once};

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256, address};
use alloy_transport::TransportErrorKind;
use artwork_deploy::{
    DEPLOYER, DeployEnvironment, DeployError, DeployOptions, DeployRunner, DeployScript,
    Deployment, Deployments, NamedAccounts, Result, all_scripts,
    scripts::{ArtworkImplDeploy, MockUsdcDeploy},
};
use async_trait::async_trait;

const DEPLOYER_ADDRESS: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

fn init_test_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Records every deploy call and answers with sequential addresses, or fails.
#[derive(Debug, Default)]
struct RecordingDeployments {
    calls: Mutex<Vec<(String, DeployOptions)>>,
    fail_with: Option<String>,
}

#[async_trait]
impl Deployments for RecordingDeployments {
    async fn deploy(&self, name: &str, options: DeployOptions) -> Result<Deployment> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((name.to_string(), options));
        if let Some(reason) = &self.fail_with {
            return Err(TransportErrorKind::custom_str(reason).into());
        }
        Ok(Deployment::at(Address::with_last_byte(calls.len() as u8)))
    }
}

#[derive(Debug)]
struct RecordingEnvironment {
    accounts: NamedAccounts,
    deployments: RecordingDeployments,
}

impl RecordingEnvironment {
    fn new() -> Self {
        Self {
            accounts: [(DEPLOYER, DEPLOYER_ADDRESS)].into_iter().collect(),
            deployments: RecordingDeployments::default(),
        }
    }

    fn failing(reason: &str) -> Self {
        Self {
            deployments: RecordingDeployments {
                fail_with: Some(reason.to_string()),
                ..Default::default()
            },
            ..Self::new()
        }
    }

    fn calls(&self) -> Vec<(String, DeployOptions)> {
        self.deployments.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeployEnvironment for RecordingEnvironment {
    async fn named_accounts(&self) -> Result<NamedAccounts> {
        Ok(self.accounts.clone())
    }

    fn deployments(&self) -> &dyn Deployments {
        &self.deployments
    }
}

#[tokio::test]
async fn artwork_impl_deploys_once_without_args() {
    init_test_tracing();
    let env = RecordingEnvironment::new();

    let deployment = ArtworkImplDeploy.run(&env).await.unwrap();

    let expected = DeployOptions::new(DEPLOYER_ADDRESS, "ArtworkImpl")
        .with_log(true)
        .with_auto_mine(true);
    assert_eq!(env.calls(), vec![("ArtworkImpl".to_string(), expected)]);
    assert_eq!(deployment.address, Address::with_last_byte(1));
}

#[tokio::test]
async fn mock_usdc_deploys_once_with_token_args() {
    init_test_tracing();
    let env = RecordingEnvironment::new();

    MockUsdcDeploy.run(&env).await.unwrap();

    let expected = DeployOptions::new(DEPLOYER_ADDRESS, "MockUSDC")
        .with_args(vec![
            DynSolValue::String("Mock USDC".to_string()),
            DynSolValue::String("mUSDC".to_string()),
            DynSolValue::Uint(U256::from(1_000_000u64), 256),
        ])
        .with_log(true)
        .with_auto_mine(true);
    assert_eq!(env.calls(), vec![("MockUSDC".to_string(), expected)]);
}

#[test]
fn tags_match_contract_names() {
    assert_eq!(ArtworkImplDeploy.tags(), ["ArtworkImpl"]);
    assert_eq!(MockUsdcDeploy.tags(), ["MockUSDC"]);
}

#[tokio::test]
async fn deploy_failure_propagates() {
    init_test_tracing();
    let env = RecordingEnvironment::failing("nonce too low");

    for script in all_scripts() {
        let err = script.run(&env).await.unwrap_err();
        assert!(matches!(err, DeployError::Transport(_)), "{err}");
        assert!(err.to_string().contains("nonce too low"), "{err}");
    }
    assert_eq!(env.calls().len(), 2);
}

#[tokio::test]
async fn runner_selects_by_tag() {
    init_test_tracing();
    let env = RecordingEnvironment::new();
    let runner = DeployRunner::new(all_scripts());

    let deployments = runner.run(&env, &["MockUSDC".to_string()]).await.unwrap();

    assert_eq!(deployments.len(), 1);
    assert_eq!(deployments[0].0, "05_deploy_mock_usdc");
    let names: Vec<_> = env.calls().into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["MockUSDC"]);
}

#[tokio::test]
async fn runner_without_tags_deploys_both_in_order() {
    init_test_tracing();
    let env = RecordingEnvironment::new();

    DeployRunner::new(all_scripts()).run(&env, &[]).await.unwrap();

    let names: Vec<_> = env.calls().into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["ArtworkImpl", "MockUSDC"]);
}
