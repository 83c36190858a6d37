//! CLI definitions for the deployment runner.

use std::path::PathBuf;

use alloy_primitives::B256;
use artwork_deploy::{DeployConfig, LOCALHOST, NetworkConfig};
use clap::{Args, Parser, Subcommand};
use eyre::{Result, WrapErr};
use url::Url;

use crate::logging::LogArgs;

/// Deploy the Artwork contracts
#[derive(Parser, Debug)]
#[command(name = "artwork-deploy", version, about = "Deploy the Artwork contracts")]
pub(crate) struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Logging configuration.
    #[command(flatten)]
    pub log: LogArgs,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Run deployment scripts
    Run(RunArgs),
    /// List deployment scripts with their tags
    List,
    /// Show recorded deployments for a network
    Show(NetworkArgs),
}

/// Network selection shared by commands that touch a network.
#[derive(Args, Debug, Clone)]
pub(crate) struct NetworkArgs {
    /// Network name, as declared in the config file.
    #[arg(long, short = 'n', env = "DEPLOY_NETWORK", default_value = LOCALHOST)]
    pub network: String,

    /// Path to the TOML config file; the built-in localhost network is used when absent.
    #[arg(long, env = "DEPLOY_CONFIG", default_value = "deploy.toml")]
    pub config: PathBuf,

    /// Directory holding per-network deployment records.
    #[arg(long, env = "DEPLOY_DEPLOYMENTS_DIR", default_value = "deployments")]
    pub deployments: PathBuf,
}

impl NetworkArgs {
    /// Loads the config file, if present.
    pub(crate) fn load_config(&self) -> Result<DeployConfig> {
        if !self.config.exists() {
            tracing::debug!(path = %self.config.display(), "No config file, using defaults");
            return Ok(DeployConfig::default());
        }
        DeployConfig::load(&self.config)
            .wrap_err_with(|| format!("Failed to load {}", self.config.display()))
    }

    /// Resolves the selected network.
    pub(crate) fn resolve(&self) -> Result<NetworkConfig> {
        Ok(self.load_config()?.network(&self.network)?)
    }
}

/// Arguments of `run`.
#[derive(Args, Debug, Clone)]
pub(crate) struct RunArgs {
    /// Network selection.
    #[command(flatten)]
    pub network: NetworkArgs,

    /// Only run scripts carrying one of these tags (comma separated).
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Override the network's RPC endpoint.
    #[arg(long, env = "DEPLOY_RPC_URL")]
    pub rpc_url: Option<Url>,

    /// Deploy with this private key instead of the configured accounts.
    #[arg(long, env = "DEPLOY_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<B256>,

    /// Directory holding compiled contract artifacts.
    #[arg(long, env = "DEPLOY_ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Delete recorded deployments for the network before running.
    #[arg(long)]
    pub reset: bool,
}

impl RunArgs {
    /// Resolves the network and applies command line overrides.
    pub(crate) fn network_config(&self) -> Result<NetworkConfig> {
        let mut network = self.network.resolve()?;
        if let Some(rpc_url) = &self.rpc_url {
            network = network.with_rpc_url(rpc_url.clone());
        }
        if let Some(key) = self.private_key {
            network = network.with_private_key(key);
        }
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("artwork-deploy").chain(args.iter().copied()))
    }

    fn run_args(args: &[&str]) -> RunArgs {
        match parse(args).command {
            Command::Run(run) => run,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn run_defaults() {
        let run = run_args(&["run"]);

        assert!(run.tags.is_empty());
        assert_eq!(run.network.network, "localhost");
        assert_eq!(run.artifacts, PathBuf::from("artifacts"));
        assert_eq!(run.network.deployments, PathBuf::from("deployments"));
        assert!(!run.reset);
    }

    #[test]
    fn tags_are_comma_separated() {
        let run = run_args(&["run", "--tags", "ArtworkImpl,MockUSDC"]);
        assert_eq!(run.tags, vec!["ArtworkImpl", "MockUSDC"]);

        let run = run_args(&["run", "--tags", "MockUSDC", "--tags", "ArtworkImpl"]);
        assert_eq!(run.tags, vec!["MockUSDC", "ArtworkImpl"]);
    }

    #[test]
    fn overrides_apply_to_localhost() {
        let run = run_args(&[
            "run",
            "--config",
            "does-not-exist.toml",
            "--rpc-url",
            "http://10.0.0.2:8545",
            "--private-key",
            "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
        ]);

        let network = run.network_config().unwrap();
        assert_eq!(network.name, "localhost");
        assert_eq!(network.rpc_url.host_str(), Some("10.0.0.2"));
        assert_eq!(network.accounts.signers().unwrap().len(), 1);
    }

    #[test]
    fn unknown_network_fails_to_resolve() {
        let run = run_args(&["run", "--network", "mainnet", "--config", "does-not-exist.toml"]);
        assert!(run.network_config().is_err());
    }

    #[test]
    fn log_flags_are_global() {
        let cli = parse(&["list", "-vvvv", "--log-format", "json"]);
        assert_eq!(cli.log.verbosity, 4);
        assert!(matches!(cli.command, Command::List));
    }
}
