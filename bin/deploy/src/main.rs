#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod cli;
mod logging;

use artwork_deploy::{DeployRunner, DeploymentStore, RuntimeEnvironment, all_scripts};
use clap::Parser;
use cli::{Cli, Command, NetworkArgs, RunArgs};
use eyre::{Result, WrapErr};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.log.init_tracing()?;

    match cli.command {
        Command::Run(args) => run(args).await,
        Command::List => {
            list();
            Ok(())
        }
        Command::Show(args) => show(&args),
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let network = args.network_config()?;
    let env = RuntimeEnvironment::connect(
        &network,
        &args.artifacts,
        &args.network.deployments,
        args.reset,
    )
    .await
    .wrap_err_with(|| format!("Failed to connect to network {}", network.name))?;

    let runner = DeployRunner::new(all_scripts());
    let deployments = runner.run(&env, &args.tags).await?;

    info!(network = env.network(), chain_id = env.chain_id(), count = deployments.len(), "Done");

    println!();
    println!("{:<26} {:<44} {:<8}", "Script", "Address", "Status");
    println!("{}", "-".repeat(80));
    for (id, deployment) in &deployments {
        let status = if deployment.newly_deployed { "new" } else { "reused" };
        println!("{:<26} {:<44} {:<8}", id, deployment.address, status);
    }

    Ok(())
}

fn list() {
    println!("{:<26} {:<20} {:<20}", "Script", "Tags", "Dependencies");
    println!("{}", "-".repeat(68));
    for script in DeployRunner::new(all_scripts()).scripts() {
        println!(
            "{:<26} {:<20} {:<20}",
            script.id(),
            script.tags().join(","),
            script.dependencies().join(",")
        );
    }
}

fn show(args: &NetworkArgs) -> Result<()> {
    let store = DeploymentStore::new(&args.deployments, &args.network);
    let records = store.all()?;
    if records.is_empty() {
        println!("No deployments recorded for {}", args.network);
        return Ok(());
    }

    println!("Deployments on {}", args.network);
    println!("{:<20} {:<44} {:<66}", "Contract", "Address", "Transaction");
    println!("{}", "-".repeat(132));
    for (name, record) in records {
        let tx = record.transaction_hash.map(|hash| hash.to_string()).unwrap_or_default();
        println!("{:<20} {:<44} {:<66}", name, record.address, tx);
    }

    Ok(())
}
