use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timekeeping_tools::artifact::Artifact;
use timekeeping_tools::config::Config;
use timekeeping_tools::deploy::Deployer;

#[derive(Parser)]
#[command(name = "timekeeping")]
#[command(about = "Timekeeping CLI tools for contract deployment and management")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a compiled contract
    Deploy {
        /// Contract name to deploy
        #[arg(short, long, default_value = "AttendanceContract")]
        contract: String,
        /// Network to deploy to (mumbai/polygon/localhost)
        #[arg(short, long)]
        network: Option<String>,
        /// Directory holding compiled contract artifacts
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,
    },
    /// Check configuration
    Config {
        /// Validate configuration and exit
        #[arg(short, long)]
        validate: bool,
        /// Print resolved configuration as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timekeeping=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy {
            contract,
            network,
            artifacts,
        } => {
            let config = Config::load_with_network(network.as_deref())?;
            let artifact = Artifact::load(&artifacts, &contract)?;
            let deployer = Deployer::from_config(&config)?;

            tracing::info!(
                contract = %contract,
                network = %config.network,
                deployer = ?deployer.address(),
                "deploying"
            );

            let address = deployer.deploy(&artifact).await?;

            println!(
                "{} deployed to {} with address: {:?}",
                contract, config.network, address
            );
            Ok(())
        }
        Commands::Config { validate, json } => {
            let config = Config::load()?;

            if json {
                println!("{}", config.to_json()?);
            } else {
                config.print_summary();
            }

            if validate {
                println!("Configuration OK");
            }
            Ok(())
        }
    }
}
