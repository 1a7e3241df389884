use anyhow::Result;
use clap::Parser;
use world_property::config::WorldPropertyConfig;
use world_property::domain::Offer;
use world_property::telemetry::{init_telemetry, shutdown_telemetry};

mod cli;

use cli::commands::case::{AdvanceCommand, OpenCommand, StatusCommand};
use cli::commands::consult::ConsultCommand;
use cli::commands::convert::ConvertCommand;
use cli::commands::playbook::ValidatePlaybookCommand;
use cli::commands::show_how_to_get_started;
use cli::commands::stages::StagesCommand;
use cli::{Cli, Commands, PlaybookCommands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = WorldPropertyConfig::load_env_file() {
        eprintln!("⚠️  Ignoring .env file: {}", e);
    }
    let config = WorldPropertyConfig::load()?;
    init_telemetry(&config.observability.log_level)?;

    let result = tokio::runtime::Runtime::new()?.block_on(async {
        match cli.command {
            None => show_how_to_get_started().await,
            Some(Commands::Stages) => StagesCommand::new().execute().await,
            Some(Commands::Open {
                offer_id,
                property_id,
                amount,
                currency,
                actor,
            }) => {
                OpenCommand {
                    offer: Offer::new(offer_id, property_id, amount, currency),
                    actor,
                }
                .execute(&config)
                .await
            }
            Some(Commands::Advance { case_id, target, actor }) => {
                AdvanceCommand { case_id, target, actor }.execute(&config).await
            }
            Some(Commands::Status { case_id, json }) => {
                StatusCommand { case_id, json }.execute(&config).await
            }
            Some(Commands::Convert { amount, from, to }) => {
                ConvertCommand { amount, from, to }.execute(&config).await
            }
            Some(Commands::Consult { case_id, country, context }) => {
                ConsultCommand { case_id, country, context }.execute(&config).await
            }
            Some(Commands::Playbook { command }) => match command {
                PlaybookCommands::Validate { path } => {
                    ValidatePlaybookCommand { path }.execute().await
                }
            },
        }
    });

    shutdown_telemetry();
    result
}
