//! Verb handlers: route a parsed command to the dispatcher.

use tracing::debug;

use crate::application::Dispatcher;
use crate::error::{ConfigError, Result};

use super::command::{Commands, ConfigAction, ConfigArgs};
use super::output;

/// Run one command to completion.
pub async fn execute(command: Commands, dispatcher: &Dispatcher) -> Result<()> {
    debug!(?command, "Executing command");
    match command {
        Commands::Install(args) => dispatcher.install(&args.targets).await,
        Commands::Start(args) => dispatcher.start(&args.targets).await,
        Commands::Stop(args) => dispatcher.stop(&args.targets).await,
        Commands::Restart(args) => dispatcher.restart(&args.targets).await,
        Commands::Uninstall(args) => dispatcher.uninstall(&args.targets).await,
        Commands::Status(args) => dispatcher.status(&args.targets).await,
        Commands::Journal(args) => dispatcher.journal(&args.targets).await,
        Commands::List => dispatcher.list_units().await,
        Commands::ListUnitFiles => dispatcher.list_unit_files().await,
        Commands::Scale(args) => dispatcher.scale(&args.targets).await,
        Commands::Config(args) => config(args, dispatcher).await,
    }
}

async fn config(args: ConfigArgs, dispatcher: &Dispatcher) -> Result<()> {
    let ConfigArgs { component, action } = args;
    match action {
        ConfigAction::Get { keys } => {
            for (key, value) in dispatcher.config_get(&component, &keys).await? {
                match value {
                    Some(value) => output::value(&key, &value),
                    None => {
                        return Err(ConfigError::missing(
                            format!("/deis/{component}/{key}"),
                            format!("use: deisctl config {component} set {key}=<value>"),
                        )
                        .into())
                    }
                }
            }
            Ok(())
        }
        ConfigAction::Set { pairs } => {
            for (key, value) in dispatcher.config_set(&component, &pairs).await? {
                output::field(&key, value);
            }
            Ok(())
        }
    }
}
