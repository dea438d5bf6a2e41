use std::sync::Arc;

use clap::Parser;
use tracing::debug;

use deisctl::adapter::inbound::cli::command::ColorChoice;
use deisctl::adapter::inbound::cli::output::{self, OutputConfig};
use deisctl::adapter::inbound::cli::{handler, Cli, CommandDiagnostic, TerminalReporter};
use deisctl::infrastructure::bootstrap;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    let settings = match bootstrap::load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => fail(e),
    };
    settings.logging.init(cli.verbose);
    debug!(version = env!("CARGO_PKG_VERSION"), "deisctl starting");

    let dispatcher = bootstrap::build_dispatcher(&settings, Arc::new(TerminalReporter));
    if let Err(e) = handler::execute(cli.command, &dispatcher).await {
        debug!(error = %e, "Command failed");
        fail(e);
    }
}

fn fail(error: deisctl::error::Error) -> ! {
    if output::is_json() {
        output::error(&error.to_string());
    } else {
        eprintln!("{:?}", miette::Report::new(CommandDiagnostic::new(error)));
    }
    std::process::exit(1);
}
