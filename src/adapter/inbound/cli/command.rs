//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Deis platform control utility
#[derive(Parser, Debug)]
#[command(name = "deisctl")]
#[command(version)]
pub struct Cli {
    /// Settings file [default: ~/.deisctl/config.toml]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Only print warnings, errors and requested values
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load unit definitions so the targets can be started
    Install(TargetArgs),

    /// Start installed targets
    Start(TargetArgs),

    /// Stop running targets
    Stop(TargetArgs),

    /// Stop then start targets
    Restart(TargetArgs),

    /// Remove unit definitions
    Uninstall(TargetArgs),

    /// Print the status of each target
    Status(TargetArgs),

    /// Print the log journal of each target
    Journal(TargetArgs),

    /// List installed units
    List,

    /// Print the contents of the defined unit files
    ListUnitFiles,

    /// Set replica counts, e.g. `router=3`
    Scale(ScaleArgs),

    /// Get or set cluster configuration values
    Config(ConfigArgs),
}

/// One or more targets: component names, `name@N`, `platform`, `k8s` or `mesos`.
#[derive(Args, Debug)]
pub struct TargetArgs {
    #[arg(required = true, value_name = "TARGET")]
    pub targets: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ScaleArgs {
    /// `component=count` pairs
    #[arg(required = true, value_name = "COMPONENT=COUNT")]
    pub targets: Vec<String>,
}

/// `deisctl config <component> get|set ...`
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Component the keys belong to, e.g. `platform` or `router`
    pub component: String,

    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the value of each key
    Get {
        #[arg(required = true, value_name = "KEY")]
        keys: Vec<String>,
    },
    /// Store `key=value` pairs
    Set {
        #[arg(required = true, value_name = "KEY=VALUE")]
        pairs: Vec<String>,
    },
}
