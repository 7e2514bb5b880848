mod commands;
mod config;
mod progress;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use genpath_core::Registry;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "genpath",
    version,
    about = "Read and write local and remote resources through one interface"
)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        commands::Command::Config(args) => commands::config::run(args),
        command => {
            let config = AppConfig::load_or_default()?;
            genpath_core::init(Registry::from_config(&config.backends)?)?;
            dispatch(command)
        }
    }
}

fn dispatch(command: commands::Command) -> anyhow::Result<()> {
    match command {
        commands::Command::Cat(args) => commands::cat::run(args),
        commands::Command::Put(args) => commands::put::run(args),
        commands::Command::Exists(args) => commands::exists::run(args),
        commands::Command::Rm(args) => commands::rm::run(args),
        commands::Command::Ls(args) => commands::ls::run(args),
        commands::Command::Cp(args) => commands::cp::run(args),
        commands::Command::Config(args) => commands::config::run(args),
    }
}
