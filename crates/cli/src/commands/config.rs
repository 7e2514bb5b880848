use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;

use genpath_core::config::{LocalConfig, S3Config};

use crate::config::AppConfig;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a new configuration file
    Init(InitArgs),
    /// Print the active configuration
    Show,
}

#[derive(Args)]
struct InitArgs {
    /// Directory that relative local paths resolve against
    #[arg(long)]
    local_root: Option<PathBuf>,

    /// S3 endpoint URL; enables the s3:// scheme
    #[arg(long)]
    s3_endpoint: Option<String>,

    /// S3 region
    #[arg(long, default_value = "auto")]
    s3_region: String,

    /// S3 access key (read from the environment when omitted)
    #[arg(long, requires = "s3_secret_key")]
    s3_access_key: Option<String>,

    /// S3 secret key
    #[arg(long, requires = "s3_access_key")]
    s3_secret_key: Option<String>,

    /// Use virtual-host style bucket addressing
    #[arg(long)]
    s3_virtual_host: bool,

    /// Enable the in-memory mem: scheme
    #[arg(long)]
    memory: bool,

    /// Overwrite an existing configuration
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Init(init) => run_init(init),
        ConfigAction::Show => {
            let config = AppConfig::load_or_default()?;
            println!("# {}", AppConfig::config_path().display());
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() && !args.force {
        anyhow::bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    let mut config = AppConfig::default();
    config.backends.local = LocalConfig {
        root: args.local_root,
    };
    config.backends.memory = args.memory;
    config.backends.s3 = args.s3_endpoint.map(|endpoint| S3Config {
        endpoint,
        region: args.s3_region,
        access_key: args.s3_access_key,
        secret_key: args.s3_secret_key,
        path_style: !args.s3_virtual_host,
    });

    config.save_to(&path)?;

    info!(config_path = %path.display(), "Config saved.");
    println!("Config: {}", path.display());
    Ok(())
}
