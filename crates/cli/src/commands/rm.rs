use anyhow::Result;
use clap::Args;
use tracing::info;

#[derive(Args)]
pub struct RmArgs {
    locator: String,
}

pub fn run(args: RmArgs) -> Result<()> {
    let path = genpath_core::access(&args.locator)?;
    path.delete()?;
    info!(locator = %path, "deleted");
    Ok(())
}
