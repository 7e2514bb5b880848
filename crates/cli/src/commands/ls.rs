use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct LsArgs {
    /// Directory or key prefix
    locator: String,
}

pub fn run(args: LsArgs) -> Result<()> {
    let entries = genpath_core::access(&args.locator)?.list()?;
    if entries.is_empty() {
        println!("No entries.");
        return Ok(());
    }
    for entry in entries {
        println!("{entry}");
    }
    Ok(())
}
