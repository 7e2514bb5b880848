use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct ExistsArgs {
    locator: String,

    /// Exit with an error instead of printing `false`
    #[arg(long)]
    check: bool,
}

pub fn run(args: ExistsArgs) -> Result<()> {
    let exists = genpath_core::access(&args.locator)?.exists()?;
    if args.check && !exists {
        anyhow::bail!("{} does not exist", args.locator);
    }
    println!("{exists}");
    Ok(())
}
