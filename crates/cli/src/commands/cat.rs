use std::io::Write;

use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct CatArgs {
    /// Locator, e.g. s3://bucket/key or /tmp/file
    locator: String,

    /// Read at most this many bytes
    #[arg(long)]
    bytes: Option<usize>,
}

pub fn run(args: CatArgs) -> Result<()> {
    let data = genpath_core::io::readf(&args.locator, args.bytes)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&data)?;
    stdout.flush()?;
    Ok(())
}
