use std::io;

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::progress;

#[derive(Args)]
pub struct CpArgs {
    /// Source locator
    source: String,

    /// Destination locator
    destination: String,
}

pub fn run(args: CpArgs) -> Result<()> {
    let source = genpath_core::access(&args.source)?;
    let destination = genpath_core::access(&args.destination)?;

    let reader = source.open_read()?;
    let mut writer = destination.open_write()?;

    let spinner = progress::create_bytes_spinner(&format!("{source} -> {destination}"));
    let copied = io::copy(&mut spinner.wrap_read(reader), &mut writer)?;
    writer.close()?;
    spinner.finish_with_message("done");

    info!(from = %source, to = %destination, bytes = copied, "copied");
    Ok(())
}
