use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

#[derive(Args)]
pub struct PutArgs {
    /// Destination locator
    locator: String,

    /// Local file to upload instead of stdin
    #[arg(long)]
    from: Option<PathBuf>,

    /// Append instead of replacing
    #[arg(long)]
    append: bool,
}

pub fn run(args: PutArgs) -> Result<()> {
    let path = genpath_core::access(&args.locator)?;

    let written = match (&args.from, args.append) {
        (Some(file), false) => path.copy_from(file)?,
        (source, append) => {
            let mut data = Vec::new();
            match source {
                Some(file) => {
                    data = std::fs::read(file)
                        .with_context(|| format!("failed to read {}", file.display()))?;
                }
                None => {
                    io::stdin().lock().read_to_end(&mut data)?;
                }
            }
            if append {
                path.append(&data)?;
            } else {
                path.write(&data)?;
            }
            data.len() as u64
        }
    };

    info!(locator = %path, bytes = written, append = args.append, "written");
    Ok(())
}
