pub mod access;
pub mod backend;
pub mod config;
pub mod error;
pub mod handle;
pub mod io;
pub mod locator;
pub mod registry;

pub use access::{AsGenPath, GenPath};
pub use config::BackendsConfig;
pub use error::{Error, Operation, Result};
pub use handle::{ReadHandle, WriteHandle};
pub use locator::Locator;
pub use registry::{Registry, global, init};

/// Resolve a locator string, local path or locator through the global registry.
pub fn access(path: impl AsGenPath) -> Result<GenPath> {
    path.as_gen_path()
}
