pub mod local;
pub mod memory;
pub mod s3;

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::Result;

/// Whether an opened writer replaces or extends the existing resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    #[default]
    Truncate,
    Append,
}

/// A writable stream that must be committed to make its contents durable.
///
/// `commit` is called exactly once by the owning handle, either explicitly
/// or when the handle is dropped.
pub trait WriteStream: Write + Send {
    fn commit(&mut self) -> std::io::Result<()>;
}

/// Access to resources of one scheme. Paths are the locator's path part.
pub trait Backend: Send + Sync {
    fn open_read(&self, path: &str) -> Result<Box<dyn Read + Send>>;
    fn open_write(&self, path: &str, mode: WriteMode) -> Result<Box<dyn WriteStream>>;
    fn exists(&self, path: &str) -> Result<bool>;
    fn delete(&self, path: &str) -> Result<()>;
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// The path on the local disk holding this resource, if the backend stores
    /// data there. Proxies use it to skip the temporary copy.
    fn local_path(&self, _path: &str) -> Option<PathBuf> {
        None
    }
}
