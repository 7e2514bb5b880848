use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::backend::{Backend, WriteMode};
use crate::error::{Error, Operation, Result};
use crate::handle::{ReadHandle, WriteHandle};
use crate::io::TempFile;
use crate::locator::Locator;

/// A locator bound to the backend that serves it.
///
/// All access goes through exactly one backend. Streams are returned as
/// scoped handles; the convenience methods open and close a handle per call.
#[derive(Clone)]
pub struct GenPath {
    locator: Locator,
    backend: Arc<dyn Backend>,
}

impl GenPath {
    pub(crate) fn new(locator: Locator, backend: Arc<dyn Backend>) -> Self {
        Self { locator, backend }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    fn wrap(&self, operation: Operation) -> impl FnOnce(anyhow::Error) -> Error + '_ {
        move |err| Error::backend_io(&self.locator, operation, err)
    }

    pub fn open_read(&self) -> Result<ReadHandle> {
        debug!(locator = %self.locator, "open for read");
        let stream = self
            .backend
            .open_read(self.locator.path())
            .map_err(self.wrap(Operation::OpenRead))?;
        Ok(ReadHandle::new(self.locator.clone(), stream))
    }

    pub fn open_write(&self) -> Result<WriteHandle> {
        self.open_with(WriteMode::Truncate)
    }

    pub fn open_append(&self) -> Result<WriteHandle> {
        self.open_with(WriteMode::Append)
    }

    fn open_with(&self, mode: WriteMode) -> Result<WriteHandle> {
        debug!(locator = %self.locator, ?mode, "open for write");
        let stream = self
            .backend
            .open_write(self.locator.path(), mode)
            .map_err(self.wrap(Operation::OpenWrite))?;
        Ok(WriteHandle::new(self.locator.clone(), stream))
    }

    pub fn exists(&self) -> Result<bool> {
        self.backend
            .exists(self.locator.path())
            .map_err(self.wrap(Operation::Exists))
    }

    pub fn delete(&self) -> Result<()> {
        debug!(locator = %self.locator, "delete");
        self.backend
            .delete(self.locator.path())
            .map_err(self.wrap(Operation::Delete))
    }

    /// Entries under this locator, as locators of the same scheme and form.
    pub fn list(&self) -> Result<Vec<Locator>> {
        let paths = self
            .backend
            .list(self.locator.path())
            .map_err(self.wrap(Operation::List))?;
        Ok(paths.into_iter().map(|p| self.locator.with_path(p)).collect())
    }

    /// Read up to `size` bytes, or everything when `size` is `None`.
    pub fn read(&self, size: Option<usize>) -> Result<Vec<u8>> {
        let handle = self.open_read()?;
        let mut data = Vec::new();
        let result = match size {
            Some(limit) => handle.take(limit as u64).read_to_end(&mut data),
            None => {
                let mut handle = handle;
                handle.read_to_end(&mut data)
            }
        };
        result.map_err(|e| Error::backend_io(&self.locator, Operation::Read, e))?;
        Ok(data)
    }

    pub fn read_to_string(&self) -> Result<String> {
        let mut text = String::new();
        self.open_read()?
            .read_to_string(&mut text)
            .map_err(|e| Error::backend_io(&self.locator, Operation::Read, e))?;
        Ok(text)
    }

    pub fn write(&self, data: &[u8]) -> Result<()> {
        self.write_with(data, WriteMode::Truncate)
    }

    pub fn append(&self, data: &[u8]) -> Result<()> {
        self.write_with(data, WriteMode::Append)
    }

    fn write_with(&self, data: &[u8], mode: WriteMode) -> Result<()> {
        let mut handle = self.open_with(mode)?;
        handle
            .write_all(data)
            .map_err(|e| Error::backend_io(&self.locator, Operation::Write, e))?;
        handle.close()
    }

    /// Copy this resource's contents into a file on the local disk.
    pub fn copy_to(&self, local_path: impl AsRef<Path>) -> Result<u64> {
        let local_path = local_path.as_ref();
        let mut reader = self.open_read()?;
        let mut file = File::create(local_path)
            .map_err(|e| Error::backend_io(&self.locator, Operation::CopyTo, e))?;
        let copied = io::copy(&mut reader, &mut file)
            .map_err(|e| Error::backend_io(&self.locator, Operation::CopyTo, e))?;
        debug!(locator = %self.locator, to = %local_path.display(), bytes = copied, "copied to local");
        Ok(copied)
    }

    /// Replace this resource's contents with a file from the local disk.
    pub fn copy_from(&self, local_path: impl AsRef<Path>) -> Result<u64> {
        let local_path = local_path.as_ref();
        let mut file = File::open(local_path)
            .map_err(|e| Error::backend_io(&self.locator, Operation::CopyFrom, e))?;
        let mut writer = self.open_write()?;
        let copied = io::copy(&mut file, &mut writer)
            .map_err(|e| Error::backend_io(&self.locator, Operation::CopyFrom, e))?;
        writer.close()?;
        debug!(locator = %self.locator, from = %local_path.display(), bytes = copied, "copied from local");
        Ok(copied)
    }

    /// Run `f` with a local, read-only copy of this resource.
    ///
    /// Changes made to the file are discarded afterwards.
    pub fn with_read_proxy<T, E>(&self, f: impl FnOnce(&Path) -> Result<T, E>) -> Result<T, E>
    where
        E: From<Error>,
    {
        self.with_proxy(ProxyMode::Read, f)
    }

    /// Run `f` with a fresh local path whose contents replace this resource
    /// once `f` returns `Ok`.
    pub fn with_write_proxy<T, E>(&self, f: impl FnOnce(&Path) -> Result<T, E>) -> Result<T, E>
    where
        E: From<Error>,
    {
        self.with_proxy(ProxyMode::Write, f)
    }

    /// Run `f` with a local copy of this resource that is written back once
    /// `f` returns `Ok`.
    pub fn with_read_write_proxy<T, E>(
        &self,
        f: impl FnOnce(&Path) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<Error>,
    {
        self.with_proxy(ProxyMode::ReadWrite, f)
    }

    fn with_proxy<T, E>(&self, mode: ProxyMode, f: impl FnOnce(&Path) -> Result<T, E>) -> Result<T, E>
    where
        E: From<Error>,
    {
        if let Some(path) = self.backend.local_path(self.locator.path()) {
            return f(path.as_path());
        }

        let temp = TempFile::new(".proxy")?;
        if mode.reads() {
            self.copy_to(temp.path())?;
        }
        let value = f(temp.path())?;
        if mode.writes() {
            self.copy_from(temp.path())?;
        }
        Ok(value)
    }

    /// The path on the local disk, when the backend stores data there.
    pub fn local_path(&self) -> Option<PathBuf> {
        self.backend.local_path(self.locator.path())
    }
}

impl fmt::Debug for GenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GenPath").field(&self.locator).finish()
    }
}

impl fmt::Display for GenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.locator, f)
    }
}

#[derive(Debug, Clone, Copy)]
enum ProxyMode {
    Read,
    Write,
    ReadWrite,
}

impl ProxyMode {
    fn reads(self) -> bool {
        matches!(self, ProxyMode::Read | ProxyMode::ReadWrite)
    }

    fn writes(self) -> bool {
        matches!(self, ProxyMode::Write | ProxyMode::ReadWrite)
    }
}

/// Anything that names a resource: locator strings, local paths, locators
/// and already-resolved paths. Strings resolve through the global registry.
pub trait AsGenPath {
    fn as_gen_path(&self) -> Result<GenPath>;
}

impl AsGenPath for GenPath {
    fn as_gen_path(&self) -> Result<GenPath> {
        Ok(self.clone())
    }
}

impl AsGenPath for str {
    fn as_gen_path(&self) -> Result<GenPath> {
        crate::registry::global()?.access(self)
    }
}

impl AsGenPath for String {
    fn as_gen_path(&self) -> Result<GenPath> {
        self.as_str().as_gen_path()
    }
}

impl AsGenPath for Locator {
    fn as_gen_path(&self) -> Result<GenPath> {
        crate::registry::global()?.access_locator(self.clone())
    }
}

impl AsGenPath for Path {
    fn as_gen_path(&self) -> Result<GenPath> {
        Locator::local(self).as_gen_path()
    }
}

impl AsGenPath for PathBuf {
    fn as_gen_path(&self) -> Result<GenPath> {
        self.as_path().as_gen_path()
    }
}

impl<T: AsGenPath + ?Sized> AsGenPath for &T {
    fn as_gen_path(&self) -> Result<GenPath> {
        (**self).as_gen_path()
    }
}
