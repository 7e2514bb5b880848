use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{Backend, WriteMode, WriteStream};

/// Files on the local filesystem. Relative paths resolve against `root`
/// when one is set, otherwise against the working directory.
#[derive(Debug, Default)]
pub struct LocalBackend {
    root: Option<PathBuf>,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn rooted(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create directory: {}", root.display()))?;
        Ok(Self { root: Some(root) })
    }

    fn full_path(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path),
            None => PathBuf::from(path),
        }
    }
}

struct FileWriter {
    inner: BufWriter<File>,
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl WriteStream for FileWriter {
    fn commit(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl Backend for LocalBackend {
    fn open_read(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        let full = self.full_path(path);
        let file =
            File::open(&full).with_context(|| format!("failed to open: {}", full.display()))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn open_write(&self, path: &str, mode: WriteMode) -> Result<Box<dyn WriteStream>> {
        let full = self.full_path(path);
        if let Some(parent) = full.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            WriteMode::Truncate => options.write(true).truncate(true),
            WriteMode::Append => options.append(true),
        };
        let file = options
            .open(&full)
            .with_context(|| format!("failed to open for writing: {}", full.display()))?;
        Ok(Box::new(FileWriter {
            inner: BufWriter::new(file),
        }))
    }

    fn exists(&self, path: &str) -> Result<bool> {
        let full = self.full_path(path);
        full.try_exists()
            .with_context(|| format!("failed to stat: {}", full.display()))
    }

    fn delete(&self, path: &str) -> Result<()> {
        let full = self.full_path(path);
        let metadata = match std::fs::symlink_metadata(&full) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to stat: {}", full.display()));
            }
        };
        // Only empty directories are removed; anything else fails.
        let removed = if metadata.is_dir() {
            std::fs::remove_dir(&full)
        } else {
            std::fs::remove_file(&full)
        };
        removed.with_context(|| format!("failed to delete: {}", full.display()))
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = self.full_path(prefix);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        let read_dir = std::fs::read_dir(&dir)
            .with_context(|| format!("failed to list: {}", dir.display()))?;
        for entry in read_dir {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                entries.push(Path::new(prefix).join(name).to_string_lossy().into_owned());
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn local_path(&self, path: &str) -> Option<PathBuf> {
        Some(self.full_path(path))
    }
}
