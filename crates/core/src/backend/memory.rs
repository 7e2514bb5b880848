use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow};

use super::{Backend, WriteMode, WriteStream};

type Objects = Arc<Mutex<BTreeMap<String, Vec<u8>>>>;

/// A process-local object store. Written data becomes visible when the
/// writer is committed.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    objects: Objects,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.objects).map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock(objects: &Objects) -> Result<MutexGuard<'_, BTreeMap<String, Vec<u8>>>> {
    objects
        .lock()
        .map_err(|_| anyhow!("memory store lock poisoned"))
}

struct MemoryWriter {
    objects: Objects,
    path: String,
    buffer: Vec<u8>,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl WriteStream for MemoryWriter {
    fn commit(&mut self) -> std::io::Result<()> {
        let mut objects = lock(&self.objects).map_err(std::io::Error::other)?;
        objects.insert(self.path.clone(), std::mem::take(&mut self.buffer));
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn open_read(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        let objects = lock(&self.objects)?;
        let data = objects.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("no object: {path}"))
        })?;
        Ok(Box::new(Cursor::new(data)))
    }

    fn open_write(&self, path: &str, mode: WriteMode) -> Result<Box<dyn WriteStream>> {
        let buffer = match mode {
            WriteMode::Truncate => Vec::new(),
            WriteMode::Append => lock(&self.objects)?.get(path).cloned().unwrap_or_default(),
        };
        Ok(Box::new(MemoryWriter {
            objects: Arc::clone(&self.objects),
            path: path.to_string(),
            buffer,
        }))
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(lock(&self.objects)?.contains_key(path))
    }

    fn delete(&self, path: &str) -> Result<()> {
        lock(&self.objects)?.remove(path);
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let objects = lock(&self.objects)?;
        Ok(objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_visible_after_commit() {
        let backend = MemoryBackend::new();
        let mut writer = backend.open_write("a/b", WriteMode::Truncate).unwrap();
        writer.write_all(b"data").unwrap();
        assert!(!backend.exists("a/b").unwrap());

        writer.commit().unwrap();
        assert!(backend.exists("a/b").unwrap());

        let mut out = Vec::new();
        backend.open_read("a/b").unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(out, b"data");
    }

    #[test]
    fn append_and_list() {
        let backend = MemoryBackend::new();
        for (path, data, mode) in [
            ("logs/1", &b"one"[..], WriteMode::Truncate),
            ("logs/1", &b"two"[..], WriteMode::Append),
            ("other", &b"x"[..], WriteMode::Truncate),
        ] {
            let mut writer = backend.open_write(path, mode).unwrap();
            writer.write_all(data).unwrap();
            writer.commit().unwrap();
        }

        let mut out = Vec::new();
        backend.open_read("logs/1").unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(out, b"onetwo");
        assert_eq!(backend.list("logs/").unwrap(), vec!["logs/1"]);
        assert_eq!(backend.len(), 2);

        backend.delete("logs/1").unwrap();
        assert!(!backend.exists("logs/1").unwrap());
    }

    #[test]
    fn missing_object_is_not_found() {
        let backend = MemoryBackend::new();
        let err = backend.open_read("nothing").err().unwrap();
        let io = err.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
    }
}
