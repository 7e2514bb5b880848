use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use genpath_core::backend::memory::MemoryBackend;
use genpath_core::backend::{Backend, WriteMode, WriteStream};
use genpath_core::io::{jdump, jload, readf, writef};
use genpath_core::{BackendsConfig, Error, Locator, Operation, Registry};

fn global() -> &'static Registry {
    let config = BackendsConfig {
        memory: true,
        ..Default::default()
    };
    // Every test in this binary shares the process-wide registry.
    let _ = genpath_core::init(Registry::from_config(&config).unwrap());
    genpath_core::global().unwrap()
}

/// Records every I/O call and every stream close.
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
    closes: Arc<AtomicUsize>,
    read_drops: Arc<AtomicUsize>,
}

/// A read stream that always fails and counts how often it is dropped.
struct BrokenReader {
    drops: Arc<AtomicUsize>,
}

impl Read for BrokenReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("stream broke"))
    }
}

impl Drop for BrokenReader {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

struct RecordedStream {
    closes: Arc<AtomicUsize>,
}

impl Write for RecordedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WriteStream for RecordedStream {
    fn commit(&mut self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Recorder {
    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

impl Backend for Recorder {
    fn open_read(&self, path: &str) -> anyhow::Result<Box<dyn Read + Send>> {
        self.record(&format!("read {path}"));
        Ok(Box::new(BrokenReader {
            drops: Arc::clone(&self.read_drops),
        }))
    }

    fn open_write(&self, path: &str, _mode: WriteMode) -> anyhow::Result<Box<dyn WriteStream>> {
        self.record(&format!("write {path}"));
        Ok(Box::new(RecordedStream {
            closes: Arc::clone(&self.closes),
        }))
    }

    fn exists(&self, path: &str) -> anyhow::Result<bool> {
        self.record(&format!("exists {path}"));
        Ok(false)
    }

    fn delete(&self, path: &str) -> anyhow::Result<()> {
        self.record(&format!("delete {path}"));
        Ok(())
    }

    fn list(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        self.record(&format!("list {prefix}"));
        Ok(Vec::new())
    }
}

#[test]
fn local_write_then_read_returns_same_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let input = format!("local:{}", dir.path().join("a.txt").display());
    let path = global().access(&input).unwrap();

    let mut handle = path.open_write().unwrap();
    handle.write_all(b"hi").unwrap();
    handle.close().unwrap();

    let mut data = Vec::new();
    path.open_read().unwrap().read_to_end(&mut data).unwrap();
    assert_eq!(data, b"hi");
}

#[test]
fn unregistered_scheme_performs_no_io() {
    let recorder = Arc::new(Recorder::default());
    let registry = Registry::builder()
        .register("rec", recorder.clone())
        .unwrap()
        .build();

    let err = registry.access("ftp:/x").unwrap_err();
    assert!(matches!(err, Error::UnknownScheme { scheme } if scheme == "ftp"));
    assert!(recorder.calls.lock().unwrap().is_empty());
}

#[test]
fn handles_close_when_an_error_propagates() {
    let recorder = Arc::new(Recorder::default());
    let registry = Registry::builder()
        .register("rec", recorder.clone())
        .unwrap()
        .build();
    let path = registry.access("rec:thing").unwrap();

    let copy = || -> genpath_core::Result<()> {
        let mut writer = path.open_write()?;
        writer.write_all(b"data").map_err(|_| Error::NotInitialized)?;
        path.read(None)?;
        Ok(())
    };
    assert!(copy().is_err());
    assert_eq!(recorder.closes.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.read_drops.load(Ordering::SeqCst), 1);
    assert_eq!(
        *recorder.calls.lock().unwrap(),
        vec!["write thing", "read thing"]
    );
}

#[test]
fn read_handle_closes_when_its_error_propagates() {
    let recorder = Arc::new(Recorder::default());
    let registry = Registry::builder()
        .register("rec", recorder.clone())
        .unwrap()
        .build();
    let path = registry.access("rec:thing").unwrap();

    let consume = || -> io::Result<Vec<u8>> {
        let mut handle = path.open_read().map_err(io::Error::other)?;
        let mut data = Vec::new();
        handle.read_to_end(&mut data)?;
        Ok(data)
    };
    assert!(consume().is_err());
    assert_eq!(recorder.read_drops.load(Ordering::SeqCst), 1);

    assert!(matches!(
        path.read(None),
        Err(Error::BackendIo {
            operation: Operation::Read,
            ..
        })
    ));
    assert_eq!(recorder.read_drops.load(Ordering::SeqCst), 2);
}

#[test]
fn write_then_delete_then_exists_is_false() {
    let path = global().access("mem:scratch/file").unwrap();
    path.write(b"payload").unwrap();
    assert!(path.exists().unwrap());
    path.delete().unwrap();
    assert!(!path.exists().unwrap());
}

#[test]
fn helpers_accept_strings_paths_and_locators() {
    global();
    let dir = tempfile::tempdir().unwrap();
    let file: PathBuf = dir.path().join("nested").join("data.bin");

    writef(b"abc", &file).unwrap();
    assert_eq!(readf(file.to_str().unwrap(), None).unwrap(), b"abc");
    assert_eq!(readf(Locator::local(&file), Some(2)).unwrap(), b"ab");

    writef(b"xyz", "mem:from-string").unwrap();
    assert_eq!(readf(String::from("mem:from-string"), None).unwrap(), b"xyz");
}

#[test]
fn json_round_trip_through_memory() {
    global();
    let value = serde_json::json!({"name": "genpath", "tags": ["a", "b"]});
    jdump(&value, "mem:config.json", Some(2)).unwrap();
    let loaded: serde_json::Value = jload("mem:config.json").unwrap();
    assert_eq!(loaded, value);
}

#[test]
fn second_init_is_rejected() {
    global();
    assert!(matches!(
        genpath_core::init(Registry::local()),
        Err(Error::AlreadyInitialized)
    ));
}

#[test]
fn memory_backend_is_shared_between_accesses() {
    let backend = Arc::new(MemoryBackend::new());
    let registry = Registry::builder()
        .register("mem", backend.clone())
        .unwrap()
        .build();
    registry.access("mem:a").unwrap().write(b"1").unwrap();
    registry.access("mem:b").unwrap().append(b"2").unwrap();
    assert_eq!(backend.len(), 2);
}
