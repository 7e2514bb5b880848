//! File helpers that accept any generalized path.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::access::AsGenPath;
use crate::error::{Error, Operation, Result};

/// Read up to `size` bytes, or the whole resource when `size` is `None`.
pub fn readf(path: impl AsGenPath, size: Option<usize>) -> Result<Vec<u8>> {
    path.as_gen_path()?.read(size)
}

pub fn writef(data: &[u8], path: impl AsGenPath) -> Result<()> {
    path.as_gen_path()?.write(data)
}

pub fn read_text(path: impl AsGenPath) -> Result<String> {
    path.as_gen_path()?.read_to_string()
}

pub fn write_text(text: &str, path: impl AsGenPath) -> Result<()> {
    path.as_gen_path()?.write(text.as_bytes())
}

/// Trimmed, non-blank lines. Lines starting with `#` are skipped when
/// `ignore_comments` is set.
pub fn iterlines(path: impl AsGenPath, ignore_comments: bool) -> Result<Vec<String>> {
    let path = path.as_gen_path()?;
    let reader = BufReader::new(path.open_read()?);
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| Error::backend_io(path.locator(), Operation::Read, e))?;
        let line = line.trim();
        if line.is_empty() || (ignore_comments && line.starts_with('#')) {
            continue;
        }
        lines.push(line.to_string());
    }
    Ok(lines)
}

pub fn jload<T: DeserializeOwned>(path: impl AsGenPath) -> Result<T> {
    let path = path.as_gen_path()?;
    let reader = BufReader::new(path.open_read()?);
    serde_json::from_reader(reader).map_err(|source| Error::Json {
        locator: path.to_string(),
        source,
    })
}

/// Write `value` as JSON followed by a newline. `indent` of `None` writes
/// compact JSON; the conventional choice is `Some(2)`.
pub fn jdump<T: Serialize + ?Sized>(value: &T, path: impl AsGenPath, indent: Option<usize>) -> Result<()> {
    let path = path.as_gen_path()?;
    let json_err = |source| Error::Json {
        locator: path.to_string(),
        source,
    };
    let mut data = match indent {
        Some(width) => {
            let indent = vec![b' '; width];
            let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
            let mut buf = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            value.serialize(&mut ser).map_err(json_err)?;
            buf
        }
        None => serde_json::to_vec(value).map_err(json_err)?,
    };
    data.push(b'\n');

    let mut handle = path.open_write()?;
    handle
        .write_all(&data)
        .map_err(|e| Error::backend_io(path.locator(), Operation::Write, e))?;
    handle.close()
}

/// A path to a not-yet-created temporary file, removed when dropped.
///
/// The suffix is appended as is; no `.` is inserted.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
    _dir: tempfile::TempDir,
}

impl TempFile {
    pub fn new(suffix: &str) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("genpath").tempdir()?;
        let path = dir.path().join(format!("file{suffix}"));
        Ok(Self { path, _dir: dir })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.path.is_file() {
            if let Err(err) = std::fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %err, "temporary file was not deleted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::access::GenPath;
    use crate::backend::memory::MemoryBackend;
    use crate::registry::Registry;

    fn mem(key: &str) -> GenPath {
        Registry::builder()
            .register("mem", std::sync::Arc::new(MemoryBackend::new()))
            .unwrap()
            .build()
            .access(&format!("mem:{key}"))
            .unwrap()
    }

    #[test]
    fn json_dump_has_indent_and_trailing_newline() {
        let path = mem("data.json");
        let value: BTreeMap<&str, Vec<u32>> = BTreeMap::from([("a", vec![1, 2])]);
        jdump(&value, &path, Some(2)).unwrap();
        assert_eq!(
            read_text(&path).unwrap(),
            "{\n  \"a\": [\n    1,\n    2\n  ]\n}\n"
        );

        let loaded: BTreeMap<String, Vec<u32>> = jload(&path).unwrap();
        assert_eq!(loaded["a"], vec![1, 2]);

        jdump(&value, &path, None).unwrap();
        assert_eq!(read_text(&path).unwrap(), "{\"a\":[1,2]}\n");
    }

    #[test]
    fn jload_reports_bad_json() {
        let path = mem("bad.json");
        write_text("{not json", &path).unwrap();
        let err = jload::<serde_json::Value>(&path).unwrap_err();
        assert!(matches!(err, Error::Json { locator, .. } if locator == "mem:bad.json"));
    }

    #[test]
    fn iterlines_skips_blanks_and_comments() {
        let path = mem("lines.txt");
        write_text("  first \n\n# comment\n   \nsecond\n", &path).unwrap();
        assert_eq!(iterlines(&path, true).unwrap(), vec!["first", "second"]);
        assert_eq!(
            iterlines(&path, false).unwrap(),
            vec!["first", "# comment", "second"]
        );
    }

    #[test]
    fn readf_with_size() {
        let path = mem("bytes");
        writef(b"0123456789", &path).unwrap();
        assert_eq!(readf(&path, Some(3)).unwrap(), b"012");
        assert_eq!(readf(&path, None).unwrap(), b"0123456789");
    }

    #[test]
    fn temp_file_is_removed_on_drop() {
        let temp = TempFile::new(".gs").unwrap();
        let path = temp.path().to_path_buf();
        assert!(path.to_string_lossy().ends_with("file.gs"));
        assert!(!path.exists());
        std::fs::write(&path, b"x").unwrap();
        drop(temp);
        assert!(!path.exists());
    }
}
