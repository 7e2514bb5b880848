use std::io::{Cursor, Read, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use tokio::runtime::Runtime;
use tracing::debug;

use super::{Backend, WriteMode, WriteStream};

/// Objects in an S3-compatible store, addressed as `bucket/key`.
///
/// Requests run on a private current-thread runtime, so this backend must not
/// be used from inside another async runtime's worker thread.
pub struct S3Backend {
    region: Region,
    credentials: Credentials,
    path_style: bool,
    runtime: Arc<Runtime>,
}

impl S3Backend {
    pub fn new(
        endpoint: &str,
        region: &str,
        access_key: Option<&str>,
        secret_key: Option<&str>,
        path_style: bool,
    ) -> Result<Self> {
        let region = Region::Custom {
            region: region.to_string(),
            endpoint: endpoint.to_string(),
        };
        let credentials = match (access_key, secret_key) {
            (Some(access), Some(secret)) => {
                Credentials::new(Some(access), Some(secret), None, None, None)?
            }
            (None, None) => Credentials::default().context("failed to load S3 credentials")?,
            _ => bail!("access_key and secret_key must be given together"),
        };
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start S3 runtime")?;
        Ok(Self {
            region,
            credentials,
            path_style,
            runtime: Arc::new(runtime),
        })
    }

    fn bucket(&self, name: &str) -> Result<Box<Bucket>> {
        let bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())?;
        Ok(if self.path_style {
            bucket.with_path_style()
        } else {
            bucket
        })
    }

    fn download(&self, path: &str) -> Result<Vec<u8>> {
        let (bucket, key) = split_bucket_key(path)?;
        let bucket = self.bucket(bucket)?;
        let response = self
            .runtime
            .block_on(bucket.get_object(key))
            .with_context(|| format!("S3 GET failed: {path}"))?;
        check_status(response.status_code(), "GET", path)?;
        Ok(response.to_vec())
    }
}

/// Split `bucket/key`; both parts must be non-empty.
fn split_bucket_key(path: &str) -> Result<(&str, &str)> {
    match path.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok((bucket, key)),
        _ => bail!("S3 paths have the form bucket/key, got {path:?}"),
    }
}

fn check_status(code: u16, method: &str, path: &str) -> Result<()> {
    match code {
        200..=299 => Ok(()),
        404 => Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("S3 {method} {path}: not found"),
        )
        .into()),
        other => bail!("S3 {method} {path} returned status {other}"),
    }
}

struct S3Writer {
    bucket: Box<Bucket>,
    key: String,
    path: String,
    buffer: Vec<u8>,
    runtime: Arc<Runtime>,
}

impl Write for S3Writer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl WriteStream for S3Writer {
    fn commit(&mut self) -> std::io::Result<()> {
        let data = std::mem::take(&mut self.buffer);
        debug!(path = %self.path, bytes = data.len(), "S3 upload");
        let response = self
            .runtime
            .block_on(self.bucket.put_object(&self.key, &data))
            .map_err(std::io::Error::other)?;
        check_status(response.status_code(), "PUT", &self.path).map_err(std::io::Error::other)
    }
}

impl Backend for S3Backend {
    fn open_read(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(self.download(path)?)))
    }

    fn open_write(&self, path: &str, mode: WriteMode) -> Result<Box<dyn WriteStream>> {
        let (bucket_name, key) = split_bucket_key(path)?;
        let buffer = match mode {
            WriteMode::Truncate => Vec::new(),
            WriteMode::Append if self.exists(path)? => self.download(path)?,
            WriteMode::Append => Vec::new(),
        };
        Ok(Box::new(S3Writer {
            bucket: self.bucket(bucket_name)?,
            key: key.to_string(),
            path: path.to_string(),
            buffer,
            runtime: Arc::clone(&self.runtime),
        }))
    }

    fn exists(&self, path: &str) -> Result<bool> {
        let (bucket, key) = split_bucket_key(path)?;
        let bucket = self.bucket(bucket)?;
        match self.runtime.block_on(bucket.head_object(key)) {
            Ok((_, code)) if (200..300).contains(&code) => Ok(true),
            Ok((_, 404)) | Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Ok((_, code)) => bail!("S3 HEAD {path} returned status {code}"),
            Err(err) => Err(err).with_context(|| format!("S3 HEAD failed: {path}")),
        }
    }

    fn delete(&self, path: &str) -> Result<()> {
        let (bucket, key) = split_bucket_key(path)?;
        let bucket = self.bucket(bucket)?;
        let response = self
            .runtime
            .block_on(bucket.delete_object(key))
            .with_context(|| format!("S3 DELETE failed: {path}"))?;
        match response.status_code() {
            200..=299 | 404 => Ok(()),
            other => bail!("S3 DELETE {path} returned status {other}"),
        }
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let (bucket_name, key_prefix) = match prefix.split_once('/') {
            Some((bucket, key)) => (bucket, key),
            None => (prefix, ""),
        };
        let bucket = self.bucket(bucket_name)?;
        let results = self
            .runtime
            .block_on(bucket.list(key_prefix.to_string(), None))
            .with_context(|| format!("S3 LIST failed: {prefix}"))?;
        let mut paths: Vec<String> = results
            .into_iter()
            .flat_map(|result| result.contents)
            .map(|obj| format!("{bucket_name}/{}", obj.key))
            .collect();
        paths.sort();
        Ok(paths)
    }
}
