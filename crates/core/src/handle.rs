//! Scoped streams bound to one locator.
//!
//! Handles are owned by the caller that opened them and are closed when they
//! go out of scope, including on early return and error propagation.

use std::io::{self, Read, Write};

use tracing::{debug, warn};

use crate::backend::WriteStream;
use crate::error::{Error, Operation, Result};
use crate::locator::Locator;

pub struct ReadHandle {
    locator: Locator,
    stream: Box<dyn Read + Send>,
}

impl ReadHandle {
    pub(crate) fn new(locator: Locator, stream: Box<dyn Read + Send>) -> Self {
        Self { locator, stream }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }
}

impl Read for ReadHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Drop for ReadHandle {
    fn drop(&mut self) {
        debug!(locator = %self.locator, "read handle closed");
    }
}

pub struct WriteHandle {
    locator: Locator,
    stream: Option<Box<dyn WriteStream>>,
}

impl WriteHandle {
    pub(crate) fn new(locator: Locator, stream: Box<dyn WriteStream>) -> Self {
        Self {
            locator,
            stream: Some(stream),
        }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Commit the written data and close the stream, reporting any failure.
    pub fn close(mut self) -> Result<()> {
        self.commit()
            .map_err(|e| Error::backend_io(&self.locator, Operation::Close, e))
    }

    fn commit(&mut self) -> io::Result<()> {
        match self.stream.take() {
            Some(mut stream) => {
                let result = stream.commit();
                debug!(locator = %self.locator, ok = result.is_ok(), "write handle closed");
                result
            }
            None => Ok(()),
        }
    }

    fn stream(&mut self) -> io::Result<&mut Box<dyn WriteStream>> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "write handle is closed"))
    }
}

impl Write for WriteHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream()?.flush()
    }
}

impl Drop for WriteHandle {
    fn drop(&mut self) {
        if let Err(err) = self.commit() {
            warn!(locator = %self.locator, error = %err, "failed to close write handle");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingStream {
        data: Vec<u8>,
        commits: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Write for CountingStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl WriteStream for CountingStream {
        fn commit(&mut self) -> io::Result<()> {
            self.commits.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(io::Error::other("upload rejected"))
            } else {
                Ok(())
            }
        }
    }

    fn handle(commits: &Arc<AtomicUsize>, fail: bool) -> WriteHandle {
        let stream = CountingStream {
            data: Vec::new(),
            commits: Arc::clone(commits),
            fail,
        };
        WriteHandle::new(Locator::parse("mem:x").unwrap(), Box::new(stream))
    }

    #[test]
    fn close_commits_once() {
        let commits = Arc::new(AtomicUsize::new(0));
        let mut h = handle(&commits, false);
        h.write_all(b"hi").unwrap();
        h.close().unwrap();
        assert_eq!(commits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_commits_on_error_path() {
        let commits = Arc::new(AtomicUsize::new(0));
        let run = || -> io::Result<()> {
            let mut h = handle(&commits, false);
            h.write_all(b"partial")?;
            Err(io::Error::other("caller failed"))
        };
        assert!(run().is_err());
        assert_eq!(commits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn close_reports_commit_failure() {
        let commits = Arc::new(AtomicUsize::new(0));
        let h = handle(&commits, true);
        let err = h.close().unwrap_err();
        assert!(matches!(
            err,
            Error::BackendIo {
                operation: Operation::Close,
                ..
            }
        ));
        assert_eq!(commits.load(Ordering::SeqCst), 1);
    }
}
