use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The backend operation that was being attempted when an I/O failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    OpenRead,
    OpenWrite,
    Read,
    Write,
    Exists,
    Delete,
    List,
    Close,
    CopyTo,
    CopyFrom,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::OpenRead => "open-read",
            Operation::OpenWrite => "open-write",
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Exists => "exists",
            Operation::Delete => "delete",
            Operation::List => "list",
            Operation::Close => "close",
            Operation::CopyTo => "copy-to",
            Operation::CopyFrom => "copy-from",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input could not be parsed as a locator, or names no registered backend.
    #[error("unrecognized scheme in locator {input:?}")]
    UnrecognizedScheme { input: String },

    #[error("no backend registered for scheme {scheme:?}")]
    UnknownScheme { scheme: String },

    #[error("a backend is already registered for scheme {scheme:?}")]
    DuplicateScheme { scheme: String },

    /// An I/O failure inside a backend, tagged with the locator and operation.
    #[error("{operation} failed for {locator}: {source}")]
    BackendIo {
        locator: String,
        operation: Operation,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("the process-wide registry is already initialized")]
    AlreadyInitialized,

    #[error("the process-wide registry has not been initialized")]
    NotInitialized,

    #[error("JSON error for {locator}: {source}")]
    Json {
        locator: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid backend configuration: {0}")]
    Config(String),

    /// A local I/O failure not tied to any locator, such as creating temp storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn backend_io(
        locator: impl fmt::Display,
        operation: Operation,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Error::BackendIo {
            locator: locator.to_string(),
            operation,
            source: source.into(),
        }
    }

    /// Whether the underlying cause is a "not found" I/O error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::BackendIo { source, .. } => {
                let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(source.as_ref());
                while let Some(err) = cause {
                    if let Some(io) = err.downcast_ref::<std::io::Error>() {
                        return io.kind() == std::io::ErrorKind::NotFound;
                    }
                    cause = err.source();
                }
                false
            }
            Error::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_io_errors_carry_no_locator() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "no temp dir"));
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "I/O error: no temp dir");
    }

    #[test]
    fn backend_io_names_the_operation() {
        let err = Error::backend_io("mem:a", Operation::Write, std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "write failed for mem:a: disk full");
        assert!(!err.is_not_found());
    }
}
