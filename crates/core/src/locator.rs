use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Scheme used for bare paths and `Path` values.
pub const LOCAL_SCHEME: &str = "local";

/// How a locator was written, so that it can be displayed exactly as parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    /// `/tmp/x`, `README.md`, `x:\data.txt`
    Bare,
    /// `local:/tmp/x`
    Prefixed,
    /// `s3://bucket/key`
    Url,
}

/// An immutable reference to a resource: a scheme naming the backend and a
/// backend-specific path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    scheme: String,
    path: String,
    form: Form,
}

impl Locator {
    /// Parse a locator string. This only checks syntax; whether a backend
    /// exists for the scheme is decided by the registry.
    pub fn parse(input: &str) -> Result<Self> {
        let unrecognized = || Error::UnrecognizedScheme {
            input: input.to_string(),
        };

        if input.is_empty() || input.trim() != input {
            return Err(unrecognized());
        }

        let Some((scheme, rest)) = split_scheme(input) else {
            return Ok(Self {
                scheme: LOCAL_SCHEME.to_string(),
                path: input.to_string(),
                form: Form::Bare,
            });
        };

        let (path, form) = match rest.strip_prefix("//") {
            Some(path) => (path, Form::Url),
            None => (rest, Form::Prefixed),
        };
        if path.is_empty() {
            return Err(unrecognized());
        }

        Ok(Self {
            scheme: scheme.to_string(),
            path: path.to_string(),
            form,
        })
    }

    /// A locator for `path` on the local filesystem.
    pub fn local(path: impl AsRef<Path>) -> Self {
        Self {
            scheme: LOCAL_SCHEME.to_string(),
            path: path.as_ref().to_string_lossy().into_owned(),
            form: Form::Bare,
        }
    }

    /// Build a `scheme:path` locator from its parts.
    pub fn new(scheme: &str, path: &str) -> Result<Self> {
        if !is_scheme(scheme) || path.is_empty() {
            return Err(Error::UnrecognizedScheme {
                input: format!("{scheme}:{path}"),
            });
        }
        Ok(Self {
            scheme: scheme.to_string(),
            path: path.to_string(),
            form: Form::Prefixed,
        })
    }

    /// The scheme as written. Backends are looked up case-insensitively.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn form(&self) -> Form {
        self.form
    }

    /// A locator with the same scheme and form pointing at another path.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            scheme: self.scheme.clone(),
            path: path.into(),
            form: self.form,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.form {
            Form::Bare => f.write_str(&self.path),
            Form::Prefixed => write!(f, "{}:{}", self.scheme, self.path),
            Form::Url => write!(f, "{}://{}", self.scheme, self.path),
        }
    }
}

impl FromStr for Locator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Split `scheme:rest`. Single-letter prefixes are drive letters, not schemes.
fn split_scheme(input: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = input.split_once(':')?;
    if scheme.len() < 2 || !is_scheme(scheme) {
        return None;
    }
    Some((scheme, rest))
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
