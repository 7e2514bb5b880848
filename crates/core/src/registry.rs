use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::info;

use crate::access::GenPath;
use crate::backend::Backend;
use crate::backend::local::LocalBackend;
use crate::backend::memory::MemoryBackend;
use crate::backend::s3::S3Backend;
use crate::config::BackendsConfig;
use crate::error::{Error, Result};
use crate::locator::{LOCAL_SCHEME, Locator};

pub const S3_SCHEME: &str = "s3";
pub const MEMORY_SCHEME: &str = "mem";

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Install the process-wide registry. Fails if one is already installed.
pub fn init(registry: Registry) -> Result<&'static Registry> {
    let mut registry = Some(registry);
    let installed = GLOBAL.get_or_init(|| {
        let registry = registry.take().unwrap_or_default();
        info!(schemes = ?registry.schemes(), "registry initialized");
        registry
    });
    if registry.is_some() {
        return Err(Error::AlreadyInitialized);
    }
    Ok(installed)
}

/// The process-wide registry installed by [`init`].
pub fn global() -> Result<&'static Registry> {
    GLOBAL.get().ok_or(Error::NotInitialized)
}

/// Maps schemes to backends. Built once, read-only afterwards.
#[derive(Clone, Default)]
pub struct Registry {
    backends: HashMap<String, Arc<dyn Backend>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// A registry with only the local filesystem backend.
    pub fn local() -> Self {
        let mut backends: HashMap<String, Arc<dyn Backend>> = HashMap::new();
        backends.insert(LOCAL_SCHEME.to_string(), Arc::new(LocalBackend::new()));
        Self { backends }
    }

    pub fn from_config(config: &BackendsConfig) -> Result<Self> {
        let local = match &config.local.root {
            Some(root) => LocalBackend::rooted(root).map_err(|e| Error::Config(format!("{e:#}")))?,
            None => LocalBackend::new(),
        };
        let mut builder = Self::builder().register(LOCAL_SCHEME, Arc::new(local))?;

        if let Some(s3) = &config.s3 {
            let backend = S3Backend::new(
                &s3.endpoint,
                &s3.region,
                s3.access_key.as_deref(),
                s3.secret_key.as_deref(),
                s3.path_style,
            )
            .map_err(|e| Error::Config(format!("{e:#}")))?;
            builder = builder.register(S3_SCHEME, Arc::new(backend))?;
        }

        if config.memory {
            builder = builder.register(MEMORY_SCHEME, Arc::new(MemoryBackend::new()))?;
        }

        Ok(builder.build())
    }

    /// The backend registered for `scheme`. Never falls back to another one.
    pub fn resolve(&self, scheme: &str) -> Result<Arc<dyn Backend>> {
        self.backends
            .get(&scheme.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| Error::UnknownScheme {
                scheme: scheme.to_string(),
            })
    }

    pub fn contains(&self, scheme: &str) -> bool {
        self.backends.contains_key(&scheme.to_ascii_lowercase())
    }

    /// Parse `input` into a locator whose scheme has a registered backend.
    pub fn locate(&self, input: &str) -> Result<Locator> {
        let locator = Locator::parse(input)?;
        if !self.contains(locator.scheme()) {
            return Err(Error::UnrecognizedScheme {
                input: input.to_string(),
            });
        }
        Ok(locator)
    }

    /// Resolve a locator string to the backend that serves it.
    pub fn access(&self, input: &str) -> Result<GenPath> {
        self.access_locator(Locator::parse(input)?)
    }

    pub fn access_locator(&self, locator: Locator) -> Result<GenPath> {
        let backend = self.resolve(locator.scheme())?;
        Ok(GenPath::new(locator, backend))
    }

    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    backends: HashMap<String, Arc<dyn Backend>>,
}

impl RegistryBuilder {
    pub fn register(mut self, scheme: &str, backend: Arc<dyn Backend>) -> Result<Self> {
        let scheme = scheme.to_ascii_lowercase();
        if self.backends.contains_key(&scheme) {
            return Err(Error::DuplicateScheme { scheme });
        }
        self.backends.insert(scheme, backend);
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            backends: self.backends,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_scheme_is_rejected() {
        let err = Registry::builder()
            .register("local", Arc::new(LocalBackend::new()))
            .unwrap()
            .register("LOCAL", Arc::new(MemoryBackend::new()))
            .err()
            .unwrap();
        assert!(matches!(err, Error::DuplicateScheme { scheme } if scheme == "local"));
    }

    #[test]
    fn unknown_scheme_never_falls_back() {
        let registry = Registry::local();
        for scheme in ["ftp", "s3", "mem"] {
            assert!(matches!(
                registry.resolve(scheme),
                Err(Error::UnknownScheme { .. })
            ));
        }
        assert!(matches!(
            registry.access("ftp:/x"),
            Err(Error::UnknownScheme { scheme }) if scheme == "ftp"
        ));
    }

    #[test]
    fn locate_requires_registered_scheme() {
        let registry = Registry::local();
        assert_eq!(registry.locate("/tmp/a").unwrap().scheme(), "local");
        assert_eq!(registry.locate("local:/tmp/a").unwrap().path(), "/tmp/a");
        assert!(matches!(
            registry.locate("gs://bucket/x"),
            Err(Error::UnrecognizedScheme { .. })
        ));
    }

    #[test]
    fn upper_case_scheme_resolves_and_keeps_its_spelling() {
        let registry = Registry::builder()
            .register("mem", Arc::new(MemoryBackend::new()))
            .unwrap()
            .build();
        let path = registry.access("MEM:notes/a.txt").unwrap();
        path.write(b"x").unwrap();
        assert_eq!(path.to_string(), "MEM:notes/a.txt");
        assert_eq!(registry.access("mem:notes/a.txt").unwrap().read(None).unwrap(), b"x");
        assert_eq!(registry.locate("Mem:notes").unwrap().to_string(), "Mem:notes");
    }

    #[test]
    fn from_config_registers_memory() {
        let config = BackendsConfig {
            memory: true,
            ..Default::default()
        };
        let registry = Registry::from_config(&config).unwrap();
        assert_eq!(registry.schemes(), vec!["local", "mem"]);
    }
}
