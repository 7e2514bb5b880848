use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which backends a registry is built with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendsConfig {
    #[serde(default)]
    pub local: LocalConfig,
    pub s3: Option<S3Config>,
    /// Register the in-memory backend under `mem`.
    #[serde(default)]
    pub memory: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Relative local paths resolve against this directory instead of the
    /// working directory.
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub endpoint: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Credentials are read from the environment when both keys are absent.
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    #[serde(default = "default_path_style")]
    pub path_style: bool,
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_path_style() -> bool {
    true
}
