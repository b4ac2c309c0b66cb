//! Loader configuration.

use crate::constants::ROOT_DIR_ENV;
use serde::Deserialize;
use std::path::PathBuf;

/// Configuration of a [`CertificateLoader`](crate::CertificateLoader).
///
/// # Examples
///
/// ```
/// use cert_locator::LoaderConfig;
///
/// let config = LoaderConfig {
///     root_dir: Some("/etc/myapp/certs".into()),
/// };
/// assert!(config.root_dir.is_some());
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Directory relative certificate and key paths are resolved against.
    ///
    /// `None` means the directory of the running executable.
    pub root_dir: Option<PathBuf>,
}

impl LoaderConfig {
    /// Reads the configuration from the environment.
    ///
    /// `root_dir` is taken from `CERT_LOCATOR_ROOT_DIR`; an unset or empty variable leaves it
    /// unset.
    pub fn from_env() -> Self {
        Self {
            root_dir: std::env::var_os(ROOT_DIR_ENV)
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        }
    }
}
