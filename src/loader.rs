//! The certificate loader.

use crate::cert::Certificate;
use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::file::{default_root_dir, FileResolver};
use crate::location::{CertificateLocation, CertificateLocationOptions};
use crate::prelude::{debug, info, warn};
use crate::store::resolve::StoreResolver;
use crate::store::{CertificateStore, DirectoryStore, MemoryStore};
use crate::usage::{matches_key_usage, usage_name, KeyUsage};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolves certificate locations into certificates.
///
/// File locations are read from disk, relative to the configured root directory. Store
/// locations are searched in the configured [`CertificateStore`].
///
/// Every call is independent: files are re-read and stores re-opened each time, and nothing
/// is cached.
///
/// # Examples
///
/// ```no_run
/// use cert_locator::{CertificateLoader, KeyUsage};
/// use cert_locator::location::classify_path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let loader = CertificateLoader::builder().root_dir("/etc/myapp").build();
///
/// let location = classify_path("certs/server.pfx")?;
/// let cert = loader
///     .load_location(Some(&location), Some(&KeyUsage::ServerAuthentication))?
///     .ok_or("certificate cannot be used for server authentication")?;
/// println!("{} ({})", cert.subject(), cert.thumbprint());
/// # Ok(())
/// # }
/// ```
pub struct CertificateLoader {
    files: FileResolver,
    store: Arc<dyn CertificateStore>,
}

impl fmt::Debug for CertificateLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateLoader")
            .field("root_dir", &self.files.root_dir())
            .field("store", &"<CertificateStore>")
            .finish()
    }
}

impl Default for CertificateLoader {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CertificateLoader {
    /// Returns a builder for a loader.
    pub fn builder() -> CertificateLoaderBuilder {
        CertificateLoaderBuilder::new()
    }

    /// Returns the directory relative paths are resolved against.
    pub fn root_dir(&self) -> &Path {
        self.files.root_dir()
    }

    /// Loads the certificate described by `options`.
    ///
    /// Returns `Ok(None)` if `options` configures neither a file nor a store subject, or if
    /// a file certificate cannot be used for `usage`. For store locations, `usage` filters
    /// the candidates instead.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::AmbiguousSource`] if both a file and a store subject are
    /// configured, and any other [`LoadError`] if the configured certificate cannot be loaded.
    pub fn load(
        &self,
        options: &CertificateLocationOptions,
        usage: Option<&KeyUsage>,
    ) -> Result<Option<Certificate>, LoadError> {
        match options.to_location()? {
            Some(location) => self.load_location(Some(&location), usage),
            None => {
                debug!(
                    "no certificate configured ({options}), required usage: {}",
                    usage_name(usage)
                );
                Ok(None)
            }
        }
    }

    /// Loads the certificate at `location`.
    ///
    /// Same as [`CertificateLoader::load`] for callers that already hold a validated location.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the configured certificate cannot be loaded.
    pub fn load_location(
        &self,
        location: Option<&CertificateLocation>,
        usage: Option<&KeyUsage>,
    ) -> Result<Option<Certificate>, LoadError> {
        let Some(location) = location else {
            debug!(
                "no certificate configured, required usage: {}",
                usage_name(usage)
            );
            return Ok(None);
        };

        let resolved = match location {
            CertificateLocation::File(file) => self
                .files
                .resolve(file)
                .map(|cert| Some(cert).filter(|cert| matches_key_usage(cert, usage))),
            CertificateLocation::Store(store) => StoreResolver::new(self.store.as_ref())
                .resolve(store, usage)
                .map(Some),
        };

        let cert = match resolved {
            Ok(cert) => cert,
            Err(e @ LoadError::CertificateNotFound { .. }) => {
                info!(
                    "certificate {location} not found for usage {}",
                    usage_name(usage)
                );
                return Err(e);
            }
            Err(e) => {
                warn!(
                    "failed loading certificate {location} for usage {}: {e}",
                    usage_name(usage)
                );
                return Err(e);
            }
        };

        match &cert {
            Some(cert) => info!(
                "loaded certificate {} ({}) for usage {}",
                cert.subject(),
                cert.thumbprint(),
                usage_name(usage)
            ),
            None => info!(
                "certificate {location} not found for usage {}",
                usage_name(usage)
            ),
        }

        Ok(cert)
    }
}

/// Builder for [`CertificateLoader`].
///
/// Defaults: relative paths resolve against the directory named by `CERT_LOCATOR_ROOT_DIR`,
/// or the directory of the running executable when that variable is unset, and store lookups use the [`DirectoryStore`] named by `CERT_LOCATOR_STORE_DIR`, or an empty
/// [`MemoryStore`] when that variable is unset.
///
/// # Examples
///
/// ```
/// use cert_locator::store::MemoryStore;
/// use cert_locator::CertificateLoader;
/// use std::sync::Arc;
///
/// let loader = CertificateLoader::builder()
///     .root_dir("/srv/app")
///     .store(Arc::new(MemoryStore::new()))
///     .build();
/// assert_eq!(loader.root_dir(), std::path::Path::new("/srv/app"));
/// ```
#[derive(Default)]
pub struct CertificateLoaderBuilder {
    root_dir: Option<PathBuf>,
    store: Option<Arc<dyn CertificateStore>>,
}

impl fmt::Debug for CertificateLoaderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateLoaderBuilder")
            .field("root_dir", &self.root_dir)
            .field("store", &self.store.as_ref().map(|_| "<CertificateStore>"))
            .finish()
    }
}

impl CertificateLoaderBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `config`.
    pub fn config(mut self, config: LoaderConfig) -> Self {
        if let Some(root_dir) = config.root_dir {
            self.root_dir = Some(root_dir);
        }
        self
    }

    /// Sets the directory relative paths are resolved against.
    pub fn root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(root_dir.into());
        self
    }

    /// Sets the certificate store searched by store locations.
    pub fn store(mut self, store: Arc<dyn CertificateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Builds the loader.
    pub fn build(self) -> CertificateLoader {
        CertificateLoader {
            files: FileResolver::new(
                self.root_dir
                    .or_else(|| LoaderConfig::from_env().root_dir)
                    .unwrap_or_else(default_root_dir),
            ),
            store: self.store.unwrap_or_else(default_store),
        }
    }
}

fn default_store() -> Arc<dyn CertificateStore> {
    match DirectoryStore::from_env() {
        Some(store) => Arc::new(store),
        None => Arc::new(MemoryStore::new()),
    }
}
