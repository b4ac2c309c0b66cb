//! Loading certificates from the filesystem.

use crate::cert::error::PrivateKeyError;
use crate::cert::Certificate;
use crate::crypto::{attach_private_key, decode_bare_certificate, decode_container, KeyAlgorithm};
use crate::error::LoadError;
use crate::location::FileLocation;
use crate::prelude::debug;
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Loads the certificate named by a [`FileLocation`].
///
/// Relative paths are resolved against `root_dir`. A configured file that cannot be loaded is
/// always an error.
#[derive(Debug, Clone)]
pub(crate) struct FileResolver {
    root_dir: PathBuf,
}

impl FileResolver {
    pub(crate) fn new(root_dir: PathBuf) -> Self {
        Self { root_dir }
    }

    pub(crate) fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub(crate) fn resolve(&self, location: &FileLocation) -> Result<Certificate, LoadError> {
        let path = self.resolve_path(location.path());
        let password = location.password().map(|p| p.expose());

        match location.key_path() {
            None => {
                debug!("loading certificate container {}", path.display());
                let bytes = read_file(&path)?;
                decode_container(&bytes, password)
                    .map_err(|source| LoadError::InvalidContainer { path, source })
            }
            Some(key_path) => {
                let key_path = self.resolve_path(key_path);
                debug!(
                    "loading certificate {} with private key {}",
                    path.display(),
                    key_path.display()
                );
                self.load_with_key(path, key_path, password)
            }
        }
    }

    fn load_with_key(
        &self,
        path: PathBuf,
        key_path: PathBuf,
        password: Option<&str>,
    ) -> Result<Certificate, LoadError> {
        let bytes = read_file(&path)?;
        let cert = decode_bare_certificate(&bytes)
            .map_err(|source| LoadError::ExpectedSingleCertificate { path, source })?;

        let Some(algorithm) = KeyAlgorithm::from_oid(cert.public_key_algorithm()) else {
            return Err(LoadError::UnsupportedKeyAlgorithm {
                path: key_path,
                oid: cert.public_key_algorithm().to_string(),
            });
        };

        let key_pem = Zeroizing::new(fs::read_to_string(&key_path).map_err(|source| {
            LoadError::ReadFile {
                path: key_path.clone(),
                source,
            }
        })?);

        let key_error = |source: PrivateKeyError| LoadError::KeyImport {
            path: key_path.clone(),
            source,
        };

        let key = algorithm
            .import_pem(key_pem.as_bytes(), password.map(str::as_bytes))
            .map_err(key_error)?;
        attach_private_key(cert, &key).map_err(key_error)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_dir.join(path)
        }
    }
}

fn read_file(path: &Path) -> Result<Zeroizing<Vec<u8>>, LoadError> {
    fs::read(path)
        .map(Zeroizing::new)
        .map_err(|source| LoadError::ReadFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Directory of the running executable, or the current directory if it cannot be determined.
pub(crate) fn default_root_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
