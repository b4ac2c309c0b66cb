//! A [`CertificateStore`] backed by per-store directories of certificate files.

use super::{CertificateStore, StoreError, StoreHandle};
use crate::constants::STORE_DIR_ENV;
use crate::crypto::decode_store_entry;
use crate::location::StoreScope;
use crate::prelude::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const ENTRY_EXTENSIONS: [&str; 6] = ["pem", "crt", "cer", "der", "pfx", "p12"];

/// A [`CertificateStore`] backed by the filesystem.
///
/// Stores live at `<root>/<scope>/<store>/`, where `<scope>` is `CurrentUser` or
/// `LocalMachine`; directory names are matched ignoring ASCII case. Each entry is one file:
///
/// * `.pem`, `.crt`, `.cer`: a PEM certificate, optionally followed by its unencrypted
///   private key;
/// * `.der`: a DER certificate;
/// * `.pfx`, `.p12`: a PKCS#12 container protected by the empty password.
///
/// Entries that cannot be decoded are skipped.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a store rooted at the directory named by the `CERT_LOCATOR_STORE_DIR`
    /// environment variable, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var_os(STORE_DIR_ENV)
            .filter(|root| !root.is_empty())
            .map(Self::new)
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn store_dir(&self, name: &str, scope: StoreScope) -> Result<PathBuf, StoreError> {
        let not_found = || StoreError::NotFound {
            scope,
            name: name.to_string(),
        };

        let scope_dir = find_dir_ignore_case(&self.root, scope.as_str())?.ok_or_else(not_found)?;
        find_dir_ignore_case(&scope_dir, name)?.ok_or_else(not_found)
    }
}

impl CertificateStore for DirectoryStore {
    fn open(&self, name: &str, scope: StoreScope) -> Result<StoreHandle, StoreError> {
        let dir = self.store_dir(name, scope)?;

        let mut paths = read_dir(&dir)?
            .into_iter()
            .filter(|path| path.is_file() && has_entry_extension(path))
            .collect::<Vec<_>>();
        paths.sort();

        let mut certificates = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("skipping unreadable store entry {}: {e}", path.display());
                    continue;
                }
            };

            match decode_store_entry(&bytes) {
                Ok(cert) => certificates.push(cert),
                Err(e) => warn!("skipping invalid store entry {}: {e}", path.display()),
            }
        }

        debug!(
            "opened store {scope}\\{name} at {} with {} certificate(s)",
            dir.display(),
            certificates.len()
        );
        Ok(StoreHandle::new(certificates))
    }
}

fn read_dir(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let io_error = |source: io::Error| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    };

    fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|e| e.path()).map_err(io_error))
        .collect()
}

fn find_dir_ignore_case(parent: &Path, name: &str) -> Result<Option<PathBuf>, StoreError> {
    if !parent.is_dir() {
        return Ok(None);
    }

    Ok(read_dir(parent)?.into_iter().find(|path| {
        path.is_dir()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
    }))
}

fn has_entry_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ENTRY_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}
