//! Certificate stores.
//!
//! A [`CertificateStore`] opens named stores in a [`StoreScope`] and hands out a
//! [`StoreHandle`] over their certificates. The search algorithm only depends on this
//! trait, so any store backend (an OS trust store, a directory, memory) can sit behind it.

mod directory;
mod memory;
pub(crate) mod resolve;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;

use crate::cert::Certificate;
use crate::location::StoreScope;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;

/// Errors produced by certificate store backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The named store does not exist.
    #[error("certificate store {scope}\\{name} does not exist")]
    NotFound {
        /// The store scope.
        scope: StoreScope,
        /// The store name.
        name: String,
    },

    /// The store could not be read.
    #[error("failed reading certificate store at {path}")]
    Io {
        /// Path of the store directory or entry.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A backend-specific failure.
    #[error("certificate store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A source of certificate stores.
///
/// Implementations must be safe to call from several threads at once; every call opens an
/// independent handle.
pub trait CertificateStore: Send + Sync {
    /// Opens the store `name` in `scope` read-only.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store does not exist or cannot be read.
    fn open(&self, name: &str, scope: StoreScope) -> Result<StoreHandle, StoreError>;
}

impl<T: CertificateStore + ?Sized> CertificateStore for Arc<T> {
    fn open(&self, name: &str, scope: StoreScope) -> Result<StoreHandle, StoreError> {
        (**self).open(name, scope)
    }
}

/// Search criteria for [`StoreHandle::find`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FindQuery<'a> {
    /// Certificates whose subject contains the term, ignoring case.
    SubjectName(&'a str),
    /// Certificates whose thumbprint equals the term, ignoring case.
    Thumbprint(&'a str),
}

impl FindQuery<'_> {
    fn matches(&self, cert: &Certificate) -> bool {
        match self {
            FindQuery::SubjectName(term) => cert
                .subject()
                .to_lowercase()
                .contains(&term.to_lowercase()),
            FindQuery::Thumbprint(term) => cert.thumbprint().eq_ignore_ascii_case(term),
        }
    }
}

/// An opened certificate store.
///
/// Owns the certificates read from the store; bound keys are zeroized when the handle drops.
#[derive(Debug, Default)]
pub struct StoreHandle {
    certificates: Vec<Certificate>,
}

impl StoreHandle {
    /// Creates a handle over `certificates`.
    pub fn new(certificates: Vec<Certificate>) -> Self {
        Self { certificates }
    }

    /// Returns the number of certificates in the store.
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Returns `true` if the store holds no certificates.
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Iterates over every certificate in the store.
    pub fn iter(&self) -> impl Iterator<Item = &Certificate> {
        self.certificates.iter()
    }

    /// Returns the certificates matching `query`, in store order.
    ///
    /// With `valid_at` set, certificates whose validity period does not include that instant
    /// are skipped.
    pub fn find(&self, query: FindQuery<'_>, valid_at: Option<OffsetDateTime>) -> Vec<&Certificate> {
        self.certificates
            .iter()
            .filter(|cert| query.matches(cert))
            .filter(|cert| valid_at.map_or(true, |now| cert.is_time_valid(now)))
            .collect()
    }
}
