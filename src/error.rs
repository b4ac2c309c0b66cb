//! Error types for loading certificates.

use crate::cert::error::{ContainerError, PrivateKeyError};
use crate::location::{LocationError, StoreScope};
use crate::store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while resolving a certificate location.
///
/// Every variant is a configuration error: the location names something that cannot be
/// loaded. A location that is simply empty is not an error; loaders report it as `Ok(None)`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// Both a certificate file and a store subject were configured.
    #[error("ambiguous certificate source: both a file path and a store subject are set")]
    AmbiguousSource,

    /// The location could not be built.
    #[error("invalid certificate location")]
    Location(#[source] LocationError),

    /// A configured file could not be read.
    #[error("failed reading certificate file {path}")]
    ReadFile {
        /// The resolved path.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configured file does not hold usable certificate material.
    #[error("{path} does not contain a usable certificate")]
    InvalidContainer {
        /// The resolved path.
        path: PathBuf,
        /// Why decoding failed.
        #[source]
        source: ContainerError,
    },

    /// The certificate file paired with a separate key file does not hold exactly one bare
    /// certificate.
    #[error("{path} must contain exactly one certificate and no private key")]
    ExpectedSingleCertificate {
        /// The resolved path.
        path: PathBuf,
        /// Why the file was rejected.
        #[source]
        source: ContainerError,
    },

    /// The certificate public key algorithm has no private key importer.
    #[error("unsupported public key algorithm {oid} for private key {path}")]
    UnsupportedKeyAlgorithm {
        /// The resolved key path.
        path: PathBuf,
        /// The public key algorithm OID.
        oid: String,
    },

    /// The private key file could not be imported or attached.
    #[error("failed loading private key {path}: {source}")]
    KeyImport {
        /// The resolved key path.
        path: PathBuf,
        /// The underlying cause.
        #[source]
        source: PrivateKeyError,
    },

    /// No certificate in the store matched the subject or thumbprint.
    #[error("certificate '{subject}' not found in store {scope}\\{store}")]
    CertificateNotFound {
        /// The search term.
        subject: String,
        /// The store name.
        store: String,
        /// The store scope.
        scope: StoreScope,
    },

    /// The certificate store could not be opened.
    #[error("failed opening certificate store {scope}\\{store}")]
    StoreUnavailable {
        /// The store name.
        store: String,
        /// The store scope.
        scope: StoreScope,
        /// The store error.
        #[source]
        source: StoreError,
    },
}

impl From<LocationError> for LoadError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::AmbiguousSource => LoadError::AmbiguousSource,
            other => LoadError::Location(other),
        }
    }
}
