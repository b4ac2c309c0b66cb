#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

//! This crate resolves *certificate locations* into X.509 identity certificates, optionally
//! bound to their private key, for TLS client and server authentication.
//!
//! A location is either a file reference (a PEM, DER or PKCS#12 certificate, an optional
//! separate PEM key, an optional password) or a certificate store reference (store name,
//! store scope and a subject or thumbprint to search for).
//!
//! ## Loading from a file
//!
//! ```no_run
//! use cert_locator::location::{FileLocation, Password};
//! use cert_locator::{CertificateLoader, KeyUsage};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = CertificateLoader::builder().root_dir("/etc/myapp").build();
//!
//! let location = FileLocation::new("certs/server.crt")?
//!     .with_key_path("certs/server.key")
//!     .with_password(Password::new("secret"));
//!
//! let cert = loader
//!     .load_location(Some(&location.into()), Some(&KeyUsage::ServerAuthentication))?
//!     .ok_or("certificate is not valid for server authentication")?;
//! assert!(cert.has_private_key());
//! # Ok(())
//! # }
//! ```
//!
//! ## Searching a certificate store
//!
//! Store locations can be written as `cert:\<CurrentUser|LocalMachine>\<store>\<subject>`.
//! The subject may be a distinguished name, part of one, or a thumbprint.
//!
//! ```no_run
//! use cert_locator::location::classify_path;
//! use cert_locator::store::DirectoryStore;
//! use cert_locator::CertificateLoader;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = CertificateLoader::builder()
//!     .store(Arc::new(DirectoryStore::new("/var/lib/myapp/stores")))
//!     .build();
//!
//! let location = classify_path(r"cert:\CurrentUser\My\localhost")?;
//! let cert = loader.load_location(Some(&location), None)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **`logging`** (default): emit diagnostics through the `log` crate.
//! - **`tracing`**: emit diagnostics through the `tracing` crate instead.
//! - **`vendored`**: build OpenSSL from source.

pub mod cert;
pub mod constants;
pub mod error;
pub mod location;
pub mod store;
pub mod usage;

mod config;
mod crypto;
mod file;
mod loader;
mod observability;
mod prelude;

// -----------------------
// Re-exports
// -----------------------

pub use crate::{
    cert::{Certificate, PrivateKey},
    config::LoaderConfig,
    error::LoadError,
    loader::{CertificateLoader, CertificateLoaderBuilder},
    location::{
        classify_path, CertificateLocation, CertificateLocationOptions, FileLocation,
        LocationError, Password, StoreLocation, StoreScope,
    },
    store::{CertificateStore, DirectoryStore, MemoryStore, StoreError},
    usage::{matches_key_usage, KeyUsage},
};
