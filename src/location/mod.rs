//! Certificate location descriptors.
//!
//! A [`CertificateLocation`] names either a certificate file or a trust-store entry. It is
//! validated at construction so a location can never be both. [`CertificateLocationOptions`]
//! is the loosely-typed form filled by configuration layers and converted on load.

mod classify;

pub use classify::classify_path;

use crate::constants::DEFAULT_STORE_NAME;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An error that can arise building a [`CertificateLocation`].
#[derive(Debug, Error, PartialEq, Clone)]
#[non_exhaustive]
pub enum LocationError {
    /// An empty or whitespace-only string cannot name a certificate.
    #[error("certificate path cannot be empty")]
    EmptyPath,

    /// A store location needs a subject or thumbprint to search for.
    #[error("certificate store subject cannot be empty")]
    EmptySubject,

    /// Both a file path and a store subject were configured.
    #[error("ambiguous certificate source: both a file path and a store subject are set")]
    AmbiguousSource,

    /// The store scope is neither `CurrentUser` nor `LocalMachine`.
    #[error("unknown certificate store location '{0}'")]
    InvalidScope(String),
}

/// Visibility domain of a certificate store.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Deserialize)]
pub enum StoreScope {
    /// Stores owned by the current user.
    #[default]
    CurrentUser,
    /// Machine-wide stores.
    LocalMachine,
}

impl StoreScope {
    /// Returns the canonical name of the scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreScope::CurrentUser => "CurrentUser",
            StoreScope::LocalMachine => "LocalMachine",
        }
    }
}

impl fmt::Display for StoreScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreScope {
    type Err = LocationError;

    /// Parses a scope name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("CurrentUser") {
            Ok(StoreScope::CurrentUser)
        } else if s.eq_ignore_ascii_case("LocalMachine") {
            Ok(StoreScope::LocalMachine)
        } else {
            Err(LocationError::InvalidScope(s.to_string()))
        }
    }
}

/// A password protecting a PKCS#12 container or an encrypted PEM key.
///
/// Zeroized on drop; never printed.
#[derive(Clone, Eq, PartialEq, Zeroize, ZeroizeOnDrop, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    /// Wraps `password`.
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Returns the password text.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// A certificate stored on the filesystem.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FileLocation {
    path: PathBuf,
    key_path: Option<PathBuf>,
    password: Option<Password>,
}

impl FileLocation {
    /// Creates a location for the certificate container at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::EmptyPath`] if `path` is empty.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, LocationError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(LocationError::EmptyPath);
        }
        Ok(Self {
            path,
            key_path: None,
            password: None,
        })
    }

    /// Sets the path of a separate PEM private key file.
    pub fn with_key_path(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.key_path = Some(key_path.into());
        self
    }

    /// Sets the password of the container or of the encrypted key.
    pub fn with_password(mut self, password: Password) -> Self {
        self.password = Some(password);
        self
    }

    /// Returns the certificate path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the private key path, if the key is stored separately.
    pub fn key_path(&self) -> Option<&Path> {
        self.key_path.as_deref()
    }

    /// Returns the password, if any.
    pub fn password(&self) -> Option<&Password> {
        self.password.as_ref()
    }
}

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())?;
        if let Some(key_path) = &self.key_path {
            write!(f, " (key: {})", key_path.display())?;
        }
        Ok(())
    }
}

/// A certificate held by a certificate store, searched by subject or thumbprint.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StoreLocation {
    subject: String,
    store_name: String,
    scope: StoreScope,
    allow_invalid: bool,
    require_private_key: bool,
}

impl StoreLocation {
    /// Creates a location searching the personal store of the current user for `subject`,
    /// which may be a distinguished name, a partial subject or a thumbprint.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::EmptySubject`] if `subject` is empty or whitespace.
    pub fn new(subject: impl Into<String>) -> Result<Self, LocationError> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(LocationError::EmptySubject);
        }
        Ok(Self {
            subject,
            store_name: DEFAULT_STORE_NAME.to_string(),
            scope: StoreScope::default(),
            allow_invalid: false,
            require_private_key: true,
        })
    }

    /// Sets the store to search.
    pub fn with_store_name(mut self, store_name: impl Into<String>) -> Self {
        self.store_name = store_name.into();
        self
    }

    /// Sets the scope of the store.
    pub fn with_scope(mut self, scope: StoreScope) -> Self {
        self.scope = scope;
        self
    }

    /// Includes expired or not-yet-valid certificates in the search.
    pub fn allow_invalid(mut self, allow_invalid: bool) -> Self {
        self.allow_invalid = allow_invalid;
        self
    }

    /// Restricts the search to certificates with a private key (the default).
    pub fn require_private_key(mut self, require_private_key: bool) -> Self {
        self.require_private_key = require_private_key;
        self
    }

    /// Returns the search term.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the store name.
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    /// Returns the store scope.
    pub fn scope(&self) -> StoreScope {
        self.scope
    }

    /// Returns whether invalid certificates take part in the search.
    pub fn allows_invalid(&self) -> bool {
        self.allow_invalid
    }

    /// Returns whether candidates must carry a private key.
    pub fn requires_private_key(&self) -> bool {
        self.require_private_key
    }

    /// Formats the location as a `cert:` path using `separator` between segments.
    ///
    /// # Examples
    ///
    /// ```
    /// use cert_locator::location::{StoreLocation, StoreScope};
    ///
    /// let location = StoreLocation::new("CN=web")
    ///     .unwrap()
    ///     .with_scope(StoreScope::LocalMachine);
    /// assert_eq!(location.to_path_string('/'), "cert:/LocalMachine/My/CN=web");
    /// ```
    pub fn to_path_string(&self, separator: char) -> String {
        format!(
            "cert:{sep}{}{sep}{}{sep}{}",
            self.scope,
            self.store_name,
            self.subject,
            sep = separator
        )
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path_string('\\'))
    }
}

/// Where to find a certificate.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CertificateLocation {
    /// A certificate file, optionally with a separate key file.
    File(FileLocation),
    /// A certificate store entry.
    Store(StoreLocation),
}

impl fmt::Display for CertificateLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateLocation::File(file) => fmt::Display::fmt(file, f),
            CertificateLocation::Store(store) => fmt::Display::fmt(store, f),
        }
    }
}

impl FromStr for CertificateLocation {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        classify_path(s)
    }
}

impl From<FileLocation> for CertificateLocation {
    fn from(location: FileLocation) -> Self {
        CertificateLocation::File(location)
    }
}

impl From<StoreLocation> for CertificateLocation {
    fn from(location: StoreLocation) -> Self {
        CertificateLocation::Store(location)
    }
}

/// Loosely-typed certificate descriptor, as read from configuration.
///
/// Either `path` (with optional `key_path` and `password`) or `subject` (with optional
/// `store`, `location`, `allow_invalid` and `require_private_key`) may be set, not both.
/// Empty strings count as unset.
///
/// # Examples
///
/// ```
/// use cert_locator::location::{CertificateLocation, CertificateLocationOptions};
///
/// let options = CertificateLocationOptions {
///     subject: Some("localhost".to_string()),
///     ..Default::default()
/// };
/// let location = options.to_location().unwrap().unwrap();
/// assert!(matches!(location, CertificateLocation::Store(_)));
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CertificateLocationOptions {
    /// Path of the certificate file (PEM, DER or PKCS#12).
    pub path: Option<String>,
    /// Path of a separate PEM private key file.
    pub key_path: Option<String>,
    /// Password of the PKCS#12 container or of the encrypted key.
    pub password: Option<Password>,
    /// Subject or thumbprint to search the store for.
    pub subject: Option<String>,
    /// Name of the store, `My` when unset.
    pub store: Option<String>,
    /// Scope of the store, `CurrentUser` when unset.
    pub location: Option<StoreScope>,
    /// Include expired or not-yet-valid certificates, `false` when unset.
    pub allow_invalid: Option<bool>,
    /// Only consider certificates with a private key, `true` when unset.
    pub require_private_key: Option<bool>,
}

impl CertificateLocationOptions {
    /// Returns `true` if a certificate file is configured.
    pub fn is_file_certificate(&self) -> bool {
        non_empty(&self.path).is_some()
    }

    /// Returns `true` if a store subject is configured.
    pub fn is_store_certificate(&self) -> bool {
        non_empty(&self.subject).is_some()
    }

    /// Converts the options into a validated location.
    ///
    /// Returns `Ok(None)` when neither a file nor a store subject is configured.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::AmbiguousSource`] if both are configured.
    pub fn to_location(&self) -> Result<Option<CertificateLocation>, LocationError> {
        match (non_empty(&self.path), non_empty(&self.subject)) {
            (Some(_), Some(_)) => Err(LocationError::AmbiguousSource),
            (Some(path), None) => {
                let mut file = FileLocation::new(path)?;
                if let Some(key_path) = non_empty(&self.key_path) {
                    file = file.with_key_path(key_path);
                }
                if let Some(password) = &self.password {
                    file = file.with_password(password.clone());
                }
                Ok(Some(file.into()))
            }
            (None, Some(subject)) => {
                let mut store = StoreLocation::new(subject)?
                    .with_scope(self.location.unwrap_or_default())
                    .allow_invalid(self.allow_invalid.unwrap_or(false))
                    .require_private_key(self.require_private_key.unwrap_or(true));
                if let Some(name) = non_empty(&self.store) {
                    store = store.with_store_name(name);
                }
                Ok(Some(store.into()))
            }
            (None, None) => Ok(None),
        }
    }
}

impl fmt::Display for CertificateLocationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(path) = non_empty(&self.path) {
            parts.push(format!("Path={path}"));
        }
        if let Some(key_path) = non_empty(&self.key_path) {
            parts.push(format!("KeyPath={key_path}"));
        }
        if let Some(subject) = non_empty(&self.subject) {
            parts.push(format!("Subject={subject}"));
        }
        if let Some(store) = non_empty(&self.store) {
            parts.push(format!("Store={store}"));
        }
        if let Some(location) = self.location {
            parts.push(format!("Location={location}"));
        }
        if let Some(allow_invalid) = self.allow_invalid {
            parts.push(format!("AllowInvalid={allow_invalid}"));
        }
        if let Some(require_private_key) = self.require_private_key {
            parts.push(format!("RequirePrivateKey={require_private_key}"));
        }

        if parts.is_empty() {
            f.write_str("<empty>")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

impl From<&CertificateLocation> for CertificateLocationOptions {
    fn from(location: &CertificateLocation) -> Self {
        match location {
            CertificateLocation::File(file) => Self {
                path: Some(file.path.to_string_lossy().into_owned()),
                key_path: file
                    .key_path
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
                password: file.password.clone(),
                ..Default::default()
            },
            CertificateLocation::Store(store) => Self {
                subject: Some(store.subject.clone()),
                store: Some(store.store_name.clone()),
                location: Some(store.scope),
                allow_invalid: Some(store.allow_invalid),
                require_private_key: Some(store.require_private_key),
                ..Default::default()
            },
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
