//! Well-known names and identifiers used when locating certificates.

/// OID of the `id-kp-serverAuth` extended key usage (TLS server authentication).
pub const SERVER_AUTHENTICATION_OID: &str = "1.3.6.1.5.5.7.3.1";

/// OID of the `id-kp-clientAuth` extended key usage (TLS client authentication).
pub const CLIENT_AUTHENTICATION_OID: &str = "1.3.6.1.5.5.7.3.2";

/// Name of the personal certificate store, searched when a store location names no store.
pub const DEFAULT_STORE_NAME: &str = "My";

/// Name of the environment variable holding the directory relative certificate paths are
/// resolved against.
///
/// Read by [`CertificateLoaderBuilder::build`](crate::CertificateLoaderBuilder::build) when no
/// root directory was configured. When unset, paths are resolved against the directory of the
/// running executable.
pub const ROOT_DIR_ENV: &str = "CERT_LOCATOR_ROOT_DIR";

/// Name of the environment variable holding the root directory of a
/// [`DirectoryStore`](crate::store::DirectoryStore).
pub const STORE_DIR_ENV: &str = "CERT_LOCATOR_STORE_DIR";
