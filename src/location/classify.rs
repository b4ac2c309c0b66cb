//! Classification of path-like strings into file or store locations.

use super::{CertificateLocation, FileLocation, LocationError, StoreLocation, StoreScope};

const STORE_PATH_PREFIX: &str = "cert:";

/// Classifies `path` as a certificate store reference or a file path.
///
/// Store references follow `cert:<sep><location><sep><store><sep><subject>`, where `<sep>` is
/// `\` or `/`, `<location>` is `CurrentUser` or `LocalMachine`, and `<subject>` is the rest of
/// the string (a distinguished name, a partial subject or a thumbprint). Matching ignores
/// ASCII case. Anything else, including malformed store references, is a file path.
///
/// # Errors
///
/// Returns [`LocationError::EmptyPath`] if `path` is empty or whitespace-only.
///
/// # Examples
///
/// ```
/// use cert_locator::location::{classify_path, CertificateLocation, StoreScope};
///
/// let location = classify_path(r"cert:\LocalMachine\My\CN=MyCert, O=MyOrg").unwrap();
/// let CertificateLocation::Store(store) = location else { panic!() };
/// assert_eq!(store.scope(), StoreScope::LocalMachine);
/// assert_eq!(store.store_name(), "My");
/// assert_eq!(store.subject(), "CN=MyCert, O=MyOrg");
///
/// let location = classify_path("certs/server.pfx").unwrap();
/// assert!(matches!(location, CertificateLocation::File(_)));
/// ```
pub fn classify_path(path: &str) -> Result<CertificateLocation, LocationError> {
    if path.trim().is_empty() {
        return Err(LocationError::EmptyPath);
    }

    match parse_store_path(path) {
        Some(store) => Ok(store.into()),
        None => Ok(FileLocation::new(path)?.into()),
    }
}

fn is_separator(c: char) -> bool {
    c == '\\' || c == '/'
}

fn parse_store_path(path: &str) -> Option<StoreLocation> {
    let prefix = path.get(..STORE_PATH_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(STORE_PATH_PREFIX) {
        return None;
    }

    let rest = path[STORE_PATH_PREFIX.len()..].strip_prefix(is_separator)?;
    let (scope, rest) = rest.split_once(is_separator)?;
    let (store_name, subject) = rest.split_once(is_separator)?;
    if scope.is_empty() || store_name.is_empty() || subject.is_empty() {
        return None;
    }

    let scope = scope.parse::<StoreScope>().ok()?;
    let location = StoreLocation::new(subject).ok()?;
    Some(location.with_store_name(store_name).with_scope(scope))
}
