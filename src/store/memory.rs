use super::{CertificateStore, StoreError, StoreHandle};
use crate::cert::Certificate;
use crate::location::StoreScope;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// An in-memory [`CertificateStore`].
///
/// Store names are matched ignoring ASCII case. Opening a store that was never populated
/// yields an empty handle.
///
/// # Examples
///
/// ```no_run
/// use cert_locator::location::StoreScope;
/// use cert_locator::store::MemoryStore;
/// # fn example(cert: cert_locator::Certificate) {
/// let store = MemoryStore::new();
/// store.add(StoreScope::CurrentUser, "My", cert);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    stores: RwLock<HashMap<(StoreScope, String), Vec<Certificate>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `cert` to the store `name` in `scope`.
    pub fn add(&self, scope: StoreScope, name: &str, cert: Certificate) {
        self.stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((scope, name.to_ascii_lowercase()))
            .or_default()
            .push(cert);
    }

    /// Removes every certificate with the given thumbprint from the store `name` in `scope`.
    ///
    /// Returns the number of removed certificates.
    pub fn remove(&self, scope: StoreScope, name: &str, thumbprint: &str) -> usize {
        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        let Some(certs) = stores.get_mut(&(scope, name.to_ascii_lowercase())) else {
            return 0;
        };

        let before = certs.len();
        certs.retain(|cert| !cert.thumbprint().eq_ignore_ascii_case(thumbprint));
        before - certs.len()
    }
}

impl CertificateStore for MemoryStore {
    fn open(&self, name: &str, scope: StoreScope) -> Result<StoreHandle, StoreError> {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        let certs = stores
            .get(&(scope, name.to_ascii_lowercase()))
            .cloned()
            .unwrap_or_default();
        Ok(StoreHandle::new(certs))
    }
}
