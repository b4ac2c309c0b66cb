//! Subject / thumbprint search over a certificate store.

use super::{CertificateStore, FindQuery, StoreHandle};
use crate::cert::Certificate;
use crate::error::LoadError;
use crate::location::StoreLocation;
use crate::prelude::debug;
use crate::usage::{matches_key_usage, KeyUsage};
use time::OffsetDateTime;

/// Selects one certificate from a store for a [`StoreLocation`].
///
/// The search term is tried as a subject first and as a thumbprint only when no subject
/// matches. Among subject matches, an exact simple-name match wins; otherwise the
/// longest-lived match is returned.
pub(crate) struct StoreResolver<'a> {
    store: &'a dyn CertificateStore,
}

impl<'a> StoreResolver<'a> {
    pub(crate) fn new(store: &'a dyn CertificateStore) -> Self {
        Self { store }
    }

    pub(crate) fn resolve(
        &self,
        location: &StoreLocation,
        usage: Option<&KeyUsage>,
    ) -> Result<Certificate, LoadError> {
        let handle = self
            .store
            .open(location.store_name(), location.scope())
            .map_err(|source| LoadError::StoreUnavailable {
                store: location.store_name().to_string(),
                scope: location.scope(),
                source,
            })?;

        let subject = location.subject();
        let search = Search {
            handle: &handle,
            location,
            usage,
            valid_at: (!location.allows_invalid()).then(OffsetDateTime::now_utc),
        };

        let mut fallback = None;
        for cert in search.candidates(FindQuery::SubjectName(subject)) {
            if cert.simple_name().eq_ignore_ascii_case(subject) {
                debug!("exact subject match for '{subject}': {}", cert.thumbprint());
                return Ok(cert.clone());
            }
            fallback.get_or_insert(cert);
        }

        if let Some(cert) = fallback {
            debug!(
                "no exact subject match for '{subject}', using partial match {} ({})",
                cert.subject(),
                cert.thumbprint()
            );
            return Ok(cert.clone());
        }

        if let Some(cert) = search
            .candidates(FindQuery::Thumbprint(subject))
            .into_iter()
            .next()
        {
            debug!("thumbprint match for '{subject}': {}", cert.subject());
            return Ok(cert.clone());
        }

        Err(LoadError::CertificateNotFound {
            subject: subject.to_string(),
            store: location.store_name().to_string(),
            scope: location.scope(),
        })
    }
}

struct Search<'h> {
    handle: &'h StoreHandle,
    location: &'h StoreLocation,
    usage: Option<&'h KeyUsage>,
    valid_at: Option<OffsetDateTime>,
}

impl<'h> Search<'h> {
    /// Certificates matching `query` and the location filters, latest expiry first.
    fn candidates(&self, query: FindQuery<'_>) -> Vec<&'h Certificate> {
        let mut found = self
            .handle
            .find(query, self.valid_at)
            .into_iter()
            .filter(|cert| matches_key_usage(cert, self.usage))
            .filter(|cert| !self.location.requires_private_key() || cert.has_private_key())
            .collect::<Vec<_>>();

        // Stable, so store order breaks ties.
        found.sort_by(|a, b| b.not_after().cmp(&a.not_after()));
        found
    }
}
