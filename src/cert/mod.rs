//! `Certificate` and `PrivateKey` types.
//!
//! These types own DER-encoded bytes and validate them at construction time.

use crate::cert::error::{CertificateError, PrivateKeyError};
use crate::cert::parsing::{read_certificate_info, CertificateInfo};
use pkcs8::PrivateKeyInfo;
use std::fmt;
use time::OffsetDateTime;
use zeroize::Zeroize;

pub mod error;
pub(crate) mod parsing;

/// A DER-encoded X.509 certificate, optionally bound to its private key.
///
/// Invariant: instances are always validated as parseable DER-encoded X.509, and the
/// metadata exposed by the accessors is read once at construction.
#[derive(Clone, Eq, PartialEq)]
pub struct Certificate {
    der: Vec<u8>,
    info: CertificateInfo,
    private_key: Option<PrivateKey>,
}

impl Certificate {
    /// Returns the certificate bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.der
    }

    /// Returns the subject distinguished name, e.g. `CN=localhost, O=Example`.
    pub fn subject(&self) -> &str {
        &self.info.subject
    }

    /// Returns the simple subject name: the common name if present, otherwise the
    /// organizational unit, the organization or the e-mail address, falling back to the full
    /// subject.
    pub fn simple_name(&self) -> &str {
        &self.info.simple_name
    }

    /// Returns the upper-case hex SHA-1 digest of the DER encoding.
    pub fn thumbprint(&self) -> &str {
        &self.info.thumbprint
    }

    /// Returns the start of the validity period.
    pub fn not_before(&self) -> OffsetDateTime {
        self.info.not_before
    }

    /// Returns the end of the validity period.
    pub fn not_after(&self) -> OffsetDateTime {
        self.info.not_after
    }

    /// Returns `true` if `now` lies within the validity period.
    pub fn is_time_valid(&self, now: OffsetDateTime) -> bool {
        self.info.not_before <= now && now <= self.info.not_after
    }

    /// Returns the OIDs listed by the extended key usage extension, or `None` if the
    /// certificate carries no such extension.
    pub fn extended_key_usage(&self) -> Option<&[String]> {
        self.info.extended_key_usage.as_deref()
    }

    /// Returns the OID of the subject public key algorithm.
    pub fn public_key_algorithm(&self) -> &str {
        &self.info.public_key_algorithm
    }

    /// Returns `true` if a private key is bound to this certificate.
    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// Returns the bound private key, if any.
    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }

    /// Binds `private_key` to this certificate, replacing any previous key.
    ///
    /// The caller is responsible for the key matching the certificate public key.
    pub fn with_private_key(mut self, private_key: PrivateKey) -> Self {
        self.private_key = Some(private_key);
        self
    }

    /// Splits the certificate into its DER bytes and bound private key.
    pub fn into_parts(self) -> (Vec<u8>, Option<PrivateKey>) {
        (self.der, self.private_key)
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.info.subject)
            .field("thumbprint", &self.info.thumbprint)
            .field("not_after", &self.info.not_after)
            .field("has_private_key", &self.has_private_key())
            .finish()
    }
}

impl AsRef<[u8]> for Certificate {
    fn as_ref(&self) -> &[u8] {
        &self.der
    }
}

impl TryFrom<&[u8]> for Certificate {
    type Error = CertificateError;

    fn try_from(der_bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::try_from(Vec::from(der_bytes))
    }
}

impl TryFrom<Vec<u8>> for Certificate {
    type Error = CertificateError;

    fn try_from(der_bytes: Vec<u8>) -> Result<Self, Self::Error> {
        let info = read_certificate_info(&der_bytes)?;
        Ok(Self {
            der: der_bytes,
            info,
            private_key: None,
        })
    }
}

/// A DER-encoded private key in PKCS#8 format.
///
/// Invariant: instances are always validated as parseable PKCS#8.
///
/// This type is zeroized on drop.
#[derive(Clone, Eq, PartialEq, Zeroize)]
#[zeroize(drop)]
pub struct PrivateKey(Vec<u8>);

impl PrivateKey {
    /// Returns the private key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for PrivateKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for PrivateKey {
    type Error = PrivateKeyError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        PrivateKeyInfo::try_from(bytes).map_err(PrivateKeyError::DecodePkcs8)?;
        Ok(Self(Vec::from(bytes)))
    }
}

impl TryFrom<Vec<u8>> for PrivateKey {
    type Error = PrivateKeyError;

    fn try_from(mut bytes: Vec<u8>) -> Result<Self, Self::Error> {
        if let Err(e) = PrivateKeyInfo::try_from(bytes.as_slice()) {
            bytes.zeroize();
            return Err(PrivateKeyError::DecodePkcs8(e));
        }
        Ok(Self(bytes))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("len", &self.0.len())
            .finish()
    }
}
