//! Cryptographic backend.
//!
//! Decodes certificate containers (PEM, DER, PKCS#12), imports PEM private keys with the
//! importer matching the certificate public key algorithm, and binds keys to certificates.
//! Keys leave this module as PKCS#8 DER only.

use crate::cert::error::{ContainerError, PrivateKeyError};
use crate::cert::{Certificate, PrivateKey};
use openssl::ec::EcKey;
use openssl::error::ErrorStack;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, PKeyRef, Private};
use openssl::rsa::Rsa;
use openssl::x509::X509;
use x509_parser::pem::Pem;

const PEM_CERTIFICATE_LABEL: &str = "CERTIFICATE";
const PEM_ENCRYPTED_KEY_LABEL: &str = "ENCRYPTED PRIVATE KEY";
const PEM_BEGIN_MARKER: &[u8] = b"-----BEGIN ";

const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const OID_DSA: &str = "1.2.840.10040.4.1";

/// Public key algorithms whose PEM private keys can be imported.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum KeyAlgorithm {
    Rsa,
    Ecdsa,
    Dsa,
}

impl KeyAlgorithm {
    /// Maps a subject public key algorithm OID to its importer.
    ///
    /// Returns `None` for every algorithm outside the supported set.
    pub(crate) fn from_oid(oid: &str) -> Option<Self> {
        match oid {
            OID_RSA_ENCRYPTION => Some(Self::Rsa),
            OID_EC_PUBLIC_KEY => Some(Self::Ecdsa),
            OID_DSA => Some(Self::Dsa),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::Ecdsa => "ECDSA",
            Self::Dsa => "DSA",
        }
    }

    /// Imports a PEM private key, decrypting it with `password` when one is given.
    pub(crate) fn import_pem(
        self,
        pem: &[u8],
        password: Option<&[u8]>,
    ) -> Result<PKey<Private>, PrivateKeyError> {
        let import_error = |source| PrivateKeyError::Import {
            algorithm: self.name(),
            source,
        };

        let pkey = match (self, password) {
            (Self::Rsa, Some(pass)) => Rsa::private_key_from_pem_passphrase(pem, pass)
                .and_then(PKey::from_rsa),
            (Self::Rsa, None) => {
                Rsa::private_key_from_pem_callback(pem, no_password).and_then(PKey::from_rsa)
            }
            (Self::Ecdsa, Some(pass)) => EcKey::private_key_from_pem_passphrase(pem, pass)
                .and_then(PKey::from_ec_key),
            (Self::Ecdsa, None) => {
                EcKey::private_key_from_pem_callback(pem, no_password).and_then(PKey::from_ec_key)
            }
            // `Dsa` has no private PEM reader; `dsa()` rejects keys of any other type.
            (Self::Dsa, Some(pass)) => {
                PKey::private_key_from_pem_passphrase(pem, pass).and_then(only_dsa)
            }
            (Self::Dsa, None) => {
                PKey::private_key_from_pem_callback(pem, no_password).and_then(only_dsa)
            }
        };

        pkey.map_err(import_error)
    }
}

fn only_dsa(pkey: PKey<Private>) -> Result<PKey<Private>, ErrorStack> {
    pkey.dsa().and_then(PKey::from_dsa)
}

// Refuses to supply a passphrase so encrypted keys fail instead of prompting on a terminal.
fn no_password(_buf: &mut [u8]) -> Result<usize, ErrorStack> {
    Ok(0)
}

/// Binds `key` to `cert` after checking it belongs to the certificate public key.
pub(crate) fn attach_private_key(
    cert: Certificate,
    key: &PKeyRef<Private>,
) -> Result<Certificate, PrivateKeyError> {
    let x509 = X509::from_der(cert.as_bytes())?;
    if !x509.public_key()?.public_eq(key) {
        return Err(PrivateKeyError::Mismatch);
    }

    let pkcs8 = PrivateKey::try_from(key.private_key_to_pkcs8()?)?;
    Ok(cert.with_private_key(pkcs8))
}

/// Decodes a combined container: PEM (certificate only), a DER certificate, or a PKCS#12
/// container whose key, if any, is bound to the returned certificate.
///
/// A missing password decrypts PKCS#12 with the empty password.
pub(crate) fn decode_container(
    bytes: &[u8],
    password: Option<&str>,
) -> Result<Certificate, ContainerError> {
    if is_pem(bytes) {
        let blocks = pem_blocks(bytes)?;
        return first_pem_certificate(&blocks);
    }

    if let Ok(cert) = Certificate::try_from(bytes) {
        return Ok(cert);
    }

    decode_pkcs12(bytes, password.unwrap_or_default())
}

/// Decodes a file expected to hold exactly one bare certificate: a single PEM `CERTIFICATE`
/// block with no key, or a single DER certificate.
pub(crate) fn decode_bare_certificate(bytes: &[u8]) -> Result<Certificate, ContainerError> {
    if !is_pem(bytes) {
        return Ok(Certificate::try_from(bytes)?);
    }

    let blocks = pem_blocks(bytes)?;
    if blocks.iter().any(|b| is_key_label(&b.label)) {
        return Err(ContainerError::EmbeddedKey);
    }

    let mut certs = blocks.iter().filter(|b| b.label == PEM_CERTIFICATE_LABEL);
    match (certs.next(), certs.count()) {
        (None, _) => Err(ContainerError::NoCertificate),
        (Some(block), 0) => Ok(Certificate::try_from(block.contents.as_slice())?),
        (Some(_), rest) => Err(ContainerError::MultipleCertificates(rest + 1)),
    }
}

/// Decodes a trust-store entry. PEM entries may carry an unencrypted private key next to the
/// certificate; PKCS#12 entries are opened with the empty password.
pub(crate) fn decode_store_entry(bytes: &[u8]) -> Result<Certificate, ContainerError> {
    if !is_pem(bytes) {
        return decode_container(bytes, None);
    }

    let blocks = pem_blocks(bytes)?;
    let cert = first_pem_certificate(&blocks)?;

    let has_plain_key = blocks
        .iter()
        .any(|b| is_key_label(&b.label) && b.label != PEM_ENCRYPTED_KEY_LABEL);
    if !has_plain_key {
        return Ok(cert);
    }

    let pkey = PKey::private_key_from_pem_callback(bytes, no_password)
        .map_err(PrivateKeyError::Backend)?;
    Ok(attach_private_key(cert, &pkey)?)
}

fn decode_pkcs12(bytes: &[u8], password: &str) -> Result<Certificate, ContainerError> {
    let parsed = Pkcs12::from_der(bytes)
        .and_then(|pkcs12| pkcs12.parse2(password))
        .map_err(ContainerError::Pkcs12)?;

    let x509 = parsed.cert.ok_or(ContainerError::NoCertificate)?;
    let der = x509.to_der().map_err(ContainerError::Pkcs12)?;
    let cert = Certificate::try_from(der)?;

    match parsed.pkey {
        Some(pkey) => Ok(attach_private_key(cert, &pkey)?),
        None => Ok(cert),
    }
}

fn is_pem(bytes: &[u8]) -> bool {
    bytes
        .windows(PEM_BEGIN_MARKER.len())
        .any(|w| w == PEM_BEGIN_MARKER)
}

fn is_key_label(label: &str) -> bool {
    label.ends_with("PRIVATE KEY")
}

fn pem_blocks(bytes: &[u8]) -> Result<Vec<Pem>, ContainerError> {
    Pem::iter_from_buffer(bytes)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ContainerError::Pem)
}

fn first_pem_certificate(blocks: &[Pem]) -> Result<Certificate, ContainerError> {
    let block = blocks
        .iter()
        .find(|b| b.label == PEM_CERTIFICATE_LABEL)
        .ok_or(ContainerError::NoCertificate)?;
    Ok(Certificate::try_from(block.contents.as_slice())?)
}
