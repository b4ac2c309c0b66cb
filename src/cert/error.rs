//! Error types for certificate, private key and container decoding.

use openssl::error::ErrorStack;
use x509_parser::error::X509Error;

/// An error that may arise parsing an X.509 certificate.
#[derive(Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum CertificateError {
    /// Error returned by the X.509 parsing library.
    #[error("failed parsing X.509 certificate")]
    ParseX509Certificate(#[from] X509Error),

    /// Bytes were left over after the DER-encoded certificate.
    #[error("unexpected {0} trailing byte(s) after DER certificate")]
    TrailingData(usize),
}

/// An error that may arise importing or decoding private keys.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PrivateKeyError {
    /// Error returned by the pkcs#8 private key decoding library.
    #[error("failed decoding PKCS#8 private key")]
    DecodePkcs8(pkcs8::Error),

    /// The PEM text could not be imported, e.g. it is malformed or the password is wrong.
    #[error("failed importing {algorithm} private key: {source}")]
    Import {
        /// Name of the importer that was used.
        algorithm: &'static str,
        /// Error reported by the cryptographic backend.
        #[source]
        source: ErrorStack,
    },

    /// The private key does not belong to the certificate's public key.
    #[error("private key does not match the certificate public key")]
    Mismatch,

    /// Error reported by the cryptographic backend while handling the key.
    #[error("cryptographic backend error: {0}")]
    Backend(#[from] ErrorStack),
}

/// An error that may arise decoding a certificate container (PEM, DER or PKCS#12).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ContainerError {
    /// A PEM block could not be decoded.
    #[error("malformed PEM data")]
    Pem,

    /// The PKCS#12 container could not be decoded or decrypted.
    #[error("failed decoding PKCS#12 container: {0}")]
    Pkcs12(#[source] ErrorStack),

    /// The container holds no certificate.
    #[error("no certificate found")]
    NoCertificate,

    /// The container holds more than one certificate where exactly one is expected.
    #[error("expected a single certificate, found {0}")]
    MultipleCertificates(usize),

    /// The container embeds a private key where a bare certificate is expected.
    #[error("unexpected private key in certificate file")]
    EmbeddedKey,

    /// A certificate inside the container is invalid.
    #[error(transparent)]
    Certificate(#[from] CertificateError),

    /// A private key inside the container is invalid.
    #[error(transparent)]
    PrivateKey(#[from] PrivateKeyError),
}
