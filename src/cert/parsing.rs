//! Internal X.509 parsing helpers.

use crate::cert::error::CertificateError;
use time::OffsetDateTime;
use x509_parser::certificate::X509Certificate;
use x509_parser::der_parser::oid::Oid;
use x509_parser::error::X509Error;
use x509_parser::extensions::{ExtendedKeyUsage, ParsedExtension};
use x509_parser::nom::Err;
use x509_parser::oid_registry;
use x509_parser::x509::X509Name;

const OID_EKU_ANY: &str = "2.5.29.37.0";
const OID_EKU_SERVER_AUTH: &str = "1.3.6.1.5.5.7.3.1";
const OID_EKU_CLIENT_AUTH: &str = "1.3.6.1.5.5.7.3.2";
const OID_EKU_CODE_SIGNING: &str = "1.3.6.1.5.5.7.3.3";
const OID_EKU_EMAIL_PROTECTION: &str = "1.3.6.1.5.5.7.3.4";
const OID_EKU_TIME_STAMPING: &str = "1.3.6.1.5.5.7.3.8";
const OID_EKU_OCSP_SIGNING: &str = "1.3.6.1.5.5.7.3.9";

/// Metadata read once from a DER certificate.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct CertificateInfo {
    pub subject: String,
    pub simple_name: String,
    pub thumbprint: String,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
    pub extended_key_usage: Option<Vec<String>>,
    pub public_key_algorithm: String,
}

/// Parses the given DER-encoded bytes as an X.509 certificate.
///
/// Returns a [`CertificateError`] if the input is not a parseable DER-encoded X.509 certificate.
pub(crate) fn parse_der_encoded_bytes_as_x509_certificate(
    der_bytes: &[u8],
) -> Result<X509Certificate<'_>, CertificateError> {
    match x509_parser::parse_x509_certificate(der_bytes) {
        Ok((rest, _)) if !rest.is_empty() => Err(CertificateError::TrailingData(rest.len())),
        Ok((_, cert)) => Ok(cert),
        Err(Err::Incomplete(_)) => Err(CertificateError::ParseX509Certificate(
            X509Error::InvalidCertificate,
        )),
        Err(Err::Error(e) | Err::Failure(e)) => Err(CertificateError::ParseX509Certificate(e)),
    }
}

/// Reads the metadata of a DER-encoded certificate.
pub(crate) fn read_certificate_info(der_bytes: &[u8]) -> Result<CertificateInfo, CertificateError> {
    let x509 = parse_der_encoded_bytes_as_x509_certificate(der_bytes)?;
    let validity = x509.validity();

    Ok(CertificateInfo {
        subject: display_name(x509.subject()),
        simple_name: simple_name(x509.subject()),
        thumbprint: hex::encode_upper(openssl::sha::sha1(der_bytes)),
        not_before: validity.not_before.to_datetime(),
        not_after: validity.not_after.to_datetime(),
        extended_key_usage: extended_key_usage_oids(&x509)?,
        public_key_algorithm: x509.public_key().algorithm.algorithm.to_id_string(),
    })
}

/// Returns the parsed X.509 extension for the provided OID, or `None` when absent.
fn get_x509_extension<'a>(
    cert: &'a X509Certificate<'_>,
    oid: &Oid<'static>,
) -> Result<Option<&'a ParsedExtension<'a>>, CertificateError> {
    Ok(cert
        .tbs_certificate
        .get_extension_unique(oid)?
        .map(|ext| ext.parsed_extension()))
}

/// Lists the OIDs of the extended key usage extension.
///
/// `None` means the extension is absent. An extension that is present but cannot be
/// decoded yields an empty list so it never matches a required usage.
fn extended_key_usage_oids(
    cert: &X509Certificate<'_>,
) -> Result<Option<Vec<String>>, CertificateError> {
    let ext = get_x509_extension(cert, &oid_registry::OID_X509_EXT_EXTENDED_KEY_USAGE)?;
    Ok(ext.map(|ext| match ext {
        ParsedExtension::ExtendedKeyUsage(eku) => eku_to_oids(eku),
        _ => Vec::new(),
    }))
}

fn eku_to_oids(eku: &ExtendedKeyUsage<'_>) -> Vec<String> {
    let known = [
        (eku.any, OID_EKU_ANY),
        (eku.server_auth, OID_EKU_SERVER_AUTH),
        (eku.client_auth, OID_EKU_CLIENT_AUTH),
        (eku.code_signing, OID_EKU_CODE_SIGNING),
        (eku.email_protection, OID_EKU_EMAIL_PROTECTION),
        (eku.time_stamping, OID_EKU_TIME_STAMPING),
        (eku.ocsp_signing, OID_EKU_OCSP_SIGNING),
    ];

    known
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, oid)| (*oid).to_string())
        .chain(eku.other.iter().map(Oid::to_id_string))
        .collect()
}

/// Formats a distinguished name most-specific RDN first (`CN=host, O=Org, C=US`), the reverse
/// of its DER encoding order.
fn display_name(name: &X509Name<'_>) -> String {
    let mut rdns = name.iter().cloned().collect::<Vec<_>>();
    rdns.reverse();
    X509Name::new(rdns, name.as_raw()).to_string()
}

/// The most descriptive single attribute of a distinguished name: the common name, then the
/// organizational unit, the organization and the e-mail address. Falls back to the full name.
fn simple_name(name: &X509Name<'_>) -> String {
    name.iter_common_name()
        .chain(name.iter_organizational_unit())
        .chain(name.iter_organization())
        .chain(name.iter_email())
        .find_map(|attr| attr.as_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| display_name(name))
}
