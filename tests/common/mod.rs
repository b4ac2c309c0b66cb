//! Certificate fixtures generated at test time.

#![allow(dead_code)]

use cert_locator::{Certificate, PrivateKey};
use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::dsa::Dsa;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::symm::Cipher;
use openssl::x509::extension::ExtendedKeyUsage;
use openssl::x509::{X509Builder, X509NameBuilder, X509};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const SERVER_AUTH: &str = "1.3.6.1.5.5.7.3.1";
pub const CLIENT_AUTH: &str = "1.3.6.1.5.5.7.3.2";

const DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy)]
pub enum KeyKind {
    Rsa,
    Ec,
    Dsa,
    Ed25519,
}

pub fn generate_key(kind: KeyKind) -> PKey<Private> {
    match kind {
        KeyKind::Rsa => PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap(),
        KeyKind::Ec => {
            let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
            PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
        }
        KeyKind::Dsa => PKey::from_dsa(Dsa::generate(2048).unwrap()).unwrap(),
        KeyKind::Ed25519 => PKey::generate_ed25519().unwrap(),
    }
}

/// A self-signed certificate and its key.
pub struct Identity {
    pub x509: X509,
    pub key: PKey<Private>,
}

impl Identity {
    pub fn der(&self) -> Vec<u8> {
        self.x509.to_der().unwrap()
    }

    pub fn thumbprint(&self) -> String {
        hex::encode_upper(openssl::sha::sha1(&self.der()))
    }

    /// The certificate without its key.
    pub fn certificate(&self) -> Certificate {
        Certificate::try_from(self.der()).unwrap()
    }

    /// The certificate bound to its key.
    pub fn certificate_with_key(&self) -> Certificate {
        let pkcs8 = PrivateKey::try_from(self.key.private_key_to_pkcs8().unwrap()).unwrap();
        self.certificate().with_private_key(pkcs8)
    }

    pub fn cert_pem(&self) -> Vec<u8> {
        self.x509.to_pem().unwrap()
    }

    pub fn key_pem(&self) -> Vec<u8> {
        self.key.private_key_to_pem_pkcs8().unwrap()
    }

    pub fn encrypted_key_pem(&self, password: &str) -> Vec<u8> {
        self.key
            .private_key_to_pem_pkcs8_passphrase(Cipher::aes_256_cbc(), password.as_bytes())
            .unwrap()
    }

    pub fn pkcs12(&self, password: &str) -> Vec<u8> {
        Pkcs12::builder()
            .name("test")
            .pkey(&self.key)
            .cert(&self.x509)
            .build2(password)
            .unwrap()
            .to_der()
            .unwrap()
    }

    /// Checks that `cert` carries this identity's private key.
    pub fn owns_key_of(&self, cert: &Certificate) -> bool {
        let Some(key) = cert.private_key() else {
            return false;
        };
        let imported = PKey::private_key_from_pkcs8(key.as_bytes()).unwrap();
        imported.public_eq(&self.key)
    }
}

/// Builder for self-signed test certificates.
pub struct IdentityBuilder {
    common_name: String,
    organization: String,
    key: KeyKind,
    eku: Option<Vec<&'static str>>,
    not_before_days: i64,
    not_after_days: i64,
}

pub fn identity(common_name: &str) -> IdentityBuilder {
    IdentityBuilder {
        common_name: common_name.to_string(),
        organization: "cert-locator tests".to_string(),
        key: KeyKind::Ec,
        eku: None,
        not_before_days: -1,
        not_after_days: 365,
    }
}

impl IdentityBuilder {
    pub fn key(mut self, key: KeyKind) -> Self {
        self.key = key;
        self
    }

    pub fn organization(mut self, organization: &str) -> Self {
        self.organization = organization.to_string();
        self
    }

    pub fn eku(mut self, oids: &[&'static str]) -> Self {
        self.eku = Some(oids.to_vec());
        self
    }

    /// Validity period relative to now, in days.
    pub fn valid_days(mut self, not_before: i64, not_after: i64) -> Self {
        self.not_before_days = not_before;
        self.not_after_days = not_after;
        self
    }

    pub fn expired(self) -> Self {
        self.valid_days(-30, -1)
    }

    pub fn build(self) -> Identity {
        let key = generate_key(self.key);

        // Encoded least-specific first, as CAs issue them.
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_nid(Nid::ORGANIZATIONNAME, &self.organization)
            .unwrap();
        name.append_entry_by_nid(Nid::COMMONNAME, &self.common_name)
            .unwrap();
        let name = name.build();

        let mut serial = BigNum::new().unwrap();
        serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;

        let mut builder = X509Builder::new().unwrap();
        builder.set_version(2).unwrap();
        builder
            .set_serial_number(&serial.to_asn1_integer().unwrap())
            .unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&key).unwrap();
        builder
            .set_not_before(&Asn1Time::from_unix(now + self.not_before_days * DAY).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::from_unix(now + self.not_after_days * DAY).unwrap())
            .unwrap();

        if let Some(oids) = &self.eku {
            let mut eku = ExtendedKeyUsage::new();
            for oid in oids {
                match *oid {
                    SERVER_AUTH => eku.server_auth(),
                    CLIENT_AUTH => eku.client_auth(),
                    other => eku.other(other),
                };
            }
            builder.append_extension(eku.build().unwrap()).unwrap();
        }

        let digest = match self.key {
            KeyKind::Ed25519 => MessageDigest::null(),
            _ => MessageDigest::sha256(),
        };
        builder.sign(&key, digest).unwrap();

        Identity {
            x509: builder.build(),
            key,
        }
    }
}

pub fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}
