mod common;

use cert_locator::cert::error::{ContainerError, PrivateKeyError};
use cert_locator::{
    CertificateLoader, CertificateLocation, FileLocation, KeyUsage, LoadError, Password,
};
use common::{identity, write, KeyKind, CLIENT_AUTH, SERVER_AUTH};
use openssl::symm::Cipher;
use std::path::Path;

fn loader(root: &Path) -> CertificateLoader {
    CertificateLoader::builder().root_dir(root).build()
}

fn load(
    root: &Path,
    location: FileLocation,
    usage: Option<&KeyUsage>,
) -> Result<Option<cert_locator::Certificate>, LoadError> {
    loader(root).load_location(Some(&CertificateLocation::File(location)), usage)
}

#[test]
fn test_pkcs12_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let id = identity("pfx.example.org").key(KeyKind::Rsa).build();
    write(dir.path(), "server.pfx", id.pkcs12("s3cret"));

    let location = FileLocation::new("server.pfx")
        .unwrap()
        .with_password(Password::new("s3cret"));
    let cert = load(dir.path(), location, None).unwrap().unwrap();

    assert_eq!(cert.simple_name(), "pfx.example.org");
    assert_eq!(cert.thumbprint(), id.thumbprint());
    assert!(cert.has_private_key());
    assert!(id.owns_key_of(&cert));
}

#[test]
fn test_pkcs12_wrong_password() {
    let dir = tempfile::tempdir().unwrap();
    let id = identity("pfx.example.org").build();
    let path = write(dir.path(), "server.pfx", id.pkcs12("s3cret"));

    let location = FileLocation::new("server.pfx")
        .unwrap()
        .with_password(Password::new("wrong"));
    let err = load(dir.path(), location, None).unwrap_err();

    assert!(matches!(
        err,
        LoadError::InvalidContainer { path: ref p, source: ContainerError::Pkcs12(_) } if p == &path
    ));
}

#[test]
fn test_pkcs12_without_password() {
    let dir = tempfile::tempdir().unwrap();
    let id = identity("nopass.example.org").build();
    write(dir.path(), "server.p12", id.pkcs12(""));

    let location = FileLocation::new("server.p12").unwrap();
    let cert = load(dir.path(), location, None).unwrap().unwrap();

    assert!(id.owns_key_of(&cert));
}

#[test]
fn test_pem_container_loads_certificate_only() {
    let dir = tempfile::tempdir().unwrap();
    let id = identity("pem.example.org").build();
    let mut pem = id.cert_pem();
    pem.extend_from_slice(&id.key_pem());
    write(dir.path(), "combined.pem", pem);
    write(dir.path(), "cert.pem", id.cert_pem());

    for file in ["combined.pem", "cert.pem"] {
        let location = FileLocation::new(file).unwrap();
        let cert = load(dir.path(), location, None).unwrap().unwrap();
        assert_eq!(cert.thumbprint(), id.thumbprint());
        assert!(!cert.has_private_key());
    }
}

#[test]
fn test_der_certificate() {
    let dir = tempfile::tempdir().unwrap();
    let id = identity("der.example.org").build();
    write(dir.path(), "server.cer", id.der());

    let location = FileLocation::new("server.cer").unwrap();
    let cert = load(dir.path(), location, None).unwrap().unwrap();

    assert_eq!(cert.as_bytes(), id.der().as_slice());
    assert!(!cert.has_private_key());
}

#[test]
fn test_absolute_path_ignores_root_dir() {
    let dir = tempfile::tempdir().unwrap();
    let other = tempfile::tempdir().unwrap();
    let id = identity("abs.example.org").build();
    let path = write(dir.path(), "server.pem", id.cert_pem());

    let location = FileLocation::new(&path).unwrap();
    let cert = load(other.path(), location, None).unwrap().unwrap();

    assert_eq!(cert.thumbprint(), id.thumbprint());
}

#[test]
fn test_relative_path_resolves_against_root_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("certs")).unwrap();
    let id = identity("rel.example.org").build();
    write(&dir.path().join("certs"), "server.pem", id.cert_pem());

    let location = FileLocation::new("certs/server.pem").unwrap();
    assert!(load(dir.path(), location.clone(), None).unwrap().is_some());

    let elsewhere = tempfile::tempdir().unwrap();
    let err = load(elsewhere.path(), location, None).unwrap_err();
    assert!(matches!(err, LoadError::ReadFile { .. }));
}

#[test]
fn test_garbage_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "server.pfx", "this is not a certificate");

    let location = FileLocation::new("server.pfx").unwrap();
    let err = load(dir.path(), location, None).unwrap_err();

    assert!(matches!(err, LoadError::InvalidContainer { .. }));
}

macro_rules! split_key_tests {
    ($($name:ident: $value:expr,)*) => {
    $(
        #[test]
        fn $name() {
            let (kind, password): (KeyKind, Option<&str>) = $value;
            let dir = tempfile::tempdir().unwrap();
            let id = identity("split.example.org").key(kind).build();
            write(dir.path(), "server.crt", id.cert_pem());

            let mut location = FileLocation::new("server.crt")
                .unwrap()
                .with_key_path("server.key");
            match password {
                Some(password) => {
                    write(dir.path(), "server.key", id.encrypted_key_pem(password));
                    location = location.with_password(Password::new(password));
                }
                None => {
                    write(dir.path(), "server.key", id.key_pem());
                }
            }

            let cert = load(dir.path(), location, None).unwrap().unwrap();
            assert_eq!(cert.thumbprint(), id.thumbprint());
            assert!(id.owns_key_of(&cert));
        }
    )*
    }
}

split_key_tests! {
    split_rsa_encrypted: (KeyKind::Rsa, Some("pa55")),
    split_rsa_plain: (KeyKind::Rsa, None),
    split_ecdsa_encrypted: (KeyKind::Ec, Some("pa55")),
    split_ecdsa_plain: (KeyKind::Ec, None),
    split_dsa_encrypted: (KeyKind::Dsa, Some("pa55")),
    split_dsa_plain: (KeyKind::Dsa, None),
}

#[test]
fn test_split_traditional_rsa_key() {
    let dir = tempfile::tempdir().unwrap();
    let id = identity("rsa.example.org").key(KeyKind::Rsa).build();
    write(dir.path(), "server.crt", id.cert_pem());
    let rsa = id.key.rsa().unwrap();
    write(
        dir.path(),
        "server.key",
        rsa.private_key_to_pem_passphrase(Cipher::aes_128_cbc(), b"pa55")
            .unwrap(),
    );

    let location = FileLocation::new("server.crt")
        .unwrap()
        .with_key_path("server.key")
        .with_password(Password::new("pa55"));
    let cert = load(dir.path(), location, None).unwrap().unwrap();

    assert!(id.owns_key_of(&cert));
}

#[test]
fn test_split_der_certificate() {
    let dir = tempfile::tempdir().unwrap();
    let id = identity("der.example.org").build();
    write(dir.path(), "server.der", id.der());
    write(dir.path(), "server.key", id.key_pem());

    let location = FileLocation::new("server.der")
        .unwrap()
        .with_key_path("server.key");
    let cert = load(dir.path(), location, None).unwrap().unwrap();

    assert!(id.owns_key_of(&cert));
}

#[test]
fn test_split_wrong_password() {
    let dir = tempfile::tempdir().unwrap();
    let id = identity("split.example.org").build();
    write(dir.path(), "server.crt", id.cert_pem());
    let key_path = write(dir.path(), "server.key", id.encrypted_key_pem("right"));

    let location = FileLocation::new("server.crt")
        .unwrap()
        .with_key_path("server.key")
        .with_password(Password::new("wrong"));
    let err = load(dir.path(), location, None).unwrap_err();

    assert!(matches!(
        err,
        LoadError::KeyImport { path: ref p, source: PrivateKeyError::Import { algorithm: "ECDSA", .. } } if p == &key_path
    ));
}

#[test]
fn test_split_encrypted_key_without_password() {
    let dir = tempfile::tempdir().unwrap();
    let id = identity("split.example.org").build();
    write(dir.path(), "server.crt", id.cert_pem());
    write(dir.path(), "server.key", id.encrypted_key_pem("right"));

    let location = FileLocation::new("server.crt")
        .unwrap()
        .with_key_path("server.key");
    let err = load(dir.path(), location, None).unwrap_err();

    assert!(matches!(
        err,
        LoadError::KeyImport {
            source: PrivateKeyError::Import { .. },
            ..
        }
    ));
}

#[test]
fn test_split_mismatched_key() {
    let dir = tempfile::tempdir().unwrap();
    let id = identity("split.example.org").build();
    let other = identity("other.example.org").build();
    write(dir.path(), "server.crt", id.cert_pem());
    write(dir.path(), "server.key", other.key_pem());

    let location = FileLocation::new("server.crt")
        .unwrap()
        .with_key_path("server.key");
    let err = load(dir.path(), location, None).unwrap_err();

    assert!(matches!(
        err,
        LoadError::KeyImport {
            source: PrivateKeyError::Mismatch,
            ..
        }
    ));
}

#[test]
fn test_split_key_of_other_algorithm() {
    let dir = tempfile::tempdir().unwrap();
    let id = identity("split.example.org").key(KeyKind::Ec).build();
    let rsa = identity("rsa.example.org").key(KeyKind::Rsa).build();
    write(dir.path(), "server.crt", id.cert_pem());
    write(dir.path(), "server.key", rsa.key_pem());

    let location = FileLocation::new("server.crt")
        .unwrap()
        .with_key_path("server.key");
    let err = load(dir.path(), location, None).unwrap_err();

    assert!(matches!(err, LoadError::KeyImport { .. }));
}

#[test]
fn test_split_unsupported_algorithm() {
    let dir = tempfile::tempdir().unwrap();
    let id = identity("ed.example.org").key(KeyKind::Ed25519).build();
    write(dir.path(), "server.crt", id.cert_pem());
    write(dir.path(), "server.key", id.key_pem());

    let location = FileLocation::new("server.crt")
        .unwrap()
        .with_key_path("server.key");
    let err = load(dir.path(), location, None).unwrap_err();

    assert!(matches!(
        err,
        LoadError::UnsupportedKeyAlgorithm { ref oid, .. } if oid == "1.3.101.112"
    ));
}

#[test]
fn test_split_requires_single_bare_certificate() {
    let dir = tempfile::tempdir().unwrap();
    let id = identity("split.example.org").build();
    let other = identity("other.example.org").build();
    write(dir.path(), "server.key", id.key_pem());

    let mut two = id.cert_pem();
    two.extend_from_slice(&other.cert_pem());
    let two_path = write(dir.path(), "two.crt", two);

    let mut with_key = id.cert_pem();
    with_key.extend_from_slice(&id.key_pem());
    write(dir.path(), "with-key.pem", with_key);

    write(dir.path(), "server.pfx", id.pkcs12(""));

    let location = FileLocation::new("two.crt")
        .unwrap()
        .with_key_path("server.key");
    let err = load(dir.path(), location, None).unwrap_err();
    assert!(matches!(
        err,
        LoadError::ExpectedSingleCertificate { path: ref p, source: ContainerError::MultipleCertificates(2) } if p == &two_path
    ));

    let location = FileLocation::new("with-key.pem")
        .unwrap()
        .with_key_path("server.key");
    let err = load(dir.path(), location, None).unwrap_err();
    assert!(matches!(
        err,
        LoadError::ExpectedSingleCertificate {
            source: ContainerError::EmbeddedKey,
            ..
        }
    ));

    let location = FileLocation::new("server.pfx")
        .unwrap()
        .with_key_path("server.key");
    let err = load(dir.path(), location, None).unwrap_err();
    assert!(matches!(err, LoadError::ExpectedSingleCertificate { .. }));
}

#[test]
fn test_split_missing_key_file() {
    let dir = tempfile::tempdir().unwrap();
    let id = identity("split.example.org").build();
    write(dir.path(), "server.crt", id.cert_pem());

    let location = FileLocation::new("server.crt")
        .unwrap()
        .with_key_path("missing.key");
    let err = load(dir.path(), location, None).unwrap_err();

    assert!(matches!(
        err,
        LoadError::ReadFile { ref path, .. } if path == &dir.path().join("missing.key")
    ));
}

#[test]
fn test_usage_filters_file_certificate() {
    let dir = tempfile::tempdir().unwrap();
    let client = identity("client.example.org").eku(&[CLIENT_AUTH]).build();
    let server = identity("server.example.org").eku(&[SERVER_AUTH]).build();
    let any = identity("any.example.org").build();
    write(dir.path(), "client.pem", client.cert_pem());
    write(dir.path(), "server.pem", server.cert_pem());
    write(dir.path(), "any.pem", any.cert_pem());

    let server_auth = KeyUsage::ServerAuthentication;
    let client_auth = KeyUsage::ClientAuthentication;
    let location = |file: &str| FileLocation::new(file).unwrap();

    assert!(load(dir.path(), location("client.pem"), Some(&server_auth))
        .unwrap()
        .is_none());
    assert!(load(dir.path(), location("client.pem"), Some(&client_auth))
        .unwrap()
        .is_some());
    assert!(load(dir.path(), location("server.pem"), Some(&server_auth))
        .unwrap()
        .is_some());
    assert!(load(dir.path(), location("any.pem"), Some(&server_auth))
        .unwrap()
        .is_some());
    assert!(load(dir.path(), location("client.pem"), None)
        .unwrap()
        .is_some());
}
