//! Extended key usage requirements.

use crate::cert::Certificate;
use crate::constants::{CLIENT_AUTHENTICATION_OID, SERVER_AUTHENTICATION_OID};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

const SERVER_AUTHENTICATION_NAME: &str = "server-authentication";
const CLIENT_AUTHENTICATION_NAME: &str = "client-authentication";

/// A purpose a certificate must be usable for, identified by its extended key usage OID.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum KeyUsage {
    /// TLS server authentication (`1.3.6.1.5.5.7.3.1`).
    ServerAuthentication,
    /// TLS client authentication (`1.3.6.1.5.5.7.3.2`).
    ClientAuthentication,
    /// Any other usage, by dotted OID.
    Other(String),
}

impl KeyUsage {
    /// Returns the dotted OID of the usage.
    pub fn oid(&self) -> &str {
        match self {
            KeyUsage::ServerAuthentication => SERVER_AUTHENTICATION_OID,
            KeyUsage::ClientAuthentication => CLIENT_AUTHENTICATION_OID,
            KeyUsage::Other(oid) => oid,
        }
    }

    /// Returns the human-readable name of the usage; unnamed usages are named by their OID.
    pub fn name(&self) -> &str {
        match self {
            KeyUsage::ServerAuthentication => SERVER_AUTHENTICATION_NAME,
            KeyUsage::ClientAuthentication => CLIENT_AUTHENTICATION_NAME,
            KeyUsage::Other(oid) => oid,
        }
    }
}

impl fmt::Display for KeyUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyUsage {
    type Err = Infallible;

    /// Accepts a usage name or a dotted OID. Well-known OIDs map to their named variant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            SERVER_AUTHENTICATION_NAME | SERVER_AUTHENTICATION_OID => {
                KeyUsage::ServerAuthentication
            }
            CLIENT_AUTHENTICATION_NAME | CLIENT_AUTHENTICATION_OID => {
                KeyUsage::ClientAuthentication
            }
            other => KeyUsage::Other(other.to_string()),
        })
    }
}

/// Name of an optional usage, for diagnostics.
pub(crate) fn usage_name(usage: Option<&KeyUsage>) -> &str {
    usage.map_or("any", KeyUsage::name)
}

/// Checks whether `cert` may be used for `usage`.
///
/// Always `true` when no usage is required. Otherwise `true` if the certificate has no
/// extended key usage extension (unrestricted) or if the extension lists the usage OID.
pub fn matches_key_usage(cert: &Certificate, usage: Option<&KeyUsage>) -> bool {
    let Some(usage) = usage else {
        return true;
    };

    match cert.extended_key_usage() {
        None => true,
        Some(oids) => oids.iter().any(|oid| oid == usage.oid()),
    }
}
