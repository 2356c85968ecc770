use std::fmt;
use std::net::IpAddr;

use tracing::debug;
use url::Url;

use crate::cert::extensions::SubjectAltName;
use crate::error::{IssuanceError, Result};

/// The type tag of an alternate name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlternateNameKind {
    Dns,
    Email,
    Ip,
    Uri,
    /// Any tag other than `dns`, `email`, `ip` or `uri`. Entries of this kind
    /// are dropped at issuance.
    Unrecognized(String),
}

impl AlternateNameKind {
    pub fn as_str(&self) -> &str {
        match self {
            AlternateNameKind::Dns => "dns",
            AlternateNameKind::Email => "email",
            AlternateNameKind::Ip => "ip",
            AlternateNameKind::Uri => "uri",
            AlternateNameKind::Unrecognized(tag) => tag,
        }
    }
}

impl From<&str> for AlternateNameKind {
    fn from(tag: &str) -> Self {
        match tag {
            "dns" => AlternateNameKind::Dns,
            "email" => AlternateNameKind::Email,
            "ip" => AlternateNameKind::Ip,
            "uri" => AlternateNameKind::Uri,
            other => AlternateNameKind::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for AlternateNameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One requested subject alternative name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlternateName {
    pub kind: AlternateNameKind,
    pub value: String,
}

impl AlternateName {
    /// Creates an alternate name from a string type tag such as `"dns"`.
    pub fn new(kind: &str, value: impl Into<String>) -> Self {
        Self {
            kind: AlternateNameKind::from(kind),
            value: value.into(),
        }
    }

    pub fn dns(value: impl Into<String>) -> Self {
        Self::new("dns", value)
    }

    pub fn email(value: impl Into<String>) -> Self {
        Self::new("email", value)
    }

    pub fn ip(value: impl Into<String>) -> Self {
        Self::new("ip", value)
    }

    pub fn uri(value: impl Into<String>) -> Self {
        Self::new("uri", value)
    }
}

/// Sorts requested alternate names into the typed lists of the SAN
/// extension.
///
/// An `ip` value that is not an IPv4/IPv6 literal, or a `uri` value that does
/// not parse, fails the whole call. Entries with an unrecognized type are
/// skipped.
///
/// URIs must be absolute: a relative reference such as `foo/bar` is rejected,
/// as RFC 5280 requires for the SAN. Accepted URIs are stored as given, so
/// DNS names, email addresses and URIs must all be ASCII to fit an
/// IA5String; anything else is an `InvalidAlternateName`.
pub fn encode_alternate_names(names: &[AlternateName]) -> Result<SubjectAltName> {
    let mut san = SubjectAltName::default();
    for name in names {
        match &name.kind {
            AlternateNameKind::Dns => san.dns_names.push(name.value.clone()),
            AlternateNameKind::Email => san.email_addresses.push(name.value.clone()),
            AlternateNameKind::Ip => {
                let ip: IpAddr = name.value.parse().map_err(|_| {
                    IssuanceError::InvalidAlternateName(format!(
                        "invalid ip address {}",
                        name.value
                    ))
                })?;
                san.ip_addresses.push(ip);
            }
            AlternateNameKind::Uri => {
                Url::parse(&name.value).map_err(|e| {
                    IssuanceError::InvalidAlternateName(format!("invalid uri {}: {e}", name.value))
                })?;
                san.uris.push(name.value.clone());
            }
            AlternateNameKind::Unrecognized(tag) => {
                debug!(kind = %tag, value = %name.value, "skipping alternate name of unrecognized type");
            }
        }
    }

    for text in san
        .dns_names
        .iter()
        .chain(&san.email_addresses)
        .chain(&san.uris)
    {
        if !text.is_ascii() {
            return Err(IssuanceError::InvalidAlternateName(format!(
                "{text} is not representable as an IA5String"
            )));
        }
    }

    Ok(san)
}
