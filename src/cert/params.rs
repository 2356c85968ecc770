use bon::Builder;
use const_oid::ObjectIdentifier;
use time::Duration;
use time::{OffsetDateTime, UtcOffset};

use super::extensions::ToAndFromX509Extension;
use crate::cert::alt_name::AlternateName;
use crate::cert::name::Name;
use crate::cert::usage::KeyUsage;
use crate::error::{IssuanceError, Result};

/// A declarative request for one certificate.
///
/// # Fields
/// * `subject` - The identity the certificate is issued to.
/// * `validity` - The period during which the certificate is valid.
/// * `alternate_names` - Subject alternative names, in request order.
/// * `usage` - Basic and extended key usages.
/// * `is_certificate_authority` - Whether an issuer-signed certificate may
///   sign others. Self-signed certificates are always authorities.
/// * `status_providers` - CRL and OCSP locations to advertise.
#[derive(Clone, Debug, Builder)]
pub struct CertificateRequest {
    pub subject: Name,
    pub validity: DateRange,
    #[builder(default)]
    pub alternate_names: Vec<AlternateName>,
    #[builder(default)]
    pub usage: KeyUsage,
    #[builder(default)]
    pub is_certificate_authority: bool,
    #[builder(default)]
    pub status_providers: StatusProviders,
}

/// Where relying parties can check certificate status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Builder)]
pub struct StatusProviders {
    pub crl: Option<String>,
    pub ocsp: Option<String>,
}

/// Certificate validity period.
///
/// This struct represents the `notBefore` and `notAfter` fields in a certificate.
/// Certificates store whole seconds, so sub-second precision is lost on issuance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl DateRange {
    pub fn new(not_before: OffsetDateTime, not_after: OffsetDateTime) -> Self {
        Self {
            not_before,
            not_after,
        }
    }

    /// Creates a validity period starting now for the given number of days.
    pub fn for_days(days: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            not_before: now,
            not_after: now + Duration::days(days),
        }
    }

    /// True when the current time lies strictly inside the range.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(OffsetDateTime::now_utc())
    }

    pub fn is_valid_at(&self, at: OffsetDateTime) -> bool {
        self.not_before < at && at < self.not_after
    }

    /// Checks that the range is non-empty once truncated to the whole
    /// seconds a certificate stores, and that both ends fall in the years
    /// 1970 through 9999 that the DER time types can encode.
    pub(crate) fn ensure_ordered(&self) -> Result<()> {
        for at in [self.not_before, self.not_after] {
            if !ENCODABLE_YEARS.contains(&at.to_offset(UtcOffset::UTC).year()) {
                return Err(IssuanceError::InvalidValidity(format!(
                    "{at} is outside the encodable years {}..={}",
                    ENCODABLE_YEARS.start(),
                    ENCODABLE_YEARS.end()
                )));
            }
        }

        if self.not_before.unix_timestamp() < self.not_after.unix_timestamp() {
            Ok(())
        } else {
            Err(IssuanceError::InvalidValidity(format!(
                "not before {} is not earlier than not after {} at one-second precision",
                self.not_before, self.not_after
            )))
        }
    }
}

// der::DateTime counts from the Unix epoch and stops at four-digit years.
const ENCODABLE_YEARS: std::ops::RangeInclusive<i32> = 1970..=9999;

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: &E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }
}
