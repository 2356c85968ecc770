use std::time::SystemTime;

use der::asn1::{GeneralizedTime, OctetString, UtcTime};
use der::{DateTime, Encode};
use time::OffsetDateTime;
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::name::DistinguishedName;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::time::{Time, Validity};

use crate::cert::params::{DateRange, ExtensionParam};
use crate::error::{IssuanceError, Result};
use crate::profile::{self, SERIAL_NUMBER_BYTES};

/// Represents the "To Be Signed" (TBS) portion of an X.509 certificate.
///
/// # Fields
/// * `serial_number` - The random certificate serial.
/// * `issuer` - The distinguished name of the certificate issuer.
/// * `validity` - The validity period.
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key_info` - The public key of the certificate subject.
/// * `extensions` - X.509 extensions, in encoding order.
#[derive(Clone, Debug)]
pub struct TbsCertificate {
    pub serial_number: u128,
    pub issuer: DistinguishedName,
    pub validity: DateRange,
    pub subject: DistinguishedName,
    pub subject_public_key_info: SubjectPublicKeyInfoOwned,
    pub extensions: Vec<ExtensionParam>,
}

impl TbsCertificate {
    /// Converts the `TbsCertificate` into a `TbsCertificateInner` for DER encoding.
    ///
    /// The signature algorithm is always the issuance profile's.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner> {
        let extensions = self
            .extensions
            .iter()
            .map(|ext| {
                Ok(x509_cert::ext::Extension {
                    extn_id: ext.oid,
                    critical: ext.critical,
                    extn_value: OctetString::new(ext.value.clone())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let validity = Validity {
            not_before: encode_time(self.validity.not_before)?,
            not_after: encode_time(self.validity.not_after)?,
        };

        let serial_number = SerialNumber::new(&self.serial_number.to_be_bytes())?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number,
            signature: profile::signature_algorithm(),
            issuer: self.issuer.clone(),
            validity,
            subject: self.subject.clone(),
            subject_public_key_info: self.subject_public_key_info.clone(),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        })
    }

    /// Creates a `TbsCertificate` from a decoded `TbsCertificateInner`.
    ///
    /// Anything this engine would not have produced is reported as a
    /// corrupt record.
    pub fn from_tbs_certificate_inner(inner: &TbsCertificateInner) -> Result<Self> {
        if inner.signature.oid != profile::SIGNATURE_ALGORITHM_OID {
            return Err(IssuanceError::CorruptRecord(format!(
                "unsupported signature algorithm {}",
                inner.signature.oid
            )));
        }

        let extensions = inner
            .extensions
            .iter()
            .flatten()
            .map(|ext| ExtensionParam {
                oid: ext.extn_id,
                critical: ext.critical,
                value: ext.extn_value.as_bytes().to_vec(),
            })
            .collect();

        Ok(Self {
            serial_number: decode_serial(&inner.serial_number)?,
            issuer: inner.issuer.clone(),
            validity: DateRange::new(
                decode_time(&inner.validity.not_before),
                decode_time(&inner.validity.not_after),
            ),
            subject: inner.subject.clone(),
            subject_public_key_info: inner.subject_public_key_info.clone(),
            extensions,
        })
    }

    /// Encodes the `TbsCertificate` into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(self.to_tbs_certificate_inner()?.to_der()?)
    }
}

/// RFC 5280 requires UTCTime for years 1950 through 2049 and
/// GeneralizedTime otherwise. `der::DateTime` starts at 1970, so earlier
/// instants fail to encode; issuance rejects them up front.
fn encode_time(at: OffsetDateTime) -> Result<Time> {
    let date_time = DateTime::from_system_time(SystemTime::from(at))?;
    if (1950..2050).contains(&date_time.year()) {
        Ok(Time::UtcTime(UtcTime::from_date_time(date_time)?))
    } else {
        Ok(Time::GeneralTime(GeneralizedTime::from_date_time(date_time)))
    }
}

fn decode_time(time: &Time) -> OffsetDateTime {
    OffsetDateTime::from(time.to_system_time())
}

fn decode_serial(serial: &SerialNumber) -> Result<u128> {
    let bytes = serial.as_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let significant = &bytes[start..];
    if significant.len() > SERIAL_NUMBER_BYTES {
        return Err(IssuanceError::CorruptRecord(format!(
            "serial number of {} bytes",
            significant.len()
        )));
    }
    let mut buf = [0u8; SERIAL_NUMBER_BYTES];
    buf[SERIAL_NUMBER_BYTES - significant.len()..].copy_from_slice(significant);
    Ok(u128::from_be_bytes(buf))
}
