use der::Encode;
use der::asn1::BitString;
use tracing::debug;
use x509_cert::certificate::CertificateInner;
use x509_cert::name::DistinguishedName;

use crate::cert::alt_name::encode_alternate_names;
use crate::cert::extensions::{
    AuthorityInfoAccess, AuthorityKeyIdentifier, BasicConstraints, BasicKeyUsage,
    CrlDistributionPoints, ExtendedKeyUsage, SubjectKeyIdentifier,
};
use crate::cert::params::{CertificateRequest, ExtensionParam};
use crate::cert::{Certificate, DecodedRecord};
use crate::error::{IssuanceError, Result};
use crate::key::{self, KeyPair};
use crate::profile;
use crate::tbs_certificate::TbsCertificate;

/// Represents an entity capable of signing certificates.
pub trait Issuer {
    /// Returns the distinguished name written into the issuer field.
    fn issuer_name(&self) -> DistinguishedName;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Returns the issuer's subject key identifier, if it has one, for the
    /// authority key identifier extension.
    fn key_identifier(&self) -> Result<Option<Vec<u8>>>;

    /// Fills in the issuer fields of `tbs`, signs it, and returns the
    /// DER-encoded certificate.
    fn sign(&self, mut tbs: TbsCertificate) -> Result<Vec<u8>> {
        tbs.issuer = self.issuer_name();
        if let Some(key_identifier) = self.key_identifier()? {
            let aki = AuthorityKeyIdentifier { key_identifier };
            tbs.extensions
                .push(ExtensionParam::from_extension(&aki, false)?);
        }

        let tbs_cert_inner = tbs.to_tbs_certificate_inner()?;
        let signature = self.signing_key().sign_data(&tbs_cert_inner.to_der()?)?;

        let cert_inner = CertificateInner {
            tbs_certificate: tbs_cert_inner,
            signature_algorithm: profile::signature_algorithm(),
            signature: BitString::from_bytes(&signature)?,
        };

        Ok(cert_inner.to_der()?)
    }
}

// A root signs itself: its own subject is the issuer name.
struct SelfIssuer<'a> {
    name: DistinguishedName,
    key: &'a KeyPair,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> DistinguishedName {
        self.name.clone()
    }

    fn signing_key(&self) -> &KeyPair {
        self.key
    }

    fn key_identifier(&self) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

impl Issuer for DecodedRecord {
    fn issuer_name(&self) -> DistinguishedName {
        // The name of the issuer is the subject of the certificate, byte for byte.
        self.certificate.subject_dn().clone()
    }

    fn signing_key(&self) -> &KeyPair {
        &self.key
    }

    fn key_identifier(&self) -> Result<Option<Vec<u8>>> {
        self.certificate.subject_key_identifier()
    }
}

/// Issues a certificate for `request`.
///
/// Without an `issuer` the certificate is a self-signed root and is always
/// marked as a certificate authority. With an `issuer` the certificate is
/// signed by the issuer's key and carries the request's CA flag.
///
/// Nothing is returned unless every step succeeds.
pub fn issue(request: &CertificateRequest, issuer: Option<&Certificate>) -> Result<Certificate> {
    debug!(
        subject = %request.subject,
        self_signed = issuer.is_none(),
        "issuing certificate"
    );

    request.validity.ensure_ordered()?;

    let key = KeyPair::generate()?;
    let serial_number = key::generate_serial()?;
    let subject_key_identifier = profile::key_identifier(&key.public_key_der()?);
    let subject = request.subject.to_distinguished_name()?;

    let is_certificate_authority = match issuer {
        None => true,
        Some(_) => request.is_certificate_authority,
    };

    let tbs = TbsCertificate {
        serial_number,
        issuer: subject.clone(),
        validity: request.validity,
        extensions: build_extensions(
            request,
            is_certificate_authority,
            subject_key_identifier,
            subject.0.is_empty(),
        )?,
        subject,
        subject_public_key_info: key.as_spki()?,
    };

    let certificate_der = match issuer {
        None => {
            let self_issuer = SelfIssuer {
                name: tbs.subject.clone(),
                key: &key,
            };
            self_issuer.sign(tbs)?
        }
        Some(record) => {
            let decoded = record.decode()?;
            ensure_key_matches(&decoded)?;
            decoded.sign(tbs)?
        }
    };

    let certificate = Certificate {
        serial: serial_number.to_string(),
        subject: request.subject.clone(),
        is_certificate_authority,
        certificate_data: hex::encode(certificate_der),
        key_data: hex::encode(key.to_pkcs8_der()?),
    };

    debug!(serial = %certificate.serial, subject = %certificate.subject, "issued certificate");
    Ok(certificate)
}

fn build_extensions(
    request: &CertificateRequest,
    is_certificate_authority: bool,
    subject_key_identifier: Vec<u8>,
    subject_is_empty: bool,
) -> Result<Vec<ExtensionParam>> {
    let basic_constraints = BasicConstraints {
        is_ca: is_certificate_authority,
        max_path_length: None,
    };

    let mut extensions = vec![ExtensionParam::from_extension(&basic_constraints, true)?];

    let key_usage_flags = request.usage.basic();
    if !key_usage_flags.is_empty() {
        extensions.push(ExtensionParam::from_extension(
            &BasicKeyUsage(key_usage_flags),
            true,
        )?);
    }

    let usages = request.usage.extended();
    if !usages.is_empty() {
        let extended_key_usage = ExtendedKeyUsage { usage: usages };
        extensions.push(ExtensionParam::from_extension(&extended_key_usage, false)?);
    }

    extensions.push(ExtensionParam::from_extension(
        &SubjectKeyIdentifier(subject_key_identifier),
        false,
    )?);

    let alternate_names = encode_alternate_names(&request.alternate_names)?;
    if !alternate_names.is_empty() {
        // With an empty subject the SAN carries the identity and must be critical.
        extensions.push(ExtensionParam::from_extension(
            &alternate_names,
            subject_is_empty,
        )?);
    }

    if let Some(crl) = &request.status_providers.crl {
        let points = CrlDistributionPoints {
            urls: vec![crl.clone()],
        };
        extensions.push(ExtensionParam::from_extension(&points, false)?);
    }

    if let Some(ocsp) = &request.status_providers.ocsp {
        let access = AuthorityInfoAccess {
            ocsp_servers: vec![ocsp.clone()],
        };
        extensions.push(ExtensionParam::from_extension(&access, false)?);
    }

    Ok(extensions)
}

fn ensure_key_matches(issuer: &DecodedRecord) -> Result<()> {
    let certificate_key = issuer
        .certificate
        .subject_public_key_info()
        .to_der()
        .map_err(IssuanceError::corrupt)?;
    if certificate_key != issuer.key.public_key_der()? {
        return Err(IssuanceError::SigningFailed(
            "issuer private key does not match issuer certificate".to_string(),
        ));
    }
    Ok(())
}
