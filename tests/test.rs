mod util;

use std::collections::HashSet;
use std::net::IpAddr;

use certforge::cert::Certificate;
use certforge::cert::alt_name::AlternateName;
use certforge::cert::extensions::{
    ExtendedKeyUsageOption, KeyUsages, SubjectAltName, SubjectKeyIdentifier,
};
use certforge::cert::name::Name;
use certforge::cert::params::{CertificateRequest, DateRange};
use certforge::cert::usage::KeyUsage;
use certforge::error::IssuanceError;
use certforge::{issue, profile};

pub type Result<T> = std::result::Result<T, IssuanceError>;

/// A self-signed certificate is its own issuer and always a CA, even when
/// the request asks otherwise.
#[test]
fn self_signed_is_root_ca() -> Result<()> {
    let mut request = util::ca_request();
    request.is_certificate_authority = false;

    let root = issue(&request, None)?;
    assert!(root.is_certificate_authority);

    let parsed = root.parse()?;
    assert_eq!(parsed.issuer_dn(), parsed.subject_dn());
    assert_eq!(parsed.issuer(), request.subject);
    assert!(parsed.is_certificate_authority()?);
    assert!(parsed.verify_issued_by(&parsed)?);
    assert_eq!(parsed.authority_key_identifier()?, None);
    Ok(())
}

/// An issuer-signed certificate names its issuer and verifies under the
/// issuer's key.
#[test]
fn issuer_signed_chains_to_issuer() -> Result<()> {
    let ca = util::generate_ca_cert();
    let server = util::generate_server_cert(&ca);

    let ca_parsed = ca.parse()?;
    let server_parsed = server.parse()?;

    assert_eq!(server_parsed.issuer_dn(), ca_parsed.subject_dn());
    assert_eq!(server_parsed.issuer(), ca.subject);
    assert!(server_parsed.verify_issued_by(&ca_parsed)?);
    assert!(!server_parsed.verify_issued_by(&server_parsed)?);
    assert_eq!(
        server_parsed.authority_key_identifier()?,
        ca_parsed.subject_key_identifier()?
    );
    Ok(())
}

/// Issuer-signed certificates carry the requested CA flag in both the record
/// and the basic constraints.
#[test]
fn issuer_signed_honours_requested_ca_flag() -> Result<()> {
    let root = util::generate_ca_cert();

    let leaf = issue(&util::server_request(), Some(&root))?;
    assert!(!leaf.is_certificate_authority);
    assert!(!leaf.parse()?.is_certificate_authority()?);

    let mut intermediate_request = util::ca_request();
    intermediate_request.subject.common_name = Some("intermediate.myca.local".to_string());
    intermediate_request.is_certificate_authority = true;
    let intermediate = issue(&intermediate_request, Some(&root))?;
    assert!(intermediate.is_certificate_authority);
    assert!(intermediate.parse()?.is_certificate_authority()?);

    // The intermediate can itself issue.
    let leaf = issue(&util::server_request(), Some(&intermediate))?;
    assert!(leaf.parse()?.verify_issued_by(&intermediate.parse()?)?);
    Ok(())
}

#[test]
fn record_round_trip_matches_request() -> Result<()> {
    let ca = util::generate_ca_cert();
    let request = util::server_request();
    let server = issue(&request, Some(&ca))?;

    assert_eq!(server.subject, request.subject);
    assert_eq!(server.serial, server.parse()?.serial()?.to_string());

    let decoded = server.decode()?;
    let parsed = &decoded.certificate;
    assert_eq!(parsed.subject(), request.subject);
    assert_eq!(parsed.validity()?, request.validity);
    assert_eq!(
        parsed.alternate_names()?,
        SubjectAltName {
            dns_names: vec!["server.myca.local".to_string(), "www.myca.local".to_string()],
            email_addresses: vec!["ops@myca.local".to_string()],
            ip_addresses: vec![
                "127.0.0.1".parse::<IpAddr>().unwrap(),
                "::1".parse::<IpAddr>().unwrap()
            ],
            uris: vec!["https://myca.local/server".to_string()],
        }
    );
    assert_eq!(
        parsed.key_usage()?,
        KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment
    );
    assert_eq!(
        parsed.crl_distribution_points()?,
        vec!["http://crl.myca.local/root.crl".to_string()]
    );
    assert_eq!(
        parsed.ocsp_servers()?,
        vec!["http://ocsp.myca.local".to_string()]
    );

    // The stored key is the key certified by the certificate.
    assert_eq!(
        decoded.key.public_key_der()?,
        der::Encode::to_der(parsed.subject_public_key_info()).unwrap()
    );
    Ok(())
}

#[test]
fn subject_key_identifier_is_sha1_of_public_key() -> Result<()> {
    let root = util::generate_ca_cert();
    let decoded = root.decode()?;
    let expected = profile::key_identifier(&decoded.key.public_key_der()?);

    assert_eq!(expected.len(), 20);
    assert_eq!(decoded.certificate.subject_key_identifier()?, Some(expected));

    let ski = decoded
        .certificate
        .extension_param::<SubjectKeyIdentifier>()?
        .unwrap();
    assert!(!ski.critical);
    Ok(())
}

#[test]
fn extended_key_usage_uses_fixed_order() -> Result<()> {
    let request = CertificateRequest::builder()
        .subject(Name::builder().common_name("eku.local".to_string()).build())
        .validity(util::current_validity(1))
        .usage(KeyUsage {
            client_auth: true,
            server_auth: true,
            ..Default::default()
        })
        .build();
    let cert = issue(&request, None)?;
    assert_eq!(
        cert.parse()?.extended_key_usage()?,
        vec![
            ExtendedKeyUsageOption::ServerAuth,
            ExtendedKeyUsageOption::ClientAuth
        ]
    );
    Ok(())
}

#[test]
fn no_usage_means_no_usage_extensions() -> Result<()> {
    let request = CertificateRequest::builder()
        .subject(Name::builder().common_name("bare.local".to_string()).build())
        .validity(util::current_validity(1))
        .build();
    let parsed = issue(&request, None)?.parse()?;
    assert!(parsed.key_usage()?.is_empty());
    assert!(parsed.extended_key_usage()?.is_empty());
    assert!(parsed.alternate_names()?.is_empty());
    assert!(
        parsed
            .extension_param::<SubjectAltName>()?
            .is_none()
    );
    Ok(())
}

#[test]
fn invalid_ip_alternate_name_aborts_issuance() {
    let mut request = util::server_request();
    request.alternate_names.push(AlternateName::ip("not-an-ip"));
    let err = issue(&request, None).unwrap_err();
    assert!(matches!(err, IssuanceError::InvalidAlternateName(_)));
}

#[test]
fn invalid_uri_alternate_name_aborts_issuance() {
    let mut request = util::server_request();
    request.alternate_names.push(AlternateName::uri("not a uri"));
    let err = issue(&request, None).unwrap_err();
    assert!(matches!(err, IssuanceError::InvalidAlternateName(_)));
}

#[test]
fn non_ascii_uri_alternate_name_aborts_issuance() {
    let mut request = util::server_request();
    request
        .alternate_names
        .push(AlternateName::uri("https://例え.jp/x"));
    let err = issue(&request, None).unwrap_err();
    assert!(matches!(err, IssuanceError::InvalidAlternateName(_)));
}

#[test]
fn unrecognized_alternate_name_is_dropped() -> Result<()> {
    let request = CertificateRequest::builder()
        .subject(Name::builder().common_name("pigeon.local".to_string()).build())
        .validity(util::current_validity(1))
        .alternate_names(vec![
            AlternateName::new("carrier-pigeon", "x"),
            AlternateName::dns("pigeon.local"),
        ])
        .build();
    let cert = issue(&request, None)?;
    assert_eq!(
        cert.parse()?.alternate_names()?,
        SubjectAltName {
            dns_names: vec!["pigeon.local".to_string()],
            ..Default::default()
        }
    );
    Ok(())
}

#[test]
fn empty_subject_makes_alternate_names_critical() -> Result<()> {
    let request = CertificateRequest::builder()
        .subject(Name::default())
        .validity(util::current_validity(1))
        .alternate_names(vec![AlternateName::dns("nameless.local")])
        .build();
    let parsed = issue(&request, None)?.parse()?;
    assert!(parsed.subject_dn().0.is_empty());
    assert!(parsed.extension_param::<SubjectAltName>()?.unwrap().critical);
    Ok(())
}

#[test]
fn inverted_validity_is_rejected() {
    let validity = util::current_validity(1);
    let request = CertificateRequest::builder()
        .subject(Name::default())
        .validity(DateRange::new(validity.not_after, validity.not_before))
        .build();
    assert!(matches!(
        issue(&request, None),
        Err(IssuanceError::InvalidValidity(_))
    ));
}

/// Certificates store whole seconds, so a window shorter than a second
/// would be issued with notBefore equal to notAfter.
#[test]
fn sub_second_validity_is_rejected() {
    let start = util::current_validity(1).not_before;
    let request = CertificateRequest::builder()
        .subject(Name::default())
        .validity(DateRange::new(
            start,
            start + time::Duration::milliseconds(500),
        ))
        .build();
    assert!(matches!(
        issue(&request, None),
        Err(IssuanceError::InvalidValidity(_))
    ));
}

#[test]
fn validity_before_1970_is_rejected() {
    let request = CertificateRequest::builder()
        .subject(Name::default())
        .validity(DateRange::new(
            // 1969-07-20 and 2030-01-01
            time::OffsetDateTime::from_unix_timestamp(-14_182_980).unwrap(),
            time::OffsetDateTime::from_unix_timestamp(1_893_456_000).unwrap(),
        ))
        .build();
    assert!(matches!(
        issue(&request, None),
        Err(IssuanceError::InvalidValidity(_))
    ));
}

#[test]
fn truncated_certificate_data_is_corrupt() {
    let root = util::generate_ca_cert();

    let mut truncated = root.clone();
    truncated
        .certificate_data
        .truncate(root.certificate_data.len() - 2);
    assert!(matches!(
        truncated.decode(),
        Err(IssuanceError::CorruptRecord(_))
    ));
    assert!(matches!(
        truncated.description(),
        Err(IssuanceError::CorruptRecord(_))
    ));

    let mut odd = root.clone();
    odd.certificate_data.pop();
    assert!(matches!(odd.decode(), Err(IssuanceError::CorruptRecord(_))));
}

#[test]
fn corrupt_issuer_aborts_issuance() {
    let mut root = util::generate_ca_cert();
    root.key_data.truncate(10);
    let err = issue(&util::server_request(), Some(&root)).unwrap_err();
    assert!(matches!(err, IssuanceError::CorruptRecord(_)));
}

#[test]
fn mismatched_issuer_key_is_refused() {
    let root = util::generate_ca_cert();
    let other = util::generate_ca_cert();
    let frankenstein = Certificate {
        key_data: other.key_data.clone(),
        ..root
    };
    let err = issue(&util::server_request(), Some(&frankenstein)).unwrap_err();
    assert!(matches!(err, IssuanceError::SigningFailed(_)));
}

#[test]
fn decoding_is_repeatable() -> Result<()> {
    let root = util::generate_ca_cert();
    let first = root.decode()?;
    let second = root.decode()?;
    assert_eq!(first.certificate.to_der()?, second.certificate.to_der()?);
    assert_eq!(first.key.to_pkcs8_der()?, second.key.to_pkcs8_der()?);
    Ok(())
}

#[test]
fn description_renders_subject() -> Result<()> {
    let root = util::generate_ca_cert();
    assert_eq!(
        root.description()?,
        "CN=myca.local, O=Crab Widgets SE, C=SE"
    );
    Ok(())
}

#[test]
fn serials_are_distinct_and_below_2_pow_128() {
    let mut seen = HashSet::new();
    for _ in 0..10_000 {
        let serial = certforge::key::generate_serial().unwrap();
        assert!(serial > 0);
        assert!(seen.insert(serial), "duplicate serial {serial}");
    }
}

#[test]
fn issued_serials_are_decimal_and_distinct() -> Result<()> {
    let request = util::ca_request();
    let serials: HashSet<String> = (0..20)
        .map(|_| issue(&request, None).map(|cert| cert.serial))
        .collect::<Result<_>>()?;
    assert_eq!(serials.len(), 20);
    for serial in &serials {
        serial.parse::<u128>().unwrap();
    }
    Ok(())
}

#[test]
fn concurrent_issuance_is_independent() {
    let root = util::generate_ca_cert();
    let serials: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| util::generate_server_cert(&root).serial))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let unique: HashSet<_> = serials.iter().collect();
    assert_eq!(unique.len(), serials.len());
}

#[test]
fn pem_exports_parse_back() -> Result<()> {
    let root = util::generate_ca_cert();
    let cert_pem = root.certificate_pem()?;
    let key_pem = root.key_pem()?;

    let parsed = pem::parse(&cert_pem).unwrap();
    assert_eq!(parsed.tag(), "CERTIFICATE");
    assert_eq!(parsed.contents(), root.certificate_der()?.as_slice());

    let parsed = pem::parse(&key_pem).unwrap();
    assert_eq!(parsed.tag(), "PRIVATE KEY");
    assert_eq!(parsed.contents(), root.key_der()?.as_slice());
    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn record_serializes_as_plain_fields() -> Result<()> {
    let root = util::generate_ca_cert();
    let json = serde_json::to_string(&root).unwrap();
    let restored: Certificate = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, root);
    assert!(restored.decode().is_ok());
    Ok(())
}
