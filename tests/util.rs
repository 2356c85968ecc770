#![allow(dead_code)]

use certforge::cert::Certificate;
use certforge::cert::alt_name::AlternateName;
use certforge::cert::name::Name;
use certforge::cert::params::{CertificateRequest, DateRange, StatusProviders};
use certforge::cert::usage::KeyUsage;
use certforge::issue;
use time::{Duration, OffsetDateTime};

/// A validity window around now, truncated to whole seconds so it survives
/// the trip through the certificate unchanged.
pub fn current_validity(days: i64) -> DateRange {
    let now = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();
    DateRange::new(now - Duration::hours(1), now + Duration::days(days))
}

pub fn ca_request() -> CertificateRequest {
    CertificateRequest::builder()
        .subject(
            Name::builder()
                .common_name("myca.local".to_string())
                .organization("Crab Widgets SE".to_string())
                .country("SE".to_string())
                .build(),
        )
        .validity(current_validity(3650))
        .usage(KeyUsage {
            digital_signature: true,
            cert_sign: true,
            crl_sign: true,
            ..Default::default()
        })
        .build()
}

pub fn generate_ca_cert() -> Certificate {
    issue(&ca_request(), None).unwrap()
}

pub fn server_request() -> CertificateRequest {
    CertificateRequest::builder()
        .subject(
            Name::builder()
                .common_name("server.myca.local".to_string())
                .organization("Crab Widgets SE".to_string())
                .city("Gothenburg".to_string())
                .province("Vastra Gotaland".to_string())
                .country("SE".to_string())
                .build(),
        )
        .validity(current_validity(365))
        .alternate_names(vec![
            AlternateName::dns("server.myca.local"),
            AlternateName::ip("127.0.0.1"),
            AlternateName::email("ops@myca.local"),
            AlternateName::dns("www.myca.local"),
            AlternateName::uri("https://myca.local/server"),
            AlternateName::ip("::1"),
        ])
        .usage(KeyUsage {
            digital_signature: true,
            key_encipherment: true,
            server_auth: true,
            client_auth: true,
            ..Default::default()
        })
        .status_providers(
            StatusProviders::builder()
                .crl("http://crl.myca.local/root.crl".to_string())
                .ocsp("http://ocsp.myca.local".to_string())
                .build(),
        )
        .build()
}

pub fn generate_server_cert(ca: &Certificate) -> Certificate {
    issue(&server_request(), Some(ca)).unwrap()
}
