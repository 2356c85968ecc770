//! # certforge - Declarative X.509 Certificate Issuance
//!
//! certforge turns a declarative [`CertificateRequest`] into a signed X.509
//! certificate and its private key, built entirely on rustcrypto libraries.
//! A certificate is either a self-signed root or is chained to a previously
//! issued certificate authority.
//!
//! The result is a storage-agnostic [`Certificate`] record: a decimal serial,
//! the requested subject, the CA flag, and hex strings holding the DER
//! certificate and the PKCS#8 private key. Records are decoded lazily, so a
//! stored CA record can be handed straight back to [`issue`] as the issuer of
//! the next certificate.
//!
//! ## Fixed Algorithms
//!
//! - **Keys**: ECDSA on NIST P-256
//! - **Signatures**: ECDSA with SHA-256
//! - **Key identifiers**: SHA-1 over the DER SubjectPublicKeyInfo
//! - **Serials**: 128 random bits
//!
//! See [`profile`] for the constants.
//!
//! ## Quick Start
//!
//! ### Issuing a Root and a Server Certificate
//!
//! ```rust,no_run
//! use certforge::{
//!     issue,
//!     cert::{
//!         alt_name::AlternateName,
//!         name::Name,
//!         params::{CertificateRequest, DateRange},
//!         usage::KeyUsage,
//!     },
//! };
//!
//! # fn main() -> Result<(), certforge::error::IssuanceError> {
//! let root_request = CertificateRequest::builder()
//!     .subject(
//!         Name::builder()
//!             .common_name("Example Root".to_string())
//!             .organization("Example Corp".to_string())
//!             .build(),
//!     )
//!     .validity(DateRange::for_days(3650))
//!     .usage(KeyUsage {
//!         cert_sign: true,
//!         crl_sign: true,
//!         ..Default::default()
//!     })
//!     .build();
//! let root = issue(&root_request, None)?;
//!
//! let server_request = CertificateRequest::builder()
//!     .subject(Name::builder().common_name("www.example.com".to_string()).build())
//!     .validity(DateRange::for_days(365))
//!     .alternate_names(vec![
//!         AlternateName::dns("www.example.com"),
//!         AlternateName::ip("192.0.2.10"),
//!     ])
//!     .usage(KeyUsage {
//!         digital_signature: true,
//!         server_auth: true,
//!         ..Default::default()
//!     })
//!     .build();
//! let server = issue(&server_request, Some(&root))?;
//!
//! println!("{}", server.certificate_pem()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns a [`Result`]; stored data that no longer decodes is
//! reported rather than panicking:
//!
//! ```rust
//! use certforge::{cert::{Certificate, name::Name}, error::IssuanceError};
//!
//! let damaged = Certificate {
//!     serial: "1".to_string(),
//!     subject: Name::default(),
//!     is_certificate_authority: false,
//!     certificate_data: "30".to_string(),
//!     key_data: String::new(),
//! };
//! match damaged.decode() {
//!     Err(IssuanceError::CorruptRecord(msg)) => println!("Corrupt record: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//!     Ok(_) => unreachable!(),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`cert`]: Request types, name/usage/alternate-name encoders, and the certificate record
//! - [`issuer`]: The issuance algorithm
//! - [`key`]: Key pair and serial generation
//! - [`profile`]: Fixed algorithm choices
//! - [`error`]: Error types
//! - [`tbs_certificate`]: Low-level certificate structure manipulation

pub mod cert;
pub mod error;
pub mod issuer;
pub mod key;
pub mod pem_utils;
pub mod profile;
pub mod tbs_certificate;

pub use cert::Certificate;
pub use cert::params::CertificateRequest;
pub use error::{IssuanceError, Result};
pub use issuer::issue;
