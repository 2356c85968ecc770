//! Fixed algorithm choices used for every issued certificate.
//!
//! These are process-wide constants. Changing one here changes every
//! certificate the engine produces, so existing chains built on the old
//! values will no longer line up.

use const_oid::ObjectIdentifier;
use const_oid::db::rfc5912::{ECDSA_WITH_SHA_256, SECP_256_R_1};
use sha1::{Digest, Sha1};
use x509_cert::spki::AlgorithmIdentifierOwned;

/// Curve used for every generated key pair.
pub type KeyCurve = p256::NistP256;

/// Named-curve OID of [`KeyCurve`].
pub const KEY_CURVE_OID: ObjectIdentifier = SECP_256_R_1;

/// Signature algorithm used when signing certificates.
pub const SIGNATURE_ALGORITHM_OID: ObjectIdentifier = ECDSA_WITH_SHA_256;

/// Hash used to derive subject and authority key identifiers.
pub type KeyIdentifierHash = Sha1;

/// Width of the random serial number, in bytes.
pub const SERIAL_NUMBER_BYTES: usize = 16;

/// Width of the random serial number, in bits.
pub const SERIAL_NUMBER_BITS: usize = SERIAL_NUMBER_BYTES * 8;

/// The `AlgorithmIdentifier` written into both the TBS certificate and the
/// outer certificate. ECDSA identifiers carry no parameters.
pub fn signature_algorithm() -> AlgorithmIdentifierOwned {
    AlgorithmIdentifierOwned {
        oid: SIGNATURE_ALGORITHM_OID,
        parameters: None,
    }
}

/// Computes a key identifier over a DER-encoded SubjectPublicKeyInfo.
pub fn key_identifier(public_key_der: &[u8]) -> Vec<u8> {
    KeyIdentifierHash::digest(public_key_der).to_vec()
}
