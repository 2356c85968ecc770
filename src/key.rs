use std::fmt;

use p256::ecdsa::signature::Signer;
use p256::ecdsa::{DerSignature, SigningKey};
use p256::elliptic_curve::SecretKey;
use p256::elliptic_curve::zeroize::Zeroize;
use p256::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey};
use rand_core::{OsRng, RngCore};
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::error::{IssuanceError, Result};
use crate::profile::{KeyCurve, SERIAL_NUMBER_BYTES};

/// Attempts before giving up on a random source that keeps producing
/// unusable material (all-zero or out-of-range scalars).
const MAX_DRAWS: usize = 8;

/// An elliptic-curve key pair on the fixed issuance curve.
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey<KeyCurve>,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair").finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Generate a fresh P-256 key pair from the operating system's secure
    /// random source.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; 32];
        for _ in 0..MAX_DRAWS {
            OsRng
                .try_fill_bytes(&mut bytes)
                .map_err(|e| IssuanceError::KeyGenerationFailed(e.to_string()))?;
            let secret = SecretKey::<KeyCurve>::from_slice(&bytes);
            bytes.zeroize();
            if let Ok(secret) = secret {
                return Ok(KeyPair { secret });
            }
        }
        Err(IssuanceError::KeyGenerationFailed(
            "random source produced no valid scalar".to_string(),
        ))
    }

    /// Import a key pair from PKCS#8 DER. Failure means the stored bytes are
    /// corrupt.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let secret = SecretKey::<KeyCurve>::from_pkcs8_der(der).map_err(IssuanceError::corrupt)?;
        Ok(KeyPair { secret })
    }

    /// Export the private key as PKCS#8 DER.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let document = self
            .secret
            .to_pkcs8_der()
            .map_err(IssuanceError::encoding)?;
        Ok(document.as_bytes().to_vec())
    }

    /// The DER-encoded SubjectPublicKeyInfo of this key.
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        let document = self
            .secret
            .public_key()
            .to_public_key_der()
            .map_err(IssuanceError::encoding)?;
        Ok(document.as_bytes().to_vec())
    }

    /// The SubjectPublicKeyInfo of this key, as embedded in certificates.
    pub fn as_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        SubjectPublicKeyInfoOwned::from_key(self.secret.public_key())
            .map_err(IssuanceError::encoding)
    }

    /// Sign `data` with ECDSA-SHA256, returning the DER-encoded signature.
    pub fn sign_data(&self, data: &[u8]) -> Result<Vec<u8>> {
        let signing_key = SigningKey::from(&self.secret);
        let signature: DerSignature = signing_key
            .try_sign(data)
            .map_err(|e| IssuanceError::SigningFailed(e.to_string()))?;
        Ok(signature.as_bytes().to_vec())
    }
}

/// Draw a uniformly random serial number in `(0, 2^128)`.
///
/// Uniqueness is left to the size of the space; no collision check is made.
pub fn generate_serial() -> Result<u128> {
    let mut bytes = [0u8; SERIAL_NUMBER_BYTES];
    for _ in 0..MAX_DRAWS {
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| IssuanceError::KeyGenerationFailed(e.to_string()))?;
        let serial = u128::from_be_bytes(bytes);
        // A certificate serial must be positive.
        if serial != 0 {
            return Ok(serial);
        }
    }
    Err(IssuanceError::KeyGenerationFailed(
        "random source produced only zero serials".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::KEY_CURVE_OID;
    use der::asn1::ObjectIdentifier;

    #[test]
    fn generated_key_survives_pkcs8_round_trip() {
        let key = KeyPair::generate().unwrap();
        let der = key.to_pkcs8_der().unwrap();
        let imported = KeyPair::from_pkcs8_der(&der).unwrap();
        assert_eq!(
            key.public_key_der().unwrap(),
            imported.public_key_der().unwrap()
        );
    }

    #[test]
    fn spki_names_the_issuance_curve() {
        let key = KeyPair::generate().unwrap();
        let spki = key.as_spki().unwrap();
        let curve: ObjectIdentifier = spki
            .algorithm
            .parameters
            .as_ref()
            .unwrap()
            .decode_as()
            .unwrap();
        assert_eq!(curve, KEY_CURVE_OID);
    }

    #[test]
    fn garbage_pkcs8_is_corrupt() {
        let err = KeyPair::from_pkcs8_der(&[0x30, 0x03, 0x02, 0x01]).unwrap_err();
        assert!(matches!(err, IssuanceError::CorruptRecord(_)));
    }

    #[test]
    fn serials_are_positive_and_distinct() {
        let a = generate_serial().unwrap();
        let b = generate_serial().unwrap();
        assert!(a > 0 && b > 0);
        assert_ne!(a, b);
    }

    #[test]
    fn signatures_are_der_encoded() {
        let key = KeyPair::generate().unwrap();
        let signature = key.sign_data(b"to be signed").unwrap();
        // SEQUENCE { INTEGER r, INTEGER s }
        assert_eq!(signature[0], 0x30);
    }
}
