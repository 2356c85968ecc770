//! Errors returned while issuing certificates or decoding stored records.

use std::fmt::Display;

use thiserror::Error;

/// Represents errors that can occur while issuing or decoding certificates.
///
/// Every variant names the stage that failed. No variant is ever returned
/// alongside a partially built certificate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IssuanceError {
    /// The secure random source could not supply key or serial material.
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// An `ip` or `uri` alternate name could not be parsed, or a name could
    /// not be represented in the certificate.
    #[error("Invalid alternate name: {0}")]
    InvalidAlternateName(String),

    /// The requested validity period is empty or inverted.
    #[error("Invalid validity period: {0}")]
    InvalidValidity(String),

    /// Producing the certificate signature failed.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingFailed(String),

    /// A stored certificate record could not be hex or DER decoded.
    #[error("Corrupt certificate record: {0}")]
    CorruptRecord(String),
}

impl IssuanceError {
    pub(crate) fn corrupt(err: impl Display) -> Self {
        IssuanceError::CorruptRecord(err.to_string())
    }

    pub(crate) fn encoding(err: impl Display) -> Self {
        IssuanceError::EncodingFailed(err.to_string())
    }
}

impl From<der::Error> for IssuanceError {
    /// Converts a `der::Error` raised while building a certificate.
    fn from(err: der::Error) -> Self {
        IssuanceError::EncodingFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IssuanceError>;
