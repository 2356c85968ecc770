use crate::cert::extensions::{ExtendedKeyUsageOption, FlagSet, KeyUsages};

/// Usage properties requested for a certificate key.
///
/// The basic flags map onto the key usage bitmask, the extended flags onto
/// the extended key usage purpose list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyUsage {
    // Basic
    pub digital_signature: bool,
    pub content_commitment: bool,
    pub key_encipherment: bool,
    pub data_encipherment: bool,
    pub key_agreement: bool,
    pub cert_sign: bool,
    pub crl_sign: bool,
    pub encipher_only: bool,
    pub decipher_only: bool,

    // Extended
    pub server_auth: bool,
    pub client_auth: bool,
    pub code_signing: bool,
    pub email_protection: bool,
    pub time_stamping: bool,
    pub ocsp_signing: bool,
}

impl KeyUsage {
    /// The key usage bitmask. Empty when no basic flag is set.
    pub fn basic(&self) -> FlagSet<KeyUsages> {
        [
            (self.digital_signature, KeyUsages::DigitalSignature),
            (self.content_commitment, KeyUsages::NonRepudiation),
            (self.key_encipherment, KeyUsages::KeyEncipherment),
            (self.data_encipherment, KeyUsages::DataEncipherment),
            (self.key_agreement, KeyUsages::KeyAgreement),
            (self.cert_sign, KeyUsages::KeyCertSign),
            (self.crl_sign, KeyUsages::CRLSign),
            (self.encipher_only, KeyUsages::EncipherOnly),
            (self.decipher_only, KeyUsages::DecipherOnly),
        ]
        .into_iter()
        .filter(|(set, _)| *set)
        .fold(FlagSet::empty(), |flags, (_, usage)| flags | usage)
    }

    /// The extended key usage purposes, always in the order server auth,
    /// client auth, code signing, email protection, time stamping, OCSP
    /// signing.
    pub fn extended(&self) -> Vec<ExtendedKeyUsageOption> {
        [
            (self.server_auth, ExtendedKeyUsageOption::ServerAuth),
            (self.client_auth, ExtendedKeyUsageOption::ClientAuth),
            (self.code_signing, ExtendedKeyUsageOption::CodeSigning),
            (self.email_protection, ExtendedKeyUsageOption::EmailProtection),
            (self.time_stamping, ExtendedKeyUsageOption::TimeStamping),
            (self.ocsp_signing, ExtendedKeyUsageOption::OcspSigning),
        ]
        .into_iter()
        .filter_map(|(set, usage)| set.then_some(usage))
        .collect()
    }
}
