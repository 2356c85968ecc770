use std::fmt;

use bon::Builder;
use const_oid::ObjectIdentifier;
use der::asn1::{Any, PrintableStringRef, SetOfVec, Utf8StringRef};
use der::{Tag, Tagged};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{DistinguishedName, RdnSequence, RelativeDistinguishedName};

use crate::error::Result;

const ID_AT_COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
const ID_AT_COUNTRY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
const ID_AT_LOCALITY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
const ID_AT_STATE_OR_PROVINCE_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
const ID_AT_ORGANIZATION_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");

/// The identity of a certificate subject or issuer.
///
/// # Fields
/// * `organization` - The organization (O).
/// * `city` - The locality (L).
/// * `province` - The state or province (ST).
/// * `country` - The two-letter country code (C).
/// * `common_name` - The common name (CN).
#[derive(Clone, Debug, Default, PartialEq, Eq, Builder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Name {
    pub organization: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub common_name: Option<String>,
}

impl Name {
    /// Converts the name to an X.509 distinguished name.
    ///
    /// Each non-empty field becomes its own single-valued RDN, in the order
    /// C, ST, L, O, CN. The country is a PrintableString, everything else is
    /// a UTF8String.
    pub fn to_distinguished_name(&self) -> Result<DistinguishedName> {
        let attributes = [
            (ID_AT_COUNTRY_NAME, &self.country),
            (ID_AT_STATE_OR_PROVINCE_NAME, &self.province),
            (ID_AT_LOCALITY_NAME, &self.city),
            (ID_AT_ORGANIZATION_NAME, &self.organization),
            (ID_AT_COMMON_NAME, &self.common_name),
        ];

        let mut rdns = Vec::new();
        for (oid, value) in attributes {
            let Some(value) = value.as_deref().filter(|v| !v.is_empty()) else {
                continue;
            };
            let value = if oid == ID_AT_COUNTRY_NAME {
                Any::encode_from(&PrintableStringRef::new(value)?)?
            } else {
                Any::encode_from(&Utf8StringRef::new(value)?)?
            };
            let attribute = AttributeTypeAndValue { oid, value };
            rdns.push(RelativeDistinguishedName(SetOfVec::try_from(vec![
                attribute,
            ])?));
        }

        Ok(RdnSequence(rdns))
    }

    /// Creates a `Name` from an X.509 distinguished name.
    ///
    /// Only the first value of a repeated attribute is kept. Attributes that
    /// are absent, or whose value is not a string type, leave the field `None`.
    pub fn from_distinguished_name(dn: &DistinguishedName) -> Self {
        let mut name = Name::default();
        for attribute in dn.0.iter().flat_map(|rdn| rdn.0.iter()) {
            let field = match attribute.oid {
                ID_AT_COUNTRY_NAME => &mut name.country,
                ID_AT_STATE_OR_PROVINCE_NAME => &mut name.province,
                ID_AT_LOCALITY_NAME => &mut name.city,
                ID_AT_ORGANIZATION_NAME => &mut name.organization,
                ID_AT_COMMON_NAME => &mut name.common_name,
                _ => continue,
            };
            if field.is_none() {
                *field = attribute_string(&attribute.value);
            }
        }
        name
    }
}

// Best effort, for display: TeletexString is read as UTF-8 (T.61 is rarely
// anything but ASCII in practice), BMPString as UTF-16BE. Values that do not
// decode leave the field empty.
fn attribute_string(value: &Any) -> Option<String> {
    match value.tag() {
        Tag::Utf8String | Tag::PrintableString | Tag::Ia5String | Tag::TeletexString => {
            std::str::from_utf8(value.value()).ok().map(str::to_owned)
        }
        Tag::BmpString => {
            let bytes = value.value();
            if bytes.len() % 2 != 0 {
                return None;
            }
            let units = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
            char::decode_utf16(units).collect::<std::result::Result<String, _>>().ok()
        }
        _ => None,
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            ("CN", &self.common_name),
            ("O", &self.organization),
            ("L", &self.city),
            ("ST", &self.province),
            ("C", &self.country),
        ];
        let mut first = true;
        for (label, value) in parts {
            let Some(value) = value.as_deref().filter(|v| !v.is_empty()) else {
                continue;
            };
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{label}={value}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_name() -> Name {
        Name::builder()
            .organization("Crab Widgets".to_string())
            .city("Portland".to_string())
            .province("Oregon".to_string())
            .country("US".to_string())
            .common_name("crabs.example".to_string())
            .build()
    }

    #[test]
    fn distinguished_name_round_trip() {
        let name = full_name();
        let dn = name.to_distinguished_name().unwrap();
        assert_eq!(dn.0.len(), 5);
        assert_eq!(Name::from_distinguished_name(&dn), name);
    }

    #[test]
    fn empty_fields_are_not_emitted() {
        let name = Name::builder()
            .common_name("only-cn".to_string())
            .organization(String::new())
            .build();
        let dn = name.to_distinguished_name().unwrap();
        assert_eq!(dn.0.len(), 1);

        let decoded = Name::from_distinguished_name(&dn);
        assert_eq!(decoded.common_name.as_deref(), Some("only-cn"));
        assert_eq!(decoded.organization, None);
    }

    #[test]
    fn first_value_of_repeated_attribute_wins() {
        let first = Name::builder().organization("First".to_string()).build();
        let second = Name::builder().organization("Second".to_string()).build();
        let mut dn = first.to_distinguished_name().unwrap();
        dn.0.extend(second.to_distinguished_name().unwrap().0);

        let decoded = Name::from_distinguished_name(&dn);
        assert_eq!(decoded.organization.as_deref(), Some("First"));
    }

    #[test]
    fn bmp_string_values_are_decoded() {
        // "Crab" as UTF-16BE
        let value = Any::new(Tag::BmpString, vec![0, b'C', 0, b'r', 0, b'a', 0, b'b']).unwrap();
        let attribute = AttributeTypeAndValue {
            oid: ID_AT_ORGANIZATION_NAME,
            value,
        };
        let dn = RdnSequence(vec![RelativeDistinguishedName(
            SetOfVec::try_from(vec![attribute]).unwrap(),
        )]);
        assert_eq!(
            Name::from_distinguished_name(&dn).organization.as_deref(),
            Some("Crab")
        );
    }

    #[test]
    fn country_must_be_printable() {
        let name = Name::builder().country("Ü@".to_string()).build();
        assert!(name.to_distinguished_name().is_err());
    }

    #[test]
    fn display_lists_present_fields() {
        assert_eq!(
            full_name().to_string(),
            "CN=crabs.example, O=Crab Widgets, L=Portland, ST=Oregon, C=US"
        );
        assert_eq!(Name::default().to_string(), "");
    }
}
