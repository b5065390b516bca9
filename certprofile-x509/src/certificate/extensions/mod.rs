pub mod basic_constraints;
pub mod key_usage;
pub mod extended_key_usage;
pub mod policies;
pub mod name_constraints;
pub mod private_key_usage_period;
pub mod qc_statements;
pub mod biometric_info;
pub mod tls_feature;
pub mod gmt0015;
pub mod admission;
pub mod subject_directory_attributes;
pub mod smime_capabilities;
pub mod validity_model;
pub mod authorization_template;

use yasna::{
    ASN1Result,
    DERWriter,
    DEREncodable,
    BERReader,
    BERDecodable,
    models::ObjectIdentifier,
};

#[cfg(feature = "tracing")]
use tracing::{debug};

//  Extension  ::=  SEQUENCE  {
//       extnID      OBJECT IDENTIFIER,
//       critical    BOOLEAN DEFAULT FALSE,
//       extnValue   OCTET STRING }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extension {
    oid: ObjectIdentifier,
    critical: bool,
    value: Vec<u8>,
}

impl Extension {
    pub fn new(oid: ObjectIdentifier, critical: bool, value: Vec<u8>) -> Self {
        Extension { oid, critical, value }
    }

    /// Encodes `value` as the extnValue.
    pub fn from_value<T: DEREncodable>(oid: ObjectIdentifier, critical: bool, value: &T) -> Self {
        Extension { oid, critical, value: yasna::encode_der(value) }
    }

    pub fn oid(&self) -> &ObjectIdentifier {
        &self.oid
    }

    pub fn critical(&self) -> bool {
        self.critical
    }

    /// DER inside the extnValue OCTET STRING.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl BERDecodable for Extension {
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "Extension::decode_ber"))]
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        #[cfg(feature = "tracing")]
        debug!("parsing extension");
        reader.read_sequence(|reader| {
            let oid = reader.next().read_oid()?;
            let critical = reader.read_optional(|reader| reader.read_bool())?.unwrap_or(false);
            let value = reader.next().read_bytes()?;
            Ok(Extension { oid, critical, value })
        })
    }
}

impl DEREncodable for Extension {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            writer.next().write_oid(&self.oid); // extnID
            if self.critical {
                writer.next().write_bool(true); // critical, DEFAULT FALSE
            }
            writer.next().write_bytes(&self.value); // extnValue
        });
    }
}

//  Extensions  ::=  SEQUENCE SIZE (1..MAX) OF Extension
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Extensions(pub Vec<Extension>);

impl Extensions {
    pub fn get(&self, oid: &ObjectIdentifier) -> Option<&Extension> {
        self.0.iter().find(|extension| extension.oid() == oid)
    }
}

impl DEREncodable for Extensions {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            for extension in self.0.iter() {
                extension.encode_der(writer.next());
            }
        })
    }
}

impl BERDecodable for Extensions {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        Ok(Extensions(reader.collect_sequence_of(Extension::decode_ber)?))
    }
}

pub use basic_constraints::*;
pub use key_usage::*;
pub use extended_key_usage::*;
pub use policies::*;
pub use name_constraints::*;
pub use private_key_usage_period::*;
pub use qc_statements::*;
pub use biometric_info::*;
pub use tls_feature::*;
pub use gmt0015::*;
pub use admission::*;
pub use subject_directory_attributes::*;
pub use smime_capabilities::*;
pub use validity_model::*;
pub use authorization_template::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::oids::*;

    #[test]
    fn non_critical_extension_should_omit_the_critical_flag () {
        let expected = vec!(0x30,0x09, // SEQUENCE, 9 bytes
            0x06,0x03, // OID, 3 bytes
                0x55,0x1d,0x36, // encoding of OID(2.5.29.54)
            0x04,0x02, // OCTET STRING, 2 bytes
                0x02,0x00); // INTEGER 0
        let extension = Extension::new(oid(OID_CE_INHIBIT_ANY_POLICY), false, vec!(0x02,0x00));
        let der = yasna::encode_der(&extension);
        assert_eq!(der, expected);
        assert_eq!(yasna::parse_der(&der, Extension::decode_ber), Ok(extension));
    }

    #[test]
    fn critical_extension_should_encode_correctly () {
        let expected = vec!(0x30,0x0c, // SEQUENCE, 12 bytes
            0x06,0x03, // OID, 3 bytes
                0x55,0x1d,0x36, // encoding of OID(2.5.29.54)
            0x01,0x01, // BOOL, 1 byte
                0xff, // TRUE (is critical)
            0x04,0x02, // OCTET STRING, 2 bytes
                0x02,0x00); // INTEGER 0
        let extension = Extension::new(oid(OID_CE_INHIBIT_ANY_POLICY), true, vec!(0x02,0x00));
        let der = yasna::encode_der(&extension);
        assert_eq!(der, expected);
        assert_eq!(yasna::parse_der(&der, Extension::decode_ber), Ok(extension));
    }

    #[test]
    fn extensions_should_be_found_by_oid () {
        let extensions = Extensions(vec!(
            Extension::new(oid(OID_CE_INHIBIT_ANY_POLICY), false, vec!(0x02,0x00)),
        ));
        assert!(extensions.get(&oid(OID_CE_INHIBIT_ANY_POLICY)).is_some());
        assert!(extensions.get(&oid(OID_CE_KEY_USAGE)).is_none());
    }
}
