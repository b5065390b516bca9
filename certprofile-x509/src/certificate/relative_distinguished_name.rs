use crate::certificate::directory_string::AttributeValue;
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

//  AttributeTypeAndValue ::= SEQUENCE {
//     type     AttributeType,
//     value    AttributeValue }
//  AttributeType ::= OBJECT IDENTIFIER
//  AttributeValue ::= ANY -- DEFINED BY AttributeType
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeTypeAndValue {
    pub attr_type: ObjectIdentifier,
    pub value: AttributeValue,
}

impl AttributeTypeAndValue {
    pub fn new(attr_type: ObjectIdentifier, value: AttributeValue) -> Self {
        AttributeTypeAndValue { attr_type, value }
    }
}

impl DEREncodable for AttributeTypeAndValue {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            writer.next().write_oid(&self.attr_type);
            self.value.encode_der(writer.next());
        });
    }
}

impl BERDecodable for AttributeTypeAndValue {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        reader.read_sequence(|atv| {
            let attr_type = atv.next().read_oid()?;
            let value = AttributeValue::decode_ber(atv.next())?;
            Ok(AttributeTypeAndValue { attr_type, value })
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RelativeDistinguishedNameBuilder {
    attributes: Vec<AttributeTypeAndValue>,
}

impl RelativeDistinguishedNameBuilder {
    pub fn attribute(mut self, attr_type: ObjectIdentifier, value: AttributeValue) -> Self {
        self.attributes.push(AttributeTypeAndValue::new(attr_type, value));
        self
    }

    pub fn build(self) -> Result<RelativeDistinguishedName, String> {
        if self.attributes.is_empty() {
            return Err("a relative distinguished name needs at least one attribute".to_string());
        }
        Ok(RelativeDistinguishedName(self.attributes))
    }
}

impl Default for RelativeDistinguishedNameBuilder {
    fn default() -> Self {
        RelativeDistinguishedNameBuilder {
            attributes: Vec::new(),
        }
    }
}

//  RelativeDistinguishedName ::=
//     SET SIZE (1..MAX) OF AttributeTypeAndValue
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RelativeDistinguishedName(pub Vec<AttributeTypeAndValue>);

impl RelativeDistinguishedName {
    pub fn builder() -> RelativeDistinguishedNameBuilder {
        RelativeDistinguishedNameBuilder::default()
    }

    pub fn single(attr_type: ObjectIdentifier, value: AttributeValue) -> Self {
        RelativeDistinguishedName(vec!(AttributeTypeAndValue::new(attr_type, value)))
    }

    pub fn attributes(&self) -> &[AttributeTypeAndValue] {
        &self.0
    }
}

impl BERDecodable for RelativeDistinguishedName {
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "RelativeDistinguishedName::decode_ber"))]
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        #[cfg(feature = "tracing")]
        debug!("parsing relative distinguished name");

        let atvs = reader.collect_set_of(AttributeTypeAndValue::decode_ber)?;
        Ok(RelativeDistinguishedName(atvs))
    }
}

impl DEREncodable for RelativeDistinguishedName {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_set_of(|writer| {
            for atv in self.0.iter() {
                atv.encode_der(writer.next());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::oids::*;

    #[test]
    fn rdn_should_decode_correctly () {
        let asserted = vec!(0x31,0x0e,// SET, 14 bytes
            0x30,0x0c, // SEQUENCE, 12 bytes
                0x06,0x03, // OID, 3 bytes
                    0x55,0x04,0x03, // encoding of OID(2.5.4.3)
                0x0c,0x05, // UTF8String, 5 bytes
                    0x68,0x65,0x6c,0x6c,0x6f); // "hello", in ut8 bytes
        let rdn = RelativeDistinguishedName::single(
            oid(OID_AT_COMMON_NAME),
            AttributeValue::Utf8String("hello".to_string()));
        let actual = yasna::parse_der(&asserted, RelativeDistinguishedName::decode_ber);
        assert_eq!(actual, Ok(rdn));
    }

    #[test]
    fn rdn_with_any_attribute_type_should_decode () {
        let asserted = vec!(0x31,0x0b,// SET, 11 bytes
            0x30,0x09, // SEQUENCE, 9 bytes
                0x06,0x03, // OID, 3 bytes
                    0x55,0x04,0x06, // encoding of OID(2.5.4.6)
                0x13,0x02, // PrintableString, 2 bytes
                    0x44,0x45); // "DE"
        let actual = yasna::parse_der(&asserted, RelativeDistinguishedName::decode_ber).unwrap();
        assert_eq!(actual.attributes()[0].attr_type, oid(OID_AT_COUNTRY_NAME));
        assert_eq!(actual.attributes()[0].value.as_str(), Some("DE"));
    }

    #[test]
    fn rdn_should_encode_correctly () {
        let expected = vec!(0x31,0x0e,// SET, 14 bytes
            0x30,0x0c, // SEQUENCE, 12 bytes
                0x06,0x03, // OID, 3 bytes
                    0x55,0x04,0x03, // encoding of OID(2.5.4.3)
                0x0c,0x05, // UTF8String, 5 bytes
                    0x68,0x65,0x6c,0x6c,0x6f); // "hello", in ut8 bytes
        let rdn = RelativeDistinguishedName::builder()
            .attribute(oid(OID_AT_COMMON_NAME), AttributeValue::Utf8String("hello".to_string()))
            .build()
            .unwrap();
        let der = yasna::encode_der(&rdn);
        assert_eq!(der, expected);
    }

    #[test]
    fn empty_rdn_should_fail_to_build () {
        assert!(RelativeDistinguishedName::builder().build().is_err());
    }
}
