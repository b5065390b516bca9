use yasna::{
    ASN1Result,
    DERWriter,
    DEREncodable,
    BERReader,
    BERDecodable,
    models::ObjectIdentifier,
};

//  Attribute ::= SEQUENCE {
//      type    AttributeType,
//      values  SET OF AttributeValue }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub attr_type: ObjectIdentifier,
    /// DER of each value.
    pub values: Vec<Vec<u8>>,
}

impl DEREncodable for Attribute {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            writer.next().write_oid(&self.attr_type);
            writer.next().write_set_of(|writer| {
                for value in self.values.iter() {
                    writer.next().write_der(value);
                }
            });
        })
    }
}

impl BERDecodable for Attribute {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        reader.read_sequence(|reader| {
            let attr_type = reader.next().read_oid()?;
            let values = reader.next().collect_set_of(|reader| reader.read_der())?;
            Ok(Attribute { attr_type, values })
        })
    }
}

//  SubjectDirectoryAttributes ::= SEQUENCE SIZE (1..MAX) OF Attribute
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SubjectDirectoryAttributes(pub Vec<Attribute>);

impl SubjectDirectoryAttributes {
    /// Every value of `attr_type`, across all attributes of that type.
    pub fn values_of(&self, attr_type: &ObjectIdentifier) -> Vec<&[u8]> {
        self.0.iter()
            .filter(|attribute| &attribute.attr_type == attr_type)
            .flat_map(|attribute| attribute.values.iter().map(|value| value.as_slice()))
            .collect()
    }
}

impl DEREncodable for SubjectDirectoryAttributes {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            for attribute in self.0.iter() {
                attribute.encode_der(writer.next());
            }
        })
    }
}

impl BERDecodable for SubjectDirectoryAttributes {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        Ok(SubjectDirectoryAttributes(reader.collect_sequence_of(Attribute::decode_ber)?))
    }
}
