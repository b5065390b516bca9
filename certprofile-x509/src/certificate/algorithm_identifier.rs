use yasna::{
    ASN1Result,
    DERWriter,
    DEREncodable,
    BERReader,
    BERDecodable,
    models::ObjectIdentifier,
};

//  AlgorithmIdentifier  ::=  SEQUENCE  {
//       algorithm               OBJECT IDENTIFIER,
//       parameters              ANY DEFINED BY algorithm OPTIONAL  }
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AlgorithmIdentifier {
    pub algorithm: ObjectIdentifier,
    /// DER of the parameters, when present.
    pub parameters: Option<Vec<u8>>,
}

const DER_NULL : &'static [u8] = &[0x05, 0x00];

impl AlgorithmIdentifier {
    pub fn new(algorithm: ObjectIdentifier) -> Self {
        AlgorithmIdentifier { algorithm, parameters: None }
    }

    /// `{ algorithm, NULL }`, the form hash algorithm identifiers are written in.
    pub fn with_null_parameters(algorithm: ObjectIdentifier) -> Self {
        AlgorithmIdentifier { algorithm, parameters: Some(DER_NULL.to_vec()) }
    }

    pub fn has_absent_or_null_parameters(&self) -> bool {
        match &self.parameters {
            None => true,
            Some(der) => der.as_slice() == DER_NULL,
        }
    }
}

impl DEREncodable for AlgorithmIdentifier {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            writer.next().write_oid(&self.algorithm);
            if let Some(parameters) = &self.parameters {
                writer.next().write_der(parameters);
            }
        })
    }
}

impl BERDecodable for AlgorithmIdentifier {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        reader.read_sequence(|reader| {
            let algorithm = reader.next().read_oid()?;
            let parameters = reader.read_optional(|reader| reader.read_der())?;
            Ok(AlgorithmIdentifier { algorithm, parameters })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::oids::*;

    #[test]
    fn sha256_with_null_parameters_should_encode_correctly () {
        let expected = vec!(0x30,0x0d, // SEQUENCE, 13 bytes
            0x06,0x09, // OID, 9 bytes
                0x60,0x86,0x48,0x01,0x65,0x03,0x04,0x02,0x01, // encoding of OID(2.16.840.1.101.3.4.2.1)
            0x05,0x00); // NULL
        let algorithm = AlgorithmIdentifier::with_null_parameters(oid(OID_SHA256));
        assert_eq!(yasna::encode_der(&algorithm), expected);
    }

    #[test]
    fn absent_parameters_should_decode_as_none () {
        let asserted = vec!(0x30,0x0b, // SEQUENCE, 11 bytes
            0x06,0x09, // OID, 9 bytes
                0x60,0x86,0x48,0x01,0x65,0x03,0x04,0x02,0x01); // encoding of OID(2.16.840.1.101.3.4.2.1)
        let actual = yasna::parse_der(&asserted, AlgorithmIdentifier::decode_ber).unwrap();
        assert_eq!(actual, AlgorithmIdentifier::new(oid(OID_SHA256)));
        assert!(actual.has_absent_or_null_parameters());
    }
}
