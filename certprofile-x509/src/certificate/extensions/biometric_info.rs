use crate::certificate::algorithm_identifier::AlgorithmIdentifier;
use yasna::{
    ASN1Error,
    ASN1ErrorKind,
    ASN1Result,
    DERWriter,
    DEREncodable,
    BERReader,
    BERDecodable,
    models::ObjectIdentifier,
    tags::{TAG_INTEGER, TAG_OID},
};

//  TypeOfBiometricData ::= CHOICE {
//      predefinedBiometricType   PredefinedBiometricType,
//      biometricDataOid          OBJECT IDENTIFIER }
//  PredefinedBiometricType ::= INTEGER {
//      picture(0),handwritten-signature(1)}
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeOfBiometricData {
    Predefined(u32),
    Oid(ObjectIdentifier),
}

impl TypeOfBiometricData {
    pub const PICTURE : TypeOfBiometricData = TypeOfBiometricData::Predefined(0);
    pub const HANDWRITTEN_SIGNATURE : TypeOfBiometricData = TypeOfBiometricData::Predefined(1);
}

impl DEREncodable for TypeOfBiometricData {
    fn encode_der(&self, writer: DERWriter) {
        match self {
            TypeOfBiometricData::Predefined(value) => writer.write_u32(*value),
            TypeOfBiometricData::Oid(oid) => writer.write_oid(oid),
        }
    }
}

impl BERDecodable for TypeOfBiometricData {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        let tag = reader.lookahead_tag()?;
        if tag == TAG_INTEGER {
            return Ok(TypeOfBiometricData::Predefined(reader.read_u32()?))
        }
        if tag == TAG_OID {
            return Ok(TypeOfBiometricData::Oid(reader.read_oid()?))
        }
        Err(ASN1Error::new(ASN1ErrorKind::Invalid))
    }
}

//  BiometricData ::= SEQUENCE {
//      typeOfBiometricData  TypeOfBiometricData,
//      hashAlgorithm        AlgorithmIdentifier,
//      biometricDataHash    OCTET STRING,
//      sourceDataUri        IA5String OPTIONAL }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BiometricData {
    pub type_of_biometric_data: TypeOfBiometricData,
    pub hash_algorithm: AlgorithmIdentifier,
    pub biometric_data_hash: Vec<u8>,
    pub source_data_uri: Option<String>,
}

impl DEREncodable for BiometricData {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            self.type_of_biometric_data.encode_der(writer.next());
            self.hash_algorithm.encode_der(writer.next());
            writer.next().write_bytes(&self.biometric_data_hash);
            if let Some(uri) = &self.source_data_uri {
                writer.next().write_ia5_string(uri);
            }
        })
    }
}

impl BERDecodable for BiometricData {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        reader.read_sequence(|reader| {
            let type_of_biometric_data = TypeOfBiometricData::decode_ber(reader.next())?;
            let hash_algorithm = AlgorithmIdentifier::decode_ber(reader.next())?;
            let biometric_data_hash = reader.next().read_bytes()?;
            let source_data_uri = reader.read_optional(|reader| reader.read_ia5_string())?;
            Ok(BiometricData {
                type_of_biometric_data,
                hash_algorithm,
                biometric_data_hash,
                source_data_uri,
            })
        })
    }
}

//  BiometricSyntax ::= SEQUENCE OF BiometricData
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BiometricSyntax(pub Vec<BiometricData>);

impl DEREncodable for BiometricSyntax {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            for data in self.0.iter() {
                data.encode_der(writer.next());
            }
        })
    }
}

impl BERDecodable for BiometricSyntax {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        Ok(BiometricSyntax(reader.collect_sequence_of(BiometricData::decode_ber)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::oids::*;

    #[test]
    fn biometric_data_should_encode_correctly () {
        let expected = vec!(0x30,0x1b, // SEQUENCE, 27 bytes -- BiometricSyntax
            0x30,0x19, // SEQUENCE, 25 bytes -- BiometricData
                0x02,0x01, // INTEGER, 1 byte
                    0x00, // picture
                0x30,0x09, // SEQUENCE, 9 bytes -- AlgorithmIdentifier
                    0x06,0x05, // OID, 5 bytes
                        0x2b,0x0e,0x03,0x02,0x1a, // encoding of OID(1.3.14.3.2.26)
                    0x05,0x00, // NULL
                0x04,0x04, // OCTET STRING, 4 bytes
                    0x01,0x02,0x03,0x04, // hash, truncated for the test
                0x16,0x03, // IA5String, 3 bytes
                    0x75,0x72,0x69); // "uri"
        let data = BiometricSyntax(vec!(BiometricData {
            type_of_biometric_data: TypeOfBiometricData::PICTURE,
            hash_algorithm: AlgorithmIdentifier::with_null_parameters(oid(OID_SHA1)),
            biometric_data_hash: vec!(1,2,3,4),
            source_data_uri: Some("uri".to_string()),
        }));
        let der = yasna::encode_der(&data);
        assert_eq!(der, expected);
        assert_eq!(yasna::parse_der(&der, BiometricSyntax::decode_ber), Ok(data));
    }

    #[test]
    fn biometric_data_without_uri_should_decode () {
        let asserted = vec!(0x30,0x14, // SEQUENCE, 20 bytes -- BiometricData
            0x06,0x03, // OID, 3 bytes
                0x2a,0x03,0x04, // encoding of OID(1.2.3.4)
            0x30,0x07, // SEQUENCE, 7 bytes -- AlgorithmIdentifier, no parameters
                0x06,0x05, // OID, 5 bytes
                    0x2b,0x0e,0x03,0x02,0x1a, // encoding of OID(1.3.14.3.2.26)
            0x04,0x04, // OCTET STRING, 4 bytes
                0x01,0x02,0x03,0x04);
        let data = yasna::parse_der(&asserted, BiometricData::decode_ber).unwrap();
        assert_eq!(data.type_of_biometric_data, TypeOfBiometricData::Oid(oid(&[1,2,3,4])));
        assert_eq!(data.hash_algorithm.parameters, None);
        assert_eq!(data.source_data_uri, None);
    }
}
