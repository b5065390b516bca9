use yasna::{DERWriter, DEREncodable};
use yasna::models::ObjectIdentifier;

//  ValidityModel ::= SEQUENCE {
//      validityModelId OBJECT IDENTIFIER,
//      validityModelInfo ANY DEFINED BY validityModelId OPTIONAL }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidityModel(pub ObjectIdentifier);

impl DEREncodable for ValidityModel {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            writer.next().write_oid(&self.0);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::oids::*;

    #[test]
    fn chain_model_should_encode_correctly () {
        let expected = vec!(0x30,0x0c, // SEQUENCE, 12 bytes
            0x06,0x0a, // OID, 10 bytes
                0x2b,0x06,0x01,0x04,0x01,0xc0,0x6d,0x03,0x05,0x01); // encoding of OID(1.3.6.1.4.1.8301.3.5.1)
        let model = ValidityModel(oid(OID_VALIDITY_MODEL_CHAIN));
        assert_eq!(yasna::encode_der(&model), expected);
    }
}
