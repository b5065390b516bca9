use std::str::FromStr;
use yasna::{DERWriter, DEREncodable};

//  KeyUsage ::= BIT STRING {
//       digitalSignature        (0),
//       nonRepudiation          (1), -- recent editions of X.509 have
//                                    -- renamed this bit to contentCommitment
//       keyEncipherment         (2),
//       dataEncipherment        (3),
//       keyAgreement            (4),
//       keyCertSign             (5),
//       cRLSign                 (6),
//       encipherOnly            (7),
//       decipherOnly            (8) }
#[derive(Copy,Clone,Ord,PartialOrd,Eq,PartialEq,Hash,Debug)]
pub enum KeyUsage {
    DigitalSignature,
    ContentCommitment,
    KeyEncipherment,
    DataEncipherment,
    KeyAgreement,
    KeyCertSign,
    CrlSign,
    EncipherOnly,
    DecipherOnly,
}

impl KeyUsage {
    fn bit(&self) -> usize {
        *self as usize
    }
}

impl FromStr for KeyUsage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use KeyUsage::*;
        match s.to_ascii_lowercase().as_str() {
            "digitalsignature" => Ok(DigitalSignature),
            "contentcommitment" | "nonrepudiation" => Ok(ContentCommitment),
            "keyencipherment" => Ok(KeyEncipherment),
            "dataencipherment" => Ok(DataEncipherment),
            "keyagreement" => Ok(KeyAgreement),
            "keycertsign" => Ok(KeyCertSign),
            "crlsign" => Ok(CrlSign),
            "encipheronly" => Ok(EncipherOnly),
            "decipheronly" => Ok(DecipherOnly),
            other => Err(format!("unknown key usage '{}'", other)),
        }
    }
}

#[derive(Clone,Debug,PartialEq,Eq)]
pub struct KeyUsages(pub Vec<KeyUsage>);

impl DEREncodable for KeyUsages {
    fn encode_der(&self, writer: DERWriter) {
        // named bit list, DER drops trailing zero bits
        let len = self.0.iter().map(|usage| usage.bit() + 1).max().unwrap_or(0);
        let mut bytes = vec![0u8; (len + 7) / 8];
        for usage in self.0.iter() {
            bytes[usage.bit() / 8] |= 0x80 >> (usage.bit() % 8);
        }
        writer.write_bitvec_bytes(&bytes, len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::extensions::Extension;
    use crate::certificate::oids::*;

    #[test]
    fn key_usage_with_digital_signature_and_content_commitment_should_encode_correctly () {
        let expected = vec!(0x30,0x0e, // SEQUENCE, 14 bytes
            0x06,0x03, // OID, 3 bytes
                0x55,0x1d,0x0f, // encoding of OID(2.5.29.15)
            0x01,0x01, // BOOL, 1 byte
                 0xff, // TRUE (is critical)
            0x04,0x04, // OCTET STRING 4 bytes
                 0x03,0x02, // BIT STRING, 2 bytes length
                    0x06,   // 6 unused bits
                    0xc0);  // b11000000
                            //  1   digitalSignature        (0),
                            //  1   nonRepudiation          (1),
        let ku = KeyUsages(vec!(KeyUsage::DigitalSignature, KeyUsage::ContentCommitment));
        let der = yasna::encode_der(&Extension::from_value(oid(OID_CE_KEY_USAGE), true, &ku));

        assert_eq!(der, expected);
    }

    #[test]
    fn key_usage_with_key_cert_sign_and_crl_sign_should_encode_correctly () {
        let expected = vec!(
            0x03,0x02, // BIT STRING, 2 bytes length
                0x01,   // 1 unused bit
                0x06);  // b00000110
                        //  1   keyCertSign             (5),
                        //  1   cRLSign                 (6),
        let ku = KeyUsages(vec!(KeyUsage::KeyCertSign, KeyUsage::CrlSign));
        assert_eq!(yasna::encode_der(&ku), expected);
    }

    #[test]
    fn key_usage_with_decipher_only_should_encode_correctly () {
        let expected = vec!(
            0x03,0x03, // BIT STRING, 3 bytes length
                0x07,   // 7 unused bits
                0x00,   // b00000000
                0x80);  //  1   decipherOnly            (8)
        let ku = KeyUsages(vec!(KeyUsage::DecipherOnly));
        assert_eq!(yasna::encode_der(&ku), expected);
    }

    #[test]
    fn key_usage_names_should_parse () {
        assert_eq!("nonRepudiation".parse(), Ok(KeyUsage::ContentCommitment));
        assert_eq!("keyCertSign".parse(), Ok(KeyUsage::KeyCertSign));
        assert!("sign".parse::<KeyUsage>().is_err());
    }
}
