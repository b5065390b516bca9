use std::str::FromStr;
use yasna::{
    ASN1Error,
    ASN1ErrorKind,
    ASN1Result,
    DERWriter,
    DEREncodable,
    BERReader,
    BERDecodable,
    Tag
};

//  Version  ::=  INTEGER  {  v1(0), v2(1), v3(2)  }
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum X509Version {
    V1,
    V2,
    V3,
}

impl Default for X509Version {
    fn default() -> Self {
        X509Version::V3
    }
}

impl X509Version {
    fn value(&self) -> u8 {
        match self {
            X509Version::V1 => 0,
            X509Version::V2 => 1,
            X509Version::V3 => 2,
        }
    }
}

impl FromStr for X509Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(X509Version::V1),
            "v2" | "2" => Ok(X509Version::V2),
            "v3" | "3" => Ok(X509Version::V3),
            other => Err(format!("unknown certificate version '{}'", other)),
        }
    }
}

impl DEREncodable for X509Version {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_tagged(Tag::context(0), |writer| {
            writer.write_u8(self.value())
        })
    }
}

impl BERDecodable for X509Version {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        let ver = reader.read_tagged(Tag::context(0), |reader| {
            reader.read_u8()
        })?;
        match ver {
            0 => Ok(X509Version::V1),
            1 => Ok(X509Version::V2),
            2 => Ok(X509Version::V3),
            _ => Err(ASN1Error::new(ASN1ErrorKind::Invalid)),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn x509_v3_should_encode_correctly () {
        let expected = vec!(
            0xa0,0x03, // [0] EXPLICIT  TAG
                0x02,0x01, // INTEGER, 1 byte
                    0x02); // integer value of 2
        let der = yasna::encode_der(&X509Version::V3);
        assert_eq!(der, expected);
    }

    #[test]
    fn x509_v2_should_decode_correctly() {
        let asserted = vec!(
            0xa0,0x03, // [0] EXPLICIT  TAG
                0x02,0x01, // INTEGER, 1 byte
                    0x01); // integer value of 1
        let actual = yasna::parse_der(&asserted, X509Version::decode_ber);
        assert_eq!(actual, Ok(X509Version::V2));
    }

    #[test]
    fn x509_v4_should_fail() {
        let asserted = vec!(
            0xa0,0x03, // [0] EXPLICIT  TAG
                0x02,0x01, // INTEGER, 1 byte
                    0x03); // integer value of 3
        let expected = Err(ASN1Error::new(ASN1ErrorKind::Invalid));

        let actual = yasna::parse_der(&asserted, X509Version::decode_ber);
        assert_eq!(actual, expected);
    }

    #[test]
    fn versions_should_parse_by_name () {
        assert_eq!("v3".parse(), Ok(X509Version::V3));
        assert_eq!("1".parse(), Ok(X509Version::V1));
        assert!("v4".parse::<X509Version>().is_err());
    }
}
