use crate::certificate::directory_string::{is_printable, AttributeValue};
use std::fmt;
use std::str::FromStr;
use yasna::{
    ASN1Error,
    ASN1ErrorKind,
    ASN1Result,
    BERDecodable,
    BERReader,
    DERWriter,
    DEREncodable,
    Tag,
};

//  IdentityCode ::= CHOICE {
//      residenterCardNumber     [0] PrintableString (SIZE (1..20)),
//      militaryOfficerCardNumber [1] UTF8String (SIZE (1..20)),
//      passportNumber           [2] PrintableString (SIZE (1..20)) }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityCode {
    tag: u8,
    code: String,
}

impl IdentityCode {
    pub fn new(tag: u8, code: String) -> Result<Self, String> {
        if tag > 2 {
            return Err(format!("identity code tag [{}] is not one of [0], [1], [2]", tag));
        }
        if code.is_empty() {
            return Err("identity code is empty".to_string());
        }
        if tag != 1 && !is_printable(&code) {
            return Err(format!("identity code '{}' is not a PrintableString", code));
        }
        Ok(IdentityCode { tag, code })
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Decodes a whole IdentityCode element, explicitly tagged or with the
    /// tag applied implicitly to the string.
    pub fn from_der(der: &[u8]) -> ASN1Result<Self> {
        let identifier = *der.first().ok_or(ASN1Error::new(ASN1ErrorKind::Eof))?;
        if identifier & 0xc0 != 0x80 {
            return Err(ASN1Error::new(ASN1ErrorKind::Invalid));
        }
        let tag = identifier & 0x1f;
        if tag > 2 {
            return Err(ASN1Error::new(ASN1ErrorKind::Invalid));
        }
        let constructed = identifier & 0x20 != 0;
        let code = yasna::parse_der(der, |reader| {
            if constructed {
                reader.read_tagged(Tag::context(tag as u64), |reader| read_code(tag, reader))
            } else {
                reader.read_tagged_implicit(Tag::context(tag as u64), |reader| read_code(tag, reader))
            }
        })?;
        IdentityCode::new(tag, code).map_err(|_| ASN1Error::new(ASN1ErrorKind::Invalid))
    }
}

fn read_code(tag: u8, reader: BERReader) -> ASN1Result<String> {
    if tag == 1 {
        reader.read_utf8string()
    } else {
        reader.read_printable_string()
    }
}

impl DEREncodable for IdentityCode {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_tagged(Tag::context(self.tag as u64), |writer| {
            if self.tag == 1 {
                writer.write_utf8_string(&self.code)
            } else {
                writer.write_printable_string(&self.code)
            }
        })
    }
}

/// The `[tag]code` text form, e.g. `[2]E12345678`.
impl FromStr for IdentityCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || format!("'{}' is not of the form [tag]code", s);
        let rest = s.strip_prefix('[').ok_or_else(malformed)?;
        let (tag, code) = rest.split_once(']').ok_or_else(malformed)?;
        if tag.len() != 1 || !tag.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let tag = tag.parse::<u8>().map_err(|_| malformed())?;
        IdentityCode::new(tag, code.to_string())
    }
}

impl fmt::Display for IdentityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.tag, self.code)
    }
}

/// Insurance, IC registration, organization and taxation numbers: written as
/// PrintableString, read from any directory string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gmt0015Code(pub String);

impl DEREncodable for Gmt0015Code {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_printable_string(&self.0)
    }
}

impl BERDecodable for Gmt0015Code {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        match AttributeValue::decode_ber(reader)?.as_str() {
            Some(code) => Ok(Gmt0015Code(code.to_string())),
            None => Err(ASN1Error::new(ASN1ErrorKind::Invalid)),
        }
    }
}
