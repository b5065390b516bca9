use std::str::FromStr;
use yasna::{
    ASN1Result,
    DERWriter,
    DEREncodable,
    BERReader,
    BERDecodable,
    tags::{TAG_UTF8STRING, TAG_PRINTABLESTRING, TAG_IA5STRING, TAG_BMPSTRING},
};

/// String types an attribute value may be written with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StringType {
    Utf8String,
    PrintableString,
    Ia5String,
    BmpString,
}

impl FromStr for StringType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8string" | "utf8" => Ok(StringType::Utf8String),
            "printablestring" | "printable" => Ok(StringType::PrintableString),
            "ia5string" | "ia5" => Ok(StringType::Ia5String),
            "bmpstring" | "bmp" => Ok(StringType::BmpString),
            other => Err(format!("unknown string type '{}'", other)),
        }
    }
}

impl StringType {
    /// Wraps `text` as a value of this type, rejecting characters the type
    /// cannot carry.
    pub fn value_of(self, text: &str) -> Result<AttributeValue, String> {
        match self {
            StringType::Utf8String => Ok(AttributeValue::Utf8String(text.to_string())),
            StringType::PrintableString if is_printable(text) =>
                Ok(AttributeValue::PrintableString(text.to_string())),
            StringType::PrintableString =>
                Err(format!("'{}' is not a PrintableString", text)),
            StringType::Ia5String if text.is_ascii() =>
                Ok(AttributeValue::Ia5String(text.to_string())),
            StringType::Ia5String =>
                Err(format!("'{}' is not an IA5String", text)),
            StringType::BmpString if text.chars().all(|c| (c as u32) < 0x10000) =>
                Ok(AttributeValue::BmpString(text.to_string())),
            StringType::BmpString =>
                Err(format!("'{}' is not a BMPString", text)),
        }
    }
}

/// X.680 PrintableString character set.
pub fn is_printable(text: &str) -> bool {
    text.chars().all(|c| {
        c.is_ascii_alphanumeric() || " '()+,-./:=?".contains(c)
    })
}

/// An attribute value as found in a Name or re-emitted into an extension.
/// Anything that is not one of the four directory string types is kept as its
/// raw DER encoding.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttributeValue {
    Utf8String(String),
    PrintableString(String),
    Ia5String(String),
    BmpString(String),
    Other(Vec<u8>),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        use AttributeValue::*;
        match self {
            Utf8String(s) | PrintableString(s) | Ia5String(s) | BmpString(s) => Some(s),
            Other(_) => None,
        }
    }

    pub fn string_type(&self) -> Option<StringType> {
        use AttributeValue::*;
        match self {
            Utf8String(_) => Some(StringType::Utf8String),
            PrintableString(_) => Some(StringType::PrintableString),
            Ia5String(_) => Some(StringType::Ia5String),
            BmpString(_) => Some(StringType::BmpString),
            Other(_) => None,
        }
    }
}

impl DEREncodable for AttributeValue {
    fn encode_der(&self, writer: DERWriter) {
        use AttributeValue::*;
        match self {
            Utf8String(s) => writer.write_utf8_string(s),
            PrintableString(s) => writer.write_printable_string(s),
            Ia5String(s) => writer.write_ia5_string(s),
            BmpString(s) => writer.write_bmp_string(s),
            Other(der) => writer.write_der(der),
        }
    }
}

impl BERDecodable for AttributeValue {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        let tag = reader.lookahead_tag()?;
        if tag == TAG_UTF8STRING {
            return Ok(AttributeValue::Utf8String(reader.read_utf8string()?))
        }
        if tag == TAG_PRINTABLESTRING {
            return Ok(AttributeValue::PrintableString(reader.read_printable_string()?))
        }
        if tag == TAG_IA5STRING {
            return Ok(AttributeValue::Ia5String(reader.read_ia5_string()?))
        }
        if tag == TAG_BMPSTRING {
            return Ok(AttributeValue::BmpString(reader.read_bmp_string()?))
        }
        Ok(AttributeValue::Other(reader.read_der()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_string_value_should_encode_correctly () {
        let expected = vec!(0x13,0x02, // PrintableString, 2 bytes
            0x44,0x45); // "DE"
        let value = StringType::PrintableString.value_of("DE").unwrap();
        assert_eq!(yasna::encode_der(&value), expected);
    }

    #[test]
    fn printable_string_should_reject_at_sign () {
        assert!(StringType::PrintableString.value_of("a@b.com").is_err());
        assert!(StringType::Ia5String.value_of("a@b.com").is_ok());
    }

    #[test]
    fn unknown_string_types_should_decode_as_raw_der () {
        let asserted = vec!(0x02,0x01, // INTEGER, 1 byte
            0x05); // 5
        let actual = yasna::parse_der(&asserted, AttributeValue::decode_ber);
        assert_eq!(actual, Ok(AttributeValue::Other(asserted.clone())));
        assert_eq!(actual.unwrap().as_str(), None);
    }

    #[test]
    fn utf8_string_value_should_decode_correctly () {
        let asserted = vec!(0x0c,0x05, // UTF8String, 5 bytes
            0x68,0x65,0x6c,0x6c,0x6f); // "hello"
        let actual = yasna::parse_der(&asserted, AttributeValue::decode_ber);
        assert_eq!(actual, Ok(AttributeValue::Utf8String("hello".to_string())));
    }
}
