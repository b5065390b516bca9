use crate::conf::SyntaxConf;
use crate::error::{ConfigError, PolicyViolation};
use crate::profile::subject::whole_value_pattern;
use regex::Regex;
use yasna::{ASN1Error, ASN1ErrorKind, ASN1Result, BERReader, Tag};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Boolean,
    Integer,
    Null,
    Oid,
    OctetString,
    BitString,
    Utf8String,
    PrintableString,
    Ia5String,
    BmpString,
    GeneralizedTime,
    UtcTime,
    Sequence,
    SequenceOf,
    SetOf,
    Any,
}

impl FieldType {
    fn parse(text: &str) -> Option<Self> {
        use FieldType::*;
        let normalized: String = text.chars().filter(|c| !c.is_whitespace() && *c != '_').collect();
        Some(match normalized.to_ascii_uppercase().as_str() {
            "BOOLEAN" => Boolean,
            "INTEGER" => Integer,
            "NULL" => Null,
            "OID" | "OBJECTIDENTIFIER" => Oid,
            "OCTETSTRING" => OctetString,
            "BITSTRING" => BitString,
            "UTF8STRING" => Utf8String,
            "PRINTABLESTRING" => PrintableString,
            "IA5STRING" => Ia5String,
            "BMPSTRING" => BmpString,
            "GENERALIZEDTIME" => GeneralizedTime,
            "UTCTIME" => UtcTime,
            "SEQUENCE" => Sequence,
            "SEQUENCEOF" => SequenceOf,
            "SETOF" => SetOf,
            "ANY" => Any,
            _ => return None,
        })
    }

    fn is_string(&self) -> bool {
        use FieldType::*;
        matches!(self, Utf8String | PrintableString | Ia5String | BmpString)
    }
}

/// Accepted ASN.1 shape of a passthrough extension value.
#[derive(Clone, Debug)]
pub struct ExtnSyntax {
    pub field_type: FieldType,
    /// Context tag number and whether it is explicit.
    pub tag: Option<(u64, bool)>,
    pub pattern: Option<Regex>,
    pub sub_fields: Vec<ExtnSyntax>,
    pub required: bool,
}

impl ExtnSyntax {
    pub fn compile(extension: &str, conf: &SyntaxConf) -> Result<Self, ConfigError> {
        let invalid = |details: String| ConfigError::InvalidExtension { extension: extension.to_string(), details };
        let field_type = FieldType::parse(&conf.syntax_type)
            .ok_or_else(|| invalid(format!("unknown syntax type '{}'", conf.syntax_type)))?;
        let tag = conf.tag.as_ref().map(|tag| (tag.value, tag.explicit));
        if field_type == FieldType::Any && tag.map_or(false, |(_, explicit)| !explicit) {
            return Err(invalid("ANY cannot be implicitly tagged".to_string()));
        }
        let pattern = match &conf.string_regex {
            Some(_) if !field_type.is_string() =>
                return Err(invalid(format!("a pattern applies to string types only, not {:?}", field_type))),
            Some(regex) => Some(whole_value_pattern(regex)?),
            None => None,
        };
        let sub_fields = conf.sub_fields
            .iter()
            .map(|sub_field| ExtnSyntax::compile(extension, sub_field))
            .collect::<Result<Vec<_>, _>>()?;
        match field_type {
            FieldType::Sequence => (),
            FieldType::SequenceOf | FieldType::SetOf if sub_fields.len() == 1 => (),
            FieldType::SequenceOf | FieldType::SetOf =>
                return Err(invalid(format!("{:?} needs exactly one element syntax", field_type))),
            _ if !sub_fields.is_empty() =>
                return Err(invalid(format!("{:?} cannot have sub-fields", field_type))),
            _ => (),
        }
        Ok(ExtnSyntax { field_type, tag, pattern, sub_fields, required: conf.required })
    }

    fn matches(&self, text: &str) -> ASN1Result<()> {
        match &self.pattern {
            Some(pattern) if !pattern.is_match(text) => Err(ASN1Error::new(ASN1ErrorKind::Invalid)),
            _ => Ok(()),
        }
    }

    fn check_untagged(&self, reader: BERReader) -> ASN1Result<()> {
        use FieldType::*;
        match self.field_type {
            Boolean => reader.read_bool().map(|_| ()),
            Integer => reader.read_bigint().map(|_| ()),
            Null => reader.read_null(),
            Oid => reader.read_oid().map(|_| ()),
            OctetString => reader.read_bytes().map(|_| ()),
            BitString => reader.read_bitvec_bytes().map(|_| ()),
            Utf8String => self.matches(&reader.read_utf8string()?),
            PrintableString => self.matches(&reader.read_printable_string()?),
            Ia5String => self.matches(&reader.read_ia5_string()?),
            BmpString => self.matches(&reader.read_bmp_string()?),
            GeneralizedTime => reader.read_generalized_time().map(|_| ()),
            UtcTime => reader.read_utctime().map(|_| ()),
            Sequence => reader.read_sequence(|reader| {
                for field in self.sub_fields.iter() {
                    if field.required {
                        field.check(reader.next())?;
                    } else {
                        reader.read_optional(|reader| field.check(reader))?;
                    }
                }
                Ok(())
            }),
            SequenceOf => reader.read_sequence_of(|reader| self.sub_fields[0].check(reader)),
            SetOf => reader.read_set_of(|reader| self.sub_fields[0].check(reader)),
            Any => reader.read_der().map(|_| ()),
        }
    }

    fn check(&self, reader: BERReader) -> ASN1Result<()> {
        match self.tag {
            None => self.check_untagged(reader),
            Some((number, true)) => reader.read_tagged(Tag::context(number), |reader| self.check_untagged(reader)),
            Some((number, false)) => reader.read_tagged_implicit(Tag::context(number), |reader| self.check_untagged(reader)),
        }
    }

    /// Checks the request's value. A conforming value is emitted unchanged.
    pub fn resolve(&self, extension: &str, requested: Option<&[u8]>) -> Result<Vec<u8>, PolicyViolation> {
        let value = requested.ok_or_else(|| PolicyViolation::MissingRequestInput {
            extension: extension.to_string(),
            details: "the request does not carry the extension".to_string(),
        })?;
        yasna::parse_der(value, |reader| self.check(reader)).map_err(|e| PolicyViolation::MalformedRequestExtension {
            extension: extension.to_string(),
            details: format!("value does not conform to the declared syntax: {}", e),
        })?;
        Ok(value.to_vec())
    }
}
