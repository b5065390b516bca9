use crate::certificate::directory_string::{AttributeValue, StringType};
use crate::certificate::oids::{self, *};
use crate::certificate::relative_distinguished_name::{
    AttributeTypeAndValue,
    RelativeDistinguishedName,
};
use std::fmt;
use std::str::FromStr;
use yasna::{
    ASN1Result,
    DERWriter,
    DEREncodable,
    BERReader,
    BERDecodable,
    models::ObjectIdentifier,
};

//  Name ::= CHOICE { -- only one possibility for now --
//     rdnSequence  RDNSequence }
//  RDNSequence ::= SEQUENCE OF RelativeDistinguishedName
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Name {
    pub rdn_sequence: Vec<RelativeDistinguishedName>
}

impl Name {
    pub fn new(rdn_sequence: Vec<RelativeDistinguishedName>) -> Self {
        Name { rdn_sequence }
    }

    pub fn is_empty(&self) -> bool {
        self.rdn_sequence.is_empty()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &AttributeTypeAndValue> {
        self.rdn_sequence.iter().flat_map(|rdn| rdn.0.iter())
    }

    /// Every value of `attr_type`, in name order.
    pub fn values_of(&self, attr_type: &ObjectIdentifier) -> Vec<&AttributeValue> {
        self.attributes()
            .filter(|atv| &atv.attr_type == attr_type)
            .map(|atv| &atv.value)
            .collect()
    }

    pub fn first_value_of(&self, attr_type: &ObjectIdentifier) -> Option<&AttributeValue> {
        self.attributes()
            .find(|atv| &atv.attr_type == attr_type)
            .map(|atv| &atv.value)
    }

    /// Distinct attribute types, in order of first appearance.
    pub fn attribute_types(&self) -> Vec<ObjectIdentifier> {
        let mut types: Vec<ObjectIdentifier> = Vec::new();
        for atv in self.attributes() {
            if !types.contains(&atv.attr_type) {
                types.push(atv.attr_type.clone());
            }
        }
        types
    }
}

impl DEREncodable for Name {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            for rdn in self.rdn_sequence.iter() {
                rdn.encode_der(writer.next());
            }
        });
    }
}

impl BERDecodable for Name {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        let rdn_sequence = reader.collect_sequence_of(RelativeDistinguishedName::decode_ber)?;
        Ok(Name { rdn_sequence })
    }
}

/// String type used for an attribute when the text form gives no hint.
pub fn default_string_type(attr_type: &ObjectIdentifier) -> StringType {
    let components = attr_type.components().as_slice();
    if components == OID_AT_COUNTRY_NAME
        || components == OID_AT_SERIAL_NUMBER
        || components == OID_AT_DN_QUALIFIER
        || components == OID_PDA_COUNTRY_OF_CITIZENSHIP
        || components == OID_PDA_COUNTRY_OF_RESIDENCE {
        StringType::PrintableString
    } else if components == OID_PKCS9_EMAIL_ADDRESS || components == OID_DOMAIN_COMPONENT {
        StringType::Ia5String
    } else {
        StringType::Utf8String
    }
}

fn split_unescaped(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == separator {
            parts.push(current);
            current = String::new();
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if ",+=\\\"<>;".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Parses `C=DE,O=Acme,CN=Alice` into RDNs in the order written. `+` joins
/// attributes of a multi-valued RDN; `\` escapes a separator.
impl FromStr for Name {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rdn_sequence = Vec::new();
        if s.trim().is_empty() {
            return Ok(Name { rdn_sequence });
        }
        for rdn_text in split_unescaped(s, ',') {
            let mut builder = RelativeDistinguishedName::builder();
            for atv_text in split_unescaped(&rdn_text, '+') {
                let (attr_name, value) = atv_text
                    .split_once('=')
                    .ok_or_else(|| format!("'{}' is not of the form type=value", atv_text.trim()))?;
                let attr_type = oids::attribute_type_from_name(attr_name)
                    .ok_or_else(|| format!("unknown attribute type '{}'", attr_name.trim()))?;
                let value = unescape(value.trim());
                let value = default_string_type(&attr_type)
                    .value_of(&value)
                    .or_else(|_| StringType::Utf8String.value_of(&value))?;
                builder = builder.attribute(attr_type, value);
            }
            rdn_sequence.push(builder.build()?);
        }
        Ok(Name { rdn_sequence })
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rdns: Vec<String> = self.rdn_sequence.iter().map(|rdn| {
            rdn.0.iter().map(|atv| {
                let value = match &atv.value {
                    AttributeValue::Other(der) => format!("#{}", der.iter().map(|b| format!("{:02x}", b)).collect::<String>()),
                    value => escape(value.as_str().unwrap_or_default()),
                };
                format!("{}={}", oids::display_name(&atv.attr_type), value)
            }).collect::<Vec<_>>().join("+")
        }).collect();
        write!(f, "{}", rdns.join(","))
    }
}
