use crate::conf::{RdnConf, SubjectConf};
use crate::error::{ConfigError, PolicyViolation};
use certprofile_x509::certificate::oids::{self, *};
use certprofile_x509::certificate::{
    default_string_type,
    AttributeTypeAndValue,
    AttributeValue,
    Name,
    RelativeDistinguishedName,
    StringType,
};
use regex::Regex;
use yasna::models::ObjectIdentifier;

/// Compiles a pattern so that it must match the whole value.
pub(crate) fn whole_value_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        details: e.to_string(),
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedValue {
    pub text: String,
    /// Whether a request may supply its own value instead.
    pub overridable: bool,
}

/// Occurrence and value rules for one subject attribute type.
#[derive(Clone, Debug)]
pub struct RdnControl {
    pub attr_type: ObjectIdentifier,
    pub min_occurs: u32,
    pub max_occurs: u32,
    pub value: Option<FixedValue>,
    pub string_type: StringType,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub pattern: Option<Regex>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub group: Option<String>,
    pub not_in_subject: bool,
}

impl RdnControl {
    pub fn compile(conf: &RdnConf) -> Result<Self, ConfigError> {
        let attr_type = oids::attribute_type_from_name(&conf.attr_type)
            .ok_or_else(|| ConfigError::UnknownAttributeType(conf.attr_type.clone()))?;
        let name = oids::display_name(&attr_type);

        let value = conf.value.as_ref().map(|value| FixedValue {
            text: value.text.clone(),
            overridable: value.overridable,
        });
        let (min_occurs, max_occurs) = match value {
            Some(_) => (1, 1),
            None => (conf.min_occurs.unwrap_or(1), conf.max_occurs.unwrap_or(1)),
        };
        if min_occurs > max_occurs {
            return Err(ConfigError::InvalidRange {
                field: format!("{} occurrences", name),
                min: min_occurs as i64,
                max: max_occurs as i64,
            });
        }

        let string_type = match &conf.string_type {
            Some(text) => text.parse::<StringType>().map_err(|details| ConfigError::InvalidValue {
                field: format!("{} string type", name),
                value: text.clone(),
                details,
            })?,
            None => default_string_type(&attr_type),
        };

        let is_country = attr_type.components().as_slice() == OID_AT_COUNTRY_NAME;
        let (min_len, max_len) = match (conf.min_len, conf.max_len) {
            (None, None) if is_country => (Some(2), Some(2)),
            lengths => lengths,
        };
        if let (Some(min), Some(max)) = (min_len, max_len) {
            if min > max {
                return Err(ConfigError::InvalidRange {
                    field: format!("{} length", name),
                    min: min as i64,
                    max: max as i64,
                });
            }
        }

        let pattern = conf.regex.as_deref().map(whole_value_pattern).transpose()?;

        let control = RdnControl {
            attr_type,
            min_occurs,
            max_occurs,
            value,
            string_type,
            min_len,
            max_len,
            pattern,
            prefix: conf.prefix.clone(),
            suffix: conf.suffix.clone(),
            group: conf.group.clone(),
            not_in_subject: conf.not_in_subject,
        };
        if let Some(fixed) = &control.value {
            control.render(&fixed.text).map_err(|details| ConfigError::InvalidValue {
                field: format!("{} value", name),
                value: fixed.text.clone(),
                details,
            })?;
        }
        Ok(control)
    }

    pub fn name(&self) -> String {
        oids::display_name(&self.attr_type)
    }

    /// Checks length and pattern on the value as given, then applies the
    /// prefix and suffix and encodes with the configured string type.
    fn render(&self, text: &str) -> Result<AttributeValue, String> {
        let len = text.chars().count();
        if let Some(min) = self.min_len {
            if len < min {
                return Err(format!("shorter than {} characters", min));
            }
        }
        if let Some(max) = self.max_len {
            if len > max {
                return Err(format!("longer than {} characters", max));
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(text) {
                return Err(format!("does not match {}", pattern.as_str()));
            }
        }
        let text = format!(
            "{}{}{}",
            self.prefix.as_deref().unwrap_or_default(),
            text,
            self.suffix.as_deref().unwrap_or_default()
        );
        self.string_type.value_of(&text)
    }
}

const CANONICAL_ORDER : &'static [&'static [u64]] = &[
    OID_AT_COUNTRY_NAME,
    OID_DOMAIN_COMPONENT,
    OID_AT_STATE_OR_PROVINCE_NAME,
    OID_AT_LOCALITY_NAME,
    OID_AT_STREET_ADDRESS,
    OID_AT_POSTAL_CODE,
    OID_AT_ORGANIZATION_NAME,
    OID_AT_ORGANIZATION_IDENTIFIER,
    OID_AT_ORGANIZATIONAL_UNIT_NAME,
    OID_AT_TITLE,
    OID_AT_SURNAME,
    OID_AT_GIVEN_NAME,
    OID_AT_INITIALS,
    OID_AT_GENERATION_QUALIFIER,
    OID_AT_PSEUDONYM,
    OID_AT_SERIAL_NUMBER,
    OID_AT_DN_QUALIFIER,
    OID_AT_COMMON_NAME,
    OID_USER_ID,
    OID_PKCS9_EMAIL_ADDRESS,
];

fn canonical_rank(attr_type: &ObjectIdentifier) -> usize {
    let components = attr_type.components().as_slice();
    CANONICAL_ORDER
        .iter()
        .position(|candidate| *candidate == components)
        .unwrap_or(CANONICAL_ORDER.len())
}

/// Compiled subject rules.
#[derive(Clone, Debug, Default)]
pub struct SubjectControl {
    pub keep_rdn_order: bool,
    pub controls: Vec<RdnControl>,
}

impl SubjectControl {
    pub fn compile(conf: &SubjectConf) -> Result<Self, ConfigError> {
        let mut controls: Vec<RdnControl> = Vec::with_capacity(conf.rdns.len());
        for rdn in conf.rdns.iter() {
            let control = RdnControl::compile(rdn)?;
            if controls.iter().any(|existing| existing.attr_type == control.attr_type) {
                return Err(ConfigError::DuplicateAttribute { attribute: control.name() });
            }
            controls.push(control);
        }
        Ok(SubjectControl { keep_rdn_order: conf.keep_rdn_order, controls })
    }

    pub fn control(&self, attr_type: &ObjectIdentifier) -> Option<&RdnControl> {
        self.controls.iter().find(|control| &control.attr_type == attr_type)
    }

    /// `mirrored` lists the attribute types only carried into
    /// subjectAltName; these need no control of their own.
    pub fn validate(&self, requested: &Name, mirrored: &[ObjectIdentifier]) -> Result<(), PolicyViolation> {
        for attr_type in requested.attribute_types() {
            let control = match self.control(&attr_type) {
                Some(control) => control,
                None if mirrored.contains(&attr_type) => continue,
                None => return Err(PolicyViolation::DisallowedAttribute {
                    attribute: oids::display_name(&attr_type),
                }),
            };
            if let Some(FixedValue { overridable: false, .. }) = control.value {
                return Err(PolicyViolation::AttributeNotOverridable { attribute: control.name() });
            }
            let occurrences = requested.values_of(&attr_type).len();
            if occurrences < control.min_occurs as usize || occurrences > control.max_occurs as usize {
                return Err(PolicyViolation::OccurrenceOutOfRange {
                    attribute: control.name(),
                    occurrences,
                    min: control.min_occurs,
                    max: control.max_occurs,
                });
            }
        }
        for control in self.controls.iter() {
            if control.min_occurs > 0
                && control.value.is_none()
                && requested.first_value_of(&control.attr_type).is_none() {
                return Err(PolicyViolation::MissingRequiredAttribute { attribute: control.name() });
            }
        }
        Ok(())
    }

    fn values_for(&self, control: &RdnControl, requested: &Name) -> Result<Vec<AttributeValue>, PolicyViolation> {
        let texts: Vec<String> = match &control.value {
            Some(FixedValue { text, overridable: false }) => vec!(text.clone()),
            fixed => {
                let mut texts = Vec::new();
                for value in requested.values_of(&control.attr_type) {
                    let text = value.as_str().ok_or_else(|| PolicyViolation::InvalidAttributeValue {
                        attribute: control.name(),
                        value: format!("{:?}", value),
                        details: "not a directory string".to_string(),
                    })?;
                    texts.push(text.trim().to_string());
                }
                match fixed {
                    Some(FixedValue { text, .. }) if texts.is_empty() => vec!(text.clone()),
                    _ => texts,
                }
            },
        };
        texts
            .iter()
            .map(|text| control.render(text).map_err(|details| PolicyViolation::InvalidAttributeValue {
                attribute: control.name(),
                value: text.clone(),
                details,
            }))
            .collect()
    }

    /// Builds the subject the certificate is issued with. The request is
    /// expected to have passed `validate`.
    pub fn grant(&self, requested: &Name) -> Result<Name, PolicyViolation> {
        let mut ordered: Vec<&RdnControl> = self.controls.iter().filter(|c| !c.not_in_subject).collect();
        if !self.keep_rdn_order {
            ordered.sort_by_key(|control| canonical_rank(&control.attr_type));
        }

        let mut rdn_sequence = Vec::new();
        let mut done_groups: Vec<&str> = Vec::new();
        for control in ordered.iter() {
            match control.group.as_deref() {
                None => {
                    for value in self.values_for(control, requested)? {
                        rdn_sequence.push(RelativeDistinguishedName::single(control.attr_type.clone(), value));
                    }
                },
                Some(group) if done_groups.contains(&group) => {},
                Some(group) => {
                    done_groups.push(group);
                    let mut members: Vec<(ObjectIdentifier, Vec<AttributeValue>)> = Vec::new();
                    for member in ordered.iter().filter(|c| c.group.as_deref() == Some(group)) {
                        members.push((member.attr_type.clone(), self.values_for(member, requested)?));
                    }
                    let rows = members.iter().map(|(_, values)| values.len()).max().unwrap_or(0);
                    for row in 0..rows {
                        let attributes: Vec<AttributeTypeAndValue> = members
                            .iter()
                            .filter_map(|(attr_type, values)| values
                                .get(row)
                                .map(|value| AttributeTypeAndValue::new(attr_type.clone(), value.clone())))
                            .collect();
                        rdn_sequence.push(RelativeDistinguishedName(attributes));
                    }
                },
            }
        }
        Ok(Name::new(rdn_sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(json: &str) -> SubjectControl {
        let conf: SubjectConf = serde_json::from_str(json).unwrap();
        SubjectControl::compile(&conf).unwrap()
    }

    fn name(text: &str) -> Name {
        text.parse().unwrap()
    }

    #[test]
    fn occurrences_should_default_to_one () {
        let control = subject(r#"{"rdns": [{"type": "CN"}]}"#);
        assert_eq!((control.controls[0].min_occurs, control.controls[0].max_occurs), (1, 1));
        assert_eq!(control.controls[0].string_type, StringType::Utf8String);
    }

    #[test]
    fn country_should_default_to_two_printable_characters () {
        let control = subject(r#"{"rdns": [{"type": "C"}]}"#);
        assert_eq!((control.controls[0].min_len, control.controls[0].max_len), (Some(2), Some(2)));
        assert_eq!(control.controls[0].string_type, StringType::PrintableString);
    }

    #[test]
    fn inverted_occurrences_should_fail () {
        let conf: SubjectConf = serde_json::from_str(r#"{"rdns": [{"type": "OU", "min_occurs": 2, "max_occurs": 1}]}"#).unwrap();
        assert!(matches!(SubjectControl::compile(&conf), Err(ConfigError::InvalidRange { .. })));
    }

    #[test]
    fn duplicate_attribute_should_fail () {
        let conf: SubjectConf = serde_json::from_str(r#"{"rdns": [{"type": "CN"}, {"type": "commonName"}]}"#).unwrap();
        assert_eq!(
            SubjectControl::compile(&conf).unwrap_err(),
            ConfigError::DuplicateAttribute { attribute: "CN".to_string() }
        );
    }

    #[test]
    fn malformed_pattern_should_fail () {
        let conf: SubjectConf = serde_json::from_str(r#"{"rdns": [{"type": "CN", "regex": "(a"}]}"#).unwrap();
        assert!(matches!(SubjectControl::compile(&conf), Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn unknown_attribute_should_be_disallowed () {
        let control = subject(r#"{"rdns": [{"type": "CN"}]}"#);
        assert_eq!(
            control.validate(&name("CN=a,L=Berlin"), &[]),
            Err(PolicyViolation::DisallowedAttribute { attribute: "L".to_string() })
        );
    }

    #[test]
    fn mirrored_attribute_should_be_allowed_without_control () {
        let control = subject(r#"{"rdns": [{"type": "CN"}]}"#);
        let email = oids::oid(OID_PKCS9_EMAIL_ADDRESS);
        assert_eq!(control.validate(&name("CN=a,emailAddress=a@b.com"), &[email]), Ok(()));
    }

    #[test]
    fn fixed_value_should_not_be_overridden () {
        let control = subject(r#"{"rdns": [{"type": "O", "value": {"text": "Acme"}}, {"type": "CN"}]}"#);
        assert_eq!(
            control.validate(&name("O=Evil,CN=a"), &[]),
            Err(PolicyViolation::AttributeNotOverridable { attribute: "O".to_string() })
        );
    }

    #[test]
    fn occurrences_should_be_bounded () {
        let control = subject(r#"{"rdns": [{"type": "OU", "min_occurs": 0, "max_occurs": 2}, {"type": "CN"}]}"#);
        assert_eq!(
            control.validate(&name("OU=a,OU=b,OU=c,CN=x"), &[]),
            Err(PolicyViolation::OccurrenceOutOfRange {
                attribute: "OU".to_string(), occurrences: 3, min: 0, max: 2,
            })
        );
        assert_eq!(control.validate(&name("CN=x"), &[]), Ok(()));
    }

    #[test]
    fn required_attribute_should_be_present () {
        let control = subject(r#"{"rdns": [{"type": "O", "min_occurs": 0}, {"type": "CN"}]}"#);
        assert_eq!(
            control.validate(&name("O=Acme"), &[]),
            Err(PolicyViolation::MissingRequiredAttribute { attribute: "CN".to_string() })
        );
    }

    #[test]
    fn granted_subject_should_follow_canonical_order () {
        let control = subject(r#"{"rdns": [
            {"type": "CN"},
            {"type": "O", "value": {"text": "Acme"}},
            {"type": "C"}
        ]}"#);
        let granted = control.grant(&name("CN=alice,C=DE")).unwrap();
        assert_eq!(granted.to_string(), "C=DE,O=Acme,CN=alice");
        assert_eq!(granted.first_value_of(&oids::oid(OID_AT_COUNTRY_NAME)),
            Some(&AttributeValue::PrintableString("DE".to_string())));
    }

    #[test]
    fn kept_order_should_follow_controls () {
        let control = subject(r#"{"keep_rdn_order": true, "rdns": [{"type": "CN"}, {"type": "C"}]}"#);
        let granted = control.grant(&name("C=DE,CN=alice")).unwrap();
        assert_eq!(granted.to_string(), "CN=alice,C=DE");
    }

    #[test]
    fn prefix_should_be_applied_after_pattern_check () {
        let control = subject(r#"{"rdns": [{"type": "serialNumber", "regex": "[0-9]+", "prefix": "ID-"}]}"#);
        let granted = control.grant(&name("serialNumber=1234")).unwrap();
        assert_eq!(granted.to_string(), "serialNumber=ID-1234");
        assert!(matches!(
            control.grant(&name("serialNumber=12a4")),
            Err(PolicyViolation::InvalidAttributeValue { .. })
        ));
    }

    #[test]
    fn grouped_controls_should_share_one_rdn () {
        let control = subject(r#"{"keep_rdn_order": true, "rdns": [
            {"type": "givenName", "group": "person"},
            {"type": "surname", "group": "person"},
            {"type": "CN", "not_in_subject": true, "min_occurs": 0}
        ]}"#);
        let granted = control.grant(&name("givenName=Ada,surname=Lovelace,CN=ada")).unwrap();
        assert_eq!(granted.rdn_sequence.len(), 1);
        assert_eq!(granted.to_string(), "givenName=Ada+surname=Lovelace");
    }

    #[test]
    fn printable_type_should_reject_other_characters () {
        let control = subject(r#"{"rdns": [{"type": "CN", "string_type": "printableString"}]}"#);
        assert!(matches!(
            control.grant(&name("CN=a@b")),
            Err(PolicyViolation::InvalidAttributeValue { .. })
        ));
    }
}
