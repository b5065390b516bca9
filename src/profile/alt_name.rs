use crate::conf::{GeneralNameConf, SubjectToAltNameConf};
use crate::error::{ConfigError, PolicyViolation};
use crate::profile::controls::parse_oid;
use certprofile_x509::certificate::extensions::Extension;
use certprofile_x509::certificate::oids;
use certprofile_x509::certificate::{GeneralName, GeneralNameTag, GeneralNames, Name};
use std::net::IpAddr;
use yasna::BERDecodable;
use yasna::models::ObjectIdentifier;

/// One accepted general name shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneralNameMode {
    pub tag: GeneralNameTag,
    /// Accepted otherName type ids, any when empty.
    pub other_name_types: Vec<ObjectIdentifier>,
}

impl GeneralNameMode {
    fn permits(&self, name: &GeneralName) -> bool {
        if name.tag() != self.tag {
            return false;
        }
        match name {
            GeneralName::OtherName { type_id, .. } =>
                self.other_name_types.is_empty() || self.other_name_types.contains(type_id),
            _ => true,
        }
    }
}

/// `None` accepts every shape.
pub type GeneralNameModes = Option<Vec<GeneralNameMode>>;

pub fn compile_modes(conf: &GeneralNameConf) -> Result<GeneralNameModes, ConfigError> {
    if conf.modes.is_empty() {
        return Ok(None);
    }
    let mut modes = Vec::with_capacity(conf.modes.len());
    for mode in conf.modes.iter() {
        let tag = mode.tag.parse::<GeneralNameTag>().map_err(|details| ConfigError::InvalidValue {
            field: "general name mode".to_string(),
            value: mode.tag.clone(),
            details,
        })?;
        let other_name_types = mode.other_name_types
            .iter()
            .map(|text| parse_oid(text))
            .collect::<Result<Vec<_>, _>>()?;
        modes.push(GeneralNameMode { tag, other_name_types });
    }
    Ok(Some(modes))
}

pub fn permits(modes: &GeneralNameModes, name: &GeneralName) -> bool {
    match modes {
        None => true,
        Some(modes) => modes.iter().any(|mode| mode.permits(name)),
    }
}

pub fn has_tag(modes: &GeneralNameModes, tag: GeneralNameTag) -> bool {
    match modes {
        None => true,
        Some(modes) => modes.iter().any(|mode| mode.tag == tag),
    }
}

const MIRROR_TARGETS : &'static [GeneralNameTag] = &[
    GeneralNameTag::Rfc822Name,
    GeneralNameTag::DnsName,
    GeneralNameTag::UniformResourceIdentifier,
    GeneralNameTag::IpAddress,
    GeneralNameTag::DirectoryName,
    GeneralNameTag::RegisteredId,
];

/// Copies every value of a subject attribute into subjectAltName.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectToAltNameRule {
    pub source: ObjectIdentifier,
    pub target: GeneralNameTag,
}

impl SubjectToAltNameRule {
    pub fn compile(conf: &SubjectToAltNameConf) -> Result<Self, ConfigError> {
        let source = oids::attribute_type_from_name(&conf.source)
            .ok_or_else(|| ConfigError::UnknownAttributeType(conf.source.clone()))?;
        let target = conf.target.parse::<GeneralNameTag>().map_err(|details| ConfigError::InvalidAltNameTarget {
            attribute: oids::display_name(&source),
            target: conf.target.clone(),
            details,
        })?;
        if !MIRROR_TARGETS.contains(&target) {
            return Err(ConfigError::InvalidAltNameTarget {
                attribute: oids::display_name(&source),
                target: target.to_string(),
                details: "subject values cannot be mirrored into this general name type".to_string(),
            });
        }
        Ok(SubjectToAltNameRule { source, target })
    }

    fn general_name(&self, text: &str) -> Result<GeneralName, String> {
        let name = match self.target {
            GeneralNameTag::Rfc822Name => GeneralName::Rfc822Name(text.to_lowercase()),
            GeneralNameTag::DnsName => GeneralName::DnsName(text.to_string()),
            GeneralNameTag::UniformResourceIdentifier => GeneralName::UniformResourceIdentifier(text.to_string()),
            GeneralNameTag::IpAddress => text
                .parse::<IpAddr>()
                .map(GeneralName::from)
                .map_err(|e| e.to_string())?,
            GeneralNameTag::DirectoryName => GeneralName::DirectoryName(text.parse::<Name>()?),
            GeneralNameTag::RegisteredId => oids::parse_dotted(text)
                .map(GeneralName::RegisteredId)
                .ok_or_else(|| "not an object identifier".to_string())?,
            other => return Err(format!("cannot mirror into {}", other)),
        };
        name.check_charset()?;
        Ok(name)
    }

    /// Names for this rule, read from the granted subject or, when it has
    /// none, from the requested one.
    pub fn derive(&self, granted: &Name, requested: &Name) -> Result<Vec<GeneralName>, PolicyViolation> {
        let mut values = granted.values_of(&self.source);
        if values.is_empty() {
            values = requested.values_of(&self.source);
        }
        let mut names = Vec::with_capacity(values.len());
        for value in values {
            let invalid = |details: String| PolicyViolation::InvalidAttributeValue {
                attribute: oids::display_name(&self.source),
                value: value.as_str().unwrap_or_default().to_string(),
                details,
            };
            let text = value.as_str().ok_or_else(|| invalid("not a directory string".to_string()))?;
            names.push(self.general_name(text.trim()).map_err(invalid)?);
        }
        Ok(names)
    }
}

/// Builds the subjectAltName names: mirrored subject values first, then the
/// permitted request names, without duplicates. `None` when there is nothing
/// to emit.
pub fn merge_subject_alt_name(
    modes: &GeneralNameModes,
    rules: &[SubjectToAltNameRule],
    granted: &Name,
    requested: &Name,
    requested_extension: Option<&Extension>,
) -> Result<Option<GeneralNames>, PolicyViolation> {
    let extension_name = oids::display_name(&oids::oid(oids::OID_CE_SUBJECT_ALT_NAME));
    let requested_names = match requested_extension {
        Some(extension) => yasna::parse_der(extension.value(), GeneralNames::decode_ber).map_err(|e| PolicyViolation::MalformedRequestExtension {
            extension: extension_name.clone(),
            details: e.to_string(),
        })?.0,
        None => Vec::new(),
    };
    if requested_names.is_empty() && rules.is_empty() {
        return Ok(None);
    }

    let mut names: Vec<GeneralName> = Vec::new();
    for rule in rules {
        names.extend(rule.derive(granted, requested)?);
    }
    for name in requested_names {
        if !permits(modes, &name) {
            return Err(PolicyViolation::GeneralNameNotPermitted {
                extension: extension_name,
                tag: name.tag().to_string(),
            });
        }
        names.push(name);
    }

    let mut unique: Vec<GeneralName> = Vec::with_capacity(names.len());
    for name in names {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    if unique.is_empty() {
        return Ok(None);
    }
    Ok(Some(GeneralNames(unique)))
}
