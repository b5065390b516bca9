use crate::conf::{DirectoryStringConf, ExtensionConf, NameConstraintsConf, SmimeCapabilityConf};
use crate::error::ConfigError;
use crate::profile::admission::AdmissionSyntaxOption;
use crate::profile::alt_name::{self, GeneralNameModes};
use crate::profile::biometric::BiometricInfoOption;
use crate::profile::controls::{parse_oid, ExtensionControl, ExtensionKind};
use crate::profile::qc_statements::{self, CompiledQcStatements, QcStatementOption};
use crate::profile::subject_dir_attrs;
use crate::profile::syntax::ExtnSyntax;
use crate::profile::validity::Validity;
use bytes::Bytes;
use certprofile_x509::certificate::extensions::*;
use certprofile_x509::certificate::{GeneralName, Name, StringType};
use yasna::models::ObjectIdentifier;

/// Compiled value policy of one declared extension.
#[derive(Clone, Debug)]
pub enum PolicyValue {
    /// Emitted as is.
    Constant(Bytes),
    PrivateKeyUsagePeriod(Validity),
    SubjectAltName(GeneralNameModes),
    SubjectDirectoryAttributes(Vec<ObjectIdentifier>),
    Admission(AdmissionSyntaxOption),
    QcStatements(Vec<QcStatementOption>),
    BiometricInfo(BiometricInfoOption),
    IdentityCode,
    Gmt0015Code,
    Syntax(ExtnSyntax),
    /// Resolved by the extension hook.
    Custom,
    /// Policy lives in the CA controls; nothing is emitted.
    CaOwned,
}

fn missing(control: &ExtensionControl) -> ConfigError {
    ConfigError::Missing(format!("value block of extension {}", control.name()))
}

fn invalid(control: &ExtensionControl, details: String) -> ConfigError {
    ConfigError::InvalidExtension { extension: control.name(), details }
}

fn needs_request(control: &ExtensionControl) -> Result<(), ConfigError> {
    if control.permitted_in_request {
        return Ok(());
    }
    Err(invalid(control, "takes its value from the request but is not permitted in request".to_string()))
}

fn constant<T: yasna::DEREncodable>(value: &T) -> PolicyValue {
    PolicyValue::Constant(Bytes::from(yasna::encode_der(value)))
}

fn is_single_der_element(der: &[u8]) -> bool {
    yasna::parse_der(der, |reader| reader.read_der()).is_ok()
}

fn skip_certs(field: &str, value: i64) -> Result<u32, ConfigError> {
    u32::try_from(value).map_err(|_| ConfigError::InvalidRange {
        field: field.to_string(),
        min: value,
        max: value,
    })
}

fn directory_string(control: &ExtensionControl, conf: &DirectoryStringConf) -> Result<PolicyValue, ConfigError> {
    let string_type = conf.string_type.parse::<StringType>().map_err(|details| invalid(control, details))?;
    if string_type == StringType::Ia5String {
        return Err(invalid(control, "IA5String is not a DirectoryString".to_string()));
    }
    let value = string_type.value_of(&conf.text).map_err(|details| invalid(control, details))?;
    Ok(constant(&value))
}

fn subtree(control: &ExtensionControl, text: &str) -> Result<GeneralName, ConfigError> {
    let bad = |details: &str| ConfigError::InvalidValue {
        field: format!("{} subtree", control.name()),
        value: text.to_string(),
        details: details.to_string(),
    };
    let (kind, value) = text.split_once(':').ok_or_else(|| bad("not of the form type:value"))?;
    let value = value.trim();
    let name = match kind.trim().to_ascii_lowercase().as_str() {
        "dns" => GeneralName::DnsName(value.to_string()),
        "rfc822" | "email" => GeneralName::Rfc822Name(value.to_string()),
        "uri" => GeneralName::UniformResourceIdentifier(value.to_string()),
        "ip" => ip_subtree_from_cidr(value).ok_or_else(|| bad("not an address/prefix"))?,
        "dirname" => GeneralName::DirectoryName(value.parse::<Name>().map_err(|e| bad(&e))?),
        _ => return Err(bad("unsupported subtree type")),
    };
    name.check_charset().map_err(|e| bad(&e))?;
    Ok(name)
}

fn name_constraints(control: &ExtensionControl, conf: &NameConstraintsConf) -> Result<PolicyValue, ConfigError> {
    if conf.permitted_subtrees.is_empty() && conf.excluded_subtrees.is_empty() {
        return Err(invalid(control, "neither permitted nor excluded subtrees".to_string()));
    }
    let subtrees = |texts: &[String]| texts
        .iter()
        .map(|text| subtree(control, text))
        .collect::<Result<Vec<_>, _>>();
    Ok(constant(&NameConstraints {
        permitted_subtrees: subtrees(&conf.permitted_subtrees)?,
        excluded_subtrees: subtrees(&conf.excluded_subtrees)?,
    }))
}

fn smime_capability(control: &ExtensionControl, conf: &SmimeCapabilityConf) -> Result<SmimeCapability, ConfigError> {
    let parameters = match (conf.parameter_integer, &conf.parameter_binary) {
        (Some(_), Some(_)) => return Err(invalid(control, "capability parameter is either integer or binary".to_string())),
        (Some(integer), None) => Some(yasna::construct_der(|writer| writer.write_i64(integer))),
        (None, Some(der)) if is_single_der_element(der) => Some(der.clone()),
        (None, Some(_)) => return Err(invalid(control, "binary capability parameter is not one DER element".to_string())),
        (None, None) => None,
    };
    Ok(SmimeCapability { capability_id: parse_oid(&conf.capability_id)?, parameters })
}

impl PolicyValue {
    /// Compiles the value block matching `kind`. A declared kind without its
    /// block is a configuration error.
    pub fn compile(kind: ExtensionKind, control: &ExtensionControl, conf: &ExtensionConf) -> Result<Self, ConfigError> {
        use ExtensionKind as K;
        Ok(match kind {
            K::PolicyMappings => {
                let mappings = conf.policy_mappings.as_ref().filter(|m| !m.is_empty()).ok_or_else(|| missing(control))?;
                let mappings = mappings
                    .iter()
                    .map(|mapping| -> Result<PolicyMapping, ConfigError> {
                        Ok(PolicyMapping {
                            issuer_domain_policy: parse_oid(&mapping.issuer_domain_policy)?,
                            subject_domain_policy: parse_oid(&mapping.subject_domain_policy)?,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                constant(&PolicyMappings(mappings))
            },
            K::SubjectAltName => {
                let modes = conf.subject_alt_name.as_ref().ok_or_else(|| missing(control))?;
                PolicyValue::SubjectAltName(alt_name::compile_modes(modes)?)
            },
            K::SubjectDirectoryAttributes => {
                let types = conf.subject_directory_attributes.as_ref().ok_or_else(|| missing(control))?;
                needs_request(control)?;
                PolicyValue::SubjectDirectoryAttributes(subject_dir_attrs::compile(types)?)
            },
            K::NameConstraints => name_constraints(control, conf.name_constraints.as_ref().ok_or_else(|| missing(control))?)?,
            K::PolicyConstraints => {
                let policy = conf.policy_constraints.as_ref().ok_or_else(|| missing(control))?;
                if policy.require_explicit_policy.is_none() && policy.inhibit_policy_mapping.is_none() {
                    return Err(invalid(control, "neither require_explicit_policy nor inhibit_policy_mapping".to_string()));
                }
                constant(&PolicyConstraints {
                    require_explicit_policy: policy.require_explicit_policy
                        .map(|value| skip_certs("require_explicit_policy", value))
                        .transpose()?,
                    inhibit_policy_mapping: policy.inhibit_policy_mapping
                        .map(|value| skip_certs("inhibit_policy_mapping", value))
                        .transpose()?,
                })
            },
            K::InhibitAnyPolicy => {
                let policy = conf.inhibit_any_policy.as_ref().ok_or_else(|| missing(control))?;
                constant(&InhibitAnyPolicy(skip_certs("skip_certs", policy.skip_certs)?))
            },
            K::Admission => {
                let syntax = conf.admission_syntax.as_ref().ok_or_else(|| missing(control))?;
                let option = AdmissionSyntaxOption::compile(syntax, control.permitted_in_request)?;
                match option.constant_value() {
                    Some(value) => PolicyValue::Constant(Bytes::from(value)),
                    None => PolicyValue::Admission(option),
                }
            },
            K::Restriction => directory_string(control, conf.restriction.as_ref().ok_or_else(|| missing(control))?)?,
            K::AdditionalInformation =>
                directory_string(control, conf.additional_information.as_ref().ok_or_else(|| missing(control))?)?,
            K::ValidityModel => {
                let model = conf.validity_model.as_ref().ok_or_else(|| missing(control))?;
                constant(&ValidityModel(parse_oid(&model.model_id)?))
            },
            K::PrivateKeyUsagePeriod => {
                let period = conf.private_key_usage_period.as_ref().ok_or_else(|| missing(control))?;
                PolicyValue::PrivateKeyUsagePeriod(period.validity.parse::<Validity>()?)
            },
            K::QcStatements => {
                let statements = conf.qc_statements.as_ref().ok_or_else(|| missing(control))?;
                match qc_statements::compile(statements)? {
                    CompiledQcStatements::Constant(value) => PolicyValue::Constant(Bytes::from(value)),
                    CompiledQcStatements::Options(options) => {
                        needs_request(control)?;
                        PolicyValue::QcStatements(options)
                    },
                }
            },
            K::BiometricInfo => {
                let biometric = conf.biometric_info.as_ref().ok_or_else(|| missing(control))?;
                needs_request(control)?;
                PolicyValue::BiometricInfo(BiometricInfoOption::compile(biometric)?)
            },
            K::TlsFeature => {
                let features = conf.tls_feature.as_ref().filter(|f| !f.is_empty()).ok_or_else(|| missing(control))?;
                let features = features
                    .iter()
                    .map(|feature| u16::try_from(*feature).map_err(|_| ConfigError::InvalidRange {
                        field: "tls_feature".to_string(),
                        min: *feature,
                        max: *feature,
                    }))
                    .collect::<Result<Vec<_>, _>>()?;
                constant(&TlsFeature::canonical(&features))
            },
            K::AuthorizationTemplate => {
                let template = conf.authorization_template.as_ref().ok_or_else(|| missing(control))?;
                constant(&AuthorizationTemplate {
                    template_type: parse_oid(&template.template_type)?,
                    access_rights: template.access_rights.clone(),
                })
            },
            K::SmimeCapabilities => {
                let capabilities = conf.smime_capabilities.as_ref().filter(|c| !c.is_empty()).ok_or_else(|| missing(control))?;
                let capabilities = capabilities
                    .iter()
                    .map(|capability| smime_capability(control, capability))
                    .collect::<Result<Vec<_>, _>>()?;
                constant(&SmimeCapabilities(capabilities))
            },
            K::IdentityCode => PolicyValue::IdentityCode,
            K::Gmt0015Code => PolicyValue::Gmt0015Code,
            K::Constant => {
                let value = &conf.constant.as_ref().ok_or_else(|| missing(control))?.value;
                if !is_single_der_element(value) {
                    return Err(invalid(control, "constant value is not one DER element".to_string()));
                }
                PolicyValue::Constant(Bytes::from(value.clone()))
            },
            K::Syntax => {
                let syntax = conf.syntax.as_ref().ok_or_else(|| missing(control))?;
                needs_request(control)?;
                PolicyValue::Syntax(ExtnSyntax::compile(&control.name(), syntax)?)
            },
            K::Custom => PolicyValue::Custom,
            K::CaOwned => PolicyValue::CaOwned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::*;

    fn compile(kind: ExtensionKind, conf: &ExtensionConf) -> Result<PolicyValue, ConfigError> {
        let control = ExtensionControl::compile(conf).unwrap();
        PolicyValue::compile(kind, &control, conf)
    }

    fn constant_bytes(value: Result<PolicyValue, ConfigError>) -> Vec<u8> {
        match value {
            Ok(PolicyValue::Constant(bytes)) => bytes.to_vec(),
            other => panic!("not a constant: {:?}", other),
        }
    }

    #[test]
    fn tls_features_should_be_sorted () {
        let mut conf = ExtensionConf::new("tlsFeature");
        conf.tls_feature = Some(vec!(22, 5));
        assert_eq!(constant_bytes(compile(ExtensionKind::TlsFeature, &conf)), vec!(
            0x30,0x06,        // Features
            0x02,0x01,0x05,   // status_request
            0x02,0x01,0x16,   // 22
        ));
        conf.tls_feature = Some(vec!(70000));
        assert!(matches!(compile(ExtensionKind::TlsFeature, &conf), Err(ConfigError::InvalidRange { .. })));
    }

    #[test]
    fn negative_skip_certs_should_fail () {
        let mut conf = ExtensionConf::new("inhibitAnyPolicy");
        conf.inhibit_any_policy = Some(InhibitAnyPolicyConf { skip_certs: -1 });
        assert!(matches!(compile(ExtensionKind::InhibitAnyPolicy, &conf), Err(ConfigError::InvalidRange { .. })));
        conf.inhibit_any_policy = Some(InhibitAnyPolicyConf { skip_certs: 0 });
        assert_eq!(constant_bytes(compile(ExtensionKind::InhibitAnyPolicy, &conf)), vec!(0x02,0x01,0x00));
    }

    #[test]
    fn empty_policy_constraints_should_fail () {
        let mut conf = ExtensionConf::new("policyConstraints");
        conf.policy_constraints = Some(PolicyConstraintsConf::default());
        assert!(matches!(compile(ExtensionKind::PolicyConstraints, &conf), Err(ConfigError::InvalidExtension { .. })));
    }

    #[test]
    fn name_constraints_should_compile_subtrees () {
        let mut conf = ExtensionConf::new("nameConstraints");
        conf.name_constraints = Some(NameConstraintsConf {
            permitted_subtrees: vec!("dns:example.com".to_string()),
            excluded_subtrees: vec!(),
        });
        assert_eq!(constant_bytes(compile(ExtensionKind::NameConstraints, &conf)), vec!(
            0x30,0x11,                            // NameConstraints
            0xa0,0x0f,                            // [0] permittedSubtrees
            0x30,0x0d,                            // GeneralSubtree
            0x82,0x0b,                            // [2] dNSName
            0x65,0x78,0x61,0x6d,0x70,0x6c,0x65,   // example
            0x2e,0x63,0x6f,0x6d,                  // .com
        ));
        conf.name_constraints = Some(NameConstraintsConf {
            permitted_subtrees: vec!("ip:10.0.0.0/33".to_string()),
            excluded_subtrees: vec!(),
        });
        assert!(matches!(compile(ExtensionKind::NameConstraints, &conf), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn non_ascii_subtree_should_fail () {
        let mut conf = ExtensionConf::new("nameConstraints");
        conf.name_constraints = Some(NameConstraintsConf {
            permitted_subtrees: vec!("dns:exämple.com".to_string()),
            excluded_subtrees: vec!(),
        });
        assert!(matches!(compile(ExtensionKind::NameConstraints, &conf), Err(ConfigError::InvalidValue { .. })));
        conf.name_constraints = Some(NameConstraintsConf {
            permitted_subtrees: vec!(),
            excluded_subtrees: vec!("uri:https://exämple.com".to_string()),
        });
        assert!(matches!(compile(ExtensionKind::NameConstraints, &conf), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn restriction_should_be_a_directory_string () {
        let mut conf = ExtensionConf::new("restriction");
        conf.restriction = Some(DirectoryStringConf { string_type: "printableString".to_string(), text: "abc".to_string() });
        assert_eq!(constant_bytes(compile(ExtensionKind::Restriction, &conf)), vec!(0x13,0x03,0x61,0x62,0x63));
        conf.restriction = Some(DirectoryStringConf { string_type: "ia5String".to_string(), text: "abc".to_string() });
        assert!(compile(ExtensionKind::Restriction, &conf).is_err());
    }

    #[test]
    fn constant_should_be_one_der_element () {
        let mut conf = ExtensionConf::new("1.2.3.4");
        conf.constant = Some(ConstantConf { value: vec!(0x05,0x00,0x05,0x00) });
        assert!(matches!(compile(ExtensionKind::Constant, &conf), Err(ConfigError::InvalidExtension { .. })));
        conf.constant = Some(ConstantConf { value: vec!(0x05,0x00) });
        assert_eq!(constant_bytes(compile(ExtensionKind::Constant, &conf)), vec!(0x05,0x00));
    }

    #[test]
    fn missing_block_should_fail () {
        let conf = ExtensionConf::new("validityModel");
        assert!(matches!(compile(ExtensionKind::ValidityModel, &conf), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn request_sourced_kinds_should_need_permission () {
        let mut conf = ExtensionConf::new("biometricInfo");
        conf.biometric_info = Some(BiometricInfoConf {
            types: vec!("picture".to_string()),
            hash_algorithms: vec!("SHA256".to_string()),
            include_source_data_uri: TripleState::Optional,
        });
        assert!(matches!(compile(ExtensionKind::BiometricInfo, &conf), Err(ConfigError::InvalidExtension { .. })));
        conf.permitted_in_request = true;
        assert!(matches!(compile(ExtensionKind::BiometricInfo, &conf), Ok(PolicyValue::BiometricInfo(_))));
    }

    #[test]
    fn smime_integer_parameter_should_be_encoded () {
        let mut conf = ExtensionConf::new("smimeCapabilities");
        conf.smime_capabilities = Some(vec!(SmimeCapabilityConf {
            capability_id: "1.2.840.113549.3.2".to_string(),
            parameter_integer: Some(128),
            parameter_binary: None,
        }));
        assert_eq!(constant_bytes(compile(ExtensionKind::SmimeCapabilities, &conf)), vec!(
            0x30,0x10,                                                  // SMIMECapabilities
            0x30,0x0e,                                                  // SMIMECapability
            0x06,0x08,0x2a,0x86,0x48,0x86,0xf7,0x0d,0x03,0x02,          // rc2-cbc
            0x02,0x02,0x00,0x80,                                        // 128
        ));
    }
}
