use crate::conf::{AdmissionSyntaxConf, AdmissionsConf, NamingAuthorityConf, ProfessionInfoConf};
use crate::error::{ConfigError, PolicyViolation};
use crate::profile::controls::parse_oid;
use crate::profile::subject::whole_value_pattern;
use certprofile_x509::certificate::extensions::{AdmissionSyntax, Admissions, NamingAuthority, ProfessionInfo};
use certprofile_x509::certificate::oids::{self, OID_ISISMTT_ADMISSION};
use certprofile_x509::certificate::{is_printable, AttributeValue, GeneralName, Name};
use regex::Regex;
use yasna::BERDecodable;

fn naming_authority(conf: &NamingAuthorityConf) -> Result<NamingAuthority, ConfigError> {
    if let Some(url) = conf.url.as_ref().filter(|url| !url.is_ascii()) {
        return Err(ConfigError::InvalidValue {
            field: "admission naming_authority url".to_string(),
            value: url.clone(),
            details: "not an IA5String".to_string(),
        });
    }
    Ok(NamingAuthority {
        id: conf.oid.as_deref().map(parse_oid).transpose()?,
        url: conf.url.clone(),
        text: conf.text.as_ref().map(|text| AttributeValue::Utf8String(text.clone())),
    })
}

fn general_name(der: &[u8]) -> Result<GeneralName, ConfigError> {
    yasna::parse_der(der, GeneralName::decode_ber).map_err(|e| ConfigError::InvalidValue {
        field: "admission_authority".to_string(),
        value: der.iter().map(|b| format!("{:02x}", b)).collect(),
        details: e.to_string(),
    })
}

/// A profession info whose registration number may come from the request.
#[derive(Clone, Debug)]
pub struct ProfessionInfoOption {
    pub info: ProfessionInfo,
    pub registration_pattern: Option<Regex>,
}

impl ProfessionInfoOption {
    fn compile(conf: &ProfessionInfoConf) -> Result<Self, ConfigError> {
        if conf.profession_items.is_empty() {
            return Err(ConfigError::Missing("admission profession_items".to_string()));
        }
        let mut info = ProfessionInfo {
            naming_authority: conf.naming_authority.as_ref().map(naming_authority).transpose()?,
            profession_items: conf.profession_items
                .iter()
                .map(|item| AttributeValue::Utf8String(item.clone()))
                .collect(),
            profession_oids: conf.profession_oids
                .iter()
                .map(|text| parse_oid(text))
                .collect::<Result<Vec<_>, _>>()?,
            registration_number: None,
            add_profession_info: conf.add_profession_info.clone(),
        };
        let mut registration_pattern = None;
        if let Some(number) = &conf.registration_number {
            match (&number.constant, &number.regex) {
                (Some(constant), None) if !is_printable(constant) => return Err(ConfigError::InvalidValue {
                    field: "admission registration_number".to_string(),
                    value: constant.clone(),
                    details: "not a PrintableString".to_string(),
                }),
                (Some(constant), None) => info.registration_number = Some(constant.clone()),
                (None, Some(regex)) => registration_pattern = Some(whole_value_pattern(regex)?),
                _ => return Err(ConfigError::InvalidExtension {
                    extension: "admission".to_string(),
                    details: "registration_number needs exactly one of constant and regex".to_string(),
                }),
            }
        }
        Ok(ProfessionInfoOption { info, registration_pattern })
    }
}

#[derive(Clone, Debug)]
pub struct AdmissionsOption {
    pub admission_authority: Option<GeneralName>,
    pub naming_authority: Option<NamingAuthority>,
    pub profession_infos: Vec<ProfessionInfoOption>,
}

impl AdmissionsOption {
    fn compile(conf: &AdmissionsConf) -> Result<Self, ConfigError> {
        Ok(AdmissionsOption {
            admission_authority: conf.admission_authority.as_deref().map(general_name).transpose()?,
            naming_authority: conf.naming_authority.as_ref().map(naming_authority).transpose()?,
            profession_infos: conf.profession_infos
                .iter()
                .map(ProfessionInfoOption::compile)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn needs_registration_numbers(&self) -> bool {
        self.profession_infos.iter().any(|info| info.registration_pattern.is_some())
    }
}

/// Compiled admission syntax. Registration numbers matched by a pattern are
/// read from the admission attributes of the requested subject.
#[derive(Clone, Debug)]
pub struct AdmissionSyntaxOption {
    pub admission_authority: Option<GeneralName>,
    pub contents_of_admissions: Vec<AdmissionsOption>,
}

/// Registration numbers of one admission attribute value, e.g.
/// `registrationNumber=A1;A2`.
fn registration_numbers(text: &str) -> Vec<String> {
    text.split(',')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case("registrationNumber"))
        .flat_map(|(_, value)| value.split(|c| c == ';' || c == ':' || c == ' ').map(str::to_string).collect::<Vec<_>>())
        .filter(|number| !number.is_empty())
        .collect()
}

impl AdmissionSyntaxOption {
    pub fn compile(conf: &AdmissionSyntaxConf, permitted_in_request: bool) -> Result<Self, ConfigError> {
        if conf.contents_of_admissions.is_empty() {
            return Err(ConfigError::Missing("admission contents_of_admissions".to_string()));
        }
        let option = AdmissionSyntaxOption {
            admission_authority: conf.admission_authority.as_deref().map(general_name).transpose()?,
            contents_of_admissions: conf.contents_of_admissions
                .iter()
                .map(AdmissionsOption::compile)
                .collect::<Result<Vec<_>, _>>()?,
        };
        if option.needs_request_input() && !permitted_in_request {
            return Err(ConfigError::InvalidExtension {
                extension: "admission".to_string(),
                details: "registration numbers from the request need the extension to be permitted in request".to_string(),
            });
        }
        Ok(option)
    }

    pub fn needs_request_input(&self) -> bool {
        self.contents_of_admissions.iter().any(AdmissionsOption::needs_registration_numbers)
    }

    fn syntax(&self, numbers: &[Vec<String>]) -> Result<AdmissionSyntax, PolicyViolation> {
        let extension = oids::display_name(&oids::oid(OID_ISISMTT_ADMISSION));
        let mut contents_of_admissions = Vec::with_capacity(self.contents_of_admissions.len());
        for (i, admissions) in self.contents_of_admissions.iter().enumerate() {
            let mut profession_infos = Vec::with_capacity(admissions.profession_infos.len());
            for (j, option) in admissions.profession_infos.iter().enumerate() {
                let mut info = option.info.clone();
                if let Some(pattern) = &option.registration_pattern {
                    let number = numbers.get(i).and_then(|list| list.get(j)).ok_or_else(|| PolicyViolation::MissingRequestInput {
                        extension: extension.clone(),
                        details: format!("registration number {} of admission {}", j, i),
                    })?;
                    if !pattern.is_match(number) || !is_printable(number) {
                        return Err(PolicyViolation::InvalidAttributeValue {
                            attribute: extension.clone(),
                            value: number.clone(),
                            details: format!("does not match '{}'", pattern.as_str()),
                        });
                    }
                    info.registration_number = Some(number.clone());
                }
                profession_infos.push(info);
            }
            contents_of_admissions.push(Admissions {
                admission_authority: admissions.admission_authority.clone(),
                naming_authority: admissions.naming_authority.clone(),
                profession_infos,
            });
        }
        Ok(AdmissionSyntax { admission_authority: self.admission_authority.clone(), contents_of_admissions })
    }

    /// Encoded value when no request input is needed.
    pub fn constant_value(&self) -> Option<Vec<u8>> {
        if self.needs_request_input() {
            return None;
        }
        self.syntax(&[]).ok().map(|syntax| yasna::encode_der(&syntax))
    }

    pub fn resolve(&self, requested: &Name) -> Result<Vec<u8>, PolicyViolation> {
        let admission = oids::oid(OID_ISISMTT_ADMISSION);
        let numbers = requested
            .values_of(&admission)
            .into_iter()
            .map(|value| value.as_str().map(registration_numbers).unwrap_or_default())
            .collect::<Vec<_>>();
        Ok(yasna::encode_der(&self.syntax(&numbers)?))
    }
}
