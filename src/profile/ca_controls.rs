use crate::conf::{AccessConf, CertLevel, CertificatePolicyConf, ExtensionConf, UsageConf};
use crate::error::ConfigError;
use crate::profile::alt_name::{self, GeneralNameModes};
use crate::profile::controls::{parse_oid, ExtensionControl};
use bytes::Bytes;
use certprofile_x509::certificate::extensions::*;
use certprofile_x509::certificate::oids::*;
use yasna::models::ObjectIdentifier;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyUsageControl {
    pub usage: KeyUsage,
    pub required: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtKeyUsageControl {
    pub purpose: KeyPurpose,
    pub required: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorityInfoAccessControl {
    pub include_ca_issuers: bool,
    pub include_ocsp: bool,
    /// Accepted URI schemes, any when empty.
    pub ca_issuers_protocols: Vec<String>,
    pub ocsp_protocols: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CrlControl {
    pub protocols: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessControl {
    pub access_method: ObjectIdentifier,
    pub access_location: GeneralNameModes,
}

/// Policy for the extensions the CA populates itself. Read by the signing
/// step; the profile never emits them.
#[derive(Clone, Debug, Default)]
pub struct CaControls {
    pub use_issuer_and_serial_in_aki: bool,
    pub path_len: Option<u32>,
    pub key_usages: Vec<KeyUsageControl>,
    pub ext_key_usages: Vec<ExtKeyUsageControl>,
    /// Encoded CertificatePolicies value.
    pub certificate_policies: Option<Bytes>,
    pub authority_info_access: Option<AuthorityInfoAccessControl>,
    pub crl_distribution_points: Option<CrlControl>,
    pub freshest_crl: Option<CrlControl>,
    pub subject_info_access: Vec<AccessControl>,
}

fn protocols(field: &str, texts: &[String]) -> Result<Vec<String>, ConfigError> {
    texts.iter().map(|text| {
        let protocol = text.trim().to_ascii_lowercase();
        if protocol.is_empty() || !protocol.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.') {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                value: text.clone(),
                details: "not a URI scheme".to_string(),
            });
        }
        Ok(protocol)
    }).collect()
}

fn usages<T, F>(field: &str, confs: &[UsageConf], parse: F) -> Result<Vec<(T, bool)>, ConfigError>
where F: Fn(&str) -> Result<T, String> {
    confs.iter().map(|conf| {
        parse(&conf.value)
            .map(|usage| (usage, conf.required))
            .map_err(|details| ConfigError::InvalidValue { field: field.to_string(), value: conf.value.clone(), details })
    }).collect()
}

fn policy_information(conf: &CertificatePolicyConf) -> Result<PolicyInformation, ConfigError> {
    if let Some(uri) = conf.cps_uris.iter().find(|uri| !uri.is_ascii()) {
        return Err(ConfigError::InvalidValue {
            field: "certificate_policies cps_uris".to_string(),
            value: uri.clone(),
            details: "not an IA5String".to_string(),
        });
    }
    let mut qualifiers: Vec<PolicyQualifier> = conf.cps_uris
        .iter()
        .map(|uri| PolicyQualifier::CpsUri(uri.clone()))
        .collect();
    for notice in conf.user_notices.iter() {
        qualifiers.push(PolicyQualifier::UserNotice {
            notice_ref: notice.organization.as_ref().map(|organization| NoticeReference {
                organization: organization.clone(),
                notice_numbers: notice.notice_numbers.clone(),
            }),
            explicit_text: notice.explicit_text.clone(),
        });
    }
    Ok(PolicyInformation { policy_identifier: parse_oid(&conf.policy_id)?, qualifiers })
}

fn access_control(conf: &AccessConf) -> Result<AccessControl, ConfigError> {
    Ok(AccessControl {
        access_method: parse_oid(&conf.access_method)?,
        access_location: alt_name::compile_modes(&conf.access_location)?,
    })
}

impl CaControls {
    /// Takes over the policy of one CA-owned declaration.
    pub fn absorb(&mut self, control: &ExtensionControl, conf: &ExtensionConf) -> Result<(), ConfigError> {
        let missing = || ConfigError::Missing(format!("value block of extension {}", control.name()));
        let components = control.oid.components().as_slice();
        if components == OID_CE_AUTHORITY_KEY_IDENTIFIER {
            self.use_issuer_and_serial_in_aki = conf.authority_key_identifier
                .as_ref()
                .map_or(false, |aki| aki.use_issuer_and_serial);
        } else if components == OID_CE_BASIC_CONSTRAINTS {
            self.path_len = conf.basic_constraints.as_ref().and_then(|bc| bc.path_len);
        } else if components == OID_CE_KEY_USAGE {
            let confs = conf.key_usage.as_ref().ok_or_else(missing)?;
            self.key_usages = usages("key_usage", confs, |text| text.parse::<KeyUsage>())?
                .into_iter()
                .map(|(usage, required)| KeyUsageControl { usage, required })
                .collect();
        } else if components == OID_CE_EXT_KEY_USAGE {
            let confs = conf.extended_key_usage.as_ref().ok_or_else(missing)?;
            self.ext_key_usages = usages("extended_key_usage", confs, |text| text.parse::<KeyPurpose>())?
                .into_iter()
                .map(|(purpose, required)| ExtKeyUsageControl { purpose, required })
                .collect();
        } else if components == OID_CE_CERTIFICATE_POLICIES {
            let confs = conf.certificate_policies.as_ref().filter(|c| !c.is_empty()).ok_or_else(missing)?;
            let policies = confs.iter().map(policy_information).collect::<Result<Vec<_>, _>>()?;
            self.certificate_policies = Some(Bytes::from(yasna::encode_der(&CertificatePolicies(policies))));
        } else if components == OID_PE_AUTHORITY_INFO_ACCESS {
            let aia = conf.authority_info_access.clone().unwrap_or_default();
            self.authority_info_access = Some(AuthorityInfoAccessControl {
                include_ca_issuers: aia.include_ca_issuers,
                include_ocsp: aia.include_ocsp,
                ca_issuers_protocols: protocols("ca_issuers_protocols", &aia.ca_issuers_protocols)?,
                ocsp_protocols: protocols("ocsp_protocols", &aia.ocsp_protocols)?,
            });
        } else if components == OID_CE_CRL_DISTRIBUTION_POINTS {
            let crl = conf.crl_distribution_points.clone().unwrap_or_default();
            self.crl_distribution_points = Some(CrlControl { protocols: protocols("crl_distribution_points", &crl.protocols)? });
        } else if components == OID_CE_FRESHEST_CRL {
            let crl = conf.freshest_crl.clone().unwrap_or_default();
            self.freshest_crl = Some(CrlControl { protocols: protocols("freshest_crl", &crl.protocols)? });
        } else if components == OID_PE_SUBJECT_INFO_ACCESS {
            let confs = conf.subject_info_access.as_ref().filter(|c| !c.is_empty()).ok_or_else(missing)?;
            self.subject_info_access = confs.iter().map(access_control).collect::<Result<Vec<_>, _>>()?;
        }
        Ok(())
    }

    /// BasicConstraints the CA writes for a certificate of `level`.
    pub fn basic_constraints(&self, level: CertLevel) -> BasicConstraints {
        match level {
            CertLevel::EndEntity => BasicConstraints::default(),
            CertLevel::RootCA | CertLevel::SubCA => BasicConstraints { ca: true, path_length_constraint: self.path_len },
        }
    }

    pub fn required_key_usages(&self) -> Vec<KeyUsage> {
        self.key_usages.iter().filter(|control| control.required).map(|control| control.usage).collect()
    }

    pub fn required_ext_key_usages(&self) -> Vec<KeyPurpose> {
        self.ext_key_usages.iter().filter(|control| control.required).map(|control| control.purpose.clone()).collect()
    }
}
