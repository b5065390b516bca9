use crate::conf::ExtensionConf;
use crate::error::ConfigError;
use certprofile_x509::certificate::oids::{self, *};
use yasna::models::ObjectIdentifier;

/// Per-extension flags, compiled once from the declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionControl {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    pub required: bool,
    pub permitted_in_request: bool,
}

impl ExtensionControl {
    pub fn compile(conf: &ExtensionConf) -> Result<Self, ConfigError> {
        Ok(ExtensionControl {
            oid: extension_type(&conf.extn_type)?,
            critical: conf.critical,
            required: conf.required,
            permitted_in_request: conf.permitted_in_request,
        })
    }

    /// Short name for well-known extensions, dotted form otherwise.
    pub fn name(&self) -> String {
        oids::display_name(&self.oid)
    }
}

/// Resolves a declared extension type, given as a well-known name or in
/// dotted form.
pub fn extension_type(text: &str) -> Result<ObjectIdentifier, ConfigError> {
    let text = text.trim();
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        return oids::parse_dotted(text).ok_or_else(|| ConfigError::MalformedOid(text.to_string()));
    }
    oids::attribute_type_from_name(text)
        .filter(|oid| ExtensionKind::of(oid).is_some())
        .ok_or_else(|| ConfigError::MalformedOid(text.to_string()))
}

pub(crate) fn parse_oid(text: &str) -> Result<ObjectIdentifier, ConfigError> {
    oids::parse_dotted(text).ok_or_else(|| ConfigError::MalformedOid(text.to_string()))
}

/// How an extension is produced. The declaration order of the variants is
/// the order in which the resolver processes them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtensionKind {
    PolicyMappings,
    SubjectAltName,
    SubjectDirectoryAttributes,
    NameConstraints,
    PolicyConstraints,
    InhibitAnyPolicy,
    Admission,
    Restriction,
    AdditionalInformation,
    ValidityModel,
    PrivateKeyUsagePeriod,
    QcStatements,
    BiometricInfo,
    TlsFeature,
    AuthorizationTemplate,
    SmimeCapabilities,
    IdentityCode,
    Gmt0015Code,
    Constant,
    Syntax,
    Custom,
    /// Populated by the CA, never emitted by the profile.
    CaOwned,
}

const CA_OWNED : &'static [&'static [u64]] = &[
    OID_CE_AUTHORITY_KEY_IDENTIFIER,
    OID_CE_SUBJECT_KEY_IDENTIFIER,
    OID_CE_KEY_USAGE,
    OID_CE_BASIC_CONSTRAINTS,
    OID_CE_ISSUER_ALT_NAME,
    OID_CE_CRL_DISTRIBUTION_POINTS,
    OID_CE_FRESHEST_CRL,
    OID_PE_AUTHORITY_INFO_ACCESS,
    OID_PE_SUBJECT_INFO_ACCESS,
    OID_PKIX_OCSP_NOCHECK,
    OID_CT_PRECERT_SCTS,
    OID_CE_EXT_KEY_USAGE,
    OID_CE_CERTIFICATE_POLICIES,
];

impl ExtensionKind {
    /// Built-in kind of an extension identifier.
    pub fn of(oid: &ObjectIdentifier) -> Option<Self> {
        use ExtensionKind::*;
        let components = oid.components().as_slice();
        if CA_OWNED.contains(&components) {
            return Some(CaOwned);
        }
        let kind = match components {
            c if c == OID_CE_POLICY_MAPPINGS => PolicyMappings,
            c if c == OID_CE_SUBJECT_ALT_NAME => SubjectAltName,
            c if c == OID_CE_SUBJECT_DIRECTORY_ATTRIBUTES => SubjectDirectoryAttributes,
            c if c == OID_CE_NAME_CONSTRAINTS => NameConstraints,
            c if c == OID_CE_POLICY_CONSTRAINTS => PolicyConstraints,
            c if c == OID_CE_INHIBIT_ANY_POLICY => InhibitAnyPolicy,
            c if c == OID_ISISMTT_ADMISSION => Admission,
            c if c == OID_ISISMTT_RESTRICTION => Restriction,
            c if c == OID_ISISMTT_ADDITIONAL_INFORMATION => AdditionalInformation,
            c if c == OID_VALIDITY_MODEL => ValidityModel,
            c if c == OID_CE_PRIVATE_KEY_USAGE_PERIOD => PrivateKeyUsagePeriod,
            c if c == OID_PE_QC_STATEMENTS => QcStatements,
            c if c == OID_PE_BIOMETRIC_INFO => BiometricInfo,
            c if c == OID_PE_TLS_FEATURE => TlsFeature,
            c if c == OID_XIPKI_AUTHORIZATION_TEMPLATE => AuthorizationTemplate,
            c if c == OID_PKCS9_SMIME_CAPABILITIES => SmimeCapabilities,
            c if c == OID_GMT_0015_IDENTITY_CODE => IdentityCode,
            c if c == OID_GMT_0015_INSURANCE_NUMBER
                || c == OID_GMT_0015_IC_REGISTRATION_NUMBER
                || c == OID_GMT_0015_ORGANIZATION_CODE
                || c == OID_GMT_0015_TAXATION_NUMBER => Gmt0015Code,
            _ => return None,
        };
        Some(kind)
    }

    /// Kind of a declaration. Constant and syntax blocks take precedence over
    /// the identifier; `None` leaves the decision to the extension hook.
    pub fn of_declaration(oid: &ObjectIdentifier, conf: &ExtensionConf) -> Result<Option<Self>, ConfigError> {
        let builtin = Self::of(oid);
        if conf.constant.is_some() || conf.syntax.is_some() {
            if builtin == Some(ExtensionKind::CaOwned) {
                return Err(ConfigError::InvalidExtension {
                    extension: oids::display_name(oid),
                    details: "is populated by the CA and cannot carry a constant or syntax value".to_string(),
                });
            }
            if conf.constant.is_some() && conf.syntax.is_some() {
                return Err(ConfigError::InvalidExtension {
                    extension: oids::display_name(oid),
                    details: "constant and syntax are mutually exclusive".to_string(),
                });
            }
            return Ok(Some(if conf.constant.is_some() { ExtensionKind::Constant } else { ExtensionKind::Syntax }));
        }
        Ok(builtin)
    }

    pub fn is_ca_owned(&self) -> bool {
        *self == ExtensionKind::CaOwned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_type_should_accept_names_and_dotted_form () {
        assert_eq!(extension_type("subjectAltName"), Ok(oid(OID_CE_SUBJECT_ALT_NAME)));
        assert_eq!(extension_type("2.5.29.17"), Ok(oid(OID_CE_SUBJECT_ALT_NAME)));
        assert_eq!(extension_type("1.2.3.4.5"), Ok(oid(&[1,2,3,4,5])));
        assert_eq!(extension_type("CN"), Err(ConfigError::MalformedOid("CN".to_string())));
        assert_eq!(extension_type("1.2.x"), Err(ConfigError::MalformedOid("1.2.x".to_string())));
    }

    #[test]
    fn kinds_should_order_as_processed () {
        assert!(ExtensionKind::PolicyMappings < ExtensionKind::SubjectAltName);
        assert!(ExtensionKind::QcStatements < ExtensionKind::BiometricInfo);
        assert!(ExtensionKind::Gmt0015Code < ExtensionKind::Constant);
        assert!(ExtensionKind::Syntax < ExtensionKind::Custom);
    }

    #[test]
    fn ca_owned_identifiers_should_be_recognized () {
        assert_eq!(ExtensionKind::of(&oid(OID_CE_KEY_USAGE)), Some(ExtensionKind::CaOwned));
        assert_eq!(ExtensionKind::of(&oid(OID_CE_CERTIFICATE_POLICIES)), Some(ExtensionKind::CaOwned));
        assert_eq!(ExtensionKind::of(&oid(OID_GMT_0015_TAXATION_NUMBER)), Some(ExtensionKind::Gmt0015Code));
        assert_eq!(ExtensionKind::of(&oid(&[1,2,3,4])), None);
    }

    #[test]
    fn constant_on_ca_owned_extension_should_fail () {
        let mut conf = ExtensionConf::new("keyUsage");
        conf.constant = Some(crate::conf::ConstantConf { value: vec!(0x03,0x02,0x05,0xa0) });
        assert!(matches!(
            ExtensionKind::of_declaration(&oid(OID_CE_KEY_USAGE), &conf),
            Err(ConfigError::InvalidExtension { .. })
        ));
    }

    #[test]
    fn constant_should_take_precedence_over_identifier () {
        let mut conf = ExtensionConf::new("tlsFeature");
        conf.constant = Some(crate::conf::ConstantConf { value: vec!(0x30,0x00) });
        assert_eq!(
            ExtensionKind::of_declaration(&oid(OID_PE_TLS_FEATURE), &conf),
            Ok(Some(ExtensionKind::Constant))
        );
    }
}
