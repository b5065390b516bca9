use serde_derive::Deserialize;

fn yes() -> bool {
    true
}

/// One declared extension. `extn_type` is a dotted OID or a well-known name.
/// At most one value block is expected to be set; the block must match the
/// extension type.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionConf {
    #[serde(rename = "type")]
    pub extn_type: String,
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub permitted_in_request: bool,

    #[serde(default)]
    pub constant: Option<ConstantConf>,
    #[serde(default)]
    pub syntax: Option<SyntaxConf>,
    /// Opaque configuration of a profile-specific extension, handed to the
    /// extension hook.
    #[serde(default)]
    pub custom: Option<serde_json::Value>,

    #[serde(default)]
    pub additional_information: Option<DirectoryStringConf>,
    #[serde(default)]
    pub admission_syntax: Option<AdmissionSyntaxConf>,
    #[serde(default)]
    pub authority_info_access: Option<AuthorityInfoAccessConf>,
    #[serde(default)]
    pub authority_key_identifier: Option<AuthorityKeyIdentifierConf>,
    #[serde(default)]
    pub authorization_template: Option<AuthorizationTemplateConf>,
    #[serde(default)]
    pub basic_constraints: Option<BasicConstraintsConf>,
    #[serde(default)]
    pub biometric_info: Option<BiometricInfoConf>,
    #[serde(default)]
    pub certificate_policies: Option<Vec<CertificatePolicyConf>>,
    #[serde(default)]
    pub crl_distribution_points: Option<CrlDistributionPointsConf>,
    #[serde(default)]
    pub extended_key_usage: Option<Vec<UsageConf>>,
    #[serde(default)]
    pub freshest_crl: Option<CrlDistributionPointsConf>,
    #[serde(default)]
    pub inhibit_any_policy: Option<InhibitAnyPolicyConf>,
    #[serde(default)]
    pub key_usage: Option<Vec<UsageConf>>,
    #[serde(default)]
    pub name_constraints: Option<NameConstraintsConf>,
    #[serde(default)]
    pub policy_constraints: Option<PolicyConstraintsConf>,
    #[serde(default)]
    pub policy_mappings: Option<Vec<PolicyMappingConf>>,
    #[serde(default)]
    pub private_key_usage_period: Option<PrivateKeyUsagePeriodConf>,
    #[serde(default)]
    pub qc_statements: Option<Vec<QcStatementConf>>,
    #[serde(default)]
    pub restriction: Option<DirectoryStringConf>,
    #[serde(default)]
    pub smime_capabilities: Option<Vec<SmimeCapabilityConf>>,
    #[serde(default)]
    pub subject_alt_name: Option<GeneralNameConf>,
    #[serde(default)]
    pub subject_directory_attributes: Option<Vec<String>>,
    #[serde(default)]
    pub subject_info_access: Option<Vec<AccessConf>>,
    #[serde(default)]
    pub tls_feature: Option<Vec<i64>>,
    #[serde(default)]
    pub validity_model: Option<ValidityModelConf>,
}

impl ExtensionConf {
    pub fn new(extn_type: &str) -> Self {
        ExtensionConf {
            extn_type: extn_type.to_string(),
            critical: false,
            required: false,
            permitted_in_request: false,
            constant: None,
            syntax: None,
            custom: None,
            additional_information: None,
            admission_syntax: None,
            authority_info_access: None,
            authority_key_identifier: None,
            authorization_template: None,
            basic_constraints: None,
            biometric_info: None,
            certificate_policies: None,
            crl_distribution_points: None,
            extended_key_usage: None,
            freshest_crl: None,
            inhibit_any_policy: None,
            key_usage: None,
            name_constraints: None,
            policy_constraints: None,
            policy_mappings: None,
            private_key_usage_period: None,
            qc_statements: None,
            restriction: None,
            smime_capabilities: None,
            subject_alt_name: None,
            subject_directory_attributes: None,
            subject_info_access: None,
            tls_feature: None,
            validity_model: None,
        }
    }
}

/// A raw DER value placed verbatim into the extension.
#[derive(Debug, Clone, Deserialize)]
pub struct ConstantConf {
    #[serde(with = "super::serde_base64")]
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryStringConf {
    /// `utf8String`, `printableString` or `bmpString`.
    #[serde(rename = "type")]
    pub string_type: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyntaxTagConf {
    pub value: u64,
    #[serde(default)]
    pub explicit: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyntaxConf {
    #[serde(rename = "type")]
    pub syntax_type: String,
    #[serde(default)]
    pub tag: Option<SyntaxTagConf>,
    #[serde(default)]
    pub string_regex: Option<String>,
    #[serde(default)]
    pub sub_fields: Vec<SyntaxConf>,
    #[serde(default = "yes")]
    pub required: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamingAuthorityConf {
    #[serde(default)]
    pub oid: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationNumberConf {
    #[serde(default)]
    pub constant: Option<String>,
    #[serde(default)]
    pub regex: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfessionInfoConf {
    #[serde(default)]
    pub naming_authority: Option<NamingAuthorityConf>,
    #[serde(default)]
    pub profession_items: Vec<String>,
    #[serde(default)]
    pub profession_oids: Vec<String>,
    #[serde(default)]
    pub registration_number: Option<RegistrationNumberConf>,
    #[serde(default, with = "super::serde_base64::option")]
    pub add_profession_info: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdmissionsConf {
    /// DER of a GeneralName.
    #[serde(default, with = "super::serde_base64::option")]
    pub admission_authority: Option<Vec<u8>>,
    #[serde(default)]
    pub naming_authority: Option<NamingAuthorityConf>,
    #[serde(default)]
    pub profession_infos: Vec<ProfessionInfoConf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdmissionSyntaxConf {
    /// DER of a GeneralName.
    #[serde(default, with = "super::serde_base64::option")]
    pub admission_authority: Option<Vec<u8>>,
    pub contents_of_admissions: Vec<AdmissionsConf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorityInfoAccessConf {
    #[serde(default)]
    pub include_ca_issuers: bool,
    #[serde(default)]
    pub include_ocsp: bool,
    #[serde(default)]
    pub ca_issuers_protocols: Vec<String>,
    #[serde(default)]
    pub ocsp_protocols: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorityKeyIdentifierConf {
    #[serde(default)]
    pub use_issuer_and_serial: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationTemplateConf {
    #[serde(rename = "type")]
    pub template_type: String,
    #[serde(with = "super::serde_base64")]
    pub access_rights: Vec<u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasicConstraintsConf {
    #[serde(default)]
    pub path_len: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripleState {
    Forbidden,
    Required,
    Optional,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BiometricInfoConf {
    /// `picture`, `handwrittenSignature`, a predefined number or a dotted OID.
    pub types: Vec<String>,
    /// Hash algorithm names (`SHA256`, `SHA-384`, ...) or dotted OIDs.
    pub hash_algorithms: Vec<String>,
    pub include_source_data_uri: TripleState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserNoticeConf {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub notice_numbers: Vec<u64>,
    #[serde(default)]
    pub explicit_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CertificatePolicyConf {
    pub policy_id: String,
    #[serde(default)]
    pub cps_uris: Vec<String>,
    #[serde(default)]
    pub user_notices: Vec<UserNoticeConf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrlDistributionPointsConf {
    #[serde(default)]
    pub protocols: Vec<String>,
}

/// Key usage or extended key usage, with whether the CA must always set it.
#[derive(Debug, Clone, Deserialize)]
pub struct UsageConf {
    pub value: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InhibitAnyPolicyConf {
    pub skip_certs: i64,
}

/// Subtrees as text: `dns:example.com`, `rfc822:example.com`,
/// `uri:.example.com`, `ip:10.0.0.0/8`, `dirName:O=Acme,C=DE`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameConstraintsConf {
    #[serde(default)]
    pub permitted_subtrees: Vec<String>,
    #[serde(default)]
    pub excluded_subtrees: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConstraintsConf {
    #[serde(default)]
    pub require_explicit_policy: Option<i64>,
    #[serde(default)]
    pub inhibit_policy_mapping: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyMappingConf {
    pub issuer_domain_policy: String,
    pub subject_domain_policy: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrivateKeyUsagePeriodConf {
    pub validity: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RangeConf {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QcEuLimitValueConf {
    pub currency: String,
    pub amount: RangeConf,
    pub exponent: RangeConf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PdsLocationConf {
    pub url: String,
    pub language: String,
}

/// Exactly one member is expected, or none for a bare statement id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QcStatementValueConf {
    #[serde(default)]
    pub qc_retention_period: Option<u32>,
    #[serde(default, with = "super::serde_base64::option")]
    pub constant: Option<Vec<u8>>,
    #[serde(default)]
    pub qc_eu_limit_value: Option<QcEuLimitValueConf>,
    #[serde(default)]
    pub pds_locations: Option<Vec<PdsLocationConf>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QcStatementConf {
    pub statement_id: String,
    #[serde(default)]
    pub statement_value: Option<QcStatementValueConf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmimeCapabilityConf {
    pub capability_id: String,
    #[serde(default)]
    pub parameter_integer: Option<i64>,
    #[serde(default, with = "super::serde_base64::option")]
    pub parameter_binary: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralNameModeConf {
    pub tag: String,
    /// Permitted otherName type ids, any when empty.
    #[serde(default)]
    pub other_name_types: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralNameConf {
    #[serde(default)]
    pub modes: Vec<GeneralNameModeConf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessConf {
    pub access_method: String,
    pub access_location: GeneralNameConf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidityModelConf {
    pub model_id: String,
}
