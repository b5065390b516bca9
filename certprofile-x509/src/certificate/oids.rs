use yasna::models::ObjectIdentifier;

// OID: 2.5.29
// {
//      joint-iso-itu-t(2)
//      ds(5)
//      certificateExtension(29)
// }
pub const OID_CE_SUBJECT_DIRECTORY_ATTRIBUTES : &'static [u64] = &[2,5,29,9];
pub const OID_CE_SUBJECT_KEY_IDENTIFIER : &'static [u64] = &[2,5,29,14];
pub const OID_CE_KEY_USAGE : &'static [u64] = &[2,5,29,15];
pub const OID_CE_PRIVATE_KEY_USAGE_PERIOD : &'static [u64] = &[2,5,29,16];
pub const OID_CE_SUBJECT_ALT_NAME : &'static [u64] = &[2,5,29,17];
pub const OID_CE_ISSUER_ALT_NAME : &'static [u64] = &[2,5,29,18];
pub const OID_CE_BASIC_CONSTRAINTS : &'static [u64] = &[2,5,29,19];
pub const OID_CE_NAME_CONSTRAINTS : &'static [u64] = &[2,5,29,30];
pub const OID_CE_CRL_DISTRIBUTION_POINTS : &'static [u64] = &[2,5,29,31];
pub const OID_CE_CERTIFICATE_POLICIES : &'static [u64] = &[2,5,29,32];
pub const OID_CE_POLICY_MAPPINGS : &'static [u64] = &[2,5,29,33];
pub const OID_CE_AUTHORITY_KEY_IDENTIFIER : &'static [u64] = &[2,5,29,35];
pub const OID_CE_POLICY_CONSTRAINTS : &'static [u64] = &[2,5,29,36];
pub const OID_CE_EXT_KEY_USAGE : &'static [u64] = &[2,5,29,37];
pub const OID_CE_FRESHEST_CRL : &'static [u64] = &[2,5,29,46];
pub const OID_CE_INHIBIT_ANY_POLICY : &'static [u64] = &[2,5,29,54];

// OID: 1.3.6.1.5.5.7.1
// {
//      iso(1)
//      identified-organization(3)
//      dod(6)
//      internet(1)
//      security(5)
//      mechanisms(5)
//      pkix(7)
//      pe(1)
// }
pub const OID_PE_AUTHORITY_INFO_ACCESS : &'static [u64] = &[1,3,6,1,5,5,7,1,1];
pub const OID_PE_BIOMETRIC_INFO : &'static [u64] = &[1,3,6,1,5,5,7,1,2];
pub const OID_PE_QC_STATEMENTS : &'static [u64] = &[1,3,6,1,5,5,7,1,3];
pub const OID_PE_SUBJECT_INFO_ACCESS : &'static [u64] = &[1,3,6,1,5,5,7,1,11];
pub const OID_PE_TLS_FEATURE : &'static [u64] = &[1,3,6,1,5,5,7,1,24];

pub const OID_PKIX_OCSP_NOCHECK : &'static [u64] = &[1,3,6,1,5,5,7,48,1,5];

// RFC 6962 signed certificate timestamp list
pub const OID_CT_PRECERT_SCTS : &'static [u64] = &[1,3,6,1,4,1,11129,2,4,2];

pub const OID_PKCS9_SMIME_CAPABILITIES : &'static [u64] = &[1,2,840,113549,1,9,15];

// Common PKI / ISIS-MTT extensions
// OID: 1.3.36.8.3
// {
//      iso(1)
//      identified-organization(3)
//      teletrust(36)
//      isis-mtt(8)
//      extensions(3)
// }
pub const OID_ISISMTT_ADMISSION : &'static [u64] = &[1,3,36,8,3,3];
pub const OID_ISISMTT_RESTRICTION : &'static [u64] = &[1,3,36,8,3,8];
pub const OID_ISISMTT_ADDITIONAL_INFORMATION : &'static [u64] = &[1,3,36,8,3,15];

pub const OID_VALIDITY_MODEL : &'static [u64] = &[1,3,6,1,4,1,8301,3,5];
pub const OID_VALIDITY_MODEL_CHAIN : &'static [u64] = &[1,3,6,1,4,1,8301,3,5,1];
pub const OID_VALIDITY_MODEL_SHELL : &'static [u64] = &[1,3,6,1,4,1,8301,3,5,2];

pub const OID_XIPKI_AUTHORIZATION_TEMPLATE : &'static [u64] = &[1,3,6,1,4,1,45522,1,3];

// GM/T 0015-2012, Chinese personal and organisational identifiers
// OID: 1.2.156.10260.4.1
pub const OID_GMT_0015_IDENTITY_CODE : &'static [u64] = &[1,2,156,10260,4,1,1];
pub const OID_GMT_0015_INSURANCE_NUMBER : &'static [u64] = &[1,2,156,10260,4,1,2];
pub const OID_GMT_0015_IC_REGISTRATION_NUMBER : &'static [u64] = &[1,2,156,10260,4,1,3];
pub const OID_GMT_0015_ORGANIZATION_CODE : &'static [u64] = &[1,2,156,10260,4,1,4];
pub const OID_GMT_0015_TAXATION_NUMBER : &'static [u64] = &[1,2,156,10260,4,1,5];

// ETSI EN 319 412-5 qualified certificate statements
pub const OID_ETSI_QCS_QC_COMPLIANCE : &'static [u64] = &[0,4,0,1862,1,1];
pub const OID_ETSI_QCS_QC_LIMIT_VALUE : &'static [u64] = &[0,4,0,1862,1,2];
pub const OID_ETSI_QCS_QC_RETENTION_PERIOD : &'static [u64] = &[0,4,0,1862,1,3];
pub const OID_ETSI_QCS_QC_SSCD : &'static [u64] = &[0,4,0,1862,1,4];
pub const OID_ETSI_QCS_QC_PDS : &'static [u64] = &[0,4,0,1862,1,5];

// OID: 2.5.4
// {
//      joint-iso-itu-t(2)
//      ds(5)
//      attributeType(4)
// }
pub const OID_AT_COMMON_NAME : &'static [u64] = &[2,5,4,3];
pub const OID_AT_SURNAME : &'static [u64] = &[2,5,4,4];
pub const OID_AT_SERIAL_NUMBER : &'static [u64] = &[2,5,4,5];
pub const OID_AT_COUNTRY_NAME : &'static [u64] = &[2,5,4,6];
pub const OID_AT_LOCALITY_NAME : &'static [u64] = &[2,5,4,7];
pub const OID_AT_STATE_OR_PROVINCE_NAME : &'static [u64] = &[2,5,4,8];
pub const OID_AT_STREET_ADDRESS : &'static [u64] = &[2,5,4,9];
pub const OID_AT_ORGANIZATION_NAME : &'static [u64] = &[2,5,4,10];
pub const OID_AT_ORGANIZATIONAL_UNIT_NAME : &'static [u64] = &[2,5,4,11];
pub const OID_AT_TITLE : &'static [u64] = &[2,5,4,12];
pub const OID_AT_POSTAL_CODE : &'static [u64] = &[2,5,4,17];
pub const OID_AT_GIVEN_NAME : &'static [u64] = &[2,5,4,42];
pub const OID_AT_INITIALS : &'static [u64] = &[2,5,4,43];
pub const OID_AT_GENERATION_QUALIFIER : &'static [u64] = &[2,5,4,44];
pub const OID_AT_DN_QUALIFIER : &'static [u64] = &[2,5,4,46];
pub const OID_AT_PSEUDONYM : &'static [u64] = &[2,5,4,65];
pub const OID_AT_ORGANIZATION_IDENTIFIER : &'static [u64] = &[2,5,4,97];

pub const OID_PKCS9_EMAIL_ADDRESS : &'static [u64] = &[1,2,840,113549,1,9,1];
pub const OID_DOMAIN_COMPONENT : &'static [u64] = &[0,9,2342,19200300,100,1,25];
pub const OID_USER_ID : &'static [u64] = &[0,9,2342,19200300,100,1,1];

// RFC 3739 personal data attributes
// OID: 1.3.6.1.5.5.7.9
pub const OID_PDA_DATE_OF_BIRTH : &'static [u64] = &[1,3,6,1,5,5,7,9,1];
pub const OID_PDA_PLACE_OF_BIRTH : &'static [u64] = &[1,3,6,1,5,5,7,9,2];
pub const OID_PDA_GENDER : &'static [u64] = &[1,3,6,1,5,5,7,9,3];
pub const OID_PDA_COUNTRY_OF_CITIZENSHIP : &'static [u64] = &[1,3,6,1,5,5,7,9,4];
pub const OID_PDA_COUNTRY_OF_RESIDENCE : &'static [u64] = &[1,3,6,1,5,5,7,9,5];

// policy qualifiers, RFC 5280 § 4.2.1.4
pub const OID_QT_CPS : &'static [u64] = &[1,3,6,1,5,5,7,2,1];
pub const OID_QT_UNOTICE : &'static [u64] = &[1,3,6,1,5,5,7,2,2];

// hash algorithms
pub const OID_SHA1 : &'static [u64] = &[1,3,14,3,2,26];
pub const OID_SHA256 : &'static [u64] = &[2,16,840,1,101,3,4,2,1];
pub const OID_SHA384 : &'static [u64] = &[2,16,840,1,101,3,4,2,2];
pub const OID_SHA512 : &'static [u64] = &[2,16,840,1,101,3,4,2,3];
pub const OID_SHA512_256 : &'static [u64] = &[2,16,840,1,101,3,4,2,6];

pub fn oid(components: &[u64]) -> ObjectIdentifier {
    ObjectIdentifier::from_slice(components)
}

/// Dotted-decimal form, e.g. `2.5.29.17`.
pub fn dotted(oid: &ObjectIdentifier) -> String {
    oid.components()
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Parses the dotted-decimal form. At least two arcs are required, the first
/// arc is 0, 1 or 2, and the second arc is below 40 under arcs 0 and 1.
pub fn parse_dotted(text: &str) -> Option<ObjectIdentifier> {
    let components = text
        .trim()
        .split('.')
        .map(|arc| {
            if arc.is_empty() || !arc.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            arc.parse::<u64>().ok()
        })
        .collect::<Option<Vec<u64>>>()?;
    if components.len() < 2 || components[0] > 2 {
        return None;
    }
    if components[0] < 2 && components[1] >= 40 {
        return None;
    }
    Some(ObjectIdentifier::new(components))
}

const NAMES : &'static [(&'static [u64], &'static str)] = &[
    (OID_AT_COMMON_NAME, "CN"),
    (OID_AT_SURNAME, "surname"),
    (OID_AT_SERIAL_NUMBER, "serialNumber"),
    (OID_AT_COUNTRY_NAME, "C"),
    (OID_AT_LOCALITY_NAME, "L"),
    (OID_AT_STATE_OR_PROVINCE_NAME, "ST"),
    (OID_AT_STREET_ADDRESS, "street"),
    (OID_AT_ORGANIZATION_NAME, "O"),
    (OID_AT_ORGANIZATIONAL_UNIT_NAME, "OU"),
    (OID_AT_TITLE, "title"),
    (OID_AT_POSTAL_CODE, "postalCode"),
    (OID_AT_GIVEN_NAME, "givenName"),
    (OID_AT_INITIALS, "initials"),
    (OID_AT_GENERATION_QUALIFIER, "generationQualifier"),
    (OID_AT_DN_QUALIFIER, "dnQualifier"),
    (OID_AT_PSEUDONYM, "pseudonym"),
    (OID_AT_ORGANIZATION_IDENTIFIER, "organizationIdentifier"),
    (OID_PKCS9_EMAIL_ADDRESS, "emailAddress"),
    (OID_DOMAIN_COMPONENT, "DC"),
    (OID_USER_ID, "UID"),
    (OID_PDA_DATE_OF_BIRTH, "dateOfBirth"),
    (OID_PDA_PLACE_OF_BIRTH, "placeOfBirth"),
    (OID_PDA_GENDER, "gender"),
    (OID_PDA_COUNTRY_OF_CITIZENSHIP, "countryOfCitizenship"),
    (OID_PDA_COUNTRY_OF_RESIDENCE, "countryOfResidence"),
    (OID_CE_SUBJECT_DIRECTORY_ATTRIBUTES, "subjectDirectoryAttributes"),
    (OID_CE_SUBJECT_KEY_IDENTIFIER, "subjectKeyIdentifier"),
    (OID_CE_KEY_USAGE, "keyUsage"),
    (OID_CE_PRIVATE_KEY_USAGE_PERIOD, "privateKeyUsagePeriod"),
    (OID_CE_SUBJECT_ALT_NAME, "subjectAltName"),
    (OID_CE_ISSUER_ALT_NAME, "issuerAltName"),
    (OID_CE_BASIC_CONSTRAINTS, "basicConstraints"),
    (OID_CE_NAME_CONSTRAINTS, "nameConstraints"),
    (OID_CE_CRL_DISTRIBUTION_POINTS, "cRLDistributionPoints"),
    (OID_CE_CERTIFICATE_POLICIES, "certificatePolicies"),
    (OID_CE_POLICY_MAPPINGS, "policyMappings"),
    (OID_CE_AUTHORITY_KEY_IDENTIFIER, "authorityKeyIdentifier"),
    (OID_CE_POLICY_CONSTRAINTS, "policyConstraints"),
    (OID_CE_EXT_KEY_USAGE, "extendedKeyUsage"),
    (OID_CE_FRESHEST_CRL, "freshestCRL"),
    (OID_CE_INHIBIT_ANY_POLICY, "inhibitAnyPolicy"),
    (OID_PE_AUTHORITY_INFO_ACCESS, "authorityInfoAccess"),
    (OID_PE_BIOMETRIC_INFO, "biometricInfo"),
    (OID_PE_QC_STATEMENTS, "qcStatements"),
    (OID_PE_SUBJECT_INFO_ACCESS, "subjectInfoAccess"),
    (OID_PE_TLS_FEATURE, "tlsFeature"),
    (OID_PKIX_OCSP_NOCHECK, "ocspNoCheck"),
    (OID_CT_PRECERT_SCTS, "signedCertificateTimestampList"),
    (OID_PKCS9_SMIME_CAPABILITIES, "smimeCapabilities"),
    (OID_ISISMTT_ADMISSION, "admission"),
    (OID_ISISMTT_RESTRICTION, "restriction"),
    (OID_ISISMTT_ADDITIONAL_INFORMATION, "additionalInformation"),
    (OID_VALIDITY_MODEL, "validityModel"),
    (OID_XIPKI_AUTHORIZATION_TEMPLATE, "authorizationTemplate"),
    (OID_GMT_0015_IDENTITY_CODE, "identityCode"),
    (OID_GMT_0015_INSURANCE_NUMBER, "insuranceNumber"),
    (OID_GMT_0015_IC_REGISTRATION_NUMBER, "icRegistrationNumber"),
    (OID_GMT_0015_ORGANIZATION_CODE, "organizationCode"),
    (OID_GMT_0015_TAXATION_NUMBER, "taxationNumber"),
];

/// Short name for the well-known identifiers, dotted form for the rest.
pub fn display_name(oid: &ObjectIdentifier) -> String {
    NAMES
        .iter()
        .find(|(components, _)| oid.components().as_slice() == *components)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| dotted(oid))
}

/// Resolves a short attribute name (`CN`, `emailAddress`, case-insensitive) or a
/// dotted OID.
pub fn attribute_type_from_name(name: &str) -> Option<ObjectIdentifier> {
    let name = name.trim();
    if let Some(oid) = parse_dotted(name) {
        return Some(oid);
    }
    let alias = match name.to_ascii_lowercase().as_str() {
        "commonname" => OID_AT_COMMON_NAME,
        "sn" => OID_AT_SURNAME,
        "serialnumber" => OID_AT_SERIAL_NUMBER,
        "countryname" => OID_AT_COUNTRY_NAME,
        "localityname" => OID_AT_LOCALITY_NAME,
        "stateorprovincename" => OID_AT_STATE_OR_PROVINCE_NAME,
        "organizationname" => OID_AT_ORGANIZATION_NAME,
        "organizationalunitname" => OID_AT_ORGANIZATIONAL_UNIT_NAME,
        "e" | "email" => OID_PKCS9_EMAIL_ADDRESS,
        _ => {
            return NAMES
                .iter()
                .find(|(_, short)| short.eq_ignore_ascii_case(name))
                .map(|(components, _)| oid(components))
        }
    };
    Some(oid(alias))
}
