use crate::certificate::oids::*;
use yasna::{DERWriter, DEREncodable, Tag};
use yasna::models::ObjectIdentifier;

//  PolicyQualifierInfo ::= SEQUENCE {
//       policyQualifierId  PolicyQualifierId,
//       qualifier          ANY DEFINED BY policyQualifierId }
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PolicyQualifier {
    /// CPSuri ::= IA5String
    CpsUri(String),
    UserNotice {
        notice_ref: Option<NoticeReference>,
        explicit_text: Option<String>,
    },
}

//  NoticeReference ::= SEQUENCE {
//       organization     DisplayText,
//       noticeNumbers    SEQUENCE OF INTEGER }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoticeReference {
    pub organization: String,
    pub notice_numbers: Vec<u64>,
}

impl DEREncodable for PolicyQualifier {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| match self {
            PolicyQualifier::CpsUri(uri) => {
                writer.next().write_oid(&oid(OID_QT_CPS));
                writer.next().write_ia5_string(uri);
            },
            PolicyQualifier::UserNotice { notice_ref, explicit_text } => {
                writer.next().write_oid(&oid(OID_QT_UNOTICE));
                writer.next().write_sequence(|writer| {
                    if let Some(notice_ref) = notice_ref {
                        writer.next().write_sequence(|writer| {
                            writer.next().write_utf8_string(&notice_ref.organization);
                            writer.next().write_sequence(|writer| {
                                for number in notice_ref.notice_numbers.iter() {
                                    writer.next().write_u64(*number);
                                }
                            });
                        });
                    }
                    if let Some(text) = explicit_text {
                        writer.next().write_utf8_string(text);
                    }
                });
            },
        })
    }
}

//  PolicyInformation ::= SEQUENCE {
//       policyIdentifier   CertPolicyId,
//       policyQualifiers   SEQUENCE SIZE (1..MAX) OF
//                               PolicyQualifierInfo OPTIONAL }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyInformation {
    pub policy_identifier: ObjectIdentifier,
    pub qualifiers: Vec<PolicyQualifier>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificatePolicies(pub Vec<PolicyInformation>);

impl DEREncodable for CertificatePolicies {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            for policy in self.0.iter() {
                writer.next().write_sequence(|writer| {
                    writer.next().write_oid(&policy.policy_identifier);
                    if !policy.qualifiers.is_empty() {
                        writer.next().write_sequence(|writer| {
                            for qualifier in policy.qualifiers.iter() {
                                qualifier.encode_der(writer.next());
                            }
                        });
                    }
                });
            }
        })
    }
}

//  PolicyMappings ::= SEQUENCE SIZE (1..MAX) OF SEQUENCE {
//       issuerDomainPolicy      CertPolicyId,
//       subjectDomainPolicy     CertPolicyId }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyMapping {
    pub issuer_domain_policy: ObjectIdentifier,
    pub subject_domain_policy: ObjectIdentifier,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyMappings(pub Vec<PolicyMapping>);

impl DEREncodable for PolicyMappings {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            for mapping in self.0.iter() {
                writer.next().write_sequence(|writer| {
                    writer.next().write_oid(&mapping.issuer_domain_policy);
                    writer.next().write_oid(&mapping.subject_domain_policy);
                });
            }
        })
    }
}

//  PolicyConstraints ::= SEQUENCE {
//       requireExplicitPolicy           [0] SkipCerts OPTIONAL,
//       inhibitPolicyMapping            [1] SkipCerts OPTIONAL }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyConstraints {
    pub require_explicit_policy: Option<u32>,
    pub inhibit_policy_mapping: Option<u32>,
}

impl DEREncodable for PolicyConstraints {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            if let Some(skip_certs) = self.require_explicit_policy {
                writer.next().write_tagged_implicit(Tag::context(0), |writer| {
                    writer.write_u32(skip_certs)
                });
            }
            if let Some(skip_certs) = self.inhibit_policy_mapping {
                writer.next().write_tagged_implicit(Tag::context(1), |writer| {
                    writer.write_u32(skip_certs)
                });
            }
        })
    }
}

//  InhibitAnyPolicy ::= SkipCerts
//  SkipCerts ::= INTEGER (0..MAX)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InhibitAnyPolicy(pub u32);

impl DEREncodable for InhibitAnyPolicy {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_u32(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inhibit_any_policy_should_encode_correctly () {
        let expected = vec!(0x02,0x01, // INTEGER, 1 byte
            0x02); // skip 2 certs
        assert_eq!(yasna::encode_der(&InhibitAnyPolicy(2)), expected);
    }

    #[test]
    fn policy_constraints_should_use_implicit_tags () {
        let expected = vec!(0x30,0x06, // SEQUENCE, 6 bytes
            0x80,0x01, // [0] IMPLICIT INTEGER, 1 byte
                0x00, // requireExplicitPolicy 0
            0x81,0x01, // [1] IMPLICIT INTEGER, 1 byte
                0x03); // inhibitPolicyMapping 3
        let constraints = PolicyConstraints {
            require_explicit_policy: Some(0),
            inhibit_policy_mapping: Some(3),
        };
        assert_eq!(yasna::encode_der(&constraints), expected);
    }

    #[test]
    fn policy_mappings_should_encode_correctly () {
        let expected = vec!(0x30,0x0a, // SEQUENCE, 10 bytes
            0x30,0x08, // SEQUENCE, 8 bytes
                0x06,0x02, // OID, 2 bytes
                    0x2a,0x03, // encoding of OID(1.2.3)
                0x06,0x02, // OID, 2 bytes
                    0x2a,0x04); // encoding of OID(1.2.4)
        let mappings = PolicyMappings(vec!(PolicyMapping {
            issuer_domain_policy: oid(&[1,2,3]),
            subject_domain_policy: oid(&[1,2,4]),
        }));
        assert_eq!(yasna::encode_der(&mappings), expected);
    }

    #[test]
    fn certificate_policies_with_cps_should_encode_correctly () {
        let expected = vec!(0x30,0x1a, // SEQUENCE, 26 bytes
            0x30,0x18, // SEQUENCE, 24 bytes -- PolicyInformation
                0x06,0x02, // OID, 2 bytes
                    0x2a,0x03, // encoding of OID(1.2.3)
                0x30,0x12, // SEQUENCE, 18 bytes -- policyQualifiers
                    0x30,0x10, // SEQUENCE, 16 bytes -- PolicyQualifierInfo
                        0x06,0x08, // OID, 8 bytes
                            0x2b,0x06,0x01,0x05,0x05,0x07,0x02,0x01, // encoding of OID(1.3.6.1.5.5.7.2.1)
                        0x16,0x04, // IA5String, 4 bytes
                            0x68,0x74,0x74,0x70); // "http"
        let policies = CertificatePolicies(vec!(PolicyInformation {
            policy_identifier: oid(&[1,2,3]),
            qualifiers: vec!(PolicyQualifier::CpsUri("http".to_string())),
        }));
        assert_eq!(yasna::encode_der(&policies), expected);
    }
}
