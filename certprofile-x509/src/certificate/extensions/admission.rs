use crate::certificate::directory_string::AttributeValue;
use crate::certificate::general_name::GeneralName;
use yasna::{DERWriter, DEREncodable, Tag};
use yasna::models::ObjectIdentifier;

//  NamingAuthority ::= SEQUENCE {
//      namingAuthorityId   OBJECT IDENTIFIER OPTIONAL,
//      namingAuthorityUrl  IA5String OPTIONAL,
//      namingAuthorityText DirectoryString(SIZE(1..128)) OPTIONAL }
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct NamingAuthority {
    pub id: Option<ObjectIdentifier>,
    pub url: Option<String>,
    pub text: Option<AttributeValue>,
}

impl DEREncodable for NamingAuthority {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            if let Some(id) = &self.id {
                writer.next().write_oid(id);
            }
            if let Some(url) = &self.url {
                writer.next().write_ia5_string(url);
            }
            if let Some(text) = &self.text {
                text.encode_der(writer.next());
            }
        })
    }
}

//  ProfessionInfo ::= SEQUENCE {
//      namingAuthority    [0] EXPLICIT NamingAuthority OPTIONAL,
//      professionItems    SEQUENCE OF DirectoryString (SIZE(1..128)),
//      professionOIDs     SEQUENCE OF OBJECT IDENTIFIER OPTIONAL,
//      registrationNumber PrintableString(SIZE(1..128)) OPTIONAL,
//      addProfessionInfo  OCTET STRING OPTIONAL }
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ProfessionInfo {
    pub naming_authority: Option<NamingAuthority>,
    pub profession_items: Vec<AttributeValue>,
    pub profession_oids: Vec<ObjectIdentifier>,
    pub registration_number: Option<String>,
    pub add_profession_info: Option<Vec<u8>>,
}

impl DEREncodable for ProfessionInfo {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            if let Some(naming_authority) = &self.naming_authority {
                writer.next().write_tagged(Tag::context(0), |writer| {
                    naming_authority.encode_der(writer)
                });
            }
            writer.next().write_sequence(|writer| {
                for item in self.profession_items.iter() {
                    item.encode_der(writer.next());
                }
            });
            if !self.profession_oids.is_empty() {
                writer.next().write_sequence(|writer| {
                    for oid in self.profession_oids.iter() {
                        writer.next().write_oid(oid);
                    }
                });
            }
            if let Some(registration_number) = &self.registration_number {
                writer.next().write_printable_string(registration_number);
            }
            if let Some(info) = &self.add_profession_info {
                writer.next().write_bytes(info);
            }
        })
    }
}

//  Admissions ::= SEQUENCE {
//      admissionAuthority [0] EXPLICIT GeneralName OPTIONAL,
//      namingAuthority    [1] EXPLICIT NamingAuthority OPTIONAL,
//      professionInfos    SEQUENCE OF ProfessionInfo }
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Admissions {
    pub admission_authority: Option<GeneralName>,
    pub naming_authority: Option<NamingAuthority>,
    pub profession_infos: Vec<ProfessionInfo>,
}

impl DEREncodable for Admissions {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            if let Some(authority) = &self.admission_authority {
                writer.next().write_tagged(Tag::context(0), |writer| {
                    authority.encode_der(writer)
                });
            }
            if let Some(naming_authority) = &self.naming_authority {
                writer.next().write_tagged(Tag::context(1), |writer| {
                    naming_authority.encode_der(writer)
                });
            }
            writer.next().write_sequence(|writer| {
                for info in self.profession_infos.iter() {
                    info.encode_der(writer.next());
                }
            });
        })
    }
}

//  AdmissionSyntax ::= SEQUENCE {
//      admissionAuthority   GeneralName OPTIONAL,
//      contentsOfAdmissions SEQUENCE OF Admissions }
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AdmissionSyntax {
    pub admission_authority: Option<GeneralName>,
    pub contents_of_admissions: Vec<Admissions>,
}

impl DEREncodable for AdmissionSyntax {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            if let Some(authority) = &self.admission_authority {
                authority.encode_der(writer.next());
            }
            writer.next().write_sequence(|writer| {
                for admissions in self.contents_of_admissions.iter() {
                    admissions.encode_der(writer.next());
                }
            });
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_syntax_should_encode_correctly () {
        let expected = vec!(0x30,0x11, // SEQUENCE, 17 bytes -- AdmissionSyntax
            0x30,0x0f, // SEQUENCE, 15 bytes -- contentsOfAdmissions
                0x30,0x0d, // SEQUENCE, 13 bytes -- Admissions
                    0x30,0x0b, // SEQUENCE, 11 bytes -- professionInfos
                        0x30,0x09, // SEQUENCE, 9 bytes -- ProfessionInfo
                            0x30,0x04, // SEQUENCE, 4 bytes -- professionItems
                                0x0c,0x02, // UTF8String, 2 bytes
                                    0x44,0x72, // "Dr"
                            0x13,0x01, // PrintableString, 1 byte -- registrationNumber
                                0x37); // "7"
        let syntax = AdmissionSyntax {
            admission_authority: None,
            contents_of_admissions: vec!(Admissions {
                profession_infos: vec!(ProfessionInfo {
                    profession_items: vec!(AttributeValue::Utf8String("Dr".to_string())),
                    registration_number: Some("7".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
        };
        assert_eq!(yasna::encode_der(&syntax), expected);
    }
}
