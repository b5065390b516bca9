use yasna::{DERWriter, DEREncodable};
use yasna::models::ObjectIdentifier;

//  AuthorizationTemplate ::= SEQUENCE {
//      type          OBJECT IDENTIFIER,
//      accessRights  OCTET STRING }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationTemplate {
    pub template_type: ObjectIdentifier,
    pub access_rights: Vec<u8>,
}

impl DEREncodable for AuthorizationTemplate {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            writer.next().write_oid(&self.template_type);
            writer.next().write_bytes(&self.access_rights);
        })
    }
}
