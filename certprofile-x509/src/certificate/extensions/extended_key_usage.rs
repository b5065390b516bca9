use crate::certificate::oids;
use std::str::FromStr;
use yasna::{DERWriter, DEREncodable};
use yasna::models::ObjectIdentifier;

// OID: 1.3.6.1.5.5.7.3
// {
//      iso(1)
//      identified-organization(3)
//      dod(6)
//      internet(1)
//      security(5)
//      mechanisms(5)
//      pkix(7)
//      kp(3)
// }
const OID_KP_SERVER_AUTH : &'static [u64] = &[1,3,6,1,5,5,7,3,1];
const OID_KP_CLIENT_AUTH : &'static [u64] = &[1,3,6,1,5,5,7,3,2];
const OID_KP_CODE_SIGNING : &'static [u64] = &[1,3,6,1,5,5,7,3,3];
const OID_KP_EMAIL_PROTECTION : &'static [u64] = &[1,3,6,1,5,5,7,3,4];
const OID_KP_TIME_STAMPING : &'static [u64] = &[1,3,6,1,5,5,7,3,8];
const OID_KP_OCSP_SIGNING : &'static [u64] = &[1,3,6,1,5,5,7,3,9];

#[derive(Clone,Eq,PartialEq,Hash,Debug)]
pub enum KeyPurpose {
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
    TimeStamping,
    OcspSigning,
    Other(ObjectIdentifier),
}

impl From<KeyPurpose> for ObjectIdentifier {
    fn from (kp: KeyPurpose) -> Self {
        use KeyPurpose::*;
        match kp {
            ServerAuth => ObjectIdentifier::from_slice(OID_KP_SERVER_AUTH),
            ClientAuth => ObjectIdentifier::from_slice(OID_KP_CLIENT_AUTH),
            CodeSigning => ObjectIdentifier::from_slice(OID_KP_CODE_SIGNING),
            EmailProtection => ObjectIdentifier::from_slice(OID_KP_EMAIL_PROTECTION),
            TimeStamping => ObjectIdentifier::from_slice(OID_KP_TIME_STAMPING),
            OcspSigning => ObjectIdentifier::from_slice(OID_KP_OCSP_SIGNING),
            Other(oid) => oid,
        }
    }
}

/// Accepts the short purpose names or a dotted OID.
impl FromStr for KeyPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use KeyPurpose::*;
        match s.trim().to_ascii_lowercase().as_str() {
            "serverauth" => Ok(ServerAuth),
            "clientauth" => Ok(ClientAuth),
            "codesigning" => Ok(CodeSigning),
            "emailprotection" => Ok(EmailProtection),
            "timestamping" => Ok(TimeStamping),
            "ocspsigning" => Ok(OcspSigning),
            _ => oids::parse_dotted(s)
                .map(Other)
                .ok_or_else(|| format!("unknown key purpose '{}'", s)),
        }
    }
}

//  ExtKeyUsageSyntax ::= SEQUENCE SIZE (1..MAX) OF KeyPurposeId
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct ExtendedKeyUsage(pub Vec<KeyPurpose>);

impl DEREncodable for ExtendedKeyUsage {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            for kp in self.0.iter() {
                let oid = ObjectIdentifier::from(kp.clone());
                writer.next().write_oid(&oid)
            }
        })
    }
}
