use yasna::{DERWriter, DEREncodable};
use yasna::models::ObjectIdentifier;

//  SMIMECapability ::= SEQUENCE {
//      capabilityID OBJECT IDENTIFIER,
//      parameters ANY DEFINED BY capabilityID OPTIONAL }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmimeCapability {
    pub capability_id: ObjectIdentifier,
    /// DER of the parameters, when present.
    pub parameters: Option<Vec<u8>>,
}

//  SMIMECapabilities ::= SEQUENCE OF SMIMECapability
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmimeCapabilities(pub Vec<SmimeCapability>);

impl DEREncodable for SmimeCapabilities {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            for capability in self.0.iter() {
                writer.next().write_sequence(|writer| {
                    writer.next().write_oid(&capability.capability_id);
                    if let Some(parameters) = &capability.parameters {
                        writer.next().write_der(parameters);
                    }
                });
            }
        })
    }
}
