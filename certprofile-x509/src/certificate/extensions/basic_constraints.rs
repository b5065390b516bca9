use yasna::{DERWriter, DEREncodable};
use core::default::Default;

//  BasicConstraints ::= SEQUENCE {
//       cA                      BOOLEAN DEFAULT FALSE,
//       pathLenConstraint       INTEGER (0..MAX) OPTIONAL }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicConstraints {
    pub ca: bool,
    pub path_length_constraint: Option<u32>,
}

impl Default for BasicConstraints {
    fn default() -> Self {
        BasicConstraints {
            ca: false,
            path_length_constraint: None
        }
    }
}

impl DEREncodable for BasicConstraints {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            if self.ca {
                writer.next().write_bool(true);
            }
            if let Some(path_length_constraint) = self.path_length_constraint {
                writer.next().write_u32(path_length_constraint);
            }
        });
    }
}
