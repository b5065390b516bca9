use yasna::{DERWriter, DEREncodable};

//  Features ::= SEQUENCE OF INTEGER   -- RFC 7633
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsFeature(pub Vec<u16>);

impl TlsFeature {
    /// Feature codes in ascending order, duplicates kept.
    pub fn canonical(features: &[u16]) -> Self {
        let mut features = features.to_vec();
        features.sort();
        TlsFeature(features)
    }
}

impl DEREncodable for TlsFeature {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            for feature in self.0.iter() {
                writer.next().write_u16(*feature);
            }
        })
    }
}
