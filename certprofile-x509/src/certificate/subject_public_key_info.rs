use crate::certificate::algorithm_identifier::AlgorithmIdentifier;
use crate::certificate::key_algorithm_identifier::{EcCurve, KeyAlgorithm};
use num_bigint::BigUint;
use yasna::{
    ASN1Result,
    DERWriter,
    DEREncodable,
    BERReader,
    BERDecodable,
};

//  SubjectPublicKeyInfo  ::=  SEQUENCE  {
//       algorithm            AlgorithmIdentifier,
//       subjectPublicKey     BIT STRING  }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectPublicKeyInfo {
    pub algorithm: AlgorithmIdentifier,
    pub subject_public_key: Vec<u8>,
}

impl SubjectPublicKeyInfo {
    pub fn key_algorithm(&self) -> Option<KeyAlgorithm> {
        KeyAlgorithm::from_oid(&self.algorithm.algorithm)
    }

    /// Named curve of an EC key; `None` for other keys or explicit curve
    /// parameters.
    pub fn ec_curve(&self) -> Option<EcCurve> {
        if self.key_algorithm() != Some(KeyAlgorithm::Ec) {
            return None
        }
        let parameters = self.algorithm.parameters.as_ref()?;
        let curve = yasna::parse_der(parameters, |reader| reader.read_oid()).ok()?;
        EcCurve::from_oid(&curve)
    }

    /// Bit length of an RSA modulus.
    //  RSAPublicKey ::= SEQUENCE {
    //      modulus            INTEGER,    -- n
    //      publicExponent     INTEGER  }  -- e
    pub fn rsa_modulus_bits(&self) -> Option<u64> {
        if self.key_algorithm() != Some(KeyAlgorithm::Rsa) {
            return None
        }
        let (modulus, _exponent) = yasna::parse_der(&self.subject_public_key, |reader| {
            reader.read_sequence(|reader| {
                let modulus: BigUint = reader.next().read_biguint()?;
                let exponent: BigUint = reader.next().read_biguint()?;
                Ok((modulus, exponent))
            })
        }).ok()?;
        Some(modulus.bits())
    }
}

impl DEREncodable for SubjectPublicKeyInfo {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            self.algorithm.encode_der(writer.next());
            writer.next().write_bitvec_bytes(&self.subject_public_key, self.subject_public_key.len() * 8);
        })
    }
}

impl BERDecodable for SubjectPublicKeyInfo {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        reader.read_sequence(|reader| {
            let algorithm = AlgorithmIdentifier::decode_ber(reader.next())?;
            let (subject_public_key, _bits) = reader.next().read_bitvec_bytes()?;
            Ok(SubjectPublicKeyInfo { algorithm, subject_public_key })
        })
    }
}
