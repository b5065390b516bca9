use crate::certificate::oids;
use std::fmt;
use std::str::FromStr;
use yasna::{DERWriter, DEREncodable};
use yasna::models::ObjectIdentifier;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    Sha256WithRsa,
    Sha384WithRsa,
    Sha512WithRsa,
    Sha256WithRsaPss,
    Sha384WithRsaPss,
    Sha512WithRsaPss,
    EcdsaWithSha256,
    EcdsaWithSha384,
    EcdsaWithSha512,
    DsaWithSha256,
    Sm3WithSm2,
    Ed25519,
    Ed448,
}

use SignatureAlgorithm::*;

const ALL : &'static [SignatureAlgorithm] = &[
    Sha256WithRsa, Sha384WithRsa, Sha512WithRsa,
    Sha256WithRsaPss, Sha384WithRsaPss, Sha512WithRsaPss,
    EcdsaWithSha256, EcdsaWithSha384, EcdsaWithSha512,
    DsaWithSha256, Sm3WithSm2, Ed25519, Ed448,
];

impl SignatureAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Sha256WithRsa => "SHA256withRSA",
            Sha384WithRsa => "SHA384withRSA",
            Sha512WithRsa => "SHA512withRSA",
            Sha256WithRsaPss => "SHA256withRSAandMGF1",
            Sha384WithRsaPss => "SHA384withRSAandMGF1",
            Sha512WithRsaPss => "SHA512withRSAandMGF1",
            EcdsaWithSha256 => "SHA256withECDSA",
            EcdsaWithSha384 => "SHA384withECDSA",
            EcdsaWithSha512 => "SHA512withECDSA",
            DsaWithSha256 => "SHA256withDSA",
            Sm3WithSm2 => "SM3withSM2",
            Ed25519 => "Ed25519",
            Ed448 => "Ed448",
        }
    }

    pub fn oid(&self) -> ObjectIdentifier {
        let components : &'static [u64] = match self {
            Sha256WithRsa => &[1,2,840,113549,1,1,11],
            Sha384WithRsa => &[1,2,840,113549,1,1,12],
            Sha512WithRsa => &[1,2,840,113549,1,1,13],
            // RSASSA-PSS, the hash lives in the parameters
            Sha256WithRsaPss | Sha384WithRsaPss | Sha512WithRsaPss => &[1,2,840,113549,1,1,10],
            // OID: 1.2.840.10045.4.3.2
            // {
            //      iso(1)
            //      member-body(2)
            //      us(840)
            //      ansi-x962(10045)
            //      signatures(4)
            //      ecdsa-with-SHA2(3)
            //      ecdsa-with-SHA256(2)
            // }
            EcdsaWithSha256 => &[1,2,840,10045,4,3,2],
            EcdsaWithSha384 => &[1,2,840,10045,4,3,3],
            EcdsaWithSha512 => &[1,2,840,10045,4,3,4],
            DsaWithSha256 => &[2,16,840,1,101,3,4,3,2],
            Sm3WithSm2 => &[1,2,156,10197,1,501],
            Ed25519 => &[1,3,101,112],
            Ed448 => &[1,3,101,113],
        };
        ObjectIdentifier::from_slice(components)
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Accepts the canonical name in any case, the `ecdsa-with-SHA256` style
/// aliases, and for algorithms with a unique OID the dotted OID.
impl FromStr for SignatureAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s.trim());
        if let Some(found) = ALL.iter().find(|a| normalize(a.name()) == wanted) {
            return Ok(*found);
        }
        let alias = match wanted.as_str() {
            "sha256withrsaencryption" => Some(Sha256WithRsa),
            "sha384withrsaencryption" => Some(Sha384WithRsa),
            "sha512withrsaencryption" => Some(Sha512WithRsa),
            "ecdsawithsha256" => Some(EcdsaWithSha256),
            "ecdsawithsha384" => Some(EcdsaWithSha384),
            "ecdsawithsha512" => Some(EcdsaWithSha512),
            "sha256withrsapss" => Some(Sha256WithRsaPss),
            "sha384withrsapss" => Some(Sha384WithRsaPss),
            "sha512withrsapss" => Some(Sha512WithRsaPss),
            "eddsa" => Some(Ed25519),
            _ => None,
        };
        if let Some(found) = alias {
            return Ok(found);
        }
        if let Some(oid) = oids::parse_dotted(s) {
            let matching: Vec<&SignatureAlgorithm> = ALL.iter().filter(|a| a.oid() == oid).collect();
            if matching.len() == 1 {
                return Ok(*matching[0]);
            }
        }
        Err(format!("unknown signature algorithm '{}'", s))
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl DEREncodable for SignatureAlgorithm {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            writer.next().write_oid(&self.oid());
            match self {
                Sha256WithRsa | Sha384WithRsa | Sha512WithRsa => writer.next().write_null(),
                _ => (),
            }
        })
    }
}
