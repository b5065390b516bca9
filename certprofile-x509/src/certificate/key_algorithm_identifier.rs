use std::str::FromStr;
use yasna::models::ObjectIdentifier;

/// Subject public key algorithms a profile may permit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Rsa,
    Dsa,
    Ec,
    Ed25519,
    Ed448,
    X25519,
    X448,
}

// RFC 3279 2.3.1
// OID: 1.2.840.113549.1.1.1
// {
//      iso(1)
//      member-body(2)
//      us(840)
//      rsadsi(113549)
//      pkcs(1)
//      pkcs-1(1)
//      rsaEncryption(1)
// }
const OID_RSA_ENCRYPTION : &'static [u64] = &[1,2,840,113549,1,1,1];
const OID_DSA : &'static [u64] = &[1,2,840,10040,4,1];

// RFC 5480 2.1.1
// OID: 1.2.840.10045.2.1
// {
//      iso(1)
//      member-body(2)
//      us(840)
//      ansi-x962(10045)
//      keyType(2)
//      ecPublicKey(1)
// }
const OID_EC_PUBLIC_KEY : &'static [u64] = &[1,2,840,10045,2,1];

// RFC 8410 3
const OID_X25519 : &'static [u64] = &[1,3,101,110];
const OID_X448 : &'static [u64] = &[1,3,101,111];
const OID_ED25519 : &'static [u64] = &[1,3,101,112];
const OID_ED448 : &'static [u64] = &[1,3,101,113];

impl KeyAlgorithm {
    pub fn oid(&self) -> ObjectIdentifier {
        use KeyAlgorithm::*;
        let components = match self {
            Rsa => OID_RSA_ENCRYPTION,
            Dsa => OID_DSA,
            Ec => OID_EC_PUBLIC_KEY,
            Ed25519 => OID_ED25519,
            Ed448 => OID_ED448,
            X25519 => OID_X25519,
            X448 => OID_X448,
        };
        ObjectIdentifier::from_slice(components)
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        use KeyAlgorithm::*;
        [Rsa, Dsa, Ec, Ed25519, Ed448, X25519, X448]
            .iter()
            .copied()
            .find(|algorithm| &algorithm.oid() == oid)
    }
}

impl FromStr for KeyAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use KeyAlgorithm::*;
        match s.to_ascii_lowercase().as_str() {
            "rsa" | "rsaencryption" => Ok(Rsa),
            "dsa" => Ok(Dsa),
            "ec" | "ecdsa" | "ecpublickey" => Ok(Ec),
            "ed25519" => Ok(Ed25519),
            "ed448" => Ok(Ed448),
            "x25519" => Ok(X25519),
            "x448" => Ok(X448),
            other => Err(format!("unknown key algorithm '{}'", other)),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EcCurve {
    P256,
    P384,
    P521,
    BrainpoolP256r1,
    BrainpoolP384r1,
    BrainpoolP512r1,
    Sm2p256v1,
}

impl EcCurve {
    pub fn oid(&self) -> ObjectIdentifier {
        use EcCurve::*;
        let components : &'static [u64] = match self {
            // RFC 5480 2.1.1.1 - secp256r1
            // OID: 1.2.840.10045.3.1.7
            // {
            //      iso(1)
            //      member-body(2)
            //      us(840)
            //      ansi-x962(10045)
            //      curves(3)
            //      prime(1)
            //      prime256v1(7)
            // }
            P256 => &[1,2,840,10045,3,1,7],
            // RFC 5480 2.1.1.1 - secp384r1
            // OID: 1.3.132.0.34
            // {
            //      iso(1)
            //      identified-organization(3)
            //      certicom(132)
            //      curve(0)
            //      ansip384r1(34)
            // }
            P384 => &[1,3,132,0,34],
            P521 => &[1,3,132,0,35],
            BrainpoolP256r1 => &[1,3,36,3,3,2,8,1,1,7],
            BrainpoolP384r1 => &[1,3,36,3,3,2,8,1,1,11],
            BrainpoolP512r1 => &[1,3,36,3,3,2,8,1,1,13],
            Sm2p256v1 => &[1,2,156,10197,1,301],
        };
        ObjectIdentifier::from_slice(components)
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        use EcCurve::*;
        [P256, P384, P521, BrainpoolP256r1, BrainpoolP384r1, BrainpoolP512r1, Sm2p256v1]
            .iter()
            .copied()
            .find(|curve| &curve.oid() == oid)
    }
}

impl FromStr for EcCurve {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use EcCurve::*;
        match s.to_ascii_lowercase().as_str() {
            "p-256" | "p256" | "secp256r1" | "prime256v1" => Ok(P256),
            "p-384" | "p384" | "secp384r1" => Ok(P384),
            "p-521" | "p521" | "secp521r1" => Ok(P521),
            "brainpoolp256r1" => Ok(BrainpoolP256r1),
            "brainpoolp384r1" => Ok(BrainpoolP384r1),
            "brainpoolp512r1" => Ok(BrainpoolP512r1),
            "sm2p256v1" | "sm2" => Ok(Sm2p256v1),
            other => Err(format!("unknown curve '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p256_curve_should_map_to_its_oid () {
        let p_256 = ObjectIdentifier::from_slice(&[1,2,840,10045,3,1,7]);
        assert_eq!(EcCurve::P256.oid(), p_256);
        assert_eq!(EcCurve::from_oid(&p_256), Some(EcCurve::P256));
        assert_eq!("secp256r1".parse(), Ok(EcCurve::P256));
    }

    #[test]
    fn key_algorithms_should_map_from_oid () {
        let ec_public_key = ObjectIdentifier::from_slice(&[1,2,840,10045,2,1]);
        assert_eq!(KeyAlgorithm::from_oid(&ec_public_key), Some(KeyAlgorithm::Ec));
        assert_eq!(KeyAlgorithm::from_oid(&ObjectIdentifier::from_slice(&[1,2,3])), None);
        assert_eq!("RSA".parse(), Ok(KeyAlgorithm::Rsa));
    }
}
