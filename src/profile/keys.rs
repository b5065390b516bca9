use crate::conf::{KeyAlgorithmConf, KeypairGenerationConf};
use crate::error::{ConfigError, PolicyViolation};
use certprofile_x509::certificate::{EcCurve, KeyAlgorithm, SubjectPublicKeyInfo};
use num_bigint::BigUint;

/// Whether, and how, the CA may generate the key pair for a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeypairGenControl {
    Forbidden,
    InheritCa,
    Rsa { key_size: u32, public_exponent: Option<BigUint> },
    Ec { curve: EcCurve },
    Dsa { p_length: u32, q_length: u32 },
    EdDsa(KeyAlgorithm),
}

impl Default for KeypairGenControl {
    fn default() -> Self {
        KeypairGenControl::Forbidden
    }
}

fn parameter<'a>(conf: &'a KeypairGenerationConf, name: &str) -> Result<&'a str, ConfigError> {
    conf.parameters
        .get(name)
        .map(|value| value.as_str())
        .ok_or_else(|| ConfigError::Missing(format!("keypair generation parameter {}", name)))
}

fn size_parameter(conf: &KeypairGenerationConf, name: &str) -> Result<u32, ConfigError> {
    let text = parameter(conf, name)?;
    text.trim().parse::<u32>().map_err(|e| ConfigError::InvalidValue {
        field: format!("keypair generation {}", name),
        value: text.to_string(),
        details: e.to_string(),
    })
}

fn public_exponent(text: &str) -> Result<BigUint, ConfigError> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16),
        None => BigUint::parse_bytes(text.as_bytes(), 10),
    };
    parsed.ok_or_else(|| ConfigError::InvalidValue {
        field: "keypair generation publicExponent".to_string(),
        value: text.to_string(),
        details: "not a decimal or 0x-prefixed hex integer".to_string(),
    })
}

impl KeypairGenControl {
    pub fn compile(conf: Option<&KeypairGenerationConf>) -> Result<Self, ConfigError> {
        let conf = match conf {
            None => return Ok(KeypairGenControl::Forbidden),
            Some(conf) => conf,
        };
        if conf.forbidden {
            return Ok(KeypairGenControl::Forbidden);
        }
        if conf.inherit_ca {
            return Ok(KeypairGenControl::InheritCa);
        }
        let key_type = conf.key_type.as_deref()
            .ok_or_else(|| ConfigError::Missing("keypair generation key_type".to_string()))?;
        let algorithm = key_type.parse::<KeyAlgorithm>().map_err(|details| ConfigError::InvalidValue {
            field: "keypair generation key_type".to_string(),
            value: key_type.to_string(),
            details,
        })?;
        Ok(match algorithm {
            KeyAlgorithm::Rsa => KeypairGenControl::Rsa {
                key_size: size_parameter(conf, "keysize")?,
                public_exponent: conf.parameters
                    .get("publicExponent")
                    .map(|text| public_exponent(text))
                    .transpose()?,
            },
            KeyAlgorithm::Ec => {
                let name = parameter(conf, "curve")?;
                let curve = name.parse::<EcCurve>().map_err(|details| ConfigError::InvalidValue {
                    field: "keypair generation curve".to_string(),
                    value: name.to_string(),
                    details,
                })?;
                KeypairGenControl::Ec { curve }
            },
            KeyAlgorithm::Dsa => KeypairGenControl::Dsa {
                p_length: size_parameter(conf, "plength")?,
                q_length: size_parameter(conf, "qlength")?,
            },
            eddsa => KeypairGenControl::EdDsa(eddsa),
        })
    }
}

/// A permitted subject public key algorithm. Empty parameter lists permit
/// any modulus size or curve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyAlgorithmControl {
    pub algorithm: KeyAlgorithm,
    pub modulus_sizes: Vec<u64>,
    pub curves: Vec<EcCurve>,
}

impl KeyAlgorithmControl {
    pub fn compile(conf: &KeyAlgorithmConf) -> Result<Self, ConfigError> {
        let algorithm = conf.algorithm.parse::<KeyAlgorithm>().map_err(|details| ConfigError::InvalidValue {
            field: "key_algorithms".to_string(),
            value: conf.algorithm.clone(),
            details,
        })?;
        let curves = conf.curves
            .iter()
            .map(|name| name.parse::<EcCurve>().map_err(|details| ConfigError::InvalidValue {
                field: "key_algorithms curves".to_string(),
                value: name.clone(),
                details,
            }))
            .collect::<Result<Vec<_>, _>>()?;
        if !curves.is_empty() && algorithm != KeyAlgorithm::Ec {
            return Err(ConfigError::InvalidValue {
                field: "key_algorithms curves".to_string(),
                value: conf.algorithm.clone(),
                details: "curves apply only to ec keys".to_string(),
            });
        }
        if !conf.modulus.is_empty() && algorithm != KeyAlgorithm::Rsa {
            return Err(ConfigError::InvalidValue {
                field: "key_algorithms modulus".to_string(),
                value: conf.algorithm.clone(),
                details: "modulus sizes apply only to rsa keys".to_string(),
            });
        }
        Ok(KeyAlgorithmControl { algorithm, modulus_sizes: conf.modulus.clone(), curves })
    }

    fn permits(&self, spki: &SubjectPublicKeyInfo) -> Result<(), String> {
        match self.algorithm {
            KeyAlgorithm::Rsa if !self.modulus_sizes.is_empty() => {
                let bits = spki.rsa_modulus_bits().ok_or("unreadable RSA public key")?;
                if !self.modulus_sizes.contains(&bits) {
                    return Err(format!("RSA modulus of {} bits", bits));
                }
            },
            KeyAlgorithm::Ec if !self.curves.is_empty() => {
                let curve = spki.ec_curve().ok_or("EC key without a known named curve")?;
                if !self.curves.contains(&curve) {
                    return Err(format!("EC curve {:?}", curve));
                }
            },
            _ => {},
        }
        Ok(())
    }
}

/// Checks a request key against the permitted algorithms. No entries permit
/// any key.
pub fn check_public_key(controls: &[KeyAlgorithmControl], spki: &SubjectPublicKeyInfo) -> Result<(), PolicyViolation> {
    if controls.is_empty() {
        return Ok(());
    }
    let algorithm = spki.key_algorithm().ok_or_else(|| PolicyViolation::KeyNotPermitted {
        details: format!("unknown key algorithm {}", certprofile_x509::certificate::oids::dotted(&spki.algorithm.algorithm)),
    })?;
    let control = controls
        .iter()
        .find(|control| control.algorithm == algorithm)
        .ok_or_else(|| PolicyViolation::KeyNotPermitted {
            details: format!("key algorithm {:?}", algorithm),
        })?;
    control.permits(spki).map_err(|details| PolicyViolation::KeyNotPermitted { details })
}
