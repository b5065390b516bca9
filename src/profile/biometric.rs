use crate::conf::{BiometricInfoConf, TripleState};
use crate::error::{ConfigError, PolicyViolation};
use crate::profile::controls::parse_oid;
use certprofile_x509::certificate::extensions::{BiometricData, BiometricSyntax, Extension, TypeOfBiometricData};
use certprofile_x509::certificate::oids::{self, *};
use certprofile_x509::certificate::AlgorithmIdentifier;
use ring::digest;
use yasna::BERDecodable;
use yasna::models::ObjectIdentifier;

const HASH_ALGORITHMS : &'static [(&'static [u64], &'static digest::Algorithm)] = &[
    (OID_SHA1, &digest::SHA1_FOR_LEGACY_USE_ONLY),
    (OID_SHA256, &digest::SHA256),
    (OID_SHA384, &digest::SHA384),
    (OID_SHA512, &digest::SHA512),
    (OID_SHA512_256, &digest::SHA512_256),
];

fn hash_algorithm(name: &str) -> Option<(ObjectIdentifier, &'static digest::Algorithm)> {
    let components: &[u64] = match name.trim().to_ascii_uppercase().replace('-', "").as_str() {
        "SHA1" => OID_SHA1,
        "SHA256" => OID_SHA256,
        "SHA384" => OID_SHA384,
        "SHA512" => OID_SHA512,
        "SHA512/256" | "SHA512_256" => OID_SHA512_256,
        _ => {
            let oid = oids::parse_dotted(name)?;
            return HASH_ALGORITHMS
                .iter()
                .find(|(known, _)| oid.components().as_slice() == *known)
                .map(|(_, algorithm)| (oid.clone(), *algorithm));
        }
    };
    HASH_ALGORITHMS
        .iter()
        .find(|(known, _)| *known == components)
        .map(|(known, algorithm)| (oids::oid(known), *algorithm))
}

fn biometric_type(name: &str) -> Result<TypeOfBiometricData, ConfigError> {
    match name.trim() {
        "picture" => Ok(TypeOfBiometricData::PICTURE),
        "handwrittenSignature" | "handwritten-signature" => Ok(TypeOfBiometricData::HANDWRITTEN_SIGNATURE),
        text if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => text
            .parse::<u32>()
            .map(TypeOfBiometricData::Predefined)
            .map_err(|e| ConfigError::InvalidValue {
                field: "biometricInfo types".to_string(),
                value: text.to_string(),
                details: e.to_string(),
            }),
        text => parse_oid(text).map(TypeOfBiometricData::Oid),
    }
}

/// What a request's biometric data may contain.
#[derive(Clone, Debug)]
pub struct BiometricInfoOption {
    pub types: Vec<TypeOfBiometricData>,
    pub hash_algorithms: Vec<(ObjectIdentifier, &'static digest::Algorithm)>,
    pub source_data_uri: TripleState,
}

impl BiometricInfoOption {
    pub fn compile(conf: &BiometricInfoConf) -> Result<Self, ConfigError> {
        if conf.types.is_empty() || conf.hash_algorithms.is_empty() {
            return Err(ConfigError::Missing("biometricInfo types and hash_algorithms".to_string()));
        }
        let types = conf.types
            .iter()
            .map(|name| biometric_type(name))
            .collect::<Result<Vec<_>, _>>()?;
        let hash_algorithms = conf.hash_algorithms
            .iter()
            .map(|name| hash_algorithm(name).ok_or_else(|| ConfigError::InvalidValue {
                field: "biometricInfo hash_algorithms".to_string(),
                value: name.clone(),
                details: "no known output length".to_string(),
            }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BiometricInfoOption { types, hash_algorithms, source_data_uri: conf.include_source_data_uri })
    }

    fn check(&self, index: usize, data: &BiometricData) -> Result<BiometricData, PolicyViolation> {
        let refuse = |details: String| PolicyViolation::BiometricNotPermitted { index, details };
        if !self.types.contains(&data.type_of_biometric_data) {
            return Err(refuse(format!("biometric data type {:?}", data.type_of_biometric_data)));
        }
        let algorithm_id = &data.hash_algorithm.algorithm;
        let (oid, algorithm) = self.hash_algorithms
            .iter()
            .find(|(oid, _)| oid == algorithm_id)
            .ok_or_else(|| refuse(format!("hash algorithm {}", oids::dotted(algorithm_id))))?;
        if !data.hash_algorithm.has_absent_or_null_parameters() {
            return Err(refuse("hash algorithm with parameters".to_string()));
        }
        if data.biometric_data_hash.len() != algorithm.output_len() {
            return Err(refuse(format!(
                "hash of {} bytes, {} expected",
                data.biometric_data_hash.len(),
                algorithm.output_len()
            )));
        }
        let source_data_uri = match self.source_data_uri {
            TripleState::Forbidden => None,
            TripleState::Required if data.source_data_uri.is_none() =>
                return Err(refuse("sourceDataUri is required".to_string())),
            _ => data.source_data_uri.clone(),
        };
        Ok(BiometricData {
            type_of_biometric_data: data.type_of_biometric_data.clone(),
            hash_algorithm: AlgorithmIdentifier::with_null_parameters(oid.clone()),
            biometric_data_hash: data.biometric_data_hash.clone(),
            source_data_uri,
        })
    }

    /// Checks and re-encodes the request's biometric data. Nothing is emitted
    /// when the request carries none.
    pub fn resolve(&self, requested: Option<&Extension>) -> Result<Option<Vec<u8>>, PolicyViolation> {
        let requested = match requested {
            Some(requested) => requested,
            None => return Ok(None),
        };
        let malformed = |details: String| PolicyViolation::MalformedRequestExtension {
            extension: oids::display_name(&oids::oid(OID_PE_BIOMETRIC_INFO)),
            details,
        };
        let syntax = yasna::parse_der(requested.value(), BiometricSyntax::decode_ber)
            .map_err(|e| malformed(e.to_string()))?;
        if syntax.0.is_empty() {
            return Err(malformed("no biometric data".to_string()));
        }
        let checked = syntax.0
            .iter()
            .enumerate()
            .map(|(index, data)| self.check(index, data))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(yasna::encode_der(&BiometricSyntax(checked))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(uri: TripleState) -> BiometricInfoOption {
        BiometricInfoOption::compile(&BiometricInfoConf {
            types: vec!("picture".to_string()),
            hash_algorithms: vec!("SHA-256".to_string()),
            include_source_data_uri: uri,
        }).unwrap()
    }

    fn request(data: BiometricData) -> Extension {
        Extension::from_value(oid(OID_PE_BIOMETRIC_INFO), false, &BiometricSyntax(vec!(data)))
    }

    fn picture(hash_len: usize, uri: Option<&str>) -> BiometricData {
        BiometricData {
            type_of_biometric_data: TypeOfBiometricData::PICTURE,
            hash_algorithm: AlgorithmIdentifier::new(oid(OID_SHA256)),
            biometric_data_hash: vec!(0xab; hash_len),
            source_data_uri: uri.map(|uri| uri.to_string()),
        }
    }

    #[test]
    fn unknown_hash_algorithm_should_fail_compilation () {
        let conf = BiometricInfoConf {
            types: vec!("picture".to_string()),
            hash_algorithms: vec!("MD5".to_string()),
            include_source_data_uri: TripleState::Optional,
        };
        assert!(matches!(BiometricInfoOption::compile(&conf), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn absent_request_should_emit_nothing () {
        assert_eq!(option(TripleState::Optional).resolve(None), Ok(None));
    }

    #[test]
    fn hash_algorithm_should_be_reemitted_with_null_parameters () {
        let resolved = option(TripleState::Optional)
            .resolve(Some(&request(picture(32, Some("https://b.example/p")))))
            .unwrap()
            .unwrap();
        let syntax = yasna::parse_der(&resolved, BiometricSyntax::decode_ber).unwrap();
        assert_eq!(syntax.0[0].hash_algorithm, AlgorithmIdentifier::with_null_parameters(oid(OID_SHA256)));
        assert_eq!(syntax.0[0].source_data_uri, Some("https://b.example/p".to_string()));
    }

    #[test]
    fn wrong_hash_length_should_be_rejected () {
        let result = option(TripleState::Optional).resolve(Some(&request(picture(20, None))));
        assert!(matches!(result, Err(PolicyViolation::BiometricNotPermitted { index: 0, .. })));
    }

    #[test]
    fn forbidden_uri_should_be_stripped () {
        let resolved = option(TripleState::Forbidden)
            .resolve(Some(&request(picture(32, Some("https://b.example/p")))))
            .unwrap()
            .unwrap();
        let syntax = yasna::parse_der(&resolved, BiometricSyntax::decode_ber).unwrap();
        assert_eq!(syntax.0[0].source_data_uri, None);
    }

    #[test]
    fn required_uri_should_be_present () {
        let result = option(TripleState::Required).resolve(Some(&request(picture(32, None))));
        assert!(matches!(result, Err(PolicyViolation::BiometricNotPermitted { index: 0, .. })));
    }

    #[test]
    fn unpermitted_type_should_be_rejected () {
        let mut data = picture(32, None);
        data.type_of_biometric_data = TypeOfBiometricData::HANDWRITTEN_SIGNATURE;
        let result = option(TripleState::Optional).resolve(Some(&request(data)));
        assert!(matches!(result, Err(PolicyViolation::BiometricNotPermitted { .. })));
    }

    #[test]
    fn empty_biometric_syntax_should_be_malformed () {
        let extension = Extension::new(oid(OID_PE_BIOMETRIC_INFO), false, vec!(0x30,0x00));
        assert!(matches!(
            option(TripleState::Optional).resolve(Some(&extension)),
            Err(PolicyViolation::MalformedRequestExtension { .. })
        ));
    }
}
