//! Raw profile schema. Deserialized by the embedding application, compiled by
//! `Profile::compile`.

pub mod extension;
pub mod serde_base64;

pub use extension::*;

use serde_derive::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CertLevel {
    RootCA,
    SubCA,
    EndEntity,
}

fn default_not_before() -> String {
    "current".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConf {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    pub validity: String,
    #[serde(default = "default_not_before")]
    pub not_before_time: String,
    #[serde(default)]
    pub cert_level: Option<CertLevel>,
    #[serde(default)]
    pub max_size: Option<u32>,
    #[serde(default)]
    pub ra_only: bool,
    #[serde(default)]
    pub serial_number_in_req: bool,
    #[serde(default)]
    pub signature_algorithms: Vec<String>,
    #[serde(default)]
    pub keypair_generation: Option<KeypairGenerationConf>,
    #[serde(default)]
    pub key_algorithms: Vec<KeyAlgorithmConf>,
    #[serde(default)]
    pub subject: SubjectConf,
    #[serde(default)]
    pub subject_to_subject_alt_names: Vec<SubjectToAltNameConf>,
    #[serde(default)]
    pub extensions: Vec<ExtensionConf>,
}

/// `forbidden`, `inherit_ca`, or a key type with its parameters
/// (`keysize`, `publicExponent`, `curve`, `plength`, `qlength`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeypairGenerationConf {
    #[serde(default)]
    pub forbidden: bool,
    #[serde(default)]
    pub inherit_ca: bool,
    #[serde(default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyAlgorithmConf {
    pub algorithm: String,
    /// Permitted RSA modulus sizes in bits, any when empty.
    #[serde(default)]
    pub modulus: Vec<u64>,
    /// Permitted EC curves, any when empty.
    #[serde(default)]
    pub curves: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubjectConf {
    #[serde(default)]
    pub keep_rdn_order: bool,
    #[serde(default)]
    pub rdns: Vec<RdnConf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RdnValueConf {
    pub text: String,
    #[serde(default)]
    pub overridable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RdnConf {
    #[serde(rename = "type")]
    pub attr_type: String,
    #[serde(default)]
    pub min_occurs: Option<u32>,
    #[serde(default)]
    pub max_occurs: Option<u32>,
    #[serde(default)]
    pub value: Option<RdnValueConf>,
    #[serde(default)]
    pub string_type: Option<String>,
    #[serde(default)]
    pub min_len: Option<usize>,
    #[serde(default)]
    pub max_len: Option<usize>,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub not_in_subject: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectToAltNameConf {
    pub source: String,
    pub target: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_profile_should_deserialize_with_defaults () {
        let conf: ProfileConf = serde_json::from_str(r#"{
            "validity": "1y",
            "cert_level": "EndEntity",
            "subject": { "rdns": [ { "type": "CN" } ] }
        }"#).unwrap();
        assert_eq!(conf.not_before_time, "current");
        assert_eq!(conf.cert_level, Some(CertLevel::EndEntity));
        assert_eq!(conf.subject.rdns[0].attr_type, "CN");
        assert!(conf.extensions.is_empty());
        assert!(!conf.ra_only);
    }
}
