//! Binary configuration values are base64 strings.

use serde::{de, Deserialize, Deserializer};

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    base64::decode(text.trim()).map_err(de::Error::custom)
}

pub mod option {
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => base64::decode(text.trim()).map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}
