//! Serde adapter for seed fields: serialized as a decimal string so JSON
//! clients never lose precision, deserialized from either form.

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SeedRepr {
        Text(String),
        Value(u64),
    }

    match SeedRepr::deserialize(deserializer)? {
        SeedRepr::Text(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| D::Error::custom(format!("invalid u64 string: {raw:?}"))),
        SeedRepr::Value(value) => Ok(value),
    }
}
