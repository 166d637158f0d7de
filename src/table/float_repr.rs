//! JSON-safe representation of `f64` values.
//!
//! `serde_json` writes NaN and infinities as `null` and cannot read them back,
//! which would make NaN-bearing golden tables unloadable. Finite values are
//! stored as plain numbers; non-finite ones as the strings `"NaN"`, `"inf"`
//! and `"-inf"`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FloatRepr {
    Num(f64),
    Text(String),
}

impl FloatRepr {
    fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            FloatRepr::Text("NaN".to_string())
        } else if value.is_infinite() {
            let text = if value > 0.0 { "inf" } else { "-inf" };
            FloatRepr::Text(text.to_string())
        } else {
            FloatRepr::Num(value)
        }
    }

    fn into_f64(self) -> Result<f64, String> {
        match self {
            FloatRepr::Num(v) => Ok(v),
            FloatRepr::Text(text) => match text.as_str() {
                "NaN" | "nan" => Ok(f64::NAN),
                "inf" | "+inf" | "Infinity" => Ok(f64::INFINITY),
                "-inf" | "-Infinity" => Ok(f64::NEG_INFINITY),
                other => Err(format!("invalid float literal: {other:?}")),
            },
        }
    }
}

pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    FloatRepr::from_f64(*value).serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    FloatRepr::deserialize(deserializer)?
        .into_f64()
        .map_err(D::Error::custom)
}

/// Same encoding for a whole vector of floats.
pub mod vec {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let reprs: Vec<FloatRepr> = values.iter().map(|&v| FloatRepr::from_f64(v)).collect();
        reprs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<FloatRepr>::deserialize(deserializer)?
            .into_iter()
            .map(|r| r.into_f64().map_err(D::Error::custom))
            .collect()
    }
}
