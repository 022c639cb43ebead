//! Lenient field decoding
//!
//! The backend response is loosely typed at every level. These helpers make
//! each field independently optional: a missing or mistyped field decodes to
//! `None` (or an empty list) instead of failing the surrounding struct.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// `Option<T>` that swallows type mismatches
pub fn field<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// `Vec<T>` keeping only the items that decode; non-arrays become empty
pub fn seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Number that may arrive as JSON number or numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    pub fn value(&self) -> Option<f64> {
        match self {
            Numeric::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Numeric::Text(s) => s.trim().trim_end_matches('%').parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

/// Round and clamp into the 0..=100 score range
pub fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
