//! Best-effort field decoding for schemaless documents.
//!
//! Used as `#[serde(default, deserialize_with = "lenient::or_default")]` so
//! that a field holding the wrong JSON type decodes to its default instead of
//! failing the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Decode `T`, falling back to `T::default()` on a type mismatch.
///
/// # Errors
///
/// Only fails if the underlying deserializer cannot produce any value at all.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Decode a boolean, falling back to `true` on a type mismatch.
///
/// # Errors
///
/// Only fails if the underlying deserializer cannot produce any value at all.
pub fn or_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(true))
}

/// Decode a list of strings, skipping entries that are not strings.
///
/// # Errors
///
/// Only fails if the underlying deserializer cannot produce any value at all.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(values) => values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Doc {
        #[serde(default, deserialize_with = "or_default")]
        count: u32,
        #[serde(default = "yes", deserialize_with = "or_true")]
        flag: bool,
        #[serde(default, deserialize_with = "string_list")]
        names: Vec<String>,
    }

    const fn yes() -> bool {
        true
    }

    #[test]
    fn test_malformed_fields_fall_back() {
        let doc: Doc =
            serde_json::from_value(json!({"count": "seven", "flag": 1, "names": ["a", 2, "b"]}))
                .unwrap();
        assert_eq!(doc.count, 0);
        assert!(doc.flag);
        assert_eq!(doc.names, ["a", "b"]);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let doc: Doc = serde_json::from_value(json!({})).unwrap();
        assert_eq!(doc.count, 0);
        assert!(doc.flag);
        assert!(doc.names.is_empty());
    }
}
