//! Helpers for mapping typed models onto form/query parameters and for
//! decoding loosely typed fields.

use serde::de::{self, Deserializer, Visitor};
use serde::Serialize;
use serde_json::Value;

use crate::errors::{Result, TwikeyError};

/// Ordered key/value pairs ready for form or query encoding. Keys may repeat.
pub type FormPairs = Vec<(String, String)>;

/// Flatten a serializable request into form/query pairs.
///
/// Rules:
/// - `None`/`null` fields and empty strings are skipped
/// - booleans become `"true"`/`"false"`
/// - arrays become repeated keys in order
/// - nested objects are rejected
///
/// # Errors
/// Returns `TwikeyError::InvalidInput` if the value is not a flat object.
pub fn to_form_pairs<T: Serialize + ?Sized>(value: &T) -> Result<FormPairs> {
    let json = serde_json::to_value(value)
        .map_err(|e| TwikeyError::InvalidInput(format!("cannot serialize request: {e}")))?;

    let Value::Object(map) = json else {
        return Err(TwikeyError::InvalidInput("request must serialize to an object".into()));
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(scalar) = scalar_to_string(&key, item)? {
                        pairs.push((key.clone(), scalar));
                    }
                }
            }
            other => {
                if let Some(scalar) = scalar_to_string(&key, other)? {
                    pairs.push((key, scalar));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar_to_string(key: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::String(text) if text.is_empty() => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Array(_) | Value::Object(_) => Err(TwikeyError::InvalidInput(format!(
            "field '{key}' cannot be encoded as a form parameter"
        ))),
    }
}

/// Deserialize an optional identifier that the API sends either as a JSON
/// string or as a number.
pub fn opt_string_or_number<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrNumber;

    impl<'de> Visitor<'de> for StringOrNumber {
        type Value = Option<String>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a string, a number or null")
        }

        fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(
            self,
            deserializer: D2,
        ) -> std::result::Result<Self::Value, D2::Error> {
            deserializer.deserialize_any(self)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }
    }

    deserializer.deserialize_option(StringOrNumber)
}
