//! Opaque transaction payloads.
//!
//! A payload is any JSON shaped value. Objects keep their members in a sorted
//! map so the order a client wrote keys in never reaches the hash input.

use crate::constants::MAX_PAYLOAD_DEPTH;
use crate::error::{LedgerError, Result};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Payload>),
    Object(BTreeMap<String, Payload>),
}

impl Payload {
    /// Converts a parsed JSON value, rejecting documents nested deeper than
    /// `MAX_PAYLOAD_DEPTH`.
    pub fn from_json(value: Value) -> Result<Self> {
        Self::from_json_at(value, 0)
    }

    fn from_json_at(value: Value, depth: usize) -> Result<Self> {
        if depth > MAX_PAYLOAD_DEPTH {
            return Err(too_deep());
        }
        Ok(match value {
            Value::Null => Payload::Null,
            Value::Bool(b) => Payload::Bool(b),
            Value::Number(n) => Payload::Number(n),
            Value::String(s) => Payload::String(s),
            Value::Array(items) => Payload::Array(
                items
                    .into_iter()
                    .map(|item| Self::from_json_at(item, depth + 1))
                    .collect::<Result<_>>()?,
            ),
            Value::Object(members) => Payload::Object(
                members
                    .into_iter()
                    .map(|(key, item)| Ok((key, Self::from_json_at(item, depth + 1)?)))
                    .collect::<Result<_>>()?,
            ),
        })
    }

    /// Rejects values nested deeper than `MAX_PAYLOAD_DEPTH`. Values built
    /// in code skip the check `from_json` applies, so admission runs this.
    pub fn check_depth(&self) -> Result<()> {
        self.check_depth_at(0)
    }

    fn check_depth_at(&self, depth: usize) -> Result<()> {
        if depth > MAX_PAYLOAD_DEPTH {
            return Err(too_deep());
        }
        match self {
            Payload::Array(items) => items.iter().try_for_each(|item| item.check_depth_at(depth + 1)),
            Payload::Object(members) => members
                .values()
                .try_for_each(|item| item.check_depth_at(depth + 1)),
            _ => Ok(()),
        }
    }

    pub fn from_f64(value: f64) -> Result<Self> {
        Number::from_f64(value)
            .map(Payload::Number)
            .ok_or_else(|| LedgerError::Encoding(format!("non-finite number {value}")))
    }

    pub fn to_json(&self) -> Value {
        match self {
            Payload::Null => Value::Null,
            Payload::Bool(b) => Value::Bool(*b),
            Payload::Number(n) => Value::Number(n.clone()),
            Payload::String(s) => Value::String(s.clone()),
            Payload::Array(items) => Value::Array(items.iter().map(Payload::to_json).collect()),
            Payload::Object(members) => Value::Object(
                members
                    .iter()
                    .map(|(key, item)| (key.clone(), item.to_json()))
                    .collect(),
            ),
        }
    }
}

pub(crate) fn too_deep() -> LedgerError {
    LedgerError::Encoding(format!(
        "payload nested deeper than {MAX_PAYLOAD_DEPTH} levels"
    ))
}

impl From<bool> for Payload {
    fn from(value: bool) -> Self {
        Payload::Bool(value)
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Payload::Number(value.into())
    }
}

impl From<u64> for Payload {
    fn from(value: u64) -> Self {
        Payload::Number(value.into())
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::String(value.to_owned())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::String(value)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Payload::Null => serializer.serialize_unit(),
            Payload::Bool(b) => serializer.serialize_bool(*b),
            Payload::Number(n) => n.serialize(serializer),
            Payload::String(s) => serializer.serialize_str(s),
            Payload::Array(items) => items.serialize(serializer),
            Payload::Object(members) => members.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Payload::from_json(value).map_err(de::Error::custom)
    }
}

/// A pending or mined transaction. It has no identity beyond its content, so
/// two submissions of the same payload are two equal transactions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction(Payload);

impl Transaction {
    pub fn new(payload: Payload) -> Self {
        Self(payload)
    }

    pub fn from_json(value: Value) -> Result<Self> {
        Payload::from_json(value).map(Self)
    }

    pub fn payload(&self) -> &Payload {
        &self.0
    }
}

impl From<Payload> for Transaction {
    fn from(payload: Payload) -> Self {
        Self(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_members_are_sorted() {
        let payload = Payload::from_json(json!({"b": 1, "a": {"d": true, "c": null}})).unwrap();
        let Payload::Object(members) = &payload else {
            panic!("expected object, got {payload:?}");
        };
        let keys: Vec<&str> = members.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let mut value = json!(1);
        for _ in 0..=MAX_PAYLOAD_DEPTH {
            value = json!([value]);
        }
        let err = Payload::from_json(value).unwrap_err();
        assert!(matches!(err, LedgerError::Encoding(_)));
    }

    #[test]
    fn nesting_at_the_limit_is_accepted() {
        let mut value = json!("leaf");
        for _ in 0..MAX_PAYLOAD_DEPTH {
            value = json!({ "k": value });
        }
        assert!(Payload::from_json(value).is_ok());
    }

    #[test]
    fn depth_check_covers_values_built_in_code() {
        let mut payload = Payload::Null;
        for _ in 0..MAX_PAYLOAD_DEPTH {
            payload = Payload::Array(vec![payload]);
        }
        assert!(payload.check_depth().is_ok());
        let payload = Payload::Array(vec![payload]);
        assert!(matches!(payload.check_depth(), Err(LedgerError::Encoding(_))));
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        assert!(Payload::from_f64(f64::NAN).is_err());
        assert!(Payload::from_f64(f64::INFINITY).is_err());
        assert!(Payload::from_f64(1.5).is_ok());
    }

    #[test]
    fn transaction_serializes_as_its_payload() {
        let tx = Transaction::from_json(json!({"a": 1})).unwrap();
        assert_eq!(serde_json::to_string(&tx).unwrap(), r#"{"a":1}"#);
        let back: Transaction = serde_json::from_str(r#"{"a":1}"#).unwrap();
        assert_eq!(tx, back);
    }

    #[test]
    fn json_conversion_is_lossless() {
        let value = json!({"list": [1, -2, 3.25, "x", false, null], "nested": {"k": "v"}});
        let payload = Payload::from_json(value.clone()).unwrap();
        assert_eq!(payload.to_json(), value);
    }
}
