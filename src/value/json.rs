//! Conversion between `Value` and JSON

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::{OrderedMap, Value};

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Record(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Value {
    /// Renders the value as JSON.
    ///
    /// Sets become arrays. Maps become objects when every key is text and
    /// arrays of `[key, value]` pairs otherwise. Tokens and instances are
    /// rendered as their display text; non-finite numbers as null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Token(_) | Value::Instance(_) => serde_json::Value::String(self.to_string()),
            Value::List(items) | Value::Set(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => {
                if map.keys().all(|k| matches!(k, Value::Text(_))) {
                    serde_json::Value::Object(
                        map.iter()
                            .map(|(k, v)| (k.to_string(), v.to_json()))
                            .collect(),
                    )
                } else {
                    serde_json::Value::Array(
                        map.iter()
                            .map(|(k, v)| serde_json::Value::Array(vec![k.to_json(), v.to_json()]))
                            .collect(),
                    )
                }
            }
            Value::Record(record) => serde_json::Value::Object(
                record
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(_) | Value::Token(_) | Value::Instance(_) => {
                self.to_json().serialize(serializer)
            }
            Value::Text(s) => serializer.serialize_str(s),
            Value::List(items) | Value::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => serialize_map(map, serializer),
            Value::Record(record) => {
                let mut out = serializer.serialize_map(Some(record.len()))?;
                for (k, v) in record.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

fn serialize_map<S: Serializer>(map: &OrderedMap<Value>, serializer: S) -> Result<S::Ok, S::Error> {
    if map.keys().all(|k| matches!(k, Value::Text(_))) {
        let mut out = serializer.serialize_map(Some(map.len()))?;
        for (k, v) in map.iter() {
            out.serialize_entry(k, v)?;
        }
        out.end()
    } else {
        let mut seq = serializer.serialize_seq(Some(map.len()))?;
        for (k, v) in map.iter() {
            seq.serialize_element(&(k, v))?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}
