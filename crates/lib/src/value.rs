//! Structured values held by the variables store.
//!
//! Generator options and stored variables are arbitrary YAML-shaped documents.
//! [`Value`] models them as a tagged union whose mappings keep insertion order
//! and always use string keys, so a store file rewritten by credforge keeps the
//! order its variables were generated in.
//!
//! # Example
//!
//! ```
//! use credforge_lib::value::{Mapping, Value};
//!
//! let mut cert = Mapping::new();
//! cert.insert("certificate".to_string(), Value::from("pem"));
//!
//! let encoded = Value::Mapping(cert).encode_leaves();
//! assert_eq!(encoded.get("certificate"), Some(&Value::from("cGVt")));
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub use serde_yaml::Number;

/// A structured document value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
  #[default]
  Null,
  Bool(bool),
  Number(Number),
  String(String),
  Sequence(Vec<Value>),
  Mapping(Mapping),
}

/// An insertion-ordered mapping with string keys.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
  entries: Vec<(String, Value)>,
}

/// Errors converting between [`Value`] and other representations.
#[derive(Debug, Error)]
pub enum ValueError {
  /// Mapping keys must be scalars so they can be stringified.
  #[error("mapping keys must be scalars, found a {0}")]
  UnsupportedKey(&'static str),

  /// The value does not have the shape the target type expects.
  #[error("{0}")]
  Shape(#[source] serde_yaml::Error),
}

impl Mapping {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.get(key).is_some()
  }

  /// Insert a value, replacing an existing entry in place.
  ///
  /// New keys are appended. Returns the previous value if the key was present.
  pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
    match self.entries.iter_mut().find(|(k, _)| *k == key) {
      Some((_, slot)) => Some(std::mem::replace(slot, value)),
      None => {
        self.entries.push((key, value));
        None
      }
    }
  }

  pub fn remove(&mut self, key: &str) -> Option<Value> {
    let index = self.entries.iter().position(|(k, _)| k == key)?;
    Some(self.entries.remove(index).1)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|(k, _)| k.as_str())
  }
}

impl FromIterator<(String, Value)> for Mapping {
  fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
    let mut mapping = Mapping::new();
    for (key, value) in iter {
      mapping.insert(key, value);
    }
    mapping
  }
}

impl IntoIterator for Mapping {
  type Item = (String, Value);
  type IntoIter = std::vec::IntoIter<(String, Value)>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.into_iter()
  }
}

impl Value {
  /// Short name of the variant, used in error messages.
  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Null => "null",
      Value::Bool(_) => "boolean",
      Value::Number(_) => "number",
      Value::String(_) => "string",
      Value::Sequence(_) => "sequence",
      Value::Mapping(_) => "mapping",
    }
  }

  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_mapping(&self) -> Option<&Mapping> {
    match self {
      Value::Mapping(m) => Some(m),
      _ => None,
    }
  }

  pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
    match self {
      Value::Mapping(m) => Some(m),
      _ => None,
    }
  }

  /// Look up a key when this value is a mapping.
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.as_mapping().and_then(|m| m.get(key))
  }

  /// Normalize any serializable record into a plain value tree.
  pub fn encode<T: Serialize>(record: &T) -> Result<Value, ValueError> {
    let raw = serde_yaml::to_value(record).map_err(ValueError::Shape)?;
    Value::try_from(raw)
  }

  /// Decode this value into a typed record.
  pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ValueError> {
    serde_yaml::from_value(serde_yaml::Value::from(self.clone())).map_err(ValueError::Shape)
  }

  /// Replace every leaf scalar with its base64 encoding, keeping the shape.
  ///
  /// Non-string scalars are stringified first; null becomes the empty string.
  pub fn encode_leaves(self) -> Value {
    match self {
      Value::Sequence(items) => Value::Sequence(items.into_iter().map(Value::encode_leaves).collect()),
      Value::Mapping(mapping) => Value::Mapping(mapping.into_iter().map(|(k, v)| (k, v.encode_leaves())).collect()),
      Value::Null => Value::String(String::new()),
      Value::Bool(b) => Value::String(STANDARD.encode(b.to_string())),
      Value::Number(n) => Value::String(STANDARD.encode(n.to_string())),
      Value::String(s) => Value::String(STANDARD.encode(s)),
    }
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::String(s.to_string())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::String(s)
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<Mapping> for Value {
  fn from(m: Mapping) -> Self {
    Value::Mapping(m)
  }
}

impl From<Vec<Value>> for Value {
  fn from(items: Vec<Value>) -> Self {
    Value::Sequence(items)
  }
}

fn key_to_string(key: serde_yaml::Value) -> Result<String, ValueError> {
  match key {
    serde_yaml::Value::String(s) => Ok(s),
    serde_yaml::Value::Number(n) => Ok(n.to_string()),
    serde_yaml::Value::Bool(b) => Ok(b.to_string()),
    serde_yaml::Value::Null => Ok("null".to_string()),
    serde_yaml::Value::Tagged(tagged) => key_to_string(tagged.value),
    serde_yaml::Value::Sequence(_) => Err(ValueError::UnsupportedKey("sequence")),
    serde_yaml::Value::Mapping(_) => Err(ValueError::UnsupportedKey("mapping")),
  }
}

impl TryFrom<serde_yaml::Value> for Value {
  type Error = ValueError;

  fn try_from(raw: serde_yaml::Value) -> Result<Self, Self::Error> {
    Ok(match raw {
      serde_yaml::Value::Null => Value::Null,
      serde_yaml::Value::Bool(b) => Value::Bool(b),
      serde_yaml::Value::Number(n) => Value::Number(n),
      serde_yaml::Value::String(s) => Value::String(s),
      serde_yaml::Value::Sequence(items) => {
        Value::Sequence(items.into_iter().map(Value::try_from).collect::<Result<_, _>>()?)
      }
      serde_yaml::Value::Mapping(entries) => {
        let mut mapping = Mapping::new();
        for (key, value) in entries {
          mapping.insert(key_to_string(key)?, Value::try_from(value)?);
        }
        Value::Mapping(mapping)
      }
      // Tags carry no meaning for stored credentials.
      serde_yaml::Value::Tagged(tagged) => Value::try_from(tagged.value)?,
    })
  }
}

impl From<Value> for serde_yaml::Value {
  fn from(value: Value) -> Self {
    match value {
      Value::Null => serde_yaml::Value::Null,
      Value::Bool(b) => serde_yaml::Value::Bool(b),
      Value::Number(n) => serde_yaml::Value::Number(n),
      Value::String(s) => serde_yaml::Value::String(s),
      Value::Sequence(items) => serde_yaml::Value::Sequence(items.into_iter().map(Into::into).collect()),
      Value::Mapping(mapping) => serde_yaml::Value::Mapping(
        mapping
          .into_iter()
          .map(|(k, v)| (serde_yaml::Value::String(k), v.into()))
          .collect(),
      ),
    }
  }
}

impl Serialize for Value {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Value::Null => serializer.serialize_unit(),
      Value::Bool(b) => serializer.serialize_bool(*b),
      Value::Number(n) => n.serialize(serializer),
      Value::String(s) => serializer.serialize_str(s),
      Value::Sequence(items) => serializer.collect_seq(items),
      Value::Mapping(mapping) => mapping.serialize(serializer),
    }
  }
}

impl Serialize for Mapping {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.len()))?;
    for (key, value) in self.iter() {
      map.serialize_entry(key, value)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for Value {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = serde_yaml::Value::deserialize(deserializer)?;
    Value::try_from(raw).map_err(D::Error::custom)
  }
}
