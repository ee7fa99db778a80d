use async_graphql_value::ConstValue;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;

use crate::ResolverError;

/// Coerced arguments of a field, in definition order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(IndexMap<String, ConstValue>);

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&ConstValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConstValue)> + '_ {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ConstValue) -> Option<ConstValue> {
        self.0.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<ConstValue> {
        self.0.shift_remove(name)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            ConstValue::Number(number) => number.as_i64(),
            _ => None,
        }
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ConstValue::Number(number) => number.as_f64(),
            _ => None,
        }
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ConstValue::String(value) => Some(value),
            ConstValue::Enum(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ConstValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Deserializes a single argument, `None` if absent.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ResolverError> {
        self.get(name)
            .map(|value| {
                serde_json::to_value(value)
                    .and_then(serde_json::from_value)
                    .map_err(|err| ResolverError::message(format!("Invalid argument '{name}': {err}")))
            })
            .transpose()
    }

    /// Deserializes all the arguments into a struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ResolverError> {
        serde_json::to_value(&self.0)
            .and_then(serde_json::from_value)
            .map_err(|err| ResolverError::message(format!("Invalid arguments: {err}")))
    }

    pub fn into_inner(self) -> IndexMap<String, ConstValue> {
        self.0
    }
}

impl FromIterator<(String, ConstValue)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, ConstValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
