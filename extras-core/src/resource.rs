//! Resource - Attribute values and the per-instance data handed over by the host

use std::collections::HashMap;

/// Attribute value of a resource or provider block
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub(crate) fn type_name(&self) -> String {
        match self {
            Value::String(_) => "String".to_string(),
            Value::Int(_) => "Int".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::List(_) => "List".to_string(),
            Value::Map(_) => "Map".to_string(),
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

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Data of a single resource instance (or provider block) as seen by a
/// lifecycle operation.
///
/// The ID is empty until the resource has been created. Clearing it tells the
/// host the resource no longer exists remotely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: String,
    attributes: HashMap<String, Value>,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Mark the resource as gone
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn is_new(&self) -> bool {
        self.id.is_empty()
    }

    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Get a string attribute, treating an absent attribute as empty
    pub fn get_str(&self, key: &str) -> &str {
        self.get_string(key).unwrap_or("")
    }

    /// Get a string attribute only when it is set and non-empty
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.attributes.get(key) {
            Some(Value::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.attributes.get(key) {
            Some(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    /// Get a list of strings, skipping non-string items
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        match self.attributes.get(key) {
            Some(Value::List(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Get a nested block. Single-element lists are unwrapped so that
    /// `assume_role { ... }` style blocks read the same as plain maps.
    pub fn get_block(&self, key: &str) -> Option<ResourceData> {
        let map = match self.attributes.get(key) {
            Some(Value::Map(map)) => map,
            Some(Value::List(items)) => match items.as_slice() {
                [Value::Map(map)] => map,
                _ => return None,
            },
            _ => return None,
        };
        Some(ResourceData {
            id: String::new(),
            attributes: map.clone(),
        })
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn set_if_absent(&mut self, key: &str, value: Value) {
        self.attributes.entry(key.to_string()).or_insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_id_marks_resource_gone() {
        let mut data = ResourceData::new().with_id("Z1:vpc-1");
        assert!(!data.is_new());
        data.clear_id();
        assert!(data.is_new());
        assert_eq!(data.id(), "");
    }

    #[test]
    fn empty_string_reads_as_unset() {
        let data = ResourceData::new()
            .with_attribute("sub_provider", "")
            .with_attribute("zone_id", "Z1");
        assert_eq!(data.get_string("sub_provider"), None);
        assert_eq!(data.get_str("sub_provider"), "");
        assert_eq!(data.get_str("missing"), "");
        assert_eq!(data.get_string("zone_id"), Some("Z1"));
    }

    #[test]
    fn get_block_unwraps_single_element_list() {
        let mut inner = HashMap::new();
        inner.insert("role_arn".to_string(), Value::from("arn:aws:iam::1:role/x"));
        let data = ResourceData::new()
            .with_attribute("assume_role", Value::List(vec![Value::Map(inner.clone())]))
            .with_attribute("endpoints", Value::Map(inner));

        let block = data.get_block("assume_role").unwrap();
        assert_eq!(block.get_str("role_arn"), "arn:aws:iam::1:role/x");
        assert!(data.get_block("endpoints").is_some());
        assert!(data.get_block("missing").is_none());
    }

    #[test]
    fn string_list_skips_other_values() {
        let data = ResourceData::new().with_attribute(
            "allowed_account_ids",
            Value::List(vec![Value::from("111111111111"), Value::Int(3)]),
        );
        assert_eq!(
            data.get_string_list("allowed_account_ids"),
            vec!["111111111111".to_string()]
        );
    }
}
