use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Dynamically typed value used for match criteria and logged output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// JSON `null`.
    Null,
    /// Boolean literal.
    Boolean(bool),
    /// Signed integer literal.
    Integer(i64),
    /// Floating-point literal.
    Float(f64),
    /// UTF-8 string literal.
    String(String),
    /// Heterogeneous list.
    List(Vec<Value>),
    /// String-keyed map.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Equality used when testing criteria against user fields.
    ///
    /// Identical to `==` except that integers and floats compare by numeric value.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, x)| b.get(key).is_some_and(|y| x.same_as(y)))
            }
            _ => self == other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(flag) => write!(f, "{}", flag),
            Value::Integer(num) => write!(f, "{}", num),
            Value::Float(num) => write!(f, "{}", num),
            Value::String(text) => write!(f, "{}", text),
            Value::List(_) | Value::Map(_) => match serde_json::to_string(self) {
                Ok(json) => write!(f, "{}", json),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

impl From<i64> for Value {
    fn from(num: i64) -> Self {
        Value::Integer(num)
    }
}

impl From<f64> for Value {
    fn from(num: f64) -> Self {
        Value::Float(num)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Boolean(flag)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(text)
    }
}

/// Record produced by a [`UserReader`](crate::host::UserReader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Numeric identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: i64,
}

impl User {
    /// Names of the fields addressable by `match` criteria and `log` keys.
    pub const FIELDS: [&'static str; 3] = ["id", "name", "age"];

    /// Create a user record.
    pub fn new(id: i64, name: impl Into<String>, age: i64) -> Self {
        Self {
            id,
            name: name.into(),
            age,
        }
    }

    /// Look up a field by name. Unknown keys yield `None`.
    pub fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(Value::Integer(self.id)),
            "name" => Some(Value::String(self.name.clone())),
            "age" => Some(Value::Integer(self.age)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_equality_crosses_integer_and_float() {
        assert!(Value::Integer(42).same_as(&Value::Float(42.0)));
        assert!(Value::Float(42.0).same_as(&Value::Integer(42)));
        assert!(!Value::Integer(42).same_as(&Value::Float(42.5)));
        assert!(!Value::Integer(42).same_as(&Value::String("42".into())));
    }

    #[test]
    fn untagged_values_decode_from_plain_json() {
        let value: Value = serde_json::from_str(r#"{"a": [1, 2.5, "x", true, null]}"#).unwrap();
        let mut expected = BTreeMap::new();
        expected.insert(
            "a".to_string(),
            Value::List(vec![
                Value::Integer(1),
                Value::Float(2.5),
                Value::String("x".into()),
                Value::Boolean(true),
                Value::Null,
            ]),
        );
        assert_eq!(value, Value::Map(expected));
    }

    #[test]
    fn user_field_lookup() {
        let user = User::new(15, "marcus", 42);
        assert_eq!(user.field("id"), Some(Value::Integer(15)));
        assert_eq!(user.field("name"), Some(Value::String("marcus".into())));
        assert_eq!(user.field("age"), Some(Value::Integer(42)));
        assert_eq!(user.field("email"), None);
    }

    #[test]
    fn display_renders_scalars_bare() {
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::String("marcus".into()).to_string(), "marcus");
        assert_eq!(Value::List(vec![Value::Integer(1)]).to_string(), "[1]");
    }
}
