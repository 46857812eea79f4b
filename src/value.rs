//! Bind entries: named, typed values waiting to be substituted into a query.

use std::fmt;

/// Dynamic value type for query bindings.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    Blob(Vec<u8>),
}

/// The tag of a [`BindValue`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int32,
    Int64,
    Double,
    String,
    Blob,
}

impl BindValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            BindValue::Null => ValueKind::Null,
            BindValue::Bool(_) => ValueKind::Bool,
            BindValue::Int32(_) => ValueKind::Int32,
            BindValue::Int64(_) => ValueKind::Int64,
            BindValue::Double(_) => ValueKind::Double,
            BindValue::String(_) => ValueKind::String,
            BindValue::Blob(_) => ValueKind::Blob,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, BindValue::Null)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int32 => "int4",
            ValueKind::Int64 => "int8",
            ValueKind::Double => "float8",
            ValueKind::String => "text",
            ValueKind::Blob => "blob",
        };
        f.write_str(name)
    }
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Null => write!(f, "NULL"),
            BindValue::Bool(b) => write!(f, "{}", b),
            BindValue::Int32(n) => write!(f, "{}", n),
            BindValue::Int64(n) => write!(f, "{}", n),
            BindValue::Double(n) => write!(f, "{}", n),
            BindValue::String(s) => write!(f, "'{}'", s),
            BindValue::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// A named value in binding order.
///
/// The position of an entry in its statement's entry list decides which
/// positional marker it receives, so entries are only ever appended.
#[derive(Debug, Clone, PartialEq)]
pub struct BindEntry {
    pub name: String,
    pub value: BindValue,
}

impl BindEntry {
    /// Create an entry. A leading `:` on the name is dropped, so both
    /// `"id"` and `":id"` refer to the `:id` placeholder.
    pub fn new(name: &str, value: impl Into<BindValue>) -> Self {
        Self {
            name: name.strip_prefix(':').unwrap_or(name).to_string(),
            value: value.into(),
        }
    }

    pub fn null(name: &str) -> Self {
        Self::new(name, BindValue::Null)
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }
}

// Implement From traits for BindValue
impl From<bool> for BindValue {
    fn from(v: bool) -> Self {
        BindValue::Bool(v)
    }
}

impl From<i32> for BindValue {
    fn from(v: i32) -> Self {
        BindValue::Int32(v)
    }
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        BindValue::Int64(v)
    }
}

impl From<f64> for BindValue {
    fn from(v: f64) -> Self {
        BindValue::Double(v)
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        BindValue::String(v.to_string())
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        BindValue::String(v)
    }
}

impl From<&String> for BindValue {
    fn from(v: &String) -> Self {
        BindValue::String(v.clone())
    }
}

impl From<Vec<u8>> for BindValue {
    fn from(v: Vec<u8>) -> Self {
        BindValue::Blob(v)
    }
}

impl From<&[u8]> for BindValue {
    fn from(v: &[u8]) -> Self {
        BindValue::Blob(v.to_vec())
    }
}

impl<T: Into<BindValue>> From<Option<T>> for BindValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(BindValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_value_from() {
        assert_eq!(BindValue::from(true), BindValue::Bool(true));
        assert_eq!(BindValue::from(42i32), BindValue::Int32(42));
        assert_eq!(BindValue::from(42i64), BindValue::Int64(42));
        assert_eq!(BindValue::from(2.5f64), BindValue::Double(2.5));
        assert_eq!(BindValue::from("hi"), BindValue::String("hi".into()));
        assert_eq!(BindValue::from(vec![1u8, 2]), BindValue::Blob(vec![1, 2]));
    }

    #[test]
    fn test_option_none_is_null() {
        let v: BindValue = Option::<i32>::None.into();
        assert!(v.is_null());
        let v: BindValue = Some(7i64).into();
        assert_eq!(v.kind(), ValueKind::Int64);
    }

    #[test]
    fn test_entry_name_strips_colon() {
        assert_eq!(BindEntry::new(":id", 1).name, "id");
        assert_eq!(BindEntry::new("id", 1).name, "id");
    }
}
