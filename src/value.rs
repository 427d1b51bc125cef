use crate::error::TransformError;
use std::{cmp::Ordering, fmt, str::FromStr};

/// A resolved configuration value
///
/// Adapters produce values (usually [`Value::Text`]), transformers map them,
/// validators inspect them and the cache stores them. [`Value::Null`] stands
/// for "nothing", which never satisfies a required field.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

/// The variant of a [`Value`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    Text,
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::List => "list",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::List(_) => ValueKind::List,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Length of text (in characters) or of a list
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Text(s) => Some(s.chars().count()),
            Self::List(items) => Some(items.len()),
            _ => None,
        }
    }

    /// `false` for null, `false`, zero, empty text and empty lists
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Text(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => {
                let joined = items
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                f.write_str(&joined)
            }
        }
    }
}

// Numbers compare across integer/float, text compares lexically, anything
// else is unordered.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.partial_cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

/// Conversion from a resolved [`Value`] into the accessor's Rust type
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, TransformError>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, TransformError> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, TransformError> {
        match value {
            Value::Null | Value::List(_) => Err(TransformError::new(
                &value,
                format!("expected text, found {}", value.kind()),
            )),
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, TransformError> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Text(ref s) => parse_text(s, &value),
            _ => Err(TransformError::new(
                &value,
                format!("expected bool, found {}", value.kind()),
            )),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, TransformError> {
        match value {
            Value::Float(x) => Ok(x),
            Value::Integer(i) => Ok(i as f64),
            Value::Text(ref s) => parse_text(s.trim(), &value),
            _ => Err(TransformError::new(
                &value,
                format!("expected float, found {}", value.kind()),
            )),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, TransformError> {
        f64::from_value(value).map(|x| x as f32)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, TransformError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, TransformError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(TransformError::new(
                &other,
                format!("expected list, found {}", other.kind()),
            )),
        }
    }
}

fn parse_text<T: FromStr>(s: &str, original: &Value) -> Result<T, TransformError> {
    s.parse().map_err(|_| {
        TransformError::new(
            original,
            format!("cannot parse as {}", short_type_name::<T>()),
        )
    })
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    i64::try_from(value).map_or_else(|_| Self::Float(value as f64), Self::Integer)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, TransformError> {
                    match value {
                        Value::Integer(i) => <$ty>::try_from(i).map_err(|_| {
                            TransformError::new(
                                i,
                                format!("out of range for {}", stringify!($ty)),
                            )
                        }),
                        Value::Text(ref s) => parse_text(s.trim(), &value),
                        _ => Err(TransformError::new(
                            &value,
                            format!("expected integer, found {}", value.kind()),
                        )),
                    }
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
