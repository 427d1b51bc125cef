//! Post-resolution value mapping.
//!
//! Transformers run in declaration order on whatever the adapters (or the
//! default body) produced; each receives the previous transformer's output.
//!
//! ```rust
//! use config_resolvr::{Value, transform::{comma_separated, integer}};
//!
//! let ports = comma_separated(integer(false), false);
//! assert_eq!(
//!     ports(Value::from("80,443")).unwrap(),
//!     Value::List(vec![Value::Integer(80), Value::Integer(443)]),
//! );
//! ```

use crate::{error::TransformError, value::Value};
use std::sync::Arc;

/// A value transformer
pub type Transformer = Arc<dyn Fn(Value) -> Result<Value, TransformError> + Send + Sync>;

/// Wraps a fallible closure into a [`Transformer`]
pub fn transform<F>(callback: F) -> Transformer
where
    F: Fn(Value) -> Result<Value, TransformError> + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Runs `callback`, except on `Null` when `cast_null` is false
pub fn cast_custom<F>(callback: F, cast_null: bool) -> Transformer
where
    F: Fn(Value) -> Result<Value, TransformError> + Send + Sync + 'static,
{
    transform(move |value| {
        if value.is_null() && !cast_null {
            return Ok(Value::Null);
        }
        callback(value)
    })
}

/// Renders the value as text
pub fn string(cast_null: bool) -> Transformer {
    cast_custom(|value| Ok(Value::Text(value.to_string())), cast_null)
}

/// Converts to an integer; floats are truncated, text is parsed
pub fn integer(cast_null: bool) -> Transformer {
    cast_custom(to_integer, cast_null)
}

/// Converts to a float; text is parsed
pub fn floating(cast_null: bool) -> Transformer {
    cast_custom(to_float, cast_null)
}

/// Converts to a bool
///
/// Text accepts `true`/`yes`/`on`/`1` and `false`/`no`/`off`/`0`/empty,
/// case-insensitively. Numbers are true when non-zero, lists when non-empty.
pub fn boolean(cast_null: bool) -> Transformer {
    cast_custom(to_bool, cast_null)
}

/// Splits text on commas and runs `element` on every item
///
/// `Null` becomes an empty list unless `cast_null` is set.
pub fn comma_separated(element: Transformer, cast_null: bool) -> Transformer {
    transform(move |value| {
        let text = match value {
            Value::Null if !cast_null => return Ok(Value::List(Vec::new())),
            Value::List(items) => {
                return items
                    .into_iter()
                    .map(|item| element(item))
                    .collect::<Result<_, _>>()
                    .map(Value::List);
            }
            other => other.to_string(),
        };
        text.split(',')
            .map(|item| element(Value::Text(item.to_string())))
            .collect::<Result<_, _>>()
            .map(Value::List)
    })
}

fn to_integer(value: Value) -> Result<Value, TransformError> {
    match value {
        Value::Integer(_) => Ok(value),
        Value::Bool(b) => Ok(Value::Integer(i64::from(b))),
        Value::Float(x) if x.is_finite() => Ok(Value::Integer(x.trunc() as i64)),
        Value::Text(ref s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|x| x.is_finite())
                        .map(|x| x.trunc() as i64)
                })
                .map(Value::Integer)
                .ok_or_else(|| TransformError::new(&value, "not a valid integer"))
        }
        _ => Err(TransformError::new(
            &value,
            format!("cannot convert {} to integer", value.kind()),
        )),
    }
}

fn to_float(value: Value) -> Result<Value, TransformError> {
    match value {
        Value::Float(_) => Ok(value),
        Value::Integer(i) => Ok(Value::Float(i as f64)),
        Value::Bool(b) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
        Value::Text(ref s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| TransformError::new(&value, "not a valid float")),
        _ => Err(TransformError::new(
            &value,
            format!("cannot convert {} to float", value.kind()),
        )),
    }
}

fn to_bool(value: Value) -> Result<Value, TransformError> {
    match value {
        Value::Text(ref s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" | "" => Ok(Value::Bool(false)),
            _ => Err(TransformError::new(&value, "not a valid boolean")),
        },
        other => Ok(Value::Bool(other.is_truthy())),
    }
}
