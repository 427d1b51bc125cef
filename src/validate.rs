//! Acceptance checks on the final (transformed) value of a field.
//!
//! A rejected value fails the resolution; the pipeline wraps the
//! [`ValidationError`] into [`ConfigError::Validation`](crate::ConfigError)
//! naming the accessor it came from.

use crate::{
    error::ValidationError,
    value::{Value, ValueKind},
};
use regex::Regex;
use std::{str::FromStr, sync::Arc};

/// A value validator
pub type Validator = Arc<dyn Fn(&Value) -> Result<(), ValidationError> + Send + Sync>;

pub fn validate<F>(callback: F) -> Validator
where
    F: Fn(&Value) -> Result<(), ValidationError> + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Value must be of `kind`
pub fn is_kind(kind: ValueKind) -> Validator {
    validate(move |value| {
        if value.kind() == kind {
            Ok(())
        } else {
            Err(ValidationError::new(format!(
                "value is not a \"{}\" but a \"{}\"",
                kind,
                value.kind()
            )))
        }
    })
}

/// Value must not be null, false, zero, empty text or an empty list
pub fn is_not_empty() -> Validator {
    validate(|value| {
        if value.is_truthy() {
            Ok(())
        } else {
            Err(ValidationError::new("value is empty"))
        }
    })
}

/// Value must lie in `[min, max]`
pub fn is_in_range(min: impl Into<Value>, max: impl Into<Value>) -> Validator {
    is_within(Some(min.into()), Some(max.into()), true, true)
}

/// Value must lie between the given bounds; a `None` bound is open
pub fn is_within(
    min: Option<Value>,
    max: Option<Value>,
    left_inclusive: bool,
    right_inclusive: bool,
) -> Validator {
    validate(move |value| {
        if let Some(min) = &min {
            let ordering = comparable(value, min)?;
            if left_inclusive && ordering.is_lt() {
                return Err(ValidationError::new(format!("value is less than {}", min)));
            }
            if !left_inclusive && ordering.is_le() {
                return Err(ValidationError::new(format!(
                    "value is less than or equal to {}",
                    min
                )));
            }
        }
        if let Some(max) = &max {
            let ordering = comparable(value, max)?;
            if right_inclusive && ordering.is_gt() {
                return Err(ValidationError::new(format!("value is greater than {}", max)));
            }
            if !right_inclusive && ordering.is_ge() {
                return Err(ValidationError::new(format!(
                    "value is greater than or equal to {}",
                    max
                )));
            }
        }
        Ok(())
    })
}

fn comparable(value: &Value, bound: &Value) -> Result<std::cmp::Ordering, ValidationError> {
    value.partial_cmp(bound).ok_or_else(|| {
        ValidationError::new(format!(
            "{} value cannot be compared with {} bound",
            value.kind(),
            bound.kind()
        ))
    })
}

/// Text value must match `pattern` at its start
pub fn matches_pattern(pattern: Regex) -> Validator {
    validate(move |value| {
        let matched = value
            .as_str()
            .and_then(|s| pattern.find(s))
            .is_some_and(|m| m.start() == 0);
        if matched {
            Ok(())
        } else {
            Err(ValidationError::new(format!(
                "value does not match the pattern {}",
                pattern.as_str()
            )))
        }
    })
}

/// Text or list length must be at most `length`
pub fn max_length(length: usize) -> Validator {
    validate(move |value| match value.len() {
        Some(len) if len > length => Err(ValidationError::new(format!(
            "value length is greater than {}",
            length
        ))),
        Some(_) => Ok(()),
        None => Err(ValidationError::new(format!("{} value has no length", value.kind()))),
    })
}

/// Text or list length must be at least `length`
pub fn min_length(length: usize) -> Validator {
    validate(move |value| match value.len() {
        Some(len) if len < length => Err(ValidationError::new(format!(
            "value length is less than {}",
            length
        ))),
        Some(_) => Ok(()),
        None => Err(ValidationError::new(format!("{} value has no length", value.kind()))),
    })
}

/// Value must equal one of `allowed`
pub fn is_one_of<I, V>(allowed: I) -> Validator
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let allowed: Vec<Value> = allowed.into_iter().map(Into::into).collect();
    validate(move |value| {
        if allowed.contains(value) {
            Ok(())
        } else {
            Err(ValidationError::new("value is not in the allowed set"))
        }
    })
}

/// Text value must parse as `T`, typically an enum with a `FromStr` impl
pub fn parses_as<T: FromStr + 'static>() -> Validator {
    validate(|value| match value.as_str().map(str::parse::<T>) {
        Some(Ok(_)) => Ok(()),
        _ => Err(ValidationError::new(format!(
            "value is not a valid {}",
            std::any::type_name::<T>()
        ))),
    })
}
