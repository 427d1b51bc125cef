//! Resolution of one field accessor.
//!
//! 1. a cached value is returned as is;
//! 2. name and adapters must be set on the accessor;
//! 3. adapters are queried in order until one does not miss;
//! 4. if all miss, optional fields fall back to the accessor body;
//! 5. transformers run in declaration order;
//! 6. a required field must not end up `Null`;
//! 7. validators run in declaration order;
//! 8. the value is cached on the accessor.

use crate::{
    adapter::SharedAdapter,
    error::ConfigError,
    field::{Accessor, FieldDescriptor},
    value::Value,
};
use tracing::{debug, trace};

/// Resolves `accessor` for `instance`, caching the result on the accessor
pub fn resolve<C>(accessor: &Accessor<C>, instance: &C) -> Result<Value, ConfigError> {
    if let Ok(value) = accessor.cached_value() {
        trace!(accessor = accessor.ident(), "cache hit");
        return Ok(value);
    }

    let descriptor = accessor.descriptor();
    let name = descriptor
        .name()
        .ok_or_else(|| ConfigError::NotDeclared {
            accessor: accessor.ident().to_string(),
        })?
        .to_string();
    let adapters = descriptor
        .adapters()
        .ok_or_else(|| ConfigError::NotBound { name: name.clone() })?;

    let raw = match query_chain(&name, &descriptor, adapters)? {
        Some(value) => value,
        None if descriptor.is_optional() => {
            debug!(field = %name, "no adapter has the field, using its default");
            accessor.call_body(instance)
        }
        None => return Err(ConfigError::FieldNotFound { name }),
    };

    let value = descriptor
        .transformers()
        .iter()
        .try_fold(raw, |value, transformer| transformer(value))
        .map_err(|e| e.into_config_error(&name))?;

    if !descriptor.is_optional() && value.is_null() {
        return Err(ConfigError::FieldNotFound { name });
    }

    for validator in descriptor.validators() {
        validator(&value).map_err(|source| ConfigError::Validation {
            accessor: accessor.ident().to_string(),
            name: name.clone(),
            source,
        })?;
    }

    accessor.set_cached_value(value.clone());
    Ok(value)
}

/// First value any adapter has for `name`, or `None` when every adapter misses
fn query_chain(
    name: &str,
    descriptor: &FieldDescriptor,
    adapters: &[SharedAdapter],
) -> Result<Option<Value>, ConfigError> {
    for adapter in adapters {
        match adapter.resolve(name, descriptor) {
            Ok(value) => {
                debug!(field = name, adapter = adapter.name(), "resolved");
                return Ok(Some(value));
            }
            Err(e) if e.is_miss() => {
                debug!(field = name, adapter = adapter.name(), reason = %e, "miss");
            }
            Err(source) => {
                return Err(ConfigError::Adapter {
                    name: name.to_string(),
                    adapter: adapter.name(),
                    source,
                });
            }
        }
    }
    Ok(None)
}
