//! Configuration sources a field can be resolved from.
//!
//! An [`Adapter`] answers one question: what is the value of this field? It
//! answers [`AdapterError::Miss`] when it does not know, which makes the
//! resolution pipeline try the next adapter in the chain. Any other error
//! aborts the resolution.

mod env;
mod ini;
mod map;

pub use env::{EnvAdapter, EnvConfig};
pub use ini::{IniAdapter, IniConfig, default_ini_files, set_default_ini_files};
pub use map::MapAdapter;

use crate::{error::AdapterError, field::FieldDescriptor, value::Value};
use std::{fmt, sync::Arc};

/// A configuration source
pub trait Adapter: Send + Sync + fmt::Debug {
    /// Looks up `field_name`
    ///
    /// `field` carries the per-field adapter configuration, see
    /// [`FieldDescriptor::adapter_config`].
    fn resolve(&self, field_name: &str, field: &FieldDescriptor) -> Result<Value, AdapterError>;

    /// Label used in logs and error messages
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// An adapter shared between every field chain that includes it
pub type SharedAdapter = Arc<dyn Adapter>;

/// Anything that can sit in an adapter chain
pub trait IntoAdapter {
    fn into_adapter(self) -> SharedAdapter;
}

impl<A: Adapter + 'static> IntoAdapter for A {
    fn into_adapter(self) -> SharedAdapter {
        Arc::new(self)
    }
}

impl IntoAdapter for SharedAdapter {
    fn into_adapter(self) -> SharedAdapter {
        self
    }
}

/// Adapter backed by a closure
pub struct FnAdapter<F> {
    resolve: F,
}

impl<F> fmt::Debug for FnAdapter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnAdapter")
    }
}

impl<F> Adapter for FnAdapter<F>
where
    F: Fn(&str, &FieldDescriptor) -> Result<Value, AdapterError> + Send + Sync,
{
    fn resolve(&self, field_name: &str, field: &FieldDescriptor) -> Result<Value, AdapterError> {
        (self.resolve)(field_name, field)
    }

    fn name(&self) -> &'static str {
        "FnAdapter"
    }
}

/// Wraps a closure into a [`SharedAdapter`]
///
/// ```rust
/// use config_resolvr::{AdapterError, Value, adapter_fn};
///
/// let fixed = adapter_fn(|name, _| match name {
///     "port" => Ok(Value::from("8080")),
///     _ => Err(AdapterError::miss(format!("{} not fixed", name))),
/// });
/// # let _ = fixed;
/// ```
pub fn adapter_fn<F>(resolve: F) -> SharedAdapter
where
    F: Fn(&str, &FieldDescriptor) -> Result<Value, AdapterError> + Send + Sync + 'static,
{
    Arc::new(FnAdapter { resolve })
}
