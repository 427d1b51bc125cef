use crate::{
    adapter::IntoAdapter,
    error::ConfigError,
    field::{Accessor, AdapterConfig, AdapterKind},
    transform::Transformer,
    validate::Validator,
    value::Value,
};
use colored::Colorize;
use std::sync::Arc;

/// Helper to format multiple configuration errors into a panic message
pub fn format_config_errors(errors: &[ConfigError]) -> String {
    let error_summary = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Configuration failed with {} error(s):\n{}",
        errors.len().to_string().yellow().bold(),
        error_summary
    )
}

/// Declares a field whose accessor identifier equals its name
///
/// # Example
/// ```rust
/// use config_resolvr::{Value, field, transform::integer, validate::is_in_range};
///
/// struct App;
///
/// let port = field("port", |_: &App| Value::from(8080))
///     .optional(true)
///     .transform(integer(false))
///     .validate(is_in_range(1, 65535));
/// # let _ = port;
/// ```
pub fn field<C, F>(name: &str, body: F) -> FieldBuilder<C>
where
    F: Fn(&C) -> Value + Send + Sync + 'static,
{
    FieldBuilder::new(name, body).name(name)
}

/// A field declaration in progress
///
/// Every step records metadata on the accessor under construction. Errors
/// (a blank name, for instance) are kept and reported when the owning
/// [`Schema`](crate::Schema) is bound.
pub struct FieldBuilder<C> {
    accessor: Accessor<C>,
    errors: Vec<ConfigError>,
}

impl<C> FieldBuilder<C> {
    /// Starts a field for the accessor `ident`, with `body` computing its default
    pub fn new<F>(ident: impl Into<String>, body: F) -> Self
    where
        F: Fn(&C) -> Value + Send + Sync + 'static,
    {
        let accessor = Accessor::new(ident, body);
        accessor.init_adapter_configs();
        Self {
            accessor,
            errors: Vec::new(),
        }
    }

    /// Name the adapters look the field up by
    pub fn name(mut self, name: impl Into<String>) -> Self {
        if let Err(e) = self.accessor.declare(name) {
            self.errors.push(e);
        }
        self
    }

    /// Whether a field no adapter knows falls back to the accessor body
    pub fn optional(self, optional: bool) -> Self {
        self.accessor.set_optional(optional);
        self
    }

    pub fn validate(self, validator: Validator) -> Self {
        self.accessor.add_validator(validator);
        self
    }

    pub fn transform(self, transformer: Transformer) -> Self {
        self.accessor.add_transformer(transformer);
        self
    }

    /// Adds a field-level adapter, tried before any adapter added earlier
    /// and before the class adapters
    pub fn adapter(self, adapter: impl IntoAdapter) -> Self {
        self.accessor.add_adapter(adapter.into_adapter());
        self
    }

    /// Stores per-field settings for the adapter that owns `T`
    pub fn configure<T: AdapterConfig>(mut self, config: T) -> Self {
        let kind = AdapterKind::of::<T::Adapter>();
        if let Err(e) = self.accessor.upsert_adapter_config(kind, Arc::new(config)) {
            self.errors.push(e);
        }
        self
    }

    pub(crate) fn finish(self) -> (Accessor<C>, Vec<ConfigError>) {
        (self.accessor, self.errors)
    }
}
