//! Config classes: the ordered member list of a config type and its binding.
//!
//! A [`Schema`] holds one accessor per member. Binding replaces every declared
//! field with a wrapper that resolves through the [pipeline](crate::pipeline),
//! keeping a back-reference to the original accessor where the metadata and
//! the cache live. Because the schema is a class-level static, cached values
//! are shared by every instance of the config type.

use crate::{
    adapter::SharedAdapter,
    builder::{FieldBuilder, format_config_errors},
    error::ConfigError,
    field::Accessor,
    pipeline, registry,
    value::{FromValue, Value},
};
use parking_lot::RwLock;
use std::{fmt, sync::Arc};
use tracing::{debug, warn};

/// Metadata of one declared field, for tooling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSummary {
    pub ident: String,
    pub name: String,
    pub optional: bool,
    /// Adapter labels in the order they are queried, empty until bound
    pub adapters: Vec<&'static str>,
}

/// The members of config type `C`
pub struct Schema<C> {
    members: RwLock<Vec<Arc<Accessor<C>>>>,
    /// Declaration errors by accessor, reported again by `bind`
    rejected: RwLock<Vec<(String, String)>>,
}

impl<C> Default for Schema<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Schema<C> {
    pub fn new() -> Self {
        Self {
            members: RwLock::new(Vec::new()),
            rejected: RwLock::new(Vec::new()),
        }
    }

    /// Registers a declared field
    pub fn field(self, builder: FieldBuilder<C>) -> Self {
        let (accessor, errors) = builder.finish();
        for error in &errors {
            warn!(accessor = accessor.ident(), %error, "invalid field declaration");
            self.rejected
                .write()
                .push((accessor.ident().to_string(), error.to_string()));
        }
        self.members.write().push(Arc::new(accessor));
        self
    }

    /// Registers a plain member; binding leaves it alone
    pub fn method<F>(self, ident: impl Into<String>, body: F) -> Self
    where
        F: Fn(&C) -> Value + Send + Sync + 'static,
    {
        self.members.write().push(Arc::new(Accessor::new(ident, body)));
        self
    }

    /// Wires every declared field to `adapters`, or to the process-wide
    /// defaults when `None`
    ///
    /// The effective chain of a field is its own adapters followed by the
    /// supplied ones. Binding again replaces the previous wiring. Nothing is
    /// changed when a declared field has no name; the error then carries the
    /// declaration problem recorded by [`field`](Self::field), if any.
    pub fn bind(&self, adapters: Option<Vec<SharedAdapter>>) -> Result<(), ConfigError> {
        let supplied = adapters.unwrap_or_else(registry::defaults);
        let mut members = self.members.write();

        let originals: Vec<Arc<Accessor<C>>> = members
            .iter()
            .map(|member| member.original_accessor().unwrap_or_else(|_| Arc::clone(member)))
            .collect();

        for original in &originals {
            if is_declared(original) && !original.has_name() {
                return Err(self.declaration_error(original.ident()));
            }
        }

        for (slot, original) in members.iter_mut().zip(originals) {
            if !is_declared(&original) {
                continue;
            }
            let mut effective = original
                .with_descriptor(|descriptor| descriptor.field_level_adapters())
                .unwrap_or_default();
            effective.extend(supplied.iter().cloned());
            debug!(
                accessor = original.ident(),
                adapters = effective.len(),
                "binding field"
            );
            original.set_adapters(effective);
            *slot = Arc::new(Accessor::wrap(original));
        }
        Ok(())
    }

    /// Calls the member `ident` on `instance`
    ///
    /// Bound fields go through the resolution pipeline, plain members run
    /// their body.
    pub fn invoke(&self, instance: &C, ident: &str) -> Result<Value, ConfigError> {
        let member = self.member(ident)?;
        match member.original_accessor() {
            Ok(original) => pipeline::resolve(&original, instance),
            Err(_) if is_declared(&member) => pipeline::resolve(&member, instance),
            Err(_) => Ok(member.call_body(instance)),
        }
    }

    /// Like [`invoke`](Self::invoke), converting the value into `T`
    pub fn get<T: FromValue>(&self, instance: &C, ident: &str) -> Result<T, ConfigError> {
        let value = self.invoke(instance, ident)?;
        T::from_value(value).map_err(|e| {
            let name = self
                .member(ident)
                .and_then(|member| self.original_of(&member).name())
                .unwrap_or_else(|_| ident.to_string());
            e.into_config_error(&name)
        })
    }

    /// Clears every cached value, a no-op for fields never resolved
    pub fn reset_cache(&self) {
        for member in self.members.read().iter() {
            if let Ok(original) = member.original_accessor() {
                original.delete_cached_value();
            }
        }
        debug!("configuration cache reset");
    }

    /// Resolves every declared field, collecting all failures
    pub fn resolve_all(&self, instance: &C) -> Result<(), Vec<ConfigError>> {
        let members = self.members.read().clone();
        let errors: Vec<ConfigError> = members
            .iter()
            .map(|member| self.original_of(member))
            .filter(|original| is_declared(original))
            .filter_map(|original| pipeline::resolve(&original, instance).err())
            .collect();

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Summaries of the declared fields in declaration order
    pub fn describe(&self) -> Vec<FieldSummary> {
        self.members
            .read()
            .iter()
            .map(|member| self.original_of(member))
            .filter(|original| is_declared(original))
            .map(|original| {
                let descriptor = original.descriptor();
                FieldSummary {
                    ident: original.ident().to_string(),
                    name: descriptor.name().unwrap_or_default().to_string(),
                    optional: descriptor.is_optional(),
                    adapters: descriptor
                        .adapters()
                        .unwrap_or_default()
                        .iter()
                        .map(|adapter| adapter.name())
                        .collect(),
                }
            })
            .collect()
    }

    /// Identifiers of every member in declaration order
    pub fn idents(&self) -> Vec<String> {
        self.members
            .read()
            .iter()
            .map(|member| member.ident().to_string())
            .collect()
    }

    /// The member currently registered under `ident`
    pub fn member(&self, ident: &str) -> Result<Arc<Accessor<C>>, ConfigError> {
        self.members
            .read()
            .iter()
            .find(|member| member.ident() == ident)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownAccessor {
                accessor: ident.to_string(),
            })
    }

    fn declaration_error(&self, ident: &str) -> ConfigError {
        match self.rejected.read().iter().find(|(rejected, _)| rejected == ident) {
            Some((_, reason)) => ConfigError::InvalidDeclaration {
                accessor: ident.to_string(),
                reason: reason.clone(),
            },
            None => ConfigError::NotDeclared {
                accessor: ident.to_string(),
            },
        }
    }

    fn original_of(&self, member: &Arc<Accessor<C>>) -> Arc<Accessor<C>> {
        member
            .original_accessor()
            .unwrap_or_else(|_| Arc::clone(member))
    }
}

impl<C> fmt::Debug for Schema<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.members.read().iter()).finish()
    }
}

fn is_declared<C>(accessor: &Accessor<C>) -> bool {
    accessor.descriptor().has_adapter_configs()
}

/// A config type backed by a bound [`Schema`]
///
/// Usually implemented by [`define_config!`](crate::define_config).
pub trait Configurable: Sized + 'static {
    /// The class-level schema, bound on first use
    fn schema() -> &'static Schema<Self>;

    /// Resolves the field behind the accessor `ident`
    fn get<T: FromValue>(&self, ident: &str) -> Result<T, ConfigError> {
        Self::schema().get(self, ident)
    }

    /// A fresh instance of the config type
    fn instance() -> Self;

    /// Builds the config and resolves every field, panicking on any error
    fn load() -> Self {
        match Self::load_or_error() {
            Ok(config) => config,
            Err(errors) => panic!("{}", format_config_errors(&errors)),
        }
    }

    /// Builds the config and resolves every field, returning all errors
    fn load_or_error() -> Result<Self, Vec<ConfigError>> {
        let config = Self::instance();
        Self::schema().resolve_all(&config)?;
        Ok(config)
    }

    /// Clears the cached value of every field of this config type
    fn reset_config_resolvr_cache(&self) {
        Self::schema().reset_cache();
    }
}

/// Clears the cached values behind `instance`
///
/// Goes through [`Configurable::reset_config_resolvr_cache`], so a type
/// providing its own reset is honoured.
pub fn reset_cache<C: Configurable>(instance: &C) {
    instance.reset_config_resolvr_cache();
}
