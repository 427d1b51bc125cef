use crate::{
    adapter::{Adapter, SharedAdapter},
    error::ConfigError,
    transform::Transformer,
    validate::Validator,
    value::Value,
};
use parking_lot::{Mutex, RwLock};
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Identity of an adapter type, used to key per-field adapter configuration
#[derive(Clone, Copy)]
pub struct AdapterKind {
    id: TypeId,
    name: &'static str,
}

impl AdapterKind {
    pub fn of<A: Adapter + 'static>() -> Self {
        Self {
            id: TypeId::of::<A>(),
            name: std::any::type_name::<A>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for AdapterKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AdapterKind {}

impl Hash for AdapterKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Per-field configuration consumed by one adapter type
///
/// The blob is stored type-erased on the field and read back by the adapter
/// named in `Adapter` when it resolves that field.
pub trait AdapterConfig: Any + Send + Sync + fmt::Debug {
    type Adapter: Adapter + 'static;
}

/// Type-erased adapter configuration as stored on a field
pub type ErasedConfig = Arc<dyn Any + Send + Sync>;

/// Body of an accessor: computes the field's default from the config instance
pub type AccessorFn<C> = Arc<dyn Fn(&C) -> Value + Send + Sync>;

/// Resolution metadata of one field
///
/// This is the part of a field accessor that adapters get to see while they
/// resolve it.
#[derive(Clone, Default)]
pub struct FieldDescriptor {
    name: Option<String>,
    optional: Option<bool>,
    adapters: Option<Vec<SharedAdapter>>,
    adapter_configs: Option<HashMap<AdapterKind, ErasedConfig>>,
    validators: Vec<Validator>,
    transformers: Vec<Transformer>,
    // Field-level adapters as they were before the first binding
    declared_adapters: Option<Option<Vec<SharedAdapter>>>,
}

impl FieldDescriptor {
    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional.unwrap_or(false)
    }

    pub fn adapters(&self) -> Option<&[SharedAdapter]> {
        self.adapters.as_deref()
    }

    pub fn has_adapter_configs(&self) -> bool {
        self.adapter_configs.is_some()
    }

    pub fn adapter_configs(&self) -> Option<&HashMap<AdapterKind, ErasedConfig>> {
        self.adapter_configs.as_ref()
    }

    /// Configuration stored for the adapter owning `T`, if any
    pub fn adapter_config<T: AdapterConfig>(&self) -> Option<&T> {
        self.adapter_configs
            .as_ref()?
            .get(&AdapterKind::of::<T::Adapter>())?
            .downcast_ref::<T>()
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn transformers(&self) -> &[Transformer] {
        &self.transformers
    }

    pub(crate) fn field_level_adapters(&mut self) -> Option<Vec<SharedAdapter>> {
        let adapters = &self.adapters;
        self.declared_adapters
            .get_or_insert_with(|| adapters.clone())
            .clone()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("optional", &self.is_optional())
            .field("adapters", &self.adapters)
            .field(
                "adapter_configs",
                &self.adapter_configs.as_ref().map(|c| c.keys().collect::<Vec<_>>()),
            )
            .field("validators", &self.validators.len())
            .field("transformers", &self.transformers.len())
            .finish()
    }
}

/// A field accessor of config type `C`
///
/// Bundles the accessor body with its [`FieldDescriptor`], the cached
/// resolution and, for pipeline wrappers, a back-reference to the accessor
/// they wrap. Accessors live in the class-level [`Schema`](crate::Schema), so
/// the cache is shared by every instance of `C`.
pub struct Accessor<C> {
    ident: String,
    body: AccessorFn<C>,
    descriptor: RwLock<FieldDescriptor>,
    cached: Mutex<Option<Value>>,
    original: RwLock<Option<Arc<Accessor<C>>>>,
}

impl<C> Accessor<C> {
    pub fn new<F>(ident: impl Into<String>, body: F) -> Self
    where
        F: Fn(&C) -> Value + Send + Sync + 'static,
    {
        Self::from_parts(ident.into(), Arc::new(body))
    }

    fn from_parts(ident: String, body: AccessorFn<C>) -> Self {
        Self {
            ident,
            body,
            descriptor: RwLock::new(FieldDescriptor::default()),
            cached: Mutex::new(None),
            original: RwLock::new(None),
        }
    }

    /// A wrapper sharing `original`'s identifier and body, pointing back at it
    pub fn wrap(original: Arc<Accessor<C>>) -> Self {
        let wrapper = Self::from_parts(original.ident.clone(), Arc::clone(&original.body));
        wrapper.set_original_accessor(original);
        wrapper
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Runs the accessor body, bypassing every adapter
    pub fn call_body(&self, instance: &C) -> Value {
        (self.body)(instance)
    }

    /// A copy of the descriptor that holds no lock
    pub fn descriptor(&self) -> FieldDescriptor {
        self.descriptor.read().clone()
    }

    pub(crate) fn with_descriptor<R>(&self, f: impl FnOnce(&mut FieldDescriptor) -> R) -> R {
        f(&mut self.descriptor.write())
    }

    /// Sets the field name; calling it again overwrites the previous name
    pub fn declare(&self, name: impl Into<String>) -> Result<(), ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidName);
        }
        self.descriptor.write().name = Some(name);
        Ok(())
    }

    pub fn has_name(&self) -> bool {
        self.descriptor.read().has_name()
    }

    pub fn name(&self) -> Result<String, ConfigError> {
        self.descriptor
            .read()
            .name
            .clone()
            .ok_or_else(|| ConfigError::NotDeclared {
                accessor: self.ident.clone(),
            })
    }

    pub fn init_adapter_configs(&self) {
        self.descriptor.write().adapter_configs = Some(HashMap::new());
    }

    pub fn adapter_configs(&self) -> Result<HashMap<AdapterKind, ErasedConfig>, ConfigError> {
        self.descriptor
            .read()
            .adapter_configs
            .clone()
            .ok_or_else(|| ConfigError::AdapterConfigsUninitialized {
                accessor: self.ident.clone(),
            })
    }

    /// Replaces or inserts the configuration stored for `kind`
    pub fn upsert_adapter_config(
        &self,
        kind: AdapterKind,
        config: ErasedConfig,
    ) -> Result<(), ConfigError> {
        let mut descriptor = self.descriptor.write();
        let configs = descriptor.adapter_configs.as_mut().ok_or_else(|| {
            ConfigError::AdapterConfigsUninitialized {
                accessor: self.ident.clone(),
            }
        })?;
        configs.insert(kind, config);
        Ok(())
    }

    pub fn adapters(&self) -> Option<Vec<SharedAdapter>> {
        self.descriptor.read().adapters.clone()
    }

    pub fn set_adapters(&self, adapters: Vec<SharedAdapter>) {
        self.descriptor.write().adapters = Some(adapters);
    }

    pub fn has_adapters(&self) -> bool {
        self.descriptor.read().adapters.is_some()
    }

    /// Prepends `adapter`, giving it the highest priority among field adapters
    pub fn add_adapter(&self, adapter: SharedAdapter) {
        self.descriptor
            .write()
            .adapters
            .get_or_insert_with(Vec::new)
            .insert(0, adapter);
    }

    pub fn add_validator(&self, validator: Validator) {
        self.descriptor.write().validators.push(validator);
    }

    pub fn validators(&self) -> Vec<Validator> {
        self.descriptor.read().validators.clone()
    }

    pub fn set_optional(&self, optional: bool) {
        self.descriptor.write().optional = Some(optional);
    }

    pub fn is_optional(&self) -> bool {
        self.descriptor.read().is_optional()
    }

    pub fn add_transformer(&self, transformer: Transformer) {
        self.descriptor.write().transformers.push(transformer);
    }

    pub fn transformers(&self) -> Vec<Transformer> {
        self.descriptor.read().transformers.clone()
    }

    pub fn set_cached_value(&self, value: Value) {
        *self.cached.lock() = Some(value);
    }

    pub fn has_cached_value(&self) -> bool {
        self.cached.lock().is_some()
    }

    pub fn cached_value(&self) -> Result<Value, ConfigError> {
        self.cached
            .lock()
            .clone()
            .ok_or_else(|| ConfigError::NoCachedValue {
                accessor: self.ident.clone(),
            })
    }

    pub fn delete_cached_value(&self) {
        self.cached.lock().take();
    }

    pub fn set_original_accessor(&self, original: Arc<Accessor<C>>) {
        *self.original.write() = Some(original);
    }

    pub fn has_original_accessor(&self) -> bool {
        self.original.read().is_some()
    }

    pub fn original_accessor(&self) -> Result<Arc<Accessor<C>>, ConfigError> {
        self.original
            .read()
            .clone()
            .ok_or_else(|| ConfigError::NoOriginalAccessor {
                accessor: self.ident.clone(),
            })
    }
}

impl<C> fmt::Debug for Accessor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("ident", &self.ident)
            .field("descriptor", &*self.descriptor.read())
            .field("cached", &*self.cached.lock())
            .field("wrapper", &self.has_original_accessor())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapter::adapter_fn, error::AdapterError, transform, validate};

    struct Stub;

    fn stub_accessor() -> Accessor<Stub> {
        Accessor::new("stub_function", |_: &Stub| Value::Null)
    }

    fn stub_adapter(label: &'static str) -> SharedAdapter {
        adapter_fn(move |_, _| Ok(Value::from(label)))
    }

    #[derive(Debug)]
    struct StubConfig(u8);

    #[derive(Debug)]
    struct StubAdapter;

    impl Adapter for StubAdapter {
        fn resolve(&self, _: &str, _: &FieldDescriptor) -> Result<Value, AdapterError> {
            Err(AdapterError::miss("stub"))
        }
    }

    impl AdapterConfig for StubConfig {
        type Adapter = StubAdapter;
    }

    #[test]
    fn test_adapter_configs_start_empty_once_initialized() {
        let accessor = stub_accessor();
        accessor.init_adapter_configs();
        assert!(accessor.adapter_configs().unwrap().is_empty());
    }

    #[test]
    fn test_adapter_configs_fail_before_initialization() {
        let accessor = stub_accessor();
        let err = accessor.adapter_configs().unwrap_err();
        assert!(matches!(err, ConfigError::AdapterConfigsUninitialized { .. }));
        assert!(
            accessor
                .upsert_adapter_config(AdapterKind::of::<StubAdapter>(), Arc::new(StubConfig(1)))
                .is_err()
        );
    }

    #[test]
    fn test_upsert_replaces_by_adapter_kind() {
        let accessor = stub_accessor();
        accessor.init_adapter_configs();
        let kind = AdapterKind::of::<StubAdapter>();
        accessor
            .upsert_adapter_config(kind, Arc::new(StubConfig(1)))
            .unwrap();
        accessor
            .upsert_adapter_config(kind, Arc::new(StubConfig(2)))
            .unwrap();

        assert_eq!(accessor.adapter_configs().unwrap().len(), 1);
        let descriptor = accessor.descriptor();
        assert_eq!(descriptor.adapter_config::<StubConfig>().unwrap().0, 2);
    }

    #[test]
    fn test_name_is_required_and_overwritable() {
        let accessor = stub_accessor();
        assert!(!accessor.has_name());
        assert!(matches!(
            accessor.name(),
            Err(ConfigError::NotDeclared { .. })
        ));

        accessor.declare("first").unwrap();
        accessor.declare("second").unwrap();
        assert_eq!(accessor.name().unwrap(), "second");
    }

    #[test]
    fn test_declare_rejects_blank_name() {
        let accessor = stub_accessor();
        assert!(matches!(accessor.declare("  "), Err(ConfigError::InvalidName)));
    }

    #[test]
    fn test_adapters_distinguish_unset_from_empty() {
        let accessor = stub_accessor();
        assert!(!accessor.has_adapters());
        assert!(accessor.adapters().is_none());

        accessor.set_adapters(Vec::new());
        assert!(accessor.has_adapters());
        assert_eq!(accessor.adapters().unwrap().len(), 0);
    }

    #[test]
    fn test_add_adapter_prepends() {
        let accessor = stub_accessor();
        let first = stub_adapter("first");
        let second = stub_adapter("second");
        accessor.add_adapter(Arc::clone(&first));
        accessor.add_adapter(Arc::clone(&second));

        let adapters = accessor.adapters().unwrap();
        assert!(Arc::ptr_eq(&adapters[0], &second));
        assert!(Arc::ptr_eq(&adapters[1], &first));
    }

    #[test]
    fn test_validators_and_transformers_append() {
        let accessor = stub_accessor();
        assert!(accessor.validators().is_empty());
        assert!(accessor.transformers().is_empty());

        accessor.add_validator(validate::is_not_empty());
        accessor.add_validator(validate::max_length(3));
        accessor.add_transformer(transform::string(false));

        assert_eq!(accessor.validators().len(), 2);
        assert_eq!(accessor.transformers().len(), 1);
    }

    #[test]
    fn test_optional_defaults_to_false() {
        let accessor = stub_accessor();
        assert!(!accessor.is_optional());
        accessor.set_optional(true);
        assert!(accessor.is_optional());
    }

    #[test]
    fn test_cached_value_lifecycle() {
        let accessor = stub_accessor();
        assert!(!accessor.has_cached_value());
        assert!(matches!(
            accessor.cached_value(),
            Err(ConfigError::NoCachedValue { .. })
        ));

        accessor.set_cached_value(Value::Integer(42));
        assert_eq!(accessor.cached_value().unwrap(), Value::Integer(42));

        accessor.delete_cached_value();
        assert!(!accessor.has_cached_value());
        accessor.delete_cached_value();
    }

    #[test]
    fn test_wrap_points_back_to_original() {
        let original = Arc::new(stub_accessor());
        assert!(!original.has_original_accessor());
        assert!(original.original_accessor().is_err());

        let wrapper = Accessor::wrap(Arc::clone(&original));
        assert_eq!(wrapper.ident(), "stub_function");
        assert!(Arc::ptr_eq(&wrapper.original_accessor().unwrap(), &original));
    }

    #[test]
    fn test_field_level_adapters_are_snapshotted() {
        let accessor = stub_accessor();
        accessor.add_adapter(stub_adapter("field"));

        let first = accessor.with_descriptor(|d| d.field_level_adapters());
        accessor.set_adapters(vec![stub_adapter("a"), stub_adapter("b")]);
        let second = accessor.with_descriptor(|d| d.field_level_adapters());

        assert_eq!(first.unwrap().len(), 1);
        assert_eq!(second.unwrap().len(), 1);
    }
}
