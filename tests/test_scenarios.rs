use config_resolvr::{
    AdapterError, ConfigError, Configurable, ErrorKind, FieldBuilder, Schema, SharedAdapter,
    Value, adapter_fn, field, registry, reset_cache, transform::integer,
    validate::is_in_range,
};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::{
    Arc, LazyLock,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

#[derive(Default)]
struct Probe(Arc<AtomicUsize>);

impl Probe {
    fn hits(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn miss(&self) -> SharedAdapter {
        let hits = Arc::clone(&self.0);
        adapter_fn(move |name, _| {
            hits.fetch_add(1, Ordering::SeqCst);
            Err(AdapterError::miss(format!("{} not here", name)))
        })
    }

    fn hit(&self, value: &'static str) -> SharedAdapter {
        let hits = Arc::clone(&self.0);
        adapter_fn(move |_, _| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(Value::from(value))
        })
    }
}

struct Service;

#[test]
fn test_env_miss_then_hit_is_transformed_validated_and_cached() {
    let (miss, hit) = (Probe::default(), Probe::default());
    let schema = Schema::new().field(
        field("answer", |_: &Service| Value::Null)
            .transform(integer(false))
            .validate(is_in_range(0, 100)),
    );
    schema.bind(Some(vec![miss.miss(), hit.hit("42")])).unwrap();

    assert_eq!(schema.get::<i64>(&Service, "answer").unwrap(), 42);
    assert_eq!(schema.invoke(&Service, "answer").unwrap(), Value::Integer(42));
    assert_eq!((miss.hits(), hit.hits()), (1, 1));
}

#[test]
fn test_optional_default_goes_through_transformers_and_validators() {
    let validated = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&validated);
    let schema = Schema::new().field(
        field("mode", |_: &Service| Value::from("default"))
            .optional(true)
            .transform(config_resolvr::transform::transform(|v| {
                Ok(Value::Text(format!("{}!", v)))
            }))
            .validate(config_resolvr::validate::validate(move |_| {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })),
    );
    let probe = Probe::default();
    schema.bind(Some(vec![probe.miss(), probe.miss()])).unwrap();

    assert_eq!(schema.invoke(&Service, "mode").unwrap(), Value::from("default!"));
    assert!(validated.load(Ordering::SeqCst));
    assert_eq!(probe.hits(), 2);
}

#[test]
fn test_required_field_with_null_value_is_not_found() {
    let schema = Schema::new().field(field("token", |_: &Service| Value::from("fallback")));
    schema
        .bind(Some(vec![adapter_fn(|_, _| Ok(Value::Null))]))
        .unwrap();

    let err = schema.invoke(&Service, "token").unwrap_err();
    assert!(matches!(err, ConfigError::FieldNotFound { ref name } if name == "token"));
}

#[test]
fn test_field_adapters_most_recent_first() {
    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let recorder = |label: &'static str| -> SharedAdapter {
        let order = Arc::clone(&order);
        adapter_fn(move |name, _| {
            order.lock().push(label);
            Err(AdapterError::miss(format!("{} not in {}", name, label)))
        })
    };
    let schema = Schema::new().field(
        field("host", |_: &Service| Value::from("localhost"))
            .optional(true)
            .adapter(recorder("first"))
            .adapter(recorder("second")),
    );
    schema.bind(Some(vec![recorder("class")])).unwrap();

    schema.invoke(&Service, "host").unwrap();
    assert_eq!(*order.lock(), vec!["second", "first", "class"]);
}

#[test]
#[serial(registry)]
fn test_unbound_adapters_come_from_registry_at_bind_time() {
    let before = Probe::default();
    let after = Probe::default();
    registry::set_defaults([before.hit("old")]).unwrap();

    let schema = Schema::new().field(field("color", |_: &Service| Value::Null));
    schema.bind(None).unwrap();
    registry::set_defaults([after.hit("new")]).unwrap();

    assert_eq!(schema.invoke(&Service, "color").unwrap(), Value::from("old"));
    assert_eq!(after.hits(), 0);
    registry::reset_defaults();
}

#[test]
#[serial(registry)]
fn test_empty_defaults_leave_registry_unchanged() {
    registry::reset_defaults();
    let err = registry::set_defaults(Vec::<SharedAdapter>::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(registry::defaults().len(), 1);
}

#[test]
fn test_unnamed_field_cannot_be_bound() {
    let schema: Schema<Service> =
        Schema::new().field(FieldBuilder::new("get_secret", |_: &Service| Value::Null));
    let probe = Probe::default();

    let err = schema.bind(Some(vec![probe.miss()])).unwrap_err();
    assert!(err.is_configuration());
}

struct Tracked;

static RESETS: AtomicUsize = AtomicUsize::new(0);
static TRACKED_HITS: LazyLock<Probe> = LazyLock::new(Probe::default);

impl Configurable for Tracked {
    fn instance() -> Self {
        Tracked
    }

    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Tracked>> = LazyLock::new(|| {
            let schema = Schema::new().field(field("level", |_: &Tracked| Value::Null));
            if let Err(e) = schema.bind(Some(vec![TRACKED_HITS.hit("3")])) {
                panic!("{}", e);
            }
            schema
        });
        &SCHEMA
    }

    fn reset_config_resolvr_cache(&self) {
        RESETS.fetch_add(1, Ordering::SeqCst);
        Self::schema().reset_cache();
    }
}

#[test]
fn test_reset_uses_type_provided_reset() {
    let tracked = Tracked;
    assert_eq!(tracked.get::<u8>("level").unwrap(), 3);
    assert_eq!(tracked.get::<u8>("level").unwrap(), 3);
    assert_eq!(TRACKED_HITS.hits(), 1);

    reset_cache(&tracked);
    assert_eq!(RESETS.load(Ordering::SeqCst), 1);
    assert_eq!(tracked.get::<u8>("level").unwrap(), 3);
    assert_eq!(TRACKED_HITS.hits(), 2);
}

#[test]
fn test_reset_before_any_resolution_is_noop() {
    let schema = Schema::new().field(field("never", |_: &Service| Value::Null));
    let probe = Probe::default();
    schema.bind(Some(vec![probe.hit("x")])).unwrap();

    schema.reset_cache();
    schema.reset_cache();
    assert_eq!(probe.hits(), 0);
}
