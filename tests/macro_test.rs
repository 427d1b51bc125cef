use config_resolvr::{
    ConfigError, Configurable, EnvAdapter, EnvConfig, ErrorKind, MapAdapter, define_config,
    reset_cache,
    transform::{boolean, comma_separated, integer, string},
    validate::{is_in_range, is_one_of},
};
use serial_test::serial;
use std::env;

define_config! {
    #[config(adapters = [EnvAdapter::with_prefix("MACRO_TEST_")])]
    #[derive(Debug)]
    pub struct AppConfig {
        /// Listening port
        #[field(name = "port", default = 8080, optional,
                transform = integer(false), validate = is_in_range(1, 65535))]
        pub port: u16,

        #[field(name = "host")]
        pub host: String,

        #[field(name = "answer", transform = integer(false), validate = is_in_range(0, 100))]
        pub answer: i64,

        #[field(name = "debug", default = false, optional = true, transform = boolean(false))]
        pub debug: bool,

        #[field(name = "features", optional, transform = comma_separated(string(false), false))]
        pub features: Vec<String>,

        #[field(name = "region",
                adapter = MapAdapter::new().with("region", "eu-west"),
                validate = is_one_of(["eu-west", "us-east"]))]
        pub region: String,

        #[field(name = "user", configure = EnvConfig::new().override_name("MACRO_TEST_LOGIN").ignore_prefix(true))]
        pub user: String,

        #[field(name = "nickname", optional)]
        pub nickname: Option<String>,
    }
}

fn clear(vars: &[&str]) {
    for var in vars {
        env::remove_var(var);
    }
}

fn set(var: &str, value: &str) {
    env::set_var(var, value);
}

#[test]
#[serial]
fn test_optional_field_uses_default() {
    clear(&["MACRO_TEST_PORT"]);
    reset_cache(&AppConfig);

    assert_eq!(AppConfig.port().unwrap(), 8080);
}

#[test]
#[serial]
fn test_env_value_is_transformed() {
    set("MACRO_TEST_PORT", "9000");
    reset_cache(&AppConfig);

    assert_eq!(AppConfig.port().unwrap(), 9000);
    clear(&["MACRO_TEST_PORT"]);
}

#[test]
#[serial]
fn test_required_field_missing() {
    clear(&["MACRO_TEST_HOST"]);
    reset_cache(&AppConfig);

    let err = AppConfig.host().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FieldNotFound);
    assert!(err.to_string().contains("host"));
}

#[test]
#[serial]
fn test_value_cached_until_reset() {
    set("MACRO_TEST_ANSWER", "42");
    reset_cache(&AppConfig);
    assert_eq!(AppConfig.answer().unwrap(), 42);

    set("MACRO_TEST_ANSWER", "7");
    assert_eq!(AppConfig.answer().unwrap(), 42);

    AppConfig.reset_config_resolvr_cache();
    assert_eq!(AppConfig.answer().unwrap(), 7);
    clear(&["MACRO_TEST_ANSWER"]);
}

#[test]
#[serial]
fn test_validation_failure() {
    set("MACRO_TEST_ANSWER", "500");
    reset_cache(&AppConfig);

    let err = AppConfig.answer().unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref accessor, .. } if accessor == "answer"));
    clear(&["MACRO_TEST_ANSWER"]);
}

#[test]
#[serial]
fn test_unparsable_value() {
    set("MACRO_TEST_ANSWER", "forty-two");
    reset_cache(&AppConfig);

    assert_eq!(AppConfig.answer().unwrap_err().kind(), ErrorKind::InvalidValue);
    clear(&["MACRO_TEST_ANSWER"]);
}

#[test]
#[serial]
fn test_boolean_and_list_fields() {
    set("MACRO_TEST_DEBUG", "yes");
    set("MACRO_TEST_FEATURES", "a,b,c");
    reset_cache(&AppConfig);

    assert!(AppConfig.debug().unwrap());
    assert_eq!(AppConfig.features().unwrap(), vec!["a", "b", "c"]);

    clear(&["MACRO_TEST_DEBUG", "MACRO_TEST_FEATURES"]);
    reset_cache(&AppConfig);
    assert!(!AppConfig.debug().unwrap());
    assert!(AppConfig.features().unwrap().is_empty());
}

#[test]
#[serial]
fn test_field_adapter_tried_before_class_adapters() {
    set("MACRO_TEST_REGION", "us-east");
    reset_cache(&AppConfig);

    assert_eq!(AppConfig.region().unwrap(), "eu-west");
    clear(&["MACRO_TEST_REGION"]);
}

#[test]
#[serial]
fn test_adapter_config_overrides_variable_name() {
    set("MACRO_TEST_LOGIN", "alice");
    set("MACRO_TEST_USER", "bob");
    reset_cache(&AppConfig);

    assert_eq!(AppConfig.user().unwrap(), "alice");
    clear(&["MACRO_TEST_LOGIN", "MACRO_TEST_USER"]);
}

#[test]
#[serial]
fn test_optional_without_default_is_none() {
    clear(&["MACRO_TEST_NICKNAME"]);
    reset_cache(&AppConfig);

    assert_eq!(AppConfig.nickname().unwrap(), None);
}

#[test]
#[serial]
fn test_load_or_error_collects_every_failure() {
    clear(&["MACRO_TEST_HOST", "MACRO_TEST_ANSWER", "MACRO_TEST_LOGIN"]);
    reset_cache(&AppConfig);

    let errors = AppConfig::load_or_error().unwrap_err();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().all(|e| e.kind() == ErrorKind::FieldNotFound));
}

#[test]
#[serial]
fn test_load_succeeds_with_everything_set() {
    set("MACRO_TEST_HOST", "localhost");
    set("MACRO_TEST_ANSWER", "1");
    set("MACRO_TEST_LOGIN", "carol");
    reset_cache(&AppConfig);

    let config = AppConfig::load();
    assert_eq!(config.host().unwrap(), "localhost");
    clear(&["MACRO_TEST_HOST", "MACRO_TEST_ANSWER", "MACRO_TEST_LOGIN"]);
}

#[test]
#[serial]
#[should_panic(expected = "Configuration failed with")]
fn test_load_panics_on_errors() {
    clear(&["MACRO_TEST_HOST"]);
    reset_cache(&AppConfig);

    let _config = AppConfig::load();
}

#[test]
fn test_schema_describes_fields() {
    let fields = AppConfig::schema().describe();
    let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["port", "host", "answer", "debug", "features", "region", "user", "nickname"]
    );

    let region = fields.iter().find(|f| f.name == "region").unwrap();
    assert_eq!(region.adapters, vec!["MapAdapter", "EnvAdapter"]);
    assert!(fields.iter().find(|f| f.name == "port").unwrap().optional);
}

define_config! {
    #[config(adapters = [MapAdapter::new().with("mode", "fast")])]
    #[derive(Debug)]
    pub struct PlainConfig {
        #[field(name = "mode")]
        pub mode: String,

        #[field(name = "level", default = 2, optional)]
        pub level: u8,
    }
}

#[test]
fn test_load_without_default_derive() {
    let config = PlainConfig::load_or_error().unwrap();
    assert_eq!(config.mode().unwrap(), "fast");
    assert_eq!(config.level().unwrap(), 2);

    let _config = PlainConfig::load();
}
