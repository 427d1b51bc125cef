use colored::Colorize;
use config_resolvr::{
    Configurable, EnvAdapter, EnvConfig, define_config, format_config_errors, reset_cache,
    transform::{boolean, comma_separated, integer, string},
    validate::{is_in_range, is_not_empty},
};
use tracing_subscriber::EnvFilter;

define_config!(
    #[config(adapters = [EnvAdapter::with_prefix("DEMO_")])]
    #[derive(Debug, Default)]
    pub struct DemoConfig {
        /// Service name, required
        #[field(name = "name", transform = string(false), validate = is_not_empty())]
        pub name: String,

        #[field(name = "port", default = 8080, optional,
                transform = integer(false), validate = is_in_range(1, 65535))]
        pub port: u16,

        #[field(name = "debug", default = false, optional, transform = boolean(false))]
        pub debug: bool,

        #[field(name = "tags", optional, transform = comma_separated(string(false), false))]
        pub tags: Vec<String>,

        /// Read from `LOG_LEVEL`, without the demo prefix
        #[field(name = "log_level", default = "info", optional,
                configure = EnvConfig::new().override_name("LOG_LEVEL").ignore_prefix(true))]
        pub log_level: String,
    }
);

define_config!(
    #[derive(Debug, Default)]
    pub struct BrokenConfig {
        #[field(name = "error_test_string")]
        pub test_string: String,

        #[field(name = "test_wrong_type", default = 42, optional, transform = integer(false))]
        pub test_wrong_type: i32,
    }
);

fn main() {
    dotenvy::from_filename("./test.env").ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match std::env::args().nth(1) {
        Some(arg) => match arg.as_str() {
            "show" => show(),
            "describe" => describe(),
            "reset" => reset(),
            "error" => error(),
            _ => println!(
                "unknown arg: {}. Available: show, describe, reset, error",
                arg
            ),
        },
        None => {
            println!("Usage: util-cli [command]");
            println!("Commands:");
            println!("  show     - Resolve DemoConfig and print every field");
            println!("  describe - Show field metadata and adapter chains");
            println!("  reset    - Resolve, reset the cache and resolve again");
            println!("  error    - Resolve a config with failing fields");
        }
    };
}

fn show() {
    let config = match DemoConfig::load_or_error() {
        Ok(config) => config,
        Err(errors) => {
            eprintln!("{}", format_config_errors(&errors));
            return;
        }
    };
    println!("Config loaded successfully!");
    print_config(&config);
}

fn print_config(config: &DemoConfig) {
    println!("  name: {}", display(config.name()));
    println!("  port: {}", display(config.port()));
    println!("  debug: {}", display(config.debug()));
    println!("  tags: {}", display(config.tags().map(|tags| tags.join(", "))));
    println!("  log_level: {}", display(config.log_level()));
}

fn display<T: ToString>(value: Result<T, config_resolvr::ConfigError>) -> String {
    match value {
        Ok(value) => value.to_string().green().to_string(),
        Err(e) => e.to_string(),
    }
}

fn describe() {
    println!("DemoConfig fields:");
    for field in DemoConfig::schema().describe() {
        println!("  {}:", field.ident.bold());
        println!("    name: {}", field.name);
        println!("    optional: {}", field.optional);
        println!("    adapters: {}", field.adapters.join(" -> "));
    }
}

fn reset() {
    let config = DemoConfig;
    println!("first resolution:");
    print_config(&config);

    reset_cache(&config);
    println!("after cache reset:");
    print_config(&config);
}

fn error() {
    match BrokenConfig::load_or_error() {
        Ok(config) => println!("unexpectedly loaded: {:?}", config),
        Err(errors) => {
            eprintln!("Failed to load config:");
            for error in errors {
                eprintln!("\t- {}", error);
            }
        }
    }
    println!("all done");
}
