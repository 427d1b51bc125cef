//! Declarative, lazily resolved configuration fields.
//!
//! A config type declares fields by name. Each field is resolved on first
//! access by querying a chain of [adapters](adapter), then transformed,
//! validated and cached until the cache is reset.
//!
//! ```rust,no_run
//! use config_resolvr::{Configurable, define_config, transform::integer, validate::is_in_range};
//!
//! define_config! {
//!     #[derive(Debug, Default)]
//!     pub struct ServerConfig {
//!         #[field(name = "port", default = 8080, optional,
//!                 transform = integer(false), validate = is_in_range(1, 65535))]
//!         pub port: u16,
//!     }
//! }
//!
//! let config = ServerConfig::load();
//! let port = config.port().unwrap_or(8080);
//! # let _ = port;
//! ```

pub mod adapter;
pub mod builder;
pub mod error;
pub mod field;
pub mod pipeline;
pub mod registry;
pub mod schema;
pub mod transform;
pub mod validate;
pub mod value;

// Re-export main types
pub use adapter::{
    Adapter, EnvAdapter, EnvConfig, IniAdapter, IniConfig, IntoAdapter, MapAdapter, SharedAdapter,
    adapter_fn,
};
pub use builder::{FieldBuilder, field, format_config_errors};
pub use error::{AdapterError, ConfigError, ErrorKind, TransformError, ValidationError};
pub use field::{Accessor, AdapterConfig, AdapterKind, FieldDescriptor};
pub use registry::{defaults, reset_defaults, set_defaults};
pub use schema::{Configurable, FieldSummary, Schema, reset_cache};
pub use value::{FromValue, Value, ValueKind};

// Re-export macro
pub use config_resolvr_macros::define_config;
