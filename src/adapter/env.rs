use super::Adapter;
use crate::{error::AdapterError, field::AdapterConfig, field::FieldDescriptor, value::Value};
use std::{collections::HashMap, env, path::Path, sync::Arc};

/// Resolves fields from environment variables
///
/// The variable name is the field name upper-cased, prefixed with the
/// adapter prefix. A dotenv file loaded through [`EnvAdapter::from_dotenv`]
/// fills in variables the process environment does not set.
#[derive(Debug, Clone, Default)]
pub struct EnvAdapter {
    prefix: String,
    dotenv: Option<Arc<HashMap<String, String>>>,
}

/// Per-field settings for [`EnvAdapter`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvConfig {
    /// Variable name to use instead of the upper-cased field name
    pub override_name: Option<String>,
    /// Skip the adapter prefix for this field
    pub ignore_prefix: bool,
}

impl EnvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn override_name(mut self, name: impl Into<String>) -> Self {
        self.override_name = Some(name.into());
        self
    }

    pub fn ignore_prefix(mut self, ignore: bool) -> Self {
        self.ignore_prefix = ignore;
        self
    }
}

impl AdapterConfig for EnvConfig {
    type Adapter = EnvAdapter;
}

impl EnvAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            dotenv: None,
        }
    }

    /// Reads `path` as a dotenv file without touching the process environment
    pub fn from_dotenv(self, path: impl AsRef<Path>) -> Result<Self, AdapterError> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|e| dotenv_error(path, e))?;
        let mut vars = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| dotenv_error(path, e))?;
            vars.insert(key, value);
        }
        Ok(Self {
            dotenv: Some(Arc::new(vars)),
            ..self
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Environment variable name looked up for `field_name`
    pub fn variable_name(&self, field_name: &str, config: Option<&EnvConfig>) -> String {
        let name = config
            .and_then(|c| c.override_name.clone())
            .unwrap_or_else(|| field_name.to_uppercase());
        let ignore_prefix = config.is_some_and(|c| c.ignore_prefix);
        if ignore_prefix {
            name
        } else {
            format!("{}{}", self.prefix, name)
        }
    }
}

impl Adapter for EnvAdapter {
    fn resolve(&self, field_name: &str, field: &FieldDescriptor) -> Result<Value, AdapterError> {
        let key = self.variable_name(field_name, field.adapter_config::<EnvConfig>());
        match env::var(&key) {
            Ok(value) => Ok(Value::Text(value)),
            Err(env::VarError::NotPresent) => self
                .dotenv
                .as_ref()
                .and_then(|vars| vars.get(&key))
                .map(|value| Value::Text(value.clone()))
                .ok_or_else(|| AdapterError::miss(format!("environment variable {} not found", key))),
            Err(env::VarError::NotUnicode(_)) => Err(AdapterError::Misconfigured(format!(
                "environment variable {} is not valid unicode",
                key
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "EnvAdapter"
    }
}

fn dotenv_error(path: &Path, error: dotenvy::Error) -> AdapterError {
    match error {
        dotenvy::Error::Io(source) => AdapterError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => AdapterError::Parse {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}
