use colored::{ColoredString, Colorize};
use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors surfaced to callers of a field accessor
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A member was used as a field before it was given a name
    #[error("{}: field is not declared, give it a name before binding", key(.accessor))]
    NotDeclared { accessor: String },

    /// A field was resolved before its config class was bound to adapters
    #[error("{}: field has no adapters, bind its config class first", key(.name))]
    NotBound { name: String },

    /// Adapter configuration storage was read before the field was declared
    #[error("{}: adapter configs are not initialized", key(.accessor))]
    AdapterConfigsUninitialized { accessor: String },

    /// The cache slot was read while empty
    #[error("{}: no cached value", key(.accessor))]
    NoCachedValue { accessor: String },

    /// The member is not a wrapper around another accessor
    #[error("{}: no original accessor", key(.accessor))]
    NoOriginalAccessor { accessor: String },

    /// No member with this identifier exists on the config class
    #[error("{}: unknown accessor", key(.accessor))]
    UnknownAccessor { accessor: String },

    /// A field name was empty
    #[error("field name must be a non-empty string")]
    InvalidName,

    /// A field declaration was rejected when it was registered
    #[error("{}: invalid field declaration: {reason}", key(.accessor))]
    InvalidDeclaration { accessor: String, reason: String },

    /// The default adapter registry must never be empty
    #[error("at least one default adapter is required")]
    NoDefaultAdapters,

    /// A required field resolved to nothing
    #[error("{}: not found in any configured adapter", key(.name))]
    FieldNotFound { name: String },

    /// A value could not be transformed or converted
    #[error("{}: invalid value {}: {reason}", key(.name), quoted(.value))]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    /// A validator rejected the final value
    #[error("validation failed for \"{accessor}\" ({}): {source}", key(.name))]
    Validation {
        accessor: String,
        name: String,
        #[source]
        source: ValidationError,
    },

    /// An adapter failed with anything other than a miss
    #[error("{}: adapter {adapter} failed: {source}", key(.name))]
    Adapter {
        name: String,
        adapter: &'static str,
        #[source]
        source: AdapterError,
    },
}

fn key(name: &str) -> ColoredString {
    name.magenta().bold()
}

fn quoted(value: &str) -> ColoredString {
    format!("'{}'", value).red()
}

/// Coarse classification of [`ConfigError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Developer misuse: undeclared field, unbound class, bad registry input
    Configuration,
    /// Required field absent everywhere
    FieldNotFound,
    /// A validator rejected the value
    Validation,
    /// Transformation or type conversion failed
    InvalidValue,
    /// An adapter failed for a reason other than a miss
    Adapter,
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotDeclared { .. }
            | Self::NotBound { .. }
            | Self::AdapterConfigsUninitialized { .. }
            | Self::NoCachedValue { .. }
            | Self::NoOriginalAccessor { .. }
            | Self::UnknownAccessor { .. }
            | Self::InvalidName
            | Self::InvalidDeclaration { .. }
            | Self::NoDefaultAdapters => ErrorKind::Configuration,
            Self::FieldNotFound { .. } => ErrorKind::FieldNotFound,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::InvalidValue { .. } => ErrorKind::InvalidValue,
            Self::Adapter { .. } => ErrorKind::Adapter,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

/// What an adapter reports when it cannot produce a value
///
/// Only [`AdapterError::Miss`] lets the pipeline move on to the next adapter.
/// Every other variant is fatal for the resolution.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdapterError {
    /// The source does not hold the field
    #[error("{0}")]
    Miss(String),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("section [{section}] not found in {files}")]
    MissingSection { section: String, files: String },

    #[error("{0}")]
    Misconfigured(String),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl AdapterError {
    pub fn miss(reason: impl Into<String>) -> Self {
        Self::Miss(reason.into())
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss(_))
    }
}

/// Rejection raised by a validator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure raised by a transformer or a typed conversion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct TransformError {
    pub value: String,
    pub reason: String,
}

impl TransformError {
    pub fn new(value: impl ToString, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn into_config_error(self, name: &str) -> ConfigError {
        ConfigError::InvalidValue {
            name: name.to_string(),
            value: self.value,
            reason: self.reason,
        }
    }
}
