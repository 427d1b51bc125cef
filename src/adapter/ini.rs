use super::Adapter;
use crate::{error::AdapterError, field::AdapterConfig, field::FieldDescriptor, value::Value};
use arc_swap::ArcSwapOption;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

static DEFAULT_INI_FILES: ArcSwapOption<Vec<PathBuf>> = ArcSwapOption::const_empty();

const DEFAULT_SECTION: &str = "DEFAULT";

/// Sets the INI files every [`IniAdapter`] reads first
///
/// Useful when several config classes share the same files. Affects every
/// later resolution, including adapters built before the call.
pub fn set_default_ini_files<I, P>(paths: I)
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
    DEFAULT_INI_FILES.store(Some(Arc::new(paths)));
}

pub fn default_ini_files() -> Option<Vec<PathBuf>> {
    DEFAULT_INI_FILES.load_full().map(|paths| paths.as_ref().clone())
}

/// Resolves fields from options of one section across a list of INI files
///
/// Files are read in order and later files override earlier ones. Files that
/// do not exist are skipped.
#[derive(Debug, Clone)]
pub struct IniAdapter {
    section: String,
    files: Option<Vec<PathBuf>>,
    override_files: bool,
}

/// Per-field settings for [`IniAdapter`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IniConfig {
    /// Option to read instead of the field name
    pub option: Option<String>,
    /// Section to read instead of the adapter's section
    pub section: Option<String>,
    /// Extra files for this field
    pub files: Option<Vec<PathBuf>>,
    /// Read only `files`, ignoring the default and adapter files
    pub override_files: bool,
}

impl IniConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    pub fn override_files(mut self, override_files: bool) -> Self {
        self.override_files = override_files;
        self
    }
}

impl AdapterConfig for IniConfig {
    type Adapter = IniAdapter;
}

impl IniAdapter {
    pub fn new<I, P>(section: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            section: section.into(),
            files: Some(files.into_iter().map(Into::into).collect()),
            override_files: false,
        }
    }

    /// An adapter that only reads the process-wide default files
    pub fn with_defaults(section: impl Into<String>) -> Self {
        if DEFAULT_INI_FILES.load().is_none() {
            tracing::warn!("no INI files specified for IniAdapter");
        }
        Self {
            section: section.into(),
            files: None,
            override_files: false,
        }
    }

    /// Ignore the process-wide default files
    pub fn override_files(mut self, override_files: bool) -> Self {
        self.override_files = override_files;
        self
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// Files consulted for a field, in reading order
    pub fn file_list(&self, config: Option<&IniConfig>) -> Result<Vec<PathBuf>, AdapterError> {
        let mut files = default_ini_files().unwrap_or_default();
        if self.override_files {
            files.clear();
        }
        if let Some(own) = &self.files {
            files.extend(own.iter().cloned());
        }
        if let Some(config) = config {
            if config.override_files {
                files.clear();
            }
            if let Some(extra) = &config.files {
                files.extend(extra.iter().cloned());
            }
        }
        if files.is_empty() {
            return Err(AdapterError::Misconfigured(
                "no INI files specified for IniAdapter".to_string(),
            ));
        }
        Ok(files)
    }
}

type Sections = HashMap<String, HashMap<String, String>>;

fn read_files(files: &[PathBuf]) -> Result<Sections, AdapterError> {
    let mut sections = Sections::new();
    for path in files.iter().filter(|p| p.is_file()) {
        let ini = ::ini::Ini::load_from_file(path).map_err(|e| ini_error(path, e))?;
        for (section, properties) in ini.iter() {
            let Some(section) = section else { continue };
            let options = sections.entry(section.to_string()).or_default();
            for (key, value) in properties.iter() {
                options.insert(key.to_lowercase(), value.to_string());
            }
        }
    }
    Ok(sections)
}

fn ini_error(path: &Path, error: ::ini::Error) -> AdapterError {
    match error {
        ::ini::Error::Io(source) => AdapterError::Io {
            path: path.to_path_buf(),
            source,
        },
        ::ini::Error::Parse(e) => AdapterError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    }
}

fn display_files(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Adapter for IniAdapter {
    fn resolve(&self, field_name: &str, field: &FieldDescriptor) -> Result<Value, AdapterError> {
        let config = field.adapter_config::<IniConfig>();
        let section = config
            .and_then(|c| c.section.as_deref())
            .unwrap_or(&self.section);
        let option = config
            .and_then(|c| c.option.as_deref())
            .unwrap_or(field_name)
            .to_lowercase();
        let files = self.file_list(config)?;
        let sections = read_files(&files)?;

        let options = sections
            .get(section)
            .ok_or_else(|| AdapterError::MissingSection {
                section: section.to_string(),
                files: display_files(&files),
            })?;

        options
            .get(&option)
            .or_else(|| sections.get(DEFAULT_SECTION)?.get(&option))
            .map(|value| Value::Text(value.clone()))
            .ok_or_else(|| {
                AdapterError::miss(format!(
                    "option {} not found in [{}] of {}",
                    option,
                    section,
                    display_files(&files)
                ))
            })
    }

    fn name(&self) -> &'static str {
        "IniAdapter"
    }
}
