//! Picker configuration using Figment
//!
//! Sources are merged in precedence order (later sources override earlier ones):
//! 1. Built-in defaults
//! 2. An optional configuration file (TOML, YAML or JSON, by extension)
//! 3. Environment variables with the `ENTRY_PICKER_` prefix
//! 4. Instance parameters supplied by the host
//!
//! The host's instance parameters use the names `entityname` and `fieldstouse`;
//! both are required and validated by [`PickerConfig::into_options`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use entry_picker_fields::{
    parse_field_paths, FieldPathToken, MissingFieldPolicy, ResolveOptions, SortOrder,
};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::error::{PickerError, Result};
use crate::source::EntryQuery;

/// Upper bound on entries fetched in one request
pub const MAX_ENTRY_LIMIT: u32 = 1000;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "ENTRY_PICKER_";

/// Instance parameter naming the content type to list
pub const ENTITY_NAME_PARAM: &str = "entityname";

/// Instance parameter holding the field-path specification
pub const FIELDS_TO_USE_PARAM: &str = "fieldstouse";

/// Raw, merged configuration before validation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PickerConfig {
    #[serde(rename = "entityname", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(rename = "fieldstouse", skip_serializing_if = "Option::is_none")]
    pub fields_to_use: Option<String>,
    pub enable_navigation: bool,
    pub sort: SortOrder,
    pub include_blank_option: bool,
    pub on_missing_field: MissingFieldPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub limit: u32,
    pub include_depth: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            content_type: None,
            fields_to_use: None,
            enable_navigation: true,
            sort: SortOrder::Descending,
            include_blank_option: true,
            on_missing_field: MissingFieldPolicy::Literal,
            locale: None,
            limit: MAX_ENTRY_LIMIT,
            include_depth: 2,
            fetch_timeout_ms: None,
        }
    }
}

impl PickerConfig {
    /// Validate required parameters and produce session options.
    pub fn into_options(self) -> Result<PickerOptions> {
        let content_type = required(self.content_type, ENTITY_NAME_PARAM)?;
        let fields_to_use = required(self.fields_to_use, FIELDS_TO_USE_PARAM)?;

        let mut options = PickerOptions::new(content_type, fields_to_use);
        options.resolve = ResolveOptions {
            enable_navigation: self.enable_navigation,
            on_missing_field: self.on_missing_field,
        };
        options.sort = self.sort;
        options.include_blank_option = self.include_blank_option;
        options.locale = self.locale;
        options.limit = self.limit;
        options.include_depth = self.include_depth;
        options.fetch_timeout = self.fetch_timeout_ms.map(Duration::from_millis);
        Ok(options.normalized())
    }
}

fn required(value: Option<String>, parameter: &str) -> Result<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(PickerError::missing_parameter(parameter)),
    }
}

/// Validated options for one picker session
#[derive(Debug, Clone, PartialEq)]
pub struct PickerOptions {
    pub content_type: String,
    pub fields_to_use: String,
    pub fields: Vec<FieldPathToken>,
    pub resolve: ResolveOptions,
    pub sort: SortOrder,
    pub include_blank_option: bool,
    pub locale: Option<String>,
    pub limit: u32,
    pub include_depth: u32,
    pub fetch_timeout: Option<Duration>,
}

impl PickerOptions {
    /// Options with defaults for everything but the two required parameters
    pub fn new(content_type: impl Into<String>, fields_to_use: impl Into<String>) -> Self {
        let defaults = PickerConfig::default();
        let fields_to_use = fields_to_use.into();
        Self {
            content_type: content_type.into(),
            fields: parse_field_paths(&fields_to_use),
            fields_to_use,
            resolve: ResolveOptions::default(),
            sort: defaults.sort,
            include_blank_option: defaults.include_blank_option,
            locale: None,
            limit: defaults.limit,
            include_depth: defaults.include_depth,
            fetch_timeout: None,
        }
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_navigation(mut self, enabled: bool) -> Self {
        self.resolve.enable_navigation = enabled;
        self
    }

    pub fn with_blank_option(mut self, enabled: bool) -> Self {
        self.include_blank_option = enabled;
        self
    }

    pub fn with_missing_field_policy(mut self, policy: MissingFieldPolicy) -> Self {
        self.resolve.on_missing_field = policy;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_include_depth(mut self, depth: u32) -> Self {
        self.include_depth = depth;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Clamp the limit and warn about settings that silently degrade labels.
    pub fn normalized(mut self) -> Self {
        if self.limit == 0 || self.limit > MAX_ENTRY_LIMIT {
            debug!(
                requested = self.limit,
                max = MAX_ENTRY_LIMIT,
                "entry limit clamped"
            );
            self.limit = MAX_ENTRY_LIMIT;
        }
        if self.resolve.enable_navigation
            && self.include_depth == 0
            && self.fields.iter().any(FieldPathToken::is_navigation)
        {
            warn!(
                fields = %self.fields_to_use,
                "navigation fields configured with include depth 0; labels will show raw references"
            );
        }
        self
    }

    /// The bulk query this configuration issues
    pub fn query(&self) -> EntryQuery {
        EntryQuery {
            content_type: self.content_type.clone(),
            limit: self.limit,
            include: self.include_depth,
        }
    }
}

/// Configuration provider using figment
///
/// No caching is performed; every `load` reads all sources again.
#[derive(Debug, Default)]
pub struct ConfigProvider {
    file: Option<PathBuf>,
    parameters: Map<String, Value>,
}

impl ConfigProvider {
    /// Create a provider with only defaults and environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an additional configuration file
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Instance parameters from the host, highest precedence
    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Merge and extract the raw configuration
    pub fn load(&self) -> Result<PickerConfig> {
        let config: PickerConfig = self.build_figment()?.extract()?;
        debug!(
            content_type = ?config.content_type,
            fields = ?config.fields_to_use,
            "loaded picker configuration"
        );
        Ok(config)
    }

    /// Load and validate in one step
    pub fn load_options(&self) -> Result<PickerOptions> {
        self.load()?.into_options()
    }

    fn build_figment(&self) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(PickerConfig::default()));

        if let Some(path) = &self.file {
            figment = figment.merge(file_provider(path)?);
        }

        trace!(prefix = ENV_PREFIX, "loading environment overrides");
        figment = figment
            .merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into()))
            .merge(Serialized::defaults(&self.parameters));

        Ok(figment)
    }
}

/// Pick a figment provider by file extension
fn file_provider(path: &Path) -> Result<Figment> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("toml") => Ok(Figment::from(Toml::file(path))),
        Some("yaml") | Some("yml") => Ok(Figment::from(Yaml::file(path))),
        Some("json") => Ok(Figment::from(Json::file(path))),
        _ => Err(figment::Error::from(format!(
            "unsupported configuration file format: {}",
            path.display()
        ))
        .into()),
    }
}
