// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Engine Configuration
//!
//! This module provides configuration management for the embedded SQL engine.
//!
//! ## Configuration Structure
//!
//! The engine configuration includes:
//! - Format-on-save and re-indentation switches
//! - The position encoding negotiated with the editor
//! - User-defined extraction rules (`customRawSqlQuery`)
//!
//! SQL formatter options are kept separately in [`FormatterOptions`], read
//! from a `.sql-formatter.json` file in the project root.
//!
//! ## Example
//!
//! ```rust
//! use embedded_sql_ir::HostLanguage;
//! use embedded_sql_lsp::EngineConfig;
//! use serde_json::json;
//!
//! let config = EngineConfig::from_lsp_settings(&json!({
//!     "embeddedSql": {
//!         "formatOnSave": false,
//!         "customRawSqlQuery": {
//!             "language": "typescript",
//!             "configs": [{ "functionName": "sql", "sqlArgNo": 1, "isTemplateLiteral": true }]
//!         }
//!     }
//! }))
//! .unwrap();
//!
//! let rules = config.rule_set(HostLanguage::TypeScript).unwrap();
//! assert_eq!(rules.rules().len(), 2);
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use embedded_sql_ir::{
    ArgumentPosition, ExtractionRule, HostLanguage, IndexBase, PositionEncoding, RuleError,
    RuleSet,
};

/// Settings key holding the engine configuration
pub const SETTINGS_SECTION: &str = "embeddedSql";

/// File name of the SQL formatter options in a project root
pub const FORMATTER_CONFIG_FILE: &str = ".sql-formatter.json";

/// Re-indentation settings for formatted fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FormatSqlConfig {
    /// Re-indent formatted SQL relative to the anchor line
    pub indent: bool,

    /// Width of one indent level in spaces
    pub tab_size: u32,
}

impl Default for FormatSqlConfig {
    fn default() -> Self {
        Self {
            indent: false,
            tab_size: 2,
        }
    }
}

/// One user-defined call shape
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomQueryConfig {
    pub function_name: String,

    /// Argument carrying the SQL, counted from `argument_index_base`
    #[serde(default)]
    pub sql_arg_no: u32,

    /// Base of `sql_arg_no` (one-based when absent)
    #[serde(default)]
    pub argument_index_base: IndexBase,

    /// Match `` name`…` `` tagged templates
    #[serde(default)]
    pub is_template_literal: bool,

    /// Match `name!(…)` macro invocations
    #[serde(default)]
    pub is_macro: bool,
}

impl CustomQueryConfig {
    /// Convert to an extraction rule
    pub fn to_rule(&self) -> Result<ExtractionRule, ConfigError> {
        if self.is_template_literal && self.is_macro {
            return Err(ConfigError::ConflictingShape {
                function_name: self.function_name.clone(),
            });
        }

        let position = ArgumentPosition {
            index: self.sql_arg_no,
            base: self.argument_index_base,
        };

        let rule = if self.is_template_literal {
            ExtractionRule::tagged_template(&self.function_name)
        } else if self.is_macro {
            ExtractionRule::macro_argument(&self.function_name, position)
        } else {
            ExtractionRule::call_argument(&self.function_name, position)
        };

        Ok(rule)
    }
}

/// User-defined rules for one language
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomRawSqlQuery {
    /// Editor language id (`typescript`, `javascript`, `rust`, …)
    pub language: String,
    pub configs: Vec<CustomQueryConfig>,
}

impl CustomRawSqlQuery {
    /// Host language the rules are declared for
    pub fn host(&self) -> Result<HostLanguage, ConfigError> {
        HostLanguage::from_language_id(&self.language).ok_or_else(|| {
            ConfigError::UnknownLanguage {
                language: self.language.clone(),
            }
        })
    }

    /// Whether the rules apply to documents of `host`
    ///
    /// TypeScript rules apply to TSX documents and the other way round.
    pub fn applies_to(&self, host: HostLanguage) -> bool {
        match self.host() {
            Ok(declared) => declared == host || (declared.is_ecmascript() && host.is_ecmascript()),
            Err(_) => false,
        }
    }
}

/// Either a single value or a list of values
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Raw settings section as sent by the client
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSettings {
    format_on_save: Option<bool>,
    format_sql: Option<FormatSqlConfig>,
    position_encoding: Option<String>,
    custom_raw_sql_query: Option<OneOrMany<CustomRawSqlQuery>>,
}

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Format embedded SQL when a host document is saved
    pub format_on_save: bool,

    /// Re-indentation of formatted SQL
    pub format_sql: FormatSqlConfig,

    /// Unit `Position::character` is counted in
    pub position_encoding: PositionEncoding,

    /// User-defined rules, appended after the built-in rules
    pub custom_raw_sql_queries: Vec<CustomRawSqlQuery>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            format_on_save: true,
            format_sql: FormatSqlConfig::default(),
            position_encoding: PositionEncoding::default(),
            custom_raw_sql_queries: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse engine config from LSP client settings payload.
    ///
    /// Expected shape:
    /// {
    ///   "embeddedSql": {
    ///     "formatOnSave": true,
    ///     "formatSql": { "indent": false, "tabSize": 2 },
    ///     "positionEncoding": "utf-16",
    ///     "customRawSqlQuery": { "language": "...", "configs": [...] }
    ///   }
    /// }
    ///
    /// A missing section yields the defaults. Custom rules that are invalid
    /// for their language are dropped with a warning; the remaining settings
    /// still apply.
    pub fn from_lsp_settings(settings: &Value) -> Result<Self, ConfigError> {
        let Some(section) = settings.get(SETTINGS_SECTION) else {
            debug!("No '{}' section in client settings, using defaults", SETTINGS_SECTION);
            return Ok(Self::default());
        };

        let raw: RawSettings = serde_json::from_value(section.clone())
            .map_err(|source| ConfigError::InvalidSettings { source })?;

        let defaults = Self::default();
        let position_encoding = match raw.position_encoding {
            Some(name) => PositionEncoding::from_name(&name)
                .ok_or(ConfigError::UnknownPositionEncoding { name })?,
            None => defaults.position_encoding,
        };

        let config = Self {
            format_on_save: raw.format_on_save.unwrap_or(defaults.format_on_save),
            format_sql: raw.format_sql.unwrap_or(defaults.format_sql),
            position_encoding,
            custom_raw_sql_queries: Vec::new(),
        };
        let queries = raw.custom_raw_sql_query.map(Vec::from).unwrap_or_default();
        let config = config.with_valid_rules(queries);

        config.validate()?;
        Ok(config)
    }

    /// Add the custom rules of `queries` that validate, one rule at a time
    ///
    /// An entry naming an unknown language is dropped whole.
    fn with_valid_rules(mut self, queries: Vec<CustomRawSqlQuery>) -> Self {
        for query in queries {
            let host = match query.host() {
                Ok(host) => host,
                Err(e) => {
                    warn!("Ignoring custom SQL rules: {}", e);
                    continue;
                }
            };

            let index = self.custom_raw_sql_queries.len();
            self.custom_raw_sql_queries.push(CustomRawSqlQuery {
                language: query.language,
                configs: Vec::with_capacity(query.configs.len()),
            });

            for config in query.configs {
                let function_name = config.function_name.clone();
                self.custom_raw_sql_queries[index].configs.push(config);
                if let Err(e) = self.rule_set(host) {
                    warn!("Ignoring custom SQL rule '{}': {}", function_name, e);
                    self.custom_raw_sql_queries[index].configs.pop();
                }
            }
        }

        self
    }

    /// Validate the configuration
    ///
    /// Checks that:
    /// - Every custom rule names a known language
    /// - Every custom rule is valid for its language
    /// - Custom rules do not duplicate each other or a built-in rule
    pub fn validate(&self) -> Result<(), ConfigError> {
        for query in &self.custom_raw_sql_queries {
            self.rule_set(query.host()?)?;
        }

        if self.format_sql.tab_size == 0 {
            return Err(ConfigError::InvalidTabSize);
        }

        Ok(())
    }

    /// Built-in rules for `host` followed by the applicable custom rules
    pub fn rule_set(&self, host: HostLanguage) -> Result<RuleSet, ConfigError> {
        let mut custom = Vec::new();
        for query in self
            .custom_raw_sql_queries
            .iter()
            .filter(|query| query.applies_to(host))
        {
            for config in &query.configs {
                custom.push(config.to_rule()?);
            }
        }

        Ok(RuleSet::with_custom(host, custom)?)
    }
}

/// Keyword case applied by the SQL formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCase {
    #[default]
    Preserve,
    Upper,
    Lower,
}

/// Options passed through to the SQL formatter
///
/// Read from `.sql-formatter.json`; unknown keys are ignored so the file
/// can be shared with other formatters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatterOptions {
    /// Spaces per indent level inside formatted SQL
    pub tab_width: u8,

    /// Indent formatted SQL with tabs
    pub use_tabs: bool,

    pub keyword_case: KeywordCase,

    /// Blank lines between consecutive statements
    pub lines_between_queries: u8,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            tab_width: 2,
            use_tabs: false,
            keyword_case: KeywordCase::Preserve,
            lines_between_queries: 1,
        }
    }
}

impl FormatterOptions {
    /// Read options from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::InvalidFormatterConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Options for a project root, defaults when the file is absent or invalid
    pub fn load(project_root: &Path) -> Self {
        let path = project_root.join(FORMATTER_CONFIG_FILE);
        if !path.exists() {
            debug!("No {} in {}, using defaults", FORMATTER_CONFIG_FILE, project_root.display());
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(options) => {
                debug!("Loaded formatter options from {}", path.display());
                options
            }
            Err(e) => {
                warn!("{}; using default formatter options", e);
                Self::default()
            }
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Settings section does not match the expected shape
    #[error("Invalid settings: {source}")]
    InvalidSettings {
        #[source]
        source: serde_json::Error,
    },

    /// Unknown position encoding name
    #[error("Unknown position encoding '{name}'")]
    UnknownPositionEncoding { name: String },

    /// Custom rules declared for an unsupported language
    #[error("Unsupported language '{language}' in customRawSqlQuery")]
    UnknownLanguage { language: String },

    /// Rule that is both a tagged template and a macro
    #[error("'{function_name}' cannot be both a template literal and a macro")]
    ConflictingShape { function_name: String },

    /// Tab size of zero
    #[error("formatSql.tabSize must be greater than 0")]
    InvalidTabSize,

    /// Rule rejected by validation
    #[error("Invalid extraction rule: {0}")]
    InvalidRule(#[from] RuleError),

    /// Formatter options file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Formatter options file is not valid JSON for the expected shape
    #[error("Invalid formatter config {}: {source}", path.display())]
    InvalidFormatterConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
