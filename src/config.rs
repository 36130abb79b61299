//! Configuration management for deploy-manifest
//!
//! Settings are loaded from environment variables with defaults; command-line flags
//! override them in the CLI handlers.
//!
//! # Environment Variables
//!
//! - `DEPLOY_MANIFEST_LOG_LEVEL`: Logging level - default: "info"
//! - `DEPLOY_MANIFEST_LOG_JSON`: JSON log output (true|false) - default: "false"
//! - `DEPLOY_MANIFEST_INCLUDE_DEPENDENCIES`: Attach dependency reports - default: "false"
//! - `DEPLOY_MANIFEST_INCLUDE_PLUGINS`: Attach plugin reports - default: "false"
//! - `DEPLOY_MANIFEST_DEPENDENCY_SCOPES`: Comma-separated scopes listed in dependency
//!   reports - default: "compile,runtime"
//! - `DEPLOY_MANIFEST_SCAN_SOURCES`: Scan sources for the main class - default: "true"
//! - `DEPLOY_MANIFEST_INCLUDE_PROPERTIES`: Attach property reports - default: "false"
//! - `DEPLOY_MANIFEST_PROPERTY_EXCLUSIONS`: Comma-separated key patterns treated as
//!   sensitive - default: "password,secret,token,apikey,api-key,api_key,credentials,auth,key"
//! - `DEPLOY_MANIFEST_FILTER_SENSITIVE`: Mask sensitive properties and plugin
//!   configuration - default: "true"
//! - `DEPLOY_MANIFEST_MASK_SENSITIVE`: Mask sensitive properties instead of dropping
//!   them - default: "true"
//! - `DEPLOY_MANIFEST_INCLUDE_PLUGIN_CONFIGURATION`: Copy plugin configuration into
//!   plugin reports - default: "true"
//!
//! # Example
//!
//! ```no_run
//! use deploy_manifest::DescriptorConfig;
//!
//! let config = DescriptorConfig::default();
//! config.validate().expect("Invalid configuration");
//! let options = config.analyzer_options();
//! ```

use crate::analyzer::AnalyzerOptions;
use crate::reports::{
    PluginReportOptions, PropertyOptions, DEFAULT_PROPERTY_EXCLUSIONS, DEFAULT_SCOPES,
    KNOWN_SCOPES,
};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_JSON: bool = false;
const DEFAULT_INCLUDE_DEPENDENCIES: bool = false;
const DEFAULT_INCLUDE_PLUGINS: bool = false;
const DEFAULT_SCAN_SOURCES: bool = true;
const DEFAULT_INCLUDE_PROPERTIES: bool = false;
const DEFAULT_FILTER_SENSITIVE: bool = true;
const DEFAULT_MASK_SENSITIVE: bool = true;
const DEFAULT_INCLUDE_PLUGIN_CONFIGURATION: bool = true;

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Valid options: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid dependency scope: {0}. Valid options: compile, provided, runtime, test, system, import")]
    InvalidScope(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    pub log_json: bool,

    pub include_dependencies: bool,

    pub include_plugins: bool,

    /// Scopes listed in dependency reports
    pub dependency_scopes: Vec<String>,

    /// Allow framework detectors to scan source files for the main class
    pub scan_sources: bool,

    pub include_properties: bool,

    /// Key patterns marking a property as sensitive
    pub property_exclusions: Vec<String>,

    /// Mask sensitive properties and plugin configuration keys
    pub filter_sensitive: bool,

    /// Sensitive properties are masked when true, dropped when false
    pub mask_sensitive: bool,

    pub include_plugin_configuration: bool,
}

impl Default for DescriptorConfig {
    /// Loads `DEPLOY_MANIFEST_*` variables, falling back to defaults for anything
    /// missing or unparseable.
    fn default() -> Self {
        let log_level = env::var("DEPLOY_MANIFEST_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let dependency_scopes = env::var("DEPLOY_MANIFEST_DEPENDENCY_SCOPES")
            .ok()
            .map(|v| parse_list(&v))
            .filter(|scopes| !scopes.is_empty())
            .unwrap_or_else(default_scopes);

        let property_exclusions = env::var("DEPLOY_MANIFEST_PROPERTY_EXCLUSIONS")
            .ok()
            .map(|v| parse_list(&v))
            .filter(|patterns| !patterns.is_empty())
            .unwrap_or_else(default_exclusions);

        Self {
            log_level,
            log_json: env_flag("DEPLOY_MANIFEST_LOG_JSON", DEFAULT_LOG_JSON),
            include_dependencies: env_flag(
                "DEPLOY_MANIFEST_INCLUDE_DEPENDENCIES",
                DEFAULT_INCLUDE_DEPENDENCIES,
            ),
            include_plugins: env_flag("DEPLOY_MANIFEST_INCLUDE_PLUGINS", DEFAULT_INCLUDE_PLUGINS),
            dependency_scopes,
            scan_sources: env_flag("DEPLOY_MANIFEST_SCAN_SOURCES", DEFAULT_SCAN_SOURCES),
            include_properties: env_flag(
                "DEPLOY_MANIFEST_INCLUDE_PROPERTIES",
                DEFAULT_INCLUDE_PROPERTIES,
            ),
            property_exclusions,
            filter_sensitive: env_flag("DEPLOY_MANIFEST_FILTER_SENSITIVE", DEFAULT_FILTER_SENSITIVE),
            mask_sensitive: env_flag("DEPLOY_MANIFEST_MASK_SENSITIVE", DEFAULT_MASK_SENSITIVE),
            include_plugin_configuration: env_flag(
                "DEPLOY_MANIFEST_INCLUDE_PLUGIN_CONFIGURATION",
                DEFAULT_INCLUDE_PLUGIN_CONFIGURATION,
            ),
        }
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().to_lowercase().parse::<bool>().ok())
        .unwrap_or(default)
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
}

fn default_exclusions() -> Vec<String> {
    DEFAULT_PROPERTY_EXCLUSIONS.iter().map(|s| s.to_string()).collect()
}

/// Splits a comma-separated list into lowercase entries, dropping blanks.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl DescriptorConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown log level or dependency scope, or an empty
    /// scope list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        if self.dependency_scopes.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one dependency scope is required".to_string(),
            ));
        }
        if let Some(unknown) = self
            .dependency_scopes
            .iter()
            .find(|s| !KNOWN_SCOPES.contains(&s.as_str()))
        {
            return Err(ConfigError::InvalidScope(unknown.clone()));
        }

        if self.filter_sensitive && self.property_exclusions.iter().all(|p| p.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "At least one property exclusion pattern is required while filtering".to_string(),
            ));
        }

        Ok(())
    }

    pub fn analyzer_options(&self) -> AnalyzerOptions {
        AnalyzerOptions {
            include_dependencies: self.include_dependencies,
            include_plugins: self.include_plugins,
            include_properties: self.include_properties,
            dependency_scopes: self.dependency_scopes.clone(),
            plugins: PluginReportOptions {
                include_configuration: self.include_plugin_configuration,
                mask_sensitive: self.filter_sensitive,
            },
            properties: PropertyOptions {
                filter_sensitive: self.filter_sensitive,
                mask_values: self.mask_sensitive,
                exclusions: self.property_exclusions.clone(),
            },
            scan_sources: self.scan_sources,
        }
    }

    /// Flat view for JSON/YAML output of the `config` command.
    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();

        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert("log_json".to_string(), self.log_json.to_string());
        map.insert(
            "include_dependencies".to_string(),
            self.include_dependencies.to_string(),
        );
        map.insert("include_plugins".to_string(), self.include_plugins.to_string());
        map.insert(
            "dependency_scopes".to_string(),
            self.dependency_scopes.join(","),
        );
        map.insert("scan_sources".to_string(), self.scan_sources.to_string());
        map.insert(
            "include_properties".to_string(),
            self.include_properties.to_string(),
        );
        map.insert(
            "property_exclusions".to_string(),
            self.property_exclusions.join(","),
        );
        map.insert("filter_sensitive".to_string(), self.filter_sensitive.to_string());
        map.insert("mask_sensitive".to_string(), self.mask_sensitive.to_string());
        map.insert(
            "include_plugin_configuration".to_string(),
            self.include_plugin_configuration.to_string(),
        );

        map
    }
}

impl fmt::Display for DescriptorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "deploy-manifest Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Log JSON: {}", self.log_json)?;
        writeln!(f, "  Include Dependencies: {}", self.include_dependencies)?;
        writeln!(f, "  Include Plugins: {}", self.include_plugins)?;
        writeln!(f, "  Dependency Scopes: {}", self.dependency_scopes.join(", "))?;
        writeln!(f, "  Scan Sources: {}", self.scan_sources)?;
        writeln!(f, "  Include Properties: {}", self.include_properties)?;
        writeln!(f, "  Property Exclusions: {}", self.property_exclusions.join(", "))?;
        writeln!(f, "  Filter Sensitive: {}", self.filter_sensitive)?;
        writeln!(f, "  Mask Sensitive: {}", self.mask_sensitive)?;
        writeln!(f, "  Include Plugin Configuration: {}", self.include_plugin_configuration)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "DEPLOY_MANIFEST_LOG_LEVEL",
        "DEPLOY_MANIFEST_LOG_JSON",
        "DEPLOY_MANIFEST_INCLUDE_DEPENDENCIES",
        "DEPLOY_MANIFEST_INCLUDE_PLUGINS",
        "DEPLOY_MANIFEST_DEPENDENCY_SCOPES",
        "DEPLOY_MANIFEST_SCAN_SOURCES",
        "DEPLOY_MANIFEST_INCLUDE_PROPERTIES",
        "DEPLOY_MANIFEST_PROPERTY_EXCLUSIONS",
        "DEPLOY_MANIFEST_FILTER_SENSITIVE",
        "DEPLOY_MANIFEST_MASK_SENSITIVE",
        "DEPLOY_MANIFEST_INCLUDE_PLUGIN_CONFIGURATION",
    ];

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn clean_env() -> Vec<EnvGuard> {
        VARS.iter().map(|key| EnvGuard::unset(key)).collect()
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = clean_env();

        let config = DescriptorConfig::default();

        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(!config.log_json);
        assert!(!config.include_dependencies);
        assert!(!config.include_plugins);
        assert_eq!(config.dependency_scopes, vec!["compile", "runtime"]);
        assert!(config.scan_sources);
        assert!(!config.include_properties);
        assert_eq!(config.property_exclusions, default_exclusions());
        assert!(config.filter_sensitive);
        assert!(config.mask_sensitive);
        assert!(config.include_plugin_configuration);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _clean = clean_env();
        let _guards = vec![
            EnvGuard::set("DEPLOY_MANIFEST_LOG_LEVEL", "DEBUG"),
            EnvGuard::set("DEPLOY_MANIFEST_INCLUDE_DEPENDENCIES", "true"),
            EnvGuard::set("DEPLOY_MANIFEST_INCLUDE_PLUGINS", "TRUE"),
            EnvGuard::set("DEPLOY_MANIFEST_DEPENDENCY_SCOPES", "compile, test ,"),
            EnvGuard::set("DEPLOY_MANIFEST_SCAN_SOURCES", "false"),
            EnvGuard::set("DEPLOY_MANIFEST_LOG_JSON", "not-a-bool"),
        ];

        let config = DescriptorConfig::default();

        assert_eq!(config.log_level, "debug");
        assert!(config.include_dependencies);
        assert!(config.include_plugins);
        assert_eq!(config.dependency_scopes, vec!["compile", "test"]);
        assert!(!config.scan_sources);
        assert!(!config.log_json);
    }

    #[test]
    #[serial]
    fn test_blank_scope_list_uses_defaults() {
        let _clean = clean_env();
        let _guard = EnvGuard::set("DEPLOY_MANIFEST_DEPENDENCY_SCOPES", " , ");

        assert_eq!(DescriptorConfig::default().dependency_scopes, default_scopes());
    }

    #[test]
    #[serial]
    fn test_validation_rejects_unknown_values() {
        let _clean = clean_env();

        let mut config = DescriptorConfig::default();
        config.log_level = "verbose".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel("verbose".to_string()))
        );

        let mut config = DescriptorConfig::default();
        config.dependency_scopes = vec!["compile".to_string(), "bundled".to_string()];
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidScope("bundled".to_string()))
        );

        config.dependency_scopes.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    #[serial]
    fn test_config_display() {
        let _clean = clean_env();
        let config = DescriptorConfig::default();

        let display = format!("{}", config);
        assert!(display.contains("deploy-manifest Configuration:"));
        assert!(display.contains("Dependency Scopes: compile, runtime"));

        let map = config.to_display_map();
        assert_eq!(map.get("dependency_scopes").map(String::as_str), Some("compile,runtime"));
        assert_eq!(map.len(), 11);
        assert_eq!(
            map.get("property_exclusions").map(String::as_str),
            Some("password,secret,token,apikey,api-key,api_key,credentials,auth,key")
        );
    }

    #[test]
    #[serial]
    fn test_analyzer_options_follow_config() {
        let _clean = clean_env();
        let mut config = DescriptorConfig::default();
        config.include_plugins = true;
        config.scan_sources = false;

        let options = config.analyzer_options();
        assert!(options.include_plugins);
        assert!(!options.include_dependencies);
        assert!(!options.scan_sources);
    }

    #[test]
    #[serial]
    fn test_property_settings_from_environment() {
        let _clean = clean_env();
        let _guards = vec![
            EnvGuard::set("DEPLOY_MANIFEST_INCLUDE_PROPERTIES", "true"),
            EnvGuard::set("DEPLOY_MANIFEST_PROPERTY_EXCLUSIONS", "Passwd, vault ,"),
            EnvGuard::set("DEPLOY_MANIFEST_MASK_SENSITIVE", "false"),
            EnvGuard::set("DEPLOY_MANIFEST_INCLUDE_PLUGIN_CONFIGURATION", "false"),
        ];

        let config = DescriptorConfig::default();
        assert!(config.include_properties);
        assert_eq!(config.property_exclusions, vec!["passwd", "vault"]);

        let options = config.analyzer_options();
        assert!(options.include_properties);
        assert!(options.properties.filter_sensitive);
        assert!(!options.properties.mask_values);
        assert_eq!(options.properties.exclusions, vec!["passwd", "vault"]);
        assert!(!options.plugins.include_configuration);
        assert!(options.plugins.mask_sensitive);
    }

    #[test]
    #[serial]
    fn test_blank_exclusions_rejected_while_filtering() {
        let _clean = clean_env();
        let mut config = DescriptorConfig::default();
        config.property_exclusions = vec![" ".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));

        config.filter_sensitive = false;
        assert!(config.validate().is_ok());
        assert!(!config.analyzer_options().plugins.mask_sensitive);
    }
}
