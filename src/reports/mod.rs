//! Dependency, plugin and property summaries of a module
//!
//! Each report is a plain enumeration over the build model; they are attached to a
//! module only when requested. Sensitive keys are masked by case-insensitive substring
//! match.

pub mod dependencies;
pub mod plugins;
pub mod properties;

pub use dependencies::{DependencyReport, DEFAULT_SCOPES, KNOWN_SCOPES};
pub use plugins::{
    ManagedPluginEntry, PluginDetail, PluginReport, PluginReportOptions, PluginSummary,
    SENSITIVE_CONFIG_KEYS,
};
pub use properties::{
    is_sensitive, PropertyOptions, PropertyReport, DEFAULT_PROPERTY_EXCLUSIONS, MASK,
};
