use crate::maven::BuildModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Replacement value for sensitive entries.
pub const MASK: &str = "***MASKED***";

pub const DEFAULT_PROPERTY_EXCLUSIONS: &[&str] = &[
    "password",
    "secret",
    "token",
    "apikey",
    "api-key",
    "api_key",
    "credentials",
    "auth",
    "key",
];

/// Case-insensitive substring match of `key` against any pattern.
pub fn is_sensitive<S: AsRef<str>>(key: &str, patterns: &[S]) -> bool {
    let key = key.to_lowercase();
    patterns
        .iter()
        .map(|p| p.as_ref().trim().to_lowercase())
        .any(|p| !p.is_empty() && key.contains(&p))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyOptions {
    /// Apply `exclusions` at all
    pub filter_sensitive: bool,
    /// Mask sensitive values; when false they are dropped from the report
    pub mask_values: bool,
    pub exclusions: Vec<String>,
}

impl Default for PropertyOptions {
    fn default() -> Self {
        Self {
            filter_sensitive: true,
            mask_values: true,
            exclusions: DEFAULT_PROPERTY_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The module's effective `<properties>`, with sensitive keys masked or dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyReport {
    /// Declared properties before filtering
    pub total: usize,
    /// Entries whose key matched an exclusion pattern
    pub sensitive: usize,
    pub properties: BTreeMap<String, String>,
}

impl PropertyReport {
    pub fn collect(model: &BuildModel, options: &PropertyOptions) -> Self {
        let mut properties = BTreeMap::new();
        let mut sensitive = 0;

        for (key, value) in &model.properties {
            if options.filter_sensitive && is_sensitive(key, &options.exclusions) {
                sensitive += 1;
                if options.mask_values {
                    properties.insert(key.clone(), MASK.to_string());
                }
                continue;
            }
            properties.insert(key.clone(), value.clone());
        }

        Self {
            total: model.properties.len(),
            sensitive,
            properties,
        }
    }
}
