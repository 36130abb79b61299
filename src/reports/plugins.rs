use super::properties::{is_sensitive, MASK};
use crate::maven::{BuildModel, ConfigValue, Plugin};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Configuration keys masked in plugin reports.
pub const SENSITIVE_CONFIG_KEYS: &[&str] = &[
    "password",
    "pwd",
    "secret",
    "token",
    "apikey",
    "api-key",
    "api_key",
    "key",
    "credentials",
    "auth",
    "username",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginReportOptions {
    /// Copy each plugin's `<configuration>` into the report
    pub include_configuration: bool,
    pub mask_sensitive: bool,
}

impl Default for PluginReportOptions {
    fn default() -> Self {
        Self {
            include_configuration: true,
            mask_sensitive: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDetail {
    pub group_id: String,
    pub artifact_id: String,
    /// Declared version, else the version pinned in pluginManagement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// First phase bound by an execution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub goals: Vec<String>,
    pub has_configuration: bool,
    /// Plugin-level `<configuration>` as JSON. Attributes keep their `@` prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedPluginEntry {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub used_in_build: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSummary {
    pub total: usize,
    pub with_configuration: usize,
    pub from_management: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginReport {
    pub summary: PluginSummary,
    pub list: Vec<PluginDetail>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub management: Vec<ManagedPluginEntry>,
}

impl PluginReport {
    pub fn collect(model: &BuildModel, options: &PluginReportOptions) -> Self {
        let list: Vec<PluginDetail> = model
            .plugins
            .iter()
            .map(|plugin| detail(plugin, model, options))
            .collect();

        let management: Vec<ManagedPluginEntry> = model
            .managed_plugins
            .iter()
            .map(|managed| ManagedPluginEntry {
                group_id: managed.group_id.clone(),
                artifact_id: managed.artifact_id.clone(),
                version: managed.version.clone(),
                used_in_build: model
                    .plugins
                    .iter()
                    .any(|p| p.is(&managed.group_id, &managed.artifact_id)),
            })
            .collect();

        Self {
            summary: PluginSummary {
                total: list.len(),
                with_configuration: list.iter().filter(|d| d.has_configuration).count(),
                from_management: management.len(),
            },
            list,
            management,
        }
    }
}

fn detail(plugin: &Plugin, model: &BuildModel, options: &PluginReportOptions) -> PluginDetail {
    let version = plugin.version.clone().or_else(|| {
        model
            .managed_plugins
            .iter()
            .find(|m| m.is(&plugin.group_id, &plugin.artifact_id))
            .and_then(|m| m.version.clone())
    });

    let mut goals: Vec<String> = Vec::new();
    for goal in plugin.executions.iter().flat_map(|e| e.goals.iter()) {
        if !goals.contains(goal) {
            goals.push(goal.clone());
        }
    }

    PluginDetail {
        group_id: plugin.group_id.clone(),
        artifact_id: plugin.artifact_id.clone(),
        version,
        phase: plugin.executions.iter().find_map(|e| e.phase.clone()),
        goals,
        has_configuration: plugin.configurations().next().is_some(),
        configuration: plugin
            .configuration
            .as_ref()
            .filter(|_| options.include_configuration)
            .map(|cfg| config_to_json(cfg, options.mask_sensitive)),
    }
}

fn config_to_json(value: &ConfigValue, mask: bool) -> Value {
    match value {
        ConfigValue::Text(text) => Value::String(text.clone()),
        ConfigValue::List(items) => Value::Array(items.iter().map(|v| config_to_json(v, mask)).collect()),
        ConfigValue::Map(entries) => {
            let mut object = Map::new();
            for (key, value) in entries {
                let value = if mask && is_sensitive(key, SENSITIVE_CONFIG_KEYS) {
                    Value::String(MASK.to_string())
                } else {
                    config_to_json(value, mask)
                };
                object.insert(key.clone(), value);
            }
            Value::Object(object)
        }
    }
}
