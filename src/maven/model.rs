//! Build model of a single Maven module and the query surface detectors use on it.

use super::config::ConfigValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

/// Maven packaging type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Packaging {
    Jar,
    War,
    Ear,
    Pom,
    MavenPlugin,
    Ejb,
    Rar,
}

impl Packaging {
    /// Parses a `<packaging>` value. Missing or unknown values mean `jar`, as Maven does.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("war") => Packaging::War,
            Some("ear") => Packaging::Ear,
            Some("pom") => Packaging::Pom,
            Some("maven-plugin") => Packaging::MavenPlugin,
            Some("ejb") => Packaging::Ejb,
            Some("rar") => Packaging::Rar,
            _ => Packaging::Jar,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Packaging::Jar => "jar",
            Packaging::War => "war",
            Packaging::Ear => "ear",
            Packaging::Pom => "pom",
            Packaging::MavenPlugin => "maven-plugin",
            Packaging::Ejb => "ejb",
            Packaging::Rar => "rar",
        }
    }

    /// File extension of the artifact deployed to a repository.
    pub fn extension(&self) -> &'static str {
        match self {
            Packaging::Jar | Packaging::Ejb | Packaging::MavenPlugin => "jar",
            Packaging::War => "war",
            Packaging::Ear => "ear",
            Packaging::Pom => "pom",
            Packaging::Rar => "rar",
        }
    }

    pub fn is_deployable(&self) -> bool {
        !matches!(self, Packaging::Pom | Packaging::MavenPlugin)
    }
}

impl fmt::Display for Packaging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

impl Dependency {
    pub fn new(group_id: &str, artifact_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: None,
            scope: None,
            optional: false,
        }
    }

    /// Effective scope; Maven defaults to `compile`.
    pub fn scope(&self) -> &str {
        self.scope.as_deref().unwrap_or("compile")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginExecution {
    pub id: Option<String>,
    pub phase: Option<String>,
    pub goals: Vec<String>,
    pub configuration: Option<ConfigValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub executions: Vec<PluginExecution>,
    pub configuration: Option<ConfigValue>,
}

impl Plugin {
    pub fn new(group_id: &str, artifact_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: None,
            executions: Vec::new(),
            configuration: None,
        }
    }

    pub fn with_goals(mut self, goals: &[&str]) -> Self {
        self.executions.push(PluginExecution {
            goals: goals.iter().map(|g| g.to_string()).collect(),
            ..Default::default()
        });
        self
    }

    pub fn with_configuration(mut self, configuration: ConfigValue) -> Self {
        self.configuration = Some(configuration);
        self
    }

    pub fn is(&self, group_id: &str, artifact_id: &str) -> bool {
        self.group_id == group_id && self.artifact_id == artifact_id
    }

    /// True when an execution explicitly lists `goal`.
    pub fn has_goal(&self, goal: &str) -> bool {
        self.executions
            .iter()
            .any(|e| e.goals.iter().any(|g| g == goal))
    }

    /// True when `goal` runs during the build: listed explicitly, or the plugin declares
    /// no executions and relies on its default lifecycle bindings.
    pub fn runs_goal(&self, goal: &str) -> bool {
        self.executions.is_empty() || self.has_goal(goal)
    }

    /// Plugin-level configuration first, then each execution's, in declaration order.
    pub fn configurations(&self) -> impl Iterator<Item = &ConfigValue> {
        self.configuration
            .iter()
            .chain(self.executions.iter().filter_map(|e| e.configuration.as_ref()))
    }

    /// First non-empty text found at `path` across all configurations.
    pub fn config_text(&self, path: &[&str]) -> Option<&str> {
        self.configurations().find_map(|cfg| cfg.text_at(path))
    }

    /// Repeated values at `path` from the first configuration that declares any.
    pub fn config_texts(&self, path: &[&str]) -> Vec<String> {
        self.configurations()
            .map(|cfg| cfg.texts_at(path))
            .find(|values| !values.is_empty())
            .unwrap_or_default()
    }

    /// First configuration node found at `path` across all configurations.
    pub fn config_node(&self, path: &[&str]) -> Option<&ConfigValue> {
        self.configurations().find_map(|cfg| cfg.get(path))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub active_by_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
}

/// Effective build model of one module, as handed over by the host build system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildModel {
    pub group_id: Option<String>,
    pub artifact_id: String,
    pub version: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub packaging: Packaging,
    pub parent: Option<ParentRef>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<Dependency>,
    pub plugins: Vec<Plugin>,
    pub managed_plugins: Vec<Plugin>,
    pub profiles: Vec<Profile>,
    pub modules: Vec<String>,
    pub final_name: Option<String>,
    pub distribution_repository: Option<String>,
    pub distribution_snapshot_repository: Option<String>,
}

impl BuildModel {
    pub fn new(artifact_id: &str, packaging: Packaging) -> Self {
        Self {
            group_id: None,
            artifact_id: artifact_id.to_string(),
            version: None,
            name: None,
            description: None,
            packaging,
            parent: None,
            properties: BTreeMap::new(),
            dependencies: Vec::new(),
            plugins: Vec::new(),
            managed_plugins: Vec::new(),
            profiles: Vec::new(),
            modules: Vec::new(),
            final_name: None,
            distribution_repository: None,
            distribution_snapshot_repository: None,
        }
    }

    pub fn with_coordinates(mut self, group_id: &str, version: &str) -> Self {
        self.group_id = Some(group_id.to_string());
        self.version = Some(version.to_string());
        self
    }

    pub fn with_plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    /// groupId, inherited from `<parent>` when not declared.
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.group_id.as_deref()))
    }

    /// version, inherited from `<parent>` when not declared.
    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.version.as_deref()))
    }

    /// Build plugins followed by the module's own pluginManagement entries.
    pub fn all_plugins(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.iter().chain(self.managed_plugins.iter())
    }

    pub fn find_plugin(&self, group_id: &str, artifact_id: &str) -> Option<&Plugin> {
        self.all_plugins().find(|p| p.is(group_id, artifact_id))
    }

    pub fn has_plugin(&self, group_id: &str, artifact_id: &str) -> bool {
        self.find_plugin(group_id, artifact_id).is_some()
    }

    /// Plugin with a goal explicitly configured on one of its executions.
    pub fn plugin_with_goal(&self, group_id: &str, artifact_id: &str, goal: &str) -> Option<&Plugin> {
        self.find_plugin(group_id, artifact_id)
            .filter(|p| p.has_goal(goal))
    }

    pub fn has_dependency_group(&self, group_id: &str) -> bool {
        self.dependencies.iter().any(|d| d.group_id == group_id)
    }

    pub fn find_dependency(&self, group_id: &str, artifact_id: &str) -> Option<&Dependency> {
        self.dependencies
            .iter()
            .find(|d| d.group_id == group_id && d.artifact_id == artifact_id)
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn has_profile(&self, id: &str) -> bool {
        self.profiles.iter().any(|p| p.id == id)
    }

    /// `target/<artifactId>-<version>` or `target/<finalName>` when one is configured.
    pub fn artifact_base_name(&self) -> String {
        match &self.final_name {
            Some(name) => name.clone(),
            None => match self.effective_version() {
                Some(version) => format!("{}-{}", self.artifact_id, version),
                None => self.artifact_id.clone(),
            },
        }
    }
}
