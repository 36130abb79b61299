use crate::maven::{BuildModel, Dependency};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const KNOWN_SCOPES: &[&str] = &["compile", "provided", "runtime", "test", "system", "import"];

pub const DEFAULT_SCOPES: &[&str] = &["compile", "runtime"];

/// Declared dependencies of a module, counted per scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyReport {
    /// All declared dependencies, regardless of the scope filter
    pub total: usize,
    pub by_scope: BTreeMap<String, usize>,
    pub optional: usize,
    /// Dependencies whose scope passed the filter, in declaration order
    pub dependencies: Vec<Dependency>,
}

impl DependencyReport {
    /// Builds the report; `scopes` selects which dependencies are listed. An empty
    /// filter lists everything.
    pub fn collect(model: &BuildModel, scopes: &[String]) -> Self {
        let mut by_scope: BTreeMap<String, usize> = BTreeMap::new();
        for dependency in &model.dependencies {
            *by_scope.entry(dependency.scope().to_string()).or_default() += 1;
        }

        let dependencies = model
            .dependencies
            .iter()
            .filter(|d| scopes.is_empty() || scopes.iter().any(|s| s == d.scope()))
            .cloned()
            .collect();

        Self {
            total: model.dependencies.len(),
            by_scope,
            optional: model.dependencies.iter().filter(|d| d.optional).count(),
            dependencies,
        }
    }
}
