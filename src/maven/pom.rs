//! `pom.xml` reader
//!
//! Produces a [`BuildModel`] from a single POM document. Property references (`${...}`)
//! are resolved against the module's own properties, properties inherited from the
//! project root, and the `project.*` coordinates. Plugins and dependencies are never
//! inherited from the parent.

use super::config::ConfigValue;
use super::model::{
    BuildModel, Dependency, Packaging, ParentRef, Plugin, PluginExecution, Profile,
    DEFAULT_PLUGIN_GROUP,
};
use regex::Regex;
use roxmltree::{Document, Node};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

const MAX_INTERPOLATION_PASSES: usize = 8;

#[derive(Debug, Error)]
pub enum PomError {
    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("root element is <{0}>, expected <project>")]
    NotAProject(String),

    #[error("missing <artifactId>")]
    MissingArtifactId,
}

/// Parses a POM with no inherited properties.
pub fn parse_pom(content: &str) -> Result<BuildModel, PomError> {
    parse_pom_with_properties(content, &BTreeMap::new())
}

/// Parses a POM, using `inherited` as the lowest-precedence property source.
pub fn parse_pom_with_properties(
    content: &str,
    inherited: &BTreeMap<String, String>,
) -> Result<BuildModel, PomError> {
    let doc = Document::parse(content)?;
    let project = doc.root_element();
    if project.tag_name().name() != "project" {
        return Err(PomError::NotAProject(project.tag_name().name().to_string()));
    }

    let parent = child(project, "parent").map(|p| ParentRef {
        group_id: child_text(p, "groupId"),
        artifact_id: child_text(p, "artifactId"),
        version: child_text(p, "version"),
    });

    let mut properties = inherited.clone();
    if let Some(props) = child(project, "properties") {
        for prop in props.children().filter(|c| c.is_element()) {
            properties.insert(prop.tag_name().name().to_string(), node_text(prop));
        }
    }

    let raw_group = child_text(project, "groupId")
        .or_else(|| parent.as_ref().and_then(|p| p.group_id.clone()));
    let raw_version = child_text(project, "version")
        .or_else(|| parent.as_ref().and_then(|p| p.version.clone()));
    let raw_artifact = child_text(project, "artifactId").ok_or(PomError::MissingArtifactId)?;

    let mut lookup = properties.clone();
    for prefix in ["project", "pom"] {
        if let Some(group) = &raw_group {
            lookup.insert(format!("{}.groupId", prefix), group.clone());
        }
        if let Some(version) = &raw_version {
            lookup.insert(format!("{}.version", prefix), version.clone());
        }
        lookup.insert(format!("{}.artifactId", prefix), raw_artifact.clone());
    }
    if let Some(version) = parent.as_ref().and_then(|p| p.version.clone()) {
        lookup.insert("project.parent.version".to_string(), version);
    }
    let interpolator = Interpolator { lookup };
    let resolve = |s: &str| interpolator.resolve(s);

    let mut model = BuildModel::new(
        &resolve(&raw_artifact),
        Packaging::parse(child_text(project, "packaging").map(|p| resolve(&p)).as_deref()),
    );
    model.group_id = child_text(project, "groupId").map(|g| resolve(&g));
    model.version = child_text(project, "version").map(|v| resolve(&v));
    model.name = child_text(project, "name").map(|n| resolve(&n));
    model.description = child_text(project, "description").map(|d| resolve(&d));
    model.parent = parent;
    model.properties = properties
        .into_iter()
        .map(|(k, v)| {
            let resolved = resolve(&v);
            (k, resolved)
        })
        .collect();

    if let Some(deps) = child(project, "dependencies") {
        model.dependencies = elements(deps, "dependency")
            .filter_map(|d| parse_dependency(d, &resolve))
            .collect();
    }

    if let Some(build) = child(project, "build") {
        model.final_name = child_text(build, "finalName").map(|n| resolve(&n));
        if let Some(plugins) = child(build, "plugins") {
            model.plugins = parse_plugins(plugins, &resolve);
        }
        if let Some(plugins) = child(build, "pluginManagement").and_then(|pm| child(pm, "plugins")) {
            model.managed_plugins = parse_plugins(plugins, &resolve);
        }
    }

    if let Some(profiles) = child(project, "profiles") {
        model.profiles = elements(profiles, "profile")
            .filter_map(|p| {
                let id = child_text(p, "id")?;
                let active_by_default = child(p, "activation")
                    .and_then(|a| child_text(a, "activeByDefault"))
                    .map(|v| v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false);
                Some(Profile { id: resolve(&id), active_by_default })
            })
            .collect();
    }

    if let Some(modules) = child(project, "modules") {
        model.modules = elements(modules, "module")
            .map(node_text)
            .filter(|m| !m.is_empty())
            .map(|m| resolve(&m))
            .collect();
    }

    if let Some(dm) = child(project, "distributionManagement") {
        model.distribution_repository = child(dm, "repository")
            .and_then(|r| child_text(r, "url"))
            .map(|u| resolve(&u));
        model.distribution_snapshot_repository = child(dm, "snapshotRepository")
            .and_then(|r| child_text(r, "url"))
            .map(|u| resolve(&u));
    }

    Ok(model)
}

struct Interpolator {
    lookup: BTreeMap<String, String>,
}

impl Interpolator {
    /// Replaces `${key}` references. Unknown keys are left untouched. Nested references
    /// are resolved over a bounded number of passes so cycles terminate.
    fn resolve(&self, value: &str) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("Invalid placeholder regex"));

        let mut current = value.to_string();
        for _ in 0..MAX_INTERPOLATION_PASSES {
            if !current.contains("${") {
                break;
            }
            let next = re
                .replace_all(&current, |caps: &regex::Captures| {
                    self.lookup
                        .get(&caps[1])
                        .cloned()
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .to_string();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

fn parse_dependency(node: Node<'_, '_>, resolve: &dyn Fn(&str) -> String) -> Option<Dependency> {
    let group_id = child_text(node, "groupId")?;
    let artifact_id = child_text(node, "artifactId")?;
    Some(Dependency {
        group_id: resolve(&group_id),
        artifact_id: resolve(&artifact_id),
        version: child_text(node, "version").map(|v| resolve(&v)),
        scope: child_text(node, "scope").map(|s| resolve(&s)),
        optional: child_text(node, "optional")
            .map(|o| resolve(&o).eq_ignore_ascii_case("true"))
            .unwrap_or(false),
    })
}

fn parse_plugins(plugins: Node<'_, '_>, resolve: &dyn Fn(&str) -> String) -> Vec<Plugin> {
    elements(plugins, "plugin")
        .filter_map(|node| {
            let artifact_id = child_text(node, "artifactId")?;
            let group_id = child_text(node, "groupId")
                .map(|g| resolve(&g))
                .unwrap_or_else(|| DEFAULT_PLUGIN_GROUP.to_string());

            let executions = child(node, "executions")
                .map(|execs| {
                    elements(execs, "execution")
                        .map(|exec| PluginExecution {
                            id: child_text(exec, "id"),
                            phase: child_text(exec, "phase").map(|p| resolve(&p)),
                            goals: child(exec, "goals")
                                .map(|goals| {
                                    elements(goals, "goal")
                                        .map(node_text)
                                        .filter(|g| !g.is_empty())
                                        .map(|g| resolve(&g))
                                        .collect()
                                })
                                .unwrap_or_default(),
                            configuration: child(exec, "configuration")
                                .map(|c| ConfigValue::from_element(c, resolve)),
                        })
                        .collect()
                })
                .unwrap_or_default();

            Some(Plugin {
                group_id,
                artifact_id: resolve(&artifact_id),
                version: child_text(node, "version").map(|v| resolve(&v)),
                executions,
                configuration: child(node, "configuration")
                    .map(|c| ConfigValue::from_element(c, resolve)),
            })
        })
        .collect()
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |c| c.is_element() && c.tag_name().name() == name)
}

fn node_text(node: Node<'_, '_>) -> String {
    node.text().map(|t| t.trim().to_string()).unwrap_or_default()
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name)
        .map(node_text)
        .filter(|t| !t.is_empty())
}
