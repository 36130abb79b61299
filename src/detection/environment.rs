//! Per-profile environment settings read from Spring Boot configuration files
//!
//! The common `application.{yml,yaml,properties}` files are deep-merged with the
//! profile's own `application-<profile>.*` files. YAML documents activated through
//! `spring.config.activate.on-profile` (or the older `spring.profiles`) apply only to
//! that profile. Keys may be nested or dotted; both forms resolve the same way.

use super::profiles::RESOURCES_DIR;
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::{debug, warn};

pub const DEFAULT_ACTUATOR_BASE_PATH: &str = "/actuator";

const CONFIG_EXTENSIONS: &[&str] = &["yml", "yaml", "properties"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    pub profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_path: Option<String>,
    pub actuator_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actuator_base_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actuator_health_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actuator_info_path: Option<String>,
}

/// Builds one [`EnvironmentConfig`] per profile. Without a resources directory there is
/// nothing to read and the result is empty.
pub fn detect_environments(
    fs: &dyn FileSystem,
    module_root: &Path,
    profiles: &[String],
    actuator_enabled: bool,
) -> Vec<EnvironmentConfig> {
    let resources = module_root.join(RESOURCES_DIR);
    if profiles.is_empty() || !fs.is_dir(&resources) {
        return Vec::new();
    }

    let mut common = Value::Mapping(Mapping::new());
    let mut activated: Vec<(String, Value)> = Vec::new();
    for doc in read_config_documents(fs, &resources, "application") {
        match activation_profile(&doc) {
            Some(profile) => activated.push((profile, doc)),
            None => deep_merge(&mut common, doc),
        }
    }

    profiles
        .iter()
        .map(|profile| {
            let mut config = common.clone();
            for (_, doc) in activated.iter().filter(|(p, _)| p == profile) {
                deep_merge(&mut config, doc.clone());
            }
            for doc in read_config_documents(fs, &resources, &format!("application-{}", profile)) {
                deep_merge(&mut config, doc);
            }
            build_environment(profile, &config, actuator_enabled)
        })
        .collect()
}

fn build_environment(profile: &str, config: &Value, actuator_enabled: bool) -> EnvironmentConfig {
    let server_port = lookup_text(config, "server.port").and_then(|port| match port.parse::<u16>() {
        Ok(port) => Some(port),
        Err(_) => {
            warn!("Invalid server port value '{}' in profile {}", port, profile);
            None
        }
    });

    let context_path = lookup_text(config, "server.servlet.context-path")
        .or_else(|| lookup_text(config, "spring.webflux.base-path"));

    let actuator_base_path = actuator_enabled.then(|| {
        lookup_text(config, "management.endpoints.web.base-path")
            .unwrap_or_else(|| DEFAULT_ACTUATOR_BASE_PATH.to_string())
    });

    EnvironmentConfig {
        profile: profile.to_string(),
        server_port,
        context_path,
        actuator_enabled,
        actuator_health_path: actuator_base_path.as_ref().map(|base| format!("{}/health", base)),
        actuator_info_path: actuator_base_path.as_ref().map(|base| format!("{}/info", base)),
        actuator_base_path,
    }
}

/// Reads `<stem>.yml`, `<stem>.yaml` and `<stem>.properties`, in that order.
/// Unreadable or malformed files are logged and skipped.
fn read_config_documents(fs: &dyn FileSystem, resources: &Path, stem: &str) -> Vec<Value> {
    let mut documents = Vec::new();
    for ext in CONFIG_EXTENSIONS {
        let path = resources.join(format!("{}.{}", stem, ext));
        if !fs.is_file(&path) {
            continue;
        }
        let content = match fs.read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {:#}", path.display(), e);
                continue;
            }
        };
        debug!("Reading configuration from {}", path.display());
        if *ext == "properties" {
            documents.push(properties_to_tree(parse_properties(&content)));
        } else {
            match parse_yaml_documents(&content) {
                Ok(docs) => documents.extend(docs),
                Err(e) => warn!("Failed to parse {}: {}", path.display(), e),
            }
        }
    }
    documents
}

fn parse_yaml_documents(content: &str) -> Result<Vec<Value>, serde_yaml::Error> {
    let mut docs = Vec::new();
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(document)?;
        if value.is_mapping() {
            docs.push(value);
        }
    }
    Ok(docs)
}

fn activation_profile(doc: &Value) -> Option<String> {
    lookup_text(doc, "spring.config.activate.on-profile").or_else(|| lookup_text(doc, "spring.profiles"))
}

/// Java properties format: `key=value`, `key: value` or `key value`, `#`/`!` comments,
/// trailing backslash continues a line.
pub fn parse_properties(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut pending = String::new();

    for raw in content.lines() {
        let line = raw.trim_start();
        if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }
        if let Some(stripped) = line.strip_suffix('\\') {
            pending.push_str(stripped);
            continue;
        }
        pending.push_str(line);
        let logical = std::mem::take(&mut pending);

        let split = logical.find(|c: char| c == '=' || c == ':' || c.is_whitespace());
        let (key, value) = match split {
            Some(idx) => {
                let rest = logical[idx..].trim_start();
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .unwrap_or(rest);
                (logical[..idx].trim(), rest.trim())
            }
            None => (logical.trim(), ""),
        };
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Turns dotted keys into a nested mapping so properties merge like YAML.
fn properties_to_tree(pairs: Vec<(String, String)>) -> Value {
    let mut root = Value::Mapping(Mapping::new());
    for (key, value) in pairs {
        let mut nested = Value::String(value);
        for segment in key.rsplit('.') {
            let mut map = Mapping::new();
            map.insert(Value::String(segment.to_string()), nested);
            nested = Value::Mapping(map);
        }
        deep_merge(&mut root, nested);
    }
    root
}

/// Merges `source` into `target`. Mappings merge key by key; anything else is replaced.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Mapping(target_map), Value::Mapping(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(&key) {
                    Some(existing) if existing.is_mapping() && value.is_mapping() => {
                        deep_merge(existing, value)
                    }
                    _ => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Resolves a dotted key against a tree that may mix nested and dotted keys.
fn lookup<'a>(tree: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    if segments.is_empty() {
        return Some(tree);
    }
    let map = tree.as_mapping()?;
    (1..=segments.len()).find_map(|take| {
        let key = segments[..take].join(".");
        map.get(&Value::String(key))
            .and_then(|child| lookup(child, &segments[take..]))
    })
}

fn lookup_text(tree: &Value, key: &str) -> Option<String> {
    let segments: Vec<&str> = key.split('.').collect();
    match lookup(tree, &segments)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
