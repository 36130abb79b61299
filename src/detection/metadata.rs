//! Module metadata derived directly from the build model.

use super::coordinates::*;
use crate::maven::BuildModel;
use tracing::debug;

const JAVA_VERSION_PROPERTIES: &[&str] = &[
    "maven.compiler.release",
    "maven.compiler.source",
    "maven.compiler.target",
    "java.version",
];

/// Plugins reported in `buildPlugins` when present.
const KNOWN_BUILD_PLUGINS: &[(&str, &str)] = &[
    (SPRING_BOOT_GROUP, SPRING_BOOT_PLUGIN),
    (QUARKUS_GROUP, QUARKUS_PLUGIN),
    (MAVEN_PLUGINS, SHADE_PLUGIN),
    (MAVEN_PLUGINS, ASSEMBLY_PLUGIN),
    (JIB_GROUP, JIB_PLUGIN),
    (DOCKERFILE_GROUP, DOCKERFILE_PLUGIN),
];

pub fn java_version(model: &BuildModel) -> Option<String> {
    if let Some((key, version)) = JAVA_VERSION_PROPERTIES
        .iter()
        .find_map(|key| model.property(key).map(|v| (key, v)))
    {
        debug!("Java version {} from property {}", version, key);
        return Some(version.to_string());
    }

    model
        .find_plugin(MAVEN_PLUGINS, COMPILER_PLUGIN)
        .and_then(|p| {
            p.config_text(&["release"])
                .or_else(|| p.config_text(&["source"]))
                .or_else(|| p.config_text(&["target"]))
        })
        .map(str::to_string)
}

pub fn has_actuator(model: &BuildModel) -> bool {
    model
        .find_dependency(SPRING_BOOT_GROUP, SPRING_BOOT_ACTUATOR)
        .is_some()
}

/// Dependencies on modules of the same group, sorted by artifactId.
pub fn local_dependencies(model: &BuildModel, project_group_id: Option<&str>) -> Vec<String> {
    let Some(group_id) = project_group_id.or_else(|| model.effective_group_id()) else {
        return Vec::new();
    };
    let mut locals: Vec<String> = model
        .dependencies
        .iter()
        .filter(|d| d.group_id == group_id)
        .map(|d| d.artifact_id.clone())
        .collect();
    locals.sort();
    locals.dedup();
    locals
}

/// Known packaging and image plugins present on the module, in declaration order.
pub fn build_plugins(model: &BuildModel) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for plugin in model.all_plugins() {
        let known = KNOWN_BUILD_PLUGINS
            .iter()
            .any(|(group, artifact)| plugin.is(group, artifact));
        if known && !found.contains(&plugin.artifact_id) {
            found.push(plugin.artifact_id.clone());
        }
    }
    found
}

/// Classifier of the repackaged artifact, from the Spring Boot plugin configuration.
pub fn spring_boot_classifier(model: &BuildModel) -> Option<String> {
    model
        .find_plugin(SPRING_BOOT_GROUP, SPRING_BOOT_PLUGIN)
        .and_then(|p| p.config_text(&["classifier"]))
        .map(str::to_string)
}

/// Final name: Spring Boot plugin `finalName`, else `<build><finalName>`.
pub fn final_name(model: &BuildModel) -> Option<String> {
    model
        .find_plugin(SPRING_BOOT_GROUP, SPRING_BOOT_PLUGIN)
        .and_then(|p| p.config_text(&["finalName"]))
        .map(str::to_string)
        .or_else(|| model.final_name.clone())
}

/// `<group as path>/<artifactId>/<version>/<artifactId>-<version>[-<classifier>].<ext>`
pub fn repository_path(model: &BuildModel, classifier: Option<&str>) -> Option<String> {
    let group_id = model.effective_group_id()?;
    let version = model.effective_version()?;
    let artifact_id = &model.artifact_id;

    let file_name = match classifier.filter(|c| !c.is_empty()) {
        Some(classifier) => format!(
            "{}-{}-{}.{}",
            artifact_id,
            version,
            classifier,
            model.packaging.extension()
        ),
        None => format!("{}-{}.{}", artifact_id, version, model.packaging.extension()),
    };

    Some(format!(
        "{}/{}/{}/{}",
        group_id.replace('.', "/"),
        artifact_id,
        version,
        file_name
    ))
}

/// Repository base URL of the project: release repository preferred over snapshot.
pub fn repository_base_url(root: &BuildModel) -> Option<String> {
    root.distribution_repository
        .clone()
        .or_else(|| root.distribution_snapshot_repository.clone())
}

pub fn repository_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maven::{ConfigValue, Dependency, Packaging, Plugin};

    fn model() -> BuildModel {
        BuildModel::new("orders-api", Packaging::Jar).with_coordinates("com.acme.shop", "1.4.0")
    }

    #[test]
    fn test_java_version_property_precedence() {
        let m = model()
            .with_property("java.version", "11")
            .with_property("maven.compiler.source", "17");
        assert_eq!(java_version(&m).as_deref(), Some("17"));
    }

    #[test]
    fn test_java_version_from_compiler_plugin() {
        let m = model().with_plugin(
            Plugin::new(MAVEN_PLUGINS, COMPILER_PLUGIN).with_configuration(
                ConfigValue::from_xml_str("<configuration><release>21</release></configuration>").unwrap(),
            ),
        );
        assert_eq!(java_version(&m).as_deref(), Some("21"));
        assert_eq!(java_version(&model()), None);
    }

    #[test]
    fn test_local_dependencies_sorted() {
        let m = model()
            .with_dependency(Dependency::new("com.acme.shop", "orders-model"))
            .with_dependency(Dependency::new("org.slf4j", "slf4j-api"))
            .with_dependency(Dependency::new("com.acme.shop", "common"));
        assert_eq!(local_dependencies(&m, Some("com.acme.shop")), vec!["common", "orders-model"]);
    }

    #[test]
    fn test_build_plugins_known_only() {
        let m = model()
            .with_plugin(Plugin::new(MAVEN_PLUGINS, "maven-surefire-plugin"))
            .with_plugin(Plugin::new(JIB_GROUP, JIB_PLUGIN))
            .with_plugin(Plugin::new(SPRING_BOOT_GROUP, SPRING_BOOT_PLUGIN));
        assert_eq!(build_plugins(&m), vec![JIB_PLUGIN, SPRING_BOOT_PLUGIN]);
    }

    #[test]
    fn test_repository_path() {
        assert_eq!(
            repository_path(&model(), None).as_deref(),
            Some("com/acme/shop/orders-api/1.4.0/orders-api-1.4.0.jar")
        );
        assert_eq!(
            repository_path(&model(), Some("exec")).as_deref(),
            Some("com/acme/shop/orders-api/1.4.0/orders-api-1.4.0-exec.jar")
        );
        assert_eq!(repository_path(&BuildModel::new("x", Packaging::Jar), None), None);
    }

    #[test]
    fn test_repository_url_prefers_release() {
        let mut root = model();
        root.distribution_snapshot_repository = Some("https://repo/snapshots".to_string());
        assert_eq!(repository_base_url(&root).as_deref(), Some("https://repo/snapshots"));
        root.distribution_repository = Some("https://repo/releases/".to_string());
        let base = repository_base_url(&root).unwrap();
        assert_eq!(repository_url(&base, "a/b.jar"), "https://repo/releases/a/b.jar");
    }
}
