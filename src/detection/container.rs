//! Container image detection
//!
//! Reads the configuration of known image-building plugins and reports the image the
//! build produces. Tools are tried in a fixed order and the first applicable one wins.
//! Jib, Quarkus and Micronaut only apply once they name an image or a tag; Spring Boot
//! applies whenever `build-image` runs, and fabric8/JKube need an `images/image/build` block.

use super::coordinates::*;
use super::environment::parse_properties;
use super::profiles::RESOURCES_DIR;
use crate::fs::FileSystem;
use crate::maven::{BuildModel, Plugin};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerTool {
    Jib,
    SpringBoot,
    Fabric8,
    Quarkus,
    Micronaut,
    Jkube,
}

impl ContainerTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerTool::Jib => "jib",
            ContainerTool::SpringBoot => "spring-boot",
            ContainerTool::Fabric8 => "fabric8",
            ContainerTool::Quarkus => "quarkus",
            ContainerTool::Micronaut => "micronaut",
            ContainerTool::Jkube => "jkube",
        }
    }
}

impl fmt::Display for ContainerTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub tool: ContainerTool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish: Option<bool>,
}

impl ContainerInfo {
    pub fn new(tool: ContainerTool) -> Self {
        Self {
            tool,
            image: None,
            registry: None,
            group: None,
            tag: None,
            additional_tags: None,
            base_image: None,
            builder_image: None,
            run_image: None,
            publish: None,
        }
    }

    /// First tag becomes `tag`, the rest `additional_tags` (order and duplicates kept).
    fn with_tags(mut self, tags: Vec<String>) -> Self {
        let mut tags = tags.into_iter();
        self.tag = tags.next();
        let rest: Vec<String> = tags.collect();
        self.additional_tags = (!rest.is_empty()).then_some(rest);
        self
    }

    fn has_image_or_tag(&self) -> bool {
        self.image.is_some() || self.tag.is_some()
    }

    /// `None` when nothing identifies the image, letting the next tool apply.
    fn named(self) -> Option<Self> {
        if self.has_image_or_tag() {
            Some(self)
        } else {
            debug!("{} is configured without image or tag", self.tool);
            None
        }
    }
}

struct ToolExtractor {
    tool: ContainerTool,
    extract: fn(&ExtractContext<'_>) -> Option<ContainerInfo>,
}

struct ExtractContext<'a> {
    model: &'a BuildModel,
    module_root: &'a Path,
    fs: &'a dyn FileSystem,
}

const EXTRACTORS: &[ToolExtractor] = &[
    ToolExtractor { tool: ContainerTool::Jib, extract: extract_jib },
    ToolExtractor { tool: ContainerTool::SpringBoot, extract: extract_spring_boot },
    ToolExtractor { tool: ContainerTool::Fabric8, extract: extract_fabric8 },
    ToolExtractor { tool: ContainerTool::Quarkus, extract: extract_quarkus },
    ToolExtractor { tool: ContainerTool::Micronaut, extract: extract_micronaut },
    ToolExtractor { tool: ContainerTool::Jkube, extract: extract_jkube },
];

/// Image produced by the module's build, if any container tool is configured.
pub fn detect_container(model: &BuildModel, module_root: &Path, fs: &dyn FileSystem) -> Option<ContainerInfo> {
    let ctx = ExtractContext { model, module_root, fs };
    EXTRACTORS.iter().find_map(|extractor| {
        let info = (extractor.extract)(&ctx)?;
        debug!("Container tool {} configured for {}", extractor.tool, model.artifact_id);
        Some(derive_registry_and_group(info))
    })
}

/// Splits `registry/group.../name`. The first segment is a registry when it looks like a
/// host: it contains a dot or a colon, or is `localhost`.
pub fn split_image(image: &str) -> (Option<String>, Option<String>) {
    let segments: Vec<&str> = image.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return (None, None);
    }

    let first = segments[0];
    let is_host = first.contains('.') || first.contains(':') || first == "localhost";
    let (registry, group_segments) = if is_host {
        (Some(first.to_string()), &segments[1..segments.len() - 1])
    } else {
        (None, &segments[..segments.len() - 1])
    };
    let group = (!group_segments.is_empty()).then(|| group_segments.join("/"));
    (registry, group)
}

fn derive_registry_and_group(mut info: ContainerInfo) -> ContainerInfo {
    if info.registry.is_none() && info.group.is_none() {
        if let Some(image) = &info.image {
            let (registry, group) = split_image(image);
            info.registry = registry;
            info.group = group;
        }
    }
    info
}

/// `registry/group/name` with missing leading segments omitted.
fn join_image(registry: Option<&str>, group: Option<&str>, name: Option<&str>) -> Option<String> {
    let name = name?;
    let mut parts: Vec<&str> = Vec::new();
    parts.extend(registry);
    parts.extend(group);
    parts.push(name);
    Some(parts.join("/"))
}

fn text(plugin: &Plugin, path: &[&str]) -> Option<String> {
    plugin.config_text(path).map(str::to_string)
}

fn extract_jib(ctx: &ExtractContext<'_>) -> Option<ContainerInfo> {
    let plugin = ctx.model.find_plugin(JIB_GROUP, JIB_PLUGIN)?;
    let mut info = ContainerInfo::new(ContainerTool::Jib).with_tags(plugin.config_texts(&["to", "tags", "tag"]));
    info.image = text(plugin, &["to", "image"]);
    info.base_image = text(plugin, &["from", "image"]);
    info.named()
}

fn extract_spring_boot(ctx: &ExtractContext<'_>) -> Option<ContainerInfo> {
    let plugin = ctx
        .model
        .plugin_with_goal(SPRING_BOOT_GROUP, SPRING_BOOT_PLUGIN, "build-image")?;
    let mut info = ContainerInfo::new(ContainerTool::SpringBoot)
        .with_tags(plugin.config_texts(&["image", "tags", "tag"]));
    info.image = text(plugin, &["image", "name"]);
    info.builder_image = text(plugin, &["image", "builder"]);
    info.run_image = text(plugin, &["image", "runImage"]);
    info.publish = plugin
        .config_text(&["image", "publish"])
        .map(|p| p.eq_ignore_ascii_case("true"));
    Some(info)
}

/// Shared by fabric8 and JKube, which use the same `images/image` layout.
fn extract_image_list(plugin: &Plugin, tool: ContainerTool) -> Option<ContainerInfo> {
    plugin.config_node(&["images", "image", "build"])?;
    let mut info = ContainerInfo::new(tool).with_tags(plugin.config_texts(&["images", "image", "build", "tags", "tag"]));
    info.image = text(plugin, &["images", "image", "name"]);
    info.base_image = text(plugin, &["images", "image", "build", "from"]);
    Some(info)
}

fn extract_fabric8(ctx: &ExtractContext<'_>) -> Option<ContainerInfo> {
    let plugin = ctx.model.find_plugin(FABRIC8_GROUP, FABRIC8_PLUGIN)?;
    extract_image_list(plugin, ContainerTool::Fabric8)
}

fn extract_jkube(ctx: &ExtractContext<'_>) -> Option<ContainerInfo> {
    JKUBE_PLUGINS
        .iter()
        .filter_map(|artifact| ctx.model.find_plugin(JKUBE_GROUP, artifact))
        .find_map(|plugin| extract_image_list(plugin, ContainerTool::Jkube))
}

fn extract_quarkus(ctx: &ExtractContext<'_>) -> Option<ContainerInfo> {
    let plugin = ctx.model.find_plugin(QUARKUS_GROUP, QUARKUS_PLUGIN)?;
    let app_properties = read_application_properties(ctx);

    let setting = |config_key: &str, property: &str| -> Option<String> {
        text(plugin, &["containerImage", config_key])
            .or_else(|| ctx.model.property(&format!("quarkus.container-image.{}", property)).map(str::to_string))
            .or_else(|| {
                let key = format!("quarkus.container-image.{}", property);
                app_properties
                    .iter()
                    .find(|(k, v)| *k == key && !v.is_empty())
                    .map(|(_, v)| v.clone())
            })
    };

    let registry = setting("registry", "registry");
    let group = setting("group", "group");
    let name = setting("name", "name").or_else(|| {
        (registry.is_some() || group.is_some()).then(|| ctx.model.artifact_id.clone())
    });

    let mut tags: Vec<String> = setting("tag", "tag").into_iter().collect();
    let configured_extra = plugin.config_texts(&["containerImage", "additionalTags", "tag"]);
    if configured_extra.is_empty() {
        if let Some(extra) = setting("additionalTags", "additional-tags") {
            tags.extend(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
            );
        }
    } else {
        tags.extend(configured_extra);
    }

    let mut info = ContainerInfo::new(ContainerTool::Quarkus).with_tags(tags);
    info.image = join_image(registry.as_deref(), group.as_deref(), name.as_deref());
    info.registry = registry;
    info.group = group;
    info.named()
}

fn read_application_properties(ctx: &ExtractContext<'_>) -> Vec<(String, String)> {
    let path = ctx.module_root.join(RESOURCES_DIR).join("application.properties");
    if !ctx.fs.is_file(&path) {
        return Vec::new();
    }
    match ctx.fs.read_to_string(&path) {
        Ok(content) => parse_properties(&content),
        Err(e) => {
            warn!("Failed to read {}: {:#}", path.display(), e);
            Vec::new()
        }
    }
}

fn extract_micronaut(ctx: &ExtractContext<'_>) -> Option<ContainerInfo> {
    let plugin = ctx.model.find_plugin(MICRONAUT_GROUP, MICRONAUT_PLUGIN)?;
    let registry = text(plugin, &["dockerRegistry"]);
    let group = text(plugin, &["dockerGroup"]);
    let name = text(plugin, &["dockerName"]);

    let mut tags: Vec<String> = text(plugin, &["dockerTag"]).into_iter().collect();
    tags.extend(plugin.config_texts(&["dockerExtraTags", "tag"]));

    let mut info = ContainerInfo::new(ContainerTool::Micronaut).with_tags(tags);
    info.image = join_image(registry.as_deref(), group.as_deref(), name.as_deref());
    info.registry = registry;
    info.group = group;
    info.named()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::maven::{ConfigValue, Packaging};

    fn plugin(group: &str, artifact: &str, xml: &str) -> Plugin {
        Plugin::new(group, artifact).with_configuration(ConfigValue::from_xml_str(xml).unwrap())
    }

    fn detect(model: &BuildModel, fs: &MockFileSystem) -> Option<ContainerInfo> {
        detect_container(model, Path::new("/mock"), fs)
    }

    fn app() -> BuildModel {
        BuildModel::new("orders", Packaging::Jar)
    }

    #[test]
    fn test_split_image() {
        assert_eq!(
            split_image("ghcr.io/acme/demo"),
            (Some("ghcr.io".to_string()), Some("acme".to_string()))
        );
        assert_eq!(split_image("acme/demo"), (None, Some("acme".to_string())));
        assert_eq!(split_image("demo"), (None, None));
        assert_eq!(split_image("eclipse-temurin:17-jre"), (None, None));
        assert_eq!(
            split_image("localhost/team/sub/demo"),
            (Some("localhost".to_string()), Some("team/sub".to_string()))
        );
        assert_eq!(
            split_image("registry:5000/demo"),
            (Some("registry:5000".to_string()), None)
        );
        // a dotless private registry host is read as a group
        assert_eq!(split_image("nexus/acme/demo"), (None, Some("nexus/acme".to_string())));
    }

    #[test]
    fn test_no_container_tool() {
        let fs = MockFileSystem::new();
        assert_eq!(detect(&app(), &fs), None);
    }

    #[test]
    fn test_jib_with_only_base_image_is_skipped() {
        let fs = MockFileSystem::new();
        let model = app().with_plugin(plugin(
            JIB_GROUP,
            JIB_PLUGIN,
            "<configuration><from><image>eclipse-temurin:17</image></from></configuration>",
        ));
        assert_eq!(detect(&model, &fs), None);
    }

    #[test]
    fn test_skipped_tool_falls_through_to_next() {
        let fs = MockFileSystem::new();
        let model = app()
            .with_plugin(Plugin::new(JIB_GROUP, JIB_PLUGIN))
            .with_plugin(plugin(
                FABRIC8_GROUP,
                FABRIC8_PLUGIN,
                "<configuration><images><image><name>acme/orders</name><build><from>alpine</from></build></image></images></configuration>",
            ));
        let info = detect(&model, &fs).unwrap();
        assert_eq!(info.tool, ContainerTool::Fabric8);
        assert_eq!(info.group.as_deref(), Some("acme"));
        assert_eq!(info.base_image.as_deref(), Some("alpine"));
    }

    #[test]
    fn test_spring_boot_requires_explicit_build_image_goal() {
        let fs = MockFileSystem::new();
        let xml = "<configuration><image><name>acme/orders</name></image></configuration>";
        let without_goal = app().with_plugin(plugin(SPRING_BOOT_GROUP, SPRING_BOOT_PLUGIN, xml));
        assert_eq!(detect(&without_goal, &fs), None);

        let with_goal = app().with_plugin(plugin(SPRING_BOOT_GROUP, SPRING_BOOT_PLUGIN, xml).with_goals(&["build-image"]));
        assert_eq!(detect(&with_goal, &fs).unwrap().tool, ContainerTool::SpringBoot);
    }

    #[test]
    fn test_spring_boot_build_image_without_configuration() {
        let fs = MockFileSystem::new();
        let model = app()
            .with_plugin(Plugin::new(SPRING_BOOT_GROUP, SPRING_BOOT_PLUGIN).with_goals(&["build-image"]))
            .with_plugin(plugin(
                FABRIC8_GROUP,
                FABRIC8_PLUGIN,
                "<configuration><images><image><name>acme/orders</name><build/></image></images></configuration>",
            ));
        let info = detect(&model, &fs).unwrap();
        assert_eq!(info, ContainerInfo::new(ContainerTool::SpringBoot));
    }

    #[test]
    fn test_fabric8_without_build_block_is_skipped() {
        let fs = MockFileSystem::new();
        let model = app().with_plugin(plugin(
            FABRIC8_GROUP,
            FABRIC8_PLUGIN,
            "<configuration><images><image><name>acme/orders</name></image></images></configuration>",
        ));
        assert_eq!(detect(&model, &fs), None);
    }

    #[test]
    fn test_fabric8_build_block_without_name() {
        let fs = MockFileSystem::new();
        let model = app().with_plugin(plugin(
            FABRIC8_GROUP,
            FABRIC8_PLUGIN,
            "<configuration><images><image><build><from>alpine</from></build></image></images></configuration>",
        ));
        let info = detect(&model, &fs).unwrap();
        assert_eq!(info.tool, ContainerTool::Fabric8);
        assert_eq!(info.image, None);
        assert_eq!(info.base_image.as_deref(), Some("alpine"));
    }

    #[test]
    fn test_quarkus_properties_with_default_name() {
        let fs = MockFileSystem::new();
        let model = app()
            .with_plugin(Plugin::new(QUARKUS_GROUP, QUARKUS_PLUGIN))
            .with_property("quarkus.container-image.registry", "quay.io")
            .with_property("quarkus.container-image.group", "acme")
            .with_property("quarkus.container-image.tag", "2.0")
            .with_property("quarkus.container-image.additional-tags", "latest, stable,latest");

        let info = detect(&model, &fs).unwrap();
        assert_eq!(info.tool, ContainerTool::Quarkus);
        assert_eq!(info.image.as_deref(), Some("quay.io/acme/orders"));
        assert_eq!(info.tag.as_deref(), Some("2.0"));
        assert_eq!(
            info.additional_tags,
            Some(vec!["latest".to_string(), "stable".to_string(), "latest".to_string()])
        );
    }

    #[test]
    fn test_quarkus_application_properties_fallback() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "src/main/resources/application.properties",
            "quarkus.container-image.group=team\nquarkus.container-image.name=svc\n",
        );
        let model = app().with_plugin(plugin(
            QUARKUS_GROUP,
            QUARKUS_PLUGIN,
            "<configuration><containerImage><registry>docker.io</registry></containerImage></configuration>",
        ));

        let info = detect(&model, &fs).unwrap();
        assert_eq!(info.image.as_deref(), Some("docker.io/team/svc"));
        assert_eq!(info.registry.as_deref(), Some("docker.io"));
        assert_eq!(info.group.as_deref(), Some("team"));
    }

    #[test]
    fn test_quarkus_without_settings_is_skipped() {
        let fs = MockFileSystem::new();
        let model = app().with_plugin(Plugin::new(QUARKUS_GROUP, QUARKUS_PLUGIN));
        assert_eq!(detect(&model, &fs), None);
    }

    #[test]
    fn test_micronaut() {
        let fs = MockFileSystem::new();
        let model = app().with_plugin(plugin(
            MICRONAUT_GROUP,
            MICRONAUT_PLUGIN,
            "<configuration><dockerName>orders</dockerName><dockerGroup>acme</dockerGroup>\
             <dockerTag>1.0</dockerTag><dockerExtraTags><tag>latest</tag></dockerExtraTags></configuration>",
        ));
        let info = detect(&model, &fs).unwrap();
        assert_eq!(info.image.as_deref(), Some("acme/orders"));
        assert_eq!(info.registry, None);
        assert_eq!(info.tag.as_deref(), Some("1.0"));
        assert_eq!(info.additional_tags, Some(vec!["latest".to_string()]));
    }

    #[test]
    fn test_jkube_openshift_plugin() {
        let fs = MockFileSystem::new();
        let model = app().with_plugin(plugin(
            JKUBE_GROUP,
            "openshift-maven-plugin",
            "<configuration><images><image><name>quay.io/acme/orders</name>\
             <build><tags><tag>1</tag><tag>1</tag></tags></build></image></images></configuration>",
        ));
        let info = detect(&model, &fs).unwrap();
        assert_eq!(info.tool, ContainerTool::Jkube);
        assert_eq!(info.registry.as_deref(), Some("quay.io"));
        assert_eq!(info.tag.as_deref(), Some("1"));
        assert_eq!(info.additional_tags, Some(vec!["1".to_string()]));
    }

    #[test]
    fn test_serialized_tool_names() {
        let json = serde_json::to_value(ContainerInfo::new(ContainerTool::SpringBoot)).unwrap();
        assert_eq!(json["tool"], "spring-boot");
        assert!(json.get("image").is_none());
    }
}
