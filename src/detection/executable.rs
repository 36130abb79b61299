//! Executable detection
//!
//! Classifies a module's artifact: can it be launched directly, by which build plugin,
//! and what does the packaged artifact look like. Classification is an ordered table
//! of rules, evaluated top to bottom; the first rule whose predicate holds produces the
//! verdict. Packaging-specific rules come first, then plugin signatures, then the
//! degraded Spring Boot dependency rule, so a packaging plugin that owns the artifact
//! shape always wins over a co-present Spring Boot dependency.

use super::coordinates::*;
use super::profiles::scan_profiles;
use crate::fs::FileSystem;
use crate::maven::{BuildModel, ConfigValue, Packaging, Plugin};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const JAR_LAUNCHER: &str = "org.springframework.boot.loader.JarLauncher";
pub const WAR_LAUNCHER: &str = "org.springframework.boot.loader.WarLauncher";
pub const SPRING_BOOT_WITHOUT_PLUGIN: &str = "spring-boot-dependencies (no plugin)";
pub const JAR_WITH_DEPENDENCY_PLUGIN: &str = "maven-jar-plugin + maven-dependency-plugin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutableType {
    Jar,
    War,
    Ear,
}

impl ExecutableType {
    pub fn extension(&self) -> &'static str {
        match self {
            ExecutableType::Jar => "jar",
            ExecutableType::War => "war",
            ExecutableType::Ear => "ear",
        }
    }
}

/// Physical layout of the built artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactStructure {
    /// Dependencies nested as jars, unpacked at runtime by a launcher
    JarInJar,
    /// Dependencies merged into one jar
    FlatJar,
    WarWithEmbeddedServer,
}

impl ArtifactStructure {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactStructure::JarInJar => "jar-in-jar",
            ArtifactStructure::FlatJar => "flat-jar",
            ArtifactStructure::WarWithEmbeddedServer => "war-with-embedded-server",
        }
    }
}

/// Verdict of the executable detector.
///
/// `executable` implies `type` is set. `deployment_only` implies `!executable` and
/// `requires_external_server`. List fields are `None` rather than empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableInfo {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub executable_type: Option<ExecutableType>,
    pub executable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<ArtifactStructure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launcher_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedded_server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_command: Option<String>,
    pub requires_external_server: bool,
    pub deployment_only: bool,
    pub servlet_initializer: bool,
    pub obsolete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub spring_boot_application: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spring_boot_profiles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<String>>,
    #[serde(rename = "javaEEVersion", skip_serializing_if = "Option::is_none")]
    pub java_ee_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptors: Option<Vec<String>>,
}

impl ExecutableInfo {
    pub fn not_executable() -> Self {
        Self::default()
    }

    /// Artifact that must be deployed into an application server.
    pub fn deployment_only(executable_type: ExecutableType, method: &str) -> Self {
        Self {
            executable_type: Some(executable_type),
            method: Some(method.to_string()),
            deployment_only: true,
            requires_external_server: true,
            ..Self::default()
        }
    }

    fn runnable(executable_type: ExecutableType, method: &str, run_command: String) -> Self {
        Self {
            executable_type: Some(executable_type),
            executable: true,
            method: Some(method.to_string()),
            run_command: Some(run_command),
            ..Self::default()
        }
    }

    /// True when nothing at all was detected.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Inputs shared by every rule.
pub struct RuleContext<'a> {
    pub model: &'a BuildModel,
    pub module_root: &'a Path,
    pub fs: &'a dyn FileSystem,
}

impl RuleContext<'_> {
    fn plugin(&self, group_id: &str, artifact_id: &str) -> Option<&Plugin> {
        self.model.find_plugin(group_id, artifact_id)
    }

    fn spring_boot_plugin(&self) -> Option<&Plugin> {
        self.plugin(SPRING_BOOT_GROUP, SPRING_BOOT_PLUGIN)
    }

    fn has_spring_boot_dependency(&self) -> bool {
        self.model.has_dependency_group(SPRING_BOOT_GROUP)
    }

    fn is(&self, packaging: Packaging) -> bool {
        self.model.packaging == packaging
    }

    /// `java -jar target/<base>[-<suffix>].<ext>`
    fn run_command(&self, executable_type: ExecutableType, suffix: Option<&str>) -> String {
        let base = self.model.artifact_base_name();
        match suffix {
            Some(suffix) => format!("java -jar target/{}{}.{}", base, suffix, executable_type.extension()),
            None => format!("java -jar target/{}.{}", base, executable_type.extension()),
        }
    }

    fn profiles(&self) -> Option<Vec<String>> {
        let profiles = scan_profiles(self.fs, self.module_root);
        (!profiles.is_empty()).then_some(profiles)
    }
}

/// One entry of the precedence table.
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&RuleContext<'_>) -> bool,
    pub build: fn(&RuleContext<'_>) -> ExecutableInfo,
}

pub const RULES: &[Rule] = &[
    Rule { name: "pom-packaging", applies: is_pom, build: build_not_executable },
    Rule { name: "spring-boot-jar", applies: is_spring_boot_jar, build: build_spring_boot_jar },
    Rule { name: "spring-boot-war", applies: is_spring_boot_war, build: build_spring_boot_war },
    Rule { name: "shade", applies: is_shaded_jar, build: build_shaded_jar },
    Rule { name: "assembly", applies: is_assembly_jar, build: build_assembly_jar },
    Rule { name: "jar-with-dependency-plugin", applies: is_jar_with_dependency_plugin, build: build_jar_with_dependency_plugin },
    Rule { name: "onejar", applies: is_onejar, build: build_onejar },
    Rule { name: "war-embedded-container", applies: is_war_with_embedded_container, build: build_war_with_embedded_container },
    Rule { name: "ear", applies: is_ear, build: build_ear },
    Rule { name: "spring-boot-without-plugin", applies: is_spring_boot_without_plugin, build: build_spring_boot_without_plugin },
    Rule { name: "plain-war", applies: is_war, build: build_plain_war },
];

/// Produces exactly one verdict for a module.
pub fn detect_executable(model: &BuildModel, module_root: &Path, fs: &dyn FileSystem) -> ExecutableInfo {
    let ctx = RuleContext { model, module_root, fs };
    match matching_rule(&ctx) {
        Some(rule) => {
            debug!("Executable rule '{}' matched for {}", rule.name, model.artifact_id);
            (rule.build)(&ctx)
        }
        None => {
            debug!("No executable rule matched for {}", model.artifact_id);
            ExecutableInfo::not_executable()
        }
    }
}

pub fn matching_rule(ctx: &RuleContext<'_>) -> Option<&'static Rule> {
    RULES.iter().find(|rule| (rule.applies)(ctx))
}

fn is_pom(ctx: &RuleContext<'_>) -> bool {
    ctx.is(Packaging::Pom)
}

fn build_not_executable(_: &RuleContext<'_>) -> ExecutableInfo {
    ExecutableInfo::not_executable()
}

fn is_spring_boot_jar(ctx: &RuleContext<'_>) -> bool {
    ctx.is(Packaging::Jar)
        && ctx
            .spring_boot_plugin()
            .map(|p| p.runs_goal("repackage") || p.has_goal("build-image"))
            .unwrap_or(false)
}

/// Main class configured on the Spring Boot plugin or through the `start-class` property.
pub fn spring_boot_configured_main_class(model: &BuildModel) -> Option<String> {
    model
        .find_plugin(SPRING_BOOT_GROUP, SPRING_BOOT_PLUGIN)
        .and_then(|p| p.config_text(&["mainClass"]).or_else(|| p.config_text(&["start-class"])))
        .or_else(|| model.property("start-class"))
        .map(str::to_string)
}

fn build_spring_boot_jar(ctx: &RuleContext<'_>) -> ExecutableInfo {
    ExecutableInfo {
        structure: Some(ArtifactStructure::JarInJar),
        main_class: spring_boot_configured_main_class(ctx.model),
        launcher_class: Some(JAR_LAUNCHER.to_string()),
        spring_boot_application: true,
        spring_boot_profiles: ctx.profiles(),
        ..ExecutableInfo::runnable(
            ExecutableType::Jar,
            SPRING_BOOT_PLUGIN,
            ctx.run_command(ExecutableType::Jar, None),
        )
    }
}

fn is_spring_boot_war(ctx: &RuleContext<'_>) -> bool {
    ctx.is(Packaging::War) && ctx.spring_boot_plugin().is_some()
}

fn build_spring_boot_war(ctx: &RuleContext<'_>) -> ExecutableInfo {
    ExecutableInfo {
        structure: Some(ArtifactStructure::WarWithEmbeddedServer),
        main_class: spring_boot_configured_main_class(ctx.model),
        launcher_class: Some(WAR_LAUNCHER.to_string()),
        embedded_server: Some("Tomcat/Jetty/Undertow".to_string()),
        servlet_initializer: true,
        spring_boot_application: true,
        spring_boot_profiles: ctx.profiles(),
        ..ExecutableInfo::runnable(
            ExecutableType::War,
            SPRING_BOOT_PLUGIN,
            ctx.run_command(ExecutableType::War, None),
        )
    }
}

fn is_shaded_jar(ctx: &RuleContext<'_>) -> bool {
    ctx.is(Packaging::Jar)
        && ctx
            .plugin(MAVEN_PLUGINS, SHADE_PLUGIN)
            .map(|p| p.runs_goal("shade"))
            .unwrap_or(false)
}

fn shade_transformers(plugin: &Plugin) -> Vec<&ConfigValue> {
    plugin
        .configurations()
        .map(|cfg| cfg.all_at(&["transformers", "transformer"]))
        .find(|transformers| !transformers.is_empty())
        .unwrap_or_default()
}

/// Main class from the node whose `implementation` names the `ManifestResourceTransformer`,
/// else from the first transformer that declares one.
fn shade_main_class(plugin: &Plugin) -> Option<String> {
    let declares_main = |node: &ConfigValue| node.entry("mainClass").and_then(|m| m.as_text()).is_some();
    let is_manifest = |node: &ConfigValue| {
        declares_main(node)
            && node
                .attribute("implementation")
                .is_some_and(|i| i.contains("ManifestResourceTransformer"))
    };

    plugin
        .configurations()
        .find_map(|cfg| cfg.find_descendant(is_manifest))
        .or_else(|| {
            plugin
                .configurations()
                .filter_map(|cfg| cfg.entry("transformers"))
                .find_map(|transformers| transformers.find_descendant(declares_main))
        })
        .and_then(|node| node.text_at(&["mainClass"]))
        .map(str::to_string)
}

fn build_shaded_jar(ctx: &RuleContext<'_>) -> ExecutableInfo {
    let plugin = ctx.plugin(MAVEN_PLUGINS, SHADE_PLUGIN);
    let transformers = plugin.map(shade_transformers).unwrap_or_default();
    let names: Vec<String> = transformers
        .iter()
        .filter_map(|t| t.attribute("implementation"))
        .map(|i| i.rsplit('.').next().unwrap_or(i).to_string())
        .collect();

    ExecutableInfo {
        structure: Some(ArtifactStructure::FlatJar),
        main_class: plugin.and_then(shade_main_class),
        transformers: (!names.is_empty()).then_some(names),
        spring_boot_application: ctx.has_spring_boot_dependency(),
        ..ExecutableInfo::runnable(
            ExecutableType::Jar,
            SHADE_PLUGIN,
            ctx.run_command(ExecutableType::Jar, None),
        )
    }
}

fn is_assembly_jar(ctx: &RuleContext<'_>) -> bool {
    ctx.is(Packaging::Jar)
        && ctx
            .plugin(MAVEN_PLUGINS, ASSEMBLY_PLUGIN)
            .map(|p| p.runs_goal("single"))
            .unwrap_or(false)
}

fn build_assembly_jar(ctx: &RuleContext<'_>) -> ExecutableInfo {
    let plugin = ctx.plugin(MAVEN_PLUGINS, ASSEMBLY_PLUGIN);
    let refs = plugin
        .map(|p| p.config_texts(&["descriptorRefs", "descriptorRef"]))
        .unwrap_or_default();
    let files = plugin
        .map(|p| p.config_texts(&["descriptors", "descriptor"]))
        .unwrap_or_default();
    let suffix = refs.first().map(|r| format!("-{}", r));
    let descriptors: Vec<String> = refs.iter().chain(files.iter()).cloned().collect();

    ExecutableInfo {
        structure: Some(ArtifactStructure::FlatJar),
        main_class: plugin
            .and_then(|p| p.config_text(&["archive", "manifest", "mainClass"]))
            .map(str::to_string),
        descriptors: (!descriptors.is_empty()).then_some(descriptors),
        spring_boot_application: ctx.has_spring_boot_dependency(),
        ..ExecutableInfo::runnable(
            ExecutableType::Jar,
            ASSEMBLY_PLUGIN,
            ctx.run_command(ExecutableType::Jar, suffix.as_deref()),
        )
    }
}

fn jar_plugin_main_class(ctx: &RuleContext<'_>) -> Option<String> {
    ctx.plugin(MAVEN_PLUGINS, JAR_PLUGIN)
        .and_then(|p| p.config_text(&["archive", "manifest", "mainClass"]))
        .map(str::to_string)
}

fn is_jar_with_dependency_plugin(ctx: &RuleContext<'_>) -> bool {
    ctx.is(Packaging::Jar)
        && jar_plugin_main_class(ctx).is_some()
        && ctx.plugin(MAVEN_PLUGINS, DEPENDENCY_PLUGIN).is_some()
}

fn build_jar_with_dependency_plugin(ctx: &RuleContext<'_>) -> ExecutableInfo {
    let unpacks = ctx
        .plugin(MAVEN_PLUGINS, DEPENDENCY_PLUGIN)
        .map(|p| p.has_goal("unpack-dependencies"))
        .unwrap_or(false);

    ExecutableInfo {
        structure: unpacks.then_some(ArtifactStructure::FlatJar),
        main_class: jar_plugin_main_class(ctx),
        spring_boot_application: ctx.has_spring_boot_dependency(),
        ..ExecutableInfo::runnable(
            ExecutableType::Jar,
            JAR_WITH_DEPENDENCY_PLUGIN,
            ctx.run_command(ExecutableType::Jar, None),
        )
    }
}

fn is_onejar(ctx: &RuleContext<'_>) -> bool {
    ctx.is(Packaging::Jar)
        && ctx
            .plugin(ONEJAR_GROUP, ONEJAR_PLUGIN)
            .map(|p| p.runs_goal("one-jar"))
            .unwrap_or(false)
}

fn build_onejar(ctx: &RuleContext<'_>) -> ExecutableInfo {
    ExecutableInfo {
        structure: Some(ArtifactStructure::JarInJar),
        obsolete: true,
        warning: Some(
            "onejar-maven-plugin is obsolete and does not work with Java 9+. \
             Consider migrating to spring-boot-maven-plugin or maven-shade-plugin."
                .to_string(),
        ),
        ..ExecutableInfo::runnable(
            ExecutableType::Jar,
            ONEJAR_PLUGIN,
            ctx.run_command(ExecutableType::Jar, Some(".one-jar")),
        )
    }
}

/// (artifactId, server name, run command) of the embedded-container plugin, if any.
fn embedded_container(ctx: &RuleContext<'_>) -> Option<(&'static str, &'static str, String)> {
    if ctx.plugin(JETTY_GROUP, JETTY_PLUGIN).is_some() {
        return Some((JETTY_PLUGIN, "Jetty", "mvn jetty:run".to_string()));
    }
    TOMCAT_PLUGINS
        .iter()
        .find(|artifact| ctx.plugin(TOMCAT_GROUP, artifact).is_some())
        .map(|artifact| {
            let prefix = artifact.trim_end_matches("-maven-plugin");
            (*artifact, "Tomcat", format!("mvn {}:run", prefix))
        })
}

fn is_war_with_embedded_container(ctx: &RuleContext<'_>) -> bool {
    ctx.is(Packaging::War) && embedded_container(ctx).is_some()
}

fn build_war_with_embedded_container(ctx: &RuleContext<'_>) -> ExecutableInfo {
    let Some((plugin, server, run_command)) = embedded_container(ctx) else {
        return ExecutableInfo::not_executable();
    };
    ExecutableInfo {
        executable_type: Some(ExecutableType::War),
        method: Some(plugin.to_string()),
        embedded_server: Some(server.to_string()),
        run_command: Some(run_command),
        requires_external_server: true,
        ..ExecutableInfo::default()
    }
}

fn is_ear(ctx: &RuleContext<'_>) -> bool {
    ctx.is(Packaging::Ear)
}

fn build_ear(ctx: &RuleContext<'_>) -> ExecutableInfo {
    let mut info = ExecutableInfo::deployment_only(ExecutableType::Ear, EAR_PLUGIN);
    let Some(plugin) = ctx.plugin(MAVEN_PLUGINS, EAR_PLUGIN) else {
        return info;
    };

    let mut modules = Vec::new();
    if let Some(declared) = plugin.config_node(&["modules"]) {
        for (kind, extension) in [("webModule", "war"), ("ejbModule", "jar"), ("jarModule", "jar")] {
            for module in declared.entry(kind).map(|m| m.items()).unwrap_or_default() {
                if let Some(artifact) = module.text_at(&["artifactId"]) {
                    modules.push(format!("{}.{}", artifact, extension));
                }
            }
        }
    }
    info.modules = (!modules.is_empty()).then_some(modules);
    info.java_ee_version = plugin.config_text(&["version"]).map(str::to_string);
    info
}

fn is_spring_boot_without_plugin(ctx: &RuleContext<'_>) -> bool {
    // a Spring Boot plugin that never repackages counts as absent
    (ctx.is(Packaging::Jar) || ctx.is(Packaging::War)) && ctx.has_spring_boot_dependency()
}

fn build_spring_boot_without_plugin(ctx: &RuleContext<'_>) -> ExecutableInfo {
    let profiles = ctx.profiles();
    if ctx.is(Packaging::War) {
        return ExecutableInfo {
            spring_boot_application: true,
            spring_boot_profiles: profiles,
            warning: Some(
                "Spring Boot dependencies detected but no spring-boot-maven-plugin configured. \
                 Add spring-boot-maven-plugin to create an executable WAR with an embedded server."
                    .to_string(),
            ),
            ..ExecutableInfo::deployment_only(ExecutableType::War, SPRING_BOOT_WITHOUT_PLUGIN)
        };
    }

    ExecutableInfo {
        spring_boot_application: true,
        spring_boot_profiles: profiles,
        warning: Some(
            "Spring Boot dependencies detected but no spring-boot-maven-plugin configured. \
             Add spring-boot-maven-plugin to create an executable JAR, or use maven-shade-plugin/maven-assembly-plugin."
                .to_string(),
        ),
        ..ExecutableInfo::runnable(
            ExecutableType::Jar,
            SPRING_BOOT_WITHOUT_PLUGIN,
            ctx.run_command(ExecutableType::Jar, None),
        )
    }
}

fn is_war(ctx: &RuleContext<'_>) -> bool {
    ctx.is(Packaging::War)
}

fn build_plain_war(_: &RuleContext<'_>) -> ExecutableInfo {
    ExecutableInfo::deployment_only(ExecutableType::War, WAR_PLUGIN)
}
