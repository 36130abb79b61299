//! Project analyzer
//!
//! Walks a Maven module tree from the root `pom.xml`, runs the detectors on every
//! deployable module and folds the results into a [`ProjectDescriptor`]. Only the root
//! POM is mandatory; broken sub-modules are skipped with a warning.

use crate::detection::metadata::{
    build_plugins, final_name, java_version, local_dependencies, repository_base_url,
    repository_path, repository_url, spring_boot_classifier,
};
use crate::detection::{
    detect_container, detect_executable, ContainerInfo, EnvironmentConfig, ExecutableInfo,
};
use crate::frameworks::registry::AppliedFramework;
use crate::frameworks::{FrameworkRegistry, ModuleContext, QuarkusInfo};
use crate::fs::{normalize_path, FileSystem, RealFileSystem};
use crate::maven::{parse_pom, parse_pom_with_properties, BuildModel, Packaging, PomError};
use crate::reports::{
    DependencyReport, PluginReport, PluginReportOptions, PropertyOptions, PropertyReport,
    DEFAULT_SCOPES,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

const POM_FILE: &str = "pom.xml";

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("No pom.xml found in {0}")]
    MissingRootPom(PathBuf),
    #[error("Failed to read {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },
    #[error("Failed to parse {path}: {source}")]
    InvalidPom {
        path: PathBuf,
        #[source]
        source: PomError,
    },
}

/// What the analyzer attaches to each module beyond detection results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOptions {
    pub include_dependencies: bool,
    pub include_plugins: bool,
    pub include_properties: bool,
    /// Scopes listed in the dependency report
    pub dependency_scopes: Vec<String>,
    pub plugins: PluginReportOptions,
    pub properties: PropertyOptions,
    /// Allow framework detectors to scan source files
    pub scan_sources: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            include_dependencies: false,
            include_plugins: false,
            include_properties: false,
            dependency_scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            plugins: PluginReportOptions::default(),
            properties: PropertyOptions::default(),
            scan_sources: true,
        }
    }
}

/// Descriptor of one deployable module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployableModule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub artifact_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub packaging: Packaging,
    /// Relative to the project root, `.` for the root module
    pub module_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_version: Option<String>,
    pub spring_boot_executable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_plugins: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environments: Option<Vec<EnvironmentConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<ExecutableInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frameworks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarkus: Option<QuarkusInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<DependencyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyReport>,
}

impl DeployableModule {
    fn base(model: &BuildModel, module_path: String) -> Self {
        Self {
            group_id: model.effective_group_id().map(str::to_string),
            artifact_id: model.artifact_id.clone(),
            version: model.effective_version().map(str::to_string),
            packaging: model.packaging,
            module_path,
            final_name: final_name(model),
            classifier: None,
            repository_path: None,
            repository_url: None,
            java_version: java_version(model),
            spring_boot_executable: false,
            main_class: None,
            local_dependencies: Vec::new(),
            build_plugins: build_plugins(model),
            environments: None,
            executable: None,
            container: None,
            frameworks: Vec::new(),
            quarkus: None,
            dependencies: None,
            plugins: None,
            properties: None,
        }
    }

    /// Folds one framework's enrichment onto the module.
    pub fn apply(&mut self, applied: AppliedFramework) {
        let AppliedFramework { name, enrichment } = applied;
        push_unique(&mut self.frameworks, name);

        if let Some(spring_boot_executable) = enrichment.spring_boot_executable {
            self.spring_boot_executable = spring_boot_executable;
        }
        if enrichment.main_class.is_some() {
            self.main_class = enrichment.main_class;
        }
        if enrichment.environments.is_some() {
            self.environments = enrichment.environments;
        }
        for plugin in enrichment.build_plugins {
            push_unique(&mut self.build_plugins, plugin);
        }
        if enrichment.quarkus.is_some() {
            self.quarkus = enrichment.quarkus;
        }
    }

    pub fn is_executable(&self) -> bool {
        self.executable.as_ref().is_some_and(|e| e.executable)
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Deployment descriptor of a whole project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_group_id: Option<String>,
    pub project_artifact_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_description: Option<String>,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maven_repository_url: Option<String>,
    pub deployable_modules: Vec<DeployableModule>,
    pub total_modules: usize,
    pub deployable_modules_count: usize,
}

/// Project-wide facts every module needs.
struct ProjectScope<'a> {
    root: &'a Path,
    group_id: Option<&'a str>,
    repository_base: Option<&'a str>,
    properties: &'a BTreeMap<String, String>,
}

/// Accumulated while walking the module tree.
#[derive(Default)]
struct Walk {
    visited: HashSet<PathBuf>,
    total: usize,
    modules: Vec<DeployableModule>,
}

pub struct ProjectAnalyzer {
    fs: Arc<dyn FileSystem>,
    registry: FrameworkRegistry,
    options: AnalyzerOptions,
}

impl ProjectAnalyzer {
    /// Analyzer over the real filesystem with the built-in framework detectors.
    pub fn new() -> Self {
        Self::with_file_system(Arc::new(RealFileSystem::new()))
    }

    pub fn with_file_system(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            registry: FrameworkRegistry::with_defaults(),
            options: AnalyzerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AnalyzerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_registry(mut self, registry: FrameworkRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    pub fn analyze(&self, project_root: &Path) -> Result<ProjectDescriptor, AnalyzerError> {
        self.validate_root(project_root)?;
        info!("Analyzing Maven project at {}", project_root.display());

        let root_pom = project_root.join(POM_FILE);
        let content = self
            .fs
            .read_to_string(&root_pom)
            .map_err(|e| AnalyzerError::ReadError {
                path: root_pom.clone(),
                reason: format!("{:#}", e),
            })?;
        let root = parse_pom(&content).map_err(|source| AnalyzerError::InvalidPom {
            path: root_pom.clone(),
            source,
        })?;

        let repository_base = repository_base_url(&root);
        let root_dir = normalize_path(project_root);
        let scope = ProjectScope {
            root: &root_dir,
            group_id: root.effective_group_id(),
            repository_base: repository_base.as_deref(),
            properties: &root.properties,
        };

        let mut walk = Walk::default();
        self.visit(&root, &root_dir, ".".to_string(), &scope, &mut walk);

        info!(
            "Found {} deployable module(s) out of {}",
            walk.modules.len(),
            walk.total
        );

        Ok(ProjectDescriptor {
            project_group_id: root.effective_group_id().map(str::to_string),
            project_artifact_id: root.artifact_id.clone(),
            project_version: root.effective_version().map(str::to_string),
            project_name: root.name.clone(),
            project_description: root.description.clone(),
            generated_at: Utc::now(),
            maven_repository_url: repository_base.clone(),
            deployable_modules_count: walk.modules.len(),
            deployable_modules: walk.modules,
            total_modules: walk.total,
        })
    }

    fn validate_root(&self, project_root: &Path) -> Result<(), AnalyzerError> {
        if !self.fs.exists(project_root) {
            return Err(AnalyzerError::PathNotFound(project_root.to_path_buf()));
        }
        if !self.fs.is_dir(project_root) {
            return Err(AnalyzerError::NotADirectory(project_root.to_path_buf()));
        }
        if !self.fs.is_file(&project_root.join(POM_FILE)) {
            return Err(AnalyzerError::MissingRootPom(project_root.to_path_buf()));
        }
        Ok(())
    }

    /// Depth-first over `<modules>`, in declaration order. `module_dir` must be normalized
    /// so that `sub/..` and its parent count as the same module.
    fn visit(
        &self,
        model: &BuildModel,
        module_dir: &Path,
        module_path: String,
        scope: &ProjectScope<'_>,
        walk: &mut Walk,
    ) {
        if !walk.visited.insert(module_dir.to_path_buf()) {
            warn!("Module {} visited twice, skipping", module_dir.display());
            return;
        }
        walk.total += 1;

        if model.packaging.is_deployable() {
            walk.modules
                .push(self.describe_module(model, module_dir, module_path.clone(), scope));
        } else {
            debug!(
                "Skipping {} with packaging {}",
                model.artifact_id, model.packaging
            );
        }

        for name in &model.modules {
            let child_dir = normalize_path(&module_dir.join(name));
            if walk.visited.contains(&child_dir) {
                warn!("Module {} declared again from {}, skipping", child_dir.display(), module_dir.display());
                continue;
            }
            let Some(child) = self.read_module(&child_dir, scope) else {
                continue;
            };
            let child_path = if module_path == "." {
                name.trim_end_matches('/').to_string()
            } else {
                format!("{}/{}", module_path, name.trim_end_matches('/'))
            };
            self.visit(&child, &child_dir, child_path, scope, walk);
        }
    }

    fn read_module(&self, module_dir: &Path, scope: &ProjectScope<'_>) -> Option<BuildModel> {
        let pom = module_dir.join(POM_FILE);
        if !self.fs.is_file(&pom) {
            warn!("Module directory {} has no pom.xml, skipping", module_dir.display());
            return None;
        }
        let content = match self.fs.read_to_string(&pom) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {:#}", pom.display(), e);
                return None;
            }
        };
        match parse_pom_with_properties(&content, scope.properties) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!("Failed to parse {}: {}", pom.display(), e);
                None
            }
        }
    }

    fn describe_module(
        &self,
        model: &BuildModel,
        module_dir: &Path,
        module_path: String,
        scope: &ProjectScope<'_>,
    ) -> DeployableModule {
        debug!("Describing module {} at {}", model.artifact_id, module_path);
        let fs = self.fs.as_ref();
        let mut module = DeployableModule::base(model, module_path);

        let executable = detect_executable(model, module_dir, fs);
        module.main_class = executable.main_class.clone();

        module.classifier = spring_boot_classifier(model);
        module.repository_path = repository_path(model, module.classifier.as_deref());
        module.repository_url = scope
            .repository_base
            .zip(module.repository_path.as_deref())
            .map(|(base, path)| repository_url(base, path));
        module.local_dependencies = local_dependencies(model, scope.group_id);
        module.container = detect_container(model, module_dir, fs);

        let ctx = ModuleContext {
            model,
            module_root: module_dir,
            project_root: scope.root,
            fs,
            executable: &executable,
            scan_sources: self.options.scan_sources,
        };
        for applied in self.registry.enrich(&ctx) {
            module.apply(applied);
        }

        if self.options.include_dependencies {
            module.dependencies = Some(DependencyReport::collect(
                model,
                &self.options.dependency_scopes,
            ));
        }
        if self.options.include_plugins {
            module.plugins = Some(PluginReport::collect(model, &self.options.plugins));
        }
        if self.options.include_properties {
            module.properties = Some(PropertyReport::collect(model, &self.options.properties));
        }

        if executable.executable || executable.executable_type.is_some() {
            module.executable = Some(executable);
        }
        module
    }
}

impl Default for ProjectAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
