//! Output formatting for multiple formats
//!
//! JSON and YAML render the descriptor as-is; the human format is a condensed
//! per-module summary.

use anyhow::{Context, Result};

use crate::analyzer::{DeployableModule, ProjectDescriptor};
use crate::config::DescriptorConfig;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, descriptor: &ProjectDescriptor) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(descriptor)
                .context("Failed to serialize descriptor to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(descriptor).context("Failed to serialize descriptor to YAML")
            }
            OutputFormat::Human => Ok(self.format_human(descriptor)),
        }
    }

    pub fn format_config(&self, config: &DescriptorConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config.to_display_map())
                .context("Failed to serialize config to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(&config.to_display_map())
                .context("Failed to serialize config to YAML"),
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn format_human(&self, descriptor: &ProjectDescriptor) -> String {
        let mut output = String::new();

        output.push_str("\u{2713} Deployment Descriptor\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        let coordinates = [
            descriptor.project_group_id.as_deref(),
            Some(descriptor.project_artifact_id.as_str()),
            descriptor.project_version.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(":");
        output.push_str(&format!("Project:    {}\n", coordinates));
        if let Some(name) = &descriptor.project_name {
            output.push_str(&format!("Name:       {}\n", name));
        }
        if let Some(url) = &descriptor.maven_repository_url {
            output.push_str(&format!("Repository: {}\n", url));
        }
        output.push_str(&format!(
            "Modules:    {} deployable of {}\n",
            descriptor.deployable_modules_count, descriptor.total_modules
        ));

        for module in &descriptor.deployable_modules {
            output.push('\n');
            format_module(&mut output, module);
        }

        let warnings: Vec<(&str, &str)> = descriptor
            .deployable_modules
            .iter()
            .filter_map(|m| {
                m.executable
                    .as_ref()
                    .and_then(|e| e.warning.as_deref())
                    .map(|w| (m.artifact_id.as_str(), w))
            })
            .collect();
        if !warnings.is_empty() {
            output.push_str("\n\u{26A0} Warnings:\n");
            for (module, warning) in warnings {
                output.push_str(&format!("  - {}: {}\n", module, warning));
            }
        }

        output
    }
}

fn format_module(output: &mut String, module: &DeployableModule) {
    output.push_str(&format!(
        "{} ({}) [{}]\n",
        module.artifact_id, module.packaging, module.module_path
    ));

    let mut lines: Vec<String> = Vec::new();
    match &module.executable {
        Some(executable) if executable.executable => {
            let method = executable.method.as_deref().unwrap_or("unknown");
            lines.push(format!("Executable: yes ({})", method));
        }
        Some(executable) if executable.deployment_only => {
            lines.push("Executable: no (deployment only)".to_string());
        }
        _ => lines.push("Executable: no".to_string()),
    }
    if let Some(structure) = module.executable.as_ref().and_then(|e| e.structure) {
        lines.push(format!("Structure:  {}", structure.as_str()));
    }
    if let Some(run_command) = module.executable.as_ref().and_then(|e| e.run_command.as_deref()) {
        lines.push(format!("Run:        {}", run_command));
    }
    if let Some(main_class) = &module.main_class {
        lines.push(format!("Main class: {}", main_class));
    }
    if let Some(java_version) = &module.java_version {
        lines.push(format!("Java:       {}", java_version));
    }
    if let Some(container) = &module.container {
        let image = container.image.as_deref().unwrap_or("(unnamed)");
        match &container.tag {
            Some(tag) => lines.push(format!("Image:      {}:{} via {}", image, tag, container.tool)),
            None => lines.push(format!("Image:      {} via {}", image, container.tool)),
        }
    }
    if !module.frameworks.is_empty() {
        lines.push(format!("Frameworks: {}", module.frameworks.join(", ")));
    }
    if let Some(environments) = &module.environments {
        let profiles: Vec<&str> = environments.iter().map(|e| e.profile.as_str()).collect();
        lines.push(format!("Profiles:   {}", profiles.join(", ")));
    }

    for (i, line) in lines.iter().enumerate() {
        let connector = if i == lines.len() - 1 { "\u{2514}" } else { "\u{251C}" };
        output.push_str(&format!("{}\u{2500} {}\n", connector, line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::DeployableModule;
    use crate::detection::{ContainerInfo, ContainerTool, ExecutableInfo, ExecutableType};
    use crate::maven::Packaging;
    use chrono::{TimeZone, Utc};

    fn create_test_descriptor() -> ProjectDescriptor {
        let mut container = ContainerInfo::new(ContainerTool::Jib);
        container.image = Some("ghcr.io/acme/orders".to_string());
        container.tag = Some("1.0.0".to_string());

        let module = DeployableModule {
            group_id: Some("com.acme".to_string()),
            artifact_id: "orders".to_string(),
            version: Some("1.0.0".to_string()),
            packaging: Packaging::War,
            module_path: "orders".to_string(),
            final_name: None,
            classifier: None,
            repository_path: None,
            repository_url: None,
            java_version: Some("17".to_string()),
            spring_boot_executable: false,
            main_class: None,
            local_dependencies: Vec::new(),
            build_plugins: Vec::new(),
            environments: None,
            executable: Some(ExecutableInfo {
                warning: Some("spring-boot-maven-plugin is missing".to_string()),
                ..ExecutableInfo::deployment_only(ExecutableType::War, "spring-boot-dependencies (no plugin)")
            }),
            container: Some(container),
            frameworks: vec!["Spring Boot".to_string()],
            quarkus: None,
            dependencies: None,
            plugins: None,
            properties: None,
        };

        ProjectDescriptor {
            project_group_id: Some("com.acme".to_string()),
            project_artifact_id: "shop".to_string(),
            project_version: Some("1.0.0".to_string()),
            project_name: None,
            project_description: None,
            generated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            maven_repository_url: None,
            deployable_modules: vec![module],
            total_modules: 2,
            deployable_modules_count: 1,
        }
    }

    #[test]
    fn test_json_format() {
        let descriptor = create_test_descriptor();
        let output = OutputFormatter::new(OutputFormat::Json).format(&descriptor).unwrap();

        assert!(output.contains("\"projectArtifactId\": \"shop\""));
        assert!(output.contains("\"deploymentOnly\": true"));
        assert!(!output.contains("projectName"));

        let parsed: ProjectDescriptor = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, descriptor);
    }

    #[test]
    fn test_yaml_format() {
        let descriptor = create_test_descriptor();
        let output = OutputFormatter::new(OutputFormat::Yaml).format(&descriptor).unwrap();

        assert!(output.contains("projectArtifactId: shop"));
        assert!(output.contains("tool: jib"));
    }

    #[test]
    fn test_human_format() {
        let descriptor = create_test_descriptor();
        let output = OutputFormatter::new(OutputFormat::Human).format(&descriptor).unwrap();

        assert!(output.contains("Project:    com.acme:shop:1.0.0"));
        assert!(output.contains("1 deployable of 2"));
        assert!(output.contains("orders (war) [orders]"));
        assert!(output.contains("Executable: no (deployment only)"));
        assert!(output.contains("Image:      ghcr.io/acme/orders:1.0.0 via jib"));
        assert!(output.contains("Warnings:"));
        assert!(output.contains("orders: spring-boot-maven-plugin is missing"));
    }
}
