//! Spring Boot framework detector

use super::{FrameworkDetector, ModuleContext, ModuleEnrichment};
use crate::detection::coordinates::{SPRING_BOOT_GROUP, SPRING_BOOT_PLUGIN};
use crate::detection::executable::spring_boot_configured_main_class;
use crate::detection::main_class::{find_annotated_class, SPRING_BOOT_ANNOTATION};
use crate::detection::metadata::has_actuator;
use crate::detection::{detect_environments, detect_profiles};
use anyhow::Result;
use tracing::debug;

pub struct SpringBootDetector;

impl SpringBootDetector {
    pub fn new() -> Self {
        Self
    }

    /// `None` when the executable rules already named the main class.
    fn resolve_main_class(&self, ctx: &ModuleContext<'_>) -> Option<String> {
        if ctx.executable.main_class.is_some() {
            return None;
        }
        if let Some(main_class) = spring_boot_configured_main_class(ctx.model) {
            return Some(main_class);
        }
        if !ctx.scan_sources {
            return None;
        }
        find_annotated_class(ctx.fs, ctx.module_root, SPRING_BOOT_ANNOTATION)
    }
}

impl Default for SpringBootDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameworkDetector for SpringBootDetector {
    fn name(&self) -> &str {
        "Spring Boot"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn is_applicable(&self, ctx: &ModuleContext<'_>) -> Result<bool> {
        Ok(ctx.executable.spring_boot_application
            || ctx.model.has_plugin(SPRING_BOOT_GROUP, SPRING_BOOT_PLUGIN)
            || ctx.model.has_dependency_group(SPRING_BOOT_GROUP))
    }

    fn enrich(&self, ctx: &ModuleContext<'_>) -> Result<ModuleEnrichment> {
        let main_class = self.resolve_main_class(ctx);
        let profiles = detect_profiles(ctx.fs, ctx.module_root, ctx.model, ctx.project_root);
        let environments = detect_environments(ctx.fs, ctx.module_root, &profiles, has_actuator(ctx.model));

        debug!(
            "Spring Boot module {}: main class {:?}, profiles {:?}",
            ctx.model.artifact_id, main_class, profiles
        );

        Ok(ModuleEnrichment {
            spring_boot_executable: Some(true),
            main_class,
            environments: (!environments.is_empty()).then_some(environments),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{detect_executable, ExecutableInfo};
    use crate::fs::MockFileSystem;
    use crate::maven::{BuildModel, Dependency, Packaging, Plugin};
    use std::path::Path;

    fn context<'a>(
        model: &'a BuildModel,
        fs: &'a MockFileSystem,
        executable: &'a ExecutableInfo,
        scan_sources: bool,
    ) -> ModuleContext<'a> {
        ModuleContext {
            model,
            module_root: Path::new("/mock/orders"),
            project_root: Path::new("/mock"),
            fs,
            executable,
            scan_sources,
        }
    }

    fn boot_app() -> BuildModel {
        BuildModel::new("orders", Packaging::Jar)
            .with_coordinates("com.acme", "1.0")
            .with_plugin(Plugin::new(SPRING_BOOT_GROUP, SPRING_BOOT_PLUGIN))
            .with_dependency(Dependency::new(SPRING_BOOT_GROUP, "spring-boot-starter-actuator"))
            .with_dependency(Dependency::new("com.acme", "shared"))
    }

    #[test]
    fn test_not_applicable_without_spring_signal() {
        let fs = MockFileSystem::new();
        let model = BuildModel::new("plain", Packaging::Jar);
        let executable = ExecutableInfo::not_executable();
        let ctx = context(&model, &fs, &executable, true);
        assert!(!SpringBootDetector::new().is_applicable(&ctx).unwrap());
    }

    #[test]
    fn test_enrich_scans_sources_and_profiles() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "orders/src/main/java/com/acme/orders/OrdersApp.java",
            "package com.acme.orders;\n@SpringBootApplication\npublic class OrdersApp {}\n",
        );
        fs.add_file("orders/src/main/resources/application.yml", "server:\n  port: 8080\n");
        fs.add_file("orders/src/main/resources/application-prod.yml", "server:\n  port: 80\n");
        fs.add_file("shared/pom.xml", "<project/>");
        fs.add_file("shared/src/main/resources/application-cloud.properties", "server.port=9090\n");

        let model = boot_app();
        let executable = detect_executable(&model, Path::new("/mock/orders"), &fs);
        let ctx = context(&model, &fs, &executable, true);

        let detector = SpringBootDetector::new();
        assert!(detector.is_applicable(&ctx).unwrap());
        let enrichment = detector.enrich(&ctx).unwrap();

        assert_eq!(enrichment.spring_boot_executable, Some(true));
        assert_eq!(enrichment.main_class.as_deref(), Some("com.acme.orders.OrdersApp"));

        let environments = enrichment.environments.unwrap();
        let profiles: Vec<&str> = environments.iter().map(|e| e.profile.as_str()).collect();
        assert_eq!(profiles, vec!["cloud", "prod"]);
        // the cloud profile file lives in the dependency module, so only common settings apply
        assert_eq!(environments[0].server_port, Some(8080));
        assert_eq!(environments[1].server_port, Some(80));
        assert_eq!(environments[1].actuator_health_path.as_deref(), Some("/actuator/health"));
    }

    #[test]
    fn test_source_scan_can_be_disabled() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "orders/src/main/java/App.java",
            "@SpringBootApplication\nclass App {}\n",
        );
        let model = boot_app();
        let executable = ExecutableInfo::not_executable();
        let ctx = context(&model, &fs, &executable, false);

        let enrichment = SpringBootDetector::new().enrich(&ctx).unwrap();
        assert_eq!(enrichment.main_class, None);
        assert_eq!(enrichment.environments, None);
    }

    #[test]
    fn test_executable_main_class_is_kept() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "orders/src/main/java/App.java",
            "@SpringBootApplication\nclass App {}\n",
        );
        let model = boot_app();
        let executable = ExecutableInfo {
            main_class: Some("com.acme.Shaded".to_string()),
            ..ExecutableInfo::not_executable()
        };
        let ctx = context(&model, &fs, &executable, true);

        let enrichment = SpringBootDetector::new().enrich(&ctx).unwrap();
        assert_eq!(enrichment.main_class, None);
    }
}
