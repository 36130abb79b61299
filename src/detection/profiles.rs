//! Profile-file scan of `src/main/resources`

use crate::fs::FileSystem;
use crate::maven::BuildModel;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

pub const RESOURCES_DIR: &str = "src/main/resources";

/// Directories, relative to the project root, where a local dependency module may live.
const LOCAL_MODULE_LOCATIONS: &[&str] = &["", "modules", "libs"];

fn profile_pattern() -> &'static Regex {
    static PROFILE_FILE: OnceLock<Regex> = OnceLock::new();
    PROFILE_FILE.get_or_init(|| {
        Regex::new(r"^application-([a-zA-Z0-9_-]+)\.(properties|yml|yaml)$")
            .expect("Invalid profile file regex")
    })
}

/// Profile name encoded in a file name such as `application-dev.yml`.
pub fn profile_from_file_name(name: &str) -> Option<&str> {
    profile_pattern()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Profiles of one module, in directory listing order. A profile present in several
/// formats is reported once. An unreadable resources directory yields no profiles.
pub fn scan_profiles(fs: &dyn FileSystem, module_root: &Path) -> Vec<String> {
    let resources = module_root.join(RESOURCES_DIR);
    if !fs.is_dir(&resources) {
        debug!("No resources directory at {}", resources.display());
        return Vec::new();
    }

    let entries = match fs.read_dir(&resources) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to scan {}: {:#}", resources.display(), e);
            return Vec::new();
        }
    };

    let mut profiles: Vec<String> = Vec::new();
    for entry in entries.iter().filter(|e| e.is_file()) {
        if let Some(profile) = profile_from_file_name(&entry.name) {
            if !profiles.iter().any(|p| p == profile) {
                debug!("Found profile '{}' in {}", profile, entry.name);
                profiles.push(profile.to_string());
            }
        }
    }
    profiles
}

/// Profiles of a module together with those of its local dependency modules,
/// sorted and deduplicated.
pub fn detect_profiles(
    fs: &dyn FileSystem,
    module_root: &Path,
    model: &BuildModel,
    project_root: &Path,
) -> Vec<String> {
    let mut profiles: BTreeSet<String> = scan_profiles(fs, module_root).into_iter().collect();

    for dependency in &model.dependencies {
        if let Some(local) = locate_local_module(fs, project_root, &dependency.artifact_id) {
            debug!("Scanning local dependency module {}", dependency.artifact_id);
            profiles.extend(scan_profiles(fs, &local));
        }
    }

    profiles.into_iter().collect()
}

/// Directory of a sibling module named `artifact_id`, if it exists with a `pom.xml`.
pub fn locate_local_module(
    fs: &dyn FileSystem,
    project_root: &Path,
    artifact_id: &str,
) -> Option<std::path::PathBuf> {
    LOCAL_MODULE_LOCATIONS
        .iter()
        .map(|location| project_root.join(location).join(artifact_id))
        .find(|candidate| fs.is_dir(candidate) && fs.is_file(&candidate.join("pom.xml")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::maven::{Dependency, Packaging};

    #[test]
    fn test_profile_from_file_name() {
        assert_eq!(profile_from_file_name("application-dev.properties"), Some("dev"));
        assert_eq!(profile_from_file_name("application-prod_eu.yaml"), Some("prod_eu"));
        assert_eq!(profile_from_file_name("application.yml"), None);
        assert_eq!(profile_from_file_name("application-dev.json"), None);
        assert_eq!(profile_from_file_name("bootstrap-dev.yml"), None);
    }

    #[test]
    fn test_scan_profiles_extension_agnostic() {
        let fs = MockFileSystem::new();
        fs.add_file("app/src/main/resources/application-dev.properties", "");
        fs.add_file("app/src/main/resources/application-prod.yml", "");
        fs.add_file("app/src/main/resources/application-test.yaml", "");
        fs.add_file("app/src/main/resources/application.yml", "");
        fs.add_file("app/src/main/resources/logback.xml", "");

        let profiles = scan_profiles(&fs, Path::new("/mock/app"));
        assert_eq!(profiles, vec!["dev", "prod", "test"]);
    }

    #[test]
    fn test_scan_profiles_same_profile_in_two_formats() {
        let fs = MockFileSystem::new();
        fs.add_file("src/main/resources/application-dev.properties", "");
        fs.add_file("src/main/resources/application-dev.yml", "");

        assert_eq!(scan_profiles(&fs, Path::new("/mock")), vec!["dev"]);
    }

    #[test]
    fn test_unreadable_resources_yield_no_profiles() {
        let fs = MockFileSystem::new();
        fs.add_file("src/main/resources/application-dev.yml", "");
        fs.make_unreadable("src/main/resources");

        assert!(scan_profiles(&fs, Path::new("/mock")).is_empty());
    }

    #[test]
    fn test_detect_profiles_includes_local_dependencies() {
        let fs = MockFileSystem::new();
        fs.add_file("api/src/main/resources/application-prod.yml", "");
        fs.add_file("api/src/main/resources/application-dev.yml", "");
        fs.add_file("modules/shared/pom.xml", "<project/>");
        fs.add_file("modules/shared/src/main/resources/application-cloud.yml", "");
        fs.add_file("modules/shared/src/main/resources/application-dev.yml", "");
        // no pom.xml: not a module
        fs.add_file("libs/orphan/src/main/resources/application-orphan.yml", "");

        let model = BuildModel::new("api", Packaging::Jar)
            .with_dependency(Dependency::new("com.acme", "shared"))
            .with_dependency(Dependency::new("com.acme", "orphan"));

        let profiles = detect_profiles(&fs, Path::new("/mock/api"), &model, Path::new("/mock"));
        assert_eq!(profiles, vec!["cloud", "dev", "prod"]);
    }
}
