//! Main-class heuristic: locate the source file annotated as the application entry point.

use crate::fs::FileSystem;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

pub const SPRING_BOOT_ANNOTATION: &str = "@SpringBootApplication";

const SOURCE_ROOTS: &[&str] = &["src/main/java", "src/main/kotlin"];
const SOURCE_EXTENSIONS: &[&str] = &["java", "kt"];

/// Scans the module's main source roots for a class carrying `annotation` and returns its
/// fully-qualified name. Files are visited in sorted path order, first hit wins.
pub fn find_annotated_class(fs: &dyn FileSystem, module_root: &Path, annotation: &str) -> Option<String> {
    for root in SOURCE_ROOTS {
        let dir = module_root.join(root);
        if !fs.is_dir(&dir) {
            continue;
        }
        let files = match fs.walk_files(&dir) {
            Ok(files) => files,
            Err(e) => {
                warn!("Failed to scan {}: {:#}", dir.display(), e);
                continue;
            }
        };

        for file in files {
            let is_source = file
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| SOURCE_EXTENSIONS.contains(&e))
                .unwrap_or(false);
            if !is_source {
                continue;
            }
            let Ok(content) = fs.read_to_string(&file) else {
                continue;
            };
            if let Some(class) = qualified_class_name(&content, annotation) {
                debug!("Found {} on {} in {}", annotation, class, file.display());
                return Some(class);
            }
        }
    }
    None
}

/// `package.Class` of the first class declared after `annotation` in a source file.
pub fn qualified_class_name(source: &str, annotation: &str) -> Option<String> {
    static PACKAGE: OnceLock<Regex> = OnceLock::new();
    static CLASS: OnceLock<Regex> = OnceLock::new();
    let package_re = PACKAGE.get_or_init(|| {
        Regex::new(r"(?m)^\s*package\s+([A-Za-z_][\w.]*)\s*;?").expect("Invalid package regex")
    });
    let class_re = CLASS.get_or_init(|| {
        Regex::new(r"\b(?:class|object)\s+([A-Za-z_]\w*)").expect("Invalid class regex")
    });

    let position = find_annotation(source, annotation)?;
    let class = class_re.captures(&source[position..])?.get(1)?.as_str();

    Some(match package_re.captures(source).and_then(|c| c.get(1)) {
        Some(package) => format!("{}.{}", package.as_str(), class),
        None => class.to_string(),
    })
}

/// Byte offset of `annotation` used as a whole annotation name (not a prefix of a longer one).
fn find_annotation(source: &str, annotation: &str) -> Option<usize> {
    source.match_indices(annotation).find_map(|(idx, _)| {
        let next = source[idx + annotation.len()..].chars().next();
        match next {
            Some(c) if c.is_alphanumeric() || c == '_' => None,
            _ => Some(idx),
        }
    })
}
