//! Framework detectors
//!
//! A framework detector decides whether it applies to a module and, if so, returns a
//! [`ModuleEnrichment`]: a sparse record holding only the fields it sets. Detectors never
//! mutate the module themselves; the analyzer folds enrichments in priority order.

pub mod quarkus;
pub mod registry;
pub mod spring_boot;

pub use quarkus::{QuarkusDetector, QuarkusInfo};
pub use registry::FrameworkRegistry;
pub use spring_boot::SpringBootDetector;

use crate::detection::{EnvironmentConfig, ExecutableInfo};
use crate::fs::FileSystem;
use crate::maven::BuildModel;
use anyhow::Result;
use std::path::Path;

/// Everything a detector may look at for one module.
pub struct ModuleContext<'a> {
    pub model: &'a BuildModel,
    pub module_root: &'a Path,
    pub project_root: &'a Path,
    pub fs: &'a dyn FileSystem,
    /// Verdict of the executable detector for this module
    pub executable: &'a ExecutableInfo,
    /// Whether detectors may scan source files
    pub scan_sources: bool,
}

/// Partial update of a deployable module.
///
/// Scalars overwrite when set, `build_plugins` append without duplicates,
/// `environments` replace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleEnrichment {
    pub spring_boot_executable: Option<bool>,
    pub main_class: Option<String>,
    pub environments: Option<Vec<EnvironmentConfig>>,
    pub build_plugins: Vec<String>,
    pub quarkus: Option<QuarkusInfo>,
}

impl ModuleEnrichment {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Pluggable framework detector.
///
/// Higher `priority` runs first; equal priorities keep registration order.
pub trait FrameworkDetector: Send + Sync {
    fn name(&self) -> &str;

    fn priority(&self) -> i32 {
        0
    }

    /// An `Err` is treated as "not applicable".
    fn is_applicable(&self, ctx: &ModuleContext<'_>) -> Result<bool>;

    /// An `Err` drops this detector's enrichment; other detectors are unaffected.
    fn enrich(&self, ctx: &ModuleContext<'_>) -> Result<ModuleEnrichment>;
}
