//! Ordered registry of framework detectors

use super::{FrameworkDetector, ModuleContext, ModuleEnrichment, QuarkusDetector, SpringBootDetector};
use std::cmp::Reverse;
use tracing::{debug, warn};

/// Enrichment produced by one applicable detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedFramework {
    pub name: String,
    pub enrichment: ModuleEnrichment,
}

/// Registry of framework detectors, kept sorted by priority (descending).
pub struct FrameworkRegistry {
    detectors: Vec<Box<dyn FrameworkDetector>>,
}

impl FrameworkRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self { detectors: Vec::new() }
    }

    /// Registry with the built-in Spring Boot and Quarkus detectors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(SpringBootDetector::new()));
        registry.register(Box::new(QuarkusDetector));
        registry
    }

    /// Adds a detector. Detectors with equal priority run in registration order.
    pub fn register(&mut self, detector: Box<dyn FrameworkDetector>) {
        debug!(
            "Registered framework detector '{}' (priority {})",
            detector.name(),
            detector.priority()
        );
        self.detectors.push(detector);
        // stable: ties keep registration order
        self.detectors.sort_by_key(|d| Reverse(d.priority()));
    }

    pub fn detectors(&self) -> &[Box<dyn FrameworkDetector>] {
        &self.detectors
    }

    pub fn names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Runs every applicable detector in priority order. Failures stay local to the
    /// detector that produced them.
    pub fn enrich(&self, ctx: &ModuleContext<'_>) -> Vec<AppliedFramework> {
        let mut applied = Vec::new();

        for detector in &self.detectors {
            match detector.is_applicable(ctx) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    debug!(
                        "Framework detector '{}' failed applicability check for {}: {:#}",
                        detector.name(),
                        ctx.model.artifact_id,
                        e
                    );
                    continue;
                }
            }

            match detector.enrich(ctx) {
                Ok(enrichment) => {
                    debug!("Framework '{}' applied to {}", detector.name(), ctx.model.artifact_id);
                    applied.push(AppliedFramework {
                        name: detector.name().to_string(),
                        enrichment,
                    });
                }
                Err(e) => warn!(
                    "Framework detector '{}' failed to enrich {}: {:#}",
                    detector.name(),
                    ctx.model.artifact_id,
                    e
                ),
            }
        }

        applied
    }
}

impl Default for FrameworkRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
