//! Quarkus framework detector
//!
//! Also serves as the reference for writing third-party detectors: applicability is a
//! cheap model query, enrichment returns only the fields it owns.

use super::{FrameworkDetector, ModuleContext, ModuleEnrichment};
use crate::detection::coordinates::{QUARKUS_GROUP, QUARKUS_PLUGIN};
use crate::detection::scan_profiles;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

const NATIVE_PROFILE: &str = "native";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarkusInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub native_build: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<String>,
}

pub struct QuarkusDetector;

impl FrameworkDetector for QuarkusDetector {
    fn name(&self) -> &str {
        "Quarkus"
    }

    fn priority(&self) -> i32 {
        90
    }

    fn is_applicable(&self, ctx: &ModuleContext<'_>) -> Result<bool> {
        Ok(ctx.model.has_dependency_group(QUARKUS_GROUP)
            || ctx.model.has_plugin(QUARKUS_GROUP, QUARKUS_PLUGIN))
    }

    fn enrich(&self, ctx: &ModuleContext<'_>) -> Result<ModuleEnrichment> {
        let model = ctx.model;
        let version = model
            .dependencies
            .iter()
            .filter(|d| d.group_id == QUARKUS_GROUP)
            .find_map(|d| d.version.clone())
            .or_else(|| {
                model
                    .find_plugin(QUARKUS_GROUP, QUARKUS_PLUGIN)
                    .and_then(|p| p.version.clone())
            })
            .or_else(|| model.property("quarkus.platform.version").map(str::to_string));

        let quarkus = QuarkusInfo {
            version,
            native_build: model.has_profile(NATIVE_PROFILE),
            profiles: scan_profiles(ctx.fs, ctx.module_root),
        };

        info!(
            "Detected Quarkus application {}: version={:?}, native={}, profiles={:?}",
            model.artifact_id, quarkus.version, quarkus.native_build, quarkus.profiles
        );

        Ok(ModuleEnrichment {
            build_plugins: vec![QUARKUS_PLUGIN.to_string()],
            quarkus: Some(quarkus),
            ..Default::default()
        })
    }
}
