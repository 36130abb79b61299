//! Maven build model: POM reading, plugin configuration trees, and the query surface
//! the detectors run against.

pub mod config;
pub mod model;
pub mod pom;

pub use config::ConfigValue;
pub use model::{
    BuildModel, Dependency, Packaging, ParentRef, Plugin, PluginExecution, Profile,
    DEFAULT_PLUGIN_GROUP,
};
pub use pom::{parse_pom, parse_pom_with_properties, PomError};
