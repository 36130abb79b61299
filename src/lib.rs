//! deploy-manifest - deployment descriptors for Maven multi-module projects
//!
//! Reads a project's POM files and describes each deployable module: how it is
//! packaged, whether and how it runs standalone, which container image its build
//! produces, and which environment profiles it exposes.
//!
//! # Example Usage
//!
//! ```no_run
//! use deploy_manifest::ProjectAnalyzer;
//! use std::path::Path;
//!
//! let descriptor = ProjectAnalyzer::new().analyze(Path::new("/path/to/project"))?;
//! for module in &descriptor.deployable_modules {
//!     println!("{} executable={}", module.artifact_id, module.is_executable());
//! }
//! # Ok::<(), deploy_manifest::AnalyzerError>(())
//! ```
//!
//! Detectors can also be run on a single build model:
//!
//! ```
//! use deploy_manifest::fs::MockFileSystem;
//! use deploy_manifest::maven::parse_pom;
//! use deploy_manifest::detect_executable;
//! use std::path::Path;
//!
//! let model = parse_pom("<project><artifactId>parent</artifactId><packaging>pom</packaging></project>").unwrap();
//! let info = detect_executable(&model, Path::new("/mock"), &MockFileSystem::new());
//! assert!(!info.executable);
//! ```
//!
//! # Project Structure
//!
//! - [`maven`]: POM reading and the build model query surface
//! - [`detection`]: executable, container, profile and environment detection
//! - [`frameworks`]: pluggable framework detectors (Spring Boot, Quarkus)
//! - [`analyzer`]: module tree walk and descriptor assembly

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod detection;
pub mod frameworks;
pub mod fs;
pub mod maven;
pub mod reports;
pub mod util;

pub use analyzer::{AnalyzerError, AnalyzerOptions, DeployableModule, ProjectAnalyzer, ProjectDescriptor};
pub use config::{ConfigError, DescriptorConfig};
pub use detection::{detect_container, detect_executable, ContainerInfo, ExecutableInfo};
pub use frameworks::{FrameworkDetector, FrameworkRegistry, ModuleContext, ModuleEnrichment};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
