//! Per-module detectors
//!
//! Every detector takes an immutable [`BuildModel`](crate::maven::BuildModel) plus the
//! module's filesystem root and returns a plain value. Filesystem failures are logged and
//! degrade to "nothing found"; none of these functions return errors.

pub mod container;
pub mod environment;
pub mod executable;
pub mod main_class;
pub mod metadata;
pub mod profiles;

pub use container::{detect_container, ContainerInfo, ContainerTool};
pub use environment::{detect_environments, EnvironmentConfig};
pub use executable::{detect_executable, ArtifactStructure, ExecutableInfo, ExecutableType};
pub use main_class::find_annotated_class;
pub use profiles::{detect_profiles, scan_profiles};

/// Plugin and dependency coordinates the detectors look for.
pub mod coordinates {
    pub const MAVEN_PLUGINS: &str = crate::maven::DEFAULT_PLUGIN_GROUP;

    pub const SPRING_BOOT_GROUP: &str = "org.springframework.boot";
    pub const SPRING_BOOT_PLUGIN: &str = "spring-boot-maven-plugin";
    pub const SPRING_BOOT_ACTUATOR: &str = "spring-boot-starter-actuator";

    pub const QUARKUS_GROUP: &str = "io.quarkus";
    pub const QUARKUS_PLUGIN: &str = "quarkus-maven-plugin";

    pub const SHADE_PLUGIN: &str = "maven-shade-plugin";
    pub const ASSEMBLY_PLUGIN: &str = "maven-assembly-plugin";
    pub const JAR_PLUGIN: &str = "maven-jar-plugin";
    pub const DEPENDENCY_PLUGIN: &str = "maven-dependency-plugin";
    pub const WAR_PLUGIN: &str = "maven-war-plugin";
    pub const EAR_PLUGIN: &str = "maven-ear-plugin";
    pub const COMPILER_PLUGIN: &str = "maven-compiler-plugin";

    pub const ONEJAR_GROUP: &str = "com.jolira";
    pub const ONEJAR_PLUGIN: &str = "onejar-maven-plugin";

    pub const JETTY_GROUP: &str = "org.eclipse.jetty";
    pub const JETTY_PLUGIN: &str = "jetty-maven-plugin";
    pub const TOMCAT_GROUP: &str = "org.apache.tomcat.maven";
    pub const TOMCAT_PLUGINS: &[&str] = &["tomcat7-maven-plugin", "tomcat8-maven-plugin"];

    pub const JIB_GROUP: &str = "com.google.cloud.tools";
    pub const JIB_PLUGIN: &str = "jib-maven-plugin";
    pub const FABRIC8_GROUP: &str = "io.fabric8";
    pub const FABRIC8_PLUGIN: &str = "docker-maven-plugin";
    pub const MICRONAUT_GROUP: &str = "io.micronaut.maven";
    pub const MICRONAUT_PLUGIN: &str = "micronaut-maven-plugin";
    pub const JKUBE_GROUP: &str = "org.eclipse.jkube";
    pub const JKUBE_PLUGINS: &[&str] = &["kubernetes-maven-plugin", "openshift-maven-plugin"];
    pub const DOCKERFILE_GROUP: &str = "com.spotify";
    pub const DOCKERFILE_PLUGIN: &str = "dockerfile-maven-plugin";
}
