//! Container image detection over complete POM documents.

use deploy_manifest::detection::{detect_container, ContainerTool};
use deploy_manifest::fs::MockFileSystem;
use deploy_manifest::maven::parse_pom;
use std::path::Path;

fn pom_with_plugins(plugins: &str) -> String {
    format!(
        r#"<project>
  <groupId>com.acme</groupId>
  <artifactId>demo</artifactId>
  <version>1.0.0</version>
  <build><plugins>{}</plugins></build>
</project>"#,
        plugins
    )
}

#[test]
fn test_jib_image_and_tags() {
    let content = pom_with_plugins(
        r#"<plugin>
  <groupId>com.google.cloud.tools</groupId>
  <artifactId>jib-maven-plugin</artifactId>
  <configuration>
    <from><image>eclipse-temurin:17-jre</image></from>
    <to>
      <image>ghcr.io/acme/demo</image>
      <tags><tag>1.0.0</tag><tag>latest</tag></tags>
    </to>
  </configuration>
</plugin>"#,
    );
    let model = parse_pom(&content).unwrap();
    let info = detect_container(&model, Path::new("/mock"), &MockFileSystem::new()).unwrap();

    assert_eq!(info.tool, ContainerTool::Jib);
    assert_eq!(info.image.as_deref(), Some("ghcr.io/acme/demo"));
    assert_eq!(info.registry.as_deref(), Some("ghcr.io"));
    assert_eq!(info.group.as_deref(), Some("acme"));
    assert_eq!(info.tag.as_deref(), Some("1.0.0"));
    assert_eq!(info.additional_tags, Some(vec!["latest".to_string()]));
    assert_eq!(info.base_image.as_deref(), Some("eclipse-temurin:17-jre"));
    assert_eq!(info.publish, None);
}

#[test]
fn test_spring_boot_build_image() {
    let content = pom_with_plugins(
        r#"<plugin>
  <groupId>org.springframework.boot</groupId>
  <artifactId>spring-boot-maven-plugin</artifactId>
  <configuration>
    <image>
      <name>docker.io/acme/demo</name>
      <builder>paketobuildpacks/builder-jammy-base</builder>
      <runImage>paketobuildpacks/run-jammy-base</runImage>
      <publish>true</publish>
    </image>
  </configuration>
  <executions><execution><goals><goal>build-image</goal></goals></execution></executions>
</plugin>"#,
    );
    let model = parse_pom(&content).unwrap();
    let info = detect_container(&model, Path::new("/mock"), &MockFileSystem::new()).unwrap();

    assert_eq!(info.tool, ContainerTool::SpringBoot);
    assert_eq!(info.builder_image.as_deref(), Some("paketobuildpacks/builder-jammy-base"));
    assert_eq!(info.run_image.as_deref(), Some("paketobuildpacks/run-jammy-base"));
    assert_eq!(info.publish, Some(true));
    assert_eq!(info.registry.as_deref(), Some("docker.io"));

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["tool"], "spring-boot");
}

#[test]
fn test_spring_boot_build_image_without_name() {
    let content = pom_with_plugins(
        r#"<plugin>
  <groupId>org.springframework.boot</groupId>
  <artifactId>spring-boot-maven-plugin</artifactId>
  <configuration>
    <image>
      <builder>paketobuildpacks/builder-jammy-base</builder>
      <runImage>paketobuildpacks/run-jammy-base</runImage>
      <publish>true</publish>
    </image>
  </configuration>
  <executions><execution><goals><goal>build-image</goal></goals></execution></executions>
</plugin>"#,
    );
    let model = parse_pom(&content).unwrap();
    let info = detect_container(&model, Path::new("/mock"), &MockFileSystem::new()).unwrap();

    assert_eq!(info.tool, ContainerTool::SpringBoot);
    assert_eq!(info.image, None);
    assert_eq!(info.tag, None);
    assert_eq!(info.registry, None);
    assert_eq!(info.group, None);
    assert_eq!(info.builder_image.as_deref(), Some("paketobuildpacks/builder-jammy-base"));
    assert_eq!(info.run_image.as_deref(), Some("paketobuildpacks/run-jammy-base"));
    assert_eq!(info.publish, Some(true));
}

#[test]
fn test_jib_wins_over_fabric8() {
    let content = pom_with_plugins(
        r#"<plugin>
  <groupId>io.fabric8</groupId>
  <artifactId>docker-maven-plugin</artifactId>
  <configuration><images><image><name>acme/from-fabric8</name></image></images></configuration>
</plugin>
<plugin>
  <groupId>com.google.cloud.tools</groupId>
  <artifactId>jib-maven-plugin</artifactId>
  <configuration><to><image>acme/from-jib</image></to></configuration>
</plugin>"#,
    );
    let model = parse_pom(&content).unwrap();
    let info = detect_container(&model, Path::new("/mock"), &MockFileSystem::new()).unwrap();

    assert_eq!(info.tool, ContainerTool::Jib);
    assert_eq!(info.registry, None);
    assert_eq!(info.group.as_deref(), Some("acme"));
}

#[test]
fn test_quarkus_falls_back_to_application_properties() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "src/main/resources/application.properties",
        "quarkus.container-image.registry=quay.io\n\
         quarkus.container-image.group=acme\n\
         quarkus.container-image.name=stock\n\
         quarkus.container-image.tag=2.1\n",
    );
    let content = pom_with_plugins(
        "<plugin><groupId>io.quarkus</groupId><artifactId>quarkus-maven-plugin</artifactId></plugin>",
    );
    let model = parse_pom(&content).unwrap();
    let info = detect_container(&model, Path::new("/mock"), &fs).unwrap();

    assert_eq!(info.tool, ContainerTool::Quarkus);
    assert_eq!(info.image.as_deref(), Some("quay.io/acme/stock"));
    assert_eq!(info.tag.as_deref(), Some("2.1"));
    assert_eq!(info.additional_tags, None);
}

#[test]
fn test_micronaut_docker_settings() {
    let content = pom_with_plugins(
        r#"<plugin>
  <groupId>io.micronaut.maven</groupId>
  <artifactId>micronaut-maven-plugin</artifactId>
  <configuration>
    <dockerRegistry>registry.acme.com</dockerRegistry>
    <dockerName>catalog</dockerName>
    <dockerTag>3.0</dockerTag>
    <dockerExtraTags><tag>3</tag><tag>latest</tag></dockerExtraTags>
  </configuration>
</plugin>"#,
    );
    let model = parse_pom(&content).unwrap();
    let info = detect_container(&model, Path::new("/mock"), &MockFileSystem::new()).unwrap();

    assert_eq!(info.tool, ContainerTool::Micronaut);
    assert_eq!(info.image.as_deref(), Some("registry.acme.com/catalog"));
    assert_eq!(info.tag.as_deref(), Some("3.0"));
    assert_eq!(info.additional_tags, Some(vec!["3".to_string(), "latest".to_string()]));
}

#[test]
fn test_module_without_container_tool() {
    let model = parse_pom(&pom_with_plugins("")).unwrap();
    assert_eq!(detect_container(&model, Path::new("/mock"), &MockFileSystem::new()), None);
}
