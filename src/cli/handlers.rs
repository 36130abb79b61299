//! Command handlers. Each returns the process exit code.

use super::commands::{AnalyzeArgs, ConfigArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::analyzer::ProjectAnalyzer;
use crate::config::{parse_list, DescriptorConfig};
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info};

pub fn handle_analyze(args: &AnalyzeArgs, quiet: bool) -> i32 {
    match run_analyze(args, quiet) {
        Ok(()) => 0,
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

pub fn handle_config(args: &ConfigArgs) -> i32 {
    let config = DescriptorConfig::default();
    let formatter = OutputFormatter::new(OutputFormat::from(args.format));

    match formatter.format_config(&config) {
        Ok(output) => {
            println!("{}", output);
            if let Err(e) = config.validate() {
                eprintln!("Warning: {}", e);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

/// Environment configuration with command-line overrides applied.
pub fn effective_config(args: &AnalyzeArgs) -> DescriptorConfig {
    let mut config = DescriptorConfig::default();
    if args.include_dependencies {
        config.include_dependencies = true;
    }
    if args.include_plugins {
        config.include_plugins = true;
    }
    if let Some(scopes) = &args.scopes {
        config.dependency_scopes = parse_list(&scopes.join(","));
    }
    if args.no_source_scan {
        config.scan_sources = false;
    }
    if args.include_properties {
        config.include_properties = true;
    }
    if let Some(patterns) = &args.property_exclusions {
        config.property_exclusions = parse_list(&patterns.join(","));
    }
    if args.show_sensitive {
        config.filter_sensitive = false;
    }
    if args.drop_sensitive {
        config.mask_sensitive = false;
    }
    if args.no_plugin_configuration {
        config.include_plugin_configuration = false;
    }
    config
}

fn run_analyze(args: &AnalyzeArgs, quiet: bool) -> Result<()> {
    let config = effective_config(args);
    config.validate().context("Invalid configuration")?;
    debug!("Effective configuration: {:?}", config);

    let project_path = match &args.project_path {
        Some(path) => path.clone(),
        None => env::current_dir().context("Failed to determine current directory")?,
    };

    let analyzer = ProjectAnalyzer::new().with_options(config.analyzer_options());
    let descriptor = analyzer
        .analyze(&project_path)
        .with_context(|| format!("Failed to analyze {}", project_path.display()))?;

    let output = OutputFormatter::new(OutputFormat::from(args.format)).format(&descriptor)?;
    write_output(&output, args.output.as_ref())?;

    if let Some(path) = &args.output {
        if !quiet {
            info!(
                "Descriptor with {} deployable module(s) written to {}",
                descriptor.deployable_modules_count,
                path.display()
            );
        }
    }
    Ok(())
}

fn write_output(output: &str, target: Option<&PathBuf>) -> Result<()> {
    match target {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, output).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            println!("{}", output);
            Ok(())
        }
    }
}
