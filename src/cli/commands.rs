use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Deployment descriptor generator for Maven multi-module projects
#[derive(Parser, Debug)]
#[command(
    name = "deploy-manifest",
    about = "Deployment descriptor generator for Maven multi-module projects",
    version,
    long_about = "deploy-manifest reads a Maven project's POM files and describes every \
                  deployable module: packaging, how it runs, which container image it \
                  produces and which environment profiles it exposes."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate the deployment descriptor of a Maven project",
        long_about = "Walks the module tree from the root pom.xml and reports every \
                      deployable module.\n\n\
                      Examples:\n  \
                      deploy-manifest analyze\n  \
                      deploy-manifest analyze /path/to/project\n  \
                      deploy-manifest analyze --format json -o descriptor.json\n  \
                      deploy-manifest analyze --include-dependencies --scopes compile,runtime\n  \
                      deploy-manifest analyze --include-properties --property-exclusions password,vault"
    )]
    Analyze(AnalyzeArgs),

    #[command(about = "Show the effective configuration")]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the project root (defaults to current directory)"
    )]
    pub project_path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Attach a dependency report to each module")]
    pub include_dependencies: bool,

    #[arg(long, help = "Attach a plugin report to each module")]
    pub include_plugins: bool,

    #[arg(
        long,
        value_name = "SCOPES",
        value_delimiter = ',',
        help = "Dependency scopes listed in dependency reports"
    )]
    pub scopes: Option<Vec<String>>,

    #[arg(long, help = "Do not scan source files for the main class")]
    pub no_source_scan: bool,

    #[arg(long, help = "Attach the module's properties to each module")]
    pub include_properties: bool,

    #[arg(
        long,
        value_name = "PATTERNS",
        value_delimiter = ',',
        help = "Key patterns treated as sensitive (case-insensitive substring match)"
    )]
    pub property_exclusions: Option<Vec<String>>,

    #[arg(long, help = "Report sensitive properties and plugin configuration unmasked")]
    pub show_sensitive: bool,

    #[arg(
        long,
        conflicts_with = "show_sensitive",
        help = "Drop sensitive properties instead of masking them"
    )]
    pub drop_sensitive: bool,

    #[arg(long, help = "Leave plugin configuration out of plugin reports")]
    pub no_plugin_configuration: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
