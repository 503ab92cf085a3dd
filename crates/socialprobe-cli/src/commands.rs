//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Socialprobe: end-to-end registration, login and profile suites
#[derive(Parser, Debug)]
#[command(name = "socialprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios in Chromium and write reports
    Run(RunArgs),

    /// Serve the mock social app over HTTP
    Serve(ServeArgs),

    /// Print the effective suite configuration
    Config(ConfigArgs),

    /// Run global setup only
    Setup(SetupArgs),

    /// List scenarios and the projects that would run them
    List(ListArgs),
}

/// Where the suite configuration comes from
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigSource {
    /// YAML configuration file (defaults to the built-in configuration)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use CI defaults (also implied by the `CI` environment variable)
    #[arg(long)]
    pub ci: bool,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Configuration
    #[command(flatten)]
    pub source: ConfigSource,

    /// Only run this project
    #[arg(short, long)]
    pub project: Option<String>,

    /// Only run scenarios whose title or tags match this regex
    #[arg(short, long)]
    pub grep: Option<String>,

    /// Output directory for reports and artifacts
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Launch Chromium without its sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Chromium executable (auto-detected when omitted)
    #[arg(long)]
    pub chromium: Option<PathBuf>,
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind
    #[arg(short, long, default_value = "3001")]
    pub port: u16,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration
    #[command(flatten)]
    pub source: ConfigSource,

    /// Output format
    #[arg(short, long, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Arguments for the setup command
#[derive(Parser, Debug)]
pub struct SetupArgs {
    /// Configuration
    #[command(flatten)]
    pub source: ConfigSource,

    /// Output directory to create
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Configuration
    #[command(flatten)]
    pub source: ConfigSource,

    /// Only list this project
    #[arg(short, long)]
    pub project: Option<String>,

    /// Only list scenarios whose title or tags match this regex
    #[arg(short, long)]
    pub grep: Option<String>,
}

/// Configuration output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML
    #[default]
    Yaml,
    /// Pretty JSON
    Json,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_run_defaults() {
            let cli = Cli::parse_from(["socialprobe", "run"]);
            let Commands::Run(args) = cli.command else {
                panic!("expected Run command");
            };
            assert!(args.project.is_none());
            assert!(!args.headed);
            assert!(!args.source.ci);
        }

        #[test]
        fn test_parse_run_with_filters() {
            let cli = Cli::parse_from([
                "socialprobe",
                "run",
                "--project",
                "track-b-mock",
                "--grep",
                "@smoke",
                "--output",
                "out",
                "--headed",
                "--ci",
            ]);
            let Commands::Run(args) = cli.command else {
                panic!("expected Run command");
            };
            assert_eq!(args.project.as_deref(), Some("track-b-mock"));
            assert_eq!(args.grep.as_deref(), Some("@smoke"));
            assert_eq!(args.output, Some(PathBuf::from("out")));
            assert!(args.headed);
            assert!(args.source.ci);
        }

        #[test]
        fn test_parse_serve() {
            let cli = Cli::parse_from(["socialprobe", "serve", "--port", "4000"]);
            let Commands::Serve(args) = cli.command else {
                panic!("expected Serve command");
            };
            assert_eq!(args.port, 4000);
            assert_eq!(args.host, "127.0.0.1");
        }

        #[test]
        fn test_parse_config_format() {
            let cli = Cli::parse_from(["socialprobe", "config", "--format", "json"]);
            let Commands::Config(args) = cli.command else {
                panic!("expected Config command");
            };
            assert_eq!(args.format, ConfigFormat::Json);
        }

        #[test]
        fn test_global_flags() {
            let cli = Cli::parse_from(["socialprobe", "-vv", "list"]);
            assert_eq!(cli.verbose, 2);
            let cli = Cli::parse_from(["socialprobe", "list", "-q"]);
            assert!(cli.quiet);
        }

        #[test]
        fn test_requires_subcommand() {
            assert!(Cli::try_parse_from(["socialprobe"]).is_err());
        }
    }

    mod color_tests {
        use super::*;
        use crate::config::ColorChoice;

        #[test]
        fn test_color_arg_conversion() {
            assert_eq!(ColorChoice::from(ColorArg::Always), ColorChoice::Always);
            assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
            assert_eq!(ColorChoice::from(ColorArg::Auto), ColorChoice::Auto);
        }
    }
}
