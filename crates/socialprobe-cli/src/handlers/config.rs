//! Config command handler

use crate::commands::{ConfigArgs, ConfigFormat, ConfigSource};
use crate::error::{CliError, CliResult};
use socialprobe::SuiteConfig;

/// Load the suite configuration a command should use
///
/// An explicit file wins. Otherwise the built-in configuration is used, in
/// its CI flavour when `--ci` is passed or `CI` is set.
pub fn load_suite_config(source: &ConfigSource) -> CliResult<SuiteConfig> {
    let config = match &source.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            SuiteConfig::load(path)?
        }
        None => SuiteConfig::for_environment(source.ci || socialprobe::config::is_ci()),
    };
    tracing::debug!(
        projects = config.projects.len(),
        retries = config.retries,
        "suite configuration loaded"
    );
    Ok(config)
}

/// Render a configuration in the requested format
pub fn render_config(config: &SuiteConfig, format: ConfigFormat) -> CliResult<String> {
    let rendered = match format {
        ConfigFormat::Yaml => config.to_yaml()?,
        ConfigFormat::Json => config.to_json()?,
    };
    Ok(rendered)
}

/// Execute the config command
pub fn execute_config(args: &ConfigArgs) -> CliResult<()> {
    let config = load_suite_config(&args.source)?;
    println!("{}", render_config(&config, args.format)?.trim_end());
    Ok(())
}
