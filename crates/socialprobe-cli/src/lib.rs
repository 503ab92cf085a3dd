//! Socialprobe CLI library
//!
//! Command-line front end for the socialprobe suites: run scenarios in
//! Chromium, serve the mock social app, inspect configuration.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, ConfigFormat, ConfigSource, ListArgs, RunArgs, ServeArgs,
    SetupArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{summary_line, ProgressReporter};
