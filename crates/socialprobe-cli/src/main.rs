//! Socialprobe CLI
//!
//! ## Usage
//!
//! ```bash
//! socialprobe run                          # Run both tracks
//! socialprobe run -p track-b-mock -g @smoke
//! socialprobe serve --port 3001            # Serve the mock social app
//! socialprobe list                         # Show what would run
//! socialprobe config --format json         # Print the effective configuration
//! ```

use clap::Parser;
use socialprobe_cli::{handlers, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match run(config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            config.reporter().failure(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(ColorChoice::from(cli.color.clone()))
}

fn init_tracing(verbosity: Verbosity) {
    let filter = std::env::var("RUST_LOG").map_or_else(
        |_| EnvFilter::new(verbosity.default_log_filter()),
        EnvFilter::new,
    );
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

async fn run(config: CliConfig, command: Commands) -> CliResult<()> {
    match command {
        Commands::Run(args) => handlers::execute_run(config.reporter(), &args).await,
        Commands::Serve(args) => handlers::execute_serve(&config.reporter(), &args).await,
        Commands::Config(args) => handlers::execute_config(&args),
        Commands::Setup(args) => handlers::execute_setup(&config.reporter(), &args).map(|_| ()),
        Commands::List(args) => handlers::execute_list(&args),
    }
}
