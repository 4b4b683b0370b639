use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use tracing::info;

mod app;

#[derive(Parser, Debug)]
#[command(author, version, about = "sailtest - replay recorded conversations against saild", long_about = None)]
struct Args {
    /// Capture live replies and rewrite the fixtures with them
    #[arg(short, long, conflicts_with = "codes_only")]
    generate: bool,

    /// Compare only the status code of each reply line
    #[arg(short, long)]
    codes_only: bool,

    /// Path to configuration file
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Program to launch as the server under test
    #[arg(long)]
    server: Option<String>,

    /// Argument passed to the server program (repeatable)
    #[arg(long = "server-arg", allow_hyphen_values = true)]
    server_args: Vec<String>,

    /// Directory relative fixture names are resolved against
    #[arg(long)]
    fixture_dir: Option<Utf8PathBuf>,

    /// Seconds to wait for each reply line before failing
    #[arg(long, value_name = "SECS")]
    read_timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Fixture files to run, in order (defaults to the configured list)
    fixtures: Vec<Utf8PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    info!("Starting sailtest v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        sailtest_core::config::Config::load_from_path(config_path)?
    } else {
        sailtest_core::config::Config::load_or_default()
    };

    // Override with CLI arguments
    if let Some(server) = args.server {
        config.server.command = server;
        config.server.args = args.server_args;
    } else if !args.server_args.is_empty() {
        config.server.args = args.server_args;
    }
    if let Some(dir) = args.fixture_dir {
        config.fixtures.directory = dir;
    }
    if !args.fixtures.is_empty() {
        config.fixtures.files = args.fixtures;
    }
    if args.read_timeout.is_some() {
        config.run.read_timeout_secs = args.read_timeout;
    }
    config.validate()?;

    let mode = sailtest_core::mode::RunMode::from_flags(args.generate, args.codes_only);
    info!("Server command: {} {}", config.server.command, config.server.args.join(" "));
    info!("Mode: {:?}", mode);

    app::run(config, mode).await
}
