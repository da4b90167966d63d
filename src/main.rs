use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use upcheck::config::{CURRENT_VERSION, Config, TOOL_NAME};
use upcheck::version::checker::{FreshnessChecker, FreshnessStatus};

#[derive(Parser)]
#[command(name = "upcheck")]
#[command(version, about = "Check whether this build is the latest release")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Version check endpoint (overrides UPCHECK_VERSION_CHECK_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Request timeout in seconds (overrides UPCHECK_VERSION_CHECK_TIMEOUT)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Cache file location (overrides UPCHECK_VERSION_CACHE_PATH)
    #[arg(long, global = true)]
    cache_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Check for a newer release (default)
    Check,
    /// Print the running version
    Version,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(cache_path) = &self.cache_path {
            config.cache_path = cache_path.clone();
        }
        config
    }
}

fn init_logging(debug: bool, log_file: Option<&Path>) -> anyhow::Result<WorkerGuard> {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (writer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("log file path {:?} has no file name", path))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {:?}", dir))?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(log_file.is_none())
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    Ok(guard)
}

fn run_check(config: &Config) {
    let checker = FreshnessChecker::from_config(config);

    match checker.check() {
        FreshnessStatus::UpToDate { .. } => {
            println!("{} {} is up to date", TOOL_NAME, CURRENT_VERSION);
        }
        FreshnessStatus::Outdated { latest } => {
            println!(
                "A new version of {} is available: {} (running {})",
                TOOL_NAME, latest, CURRENT_VERSION
            );
        }
        FreshnessStatus::Unknown => {
            println!(
                "Could not determine the latest version of {} (running {})",
                TOOL_NAME, CURRENT_VERSION
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.debug, cli.log_file.as_deref())?;

    match cli.command {
        None | Some(Command::Check) => run_check(&cli.config()),
        Some(Command::Version) => println!("{}", CURRENT_VERSION),
    }

    Ok(())
}
