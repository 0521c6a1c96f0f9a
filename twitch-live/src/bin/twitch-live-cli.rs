use clap::{Parser, ValueEnum};
use eyre::Context;
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use twitch_live::check_live;
use twitch_live::config::Config;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Report whether a Twitch user is live and how many viewers they have.
///
/// Credentials come from TWITCH_CLIENT_ID and TWITCH_CLIENT_SECRET, read from the
/// environment or a .env file in the working directory.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Twitch login name of the user to check.
    login: String,

    /// Default log level; RUST_LOG takes precedence.
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();

    // stdout is reserved for the result line
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from(args.log_level).into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().context("load Twitch app credentials")?;
    let client = config.http_client().context("build HTTP client")?;

    let status = check_live(&config, client, &args.login)
        .await
        .with_context(|| format!("check whether {} is live", args.login))?;
    println!("{status}");

    Ok(())
}
