//! # depparse
//!
//! Trains transition-based dependency parsers on CoNLL-X corpora and runs
//! them over new text on a pool of worker threads.

mod commands;

use clap::{Parser, Subcommand};
use depparse_core::config::runtime::{parse_log_level, LoggingPreferences};
use depparse_core::logging;

#[derive(Parser, Debug)]
#[command(
    name = "depparse",
    about = "Train and run transition-based dependency parsers",
    version
)]
struct Cli {
    /// Log level (error, warn, info, debug); overrides DEPPARSE_LOG_LEVEL
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit JSON log lines instead of routing through env_logger
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a model from a gold corpus
    Train(commands::train::TrainArgs),
    /// Parse a corpus with a trained model
    Parse(commands::parse::ParseArgs),
    /// Score parsed output against gold
    Eval(commands::eval::EvalArgs),
    /// Describe a trained model
    Info(commands::info::InfoArgs),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match cli.command {
        Command::Train(args) => commands::train::run(&args),
        Command::Parse(args) => commands::parse::run(&args),
        Command::Eval(args) => commands::eval::run(&args),
        Command::Info(args) => commands::info::run(&args),
    }
}

fn init_logging(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut preferences = LoggingPreferences::default();
    if let Some(level) = &cli.log_level {
        preferences.min_log_level =
            parse_log_level(level).ok_or_else(|| format!("Unknown log level: {}", level))?;
    }
    preferences.use_structured_logging = cli.json_logs;
    preferences.forward_to_log_crate = !cli.json_logs;

    let filter = preferences.min_log_level.as_str().to_ascii_lowercase();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .init();

    logging::config::init_runtime_preferences(preferences)?;
    logging::init_global_logging()?;
    log::debug!("{}", logging::config::get_config_summary());
    Ok(())
}
