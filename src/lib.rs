pub mod ai;
pub mod attendance;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod docx;
pub mod error;
pub mod images;
pub mod preview;
pub mod report;
pub mod types;

use clap::Parser;
use std::process::ExitCode;

/// Entry point shared by the `event-report` binary.
pub fn run() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = cli::Cli::parse();
    let config = config::AppConfig::from_env();
    match cli::execute(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
