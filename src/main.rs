#![allow(clippy::uninlined_format_args)]

mod args;
mod byteable;
mod commands;
mod config;
mod constants;
mod error;
mod fs;
mod hashing;
mod object;
mod pack;
mod transport;
mod utils;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use commands::Output;
pub use constants::*;
pub use error::{Error, Result};

fn run(args: &args::Args) -> anyhow::Result<Output> {
    let config = config::Config::from_env()?;
    log::debug!("running with {:?}", config);
    commands::execute_command(&args.command, &config)
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = args::Args::parse_from(wild::args_os());

    match run(&args) {
        Ok(Output::Message(message)) => {
            if !message.is_empty() {
                println!("{}", message)
            }
            ExitCode::SUCCESS
        }
        Ok(Output::Raw(bytes)) => {
            let mut stdout = std::io::stdout().lock();
            match stdout.write_all(&bytes).and_then(|_| stdout.flush()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("{} could not write to stdout: {}", "error:".red().bold(), e);
                    ExitCode::FAILURE
                }
            }
        }
        Err(error) => {
            eprintln!("{} {:?}", "error:".red().bold(), error);
            ExitCode::FAILURE
        }
    }
}
