//! IPPcode22 interpreter.
//!
//! Exit codes:
//! - 0: Success (or EXIT 0)
//! - 1-49: Operand of the EXIT instruction
//! - 10: Invalid command-line arguments
//! - 11: Input file cannot be opened
//! - 31, 32: Malformed XML, invalid program structure
//! - 52-58: Runtime errors
//! - 99: Internal error

mod commands;
mod config;

use std::process;

use clap::Parser;
use env_logger::Env;
use log::warn;

use config::RunConfig;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = match RunConfig::try_parse() {
        Ok(config) => config,
        Err(err) => {
            // Help and version go to stdout, usage errors to stderr.
            if let Err(io_err) = err.print() {
                warn!("cannot print usage: {io_err}");
            }
            process::exit(config::exit_code(&err));
        }
    };

    if let Err(code) = commands::run(&config) {
        process::exit(code);
    }
}
