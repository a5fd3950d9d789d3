//! # war CLI Library
//!
//! Command-line front end for the networked War card game: run a server,
//! play a single game, or drive many concurrent clients against a server.
//!
//! ## Main Entry Point
//!
//! [`run`] parses arguments, dispatches to a subcommand and returns the
//! process exit code.
//!
//! ```no_run
//! use std::io;
//! let args = vec!["war", "clients", "--port", "4444", "--count", "100"];
//! let code = war_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `server`: Accept connections and pair them into games until Ctrl+C
//! - `client`: Play one game and print the outcome
//! - `clients`: Launch many clients at once and report completions
//! - `cfg`: Display current configuration settings

use clap::Parser;
use std::io::Write;
pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod ui;

use cli::{Commands, WarCli};
use commands::{
    handle_cfg_command, handle_client_command, handle_clients_command, handle_server_command,
};

pub use commands::serve;
pub use error::CliError;

/// Parses `args` and runs the selected subcommand.
///
/// Returns `0` on success, `2` on any error and `130` when interrupted.
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    const COMMANDS: &[&str] = &["server", "client", "clients", "cfg"];
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let parsed = WarCli::try_parse_from(&argv);
    match parsed {
        Err(e) => {
            use clap::error::ErrorKind;

            // Help and version should print to stdout and exit 0
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::SUCCESS
                }
                _ => {
                    if writeln!(err, "{}", e).is_err()
                        || writeln!(err).is_err()
                        || writeln!(err, "War card game CLI").is_err()
                        || writeln!(err, "Usage: war <command> [options]\n").is_err()
                        || writeln!(err, "Commands:").is_err()
                    {
                        return exit_code::ERROR;
                    }
                    for c in COMMANDS {
                        if writeln!(err, "  {}", c).is_err() {
                            return exit_code::ERROR;
                        }
                    }
                    if writeln!(err, "\nFor full help, run: war --help").is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::ERROR
                }
            }
        }
        Ok(cli) => {
            let result = match cli.cmd {
                Commands::Server { endpoint, seed } => handle_server_command(endpoint, seed, out),
                Commands::Client { endpoint } => handle_client_command(endpoint, out),
                Commands::Clients {
                    endpoint,
                    count,
                    concurrency,
                    json,
                } => handle_clients_command(endpoint, count, concurrency, json, out, err),
                Commands::Cfg => handle_cfg_command(out, err),
            };
            finish(result, err)
        }
    }
}

fn finish(result: Result<(), CliError>, err: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(CliError::Interrupted(msg)) => {
            let _ = writeln!(err, "{}", msg);
            exit_code::INTERRUPTED
        }
        Err(e) => {
            let _ = ui::write_error(err, &e.to_string());
            e.exit_code()
        }
    }
}
