//! Command handler modules for the `war` CLI.
//!
//! Each subcommand lives in its own file and exposes one
//! `handle_COMMAND_command` function. Output streams are passed in as
//! `&mut dyn Write` so handlers can be driven from tests; errors propagate
//! as [`CliError`].

mod cfg;
mod client;
mod clients;
mod server;

pub use cfg::handle_cfg_command;
pub use client::handle_client_command;
pub use clients::handle_clients_command;
pub use server::{handle_server_command, serve};

use crate::error::CliError;

/// Each networked command drives its own runtime; `run` stays synchronous.
fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::from)
}
