use std::io::Write;

use war_server::connect_and_play;

use crate::cli::Endpoint;
use crate::config;
use crate::error::CliError;
use crate::ui;

/// Plays a single game against the configured server.
pub fn handle_client_command(endpoint: Endpoint, out: &mut dyn Write) -> Result<(), CliError> {
    let resolved = config::load_with_sources()?.apply(endpoint.into_overrides())?;
    let addr = resolved.config.address();

    let tally = super::runtime()?.block_on(connect_and_play(&addr))?;
    writeln!(out, "{}", ui::describe_game(&tally))?;
    Ok(())
}
