use std::future::Future;
use std::io::Write;

use tracing::info;
use war_server::{GameServer, ServerConfig, StatsSnapshot};

use crate::cli::Endpoint;
use crate::config::{self, Overrides};
use crate::error::CliError;

/// Runs the server until Ctrl+C. Always ends in an error: either startup
/// failed or the user interrupted it.
pub fn handle_server_command(
    endpoint: Endpoint,
    seed: Option<u64>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let resolved = config::load_with_sources()?.apply(Overrides {
        seed,
        ..endpoint.into_overrides()
    })?;
    info!(
        host = %resolved.config.host,
        port = resolved.config.port,
        seeded = resolved.config.seed.is_some(),
        "starting server"
    );

    let runtime = super::runtime()?;
    let snapshot = runtime.block_on(serve(
        resolved.config.server_config(),
        tokio::signal::ctrl_c(),
        out,
    ))?;
    writeln!(
        out,
        "Served {} sessions ({} completed, {} aborted)",
        snapshot.sessions_started, snapshot.sessions_completed, snapshot.sessions_aborted
    )?;
    Err(CliError::Interrupted("server stopped by Ctrl+C".into()))
}

/// Serves until `shutdown` resolves, then stops accepting and returns the
/// final counters.
pub async fn serve<F>(
    config: ServerConfig,
    shutdown: F,
    out: &mut dyn Write,
) -> Result<StatsSnapshot, CliError>
where
    F: Future<Output = std::io::Result<()>>,
{
    let handle = GameServer::new(config).start().await?;
    writeln!(out, "Serving on {}", handle.address())?;
    out.flush()?;

    shutdown.await?;
    let stats = handle.stats().clone();
    handle.shutdown().await?;
    Ok(stats.snapshot())
}
