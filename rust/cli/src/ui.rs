//! Terminal output helpers shared by the command handlers.

use std::io::Write;

use war_engine::rules::Tally;

pub fn write_error(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "Error: {}", msg)
}

/// Display a warning message to stderr with "WARNING:" prefix
pub fn display_warning(err: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(err, "WARNING: {}", message)
}

/// One-line summary of a finished game from the client's point of view.
pub fn describe_game(tally: &Tally) -> String {
    format!(
        "Game complete, I {} ({} wins, {} draws, {} losses)",
        tally.verdict(),
        tally.wins,
        tally.draws,
        tally.losses
    )
}
