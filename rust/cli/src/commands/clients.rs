//! Load driver: many concurrent clients against one server.

use std::io::Write;

use tracing::info;
use war_server::{LoadReport, run_clients};

use crate::cli::Endpoint;
use crate::config::{self, Overrides};
use crate::error::CliError;
use crate::ui;

pub fn handle_clients_command(
    endpoint: Endpoint,
    count: u64,
    concurrency: Option<usize>,
    json: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let count = usize::try_from(count)
        .map_err(|_| CliError::InvalidInput(format!("count too large: {count}")))?;
    let resolved = config::load_with_sources()?.apply(Overrides {
        concurrency,
        ..endpoint.into_overrides()
    })?;
    let addr = resolved.config.address();
    info!(%addr, count, concurrency = resolved.config.concurrency, "launching clients");

    let report =
        super::runtime()?.block_on(run_clients(&addr, count, resolved.config.concurrency));
    write_report(&report, json, out)?;

    if report.failed > 0 {
        let msg = format!("{} of {} clients failed", report.failed, report.requested);
        ui::display_warning(err, &msg)?;
        return Err(CliError::Client(msg));
    }
    Ok(())
}

fn write_report(report: &LoadReport, json: bool, out: &mut dyn Write) -> Result<(), CliError> {
    if json {
        let text = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
        writeln!(out, "{}", text)?;
    } else {
        writeln!(out, "{} completed clients", report.completed)?;
        writeln!(
            out,
            "won: {}  drew: {}  lost: {}  failed: {}",
            report.won, report.drew, report.lost, report.failed
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LoadReport {
        LoadReport {
            requested: 4,
            completed: 4,
            failed: 0,
            won: 2,
            drew: 0,
            lost: 2,
        }
    }

    #[test]
    fn text_report_lists_counts() {
        let mut out = Vec::new();
        write_report(&sample(), false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("4 completed clients\n"));
        assert!(text.contains("won: 2"));
    }

    #[test]
    fn json_report_is_parseable() {
        let mut out = Vec::new();
        write_report(&sample(), true, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["completed"], 4);
        assert_eq!(value["failed"], 0);
    }
}
