//! Run summary renderers.

use std::fmt::Write as _;

use anyhow::anyhow;
use clap::ValueEnum;
use ferry_fsops::TransferReport;

use crate::error::{CliError, CliResult};

/// Format of the summary printed after a run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub(crate) fn render_report(report: &TransferReport, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}"))),
        OutputFormat::Table => Ok(render_table(report)),
    }
}

fn render_table(report: &TransferReport) -> String {
    let elapsed = report.finished_at - report.started_at;
    let mut text = String::new();
    let _ = writeln!(text, "run: {}", report.run_id);
    let _ = writeln!(
        text,
        "operation: {} ({})",
        report.operation,
        report.mode.as_str()
    );
    let _ = writeln!(text, "source: {}", report.source.display());
    if let Some(mask) = &report.mask {
        let _ = writeln!(text, "mask: {mask}");
    }
    let _ = writeln!(text, "destination: {}", report.destination.display());
    let _ = writeln!(text, "workers: {}", report.workers);
    let _ = writeln!(
        text,
        "transferred: {}/{}",
        report.succeeded(),
        report.items_enqueued
    );
    let _ = writeln!(text, "failed: {}", report.failed());
    if report.crashed_workers > 0 {
        let _ = writeln!(text, "crashed workers: {}", report.crashed_workers);
    }
    let _ = writeln!(text, "elapsed: {}ms", elapsed.num_milliseconds());

    if !report.failures.is_empty() {
        let _ = writeln!(text);
        let _ = writeln!(text, "{:<6} {:<40} ERROR", "WORKER", "PATH");
        for failure in &report.failures {
            let _ = writeln!(
                text,
                "{:<6} {:<40} {}",
                failure.worker_id,
                failure.path.display(),
                failure.message
            );
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use ferry_config::{Operation, TransferMode};
    use ferry_fsops::ItemFailure;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn sample_report() -> TransferReport {
        let started_at = Utc::now();
        TransferReport {
            run_id: Uuid::nil(),
            operation: Operation::Move,
            mode: TransferMode::PerFile,
            source: PathBuf::from("inbox"),
            destination: PathBuf::from("archive"),
            mask: Some(".csv".to_string()),
            workers: 2,
            items_enqueued: 3,
            sentinels_enqueued: 2,
            transferred: vec![PathBuf::from("inbox/a.csv"), PathBuf::from("inbox/b.csv")],
            failures: vec![ItemFailure {
                worker_id: 2,
                path: PathBuf::from("inbox/c.csv"),
                message: "fsops io failure (copy_tree.copy_file inbox/c.csv): denied".to_string(),
            }],
            crashed_workers: 0,
            started_at,
            finished_at: started_at + Duration::milliseconds(250),
        }
    }

    #[test]
    fn table_lists_counts_and_failures() -> anyhow::Result<()> {
        let text = render_report(&sample_report(), OutputFormat::Table)
            .map_err(|err| anyhow!(err.display_message()))?;
        assert!(text.contains("operation: move (per_file)"));
        assert!(text.contains("mask: .csv"));
        assert!(text.contains("transferred: 2/3"));
        assert!(text.contains("failed: 1"));
        assert!(text.contains("elapsed: 250ms"));
        assert!(text.contains("inbox/c.csv"));
        assert!(!text.contains("crashed workers"));
        Ok(())
    }

    #[test]
    fn json_output_is_the_serialized_report() -> anyhow::Result<()> {
        let text = render_report(&sample_report(), OutputFormat::Json)
            .map_err(|err| anyhow!(err.display_message()))?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        assert_eq!(value["operation"], "move");
        assert_eq!(value["items_enqueued"], 3);
        assert_eq!(value["failures"][0]["path"], "inbox/c.csv");
        Ok(())
    }
}
