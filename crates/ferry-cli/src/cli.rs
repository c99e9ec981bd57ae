//! Argument parsing and run orchestration for the `ferry` binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use ferry_config::{Operation, RuntimeSettings, TransferRequest};
use ferry_fsops::{TracingObserver, TransferReport, TransferService};
use ferry_telemetry::{LogFormat, LoggingConfig, init_logging};
use tracing::{debug, warn};

use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, render_report};

#[derive(Parser, Debug)]
#[command(
    name = "ferry",
    about = "Copy or move directory contents using a pool of worker threads"
)]
struct Cli {
    /// Transfer action.
    #[arg(long, value_enum)]
    operation: OperationArg,
    /// Source directory, optionally followed by a file mask such as `inbox/*.txt`.
    #[arg(long, required = true, num_args = 1..)]
    src: Vec<String>,
    /// Destination directory.
    #[arg(long)]
    to: PathBuf,
    /// Number of worker threads in per-file mode.
    #[arg(long, default_value_t = 1)]
    threads: usize,
    /// Log file path (overrides `FERRY_LOG_FILE`).
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Log level or filter directive (overrides `FERRY_LOG_LEVEL`).
    #[arg(long)]
    log_level: Option<String>,
    /// Log format, `pretty` or `json` (overrides `FERRY_LOG_FORMAT`).
    #[arg(long)]
    log_format: Option<String>,
    /// Pause after each processed item, in milliseconds (overrides `FERRY_THROTTLE_MS`).
    #[arg(long)]
    throttle_ms: Option<u64>,
    /// Format of the run summary.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OperationArg {
    Copy,
    Move,
}

impl From<OperationArg> for Operation {
    fn from(value: OperationArg) -> Self {
        match value {
            OperationArg::Copy => Self::Copy,
            OperationArg::Move => Self::Move,
        }
    }
}

#[derive(Debug)]
struct Invocation {
    request: TransferRequest,
    settings: RuntimeSettings,
    ignored_sources: Vec<String>,
    output: OutputFormat,
}

/// Parses CLI arguments, performs the transfer, and prints its summary.
/// Returns the process exit code.
pub fn run() -> i32 {
    let cli = Cli::parse();
    match execute(cli) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn execute(cli: Cli) -> CliResult<()> {
    let settings = RuntimeSettings::from_env()?;
    let invocation = prepare(cli, settings)?;

    let settings = &invocation.settings;
    init_logging(&LoggingConfig {
        level: &settings.log_level,
        format: LogFormat::from_name(settings.log_format.as_deref()),
        file: &settings.log_file,
    })
    .map_err(CliError::failure)?;
    debug!(
        throttle = ?settings.throttle,
        log_level = %settings.log_level,
        log_file = %settings.log_file.display(),
        "runtime settings resolved"
    );

    if !invocation.ignored_sources.is_empty() {
        warn!(
            ignored = ?invocation.ignored_sources,
            "only the first --src value is used"
        );
    }

    let service = TransferService::new(Arc::new(TracingObserver)).with_throttle(settings.throttle);
    let report = service.run(&invocation.request)?;

    println!("{}", render_report(&report, invocation.output)?);
    check_outcome(&report)
}

fn prepare(cli: Cli, mut settings: RuntimeSettings) -> CliResult<Invocation> {
    if let Some(file) = cli.log_file {
        settings.log_file = file;
    }
    if let Some(level) = cli.log_level {
        settings.log_level = level;
    }
    if let Some(format) = cli.log_format.as_deref() {
        settings.set_log_format(format)?;
    }
    if let Some(millis) = cli.throttle_ms {
        settings.throttle = Duration::from_millis(millis);
    }

    let mut sources = cli.src.into_iter();
    let source = sources
        .next()
        .ok_or_else(|| CliError::validation("--src requires at least one value"))?;
    let request =
        TransferRequest::from_source_spec(cli.operation.into(), &source, cli.to, cli.threads)?;

    Ok(Invocation {
        request,
        settings,
        ignored_sources: sources.collect(),
        output: cli.output,
    })
}

fn check_outcome(report: &TransferReport) -> CliResult<()> {
    if report.is_complete() {
        return Ok(());
    }
    Err(CliError::failure(anyhow!(
        "{} of {} item(s) failed, {} worker(s) terminated abnormally",
        report.items_enqueued.saturating_sub(report.succeeded()),
        report.items_enqueued,
        report.crashed_workers
    )))
}
