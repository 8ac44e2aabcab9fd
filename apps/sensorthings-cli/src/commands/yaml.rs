//! Reconcile YAML documents against the server

use clap::Args;
use sensorthings_client::{DocumentSource, ReconciliationDriver, ReconciliationReport, ResourceGateway};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

use super::Session;
use crate::error::{CliError, CliResult};
use crate::output::print_report;

/// Create SensorThings data from YAML files
#[derive(Args, Debug)]
pub struct YamlArgs {
    /// Documents to load; references may cross files
    #[arg(required = true, value_name = "YAML")]
    pub files: Vec<PathBuf>,

    /// Output the reconciliation report as JSON
    #[arg(long)]
    pub json: bool,

    /// Passes before deferred records are reported as unresolved
    #[arg(long, value_name = "N")]
    pub max_passes: Option<usize>,
}

impl YamlArgs {
    /// Check arguments before any network traffic.
    pub fn validate(&self) -> CliResult<()> {
        for file in &self.files {
            if !file.is_file() {
                return Err(CliError::Validation(format!(
                    "File not found: {}",
                    file.display()
                )));
            }
        }
        if self.max_passes == Some(0) {
            return Err(CliError::Validation(
                "--max-passes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sources(&self) -> Vec<DocumentSource> {
        self.files.iter().map(DocumentSource::file).collect()
    }
}

/// Run the multi-pass reconciliation over every file in `args`.
pub async fn reconcile<G: ResourceGateway + ?Sized>(
    gateway: &G,
    args: &YamlArgs,
    max_passes: usize,
    cancel: Arc<AtomicBool>,
) -> ReconciliationReport {
    ReconciliationDriver::new(gateway)
        .with_max_passes(args.max_passes.unwrap_or(max_passes))
        .with_cancel_flag(cancel)
        .run(args.sources())
        .await
}

/// Turn an incomplete report into the matching error.
pub fn check_report(report: &ReconciliationReport) -> CliResult<()> {
    if report.cancelled {
        return Err(CliError::Interrupted);
    }
    if report.is_success() {
        return Ok(());
    }

    let failed = report.failures.len() + report.source_failures.len();
    Err(CliError::Incomplete(format!(
        "{} record(s) unresolved, {} failure(s)",
        report.unresolved_count(),
        failed
    )))
}

pub async fn execute(args: YamlArgs, session: &Session) -> CliResult<()> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "could not install Ctrl+C handler");
    }

    let report = reconcile(&session.client, &args, session.config.max_passes, interrupted).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    check_report(&report)
}
