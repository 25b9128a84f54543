use crate::logging;
use crate::terminal::{
    self,
    host::{NoCamera, TerminalPresentation},
};
use anyhow::{Context, Result};
use colored::Colorize;
use proctor_application::{SessionBootstrap, SubmissionPipeline};
use proctor_core::exam::{Candidate, SessionReport, SubmissionOutcome};
use proctor_execution::{RuntimeDeps, SessionRuntime};
use proctor_infrastructure::{ProctorPaths, TomlSettingsStore, backend_from_config};
use std::path::PathBuf;
use std::sync::Arc;

pub struct RunArgs {
    pub roll_no: String,
    pub name: String,
    pub department: String,
    pub exam_id: Option<String>,
    pub config: Option<PathBuf>,
    pub audit_log: Option<PathBuf>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let store = match args.config {
        Some(path) => TomlSettingsStore::with_path(path),
        None => TomlSettingsStore::new()?,
    };
    let mut config = store.load().context("Failed to load settings")?;
    if let Some(exam_id) = args.exam_id {
        config.exam.exam_id = exam_id;
    }

    let logs_dir = ProctorPaths::logs_dir()?;
    let (_guards, audit_records) = logging::init_session(&logs_dir)?;
    let _audit_writer = logging::spawn_audit_writer(args.audit_log, audit_records);

    let backend = backend_from_config(&config.backend);
    let bootstrap = SessionBootstrap::new(backend.clone(), config.exam.clone())
        .with_monitor(config.session.monitor());

    let mut candidate = Candidate::new(args.roll_no, args.name);
    candidate.department = args.department;

    println!("{}", format!("Loading {}...", config.exam.exam_id).bright_black());
    let engine = match bootstrap.prepare(candidate).await {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{}", format!("Cannot load assessment: {}", e).red().bold());
            return Err(e.into());
        }
    };

    let presentation = Arc::new(TerminalPresentation::new());
    let deps = RuntimeDeps {
        pipeline: Arc::new(SubmissionPipeline::new(backend, presentation.clone())),
        presentation: presentation.clone(),
        camera: Arc::new(NoCamera),
        tick_interval: config.session.tick_interval(),
        grace_delay: config.session.grace_delay(),
    };

    let handle = SessionRuntime::spawn(engine, deps);
    let outcome = terminal::drive(handle).await;
    // The pipeline leaves secure mode; this covers the error paths
    presentation.restore();
    let report = outcome?;

    match report {
        Some(report) => print_report(&report),
        None => println!("{}", "Session ended without a report".yellow()),
    }
    Ok(())
}

fn print_report(report: &SessionReport) {
    println!("{}", "=== Session complete ===".bright_magenta().bold());
    println!("Candidate : {} ({})", report.candidate.name, report.candidate.roll_no);
    println!("Exam      : {}", report.exam_id);
    println!("Status    : {}", report.reason.result_status());
    println!("Reason    : {}", report.reason);
    println!("Answered  : {}", report.answers.len());
    println!("Violations: {}", report.violations.len());
    for violation in &report.violations {
        println!(
            "  {} {}",
            violation.timestamp.format("%H:%M:%S").to_string().bright_black(),
            violation.kind.describe()
        );
    }

    let outcome = match &report.receipt.outcome {
        SubmissionOutcome::Acknowledged => "recorded by the exam server".green(),
        SubmissionOutcome::Skipped => "kept locally (offline mode)".yellow(),
        SubmissionOutcome::Failed(reason) => {
            format!("not delivered: {}", reason).red()
        }
    };
    println!("Result    : {}", outcome);
}
