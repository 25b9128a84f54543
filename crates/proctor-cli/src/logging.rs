//! Tracing setup for the `proctor` binary.
//!
//! During an exam the terminal belongs to the exam screen, so logs go to a
//! daily-rolling file under the logs directory and audit events are teed
//! into a channel for the optional JSON-lines audit log. The other
//! subcommands log warnings to stderr.

use anyhow::{Context, Result};
use proctor_execution::{AuditLayer, AuditRecord};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILE_FILTER: &str = "info";

/// Must be held for the lifetime of the session or buffered lines are lost.
pub struct LoggingGuards {
    _file_guard: WorkerGuard,
}

/// File logging plus the audit tee. Returns the audit channel.
pub fn init_session(logs_dir: &Path) -> Result<(LoggingGuards, mpsc::UnboundedReceiver<AuditRecord>)> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create logs directory {:?}", logs_dir))?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, "proctor.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILE_FILTER));
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_filter(file_filter);

    let (audit_layer, audit_rx) = AuditLayer::channel();

    tracing_subscriber::registry()
        .with(file_layer)
        .with(audit_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!("[Logging] Session logs in {:?}", logs_dir);
    Ok((
        LoggingGuards {
            _file_guard: file_guard,
        },
        audit_rx,
    ))
}

/// Warnings and errors to stderr.
pub fn init_console() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .with_filter(filter),
        )
        .try_init();
}

/// Appends audit records to `path` as JSON lines until the channel closes,
/// or drops them if no path was given.
pub fn spawn_audit_writer(
    path: Option<PathBuf>,
    mut records: mpsc::UnboundedReceiver<AuditRecord>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Some(path) = path else {
            while records.recv().await.is_some() {}
            return;
        };

        let mut file = match tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("[AuditLog] Cannot open {:?}: {}", path, e);
                return;
            }
        };

        while let Some(record) = records.recv().await {
            let mut line = match serde_json::to_string(&record) {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!("[AuditLog] Failed to encode record: {}", e);
                    continue;
                }
            };
            line.push('\n');
            if let Err(e) = file.write_all(line.as_bytes()).await {
                tracing::error!("[AuditLog] Write to {:?} failed: {}", path, e);
                return;
            }
            let _ = file.flush().await;
        }
    })
}
