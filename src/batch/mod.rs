//! Batch orchestration: produce, render and deliver one report per group.
//!
//! Groups are processed one after another. A failure in one group is logged,
//! recorded in the summary and never stops the remaining groups.

pub mod command;
pub mod summary;

pub use summary::{GroupOutcome, RunStatus, RunSummary};

use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{AppConfig, GroupConfig};
use crate::notify::{ChatNotifier, ReportMail, ReportMailer};
use crate::report::{ReportError, ReportRenderer};
use command::{count_outages, run_command};

/// Timestamp embedded in generated PDF names.
pub const PDF_TIMESTAMP_FORMAT: &str = "%d%m%Y_%H%M";

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with status {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("CSV file not found: {0}")]
    MissingCsv(PathBuf),
    #[error(transparent)]
    Render(#[from] ReportError),
    #[error("render task failed: {0}")]
    RenderTask(#[from] tokio::task::JoinError),
}

/// Output path for a group's PDF: `<output_dir>/<prefix>_<ddmmYYYY_HHMM>.pdf`.
pub fn pdf_path(output_dir: &Path, prefix: &str, at: NaiveDateTime) -> PathBuf {
    let prefix = sanitize_filename::sanitize(prefix);
    output_dir.join(format!("{}_{}.pdf", prefix, at.format(PDF_TIMESTAMP_FORMAT)))
}

/// A successfully generated report, before delivery.
#[derive(Debug, Clone)]
pub struct GeneratedGroupReport {
    pub pdf: PathBuf,
    pub outage_count: usize,
}

/// Runs every configured group through generation and delivery.
pub struct Orchestrator<'a> {
    config: &'a AppConfig,
    renderer: Arc<dyn ReportRenderer>,
    mailer: &'a dyn ReportMailer,
    chat: &'a dyn ChatNotifier,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a AppConfig,
        renderer: Arc<dyn ReportRenderer>,
        mailer: &'a dyn ReportMailer,
        chat: &'a dyn ChatNotifier,
    ) -> Self {
        Self {
            config,
            renderer,
            mailer,
            chat,
        }
    }

    /// Process all groups in configuration order and post the summary.
    pub async fn run(&self) -> RunSummary {
        let started_at = Local::now().naive_local();
        log::info!(
            "Starting report run for {} group(s) at {}",
            self.config.groups.len(),
            started_at.format("%d.%m.%Y %H:%M")
        );

        for dir in [&self.config.output_dir, &self.config.csv_dir] {
            if let Err(e) = fs::create_dir_all(dir) {
                log::error!("Failed to create directory {}: {}", dir.display(), e);
            }
        }

        self.post(&summary::start_message(started_at, self.config.groups.len()))
            .await;

        let mut outcomes = Vec::with_capacity(self.config.groups.len());
        for group in &self.config.groups {
            let outcome = self.process_group(group, started_at).await;
            outcomes.push(outcome);
        }

        let summary = RunSummary {
            started_at,
            finished_at: Local::now().naive_local(),
            outcomes,
        };
        self.post(&summary.chat_message()).await;

        log::info!(
            "Report run finished: {}/{} group(s) delivered",
            summary.success_count(),
            summary.outcomes.len()
        );
        summary
    }

    async fn process_group(&self, group: &GroupConfig, run_at: NaiveDateTime) -> GroupOutcome {
        log::info!("Processing group {}", group.name);

        let report = match self.generate(group).await {
            Ok(report) => report,
            Err(e) => {
                log::error!("Report generation failed for {}: {}", group.name, e);
                return GroupOutcome::GenerationFailed {
                    group: group.name.clone(),
                    display_name: group.display_name.clone(),
                    reason: e.to_string(),
                };
            }
        };

        let mail = ReportMail {
            recipients: group.emails.clone(),
            subject: summary::email_subject(run_at, &group.display_name),
            body: summary::email_body(run_at, report.outage_count),
            attachment: report.pdf.clone(),
        };

        log::info!(
            "Sending report for {} to {} address(es)",
            group.name,
            group.emails.len()
        );

        match self.mailer.send_report(&mail).await {
            Ok(()) => GroupOutcome::Delivered {
                group: group.name.clone(),
                display_name: group.display_name.clone(),
                outage_count: report.outage_count,
                pdf: report.pdf,
            },
            Err(e) => {
                log::error!("Failed to send report for {}: {}", group.name, e);
                GroupOutcome::DeliveryFailed {
                    group: group.name.clone(),
                    display_name: group.display_name.clone(),
                    outage_count: report.outage_count,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Produce the CSV, count outages and render the PDF.
    pub async fn generate(&self, group: &GroupConfig) -> Result<GeneratedGroupReport, BatchError> {
        run_command(&group.command, &self.config.base_dir).await?;

        if !group.csv_file.exists() {
            return Err(BatchError::MissingCsv(group.csv_file.clone()));
        }

        let outage_count = match count_outages(&group.csv_file) {
            Ok(count) => count,
            Err(e) => {
                log::error!("Failed to count outages in {}: {}", group.csv_file.display(), e);
                0
            }
        };
        log::info!("Group {}: {} camera(s) not reporting", group.name, outage_count);

        let pdf = pdf_path(
            &self.config.output_dir,
            &group.pdf_prefix,
            Local::now().naive_local(),
        );
        // Rendering blocks on the Typst process; keep it off the async workers.
        let renderer = Arc::clone(&self.renderer);
        let csv_file = group.csv_file.clone();
        let target = pdf.clone();
        tokio::task::spawn_blocking(move || renderer.render(&csv_file, &target)).await??;
        log::info!("Report for {} created: {}", group.name, pdf.display());

        Ok(GeneratedGroupReport { pdf, outage_count })
    }

    async fn post(&self, text: &str) {
        if let Err(e) = self.chat.notify(text).await {
            log::error!("Chat notification failed: {}", e);
        }
    }
}
