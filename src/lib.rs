//! Camera outage reports: CSV exports rendered to paginated PDF tables and
//! delivered by email, with run status posted to a Telegram chat.

pub mod batch;
pub mod cli;
pub mod config;
pub mod notify;
pub mod report;

pub use crate::batch::{GroupOutcome, Orchestrator, RunSummary};
pub use crate::config::AppConfig;
pub use crate::report::{RenderedReport, ReportError, ReportRenderer, TableReport};

/// Process entry point shared by the binary.
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = cli::parse_args();
    cli::execute(cli).await
}
