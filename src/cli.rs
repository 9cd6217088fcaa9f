//! Command-line interface.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::batch::Orchestrator;
use crate::config::{AppConfig, DEFAULT_CONFIG_FILE};
use crate::notify::{ChatNotifier, LogNotifier, SmtpMailer, TelegramNotifier};
use crate::report::{PageSize, RenderOptions, ReportRenderer, TableReport};

#[derive(Debug, Parser)]
#[command(name = "outage-report", version, about = "Camera outage CSV to PDF reports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert one outage CSV into a PDF report
    Render {
        /// Semicolon-delimited input CSV
        input: PathBuf,
        /// Destination PDF
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = PageSize::A4)]
        paper: PageSize,
        /// Main font family
        #[arg(long)]
        font: Option<String>,
        /// Extra font directory (repeatable)
        #[arg(long = "font-path")]
        font_paths: Vec<PathBuf>,
    },
    /// Generate and deliver reports for every configured group
    Run {
        #[arg(long, env = "OUTAGE_REPORT_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
}

/// Parse arguments; any usage error exits with status 1.
pub fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                let _ = err.print();
                std::process::exit(1);
            }
        },
    }
}

/// `render` subcommand.
pub fn render(input: &Path, output: &Path, options: RenderOptions) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("file {} not found", input.display());
    }

    TableReport::new(options)
        .render(input, output)
        .with_context(|| format!("failed to render {}", input.display()))?;

    println!(
        "Successfully converted {} to {}",
        input.display(),
        output.display()
    );
    Ok(())
}

/// `run` subcommand.
pub async fn run_batch(config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let renderer = Arc::new(TableReport::new(config.render.clone()));
    let mailer = SmtpMailer::new(&config.smtp).context("failed to set up SMTP transport")?;
    let chat: Box<dyn ChatNotifier> = match &config.telegram {
        Some(telegram) => Box::new(
            TelegramNotifier::new(telegram).context("failed to set up Telegram client")?,
        ),
        None => Box::new(LogNotifier),
    };

    let summary = Orchestrator::new(&config, renderer, &mailer, chat.as_ref())
        .run()
        .await;

    println!("{}", summary.console_report());
    Ok(())
}

pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render {
            input,
            output,
            paper,
            font,
            font_paths,
        } => {
            let mut options = RenderOptions {
                paper,
                font_dirs: font_paths,
                ..RenderOptions::default()
            };
            if let Some(font) = font {
                options.font = font;
            }
            render(&input, &output, options)
        }
        Commands::Run { config } => run_batch(&config).await,
    }
}
