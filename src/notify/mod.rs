//! Notification channels: chat messages and report emails.
//!
//! The orchestrator only sees the `ChatNotifier` and `ReportMailer` traits;
//! concrete channels live in the submodules.

pub mod email;
pub mod telegram;

pub use email::{ReportMail, SmtpMailer};
pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat API responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid email address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("failed to build email: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("unsupported attachment type: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("failed to read attachment {path}: {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Sends a short HTML-formatted status message to an operator chat.
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<(), NotifyError>;
}

/// Delivers a generated report to its recipients.
#[async_trait]
pub trait ReportMailer: Send + Sync {
    async fn send_report(&self, mail: &ReportMail) -> Result<(), NotifyError>;
}

/// Used when no chat channel is configured; messages only reach the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl ChatNotifier for LogNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        log::warn!("No chat channel configured, message not sent: {}", text);
        Ok(())
    }
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>A&B</b>"), "&lt;b&gt;A&amp;B&lt;/b&gt;");
        assert_eq!(escape_html("Школы"), "Школы");
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        assert!(LogNotifier.notify("hello").await.is_ok());
    }
}
