//! SMTP delivery of report PDFs.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{NotifyError, ReportMailer};
use crate::config::{SmtpConfig, SmtpSecurity};

pub const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// A report ready to be mailed.
#[derive(Debug, Clone)]
pub struct ReportMail {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachment: PathBuf,
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let builder = match config.security {
            SmtpSecurity::Ssl => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)?,
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)?
            }
        };

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        let from = sender_mailbox(&config.username, config.from_name.as_deref())?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl ReportMailer for SmtpMailer {
    async fn send_report(&self, mail: &ReportMail) -> Result<(), NotifyError> {
        let message = build_message(&self.from, mail)?;
        self.transport.send(message).await?;
        log::info!(
            "Report {} mailed to {} recipient(s)",
            mail.attachment.display(),
            mail.recipients.len()
        );
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| NotifyError::Address {
            address: address.to_string(),
            source,
        })
}

fn sender_mailbox(username: &str, from_name: Option<&str>) -> Result<Mailbox, NotifyError> {
    let mailbox = parse_mailbox(username)?;
    Ok(match from_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => Mailbox::new(Some(name.to_string()), mailbox.email),
        None => mailbox,
    })
}

/// Build the multipart message: plain-text body plus the report attachment.
pub fn build_message(from: &Mailbox, mail: &ReportMail) -> Result<Message, NotifyError> {
    let mut builder = Message::builder().from(from.clone()).subject(&mail.subject);
    for recipient in &mail.recipients {
        builder = builder.to(parse_mailbox(recipient)?);
    }

    let bytes = std::fs::read(&mail.attachment).map_err(|source| NotifyError::Attachment {
        path: mail.attachment.clone(),
        source,
    })?;
    let filename = attachment_name(&mail.attachment);
    let mime = mime_guess::from_path(&mail.attachment).first_or_octet_stream();
    let content_type = ContentType::parse(mime.essence_str())?;

    let message = builder.multipart(
        MultiPart::mixed()
            .singlepart(SinglePart::plain(mail.body.clone()))
            .singlepart(Attachment::new(filename).body(bytes, content_type)),
    )?;

    Ok(message)
}

fn attachment_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report.pdf".to_string())
}
