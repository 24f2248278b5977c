//! Mail delivery: submit an artifact as a single-attachment message.
//!
//! The device's mail-in pipeline accepts only the ZIP-based EPUB container;
//! any other extension is skipped before a single byte touches the network.
//! Each qualifying artifact travels in its own message over a fresh
//! authenticated session (STARTTLS upgrade, then credential login), so a
//! transport failure on one artifact cannot poison the next.
//!
//! Submission is abstracted behind the [`Mailer`] trait, mirroring the
//! process-runner seam: production uses [`SmtpMailer`] (lettre), tests
//! inject a counting fake to prove that skipped artifacts open no session.

use super::{Channel, DeliveryOutcome, DeliveryStatus};
use crate::config::{Settings, SmtpSettings};
use crate::error::MailError;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// MIME type of the EPUB container.
pub const EPUB_MIME: &str = "application/epub+zip";

/// Fixed subject line used for every submission.
pub const MAIL_SUBJECT: &str = "Kindle Document";

/// One message ready for submission: a subject and a single binary
/// attachment. Addressing is the transport's concern — the recipient is
/// fixed per configuration.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub subject: String,
    pub attachment_name: String,
    pub attachment: Vec<u8>,
}

/// Submits one message to the device's mail-in address.
pub trait Mailer: Send + Sync {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Production transport: authenticated SMTP submission via lettre.
///
/// A new session is established per message (relay connect, STARTTLS
/// upgrade, login) and torn down with the transport. No timeout is applied;
/// a hung server blocks the pipeline.
pub struct SmtpMailer {
    settings: SmtpSettings,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let from: Mailbox = parse_mailbox(&self.settings.sender)?;
        let to: Mailbox = parse_mailbox(&self.settings.recipient)?;

        let content_type = ContentType::parse(EPUB_MIME)
            .map_err(|err| MailError::Build(err.to_string()))?;
        let attachment =
            Attachment::new(mail.attachment_name.clone()).body(mail.attachment.clone(), content_type);

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject.clone())
            .singlepart(attachment)
            .map_err(|err| MailError::Build(err.to_string()))?;

        let transport = SmtpTransport::starttls_relay(&self.settings.host)
            .map_err(|err| MailError::Transport(err.to_string()))?
            .port(self.settings.port)
            .credentials(Credentials::new(
                self.settings.sender.clone(),
                self.settings.password.clone(),
            ))
            .build();

        transport
            .send(&message)
            .map_err(|err| MailError::Transport(err.to_string()))?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|err| MailError::Address {
        address: address.to_string(),
        detail: format!("{err}"),
    })
}

/// Mail each EPUB artifact to the configured device address.
///
/// Per artifact: a non-EPUB extension yields `Skipped` with zero transport
/// interaction; a read or submission error yields `Failed`; the loop always
/// continues to the next artifact. Missing mail configuration fails each
/// qualifying artifact with an explanatory reason.
pub fn deliver_email(artifacts: &[PathBuf], settings: &Settings) -> Vec<DeliveryOutcome> {
    let mailer = settings.mailer();
    artifacts
        .iter()
        .map(|artifact| DeliveryOutcome {
            artifact: artifact.clone(),
            channel: Channel::Email,
            status: submit_artifact(artifact, mailer.as_deref()),
        })
        .collect()
}

fn submit_artifact(artifact: &Path, mailer: Option<&dyn Mailer>) -> DeliveryStatus {
    if !is_mailable(artifact) {
        return DeliveryStatus::Skipped {
            reason: "only EPUB files can be mailed to the device".into(),
        };
    }

    let Some(mailer) = mailer else {
        return DeliveryStatus::Failed {
            reason: MailError::NotConfigured.to_string(),
        };
    };

    let bytes = match fs::read(artifact) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("Failed to read {}: {}", artifact.display(), err);
            return DeliveryStatus::Failed {
                reason: format!("failed to read '{}': {err}", artifact.display()),
            };
        }
    };

    let mail = OutgoingMail {
        subject: MAIL_SUBJECT.into(),
        attachment_name: attachment_name(artifact),
        attachment: bytes,
    };

    match mailer.send(&mail) {
        Ok(()) => {
            info!("Mailed {} to the device", artifact.display());
            DeliveryStatus::Delivered
        }
        Err(err) => {
            warn!("Failed to mail {}: {}", artifact.display(), err);
            DeliveryStatus::Failed {
                reason: err.to_string(),
            }
        }
    }
}

/// The mail-in pipeline accepts only the EPUB container; the check is
/// case-insensitive on the extension.
fn is_mailable(artifact: &Path) -> bool {
    artifact
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("epub"))
}

fn attachment_name(artifact: &Path) -> String {
    artifact
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "book.epub".into())
}
