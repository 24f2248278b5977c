//! Error types for the bookferry library.
//!
//! Three distinct error types reflect three distinct failure scopes:
//!
//! * [`FerryError`] — **Fatal to a job**: the pipeline cannot honour its
//!   durable-ledger promise (journal open/append) or was misconfigured.
//!   Returned as `Err(FerryError)` from the top-level `convert_book` /
//!   `process_job` functions.
//!
//! * [`EngineError`] — **Job-scoped, non-fatal to the run**: the external
//!   conversion engine could not produce an artifact (missing executable,
//!   nonzero exit, unwritable output directory). Stored inside
//!   [`crate::job::ConversionResult`] so callers see the diagnostic without
//!   losing the rest of the batch to one bad book.
//!
//! * [`MailError`] — **Artifact-scoped**: a single mail submission failed.
//!   Reduced to a [`crate::deliver::DeliveryStatus::Failed`] reason string;
//!   never propagated past the artifact it belongs to.
//!
//! The separation mirrors the pipeline's failure policy: nothing that goes
//! wrong with one book or one delivery may abort the whole run.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors returned by the bookferry library.
///
/// Converter-stage failures use [`EngineError`] and are stored in
/// [`crate::job::ConversionResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum FerryError {
    /// The conversion journal could not be opened for appending.
    #[error("Failed to open conversion journal '{path}': {source}")]
    JournalOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A journal line could not be appended after a successful conversion.
    #[error("Failed to append to conversion journal '{path}': {source}")]
    JournalAppend {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder or environment validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An output format string could not be parsed.
    #[error("Unknown output format '{0}' (expected one of: epub, azw3, mobi)")]
    UnknownFormat(String),
}

/// A job-scoped failure of the external conversion engine.
///
/// Stored in [`crate::job::ConversionResult::error`] when the job yields no
/// artifact. The batch continues; the operator reads the captured diagnostic.
///
/// Details are kept as plain strings (not `std::io::Error`) so results stay
/// `Clone` and serialisable for `--json` reporting.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum EngineError {
    /// The engine executable does not exist at the configured path.
    #[error("Conversion engine not found: '{program}'\nSet EBOOK_CONVERT_PATH to your Calibre ebook-convert executable.")]
    NotFound { program: String },

    /// The engine ran and exited nonzero. Not retryable.
    #[error("Conversion failed for \"{title}\" (exit {code:?}):\n{stderr}")]
    Failed {
        title: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The output directory could not be created.
    #[error("Failed to create output directory '{path}': {detail}")]
    OutputDir { path: PathBuf, detail: String },

    /// The engine process could not be spawned for a reason other than
    /// a missing executable (permissions, resource limits).
    #[error("Failed to invoke conversion engine '{program}': {detail}")]
    Invoke { program: String, detail: String },
}

/// An artifact-scoped mail submission failure.
#[derive(Debug, Error)]
pub enum MailError {
    /// No SMTP settings were supplied at startup.
    #[error("mail transport not configured: set SMTP_SERVER, EMAIL_SENDER, EMAIL_PASSWORD, EMAIL_RECIPIENT")]
    NotConfigured,

    /// A sender or recipient address did not parse as a mailbox.
    #[error("invalid mailbox address '{address}': {detail}")]
    Address { address: String, detail: String },

    /// The message could not be assembled.
    #[error("failed to build message: {0}")]
    Build(String),

    /// Session setup, STARTTLS upgrade, login, or submission failed.
    #[error("SMTP transport error: {0}")]
    Transport(String),
}
