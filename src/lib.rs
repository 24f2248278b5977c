//! # bookferry
//!
//! Convert documents to e-reader formats and ferry the result onto a reading
//! device — over a USB storage copy or as a mail attachment.
//!
//! ## Why this crate?
//!
//! Calibre's `ebook-convert` does excellent conversions but leaves the rest
//! of the chore manual: pre-cleaning scanned PDFs, finding the mounted
//! device, mailing EPUBs to the device's inbox address, and keeping a record
//! of what was converted. This crate wires those steps into one pipeline
//! with a single failure policy: nothing that goes wrong with one book or
//! one delivery aborts the batch.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document
//!  │
//!  ├─ 1. Sanitize  optional Ghostscript rewrite (best-effort, falls back)
//!  ├─ 2. Convert   external engine: source + metadata → {title}.{format}
//!  ├─ 3. Journal   append-only record of every successful conversion
//!  └─ 4. Deliver   USB storage copy and/or mail attachment, per-artifact
//!                  outcomes, never fatal
//! ```
//!
//! Execution is fully sequential and blocking: external processes and the
//! mail session run to completion with no internal parallelism and no
//! timeouts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bookferry::{convert_book, deliver_usb, ConversionJob, Journal, OutputFormat, Settings};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Tool paths and mail credentials come from the environment,
//!     // read once at startup.
//!     let settings = Settings::from_env()?;
//!     let mut journal = Journal::open(&settings.journal_path)?;
//!
//!     let job = ConversionJob {
//!         source: "book.pdf".into(),
//!         cover: Some("cover.jpg".into()),
//!         title: "Dune".into(),
//!         author: "Frank Herbert".into(),
//!         output_dir: "Converted_Books".into(),
//!         format: OutputFormat::Epub,
//!         optimize: false,
//!     };
//!
//!     let result = convert_book(&job, &settings, &mut journal)?;
//!     if let Some(artifact) = result.artifact {
//!         for outcome in deliver_usb(std::slice::from_ref(&artifact)) {
//!             println!("{outcome:?}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `bookferry` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! bookferry = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod deliver;
pub mod error;
pub mod job;
pub mod journal;
pub mod pipeline;
pub mod runner;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Settings, SettingsBuilder, SmtpSettings};
pub use convert::{convert_book, process_job};
pub use deliver::{
    deliver_email, deliver_usb, deliver_usb_to, locate_device, Channel, DeliveryOutcome,
    DeliveryStatus, Mailer, OutgoingMail,
};
pub use error::{EngineError, FerryError, MailError};
pub use job::{ConversionJob, ConversionResult, JobOutcome, OutputFormat};
pub use journal::{Journal, LogEntry};
pub use pipeline::sanitize::sanitize;
pub use runner::{SystemRunner, ToolOutput, ToolRunner};
