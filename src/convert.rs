//! Conversion-and-delivery entry points.
//!
//! [`convert_book`] runs one job through sanitize → engine → journal;
//! [`process_job`] additionally fans the finished artifact out to the
//! requested delivery channels. Jobs are processed one at a time, each to
//! completion, by a driver that loops over its batch — there is no queueing
//! and no parallelism.
//!
//! ## Failure policy
//!
//! The ledger invariant is the load-bearing rule here: a journal line is
//! appended *iff* the engine produced an artifact, and delivery outcomes
//! never influence it. Engine failures are folded into the returned
//! [`ConversionResult`]; only journal I/O comes back as `Err`, because a
//! conversion this tool cannot record is the one promise it refuses to
//! break silently.

use crate::config::Settings;
use crate::deliver::{deliver_email, deliver_usb, Channel, DeliveryOutcome};
use crate::error::FerryError;
use crate::job::{ConversionJob, ConversionResult, JobOutcome};
use crate::journal::{Journal, LogEntry};
use crate::pipeline::{engine, sanitize::sanitize};
use std::time::Instant;
use tracing::{info, warn};

/// Convert one book: sanitize (if requested), invoke the engine, and record
/// the success in the journal.
///
/// # Returns
/// `Ok(ConversionResult)` whether or not the engine succeeded — a failed
/// conversion carries its diagnostic instead of an artifact.
///
/// # Errors
/// `Err(FerryError)` only when the journal cannot be appended after a
/// successful conversion.
pub fn convert_book(
    job: &ConversionJob,
    settings: &Settings,
    journal: &mut Journal,
) -> Result<ConversionResult, FerryError> {
    let start = Instant::now();
    info!("Converting \"{}\" by {}", job.title, job.author);

    let source = sanitize(&job.source, job.optimize, settings);

    match engine::convert_document(job, &source, settings) {
        Ok(artifact) => {
            journal.record(&LogEntry {
                title: job.title.clone(),
                author: job.author.clone(),
                artifact: artifact.clone(),
            })?;
            Ok(ConversionResult {
                artifact: Some(artifact),
                error: None,
                duration_ms: start.elapsed().as_millis() as u64,
            })
        }
        Err(err) => {
            warn!("Conversion of \"{}\" failed: {}", job.title, err);
            Ok(ConversionResult {
                artifact: None,
                error: Some(err),
                duration_ms: start.elapsed().as_millis() as u64,
            })
        }
    }
}

/// Convert one book and attempt each requested delivery channel.
///
/// Channels run in the given order against the single produced artifact;
/// with no artifact, no delivery is attempted. Per-channel outcomes are
/// collected into the returned [`JobOutcome`] — a delivery failure is data,
/// not an error.
pub fn process_job(
    job: &ConversionJob,
    settings: &Settings,
    journal: &mut Journal,
    channels: &[Channel],
) -> Result<JobOutcome, FerryError> {
    let conversion = convert_book(job, settings, journal)?;

    let mut deliveries: Vec<DeliveryOutcome> = Vec::new();
    if let Some(ref artifact) = conversion.artifact {
        let batch = std::slice::from_ref(artifact);
        for channel in channels {
            match channel {
                Channel::Usb => deliveries.extend(deliver_usb(batch)),
                Channel::Email => deliveries.extend(deliver_email(batch, settings)),
            }
        }
    }

    Ok(JobOutcome {
        title: job.title.clone(),
        conversion,
        deliveries,
    })
}
