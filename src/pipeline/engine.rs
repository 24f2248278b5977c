//! Format conversion: drive the external conversion engine.
//!
//! The engine (Calibre's `ebook-convert`) is a black box reached through its
//! command-line interface: positional source/destination arguments plus
//! named options for cover, title, and author. Exit 0 means the destination
//! file was written; anything else is a job-scoped failure whose stderr is
//! surfaced to the operator verbatim. There is no retry — a conversion that
//! failed once will fail the same way again.

use crate::config::Settings;
use crate::error::EngineError;
use crate::job::ConversionJob;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Convert `source` according to `job`, returning the artifact path.
///
/// Ensures `job.output_dir` exists (creating it if absent) and writes the
/// artifact to `output_dir/{title}.{format}`. The title lands in the file
/// name verbatim — no character rewriting.
///
/// `source` is passed separately from `job.source` because the sanitizer may
/// have substituted a cleaned copy.
///
/// # Errors
/// Every failure is an [`EngineError`]; callers fold it into the job's
/// [`crate::job::ConversionResult`] rather than aborting the batch.
pub fn convert_document(
    job: &ConversionJob,
    source: &Path,
    settings: &Settings,
) -> Result<PathBuf, EngineError> {
    fs::create_dir_all(&job.output_dir).map_err(|err| EngineError::OutputDir {
        path: job.output_dir.clone(),
        detail: err.to_string(),
    })?;

    let destination = job.output_path();
    let args = engine_args(source, &destination, job);
    debug!(
        "Invoking {} with {} args",
        settings.converter.display(),
        args.len()
    );

    let output = settings
        .runner()
        .run(&settings.converter, &args)
        .map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => EngineError::NotFound {
                program: settings.converter.display().to_string(),
            },
            _ => EngineError::Invoke {
                program: settings.converter.display().to_string(),
                detail: err.to_string(),
            },
        })?;

    if !output.success() {
        return Err(EngineError::Failed {
            title: job.title.clone(),
            code: output.code,
            stderr: output.stderr,
        });
    }

    info!("Converted {} -> {}", source.display(), destination.display());
    Ok(destination)
}

/// Engine argument list: `<source> <dest> [--cover <img>] --title <t> --authors <a>`.
fn engine_args(source: &Path, destination: &Path, job: &ConversionJob) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        source.as_os_str().to_os_string(),
        destination.as_os_str().to_os_string(),
    ];
    if let Some(ref cover) = job.cover {
        args.push(OsString::from("--cover"));
        args.push(cover.as_os_str().to_os_string());
    }
    args.push(OsString::from("--title"));
    args.push(OsString::from(&job.title));
    args.push(OsString::from("--authors"));
    args.push(OsString::from(&job.author));
    args
}
