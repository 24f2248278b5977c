//! Document pre-processing: optional Ghostscript rewrite of the source.
//!
//! Some PDFs carry broken cross-reference tables or bloated embedded assets
//! that trip the conversion engine. Rewriting them through Ghostscript's
//! `pdfwrite` device with the `/screen` quality preset produces a smaller,
//! well-formed document that converts more reliably.
//!
//! Failure policy: this stage is strictly best-effort. A missing Ghostscript
//! executable or a nonzero exit logs a warning and hands the *original*
//! document to the converter — pre-processing is never allowed to cost the
//! job its artifact.

use crate::config::Settings;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Optionally rewrite `source` through the external optimizer.
///
/// With `enabled = false` the input path is returned unchanged and no
/// process is spawned. With `enabled = true` the optimizer writes a sibling
/// file with `_cleaned` appended before the extension
/// (`book.pdf` → `book_cleaned.pdf`) and that path is returned on success.
///
/// Infallible: every failure falls back to `source`.
pub fn sanitize(source: &Path, enabled: bool, settings: &Settings) -> PathBuf {
    if !enabled {
        return source.to_path_buf();
    }

    let cleaned = cleaned_path(source);
    let args = optimizer_args(source, &cleaned);

    match settings.runner().run(&settings.optimizer, &args) {
        Ok(output) if output.success() => {
            info!("Optimized {} -> {}", source.display(), cleaned.display());
            cleaned
        }
        Ok(output) => {
            warn!(
                "Optimizer exited with {:?} for {}; using the original document\n{}",
                output.code,
                source.display(),
                output.stderr.trim()
            );
            source.to_path_buf()
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(
                "Optimizer '{}' not found; using the original document",
                settings.optimizer.display()
            );
            source.to_path_buf()
        }
        Err(err) => {
            warn!(
                "Failed to invoke optimizer '{}': {}; using the original document",
                settings.optimizer.display(),
                err
            );
            source.to_path_buf()
        }
    }
}

/// Sibling path with `_cleaned` appended before the extension.
fn cleaned_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(OsStr::to_os_string)
        .unwrap_or_else(|| OsString::from("document"));

    let mut name = stem;
    name.push("_cleaned");
    if let Some(ext) = source.extension() {
        name.push(".");
        name.push(ext);
    }
    source.with_file_name(name)
}

/// Fixed Ghostscript argument profile: PDF rewrite device, screen-quality
/// preset, fully non-interactive.
fn optimizer_args(input: &Path, output: &Path) -> Vec<OsString> {
    let mut out_flag = OsString::from("-sOutputFile=");
    out_flag.push(output.as_os_str());

    vec![
        OsString::from("-sDEVICE=pdfwrite"),
        OsString::from("-dCompatibilityLevel=1.4"),
        OsString::from("-dPDFSETTINGS=/screen"),
        OsString::from("-dNOPAUSE"),
        OsString::from("-dQUIET"),
        OsString::from("-dBATCH"),
        out_flag,
        input.as_os_str().to_os_string(),
    ]
}
