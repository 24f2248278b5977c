//! External-process invocation seam.
//!
//! Both external engines this crate drives (Calibre's `ebook-convert` and
//! Ghostscript) are invoked through the narrow [`ToolRunner`] trait rather
//! than `std::process::Command` directly. Production code uses
//! [`SystemRunner`]; tests inject a fake that records invocations and
//! simulates exit statuses without touching real binaries.
//!
//! The trait is deliberately minimal — `run(program, args)` returning exit
//! code plus captured stderr. Both engines communicate results exactly that
//! way: exit 0 on success, diagnostics on the error stream. Stdout is not
//! captured; neither tool reports anything there that the pipeline reads.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Captured result of one external-tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
    /// Captured standard-error text (lossy UTF-8).
    pub stderr: String,
}

impl ToolOutput {
    /// True when the tool exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an external program to completion and captures its outcome.
///
/// A spawn failure is an `io::Error`; `io::ErrorKind::NotFound` is how the
/// pipeline recognises the *tool-not-found* case (sanitizer falls back to the
/// original document, converter reports a no-artifact result).
pub trait ToolRunner: Send + Sync {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<ToolOutput>;
}

/// The production runner: blocking `std::process::Command`.
///
/// The invocation runs to its own completion or failure — no timeout is
/// enforced, so a hung engine blocks the pipeline (known limitation of the
/// sequential design).
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<ToolOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()?;

        Ok(ToolOutput {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Resolve the first of `candidates` found on `PATH`.
///
/// Used by [`crate::config::Settings::from_env`] when no explicit executable
/// path is configured, so a stock Calibre or Ghostscript install works with
/// zero configuration.
pub fn discover_tool(candidates: &[&str]) -> Option<PathBuf> {
    candidates.iter().find_map(|name| which::which(name).ok())
}
