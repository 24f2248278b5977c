//! CLI binary for bookferry.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ConversionJob` plus `Settings` and prints per-job / per-artifact
//! outcomes. All decisions live in the library.

use anyhow::{Context, Result};
use bookferry::{
    convert_book, deliver_email, deliver_usb, Channel, ConversionJob, DeliveryOutcome,
    DeliveryStatus, JobOutcome, Journal, OutputFormat, Settings,
};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a PDF to EPUB with a cover
  bookferry convert book.pdf --title "Dune" --author "Frank Herbert" --cover cover.jpg

  # Convert to AZW3 and copy straight onto a connected device
  bookferry convert book.pdf --title "Dune" --author "Frank Herbert" --format azw3 --usb

  # Pre-clean a scanned PDF through Ghostscript before converting
  bookferry convert scan.pdf --title "Notes" --author "Me" --optimize

  # Convert and mail the EPUB to the device's inbox address
  bookferry convert book.pdf --title "Dune" --author "Frank Herbert" --email

  # Send already-converted files over USB
  bookferry send-usb out/Dune.epub out/Hyperion.azw3

  # Mail already-converted EPUBs (non-EPUB files are skipped)
  bookferry send-email out/Dune.epub

ENVIRONMENT VARIABLES:
  EBOOK_CONVERT_PATH   Calibre ebook-convert executable (else discovered on PATH)
  GHOSTSCRIPT_PATH     Ghostscript executable (else discovered on PATH)
  BOOKFERRY_JOURNAL    Conversion journal file (default: conversion_log.txt)
  SMTP_SERVER          Mail-submission host; unset disables the mail channel
  SMTP_PORT            Mail-submission port (default: 587)
  EMAIL_SENDER         Sender address, also the SMTP login
  EMAIL_PASSWORD       SMTP login password (use an app password)
  EMAIL_RECIPIENT      The device's mail-in address

SETUP:
  1. Install Calibre (for ebook-convert) and optionally Ghostscript.
  2. For mail delivery, export the SMTP_* / EMAIL_* variables above and
     allow-list EMAIL_SENDER in your device's approved sender list.
"#;

/// Convert documents to e-reader formats and ferry them to a device.
#[derive(Parser, Debug)]
#[command(
    name = "bookferry",
    version,
    about = "Convert documents to e-reader formats and ferry them to a device over USB or email",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BOOKFERRY_VERBOSE", global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "BOOKFERRY_QUIET", global = true)]
    quiet: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "BOOKFERRY_NO_PROGRESS", global = true)]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert one document, then optionally deliver the artifact.
    Convert {
        /// Source document (typically a PDF).
        source: PathBuf,

        /// Book title; also becomes the output file name.
        #[arg(long)]
        title: String,

        /// Author name recorded in the book metadata.
        #[arg(long)]
        author: String,

        /// Cover image (JPG/PNG) passed to the engine.
        #[arg(long)]
        cover: Option<PathBuf>,

        /// Target format.
        #[arg(long, value_enum, default_value = "epub")]
        format: FormatArg,

        /// Directory the artifact is written into.
        #[arg(short, long, env = "BOOKFERRY_OUTPUT_DIR", default_value = "Converted_Books")]
        output_dir: PathBuf,

        /// Pre-clean the source through Ghostscript before converting.
        #[arg(long)]
        optimize: bool,

        /// Copy the artifact onto a connected reading device.
        #[arg(long)]
        usb: bool,

        /// Mail the artifact to the device's inbox address (EPUB only).
        #[arg(long)]
        email: bool,

        /// Print the structured job outcome as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Copy finished artifacts onto a connected reading device.
    SendUsb {
        /// Artifact files to copy.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Mail finished EPUB artifacts to the device's inbox address.
    SendEmail {
        /// Artifact files to mail; non-EPUB files are skipped.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Epub,
    Azw3,
    Mobi,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Epub => OutputFormat::Epub,
            FormatArg::Azw3 => OutputFormat::Azw3,
            FormatArg::Mobi => OutputFormat::Mobi,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner is the user-facing feedback while the engine runs;
    // library INFO logs would fight it for the terminal.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let settings = Settings::from_env().context("Invalid configuration")?;

    let quiet = cli.quiet;
    let show_spinner = !cli.quiet && !cli.no_progress;

    match cli.command {
        Command::Convert {
            source,
            title,
            author,
            cover,
            format,
            output_dir,
            optimize,
            usb,
            email,
            json,
        } => {
            let job = ConversionJob {
                source,
                cover,
                title,
                author,
                output_dir,
                format: format.into(),
                optimize,
            };

            let mut channels = Vec::new();
            if usb {
                channels.push(Channel::Usb);
            }
            if email {
                channels.push(Channel::Email);
            }

            run_convert(&job, &channels, &settings, quiet, show_spinner, json)
        }
        Command::SendUsb { files } => {
            report_deliveries(&deliver_usb(&files), quiet);
            Ok(())
        }
        Command::SendEmail { files } => {
            report_deliveries(&deliver_email(&files, &settings), quiet);
            Ok(())
        }
    }
}

fn run_convert(
    job: &ConversionJob,
    channels: &[Channel],
    settings: &Settings,
    quiet: bool,
    show_spinner: bool,
    json: bool,
) -> Result<()> {
    let mut journal = Journal::open(&settings.journal_path).with_context(|| {
        format!(
            "Failed to open journal at {}",
            settings.journal_path.display()
        )
    })?;

    let spinner = (show_spinner && !json).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(format!("Converting \"{}\"…", job.title));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let conversion = convert_book(job, settings, &mut journal);

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let conversion = conversion.context("Conversion pipeline failed")?;

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

    let outcome = JobOutcome {
        title: job.title.clone(),
        conversion,
        deliveries,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise outcome")?
        );
    } else {
        report_conversion(&outcome, &journal, quiet);
        report_deliveries(&outcome.deliveries, quiet);
    }

    // Per-job failures are reported, not raised; the exit code still tells
    // scripts whether an artifact exists.
    if !outcome.conversion.succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

fn report_conversion(outcome: &JobOutcome, journal: &Journal, quiet: bool) {
    match (&outcome.conversion.artifact, &outcome.conversion.error) {
        (Some(artifact), _) => {
            if !quiet {
                eprintln!(
                    "{} \"{}\" converted  {}  →  {}",
                    green("✔"),
                    outcome.title,
                    dim(&format!("{}ms", outcome.conversion.duration_ms)),
                    bold(&artifact.display().to_string()),
                );
                eprintln!("   {}", dim(&format!("journal: {}", journal.path().display())));
            }
        }
        (None, Some(err)) => {
            eprintln!("{} \"{}\" failed:\n{}", red("✘"), outcome.title, err);
        }
        (None, None) => {
            eprintln!("{} \"{}\" produced no artifact", red("✘"), outcome.title);
        }
    }
}

fn report_deliveries(outcomes: &[DeliveryOutcome], quiet: bool) {
    for outcome in outcomes {
        let channel = match outcome.channel {
            Channel::Usb => "usb",
            Channel::Email => "email",
        };
        match &outcome.status {
            DeliveryStatus::Delivered => {
                if !quiet {
                    eprintln!(
                        "{} {}  {}",
                        green("✔"),
                        outcome.artifact.display(),
                        dim(&format!("delivered via {channel}"))
                    );
                }
            }
            DeliveryStatus::Skipped { reason } => {
                if !quiet {
                    eprintln!(
                        "{} {}  {}",
                        dim("–"),
                        outcome.artifact.display(),
                        dim(&format!("skipped ({channel}): {reason}"))
                    );
                }
            }
            DeliveryStatus::Failed { reason } => {
                eprintln!(
                    "{} {}  {}",
                    red("✘"),
                    outcome.artifact.display(),
                    red(&format!("failed ({channel}): {reason}"))
                );
            }
        }
    }
}
