//! Integration tests for the conversion-and-delivery pipeline.
//!
//! No real external binaries or sockets are touched: the external engines
//! run through a scripted `ToolRunner` (which writes the destination file on
//! simulated success, the way the real engine does) and mail goes through a
//! recording `Mailer`.

use bookferry::{
    convert_book, deliver_email, deliver_usb_to, process_job, Channel, ConversionJob,
    DeliveryStatus, EngineError, Journal, Mailer, MailError, OutgoingMail, OutputFormat, Settings,
    ToolOutput, ToolRunner,
};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ── Test doubles ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Script {
    /// Exit 0 and create the destination file, like the real engines do.
    Succeed,
    /// Exit nonzero with a diagnostic on stderr.
    Fail(i32, &'static str),
    /// Spawn fails as if the executable were missing.
    Missing,
}

/// Scripted stand-in for the external engines.
struct FakeRunner {
    script: Script,
    invocations: Mutex<Vec<(PathBuf, Vec<OsString>)>>,
}

impl FakeRunner {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            invocations: Mutex::new(Vec::new()),
        })
    }

    fn invocation_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }
}

impl ToolRunner for FakeRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<ToolOutput> {
        self.invocations
            .lock()
            .unwrap()
            .push((program.to_path_buf(), args.to_vec()));

        match self.script {
            Script::Succeed => {
                // The converter writes its second positional argument; the
                // optimizer writes the -sOutputFile= path.
                let destination = args.iter().find_map(|arg| {
                    let text = arg.to_string_lossy();
                    text.strip_prefix("-sOutputFile=").map(PathBuf::from)
                });
                let destination =
                    destination.unwrap_or_else(|| PathBuf::from(args[1].clone()));
                fs::write(destination, b"converted-bytes")?;
                Ok(ToolOutput {
                    code: Some(0),
                    stderr: String::new(),
                })
            }
            Script::Fail(code, stderr) => Ok(ToolOutput {
                code: Some(code),
                stderr: stderr.to_string(),
            }),
            Script::Missing => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
        }
    }
}

/// Recording stand-in for the SMTP transport.
#[derive(Default)]
struct FakeMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl FakeMailer {
    fn new() -> Arc<Self> {
        Arc::default()
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Mailer for FakeMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

struct Fixture {
    dir: tempfile::TempDir,
    runner: Arc<FakeRunner>,
    mailer: Arc<FakeMailer>,
    settings: Settings,
}

impl Fixture {
    fn new(script: Script) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(script);
        let mailer = FakeMailer::new();
        let settings = Settings::builder()
            .converter("ebook-convert")
            .optimizer("gs")
            .journal(dir.path().join("conversion_log.txt"))
            .runner(Arc::clone(&runner) as Arc<dyn ToolRunner>)
            .mailer(Arc::clone(&mailer) as Arc<dyn Mailer>)
            .build()
            .unwrap();
        Self {
            dir,
            runner,
            mailer,
            settings,
        }
    }

    fn job(&self, title: &str, format: OutputFormat) -> ConversionJob {
        let source = self.dir.path().join("book.pdf");
        fs::write(&source, b"%PDF-1.4 fake").unwrap();
        ConversionJob {
            source,
            cover: Some(self.dir.path().join("cover.jpg")),
            title: title.into(),
            author: "Herbert".into(),
            output_dir: self.dir.path().join("out"),
            format,
            optimize: false,
        }
    }

    fn journal(&self) -> Journal {
        Journal::open(self.settings.journal_path.clone()).unwrap()
    }

    fn journal_lines(&self) -> Vec<String> {
        match fs::read_to_string(&self.settings.journal_path) {
            Ok(text) => text.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}

// ── Conversion + journal invariant ───────────────────────────────────────────

#[test]
fn successful_conversion_appends_exactly_one_journal_line() {
    let fx = Fixture::new(Script::Succeed);
    let job = fx.job("Dune", OutputFormat::Epub);
    let mut journal = fx.journal();

    let result = convert_book(&job, &fx.settings, &mut journal).unwrap();

    let artifact = result.artifact.expect("artifact expected");
    assert_eq!(artifact, fx.dir.path().join("out").join("Dune.epub"));
    assert!(artifact.exists());

    let lines = fx.journal_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Dune"));
    assert!(lines[0].contains("Herbert"));
    assert!(lines[0].contains(&artifact.display().to_string()));
}

#[test]
fn failed_conversion_yields_no_artifact_and_no_journal_line() {
    let fx = Fixture::new(Script::Fail(1, "Input file is DRM locked"));
    let job = fx.job("Dune", OutputFormat::Epub);
    let mut journal = fx.journal();

    let result = convert_book(&job, &fx.settings, &mut journal).unwrap();

    assert!(result.artifact.is_none());
    match result.error {
        Some(EngineError::Failed { code, ref stderr, .. }) => {
            assert_eq!(code, Some(1));
            assert!(stderr.contains("DRM locked"));
        }
        ref other => panic!("expected Failed, got {other:?}"),
    }
    assert!(fx.journal_lines().is_empty());
}

#[test]
fn missing_engine_is_reported_not_fatal() {
    let fx = Fixture::new(Script::Missing);
    let job = fx.job("Dune", OutputFormat::Epub);
    let mut journal = fx.journal();

    let result = convert_book(&job, &fx.settings, &mut journal).unwrap();

    assert!(result.artifact.is_none());
    assert!(matches!(result.error, Some(EngineError::NotFound { .. })));
    assert!(fx.journal_lines().is_empty());
}

#[test]
fn optimize_runs_the_optimizer_before_the_engine() {
    let fx = Fixture::new(Script::Succeed);
    let mut job = fx.job("Dune", OutputFormat::Epub);
    job.optimize = true;
    let mut journal = fx.journal();

    let result = convert_book(&job, &fx.settings, &mut journal).unwrap();

    assert!(result.succeeded());
    // One optimizer invocation plus one engine invocation.
    assert_eq!(fx.runner.invocation_count(), 2);

    let invocations = fx.runner.invocations.lock().unwrap();
    let (_, gs_args) = &invocations[0];
    assert!(gs_args
        .iter()
        .any(|a| a.to_string_lossy() == "-dPDFSETTINGS=/screen"));

    // The engine received the cleaned sibling, not the original source.
    let (_, engine_args) = &invocations[1];
    assert!(engine_args[0].to_string_lossy().contains("book_cleaned"));
}

#[test]
fn batch_continues_after_a_failed_job() {
    let fx = Fixture::new(Script::Succeed);
    let failing = Fixture::new(Script::Fail(2, "boom"));
    let mut journal = fx.journal();

    // First book fails (separate runner), second succeeds; the journal only
    // ever sees the success.
    let bad_job = failing.job("Broken", OutputFormat::Epub);
    let result = convert_book(&bad_job, &failing.settings, &mut journal).unwrap();
    assert!(!result.succeeded());

    let good_job = fx.job("Dune", OutputFormat::Epub);
    let result = convert_book(&good_job, &fx.settings, &mut journal).unwrap();
    assert!(result.succeeded());

    let lines = fx.journal_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Dune"));
}

// ── USB delivery ─────────────────────────────────────────────────────────────

#[test]
fn usb_copy_failure_is_isolated_per_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let device = tempfile::tempdir().unwrap();

    let first = dir.path().join("a.epub");
    let missing = dir.path().join("missing.epub");
    let third = dir.path().join("c.epub");
    fs::write(&first, b"a").unwrap();
    fs::write(&third, b"c").unwrap();

    let outcomes = deliver_usb_to(device.path(), &[first, missing, third]);

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].status.is_delivered());
    assert!(outcomes[1].status.is_failed());
    assert!(outcomes[2].status.is_delivered());
    assert!(device.path().join("a.epub").exists());
    assert!(device.path().join("c.epub").exists());
}

#[cfg(not(windows))]
#[test]
fn usb_with_no_mounted_device_skips_everything() {
    // On a drive-letter-free platform, A:\ .. Z:\ never expose a documents
    // folder, so discovery comes back empty.
    let outcomes = bookferry::deliver_usb(&[PathBuf::from("out/Dune.epub")]);

    assert_eq!(outcomes.len(), 1);
    match &outcomes[0].status {
        DeliveryStatus::Skipped { reason } => assert!(reason.contains("no reading device")),
        other => panic!("expected Skipped, got {other:?}"),
    }
    assert!(!Path::new("out/Dune.epub").exists(), "nothing may be created");
}

// ── Mail delivery ────────────────────────────────────────────────────────────

#[test]
fn mail_skips_non_epub_without_any_network_action() {
    let fx = Fixture::new(Script::Succeed);
    let artifact = fx.dir.path().join("Dune.azw3");
    fs::write(&artifact, b"bytes").unwrap();

    let outcomes = deliver_email(&[artifact], &fx.settings);

    assert!(outcomes[0].status.is_skipped());
    assert_eq!(fx.mailer.sent_count(), 0);
}

#[test]
fn mail_attaches_the_artifact_by_base_name() {
    let fx = Fixture::new(Script::Succeed);
    let artifact = fx.dir.path().join("Dune.epub");
    fs::write(&artifact, b"epub-bytes").unwrap();

    let outcomes = deliver_email(&[artifact], &fx.settings);

    assert!(outcomes[0].status.is_delivered());
    let sent = fx.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].attachment_name, "Dune.epub");
    assert_eq!(sent[0].attachment, b"epub-bytes");
    assert_eq!(sent[0].subject, "Kindle Document");
}

#[test]
fn mail_mixed_batch_reports_each_artifact_independently() {
    let fx = Fixture::new(Script::Succeed);
    let epub = fx.dir.path().join("Dune.epub");
    let azw3 = fx.dir.path().join("Hyperion.azw3");
    let upper = fx.dir.path().join("Ubik.EPUB");
    fs::write(&epub, b"a").unwrap();
    fs::write(&azw3, b"b").unwrap();
    fs::write(&upper, b"c").unwrap();

    let outcomes = deliver_email(&[epub, azw3, upper], &fx.settings);

    assert!(outcomes[0].status.is_delivered());
    assert!(outcomes[1].status.is_skipped());
    assert!(outcomes[2].status.is_delivered());
    assert_eq!(fx.mailer.sent_count(), 2);
}

// ── End-to-end job processing ────────────────────────────────────────────────

#[test]
fn process_job_delivers_over_the_requested_channels() {
    let fx = Fixture::new(Script::Succeed);
    let job = fx.job("Dune", OutputFormat::Epub);
    let mut journal = fx.journal();

    let outcome = process_job(&job, &fx.settings, &mut journal, &[Channel::Email]).unwrap();

    assert!(outcome.conversion.succeeded());
    assert_eq!(outcome.deliveries.len(), 1);
    assert_eq!(outcome.deliveries[0].channel, Channel::Email);
    assert!(outcome.deliveries[0].status.is_delivered());
    assert_eq!(fx.mailer.sent_count(), 1);
}

#[test]
fn process_job_attempts_no_delivery_without_an_artifact() {
    let fx = Fixture::new(Script::Fail(1, "boom"));
    let job = fx.job("Dune", OutputFormat::Epub);
    let mut journal = fx.journal();

    let outcome =
        process_job(&job, &fx.settings, &mut journal, &[Channel::Usb, Channel::Email]).unwrap();

    assert!(!outcome.conversion.succeeded());
    assert!(outcome.deliveries.is_empty());
    assert_eq!(fx.mailer.sent_count(), 0);
}

#[test]
fn delivery_failure_never_touches_the_journal() {
    let fx = Fixture::new(Script::Succeed);
    // AZW3 artifact: mail channel will skip it, the journal line must stay.
    let job = fx.job("Dune", OutputFormat::Azw3);
    let mut journal = fx.journal();

    let outcome = process_job(&job, &fx.settings, &mut journal, &[Channel::Email]).unwrap();

    assert!(outcome.conversion.succeeded());
    assert!(outcome.deliveries[0].status.is_skipped());
    assert_eq!(fx.journal_lines().len(), 1);
}

#[test]
fn outcome_serialises_for_json_reporting() {
    let fx = Fixture::new(Script::Succeed);
    let job = fx.job("Dune", OutputFormat::Epub);
    let mut journal = fx.journal();

    let outcome = process_job(&job, &fx.settings, &mut journal, &[Channel::Email]).unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["title"], "Dune");
    assert!(json["conversion"]["artifact"]
        .as_str()
        .unwrap()
        .ends_with("Dune.epub"));
    assert_eq!(json["deliveries"][0]["status"], "delivered");
}
