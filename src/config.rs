//! Configuration for the conversion-and-delivery pipeline.
//!
//! All behaviour is controlled through [`Settings`], built via
//! [`SettingsBuilder`] or loaded once at startup with
//! [`Settings::from_env`]. The struct is constructed once and passed by
//! reference into every component — no component reads the environment on
//! its own, which keeps the pipeline deterministic under test.
//!
//! Two seams are injected here rather than hard-wired:
//!
//! * [`ToolRunner`] — how external processes (converter, optimizer) are
//!   spawned. Defaults to [`SystemRunner`].
//! * [`Mailer`] — how mail is submitted. Defaults to the lettre SMTP
//!   transport built from [`SmtpSettings`].
//!
//! Tests substitute fakes for both and never touch real binaries or sockets.

use crate::deliver::email::{Mailer, SmtpMailer};
use crate::error::FerryError;
use crate::runner::{discover_tool, SystemRunner, ToolRunner};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default journal file, relative to the working directory.
pub const DEFAULT_JOURNAL: &str = "conversion_log.txt";

/// Credentials and endpoints for the mail delivery channel.
///
/// The recipient is fixed per configuration: the device's mail-in address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    /// Mail-submission host, e.g. `smtp.gmail.com`.
    pub host: String,
    /// Submission port; 587 is the STARTTLS submission default.
    pub port: u16,
    /// Sender address, also used as the login user name.
    pub sender: String,
    /// Login password (an app password for most providers).
    pub password: String,
    /// The device's mail-in address.
    pub recipient: String,
}

/// Pipeline configuration, shared by reference across all components.
///
/// Built via [`Settings::builder()`], [`Settings::from_env()`], or
/// [`Settings::default()`].
#[derive(Clone)]
pub struct Settings {
    /// Path of the external conversion engine (Calibre's `ebook-convert`).
    pub converter: PathBuf,
    /// Path of the external document optimizer (Ghostscript).
    pub optimizer: PathBuf,
    /// Append-only conversion journal location.
    pub journal_path: PathBuf,
    /// Mail channel configuration; `None` disables mail delivery.
    pub smtp: Option<SmtpSettings>,
    /// Injected process runner. `None` means [`SystemRunner`].
    pub runner: Option<Arc<dyn ToolRunner>>,
    /// Injected mail transport. `None` means lettre SMTP built from `smtp`.
    pub mailer: Option<Arc<dyn Mailer>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            converter: PathBuf::from("ebook-convert"),
            optimizer: PathBuf::from("gs"),
            journal_path: PathBuf::from(DEFAULT_JOURNAL),
            smtp: None,
            runner: None,
            mailer: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("converter", &self.converter)
            .field("optimizer", &self.optimizer)
            .field("journal_path", &self.journal_path)
            .field("smtp", &self.smtp.as_ref().map(|s| (&s.host, s.port)))
            .field("runner", &self.runner.as_ref().map(|_| "<dyn ToolRunner>"))
            .field("mailer", &self.mailer.as_ref().map(|_| "<dyn Mailer>"))
            .finish()
    }
}

impl Settings {
    /// Create a new builder for `Settings`.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder {
            settings: Self::default(),
        }
    }

    /// Load configuration from the process environment, read once at startup.
    ///
    /// | Variable | Meaning | Default |
    /// |----------|---------|---------|
    /// | `EBOOK_CONVERT_PATH` | converter executable | discovered on `PATH` |
    /// | `GHOSTSCRIPT_PATH`   | optimizer executable | discovered on `PATH` |
    /// | `BOOKFERRY_JOURNAL`  | journal file | `conversion_log.txt` |
    /// | `SMTP_SERVER`        | mail host; unset disables mail | — |
    /// | `SMTP_PORT`          | mail port | `587` |
    /// | `EMAIL_SENDER`       | sender / login | required with `SMTP_SERVER` |
    /// | `EMAIL_PASSWORD`     | login password | required with `SMTP_SERVER` |
    /// | `EMAIL_RECIPIENT`    | device mail-in address | required with `SMTP_SERVER` |
    ///
    /// # Errors
    /// `SMTP_SERVER` set with any companion variable missing, or an
    /// unparsable `SMTP_PORT`, is an [`FerryError::InvalidConfig`].
    pub fn from_env() -> Result<Self, FerryError> {
        let mut builder = Self::builder();

        match non_empty_var("EBOOK_CONVERT_PATH") {
            Some(path) => builder = builder.converter(path),
            None => {
                if let Some(found) = discover_tool(&["ebook-convert"]) {
                    builder = builder.converter(found);
                }
            }
        }

        match non_empty_var("GHOSTSCRIPT_PATH") {
            Some(path) => builder = builder.optimizer(path),
            None => {
                // gswin*c are the console binaries of the Windows installer.
                if let Some(found) = discover_tool(&["gs", "gswin64c", "gswin32c"]) {
                    builder = builder.optimizer(found);
                }
            }
        }

        if let Some(path) = non_empty_var("BOOKFERRY_JOURNAL") {
            builder = builder.journal(path);
        }

        if let Some(host) = non_empty_var("SMTP_SERVER") {
            let port = match non_empty_var("SMTP_PORT") {
                Some(raw) => raw.parse::<u16>().map_err(|_| {
                    FerryError::InvalidConfig(format!("SMTP_PORT is not a port number: '{raw}'"))
                })?,
                None => 587,
            };
            builder = builder.smtp(SmtpSettings {
                host,
                port,
                sender: required_var("EMAIL_SENDER")?,
                password: required_var("EMAIL_PASSWORD")?,
                recipient: required_var("EMAIL_RECIPIENT")?,
            });
        }

        builder.build()
    }

    /// The process runner: the injected one, or [`SystemRunner`].
    pub fn runner(&self) -> Arc<dyn ToolRunner> {
        self.runner
            .clone()
            .unwrap_or_else(|| Arc::new(SystemRunner))
    }

    /// The mail transport: the injected one, or lettre SMTP built from
    /// [`Settings::smtp`]. `None` when mail is unconfigured.
    pub fn mailer(&self) -> Option<Arc<dyn Mailer>> {
        if let Some(ref mailer) = self.mailer {
            return Some(Arc::clone(mailer));
        }
        self.smtp
            .as_ref()
            .map(|smtp| Arc::new(SmtpMailer::new(smtp.clone())) as Arc<dyn Mailer>)
    }
}

/// Builder for [`Settings`].
#[derive(Debug)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn converter(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.converter = path.into();
        self
    }

    pub fn optimizer(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.optimizer = path.into();
        self
    }

    pub fn journal(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.journal_path = path.into();
        self
    }

    pub fn smtp(mut self, smtp: SmtpSettings) -> Self {
        self.settings.smtp = Some(smtp);
        self
    }

    pub fn runner(mut self, runner: Arc<dyn ToolRunner>) -> Self {
        self.settings.runner = Some(runner);
        self
    }

    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.settings.mailer = Some(mailer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<Settings, FerryError> {
        if let Some(ref smtp) = self.settings.smtp {
            if smtp.host.is_empty() {
                return Err(FerryError::InvalidConfig("SMTP host is empty".into()));
            }
            if smtp.port == 0 {
                return Err(FerryError::InvalidConfig("SMTP port must be nonzero".into()));
            }
            if smtp.sender.is_empty() || smtp.recipient.is_empty() {
                return Err(FerryError::InvalidConfig(
                    "SMTP sender and recipient must both be set".into(),
                ));
            }
        }
        Ok(self.settings)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

fn required_var(key: &str) -> Result<String, FerryError> {
    non_empty_var(key).ok_or_else(|| {
        FerryError::InvalidConfig(format!("SMTP_SERVER is set but {key} is missing"))
    })
}
