//! Job description and per-job result types.
//!
//! A [`ConversionJob`] is built once per book by the driver and destroyed
//! when the pipeline returns a terminal outcome for that book. The pipeline
//! never mutates it.

use crate::deliver::DeliveryOutcome;
use crate::error::{EngineError, FerryError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Target e-book container format.
///
/// `Epub` is the only format accepted by the device's mail-in pipeline
/// (a ZIP-based container, MIME `application/epub+zip`); the others can only
/// travel over the storage-copy channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Epub,
    Azw3,
    Mobi,
}

impl OutputFormat {
    /// File extension / engine format identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Epub => "epub",
            OutputFormat::Azw3 => "azw3",
            OutputFormat::Mobi => "mobi",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = FerryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "epub" => Ok(OutputFormat::Epub),
            "azw3" => Ok(OutputFormat::Azw3),
            "mobi" => Ok(OutputFormat::Mobi),
            other => Err(FerryError::UnknownFormat(other.to_string())),
        }
    }
}

/// One book to convert: source document, metadata, and target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionJob {
    /// Source document path (typically a PDF).
    pub source: PathBuf,
    /// Optional cover image passed to the engine as `--cover`.
    pub cover: Option<PathBuf>,
    /// Book title. Used verbatim as the output file name — characters illegal
    /// on the target filesystem are the caller's problem, not validated here.
    pub title: String,
    /// Author string passed to the engine as `--authors`.
    pub author: String,
    /// Directory the artifact is written into (created if absent).
    pub output_dir: PathBuf,
    /// Target container format.
    pub format: OutputFormat,
    /// Run the Ghostscript pre-processing pass before converting.
    pub optimize: bool,
}

impl ConversionJob {
    /// The artifact path this job will produce: `output_dir/{title}.{format}`.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.title, self.format.as_str()))
    }
}

/// Outcome of the converter stage for one job.
///
/// Either an artifact path (success) or the engine diagnostic (failure);
/// immutable once returned. A failure here is job-scoped: the driver reports
/// it and moves on to the next book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Path of the produced artifact; `None` when the engine failed.
    pub artifact: Option<PathBuf>,
    /// Engine diagnostic when no artifact was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EngineError>,
    /// Wall-clock time of the sanitize + convert stages.
    pub duration_ms: u64,
}

impl ConversionResult {
    /// True when the job produced an artifact (and a journal line).
    pub fn succeeded(&self) -> bool {
        self.artifact.is_some()
    }
}

/// Aggregate outcome of one job: the conversion plus every delivery attempt.
///
/// This is what the CLI serialises for `--json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub title: String,
    pub conversion: ConversionResult,
    pub deliveries: Vec<DeliveryOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn job(title: &str, format: OutputFormat) -> ConversionJob {
        ConversionJob {
            source: "book.pdf".into(),
            cover: None,
            title: title.into(),
            author: "Herbert".into(),
            output_dir: "out".into(),
            format,
            optimize: false,
        }
    }

    #[test]
    fn format_round_trips_through_str() {
        for (text, format) in [
            ("epub", OutputFormat::Epub),
            ("AZW3", OutputFormat::Azw3),
            (" mobi ", OutputFormat::Mobi),
        ] {
            assert_eq!(text.parse::<OutputFormat>().unwrap(), format);
        }
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_path_joins_title_and_format() {
        assert_eq!(
            job("Dune", OutputFormat::Epub).output_path(),
            Path::new("out").join("Dune.epub")
        );
        assert_eq!(
            job("Dune", OutputFormat::Azw3).output_path(),
            Path::new("out").join("Dune.azw3")
        );
    }

    #[test]
    fn title_is_used_verbatim() {
        // Path-unsafe characters are intentionally not rewritten.
        let path = job("Dune: Messiah", OutputFormat::Epub).output_path();
        assert_eq!(path.file_name().unwrap(), "Dune: Messiah.epub");
    }

    #[test]
    fn result_succeeded_tracks_artifact() {
        let ok = ConversionResult {
            artifact: Some("out/Dune.epub".into()),
            error: None,
            duration_ms: 10,
        };
        assert!(ok.succeeded());

        let failed = ConversionResult {
            artifact: None,
            error: Some(crate::error::EngineError::NotFound {
                program: "ebook-convert".into(),
            }),
            duration_ms: 1,
        };
        assert!(!failed.succeeded());
    }
}
