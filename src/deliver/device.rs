//! Device discovery: find a mounted reading device by its folder marker.
//!
//! A Kindle-class device mounted as USB storage exposes a `documents` folder
//! at the volume root. Discovery probes the fixed set of single-letter
//! volume roots (`A:\` … `Z:\`) and takes the first volume carrying the
//! marker. Pure existence checks, no mutation; an absent device is a normal
//! outcome, not an error.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Folder that marks a volume as a reading device. Compared as-is; the
/// device firmware creates it lowercase.
pub const DEVICE_MARKER: &str = "documents";

/// Locate a mounted reading device's document folder.
///
/// Returns the `documents` folder of the first matching volume, or `None`
/// when no device is mounted.
pub fn locate_device() -> Option<PathBuf> {
    locate_device_among(drive_roots())
}

/// Like [`locate_device`], probing the given volume roots instead of drive
/// letters. Exists so tests (and non-Windows callers) can supply their own
/// mount points.
pub fn locate_device_among<I, P>(roots: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for root in roots {
        let candidate = root.as_ref().join(DEVICE_MARKER);
        if candidate.is_dir() {
            debug!("Reading device found at {}", candidate.display());
            return Some(candidate);
        }
    }
    None
}

/// The fixed probe set: `A:\` through `Z:\`.
fn drive_roots() -> Vec<PathBuf> {
    (b'A'..=b'Z')
        .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
        .collect()
}
