//! Storage-copy delivery: copy artifacts onto a mounted reading device.

use super::device::locate_device;
use super::{Channel, DeliveryOutcome, DeliveryStatus};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Copy each artifact into the document folder of a discovered device.
///
/// With no device mounted, every artifact yields `Skipped` and the
/// filesystem is left untouched. A copy error fails that artifact only;
/// the remaining artifacts are still attempted.
pub fn deliver_usb(artifacts: &[PathBuf]) -> Vec<DeliveryOutcome> {
    match locate_device() {
        Some(folder) => deliver_usb_to(&folder, artifacts),
        None => artifacts
            .iter()
            .map(|artifact| DeliveryOutcome {
                artifact: artifact.clone(),
                channel: Channel::Usb,
                status: DeliveryStatus::Skipped {
                    reason: "no reading device detected".into(),
                },
            })
            .collect(),
    }
}

/// Copy each artifact into a known device document folder.
pub fn deliver_usb_to(device_folder: &Path, artifacts: &[PathBuf]) -> Vec<DeliveryOutcome> {
    artifacts
        .iter()
        .map(|artifact| {
            let status = match copy_artifact(device_folder, artifact) {
                Ok(dest) => {
                    info!("Copied {} -> {}", artifact.display(), dest.display());
                    DeliveryStatus::Delivered
                }
                Err(err) => {
                    warn!("Failed to copy {}: {}", artifact.display(), err);
                    DeliveryStatus::Failed {
                        reason: err.to_string(),
                    }
                }
            };
            DeliveryOutcome {
                artifact: artifact.clone(),
                channel: Channel::Usb,
                status,
            }
        })
        .collect()
}

fn copy_artifact(device_folder: &Path, artifact: &Path) -> io::Result<PathBuf> {
    let name = artifact.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "artifact path has no file name")
    })?;
    let dest = device_folder.join(name);
    fs::copy(artifact, &dest)?;
    Ok(dest)
}
