//! Delivery channels: move a finished artifact onto the reading device.
//!
//! Two channels exist — a storage copy onto a mounted device ([`usb`]) and a
//! mail submission to the device's inbox address ([`email`]). Both take a
//! batch of artifact paths and return one [`DeliveryOutcome`] per artifact;
//! neither ever returns `Err`. A channel that cannot run (no device, wrong
//! file type, no mail configuration) reports `Skipped` or `Failed` per
//! artifact and the caller's batch continues.

pub mod device;
pub mod email;
pub mod usb;

pub use device::locate_device;
pub use email::{deliver_email, Mailer, OutgoingMail};
pub use usb::{deliver_usb, deliver_usb_to};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which channel produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Usb,
    Email,
}

/// Terminal state of one artifact on one channel.
///
/// Never raised as an error — always reported, and the pipeline continues
/// with the next artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// The artifact reached the device.
    Delivered,
    /// A precondition was unmet (no device found, non-mailable file type);
    /// nothing was attempted.
    Skipped { reason: String },
    /// The attempt ran and hit a transport or filesystem error.
    Failed { reason: String },
}

impl DeliveryStatus {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, DeliveryStatus::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DeliveryStatus::Failed { .. })
    }
}

/// Per-artifact, per-channel delivery report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub artifact: PathBuf,
    pub channel: Channel,
    #[serde(flatten)]
    pub status: DeliveryStatus,
}
