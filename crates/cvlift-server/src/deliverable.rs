//! Deliverable Resolution
//!
//! Maps a granted download to the file that should be served. The demo
//! ships exactly one static asset, but the gate itself never assumes that:
//! swapping in per-user generated content means implementing this trait,
//! nothing else changes.

use std::path::PathBuf;

use cvlift_payments::DownloadGrant;

/// Resolves which file a granted download receives
pub trait DeliverableSource: Send + Sync {
    fn resolve(&self, grant: &DownloadGrant) -> PathBuf;
}

/// The single fixed asset this demo serves to every subscriber
pub struct StaticDeliverable {
    path: PathBuf,
}

impl StaticDeliverable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DeliverableSource for StaticDeliverable {
    fn resolve(&self, _grant: &DownloadGrant) -> PathBuf {
        self.path.clone()
    }
}
