//! History ledger: the append-only log of produced images.

use crate::image::Image;
use serde::{Deserialize, Serialize};

/// Append-only, newest-first log of every image the session ever produced,
/// whether by generation or by edit.
///
/// The ledger never shrinks except when replaced wholesale by a session
/// load. Index 0 is always the most recently produced image. Multi-image
/// batches are recorded as one contiguous block in generation order; the
/// single-flight discipline upstream guarantees no interleaving.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLedger {
    images: Vec<Image>,
}

impl HistoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one image at the front of the ledger.
    pub fn record(&mut self, image: Image) {
        self.images.insert(0, image);
    }

    /// Records a whole batch at the front of the ledger as one contiguous
    /// block, preserving the batch's own order.
    pub fn record_batch(&mut self, images: impl IntoIterator<Item = Image>) {
        self.images.splice(0..0, images);
    }

    /// Replaces the entire ledger. Used only by session load.
    pub fn replace_all(&mut self, images: Vec<Image>) {
        self.images = images;
    }

    /// The recorded images, newest first.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Number of recorded images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl From<Vec<Image>> for HistoryLedger {
    fn from(images: Vec<Image>) -> Self {
        Self { images }
    }
}

impl From<HistoryLedger> for Vec<Image> {
    fn from(ledger: HistoryLedger) -> Self {
        ledger.images
    }
}
