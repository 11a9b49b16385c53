//! Clipboard copies with a self-expiring "copied" indicator.
//!
//! Each copied item (a table row, an address chip) is tracked by an opaque
//! item id. A successful copy marks the id; the mark clears itself after the
//! feedback window. Ids expire independently, and copying the same id again
//! restarts only that id's window.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;

use crate::error::ErrorKind;

/// How long an item stays marked as copied.
pub const DEFAULT_COPY_FEEDBACK: Duration = Duration::from_millis(2000);

/// Errors from a clipboard write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    /// The host exposes no clipboard at all.
    #[error("clipboard is not available")]
    Unavailable,
    /// The host refused or failed the write.
    #[error("clipboard write failed: {0}")]
    WriteFailed(String),
}

impl ClipboardError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable => ErrorKind::ProviderUnavailable,
            Self::WriteFailed(_) => ErrorKind::ProviderRejected,
        }
    }
}

/// Access to the host clipboard.
#[async_trait::async_trait]
pub trait ClipboardBackend: Send + Sync {
    /// Writes text through the host's asynchronous clipboard API.
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;

    /// Legacy path: select the text in a scratch element and issue a copy
    /// command. Used only when [`write_text`](Self::write_text) fails.
    fn copy_via_selection(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Copies text and tracks which items currently show a confirmation.
///
/// Expiry timers run on the tokio runtime the copy was issued from.
#[derive(Clone)]
pub struct ClipboardService {
    backend: Arc<dyn ClipboardBackend>,
    feedback: Duration,
    marks: Arc<DashMap<String, u64>>,
    generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for ClipboardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardService")
            .field("feedback", &self.feedback)
            .field("marked", &self.marks.len())
            .finish_non_exhaustive()
    }
}

impl ClipboardService {
    /// Creates a service with the default two-second feedback window.
    #[must_use]
    pub fn new(backend: Arc<dyn ClipboardBackend>) -> Self {
        Self {
            backend,
            feedback: DEFAULT_COPY_FEEDBACK,
            marks: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Overrides the feedback window.
    #[must_use]
    pub fn with_feedback(mut self, feedback: Duration) -> Self {
        self.feedback = feedback;
        self
    }

    /// Copies `text` and marks `item_id` as copied.
    ///
    /// Falls back to the legacy selection path if the primary write fails.
    ///
    /// # Errors
    ///
    /// Returns the fallback's error when both paths fail; `item_id` is left
    /// unmarked.
    pub async fn copy(&self, text: &str, item_id: &str) -> Result<(), ClipboardError> {
        if let Err(err) = self.backend.write_text(text).await {
            #[cfg(feature = "telemetry")]
            tracing::debug!(error = %err, "Clipboard write failed, trying selection copy");
            #[cfg(not(feature = "telemetry"))]
            let _ = err;
            self.backend.copy_via_selection(text)?;
        }
        self.mark(item_id);
        Ok(())
    }

    fn mark(&self, item_id: &str) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        self.marks.insert(item_id.to_owned(), generation);

        let marks = Arc::clone(&self.marks);
        let key = item_id.to_owned();
        let feedback = self.feedback;
        tokio::spawn(async move {
            tokio::time::sleep(feedback).await;
            marks.remove_if(&key, |_, current| *current == generation);
        });
    }

    /// Returns `true` while `item_id` shows its copied confirmation.
    #[must_use]
    pub fn is_copied(&self, item_id: &str) -> bool {
        self.marks.contains_key(item_id)
    }

    /// Ids currently marked, sorted.
    #[must_use]
    pub fn copied_items(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.marks.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }
}
