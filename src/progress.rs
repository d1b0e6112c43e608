//! Progress-callback trait for per-item stage events.
//!
//! The OCR, translation and interpretation stages each walk a list of items
//! (page images, verses, verse groups) one at a time. Inject an
//! [`Arc<dyn StageProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to hear about
//! each item as it finishes. The CLI drives an indicatif bar from it.
//!
//! # Example
//!
//! ```rust
//! use charaka_pipeline::{PipelineConfig, StageProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl StageProgressCallback for Counter {
//!     fn on_item_complete(&self, _stage: &str, item: &str, index: usize, total: usize) {
//!         let done = self.0.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{item}: {index}/{total} ({done} so far)");
//!     }
//! }
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by a stage as it processes each item.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is 1-based.
pub trait StageProgressCallback: Send + Sync {
    /// Called once before the first item, with the number of items.
    fn on_stage_start(&self, stage: &str, total: usize) {
        let _ = (stage, total);
    }

    /// Called when an item finished without error.
    fn on_item_complete(&self, stage: &str, item: &str, index: usize, total: usize) {
        let _ = (stage, item, index, total);
    }

    /// Called when an item failed but the stage carries on.
    fn on_item_error(&self, stage: &str, item: &str, index: usize, total: usize, error: &str) {
        let _ = (stage, item, index, total, error);
    }

    /// Called once after every item has been attempted.
    fn on_stage_complete(&self, stage: &str, total: usize, success_count: usize) {
        let _ = (stage, total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl StageProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn StageProgressCallback>;

/// Resolve an optional callback to something that can always be called.
pub(crate) fn or_noop(cb: Option<&ProgressCallback>) -> ProgressCallback {
    cb.cloned()
        .unwrap_or_else(|| Arc::new(NoopProgressCallback) as ProgressCallback)
}
