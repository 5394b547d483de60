//! PDF exporter entry point.
//!
//! The [`Exporter`] holds validated settings and runs one
//! [`CaptureOrchestrator`] per [`export`](Exporter::export) call.
//!
//! # Example
//!
//! ```no_run
//! use headless_pdf::{CaptureJob, Exporter};
//!
//! # async fn example() -> headless_pdf::Result<()> {
//! let exporter = Exporter::builder()
//!     .binary("/usr/bin/chromium")
//!     .build()?;
//!
//! let job = CaptureJob::new("http://127.0.0.1:3031/?export=1", "doc.pdf");
//! let report = exporter.export(job).await?;
//! println!("{} bytes", report.bytes);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use crate::capture::{CaptureJob, CaptureOrchestrator, CaptureReport, CaptureSettings};
use crate::error::Result;

use super::builder::ExporterBuilder;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the exporter.
pub(crate) struct ExporterInner {
    /// Validated settings.
    pub settings: CaptureSettings,

    /// Exports currently running.
    pub active: AtomicUsize,
}

// ============================================================================
// Exporter
// ============================================================================

/// Headless renderer PDF exporter.
///
/// Cheap to clone; clones share settings. Concurrent exports each launch
/// their own renderer on their own port.
#[derive(Clone)]
pub struct Exporter {
    /// Shared inner state.
    pub(crate) inner: Arc<ExporterInner>,
}

impl fmt::Debug for Exporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exporter")
            .field("binary", &self.inner.settings.binary)
            .field("active", &self.active_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Exporter - Public API
// ============================================================================

impl Exporter {
    /// Creates a configuration builder for the exporter.
    #[inline]
    #[must_use]
    pub fn builder() -> ExporterBuilder {
        ExporterBuilder::new()
    }

    /// Returns the validated settings.
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &CaptureSettings {
        &self.inner.settings
    }

    /// Returns the number of exports currently running.
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.inner.active.load(Ordering::Relaxed)
    }

    /// Renders `job.page_url` to `job.output_path`.
    ///
    /// Dropping the returned future kills the renderer.
    ///
    /// # Errors
    ///
    /// See [`CaptureOrchestrator::run`].
    pub async fn export(&self, job: CaptureJob) -> Result<CaptureReport> {
        let _active = ActiveGuard::enter(&self.inner.active);
        debug!(active = self.active_count(), "Export requested");

        let mut orchestrator = CaptureOrchestrator::new(&self.inner.settings);
        orchestrator.run(&job).await
    }
}

// ============================================================================
// Exporter - Internal API
// ============================================================================

impl Exporter {
    /// Creates an exporter from validated settings.
    pub(crate) fn new(settings: CaptureSettings) -> Self {
        Self {
            inner: Arc::new(ExporterInner {
                settings,
                active: AtomicUsize::new(0),
            }),
        }
    }
}

/// Keeps the active counter accurate across early returns and cancellation.
struct ActiveGuard<'a>(&'a AtomicUsize);

impl<'a> ActiveGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(counter)
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::Error;

    #[test]
    fn test_exporter_is_clone_and_debug() {
        fn assert_clone<T: Clone>() {}
        fn assert_debug<T: fmt::Debug>() {}
        assert_clone::<Exporter>();
        assert_debug::<Exporter>();
    }

    #[test]
    fn test_exporter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Exporter>();
    }

    #[tokio::test]
    async fn test_invalid_job_leaves_no_active_export() {
        let exporter = Exporter::new(CaptureSettings::new("/nonexistent/renderer"));
        let job = CaptureJob::new("not a url", "/tmp/out.pdf");

        let err = exporter.export(job).await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
        assert_eq!(exporter.active_count(), 0);
    }
}
