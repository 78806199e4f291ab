//! The per-row batch loop.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use draft_model::{
    BatchOptions, BatchReport, FailureEntry, RenderContext, RenderError, RenderResult, Row,
};
use draft_render::DocumentRenderer;
use draft_transform::normalize_row;
use tracing::{Span, debug, info, info_span, warn};

use crate::cancel::CancellationToken;
use crate::error::BatchError;
use crate::naming::{FilenameAllocator, identity_label};

/// A rendered (or failed) row before it has been given an archive name.
#[derive(Debug)]
struct RowOutcome {
    row_index: usize,
    label: String,
    rendered: Result<Vec<u8>, RenderError>,
}

/// Runs batches against one renderer.
///
/// The runner holds no per-batch state, so one runner may serve any number
/// of batches, including concurrently.
pub struct BatchRunner<R: ?Sized> {
    renderer: Arc<R>,
    options: BatchOptions,
    cancel: CancellationToken,
}

impl<R> BatchRunner<R>
where
    R: DocumentRenderer + ?Sized + 'static,
{
    pub fn new(renderer: Arc<R>, options: BatchOptions) -> Self {
        Self {
            renderer,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Observe `token` instead of a private, never-cancelled one.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Process every row and assemble the archive and manifest.
    ///
    /// # Errors
    ///
    /// - [`BatchError::Template`] when the renderer rejects its template,
    ///   before any row is touched.
    /// - [`BatchError::EmptyInput`] for zero rows.
    /// - [`BatchError::AllRowsFailed`] when no row rendered.
    /// - [`BatchError::Cancelled`] when the token fired mid-batch.
    pub fn run(&self, rows: &[Row]) -> Result<BatchReport, BatchError> {
        let start = Instant::now();
        let workers = self.options.effective_workers();
        let span = info_span!("batch", rows = rows.len(), workers);
        let _guard = span.enter();

        self.renderer.validate()?;
        if rows.is_empty() {
            return Err(BatchError::EmptyInput);
        }

        let outcomes = if workers > 1 && rows.len() > 1 {
            self.render_parallel(rows, workers)?
        } else {
            self.render_sequential(rows)?
        };
        let results = self.assign_names(outcomes);
        let report = BatchReport::from_results(results, start.elapsed());

        info!(
            total = report.manifest.total_rows,
            generated = report.manifest.generated,
            failed = report.manifest.failed(),
            duration_ms = report.duration.as_millis(),
            "batch complete"
        );

        if report.archive.is_empty() {
            return Err(BatchError::AllRowsFailed {
                manifest: report.manifest,
            });
        }
        Ok(report)
    }

    fn render_sequential(&self, rows: &[Row]) -> Result<Vec<RowOutcome>, BatchError> {
        let mut outcomes = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(row_index, rows.len()));
            }
            outcomes.push(self.process_row(row_index, row));
        }
        Ok(outcomes)
    }

    /// Workers pull row indices from a shared counter. Outcomes are sorted
    /// back into row order before naming, so the result matches a
    /// sequential run.
    fn render_parallel(&self, rows: &[Row], workers: usize) -> Result<Vec<RowOutcome>, BatchError> {
        let next = AtomicUsize::new(0);
        let collected = Mutex::new(Vec::with_capacity(rows.len()));
        let span = Span::current();

        thread::scope(|scope| {
            for _ in 0..workers.min(rows.len()) {
                scope.spawn(|| {
                    let _guard = span.enter();
                    while !self.cancel.is_cancelled() {
                        let row_index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(row) = rows.get(row_index) else {
                            break;
                        };
                        let outcome = self.process_row(row_index, row);
                        collected
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(outcome);
                    }
                });
            }
        });

        let mut outcomes = collected
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        if outcomes.len() < rows.len() {
            return Err(self.cancelled(outcomes.len(), rows.len()));
        }
        outcomes.sort_by_key(|outcome| outcome.row_index);
        Ok(outcomes)
    }

    fn process_row(&self, row_index: usize, row: &Row) -> RowOutcome {
        let context = normalize_row(row, &self.options.date_columns);
        let label = identity_label(row_index, &context, &self.options);
        let rendered = self.render_context(context);
        match &rendered {
            Ok(bytes) => debug!(row = row_index + 1, bytes = bytes.len(), "row rendered"),
            Err(error) => warn!(row = row_index + 1, %error, "row failed to render"),
        }
        RowOutcome {
            row_index,
            label,
            rendered,
        }
    }

    fn render_context(&self, context: RenderContext) -> Result<Vec<u8>, RenderError> {
        match self.options.render_timeout() {
            None => render_guarded(&*self.renderer, &context),
            Some(timeout) => render_with_timeout(Arc::clone(&self.renderer), context, timeout),
        }
    }

    /// Names are handed out in row order, and only to rows that rendered.
    fn assign_names(&self, outcomes: Vec<RowOutcome>) -> Vec<RenderResult> {
        let mut names = FilenameAllocator::new(self.options.extension_suffix());
        outcomes
            .into_iter()
            .map(|outcome| match outcome.rendered {
                Ok(bytes) => RenderResult::Success {
                    row_index: outcome.row_index,
                    filename: names.allocate(&outcome.label),
                    bytes,
                },
                Err(error) => RenderResult::Failure(FailureEntry {
                    row_index: outcome.row_index,
                    label: outcome.label,
                    message: error.to_string(),
                }),
            })
            .collect()
    }

    fn cancelled(&self, processed: usize, total: usize) -> BatchError {
        warn!(processed, total, "batch cancelled");
        BatchError::Cancelled { processed, total }
    }
}

/// Run one batch with a fresh runner.
pub fn run_batch<R>(rows: &[Row], renderer: R, options: BatchOptions) -> Result<BatchReport, BatchError>
where
    R: DocumentRenderer + 'static,
{
    BatchRunner::new(Arc::new(renderer), options).run(rows)
}

/// Call the renderer, turning a panic into a row failure.
fn render_guarded<R>(renderer: &R, context: &RenderContext) -> Result<Vec<u8>, RenderError>
where
    R: DocumentRenderer + ?Sized,
{
    panic::catch_unwind(AssertUnwindSafe(|| renderer.render(context)))
        .unwrap_or_else(|payload| Err(RenderError::Failed(panic_message(payload.as_ref()))))
}

/// Render on a helper thread and stop waiting after `timeout`.
///
/// A render that overruns is abandoned, not killed: its thread finishes in
/// the background and its result is discarded.
fn render_with_timeout<R>(
    renderer: Arc<R>,
    context: RenderContext,
    timeout: Duration,
) -> Result<Vec<u8>, RenderError>
where
    R: DocumentRenderer + ?Sized + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("draft-render".to_string())
        .spawn(move || {
            let _ = tx.send(render_guarded(&*renderer, &context));
        })
        .map_err(|e| RenderError::Failed(format!("failed to start render thread: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(RenderError::Timeout {
            millis: timeout.as_millis(),
        }),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(RenderError::Failed("render thread exited without a result".to_string()))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned());
    match detail {
        Some(detail) => format!("renderer panicked: {detail}"),
        None => "renderer panicked".to_string(),
    }
}
