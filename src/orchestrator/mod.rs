//! Batch orchestration over the [`Annotator`].
//!
//! Two modes:
//!
//! - **single**: [`Orchestrator::analyze_one`] annotates one record and
//!   always returns an [`Outcome`], never an error.
//! - **bulk**: [`Orchestrator::analyze_bulk`] and
//!   [`Orchestrator::analyze_bulk_stream`] fan records out with at most
//!   [`MAX_CONCURRENCY`] annotation calls in flight, hand each outcome to
//!   the caller as soon as it completes, and signal completion exactly once
//!   after the last outcome.
//!
//! Records are pulled lazily from the input queue: a new one is dispatched
//! only once an earlier record's outcome has been handed over. Outcomes
//! arrive in completion order. A failed record becomes a `Failure` outcome
//! and never affects its siblings. Once dispatched, a call runs to
//! completion.

mod builder;

use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{self, Stream, StreamExt};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

pub use builder::{Huginn, HuginnBuilder};

use crate::annotator::Annotator;
use crate::telemetry;
use crate::types::{AnalyzedRow, BatchSummary, BulkEvent, Outcome, Record};
use crate::{HuginnError, Result};

/// Ceiling on simultaneous annotation calls in bulk mode.
///
/// Chosen to stay under the AI service's rate limits; configured values
/// above it are clamped.
pub const MAX_CONCURRENCY: usize = 5;

/// Number of events buffered between a bulk run and a slow stream consumer.
pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// Runs the annotator over one or many records.
///
/// Cheap to clone; clones share the annotator and its provider.
#[derive(Clone)]
pub struct Orchestrator {
    annotator: Arc<Annotator>,
    concurrency: usize,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create an orchestrator running at [`MAX_CONCURRENCY`].
    pub fn new(annotator: Annotator) -> Self {
        Self {
            annotator: Arc::new(annotator),
            concurrency: MAX_CONCURRENCY,
        }
    }

    /// Set the bulk concurrency, clamped to `1..=MAX_CONCURRENCY`.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// Effective bulk concurrency.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// Annotate a single record.
    ///
    /// Every error is folded into `Outcome::Failure` carrying the record's
    /// own id, even when the service never saw or echoed it.
    pub async fn analyze_one(&self, record: &Record) -> Outcome {
        let provider = self.annotator.provider_name().to_owned();
        let started = Instant::now();

        let in_flight = InFlight::enter();
        let result = self.annotator.annotate(record).await;
        drop(in_flight);

        metrics::histogram!(telemetry::ANNOTATION_DURATION_SECONDS,
            "provider" => provider.clone(),
        )
        .record(started.elapsed().as_secs_f64());

        let (outcome, status) = match result.and_then(sole_row) {
            Ok(row) => {
                if row.id != record.id {
                    warn!(id = %record.id, reported = %row.id, "model reported a different row id");
                }
                let outcome = Outcome::Success {
                    id: record.id.clone(),
                    annotation: row.into_annotation(),
                };
                (outcome, "ok")
            }
            Err(e) => {
                let kind = e.kind();
                warn!(id = %record.id, kind = kind.as_str(), error = %e, "analysis failed");
                let outcome = Outcome::Failure {
                    id: record.id.clone(),
                    message: e.user_message().to_string(),
                };
                (outcome, kind.as_str())
            }
        };

        metrics::counter!(telemetry::ANNOTATIONS_TOTAL,
            "provider" => provider,
            "status" => status,
        )
        .increment(1);

        outcome
    }

    /// Annotate many records, streaming each outcome to `on_outcome`.
    ///
    /// `on_outcome` is invoked once per record, in completion order.
    /// `on_complete` is invoked exactly once, after the last outcome, and
    /// immediately when `records` is empty.
    pub async fn analyze_bulk<F, C>(
        &self,
        records: Vec<Record>,
        mut on_outcome: F,
        on_complete: C,
    ) -> BatchSummary
    where
        F: FnMut(Outcome),
        C: FnOnce(),
    {
        info!(
            records = records.len(),
            concurrency = self.concurrency,
            "starting bulk analysis"
        );

        let mut outcomes = self.outcomes(records);
        let mut summary = BatchSummary::default();
        while let Some(outcome) = outcomes.next().await {
            summary.record(&outcome);
            on_outcome(outcome);
        }

        finish(&summary);
        on_complete();
        summary
    }

    /// Annotate many records as a stream of [`BulkEvent`]s.
    ///
    /// Yields one `BulkEvent::Outcome` per record in completion order, then
    /// a single `BulkEvent::Finished`. Each record runs in its own task
    /// holding one of `concurrency` permits, and sends its outcome before
    /// releasing it. A slow consumer therefore only delays dispatch of new
    /// records once [`DEFAULT_EVENT_BUFFER`] events are queued; calls
    /// already in flight keep running. Dropping the stream does not cancel
    /// the run; remaining calls complete and are discarded.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context.
    pub fn analyze_bulk_stream(
        &self,
        records: Vec<Record>,
    ) -> Pin<Box<dyn Stream<Item = BulkEvent> + Send>> {
        let (tx, rx) = mpsc::channel(DEFAULT_EVENT_BUFFER);
        let this = self.clone();

        tokio::spawn(async move {
            info!(
                records = records.len(),
                concurrency = this.concurrency,
                "starting bulk analysis"
            );

            let permits = Arc::new(Semaphore::new(this.concurrency));
            let mut workers = JoinSet::new();
            for record in records {
                let Ok(permit) = permits.clone().acquire_owned().await else {
                    break;
                };
                let this = this.clone();
                let tx = tx.clone();
                workers.spawn(async move {
                    let outcome = this.analyze_one(&record).await;
                    let succeeded = outcome.is_success();
                    if tx.send(BulkEvent::Outcome(outcome)).await.is_err() {
                        debug!(id = %record.id, "bulk stream receiver dropped, discarding outcome");
                    }
                    drop(permit);
                    succeeded
                });
            }

            let mut summary = BatchSummary::default();
            while let Some(joined) = workers.join_next().await {
                summary.total += 1;
                match joined {
                    Ok(true) => summary.succeeded += 1,
                    Ok(false) => summary.failed += 1,
                    Err(e) => {
                        warn!(error = %e, "annotation task failed");
                        summary.failed += 1;
                    }
                }
            }

            finish(&summary);
            let _ = tx.send(BulkEvent::Finished(summary)).await;
        });

        Box::pin(ReceiverStream::new(rx))
    }

    /// Bounded fan-out: at most `concurrency` annotation calls pending at once.
    fn outcomes(&self, records: Vec<Record>) -> impl Stream<Item = Outcome> + Send + '_ {
        stream::iter(records)
            .map(move |record| async move { self.analyze_one(&record).await })
            .buffer_unordered(self.concurrency)
    }
}

/// Keeps the in-flight gauge raised until dropped, including on cancellation.
struct InFlight;

impl InFlight {
    fn enter() -> Self {
        metrics::gauge!(telemetry::IN_FLIGHT).increment(1.0);
        InFlight
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        metrics::gauge!(telemetry::IN_FLIGHT).decrement(1.0);
    }
}

/// Extract the single row a one-record request must produce.
fn sole_row(rows: Vec<AnalyzedRow>) -> Result<AnalyzedRow> {
    rows.into_iter()
        .next()
        .ok_or_else(|| HuginnError::InvalidFormat("analyzed_rows is empty".to_string()))
}

fn finish(summary: &BatchSummary) {
    metrics::counter!(telemetry::BATCHES_TOTAL).increment(1);
    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "bulk analysis finished"
    );
}
