//! Telemetry metric name constants.
//!
//! Centralised metric names for huginn operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `huginn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider name (e.g. "openai")
//! - `status`: outcome, "ok" or one of "communication" | "protocol" | "format"

/// Total records annotated, one per outcome.
///
/// Labels: `provider`, `status`.
pub const ANNOTATIONS_TOTAL: &str = "huginn_annotations_total";

/// Duration of one annotation call (send, receive, parse) in seconds.
///
/// Labels: `provider`.
pub const ANNOTATION_DURATION_SECONDS: &str = "huginn_annotation_duration_seconds";

/// Annotation calls currently in flight.
pub const IN_FLIGHT: &str = "huginn_in_flight";

/// Total bulk runs completed.
pub const BATCHES_TOTAL: &str = "huginn_batches_total";
