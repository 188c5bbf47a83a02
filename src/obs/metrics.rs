//! Process-wide metrics recorded through the `metrics` facade (when enabled).
//!
//! All aggregates live in whichever recorder the host installs; the fetcher itself keeps
//! no shared state, so concurrent sessions only ever touch the recorder's atomics.

// self
use crate::{
	_prelude::*,
	obs::{HttpStatusLabel, Operation, OperationStatus},
};

/// Namespace prefixed to every metric name.
pub const METRIC_NAMESPACE: &str = "opal_oauth2_http_fetcher";
/// Counter labeled by `operation`, `status`, and `http_status`.
pub const OPERATIONS_TOTAL: &str = "opal_oauth2_http_fetcher_operations_total";
/// Histogram of network call durations labeled by `operation`.
pub const OPERATION_DURATION_SECONDS: &str =
	"opal_oauth2_http_fetcher_operation_duration_seconds";
/// Histogram of successful data response sizes labeled by `operation`.
pub const RESPONSE_SIZE_BYTES: &str = "opal_oauth2_http_fetcher_response_size_bytes";
/// Gauge of operations currently running, labeled by `operation`.
pub const IN_PROGRESS_OPERATIONS: &str = "opal_oauth2_http_fetcher_in_progress_operations";

/// Registers help text and units with the installed recorder.
pub fn describe_metrics() {
	#[cfg(feature = "metrics")]
	{
		use metrics::Unit;

		metrics::describe_counter!(
			OPERATIONS_TOTAL,
			"Total number of OAuth2 HTTP fetch operations"
		);
		metrics::describe_histogram!(
			OPERATION_DURATION_SECONDS,
			Unit::Seconds,
			"Duration of OAuth2 HTTP fetch operations in seconds"
		);
		metrics::describe_histogram!(
			RESPONSE_SIZE_BYTES,
			Unit::Bytes,
			"Size of HTTP responses in bytes"
		);
		metrics::describe_gauge!(
			IN_PROGRESS_OPERATIONS,
			"Number of OAuth2 HTTP fetch operations in progress"
		);
	}
}

/// Increments the outcome counter for `operation`.
pub fn record_operation(
	operation: Operation,
	status: OperationStatus,
	http_status: HttpStatusLabel,
) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			OPERATIONS_TOTAL,
			"operation" => operation.as_str(),
			"status" => status.as_str(),
			"http_status" => http_status.to_string()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, status, http_status);
	}
}

/// Observes a network call duration for `operation`.
pub fn record_duration(operation: Operation, elapsed: Duration) {
	#[cfg(feature = "metrics")]
	{
		metrics::histogram!(OPERATION_DURATION_SECONDS, "operation" => operation.as_str())
			.record(elapsed.as_secs_f64());
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, elapsed);
	}
}

/// Observes the raw byte length of a successful response for `operation`.
pub fn record_response_size(operation: Operation, bytes: usize) {
	#[cfg(feature = "metrics")]
	{
		// Response bodies stay far below 2^53 bytes.
		metrics::histogram!(RESPONSE_SIZE_BYTES, "operation" => operation.as_str())
			.record(bytes as f64);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, bytes);
	}
}

/// RAII guard holding one unit of the in-progress gauge for an operation.
///
/// The gauge is incremented on [`InProgressGuard::enter`] and decremented on drop, so
/// every exit path (early return, `?`, panic unwinding, future cancellation) releases it.
#[derive(Debug)]
#[must_use = "dropping the guard immediately releases the in-progress gauge"]
pub struct InProgressGuard {
	operation: Operation,
}
impl InProgressGuard {
	/// Increments the in-progress gauge for `operation`.
	pub fn enter(operation: Operation) -> Self {
		#[cfg(feature = "metrics")]
		{
			metrics::gauge!(IN_PROGRESS_OPERATIONS, "operation" => operation.as_str())
				.increment(1.);
		}

		Self { operation }
	}

	/// Operation this guard tracks.
	pub fn operation(&self) -> Operation {
		self.operation
	}
}
impl Drop for InProgressGuard {
	fn drop(&mut self) {
		#[cfg(feature = "metrics")]
		{
			metrics::gauge!(IN_PROGRESS_OPERATIONS, "operation" => self.operation.as_str())
				.decrement(1.);
		}
	}
}

/// Wall-clock timer for a single network call.
#[derive(Debug)]
pub struct OperationTimer {
	operation: Operation,
	started: Instant,
}
impl OperationTimer {
	/// Starts timing `operation`.
	pub fn start(operation: Operation) -> Self {
		Self { operation, started: Instant::now() }
	}

	/// Records the elapsed time in the duration histogram and returns it.
	pub fn observe(self) -> Duration {
		let elapsed = self.started.elapsed();

		record_duration(self.operation, elapsed);

		elapsed
	}
}
