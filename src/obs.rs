//! Observability helpers for fetch operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to run every operation inside an `oauth2_http_fetcher.operation` span
//!   with `operation` and `data_source` fields, and to log failures at `error` level.
//! - Enable `metrics` to record outcome counters, duration and response-size histograms,
//!   and in-progress gauges, all labeled by [`Operation`].
//! - Enable `prometheus` to build a pull-style exporter for those metrics.

mod metrics;
#[cfg(feature = "prometheus")] mod prometheus;
mod tracing;

pub use self::metrics::*;
#[cfg(feature = "prometheus")] pub use self::prometheus::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Operation kinds observed by the fetcher.
///
/// Metric labels are drawn from this fixed set so label cardinality stays bounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Client-credentials exchange against the token endpoint.
	FetchOAuth2Token,
	/// Bearer-authenticated GET against the protected resource.
	FetchData,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::FetchOAuth2Token => "fetch_oauth2_token",
			Operation::FetchData => "fetch_data",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationStatus {
	/// The operation produced a value.
	Succeeded,
	/// The operation failed and the error was propagated.
	Failed,
}
impl OperationStatus {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationStatus::Succeeded => "succeeded",
			OperationStatus::Failed => "failed",
		}
	}
}
impl Display for OperationStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// HTTP status label; [`HttpStatusLabel::Unknown`] when no response was received.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpStatusLabel {
	/// Status code returned by the upstream.
	Code(u16),
	/// No response: configuration failure or transport failure.
	Unknown,
}
impl HttpStatusLabel {
	/// Sentinel used when no HTTP status is available.
	pub const UNKNOWN: &'static str = "unknown";
}
impl From<Option<u16>> for HttpStatusLabel {
	fn from(status: Option<u16>) -> Self {
		status.map_or(Self::Unknown, Self::Code)
	}
}
impl Display for HttpStatusLabel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Code(code) => write!(f, "{code}"),
			Self::Unknown => f.write_str(Self::UNKNOWN),
		}
	}
}
