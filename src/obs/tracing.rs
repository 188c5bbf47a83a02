// self
use crate::{
	_prelude::*,
	obs::{HttpStatusLabel, Operation},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used by fetch operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the operation and the data source it serves.
	pub fn new(operation: Operation, data_source: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth2_http_fetcher.operation",
				operation = operation.as_str(),
				data_source
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, data_source);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a propagated failure; secrets never appear in error displays.
pub fn log_failure(operation: Operation, http_status: HttpStatusLabel, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		match operation {
			Operation::FetchOAuth2Token => tracing::error!(
				operation = operation.as_str(),
				http_status = %http_status,
				"Failed to fetch OAuth2 token: {error}"
			),
			Operation::FetchData => tracing::error!(
				operation = operation.as_str(),
				http_status = %http_status,
				"Failed to fetch data: {error}"
			),
		}
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (operation, http_status, error);
	}
}

/// Logs a completed operation at debug level.
pub fn log_success(operation: Operation, http_status: HttpStatusLabel, elapsed: Duration) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			operation = operation.as_str(),
			http_status = %http_status,
			elapsed_ms = elapsed.as_millis() as u64,
			"Operation succeeded."
		);
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (operation, http_status, elapsed);
	}
}
