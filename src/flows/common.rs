//! Shared helpers for flow implementations (instrumentation envelope, token form encoding).

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::ClientSecret,
	obs::{self, HttpStatusLabel, InProgressGuard, Operation, OperationSpan, OperationStatus},
};

/// `grant_type` value sent to token endpoints.
pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

/// Value produced by a successful operation together with how it was received.
#[derive(Debug)]
pub(crate) struct Observed<T> {
	pub(crate) value: T,
	pub(crate) status: u16,
	pub(crate) elapsed: Duration,
}

/// Runs `operation` inside its span and in-progress gauge, then records its outcome.
///
/// The gauge is held for the whole future, so it is released however the future ends.
/// Failures are counted and logged before they are returned untouched.
pub(crate) async fn instrumented<T, Fut>(
	operation: Operation,
	data_source: &str,
	fut: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<Observed<T>>>,
{
	let span = OperationSpan::new(operation, data_source);
	let _in_progress = InProgressGuard::enter(operation);

	match span.instrument(fut).await {
		Ok(Observed { value, status, elapsed }) => {
			let http_status = HttpStatusLabel::Code(status);

			obs::record_operation(operation, OperationStatus::Succeeded, http_status);
			obs::log_success(operation, http_status, elapsed);

			Ok(value)
		},
		Err(err) => {
			let http_status = HttpStatusLabel::from(err.http_status());

			obs::record_operation(operation, OperationStatus::Failed, http_status);
			obs::log_failure(operation, http_status, &err);

			Err(err)
		},
	}
}

/// Encodes the client-credentials form; `scope` is omitted entirely when absent.
pub(crate) fn encode_token_form(
	client_id: &str,
	client_secret: &ClientSecret,
	scope: Option<&str>,
) -> String {
	let mut form = form_urlencoded::Serializer::new(String::new());

	form.append_pair("client_id", client_id)
		.append_pair("client_secret", client_secret.expose())
		.append_pair("grant_type", CLIENT_CREDENTIALS_GRANT);

	if let Some(scope) = scope {
		form.append_pair("scope", scope);
	}

	form.finish()
}
