//! Fetcher-level error types shared across config, token, and data stages.

// self
use crate::_prelude::*;

/// Fetcher-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Canonical fetcher error exposed by public APIs.
///
/// Every variant is terminal for the session that produced it; the fetcher never retries.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem (missing secret, invalid config).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint failure.
	#[error(transparent)]
	TokenRequest(#[from] TokenRequestError),
	/// Protected resource failure.
	#[error(transparent)]
	DataFetch(#[from] DataFetchError),
}
impl Error {
	/// HTTP status returned by the upstream, when a response was received.
	pub fn http_status(&self) -> Option<u16> {
		match self {
			Self::Config(_) => None,
			Self::TokenRequest(e) => e.http_status(),
			Self::DataFetch(e) => e.http_status(),
		}
	}
}

/// Configuration and validation failures raised before any network call.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The client secret could not be resolved; only the key is reported.
	#[error("Environment variable {key} not set.")]
	MissingSecret {
		/// Secret key (environment variable name) that was looked up.
		key: String,
	},
	/// A required configuration field is empty.
	#[error("Configuration field `{field}` must not be empty.")]
	MissingField {
		/// Offending field name.
		field: &'static str,
	},
	/// A configured URL does not use HTTP(S).
	#[error("Configuration field `{field}` uses unsupported scheme `{scheme}`.")]
	UnsupportedScheme {
		/// Offending field name.
		field: &'static str,
		/// Scheme found in the URL.
		scheme: String,
	},
	/// The event targets a different fetcher.
	#[error("Event targets fetcher `{found}`, expected `{expected}`.")]
	FetcherMismatch {
		/// Fetcher name this crate handles.
		expected: &'static str,
		/// Fetcher name carried by the event.
		found: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Metrics exporter could not be installed.
	#[error("Metrics exporter could not be installed.")]
	MetricsInstall {
		/// Underlying exporter failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a metrics exporter failure inside [`ConfigError`].
	pub fn metrics_install(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::MetricsInstall { source: Box::new(src) }
	}
}

/// Failures raised while exchanging client credentials for an access token.
#[derive(Debug, ThisError)]
pub enum TokenRequestError {
	/// Token endpoint was unreachable.
	#[error("Failed to reach the token endpoint.")]
	Transport(#[from] TransportError),
	/// Token endpoint answered with a non-2xx status.
	#[error("Token endpoint returned HTTP {status}: {body_preview}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Leading slice of the response body.
		body_preview: String,
	},
	/// Token endpoint responded with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
	/// Token endpoint response did not carry a usable `access_token`.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken {
		/// HTTP status code.
		status: u16,
	},
}
impl TokenRequestError {
	/// Builds a [`TokenRequestError::Status`] with a bounded body preview.
	pub fn status(status: u16, body: &[u8]) -> Self {
		Self::Status { status, body_preview: body_preview(body) }
	}

	/// HTTP status returned by the token endpoint, when a response was received.
	pub fn http_status(&self) -> Option<u16> {
		match self {
			Self::Transport(_) => None,
			Self::Status { status, .. }
			| Self::Parse { status, .. }
			| Self::MissingAccessToken { status } => Some(*status),
		}
	}
}

/// Failures raised while fetching the protected resource.
#[derive(Debug, ThisError)]
pub enum DataFetchError {
	/// Target endpoint was unreachable.
	#[error("Failed to reach the data endpoint.")]
	Transport(#[from] TransportError),
	/// Target endpoint answered with a non-2xx status.
	#[error("Data endpoint returned HTTP {status}: {body_preview}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Leading slice of the response body.
		body_preview: String,
	},
	/// Target endpoint responded with malformed JSON.
	#[error("Data endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
		/// HTTP status code.
		status: u16,
	},
}
impl DataFetchError {
	/// Builds a [`DataFetchError::Status`] with a bounded body preview.
	pub fn status(status: u16, body: &[u8]) -> Self {
		Self::Status { status, body_preview: body_preview(body) }
	}

	/// HTTP status returned by the data endpoint, when a response was received.
	pub fn http_status(&self) -> Option<u16> {
		match self {
			Self::Transport(_) => None,
			Self::Status { status, .. } | Self::Parse { status, .. } => Some(*status),
		}
	}
}

/// Transport-level failures (network, IO). No HTTP status is available.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the upstream.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the upstream.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

fn body_preview(body: &[u8]) -> String {
	String::from_utf8_lossy(body).chars().take(BODY_PREVIEW_LIMIT).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn http_status_follows_the_failing_stage() {
		let config: Error =
			ConfigError::MissingSecret { key: "SRC1_OAUTH_CLIENT_SECRET".into() }.into();
		let token: Error = TokenRequestError::status(401, b"denied").into();
		let data: Error = DataFetchError::status(503, b"").into();
		let transport: Error =
			TokenRequestError::from(TransportError::Io(std::io::Error::other("refused"))).into();

		assert_eq!(config.http_status(), None);
		assert_eq!(token.http_status(), Some(401));
		assert_eq!(data.http_status(), Some(503));
		assert_eq!(transport.http_status(), None);
	}

	#[test]
	fn missing_secret_names_the_key_only() {
		let err = ConfigError::MissingSecret { key: "SRC1_OAUTH_CLIENT_SECRET".into() };

		assert_eq!(err.to_string(), "Environment variable SRC1_OAUTH_CLIENT_SECRET not set.");
	}

	#[test]
	fn status_errors_bound_the_body_preview() {
		let body = "x".repeat(BODY_PREVIEW_LIMIT * 2);
		let TokenRequestError::Status { body_preview, .. } =
			TokenRequestError::status(500, body.as_bytes())
		else {
			panic!("Expected a status error.");
		};

		assert_eq!(body_preview.len(), BODY_PREVIEW_LIMIT);
	}
}
