//! Client Credentials token acquisition.
//!
//! [`Fetcher::fetch_oauth2_token`] resolves the data source's client secret, posts the
//! `client_credentials` form to the configured token endpoint, and extracts
//! `access_token` from the JSON response. A missing secret fails before any network
//! call. Nothing is cached: every call performs a fresh exchange.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	config::FetchConfig,
	error::{ConfigError, TokenRequestError},
	flows::{
		Fetcher,
		common::{self, Observed},
	},
	http::{FetchHttpClient, HttpResponse},
	obs::{Operation, OperationTimer},
};

#[derive(Deserialize)]
struct TokenEndpointResponse {
	#[serde(default)]
	access_token: Option<String>,
}

impl<C> Fetcher<C>
where
	C: ?Sized + FetchHttpClient,
{
	/// Exchanges the configured client credentials for a bearer token.
	///
	/// The duration histogram covers the network call only; secret lookup is excluded.
	pub async fn fetch_oauth2_token(&self, config: &FetchConfig) -> Result<AccessToken> {
		const OPERATION: Operation = Operation::FetchOAuth2Token;

		common::instrumented(OPERATION, &config.data_source_name, async move {
			let key = config.secret_key();
			let secret =
				self.secrets.resolve(&key).ok_or(ConfigError::MissingSecret { key })?;
			let body = common::encode_token_form(&config.client_id, &secret, config.scope());
			let timer = OperationTimer::start(OPERATION);
			let response = self.http_client.post_form(&config.token_url, body).await;
			let elapsed = timer.observe();
			let response = response.map_err(TokenRequestError::from)?;

			if !response.is_success() {
				return Err(TokenRequestError::status(response.status, &response.body).into());
			}

			let value = parse_token_response(&response)?;

			Ok(Observed { value, status: response.status, elapsed })
		})
		.await
	}
}

fn parse_token_response(response: &HttpResponse) -> Result<AccessToken, TokenRequestError> {
	let status = response.status;
	let deserializer = &mut serde_json::Deserializer::from_slice(&response.body);
	let parsed: TokenEndpointResponse = serde_path_to_error::deserialize(deserializer)
		.map_err(|source| TokenRequestError::Parse { source, status })?;

	parsed
		.access_token
		.filter(|token| !token.is_empty())
		.map(AccessToken::new)
		.ok_or(TokenRequestError::MissingAccessToken { status })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, auth::MemorySecretProvider};

	#[tokio::test]
	async fn returns_the_access_token_field() {
		let client = RecordingHttpClient::default()
			.respond(200, r#"{"access_token":"tok123","token_type":"bearer","expires_in":60}"#);
		let (fetcher, _client) = build_test_fetcher(client);
		let token = fetcher
			.fetch_oauth2_token(&test_config())
			.await
			.expect("Token exchange should succeed.");

		assert_eq!(token.expose(), "tok123");
	}

	#[tokio::test]
	async fn missing_secret_fails_without_network_calls() {
		let client = Arc::new(RecordingHttpClient::default());
		let fetcher = Fetcher::<RecordingHttpClient>::with_http_client(client.clone())
			.with_secret_provider(Arc::new(MemorySecretProvider::default()));
		let err = fetcher
			.fetch_oauth2_token(&test_config())
			.await
			.expect_err("Missing secret should be rejected.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::MissingSecret { ref key }) if key == "SRC1_OAUTH_CLIENT_SECRET"
		));
		assert!(client.requests().is_empty());
	}

	#[tokio::test]
	async fn scope_is_sent_only_when_configured() {
		let client = RecordingHttpClient::default()
			.respond(200, r#"{"access_token":"a"}"#)
			.respond(200, r#"{"access_token":"b"}"#);
		let (fetcher, client) = build_test_fetcher(client);

		fetcher.fetch_oauth2_token(&test_config()).await.expect("Unscoped exchange should succeed.");
		fetcher
			.fetch_oauth2_token(&test_config().with_scope("read write"))
			.await
			.expect("Scoped exchange should succeed.");

		let bodies = client
			.requests()
			.into_iter()
			.filter_map(|request| match request {
				RecordedRequest::PostForm { body, .. } => Some(body),
				RecordedRequest::Get { .. } => None,
			})
			.collect::<Vec<_>>();

		assert_eq!(
			bodies,
			vec![
				"client_id=abc&client_secret=shh&grant_type=client_credentials".to_owned(),
				"client_id=abc&client_secret=shh&grant_type=client_credentials&scope=read+write"
					.to_owned(),
			]
		);
	}

	#[tokio::test]
	async fn non_success_statuses_become_token_request_errors() {
		for status in [400, 401, 403, 500, 503] {
			let client = RecordingHttpClient::default().respond(status, "{\"error\":\"nope\"}");
			let (fetcher, _client) = build_test_fetcher(client);
			let err = fetcher
				.fetch_oauth2_token(&test_config())
				.await
				.expect_err("Non-2xx responses should fail.");

			assert!(matches!(err, Error::TokenRequest(TokenRequestError::Status { .. })));
			assert_eq!(err.http_status(), Some(status));
		}
	}

	#[tokio::test]
	async fn malformed_bodies_are_rejected() {
		let client = RecordingHttpClient::default()
			.respond(200, "not json")
			.respond(200, r#"{"token_type":"bearer"}"#)
			.respond(200, r#"{"access_token":""}"#)
			.respond(200, r#"{"access_token":42}"#);
		let (fetcher, _client) = build_test_fetcher(client);
		let mut errors = Vec::new();

		for _ in 0..4 {
			errors.push(
				fetcher
					.fetch_oauth2_token(&test_config())
					.await
					.expect_err("Malformed token responses should fail."),
			);
		}

		assert!(matches!(
			errors[0],
			Error::TokenRequest(TokenRequestError::Parse { status: 200, .. })
		));
		assert!(matches!(
			errors[1],
			Error::TokenRequest(TokenRequestError::MissingAccessToken { status: 200 })
		));
		assert!(matches!(
			errors[2],
			Error::TokenRequest(TokenRequestError::MissingAccessToken { status: 200 })
		));

		let Error::TokenRequest(TokenRequestError::Parse { source, .. }) = &errors[3] else {
			panic!("Expected a parse error, got {:?}.", errors[3]);
		};

		assert_eq!(source.path().to_string(), "access_token");
	}

	#[tokio::test]
	async fn transport_failures_have_no_status() {
		let client = RecordingHttpClient::default().fail("connection refused");
		let (fetcher, _client) = build_test_fetcher(client);
		let err = fetcher
			.fetch_oauth2_token(&test_config())
			.await
			.expect_err("Transport failures should surface.");

		assert!(matches!(err, Error::TokenRequest(TokenRequestError::Transport(_))));
		assert_eq!(err.http_status(), None);
	}

	#[cfg(feature = "metrics")]
	mod recorded {
		// crates.io
		use metrics_util::debugging::{DebugValue, DebuggingRecorder};
		// self
		use super::*;
		use crate::obs::{IN_PROGRESS_OPERATIONS, OPERATION_DURATION_SECONDS, OPERATIONS_TOTAL};

		fn labels(key: &metrics_util::CompositeKey) -> Vec<(String, String)> {
			key.key()
				.labels()
				.map(|label| (label.key().to_owned(), label.value().to_owned()))
				.collect()
		}

		#[test]
		fn failure_counter_matches_the_response_status() {
			for status in [401_u16, 500] {
				let recorder = DebuggingRecorder::new();
				let snapshotter = recorder.snapshotter();
				let client = RecordingHttpClient::default().respond(status, "denied");
				let (fetcher, _client) = build_test_fetcher(client);
				let result =
					with_recorded_metrics(&recorder, fetcher.fetch_oauth2_token(&test_config()));

				assert!(result.is_err());

				let snapshot = snapshotter.snapshot().into_vec();
				let counters = snapshot
					.iter()
					.filter(|(key, ..)| key.key().name() == OPERATIONS_TOTAL)
					.collect::<Vec<_>>();

				assert_eq!(counters.len(), 1);

				let (key, _, _, value) = counters[0];

				assert_eq!(
					labels(key),
					vec![
						("operation".to_owned(), "fetch_oauth2_token".to_owned()),
						("status".to_owned(), "failed".to_owned()),
						("http_status".to_owned(), status.to_string()),
					]
				);
				assert_eq!(value, &DebugValue::Counter(1));
				assert!(snapshot.iter().any(|(key, _, _, value)| {
					key.key().name() == OPERATION_DURATION_SECONDS
						&& matches!(value, DebugValue::Histogram(values) if values.len() == 1)
				}));
			}
		}

		#[test]
		fn missing_secret_counts_unknown_status_and_skips_duration() {
			let recorder = DebuggingRecorder::new();
			let snapshotter = recorder.snapshotter();
			let fetcher =
				Fetcher::<RecordingHttpClient>::with_http_client(RecordingHttpClient::default())
					.with_secret_provider(Arc::new(MemorySecretProvider::default()));
			let result =
				with_recorded_metrics(&recorder, fetcher.fetch_oauth2_token(&test_config()));

			assert!(matches!(result, Err(Error::Config(ConfigError::MissingSecret { .. }))));

			let snapshot = snapshotter.snapshot().into_vec();
			let (key, _, _, value) = snapshot
				.iter()
				.find(|(key, ..)| key.key().name() == OPERATIONS_TOTAL)
				.expect("Failure counter should be recorded.");

			assert!(labels(key).contains(&("http_status".to_owned(), "unknown".to_owned())));
			assert_eq!(value, &DebugValue::Counter(1));
			assert!(
				!snapshot.iter().any(|(key, ..)| key.key().name() == OPERATION_DURATION_SECONDS)
			);
			assert!(snapshot.iter().any(|(key, _, _, value)| {
				key.key().name() == IN_PROGRESS_OPERATIONS
					&& value == &DebugValue::Gauge(0_f64.into())
			}));
		}

		#[test]
		fn success_counter_uses_the_actual_status() {
			let recorder = DebuggingRecorder::new();
			let snapshotter = recorder.snapshotter();
			let client = RecordingHttpClient::default().respond(201, r#"{"access_token":"t"}"#);
			let (fetcher, _client) = build_test_fetcher(client);
			let token = with_recorded_metrics(&recorder, fetcher.fetch_oauth2_token(&test_config()))
				.expect("Token exchange should succeed.");

			assert_eq!(token.expose(), "t");

			let snapshot = snapshotter.snapshot().into_vec();
			let (key, ..) = snapshot
				.iter()
				.find(|(key, ..)| key.key().name() == OPERATIONS_TOTAL)
				.expect("Success counter should be recorded.");

			assert_eq!(
				labels(key),
				vec![
					("operation".to_owned(), "fetch_oauth2_token".to_owned()),
					("status".to_owned(), "succeeded".to_owned()),
					("http_status".to_owned(), "201".to_owned()),
				]
			);
		}
	}
}
