//! Fetch protected HTTP resources with OAuth 2.0 client-credentials tokens, with
//! per-operation metrics and tracing wired into every exit path.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// crates.io
	use parking_lot::Mutex;
	// self
	use crate::{
		auth::{AccessToken, MemorySecretProvider, SecretProvider},
		config::FetchConfig,
		error::TransportError,
		flows::Fetcher,
		http::{FetchHttpClient, HttpFuture, HttpResponse},
	};

	/// Request captured by [`RecordingHttpClient`].
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub enum RecordedRequest {
		/// Form-encoded POST to a token endpoint.
		PostForm {
			/// Target URL.
			url: String,
			/// Encoded request body.
			body: String,
		},
		/// Bearer-authenticated GET.
		Get {
			/// Target URL.
			url: String,
			/// Bearer token presented in the `Authorization` header.
			bearer: String,
		},
	}

	/// Scripted transport that replays queued responses and records every request.
	#[derive(Debug, Default)]
	pub struct RecordingHttpClient {
		responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
		requests: Mutex<Vec<RecordedRequest>>,
	}
	impl RecordingHttpClient {
		/// Queues a response with the provided status and body.
		pub fn respond(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
			self.responses.lock().push_back(Ok(HttpResponse::new(status, body.into())));

			self
		}

		/// Queues a transport failure (no response received).
		pub fn fail(self, message: impl Into<String>) -> Self {
			self.responses.lock().push_back(Err(message.into()));

			self
		}

		/// Returns every request issued so far.
		pub fn requests(&self) -> Vec<RecordedRequest> {
			self.requests.lock().clone()
		}

		fn next(&self, request: RecordedRequest) -> Result<HttpResponse, TransportError> {
			self.requests.lock().push(request);

			match self.responses.lock().pop_front() {
				Some(Ok(response)) => Ok(response),
				Some(Err(message)) => Err(TransportError::network(std::io::Error::other(message))),
				None => Err(TransportError::network(std::io::Error::other(
					"No scripted response left.",
				))),
			}
		}
	}
	impl FetchHttpClient for RecordingHttpClient {
		fn post_form<'a>(&'a self, url: &'a Url, body: String) -> HttpFuture<'a> {
			let result = self.next(RecordedRequest::PostForm { url: url.to_string(), body });

			Box::pin(async move { result })
		}

		fn get_with_bearer<'a>(&'a self, url: &'a Url, token: &'a AccessToken) -> HttpFuture<'a> {
			let result = self.next(RecordedRequest::Get {
				url: url.to_string(),
				bearer: token.expose().to_owned(),
			});

			Box::pin(async move { result })
		}
	}

	/// Builds a config pointing at `https://auth.example/token` for data source `SRC1`.
	pub fn test_config() -> FetchConfig {
		FetchConfig::new(
			Url::parse("https://auth.example/token").expect("Failed to parse test token URL."),
			"abc",
			"SRC1",
		)
	}

	/// Constructs a [`Fetcher`] over `client` whose secret provider holds `SRC1`'s secret.
	pub fn build_test_fetcher(
		client: RecordingHttpClient,
	) -> (Fetcher<RecordingHttpClient>, Arc<RecordingHttpClient>) {
		let client = Arc::new(client);
		let secrets: Arc<dyn SecretProvider> =
			Arc::new(MemorySecretProvider::default().with_secret("SRC1_OAUTH_CLIENT_SECRET", "shh"));
		let fetcher = Fetcher::<RecordingHttpClient>::with_http_client(client.clone())
			.with_secret_provider(secrets);

		(fetcher, client)
	}

	/// Drives `fut` to completion on a current-thread runtime while `recorder` captures every
	/// metric emitted on this thread.
	#[cfg(all(test, feature = "metrics"))]
	pub fn with_recorded_metrics<F>(
		recorder: &metrics_util::debugging::DebuggingRecorder,
		fut: F,
	) -> F::Output
	where
		F: Future,
	{
		let runtime = tokio::runtime::Builder::new_current_thread()
			.enable_all()
			.build()
			.expect("Failed to build test runtime.");

		metrics::with_local_recorder(recorder, || runtime.block_on(fut))
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::{Duration, Instant},
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, metrics_util as _};
