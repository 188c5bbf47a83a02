//! Transport primitives for token exchanges and authenticated fetches.
//!
//! [`FetchHttpClient`] is the fetcher's only dependency on an HTTP stack. It exposes
//! exactly the two calls the flows need: a form-encoded POST to the token endpoint and a
//! bearer-authenticated GET to the protected resource. Implementations return every
//! received response as an [`HttpResponse`], whatever its status; status classification
//! and metrics belong to the flows. Only failures that happen before a response arrives
//! (DNS, TCP, TLS, body read) surface as [`TransportError`].

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
// self
use crate::{_prelude::*, auth::AccessToken, error::TransportError};

/// Boxed future returned by [`FetchHttpClient`] calls.
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Content type used for token requests.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Abstraction over HTTP transports used by the fetcher.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared
/// across concurrent sessions behind an [`Arc`].
pub trait FetchHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `body` (already form-encoded) to `url` with a form content type.
	fn post_form<'a>(&'a self, url: &'a Url, body: String) -> HttpFuture<'a>;

	/// Sends a GET to `url` with `Authorization: Bearer <token>`.
	fn get_with_bearer<'a>(&'a self, url: &'a Url, token: &'a AccessToken) -> HttpFuture<'a>;
}

/// Fully buffered HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response from a status and raw body.
	pub fn new(status: u16, body: Vec<u8>) -> Self {
		Self { status, body }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The client's own timeouts apply; the fetcher adds no deadline of its own.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client from a configured [`reqwest::ClientBuilder`].
	pub fn from_builder(builder: reqwest::ClientBuilder) -> Result<Self> {
		let client = builder.build().map_err(crate::error::ConfigError::http_client_build)?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl FetchHttpClient for ReqwestHttpClient {
	fn post_form<'a>(&'a self, url: &'a Url, body: String) -> HttpFuture<'a> {
		Box::pin(async move {
			let request =
				self.0.post(url.clone()).header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(body);

			execute(request).await
		})
	}

	fn get_with_bearer<'a>(&'a self, url: &'a Url, token: &'a AccessToken) -> HttpFuture<'a> {
		Box::pin(async move {
			let request = self
				.0
				.get(url.clone())
				.header(AUTHORIZATION, format!("Bearer {}", token.expose()));

			execute(request).await
		})
	}
}

#[cfg(feature = "reqwest")]
async fn execute(request: reqwest::RequestBuilder) -> Result<HttpResponse, TransportError> {
	let response = request.send().await?;
	let status = response.status().as_u16();
	let body = response.bytes().await?.to_vec();

	Ok(HttpResponse::new(status, body))
}
