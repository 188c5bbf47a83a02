//! Fetch flows: client-credentials token acquisition followed by one authenticated GET.

pub mod common;
pub mod session;

mod client_credentials;
mod data;

pub use common::*;
pub use session::*;

// self
use crate::{
	_prelude::*,
	auth::{EnvSecretProvider, SecretProvider},
	config::FetchEvent,
	http::FetchHttpClient,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Parsed response document returned by a fetch.
pub type Payload = serde_json::Value;

#[cfg(feature = "reqwest")]
/// Fetcher specialized for the crate's default reqwest transport.
pub type ReqwestFetcher = Fetcher<ReqwestHttpClient>;

/// Runs fetch sessions against any token endpoint and protected resource.
///
/// The fetcher owns only the transport and the secret provider. Configuration travels with
/// each call, and tokens live only inside the [`FetchSession`] that acquired them, so one
/// fetcher can serve many concurrent sessions for different data sources.
pub struct Fetcher<C>
where
	C: ?Sized + FetchHttpClient,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Source of client secrets, keyed by `{data_source_name}_OAUTH_CLIENT_SECRET`.
	pub secrets: Arc<dyn SecretProvider>,
}
impl<C> Fetcher<C>
where
	C: ?Sized + FetchHttpClient,
{
	/// Creates a fetcher over the caller-provided transport, reading secrets from the
	/// process environment.
	pub fn with_http_client(http_client: impl Into<Arc<C>>) -> Self {
		Self { http_client: http_client.into(), secrets: Arc::new(EnvSecretProvider) }
	}

	/// Replaces the secret provider.
	pub fn with_secret_provider(mut self, secrets: Arc<dyn SecretProvider>) -> Self {
		self.secrets = secrets;

		self
	}

	/// Runs a full session for `event`: validate, acquire a token, fetch, process.
	pub async fn fetch(&self, event: &FetchEvent) -> Result<Payload> {
		event.validate()?;

		let session = self.open_session(&event.config, event.url.clone()).await?;
		let data = self.fetch_data(session).await?;

		Ok(Self::process(data))
	}

	/// Processing stage applied to fetched payloads; returns them unchanged.
	fn process(data: Payload) -> Payload {
		data
	}
}
impl<C> Clone for Fetcher<C>
where
	C: ?Sized + FetchHttpClient,
{
	fn clone(&self) -> Self {
		Self { http_client: self.http_client.clone(), secrets: self.secrets.clone() }
	}
}
#[cfg(feature = "reqwest")]
impl Fetcher<ReqwestHttpClient> {
	/// Creates a fetcher backed by a default reqwest client and environment secrets.
	pub fn new() -> Self {
		Self::with_http_client(ReqwestHttpClient::default())
	}
}
#[cfg(feature = "reqwest")]
impl Default for Fetcher<ReqwestHttpClient> {
	fn default() -> Self {
		Self::new()
	}
}
impl<C> Debug for Fetcher<C>
where
	C: ?Sized + FetchHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Fetcher").finish_non_exhaustive()
	}
}
