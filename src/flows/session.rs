//! Per-invocation fetch sessions.
//!
//! A [`FetchSession`] can only be obtained by acquiring a token first
//! ([`Fetcher::open_session`]) or by handing one in explicitly, so the data fetch can never
//! start before token acquisition has succeeded. [`Fetcher::fetch_data`] consumes the
//! session; the token is dropped with it and never outlives the fetch.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	config::FetchConfig,
	flows::Fetcher,
	http::FetchHttpClient,
};

/// Transient session state: the target URL and the bearer token acquired for it.
#[derive(Debug)]
pub struct FetchSession {
	data_source: String,
	url: Url,
	token: AccessToken,
}
impl FetchSession {
	/// Creates a session from an already acquired token.
	pub fn new(data_source: impl Into<String>, url: Url, token: AccessToken) -> Self {
		Self { data_source: data_source.into(), url, token }
	}

	/// Data source the token was issued for.
	pub fn data_source(&self) -> &str {
		&self.data_source
	}

	/// Protected resource this session fetches.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Bearer token presented to the protected resource.
	pub fn token(&self) -> &AccessToken {
		&self.token
	}
}

impl<C> Fetcher<C>
where
	C: ?Sized + FetchHttpClient,
{
	/// Validates `config` and acquires a fresh token for fetching `url`.
	pub async fn open_session(&self, config: &FetchConfig, url: Url) -> Result<FetchSession> {
		config.validate()?;

		let token = self.fetch_oauth2_token(config).await?;

		Ok(FetchSession::new(config.data_source_name.clone(), url, token))
	}
}
