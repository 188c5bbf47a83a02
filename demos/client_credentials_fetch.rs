//! Demonstrates one fetch session against mocked token and data endpoints, then prints the
//! payload and the Prometheus scrape produced by it.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use oauth2_http_fetcher::{
	auth::{MemorySecretProvider, SecretProvider},
	config::{FetchConfig, FetchEvent},
	flows::ReqwestFetcher,
	http::ReqwestHttpClient,
	obs,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let scrape = obs::install_prometheus_recorder()?;
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"token_type\":\"bearer\"}");
		})
		.await;
	let data_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/policies").header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"policies\":[{\"id\":\"allow-read\"}]}");
		})
		.await;
	let secrets: Arc<dyn SecretProvider> = Arc::new(
		MemorySecretProvider::default().with_secret("POLICY_STORE_OAUTH_CLIENT_SECRET", "demo"),
	);
	let fetcher = ReqwestFetcher::with_http_client(ReqwestHttpClient::default())
		.with_secret_provider(secrets);
	let config = FetchConfig::new(Url::parse(&server.url("/token"))?, "demo-client", "POLICY_STORE")
		.with_scope("policies.read");
	let event = FetchEvent::new(Url::parse(&server.url("/policies"))?, config);
	let payload = fetcher.fetch(&event).await?;

	println!("Fetched payload: {payload}.");
	println!("{}", scrape.render());

	token_mock.assert_async().await;
	data_mock.assert_async().await;

	Ok(())
}
