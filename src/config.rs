//! Fetch configuration and the events that carry it.

// self
use crate::{_prelude::*, error::ConfigError};

/// Fetcher name carried by events addressed to this crate.
pub const FETCHER_NAME: &str = "OpalOAuth2HttpFetcher";
/// Suffix appended to the data source name to build the secret key.
pub const CLIENT_SECRET_SUFFIX: &str = "_OAUTH_CLIENT_SECRET";

/// Immutable token endpoint configuration for one data source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
	/// Token endpoint receiving the client-credentials POST.
	pub token_url: Url,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Data source name; prefixes the secret key.
	pub data_source_name: String,
	/// Optional scope string, sent verbatim when non-empty.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
}
impl FetchConfig {
	/// Creates a config without a scope.
	pub fn new(
		token_url: Url,
		client_id: impl Into<String>,
		data_source_name: impl Into<String>,
	) -> Self {
		Self {
			token_url,
			client_id: client_id.into(),
			data_source_name: data_source_name.into(),
			scope: None,
		}
	}

	/// Sets or replaces the requested scope.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Returns the scope to send, treating an empty string as absent.
	pub fn scope(&self) -> Option<&str> {
		self.scope.as_deref().filter(|scope| !scope.is_empty())
	}

	/// Key under which the client secret is resolved.
	///
	/// The data source name is interpolated literally; casing is preserved.
	pub fn secret_key(&self) -> String {
		format!("{}{CLIENT_SECRET_SUFFIX}", self.data_source_name)
	}

	/// Ensures all required fields are populated.
	pub fn validate(&self) -> Result<(), ConfigError> {
		ensure_http("token_url", &self.token_url)?;

		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingField { field: "client_id" });
		}
		if self.data_source_name.trim().is_empty() {
			return Err(ConfigError::MissingField { field: "data_source_name" });
		}

		Ok(())
	}
}

/// Fetch request: the target URL plus the config used to authenticate against it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchEvent {
	/// Fetcher the event is addressed to.
	#[serde(default = "default_fetcher")]
	pub fetcher: String,
	/// Protected resource to GET.
	pub url: Url,
	/// Token endpoint configuration.
	pub config: FetchConfig,
}
impl FetchEvent {
	/// Creates an event addressed to this fetcher.
	pub fn new(url: Url, config: FetchConfig) -> Self {
		Self { fetcher: default_fetcher(), url, config }
	}

	/// Validates the fetcher name, target URL, and embedded config.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.fetcher != FETCHER_NAME {
			return Err(ConfigError::FetcherMismatch {
				expected: FETCHER_NAME,
				found: self.fetcher.clone(),
			});
		}

		ensure_http("url", &self.url)?;

		self.config.validate()
	}
}

fn default_fetcher() -> String {
	FETCHER_NAME.into()
}

fn ensure_http(field: &'static str, url: &Url) -> Result<(), ConfigError> {
	match url.scheme() {
		"http" | "https" => Ok(()),
		scheme => Err(ConfigError::UnsupportedScheme { field, scheme: scheme.into() }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config() -> FetchConfig {
		FetchConfig::new(
			Url::parse("https://auth.example/token").expect("Failed to parse token URL."),
			"abc",
			"SRC1",
		)
	}

	#[test]
	fn secret_key_interpolates_the_data_source_literally() {
		let mut config = config();

		assert_eq!(config.secret_key(), "SRC1_OAUTH_CLIENT_SECRET");

		config.data_source_name = "billing_api".into();

		assert_eq!(config.secret_key(), "billing_api_OAUTH_CLIENT_SECRET");
	}

	#[test]
	fn empty_scope_is_treated_as_absent() {
		assert_eq!(config().scope(), None);
		assert_eq!(config().with_scope("").scope(), None);
		assert_eq!(config().with_scope("read write").scope(), Some("read write"));
	}

	#[test]
	fn validate_rejects_missing_fields_and_schemes() {
		assert!(config().validate().is_ok());

		let mut missing_client = config();

		missing_client.client_id = " ".into();

		assert!(matches!(
			missing_client.validate(),
			Err(ConfigError::MissingField { field: "client_id" })
		));

		let mut missing_source = config();

		missing_source.data_source_name.clear();

		assert!(matches!(
			missing_source.validate(),
			Err(ConfigError::MissingField { field: "data_source_name" })
		));

		let mut ftp = config();

		ftp.token_url = Url::parse("ftp://auth.example/token").expect("Failed to parse FTP URL.");

		assert!(matches!(
			ftp.validate(),
			Err(ConfigError::UnsupportedScheme { field: "token_url", .. })
		));
	}

	#[test]
	fn events_deserialize_with_default_fetcher() {
		let event: FetchEvent = serde_json::from_str(
			r#"{
				"url": "https://api.example/data",
				"config": {
					"token_url": "https://auth.example/token",
					"client_id": "abc",
					"data_source_name": "SRC1",
					"scope": null
				}
			}"#,
		)
		.expect("Event JSON should deserialize.");

		assert_eq!(event.fetcher, FETCHER_NAME);
		assert_eq!(event.url.as_str(), "https://api.example/data");
		assert_eq!(event.config, config());
		assert!(event.validate().is_ok());
	}

	#[test]
	fn events_naming_this_fetcher_explicitly_validate() {
		let event: FetchEvent = serde_json::from_str(
			r#"{
				"fetcher": "OpalOAuth2HttpFetcher",
				"url": "https://api.example/data",
				"config": {
					"token_url": "https://auth.example/token",
					"client_id": "abc",
					"data_source_name": "SRC1"
				}
			}"#,
		)
		.expect("Event JSON should deserialize.");

		assert_eq!(event.fetcher, FETCHER_NAME);
		assert!(event.validate().is_ok());
	}

	#[test]
	fn events_for_other_fetchers_are_rejected() {
		let mut event = FetchEvent::new(
			Url::parse("https://api.example/data").expect("Failed to parse data URL."),
			config(),
		);

		event.fetcher = "HttpFetchProvider".into();

		assert!(matches!(event.validate(), Err(ConfigError::FetcherMismatch { .. })));
	}
}
