//! Secret providers that resolve client secrets by key.
//!
//! Flows never read the process environment directly. They ask a [`SecretProvider`]
//! for the key derived from the data source name (`{data_source_name}_OAUTH_CLIENT_SECRET`),
//! so tests and embedders can swap in their own source of secrets.

// std
use std::collections::HashMap;
// self
use crate::{_prelude::*, auth::ClientSecret};

/// Resolves client secrets by key.
///
/// Implementations must treat empty values as absent.
pub trait SecretProvider: Send + Sync {
	/// Returns the secret stored under `key`, if any.
	fn resolve(&self, key: &str) -> Option<ClientSecret>;
}

/// Reads secrets from the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvSecretProvider;
impl SecretProvider for EnvSecretProvider {
	fn resolve(&self, key: &str) -> Option<ClientSecret> {
		std::env::var(key).ok().filter(|value| !value.is_empty()).map(ClientSecret::new)
	}
}

/// Thread-safe in-memory secret map.
#[derive(Default)]
pub struct MemorySecretProvider(RwLock<HashMap<String, ClientSecret>>);
impl MemorySecretProvider {
	/// Stores a secret and returns the provider for chaining.
	pub fn with_secret(self, key: impl Into<String>, secret: impl Into<String>) -> Self {
		self.insert(key, secret);

		self
	}

	/// Stores or replaces a secret.
	pub fn insert(&self, key: impl Into<String>, secret: impl Into<String>) {
		self.0.write().insert(key.into(), ClientSecret::new(secret));
	}

	/// Removes a secret, returning whether it was present.
	pub fn remove(&self, key: &str) -> bool {
		self.0.write().remove(key).is_some()
	}
}
impl SecretProvider for MemorySecretProvider {
	fn resolve(&self, key: &str) -> Option<ClientSecret> {
		self.0.read().get(key).filter(|secret| !secret.expose().is_empty()).cloned()
	}
}
impl Debug for MemorySecretProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MemorySecretProvider").field("keys", &self.0.read().len()).finish()
	}
}
