//! Prometheus exposition for the fetcher's metrics.

// crates.io
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	obs::{OPERATION_DURATION_SECONDS, RESPONSE_SIZE_BYTES, describe_metrics},
};

/// Buckets for network call durations, in seconds.
pub const DURATION_BUCKETS: &[f64] =
	&[0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000];
/// Buckets for response sizes, in bytes.
pub const RESPONSE_SIZE_BUCKETS: &[f64] =
	&[256., 1_024., 4_096., 16_384., 65_536., 262_144., 1_048_576., 4_194_304., 16_777_216.];

/// Returns a [`PrometheusBuilder`] preloaded with the fetcher's histogram buckets.
pub fn prometheus_builder() -> Result<PrometheusBuilder> {
	let builder = PrometheusBuilder::new()
		.set_buckets_for_metric(Matcher::Full(OPERATION_DURATION_SECONDS.into()), DURATION_BUCKETS)
		.map_err(ConfigError::metrics_install)?
		.set_buckets_for_metric(Matcher::Full(RESPONSE_SIZE_BYTES.into()), RESPONSE_SIZE_BUCKETS)
		.map_err(ConfigError::metrics_install)?;

	Ok(builder)
}

/// Installs a global Prometheus recorder and returns the handle used to render scrapes.
///
/// Fails if another global recorder is already installed.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle> {
	let handle = prometheus_builder()?.install_recorder().map_err(ConfigError::metrics_install)?;

	describe_metrics();

	Ok(handle)
}

/// Builds a Prometheus recorder without installing it globally.
pub fn build_prometheus_recorder() -> Result<PrometheusRecorder> {
	Ok(prometheus_builder()?.build_recorder())
}
