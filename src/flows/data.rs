//! Bearer-authenticated fetch of the protected resource.

// self
use crate::{
	_prelude::*,
	error::DataFetchError,
	flows::{
		Fetcher, FetchSession, Payload,
		common::{self, Observed},
	},
	http::FetchHttpClient,
	obs::{self, Operation, OperationTimer},
};

impl<C> Fetcher<C>
where
	C: ?Sized + FetchHttpClient,
{
	/// GETs the session URL with its bearer token and returns the parsed JSON document.
	///
	/// The response-size histogram receives the raw body length on success only.
	pub async fn fetch_data(&self, session: FetchSession) -> Result<Payload> {
		const OPERATION: Operation = Operation::FetchData;

		common::instrumented(OPERATION, session.data_source(), async {
			let timer = OperationTimer::start(OPERATION);
			let response = self.http_client.get_with_bearer(session.url(), session.token()).await;
			let elapsed = timer.observe();
			let response = response.map_err(DataFetchError::from)?;
			let status = response.status;

			if !response.is_success() {
				return Err(DataFetchError::status(status, &response.body).into());
			}

			let value = serde_json::from_slice::<Payload>(&response.body)
				.map_err(|source| DataFetchError::Parse { source, status })?;

			obs::record_response_size(OPERATION, response.body.len());

			Ok(Observed { value, status, elapsed })
		})
		.await
	}
}
