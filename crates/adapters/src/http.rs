//! Shared request/response handling for provider APIs

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use swap_types::{AdapterError, AdapterResult, SwapProvider};
use tracing::debug;

/// Error body shapes used by the supported providers
#[derive(Debug, Deserialize)]
struct ErrorBody {
	error: Option<String>,
	message: Option<String>,
	description: Option<String>,
}

impl ErrorBody {
	fn into_message(self) -> Option<String> {
		self.description.or(self.message).or(self.error)
	}
}

/// Send `request` and decode a JSON body
///
/// Non-2xx responses become [`AdapterError::ProviderError`] when the body
/// carries a message, [`AdapterError::HttpStatusError`] otherwise.
pub async fn send_json<T: DeserializeOwned>(
	provider: SwapProvider,
	request: RequestBuilder,
) -> AdapterResult<T> {
	let response = request.send().await.map_err(AdapterError::HttpError)?;
	let status = response.status();
	let body = response.text().await.map_err(AdapterError::HttpError)?;
	debug!("{} responded {} with {} bytes", provider, status, body.len());

	if !status.is_success() {
		let message = serde_json::from_str::<ErrorBody>(&body)
			.ok()
			.and_then(ErrorBody::into_message);
		return Err(match message {
			Some(message) => AdapterError::ProviderError { provider, message },
			None => AdapterError::from_http_failure(status.as_u16()),
		});
	}

	parse_body(provider, &body)
}

/// Decode a successful response body
///
/// THORNode answers some failures with 200 and an `error` field, so that
/// shape is checked first.
pub fn parse_body<T: DeserializeOwned>(provider: SwapProvider, body: &str) -> AdapterResult<T> {
	if let Ok(ErrorBody {
		error: Some(message),
		..
	}) = serde_json::from_str::<ErrorBody>(body)
	{
		return Err(AdapterError::ProviderError { provider, message });
	}

	serde_json::from_str(body).map_err(|e| {
		AdapterError::invalid_response(format!("Failed to parse {} response: {}", provider, e))
	})
}
