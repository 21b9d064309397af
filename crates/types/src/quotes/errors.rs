//! User-facing swap errors

use thiserror::Error;

use crate::adapters::AdapterError;
use crate::repositories::RepositoryError;

/// Closed set of reasons a quote cannot be shown or used
///
/// Every variant maps to a message through [`SwapError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapError {
	#[error("amount cannot be zero")]
	AmountCannotBeZero,

	#[error("source and destination are the same asset")]
	SameAssets,

	#[error("swap route not available")]
	SwapRouteNotAvailable,

	#[error("amount too small (minimum: {})", .minimum.as_deref().unwrap_or("unknown"))]
	AmountTooSmall { minimum: Option<String> },

	#[error("request timed out")]
	TimeOut,

	#[error("network connection lost")]
	NetworkConnection,

	#[error("{0}")]
	Generic(String),
}

pub type SwapResult<T> = Result<T, SwapError>;

impl SwapError {
	/// Text shown next to the form
	pub fn user_message(&self) -> String {
		match self {
			SwapError::AmountCannotBeZero => "Enter an amount greater than zero".to_string(),
			SwapError::SameAssets => "You can't swap a token for itself".to_string(),
			SwapError::SwapRouteNotAvailable => {
				"Swap route is not available for this pair".to_string()
			},
			SwapError::AmountTooSmall { minimum: Some(min) } => {
				format!("Amount is too small, the minimum is {}", min)
			},
			SwapError::AmountTooSmall { minimum: None } => {
				"Amount is too small to cover the swap fees".to_string()
			},
			SwapError::TimeOut => "The quote request timed out, try again".to_string(),
			SwapError::NetworkConnection => "No network connection".to_string(),
			SwapError::Generic(message) => message.clone(),
		}
	}

	/// Classify an error message returned by a provider API
	pub fn from_provider_message(message: &str) -> Self {
		let lower = message.to_lowercase();
		if lower.contains("dust threshold")
			|| lower.contains("not enough asset to pay for fees")
			|| lower.contains("amount less than")
			|| lower.contains("less than recommended")
			|| lower.contains("too small")
		{
			SwapError::AmountTooSmall { minimum: None }
		} else if lower.contains("trading is halted")
			|| lower.contains("trading halted")
			|| lower.contains("pool does not exist")
			|| lower.contains("no available quotes")
			|| lower.contains("unknown asset")
		{
			SwapError::SwapRouteNotAvailable
		} else if lower.contains("timeout") || lower.contains("timed out") {
			SwapError::TimeOut
		} else {
			SwapError::Generic(message.to_string())
		}
	}
}

impl From<AdapterError> for SwapError {
	fn from(error: AdapterError) -> Self {
		match error {
			AdapterError::HttpError(e) if e.is_timeout() => SwapError::TimeOut,
			AdapterError::HttpError(e) if e.is_connect() => SwapError::NetworkConnection,
			AdapterError::Timeout { .. } => SwapError::TimeOut,
			AdapterError::Connection(_) => SwapError::NetworkConnection,
			AdapterError::UnsupportedRoute { .. } | AdapterError::NotRegistered { .. } => {
				SwapError::SwapRouteNotAvailable
			},
			AdapterError::ProviderError { message, .. } => {
				SwapError::from_provider_message(&message)
			},
			AdapterError::HttpStatusError { reason, .. } => {
				SwapError::from_provider_message(&reason)
			},
			other => SwapError::Generic(other.to_string()),
		}
	}
}

impl From<RepositoryError> for SwapError {
	fn from(error: RepositoryError) -> Self {
		match error {
			RepositoryError::Network(_) => SwapError::NetworkConnection,
			RepositoryError::Timeout => SwapError::TimeOut,
			other => SwapError::Generic(other.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::quotes::SwapProvider;

	#[test]
	fn test_provider_messages_are_classified() {
		assert_eq!(
			SwapError::from_provider_message(
				"failed to simulate swap: amount less than dust threshold"
			),
			SwapError::AmountTooSmall { minimum: None }
		);
		assert_eq!(
			SwapError::from_provider_message("trading is halted, can't process swap"),
			SwapError::SwapRouteNotAvailable
		);
		assert_eq!(
			SwapError::from_provider_message("insufficient liquidity"),
			SwapError::Generic("insufficient liquidity".to_string())
		);
	}

	#[test]
	fn test_adapter_errors_map_to_taxonomy() {
		assert_eq!(
			SwapError::from(AdapterError::Timeout { timeout_ms: 5000 }),
			SwapError::TimeOut
		);
		assert_eq!(
			SwapError::from(AdapterError::Connection("reset".to_string())),
			SwapError::NetworkConnection
		);
		assert_eq!(
			SwapError::from(AdapterError::NotRegistered {
				provider: SwapProvider::LiFi
			}),
			SwapError::SwapRouteNotAvailable
		);
		assert_eq!(
			SwapError::from(AdapterError::http_failure(400, "amount less than dust threshold")),
			SwapError::AmountTooSmall { minimum: None }
		);
	}

	#[test]
	fn test_every_variant_has_a_message() {
		let all = [
			SwapError::AmountCannotBeZero,
			SwapError::SameAssets,
			SwapError::SwapRouteNotAvailable,
			SwapError::AmountTooSmall {
				minimum: Some("0.001 BTC".to_string()),
			},
			SwapError::AmountTooSmall { minimum: None },
			SwapError::TimeOut,
			SwapError::NetworkConnection,
			SwapError::Generic("boom".to_string()),
		];
		for error in all {
			assert!(!error.user_message().is_empty());
		}
	}
}
