//! Reasons a swap transaction cannot be assembled

use thiserror::Error;

/// Missing or inconsistent input found while building a [`super::SwapTransaction`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransactionData {
	#[error("Source token is not selected")]
	MissingSourceToken,

	#[error("Destination token is not selected")]
	MissingDestinationToken,

	#[error("Source and destination tokens must differ")]
	SameAssets,

	#[error("Amount must be a positive number")]
	InvalidAmount,

	#[error("No quote available")]
	MissingQuote,

	#[error("Quote has expired")]
	QuoteExpired,

	#[error("Amount is below the provider minimum of {0}")]
	AmountBelowMinimum(String),

	#[error("Network fee is not available")]
	MissingGasFee,

	#[error("Network fee value is not available")]
	MissingGasFeeFiat,

	#[error("Insufficient balance")]
	InsufficientBalance,

	#[error("Destination address is not available")]
	MissingDestinationAddress,

	#[error("Could not check token allowance: {0}")]
	AllowanceUnavailable(String),
}
