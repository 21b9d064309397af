//! Network and provider fee models

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::models::{Coin, FiatValue, TokenValue};
use crate::quotes::SwapFee;

/// Estimated network fee, always in the chain's native token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasFee {
	pub value: TokenValue,
	pub coin: Coin,
	/// Price per gas unit on EVM chains, the flat fee elsewhere
	pub price: U256,
	/// Gas limit the fee was computed with, EVM only
	pub limit: Option<U256>,
}

/// Fees frozen into a transaction at submit time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSnapshot {
	pub gas: GasFee,
	pub gas_fiat: FiatValue,
	pub swap_fee: SwapFee,
	pub swap_fee_fiat: FiatValue,
	pub total_fiat: FiatValue,
}
