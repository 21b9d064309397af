//! Swap quote domain model
//!
//! A quote is a closed sum over provider families. Native-chain venues
//! (THORChain, Maya) return an inbound address and memo; generic aggregators
//! (1inch, LI.FI) return a ready router transaction.

use alloy_primitives::U256;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Coin, TokenValue};

pub mod affiliate;
pub mod errors;
pub mod routing;

pub use affiliate::{is_affiliate_eligible, AFFILIATE_THRESHOLD_MINOR_USD};
pub use errors::{SwapError, SwapResult};
pub use routing::{resolve_provider, resolve_provider_from};

/// Quote lifetime for THORChain and Maya
pub const NATIVE_QUOTE_TTL_SECS: i64 = 15 * 60;

/// Quote lifetime for 1inch and LI.FI
pub const AGGREGATOR_QUOTE_TTL_SECS: i64 = 60;

/// Providers a swap can be routed through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapProvider {
	ThorChain,
	MayaChain,
	OneInch,
	LiFi,
}

impl SwapProvider {
	pub const ALL: [SwapProvider; 4] = [
		SwapProvider::ThorChain,
		SwapProvider::MayaChain,
		SwapProvider::OneInch,
		SwapProvider::LiFi,
	];

	/// Configuration key of the provider
	pub fn id(&self) -> &'static str {
		match self {
			SwapProvider::ThorChain => "thorchain",
			SwapProvider::MayaChain => "mayachain",
			SwapProvider::OneInch => "oneinch",
			SwapProvider::LiFi => "lifi",
		}
	}

	pub fn display_name(&self) -> &'static str {
		match self {
			SwapProvider::ThorChain => "THORChain",
			SwapProvider::MayaChain => "Maya Protocol",
			SwapProvider::OneInch => "1inch",
			SwapProvider::LiFi => "LI.FI",
		}
	}

	/// Whether the provider settles through its own chain's vaults
	pub fn is_native_venue(&self) -> bool {
		matches!(self, SwapProvider::ThorChain | SwapProvider::MayaChain)
	}

	pub fn default_quote_ttl(&self) -> Duration {
		if self.is_native_venue() {
			Duration::seconds(NATIVE_QUOTE_TTL_SECS)
		} else {
			Duration::seconds(AGGREGATOR_QUOTE_TTL_SECS)
		}
	}
}

impl fmt::Display for SwapProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.display_name())
	}
}

/// Fee charged by the provider, in whatever token the provider reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapFee {
	pub value: TokenValue,
	pub token: Coin,
}

impl SwapFee {
	pub fn new(value: TokenValue, token: Coin) -> Self {
		Self { value, token }
	}
}

/// Fee components of a THORChain/Maya quote, in pool units of `asset`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeQuoteFees {
	pub asset: String,
	pub affiliate: Option<String>,
	pub outbound: Option<String>,
	pub liquidity: Option<String>,
	pub total: String,
	pub total_bps: Option<u32>,
}

/// Provider response data of a THORChain/Maya quote
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeQuoteData {
	/// Vault the source funds are sent to; absent for swaps from the venue's own chain
	pub inbound_address: Option<String>,
	/// Router contract for EVM sources
	pub router: Option<String>,
	pub memo: String,
	pub expected_amount_out: String,
	pub recommended_min_amount_in: Option<String>,
	pub dust_threshold: Option<String>,
	/// Provider-side expiry, unix seconds
	pub expiry: i64,
	pub streaming_swap_interval: Option<u32>,
	pub total_swap_seconds: Option<u64>,
	pub fees: NativeQuoteFees,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeSwapQuote {
	pub expected_dst_value: TokenValue,
	pub fees: SwapFee,
	pub recommended_min_amount_in: Option<TokenValue>,
	pub data: NativeQuoteData,
	pub expired_at: DateTime<Utc>,
}

/// Router transaction returned by an aggregator
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatorTransaction {
	pub from: String,
	pub to: String,
	pub data: String,
	pub value: U256,
	pub gas: u64,
	pub gas_price: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatorQuoteData {
	pub dst_amount: String,
	pub tx: AggregatorTransaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatorSwapQuote {
	/// 1inch or LI.FI
	pub provider: SwapProvider,
	pub expected_dst_value: TokenValue,
	pub fees: SwapFee,
	pub data: AggregatorQuoteData,
	pub expired_at: DateTime<Utc>,
}

/// A normalized quote from one provider family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SwapQuote {
	ThorChain(NativeSwapQuote),
	MayaChain(NativeSwapQuote),
	OneInch(AggregatorSwapQuote),
}

impl SwapQuote {
	pub fn provider(&self) -> SwapProvider {
		match self {
			SwapQuote::ThorChain(_) => SwapProvider::ThorChain,
			SwapQuote::MayaChain(_) => SwapProvider::MayaChain,
			SwapQuote::OneInch(quote) => quote.provider,
		}
	}

	pub fn expected_dst_value(&self) -> &TokenValue {
		match self {
			SwapQuote::ThorChain(quote) | SwapQuote::MayaChain(quote) => &quote.expected_dst_value,
			SwapQuote::OneInch(quote) => &quote.expected_dst_value,
		}
	}

	pub fn fees(&self) -> &SwapFee {
		match self {
			SwapQuote::ThorChain(quote) | SwapQuote::MayaChain(quote) => &quote.fees,
			SwapQuote::OneInch(quote) => &quote.fees,
		}
	}

	/// Provider floor for the source amount; aggregators report none
	pub fn recommended_min_amount_in(&self) -> Option<&TokenValue> {
		match self {
			SwapQuote::ThorChain(quote) | SwapQuote::MayaChain(quote) => {
				quote.recommended_min_amount_in.as_ref()
			},
			SwapQuote::OneInch(_) => None,
		}
	}

	pub fn expired_at(&self) -> DateTime<Utc> {
		match self {
			SwapQuote::ThorChain(quote) | SwapQuote::MayaChain(quote) => quote.expired_at,
			SwapQuote::OneInch(quote) => quote.expired_at,
		}
	}

	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		self.expired_at() <= now
	}

	pub fn is_expired(&self) -> bool {
		self.is_expired_at(Utc::now())
	}

	/// Contract that must be approved to spend an ERC-20 source token
	pub fn spender(&self) -> Option<&str> {
		match self {
			SwapQuote::ThorChain(quote) | SwapQuote::MayaChain(quote) => quote.data.router.as_deref(),
			SwapQuote::OneInch(quote) => Some(quote.data.tx.to.as_str()),
		}
	}
}
