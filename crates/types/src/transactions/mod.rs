//! Assembled swap transactions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fees::FeeSnapshot;
use crate::models::{Coin, TokenValue};
use crate::quotes::{AggregatorTransaction, SwapProvider, SwapQuote};

pub mod errors;

pub use errors::InvalidTransactionData;

/// Deposit instructions for a THORChain/Maya swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeSwapPayload {
	pub inbound_address: Option<String>,
	pub router: Option<String>,
	pub memo: String,
	/// Provider-side deadline, unix seconds
	pub expiry: i64,
	pub streaming_interval: Option<u32>,
}

/// Router call for a 1inch/LI.FI swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatorSwapPayload {
	pub provider: SwapProvider,
	pub tx: AggregatorTransaction,
}

/// Chain-specific part of a swap transaction, one variant per quote family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SwapPayload {
	ThorChain(NativeSwapPayload),
	MayaChain(NativeSwapPayload),
	OneInch(AggregatorSwapPayload),
}

impl From<&SwapQuote> for SwapPayload {
	fn from(quote: &SwapQuote) -> Self {
		match quote {
			SwapQuote::ThorChain(quote) => SwapPayload::ThorChain(NativeSwapPayload {
				inbound_address: quote.data.inbound_address.clone(),
				router: quote.data.router.clone(),
				memo: quote.data.memo.clone(),
				expiry: quote.data.expiry,
				streaming_interval: quote.data.streaming_swap_interval,
			}),
			SwapQuote::MayaChain(quote) => SwapPayload::MayaChain(NativeSwapPayload {
				inbound_address: quote.data.inbound_address.clone(),
				router: quote.data.router.clone(),
				memo: quote.data.memo.clone(),
				expiry: quote.data.expiry,
				streaming_interval: quote.data.streaming_swap_interval,
			}),
			SwapQuote::OneInch(quote) => SwapPayload::OneInch(AggregatorSwapPayload {
				provider: quote.provider,
				tx: quote.data.tx.clone(),
			}),
		}
	}
}

/// Immutable record handed to signing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransaction {
	pub id: String,
	pub vault_id: String,
	pub src_token: Coin,
	pub src_address: String,
	pub src_token_value: TokenValue,
	pub dst_token: Coin,
	pub dst_address: String,
	pub expected_dst_token_value: TokenValue,
	pub payload: SwapPayload,
	pub is_approval_required: bool,
	pub fees: FeeSnapshot,
	pub created_at: DateTime<Utc>,
}

impl SwapTransaction {
	pub fn provider(&self) -> SwapProvider {
		match &self.payload {
			SwapPayload::ThorChain(_) => SwapProvider::ThorChain,
			SwapPayload::MayaChain(_) => SwapProvider::MayaChain,
			SwapPayload::OneInch(payload) => payload.provider,
		}
	}
}
