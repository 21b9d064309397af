//! LI.FI adapter
//!
//! Cross-chain and same-chain swaps across EVM chains and Solana. Amounts in
//! the transaction request are hex encoded.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use swap_types::{
	Adapter, AdapterError, AdapterResult, AggregatorQuoteData, AggregatorSwapQuote,
	AggregatorTransaction, Chain, Coin, ProviderQuoteRequest, ProviderRuntimeConfig, SwapFee,
	SwapProvider, SwapProviderAdapter, SwapQuote, TokenValue, U256,
};
use tracing::{debug, info};

use crate::client_cache::{ClientCache, ClientConfig};
use crate::http::send_json;
use crate::oneinch_adapter::{gas_cost_fee, parse_u256};

/// Native asset address on EVM chains
const LIFI_EVM_NATIVE_TOKEN: &str = "0x0000000000000000000000000000000000000000";
/// Native asset address on Solana
const LIFI_SOLANA_NATIVE_TOKEN: &str = "11111111111111111111111111111111";
/// LI.FI's chain id for Solana
const LIFI_SOLANA_CHAIN_ID: u64 = 1_151_111_081_099_710;

/// Client strategy for the LiFi adapter
#[derive(Debug)]
enum ClientStrategy {
	Cached(ClientCache),
	OnDemand,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GasCost {
	amount: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Estimate {
	to_amount: String,
	#[serde(default)]
	gas_costs: Vec<GasCost>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRequest {
	from: Option<String>,
	to: Option<String>,
	data: String,
	value: Option<String>,
	gas_limit: Option<String>,
	gas_price: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
	estimate: Estimate,
	transaction_request: TransactionRequest,
}

/// LiFi adapter for cross-chain bridge quotes
#[derive(Debug)]
pub struct LifiAdapter {
	config: Adapter,
	client_strategy: ClientStrategy,
}

impl LifiAdapter {
	/// Create a LiFi adapter with the shared client cache
	pub fn new() -> Self {
		Self::with_cache(ClientCache::for_adapter())
	}

	pub fn with_cache(cache: ClientCache) -> Self {
		Self {
			config: Adapter::new("lifi-v1", "LiFi v1 Adapter", "1.0.0"),
			client_strategy: ClientStrategy::Cached(cache),
		}
	}

	/// Create a LiFi adapter that builds a client per request
	pub fn without_cache() -> Self {
		Self {
			config: Adapter::new("lifi-v1", "LiFi v1 Adapter", "1.0.0"),
			client_strategy: ClientStrategy::OnDemand,
		}
	}

	fn get_client(&self, config: &ProviderRuntimeConfig) -> AdapterResult<Arc<reqwest::Client>> {
		match &self.client_strategy {
			ClientStrategy::Cached(cache) => cache.client_for(config),
			ClientStrategy::OnDemand => {
				ClientCache::build_client(&ClientConfig::from(config)).map(Arc::new)
			},
		}
	}

	fn chain_id(chain: Chain) -> Option<u64> {
		match chain {
			Chain::Solana => Some(LIFI_SOLANA_CHAIN_ID),
			other => other.evm_chain_id(),
		}
	}

	fn token_address(coin: &Coin) -> String {
		match (&coin.contract_address, coin.chain) {
			(Some(contract), _) => contract.clone(),
			(None, Chain::Solana) => LIFI_SOLANA_NATIVE_TOKEN.to_string(),
			(None, _) => LIFI_EVM_NATIVE_TOKEN.to_string(),
		}
	}

	fn build_query(
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Vec<(&'static str, String)>> {
		let unsupported = || AdapterError::UnsupportedRoute {
			provider: SwapProvider::LiFi,
			src: request.src.id(),
			dst: request.dst.id(),
		};
		let from_chain = Self::chain_id(request.src.chain).ok_or_else(unsupported)?;
		let to_chain = Self::chain_id(request.dst.chain).ok_or_else(unsupported)?;

		let mut query = vec![
			("fromChain", from_chain.to_string()),
			("toChain", to_chain.to_string()),
			("fromToken", Self::token_address(&request.src)),
			("toToken", Self::token_address(&request.dst)),
			("fromAmount", request.amount.value.to_string()),
			("fromAddress", request.src_address.clone()),
			("toAddress", request.dst_address.clone()),
			("slippage", format_fraction(request.slippage_bps)),
		];

		if let Some(affiliate) = config.affiliate_for(request) {
			query.push(("integrator", affiliate.code.clone()));
			query.push(("fee", format_fraction(affiliate.fee_bps)));
		}

		Ok(query)
	}

	fn normalize(
		response: QuoteResponse,
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
		now: DateTime<Utc>,
	) -> AdapterResult<SwapQuote> {
		let expected_dst_value =
			TokenValue::from_base_units(&response.estimate.to_amount, request.dst.decimals)
				.ok_or_else(|| {
					AdapterError::invalid_response(format!(
						"invalid toAmount '{}'",
						response.estimate.to_amount
					))
				})?;

		let tx_request = response.transaction_request;
		let gas = match tx_request.gas_limit.as_deref() {
			Some(raw) => u64::try_from(parse_u256(raw)?)
				.map_err(|_| AdapterError::invalid_response("gas limit overflows u64"))?,
			None => 0,
		};
		let tx = AggregatorTransaction {
			from: tx_request.from.unwrap_or_else(|| request.src_address.clone()),
			to: tx_request.to.unwrap_or_default(),
			data: tx_request.data,
			value: tx_request.value.as_deref().map(parse_u256).transpose()?.unwrap_or_default(),
			gas,
			gas_price: tx_request
				.gas_price
				.as_deref()
				.map(parse_u256)
				.transpose()?
				.unwrap_or_default(),
		};

		let fees = if tx.gas > 0 && !tx.gas_price.is_zero() {
			gas_cost_fee(&tx, &request.src)?
		} else {
			let native = Coin::native(request.src.chain);
			let mut total = U256::ZERO;
			for cost in &response.estimate.gas_costs {
				total = total.saturating_add(parse_u256(&cost.amount)?);
			}
			SwapFee::new(TokenValue::new(total, native.decimals), native)
		};

		Ok(SwapQuote::OneInch(AggregatorSwapQuote {
			provider: SwapProvider::LiFi,
			expected_dst_value,
			fees,
			data: AggregatorQuoteData {
				dst_amount: response.estimate.to_amount,
				tx,
			},
			expired_at: now + config.quote_ttl,
		}))
	}
}

impl Default for LifiAdapter {
	fn default() -> Self {
		Self::new()
	}
}

/// Basis points as a fraction string (50 -> "0.005")
fn format_fraction(bps: u32) -> String {
	let whole = bps / 10_000;
	let fraction = bps % 10_000;
	if fraction == 0 {
		whole.to_string()
	} else {
		format!("{}.{:04}", whole, fraction)
			.trim_end_matches('0')
			.to_string()
	}
}

#[async_trait]
impl SwapProviderAdapter for LifiAdapter {
	fn adapter_info(&self) -> &Adapter {
		&self.config
	}

	fn provider(&self) -> SwapProvider {
		SwapProvider::LiFi
	}

	async fn get_quote(
		&self,
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapQuote> {
		if !SwapProvider::LiFi.supports_pair(&request.src, &request.dst) {
			return Err(AdapterError::UnsupportedRoute {
				provider: SwapProvider::LiFi,
				src: request.src.id(),
				dst: request.dst.id(),
			});
		}

		debug!(
			"LiFi quote {} ({}) -> {} ({})",
			request.src.ticker, request.src.chain, request.dst.ticker, request.dst.chain
		);

		let query = Self::build_query(request, config)?;
		let url = config.url("v1/quote");
		let client = self.get_client(config)?;

		let response: QuoteResponse =
			send_json(SwapProvider::LiFi, client.get(url).query(&query)).await?;
		let quote = Self::normalize(response, request, config, Utc::now())?;

		info!(
			"LiFi quoted {} {} for {} {}",
			quote.expected_dst_value(),
			request.dst.ticker,
			request.amount,
			request.src.ticker
		);
		Ok(quote)
	}

	async fn health_check(&self, config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		debug!("LiFi adapter health check against {}", config.endpoint);

		let url = config.url("v1/chains");
		let client = self.get_client(config)?;
		let response = client.get(url).send().await.map_err(AdapterError::HttpError)?;
		Ok(response.status().is_success())
	}
}
