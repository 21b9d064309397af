//! 1inch swap API adapter
//!
//! Same-chain EVM swaps. The quote carries the router transaction; the
//! provider fee reported to the form is the transaction's gas cost.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use swap_types::{
	Adapter, AdapterError, AdapterResult, AggregatorQuoteData, AggregatorSwapQuote,
	AggregatorTransaction, Coin, ProviderQuoteRequest, ProviderRuntimeConfig, SwapFee,
	SwapProvider, SwapProviderAdapter, SwapQuote, TokenValue, U256,
};
use tracing::{debug, info};

use crate::client_cache::{ClientCache, ClientConfig};
use crate::http::send_json;

/// Placeholder address 1inch uses for the native asset
pub const ONEINCH_NATIVE_TOKEN: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

#[derive(Debug)]
enum ClientStrategy {
	Cached(ClientCache),
	OnDemand,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapTxResponse {
	from: String,
	to: String,
	data: String,
	value: String,
	gas: u64,
	gas_price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
	dst_amount: String,
	tx: SwapTxResponse,
}

#[derive(Debug)]
pub struct OneInchAdapter {
	config: Adapter,
	client_strategy: ClientStrategy,
}

impl OneInchAdapter {
	pub fn new() -> Self {
		Self::with_cache(ClientCache::for_adapter())
	}

	pub fn with_cache(cache: ClientCache) -> Self {
		Self {
			config: Adapter::new("oneinch-v6", "1inch Swap Adapter", "6.0.0"),
			client_strategy: ClientStrategy::Cached(cache),
		}
	}

	pub fn without_cache() -> Self {
		Self {
			config: Adapter::new("oneinch-v6", "1inch Swap Adapter", "6.0.0"),
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

	fn token_address(coin: &Coin) -> String {
		coin.contract_address
			.clone()
			.unwrap_or_else(|| ONEINCH_NATIVE_TOKEN.to_string())
	}

	fn build_query(
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> Vec<(&'static str, String)> {
		let mut query = vec![
			("src", Self::token_address(&request.src)),
			("dst", Self::token_address(&request.dst)),
			("amount", request.amount.value.to_string()),
			("from", request.src_address.clone()),
			("slippage", format_percent(request.slippage_bps)),
			("disableEstimate", "true".to_string()),
			("includeGas", "true".to_string()),
		];

		if !request.dst_address.eq_ignore_ascii_case(&request.src_address) {
			query.push(("receiver", request.dst_address.clone()));
		}

		if let Some(affiliate) = config.affiliate_for(request) {
			query.push(("referrer", affiliate.code.clone()));
			query.push(("fee", format_percent(affiliate.fee_bps)));
		}

		query
	}

	fn normalize(
		response: SwapResponse,
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
		now: DateTime<Utc>,
	) -> AdapterResult<SwapQuote> {
		let expected_dst_value = TokenValue::from_base_units(&response.dst_amount, request.dst.decimals)
			.ok_or_else(|| {
				AdapterError::invalid_response(format!("invalid dstAmount '{}'", response.dst_amount))
			})?;

		let tx = AggregatorTransaction {
			from: response.tx.from,
			to: response.tx.to,
			data: response.tx.data,
			value: parse_u256(&response.tx.value)?,
			gas: response.tx.gas,
			gas_price: parse_u256(&response.tx.gas_price)?,
		};

		let fees = gas_cost_fee(&tx, &request.src)?;

		Ok(SwapQuote::OneInch(AggregatorSwapQuote {
			provider: SwapProvider::OneInch,
			expected_dst_value,
			fees,
			data: AggregatorQuoteData {
				dst_amount: response.dst_amount,
				tx,
			},
			expired_at: now + config.quote_ttl,
		}))
	}
}

impl Default for OneInchAdapter {
	fn default() -> Self {
		Self::new()
	}
}

/// Basis points as a percentage string (50 -> "0.5")
fn format_percent(bps: u32) -> String {
	let whole = bps / 100;
	let fraction = bps % 100;
	if fraction == 0 {
		whole.to_string()
	} else {
		format!("{}.{:02}", whole, fraction)
			.trim_end_matches('0')
			.to_string()
	}
}

/// Parse a decimal or 0x-prefixed hex amount
pub(crate) fn parse_u256(raw: &str) -> AdapterResult<U256> {
	raw.trim()
		.parse::<U256>()
		.map_err(|_| AdapterError::invalid_response(format!("invalid amount '{}'", raw)))
}

/// Gas cost of the router transaction as a fee in the chain's native token
pub(crate) fn gas_cost_fee(tx: &AggregatorTransaction, src: &Coin) -> AdapterResult<SwapFee> {
	let native = Coin::native(src.chain);
	let cost = U256::from(tx.gas)
		.checked_mul(tx.gas_price)
		.ok_or_else(|| AdapterError::invalid_response("gas cost overflows"))?;
	Ok(SwapFee::new(TokenValue::new(cost, native.decimals), native))
}

#[async_trait]
impl SwapProviderAdapter for OneInchAdapter {
	fn adapter_info(&self) -> &Adapter {
		&self.config
	}

	fn provider(&self) -> SwapProvider {
		SwapProvider::OneInch
	}

	async fn get_quote(
		&self,
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapQuote> {
		let chain_id = match request.src.chain.evm_chain_id() {
			Some(id) if SwapProvider::OneInch.supports_pair(&request.src, &request.dst) => id,
			_ => {
				return Err(AdapterError::UnsupportedRoute {
					provider: SwapProvider::OneInch,
					src: request.src.id(),
					dst: request.dst.id(),
				})
			},
		};

		debug!(
			"1inch quote on chain {}: {} -> {}",
			chain_id, request.src.ticker, request.dst.ticker
		);

		let query = Self::build_query(request, config);
		let url = config.url(&format!("swap/v6.0/{}/swap", chain_id));
		let client = self.get_client(config)?;

		let response: SwapResponse =
			send_json(SwapProvider::OneInch, client.get(url).query(&query)).await?;
		let quote = Self::normalize(response, request, config, Utc::now())?;

		info!(
			"1inch quoted {} {} for {} {}",
			quote.expected_dst_value(),
			request.dst.ticker,
			request.amount,
			request.src.ticker
		);
		Ok(quote)
	}

	async fn health_check(&self, config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		let url = config.url("swap/v6.0/1/healthcheck");
		let client = self.get_client(config)?;
		let response = client.get(url).send().await.map_err(AdapterError::HttpError)?;
		Ok(response.status().is_success())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;
	use swap_types::Chain;

	const SWAP_FIXTURE: &str = r#"{
		"dstAmount": "2512345678",
		"tx": {
			"from": "0xowner",
			"to": "0x111111125421ca6dc452d289314280a0f8842a65",
			"data": "0x07ed2379",
			"value": "1000000000000000000",
			"gas": 180000,
			"gasPrice": "20000000000"
		}
	}"#;

	fn eth_to_usdc() -> ProviderQuoteRequest {
		ProviderQuoteRequest {
			src: Coin::native(Chain::Ethereum),
			dst: Coin::token(Chain::Ethereum, "USDC", "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", 6),
			amount: TokenValue::new(U256::from(1_000_000_000_000_000_000u128), 18),
			src_address: "0xowner".to_string(),
			dst_address: "0xowner".to_string(),
			is_affiliate: true,
			streaming_interval: None,
			slippage_bps: 50,
		}
	}

	fn runtime_config() -> ProviderRuntimeConfig {
		ProviderRuntimeConfig::new(SwapProvider::OneInch, "https://api.1inch.dev", 5_000)
			.with_affiliate("0xreferrer", 50)
	}

	#[test]
	fn test_format_percent() {
		assert_eq!(format_percent(50), "0.5");
		assert_eq!(format_percent(100), "1");
		assert_eq!(format_percent(125), "1.25");
		assert_eq!(format_percent(5), "0.05");
	}

	#[test]
	fn test_query_uses_native_placeholder_and_referrer() {
		let query = OneInchAdapter::build_query(&eth_to_usdc(), &runtime_config());
		assert!(query.contains(&("src", ONEINCH_NATIVE_TOKEN.to_string())));
		assert!(query.contains(&(
			"dst",
			"0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".to_string()
		)));
		assert!(query.contains(&("amount", "1000000000000000000".to_string())));
		assert!(query.contains(&("slippage", "0.5".to_string())));
		assert!(query.contains(&("referrer", "0xreferrer".to_string())));
		assert!(!query.iter().any(|(key, _)| *key == "receiver"));
	}

	#[test]
	fn test_normalize_computes_gas_fee_in_native() {
		let response: SwapResponse = serde_json::from_str(SWAP_FIXTURE).unwrap();
		let now = Utc::now();
		let quote =
			OneInchAdapter::normalize(response, &eth_to_usdc(), &runtime_config(), now).unwrap();

		assert_eq!(quote.provider(), SwapProvider::OneInch);
		assert_eq!(
			*quote.expected_dst_value(),
			TokenValue::new(U256::from(2_512_345_678u64), 6)
		);
		assert_eq!(quote.fees().token, Coin::native(Chain::Ethereum));
		assert_eq!(
			quote.fees().value.value,
			U256::from(3_600_000_000_000_000u128)
		);
		assert_eq!(quote.spender(), Some("0x111111125421ca6dc452d289314280a0f8842a65"));
		assert_eq!(quote.expired_at(), now + Duration::seconds(60));
	}

	#[tokio::test]
	async fn test_cross_chain_pairs_are_rejected() {
		let adapter = OneInchAdapter::without_cache();
		let mut request = eth_to_usdc();
		request.dst = Coin::native(Chain::Arbitrum);

		let result = adapter.get_quote(&request, &runtime_config()).await;
		assert!(matches!(result, Err(AdapterError::UnsupportedRoute { .. })));
	}
}
