//! THORChain and Maya adapter
//!
//! Both venues expose the same THORNode quote API under different path
//! prefixes. Amounts travel in fixed 8-decimal pool units (10 for CACAO) and
//! are converted back to token decimals here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use swap_types::{
	Adapter, AdapterError, AdapterResult, Chain, Coin, NativeQuoteData, NativeQuoteFees,
	NativeSwapQuote, ProviderQuoteRequest, ProviderRuntimeConfig, SwapFee, SwapProvider,
	SwapProviderAdapter, SwapQuote, TokenValue,
};
use tracing::{debug, info};

use crate::client_cache::{ClientCache, ClientConfig};
use crate::http::send_json;

/// Decimals of THORChain/Maya pool amounts
const POOL_DECIMALS: u8 = 8;

/// Client strategy for the adapter
#[derive(Debug)]
enum ClientStrategy {
	Cached(ClientCache),
	OnDemand,
}

#[derive(Debug, Deserialize)]
struct QuoteFeesResponse {
	asset: String,
	affiliate: Option<String>,
	outbound: Option<String>,
	liquidity: Option<String>,
	total: String,
	total_bps: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct QuoteSwapResponse {
	inbound_address: Option<String>,
	router: Option<String>,
	memo: Option<String>,
	expected_amount_out: String,
	recommended_min_amount_in: Option<String>,
	dust_threshold: Option<String>,
	expiry: i64,
	streaming_swap_interval: Option<u32>,
	total_swap_seconds: Option<u64>,
	fees: QuoteFeesResponse,
}

/// Adapter for THORChain-style native swap venues
#[derive(Debug)]
pub struct ThorChainAdapter {
	config: Adapter,
	provider: SwapProvider,
	client_strategy: ClientStrategy,
}

impl ThorChainAdapter {
	/// Create an adapter for `provider` with the shared client cache
	pub fn new(provider: SwapProvider) -> AdapterResult<Self> {
		Self::with_cache(provider, ClientCache::for_adapter())
	}

	pub fn with_cache(provider: SwapProvider, cache: ClientCache) -> AdapterResult<Self> {
		Self::build(provider, ClientStrategy::Cached(cache))
	}

	pub fn without_cache(provider: SwapProvider) -> AdapterResult<Self> {
		Self::build(provider, ClientStrategy::OnDemand)
	}

	pub fn thorchain() -> AdapterResult<Self> {
		Self::new(SwapProvider::ThorChain)
	}

	pub fn maya() -> AdapterResult<Self> {
		Self::new(SwapProvider::MayaChain)
	}

	fn build(provider: SwapProvider, client_strategy: ClientStrategy) -> AdapterResult<Self> {
		let config = match provider {
			SwapProvider::ThorChain => Adapter::new("thorchain-v1", "THORChain Adapter", "1.0.0"),
			SwapProvider::MayaChain => Adapter::new("mayachain-v1", "Maya Protocol Adapter", "1.0.0"),
			other => {
				return Err(AdapterError::ConfigError {
					reason: format!("{} is not a THORNode-compatible venue", other),
				})
			},
		};
		Ok(Self {
			config,
			provider,
			client_strategy,
		})
	}

	fn api_prefix(&self) -> &'static str {
		match self.provider {
			SwapProvider::MayaChain => "mayachain",
			_ => "thorchain",
		}
	}

	/// Pool-unit decimals for `coin`
	fn pool_decimals(&self, coin: &Coin) -> u8 {
		if self.provider == SwapProvider::MayaChain && coin.chain == Chain::MayaChain && coin.is_native() {
			coin.decimals
		} else {
			POOL_DECIMALS
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

	fn build_query(
		&self,
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Vec<(&'static str, String)>> {
		let amount = request
			.amount
			.rescale(self.pool_decimals(&request.src))
			.map_err(|e| AdapterError::invalid_response(e.to_string()))?;
		if amount.is_zero() {
			return Err(AdapterError::ProviderError {
				provider: self.provider,
				message: "amount too small".to_string(),
			});
		}

		let mut query = vec![
			("from_asset", request.src.swap_asset()),
			("to_asset", request.dst.swap_asset()),
			("amount", amount.value.to_string()),
			("destination", request.dst_address.clone()),
		];

		if let Some(interval) = request.streaming_interval {
			query.push(("streaming_interval", interval.to_string()));
			query.push(("streaming_quantity", "0".to_string()));
		}

		if let Some(affiliate) = config.affiliate_for(request) {
			query.push(("affiliate", affiliate.code.clone()));
			query.push(("affiliate_bps", affiliate.fee_bps.to_string()));
		}

		Ok(query)
	}

	fn from_pool_units(&self, raw: &str, coin: &Coin) -> AdapterResult<TokenValue> {
		TokenValue::from_base_units(raw, self.pool_decimals(coin))
			.ok_or_else(|| AdapterError::invalid_response(format!("invalid pool amount '{}'", raw)))?
			.rescale(coin.decimals)
			.map_err(|e| AdapterError::invalid_response(e.to_string()))
	}

	fn normalize(
		&self,
		response: QuoteSwapResponse,
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
		now: DateTime<Utc>,
	) -> AdapterResult<SwapQuote> {
		let memo = response
			.memo
			.ok_or_else(|| AdapterError::invalid_response("quote has no memo"))?;

		let expected_dst_value = self.from_pool_units(&response.expected_amount_out, &request.dst)?;

		let fee_token = if response.fees.asset.eq_ignore_ascii_case(&request.src.swap_asset()) {
			&request.src
		} else {
			&request.dst
		};
		let fees = SwapFee::new(
			self.from_pool_units(&response.fees.total, fee_token)?,
			fee_token.clone(),
		);

		let recommended_min_amount_in = response
			.recommended_min_amount_in
			.as_deref()
			.map(|raw| self.from_pool_units(raw, &request.src))
			.transpose()?;

		let quote = NativeSwapQuote {
			expected_dst_value,
			fees,
			recommended_min_amount_in,
			data: NativeQuoteData {
				inbound_address: response.inbound_address,
				router: response.router,
				memo,
				expected_amount_out: response.expected_amount_out,
				recommended_min_amount_in: response.recommended_min_amount_in,
				dust_threshold: response.dust_threshold,
				expiry: response.expiry,
				streaming_swap_interval: response.streaming_swap_interval,
				total_swap_seconds: response.total_swap_seconds,
				fees: NativeQuoteFees {
					asset: response.fees.asset,
					affiliate: response.fees.affiliate,
					outbound: response.fees.outbound,
					liquidity: response.fees.liquidity,
					total: response.fees.total,
					total_bps: response.fees.total_bps,
				},
			},
			expired_at: now + config.quote_ttl,
		};

		Ok(match self.provider {
			SwapProvider::MayaChain => SwapQuote::MayaChain(quote),
			_ => SwapQuote::ThorChain(quote),
		})
	}
}

#[async_trait]
impl SwapProviderAdapter for ThorChainAdapter {
	fn adapter_info(&self) -> &Adapter {
		&self.config
	}

	fn provider(&self) -> SwapProvider {
		self.provider
	}

	async fn get_quote(
		&self,
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapQuote> {
		if !self.provider.supports_pair(&request.src, &request.dst) {
			return Err(AdapterError::UnsupportedRoute {
				provider: self.provider,
				src: request.src.swap_asset(),
				dst: request.dst.swap_asset(),
			});
		}

		debug!(
			"{} quote {} -> {} (affiliate: {})",
			self.provider,
			request.src.swap_asset(),
			request.dst.swap_asset(),
			request.is_affiliate
		);

		let query = self.build_query(request, config)?;
		let url = config.url(&format!("{}/quote/swap", self.api_prefix()));
		let client = self.get_client(config)?;

		let response: QuoteSwapResponse =
			send_json(self.provider, client.get(url).query(&query)).await?;
		let quote = self.normalize(response, request, config, Utc::now())?;

		info!(
			"{} quoted {} {} for {} {}",
			self.provider,
			quote.expected_dst_value(),
			request.dst.ticker,
			request.amount,
			request.src.ticker
		);
		Ok(quote)
	}

	async fn health_check(&self, config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		let url = config.url(&format!("{}/ping", self.api_prefix()));
		let client = self.get_client(config)?;
		let response = client.get(url).send().await.map_err(AdapterError::HttpError)?;
		Ok(response.status().is_success())
	}
}
