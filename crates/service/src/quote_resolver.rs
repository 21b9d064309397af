//! Quote resolution
//!
//! Picks a provider for a token pair and fetches a normalized quote through
//! the registered adapter, bounded by the provider's timeout.

use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use swap_adapters::AdapterRegistry;
use swap_types::{
	resolve_provider_from, Coin, ProviderQuoteRequest, ProviderRuntimeConfig, SwapError,
	SwapProvider, SwapQuote, SwapResult, TokenValue,
};
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

/// Default slippage tolerance for aggregator quotes (1%)
pub const DEFAULT_SLIPPAGE_BPS: u32 = 100;

/// A quote request as seen by the form
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRequest {
	pub src: Coin,
	pub dst: Coin,
	pub amount: TokenValue,
	pub src_address: String,
	pub dst_address: String,
	pub is_affiliate: bool,
}

/// Trait for quote resolution - enables mocking the network side of the form
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteResolverTrait: Send + Sync {
	/// Provider able to swap `src` into `dst`, if any
	fn resolve_provider(&self, src: &Coin, dst: &Coin) -> Option<SwapProvider>;

	/// Fetch a quote from `provider`
	async fn get_quote(&self, provider: SwapProvider, request: &QuoteRequest)
		-> SwapResult<SwapQuote>;
}

/// Resolver backed by the adapter registry
#[derive(Debug, Clone)]
pub struct QuoteResolver {
	registry: Arc<AdapterRegistry>,
	configs: HashMap<SwapProvider, ProviderRuntimeConfig>,
	streaming_interval: Option<u32>,
	slippage_bps: u32,
}

impl QuoteResolver {
	pub fn new(registry: Arc<AdapterRegistry>, configs: Vec<ProviderRuntimeConfig>) -> Self {
		let configs = configs
			.into_iter()
			.map(|config| (config.provider, config))
			.collect();
		Self {
			registry,
			configs,
			streaming_interval: None,
			slippage_bps: DEFAULT_SLIPPAGE_BPS,
		}
	}

	/// Streaming swap interval forwarded to THORChain/Maya
	pub fn with_streaming_interval(mut self, interval: Option<u32>) -> Self {
		self.streaming_interval = interval;
		self
	}

	pub fn with_slippage_bps(mut self, slippage_bps: u32) -> Self {
		self.slippage_bps = slippage_bps;
		self
	}

	/// Providers that have both an adapter and a configuration
	pub fn available_providers(&self) -> Vec<SwapProvider> {
		self.registry
			.providers()
			.into_iter()
			.filter(|provider| self.configs.contains_key(provider))
			.collect()
	}

	/// Ping every available provider
	pub async fn health_check_all(&self) -> HashMap<SwapProvider, bool> {
		let checks = self.available_providers().into_iter().map(|provider| async move {
			let healthy = match (self.registry.get(provider), self.configs.get(&provider)) {
				(Some(adapter), Some(config)) => adapter.health_check(config).await.unwrap_or(false),
				_ => false,
			};
			(provider, healthy)
		});
		join_all(checks).await.into_iter().collect()
	}
}

#[async_trait]
impl QuoteResolverTrait for QuoteResolver {
	fn resolve_provider(&self, src: &Coin, dst: &Coin) -> Option<SwapProvider> {
		let provider = resolve_provider_from(src, dst, &self.available_providers());
		debug!(
			"Resolved provider for {} -> {}: {:?}",
			src.id(),
			dst.id(),
			provider
		);
		provider
	}

	async fn get_quote(
		&self,
		provider: SwapProvider,
		request: &QuoteRequest,
	) -> SwapResult<SwapQuote> {
		let adapter = self.registry.get(provider).ok_or_else(|| {
			warn!("No adapter registered for {}", provider);
			SwapError::SwapRouteNotAvailable
		})?;
		let config = self.configs.get(&provider).ok_or_else(|| {
			warn!("No configuration for {}", provider);
			SwapError::SwapRouteNotAvailable
		})?;

		let provider_request = ProviderQuoteRequest {
			src: request.src.clone(),
			dst: request.dst.clone(),
			amount: request.amount,
			src_address: request.src_address.clone(),
			dst_address: request.dst_address.clone(),
			is_affiliate: request.is_affiliate,
			streaming_interval: if provider.is_native_venue() {
				self.streaming_interval
			} else {
				None
			},
			slippage_bps: self.slippage_bps,
		};

		info!(
			"Requesting {} quote for {} {} -> {}",
			provider, request.amount, request.src.ticker, request.dst.ticker
		);

		match timeout(
			Duration::from_millis(config.timeout_ms),
			adapter.get_quote(&provider_request, config),
		)
		.await
		{
			Ok(Ok(quote)) => Ok(quote),
			Ok(Err(e)) => {
				warn!("{} quote failed: {}", provider, e);
				Err(SwapError::from(e))
			},
			Err(_) => {
				warn!("{} quote timed out after {}ms", provider, config.timeout_ms);
				Err(SwapError::TimeOut)
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use swap_types::{
		chrono::{Duration as ChronoDuration, Utc},
		Adapter, AdapterError, AdapterResult, AggregatorQuoteData, AggregatorSwapQuote, Chain,
		SwapFee, SwapProviderAdapter, U256,
	};

	#[derive(Debug)]
	struct ScriptedAdapter {
		info: Adapter,
		provider: SwapProvider,
		delay_ms: u64,
		fail_with: Option<String>,
		calls: AtomicUsize,
	}

	impl ScriptedAdapter {
		fn new(provider: SwapProvider) -> Self {
			Self {
				info: Adapter::new(provider.id(), provider.display_name(), "test"),
				provider,
				delay_ms: 0,
				fail_with: None,
				calls: AtomicUsize::new(0),
			}
		}
	}

	#[async_trait]
	impl SwapProviderAdapter for ScriptedAdapter {
		fn adapter_info(&self) -> &Adapter {
			&self.info
		}

		fn provider(&self) -> SwapProvider {
			self.provider
		}

		async fn get_quote(
			&self,
			request: &ProviderQuoteRequest,
			config: &ProviderRuntimeConfig,
		) -> AdapterResult<SwapQuote> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			if self.delay_ms > 0 {
				tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
			}
			if let Some(message) = &self.fail_with {
				return Err(AdapterError::ProviderError {
					provider: self.provider,
					message: message.clone(),
				});
			}
			Ok(SwapQuote::OneInch(AggregatorSwapQuote {
				provider: self.provider,
				expected_dst_value: TokenValue::new(request.amount.value, request.dst.decimals),
				fees: SwapFee::new(
					TokenValue::zero(request.src.decimals),
					Coin::native(request.src.chain),
				),
				data: AggregatorQuoteData::default(),
				expired_at: Utc::now() + config.quote_ttl,
			}))
		}

		async fn health_check(&self, _config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
			Ok(self.fail_with.is_none())
		}
	}

	fn eth() -> Coin {
		Coin::native(Chain::Ethereum)
	}

	fn usdc() -> Coin {
		Coin::token(Chain::Ethereum, "USDC", "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", 6)
	}

	fn request(src: Coin, dst: Coin) -> QuoteRequest {
		QuoteRequest {
			amount: TokenValue::new(U256::from(1_000u64), src.decimals),
			src,
			dst,
			src_address: "0xowner".to_string(),
			dst_address: "0xowner".to_string(),
			is_affiliate: false,
		}
	}

	fn resolver_with(adapters: Vec<ScriptedAdapter>, timeout_ms: u64) -> QuoteResolver {
		let mut registry = AdapterRegistry::new();
		let mut configs = Vec::new();
		for adapter in adapters {
			configs.push(ProviderRuntimeConfig::new(
				adapter.provider,
				"http://localhost",
				timeout_ms,
			));
			registry.register(Arc::new(adapter));
		}
		QuoteResolver::new(Arc::new(registry), configs)
	}

	#[test]
	fn test_resolution_only_considers_available_providers() {
		let resolver = resolver_with(vec![ScriptedAdapter::new(SwapProvider::LiFi)], 1_000);
		assert_eq!(
			resolver.resolve_provider(&eth(), &usdc()),
			Some(SwapProvider::LiFi)
		);
		assert_eq!(resolver.resolve_provider(&eth(), &eth()), None);
		assert_eq!(
			resolver.resolve_provider(&Coin::native(Chain::Bitcoin), &eth()),
			None
		);
	}

	#[test]
	fn test_adapter_without_config_is_not_available() {
		let mut registry = AdapterRegistry::new();
		registry.register(Arc::new(ScriptedAdapter::new(SwapProvider::OneInch)));
		let resolver = QuoteResolver::new(Arc::new(registry), Vec::new());
		assert!(resolver.available_providers().is_empty());
	}

	#[tokio::test]
	async fn test_get_quote_forwards_to_adapter() {
		let resolver = resolver_with(vec![ScriptedAdapter::new(SwapProvider::OneInch)], 1_000);
		let quote = resolver
			.get_quote(SwapProvider::OneInch, &request(eth(), usdc()))
			.await
			.unwrap();
		assert_eq!(quote.provider(), SwapProvider::OneInch);
		assert!(!quote.is_expired_at(Utc::now()));
		assert!(quote.expired_at() <= Utc::now() + ChronoDuration::seconds(60));
	}

	#[tokio::test]
	async fn test_unregistered_provider_is_route_not_available() {
		let resolver = resolver_with(vec![ScriptedAdapter::new(SwapProvider::OneInch)], 1_000);
		let result = resolver
			.get_quote(SwapProvider::ThorChain, &request(eth(), usdc()))
			.await;
		assert_eq!(result, Err(SwapError::SwapRouteNotAvailable));
	}

	#[tokio::test]
	async fn test_provider_message_is_classified() {
		let mut adapter = ScriptedAdapter::new(SwapProvider::OneInch);
		adapter.fail_with = Some("amount less than dust threshold".to_string());
		let resolver = resolver_with(vec![adapter], 1_000);

		let result = resolver
			.get_quote(SwapProvider::OneInch, &request(eth(), usdc()))
			.await;
		assert!(matches!(result, Err(SwapError::AmountTooSmall { .. })));
	}

	#[tokio::test(start_paused = true)]
	async fn test_slow_provider_times_out() {
		let mut adapter = ScriptedAdapter::new(SwapProvider::OneInch);
		adapter.delay_ms = 5_000;
		let resolver = resolver_with(vec![adapter], 100);

		let result = resolver
			.get_quote(SwapProvider::OneInch, &request(eth(), usdc()))
			.await;
		assert_eq!(result, Err(SwapError::TimeOut));
	}

	#[tokio::test]
	async fn test_health_check_all_reports_each_provider() {
		let mut failing = ScriptedAdapter::new(SwapProvider::LiFi);
		failing.fail_with = Some("down".to_string());
		let resolver = resolver_with(
			vec![ScriptedAdapter::new(SwapProvider::OneInch), failing],
			1_000,
		);

		let health = resolver.health_check_all().await;
		assert_eq!(health.get(&SwapProvider::OneInch), Some(&true));
		assert_eq!(health.get(&SwapProvider::LiFi), Some(&false));
	}
}
