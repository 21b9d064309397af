//! Shared fixtures and controllable adapters for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use vault_swap::mocks::{MockPrices, MockSwapAdapter, MockWallet};
use vault_swap::models::{
	Adapter, AdapterResult, ProviderQuoteRequest, ProviderRuntimeConfig, SwapProviderAdapter,
};
use vault_swap::{
	Account, AdapterRegistry, Address, Chain, Coin, Decimal, Settings, SwapCore, SwapCoreBuilder,
	SwapProvider, SwapQuote, TokenValue,
};

pub const VAULT_ID: &str = "vault-1";

pub fn usdc() -> Coin {
	Coin::token(
		Chain::Ethereum,
		"USDC",
		"0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
		6,
	)
	.with_price_provider_id("usd-coin")
}

pub fn whole(amount: &str, decimals: u8) -> TokenValue {
	TokenValue::from_decimal(Decimal::from_str(amount).unwrap(), decimals).unwrap()
}

/// An Ethereum address holding `eth` ETH and `usdc` USDC plus a Bitcoin address
pub fn vault_addresses(eth: &str, usdc_balance: &str) -> Vec<Address> {
	vec![
		Address::new(
			Chain::Ethereum,
			"0xowner",
			vec![
				Account::new(Coin::native(Chain::Ethereum), whole(eth, 18)),
				Account::new(usdc(), whole(usdc_balance, 6)),
			],
		),
		Address::new(
			Chain::Bitcoin,
			"bc1qowner",
			vec![Account::new(Coin::native(Chain::Bitcoin), whole("0.5", 8))],
		),
	]
}

pub fn prices() -> MockPrices {
	MockPrices::new()
		.with_price("eth", Decimal::from(2000))
		.with_price("usd-coin", Decimal::from(1))
		.with_price("btc", Decimal::from(60000))
}

pub fn wallet() -> MockWallet {
	MockWallet::new(vault_addresses("10", "500"), prices())
}

/// Swap core with only `adapters` registered
pub fn build_core(wallet: &MockWallet, adapters: Vec<Arc<dyn SwapProviderAdapter>>) -> SwapCore {
	let mut builder = SwapCoreBuilder::new(wallet.services())
		.with_settings(Settings::default())
		.with_adapter_registry(AdapterRegistry::new());
	for adapter in adapters {
		builder = builder.with_adapter(adapter);
	}
	builder.build().expect("swap core should build")
}

/// Call tracking for verifying how often an adapter was hit
#[derive(Debug, Clone, Default)]
pub struct CallTracker {
	pub calls: Arc<AtomicUsize>,
	pub requests: Arc<Mutex<Vec<ProviderQuoteRequest>>>,
}

impl CallTracker {
	pub fn record_call(&self, request: &ProviderQuoteRequest) {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.requests.lock().unwrap().push(request.clone());
	}

	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn last_request(&self) -> Option<ProviderQuoteRequest> {
		self.requests.lock().unwrap().last().cloned()
	}
}

/// Adapter whose responses are held back by a per-call delay
#[derive(Debug)]
pub struct TimingControlledAdapter {
	inner: MockSwapAdapter,
	delays: Mutex<VecDeque<Duration>>,
	pub tracker: CallTracker,
}

impl TimingControlledAdapter {
	/// Responds immediately, quoting 2000 destination units per source unit
	pub fn instant(provider: SwapProvider) -> Self {
		Self::new(MockSwapAdapter::new(provider, Decimal::from(2000)))
	}

	pub fn new(inner: MockSwapAdapter) -> Self {
		Self {
			inner,
			delays: Mutex::new(VecDeque::new()),
			tracker: CallTracker::default(),
		}
	}

	/// Delays applied to the next calls, in order
	pub fn with_delays(self, delays: Vec<Duration>) -> Self {
		*self.delays.lock().unwrap() = delays.into();
		self
	}
}

#[async_trait]
impl SwapProviderAdapter for TimingControlledAdapter {
	fn adapter_info(&self) -> &Adapter {
		self.inner.adapter_info()
	}

	fn provider(&self) -> SwapProvider {
		self.inner.provider()
	}

	async fn get_quote(
		&self,
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapQuote> {
		self.tracker.record_call(request);
		let delay = self.delays.lock().unwrap().pop_front();
		if let Some(delay) = delay.filter(|delay| !delay.is_zero()) {
			tokio::time::sleep(delay).await;
		}
		self.inner.get_quote(request, config).await
	}

	async fn health_check(&self, config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		self.inner.health_check(config).await
	}
}
