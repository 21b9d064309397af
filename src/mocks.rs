//! In-memory wallet services and a mock provider adapter
//!
//! Enough to drive a [`crate::SwapCore`] end to end without a wallet backend
//! or network access, in demos and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use rust_decimal::Decimal;
use swap_types::chrono::{Duration, Utc};
use swap_types::{
	AccountsRepository, Adapter, AdapterError, AdapterResult, Address, AggregatorQuoteData,
	AggregatorSwapQuote, AggregatorTransaction, AllowanceRepository, AppCurrency, Chain,
	ChainSpecRepository, Coin, GasFeeRepository, NativeQuoteData, NativeQuoteFees,
	NativeSwapQuote, ProviderQuoteRequest, ProviderRuntimeConfig, RepositoryError,
	RepositoryResult, SwapFee, SwapProvider, SwapProviderAdapter, SwapQuote,
	TokenPriceRepository, TokenValue, U256,
};
use tokio::sync::watch;

use crate::WalletServices;

/// Accounts whose balances can be pushed to open sessions
#[derive(Debug)]
pub struct MockAccounts {
	addresses: watch::Sender<Vec<Address>>,
}

impl MockAccounts {
	pub fn new(addresses: Vec<Address>) -> Self {
		let (sender, _) = watch::channel(addresses);
		Self { addresses: sender }
	}

	/// Publish a new balance snapshot to every subscriber
	pub fn set_addresses(&self, addresses: Vec<Address>) {
		self.addresses.send_replace(addresses);
	}
}

impl AccountsRepository for MockAccounts {
	fn load_addresses(&self, _vault_id: &str) -> BoxStream<'static, Vec<Address>> {
		// current snapshot first, then every published change
		stream::unfold((self.addresses.subscribe(), true), |(mut receiver, first)| async move {
			if !first && receiver.changed().await.is_err() {
				return None;
			}
			let addresses = receiver.borrow_and_update().clone();
			Some((addresses, (receiver, false)))
		})
		.boxed()
	}
}

/// Allowances keyed by chain, contract, owner and spender
///
/// Unknown EVM allowances are zero; other chains have none.
#[derive(Debug, Default)]
pub struct MockAllowances {
	allowances: Mutex<HashMap<(Chain, String, String, String), U256>>,
}

impl MockAllowances {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn approve(&self, chain: Chain, contract: &str, owner: &str, spender: &str, value: U256) {
		if let Ok(mut allowances) = self.allowances.lock() {
			allowances.insert(
				(
					chain,
					contract.to_lowercase(),
					owner.to_lowercase(),
					spender.to_lowercase(),
				),
				value,
			);
		}
	}
}

#[async_trait]
impl AllowanceRepository for MockAllowances {
	async fn get_allowance(
		&self,
		chain: Chain,
		contract: &str,
		owner: &str,
		spender: &str,
	) -> RepositoryResult<Option<U256>> {
		if !chain.is_evm() {
			return Ok(None);
		}
		let allowances = self
			.allowances
			.lock()
			.map_err(|e| RepositoryError::Other(e.to_string()))?;
		let key = (
			chain,
			contract.to_lowercase(),
			owner.to_lowercase(),
			spender.to_lowercase(),
		);
		Ok(Some(allowances.get(&key).copied().unwrap_or(U256::ZERO)))
	}
}

/// Fixed fee per chain: a gas price for EVM chains, a flat fee otherwise
#[derive(Debug, Clone)]
pub struct MockGasFees {
	fees: HashMap<Chain, U256>,
}

impl MockGasFees {
	/// 25 gwei on EVM chains, 1000 base units elsewhere
	pub fn new() -> Self {
		let fees = Chain::ALL
			.into_iter()
			.map(|chain| {
				let fee = if chain.is_evm() {
					U256::from(25_000_000_000u64)
				} else {
					U256::from(1_000u64)
				};
				(chain, fee)
			})
			.collect();
		Self { fees }
	}

	pub fn with_fee(mut self, chain: Chain, fee: U256) -> Self {
		self.fees.insert(chain, fee);
		self
	}
}

impl Default for MockGasFees {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl GasFeeRepository for MockGasFees {
	async fn get_gas_fee(&self, chain: Chain, _address: &str) -> RepositoryResult<U256> {
		self.fees
			.get(&chain)
			.copied()
			.ok_or_else(|| RepositoryError::UnsupportedChain(chain.name().to_string()))
	}
}

/// Same gas limit for every transfer
#[derive(Debug, Clone)]
pub struct MockChainSpecs {
	pub gas_limit: U256,
}

impl Default for MockChainSpecs {
	fn default() -> Self {
		Self {
			gas_limit: U256::from(120_000u64),
		}
	}
}

#[async_trait]
impl ChainSpecRepository for MockChainSpecs {
	async fn estimate_gas_limit(&self, _coin: &Coin, _address: &str) -> RepositoryResult<U256> {
		Ok(self.gas_limit)
	}
}

/// Prices keyed by price provider id, identical in every currency
#[derive(Debug, Clone, Default)]
pub struct MockPrices {
	prices: HashMap<String, Decimal>,
}

impl MockPrices {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_price(mut self, price_provider_id: &str, price: Decimal) -> Self {
		self.prices.insert(price_provider_id.to_string(), price);
		self
	}
}

#[async_trait]
impl TokenPriceRepository for MockPrices {
	async fn get_price(&self, coin: &Coin, _currency: AppCurrency) -> RepositoryResult<Decimal> {
		self.prices
			.get(&coin.price_provider_id)
			.copied()
			.ok_or_else(|| RepositoryError::NotFound(format!("price for {}", coin.ticker)))
	}
}

/// Adapter quoting every pair at a fixed rate
///
/// Native venues answer with a memo quote, aggregators with a router
/// transaction. The swap fee is 0.3% of the output.
#[derive(Debug, Clone)]
pub struct MockSwapAdapter {
	adapter: Adapter,
	provider: SwapProvider,
	rate: Decimal,
	quote_ttl: Duration,
}

impl MockSwapAdapter {
	pub fn new(provider: SwapProvider, rate: Decimal) -> Self {
		Self {
			adapter: Adapter::new(
				format!("mock-{}-v1", provider.id()),
				format!("Mock {} Adapter", provider.display_name()),
				"1.0.0",
			),
			provider,
			rate,
			quote_ttl: provider.default_quote_ttl(),
		}
	}

	pub fn with_quote_ttl(mut self, ttl: Duration) -> Self {
		self.quote_ttl = ttl;
		self
	}

	fn expected_out(&self, request: &ProviderQuoteRequest) -> AdapterResult<TokenValue> {
		let amount = request.amount.to_decimal() * self.rate;
		TokenValue::from_decimal(amount, request.dst.decimals)
			.map_err(|e| AdapterError::InvalidResponse {
				reason: e.to_string(),
			})
	}
}

#[async_trait]
impl SwapProviderAdapter for MockSwapAdapter {
	fn adapter_info(&self) -> &Adapter {
		&self.adapter
	}

	fn provider(&self) -> SwapProvider {
		self.provider
	}

	async fn get_quote(
		&self,
		request: &ProviderQuoteRequest,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapQuote> {
		let expected = self.expected_out(request)?;
		let fee = TokenValue::new(
			expected.value * U256::from(3u8) / U256::from(1_000u16),
			expected.decimals,
		);
		let expired_at = Utc::now() + self.quote_ttl;

		if self.provider.is_native_venue() {
			let quote = NativeSwapQuote {
				expected_dst_value: expected,
				fees: SwapFee::new(fee, request.dst.clone()),
				recommended_min_amount_in: None,
				data: NativeQuoteData {
					inbound_address: Some("mock-inbound-vault".to_string()),
					router: request
						.src
						.contract_address
						.as_ref()
						.map(|_| "0xmockrouter".to_string()),
					memo: format!("=:{}:{}", request.dst.ticker, request.dst_address),
					expected_amount_out: expected.value.to_string(),
					expiry: expired_at.timestamp(),
					streaming_swap_interval: request.streaming_interval,
					fees: NativeQuoteFees {
						asset: request.dst.ticker.clone(),
						total: fee.value.to_string(),
						..Default::default()
					},
					..Default::default()
				},
				expired_at,
			};
			return Ok(match self.provider {
				SwapProvider::MayaChain => SwapQuote::MayaChain(quote),
				_ => SwapQuote::ThorChain(quote),
			});
		}

		Ok(SwapQuote::OneInch(AggregatorSwapQuote {
			provider: self.provider,
			expected_dst_value: expected,
			fees: SwapFee::new(fee, request.dst.clone()),
			data: AggregatorQuoteData {
				dst_amount: expected.value.to_string(),
				tx: AggregatorTransaction {
					from: request.src_address.clone(),
					to: "0xmockrouter".to_string(),
					data: "0x".to_string(),
					value: if request.src.is_native() {
						request.amount.value
					} else {
						U256::ZERO
					},
					gas: 250_000,
					gas_price: U256::from(25_000_000_000u64),
				},
			},
			expired_at,
		}))
	}

	async fn health_check(&self, _config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		Ok(true)
	}
}

/// Mock wallet services with shared handles for adjusting them later
pub struct MockWallet {
	pub accounts: Arc<MockAccounts>,
	pub allowances: Arc<MockAllowances>,
	pub gas_fees: Arc<MockGasFees>,
	pub chain_specs: Arc<MockChainSpecs>,
	pub prices: Arc<MockPrices>,
}

impl MockWallet {
	pub fn new(addresses: Vec<Address>, prices: MockPrices) -> Self {
		Self {
			accounts: Arc::new(MockAccounts::new(addresses)),
			allowances: Arc::new(MockAllowances::new()),
			gas_fees: Arc::new(MockGasFees::new()),
			chain_specs: Arc::new(MockChainSpecs::default()),
			prices: Arc::new(prices),
		}
	}

	pub fn services(&self) -> WalletServices {
		WalletServices {
			accounts: self.accounts.clone(),
			allowances: self.allowances.clone(),
			gas_fees: self.gas_fees.clone(),
			chain_specs: self.chain_specs.clone(),
			prices: self.prices.clone(),
		}
	}
}
