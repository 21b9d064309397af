//! Network fee and fiat estimation

use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use std::sync::Arc;
use swap_types::{
	AppCurrency, Chain, ChainSpecRepository, Coin, FiatValue, GasFee, GasFeeRepository, SwapError,
	SwapFee, SwapResult, TokenPriceRepository, TokenValue, U256,
};
use tracing::{debug, warn};

/// Gas limit for a native transfer on Ethereum
pub const ETHEREUM_NATIVE_GAS_LIMIT: u64 = 40_000;
/// Gas limit for a native transfer on Arbitrum
pub const ARBITRUM_NATIVE_GAS_LIMIT: u64 = 400_000;

/// Decimal places kept by the percentage helper
pub const PERCENTAGE_AMOUNT_DECIMALS: u32 = 6;

/// Fiat view of the fees attached to a quote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeBreakdown {
	pub gas_fiat: FiatValue,
	pub swap_fee_fiat: FiatValue,
	pub total_fiat: FiatValue,
}

/// Trait for fee estimation - enables mocking prices and gas in form tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeeEstimatorTrait: Send + Sync {
	/// Network fee for sending `src` from `address`
	async fn estimate_gas(&self, src: &Coin, address: &str) -> SwapResult<GasFee>;

	/// Value of `amount` units of `coin` in `currency`
	async fn to_fiat(
		&self,
		coin: &Coin,
		amount: &TokenValue,
		currency: AppCurrency,
	) -> SwapResult<FiatValue>;

	/// Network fee and swap fee converted separately, then summed
	async fn estimate_total(
		&self,
		gas_fee: &GasFee,
		swap_fee: &SwapFee,
		currency: AppCurrency,
	) -> SwapResult<FeeBreakdown>;
}

/// Fee estimator backed by the wallet's gas, chain-spec and price services
pub struct FeeEstimator {
	gas_fees: Arc<dyn GasFeeRepository>,
	chain_specs: Arc<dyn ChainSpecRepository>,
	prices: Arc<dyn TokenPriceRepository>,
	native_gas_limits: HashMap<Chain, U256>,
}

impl FeeEstimator {
	pub fn new(
		gas_fees: Arc<dyn GasFeeRepository>,
		chain_specs: Arc<dyn ChainSpecRepository>,
		prices: Arc<dyn TokenPriceRepository>,
	) -> Self {
		Self {
			gas_fees,
			chain_specs,
			prices,
			native_gas_limits: default_native_gas_limits(),
		}
	}

	/// Replace the fixed limits used for native transfers
	pub fn with_native_gas_limits(mut self, limits: HashMap<Chain, U256>) -> Self {
		self.native_gas_limits = limits;
		self
	}

	async fn gas_limit(&self, src: &Coin, address: &str) -> SwapResult<U256> {
		if src.is_native() {
			if let Some(limit) = self.native_gas_limits.get(&src.chain) {
				return Ok(*limit);
			}
		}
		Ok(self.chain_specs.estimate_gas_limit(src, address).await?)
	}
}

pub fn default_native_gas_limits() -> HashMap<Chain, U256> {
	HashMap::from([
		(Chain::Ethereum, U256::from(ETHEREUM_NATIVE_GAS_LIMIT)),
		(Chain::Arbitrum, U256::from(ARBITRUM_NATIVE_GAS_LIMIT)),
	])
}

#[async_trait]
impl FeeEstimatorTrait for FeeEstimator {
	async fn estimate_gas(&self, src: &Coin, address: &str) -> SwapResult<GasFee> {
		let native = Coin::native(src.chain);
		let price = self.gas_fees.get_gas_fee(src.chain, address).await?;

		if !src.chain.is_evm() {
			return Ok(GasFee {
				value: TokenValue::new(price, native.decimals),
				coin: native,
				price,
				limit: None,
			});
		}

		let limit = self.gas_limit(src, address).await?;
		let value = price.checked_mul(limit).ok_or_else(|| {
			warn!("Gas fee overflow on {}: {} * {}", src.chain, price, limit);
			SwapError::Generic("Network fee is out of range".to_string())
		})?;
		debug!(
			"Estimated gas on {}: price {} x limit {} = {}",
			src.chain, price, limit, value
		);

		Ok(GasFee {
			value: TokenValue::new(value, native.decimals),
			coin: native,
			price,
			limit: Some(limit),
		})
	}

	async fn to_fiat(
		&self,
		coin: &Coin,
		amount: &TokenValue,
		currency: AppCurrency,
	) -> SwapResult<FiatValue> {
		let price = self.prices.get_price(coin, currency).await?;
		Ok(FiatValue::from_token(amount, price, currency))
	}

	async fn estimate_total(
		&self,
		gas_fee: &GasFee,
		swap_fee: &SwapFee,
		currency: AppCurrency,
	) -> SwapResult<FeeBreakdown> {
		let gas_fiat = self.to_fiat(&gas_fee.coin, &gas_fee.value, currency).await?;
		let swap_fee_fiat = self.to_fiat(&swap_fee.token, &swap_fee.value, currency).await?;
		let total_fiat = gas_fiat
			.checked_add(&swap_fee_fiat)
			.ok_or_else(|| SwapError::Generic("Fee currencies differ".to_string()))?;

		Ok(FeeBreakdown {
			gas_fiat,
			swap_fee_fiat,
			total_fiat,
		})
	}
}

/// The part of `swap_fee` paid out of `token`, zero when charged in another asset
pub fn fee_in_token(swap_fee: &SwapFee, token: &Coin) -> U256 {
	if swap_fee.token.same_asset(token) {
		swap_fee.value.value
	} else {
		U256::ZERO
	}
}

/// Largest amount for `percentage` of the balance that still covers fees
///
/// Computes `max(0, balance - swap_fee - gas) * percentage / 100`, where the
/// gas fee is only deducted when `src` is the chain's native asset, and
/// rounds down to six decimal places.
pub fn max_amount_for_percentage(
	src: &Coin,
	balance: &TokenValue,
	swap_fee: Option<&SwapFee>,
	gas_fee: Option<&GasFee>,
	percentage: u8,
) -> Decimal {
	let percentage = U256::from(percentage.min(100));

	let swap_fee = swap_fee
		.map(|fee| fee_in_token(fee, src))
		.unwrap_or(U256::ZERO);
	let gas = match gas_fee {
		Some(gas) if src.is_native() && gas.coin.same_asset(src) => gas.value.value,
		_ => U256::ZERO,
	};

	let available = balance.value.saturating_sub(swap_fee).saturating_sub(gas);
	let amount = match available.checked_mul(percentage) {
		Some(scaled) => scaled / U256::from(100u8),
		None => (available / U256::from(100u8)).saturating_mul(percentage),
	};

	TokenValue::new(amount, balance.decimals)
		.to_decimal()
		.round_dp_with_strategy(PERCENTAGE_AMOUNT_DECIMALS, RoundingStrategy::ToZero)
		.normalize()
}
