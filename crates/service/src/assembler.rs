//! Swap transaction assembly
//!
//! Turns the form's current inputs and quote into an immutable
//! [`SwapTransaction`], or explains why it cannot.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use swap_types::{
	AllowanceRepository, FeeSnapshot, GasFee, InvalidTransactionData, SelectedAccount, SwapPayload,
	SwapQuote, SwapTransaction, TokenValue, U256,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::fees::{fee_in_token, FeeBreakdown};

/// Inputs captured from the form at submit time
#[derive(Debug, Clone, Default)]
pub struct SwapInputs {
	pub vault_id: String,
	pub src: Option<SelectedAccount>,
	pub dst: Option<SelectedAccount>,
	pub amount: Option<TokenValue>,
	pub gas_fee: Option<GasFee>,
	pub fees: Option<FeeBreakdown>,
}

/// Builds swap transactions and decides whether an approval is needed
pub struct TransactionAssembler {
	allowances: Arc<dyn AllowanceRepository>,
}

impl TransactionAssembler {
	pub fn new(allowances: Arc<dyn AllowanceRepository>) -> Self {
		Self { allowances }
	}

	/// Validate `inputs` against `quote` and build the transaction
	pub async fn build(
		&self,
		quote: Option<&SwapQuote>,
		inputs: &SwapInputs,
		now: DateTime<Utc>,
	) -> Result<SwapTransaction, InvalidTransactionData> {
		let src = inputs
			.src
			.as_ref()
			.ok_or(InvalidTransactionData::MissingSourceToken)?;
		let dst = inputs
			.dst
			.as_ref()
			.ok_or(InvalidTransactionData::MissingDestinationToken)?;
		if src.token().same_asset(dst.token()) {
			return Err(InvalidTransactionData::SameAssets);
		}

		let amount = inputs
			.amount
			.filter(|amount| !amount.is_zero())
			.ok_or(InvalidTransactionData::InvalidAmount)?;
		let quote = quote.ok_or(InvalidTransactionData::MissingQuote)?;
		if quote.is_expired_at(now) {
			return Err(InvalidTransactionData::QuoteExpired);
		}
		if let Some(minimum) = quote
			.recommended_min_amount_in()
			.filter(|minimum| amount.value < minimum.value)
		{
			return Err(InvalidTransactionData::AmountBelowMinimum(format!(
				"{} {}",
				minimum,
				src.token().ticker
			)));
		}
		let gas_fee = inputs
			.gas_fee
			.as_ref()
			.ok_or(InvalidTransactionData::MissingGasFee)?;
		let fees = inputs
			.fees
			.as_ref()
			.ok_or(InvalidTransactionData::MissingGasFeeFiat)?;

		check_balance(src, &amount, gas_fee, quote)?;

		if dst.address.trim().is_empty() {
			return Err(InvalidTransactionData::MissingDestinationAddress);
		}

		let is_approval_required = self.is_approval_required(src, &amount, quote).await?;

		let transaction = SwapTransaction {
			id: Uuid::new_v4().to_string(),
			vault_id: inputs.vault_id.clone(),
			src_token: src.token().clone(),
			src_address: src.address.clone(),
			src_token_value: amount,
			dst_token: dst.token().clone(),
			dst_address: dst.address.clone(),
			expected_dst_token_value: *quote.expected_dst_value(),
			payload: SwapPayload::from(quote),
			is_approval_required,
			fees: FeeSnapshot {
				gas: gas_fee.clone(),
				gas_fiat: fees.gas_fiat.clone(),
				swap_fee: quote.fees().clone(),
				swap_fee_fiat: fees.swap_fee_fiat.clone(),
				total_fiat: fees.total_fiat.clone(),
			},
			created_at: now,
		};

		info!(
			"Assembled {} swap {}: {} {} -> {} {}",
			transaction.provider(),
			transaction.id,
			amount,
			src.token().ticker,
			transaction.expected_dst_token_value,
			dst.token().ticker
		);
		Ok(transaction)
	}

	async fn is_approval_required(
		&self,
		src: &SelectedAccount,
		amount: &TokenValue,
		quote: &SwapQuote,
	) -> Result<bool, InvalidTransactionData> {
		let token = src.token();
		let (Some(contract), Some(spender)) = (token.contract_address.as_deref(), quote.spender())
		else {
			return Ok(false);
		};
		if !token.chain.is_evm() {
			return Ok(false);
		}

		let allowance = self
			.allowances
			.get_allowance(token.chain, contract, &src.address, spender)
			.await
			.map_err(|e| InvalidTransactionData::AllowanceUnavailable(e.to_string()))?;

		debug!(
			"Allowance of {} for {} on {}: {:?}",
			spender, token.ticker, token.chain, allowance
		);
		Ok(matches!(allowance, Some(allowance) if allowance < amount.value))
	}
}

/// Whether the source balances cover the amount plus every fee they pay for
///
/// A native source pays amount, gas and any swap fee charged in the native
/// asset out of one balance. A token source needs the amount in the token
/// balance and the fees in the native balance.
pub fn check_balance(
	src: &SelectedAccount,
	amount: &TokenValue,
	gas_fee: &GasFee,
	quote: &SwapQuote,
) -> Result<(), InvalidTransactionData> {
	let token = src.token();
	let swap_fee = quote.fees();

	let sufficient = if token.is_native() {
		add_all(&[amount.value, gas_fee.value.value, fee_in_token(swap_fee, token)])
			.is_some_and(|required| required <= src.account.balance().value)
	} else {
		let native_fees = add_all(&[gas_fee.value.value, fee_in_token(swap_fee, &gas_fee.coin)]);
		amount.value <= src.account.balance().value
			&& native_fees.is_some_and(|required| required <= src.native_balance.value)
	};

	if sufficient {
		Ok(())
	} else {
		debug!(
			"Insufficient balance for {} {}: balance {}, native balance {}",
			amount,
			token.ticker,
			src.account.balance(),
			src.native_balance
		);
		Err(InvalidTransactionData::InsufficientBalance)
	}
}

fn add_all(values: &[U256]) -> Option<U256> {
	values
		.iter()
		.try_fold(U256::ZERO, |sum, value| sum.checked_add(*value))
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use chrono::Duration;
	use rust_decimal::Decimal;
	use swap_types::{
		Account, AggregatorQuoteData, AggregatorSwapQuote, AggregatorTransaction, AppCurrency,
		Chain, Coin, FiatValue, NativeQuoteData, NativeSwapQuote, RepositoryError,
		RepositoryResult, SwapFee, SwapProvider,
	};

	struct FixedAllowance(RepositoryResult<Option<U256>>);

	#[async_trait]
	impl AllowanceRepository for FixedAllowance {
		async fn get_allowance(
			&self,
			_chain: Chain,
			_contract: &str,
			_owner: &str,
			_spender: &str,
		) -> RepositoryResult<Option<U256>> {
			self.0.clone()
		}
	}

	fn assembler(allowance: RepositoryResult<Option<U256>>) -> TransactionAssembler {
		TransactionAssembler::new(Arc::new(FixedAllowance(allowance)))
	}

	fn whole(amount: u64, decimals: u8) -> TokenValue {
		TokenValue::from_decimal(Decimal::from(amount), decimals).unwrap()
	}

	fn usdc() -> Coin {
		Coin::token(Chain::Ethereum, "USDC", "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", 6)
	}

	fn selected(token: Coin, balance: u64, native_balance: u64) -> SelectedAccount {
		let native_decimals = token.chain.native_decimals();
		SelectedAccount {
			address: "0xowner".to_string(),
			account: Account::new(token.clone(), whole(balance, token.decimals)),
			native_balance: whole(native_balance, native_decimals),
		}
	}

	fn gas(amount: u64) -> GasFee {
		GasFee {
			value: whole(amount, 18),
			coin: Coin::native(Chain::Ethereum),
			price: U256::ZERO,
			limit: None,
		}
	}

	fn breakdown() -> FeeBreakdown {
		FeeBreakdown {
			gas_fiat: FiatValue::new(Decimal::from(1), AppCurrency::Usd),
			swap_fee_fiat: FiatValue::new(Decimal::from(2), AppCurrency::Usd),
			total_fiat: FiatValue::new(Decimal::from(3), AppCurrency::Usd),
		}
	}

	fn aggregator_quote(fee: SwapFee, router: &str, expired_at: DateTime<Utc>) -> SwapQuote {
		SwapQuote::OneInch(AggregatorSwapQuote {
			provider: SwapProvider::OneInch,
			expected_dst_value: whole(1, 6),
			fees: fee,
			data: AggregatorQuoteData {
				dst_amount: "1000000".to_string(),
				tx: AggregatorTransaction {
					to: router.to_string(),
					..Default::default()
				},
			},
			expired_at,
		})
	}

	fn native_fee(amount: u64) -> SwapFee {
		SwapFee::new(whole(amount, 18), Coin::native(Chain::Ethereum))
	}

	fn inputs(src: SelectedAccount, dst: Coin, amount: u64, gas_fee: u64) -> SwapInputs {
		let amount = whole(amount, src.token().decimals);
		SwapInputs {
			vault_id: "vault-1".to_string(),
			dst: Some(selected(dst, 0, 0)),
			src: Some(src),
			amount: Some(amount),
			gas_fee: Some(gas(gas_fee)),
			fees: Some(breakdown()),
		}
	}

	#[tokio::test]
	async fn test_native_balance_covers_amount_and_fees() {
		let now = Utc::now();
		let quote = aggregator_quote(native_fee(5), "0xrouter", now + Duration::seconds(60));
		let eth = Coin::native(Chain::Ethereum);

		let ok = inputs(selected(eth.clone(), 100, 100), usdc(), 85, 10);
		let tx = assembler(Ok(None))
			.build(Some(&quote), &ok, now)
			.await
			.unwrap();
		assert_eq!(tx.src_token_value, whole(85, 18));
		assert!(!tx.is_approval_required);
		assert_eq!(tx.fees.total_fiat.value, Decimal::from(3));
		assert_eq!(tx.provider(), SwapProvider::OneInch);

		let short = inputs(selected(eth, 100, 100), usdc(), 86, 10);
		let result = assembler(Ok(None)).build(Some(&quote), &short, now).await;
		assert_eq!(result, Err(InvalidTransactionData::InsufficientBalance));
	}

	#[tokio::test]
	async fn test_token_source_needs_native_for_fees() {
		let now = Utc::now();
		let quote = aggregator_quote(native_fee(2), "0xrouter", now + Duration::seconds(60));

		let short = inputs(selected(usdc(), 50, 4), Coin::native(Chain::Ethereum), 50, 3);
		let result = assembler(Ok(Some(U256::MAX)))
			.build(Some(&quote), &short, now)
			.await;
		assert_eq!(result, Err(InvalidTransactionData::InsufficientBalance));

		let ok = inputs(selected(usdc(), 50, 5), Coin::native(Chain::Ethereum), 50, 3);
		assert!(assembler(Ok(Some(U256::MAX)))
			.build(Some(&quote), &ok, now)
			.await
			.is_ok());
	}

	#[tokio::test]
	async fn test_validation_order() {
		let now = Utc::now();
		let eth = Coin::native(Chain::Ethereum);
		let quote = aggregator_quote(native_fee(0), "0xrouter", now + Duration::seconds(60));
		let assembler = assembler(Ok(None));

		let mut missing = inputs(selected(eth.clone(), 10, 10), usdc(), 1, 0);
		missing.src = None;
		missing.amount = None;
		assert_eq!(
			assembler.build(None, &missing, now).await,
			Err(InvalidTransactionData::MissingSourceToken)
		);

		let same = inputs(selected(eth.clone(), 10, 10), eth.clone(), 1, 0);
		assert_eq!(
			assembler.build(Some(&quote), &same, now).await,
			Err(InvalidTransactionData::SameAssets)
		);

		let zero = inputs(selected(eth.clone(), 10, 10), usdc(), 0, 0);
		assert_eq!(
			assembler.build(Some(&quote), &zero, now).await,
			Err(InvalidTransactionData::InvalidAmount)
		);

		let valid = inputs(selected(eth.clone(), 10, 10), usdc(), 1, 0);
		assert_eq!(
			assembler.build(None, &valid, now).await,
			Err(InvalidTransactionData::MissingQuote)
		);

		let mut no_gas = valid.clone();
		no_gas.gas_fee = None;
		no_gas.fees = None;
		assert_eq!(
			assembler.build(Some(&quote), &no_gas, now).await,
			Err(InvalidTransactionData::MissingGasFee)
		);

		let mut no_fiat = valid.clone();
		no_fiat.fees = None;
		assert_eq!(
			assembler.build(Some(&quote), &no_fiat, now).await,
			Err(InvalidTransactionData::MissingGasFeeFiat)
		);
	}

	#[tokio::test]
	async fn test_expired_quote_is_rejected_at_boundary() {
		let now = Utc::now();
		let quote = aggregator_quote(native_fee(0), "0xrouter", now);
		let valid = inputs(selected(Coin::native(Chain::Ethereum), 10, 10), usdc(), 1, 0);

		let result = assembler(Ok(None)).build(Some(&quote), &valid, now).await;
		assert_eq!(result, Err(InvalidTransactionData::QuoteExpired));
	}

	#[tokio::test]
	async fn test_amount_below_provider_minimum_is_rejected() {
		let now = Utc::now();
		let quote = |minimum: u64| {
			SwapQuote::ThorChain(NativeSwapQuote {
				expected_dst_value: whole(1, 8),
				fees: SwapFee::new(whole(0, 8), Coin::native(Chain::Bitcoin)),
				recommended_min_amount_in: Some(whole(minimum, 18)),
				data: NativeQuoteData::default(),
				expired_at: now + Duration::minutes(15),
			})
		};
		let mut valid = inputs(
			selected(Coin::native(Chain::Ethereum), 10, 10),
			Coin::native(Chain::Bitcoin),
			2,
			0,
		);
		if let Some(dst) = valid.dst.as_mut() {
			dst.address = "bc1q".to_string();
		}

		let result = assembler(Ok(None)).build(Some(&quote(3)), &valid, now).await;
		assert_eq!(
			result,
			Err(InvalidTransactionData::AmountBelowMinimum("3 ETH".to_string()))
		);

		// the floor itself is allowed
		assert!(assembler(Ok(None))
			.build(Some(&quote(2)), &valid, now)
			.await
			.is_ok());
	}

	#[tokio::test]
	async fn test_approval_required_when_allowance_is_short() {
		let now = Utc::now();
		let quote = aggregator_quote(native_fee(0), "0xrouter", now + Duration::seconds(60));
		let valid = inputs(selected(usdc(), 50, 1), Coin::native(Chain::Ethereum), 10, 0);

		let short = assembler(Ok(Some(U256::from(1u8))))
			.build(Some(&quote), &valid, now)
			.await
			.unwrap();
		assert!(short.is_approval_required);

		let enough = assembler(Ok(Some(U256::from(10_000_000u64))))
			.build(Some(&quote), &valid, now)
			.await
			.unwrap();
		assert!(!enough.is_approval_required);

		let failed = assembler(Err(RepositoryError::Timeout))
			.build(Some(&quote), &valid, now)
			.await;
		assert!(matches!(
			failed,
			Err(InvalidTransactionData::AllowanceUnavailable(_))
		));
	}

	#[tokio::test]
	async fn test_native_quote_payload_carries_memo() {
		let now = Utc::now();
		let quote = SwapQuote::ThorChain(NativeSwapQuote {
			expected_dst_value: whole(1, 8),
			fees: SwapFee::new(whole(0, 8), Coin::native(Chain::Bitcoin)),
			recommended_min_amount_in: None,
			data: NativeQuoteData {
				memo: "=:BTC.BTC:bc1q".to_string(),
				..Default::default()
			},
			expired_at: now + Duration::minutes(15),
		});
		let mut valid = inputs(
			selected(Coin::native(Chain::Ethereum), 10, 10),
			Coin::native(Chain::Bitcoin),
			1,
			0,
		);
		if let Some(dst) = valid.dst.as_mut() {
			dst.address = "bc1q".to_string();
		}

		let tx = assembler(Ok(None))
			.build(Some(&quote), &valid, now)
			.await
			.unwrap();
		assert!(matches!(&tx.payload, SwapPayload::ThorChain(payload) if payload.memo == "=:BTC.BTC:bc1q"));
		assert_eq!(tx.dst_address, "bc1q");
	}
}
