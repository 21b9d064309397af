//! Fiat amounts

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::TokenValue;

/// Fixed scale of fiat minor units (micro-units, 6 decimal places)
pub const FIAT_DECIMALS: u32 = 6;

/// Display currency selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppCurrency {
	#[default]
	Usd,
	Eur,
	Gbp,
	Chf,
	Jpy,
	Cad,
	Aud,
}

impl AppCurrency {
	pub fn ticker(&self) -> &'static str {
		match self {
			AppCurrency::Usd => "USD",
			AppCurrency::Eur => "EUR",
			AppCurrency::Gbp => "GBP",
			AppCurrency::Chf => "CHF",
			AppCurrency::Jpy => "JPY",
			AppCurrency::Cad => "CAD",
			AppCurrency::Aud => "AUD",
		}
	}

	pub fn symbol(&self) -> &'static str {
		match self {
			AppCurrency::Usd | AppCurrency::Cad | AppCurrency::Aud => "$",
			AppCurrency::Eur => "€",
			AppCurrency::Gbp => "£",
			AppCurrency::Chf => "CHF ",
			AppCurrency::Jpy => "¥",
		}
	}
}

/// An amount in a fiat currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiatValue {
	pub value: Decimal,
	pub currency: AppCurrency,
}

impl FiatValue {
	pub fn new(value: Decimal, currency: AppCurrency) -> Self {
		Self { value, currency }
	}

	pub fn zero(currency: AppCurrency) -> Self {
		Self::new(Decimal::ZERO, currency)
	}

	/// Convert a token amount at `price` per whole token
	pub fn from_token(amount: &TokenValue, price: Decimal, currency: AppCurrency) -> Self {
		let value = amount
			.to_decimal()
			.checked_mul(price)
			.unwrap_or(Decimal::MAX)
			.round_dp_with_strategy(FIAT_DECIMALS, RoundingStrategy::ToZero);
		Self::new(value, currency)
	}

	/// Amount in micro-units, truncated toward zero
	pub fn to_minor_units(&self) -> i128 {
		self.value
			.round_dp_with_strategy(FIAT_DECIMALS, RoundingStrategy::ToZero)
			.checked_mul(Decimal::from(10i64.pow(FIAT_DECIMALS)))
			.and_then(|minor| minor.to_i128())
			.unwrap_or(i128::MAX)
	}

	/// Sum of two amounts in the same currency
	pub fn checked_add(&self, other: &FiatValue) -> Option<Self> {
		if self.currency != other.currency {
			return None;
		}
		self.value
			.checked_add(other.value)
			.map(|value| Self::new(value, self.currency))
	}
}

impl fmt::Display for FiatValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let rounded = self
			.value
			.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
		write!(f, "{}{:.2}", self.currency.symbol(), rounded)
	}
}
