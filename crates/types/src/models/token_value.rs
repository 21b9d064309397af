//! Integer base-unit token amounts

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors converting or combining token amounts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenValueError {
	#[error("Token amount cannot be negative")]
	Negative,
	#[error("Token amount overflows 256 bits")]
	Overflow,
	#[error("Decimals mismatch: expected {expected}, got {actual}")]
	DecimalsMismatch { expected: u8, actual: u8 },
}

/// An amount of a token in base units together with the token's decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenValue {
	pub value: U256,
	pub decimals: u8,
}

/// `10^exp` as a U256, if it fits
pub fn pow10(exp: u32) -> Option<U256> {
	U256::from(10u8).checked_pow(U256::from(exp))
}

impl TokenValue {
	pub fn new(value: U256, decimals: u8) -> Self {
		Self { value, decimals }
	}

	pub fn zero(decimals: u8) -> Self {
		Self::new(U256::ZERO, decimals)
	}

	/// Convert a human amount (e.g. `1.5`) into base units, truncating extra precision
	pub fn from_decimal(amount: Decimal, decimals: u8) -> Result<Self, TokenValueError> {
		if amount.is_sign_negative() && !amount.is_zero() {
			return Err(TokenValueError::Negative);
		}

		let mantissa =
			u128::try_from(amount.mantissa()).map_err(|_| TokenValueError::Negative)?;
		let mantissa = U256::from(mantissa);
		let scale = amount.scale();
		let target = u32::from(decimals);

		let value = if scale <= target {
			pow10(target - scale)
				.and_then(|factor| mantissa.checked_mul(factor))
				.ok_or(TokenValueError::Overflow)?
		} else {
			let divisor = pow10(scale - target).ok_or(TokenValueError::Overflow)?;
			mantissa / divisor
		};

		Ok(Self::new(value, decimals))
	}

	/// Parse a base-unit integer string as returned by provider APIs
	pub fn from_base_units(raw: &str, decimals: u8) -> Option<Self> {
		raw.trim()
			.parse::<U256>()
			.ok()
			.map(|value| Self::new(value, decimals))
	}

	/// Human amount as a decimal
	///
	/// Low-order digits are dropped when the value does not fit the 96-bit
	/// decimal mantissa.
	pub fn to_decimal(&self) -> Decimal {
		let mut value = self.value;
		let mut scale = u32::from(self.decimals);
		let ten = U256::from(10u8);

		loop {
			if scale <= 28 {
				let converted = u128::try_from(value)
					.ok()
					.and_then(|v| i128::try_from(v).ok())
					.and_then(|v| Decimal::try_from_i128_with_scale(v, scale).ok());
				if let Some(decimal) = converted {
					return decimal.normalize();
				}
			}
			if scale == 0 {
				return Decimal::MAX;
			}
			value /= ten;
			scale -= 1;
		}
	}

	/// Re-express the amount with a different number of decimals
	///
	/// Scaling down truncates toward zero.
	pub fn rescale(&self, decimals: u8) -> Result<Self, TokenValueError> {
		let value = if decimals >= self.decimals {
			pow10(u32::from(decimals - self.decimals))
				.and_then(|factor| self.value.checked_mul(factor))
				.ok_or(TokenValueError::Overflow)?
		} else {
			let divisor =
				pow10(u32::from(self.decimals - decimals)).ok_or(TokenValueError::Overflow)?;
			self.value / divisor
		};
		Ok(Self::new(value, decimals))
	}

	pub fn checked_add(&self, other: &TokenValue) -> Result<Self, TokenValueError> {
		self.ensure_same_decimals(other)?;
		self.value
			.checked_add(other.value)
			.map(|value| Self::new(value, self.decimals))
			.ok_or(TokenValueError::Overflow)
	}

	/// Subtraction clamped at zero
	pub fn saturating_sub(&self, other: &TokenValue) -> Result<Self, TokenValueError> {
		self.ensure_same_decimals(other)?;
		Ok(Self::new(self.value.saturating_sub(other.value), self.decimals))
	}

	pub fn is_zero(&self) -> bool {
		self.value.is_zero()
	}

	fn ensure_same_decimals(&self, other: &TokenValue) -> Result<(), TokenValueError> {
		if self.decimals != other.decimals {
			return Err(TokenValueError::DecimalsMismatch {
				expected: self.decimals,
				actual: other.decimals,
			});
		}
		Ok(())
	}
}

impl fmt::Display for TokenValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_decimal())
	}
}
