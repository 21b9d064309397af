//! Affiliate fee eligibility

use crate::models::{AppCurrency, FiatValue};

/// Minimum source value, in micro-USD, for the affiliate fee to apply ($10)
pub const AFFILIATE_THRESHOLD_MINOR_USD: i128 = 10_000_000;

/// Whether a swap of `src_value_usd` carries the affiliate fee
///
/// Values in any currency other than USD are never eligible.
pub fn is_affiliate_eligible(src_value_usd: &FiatValue, threshold_minor_usd: i128) -> bool {
	src_value_usd.currency == AppCurrency::Usd
		&& src_value_usd.to_minor_units() >= threshold_minor_usd
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal::Decimal;
	use std::str::FromStr;

	fn usd(value: &str) -> FiatValue {
		FiatValue::new(Decimal::from_str(value).unwrap(), AppCurrency::Usd)
	}

	#[test]
	fn test_threshold_is_inclusive() {
		assert!(is_affiliate_eligible(&usd("10"), AFFILIATE_THRESHOLD_MINOR_USD));
		assert!(is_affiliate_eligible(&usd("250.5"), AFFILIATE_THRESHOLD_MINOR_USD));
		assert!(!is_affiliate_eligible(&usd("9.999999"), AFFILIATE_THRESHOLD_MINOR_USD));
	}

	#[test]
	fn test_non_usd_is_not_eligible() {
		let eur = FiatValue::new(Decimal::from(100), AppCurrency::Eur);
		assert!(!is_affiliate_eligible(&eur, AFFILIATE_THRESHOLD_MINOR_USD));
	}
}
