//! Token reference data

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Chain;

/// A token on a specific chain
///
/// A token without a contract address is the chain's native asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
	pub chain: Chain,
	pub ticker: String,
	pub contract_address: Option<String>,
	pub decimals: u8,
	/// Identifier used by the price feed (e.g. "ethereum", "usd-coin")
	pub price_provider_id: String,
}

impl Coin {
	/// The native asset of `chain`
	pub fn native(chain: Chain) -> Self {
		Self {
			chain,
			ticker: chain.native_ticker().to_string(),
			contract_address: None,
			decimals: chain.native_decimals(),
			price_provider_id: chain.native_ticker().to_lowercase(),
		}
	}

	/// A contract token on `chain`
	pub fn token(
		chain: Chain,
		ticker: impl Into<String>,
		contract_address: impl Into<String>,
		decimals: u8,
	) -> Self {
		let ticker = ticker.into();
		Self {
			chain,
			price_provider_id: ticker.to_lowercase(),
			ticker,
			contract_address: Some(contract_address.into()),
			decimals,
		}
	}

	pub fn with_price_provider_id(mut self, id: impl Into<String>) -> Self {
		self.price_provider_id = id.into();
		self
	}

	pub fn is_native(&self) -> bool {
		self.contract_address.is_none()
	}

	/// Stable identifier, unique per chain and contract
	pub fn id(&self) -> String {
		match &self.contract_address {
			Some(contract) => format!("{}-{}-{}", self.ticker, self.chain.name(), contract),
			None => format!("{}-{}", self.ticker, self.chain.name()),
		}
	}

	/// Pool asset notation understood by THORChain and Maya
	pub fn swap_asset(&self) -> String {
		match &self.contract_address {
			Some(contract) => format!(
				"{}.{}-{}",
				self.chain.swap_asset_name(),
				self.ticker.to_uppercase(),
				contract.to_uppercase()
			),
			None => format!(
				"{}.{}",
				self.chain.swap_asset_name(),
				self.ticker.to_uppercase()
			),
		}
	}

	/// Whether two coins refer to the same asset
	pub fn same_asset(&self, other: &Coin) -> bool {
		self.chain == other.chain
			&& self.ticker.eq_ignore_ascii_case(&other.ticker)
			&& match (&self.contract_address, &other.contract_address) {
				(Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
				(None, None) => true,
				_ => false,
			}
	}
}

impl fmt::Display for Coin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.ticker, self.chain)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

	#[test]
	fn test_native_coin() {
		let eth = Coin::native(Chain::Ethereum);
		assert!(eth.is_native());
		assert_eq!(eth.ticker, "ETH");
		assert_eq!(eth.decimals, 18);
		assert_eq!(eth.swap_asset(), "ETH.ETH");
		assert_eq!(Coin::native(Chain::ThorChain).swap_asset(), "THOR.RUNE");
	}

	#[test]
	fn test_contract_token_swap_asset() {
		let usdc = Coin::token(Chain::Ethereum, "USDC", USDC, 6);
		assert!(!usdc.is_native());
		assert_eq!(
			usdc.swap_asset(),
			"ETH.USDC-0XA0B86991C6218B36C1D19D4A2E9EB0CE3606EB48"
		);
	}

	#[test]
	fn test_same_asset_ignores_address_case() {
		let a = Coin::token(Chain::Ethereum, "USDC", USDC, 6);
		let b = Coin::token(Chain::Ethereum, "usdc", USDC.to_lowercase(), 6);
		let c = Coin::token(Chain::Arbitrum, "USDC", USDC, 6);
		assert!(a.same_asset(&b));
		assert!(!a.same_asset(&c));
		assert!(!a.same_asset(&Coin::native(Chain::Ethereum)));
	}
}
