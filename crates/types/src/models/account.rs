//! Vault addresses and their token balances

use serde::{Deserialize, Serialize};

use super::{Chain, Coin, FiatValue, TokenValue};

/// A token held by an address, with its balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
	pub token: Coin,
	pub token_value: Option<TokenValue>,
	pub fiat_value: Option<FiatValue>,
}

impl Account {
	pub fn new(token: Coin, token_value: TokenValue) -> Self {
		Self {
			token,
			token_value: Some(token_value),
			fiat_value: None,
		}
	}

	/// Balance in base units, zero when not loaded yet
	pub fn balance(&self) -> TokenValue {
		self.token_value
			.unwrap_or_else(|| TokenValue::zero(self.token.decimals))
	}
}

/// One vault address on one chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
	pub chain: Chain,
	pub address: String,
	pub accounts: Vec<Account>,
}

impl Address {
	pub fn new(chain: Chain, address: impl Into<String>, accounts: Vec<Account>) -> Self {
		Self {
			chain,
			address: address.into(),
			accounts,
		}
	}

	/// Account holding the chain's native asset, if loaded
	pub fn native_account(&self) -> Option<&Account> {
		self.accounts.iter().find(|account| account.token.is_native())
	}

	pub fn find_account(&self, token_id: &str) -> Option<&Account> {
		self.accounts
			.iter()
			.find(|account| account.token.id() == token_id)
	}
}

/// A resolved selection: the account plus the address that owns it
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedAccount {
	pub address: String,
	pub account: Account,
	/// Balance of the owning address's native asset
	pub native_balance: TokenValue,
}

impl SelectedAccount {
	pub fn token(&self) -> &Coin {
		&self.account.token
	}

	/// Locate `token_id` among loaded addresses
	pub fn find(addresses: &[Address], token_id: &str) -> Option<Self> {
		addresses.iter().find_map(|address| {
			address.find_account(token_id).map(|account| Self::of(address, account))
		})
	}

	pub fn of(address: &Address, account: &Account) -> Self {
		let native_balance = address
			.native_account()
			.map(Account::balance)
			.unwrap_or_else(|| TokenValue::zero(address.chain.native_decimals()));
		Self {
			address: address.address.clone(),
			account: account.clone(),
			native_balance,
		}
	}
}
