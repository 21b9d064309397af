//! Collaborators consumed by the swap core
//!
//! Wallet-side services (balances, allowances, gas, prices, persistence and
//! the token picker) are reached through these traits so the core can be
//! driven by real implementations or in-memory fakes.

use alloy_primitives::U256;
use async_trait::async_trait;
use futures::stream::BoxStream;
use rust_decimal::Decimal;

use crate::models::{Address, AppCurrency, Chain, Coin};
use crate::transactions::SwapTransaction;

pub mod errors;

pub use errors::RepositoryError;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Per-chain addresses and balances of a vault
pub trait AccountsRepository: Send + Sync {
	/// Stream of address snapshots; a new item is emitted whenever balances change
	fn load_addresses(&self, vault_id: &str) -> BoxStream<'static, Vec<Address>>;
}

/// ERC-20 allowance lookups
#[async_trait]
pub trait AllowanceRepository: Send + Sync {
	/// Allowance granted by `owner` to `spender`; `None` when the chain has no allowance concept
	async fn get_allowance(
		&self,
		chain: Chain,
		contract: &str,
		owner: &str,
		spender: &str,
	) -> RepositoryResult<Option<U256>>;
}

/// Network fee oracle
#[async_trait]
pub trait GasFeeRepository: Send + Sync {
	/// Fee quote for `chain` in native base units
	///
	/// For EVM chains this is the price per gas unit; for other chains it is
	/// the fee of a typical transfer.
	async fn get_gas_fee(&self, chain: Chain, address: &str) -> RepositoryResult<U256>;
}

/// Chain-specific transaction simulation
#[async_trait]
pub trait ChainSpecRepository: Send + Sync {
	/// Execution gas limit for sending `coin` from `address`
	async fn estimate_gas_limit(&self, coin: &Coin, address: &str) -> RepositoryResult<U256>;
}

/// Token prices in fiat
#[async_trait]
pub trait TokenPriceRepository: Send + Sync {
	/// Price of one whole `coin`
	async fn get_price(&self, coin: &Coin, currency: AppCurrency) -> RepositoryResult<Decimal>;
}

/// Sink for assembled swap transactions
#[async_trait]
pub trait SwapTransactionRepository: Send + Sync {
	async fn add_transaction(&self, transaction: SwapTransaction) -> RepositoryResult<()>;

	async fn get_transaction(&self, id: &str) -> RepositoryResult<Option<SwapTransaction>>;

	async fn get_transactions_for_vault(
		&self,
		vault_id: &str,
	) -> RepositoryResult<Vec<SwapTransaction>>;
}

/// Which side of the swap a token is picked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionTarget {
	Source,
	Destination,
}

/// A request to let the user pick a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSelectionRequest {
	/// Correlation id the answer is matched against
	pub request_id: String,
	pub vault_id: String,
	pub target: SelectionTarget,
	/// Token currently selected on that side
	pub selected_token_id: Option<String>,
}

/// Request/response channel to the token picker
#[async_trait]
pub trait TokenSelectionChannel: Send + Sync {
	/// Resolves with the picked token id, or `None` if the picker was dismissed
	async fn request_token(
		&self,
		request: TokenSelectionRequest,
	) -> RepositoryResult<Option<String>>;
}
