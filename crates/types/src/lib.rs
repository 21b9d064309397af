//! Swap Types
//!
//! Shared models and traits for the vault swap core: chain and token
//! reference data, amounts, quotes, transactions, the form state and the
//! collaborator traits the services depend on.

pub mod adapters;
pub mod fees;
pub mod form;
pub mod models;
pub mod quotes;
pub mod repositories;
pub mod storage;
pub mod transactions;

// Re-export chrono and U256 for convenience
pub use alloy_primitives::U256;
pub use chrono;
pub use rust_decimal::Decimal;

pub use models::{
	Account, Address, AppCurrency, Chain, Coin, FiatValue, SecretString, SelectedAccount,
	TokenStandard, TokenValue, TokenValueError,
};

pub use quotes::{
	is_affiliate_eligible, resolve_provider, resolve_provider_from, AggregatorQuoteData,
	AggregatorSwapQuote, AggregatorTransaction, NativeQuoteData, NativeQuoteFees,
	NativeSwapQuote, SwapError, SwapFee, SwapProvider, SwapQuote, SwapResult,
};

pub use adapters::{
	Adapter, AdapterError, AdapterResult, AffiliateConfig, ProviderQuoteRequest,
	ProviderRuntimeConfig, SwapProviderAdapter,
};

pub use fees::{FeeSnapshot, GasFee};

pub use form::{SwapFormPhase, SwapFormState};

pub use repositories::{
	AccountsRepository, AllowanceRepository, ChainSpecRepository, GasFeeRepository,
	RepositoryError, RepositoryResult, SelectionTarget, SwapTransactionRepository,
	TokenPriceRepository, TokenSelectionChannel, TokenSelectionRequest,
};

pub use storage::{StorageError, StorageResult};

pub use transactions::{
	AggregatorSwapPayload, InvalidTransactionData, NativeSwapPayload, SwapPayload,
	SwapTransaction,
};
