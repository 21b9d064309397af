//! Vault Swap Library
//!
//! Swap quoting, fee estimation and transaction assembly for a multi-chain
//! vault wallet. [`SwapCoreBuilder`] wires the provider adapters, the fee
//! estimator and storage together; [`SwapCore::open_session`] hands out a
//! [`SwapFormSession`] per vault.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

// Core domain types
pub use swap_types::{
	chrono,
	Account,
	Address,
	AppCurrency,
	Chain,
	Coin,
	Decimal,
	FiatValue,
	GasFee,
	InvalidTransactionData,
	SelectedAccount,
	SwapError,
	SwapFee,
	SwapFormPhase,
	SwapFormState,
	SwapProvider,
	SwapQuote,
	SwapTransaction,
	TokenValue,
	U256,
};

// Wallet-side collaborators
pub use swap_types::{
	AccountsRepository, AllowanceRepository, ChainSpecRepository, GasFeeRepository,
	RepositoryError, RepositoryResult, SelectionTarget, SwapTransactionRepository,
	TokenPriceRepository, TokenSelectionChannel, TokenSelectionRequest,
};

// Service layer
pub use swap_service::{
	check_balance, max_amount_for_percentage, parse_amount, FeeBreakdown, FeeEstimator,
	FeeEstimatorTrait, QuoteRequest, QuoteResolver, QuoteResolverTrait, SessionError,
	SwapFormConfig, SwapFormDeps, SwapFormSession, TokenSelectionHub, TransactionAssembler,
};

// Storage layer
pub use swap_storage::MemoryStore;

// Adapters
pub use swap_adapters::{AdapterRegistry, AdapterResult, SwapProviderAdapter};

// Config
pub use swap_config::{
	load_config, log_service_info, log_service_shutdown, LogFormat, LoggingSettings, Settings,
};

pub mod models {
	pub use swap_types::*;
}

pub mod storage {
	pub use swap_storage::*;
}

pub mod config {
	pub use swap_config::*;
}

pub mod adapters {
	pub use swap_adapters::*;
}

pub mod service {
	pub use swap_service::*;
}

pub mod mocks;

// Re-export external dependencies for integrators
pub use async_trait;

/// Failures while assembling the swap core
#[derive(Debug, Error)]
pub enum BuildError {
	#[error("Failed to load configuration: {0}")]
	Config(#[from] swap_config::ConfigLoadError),

	#[error("Invalid configuration: {0}")]
	Validation(#[from] swap_config::ConfigValidationError),

	#[error("Failed to create provider adapters: {0}")]
	Adapter(#[from] swap_types::AdapterError),

	#[error("Failed to initialize logging: {0}")]
	Logging(String),
}

/// Wallet services the swap core reads balances, fees and prices from
#[derive(Clone)]
pub struct WalletServices {
	pub accounts: Arc<dyn AccountsRepository>,
	pub allowances: Arc<dyn AllowanceRepository>,
	pub gas_fees: Arc<dyn GasFeeRepository>,
	pub chain_specs: Arc<dyn ChainSpecRepository>,
	pub prices: Arc<dyn TokenPriceRepository>,
}

/// Builder for the swap core
pub struct SwapCoreBuilder {
	wallet: WalletServices,
	settings: Option<Settings>,
	adapter_registry: Option<AdapterRegistry>,
	adapters: Vec<Arc<dyn SwapProviderAdapter>>,
	transactions: Option<Arc<dyn SwapTransactionRepository>>,
	selection: Option<Arc<dyn TokenSelectionChannel>>,
}

impl SwapCoreBuilder {
	/// Builder using default settings, the built-in adapters and in-memory storage
	pub fn new(wallet: WalletServices) -> Self {
		Self {
			wallet,
			settings: None,
			adapter_registry: None,
			adapters: Vec::new(),
			transactions: None,
			selection: None,
		}
	}

	/// Builder from `.env` plus the layered configuration files
	pub fn from_env(wallet: WalletServices) -> Result<Self, BuildError> {
		dotenvy::dotenv().ok();
		let settings = load_config()?;
		Ok(Self::new(wallet).with_settings(settings))
	}

	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Start from `registry` instead of the built-in adapters
	pub fn with_adapter_registry(mut self, registry: AdapterRegistry) -> Self {
		self.adapter_registry = Some(registry);
		self
	}

	/// Register `adapter`, replacing the adapter for its provider
	pub fn with_adapter(mut self, adapter: Arc<dyn SwapProviderAdapter>) -> Self {
		self.adapters.push(adapter);
		self
	}

	/// Persist transactions somewhere other than memory
	pub fn with_transactions(mut self, transactions: Arc<dyn SwapTransactionRepository>) -> Self {
		self.transactions = Some(transactions);
		self
	}

	/// Use a custom token picker instead of the in-process hub
	pub fn with_selection_channel(mut self, selection: Arc<dyn TokenSelectionChannel>) -> Self {
		self.selection = Some(selection);
		self
	}

	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	pub fn build(self) -> Result<SwapCore, BuildError> {
		let settings = self.settings.unwrap_or_default();
		settings.validate()?;

		let mut registry = match self.adapter_registry {
			Some(registry) => registry,
			None => AdapterRegistry::with_defaults()?,
		};
		for adapter in self.adapters {
			registry.register(adapter);
		}

		let resolver = Arc::new(
			QuoteResolver::new(Arc::new(registry), settings.provider_configs()?)
				.with_streaming_interval(settings.quotes.streaming_interval)
				.with_slippage_bps(settings.quotes.slippage_bps),
		);
		let providers = resolver.available_providers();
		info!("Quote resolver ready with {} provider(s)", providers.len());
		for provider in &providers {
			info!("  - {}", provider.display_name());
		}

		let native_gas_limits: HashMap<Chain, U256> = settings
			.fees
			.native_gas_limits()
			.into_iter()
			.map(|(chain, limit)| (chain, U256::from(limit)))
			.collect();
		let fees = FeeEstimator::new(
			Arc::clone(&self.wallet.gas_fees),
			Arc::clone(&self.wallet.chain_specs),
			Arc::clone(&self.wallet.prices),
		)
		.with_native_gas_limits(native_gas_limits);

		let transactions = self
			.transactions
			.unwrap_or_else(|| Arc::new(MemoryStore::new()));

		let (selection, selection_hub, selection_requests) = match self.selection {
			Some(selection) => (selection, None, None),
			None => {
				let (hub, receiver) = TokenSelectionHub::new();
				let hub = Arc::new(hub);
				(
					Arc::clone(&hub) as Arc<dyn TokenSelectionChannel>,
					Some(hub),
					Some(receiver),
				)
			},
		};

		let deps = SwapFormDeps {
			accounts: Arc::clone(&self.wallet.accounts),
			quotes: Arc::clone(&resolver) as Arc<dyn QuoteResolverTrait>,
			fees: Arc::new(fees),
			assembler: Arc::new(TransactionAssembler::new(Arc::clone(
				&self.wallet.allowances,
			))),
			transactions,
			selection,
		};

		Ok(SwapCore {
			form_config: SwapFormConfig {
				currency: settings.quotes.currency,
				affiliate_threshold_minor_usd: settings.affiliate_threshold_minor_usd(),
				initial_src_token_id: None,
				initial_dst_token_id: None,
			},
			settings,
			resolver,
			deps,
			selection_hub,
			selection_requests: Mutex::new(selection_requests),
		})
	}
}

/// Shared services behind every swap form session
pub struct SwapCore {
	settings: Settings,
	resolver: Arc<QuoteResolver>,
	deps: SwapFormDeps,
	form_config: SwapFormConfig,
	selection_hub: Option<Arc<TokenSelectionHub>>,
	selection_requests: Mutex<Option<mpsc::UnboundedReceiver<TokenSelectionRequest>>>,
}

impl SwapCore {
	/// New, unloaded session for `vault_id`
	pub fn open_session(&self, vault_id: &str) -> SwapFormSession {
		self.open_session_with_tokens(vault_id, None, None)
	}

	/// New session with preselected source and destination token ids
	pub fn open_session_with_tokens(
		&self,
		vault_id: &str,
		src_token_id: Option<&str>,
		dst_token_id: Option<&str>,
	) -> SwapFormSession {
		let config = SwapFormConfig {
			initial_src_token_id: src_token_id.map(str::to_string),
			initial_dst_token_id: dst_token_id.map(str::to_string),
			..self.form_config.clone()
		};
		swap_config::log_session_ready(vault_id, self.resolver.available_providers().len());
		SwapFormSession::new(vault_id, self.deps.clone(), config)
	}

	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	pub fn quote_resolver(&self) -> Arc<QuoteResolver> {
		Arc::clone(&self.resolver)
	}

	pub fn transactions(&self) -> Arc<dyn SwapTransactionRepository> {
		Arc::clone(&self.deps.transactions)
	}

	/// The in-process token picker, unless a custom channel was configured
	pub fn selection_hub(&self) -> Option<Arc<TokenSelectionHub>> {
		self.selection_hub.clone()
	}

	/// Receiver for token selection requests; only the first call gets it
	pub fn take_selection_requests(
		&self,
	) -> Option<mpsc::UnboundedReceiver<TokenSelectionRequest>> {
		self.selection_requests
			.lock()
			.ok()
			.and_then(|mut requests| requests.take())
	}

	/// Reachability of every configured provider
	pub async fn health_check(&self) -> HashMap<SwapProvider, bool> {
		self.resolver.health_check_all().await
	}
}

/// Initialize tracing from the logging settings
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(logging: &LoggingSettings) -> Result<(), BuildError> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

	let result = match logging.format {
		LogFormat::Json => {
			let subscriber = tracing_subscriber::fmt().json().with_env_filter(env_filter);

			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()
			} else {
				subscriber.try_init()
			}
		},
		LogFormat::Pretty => {
			let subscriber = tracing_subscriber::fmt()
				.pretty()
				.with_env_filter(env_filter);

			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()
			} else {
				subscriber.try_init()
			}
		},
		LogFormat::Compact => {
			let subscriber = tracing_subscriber::fmt()
				.compact()
				.with_env_filter(env_filter);

			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()
			} else {
				subscriber.try_init()
			}
		},
	};
	result.map_err(|e| BuildError::Logging(e.to_string()))?;

	info!(
		"Logging configuration applied: level={}, format={:?}, structured={}",
		logging.level, logging.format, logging.structured
	);
	Ok(())
}
