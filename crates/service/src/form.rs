//! Swap form session
//!
//! A [`SwapFormSession`] owns the inputs of one swap screen and publishes a
//! [`SwapFormState`] after every change. Each change bumps a generation
//! counter; a quote fetched for an older generation is dropped when it
//! lands. A committed quote arms a timer that refreshes it when it expires.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::StreamExt;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use swap_types::quotes::AFFILIATE_THRESHOLD_MINOR_USD;
use swap_types::{
	is_affiliate_eligible, AccountsRepository, Address, AppCurrency, FiatValue, GasFee,
	InvalidTransactionData, RepositoryError, SelectedAccount, SelectionTarget, SwapError,
	SwapFormPhase, SwapFormState, SwapProvider, SwapQuote, SwapResult, SwapTransaction,
	SwapTransactionRepository, TokenSelectionChannel, TokenSelectionRequest, TokenValue,
};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::assembler::{SwapInputs, TransactionAssembler};
use crate::fees::{max_amount_for_percentage, FeeBreakdown, FeeEstimatorTrait};
use crate::quote_resolver::{QuoteRequest, QuoteResolverTrait};

/// Failures surfaced by session intents
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
	#[error(transparent)]
	InvalidTransaction(#[from] InvalidTransactionData),

	#[error(transparent)]
	Repository(#[from] RepositoryError),

	#[error(transparent)]
	Swap(#[from] SwapError),

	#[error("Token {0} is not held by this vault")]
	UnknownToken(String),

	#[error("No addresses available for vault {0}")]
	NoAddresses(String),
}

/// Collaborators a session talks to
#[derive(Clone)]
pub struct SwapFormDeps {
	pub accounts: Arc<dyn AccountsRepository>,
	pub quotes: Arc<dyn QuoteResolverTrait>,
	pub fees: Arc<dyn FeeEstimatorTrait>,
	pub assembler: Arc<TransactionAssembler>,
	pub transactions: Arc<dyn SwapTransactionRepository>,
	pub selection: Arc<dyn TokenSelectionChannel>,
}

#[derive(Debug, Clone)]
pub struct SwapFormConfig {
	/// Currency fiat values are displayed in
	pub currency: AppCurrency,
	/// Minimum source value, in USD micro-units, for affiliate quotes
	pub affiliate_threshold_minor_usd: i128,
	/// Token preselected as source when the form loads
	pub initial_src_token_id: Option<String>,
	/// Token preselected as destination when the form loads
	pub initial_dst_token_id: Option<String>,
}

impl Default for SwapFormConfig {
	fn default() -> Self {
		Self {
			currency: AppCurrency::Usd,
			affiliate_threshold_minor_usd: AFFILIATE_THRESHOLD_MINOR_USD,
			initial_src_token_id: None,
			initial_dst_token_id: None,
		}
	}
}

/// Values computed for the current quote, kept for submit
#[derive(Debug, Clone)]
struct Derived {
	quote: SwapQuote,
	gas_fee: GasFee,
	fees: FeeBreakdown,
}

#[derive(Debug, Default)]
struct FormInputs {
	addresses: Vec<Address>,
	src: Option<SelectedAccount>,
	dst: Option<SelectedAccount>,
	amount_text: String,
	generation: u64,
	derived: Option<Derived>,
}

#[derive(Debug, Clone)]
struct Snapshot {
	src: Option<SelectedAccount>,
	dst: Option<SelectedAccount>,
	amount_text: String,
}

impl FormInputs {
	fn snapshot(&self) -> Snapshot {
		Snapshot {
			src: self.src.clone(),
			dst: self.dst.clone(),
			amount_text: self.amount_text.clone(),
		}
	}
}

enum Validation {
	Idle,
	Invalid(SwapError),
	Valid {
		src: SelectedAccount,
		dst: SelectedAccount,
		amount: TokenValue,
	},
}

struct Quoted {
	provider: SwapProvider,
	derived: Derived,
	estimated_dst: String,
	src_fiat: FiatValue,
	dst_fiat: FiatValue,
	form_error: Option<SwapError>,
}

enum Outcome {
	Idle,
	Rejected(SwapError),
	Quoted(Box<Quoted>),
}

struct ExpiryTimer {
	id: u64,
	handle: JoinHandle<()>,
}

struct SessionInner {
	vault_id: String,
	deps: SwapFormDeps,
	config: SwapFormConfig,
	inputs: Mutex<FormInputs>,
	state: watch::Sender<SwapFormState>,
	timer_ids: AtomicU64,
	expiry_timer: StdMutex<Option<ExpiryTimer>>,
	balance_updates: StdMutex<Option<JoinHandle<()>>>,
}

/// Handle to one swap form; clones share the same session
#[derive(Clone)]
pub struct SwapFormSession {
	inner: Arc<SessionInner>,
}

impl fmt::Debug for SwapFormSession {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SwapFormSession")
			.field("vault_id", &self.inner.vault_id)
			.finish()
	}
}

impl SwapFormSession {
	pub fn new(vault_id: impl Into<String>, deps: SwapFormDeps, config: SwapFormConfig) -> Self {
		let vault_id = vault_id.into();
		let (state, _) = watch::channel(SwapFormState::new(vault_id.clone()));
		Self {
			inner: Arc::new(SessionInner {
				vault_id,
				deps,
				config,
				inputs: Mutex::new(FormInputs::default()),
				state,
				timer_ids: AtomicU64::new(0),
				expiry_timer: StdMutex::new(None),
				balance_updates: StdMutex::new(None),
			}),
		}
	}

	pub fn vault_id(&self) -> &str {
		&self.inner.vault_id
	}

	/// Receiver that observes every published state
	pub fn subscribe(&self) -> watch::Receiver<SwapFormState> {
		self.inner.state.subscribe()
	}

	/// Latest published state
	pub fn state(&self) -> SwapFormState {
		self.inner.state.borrow().clone()
	}

	/// Load the vault's addresses, pick default tokens and fetch a first quote
	///
	/// Later address snapshots from the repository refresh balances in the
	/// background.
	pub async fn load(&self) -> Result<(), SessionError> {
		let inner = &self.inner;
		info!("Loading swap form for vault {}", inner.vault_id);

		let mut updates = inner.deps.accounts.load_addresses(&inner.vault_id);
		let Some(addresses) = updates.next().await else {
			let err = SessionError::NoAddresses(inner.vault_id.clone());
			inner.report(&err);
			return Err(err);
		};

		let config = &inner.config;
		let (generation, snapshot) = inner
			.begin(|inputs| {
				inputs.addresses = addresses;
				if inputs.src.is_none() {
					inputs.src =
						default_src(&inputs.addresses, config.initial_src_token_id.as_deref());
				}
				if inputs.dst.is_none() {
					inputs.dst = default_dst(
						&inputs.addresses,
						inputs.src.as_ref(),
						config.initial_dst_token_id.as_deref(),
					);
				}
			})
			.await;

		inner.watch_balances(updates);
		inner.recompute(generation, snapshot).await;
		Ok(())
	}

	/// Ask the token picker for a new source token
	pub async fn select_src_token(&self) -> Result<(), SessionError> {
		self.select_token(SelectionTarget::Source).await
	}

	/// Ask the token picker for a new destination token
	pub async fn select_dst_token(&self) -> Result<(), SessionError> {
		self.select_token(SelectionTarget::Destination).await
	}

	pub async fn set_src_token(&self, token_id: &str) -> Result<(), SessionError> {
		self.set_token(SelectionTarget::Source, token_id).await
	}

	pub async fn set_dst_token(&self, token_id: &str) -> Result<(), SessionError> {
		self.set_token(SelectionTarget::Destination, token_id).await
	}

	/// Swap source and destination, keeping the amount text
	pub async fn flip_selected_tokens(&self) {
		let (generation, snapshot) = self
			.inner
			.begin(|inputs| std::mem::swap(&mut inputs.src, &mut inputs.dst))
			.await;
		self.inner.recompute(generation, snapshot).await;
	}

	/// Fill the amount with `percentage` of the source balance net of fees
	pub async fn select_percentage(&self, percentage: u8) -> Result<(), SessionError> {
		let inner = &self.inner;
		let (src, swap_fee, gas_fee) = {
			let inputs = inner.inputs.lock().await;
			let derived = inputs.derived.as_ref();
			(
				inputs.src.clone(),
				derived.map(|derived| derived.quote.fees().clone()),
				derived.map(|derived| derived.gas_fee.clone()),
			)
		};
		let Some(src) = src else {
			debug!("No source token selected, ignoring percentage");
			return Ok(());
		};

		let gas_fee = match gas_fee {
			None if src.token().is_native() => {
				match inner.deps.fees.estimate_gas(src.token(), &src.address).await {
					Ok(gas_fee) => Some(gas_fee),
					Err(e) => {
						let err = SessionError::from(e);
						inner.report(&err);
						return Err(err);
					},
				}
			},
			gas_fee => gas_fee,
		};

		let amount = max_amount_for_percentage(
			src.token(),
			&src.account.balance(),
			swap_fee.as_ref(),
			gas_fee.as_ref(),
			percentage,
		);
		debug!("{}% of {} balance is {}", percentage, src.token().ticker, amount);
		self.update_amount(amount.to_string()).await;
		Ok(())
	}

	pub async fn update_amount(&self, text: impl Into<String>) {
		let text = text.into();
		let (generation, snapshot) = self
			.inner
			.begin(move |inputs| inputs.amount_text = text)
			.await;
		self.inner.recompute(generation, snapshot).await;
	}

	/// Re-quote with the current inputs
	pub async fn refresh_quote(&self) {
		self.inner.refresh().await;
	}

	/// Assemble and persist a transaction from the current quote
	pub async fn submit(&self) -> Result<SwapTransaction, SessionError> {
		let inner = &self.inner;
		inner.state.send_modify(|state| {
			state.is_loading = true;
			state.error = None;
		});

		let result = inner.try_submit().await;
		match &result {
			Ok(transaction) => info!(
				"Swap transaction {} ready for signing via {}",
				transaction.id,
				transaction.provider()
			),
			Err(e) => inner.report(e),
		}

		inner.state.send_modify(|state| state.is_loading = false);
		result
	}

	pub fn dismiss_error(&self) {
		self.inner.state.send_modify(|state| state.error = None);
	}

	/// Stop the expiry timer and balance updates
	pub fn close(&self) {
		self.inner.shutdown();
	}

	async fn select_token(&self, target: SelectionTarget) -> Result<(), SessionError> {
		let inner = &self.inner;
		let selected_token_id = {
			let inputs = inner.inputs.lock().await;
			let selected = match target {
				SelectionTarget::Source => inputs.src.as_ref(),
				SelectionTarget::Destination => inputs.dst.as_ref(),
			};
			selected.map(|account| account.token().id())
		};

		let request = TokenSelectionRequest {
			request_id: Uuid::new_v4().to_string(),
			vault_id: inner.vault_id.clone(),
			target,
			selected_token_id,
		};

		match inner.deps.selection.request_token(request).await {
			Ok(Some(token_id)) => self.set_token(target, &token_id).await,
			Ok(None) => {
				debug!("{:?} token selection dismissed", target);
				Ok(())
			},
			Err(e) => {
				let err = SessionError::from(e);
				inner.report(&err);
				Err(err)
			},
		}
	}

	async fn set_token(&self, target: SelectionTarget, token_id: &str) -> Result<(), SessionError> {
		let inner = &self.inner;
		let account = {
			let inputs = inner.inputs.lock().await;
			SelectedAccount::find(&inputs.addresses, token_id)
		};
		let Some(account) = account else {
			let err = SessionError::UnknownToken(token_id.to_string());
			inner.report(&err);
			return Err(err);
		};

		let (generation, snapshot) = inner
			.begin(move |inputs| match target {
				SelectionTarget::Source => inputs.src = Some(account),
				SelectionTarget::Destination => inputs.dst = Some(account),
			})
			.await;
		inner.recompute(generation, snapshot).await;
		Ok(())
	}
}

impl SessionInner {
	/// Apply an input change and start a new generation
	async fn begin<F>(&self, mutate: F) -> (u64, Snapshot)
	where
		F: FnOnce(&mut FormInputs),
	{
		let mut inputs = self.inputs.lock().await;
		mutate(&mut *inputs);
		inputs.generation += 1;
		inputs.derived = None;
		self.cancel_expiry();

		let snapshot = inputs.snapshot();
		self.state.send_modify(|state| {
			state.src = snapshot.src.clone();
			state.dst = snapshot.dst.clone();
			state.amount_text = snapshot.amount_text.clone();
			state.src_balance = balance_text(snapshot.src.as_ref());
		});
		(inputs.generation, snapshot)
	}

	async fn refresh(self: &Arc<Self>) {
		let (generation, snapshot) = self.begin(|_| {}).await;
		self.recompute(generation, snapshot).await;
	}

	async fn recompute(self: &Arc<Self>, generation: u64, snapshot: Snapshot) {
		let (src, dst, amount) = match validate(&snapshot) {
			Validation::Idle => {
				self.commit(generation, Outcome::Idle).await;
				return;
			},
			Validation::Invalid(err) => {
				self.commit(generation, Outcome::Rejected(err)).await;
				return;
			},
			Validation::Valid { src, dst, amount } => (src, dst, amount),
		};

		let Some(provider) = self.deps.quotes.resolve_provider(src.token(), dst.token()) else {
			self.commit(generation, Outcome::Rejected(SwapError::SwapRouteNotAvailable))
				.await;
			return;
		};

		if !self.publish_loading(generation, provider).await {
			return;
		}

		let outcome = match self.fetch(provider, &src, &dst, amount).await {
			Ok(quoted) => Outcome::Quoted(Box::new(quoted)),
			Err(err) => Outcome::Rejected(err),
		};
		self.commit(generation, outcome).await;
	}

	async fn publish_loading(&self, generation: u64, provider: SwapProvider) -> bool {
		let inputs = self.inputs.lock().await;
		if inputs.generation != generation {
			return false;
		}
		self.state.send_modify(|state| {
			state.phase = SwapFormPhase::Loading;
			state.provider = Some(provider);
			state.form_error = None;
			state.is_loading = true;
			state.is_swap_disabled = true;
		});
		true
	}

	async fn fetch(
		&self,
		provider: SwapProvider,
		src: &SelectedAccount,
		dst: &SelectedAccount,
		amount: TokenValue,
	) -> SwapResult<Quoted> {
		let fees = &self.deps.fees;
		let currency = self.config.currency;

		let is_affiliate = match fees.to_fiat(src.token(), &amount, AppCurrency::Usd).await {
			Ok(value) => is_affiliate_eligible(&value, self.config.affiliate_threshold_minor_usd),
			Err(e) => {
				warn!(
					"Could not price {} for the affiliate check: {}",
					src.token().ticker,
					e
				);
				false
			},
		};

		let request = QuoteRequest {
			src: src.token().clone(),
			dst: dst.token().clone(),
			amount,
			src_address: src.address.clone(),
			dst_address: dst.address.clone(),
			is_affiliate,
		};
		let quote = self.deps.quotes.get_quote(provider, &request).await?;

		let gas_fee = fees.estimate_gas(src.token(), &src.address).await?;
		let breakdown = fees.estimate_total(&gas_fee, quote.fees(), currency).await?;
		let src_fiat = fees.to_fiat(src.token(), &amount, currency).await?;
		let dst_fiat = fees
			.to_fiat(dst.token(), quote.expected_dst_value(), currency)
			.await?;

		let form_error = quote
			.recommended_min_amount_in()
			.filter(|minimum| amount.value < minimum.value)
			.map(|minimum| SwapError::AmountTooSmall {
				minimum: Some(format!("{} {}", minimum, src.token().ticker)),
			});

		Ok(Quoted {
			provider,
			estimated_dst: format!("{} {}", quote.expected_dst_value(), dst.token().ticker),
			src_fiat,
			dst_fiat,
			form_error,
			derived: Derived {
				quote,
				gas_fee,
				fees: breakdown,
			},
		})
	}

	/// Publish `outcome` if `generation` is still current
	async fn commit(self: &Arc<Self>, generation: u64, outcome: Outcome) -> bool {
		let mut inputs = self.inputs.lock().await;
		if inputs.generation != generation {
			debug!(
				"Dropping stale result for generation {} (current {})",
				generation, inputs.generation
			);
			return false;
		}

		match outcome {
			Outcome::Idle => {
				self.state.send_modify(|state| {
					state.clear_quote();
					state.src_fiat_value.clear();
					state.phase = SwapFormPhase::Idle;
					state.form_error = None;
					state.is_swap_disabled = true;
					state.is_loading = false;
				});
			},
			Outcome::Rejected(err) => {
				debug!("Swap form rejected: {}", err);
				self.state.send_modify(|state| {
					state.clear_quote();
					state.src_fiat_value.clear();
					state.phase = SwapFormPhase::FormError;
					state.form_error = Some(err);
					state.is_swap_disabled = true;
					state.is_loading = false;
				});
			},
			Outcome::Quoted(quoted) => {
				let Quoted {
					provider,
					derived,
					estimated_dst,
					src_fiat,
					dst_fiat,
					form_error,
				} = *quoted;
				let expired_at = derived.quote.expired_at();

				self.state.send_modify(|state| {
					state.phase = if form_error.is_some() {
						SwapFormPhase::FormError
					} else {
						SwapFormPhase::Ready
					};
					state.provider = Some(provider);
					state.src_fiat_value = src_fiat.to_string();
					state.estimated_dst_token_value = estimated_dst;
					state.estimated_dst_fiat_value = dst_fiat.to_string();
					state.network_fee =
						format!("{} {}", derived.gas_fee.value, derived.gas_fee.coin.ticker);
					state.network_fee_fiat = derived.fees.gas_fiat.to_string();
					state.provider_fee_fiat = derived.fees.swap_fee_fiat.to_string();
					state.total_fee_fiat = derived.fees.total_fiat.to_string();
					state.quote = Some(derived.quote.clone());
					state.expired_at = Some(expired_at);
					state.is_swap_disabled = form_error.is_some();
					state.form_error = form_error;
					state.is_loading = false;
				});

				info!(
					"{} quote ready, expires at {}",
					provider,
					expired_at.to_rfc3339()
				);
				inputs.derived = Some(derived);
				self.schedule_expiry(expired_at);
			},
		}
		true
	}

	fn schedule_expiry(self: &Arc<Self>, expired_at: DateTime<Utc>) {
		let delay = (expired_at - Utc::now()).to_std().unwrap_or_default();
		let id = self.timer_ids.fetch_add(1, Ordering::Relaxed) + 1;
		let session = Arc::downgrade(self);

		let handle = tokio::spawn(async move {
			tokio::time::sleep(delay).await;
			if let Some(inner) = session.upgrade() {
				inner.detach_expiry(id);
				info!("Quote expired, refreshing");
				refresh_after_expiry(inner).await;
			}
		});

		if let Ok(mut timer) = self.expiry_timer.lock() {
			if let Some(previous) = timer.replace(ExpiryTimer { id, handle }) {
				previous.handle.abort();
			}
		}
	}

	/// Forget the running timer without aborting it
	fn detach_expiry(&self, id: u64) {
		if let Ok(mut timer) = self.expiry_timer.lock() {
			if timer.as_ref().is_some_and(|timer| timer.id == id) {
				timer.take();
			}
		}
	}

	fn cancel_expiry(&self) {
		if let Ok(mut timer) = self.expiry_timer.lock() {
			if let Some(timer) = timer.take() {
				timer.handle.abort();
			}
		}
	}

	fn watch_balances(self: &Arc<Self>, mut updates: BoxStream<'static, Vec<Address>>) {
		let session = Arc::downgrade(self);
		let handle = tokio::spawn(async move {
			while let Some(addresses) = updates.next().await {
				let Some(inner) = session.upgrade() else {
					break;
				};
				inner.apply_balances(addresses).await;
			}
		});

		if let Ok(mut task) = self.balance_updates.lock() {
			if let Some(previous) = task.replace(handle) {
				previous.abort();
			}
		}
	}

	/// Refresh selected accounts from a new address snapshot
	async fn apply_balances(&self, addresses: Vec<Address>) {
		let mut inputs = self.inputs.lock().await;
		let refresh = |selected: Option<SelectedAccount>| {
			selected.map(|account| {
				SelectedAccount::find(&addresses, &account.token().id()).unwrap_or(account)
			})
		};
		inputs.src = refresh(inputs.src.take());
		inputs.dst = refresh(inputs.dst.take());
		inputs.addresses = addresses;

		let src = inputs.src.clone();
		let dst = inputs.dst.clone();
		debug!("Balances updated for vault {}", self.vault_id);
		self.state.send_modify(|state| {
			state.src_balance = balance_text(src.as_ref());
			state.src = src;
			state.dst = dst;
		});
	}

	async fn try_submit(&self) -> Result<SwapTransaction, SessionError> {
		let (snapshot, derived) = {
			let inputs = self.inputs.lock().await;
			(inputs.snapshot(), inputs.derived.clone())
		};

		let amount = snapshot.src.as_ref().and_then(|src| {
			parse_amount(&snapshot.amount_text, src.token().decimals)
				.ok()
				.flatten()
		});
		let inputs = SwapInputs {
			vault_id: self.vault_id.clone(),
			src: snapshot.src,
			dst: snapshot.dst,
			amount,
			gas_fee: derived.as_ref().map(|derived| derived.gas_fee.clone()),
			fees: derived.as_ref().map(|derived| derived.fees.clone()),
		};

		let transaction = self
			.deps
			.assembler
			.build(derived.as_ref().map(|derived| &derived.quote), &inputs, Utc::now())
			.await?;
		self.deps
			.transactions
			.add_transaction(transaction.clone())
			.await?;
		Ok(transaction)
	}

	/// Log `err` and show it as the global alert
	fn report(&self, err: &SessionError) {
		error!("Swap form error for vault {}: {}", self.vault_id, err);
		self.state
			.send_modify(|state| state.error = Some(err.to_string()));
	}

	fn shutdown(&self) {
		self.cancel_expiry();
		if let Ok(mut task) = self.balance_updates.lock() {
			if let Some(task) = task.take() {
				task.abort();
			}
		}
	}
}

impl Drop for SessionInner {
	fn drop(&mut self) {
		self.shutdown();
	}
}

fn refresh_after_expiry(inner: Arc<SessionInner>) -> BoxFuture<'static, ()> {
	Box::pin(async move { inner.refresh().await })
}

fn validate(snapshot: &Snapshot) -> Validation {
	let (Some(src), Some(dst)) = (&snapshot.src, &snapshot.dst) else {
		return Validation::Idle;
	};
	if src.token().same_asset(dst.token()) {
		return Validation::Invalid(SwapError::SameAssets);
	}

	match parse_amount(&snapshot.amount_text, src.token().decimals) {
		Ok(None) => Validation::Idle,
		Ok(Some(amount)) => Validation::Valid {
			src: src.clone(),
			dst: dst.clone(),
			amount,
		},
		Err(err) => Validation::Invalid(err),
	}
}

/// Parse the amount field; empty input is not an error
pub fn parse_amount(text: &str, decimals: u8) -> SwapResult<Option<TokenValue>> {
	let text = text.trim();
	if text.is_empty() {
		return Ok(None);
	}

	let amount = Decimal::from_str(&text.replace(',', "."))
		.map_err(|_| SwapError::Generic("Enter a valid amount".to_string()))?;
	if amount <= Decimal::ZERO {
		return Err(SwapError::AmountCannotBeZero);
	}

	let value = TokenValue::from_decimal(amount, decimals)
		.map_err(|e| SwapError::Generic(e.to_string()))?;
	if value.is_zero() {
		return Err(SwapError::AmountCannotBeZero);
	}
	Ok(Some(value))
}

fn balance_text(selected: Option<&SelectedAccount>) -> String {
	selected
		.map(|account| format!("{} {}", account.account.balance(), account.token().ticker))
		.unwrap_or_default()
}

/// Preselected token if held, else the first native account
fn default_src(addresses: &[Address], preselected: Option<&str>) -> Option<SelectedAccount> {
	preselected
		.and_then(|token_id| SelectedAccount::find(addresses, token_id))
		.or_else(|| {
			addresses.iter().find_map(|address| {
				address
					.native_account()
					.map(|account| SelectedAccount::of(address, account))
			})
		})
}

/// Preselected token if held, else a native asset on another chain, else any other token
fn default_dst(
	addresses: &[Address],
	src: Option<&SelectedAccount>,
	preselected: Option<&str>,
) -> Option<SelectedAccount> {
	let differs = |candidate: &SelectedAccount| {
		src.map_or(true, |src| !src.token().same_asset(candidate.token()))
	};

	if let Some(selected) = preselected
		.and_then(|token_id| SelectedAccount::find(addresses, token_id))
		.filter(|candidate| differs(candidate))
	{
		return Some(selected);
	}

	let candidates = || {
		addresses.iter().flat_map(|address| {
			address
				.accounts
				.iter()
				.map(move |account| SelectedAccount::of(address, account))
		})
	};

	candidates()
		.find(|candidate| {
			candidate.token().is_native()
				&& src.map_or(true, |src| src.token().chain != candidate.token().chain)
		})
		.or_else(|| candidates().find(|candidate| differs(candidate)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fees::MockFeeEstimatorTrait;
	use crate::quote_resolver::MockQuoteResolverTrait;
	use async_trait::async_trait;
	use chrono::Duration;
	use futures::stream;
	use std::sync::Mutex as TestMutex;
	use swap_types::{
		Account, AggregatorQuoteData, AggregatorSwapQuote, AllowanceRepository, Chain, Coin,
		NativeQuoteData, NativeSwapQuote, RepositoryResult, SwapFee, U256,
	};

	struct StaticAccounts(Vec<Address>);

	impl AccountsRepository for StaticAccounts {
		fn load_addresses(&self, _vault_id: &str) -> BoxStream<'static, Vec<Address>> {
			stream::iter(vec![self.0.clone()])
				.chain(stream::pending())
				.boxed()
		}
	}

	struct NoAllowance;

	#[async_trait]
	impl AllowanceRepository for NoAllowance {
		async fn get_allowance(
			&self,
			_chain: Chain,
			_contract: &str,
			_owner: &str,
			_spender: &str,
		) -> RepositoryResult<Option<U256>> {
			Ok(None)
		}
	}

	#[derive(Default)]
	struct RecordedTransactions(TestMutex<Vec<SwapTransaction>>);

	#[async_trait]
	impl SwapTransactionRepository for RecordedTransactions {
		async fn add_transaction(&self, transaction: SwapTransaction) -> RepositoryResult<()> {
			self.0.lock().unwrap().push(transaction);
			Ok(())
		}

		async fn get_transaction(&self, id: &str) -> RepositoryResult<Option<SwapTransaction>> {
			Ok(self.0.lock().unwrap().iter().find(|tx| tx.id == id).cloned())
		}

		async fn get_transactions_for_vault(
			&self,
			vault_id: &str,
		) -> RepositoryResult<Vec<SwapTransaction>> {
			Ok(self
				.0
				.lock()
				.unwrap()
				.iter()
				.filter(|tx| tx.vault_id == vault_id)
				.cloned()
				.collect())
		}
	}

	struct PickToken(Option<String>);

	#[async_trait]
	impl TokenSelectionChannel for PickToken {
		async fn request_token(
			&self,
			_request: TokenSelectionRequest,
		) -> RepositoryResult<Option<String>> {
			Ok(self.0.clone())
		}
	}

	fn whole(amount: u64, decimals: u8) -> TokenValue {
		TokenValue::from_decimal(Decimal::from(amount), decimals).unwrap()
	}

	fn usdc() -> Coin {
		Coin::token(Chain::Ethereum, "USDC", "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", 6)
	}

	fn addresses() -> Vec<Address> {
		vec![
			Address::new(
				Chain::Ethereum,
				"0xowner",
				vec![
					Account::new(Coin::native(Chain::Ethereum), whole(10, 18)),
					Account::new(usdc(), whole(500, 6)),
				],
			),
			Address::new(
				Chain::Bitcoin,
				"bc1qowner",
				vec![Account::new(Coin::native(Chain::Bitcoin), whole(1, 8))],
			),
		]
	}

	fn aggregator_quote(request: &QuoteRequest) -> SwapQuote {
		SwapQuote::OneInch(AggregatorSwapQuote {
			provider: SwapProvider::OneInch,
			expected_dst_value: whole(2000, 6),
			fees: SwapFee::new(whole(0, 18), Coin::native(request.src.chain)),
			data: AggregatorQuoteData::default(),
			expired_at: Utc::now() + Duration::seconds(60),
		})
	}

	fn fee_estimator() -> MockFeeEstimatorTrait {
		let mut fees = MockFeeEstimatorTrait::new();
		fees.expect_estimate_gas().returning(|src, _| {
			Ok(GasFee {
				value: TokenValue::new(U256::from(1_000_000_000_000_000u64), 18),
				coin: Coin::native(src.chain),
				price: U256::from(25_000_000_000u64),
				limit: Some(U256::from(40_000u64)),
			})
		});
		fees.expect_to_fiat()
			.returning(|coin, amount, currency| {
				let price = if coin.ticker == "USDC" {
					Decimal::from(1)
				} else {
					Decimal::from(2000)
				};
				Ok(FiatValue::from_token(amount, price, currency))
			});
		fees.expect_estimate_total().returning(|_, _, currency| {
			Ok(FeeBreakdown {
				gas_fiat: FiatValue::new(Decimal::from(2), currency),
				swap_fee_fiat: FiatValue::zero(currency),
				total_fiat: FiatValue::new(Decimal::from(2), currency),
			})
		});
		fees
	}

	fn session_with(
		quotes: MockQuoteResolverTrait,
		selection: Option<String>,
	) -> (SwapFormSession, Arc<RecordedTransactions>) {
		let transactions = Arc::new(RecordedTransactions::default());
		let deps = SwapFormDeps {
			accounts: Arc::new(StaticAccounts(addresses())),
			quotes: Arc::new(quotes),
			fees: Arc::new(fee_estimator()),
			assembler: Arc::new(TransactionAssembler::new(Arc::new(NoAllowance))),
			transactions: transactions.clone(),
			selection: Arc::new(PickToken(selection)),
		};
		let config = SwapFormConfig {
			initial_dst_token_id: Some(usdc().id()),
			..Default::default()
		};
		(SwapFormSession::new("vault-1", deps, config), transactions)
	}

	fn one_inch_resolver() -> MockQuoteResolverTrait {
		let mut quotes = MockQuoteResolverTrait::new();
		quotes
			.expect_resolve_provider()
			.returning(|src, dst| swap_types::resolve_provider(src, dst));
		quotes
			.expect_get_quote()
			.returning(|_, request| Ok(aggregator_quote(request)));
		quotes
	}

	#[test]
	fn test_parse_amount() {
		assert_eq!(parse_amount("  ", 18), Ok(None));
		assert_eq!(
			parse_amount("1,5", 6),
			Ok(Some(TokenValue::new(U256::from(1_500_000u64), 6)))
		);
		assert_eq!(parse_amount("0", 18), Err(SwapError::AmountCannotBeZero));
		assert_eq!(parse_amount("-3", 18), Err(SwapError::AmountCannotBeZero));
		assert_eq!(
			parse_amount("0.0000000001", 8),
			Err(SwapError::AmountCannotBeZero)
		);
		assert!(matches!(parse_amount("abc", 18), Err(SwapError::Generic(_))));
	}

	#[test]
	fn test_defaults_pick_native_source_and_other_destination() {
		let addresses = addresses();
		let src = default_src(&addresses, None).unwrap();
		assert_eq!(src.token(), &Coin::native(Chain::Ethereum));

		let dst = default_dst(&addresses, Some(&src), None).unwrap();
		assert_eq!(dst.token(), &Coin::native(Chain::Bitcoin));

		let preselected = default_dst(&addresses, Some(&src), Some(&usdc().id())).unwrap();
		assert_eq!(preselected.token(), &usdc());
	}

	#[tokio::test]
	async fn test_load_selects_defaults_and_stays_idle_without_amount() {
		let mut quotes = MockQuoteResolverTrait::new();
		quotes.expect_get_quote().never();
		let (session, _) = session_with(quotes, None);

		session.load().await.unwrap();
		let state = session.state();
		assert_eq!(state.phase, SwapFormPhase::Idle);
		assert_eq!(state.src.as_ref().unwrap().token(), &Coin::native(Chain::Ethereum));
		assert_eq!(state.dst.as_ref().unwrap().token(), &usdc());
		assert_eq!(state.src_balance, "10 ETH");
		assert!(state.form_error.is_none());
		assert!(state.is_swap_disabled);
	}

	#[tokio::test]
	async fn test_amount_produces_ready_quote() {
		let (session, _) = session_with(one_inch_resolver(), None);
		session.load().await.unwrap();
		session.update_amount("1").await;

		let state = session.state();
		assert_eq!(state.phase, SwapFormPhase::Ready);
		assert_eq!(state.provider, Some(SwapProvider::OneInch));
		assert_eq!(state.estimated_dst_token_value, "2000 USDC");
		assert_eq!(state.estimated_dst_fiat_value, "$2000.00");
		assert_eq!(state.src_fiat_value, "$2000.00");
		assert_eq!(state.network_fee, "0.001 ETH");
		assert_eq!(state.total_fee_fiat, "$2.00");
		assert!(state.expired_at.is_some());
		assert!(!state.is_swap_disabled);
		assert!(!state.is_loading);
	}

	#[tokio::test]
	async fn test_same_asset_is_rejected_without_quote() {
		let mut quotes = MockQuoteResolverTrait::new();
		quotes.expect_resolve_provider().never();
		quotes.expect_get_quote().never();
		let (session, _) = session_with(quotes, None);
		session.load().await.unwrap();

		session
			.set_dst_token(&Coin::native(Chain::Ethereum).id())
			.await
			.unwrap();
		let state = session.state();
		assert_eq!(state.phase, SwapFormPhase::FormError);
		assert_eq!(state.form_error, Some(SwapError::SameAssets));
	}

	#[tokio::test]
	async fn test_unroutable_pair_reports_route_not_available() {
		let mut quotes = MockQuoteResolverTrait::new();
		quotes.expect_resolve_provider().returning(|_, _| None);
		quotes.expect_get_quote().never();
		let (session, _) = session_with(quotes, None);
		session.load().await.unwrap();

		session.update_amount("1").await;
		let state = session.state();
		assert_eq!(state.form_error, Some(SwapError::SwapRouteNotAvailable));
		assert!(state.quote.is_none());
		assert!(state.is_swap_disabled);
	}

	#[tokio::test]
	async fn test_provider_failure_becomes_form_error() {
		let mut quotes = MockQuoteResolverTrait::new();
		quotes
			.expect_resolve_provider()
			.returning(|_, _| Some(SwapProvider::OneInch));
		quotes
			.expect_get_quote()
			.times(1)
			.returning(|_, _| Err(SwapError::TimeOut));
		let (session, _) = session_with(quotes, None);
		session.load().await.unwrap();

		session.update_amount("1").await;
		let state = session.state();
		assert_eq!(state.phase, SwapFormPhase::FormError);
		assert_eq!(state.form_error, Some(SwapError::TimeOut));
		assert!(state.error.is_none());
	}

	#[tokio::test]
	async fn test_amount_below_minimum_disables_swap_but_keeps_quote() {
		let mut quotes = MockQuoteResolverTrait::new();
		quotes
			.expect_resolve_provider()
			.returning(|_, _| Some(SwapProvider::ThorChain));
		quotes.expect_get_quote().returning(|_, _| {
			Ok(SwapQuote::ThorChain(NativeSwapQuote {
				expected_dst_value: whole(1, 8),
				fees: SwapFee::new(whole(0, 8), Coin::native(Chain::Bitcoin)),
				recommended_min_amount_in: Some(whole(2, 18)),
				data: NativeQuoteData::default(),
				expired_at: Utc::now() + Duration::minutes(15),
			}))
		});
		let (session, _) = session_with(quotes, None);
		session.load().await.unwrap();
		session
			.set_dst_token(&Coin::native(Chain::Bitcoin).id())
			.await
			.unwrap();

		session.update_amount("1").await;
		let state = session.state();
		assert_eq!(
			state.form_error,
			Some(SwapError::AmountTooSmall {
				minimum: Some("2 ETH".to_string())
			})
		);
		assert!(state.is_swap_disabled);
		assert!(state.quote.is_some());
		assert_eq!(state.estimated_dst_token_value, "1 BTC");
	}

	#[tokio::test]
	async fn test_submit_below_minimum_is_refused() {
		let mut quotes = MockQuoteResolverTrait::new();
		quotes
			.expect_resolve_provider()
			.returning(|_, _| Some(SwapProvider::ThorChain));
		quotes.expect_get_quote().returning(|_, _| {
			Ok(SwapQuote::ThorChain(NativeSwapQuote {
				expected_dst_value: whole(1, 8),
				fees: SwapFee::new(whole(0, 8), Coin::native(Chain::Bitcoin)),
				recommended_min_amount_in: Some(whole(2, 18)),
				data: NativeQuoteData::default(),
				expired_at: Utc::now() + Duration::minutes(15),
			}))
		});
		let (session, transactions) = session_with(quotes, None);
		session.load().await.unwrap();
		session
			.set_dst_token(&Coin::native(Chain::Bitcoin).id())
			.await
			.unwrap();
		session.update_amount("1").await;
		assert!(session.state().is_swap_disabled);

		let result = session.submit().await;
		assert_eq!(
			result,
			Err(SessionError::InvalidTransaction(
				InvalidTransactionData::AmountBelowMinimum("2 ETH".to_string())
			))
		);
		assert!(transactions.0.lock().unwrap().is_empty());
		assert!(session.state().error.is_some());
	}

	#[tokio::test]
	async fn test_affiliate_flag_follows_usd_value() {
		let mut quotes = MockQuoteResolverTrait::new();
		quotes
			.expect_resolve_provider()
			.returning(|_, _| Some(SwapProvider::OneInch));
		quotes
			.expect_get_quote()
			.withf(|_, request| request.is_affiliate)
			.times(1)
			.returning(|_, request| Ok(aggregator_quote(request)));
		quotes
			.expect_get_quote()
			.withf(|_, request| !request.is_affiliate)
			.times(1)
			.returning(|_, request| Ok(aggregator_quote(request)));
		let (session, _) = session_with(quotes, None);
		session.load().await.unwrap();

		// 0.005 ETH at $2000 is $10, the threshold itself
		session.update_amount("0.005").await;
		session.update_amount("0.004").await;
		assert_eq!(session.state().phase, SwapFormPhase::Ready);
	}

	#[tokio::test]
	async fn test_flip_swaps_tokens_and_keeps_amount() {
		let (session, _) = session_with(one_inch_resolver(), None);
		session.load().await.unwrap();
		session.update_amount("1").await;

		session.flip_selected_tokens().await;
		let state = session.state();
		assert_eq!(state.src.as_ref().unwrap().token(), &usdc());
		assert_eq!(state.dst.as_ref().unwrap().token(), &Coin::native(Chain::Ethereum));
		assert_eq!(state.amount_text, "1");
		assert_eq!(state.src_balance, "500 USDC");
	}

	#[tokio::test]
	async fn test_picker_answer_sets_token() {
		let (session, _) = session_with(one_inch_resolver(), Some(Coin::native(Chain::Bitcoin).id()));
		session.load().await.unwrap();

		session.select_dst_token().await.unwrap();
		assert_eq!(
			session.state().dst.unwrap().token(),
			&Coin::native(Chain::Bitcoin)
		);
	}

	#[tokio::test]
	async fn test_unknown_token_sets_global_error() {
		let (session, _) = session_with(one_inch_resolver(), None);
		session.load().await.unwrap();

		let result = session.set_src_token("DOGE-Dogecoin").await;
		assert_eq!(
			result,
			Err(SessionError::UnknownToken("DOGE-Dogecoin".to_string()))
		);
		assert!(session.state().error.is_some());

		session.dismiss_error();
		assert!(session.state().error.is_none());
	}

	#[tokio::test]
	async fn test_percentage_fills_amount_net_of_gas() {
		let (session, _) = session_with(one_inch_resolver(), None);
		session.load().await.unwrap();

		session.select_percentage(100).await.unwrap();
		// 10 ETH minus 0.001 ETH gas
		assert_eq!(session.state().amount_text, "9.999");
	}

	#[tokio::test]
	async fn test_submit_persists_transaction() {
		let (session, transactions) = session_with(one_inch_resolver(), None);
		session.load().await.unwrap();
		session.update_amount("1").await;

		let transaction = session.submit().await.unwrap();
		assert_eq!(transaction.vault_id, "vault-1");
		assert_eq!(transaction.src_token_value, whole(1, 18));
		assert_eq!(transactions.0.lock().unwrap().len(), 1);
		assert!(!session.state().is_loading);
	}

	#[tokio::test]
	async fn test_submit_without_quote_fails_with_global_error() {
		let mut quotes = MockQuoteResolverTrait::new();
		quotes.expect_get_quote().never();
		let (session, transactions) = session_with(quotes, None);
		session.load().await.unwrap();

		let result = session.submit().await;
		assert_eq!(
			result,
			Err(SessionError::InvalidTransaction(
				InvalidTransactionData::InvalidAmount
			))
		);
		assert!(session.state().error.is_some());
		assert!(transactions.0.lock().unwrap().is_empty());
	}
}
