//! Provider adapter contracts
//!
//! Runtime configuration handed to adapters, the quote request they receive
//! and the trait they implement.

use chrono::Duration;
use std::collections::HashMap;

use crate::models::{Coin, SecretString, TokenValue};
use crate::quotes::SwapProvider;

pub mod errors;
pub mod traits;

pub use errors::AdapterError;
pub use traits::SwapProviderAdapter;

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Minimal runtime configuration needed by adapters
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRuntimeConfig {
	pub provider: SwapProvider,

	/// Base URL of the provider API
	pub endpoint: String,

	/// Timeout for requests in milliseconds
	pub timeout_ms: u64,

	/// Optional custom HTTP headers for requests
	pub headers: Option<HashMap<String, String>>,

	/// API key, sent the way the provider expects it
	pub api_key: Option<SecretString>,

	/// Lifetime applied to quotes from this provider
	pub quote_ttl: Duration,

	/// Affiliate code and fee sent when a swap qualifies
	pub affiliate: Option<AffiliateConfig>,
}

/// Affiliate identity registered with a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffiliateConfig {
	/// THORName, 1inch referrer address or LI.FI integrator id
	pub code: String,
	pub fee_bps: u32,
}

impl ProviderRuntimeConfig {
	pub fn new(provider: SwapProvider, endpoint: impl Into<String>, timeout_ms: u64) -> Self {
		Self {
			provider,
			endpoint: endpoint.into(),
			timeout_ms,
			headers: None,
			api_key: None,
			quote_ttl: provider.default_quote_ttl(),
			affiliate: None,
		}
	}

	pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
		self.headers = Some(headers);
		self
	}

	pub fn with_api_key(mut self, api_key: SecretString) -> Self {
		self.api_key = Some(api_key);
		self
	}

	pub fn with_quote_ttl(mut self, ttl: Duration) -> Self {
		self.quote_ttl = ttl;
		self
	}

	pub fn with_affiliate(mut self, code: impl Into<String>, fee_bps: u32) -> Self {
		self.affiliate = Some(AffiliateConfig {
			code: code.into(),
			fee_bps,
		});
		self
	}

	/// Affiliate to apply to a request, if it qualifies and one is configured
	pub fn affiliate_for(&self, request: &ProviderQuoteRequest) -> Option<&AffiliateConfig> {
		if request.is_affiliate {
			self.affiliate.as_ref()
		} else {
			None
		}
	}

	/// Endpoint joined with `path`, without doubled slashes
	pub fn url(&self, path: &str) -> String {
		format!(
			"{}/{}",
			self.endpoint.trim_end_matches('/'),
			path.trim_start_matches('/')
		)
	}
}

/// Static information about an adapter implementation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adapter {
	pub adapter_id: String,
	pub name: String,
	pub version: String,
}

impl Adapter {
	pub fn new(
		adapter_id: impl Into<String>,
		name: impl Into<String>,
		version: impl Into<String>,
	) -> Self {
		Self {
			adapter_id: adapter_id.into(),
			name: name.into(),
			version: version.into(),
		}
	}
}

/// Everything a provider needs to price a swap
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderQuoteRequest {
	pub src: Coin,
	pub dst: Coin,
	/// Source amount in the source token's base units
	pub amount: TokenValue,
	pub src_address: String,
	pub dst_address: String,
	pub is_affiliate: bool,
	/// THORChain/Maya streaming swap interval in blocks
	pub streaming_interval: Option<u32>,
	/// Slippage tolerance in basis points for aggregators
	pub slippage_bps: u32,
}
