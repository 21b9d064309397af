//! Provider adapter trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::{Adapter, AdapterResult, ProviderQuoteRequest, ProviderRuntimeConfig};
use crate::quotes::{SwapProvider, SwapQuote};

/// Interface every swap provider adapter implements
///
/// An adapter turns a [`ProviderQuoteRequest`] into the provider's HTTP call
/// and normalizes the response into a [`SwapQuote`].
#[async_trait]
pub trait SwapProviderAdapter: Send + Sync + Debug {
	/// Static adapter information
	fn adapter_info(&self) -> &Adapter;

	/// Provider this adapter talks to
	fn provider(&self) -> SwapProvider;

	fn id(&self) -> &str {
		&self.adapter_info().adapter_id
	}

	fn name(&self) -> &str {
		&self.adapter_info().name
	}

	/// Request a quote and normalize it
	async fn get_quote(
		&self,
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapQuote>;

	/// Whether the provider API is reachable
	async fn health_check(&self, config: &ProviderRuntimeConfig) -> AdapterResult<bool>;
}
