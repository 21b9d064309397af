//! Swap Adapters
//!
//! Provider-specific adapters for the vault swap core.

pub mod client_cache;
pub mod http;
pub mod lifi_adapter;
pub mod oneinch_adapter;
pub mod thorchain_adapter;

use std::collections::HashMap;
use std::sync::Arc;

pub use client_cache::{AuthConfig, ClientCache, ClientConfig};
pub use lifi_adapter::LifiAdapter;
pub use oneinch_adapter::OneInchAdapter;
pub use swap_types::{AdapterError, AdapterResult, SwapProviderAdapter};
pub use thorchain_adapter::ThorChainAdapter;

use swap_types::SwapProvider;
use tracing::debug;

/// Adapters keyed by the provider they serve
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
	adapters: HashMap<SwapProvider, Arc<dyn SwapProviderAdapter>>,
}

impl AdapterRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry with the built-in adapter for every provider
	pub fn with_defaults() -> AdapterResult<Self> {
		let mut registry = Self::new();
		registry.register(Arc::new(ThorChainAdapter::thorchain()?));
		registry.register(Arc::new(ThorChainAdapter::maya()?));
		registry.register(Arc::new(OneInchAdapter::new()));
		registry.register(Arc::new(LifiAdapter::new()));
		Ok(registry)
	}

	/// Register `adapter`, replacing any previous adapter for its provider
	pub fn register(&mut self, adapter: Arc<dyn SwapProviderAdapter>) {
		debug!("Registering {} for {}", adapter.id(), adapter.provider());
		self.adapters.insert(adapter.provider(), adapter);
	}

	pub fn remove(&mut self, provider: SwapProvider) -> Option<Arc<dyn SwapProviderAdapter>> {
		self.adapters.remove(&provider)
	}

	pub fn get(&self, provider: SwapProvider) -> Option<Arc<dyn SwapProviderAdapter>> {
		self.adapters.get(&provider).cloned()
	}

	/// Registered providers in priority-table order
	pub fn providers(&self) -> Vec<SwapProvider> {
		SwapProvider::ALL
			.into_iter()
			.filter(|provider| self.adapters.contains_key(provider))
			.collect()
	}

	pub fn len(&self) -> usize {
		self.adapters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.adapters.is_empty()
	}
}
