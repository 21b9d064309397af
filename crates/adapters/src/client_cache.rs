//! HTTP client cache for provider connections
//!
//! One pooled client per provider configuration, rebuilt after a TTL.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use swap_types::{AdapterError, AdapterResult, ProviderRuntimeConfig, SecretString, SwapProvider};
use tracing::{debug, warn};

/// Key and settings of a cached client
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientConfig {
	pub base_url: String,
	pub provider: SwapProvider,
	pub timeout_ms: u64,
	pub max_idle_per_host: usize,
	pub keep_alive_timeout_ms: u64,
	/// Default headers, auth included
	pub headers: Vec<(String, String)>,
}

impl From<&ProviderRuntimeConfig> for ClientConfig {
	fn from(provider_config: &ProviderRuntimeConfig) -> Self {
		let mut headers = vec![
			("User-Agent".to_string(), "vault-swap/1.0".to_string()),
			("Accept".to_string(), "application/json".to_string()),
		];

		if let Some(extra) = &provider_config.headers {
			let mut extra: Vec<_> = extra.iter().collect();
			extra.sort();
			for (key, value) in extra {
				headers.push((key.clone(), value.clone()));
			}
		}

		let mut config = Self {
			base_url: provider_config.endpoint.clone(),
			provider: provider_config.provider,
			timeout_ms: provider_config.timeout_ms,
			max_idle_per_host: 10,
			keep_alive_timeout_ms: 90_000,
			headers,
		};
		AuthConfig::for_provider(provider_config).apply(&mut config);
		config
	}
}

/// How a provider expects its API key
#[derive(Debug, Clone)]
pub enum AuthConfig {
	None,
	/// `Authorization: Bearer <key>` (1inch)
	Bearer { token: SecretString },
	/// Key in a custom header (LI.FI, THORNode client id)
	ApiKey { header: String, key: SecretString },
}

impl AuthConfig {
	pub fn for_provider(config: &ProviderRuntimeConfig) -> Self {
		let Some(key) = config.api_key.clone() else {
			return Self::None;
		};
		match config.provider {
			SwapProvider::OneInch => Self::Bearer { token: key },
			SwapProvider::LiFi => Self::ApiKey {
				header: "x-lifi-api-key".to_string(),
				key,
			},
			SwapProvider::ThorChain | SwapProvider::MayaChain => Self::ApiKey {
				header: "x-client-id".to_string(),
				key,
			},
		}
	}

	fn apply(&self, config: &mut ClientConfig) {
		match self {
			AuthConfig::None => {},
			AuthConfig::Bearer { token } => {
				config
					.headers
					.push(("Authorization".to_string(), token.bearer()));
			},
			AuthConfig::ApiKey { header, key } => {
				config
					.headers
					.push((header.clone(), key.expose_secret().to_string()));
			},
		}
	}
}

#[derive(Debug, Clone)]
struct CachedClient {
	client: Arc<Client>,
	created_at: Instant,
}

impl CachedClient {
	fn new(client: Client) -> Self {
		Self {
			client: Arc::new(client),
			created_at: Instant::now(),
		}
	}

	fn is_expired(&self, ttl: Duration) -> bool {
		self.created_at.elapsed() > ttl
	}
}

/// Thread-safe cache of HTTP clients keyed by provider configuration
#[derive(Clone, Debug)]
pub struct ClientCache {
	clients: Arc<DashMap<ClientConfig, CachedClient>>,
	ttl: Duration,
}

impl ClientCache {
	/// Cache with a 30-minute client TTL
	pub fn new() -> Self {
		Self::with_ttl(Duration::from_secs(30 * 60))
	}

	pub fn with_ttl(ttl: Duration) -> Self {
		Self {
			clients: Arc::new(DashMap::new()),
			ttl,
		}
	}

	/// Get or create the client for `config`
	pub fn get_client(&self, config: &ClientConfig) -> AdapterResult<Arc<Client>> {
		self.clients.remove_if(config, |_, cached| {
			let expired = cached.is_expired(self.ttl);
			if expired {
				warn!(
					"Client for {} expired after {:?}, rebuilding",
					config.base_url,
					cached.created_at.elapsed()
				);
			}
			expired
		});

		if let Some(cached) = self.clients.get(config) {
			return Ok(cached.client.clone());
		}

		debug!("Creating HTTP client for {} ({})", config.base_url, config.provider);
		let cached = CachedClient::new(Self::build_client(config)?);

		match self.clients.entry(config.clone()) {
			Entry::Occupied(entry) => Ok(entry.get().client.clone()),
			Entry::Vacant(entry) => Ok(entry.insert(cached).client.clone()),
		}
	}

	/// Client for a provider runtime configuration
	pub fn client_for(&self, provider_config: &ProviderRuntimeConfig) -> AdapterResult<Arc<Client>> {
		self.get_client(&ClientConfig::from(provider_config))
	}

	/// Build an uncached client with the same settings
	pub fn build_client(config: &ClientConfig) -> AdapterResult<Client> {
		let mut header_map = reqwest::header::HeaderMap::new();
		for (key, value) in &config.headers {
			if let (Ok(name), Ok(value)) = (
				reqwest::header::HeaderName::from_bytes(key.as_bytes()),
				reqwest::header::HeaderValue::from_str(value),
			) {
				header_map.insert(name, value);
			}
		}

		ClientBuilder::new()
			.default_headers(header_map)
			.timeout(Duration::from_millis(config.timeout_ms))
			.pool_max_idle_per_host(config.max_idle_per_host)
			.pool_idle_timeout(Duration::from_millis(config.keep_alive_timeout_ms))
			.tcp_keepalive(Duration::from_secs(60))
			.build()
			.map_err(AdapterError::HttpError)
	}

	/// Drop expired clients, returning how many were removed
	pub fn cleanup_expired(&self) -> usize {
		let before = self.clients.len();
		self.clients.retain(|_, cached| !cached.is_expired(self.ttl));
		let removed = before.saturating_sub(self.clients.len());
		if removed > 0 {
			debug!("Removed {} expired HTTP clients", removed);
		}
		removed
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	pub fn len(&self) -> usize {
		self.clients.len()
	}

	pub fn is_empty(&self) -> bool {
		self.clients.is_empty()
	}

	/// Shared process-wide cache
	pub fn for_adapter() -> Self {
		GLOBAL_CLIENT_CACHE.clone()
	}
}

impl Default for ClientCache {
	fn default() -> Self {
		Self::new()
	}
}

lazy_static::lazy_static! {
	static ref GLOBAL_CLIENT_CACHE: ClientCache = ClientCache::new();
}
