//! Configuration settings structures

use crate::configurable_value::{ConfigurableValue, ConfigurableValueError};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use swap_types::quotes::{
	AFFILIATE_THRESHOLD_MINOR_USD, AGGREGATOR_QUOTE_TTL_SECS, NATIVE_QUOTE_TTL_SECS,
};
use swap_types::{AppCurrency, Chain, ProviderRuntimeConfig, SwapProvider};
use thiserror::Error;
use tracing::warn;

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
	/// Provider settings keyed by provider id (`thorchain`, `mayachain`, `oneinch`, `lifi`)
	pub providers: HashMap<String, ProviderSettings>,
	pub quotes: QuoteSettings,
	pub fees: FeeSettings,
	pub logging: LoggingSettings,
	pub environment: EnvironmentSettings,
}

/// Connection settings for one swap provider
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderSettings {
	pub enabled: bool,
	pub endpoint: String,
	pub timeout_ms: u64,
	pub headers: Option<HashMap<String, String>>,
	pub api_key: Option<ConfigurableValue>,
	pub affiliate_code: Option<String>,
	pub affiliate_fee_bps: Option<u32>,
}

impl ProviderSettings {
	fn new(endpoint: &str) -> Self {
		Self {
			enabled: true,
			endpoint: endpoint.to_string(),
			timeout_ms: 10_000,
			headers: None,
			api_key: None,
			affiliate_code: None,
			affiliate_fee_bps: None,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QuoteSettings {
	/// THORChain and Maya quote lifetime
	pub native_ttl_secs: i64,
	/// 1inch and LI.FI quote lifetime
	pub aggregator_ttl_secs: i64,
	/// Minimum source value for affiliate quotes, in USD micro-units
	pub affiliate_threshold_minor_usd: i64,
	/// Streaming swap interval for THORChain/Maya, in blocks
	pub streaming_interval: Option<u32>,
	pub slippage_bps: u32,
	/// Display currency
	pub currency: AppCurrency,
}

/// Fixed gas limits for native transfers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FeeSettings {
	pub ethereum_native_gas_limit: u64,
	pub arbitrum_native_gas_limit: u64,
}

impl FeeSettings {
	pub fn native_gas_limits(&self) -> HashMap<Chain, u64> {
		HashMap::from([
			(Chain::Ethereum, self.ethereum_native_gas_limit),
			(Chain::Arbitrum, self.arbitrum_native_gas_limit),
		])
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EnvironmentSettings {
	pub profile: EnvironmentProfile,
	pub debug: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentProfile {
	Development,
	Staging,
	Production,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// Settings that load but cannot be used
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
	#[error("Unknown provider '{0}'")]
	UnknownProvider(String),

	#[error("Provider '{provider}' has an empty endpoint")]
	EmptyEndpoint { provider: String },

	#[error("Provider '{provider}' has a zero timeout")]
	ZeroTimeout { provider: String },

	#[error("{field} must be greater than zero")]
	NonPositiveTtl { field: &'static str },

	#[error("Slippage of {0} bps exceeds 100%")]
	InvalidSlippage(u32),

	#[error("Secret for provider '{provider}' is unavailable: {source}")]
	Secret {
		provider: String,
		source: ConfigurableValueError,
	},
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			providers: HashMap::from([
				(
					SwapProvider::ThorChain.id().to_string(),
					ProviderSettings::new("https://thornode.ninerealms.com"),
				),
				(
					SwapProvider::MayaChain.id().to_string(),
					ProviderSettings::new("https://mayanode.mayachain.info"),
				),
				(
					SwapProvider::OneInch.id().to_string(),
					ProviderSettings::new("https://api.1inch.dev"),
				),
				(
					SwapProvider::LiFi.id().to_string(),
					ProviderSettings::new("https://li.quest"),
				),
			]),
			quotes: QuoteSettings {
				native_ttl_secs: NATIVE_QUOTE_TTL_SECS,
				aggregator_ttl_secs: AGGREGATOR_QUOTE_TTL_SECS,
				affiliate_threshold_minor_usd: AFFILIATE_THRESHOLD_MINOR_USD as i64,
				streaming_interval: Some(1),
				slippage_bps: 100,
				currency: AppCurrency::Usd,
			},
			fees: FeeSettings {
				ethereum_native_gas_limit: 40_000,
				arbitrum_native_gas_limit: 400_000,
			},
			logging: LoggingSettings {
				level: "info".to_string(),
				format: LogFormat::Pretty,
				structured: false,
			},
			environment: EnvironmentSettings {
				profile: EnvironmentProfile::Development,
				debug: true,
			},
		}
	}
}

impl Settings {
	/// Check everything that deserialization cannot
	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		for (id, provider) in &self.providers {
			if !SwapProvider::ALL.iter().any(|known| known.id() == id) {
				return Err(ConfigValidationError::UnknownProvider(id.clone()));
			}
			if !provider.enabled {
				continue;
			}
			if provider.endpoint.trim().is_empty() {
				return Err(ConfigValidationError::EmptyEndpoint {
					provider: id.clone(),
				});
			}
			if provider.timeout_ms == 0 {
				return Err(ConfigValidationError::ZeroTimeout {
					provider: id.clone(),
				});
			}
		}

		if self.quotes.native_ttl_secs <= 0 {
			return Err(ConfigValidationError::NonPositiveTtl {
				field: "quotes.native_ttl_secs",
			});
		}
		if self.quotes.aggregator_ttl_secs <= 0 {
			return Err(ConfigValidationError::NonPositiveTtl {
				field: "quotes.aggregator_ttl_secs",
			});
		}
		if self.quotes.slippage_bps > 10_000 {
			return Err(ConfigValidationError::InvalidSlippage(
				self.quotes.slippage_bps,
			));
		}
		Ok(())
	}

	/// Enabled providers in priority-table order
	pub fn enabled_providers(&self) -> Vec<SwapProvider> {
		SwapProvider::ALL
			.into_iter()
			.filter(|provider| {
				self.providers
					.get(provider.id())
					.is_some_and(|settings| settings.enabled)
			})
			.collect()
	}

	/// Quote lifetime for `provider`
	pub fn quote_ttl(&self, provider: SwapProvider) -> Duration {
		if provider.is_native_venue() {
			Duration::seconds(self.quotes.native_ttl_secs)
		} else {
			Duration::seconds(self.quotes.aggregator_ttl_secs)
		}
	}

	/// Runtime configuration for every enabled provider
	pub fn provider_configs(&self) -> Result<Vec<ProviderRuntimeConfig>, ConfigValidationError> {
		let mut configs = Vec::new();
		for provider in self.enabled_providers() {
			let Some(settings) = self.providers.get(provider.id()) else {
				continue;
			};

			let mut config =
				ProviderRuntimeConfig::new(provider, settings.endpoint.clone(), settings.timeout_ms)
					.with_quote_ttl(self.quote_ttl(provider));

			if let Some(headers) = &settings.headers {
				config = config.with_headers(headers.clone());
			}
			if let Some(api_key) = &settings.api_key {
				let secret = api_key
					.resolve()
					.map_err(|source| ConfigValidationError::Secret {
						provider: provider.id().to_string(),
						source,
					})?;
				config = config.with_api_key(secret);
			}
			match (&settings.affiliate_code, settings.affiliate_fee_bps) {
				(Some(code), Some(fee_bps)) => config = config.with_affiliate(code.clone(), fee_bps),
				(Some(_), None) | (None, Some(_)) => warn!(
					"Provider {} needs both affiliate_code and affiliate_fee_bps, ignoring affiliate",
					provider
				),
				(None, None) => {},
			}
			configs.push(config);
		}
		Ok(configs)
	}

	pub fn affiliate_threshold_minor_usd(&self) -> i128 {
		i128::from(self.quotes.affiliate_threshold_minor_usd)
	}

	pub fn is_production(&self) -> bool {
		self.environment.profile == EnvironmentProfile::Production
	}

	pub fn is_debug(&self) -> bool {
		self.environment.debug && !self.is_production()
	}
}
