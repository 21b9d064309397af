//! Configuration loading utilities

use crate::settings::{ConfigValidationError, Settings};
use config::{Config, ConfigError, Environment, File, Source};
use thiserror::Error;
use tracing::debug;

/// Default settings file, without extension
pub const DEFAULT_CONFIG_PATH: &str = "config/config";

/// Prefix of environment overrides, e.g. `VAULT_SWAP__QUOTES__SLIPPAGE_BPS`
pub const ENV_PREFIX: &str = "VAULT_SWAP";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
	#[error("Failed to read configuration: {0}")]
	Config(#[from] ConfigError),

	#[error("Invalid configuration: {0}")]
	Validation(#[from] ConfigValidationError),
}

/// Load settings from `config/config` (optional) and the environment
pub fn load_config() -> Result<Settings, ConfigLoadError> {
	load_config_from(DEFAULT_CONFIG_PATH)
}

/// Load settings from the file at `path` (optional) and the environment
pub fn load_config_from(path: &str) -> Result<Settings, ConfigLoadError> {
	load_with(File::with_name(path).required(false))
}

/// Layer `source` over the defaults, then environment overrides, and validate
pub fn load_with<S>(source: S) -> Result<Settings, ConfigLoadError>
where
	S: Source + Send + Sync + 'static,
{
	let defaults = Config::try_from(&Settings::default())?;
	let settings: Settings = Config::builder()
		.add_source(defaults)
		.add_source(source)
		.add_source(
			Environment::with_prefix(ENV_PREFIX)
				.prefix_separator("__")
				.separator("__")
				.try_parsing(true),
		)
		.build()?
		.try_deserialize()?;

	settings.validate()?;
	debug!(
		"Loaded configuration with providers {:?}",
		settings.enabled_providers()
	);
	Ok(settings)
}
