//! Swap Configuration
//!
//! Settings, configuration loading and startup logging for the vault swap core.

pub mod configurable_value;
pub mod loader;
pub mod settings;
pub mod startup_logger;

pub use configurable_value::{ConfigurableValue, ConfigurableValueError, ValueType};
pub use loader::{load_config, load_config_from, load_with, ConfigLoadError};
pub use settings::{
	ConfigValidationError, EnvironmentProfile, EnvironmentSettings, FeeSettings, LogFormat,
	LoggingSettings, ProviderSettings, QuoteSettings, Settings,
};
pub use startup_logger::{log_service_info, log_service_shutdown, log_session_ready};
