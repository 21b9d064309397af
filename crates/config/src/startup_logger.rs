//! Startup logging for the swap core

use crate::settings::Settings;
use std::env;
use tracing::{info, warn};

/// Logs service and configuration details at startup
pub fn log_service_info(settings: &Settings) {
	let service_name = "vault-swap";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== Vault Swap Core Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);
	info!("💻 Platform: {} ({})", env::consts::OS, env::consts::ARCH);
	info!("🌍 Profile: {:?}", settings.environment.profile);

	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {}", rust_log);
	}

	for provider in settings.enabled_providers() {
		if let Some(provider_settings) = settings.providers.get(provider.id()) {
			let key = provider_settings
				.api_key
				.as_ref()
				.map(|key| key.description())
				.unwrap_or_else(|| "no api key".to_string());
			info!(
				"🔌 {}: {} ({}ms, {})",
				provider.display_name(),
				provider_settings.endpoint,
				provider_settings.timeout_ms,
				key
			);
		}
	}
	if settings.enabled_providers().is_empty() {
		warn!("No swap providers enabled, every pair will be unroutable");
	}

	info!(
		"⏱️ Quote TTL: native {}s, aggregator {}s",
		settings.quotes.native_ttl_secs, settings.quotes.aggregator_ttl_secs
	);
	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs that a swap form session is ready for a vault
pub fn log_session_ready(vault_id: &str, provider_count: usize) {
	info!(
		"✅ Swap session ready for vault {} with {} providers",
		vault_id, provider_count
	);
}

/// Logs service shutdown information
pub fn log_service_shutdown() {
	info!("🛑 Vault Swap Core Shutting Down");
	info!(
		"🕒 Shutdown at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}
