//! Vault Swap provider check
//!
//! Loads the configuration and reports which swap providers are reachable.

use std::sync::Arc;

use tracing::{info, warn};
use vault_swap::{
	init_tracing, load_config, log_service_info, log_service_shutdown, AdapterRegistry,
	QuoteResolver,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	dotenvy::dotenv().ok();
	let settings = load_config()?;
	init_tracing(&settings.logging)?;
	log_service_info(&settings);

	let registry = Arc::new(AdapterRegistry::with_defaults()?);
	let resolver = QuoteResolver::new(registry, settings.provider_configs()?);
	let health = resolver.health_check_all().await;

	for provider in resolver.available_providers() {
		match health.get(&provider) {
			Some(true) => info!("✅ {} reachable", provider.display_name()),
			_ => warn!("❌ {} unreachable", provider.display_name()),
		}
	}

	log_service_shutdown();
	Ok(())
}
