//! Provider routing table
//!
//! Maps a token pair to the provider that can swap it. Same-chain EVM pairs
//! go to an aggregator first; cross-chain pairs go to a native venue first.

use super::SwapProvider;
use crate::models::{Chain, Coin};

const THORCHAIN_CHAINS: &[Chain] = &[
	Chain::ThorChain,
	Chain::Bitcoin,
	Chain::BitcoinCash,
	Chain::Litecoin,
	Chain::Dogecoin,
	Chain::Ethereum,
	Chain::Avalanche,
	Chain::BscChain,
	Chain::Base,
	Chain::GaiaChain,
];

const MAYA_CHAINS: &[Chain] = &[
	Chain::MayaChain,
	Chain::ThorChain,
	Chain::Bitcoin,
	Chain::Ethereum,
	Chain::Arbitrum,
	Chain::Dash,
	Chain::Kujira,
];

const ONEINCH_CHAINS: &[Chain] = &[
	Chain::Ethereum,
	Chain::Arbitrum,
	Chain::Avalanche,
	Chain::Base,
	Chain::BscChain,
	Chain::Optimism,
	Chain::Polygon,
	Chain::ZkSync,
];

const LIFI_CHAINS: &[Chain] = &[
	Chain::Ethereum,
	Chain::Arbitrum,
	Chain::Avalanche,
	Chain::Base,
	Chain::Blast,
	Chain::BscChain,
	Chain::Optimism,
	Chain::Polygon,
	Chain::ZkSync,
	Chain::Solana,
];

/// Contract tokens with a THORChain pool
const THORCHAIN_POOL_TOKENS: &[(Chain, &str)] = &[
	(Chain::Ethereum, "USDC"),
	(Chain::Ethereum, "USDT"),
	(Chain::Ethereum, "WBTC"),
	(Chain::Ethereum, "DAI"),
	(Chain::Avalanche, "USDC"),
	(Chain::Avalanche, "USDT"),
	(Chain::BscChain, "USDC"),
	(Chain::BscChain, "USDT"),
	(Chain::Base, "USDC"),
];

/// Contract tokens with a Maya pool
const MAYA_POOL_TOKENS: &[(Chain, &str)] = &[
	(Chain::Ethereum, "USDC"),
	(Chain::Ethereum, "USDT"),
	(Chain::Arbitrum, "USDC"),
	(Chain::Arbitrum, "USDT"),
];

const SAME_CHAIN_PRIORITY: &[SwapProvider] = &[
	SwapProvider::OneInch,
	SwapProvider::LiFi,
	SwapProvider::ThorChain,
	SwapProvider::MayaChain,
];

const CROSS_CHAIN_PRIORITY: &[SwapProvider] = &[
	SwapProvider::ThorChain,
	SwapProvider::MayaChain,
	SwapProvider::LiFi,
];

impl SwapProvider {
	pub fn supported_chains(&self) -> &'static [Chain] {
		match self {
			SwapProvider::ThorChain => THORCHAIN_CHAINS,
			SwapProvider::MayaChain => MAYA_CHAINS,
			SwapProvider::OneInch => ONEINCH_CHAINS,
			SwapProvider::LiFi => LIFI_CHAINS,
		}
	}

	/// Whether the provider can take or deliver `coin`
	pub fn supports(&self, coin: &Coin) -> bool {
		if !self.supported_chains().contains(&coin.chain) {
			return false;
		}
		if coin.is_native() {
			return true;
		}
		let pools = match self {
			SwapProvider::ThorChain => THORCHAIN_POOL_TOKENS,
			SwapProvider::MayaChain => MAYA_POOL_TOKENS,
			SwapProvider::OneInch | SwapProvider::LiFi => return true,
		};
		pools
			.iter()
			.any(|(chain, ticker)| *chain == coin.chain && coin.ticker.eq_ignore_ascii_case(ticker))
	}

	pub fn supports_pair(&self, src: &Coin, dst: &Coin) -> bool {
		if *self == SwapProvider::OneInch && src.chain != dst.chain {
			return false;
		}
		self.supports(src) && self.supports(dst)
	}
}

/// Pick the provider for a pair among all providers
pub fn resolve_provider(src: &Coin, dst: &Coin) -> Option<SwapProvider> {
	resolve_provider_from(src, dst, &SwapProvider::ALL)
}

/// Pick the provider for a pair among the `available` ones, in priority order
pub fn resolve_provider_from(
	src: &Coin,
	dst: &Coin,
	available: &[SwapProvider],
) -> Option<SwapProvider> {
	if src.same_asset(dst) {
		return None;
	}

	let priority = if src.chain == dst.chain {
		SAME_CHAIN_PRIORITY
	} else {
		CROSS_CHAIN_PRIORITY
	};

	priority
		.iter()
		.copied()
		.filter(|provider| available.contains(provider))
		.find(|provider| provider.supports_pair(src, dst))
}
