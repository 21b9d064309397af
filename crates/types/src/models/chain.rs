//! Chain reference data
//!
//! Every chain a vault can hold an address on, with the native asset details
//! the swap flow needs (ticker, decimals, EVM chain id, pool asset prefix).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Address and signing family of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenStandard {
	Evm,
	Utxo,
	Cosmos,
	Solana,
}

/// Supported chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Chain {
	ThorChain,
	MayaChain,
	Bitcoin,
	BitcoinCash,
	Litecoin,
	Dogecoin,
	Dash,
	Ethereum,
	Arbitrum,
	Avalanche,
	Base,
	Blast,
	BscChain,
	CronosChain,
	Optimism,
	Polygon,
	ZkSync,
	GaiaChain,
	Kujira,
	Solana,
}

impl Chain {
	/// All known chains, in display order
	pub const ALL: [Chain; 20] = [
		Chain::ThorChain,
		Chain::MayaChain,
		Chain::Bitcoin,
		Chain::BitcoinCash,
		Chain::Litecoin,
		Chain::Dogecoin,
		Chain::Dash,
		Chain::Ethereum,
		Chain::Arbitrum,
		Chain::Avalanche,
		Chain::Base,
		Chain::Blast,
		Chain::BscChain,
		Chain::CronosChain,
		Chain::Optimism,
		Chain::Polygon,
		Chain::ZkSync,
		Chain::GaiaChain,
		Chain::Kujira,
		Chain::Solana,
	];

	/// Human-readable chain name
	pub fn name(&self) -> &'static str {
		match self {
			Chain::ThorChain => "THORChain",
			Chain::MayaChain => "MayaChain",
			Chain::Bitcoin => "Bitcoin",
			Chain::BitcoinCash => "Bitcoin-Cash",
			Chain::Litecoin => "Litecoin",
			Chain::Dogecoin => "Dogecoin",
			Chain::Dash => "Dash",
			Chain::Ethereum => "Ethereum",
			Chain::Arbitrum => "Arbitrum",
			Chain::Avalanche => "Avalanche",
			Chain::Base => "Base",
			Chain::Blast => "Blast",
			Chain::BscChain => "BSC",
			Chain::CronosChain => "CronosChain",
			Chain::Optimism => "Optimism",
			Chain::Polygon => "Polygon",
			Chain::ZkSync => "Zksync",
			Chain::GaiaChain => "Cosmos",
			Chain::Kujira => "Kujira",
			Chain::Solana => "Solana",
		}
	}

	pub fn standard(&self) -> TokenStandard {
		match self {
			Chain::Bitcoin
			| Chain::BitcoinCash
			| Chain::Litecoin
			| Chain::Dogecoin
			| Chain::Dash => TokenStandard::Utxo,
			Chain::Ethereum
			| Chain::Arbitrum
			| Chain::Avalanche
			| Chain::Base
			| Chain::Blast
			| Chain::BscChain
			| Chain::CronosChain
			| Chain::Optimism
			| Chain::Polygon
			| Chain::ZkSync => TokenStandard::Evm,
			Chain::ThorChain | Chain::MayaChain | Chain::GaiaChain | Chain::Kujira => {
				TokenStandard::Cosmos
			},
			Chain::Solana => TokenStandard::Solana,
		}
	}

	pub fn is_evm(&self) -> bool {
		self.standard() == TokenStandard::Evm
	}

	/// EIP-155 chain id for EVM chains
	pub fn evm_chain_id(&self) -> Option<u64> {
		match self {
			Chain::Ethereum => Some(1),
			Chain::Arbitrum => Some(42161),
			Chain::Avalanche => Some(43114),
			Chain::Base => Some(8453),
			Chain::Blast => Some(81457),
			Chain::BscChain => Some(56),
			Chain::CronosChain => Some(25),
			Chain::Optimism => Some(10),
			Chain::Polygon => Some(137),
			Chain::ZkSync => Some(324),
			_ => None,
		}
	}

	/// Ticker of the asset that pays gas on this chain
	pub fn native_ticker(&self) -> &'static str {
		match self {
			Chain::ThorChain => "RUNE",
			Chain::MayaChain => "CACAO",
			Chain::Bitcoin => "BTC",
			Chain::BitcoinCash => "BCH",
			Chain::Litecoin => "LTC",
			Chain::Dogecoin => "DOGE",
			Chain::Dash => "DASH",
			Chain::Ethereum
			| Chain::Arbitrum
			| Chain::Base
			| Chain::Blast
			| Chain::Optimism
			| Chain::ZkSync => "ETH",
			Chain::Avalanche => "AVAX",
			Chain::BscChain => "BNB",
			Chain::CronosChain => "CRO",
			Chain::Polygon => "POL",
			Chain::GaiaChain => "ATOM",
			Chain::Kujira => "KUJI",
			Chain::Solana => "SOL",
		}
	}

	pub fn native_decimals(&self) -> u8 {
		match self.standard() {
			TokenStandard::Evm => 18,
			TokenStandard::Utxo => 8,
			TokenStandard::Solana => 9,
			TokenStandard::Cosmos => match self {
				Chain::ThorChain => 8,
				Chain::MayaChain => 10,
				_ => 6,
			},
		}
	}

	/// Chain prefix used in THORChain/Maya pool asset notation (`BTC.BTC`, `ETH.USDC-0X...`)
	pub fn swap_asset_name(&self) -> &'static str {
		match self {
			Chain::ThorChain => "THOR",
			Chain::MayaChain => "MAYA",
			Chain::Bitcoin => "BTC",
			Chain::BitcoinCash => "BCH",
			Chain::Litecoin => "LTC",
			Chain::Dogecoin => "DOGE",
			Chain::Dash => "DASH",
			Chain::Ethereum => "ETH",
			Chain::Arbitrum => "ARB",
			Chain::Avalanche => "AVAX",
			Chain::Base => "BASE",
			Chain::Blast => "BLAST",
			Chain::BscChain => "BSC",
			Chain::CronosChain => "CRO",
			Chain::Optimism => "OP",
			Chain::Polygon => "POL",
			Chain::ZkSync => "ZKSYNC",
			Chain::GaiaChain => "GAIA",
			Chain::Kujira => "KUJI",
			Chain::Solana => "SOL",
		}
	}
}

impl fmt::Display for Chain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name())
	}
}
