//! Shared domain models: chains, tokens, amounts and vault addresses

pub mod account;
pub mod chain;
pub mod coin;
pub mod fiat;
pub mod secret_string;
pub mod token_value;

pub use account::{Account, Address, SelectedAccount};
pub use chain::{Chain, TokenStandard};
pub use coin::Coin;
pub use fiat::{AppCurrency, FiatValue, FIAT_DECIMALS};
pub use secret_string::SecretString;
pub use token_value::{pow10, TokenValue, TokenValueError};
