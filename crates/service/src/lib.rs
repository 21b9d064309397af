//! Swap Service
//!
//! Quote resolution, fee estimation, transaction assembly and the swap form
//! session.

pub mod assembler;
pub mod fees;
pub mod form;
pub mod quote_resolver;
pub mod selection;

pub use assembler::{check_balance, SwapInputs, TransactionAssembler};
pub use fees::{
	default_native_gas_limits, fee_in_token, max_amount_for_percentage, FeeBreakdown,
	FeeEstimator, FeeEstimatorTrait,
};
pub use form::{parse_amount, SessionError, SwapFormConfig, SwapFormDeps, SwapFormSession};
pub use quote_resolver::{QuoteRequest, QuoteResolver, QuoteResolverTrait};
pub use selection::TokenSelectionHub;
