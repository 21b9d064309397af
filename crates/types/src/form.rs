//! Observable state of the swap form

use chrono::{DateTime, Utc};

use crate::models::SelectedAccount;
use crate::quotes::{SwapError, SwapProvider, SwapQuote};

/// Where the form is in its quote cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwapFormPhase {
	/// Nothing to quote yet
	#[default]
	Idle,
	/// A quote request is in flight
	Loading,
	/// A quote is displayed
	Ready,
	/// Inputs or provider rejected the swap; see `form_error`
	FormError,
}

/// Snapshot published to the UI after every change
///
/// `error` carries load and submit failures shown as a dismissible alert;
/// `form_error` carries input and route problems shown inline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SwapFormState {
	pub phase: SwapFormPhase,
	pub vault_id: String,

	pub src: Option<SelectedAccount>,
	pub dst: Option<SelectedAccount>,
	pub amount_text: String,

	pub src_balance: String,
	pub src_fiat_value: String,
	pub estimated_dst_token_value: String,
	pub estimated_dst_fiat_value: String,

	pub provider: Option<SwapProvider>,
	pub network_fee: String,
	pub network_fee_fiat: String,
	pub provider_fee_fiat: String,
	pub total_fee_fiat: String,

	pub quote: Option<SwapQuote>,
	pub expired_at: Option<DateTime<Utc>>,

	pub error: Option<String>,
	pub form_error: Option<SwapError>,
	pub is_swap_disabled: bool,
	pub is_loading: bool,
}

impl SwapFormState {
	pub fn new(vault_id: impl Into<String>) -> Self {
		Self {
			vault_id: vault_id.into(),
			is_swap_disabled: true,
			..Default::default()
		}
	}

	pub fn form_error_message(&self) -> Option<String> {
		self.form_error.as_ref().map(SwapError::user_message)
	}

	/// Drop every value derived from a previous quote
	pub fn clear_quote(&mut self) {
		self.provider = None;
		self.quote = None;
		self.expired_at = None;
		self.estimated_dst_token_value.clear();
		self.estimated_dst_fiat_value.clear();
		self.network_fee.clear();
		self.network_fee_fiat.clear();
		self.provider_fee_fiat.clear();
		self.total_fee_fiat.clear();
	}
}
