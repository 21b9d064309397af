//! Token picker bridge
//!
//! Forwards selection requests to the UI and resolves them when the UI
//! answers with the matching request id.

use async_trait::async_trait;
use dashmap::DashMap;
use swap_types::{RepositoryError, RepositoryResult, TokenSelectionChannel, TokenSelectionRequest};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// In-process [`TokenSelectionChannel`] correlating answers by request id
#[derive(Debug)]
pub struct TokenSelectionHub {
	pending: DashMap<String, oneshot::Sender<Option<String>>>,
	requests: mpsc::UnboundedSender<TokenSelectionRequest>,
}

impl TokenSelectionHub {
	/// Hub plus the receiver the UI reads selection requests from
	pub fn new() -> (Self, mpsc::UnboundedReceiver<TokenSelectionRequest>) {
		let (requests, receiver) = mpsc::unbounded_channel();
		(
			Self {
				pending: DashMap::new(),
				requests,
			},
			receiver,
		)
	}

	/// Answer request `request_id`; returns false for unknown or stale ids
	pub fn respond(&self, request_id: &str, token_id: Option<String>) -> bool {
		match self.pending.remove(request_id) {
			Some((_, sender)) => sender.send(token_id).is_ok(),
			None => {
				warn!("Ignoring answer for unknown selection request {}", request_id);
				false
			},
		}
	}

	pub fn pending_count(&self) -> usize {
		self.pending.len()
	}
}

#[async_trait]
impl TokenSelectionChannel for TokenSelectionHub {
	async fn request_token(
		&self,
		request: TokenSelectionRequest,
	) -> RepositoryResult<Option<String>> {
		let request_id = request.request_id.clone();
		let (sender, receiver) = oneshot::channel();
		self.pending.insert(request_id.clone(), sender);
		let _pending = PendingGuard {
			pending: &self.pending,
			request_id: &request_id,
		};

		debug!(
			"Requesting {:?} token selection {}",
			request.target, request_id
		);
		if self.requests.send(request).is_err() {
			return Err(RepositoryError::ChannelClosed);
		}

		receiver.await.map_err(|_| RepositoryError::ChannelClosed)
	}
}

/// Removes a pending request however its caller stops waiting
struct PendingGuard<'a> {
	pending: &'a DashMap<String, oneshot::Sender<Option<String>>>,
	request_id: &'a str,
}

impl Drop for PendingGuard<'_> {
	fn drop(&mut self) {
		if self.pending.remove(self.request_id).is_some() {
			debug!("Selection request {} abandoned", self.request_id);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;
	use swap_types::SelectionTarget;

	fn request(id: &str) -> TokenSelectionRequest {
		TokenSelectionRequest {
			request_id: id.to_string(),
			vault_id: "vault-1".to_string(),
			target: SelectionTarget::Source,
			selected_token_id: None,
		}
	}

	#[tokio::test]
	async fn test_answer_is_matched_by_request_id() {
		let (hub, mut requests) = TokenSelectionHub::new();
		let hub = Arc::new(hub);

		let pending = tokio::spawn({
			let hub = hub.clone();
			async move { hub.request_token(request("req-1")).await }
		});

		let received = requests.recv().await.unwrap();
		assert_eq!(received.request_id, "req-1");
		assert!(!hub.respond("req-other", Some("BTC-Bitcoin".to_string())));
		assert!(hub.respond("req-1", Some("ETH-Ethereum".to_string())));

		let answer = pending.await.unwrap().unwrap();
		assert_eq!(answer, Some("ETH-Ethereum".to_string()));
		assert_eq!(hub.pending_count(), 0);
	}

	#[tokio::test]
	async fn test_dismissed_picker_resolves_to_none() {
		let (hub, mut requests) = TokenSelectionHub::new();
		let hub = Arc::new(hub);

		let pending = tokio::spawn({
			let hub = hub.clone();
			async move { hub.request_token(request("req-2")).await }
		});
		let received = requests.recv().await.unwrap();
		assert!(hub.respond(&received.request_id, None));

		assert_eq!(pending.await.unwrap(), Ok(None));
	}

	#[tokio::test]
	async fn test_closed_ui_side_fails_request() {
		let (hub, requests) = TokenSelectionHub::new();
		drop(requests);

		let result = hub.request_token(request("req-3")).await;
		assert_eq!(result, Err(RepositoryError::ChannelClosed));
		assert_eq!(hub.pending_count(), 0);
	}

	#[tokio::test]
	async fn test_abandoned_request_is_forgotten() {
		let (hub, mut requests) = TokenSelectionHub::new();
		let hub = Arc::new(hub);

		let pending = tokio::spawn({
			let hub = hub.clone();
			async move { hub.request_token(request("req-4")).await }
		});
		let received = requests.recv().await.unwrap();
		assert_eq!(hub.pending_count(), 1);

		pending.abort();
		assert!(pending.await.unwrap_err().is_cancelled());

		assert_eq!(hub.pending_count(), 0);
		assert!(!hub.respond(&received.request_id, None));
	}
}
