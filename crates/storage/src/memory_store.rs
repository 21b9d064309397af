//! In-memory transaction storage using DashMap

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use swap_types::{
	RepositoryResult, StorageError, StorageResult, SwapTransaction, SwapTransactionRepository,
};
use tracing::debug;

/// In-memory store for assembled swap transactions
#[derive(Clone, Default)]
pub struct MemoryStore {
	pub transactions: Arc<DashMap<String, SwapTransaction>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a transaction; ids are never overwritten
	pub fn insert(&self, transaction: SwapTransaction) -> StorageResult<()> {
		match self.transactions.entry(transaction.id.clone()) {
			dashmap::mapref::entry::Entry::Occupied(entry) => Err(StorageError::AlreadyExists {
				id: entry.key().clone(),
			}),
			dashmap::mapref::entry::Entry::Vacant(entry) => {
				debug!(
					"Storing swap transaction {} for vault {}",
					transaction.id, transaction.vault_id
				);
				entry.insert(transaction);
				Ok(())
			},
		}
	}

	pub fn get(&self, id: &str) -> Option<SwapTransaction> {
		self.transactions.get(id).map(|entry| entry.clone())
	}

	/// Transactions of `vault_id`, oldest first
	pub fn for_vault(&self, vault_id: &str) -> Vec<SwapTransaction> {
		let mut transactions: Vec<SwapTransaction> = self
			.transactions
			.iter()
			.filter(|entry| entry.value().vault_id == vault_id)
			.map(|entry| entry.value().clone())
			.collect();
		transactions.sort_by_key(|transaction| transaction.created_at);
		transactions
	}

	pub fn len(&self) -> usize {
		self.transactions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transactions.is_empty()
	}
}

#[async_trait]
impl SwapTransactionRepository for MemoryStore {
	async fn add_transaction(&self, transaction: SwapTransaction) -> RepositoryResult<()> {
		Ok(self.insert(transaction)?)
	}

	async fn get_transaction(&self, id: &str) -> RepositoryResult<Option<SwapTransaction>> {
		Ok(self.get(id))
	}

	async fn get_transactions_for_vault(
		&self,
		vault_id: &str,
	) -> RepositoryResult<Vec<SwapTransaction>> {
		Ok(self.for_vault(vault_id))
	}
}
