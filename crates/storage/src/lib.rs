//! Swap Storage
//!
//! Storage implementations for assembled swap transactions.

pub mod memory_store;

pub use memory_store::MemoryStore;
