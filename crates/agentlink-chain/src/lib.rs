//! Blockchain access for payment verification.
//!
//! This module provides the receipt lookup abstraction used by the payment
//! gate, an alloy-backed JSON-RPC implementation, and a fixed-interval poller
//! that waits for a transaction to be mined.

use agentlink_types::{TransactionHash, TransactionReceipt};
use async_trait::async_trait;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

pub mod poller;

pub use poller::ReceiptPoller;

/// Errors that can occur while talking to a blockchain node.
#[derive(Debug, Error)]
pub enum ChainError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs when the provider cannot be configured.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
}

/// Trait defining the interface for receipt lookups.
///
/// Implementations must distinguish "not mined yet" (`Ok(None)`) from a
/// transport failure (`Err`), since the poller logs them differently.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
	/// Retrieves the receipt for a transaction if it has been mined.
	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, ChainError>;
}
