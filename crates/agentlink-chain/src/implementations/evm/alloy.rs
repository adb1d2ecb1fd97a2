//! Alloy-based receipt lookups over HTTP JSON-RPC.
//!
//! Converts alloy's RPC receipt into the service's chain-agnostic
//! `TransactionReceipt`, keeping only the status and the event logs.

use crate::{ChainError, ReceiptSource};
use agentlink_types::{EventLog, TransactionHash, TransactionReceipt};
use alloy_provider::{Provider, RootProvider};
use alloy_transport_http::Http;
use async_trait::async_trait;

/// Receipt source backed by an alloy HTTP provider.
pub struct AlloyReceiptSource {
	/// RPC provider for the payment network.
	provider: RootProvider<Http<reqwest::Client>>,
}

impl AlloyReceiptSource {
	/// Creates a receipt source for the given JSON-RPC endpoint.
	pub fn new(rpc_url: &str) -> Result<Self, ChainError> {
		let url = rpc_url
			.parse()
			.map_err(|e| ChainError::InvalidConfig(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;

		Ok(Self {
			provider: RootProvider::new_http(url),
		})
	}
}

/// Converts an RPC receipt into the service's receipt representation.
fn convert_receipt(receipt: &alloy_rpc_types::TransactionReceipt) -> TransactionReceipt {
	let logs = receipt
		.inner
		.logs()
		.iter()
		.map(|log| EventLog {
			address: log.inner.address,
			topics: log.inner.data.topics().to_vec(),
			data: log.inner.data.data.clone(),
		})
		.collect();

	TransactionReceipt {
		hash: TransactionHash(receipt.transaction_hash.0.to_vec()),
		block_number: receipt.block_number.unwrap_or(0),
		success: receipt.status(),
		logs,
	}
}

#[async_trait]
impl ReceiptSource for AlloyReceiptSource {
	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, ChainError> {
		let receipt = self
			.provider
			.get_transaction_receipt(hash.to_b256())
			.await
			.map_err(|e| ChainError::Network(format!("Failed to get receipt: {}", e)))?;

		Ok(receipt.as_ref().map(convert_receipt))
	}
}
