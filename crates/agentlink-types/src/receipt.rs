//! Transaction receipt types for payment verification.
//!
//! This module defines the chain-agnostic view of a mined transaction that
//! the payment gate inspects: its status and the ordered event logs it emitted.

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::without_0x_prefix;

/// Errors raised when parsing transaction identifiers from untrusted input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashParseError {
	/// The value is not valid hex.
	#[error("Invalid hex in transaction hash: {0}")]
	InvalidHex(String),
	/// The decoded value does not have the 32-byte hash length.
	#[error("Transaction hash must be 32 bytes, got {0}")]
	InvalidLength(usize),
}

/// Blockchain transaction hash representation.
///
/// Stores transaction hashes as raw bytes to support different blockchain formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHash(pub Vec<u8>);

impl TransactionHash {
	/// Parses a `0x`-prefixed (or bare) hex string into a 32-byte hash.
	pub fn from_hex(value: &str) -> Result<Self, HashParseError> {
		let bytes = hex::decode(without_0x_prefix(value.trim()))
			.map_err(|e| HashParseError::InvalidHex(e.to_string()))?;
		if bytes.len() != 32 {
			return Err(HashParseError::InvalidLength(bytes.len()));
		}
		Ok(Self(bytes))
	}

	/// Returns the hash as a fixed 32-byte word.
	pub fn to_b256(&self) -> B256 {
		B256::from_slice(&self.0)
	}

	/// Returns the `0x`-prefixed lowercase hex form.
	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(&self.0))
	}
}

/// One event emitted by a contract during transaction execution.
///
/// `topics[0]` identifies the event type and `topics[1..]` carry the indexed
/// arguments. Non-indexed arguments are ABI-encoded in `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
	/// Address of the contract that emitted the event.
	pub address: Address,
	/// Indexed event topics.
	pub topics: Vec<B256>,
	/// Raw non-indexed data payload.
	pub data: Bytes,
}

/// Transaction receipt containing execution details.
///
/// Provides information about a transaction after it has been included in a block,
/// including its success status and the logs it emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
	/// Event logs in emission order.
	pub logs: Vec<EventLog>,
}

/// A claim that a payment was made, taken from request headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
	/// Hash of the transaction carrying the payment.
	pub transaction_hash: String,
	/// Payer wallet for direct transfers. Absent for facilitator payments.
	pub payer_address: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_hash_from_hex() {
		let hex_hash = format!("0x{}", "ab".repeat(32));
		let hash = TransactionHash::from_hex(&hex_hash).unwrap();
		assert_eq!(hash.0.len(), 32);
		assert_eq!(hash.to_hex(), hex_hash);
		assert_eq!(hash.to_b256(), B256::repeat_byte(0xab));
	}

	#[test]
	fn test_hash_rejects_bad_input() {
		assert!(matches!(
			TransactionHash::from_hex("0xzz"),
			Err(HashParseError::InvalidHex(_))
		));
		assert_eq!(
			TransactionHash::from_hex("0x1234"),
			Err(HashParseError::InvalidLength(2))
		);
	}
}
