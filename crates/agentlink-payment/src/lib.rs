//! Payment verification for gated requests.
//!
//! The gate turns a payment claim (a transaction hash, optionally with the
//! payer's wallet) into a yes/no decision. It waits for the transaction to be
//! mined, then looks for an ERC-20 transfer of the invoiced token to the
//! seller. Every failure path denies; nothing here is surfaced as an error to
//! the caller.

use agentlink_chain::ReceiptPoller;
use agentlink_config::PaymentConfig;
use agentlink_types::{
	format_token_amount, parse_address, truncate_id, PaymentRequiredResponse, PaymentScheme,
	TransactionHash, VerificationRequest,
};
use alloy_primitives::{Address, U256};
use thiserror::Error;
use tracing::instrument;

pub mod matcher;

pub use matcher::{decode_transfer, find_qualifying_transfer, DecodedTransfer, TransferCriteria};

/// Errors that can occur while setting up the payment gate.
#[derive(Debug, Error)]
pub enum PaymentError {
	/// Error that occurs when the payment configuration is unusable.
	#[error("Invalid payment configuration: {0}")]
	InvalidConfig(String),
}

/// How a payment claim is checked against the receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationMode {
	/// A facilitator settled the payment; only the recipient is checked.
	Facilitator,
	/// The payer transferred directly; sender and recipient are checked.
	Direct,
}

impl VerificationMode {
	/// Selects the mode from the presence of a payer address.
	pub fn for_request(request: &VerificationRequest) -> Self {
		if request.payer_address.is_some() {
			VerificationMode::Direct
		} else {
			VerificationMode::Facilitator
		}
	}
}

/// Verifies payment claims against on-chain receipts.
pub struct PaymentGate {
	poller: ReceiptPoller,
	seller: Address,
	token: Address,
	min_amount: U256,
	amount: String,
	decimals: u8,
	currency: String,
	network: String,
}

impl PaymentGate {
	/// Creates a gate from payment settings and a receipt poller.
	pub fn from_config(config: &PaymentConfig, poller: ReceiptPoller) -> Result<Self, PaymentError> {
		let seller = parse_address(&config.seller_address).map_err(PaymentError::InvalidConfig)?;
		let token = parse_address(&config.token_address).map_err(PaymentError::InvalidConfig)?;
		let amount = config.amount.trim().to_string();
		let min_amount = U256::from_str_radix(&amount, 10).map_err(|e| {
			PaymentError::InvalidConfig(format!("Invalid amount '{}': {}", amount, e))
		})?;

		Ok(Self {
			poller,
			seller,
			token,
			min_amount,
			amount,
			decimals: config.decimals,
			currency: config.currency.clone(),
			network: config.network.clone(),
		})
	}

	/// Builds the 402 invoice describing the accepted payment.
	pub fn invoice(&self) -> PaymentRequiredResponse {
		PaymentRequiredResponse::for_scheme(PaymentScheme {
			network: self.network.clone(),
			currency: self.currency.clone(),
			amount: self.amount.clone(),
			to: self.seller.to_string(),
			token: self.token.to_string(),
		})
	}

	/// Returns true only if the claimed transaction pays the invoice.
	#[instrument(skip_all, fields(tx_hash = %truncate_id(&request.transaction_hash)))]
	pub async fn verify(&self, request: &VerificationRequest) -> bool {
		let hash = match TransactionHash::from_hex(&request.transaction_hash) {
			Ok(hash) => hash,
			Err(e) => {
				tracing::warn!(error = %e, "Rejecting malformed transaction hash");
				return false;
			}
		};

		let mode = VerificationMode::for_request(request);
		let criteria = match &request.payer_address {
			Some(payer) => match parse_address(payer) {
				Ok(from) => TransferCriteria::direct(from, self.seller),
				Err(e) => {
					tracing::warn!(error = %e, "Rejecting malformed payer address");
					return false;
				}
			},
			None => TransferCriteria::facilitator(self.seller),
		};
		tracing::debug!(?mode, "Verifying payment");

		let Some(receipt) = self.poller.poll(&hash).await else {
			tracing::warn!("Payment transaction not found");
			return false;
		};

		if !receipt.success {
			tracing::warn!(block = receipt.block_number, "Payment transaction reverted");
			return false;
		}

		match find_qualifying_transfer(&receipt, self.token, self.min_amount, &criteria) {
			Some(log) => {
				let paid = decode_transfer(log, self.token)
					.map(|transfer| transfer.value)
					.unwrap_or(self.min_amount);
				tracing::info!(
					block = receipt.block_number,
					"CONFIRMED {} {}",
					format_token_amount(&paid.to_string(), self.decimals),
					self.currency
				);
				true
			}
			None => {
				tracing::warn!(
					?mode,
					logs = receipt.logs.len(),
					"No qualifying transfer in receipt"
				);
				false
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::matcher::tests::{receipt_with, transfer_log, PAYER, SELLER, TOKEN};
	use agentlink_chain::{ChainError, ReceiptSource};
	use agentlink_config::builders::ConfigBuilder;
	use agentlink_types::TransactionReceipt;
	use async_trait::async_trait;
	use std::sync::atomic::{AtomicU32, Ordering};
	use std::sync::Arc;
	use std::time::Duration;

	/// Returns the same lookup result on every call.
	struct FixedSource {
		receipt: Option<TransactionReceipt>,
		calls: AtomicU32,
	}

	#[async_trait]
	impl ReceiptSource for FixedSource {
		async fn get_receipt(
			&self,
			_hash: &TransactionHash,
		) -> Result<Option<TransactionReceipt>, ChainError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(self.receipt.clone())
		}
	}

	fn gate_with(receipt: Option<TransactionReceipt>, max_attempts: u32) -> (PaymentGate, Arc<FixedSource>) {
		let source = Arc::new(FixedSource {
			receipt,
			calls: AtomicU32::new(0),
		});
		let config = ConfigBuilder::new().build();
		let poller = ReceiptPoller::new(source.clone(), max_attempts, Duration::from_millis(2000));
		(PaymentGate::from_config(&config.payment, poller).unwrap(), source)
	}

	fn facilitator_request() -> VerificationRequest {
		VerificationRequest {
			transaction_hash: format!("0x{}", "ab".repeat(32)),
			payer_address: None,
		}
	}

	fn direct_request(payer: &str) -> VerificationRequest {
		VerificationRequest {
			payer_address: Some(payer.to_string()),
			..facilitator_request()
		}
	}

	#[tokio::test]
	async fn test_facilitator_payment_at_threshold_verifies() {
		let receipt = receipt_with(vec![transfer_log(TOKEN, PAYER, SELLER, 10_000)], true);
		let (gate, _) = gate_with(Some(receipt), 1);
		assert!(gate.verify(&facilitator_request()).await);
	}

	#[tokio::test]
	async fn test_failed_receipt_denies_regardless_of_logs() {
		let receipt = receipt_with(vec![transfer_log(TOKEN, PAYER, SELLER, 1_000_000)], false);
		let (gate, _) = gate_with(Some(receipt), 1);
		assert!(!gate.verify(&facilitator_request()).await);
	}

	#[tokio::test]
	async fn test_direct_payment_from_other_sender_denies() {
		let receipt = receipt_with(vec![transfer_log(TOKEN, PAYER, SELLER, 10_000)], true);
		let (gate, _) = gate_with(Some(receipt), 1);

		assert!(
			!gate
				.verify(&direct_request("0x2222222222222222222222222222222222222222"))
				.await
		);
		// Header addresses are matched regardless of letter case
		assert!(
			gate.verify(&direct_request("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"))
				.await
		);
	}

	#[tokio::test(start_paused = true)]
	async fn test_missing_receipt_denies_after_all_attempts() {
		let (gate, source) = gate_with(None, 5);
		assert!(!gate.verify(&facilitator_request()).await);
		assert_eq!(source.calls.load(Ordering::SeqCst), 5);
	}

	#[tokio::test]
	async fn test_malformed_input_denies_without_lookup() {
		let (gate, source) = gate_with(None, 1);

		let bad_hash = VerificationRequest {
			transaction_hash: "not-a-hash".to_string(),
			payer_address: None,
		};
		assert!(!gate.verify(&bad_hash).await);
		assert!(!gate.verify(&direct_request("0xnope")).await);
		assert_eq!(source.calls.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_invoice_describes_payment() {
		let (gate, _) = gate_with(None, 1);
		let invoice = gate.invoice();
		assert_eq!(invoice.error, "Payment Required");
		assert_eq!(invoice.amount, "10000");
		assert_eq!(invoice.currency, "USDC");
		assert_eq!(invoice.schemes[0].network, "cronos-testnet");
		assert_eq!(invoice.pay_to.to_lowercase(), format!("{:#x}", SELLER));
		assert_eq!(invoice.token.to_lowercase(), format!("{:#x}", TOKEN));
	}

	#[test]
	fn test_mode_follows_payer_presence() {
		assert_eq!(
			VerificationMode::for_request(&facilitator_request()),
			VerificationMode::Facilitator
		);
		assert_eq!(
			VerificationMode::for_request(&direct_request("0x00")),
			VerificationMode::Direct
		);
	}

	#[test]
	fn test_rejects_bad_amount() {
		let config = ConfigBuilder::new().amount("ten").build();
		let source = Arc::new(FixedSource {
			receipt: None,
			calls: AtomicU32::new(0),
		});
		let poller = ReceiptPoller::new(source, 1, Duration::ZERO);
		assert!(matches!(
			PaymentGate::from_config(&config.payment, poller),
			Err(PaymentError::InvalidConfig(_))
		));
	}
}
