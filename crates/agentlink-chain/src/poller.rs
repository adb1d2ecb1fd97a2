//! Receipt polling for freshly submitted payment transactions.
//!
//! Polls a receipt source at a fixed interval until the transaction is mined
//! or the attempt budget runs out. Block confirmation on the payment network
//! takes seconds, so there is no backoff.

use crate::ReceiptSource;
use agentlink_types::{truncate_id, TransactionHash, TransactionReceipt};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub struct ReceiptPoller {
	source: Arc<dyn ReceiptSource>,
	max_attempts: u32,
	interval: Duration,
}

impl ReceiptPoller {
	pub fn new(source: Arc<dyn ReceiptSource>, max_attempts: u32, interval: Duration) -> Self {
		Self {
			source,
			max_attempts,
			interval,
		}
	}

	/// Looks the receipt up until it is found or attempts are exhausted.
	///
	/// Missing receipts and lookup errors both consume an attempt; errors are
	/// logged and never surfaced. Returns `None` once every attempt failed.
	#[instrument(skip_all, fields(tx_hash = %truncate_id(&hash.to_hex())))]
	pub async fn poll(&self, hash: &TransactionHash) -> Option<TransactionReceipt> {
		for attempt in 1..=self.max_attempts {
			match self.source.get_receipt(hash).await {
				Ok(Some(receipt)) => {
					tracing::info!(attempt, block = receipt.block_number, "Receipt found");
					return Some(receipt);
				}
				Ok(None) => {
					tracing::debug!(
						"Receipt not yet available, attempt {}/{}",
						attempt,
						self.max_attempts
					);
				}
				Err(e) => {
					tracing::warn!(attempt, error = %e, "Receipt lookup failed");
				}
			}

			if attempt < self.max_attempts {
				tokio::time::sleep(self.interval).await;
			}
		}

		tracing::warn!(
			"Receipt not found after {} attempts",
			self.max_attempts
		);
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ChainError;
	use async_trait::async_trait;
	use std::collections::VecDeque;
	use std::sync::atomic::{AtomicU32, Ordering};
	use tokio::sync::Mutex;

	/// Receipt source that replays scripted lookups, then reports "not mined".
	struct ScriptedSource {
		script: Mutex<VecDeque<Result<Option<TransactionReceipt>, ChainError>>>,
		calls: AtomicU32,
	}

	impl ScriptedSource {
		fn new(script: Vec<Result<Option<TransactionReceipt>, ChainError>>) -> Arc<Self> {
			Arc::new(Self {
				script: Mutex::new(script.into()),
				calls: AtomicU32::new(0),
			})
		}
	}

	#[async_trait]
	impl ReceiptSource for ScriptedSource {
		async fn get_receipt(
			&self,
			_hash: &TransactionHash,
		) -> Result<Option<TransactionReceipt>, ChainError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.script.lock().await.pop_front().unwrap_or(Ok(None))
		}
	}

	fn receipt() -> TransactionReceipt {
		TransactionReceipt {
			hash: TransactionHash(vec![1; 32]),
			block_number: 42,
			success: true,
			logs: vec![],
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_gives_up_after_max_attempts() {
		let source = ScriptedSource::new(vec![]);
		let poller = ReceiptPoller::new(source.clone(), 5, Duration::from_millis(2000));

		let start = tokio::time::Instant::now();
		let result = poller.poll(&TransactionHash(vec![1; 32])).await;

		assert!(result.is_none());
		assert_eq!(source.calls.load(Ordering::SeqCst), 5);
		// Four waits between five attempts
		assert_eq!(start.elapsed(), Duration::from_millis(8000));
	}

	#[tokio::test(start_paused = true)]
	async fn test_errors_consume_attempts_without_aborting() {
		let source = ScriptedSource::new(vec![
			Err(ChainError::Network("connection refused".into())),
			Ok(None),
			Err(ChainError::Network("timeout".into())),
			Ok(Some(receipt())),
		]);
		let poller = ReceiptPoller::new(source.clone(), 5, Duration::from_millis(2000));

		let result = poller.poll(&TransactionHash(vec![1; 32])).await;

		assert_eq!(result, Some(receipt()));
		assert_eq!(source.calls.load(Ordering::SeqCst), 4);
	}

	#[tokio::test(start_paused = true)]
	async fn test_returns_immediately_when_mined() {
		let source = ScriptedSource::new(vec![Ok(Some(receipt()))]);
		let poller = ReceiptPoller::new(source.clone(), 5, Duration::from_millis(2000));

		let start = tokio::time::Instant::now();
		assert!(poller.poll(&TransactionHash(vec![1; 32])).await.is_some());
		assert_eq!(start.elapsed(), Duration::ZERO);
	}

	#[tokio::test(start_paused = true)]
	async fn test_persistent_errors_yield_not_found() {
		let source = ScriptedSource::new(
			(0..5)
				.map(|_| Err(ChainError::Network("down".into())))
				.collect(),
		);
		let poller = ReceiptPoller::new(source.clone(), 5, Duration::from_millis(10));

		assert!(poller.poll(&TransactionHash(vec![1; 32])).await.is_none());
		assert_eq!(source.calls.load(Ordering::SeqCst), 5);
	}
}
