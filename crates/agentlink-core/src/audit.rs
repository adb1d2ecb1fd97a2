//! Bounded in-memory audit trail.
//!
//! Keeps the most recent gate and pipeline events for the `/logs` endpoint.
//! Entries are also emitted as tracing events.

use agentlink_types::{AuditEntry, AuditKind};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Ring buffer of audit entries, newest first.
///
/// Cloning shares the underlying buffer.
#[derive(Clone)]
pub struct AuditLog {
	entries: Arc<RwLock<VecDeque<AuditEntry>>>,
	capacity: usize,
}

impl AuditLog {
	/// Creates an empty log retaining at most `capacity` entries.
	pub fn new(capacity: usize) -> Self {
		let capacity = capacity.max(1);
		Self {
			entries: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
			capacity,
		}
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Records an event, evicting the oldest entry when full.
	pub async fn record(&self, kind: AuditKind, agent: &str, message: impl Into<String>) {
		let entry = AuditEntry {
			time: chrono::Local::now().format("%H:%M:%S").to_string(),
			kind,
			agent: agent.to_string(),
			message: message.into(),
		};
		tracing::info!(kind = %entry.kind, agent = %entry.agent, "{}", entry.message);

		let mut entries = self.entries.write().await;
		entries.push_front(entry);
		entries.truncate(self.capacity);
	}

	/// Returns a snapshot of the retained entries, newest first.
	pub async fn entries(&self) -> Vec<AuditEntry> {
		self.entries.read().await.iter().cloned().collect()
	}
}

impl Default for AuditLog {
	fn default() -> Self {
		Self::new(50)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_newest_first() {
		let log = AuditLog::new(10);
		log.record(AuditKind::Block, "Anonymous", "first").await;
		log.record(AuditKind::Verify, "CLI", "second").await;

		let entries = log.entries().await;
		assert_eq!(entries.len(), 2);
		assert_eq!(entries[0].message, "second");
		assert_eq!(entries[0].kind, AuditKind::Verify);
		assert_eq!(entries[1].agent, "Anonymous");
		assert_eq!(entries[0].time.len(), 8);
	}

	#[tokio::test]
	async fn test_evicts_oldest_beyond_capacity() {
		let log = AuditLog::new(3);
		for i in 0..5 {
			log.record(AuditKind::Data, "Market", format!("event {}", i)).await;
		}

		let messages: Vec<_> = log.entries().await.into_iter().map(|e| e.message).collect();
		assert_eq!(messages, vec!["event 4", "event 3", "event 2"]);
	}

	#[tokio::test]
	async fn test_clones_share_buffer() {
		let log = AuditLog::new(5);
		let handle = log.clone();
		handle.record(AuditKind::Paid, "Agent", "✅ Verified").await;
		assert_eq!(log.entries().await.len(), 1);
	}

	#[test]
	fn test_zero_capacity_keeps_one() {
		assert_eq!(AuditLog::new(0).capacity(), 1);
	}
}
