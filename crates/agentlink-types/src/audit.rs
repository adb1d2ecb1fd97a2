//! Audit log entry types.
//!
//! Audit entries are a human-oriented trail of gate and pipeline decisions,
//! served as-is from the `/logs` endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an audited event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditKind {
	/// A request was turned away with a payment invoice.
	Block,
	/// A payment proof is being verified.
	Verify,
	/// A payment proof was accepted.
	Paid,
	/// A payment proof was rejected.
	Error,
	/// Market data was fetched.
	Data,
	/// A consensus verdict was produced.
	Ai,
}

impl fmt::Display for AuditKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			AuditKind::Block => "BLOCK",
			AuditKind::Verify => "VERIFY",
			AuditKind::Paid => "PAID",
			AuditKind::Error => "ERROR",
			AuditKind::Data => "DATA",
			AuditKind::Ai => "AI",
		};
		f.write_str(label)
	}
}

/// One entry in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
	/// Local wall-clock time, `HH:MM:SS`.
	pub time: String,
	#[serde(rename = "type")]
	pub kind: AuditKind,
	/// Who triggered the event (e.g. "Web", "CLI", "System").
	pub agent: String,
	pub message: String,
}
