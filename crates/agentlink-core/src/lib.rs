//! Core engine for the AgentLink service.
//!
//! This crate wires the payment gate, market data service and advisor panel
//! into a single [`AnalysisEngine`], and owns the audit trail shared with the
//! HTTP layer.

use thiserror::Error;

pub mod audit;
pub mod builder;
pub mod engine;

pub use audit::AuditLog;
pub use builder::{BuilderError, EngineBuilder};
pub use engine::{normalize_token, AnalysisEngine, DEFAULT_TOKEN, SERVED_BY};

/// Errors that can occur while serving an analysis.
#[derive(Debug, Error)]
pub enum EngineError {
	/// No market data could be obtained for the token.
	#[error("Market data error: {0}")]
	Market(#[from] agentlink_price::PriceError),
}
