//! Common types module for the AgentLink service.
//!
//! This module defines the data types shared by the payment gate, the
//! consensus engine and the HTTP layer. Keeping them in one crate lets the
//! service crates agree on wire shapes without depending on each other.

/// API request/response bodies for the HTTP endpoints.
pub mod api;
/// Audit log entry types.
pub mod audit;
/// Advisor, vote and consensus outcome types.
pub mod consensus;
/// Market data snapshot types.
pub mod market;
/// Transaction receipt and event log types.
pub mod receipt;
/// Utility functions for common type conversions.
pub mod utils;

pub use api::*;
pub use audit::*;
pub use consensus::*;
pub use market::*;
pub use receipt::*;
pub use utils::{
	format_token_amount, parse_address, topic_to_address, truncate_id, without_0x_prefix,
};
