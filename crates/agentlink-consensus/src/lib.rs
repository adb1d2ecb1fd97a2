//! Multi-round advisor consensus.
//!
//! A panel of language-model advisors analyses a token independently, then
//! reviews the panel's first-round transcript and votes again. The second
//! round decides the outcome. This crate provides the completion client
//! abstraction, an OpenAI-compatible HTTP implementation, the reply parser,
//! the round runner and the aggregator.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

pub mod aggregator;
pub mod engine;
pub mod parser;
pub mod prompts;
pub mod round;

pub use aggregator::aggregate;
pub use engine::{ConsensusEngine, ConsensusReport};
pub use parser::{parse_reply, ParsedReply};
pub use round::{run_round, RoundSettings};

/// Errors that can occur when calling a completion API.
#[derive(Debug, Error)]
pub enum CompletionError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// The API answered with a non-success status.
	#[error("API error: {0}")]
	Api(String),
	/// The API answered with a body that carries no usable reply.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// The client could not be configured.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Errors that prevent the panel from reaching any verdict.
#[derive(Debug, Error)]
pub enum ConsensusError {
	/// The advisor panel is empty.
	#[error("Advisor panel is empty")]
	EmptyPanel,
	/// Every advisor failed in both rounds.
	#[error("No advisor produced a vote")]
	NoVotes,
	/// The completion client could not be created.
	#[error(transparent)]
	Completion(#[from] CompletionError),
}

/// A single-prompt completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
	pub model: String,
	pub prompt: String,
	pub temperature: f32,
	pub max_tokens: u32,
}

/// Trait defining the interface for language-model completion backends.
///
/// Implementations return the text of the first reply choice. Failures are
/// per call; the round runner drops the affected advisor for that round.
#[async_trait]
pub trait CompletionInterface: Send + Sync {
	async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
