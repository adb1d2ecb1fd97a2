//! Two-round deliberation driver.

use crate::aggregator::aggregate;
use crate::implementations::http::HttpCompletionClient;
use crate::prompts::{round_one_prompt, round_two_prompt, transcript};
use crate::round::{run_round, RoundSettings};
use crate::{CompletionInterface, ConsensusError};
use agentlink_config::ConsensusConfig;
use agentlink_types::{AdvisorProfile, ConsensusOutcome, MarketData, Vote};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a deliberation together with the votes behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusReport {
	pub outcome: ConsensusOutcome,
	pub round_1: Vec<Vote>,
	pub round_2: Vec<Vote>,
}

/// Runs the advisor panel through independent analysis and peer review.
pub struct ConsensusEngine {
	client: Arc<dyn CompletionInterface>,
	advisors: Vec<AdvisorProfile>,
	round_one: RoundSettings,
	round_two: RoundSettings,
}

impl ConsensusEngine {
	pub fn new(
		client: Arc<dyn CompletionInterface>,
		advisors: Vec<AdvisorProfile>,
		round_one: RoundSettings,
		round_two: RoundSettings,
	) -> Self {
		Self {
			client,
			advisors,
			round_one,
			round_two,
		}
	}

	/// Builds an engine backed by the configured HTTP completion API.
	///
	/// Returns `Ok(None)` when no API key is configured.
	pub fn from_config(config: &ConsensusConfig) -> Result<Option<Self>, ConsensusError> {
		let Some(api_key) = config.api_key() else {
			return Ok(None);
		};
		let client = HttpCompletionClient::new(
			&config.api_url,
			api_key,
			Duration::from_secs(config.timeout_seconds),
		)?;

		Ok(Some(Self::new(
			Arc::new(client),
			config.advisors.clone(),
			RoundSettings {
				temperature: config.round_one_temperature,
				max_tokens: config.max_tokens,
			},
			RoundSettings {
				temperature: config.round_two_temperature,
				max_tokens: config.max_tokens,
			},
		)))
	}

	pub fn advisors(&self) -> &[AdvisorProfile] {
		&self.advisors
	}

	/// Runs both rounds and aggregates the result.
	///
	/// Fails only when the panel is empty or no advisor produced a vote in
	/// either round.
	pub async fn deliberate(
		&self,
		token: &str,
		market: &MarketData,
	) -> Result<ConsensusReport, ConsensusError> {
		if self.advisors.is_empty() {
			return Err(ConsensusError::EmptyPanel);
		}

		tracing::info!(token, advisors = self.advisors.len(), "Round 1: independent analysis");
		let round_1 = run_round(1, &self.advisors, self.client.as_ref(), self.round_one, |advisor| {
			round_one_prompt(advisor, token, market)
		})
		.await;

		tracing::info!(token, "Round 2: cross-examination");
		let peer_transcript = transcript(&round_1);
		let round_2 = run_round(2, &self.advisors, self.client.as_ref(), self.round_two, |advisor| {
			round_two_prompt(advisor, token, market, &peer_transcript)
		})
		.await;

		if round_1.is_empty() && round_2.is_empty() {
			return Err(ConsensusError::NoVotes);
		}

		let outcome = aggregate(&round_1, &round_2);
		tracing::info!(
			token,
			signal = %outcome.signal,
			agreement = outcome.agreement,
			evolved = outcome.evolved,
			"Consensus reached"
		);

		Ok(ConsensusReport {
			outcome,
			round_1,
			round_2,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::round::tests::{advisor, ScriptedCompletion};
	use agentlink_config::builders::ConfigBuilder;
	use agentlink_types::Signal;

	fn market() -> MarketData {
		MarketData {
			source: "Simulation".to_string(),
			price: 12.5,
			high: None,
			low: None,
			volume: 1000.0,
			change: 2.0,
		}
	}

	fn settings(temperature: f32) -> RoundSettings {
		RoundSettings {
			temperature,
			max_tokens: 150,
		}
	}

	fn engine(client: Arc<ScriptedCompletion>) -> ConsensusEngine {
		ConsensusEngine::new(
			client,
			vec![advisor("Strategist", "big"), advisor("Tactician", "small")],
			settings(0.7),
			settings(0.8),
		)
	}

	#[tokio::test]
	async fn test_full_deliberation() {
		let client = Arc::new(
			ScriptedCompletion::default()
				.with(
					"big",
					vec![
						Ok("SIGNAL: BUY\nCONFIDENCE: 80\nREASON: Breakout"),
						Ok("SIGNAL: BUY\nCONFIDENCE: 85\nREASON: Agree with peers"),
					],
				)
				.with(
					"small",
					vec![
						Ok("SIGNAL: HOLD\nCONFIDENCE: 60\nREASON: Choppy"),
						Ok("SIGNAL: BUY\nCONFIDENCE: 65\nREASON: Convinced"),
					],
				),
		);
		let report = engine(client.clone()).deliberate("CRO", &market()).await.unwrap();

		assert_eq!(report.round_1.len(), 2);
		assert_eq!(report.round_2.len(), 2);
		assert_eq!(report.outcome.signal, Signal::Buy);
		assert_eq!(report.outcome.agreement, 100);
		assert_eq!(report.outcome.average_confidence, 75.0);
		assert!(report.outcome.evolved);

		let requests = client.requests.lock().unwrap();
		assert_eq!(requests.len(), 4);
		assert_eq!(requests[0].temperature, 0.7);
		assert_eq!(requests[2].temperature, 0.8);
		assert!(requests[2]
			.prompt
			.contains("Strategist: BUY (80%) - Breakout\nTactician: HOLD (60%) - Choppy"));
	}

	#[tokio::test]
	async fn test_unparseable_round_two_yields_hold() {
		let client = Arc::new(
			ScriptedCompletion::default()
				.with("big", vec![Ok("SIGNAL: BUY\nCONFIDENCE: 80"), Ok("no idea")])
				.with("small", vec![Ok("SIGNAL: SELL\nCONFIDENCE: 70"), Ok("???")]),
		);
		let report = engine(client).deliberate("CRO", &market()).await.unwrap();

		assert_eq!(report.outcome.signal, Signal::Hold);
		assert_eq!(report.outcome.agreement, 0);
		assert_eq!(report.outcome.average_confidence, 50.0);
	}

	#[tokio::test]
	async fn test_total_failure_is_an_error() {
		let client = Arc::new(ScriptedCompletion::default());
		let result = engine(client).deliberate("CRO", &market()).await;
		assert!(matches!(result, Err(ConsensusError::NoVotes)));
	}

	#[tokio::test]
	async fn test_empty_panel_is_an_error() {
		let engine = ConsensusEngine::new(
			Arc::new(ScriptedCompletion::default()),
			vec![],
			settings(0.7),
			settings(0.8),
		);
		assert!(matches!(
			engine.deliberate("CRO", &market()).await,
			Err(ConsensusError::EmptyPanel)
		));
	}

	#[test]
	fn test_from_config_requires_api_key() {
		let config = ConfigBuilder::new().build();
		assert!(ConsensusEngine::from_config(&config.consensus).unwrap().is_none());

		let config = ConfigBuilder::new().api_key(Some("gsk_test")).build();
		let engine = ConsensusEngine::from_config(&config.consensus).unwrap().unwrap();
		assert_eq!(engine.advisors().len(), 2);
	}
}
