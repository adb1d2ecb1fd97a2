//! One deliberation round across the panel.

use crate::parser::{parse_reply, ParsedReply};
use crate::{CompletionInterface, CompletionRequest};
use agentlink_types::{AdvisorProfile, Vote};

/// Sampling settings applied to every call in a round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundSettings {
	pub temperature: f32,
	pub max_tokens: u32,
}

/// Asks every advisor, in panel order, for a vote.
///
/// Calls are sequential. An advisor whose call fails contributes no vote to
/// this round; unparseable replies still produce a defaulted vote.
pub async fn run_round<F>(
	round: u8,
	advisors: &[AdvisorProfile],
	client: &dyn CompletionInterface,
	settings: RoundSettings,
	prompt_for: F,
) -> Vec<Vote>
where
	F: Fn(&AdvisorProfile) -> String,
{
	let mut votes = Vec::with_capacity(advisors.len());

	for advisor in advisors {
		let request = CompletionRequest {
			model: advisor.model.clone(),
			prompt: prompt_for(advisor),
			temperature: settings.temperature,
			max_tokens: settings.max_tokens,
		};

		let reply = match client.complete(&request).await {
			Ok(reply) => reply,
			Err(e) => {
				tracing::warn!(round, advisor = %advisor.name, error = %e, "Advisor call failed");
				continue;
			}
		};

		let parsed = parse_reply(&reply, round, advisor);
		if let ParsedReply::Defaulted(_) = parsed {
			tracing::warn!(round, advisor = %advisor.name, "Advisor reply had no signal, defaulting to HOLD");
		}
		let vote = parsed.into_vote();
		tracing::info!(
			round,
			advisor = %advisor.name,
			signal = %vote.signal,
			confidence = vote.confidence,
			"Advisor voted"
		);
		votes.push(vote);
	}

	votes
}
