//! Prompt templates for the two deliberation rounds.

use agentlink_types::{AdvisorProfile, MarketData, Vote};

const REPLY_FORMAT: &str = "SIGNAL: [BUY/SELL/HOLD]\nCONFIDENCE: [0-100]%";

/// Prompt for independent analysis.
pub fn round_one_prompt(advisor: &AdvisorProfile, token: &str, market: &MarketData) -> String {
	format!(
		"You are a {} crypto trader ({}).\n\n\
		 Market Data for {}:\n\
		 - Price: ${}\n\
		 - 24h Change: {}%\n\
		 - Volume: ${}\n\n\
		 Provide analysis in EXACT format:\n\
		 {}\n\
		 REASON: [One detailed sentence]",
		advisor.perspective,
		advisor.specialty,
		token,
		market.price,
		market.change,
		group_thousands(market.volume),
		REPLY_FORMAT
	)
}

/// Prompt for peer review of the round-one transcript.
pub fn round_two_prompt(
	advisor: &AdvisorProfile,
	token: &str,
	market: &MarketData,
	transcript: &str,
) -> String {
	format!(
		"You are a {} crypto trader.\n\n\
		 Your colleague's analysis:\n\
		 {}\n\n\
		 Current {} price: ${}, change: {}%\n\n\
		 Review the analysis above. Do you:\n\
		 - AGREE with the signals?\n\
		 - Want to CHANGE your position?\n\
		 - Adjust your CONFIDENCE?\n\n\
		 Respond in EXACT format:\n\
		 {}\n\
		 REASON: [Why you agree/disagree with peer analysis]",
		advisor.perspective, transcript, token, market.price, market.change, REPLY_FORMAT
	)
}

/// Renders round-one votes one per line, in panel order.
pub fn transcript(votes: &[Vote]) -> String {
	votes
		.iter()
		.map(|vote| {
			format!(
				"{}: {} ({}%) - {}",
				vote.advisor, vote.signal, vote.confidence, vote.reason
			)
		})
		.collect::<Vec<_>>()
		.join("\n")
}

/// Formats a volume with comma thousands separators and at most three
/// fractional digits, e.g. `1234567.5` as `1,234,567.5`.
fn group_thousands(value: f64) -> String {
	if !value.is_finite() {
		return "N/A".to_string();
	}
	let rendered = format!("{:.3}", value.abs());
	let (integer, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
	let fraction = fraction.trim_end_matches('0');

	let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
	for (i, digit) in integer.chars().enumerate() {
		if i > 0 && (integer.len() - i) % 3 == 0 {
			grouped.push(',');
		}
		grouped.push(digit);
	}

	let sign = if value < 0.0 { "-" } else { "" };
	if fraction.is_empty() {
		format!("{}{}", sign, grouped)
	} else {
		format!("{}{}.{}", sign, grouped, fraction)
	}
}
