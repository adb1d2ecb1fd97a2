//! Consensus aggregation over round-two votes.

use agentlink_types::{ConsensusOutcome, Signal, SignalTally, Vote};

/// Number of deliberation rounds the panel runs.
pub const DELIBERATION_ROUNDS: u8 = 2;

/// Computes the panel verdict.
///
/// Only round-two votes are counted. The winner is the voted-for signal
/// with the largest confidence-weighted score; ties go to the earlier signal in
/// BUY, SELL, HOLD order. Defaulted votes add to the vote total and the
/// confidence average but carry no signal. With no signal-carrying vote the
/// verdict is HOLD. Round-one votes only feed the evolution flag.
pub fn aggregate(round_one: &[Vote], round_two: &[Vote]) -> ConsensusOutcome {
	let mut votes = SignalTally::default();
	let mut weighted_scores = SignalTally::default();

	for vote in round_two.iter().filter(|vote| vote.carries_signal()) {
		votes.add(vote.signal, 1);
		weighted_scores.add(vote.signal, u32::from(vote.confidence));
	}

	// Only signals someone voted for can win, even at zero confidence
	let signal = Signal::ALL
		.into_iter()
		.filter(|candidate| votes.get(*candidate) > 0)
		.fold(None, |best: Option<Signal>, candidate| match best {
			Some(best) if weighted_scores.get(best) >= weighted_scores.get(candidate) => Some(best),
			_ => Some(candidate),
		})
		.unwrap_or(Signal::Hold);

	let total = round_two.len() as u32;
	let agreement = if total == 0 {
		0
	} else {
		(f64::from(votes.get(signal)) * 100.0 / f64::from(total)).round() as u32
	};

	let average_confidence = if round_two.is_empty() {
		0.0
	} else {
		round_two
			.iter()
			.map(|vote| f64::from(vote.confidence))
			.sum::<f64>()
			/ round_two.len() as f64
	};

	let evolved = round_one
		.iter()
		.enumerate()
		.any(|(i, first)| round_two.get(i).is_none_or(|second| second.signal != first.signal));

	ConsensusOutcome {
		signal,
		agreement,
		average_confidence,
		votes,
		weighted_scores,
		rounds: DELIBERATION_ROUNDS,
		evolved,
	}
}
