//! Reply parsing for advisor completions.
//!
//! Advisors are asked to answer in a fixed `SIGNAL:` / `CONFIDENCE:` /
//! `REASON:` format, but model output drifts. Parsing never fails: a reply
//! without a recognizable signal becomes a defaulted HOLD vote.

use agentlink_types::{AdvisorProfile, Signal, Vote, VoteOrigin};
use regex::Regex;
use std::sync::LazyLock;

const DEFAULT_CONFIDENCE: u8 = 50;

static SIGNAL_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)SIGNAL:\s*(BUY|SELL|HOLD)").expect("valid signal pattern"));
static CONFIDENCE_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"CONFIDENCE:\s*(\d+)").expect("valid confidence pattern"));
static REASON_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)REASON:\s*(.+)").expect("valid reason pattern"));

/// Outcome of parsing one advisor reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
	/// The reply carried a valid signal.
	Parsed(Vote),
	/// No valid signal was found; the vote holds defaults.
	Defaulted(Vote),
}

impl ParsedReply {
	pub fn vote(&self) -> &Vote {
		match self {
			ParsedReply::Parsed(vote) | ParsedReply::Defaulted(vote) => vote,
		}
	}

	pub fn into_vote(self) -> Vote {
		match self {
			ParsedReply::Parsed(vote) | ParsedReply::Defaulted(vote) => vote,
		}
	}
}

/// Generic reason used when a reply omits `REASON:`.
pub fn default_reason(round: u8) -> &'static str {
	if round == 1 {
		"Analysis complete"
	} else {
		"Analysis refined"
	}
}

/// Parses an advisor reply into a vote for `round`.
pub fn parse_reply(text: &str, round: u8, advisor: &AdvisorProfile) -> ParsedReply {
	let signal = SIGNAL_RE
		.captures(text)
		.and_then(|cap| cap.get(1))
		.and_then(|m| m.as_str().parse::<Signal>().ok());

	// Digit runs too long for u64 are still "over 100"
	let confidence = CONFIDENCE_RE
		.captures(text)
		.and_then(|cap| cap.get(1))
		.map(|m| m.as_str().parse::<u64>().map_or(100, |value| value.min(100)) as u8)
		.unwrap_or(DEFAULT_CONFIDENCE);

	let reason = REASON_RE
		.captures(text)
		.and_then(|cap| cap.get(1))
		.map(|m| m.as_str().trim().to_string())
		.filter(|reason| !reason.is_empty())
		.unwrap_or_else(|| default_reason(round).to_string());

	let vote = |signal: Signal, origin: VoteOrigin| Vote {
		round,
		advisor: advisor.name.clone(),
		perspective: advisor.perspective.clone(),
		signal,
		confidence,
		reason: reason.clone(),
		origin,
	};

	match signal {
		Some(signal) => ParsedReply::Parsed(vote(signal, VoteOrigin::Parsed)),
		None => ParsedReply::Defaulted(vote(Signal::Hold, VoteOrigin::Defaulted)),
	}
}
