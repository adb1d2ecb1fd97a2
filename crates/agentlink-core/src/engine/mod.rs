//! Analysis engine coordinating payment, market data and consensus.
//!
//! The engine is what the HTTP layer talks to. It owns the payment gate, the
//! market data service, the optional consensus engine and the audit log, and
//! turns a paid request into an analysis report.

use crate::audit::AuditLog;
use crate::EngineError;
use agentlink_consensus::ConsensusEngine;
use agentlink_payment::PaymentGate;
use agentlink_price::MarketDataService;
use agentlink_types::{
	truncate_id, AnalysesByRound, AnalysisResponse, AuditKind, ConsensusBlock, MarketData,
	MarketStats, PaymentRequiredResponse, VerificationRequest,
};
use tracing::instrument;

/// Value of the `served_by` response field.
pub const SERVED_BY: &str = "AgentLink Pro - Multi-Round Deliberative Consensus";

/// Ticker analysed when the request names none.
pub const DEFAULT_TOKEN: &str = "CRO";

pub struct AnalysisEngine {
	gate: PaymentGate,
	market: MarketDataService,
	consensus: Option<ConsensusEngine>,
	audit: AuditLog,
}

impl AnalysisEngine {
	pub fn new(
		gate: PaymentGate,
		market: MarketDataService,
		consensus: Option<ConsensusEngine>,
		audit: AuditLog,
	) -> Self {
		Self {
			gate,
			market,
			consensus,
			audit,
		}
	}

	pub fn audit(&self) -> &AuditLog {
		&self.audit
	}

	/// Whether a completion backend is configured.
	pub fn consensus_enabled(&self) -> bool {
		self.consensus.is_some()
	}

	/// Builds the 402 invoice for an unpaid request.
	pub async fn invoice(&self) -> PaymentRequiredResponse {
		self.audit
			.record(AuditKind::Block, "Anonymous", "Sending 402 Invoice")
			.await;
		self.gate.invoice()
	}

	/// Verifies a payment claim, recording the decision in the audit log.
	pub async fn verify_payment(&self, request: &VerificationRequest) -> bool {
		match &request.payer_address {
			Some(payer) => {
				self.audit
					.record(
						AuditKind::Verify,
						"Web",
						format!(
							"Checking {} from {}",
							truncate_id(&request.transaction_hash),
							truncate_id(payer)
						),
					)
					.await
			}
			None => {
				self.audit
					.record(
						AuditKind::Verify,
						"CLI",
						format!("Checking {}", truncate_id(&request.transaction_hash)),
					)
					.await
			}
		}

		let verified = self.gate.verify(request).await;
		if verified {
			self.audit.record(AuditKind::Paid, "Agent", "✅ Verified").await;
		} else {
			self.audit
				.record(AuditKind::Error, "System", "Payment verification failed")
				.await;
		}
		verified
	}

	/// Produces the analysis report for a token.
	///
	/// The token is upper-cased, defaulting to CRO when blank. Fails only when
	/// no market data can be obtained.
	#[instrument(skip_all, fields(token = %token))]
	pub async fn analyze(&self, token: &str) -> Result<AnalysisResponse, EngineError> {
		let token = normalize_token(token);

		self.audit
			.record(AuditKind::Data, "Market", format!("Fetching {}...", token))
			.await;
		let market = self.market.fetch(&token).await?;
		self.audit
			.record(
				AuditKind::Data,
				&market.source,
				format!("{} = ${}", token, market.price),
			)
			.await;

		let (ai_consensus, analyses_by_round) = self.consult_panel(&token, &market).await;

		Ok(AnalysisResponse {
			success: true,
			source: market.source.clone(),
			market_stats: MarketStats::from(&market),
			ai_consensus,
			analyses_by_round,
			served_by: SERVED_BY.to_string(),
			timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
			token,
		})
	}

	async fn consult_panel(
		&self,
		token: &str,
		market: &MarketData,
	) -> (ConsensusBlock, AnalysesByRound) {
		let Some(consensus) = &self.consensus else {
			let summary = format!(
				"{}: {} at ${}. Configure GROQ_API_KEY.",
				market.source, token, market.price
			);
			return (ConsensusBlock::degraded(summary), AnalysesByRound::default());
		};

		match consensus.deliberate(token, market).await {
			Ok(report) => {
				let summary = report.outcome.summary(token, market);
				let block = ConsensusBlock::from_outcome(&report.outcome, summary);
				self.audit
					.record(
						AuditKind::Ai,
						"Consensus",
						format!(
							"{} ({} agreement, {} rounds)",
							block.signal, block.agreement, block.rounds
						),
					)
					.await;
				(
					block,
					AnalysesByRound {
						round_1: report.round_1,
						round_2: report.round_2,
					},
				)
			}
			Err(e) => {
				tracing::error!(error = %e, "Consensus failed, serving market summary");
				let summary = format!(
					"{}: {} at ${}, {} {:.2}%",
					market.source,
					token,
					market.price,
					market.trend(),
					market.change.abs()
				);
				(ConsensusBlock::degraded(summary), AnalysesByRound::default())
			}
		}
	}
}

/// Upper-cases a ticker, falling back to the default for blank input.
pub fn normalize_token(token: &str) -> String {
	let trimmed = token.trim();
	if trimmed.is_empty() {
		DEFAULT_TOKEN.to_string()
	} else {
		trimmed.to_uppercase()
	}
}
