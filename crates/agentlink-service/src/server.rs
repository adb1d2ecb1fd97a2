//! HTTP server for the AgentLink API.
//!
//! Exposes the payment-gated analysis endpoint and the audit log. Requests
//! without a payment proof receive a 402 invoice; rejected proofs receive a
//! 403; everything else is analysed.

use agentlink_config::ApiConfig;
use agentlink_core::AnalysisEngine;
use agentlink_types::{AuditEntry, ErrorResponse, VerificationRequest};
use axum::{
	extract::{Path, State},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Json, Response},
	routing::get,
	Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Payment proof header and its legacy fallback.
const PAYMENT_HASH_HEADERS: [&str; 2] = ["x-payment-hash", "payment-hash"];
/// Payer wallet header and its legacy fallback.
const USER_ADDRESS_HEADERS: [&str; 2] = ["x-user-address", "user-address"];

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the analysis engine for processing requests.
	pub engine: Arc<AnalysisEngine>,
}

/// Builds the application router.
pub fn router(engine: Arc<AnalysisEngine>) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/analyze", get(handle_analyze_default))
				.route("/analyze/{token}", get(handle_analyze)),
		)
		.route("/logs", get(handle_logs))
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive()),
		)
		.with_state(AppState { engine })
}

/// Starts the HTTP server for the API.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<AnalysisEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(engine);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("AgentLink API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Returns the first non-empty value among `names`.
fn header_value(headers: &HeaderMap, names: &[&str]) -> Option<String> {
	names.iter().find_map(|name| {
		headers
			.get(*name)
			.and_then(|value| value.to_str().ok())
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.map(str::to_string)
	})
}

/// Handles GET /api/analyze/{token} requests.
async fn handle_analyze(
	Path(token): Path<String>,
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Response {
	analyze_paid(&state.engine, &token, &headers).await
}

/// Handles GET /api/analyze requests for the default token.
async fn handle_analyze_default(State(state): State<AppState>, headers: HeaderMap) -> Response {
	analyze_paid(&state.engine, "", &headers).await
}

async fn analyze_paid(engine: &AnalysisEngine, token: &str, headers: &HeaderMap) -> Response {
	let Some(transaction_hash) = header_value(headers, &PAYMENT_HASH_HEADERS) else {
		return (StatusCode::PAYMENT_REQUIRED, Json(engine.invoice().await)).into_response();
	};

	let request = VerificationRequest {
		transaction_hash,
		payer_address: header_value(headers, &USER_ADDRESS_HEADERS),
	};
	if !engine.verify_payment(&request).await {
		return (
			StatusCode::FORBIDDEN,
			Json(ErrorResponse {
				error: "Invalid Payment".to_string(),
			}),
		)
			.into_response();
	}

	match engine.analyze(token).await {
		Ok(response) => Json(response).into_response(),
		Err(e) => {
			tracing::warn!("Analysis failed: {}", e);
			(
				StatusCode::SERVICE_UNAVAILABLE,
				Json(ErrorResponse {
					error: e.to_string(),
				}),
			)
				.into_response()
		}
	}
}

/// Handles GET /logs requests.
async fn handle_logs(State(state): State<AppState>) -> Json<Vec<AuditEntry>> {
	Json(state.engine.audit().entries().await)
}
