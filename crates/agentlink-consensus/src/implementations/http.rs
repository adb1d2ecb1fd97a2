//! OpenAI-compatible chat completion client.
//!
//! Works against any endpoint implementing `POST /chat/completions` with
//! bearer authentication (Groq by default).

use crate::{CompletionError, CompletionInterface, CompletionRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP completion client.
pub struct HttpCompletionClient {
	client: Client,
	api_url: String,
	api_key: String,
}

impl HttpCompletionClient {
	pub fn new(api_url: &str, api_key: &str, timeout: Duration) -> Result<Self, CompletionError> {
		let client = Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| CompletionError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			api_url: api_url.to_string(),
			api_key: api_key.to_string(),
		})
	}
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
	model: &'a str,
	messages: Vec<Message<'a>>,
	temperature: f32,
	max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
	role: &'a str,
	content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
	choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
	message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
	content: Option<String>,
}

#[async_trait]
impl CompletionInterface for HttpCompletionClient {
	async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
		let body = ChatCompletionRequest {
			model: &request.model,
			messages: vec![Message {
				role: "user",
				content: &request.prompt,
			}],
			temperature: request.temperature,
			max_tokens: request.max_tokens,
		};

		let response = self
			.client
			.post(&self.api_url)
			.header("Authorization", format!("Bearer {}", self.api_key))
			.json(&body)
			.send()
			.await
			.map_err(|e| CompletionError::Network(format!("HTTP request failed: {}", e)))?;

		let status = response.status();
		if !status.is_success() {
			let error_text = response
				.text()
				.await
				.unwrap_or_else(|_| "Unknown error".into());
			return Err(CompletionError::Api(format!("{}: {}", status, error_text)));
		}

		let parsed: ChatCompletionResponse = response
			.json()
			.await
			.map_err(|e| CompletionError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

		let choice = parsed
			.choices
			.into_iter()
			.next()
			.ok_or_else(|| CompletionError::InvalidResponse("No choices returned".into()))?;

		Ok(choice.message.content.unwrap_or_default())
	}
}
