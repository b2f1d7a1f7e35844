//! GeminiBackend -- concrete [`GenerationBackend`] for the Gemini API.
//!
//! Sends full conversation transcripts to `models/{model}:generateContent`
//! and exposes `models/{model}:countTokens` for token estimates.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};

use fixwise_core::gateway::{GeneratedReply, GenerationBackend};
use fixwise_types::error::{ConfigError, GatewayError};
use fixwise_types::turn::{Part, Turn};

use super::types::{
    CountTokensRequest, CountTokensResponse, GeminiContent, GeminiPart, GenerateContentRequest,
    GenerateContentResponse, InlineData,
};

/// System instruction sent with every generation request.
const SYSTEM_INSTRUCTION: &str = "You are an expert home appliance repair \
technician. Help the user diagnose and fix problems with their appliance. \
Ask clarifying questions about the make, model, and symptoms when needed, \
walk through checks in order of likelihood and safety, and say clearly when \
a repair requires a qualified professional.";

/// Gemini generation backend.
///
/// # API Key Security
///
/// The key is stored as a [`SecretString`] and only exposed when building
/// the request header. It never appears in Debug output or tracing logs.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    system_instruction: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Gemini API key wrapped in SecretString
    /// * `model` - Model identifier (e.g., "gemini-2.0-flash")
    pub fn new(api_key: SecretString, model: String) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300)) // long generations
            .build()
            .map_err(|e| ConfigError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
        })
    }

    /// The model this backend targets.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Replace the default system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    fn url(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, self.model, method)
    }

    /// Convert domain turns into the Gemini wire format.
    fn to_request(&self, turns: &[Turn]) -> GenerateContentRequest {
        let contents = turns
            .iter()
            .map(|turn| GeminiContent {
                role: Some(turn.role.to_string()),
                parts: turn
                    .parts
                    .iter()
                    .map(|part| match part {
                        Part::Text(text) => GeminiPart::Text { text: text.clone() },
                        Part::InlineMedia { mime_type, data } => GeminiPart::InlineData {
                            inline_data: InlineData {
                                mime_type: mime_type.clone(),
                                data: BASE64.encode(data),
                            },
                        },
                    })
                    .collect(),
            })
            .collect();

        GenerateContentRequest {
            system_instruction: Some(GeminiContent::text_only(self.system_instruction.clone())),
            contents,
        }
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .client
            .post(self.url(method))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Invocation(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => GatewayError::AuthenticationFailed,
                429 => GatewayError::RateLimited,
                _ => GatewayError::Invocation(format!("HTTP {status}: {error_body}")),
            });
        }

        Ok(response)
    }
}

// GeminiBackend intentionally does NOT derive Debug, so the SecretString
// field can never be printed through it.

impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, turns: &[Turn]) -> Result<GeneratedReply, GatewayError> {
        let body = self.to_request(turns);
        let response = self.post_json("generateContent", &body).await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Deserialization(format!("failed to parse response: {e}")))?;

        let text = parsed
            .first_candidate_text()
            .ok_or_else(|| GatewayError::Invocation("response contained no text".to_string()))?;

        Ok(GeneratedReply { text })
    }

    async fn count_tokens(&self, content: &str) -> Result<u32, GatewayError> {
        let body = CountTokensRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart::Text {
                    text: content.to_string(),
                }],
            }],
        };
        let response = self.post_json("countTokens", &body).await?;

        let parsed: CountTokensResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Deserialization(format!("failed to parse response: {e}")))?;

        Ok(parsed.total_tokens)
    }
}
