//! Google Gemini API Client Implementation
//!
//! This module implements [`AiService`] against the Gemini `generateContent`
//! endpoint. The request carries a JSON response schema so the model is
//! constrained to the [`RegexSolution`] shape.

use super::{utils, AiConfig, AiError, AiResult, AiService, RegexSolution};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info};

/// Fixed instruction sent with every generation request
const SYSTEM_INSTRUCTION: &str = r#"You are an expert C# developer specializing in regular expressions.
Your goal is to accept a natural language requirement and convert it into a robust C# regex solution.

Respond with a JSON object of this exact shape:
{
  "pattern": "The raw regex pattern string",
  "csharp_code": "A complete, runnable C# code snippet demonstrating the usage",
  "explanation": "A concise explanation of how the regex works",
  "preview_pattern": "A pattern compatible with a linear-time regex engine (no lookaround, no backreferences) if possible, or null if C# specific features are essentially required"
}

If the user's request is ambiguous (e.g. "three +" but implies "last +"), infer the most logical general rule (e.g. "greedy match to last +")."#;

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: AiConfig,
    client: Client,
    base_url: String,
}

/// Gemini API request format
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

/// Gemini content structure
#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn from_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![GeminiPart { text: text.into() }],
        }
    }
}

/// Gemini content part
#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

/// Gemini generation configuration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    response_mime_type: String,
    response_schema: serde_json::Value,
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

/// Gemini candidate response
#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

/// Gemini response content
#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

/// Gemini response part
#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: String,
}

/// Gemini usage metadata
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
    #[serde(default)]
    total_token_count: Option<u32>,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// Fails with [`AiError::AuthenticationError`] before any network call
    /// when the credential is absent.
    pub fn new(config: AiConfig) -> AiResult<Self> {
        if config.api_key.is_empty() {
            return Err(AiError::AuthenticationError);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(AiError::HttpError)?;

        let base_url = "https://generativelanguage.googleapis.com/v1beta/models".to_string();

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    /// JSON schema the model response must conform to
    fn response_schema() -> serde_json::Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "pattern": { "type": "STRING" },
                "csharp_code": { "type": "STRING" },
                "explanation": { "type": "STRING" },
                "preview_pattern": { "type": "STRING", "nullable": true },
            },
            "required": ["pattern", "csharp_code", "explanation"],
        })
    }

    /// Send one generation request, returning the raw response text
    async fn send_request(&self, user_prompt: &str) -> AiResult<String> {
        let request_body = GeminiRequest {
            contents: vec![GeminiContent::from_text(user_prompt)],
            system_instruction: Some(GeminiContent::from_text(SYSTEM_INSTRUCTION)),
            generation_config: Some(GeminiGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
                response_mime_type: "application/json".to_string(),
                response_schema: Self::response_schema(),
            }),
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.config.model, self.config.api_key
        );

        debug!(
            "Sending request to Gemini API: {}",
            url.replace(&self.config.api_key, "***")
        );

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(AiError::HttpError)?;

        let status = response.status();
        let response_text = response.text().await.map_err(AiError::HttpError)?;

        debug!("Gemini API response status: {}", status);

        if !status.is_success() {
            error!("Gemini API error: {} - {}", status, response_text);
            return Err(AiError::ApiError(format!(
                "HTTP {}: {}",
                status, response_text
            )));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!("Failed to parse Gemini response: {}", e);
                AiError::JsonError(e)
            })?;

        let candidate = gemini_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AiError::InvalidResponse("No candidates in response".to_string()))?;

        let part = candidate
            .content
            .parts
            .into_iter()
            .next()
            .ok_or_else(|| AiError::InvalidResponse("No parts in candidate".to_string()))?;

        if let Some(usage) = &gemini_response.usage_metadata {
            info!(
                "Gemini API usage - Prompt: {:?} tokens, Response: {:?} tokens, Total: {:?} tokens",
                usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
            );
        }

        Ok(part.text)
    }

    /// Parse the model response into a [`RegexSolution`]
    fn parse_solution(&self, raw_response: &str) -> AiResult<RegexSolution> {
        debug!("Parsing Gemini response ({} bytes)", raw_response.len());

        let cleaned = utils::clean_model_response(raw_response);
        let parsed = utils::parse_structured_response(&cleaned)?;

        let solution: RegexSolution =
            serde_json::from_value(parsed).map_err(AiError::JsonError)?;

        for (field, value) in [
            ("pattern", &solution.pattern),
            ("csharp_code", &solution.csharp_code),
            ("explanation", &solution.explanation),
        ] {
            if value.trim().is_empty() {
                return Err(AiError::InvalidResponse(format!(
                    "Required field '{}' is empty",
                    field
                )));
            }
        }

        Ok(solution)
    }
}

#[async_trait::async_trait]
impl AiService for GeminiClient {
    async fn generate_solution(&self, prompt: &str) -> AiResult<RegexSolution> {
        info!("Generating regex solution ({} char prompt)", prompt.len());

        let raw_response = self.send_request(prompt).await?;
        let solution = self.parse_solution(&raw_response)?;

        info!(
            "Generation completed, preview pattern available: {}",
            solution.preview_pattern.is_some()
        );

        Ok(solution)
    }

    fn config(&self) -> &AiConfig {
        &self.config
    }
}
