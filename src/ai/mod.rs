//! AI pattern generation services
//!
//! Narrow interface over the hosted generative model that converts a natural
//! language matching requirement into a [`RegexSolution`]. The concrete
//! Gemini implementation lives in [`gemini`]; tests substitute a stub so the
//! rest of the system never needs network access.

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default Gemini model
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Configuration for the AI service
///
/// Built once at startup and passed into the client as an explicit value;
/// business logic never reads the environment on its own.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_seconds: u64,
}

impl AiConfig {
    /// Create from environment variables.
    ///
    /// Reads `GEMINI_API_KEY` (may be absent; client construction rejects an
    /// empty key before any network call) and an optional `GEMINI_MODEL`
    /// override.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            max_tokens: Some(2048),
            temperature: Some(0.2),
            timeout_seconds: 30,
        }
    }
}

/// AI service errors
///
/// Everything on the generation path collapses to one user-visible message;
/// the variant only matters for logging.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("API key is missing or empty")]
    AuthenticationError,

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse response JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid response structure: {0}")]
    InvalidResponse(String),
}

/// Result type for AI operations
pub type AiResult<T> = Result<T, AiError>;

/// Structured output of one generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexSolution {
    /// The raw regex pattern string
    pub pattern: String,
    /// A complete, runnable C# snippet demonstrating the pattern
    pub csharp_code: String,
    /// Concise explanation of how the pattern works
    pub explanation: String,
    /// Pattern rewritten for the preview engine's dialect, when expressible
    #[serde(default)]
    pub preview_pattern: Option<String>,
}

/// Unified interface to the pattern generation collaborator
#[async_trait]
pub trait AiService: Send + Sync {
    /// Generate a regex solution from a natural language requirement
    async fn generate_solution(&self, prompt: &str) -> AiResult<RegexSolution>;

    /// Access the active configuration
    fn config(&self) -> &AiConfig;
}

/// Response post-processing helpers shared by service implementations
pub mod utils {
    use super::{AiError, AiResult};

    /// Strip markdown code fences the model occasionally wraps around JSON
    pub fn clean_model_response(raw: &str) -> String {
        let trimmed = raw.trim();
        let opened = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .unwrap_or(trimmed);
        let closed = opened.strip_suffix("```").unwrap_or(opened);
        closed.trim().to_string()
    }

    /// Parse a cleaned response into a JSON value
    pub fn parse_structured_response(cleaned: &str) -> AiResult<serde_json::Value> {
        serde_json::from_str(cleaned).map_err(AiError::JsonError)
    }
}
