use std::time::Duration;

use reqwest::Client;

/// Placeholder value shipped in .env templates; treated the same as unset.
const API_KEY_PLACEHOLDER: &str = "your_gemini_api_key_here";

#[derive(Clone)]
pub struct AppConfig {
    pub http_client: Client,
    pub host: String,
    pub port: u16,
    pub gemini_endpoint: String,
    pub gemini_api_key: Option<String>,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("FUSION_ENGINE_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(3017);

        let host = std::env::var("FUSION_ENGINE_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string());

        let gemini_endpoint = std::env::var("GEMINI_API_ENDPOINT").unwrap_or_else(|_| {
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent"
                .to_string()
        });

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty() && k != API_KEY_PLACEHOLDER);

        let request_timeout_secs = std::env::var("GEMINI_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let max_retries = std::env::var("GEMINI_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let retry_delay_ms = std::env::var("GEMINI_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(2000);

        Self {
            http_client: Client::new(),
            host,
            port,
            gemini_endpoint,
            gemini_api_key,
            request_timeout: Duration::from_secs(request_timeout_secs),
            max_retries,
            retry_delay: Duration::from_millis(retry_delay_ms),
        }
    }

    /// Whether a usable Gemini key is present (placeholder keys don't count).
    pub fn gemini_configured(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}
