//! Fixed-fixture providers.
//!
//! Grok and ChatGPT are not integrated yet; until they are, each is a
//! [`FixedFixture`] returning a canned analysis through the same
//! [`AiProvider`] seam the real clients use.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::models::{ProviderKind, ProviderResponse, RawOpportunity, RawRisk};
use crate::services::AiProvider;

/// A provider that always returns the same response.
pub struct FixedFixture {
    kind: ProviderKind,
    response: ProviderResponse,
}

impl FixedFixture {
    pub fn new(kind: ProviderKind, response: ProviderResponse) -> Self {
        Self { kind, response }
    }

    /// The canned response itself, for callers that don't need the trait.
    pub fn into_response(self) -> ProviderResponse {
        self.response
    }

    /// Canned Grok analysis.
    pub fn grok() -> Self {
        let response = ProviderResponse {
            insights: vec![
                "Strong regional market presence in North Africa".to_string(),
                "Well-positioned for emerging market growth".to_string(),
                "Established distribution network advantage".to_string(),
            ],
            risks: vec![
                raw_risk("market", "medium", "Currency volatility in regional markets"),
                raw_risk("operational", "low", "Supply chain dependencies"),
            ],
            opportunities: vec![
                raw_opportunity("expansion", "high", "Sub-Saharan Africa market entry"),
                raw_opportunity("digital", "medium", "E-commerce channel development"),
            ],
            investor_angles: Vec::new(),
        };

        Self::new(ProviderKind::Grok, response)
    }

    /// Canned ChatGPT analysis.
    pub fn chatgpt() -> Self {
        let response = ProviderResponse {
            insights: vec![
                "Industry leader with strong brand recognition".to_string(),
                "Diversified product portfolio reduces risk".to_string(),
                "Strategic partnerships with key distributors".to_string(),
            ],
            risks: vec![
                raw_risk("regulatory", "medium", "Changing import/export regulations"),
                raw_risk("competitive", "high", "Increasing competition from Asian imports"),
            ],
            opportunities: vec![
                raw_opportunity("innovation", "high", "Sustainable materials adoption"),
                raw_opportunity("partnership", "high", "Strategic alliances with construction firms"),
            ],
            investor_angles: Vec::new(),
        };

        Self::new(ProviderKind::ChatGpt, response)
    }
}

#[async_trait]
impl AiProvider for FixedFixture {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn analyze(&self, _prompt: &str) -> Result<ProviderResponse> {
        debug!("🧩 {} call (fixture)", self.kind);
        Ok(self.response.clone())
    }
}

fn raw_risk(risk_type: &str, severity: &str, description: &str) -> RawRisk {
    RawRisk {
        risk_type: Some(risk_type.to_string()),
        severity: Some(severity.to_string()),
        description: Some(description.to_string()),
        mitigation: None,
    }
}

fn raw_opportunity(category: &str, potential: &str, description: &str) -> RawOpportunity {
    RawOpportunity {
        category: Some(category.to_string()),
        potential: Some(potential.to_string()),
        description: Some(description.to_string()),
        timeframe: None,
        investment: None,
    }
}
