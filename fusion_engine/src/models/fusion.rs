//! Fusion analysis domain types
//!
//! Request/response shapes for the multi-provider fusion pipeline: client
//! profiles and documents on the way in, ranked consensus results on the way
//! out, and the per-provider intermediate shapes in between.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client profile as registered in the dashboard.
///
/// `id` and `name` are required by the fusion engine; the remaining fields
/// fall back to placeholders so a sparsely registered client still produces
/// a usable prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProfile {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default = "unknown_field")]
    pub industry: String,

    #[serde(default = "unknown_field")]
    pub country: String,

    #[serde(default = "unknown_field")]
    pub website: String,

    #[serde(default = "default_status")]
    pub status: String,
}

fn unknown_field() -> String {
    "unknown".to_string()
}

fn default_status() -> String {
    "active".to_string()
}

impl Default for ClientProfile {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            industry: unknown_field(),
            country: unknown_field(),
            website: unknown_field(),
            status: default_status(),
        }
    }
}

/// Reference to a document attached to a client by the external index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentRef {
    pub title: String,

    #[serde(rename = "type", default)]
    pub doc_type: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub path: String,
}

/// Analysis scope selecting the prompt and which result fields are populated.
///
/// Unrecognized values deserialize to `General`, mirroring the lookup-with-
/// fallback behavior callers rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[serde(from = "String")]
pub enum AnalysisScope {
    General,
    Risk,
    Growth,
    Investor,
}

impl AnalysisScope {
    pub fn parse(value: &str) -> Self {
        match value {
            "risk" => Self::Risk,
            "growth" => Self::Growth,
            "investor" => Self::Investor,
            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Risk => "risk",
            Self::Growth => "growth",
            Self::Investor => "investor",
        }
    }
}

impl Default for AnalysisScope {
    fn default() -> Self {
        Self::General
    }
}

impl From<String> for AnalysisScope {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl fmt::Display for AnalysisScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The AI providers the engine fans out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Grok,
    ChatGpt,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Grok => "grok",
            Self::ChatGpt => "chatgpt",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-effort response shape shared by all providers.
///
/// Nothing here is guaranteed present; every field defaults to empty so a
/// provider that only returns `insights` still merges cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderResponse {
    #[serde(default)]
    pub insights: Vec<String>,

    #[serde(default)]
    pub risks: Vec<RawRisk>,

    #[serde(default, alias = "growth_ops")]
    pub opportunities: Vec<RawOpportunity>,

    #[serde(default)]
    pub investor_angles: Vec<RawInvestorAngle>,
}

/// Risk entry as a provider emits it, before defaults are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRisk {
    #[serde(rename = "type", default)]
    pub risk_type: Option<String>,

    #[serde(default)]
    pub severity: Option<String>,

    #[serde(default, alias = "text")]
    pub description: Option<String>,

    #[serde(default)]
    pub mitigation: Option<String>,
}

/// Opportunity entry as a provider emits it, before defaults are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOpportunity {
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub potential: Option<String>,

    #[serde(default, alias = "text")]
    pub description: Option<String>,

    #[serde(default)]
    pub timeframe: Option<String>,

    #[serde(default)]
    pub investment: Option<String>,
}

/// Investor-angle entry as a provider emits it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInvestorAngle {
    #[serde(default)]
    pub aspect: Option<String>,

    #[serde(default)]
    pub analysis: Option<String>,

    #[serde(default)]
    pub confidence: Option<String>,
}

/// Result of one provider call within the fan-out.
///
/// An explicit sum type so a failed call is distinguishable from a provider
/// that legitimately returned an empty analysis.
#[derive(Debug, Clone)]
pub struct ProviderCall {
    pub provider: ProviderKind,
    pub outcome: ProviderOutcome,
}

#[derive(Debug, Clone)]
pub enum ProviderOutcome {
    Fulfilled(ProviderResponse),
    Failed(String),
}

impl ProviderOutcome {
    pub fn response(&self) -> Option<&ProviderResponse> {
        match self {
            Self::Fulfilled(response) => Some(response),
            Self::Failed(_) => None,
        }
    }
}

/// Cross-provider confidence tier for a single insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Numeric rank used for sorting (high=3, medium=2, low=1).
    pub fn score(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A merged insight with its agreement-based confidence tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedInsight {
    pub insight: String,
    pub confidence: Confidence,
    pub sources: Vec<ProviderKind>,
}

/// Risk entry after merge, with defaults backfilled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    #[serde(rename = "type")]
    pub risk_type: String,
    pub severity: String,
    pub description: String,
    pub mitigation: String,
    pub source: ProviderKind,
}

impl RiskAssessment {
    pub fn from_raw(raw: &RawRisk, source: ProviderKind) -> Self {
        Self {
            risk_type: raw.risk_type.clone().unwrap_or_else(|| "general".to_string()),
            severity: raw.severity.clone().unwrap_or_else(|| "medium".to_string()),
            description: raw
                .description
                .clone()
                .unwrap_or_else(|| "Risk identified".to_string()),
            mitigation: raw
                .mitigation
                .clone()
                .unwrap_or_else(|| "Assessment pending".to_string()),
            source,
        }
    }
}

/// Growth opportunity after merge, with defaults backfilled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthOpportunity {
    pub category: String,
    pub potential: String,
    pub description: String,
    pub timeframe: String,
    pub investment: String,
    pub source: ProviderKind,
}

impl GrowthOpportunity {
    pub fn from_raw(raw: &RawOpportunity, source: ProviderKind) -> Self {
        Self {
            category: raw.category.clone().unwrap_or_else(|| "general".to_string()),
            potential: raw.potential.clone().unwrap_or_else(|| "medium".to_string()),
            description: raw
                .description
                .clone()
                .unwrap_or_else(|| "Opportunity identified".to_string()),
            timeframe: raw
                .timeframe
                .clone()
                .unwrap_or_else(|| "12-24 months".to_string()),
            investment: raw.investment.clone().unwrap_or_else(|| "TBD".to_string()),
            source,
        }
    }
}

/// Investor angle after merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorAngle {
    pub aspect: String,
    pub analysis: String,
    pub confidence: String,
    pub source: ProviderKind,
}

impl InvestorAngle {
    pub fn from_raw(raw: &RawInvestorAngle, source: ProviderKind) -> Self {
        Self {
            aspect: raw.aspect.clone().unwrap_or_else(|| "general".to_string()),
            analysis: raw
                .analysis
                .clone()
                .unwrap_or_else(|| "Analysis pending".to_string()),
            confidence: raw.confidence.clone().unwrap_or_else(|| "medium".to_string()),
            source,
        }
    }
}

/// Coarse two-level consensus indicator (never `low`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusStrength {
    Medium,
    High,
}

impl ConsensusStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ConsensusStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusSummary {
    pub strength: ConsensusStrength,
    pub provider_count: usize,
    pub agreement_score: f64,
}

/// The fused, ranked, deduplicated consensus across all surviving providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionResult {
    pub insights: Vec<RankedInsight>,
    pub risks: Vec<RiskAssessment>,
    pub growth_ops: Vec<GrowthOpportunity>,
    pub investor_angles: Vec<InvestorAngle>,
    pub consensus: ConsensusSummary,
    pub providers: Vec<ProviderKind>,
}

impl FusionResult {
    /// Well-formed empty result for the zero-survivors case.
    pub fn empty() -> Self {
        Self {
            insights: Vec::new(),
            risks: Vec::new(),
            growth_ops: Vec::new(),
            investor_angles: Vec::new(),
            consensus: ConsensusSummary {
                strength: ConsensusStrength::Medium,
                provider_count: 0,
                agreement_score: 0.5,
            },
            providers: Vec::new(),
        }
    }
}

/// Metadata attached to every completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionMeta {
    pub run_id: Uuid,
    pub client_id: String,
    pub client_name: String,
    pub scope: AnalysisScope,
    pub providers: Vec<ProviderKind>,
    pub timestamp: DateTime<Utc>,
}

/// Successful analysis payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionReport {
    pub success: bool,
    pub fusion: FusionResult,
    pub meta: FusionMeta,
}

/// Orchestration-level failure payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionFailure {
    pub success: bool,
    pub error: String,
}

/// Tagged result object returned by the engine.
///
/// The engine never propagates an error past this boundary; callers branch
/// on the `success` flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FusionRunResult {
    Completed(FusionReport),
    Failed(FusionFailure),
}

impl FusionRunResult {
    pub fn completed(fusion: FusionResult, meta: FusionMeta) -> Self {
        Self::Completed(FusionReport {
            success: true,
            fusion,
            meta,
        })
    }

    pub fn failed(error: impl fmt::Display) -> Self {
        Self::Failed(FusionFailure {
            success: false,
            error: error.to_string(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Request body for the analyze/report endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionRequest {
    #[serde(default)]
    pub client: ClientProfile,

    #[serde(default)]
    pub docs: Vec<DocumentRef>,

    #[serde(default)]
    pub scope: AnalysisScope,

    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    5
}
