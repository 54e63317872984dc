//! Models for the fusion engine

pub mod fusion;

pub use fusion::{
    AnalysisScope, ClientProfile, Confidence, ConsensusStrength, ConsensusSummary, DocumentRef,
    FusionFailure, FusionMeta, FusionReport, FusionRequest, FusionResult, FusionRunResult,
    GrowthOpportunity, InvestorAngle, ProviderCall, ProviderKind, ProviderOutcome,
    ProviderResponse, RankedInsight, RawInvestorAngle, RawOpportunity, RawRisk, RiskAssessment,
};

use std::sync::Arc;

use emma_config::AppConfig;

use crate::services::AiProvider;

/// Application state
pub struct AppState {
    pub providers: Vec<Arc<dyn AiProvider>>,
    pub config: AppConfig,
}
