//! Fusion Service
//!
//! Main orchestration service that:
//! 1. Validates the client profile
//! 2. Builds the scope-specific prompt
//! 3. Fans out to every AI provider concurrently
//! 4. Merges surviving responses into one ranked consensus result
//!
//! Individual provider failures are isolated: one provider going down never
//! aborts the others or the overall call. The only failure surfaced to the
//! caller is an orchestration-level one, and even that arrives as a tagged
//! result object rather than an error.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use futures::future::join_all;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{
    AnalysisScope, ClientProfile, ConsensusStrength, ConsensusSummary, Confidence, DocumentRef,
    FusionMeta, FusionReport, FusionResult, FusionRunResult, GrowthOpportunity, InvestorAngle,
    ProviderCall, ProviderKind, ProviderOutcome, ProviderResponse, RankedInsight, RiskAssessment,
};
use crate::services::{AiProvider, ContextBuilder};

/// Minimum Jaccard word overlap for two insights to count as the same finding.
const SIMILARITY_THRESHOLD: f64 = 0.6;

type SurvivingResponse<'a> = (ProviderKind, &'a ProviderResponse);

/// Fusion service that orchestrates the provider fan-out and consensus merge
pub struct FusionService {
    providers: Vec<Arc<dyn AiProvider>>,
}

impl FusionService {
    pub fn new(providers: Vec<Arc<dyn AiProvider>>) -> Self {
        Self { providers }
    }

    /// Run a fusion analysis for one client.
    ///
    /// Always returns a tagged result: `{success: true, fusion, meta}` or
    /// `{success: false, error}`. Never panics, never propagates an error.
    pub async fn run_analysis(
        &self,
        client: &ClientProfile,
        docs: &[DocumentRef],
        scope: AnalysisScope,
        top_n: usize,
    ) -> FusionRunResult {
        info!(
            "🧠 Running fusion analysis: client='{}', scope={}, docs={}",
            client.name,
            scope,
            docs.len()
        );

        match self.execute(client, docs, scope, top_n).await {
            Ok(report) => {
                info!(
                    "✅ Fusion complete: {} insights, {} risks, {} opportunities ({} providers)",
                    report.fusion.insights.len(),
                    report.fusion.risks.len(),
                    report.fusion.growth_ops.len(),
                    report.fusion.providers.len(),
                );
                FusionRunResult::Completed(report)
            }
            Err(e) => {
                error!("❌ Fusion analysis failed: {:#}", e);
                FusionRunResult::failed(format!("{e:#}"))
            }
        }
    }

    async fn execute(
        &self,
        client: &ClientProfile,
        docs: &[DocumentRef],
        scope: AnalysisScope,
        top_n: usize,
    ) -> Result<FusionReport> {
        if client.id.trim().is_empty() {
            bail!("client profile is missing an id");
        }
        if client.name.trim().is_empty() {
            bail!("client profile is missing a name");
        }

        let prompt = ContextBuilder::build_prompt(client, docs, scope);
        let calls = self.dispatch(&prompt).await;
        let fusion = Self::fuse_responses(&calls, scope, top_n);

        let meta = FusionMeta {
            run_id: Uuid::new_v4(),
            client_id: client.id.clone(),
            client_name: client.name.clone(),
            scope,
            providers: fusion.providers.clone(),
            timestamp: Utc::now(),
        };

        Ok(FusionReport {
            success: true,
            fusion,
            meta,
        })
    }

    /// Fan out to every provider and wait for all of them, regardless of
    /// individual failures. Each call absorbs its own error into an explicit
    /// `Failed` outcome.
    async fn dispatch(&self, prompt: &str) -> Vec<ProviderCall> {
        let calls = self.providers.iter().map(move |provider| {
            let provider = Arc::clone(provider);
            async move {
                match provider.analyze(prompt).await {
                    Ok(response) => ProviderCall {
                        provider: provider.kind(),
                        outcome: ProviderOutcome::Fulfilled(response),
                    },
                    Err(e) => {
                        warn!("⚠️  {} call failed: {:#}", provider.kind(), e);
                        ProviderCall {
                            provider: provider.kind(),
                            outcome: ProviderOutcome::Failed(format!("{e:#}")),
                        }
                    }
                }
            }
        });

        join_all(calls).await
    }

    /// Merge surviving provider responses into one consensus result.
    ///
    /// Degrades gracefully: zero survivors produce an empty but well-formed
    /// result rather than an error.
    pub fn fuse_responses(
        calls: &[ProviderCall],
        scope: AnalysisScope,
        top_n: usize,
    ) -> FusionResult {
        let surviving: Vec<SurvivingResponse<'_>> = calls
            .iter()
            .filter_map(|call| call.outcome.response().map(|r| (call.provider, r)))
            .collect();

        if surviving.is_empty() {
            return FusionResult::empty();
        }

        let providers: Vec<ProviderKind> = surviving.iter().map(|(kind, _)| *kind).collect();

        // Flatten insights, score each one against every surviving response,
        // then rank by confidence tier and cap.
        let all_insights: Vec<(String, ProviderKind)> = surviving
            .iter()
            .flat_map(|(kind, response)| {
                let kind = *kind;
                response.insights.iter().map(move |text| (text.clone(), kind))
            })
            .collect();

        let mut insights: Vec<RankedInsight> = all_insights
            .iter()
            .map(|(text, kind)| RankedInsight {
                insight: text.clone(),
                confidence: Self::calculate_confidence(text, &surviving),
                sources: vec![*kind],
            })
            .collect();

        insights.sort_by(|a, b| b.confidence.score().cmp(&a.confidence.score()));
        insights.truncate(top_n);

        // Risks and opportunities: concatenate across providers in call
        // order, backfill defaults, truncate.
        let risks: Vec<RiskAssessment> = surviving
            .iter()
            .flat_map(|(kind, response)| {
                let kind = *kind;
                response.risks.iter().map(move |raw| RiskAssessment::from_raw(raw, kind))
            })
            .take(top_n)
            .collect();

        let growth_ops: Vec<GrowthOpportunity> = surviving
            .iter()
            .flat_map(|(kind, response)| {
                let kind = *kind;
                response
                    .opportunities
                    .iter()
                    .map(move |raw| GrowthOpportunity::from_raw(raw, kind))
            })
            .take(top_n)
            .collect();

        // Investor angles only exist in investor scope.
        let investor_angles: Vec<InvestorAngle> = if scope == AnalysisScope::Investor {
            surviving
                .iter()
                .flat_map(|(kind, response)| {
                    let kind = *kind;
                    response
                        .investor_angles
                        .iter()
                        .map(move |raw| InvestorAngle::from_raw(raw, kind))
                })
                .take(top_n)
                .collect()
        } else {
            Vec::new()
        };

        let consensus = ConsensusSummary {
            strength: if surviving.len() >= 2 {
                ConsensusStrength::High
            } else {
                ConsensusStrength::Medium
            },
            provider_count: surviving.len(),
            agreement_score: Self::agreement_score(&surviving),
        };

        FusionResult {
            insights,
            risks,
            growth_ops,
            investor_angles,
            consensus,
            providers,
        }
    }

    /// Confidence tier from cross-provider mention frequency: how many
    /// surviving responses contain an insight similar to this one. The
    /// insight's own response always matches itself, so with three providers
    /// full agreement lands at `high`.
    fn calculate_confidence(text: &str, surviving: &[SurvivingResponse<'_>]) -> Confidence {
        let needle = text.to_lowercase();

        let mentions = surviving
            .iter()
            .filter(|(_, response)| {
                response
                    .insights
                    .iter()
                    .any(|other| Self::similarity(&other.to_lowercase(), &needle) > SIMILARITY_THRESHOLD)
            })
            .count();

        match mentions {
            m if m >= 3 => Confidence::High,
            2 => Confidence::Medium,
            _ => Confidence::Low,
        }
    }

    /// Jaccard index over whitespace-tokenized word sets. No stemming, no
    /// stopword removal; symmetric by construction.
    pub fn similarity(a: &str, b: &str) -> f64 {
        let words_a: HashSet<&str> = a.split_whitespace().collect();
        let words_b: HashSet<&str> = b.split_whitespace().collect();

        if words_a.is_empty() || words_b.is_empty() {
            return 0.0;
        }

        let intersection = words_a.intersection(&words_b).count();
        let union = words_a.union(&words_b).count();

        intersection as f64 / union as f64
    }

    /// Agreement across providers: 1 minus the ratio of unique lowercased
    /// insights to total insights, rounded to two decimals. Below two
    /// survivors the ratio is meaningless, so 0.5 is returned as a sentinel;
    /// two-plus survivors with zero insights score 0.0.
    fn agreement_score(surviving: &[SurvivingResponse<'_>]) -> f64 {
        if surviving.len() < 2 {
            return 0.5;
        }

        let all_insights: Vec<String> = surviving
            .iter()
            .flat_map(|(_, response)| response.insights.iter().map(|i| i.to_lowercase()))
            .collect();

        if all_insights.is_empty() {
            return 0.0;
        }

        let unique: HashSet<&String> = all_insights.iter().collect();
        let ratio = 1.0 - (unique.len() as f64 / all_insights.len() as f64);

        (ratio * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::FixedFixture;
    use anyhow::anyhow;
    use async_trait::async_trait;

    struct FailingProvider(ProviderKind);

    #[async_trait]
    impl AiProvider for FailingProvider {
        fn kind(&self) -> ProviderKind {
            self.0
        }

        async fn analyze(&self, _prompt: &str) -> Result<ProviderResponse> {
            Err(anyhow!("simulated outage"))
        }
    }

    fn make_client() -> ClientProfile {
        ClientProfile {
            id: "c1".to_string(),
            name: "Acme".to_string(),
            industry: "logistics".to_string(),
            country: "Egypt".to_string(),
            website: "unknown".to_string(),
            status: "active".to_string(),
        }
    }

    fn insight_fixture(kind: ProviderKind, insights: &[&str]) -> Arc<dyn AiProvider> {
        Arc::new(FixedFixture::new(
            kind,
            ProviderResponse {
                insights: insights.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
        ))
    }

    fn fulfilled(kind: ProviderKind, response: ProviderResponse) -> ProviderCall {
        ProviderCall {
            provider: kind,
            outcome: ProviderOutcome::Fulfilled(response),
        }
    }

    fn failed(kind: ProviderKind) -> ProviderCall {
        ProviderCall {
            provider: kind,
            outcome: ProviderOutcome::Failed("simulated outage".to_string()),
        }
    }

    #[tokio::test]
    async fn total_outage_degrades_to_empty_result() {
        let service = FusionService::new(vec![
            Arc::new(FailingProvider(ProviderKind::Gemini)),
            Arc::new(FailingProvider(ProviderKind::Grok)),
            Arc::new(FailingProvider(ProviderKind::ChatGpt)),
        ]);

        let result = service
            .run_analysis(&make_client(), &[], AnalysisScope::General, 5)
            .await;

        let report = match result {
            FusionRunResult::Completed(report) => report,
            FusionRunResult::Failed(f) => panic!("total outage must not fail the call: {}", f.error),
        };

        assert!(report.success);
        assert!(report.fusion.insights.is_empty());
        assert!(report.fusion.risks.is_empty());
        assert!(report.fusion.growth_ops.is_empty());
        assert!(report.fusion.investor_angles.is_empty());
        assert!(report.fusion.providers.is_empty());
        assert_eq!(report.fusion.consensus.strength, ConsensusStrength::Medium);
        assert_eq!(report.fusion.consensus.provider_count, 0);
        assert_eq!(report.fusion.consensus.agreement_score, 0.5);
        assert!(report.meta.providers.is_empty());
    }

    #[tokio::test]
    async fn one_failing_provider_does_not_affect_the_others() {
        let service = FusionService::new(vec![
            Arc::new(FailingProvider(ProviderKind::Gemini)),
            Arc::new(FixedFixture::grok()),
            Arc::new(FixedFixture::chatgpt()),
        ]);

        let result = service
            .run_analysis(&make_client(), &[], AnalysisScope::General, 10)
            .await;

        let report = match result {
            FusionRunResult::Completed(report) => report,
            FusionRunResult::Failed(f) => panic!("partial outage must not fail the call: {}", f.error),
        };

        assert_eq!(report.fusion.providers.len(), 2);
        assert_eq!(
            report.fusion.providers,
            vec![ProviderKind::Grok, ProviderKind::ChatGpt]
        );
        assert_eq!(report.fusion.insights.len(), 6);
        assert_eq!(report.fusion.risks.len(), 4);
        assert_eq!(report.fusion.consensus.provider_count, 2);
    }

    #[tokio::test]
    async fn missing_client_id_surfaces_as_tagged_failure() {
        let service = FusionService::new(vec![Arc::new(FixedFixture::grok())]);

        let mut client = make_client();
        client.id = String::new();

        let result = service
            .run_analysis(&client, &[], AnalysisScope::General, 5)
            .await;

        match result {
            FusionRunResult::Failed(failure) => {
                assert!(!failure.success);
                assert!(failure.error.contains("missing an id"));
            }
            FusionRunResult::Completed(_) => panic!("invalid client must not complete"),
        }
    }

    #[test]
    fn every_list_is_capped_at_top_n() {
        let calls = vec![
            fulfilled(ProviderKind::Grok, FixedFixture::grok().into_response()),
            fulfilled(ProviderKind::ChatGpt, FixedFixture::chatgpt().into_response()),
        ];

        let fusion = FusionService::fuse_responses(&calls, AnalysisScope::General, 2);
        assert!(fusion.insights.len() <= 2);
        assert!(fusion.risks.len() <= 2);
        assert!(fusion.growth_ops.len() <= 2);

        let fusion = FusionService::fuse_responses(&calls, AnalysisScope::General, 0);
        assert!(fusion.insights.is_empty());
        assert!(fusion.risks.is_empty());
        assert!(fusion.growth_ops.is_empty());
    }

    #[test]
    fn investor_angles_are_gated_on_scope() {
        let response = ProviderResponse {
            investor_angles: vec![crate::models::RawInvestorAngle {
                aspect: Some("market size".to_string()),
                analysis: Some("Large addressable market".to_string()),
                confidence: Some("high".to_string()),
            }],
            ..Default::default()
        };

        let calls = vec![fulfilled(ProviderKind::Gemini, response)];

        let general = FusionService::fuse_responses(&calls, AnalysisScope::General, 5);
        assert!(general.investor_angles.is_empty());

        let investor = FusionService::fuse_responses(&calls, AnalysisScope::Investor, 5);
        assert_eq!(investor.investor_angles.len(), 1);
        assert_eq!(investor.investor_angles[0].aspect, "market size");
    }

    #[test]
    fn similarity_is_symmetric_and_bounded() {
        let pairs = [
            ("strong regional presence", "regional presence strong"),
            ("currency volatility ahead", "supply chain dependencies"),
            ("", "non empty"),
            ("same words here", "same words here"),
        ];

        for (a, b) in pairs {
            let forward = FusionService::similarity(a, b);
            let backward = FusionService::similarity(b, a);
            assert_eq!(forward, backward, "similarity({a:?}, {b:?}) not symmetric");
            assert!((0.0..=1.0).contains(&forward));
        }

        assert_eq!(
            FusionService::similarity("strong regional presence", "regional presence strong"),
            1.0
        );
        assert_eq!(
            FusionService::similarity("alpha beta", "gamma delta"),
            0.0
        );
    }

    #[test]
    fn confidence_reflects_cross_provider_agreement() {
        let shared = "Strong demand for regional logistics capacity";

        let calls = vec![
            fulfilled(
                ProviderKind::Gemini,
                ProviderResponse {
                    insights: vec![shared.to_string(), "A gemini-only observation".to_string()],
                    ..Default::default()
                },
            ),
            fulfilled(
                ProviderKind::Grok,
                ProviderResponse {
                    insights: vec![shared.to_string()],
                    ..Default::default()
                },
            ),
            fulfilled(
                ProviderKind::ChatGpt,
                ProviderResponse {
                    insights: vec![shared.to_lowercase()],
                    ..Default::default()
                },
            ),
        ];

        let fusion = FusionService::fuse_responses(&calls, AnalysisScope::General, 10);

        let shared_entry = fusion
            .insights
            .iter()
            .find(|i| i.insight == shared)
            .expect("shared insight present");
        assert_eq!(shared_entry.confidence, Confidence::High);

        let solo_entry = fusion
            .insights
            .iter()
            .find(|i| i.insight == "A gemini-only observation")
            .expect("solo insight present");
        assert_eq!(solo_entry.confidence, Confidence::Low);

        // High-confidence entries must rank ahead of low ones.
        let first_low = fusion
            .insights
            .iter()
            .position(|i| i.confidence == Confidence::Low);
        let last_high = fusion
            .insights
            .iter()
            .rposition(|i| i.confidence == Confidence::High);
        if let (Some(low), Some(high)) = (first_low, last_high) {
            assert!(high < low);
        }
    }

    #[test]
    fn agreement_score_sentinel_and_bounds() {
        // Fewer than two survivors: sentinel.
        let solo = vec![fulfilled(
            ProviderKind::Gemini,
            ProviderResponse {
                insights: vec!["Only one voice".to_string()],
                ..Default::default()
            },
        )];
        let fusion = FusionService::fuse_responses(&solo, AnalysisScope::General, 5);
        assert_eq!(fusion.consensus.agreement_score, 0.5);
        assert_eq!(fusion.consensus.strength, ConsensusStrength::Medium);

        // Two survivors, identical insights: half the pool is duplicate.
        let agreeing = vec![
            fulfilled(
                ProviderKind::Gemini,
                ProviderResponse {
                    insights: vec!["Shared view".to_string()],
                    ..Default::default()
                },
            ),
            fulfilled(
                ProviderKind::Grok,
                ProviderResponse {
                    insights: vec!["shared view".to_string()],
                    ..Default::default()
                },
            ),
        ];
        let fusion = FusionService::fuse_responses(&agreeing, AnalysisScope::General, 5);
        assert_eq!(fusion.consensus.agreement_score, 0.5);
        assert_eq!(fusion.consensus.strength, ConsensusStrength::High);

        // Two survivors, fully disjoint insights: zero agreement.
        let disjoint = vec![
            fulfilled(
                ProviderKind::Gemini,
                ProviderResponse {
                    insights: vec!["First view".to_string()],
                    ..Default::default()
                },
            ),
            fulfilled(
                ProviderKind::Grok,
                ProviderResponse {
                    insights: vec!["Second view".to_string()],
                    ..Default::default()
                },
            ),
        ];
        let fusion = FusionService::fuse_responses(&disjoint, AnalysisScope::General, 5);
        assert_eq!(fusion.consensus.agreement_score, 0.0);

        // Two survivors, no insights at all: degenerate ratio guard.
        let empty = vec![
            fulfilled(ProviderKind::Gemini, ProviderResponse::default()),
            fulfilled(ProviderKind::Grok, ProviderResponse::default()),
        ];
        let fusion = FusionService::fuse_responses(&empty, AnalysisScope::General, 5);
        assert_eq!(fusion.consensus.agreement_score, 0.0);
    }

    #[test]
    fn risk_defaults_are_backfilled() {
        let calls = vec![fulfilled(
            ProviderKind::Grok,
            ProviderResponse {
                risks: vec![crate::models::RawRisk::default()],
                ..Default::default()
            },
        )];

        let fusion = FusionService::fuse_responses(&calls, AnalysisScope::Risk, 5);
        let risk = &fusion.risks[0];
        assert_eq!(risk.risk_type, "general");
        assert_eq!(risk.severity, "medium");
        assert_eq!(risk.description, "Risk identified");
        assert_eq!(risk.mitigation, "Assessment pending");
        assert_eq!(risk.source, ProviderKind::Grok);
    }

    #[tokio::test]
    async fn example_scenario_from_the_dashboard() {
        // One Gemini insight plus the two canned fixtures, capped at two.
        let service = FusionService::new(vec![
            insight_fixture(
                ProviderKind::Gemini,
                &["Logistics corridor demand is accelerating in Egypt"],
            ),
            Arc::new(FixedFixture::grok()),
            Arc::new(FixedFixture::chatgpt()),
        ]);

        let result = service
            .run_analysis(&make_client(), &[], AnalysisScope::General, 2)
            .await;

        let report = match result {
            FusionRunResult::Completed(report) => report,
            FusionRunResult::Failed(f) => panic!("scenario must complete: {}", f.error),
        };

        assert_eq!(report.fusion.providers.len(), 3);
        assert_eq!(report.fusion.consensus.strength, ConsensusStrength::High);
        assert_eq!(report.fusion.consensus.provider_count, 3);
        assert_eq!(report.fusion.insights.len(), 2);

        // Ranking is by confidence tier, descending.
        assert!(
            report.fusion.insights[0].confidence.score()
                >= report.fusion.insights[1].confidence.score()
        );
    }
}
