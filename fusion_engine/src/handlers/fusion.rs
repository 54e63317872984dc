//! Fusion Analysis Handlers
//!
//! HTTP endpoints for the fusion engine:
//! - POST /api/fusion/analyze - Run a multi-provider analysis
//! - POST /api/fusion/report - Run an analysis and render the Markdown report
//! - GET /api/fusion/health - Provider availability

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::models::{AppState, FusionRequest, FusionRunResult};
use crate::services::{FusionService, ReportGenerator};

/// POST /api/fusion/analyze
///
/// Always answers HTTP 200 with the tagged result object; callers branch on
/// the `success` flag rather than the status code.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FusionRequest>,
) -> Json<FusionRunResult> {
    info!(
        "📥 Fusion analyze request: client='{}', scope={}, docs={}",
        request.client.name,
        request.scope,
        request.docs.len()
    );

    let service = FusionService::new(state.providers.clone());
    let result = service
        .run_analysis(&request.client, &request.docs, request.scope, request.top_n)
        .await;

    match &result {
        FusionRunResult::Completed(report) => info!(
            "✅ Fusion analyze complete: {} insights, consensus={}",
            report.fusion.insights.len(),
            report.fusion.consensus.strength,
        ),
        FusionRunResult::Failed(failure) => {
            error!("❌ Fusion analyze failed: {}", failure.error)
        }
    }

    Json(result)
}

/// POST /api/fusion/report
///
/// Runs the analysis and renders the executive Markdown report. Failures come
/// back as the tagged JSON object, same as the analyze endpoint.
pub async fn report(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FusionRequest>,
) -> Response {
    info!(
        "📥 Fusion report request: client='{}', scope={}",
        request.client.name, request.scope
    );

    let service = FusionService::new(state.providers.clone());
    let result = service
        .run_analysis(&request.client, &request.docs, request.scope, request.top_n)
        .await;

    match result {
        FusionRunResult::Completed(report) => {
            let markdown = ReportGenerator::render_markdown(&report);
            info!("✅ Fusion report rendered ({} bytes)", markdown.len());
            (
                [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
                markdown,
            )
                .into_response()
        }
        FusionRunResult::Failed(failure) => {
            error!("❌ Fusion report failed: {}", failure.error);
            Json(FusionRunResult::Failed(failure)).into_response()
        }
    }
}

/// GET /api/fusion/health
///
/// Availability of each configured provider.
pub async fn fusion_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "providers": state
            .providers
            .iter()
            .map(|p| p.kind().as_str())
            .collect::<Vec<_>>(),
        "gemini_configured": state.config.gemini_configured(),
        "timestamp": chrono::Utc::now(),
    }))
}
