use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;

use emma_config::AppConfig;
use emma_observability::{info, init_tracing, TracingConfig};

use fusion_engine::handlers::fusion;
use fusion_engine::models::AppState;
use fusion_engine::services::{AiProvider, FixedFixture, GeminiClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize observability with structured logging
    init_tracing(TracingConfig::for_service("fusion-engine").json());

    let config = AppConfig::from_env();

    info!("🚀 [Fusion Engine] Starting on {}:{}", config.host, config.port);

    if config.gemini_configured() {
        info!("🤖 Gemini provider: live API at {}", config.gemini_endpoint);
    } else {
        info!("🤖 Gemini provider: fixture fallback (no API key configured)");
    }
    info!("🧩 Grok provider: fixture");
    info!("🧩 ChatGPT provider: fixture");

    // Provider set: one real client, two fixtures awaiting integration
    let providers: Vec<Arc<dyn AiProvider>> = vec![
        Arc::new(GeminiClient::new(&config)),
        Arc::new(FixedFixture::grok()),
        Arc::new(FixedFixture::chatgpt()),
    ];

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    // Create app state
    let state = Arc::new(AppState { providers, config });

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/fusion/analyze", post(fusion::analyze))
        .route("/api/fusion/report", post(fusion::report))
        .route("/api/fusion/health", get(fusion::fusion_health))
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http());

    info!("✅ Fusion Engine listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "service": "fusion_engine",
        "version": "0.1.0",
        "features": {
            "multi_provider_fanout": true,
            "consensus_scoring": true,
            "insight_ranking": true,
            "scope_prompts": true,
            "markdown_reports": true
        },
        "endpoints": {
            "fusion": ["/api/fusion/analyze", "/api/fusion/report", "/api/fusion/health"]
        }
    }))
}
