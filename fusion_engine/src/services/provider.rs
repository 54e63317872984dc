//! Provider seam for the fusion fan-out.
//!
//! Every AI provider implements [`AiProvider`]: the real Gemini client as
//! well as the fixed fixtures standing in for integrations not wired up yet.
//! The fusion service only sees this trait, so swapping a fixture for a real
//! HTTP-backed client changes nothing downstream.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ProviderKind, ProviderResponse};

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Which provider this is, for attribution in merged results.
    fn kind(&self) -> ProviderKind;

    /// Run the analysis prompt and return the provider's best-effort response.
    ///
    /// Errors are isolated by the caller; a failure here never aborts the
    /// other providers in the fan-out.
    async fn analyze(&self, prompt: &str) -> Result<ProviderResponse>;
}
