use anyhow::Result;
use async_trait::async_trait;

use crate::types::GenerationRequest;

/// Text-generation backend. Returns the raw output for one request, which
/// may echo the prompt before the continuation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
