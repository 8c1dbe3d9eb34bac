//! Text generation capability.
//!
//! Prompt in, text out. The normalizer owns prompt construction and output
//! cleanup; implementations only move text over the wire.

use async_trait::async_trait;

use crate::error::GenerationError;

/// A generative text service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete a prompt.
    ///
    /// Errors are classified so the retry policy can tell a rate limit from
    /// a bad credential.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt).await
    }
}
