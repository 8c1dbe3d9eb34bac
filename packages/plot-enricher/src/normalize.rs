//! Synopsis normalization through a generative text service.
//!
//! The generator is asked to rewrite an accepted candidate passage into a
//! 400-500 word synopsis, or answer with [`NO_PLOT_SENTINEL`] when the
//! passage is not plot content. The reply is scrubbed down to plain prose and
//! length-gated before it is trusted.

use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

use crate::error::GenerationError;
use crate::retry::RetryPolicy;
use crate::traits::{Sleeper, TextGenerator};
use crate::validation::char_len;

/// Reply meaning "the source text holds no usable plot".
pub const NO_PLOT_SENTINEL: &str = "NO_PLOT_FOUND";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

static RE_CONTROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x1f\x7f-\x9f]").unwrap());

static RE_LITERAL_ESCAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\[nrt]").unwrap());

static RE_UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^\w\s.,!?;:()\-'"]+"#).unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Build the normalization prompt.
pub fn build_prompt(candidate: &str, title: &str, year: &str, existing_plot: &str) -> String {
    format!(
        r#"Write a detailed plot summary for the movie "{title} ({year})" using only the source text below.

Known short plot: {existing_plot}

Source text: {candidate}

Only use the source text if it actually describes the movie's plot.

Respond with exactly "{NO_PLOT_SENTINEL}" if the source text is any of:
- a security or block page (Cloudflare, access blocked, Ray ID)
- an error page (404, 403, server errors)
- a cookie or privacy notice
- advertising or subscription content
- website navigation or interface text
- anything not about this movie

Otherwise write a 400-500 word plot summary. Return only the summary, with no explanation, analysis or commentary.

Plot Summary:"#
    )
}

/// Scrub generated text down to plain prose.
///
/// Control characters and literal `\n`/`\r`/`\t` sequences become spaces,
/// characters outside words, whitespace and basic punctuation become
/// spaces, and whitespace runs collapse to one space.
pub fn clean_generated_text(text: &str) -> String {
    let text = RE_CONTROL.replace_all(text, " ");
    let text = RE_LITERAL_ESCAPE.replace_all(&text, " ");
    let text = RE_UNSAFE_CHARS.replace_all(&text, " ");
    RE_WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Rewrites candidate passages into clean synopses.
pub struct TextNormalizer {
    generator: Arc<dyn TextGenerator>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetryPolicy,
    min_chars: usize,
}

impl TextNormalizer {
    pub fn new(generator: Arc<dyn TextGenerator>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            generator,
            sleeper,
            retry: RetryPolicy::default(),
            min_chars: 300,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Minimum length of an acceptable synopsis.
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Normalize a candidate passage.
    ///
    /// Returns `None` on the sentinel reply, on exhausted or permanent
    /// generation errors, and when the cleaned text is too short.
    pub async fn normalize(
        &self,
        candidate: &str,
        title: &str,
        year: &str,
        existing_plot: &str,
    ) -> Option<String> {
        let prompt = build_prompt(candidate, title, year, existing_plot);

        let reply = match self
            .retry
            .run(
                self.sleeper.as_ref(),
                GenerationError::is_transient,
                |_| self.generator.generate(&prompt),
            )
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(title = %title, error = %e, "Normalization failed");
                return None;
            }
        };

        if reply.contains(NO_PLOT_SENTINEL) {
            info!(title = %title, "Generator found no plot in source text");
            return None;
        }

        let cleaned = clean_generated_text(&reply);
        let length = char_len(&cleaned);
        if length < self.min_chars {
            debug!(title = %title, chars = length, "Normalized synopsis too short");
            return None;
        }

        Some(cleaned)
    }
}

/// [`TextGenerator`] backed by the OpenAI chat completions API.
pub struct OpenAIGenerator {
    client: OpenAIClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIGenerator {
    pub fn new(client: OpenAIClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 1000,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAIGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = ChatRequest::new(&self.model)
            .message(Message::user(prompt))
            .temperature(self.temperature)
            .token_limit(self.max_tokens);

        let response = self.client.chat_completion(request).await?;
        Ok(response.content.trim().to_string())
    }
}
