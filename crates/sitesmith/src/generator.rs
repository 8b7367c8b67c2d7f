//! Generation orchestrator: prompt bounds, the provider round trip, and the
//! Normalizer → StrategyChain → SchemaValidator pipeline.
//!
//! Failure policy: parsing and validation failures are absorbed into the
//! fallback bundle so a generation always yields something renderable.
//! Provider-call failures are classified — network/timeout/rate-limit also
//! resolve to the fallback, while unavailable/misconfigured and any
//! unclassified failure propagate to the caller.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bundle::{self, CodeBundle};
use crate::extract::{self, Strategy};
use crate::prompts::SYSTEM_PROMPT;
use crate::provider::{Provider, ProviderError, ResponseShape};

/// Minimum trimmed prompt length, in characters.
pub const MIN_PROMPT_CHARS: usize = 10;
/// Maximum raw prompt length, in characters.
pub const MAX_PROMPT_CHARS: usize = 2000;

/// Errors that leave the core. Everything else becomes the fallback bundle.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("prompt must be at least {MIN_PROMPT_CHARS} characters")]
    PromptTooShort,

    #[error("prompt must be less than {MAX_PROMPT_CHARS} characters")]
    PromptTooLong,

    /// A fatal provider failure (unavailable, misconfigured, or any
    /// unclassified API error).
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// How a generation attempt was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The response parsed cleanly as one JSON document.
    Direct,
    /// The bundle was extracted by a repair strategy.
    Recovered,
    /// Extraction or validation failed, or the provider failed recoverably;
    /// the fallback bundle was substituted.
    Fallback,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Recovered => write!(f, "recovered"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// One completed generation attempt.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The trimmed prompt that was sent.
    pub prompt: String,
    /// Raw text extracted from the provider response (empty when the
    /// provider failed recoverably).
    pub raw_response: String,
    /// The validated bundle — always schema-correct.
    pub bundle: CodeBundle,
    pub outcome: Outcome,
}

/// Check prompt bounds; returns the trimmed prompt.
///
/// Runs before any provider call. The two violations carry distinct
/// messages.
pub fn validate_prompt(prompt: &str) -> Result<&str, GenerateError> {
    let trimmed = prompt.trim();
    if trimmed.chars().count() < MIN_PROMPT_CHARS {
        return Err(GenerateError::PromptTooShort);
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(GenerateError::PromptTooLong);
    }
    Ok(trimmed)
}

/// Drives provider calls through the extraction pipeline.
pub struct Generator<P> {
    provider: P,
}

impl<P: Provider> Generator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Generate a website bundle from a prose description.
    ///
    /// The success path always carries a schema-valid bundle; the error path
    /// is reserved for invalid prompts and fatal provider failures.
    pub async fn generate(&self, prompt: &str) -> Result<Generation, GenerateError> {
        let trimmed = validate_prompt(prompt)?;

        let raw = match self.provider.complete(SYSTEM_PROMPT, trimmed).await {
            Ok(payload) => ResponseShape::text_of(payload),
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, "recoverable provider failure, substituting fallback bundle");
                return Ok(Generation {
                    prompt: trimmed.to_string(),
                    raw_response: String::new(),
                    bundle: bundle::fallback_bundle().clone(),
                    outcome: Outcome::Fallback,
                });
            }
            Err(err) => return Err(err.into()),
        };

        let (code, outcome) = resolve_bundle(&raw);
        info!(outcome = %outcome, response_bytes = raw.len(), "generation resolved");
        Ok(Generation {
            prompt: trimmed.to_string(),
            raw_response: raw,
            bundle: code,
            outcome,
        })
    }
}

/// The pure pipeline: Normalizer → StrategyChain → SchemaValidator.
///
/// Total over every string input — never panics, never errors, and always
/// returns a bundle satisfying the schema invariant.
pub fn resolve_bundle(raw: &str) -> (CodeBundle, Outcome) {
    if raw.trim().is_empty() {
        debug!("empty provider text, substituting fallback bundle");
        return (bundle::fallback_bundle().clone(), Outcome::Fallback);
    }

    let normalized = extract::normalize(raw);
    let Some((candidate, strategy)) = extract::extract_candidate(&normalized) else {
        warn!("no structured data in response, substituting fallback bundle");
        return (bundle::fallback_bundle().clone(), Outcome::Fallback);
    };

    match bundle::validate_candidate(Some(&candidate)) {
        Ok(code) => {
            let outcome = match strategy {
                Strategy::Direct => Outcome::Direct,
                Strategy::BalancedScan | Strategy::FieldRecovery => Outcome::Recovered,
            };
            debug!(strategy = %strategy, "candidate accepted");
            (code, outcome)
        }
        Err(reason) => {
            warn!(%reason, "candidate failed schema validation, substituting fallback bundle");
            (bundle::fallback_bundle().clone(), Outcome::Fallback)
        }
    }
}
