//! Prompt-to-website generation pipeline.
//!
//! Turns an unstructured, possibly malformed model response into a validated
//! `{html, css, js}` bundle, guaranteeing downstream consumers never see a
//! partial, mistyped, or empty result.
//!
//! Pipeline: provider response → [`extract::normalize`] →
//! [`extract::extract_candidate`] (direct parse, balanced-brace scan,
//! field-level recovery — first success wins) → [`bundle::validate_candidate`]
//! (any violation substitutes the fallback bundle).
//!
//! Around the core: an OpenAI-compatible [`provider::HttpProvider`], a
//! JSON-file [`store::ProjectStore`], and a zip [`export`] routine.

pub mod bundle;
pub mod config;
pub mod export;
pub mod extract;
pub mod generator;
pub mod prompts;
pub mod provider;
pub mod store;

pub use bundle::{fallback_bundle, CodeBundle};
pub use config::Config;
pub use generator::{resolve_bundle, GenerateError, Generation, Generator, Outcome};
pub use provider::{check_endpoint, HttpProvider, Provider, ProviderError, ResponseShape};
pub use store::{Project, ProjectStore};
