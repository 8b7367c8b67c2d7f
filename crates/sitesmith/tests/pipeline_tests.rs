//! End-to-end generation tests driven by an in-process mock provider — no
//! running inference endpoint required.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};

use sitesmith::bundle::fallback_bundle;
use sitesmith::generator::{resolve_bundle, GenerateError, Generator, Outcome};
use sitesmith::provider::{Provider, ProviderError};

// ── Mock provider ────────────────────────────────────────────────────────────

enum Script {
    Text(&'static str),
    Payload(Value),
    RecoverableFailure,
    FatalFailure,
    Unavailable,
}

struct MockProvider {
    script: Script,
    calls: AtomicUsize,
}

impl MockProvider {
    fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, _system: &str, _user: &str) -> Result<Value, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Text(text) => Ok(Value::String(text.to_string())),
            Script::Payload(value) => Ok(value.clone()),
            Script::RecoverableFailure => Err(ProviderError::Timeout("mock timeout".into())),
            Script::FatalFailure => Err(ProviderError::Api {
                status: 500,
                message: "mock backend failure".into(),
            }),
            Script::Unavailable => Err(ProviderError::Unavailable("mock not configured".into())),
        }
    }
}

const BAKERY_PROMPT: &str = "A landing page for a bakery";

// ── Success paths ────────────────────────────────────────────────────────────

#[tokio::test]
async fn fenced_response_resolves_to_embedded_bundle() {
    let provider = MockProvider::new(Script::Text(
        "```json\n{\"html\":\"<main>Bakery</main>\",\"css\":\"main{color:brown}\",\"js\":\"\"}\n```",
    ));
    let generator = Generator::new(provider);

    let generation = generator.generate(BAKERY_PROMPT).await.unwrap();
    assert_eq!(generation.outcome, Outcome::Direct);
    assert_eq!(generation.bundle.html, "<main>Bakery</main>");
    assert_eq!(generation.bundle.css, "main{color:brown}");
    assert_eq!(generation.bundle.js, "");
    assert_ne!(generation.bundle, *fallback_bundle());
    assert_eq!(generation.prompt, BAKERY_PROMPT);
}

#[tokio::test]
async fn message_wrapped_payload_is_unwrapped() {
    let provider = MockProvider::new(Script::Payload(json!({
        "message": {
            "role": "assistant",
            "content": "{\"html\":\"<p>a</p>\",\"css\":\"p{}\",\"js\":\"\"}"
        }
    })));
    let generator = Generator::new(provider);

    let generation = generator.generate(BAKERY_PROMPT).await.unwrap();
    assert_eq!(generation.outcome, Outcome::Direct);
    assert_eq!(generation.bundle.html, "<p>a</p>");
}

#[tokio::test]
async fn prose_wrapped_response_is_recovered() {
    let provider = MockProvider::new(Script::Text(
        "Here you go! {\"html\":\"<p>a</p>\",\"css\":\"p{color:red}\",\"js\":\"\"} hope it helps",
    ));
    let generator = Generator::new(provider);

    let generation = generator.generate(BAKERY_PROMPT).await.unwrap();
    assert_eq!(generation.outcome, Outcome::Recovered);
    assert_eq!(generation.bundle.css, "p{color:red}");
}

#[tokio::test]
async fn unknown_payload_shape_falls_back() {
    let provider = MockProvider::new(Script::Payload(json!({"choices": []})));
    let generator = Generator::new(provider);

    let generation = generator.generate(BAKERY_PROMPT).await.unwrap();
    assert_eq!(generation.outcome, Outcome::Fallback);
    assert_eq!(generation.bundle, *fallback_bundle());
}

// ── Failure classification ───────────────────────────────────────────────────

#[tokio::test]
async fn recoverable_failure_resolves_to_fallback() {
    let provider = MockProvider::new(Script::RecoverableFailure);
    let generator = Generator::new(provider);

    let generation = generator.generate(BAKERY_PROMPT).await.unwrap();
    assert_eq!(generation.outcome, Outcome::Fallback);
    assert_eq!(generation.bundle, *fallback_bundle());
    assert!(generation.raw_response.is_empty());
}

#[tokio::test]
async fn fatal_failure_propagates() {
    let provider = MockProvider::new(Script::FatalFailure);
    let generator = Generator::new(provider);

    let err = generator.generate(BAKERY_PROMPT).await.unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Provider(ProviderError::Api { status: 500, .. })
    ));
}

#[tokio::test]
async fn unavailable_provider_propagates() {
    let provider = MockProvider::new(Script::Unavailable);
    let generator = Generator::new(provider);

    let err = generator.generate(BAKERY_PROMPT).await.unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Provider(ProviderError::Unavailable(_))
    ));
}

// ── Prompt bounds ────────────────────────────────────────────────────────────

#[tokio::test]
async fn invalid_prompt_rejected_before_provider_call() {
    let provider = MockProvider::new(Script::Text("never reached"));
    let generator = Generator::new(provider);

    let err = generator.generate("short").await.unwrap_err();
    assert!(matches!(err, GenerateError::PromptTooShort));

    let long = "x".repeat(2001);
    let err = generator.generate(&long).await.unwrap_err();
    assert!(matches!(err, GenerateError::PromptTooLong));
}

#[tokio::test]
async fn provider_untouched_for_invalid_prompt() {
    let probe = MockProvider::new(Script::Text("unused"));
    let generator = Generator::new(&probe);

    let _ = generator.generate("short").await;
    let _ = generator.generate(&"x".repeat(2001)).await;
    assert_eq!(probe.call_count(), 0);
}

// ── Totality ─────────────────────────────────────────────────────────────────

#[test]
fn pipeline_is_total_over_adversarial_input() {
    let inputs = [
        "",
        "   \n\t  ",
        "not json at all",
        "{{{{{{",
        "}}}}}}",
        "{\"html\":",
        "null",
        "42",
        "\"just a string\"",
        "[\"html\",\"css\",\"js\"]",
        "{\"html\":\"a\",\"css\":\"b\"}",
        "{\"html\":\"\",\"css\":\"body{}\",\"js\":\"\"}",
        "```json\n```",
        "```json\n{\"html\": 42, \"css\": true, \"js\": null}\n```",
        "héllo wörld \u{1F980} {\"broken\": ",
    ];

    for input in inputs {
        let (bundle, _) = resolve_bundle(input);
        assert!(
            !bundle.html.trim().is_empty(),
            "html empty for input {input:?}"
        );
        assert!(
            !bundle.css.trim().is_empty(),
            "css empty for input {input:?}"
        );
    }
}

#[test]
fn valid_input_survives_totality_check_unreplaced() {
    let (bundle, outcome) =
        resolve_bundle("{\"html\":\"<p>a</p>\",\"css\":\"p{}\",\"js\":\"alert(1)\"}");
    assert_eq!(outcome, Outcome::Direct);
    assert_eq!(bundle.js, "alert(1)");
    assert_ne!(bundle, *fallback_bundle());
}
