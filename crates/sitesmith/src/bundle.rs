//! Code bundle contract and fail-closed schema validation.
//!
//! Every generation attempt must resolve to a `CodeBundle` before anything
//! downstream (preview, persistence, export) sees it. Candidates that fail
//! validation are replaced by the fallback bundle — callers never receive a
//! partial or mistyped result.
//!
//! ## Bundle invariant
//!
//! ```text
//! CodeBundle {
//!     html: String,   // trimmed, non-empty
//!     css:  String,   // trimmed, non-empty
//!     js:   String,   // may be empty
//! }
//! ```

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// The three required bundle keys, in canonical order.
pub const REQUIRED_KEYS: [&str; 3] = ["html", "css", "js"];

/// The validated `{html, css, js}` triple — the pipeline's sole output type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBundle {
    pub html: String,
    pub css: String,
    pub js: String,
}

/// Why a candidate was rejected by the schema validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaError {
    /// No extraction strategy produced a candidate at all.
    NoStructuredData,
    /// Candidate exists but is not a keyed object.
    NotAnObject,
    /// A required key is absent.
    MissingKey(&'static str),
    /// A required key holds a non-string value.
    WrongType(&'static str),
    /// `html` or `css` is empty after trimming.
    EmptyRequiredField(&'static str),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoStructuredData => write!(f, "no structured data in response"),
            Self::NotAnObject => write!(f, "candidate is not a keyed object"),
            Self::MissingKey(key) => write!(f, "missing key \"{key}\""),
            Self::WrongType(key) => write!(f, "key \"{key}\" is not a string"),
            Self::EmptyRequiredField(key) => write!(f, "key \"{key}\" is empty"),
        }
    }
}

/// Validate a candidate against the bundle schema.
///
/// Successful validation returns the candidate's field values unchanged — no
/// re-encoding. Any violation (including an absent candidate) is an error the
/// caller resolves to the fallback bundle; this function never panics.
pub fn validate_candidate(candidate: Option<&Value>) -> Result<CodeBundle, SchemaError> {
    let value = candidate.ok_or(SchemaError::NoStructuredData)?;
    let object = value.as_object().ok_or(SchemaError::NotAnObject)?;

    let mut bundle = CodeBundle {
        html: String::new(),
        css: String::new(),
        js: String::new(),
    };
    for key in REQUIRED_KEYS {
        let field = match object.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(SchemaError::WrongType(key)),
            None => return Err(SchemaError::MissingKey(key)),
        };
        match key {
            "html" => bundle.html = field,
            "css" => bundle.css = field,
            _ => bundle.js = field,
        }
    }

    if bundle.html.trim().is_empty() {
        return Err(SchemaError::EmptyRequiredField("html"));
    }
    if bundle.css.trim().is_empty() {
        return Err(SchemaError::EmptyRequiredField("css"));
    }
    Ok(bundle)
}

/// Validate a candidate, substituting the fallback bundle on any violation.
pub fn resolve(candidate: Option<&Value>) -> CodeBundle {
    match validate_candidate(candidate) {
        Ok(bundle) => bundle,
        Err(reason) => {
            warn!(%reason, "candidate rejected, substituting fallback bundle");
            fallback_bundle().clone()
        }
    }
}

/// The process-wide fallback bundle: a complete placeholder site.
///
/// Built once, never mutated, safe to share by reference across concurrent
/// generation calls.
pub fn fallback_bundle() -> &'static CodeBundle {
    static FALLBACK: OnceLock<CodeBundle> = OnceLock::new();
    FALLBACK.get_or_init(|| CodeBundle {
        html: FALLBACK_HTML.to_string(),
        css: FALLBACK_CSS.to_string(),
        js: FALLBACK_JS.to_string(),
    })
}

const FALLBACK_HTML: &str = r##"<header class="hero">
    <nav class="navbar">
        <div class="logo">Your Website</div>
        <ul class="nav-links">
            <li><a href="#home">Home</a></li>
            <li><a href="#about">About</a></li>
            <li><a href="#contact">Contact</a></li>
        </ul>
    </nav>
    <div class="hero-content">
        <h1>Welcome to Your Website</h1>
        <p>We couldn't generate a custom website at this time. Please try again.</p>
        <a href="#contact" class="cta-button">Get Started</a>
    </div>
</header>
<main>
    <section id="about" class="section">
        <h2>About Us</h2>
        <p>This is a placeholder section. Try generating again with a more detailed prompt.</p>
    </section>
    <section id="contact" class="section">
        <h2>Contact</h2>
        <p>Get in touch with us for more information.</p>
    </section>
</main>
<footer>
    <p>&copy; 2024 Your Website. All rights reserved.</p>
</footer>"##;

const FALLBACK_CSS: &str = r#":root {
    --primary: #2563eb;
    --secondary: #1e40af;
    --background: #f8fafc;
    --text: #1e293b;
    --white: #ffffff;
}

* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: 'Segoe UI', system-ui, sans-serif;
    background-color: var(--background);
    color: var(--text);
    line-height: 1.6;
}

.hero {
    background: linear-gradient(135deg, var(--primary), var(--secondary));
    color: var(--white);
    min-height: 100vh;
    display: flex;
    flex-direction: column;
}

.navbar {
    display: flex;
    justify-content: space-between;
    align-items: center;
    padding: 1rem 2rem;
}

.logo {
    font-size: 1.5rem;
    font-weight: bold;
}

.nav-links {
    display: flex;
    list-style: none;
    gap: 2rem;
}

.nav-links a {
    color: var(--white);
    text-decoration: none;
    transition: opacity 0.3s;
}

.nav-links a:hover {
    opacity: 0.8;
}

.hero-content {
    flex: 1;
    display: flex;
    flex-direction: column;
    justify-content: center;
    align-items: center;
    text-align: center;
    padding: 2rem;
}

.hero-content h1 {
    font-size: 3rem;
    margin-bottom: 1rem;
}

.cta-button {
    display: inline-block;
    background: var(--white);
    color: var(--primary);
    padding: 1rem 2rem;
    border-radius: 8px;
    text-decoration: none;
    font-weight: 600;
    margin-top: 2rem;
    transition: transform 0.3s;
}

.cta-button:hover {
    transform: translateY(-2px);
}

.section {
    padding: 4rem 2rem;
    max-width: 1200px;
    margin: 0 auto;
    text-align: center;
}

.section h2 {
    font-size: 2rem;
    margin-bottom: 1rem;
    color: var(--primary);
}

footer {
    background: var(--text);
    color: var(--white);
    text-align: center;
    padding: 2rem;
}

@media (max-width: 768px) {
    .navbar {
        flex-direction: column;
        gap: 1rem;
    }

    .nav-links {
        gap: 1rem;
    }

    .hero-content h1 {
        font-size: 2rem;
    }
}"#;

const FALLBACK_JS: &str = r##"document.addEventListener('DOMContentLoaded', function() {
    const links = document.querySelectorAll('a[href^="#"]');
    links.forEach(link => {
        link.addEventListener('click', function(e) {
            e.preventDefault();
            const target = document.querySelector(this.getAttribute('href'));
            if (target) {
                target.scrollIntoView({ behavior: 'smooth' });
            }
        });
    });
});"##;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fallback_bundle_satisfies_schema() {
        let fallback = fallback_bundle();
        assert!(!fallback.html.trim().is_empty());
        assert!(!fallback.css.trim().is_empty());
        // Shared reference, not a fresh allocation per call.
        assert!(std::ptr::eq(fallback, fallback_bundle()));
    }

    #[test]
    fn valid_candidate_passes_unchanged() {
        let candidate = json!({
            "html": "<p>a</p>",
            "css": "p{color:red}",
            "js": ""
        });
        let bundle = validate_candidate(Some(&candidate)).unwrap();
        assert_eq!(bundle.html, "<p>a</p>");
        assert_eq!(bundle.css, "p{color:red}");
        assert_eq!(bundle.js, "");
    }

    #[test]
    fn absent_candidate_rejected() {
        assert_eq!(
            validate_candidate(None),
            Err(SchemaError::NoStructuredData)
        );
    }

    #[test]
    fn non_object_candidate_rejected() {
        let candidate = json!(["html", "css", "js"]);
        assert_eq!(
            validate_candidate(Some(&candidate)),
            Err(SchemaError::NotAnObject)
        );
        let primitive = json!(42);
        assert_eq!(
            validate_candidate(Some(&primitive)),
            Err(SchemaError::NotAnObject)
        );
    }

    #[test]
    fn missing_css_rejected() {
        let candidate = json!({"html": "<p/>", "js": ""});
        assert_eq!(
            validate_candidate(Some(&candidate)),
            Err(SchemaError::MissingKey("css"))
        );
    }

    #[test]
    fn non_string_html_rejected() {
        let candidate = json!({"html": 42, "css": "body{}", "js": ""});
        assert_eq!(
            validate_candidate(Some(&candidate)),
            Err(SchemaError::WrongType("html"))
        );
    }

    #[test]
    fn empty_html_rejected() {
        let candidate = json!({"html": "", "css": "body{}", "js": ""});
        assert_eq!(
            validate_candidate(Some(&candidate)),
            Err(SchemaError::EmptyRequiredField("html"))
        );
    }

    #[test]
    fn whitespace_only_css_rejected() {
        let candidate = json!({"html": "<p/>", "css": "   \n ", "js": ""});
        assert_eq!(
            validate_candidate(Some(&candidate)),
            Err(SchemaError::EmptyRequiredField("css"))
        );
    }

    #[test]
    fn empty_js_accepted() {
        let candidate = json!({"html": "<p/>", "css": "body{}", "js": ""});
        assert!(validate_candidate(Some(&candidate)).is_ok());
    }

    #[test]
    fn resolve_substitutes_fallback_on_violation() {
        let candidate = json!({"html": "<p/>"});
        assert_eq!(resolve(Some(&candidate)), *fallback_bundle());
        assert_eq!(resolve(None), *fallback_bundle());
    }
}
