//! Translation Intent Extraction and the Translator collaborator
//!
//! The detector looks for `translate '<phrase>' [into] german`. The translator
//! sends the phrase to a Google Translate compatible endpoint.

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::blocking::Client;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;

use crate::config::TranslationConfig;
use crate::types::ServiceError;

// ============================================================================
// Intent Detection
// ============================================================================

fn translation_request() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"translate\s+(?:'(.+?)'|"(.+?)")\s+(?:into\s+)?german"#)
            .expect("Invalid regex")
    })
}

/// Extract the phrase of the first translation request, if any.
///
/// Matching runs on the lowercased text, so the phrase comes back lowercase.
pub fn find_translation(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let cap = translation_request().captures(&lower)?;
    cap.get(1)
        .or_else(|| cap.get(2))
        .map(|m| m.as_str().to_string())
}

// ============================================================================
// Translator
// ============================================================================

/// Translates a phrase into the configured target language
pub trait Translator {
    fn translate(&self, phrase: &str) -> Result<String, ServiceError>;
}

/// Client for the public `translate_a/single` endpoint
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    target_language: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslationConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            target_language: config.target_language.clone(),
        })
    }

    fn request_url(&self, phrase: &str) -> String {
        format!(
            "{}?client=gtx&sl=auto&tl={}&dt=t&q={}",
            self.endpoint,
            urlencoding::encode(&self.target_language),
            urlencoding::encode(phrase)
        )
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, phrase: &str) -> Result<String, ServiceError> {
        let url = self.request_url(phrase);
        tracing::debug!(target_language = %self.target_language, "Calling translation endpoint");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

        parse_translation(&payload)
    }
}

/// Join the translated segments of a `translate_a/single` reply.
///
/// The reply looks like `[[["Hallo Welt","hello world",null,null,1]],null,"en"]`.
fn parse_translation(payload: &Value) -> Result<String, ServiceError> {
    let segments = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ServiceError::MalformedResponse("missing sentence list".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    let translated = translated.trim();
    if translated.is_empty() {
        return Err(ServiceError::EmptyResponse);
    }

    Ok(translated.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_translation_single_quotes() {
        assert_eq!(
            find_translation("translate 'hello' into german"),
            Some("hello".to_string())
        );
    }

    #[test]
    fn test_find_translation_double_quotes_without_into() {
        assert_eq!(
            find_translation("Please translate \"Good Morning\" German"),
            Some("good morning".to_string())
        );
    }

    #[test]
    fn test_find_translation_keeps_inner_apostrophe() {
        assert_eq!(
            find_translation("translate \"don't worry\" into german"),
            Some("don't worry".to_string())
        );
    }

    #[test]
    fn test_find_translation_first_match_wins() {
        assert_eq!(
            find_translation("translate 'one' into german and translate 'two' into german"),
            Some("one".to_string())
        );
    }

    #[test]
    fn test_find_translation_requires_language_marker() {
        assert_eq!(find_translation("translate 'hello' into french"), None);
        assert_eq!(find_translation("translate hello into german"), None);
        assert_eq!(find_translation(""), None);
    }

    #[test]
    fn test_parse_translation_joins_segments() {
        let payload = serde_json::json!([
            [["Hallo. ", "Hello. ", null, null, 1], ["Wie geht's?", "How are you?", null, null, 1]],
            null,
            "en"
        ]);
        assert_eq!(parse_translation(&payload).unwrap(), "Hallo. Wie geht's?");
    }

    #[test]
    fn test_parse_translation_errors() {
        assert!(matches!(
            parse_translation(&serde_json::json!({"error": "nope"})),
            Err(ServiceError::MalformedResponse(_))
        ));
        assert_eq!(
            parse_translation(&serde_json::json!([[], null, "en"])),
            Err(ServiceError::EmptyResponse)
        );
    }

    #[test]
    fn test_request_url_encodes_phrase() {
        let translator = GoogleTranslator::new(
            &TranslationConfig::default(),
            Duration::from_secs(5),
        )
        .unwrap();
        let url = translator.request_url("good morning & more");
        assert!(url.contains("tl=de"));
        assert!(url.ends_with("q=good%20morning%20%26%20more"));
    }

    /// Hits the live endpoint.
    /// Run with: cargo test test_live_translation -- --ignored
    #[test]
    #[ignore]
    fn test_live_translation() {
        let translator = GoogleTranslator::new(
            &TranslationConfig::default(),
            Duration::from_secs(15),
        )
        .unwrap();
        let result = translator.translate("hello").unwrap();
        assert!(!result.is_empty());
    }
}
