//! Language model client using the Gemini `generateContent` API

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::{ApiKey, AppConfig};
use crate::types::{ServiceError, Variant};

/// Rules given to the basic assistant before every question
const STEP_BY_STEP_PREAMBLE: &str = r#"
You are a helpful assistant. Always respond in a clear, step-by-step explanation.

Rules:
- Do not use acronyms like ROYGBIV or just list things without explaining.
- Explain the answer logically in 2–6 steps.
- If the question is a math problem (e.g., 'What is 15 + 23?'), DO NOT solve it.
  Instead, respond: "I'm not able to solve math directly. You may use a calculator tool for that."

Now answer this user query step by step:
"#;

const CALCULATOR_PREAMBLE: &str = "You are a helpful assistant. Answer step-by-step.";
const AGENT_PREAMBLE: &str = "You are a helpful assistant. Answer clearly.";

/// Wrap raw user text in the variant's instruction preamble
pub fn wrap_prompt(variant: Variant, user_input: &str) -> String {
    let preamble = match variant {
        Variant::Basic => STEP_BY_STEP_PREAMBLE,
        Variant::Calculator => CALCULATOR_PREAMBLE,
        Variant::Agent => AGENT_PREAMBLE,
    };
    format!("{}\nUser: {}\nAssistant:", preamble, user_input)
}

/// Prompt in, text out
pub trait LanguageModel {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Blocking Gemini client
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: ApiKey,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

impl LanguageModel for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let url = self.endpoint();
        tracing::debug!(url = %url, "Calling language model");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .json(&request)
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

        let resp: GenerateContentResponse = response
            .json()
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

        extract_text_from_response(&resp)
    }
}

/// Join the text parts of the first candidate
fn extract_text_from_response(resp: &GenerateContentResponse) -> Result<String, ServiceError> {
    if let Some(reason) = resp
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_ref())
    {
        return Err(ServiceError::Blocked(reason.clone()));
    }

    let candidate = resp.candidates.first().ok_or(ServiceError::EmptyResponse)?;

    let text = candidate
        .content
        .iter()
        .flat_map(|c| c.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join("");

    let text = text.trim();
    if text.is_empty() {
        return Err(match candidate.finish_reason.as_deref() {
            Some(reason) if reason != "STOP" => ServiceError::Blocked(reason.to_string()),
            _ => ServiceError::EmptyResponse,
        });
    }

    Ok(text.to_string())
}
