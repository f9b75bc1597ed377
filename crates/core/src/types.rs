//! Domain models shared by the intent detectors, the router and the transcript
//!
//! This module contains:
//! - Assistant variants and their capability presets
//! - Response fragments and the composed response
//! - Collaborator error types (service and evaluation failures)
//! - Transcript records

use chrono::{Local, NaiveDateTime};
use num_bigint::BigInt;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Variants & Capabilities
// ============================================================================

/// Assistant variant, each with its own prompt, banner and default transcript
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Plain model access; math questions are refused
    #[serde(alias = "level1")]
    Basic,
    /// Single-step calculator in front of the model
    #[serde(alias = "level2")]
    Calculator,
    /// Translation, calculations and knowledge answers composed together
    #[default]
    #[serde(alias = "level3")]
    Agent,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Basic => "basic",
            Variant::Calculator => "calculator",
            Variant::Agent => "agent",
        }
    }

    /// Default capability set for this variant
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Variant::Basic => Capabilities::default(),
            Variant::Calculator => Capabilities {
                supports_arithmetic: true,
                ..Default::default()
            },
            Variant::Agent => Capabilities {
                supports_translation: true,
                supports_arithmetic: true,
                supports_multi_step: true,
            },
        }
    }

    pub fn banner(&self) -> &'static str {
        match self {
            Variant::Basic => "🔹 Gemini Smart Assistant (Level 1)",
            Variant::Calculator => "🟡 Gemini Assistant with Calculator Tool (Level 2)",
            Variant::Agent => "🔴 Gemini Agentic Assistant (Level 3)",
        }
    }

    pub fn default_transcript(&self) -> &'static str {
        match self {
            Variant::Basic => "level1_interactions.txt",
            Variant::Calculator => "level2_interactions.txt",
            Variant::Agent => "level3_interactions.txt",
        }
    }
}

/// Which handlers a router may use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Capabilities {
    #[serde(default, rename = "translation")]
    pub supports_translation: bool,
    #[serde(default, rename = "arithmetic")]
    pub supports_arithmetic: bool,
    /// Compose several handler results into one response
    #[serde(default, rename = "multi_step")]
    pub supports_multi_step: bool,
}

impl Capabilities {
    pub fn has_tools(&self) -> bool {
        self.supports_translation || self.supports_arithmetic
    }
}

// ============================================================================
// Response Fragments
// ============================================================================

/// Handler a fragment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Translation,
    Calculation,
    Knowledge,
    Fallback,
    /// Canned router reply (refusals, unsupported requests)
    Notice,
}

/// One labeled piece of a composed response
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub text: String,
    /// The collaborator behind this fragment reported an error
    pub failed: bool,
}

impl Fragment {
    pub fn ok(kind: FragmentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            failed: false,
        }
    }

    pub fn failed(kind: FragmentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            failed: true,
        }
    }
}

/// Placeholder used when nothing produced any text
pub const EMPTY_RESPONSE: &str = "(no response)";

/// Ordered fragments for one interaction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposedResponse {
    pub fragments: Vec<Fragment>,
}

impl ComposedResponse {
    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn kinds(&self) -> Vec<FragmentKind> {
        self.fragments.iter().map(|f| f.kind).collect()
    }

    /// Newline-joined response text, never empty
    pub fn text(&self) -> String {
        let joined = self
            .fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        if joined.trim().is_empty() {
            EMPTY_RESPONSE.to_string()
        } else {
            joined
        }
    }
}

// ============================================================================
// Collaborator Errors
// ============================================================================

/// Failure reported by a remote text service (language model, translator)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("prompt blocked: {0}")]
    Blocked(String),

    #[error("empty response")]
    EmptyResponse,
}

/// Failure reported by the expression evaluator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("quotient out of floating-point range")]
    Overflow,

    #[error("invalid expression: {0}")]
    InvalidExpression(String),
}

/// Result of evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    /// Arbitrary-precision integer
    Int(BigInt),
    Float(f64),
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Int(BigInt::from(n))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

// ============================================================================
// Transcript Records
// ============================================================================

/// One completed interaction
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub input: String,
    pub response: String,
}

impl LogRecord {
    pub fn now(input: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            input: input.into(),
            response: response.into(),
        }
    }

    /// Render in transcript format
    pub fn render(&self) -> String {
        format!(
            "[{}]\nYou: {}\nAssistant: {}\n{}\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.input,
            self.response,
            "-".repeat(50)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
