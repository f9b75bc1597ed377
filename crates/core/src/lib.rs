//! Intent Router Core Library
//!
//! This crate provides the core functionality for the assistant:
//! - Intent detection (arithmetic, translation, knowledge questions)
//! - Collaborators (calculator, translator, Gemini client)
//! - Response composition
//! - Transcript logging and the interactive session loop

pub mod types;

pub mod arithmetic;
pub mod calculator;
pub mod config;
pub mod knowledge;
pub mod llm;
pub mod router;
pub mod session;
pub mod transcript;
pub mod translation;

// Re-export commonly used types at crate root
pub use types::{
    Capabilities, ComposedResponse, EvalError, Fragment, FragmentKind, LogRecord, Number,
    ServiceError, Variant,
};

pub use calculator::{Calculator, Evaluator};
pub use config::{AppConfig, ConfigError, ConfigOverrides};
pub use llm::{GeminiClient, LanguageModel};
pub use router::{Router, RouterSettings};
pub use session::Session;
pub use transcript::Transcript;
pub use translation::{GoogleTranslator, Translator};
