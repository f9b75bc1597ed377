//! Response Composer / Router
//!
//! Runs the intent detectors over one line of input, calls the matching
//! collaborators and assembles their results into a single response.
//!
//! Two paths, selected by the capability set:
//! - composed: every matching handler contributes a fragment
//!   (translation, calculations, knowledge answer), with the model as fallback
//! - single-step: the first matching handler answers alone

use crate::arithmetic::{extract_single_expression, find_calculations, is_math_query};
use crate::calculator::Evaluator;
use crate::config::AppConfig;
use crate::knowledge::{is_knowledge_question, is_multi_step};
use crate::llm::{wrap_prompt, LanguageModel};
use crate::translation::{find_translation, Translator};
use crate::types::{Capabilities, ComposedResponse, Fragment, FragmentKind, ServiceError, Variant};

const MULTI_STEP_UNSUPPORTED: &str = "Graceful failure (no multi-step yet)";
const SINGLE_STEP_ONLY: &str = "Sorry, I can only handle one step at a time right now.";
const MATH_REFUSAL: &str =
    "I'm not able to solve math directly. You may use a calculator tool for that.";

/// Router behavior chosen at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterSettings {
    pub variant: Variant,
    pub capabilities: Capabilities,
    pub dedupe_overlapping_matches: bool,
}

impl RouterSettings {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            capabilities: variant.capabilities(),
            dedupe_overlapping_matches: false,
        }
    }
}

impl From<&AppConfig> for RouterSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            variant: config.variant,
            capabilities: config.capabilities,
            dedupe_overlapping_matches: config.dedupe_overlapping_matches,
        }
    }
}

pub struct Router<'a> {
    settings: RouterSettings,
    evaluator: &'a dyn Evaluator,
    translator: &'a dyn Translator,
    model: &'a dyn LanguageModel,
}

impl<'a> Router<'a> {
    pub fn new(
        settings: RouterSettings,
        evaluator: &'a dyn Evaluator,
        translator: &'a dyn Translator,
        model: &'a dyn LanguageModel,
    ) -> Self {
        Self {
            settings,
            evaluator,
            translator,
            model,
        }
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Produce the response for one line of input. Never fails.
    pub fn respond(&self, input: &str) -> ComposedResponse {
        if self.settings.capabilities.supports_multi_step {
            self.compose(input)
        } else {
            self.single_step(input)
        }
    }

    /// Every matching handler contributes, in fixed order
    pub fn compose(&self, input: &str) -> ComposedResponse {
        let caps = self.settings.capabilities;
        let mut response = ComposedResponse::default();

        if caps.supports_translation {
            if let Some(phrase) = find_translation(input) {
                tracing::debug!(phrase = %phrase, "Translation request");
                response.push(self.translation_fragment(&phrase));
            }
        }

        if caps.supports_arithmetic {
            for expr in find_calculations(input, self.settings.dedupe_overlapping_matches) {
                tracing::debug!(expr = %expr, "Calculation request");
                response.push(self.calculation_fragment(&expr.text, true));
            }
        }

        if is_knowledge_question(input) {
            tracing::debug!("Knowledge question");
            response.push(self.knowledge_fragment(input));
        }

        if response.is_empty() {
            response.push(self.fallback_fragment(input));
        }

        response
    }

    /// First matching handler answers alone
    fn single_step(&self, input: &str) -> ComposedResponse {
        let caps = self.settings.capabilities;
        let mut response = ComposedResponse::default();

        let fragment = if caps.has_tools() && is_multi_step(input) {
            Fragment::ok(FragmentKind::Notice, MULTI_STEP_UNSUPPORTED)
        } else if let Some(phrase) = caps
            .supports_translation
            .then(|| find_translation(input))
            .flatten()
        {
            self.translation_fragment(&phrase)
        } else if is_math_query(input, self.settings.variant) {
            if !caps.supports_arithmetic {
                Fragment::ok(FragmentKind::Notice, MATH_REFUSAL)
            } else if let Some(expr) = extract_single_expression(input) {
                self.calculation_fragment(&expr, false)
            } else {
                Fragment::ok(FragmentKind::Notice, SINGLE_STEP_ONLY)
            }
        } else {
            self.fallback_fragment(input)
        };

        response.push(fragment);
        response
    }

    // ------------------------------------------------------------------------
    // Fragment builders
    // ------------------------------------------------------------------------

    fn translation_fragment(&self, phrase: &str) -> Fragment {
        let label = format!("Translated '{}' to German: ", phrase);
        match self.translator.translate(phrase) {
            Ok(text) => Fragment::ok(FragmentKind::Translation, label + &text),
            Err(e) => {
                tracing::warn!(error = %e, "Translation failed");
                Fragment::failed(
                    FragmentKind::Translation,
                    format!("{}Translation error: {}", label, e),
                )
            }
        }
    }

    /// `labeled` prefixes the result with the expression ("45 + 30 = 75")
    fn calculation_fragment(&self, expr: &str, labeled: bool) -> Fragment {
        let (result, failed) = match self.evaluator.evaluate(expr) {
            Ok(value) => (value.to_string(), false),
            Err(e) => {
                tracing::warn!(expr, error = %e, "Evaluation failed");
                (format!("Error: {}", e), true)
            }
        };

        let text = if labeled {
            format!("{} = {}", expr.trim(), result)
        } else {
            result
        };

        Fragment {
            kind: FragmentKind::Calculation,
            text,
            failed,
        }
    }

    fn knowledge_fragment(&self, input: &str) -> Fragment {
        match self.ask_model(input) {
            Ok(text) => Fragment::ok(FragmentKind::Knowledge, format!("LLM Answer: {}", text)),
            Err(e) => Fragment::failed(
                FragmentKind::Knowledge,
                format!("LLM Answer: Gemini error: {}", e),
            ),
        }
    }

    fn fallback_fragment(&self, input: &str) -> Fragment {
        match self.ask_model(input) {
            Ok(text) => Fragment::ok(FragmentKind::Fallback, text),
            Err(e) => Fragment::failed(FragmentKind::Fallback, format!("Gemini error: {}", e)),
        }
    }

    fn ask_model(&self, input: &str) -> Result<String, ServiceError> {
        let prompt = wrap_prompt(self.settings.variant, input);
        self.model.generate(&prompt).map_err(|e| {
            tracing::warn!(error = %e, "Language model call failed");
            e
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
