//! Arithmetic Intent Extraction
//!
//! Pulls arithmetic expressions out of free text, either from natural-language
//! phrasing ("add 45 and 30") or from raw symbolic expressions ("12 * 4").

use regex::Regex;
use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use crate::types::Variant;

/// An expression found in user text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedExpression {
    /// Expression text, e.g. "45 + 30" or "7*6"
    pub text: String,
    /// Byte range of the phrase that produced it (in the case-folded text)
    pub span: Range<usize>,
}

impl fmt::Display for ExtractedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn add_phrase() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"add ([0-9]+) and ([0-9]+)").expect("Invalid regex"))
}

fn multiply_phrase() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"multiply ([0-9]+) and ([0-9]+)").expect("Invalid regex"))
}

fn symbolic_expression() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+\s*[+\-*/]\s*[0-9]+").expect("Invalid regex"))
}

fn basic_math_keywords() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(add|plus|sum|subtract|minus|multiply|times|product|divide|divided|total)\b",
        )
        .expect("Invalid regex")
    })
}

fn calculator_math_keywords() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(add|plus|sum|subtract|minus|difference|multiply|times|product|divide|divided|multiplied|added)\b",
        )
        .expect("Invalid regex")
    })
}

fn math_keywords(variant: Variant) -> &'static Regex {
    match variant {
        Variant::Basic => basic_math_keywords(),
        Variant::Calculator | Variant::Agent => calculator_math_keywords(),
    }
}

/// Collect "<verb> X and Y" phrases as "X <op> Y"
fn natural_language(re: &Regex, op: char, text: &str) -> Vec<ExtractedExpression> {
    re.captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            Some(ExtractedExpression {
                text: format!("{} {} {}", &cap[1], op, &cap[2]),
                span: whole.range(),
            })
        })
        .collect()
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Find every arithmetic expression in `text`.
///
/// Natural-language "add" matches come first, then "multiply" matches, then
/// raw symbolic expressions, each group in order of appearance. The same
/// digits may be reported by both a phrase and a raw match; pass
/// `dedupe_overlaps` to drop raw matches that overlap a phrase.
pub fn find_calculations(text: &str, dedupe_overlaps: bool) -> Vec<ExtractedExpression> {
    let lower = text.to_lowercase();

    let mut expressions = natural_language(add_phrase(), '+', &lower);
    expressions.extend(natural_language(multiply_phrase(), '*', &lower));

    let phrase_spans: Vec<Range<usize>> = expressions.iter().map(|e| e.span.clone()).collect();

    for m in symbolic_expression().find_iter(&lower) {
        let span = m.range();
        if dedupe_overlaps && phrase_spans.iter().any(|p| overlaps(p, &span)) {
            tracing::debug!(expr = m.as_str(), "Skipping raw expression inside a phrase match");
            continue;
        }
        expressions.push(ExtractedExpression {
            text: m.as_str().trim().to_string(),
            span,
        });
    }

    expressions
}

/// Extract the first expression using the broader single-step grammar.
///
/// Recognizes "add/plus X and/to Y", "multiply X by Y", "X times Y",
/// "subtract X from Y" and raw symbolic expressions, in that order.
pub fn extract_single_expression(text: &str) -> Option<String> {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        [
            (r"(?:add|plus|added)\s+([0-9]+)\s+(?:and|to)\s+([0-9]+)", "{1} + {2}"),
            (r"(?:multiply|times|multiplied)\s+([0-9]+)\s+(?:and|by)?\s*([0-9]+)", "{1} * {2}"),
            (r"([0-9]+)\s+(?:times|multiplied by)\s+([0-9]+)", "{1} * {2}"),
            (r"(?:subtract|minus)\s+([0-9]+)\s+from\s+([0-9]+)", "{2} - {1}"),
        ]
        .into_iter()
        .map(|(pattern, template)| (Regex::new(pattern).expect("Invalid regex"), template))
        .collect()
    });

    let lower = text.to_lowercase();
    let lower = lower.trim();

    for (re, template) in patterns {
        if let Some(cap) = re.captures(lower) {
            return Some(template.replace("{1}", &cap[1]).replace("{2}", &cap[2]));
        }
    }

    symbolic_expression()
        .find(lower)
        .map(|m| m.as_str().to_string())
}

/// Does the text look like a math question at all?
///
/// Each variant has its own keyword list: the basic assistant refuses
/// anything mentioning a "total", the calculator does not look for it.
pub fn is_math_query(text: &str, variant: Variant) -> bool {
    let lower = text.to_lowercase();
    math_keywords(variant).is_match(&lower) || symbolic_expression().is_match(&lower)
}
