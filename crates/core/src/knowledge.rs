//! Knowledge-question and compound-request detection

/// Phrases that mark a general factual question
const KNOWLEDGE_KEYWORDS: [&str; 5] = ["capital", "distance", "largest", "who is", "what is"];

/// Joiners that mark a compound request
const MULTI_STEP_JOINERS: [&str; 6] = [
    " and also ",
    " then ",
    " as well as ",
    " in addition ",
    " and tell me ",
    " also tell me ",
];

/// Case-insensitive substring test, no word boundaries
pub fn is_knowledge_question(text: &str) -> bool {
    let lower = text.to_lowercase();
    KNOWLEDGE_KEYWORDS.iter().any(|k| lower.contains(k))
}

pub fn is_multi_step(text: &str) -> bool {
    let lower = text.to_lowercase();
    MULTI_STEP_JOINERS.iter().any(|j| lower.contains(j))
}
