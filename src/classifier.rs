//! Query Intent Classifier
//!
//! Turns a free-text question into an intent plus the drug names it
//! mentions. Rules are tried top to bottom and the first one that yields
//! enough names wins; nothing is scored.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// == Intent ==
/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Safety,
    Recall,
    Compare,
    Unknown,
}

impl Intent {
    /// Fewest extracted names for a rule of this intent to fire.
    fn min_names(self) -> usize {
        match self {
            Intent::Compare => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intent::Safety => "safety",
            Intent::Recall => "recall",
            Intent::Compare => "compare",
            Intent::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

// == Parsed Query ==
/// Classifier output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedQuery {
    pub intent: Intent,
    pub drug_names: Vec<String>,
}

impl ParsedQuery {
    fn new(intent: Intent, drug_names: Vec<String>) -> Self {
        Self { intent, drug_names }
    }

    fn unknown() -> Self {
        Self::new(Intent::Unknown, Vec::new())
    }
}

// == Rules ==
struct Rule {
    intent: Intent,
    pattern: Regex,
}

impl Rule {
    /// Captured text, with multiple groups joined as a list.
    fn capture(&self, text: &str) -> Option<String> {
        let caps = self.pattern.captures(text)?;
        let parts: Vec<&str> = caps
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str())
            .collect();
        Some(parts.join(", "))
    }
}

/// Patterns in priority order: compare, then recall, then safety.
const RULE_SPECS: &[(Intent, &str)] = &[
    (Intent::Compare, r"compare\s+(.+)"),
    (Intent::Compare, r"comparison\s+(?:of\s+)?(.+)"),
    (Intent::Compare, r"(.+)\s+vs\.?\s+(.+)"),
    (Intent::Compare, r"(.+)\s+versus\s+(.+)"),
    (Intent::Recall, r"(?:any\s+)?recalls?\s+(?:for|on|about)\s+(.+)"),
    (Intent::Recall, r"(?:check|find)\s+recalls?\s+(?:for|on)?\s*(.+)"),
    (Intent::Recall, r"\bis\s+(.+)\s+recalled"),
    (Intent::Recall, r"\bhas\s+(.+)\s+been\s+recalled"),
    (
        Intent::Safety,
        r"(?:tell me about|what about|info on|information on)\s+(.+?)(?:['’]s)?\s+safety",
    ),
    (Intent::Safety, r"(?:\bis|\bhow)\s+safe\s+(?:is\s+)?(.+)"),
    (Intent::Safety, r"\bis\s+(.+?)\s+safe\b"),
    (
        Intent::Safety,
        r"safety\s+(?:of|profile|info|information)\s+(?:for\s+|on\s+|about\s+|of\s+)?(.+)",
    ),
    (Intent::Safety, r"(?:side effects?|adverse events?)\s+(?:of|for)\s+(.+)"),
    (Intent::Safety, r"(.+)\s+(?:side effects?|adverse events?|safety)"),
    // Broadest catch-all stays last.
    (Intent::Safety, r"(?:what|tell me)\s+(?:about|is)\s+(.+)"),
];

fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        RULE_SPECS
            .iter()
            .map(|(intent, pattern)| Rule {
                intent: *intent,
                pattern: Regex::new(pattern).expect("valid classifier regex"),
            })
            .collect()
    })
}

fn filler_re() -> &'static Regex {
    static FILLER_RE: OnceLock<Regex> = OnceLock::new();
    FILLER_RE.get_or_init(|| {
        Regex::new(r"\b(?:the|a|an|drug|medication|medicine)\b").expect("valid filler regex")
    })
}

fn separator_re() -> &'static Regex {
    static SEPARATOR_RE: OnceLock<Regex> = OnceLock::new();
    SEPARATOR_RE.get_or_init(|| {
        Regex::new(r"(?i)[,;]|\band\b|\bvs\b\.?|\bversus\b").expect("valid separator regex")
    })
}

// == Classify ==
/// Classifies `text` into an intent and the drug names it mentions.
///
/// Pure and deterministic. A compare rule only fires with two or more
/// names; otherwise classification falls through to later rules and, at
/// last, to extracting names from the whole input.
pub fn classify(text: &str) -> ParsedQuery {
    let lowered = text.trim().to_lowercase();

    for rule in rules() {
        let Some(captured) = rule.capture(&lowered) else {
            continue;
        };
        let names = extract_names(&captured);
        if names.len() >= rule.intent.min_names() {
            return ParsedQuery::new(rule.intent, names);
        }
    }

    let names: Vec<String> = extract_names(text)
        .into_iter()
        .filter(|name| looks_like_word(name))
        .collect();

    match names.len() {
        0 => ParsedQuery::unknown(),
        1 => ParsedQuery::new(Intent::Safety, names),
        _ => ParsedQuery::new(Intent::Compare, names),
    }
}

/// Free text with no vowel at all ("xyz") is not treated as a name.
fn looks_like_word(name: &str) -> bool {
    name.chars()
        .any(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
}

// == Extract Names ==
/// Splits a fragment of text into presentable drug names.
///
/// Filler words are removed, the text is split on commas, semicolons,
/// "and", "vs" and "versus", fragments of two characters or fewer are
/// dropped, and each word is title-cased. Order is preserved.
pub fn extract_names(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = filler_re().replace_all(&lowered, "");

    separator_re()
        .split(&cleaned)
        .map(|part| {
            part.trim_matches(|c: char| c.is_whitespace() || matches!(c, '?' | '!' | '.'))
        })
        .filter(|part| part.chars().count() > 2)
        .map(title_case)
        .collect()
}

fn title_case(fragment: &str) -> String {
    fragment
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Sample questions shown when a query cannot be classified.
pub fn example_queries() -> &'static [&'static str] {
    &[
        "Tell me about Ibuprofen's safety",
        "What are the side effects of Aspirin?",
        "Compare Aspirin, Ibuprofen, and Acetaminophen",
        "Is Metformin safe?",
        "Check recalls for Lisinopril",
        "Ibuprofen vs Naproxen",
    ]
}
