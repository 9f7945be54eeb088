use crate::document::KNOWN_PREFIXES;
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-_.:/\s]+").expect("separator regex should be valid"));

/// One transform in a naming [`Pipeline`].
pub trait NameStep: Send + Sync {
    fn apply(&self, input: String) -> String;
}

/// An ordered chain of [`NameStep`]s.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn NameStep>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: impl NameStep + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn run(&self, input: &str) -> String {
        self.steps
            .iter()
            .fold(input.to_string(), |acc, step| step.apply(acc))
    }
}

/// Remove a component pointer prefix, full or abbreviated.
pub struct StripRefPrefix;

impl NameStep for StripRefPrefix {
    fn apply(&self, input: String) -> String {
        for prefix in KNOWN_PREFIXES.iter().copied().chain(["#/c/s/"]) {
            if let Some(rest) = input.strip_prefix(prefix) {
                return rest.to_string();
            }
        }
        input
    }
}

/// Brackets of synthesized anonymous names become word breaks.
pub struct ReplaceBrackets;

impl NameStep for ReplaceBrackets {
    fn apply(&self, input: String) -> String {
        input.replace(['[', ']'], " ")
    }
}

/// Keep identifier characters and separators only.
pub struct DropInvalidChars;

impl NameStep for DropInvalidChars {
    fn apply(&self, input: String) -> String {
        input
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '/' | ' '))
            .collect()
    }
}

/// Normalize every separator run to a single space.
pub struct SplitWords;

impl NameStep for SplitWords {
    fn apply(&self, input: String) -> String {
        SEPARATORS
            .split(&input)
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Join space-separated words in Pascal or camel case.
pub enum JoinCase {
    Pascal,
    Camel,
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn lower_first(word: &str) -> String {
    // all-caps words (ID, URL) are lowered entirely
    if word.chars().all(|c| !c.is_ascii_lowercase()) {
        return word.to_ascii_lowercase();
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

impl NameStep for JoinCase {
    fn apply(&self, input: String) -> String {
        let mut out = String::with_capacity(input.len());
        for (i, word) in input.split(' ').filter(|w| !w.is_empty()).enumerate() {
            match (self, i) {
                (JoinCase::Camel, 0) => out.push_str(&lower_first(word)),
                _ => out.push_str(&upper_first(word)),
            }
        }
        out
    }
}

/// Names may not start with a digit.
pub struct LeadingDigitGuard;

impl NameStep for LeadingDigitGuard {
    fn apply(&self, input: String) -> String {
        if input.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            format!("_{input}")
        } else {
            input
        }
    }
}
