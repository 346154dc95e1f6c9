//! Issue filters applied between the service response and marker planning.
//!
//! A filter sees the full region text and one issue, and decides whether the
//! issue survives. Filters never add issues.

use std::fmt;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::settings::Settings;
use crate::types::{Analysis, Category, Issue};

/// Predicate deciding whether an issue is shown.
pub trait IssueFilter {
    fn keep(&self, text: &str, issue: &Issue) -> bool;

    /// Drop every issue `keep` rejects.
    fn apply(&self, text: &str, analysis: &mut Analysis) {
        analysis.retain(|issue| self.keep(text, issue));
    }
}

/// Drops issues in disabled categories, spelling issues for dictionary words
/// and, when configured, spelling issues on all-capitals words.
#[derive(Debug, Clone)]
pub struct DictionaryFilter {
    settings: Settings,
}

impl DictionaryFilter {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl IssueFilter for DictionaryFilter {
    fn keep(&self, _text: &str, issue: &Issue) -> bool {
        if !self.settings.category_enabled(issue.category) {
            return false;
        }
        if issue.category != Category::Spelling {
            return true;
        }
        if self.settings.is_known_word(&issue.word) {
            return false;
        }
        !(self.settings.ignore_uppercase && is_all_uppercase(&issue.word))
    }
}

/// True when the word has at least one letter and no lowercase letters.
fn is_all_uppercase(word: &str) -> bool {
    word.chars().any(char::is_alphabetic) && !word.chars().any(char::is_lowercase)
}

/// Kind of writing a region seems to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WritingContext {
    Formal,
    Informal,
    Academic,
    Business,
    Email,
    Creative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strictness {
    Low,
    Medium,
    High,
}

/// What a context implies for checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextProfile {
    pub strictness: Strictness,
    pub check_passive_voice: bool,
    pub check_cliches: bool,
    pub check_jargon: bool,
}

struct ContextRule {
    context: WritingContext,
    pattern: &'static str,
}

/// Checked in order; first hit wins.
const CONTEXT_RULES: &[ContextRule] = &[
    ContextRule {
        context: WritingContext::Academic,
        pattern: r"dear professor|university|abstract|thesis|hypothesis|methodology",
    },
    ContextRule {
        context: WritingContext::Business,
        pattern: r"dear sir|meeting|regards|company|business|profit|quarterly",
    },
    ContextRule {
        context: WritingContext::Informal,
        pattern: r"hi there|hey|what's up|thanks|cheers",
    },
    ContextRule {
        context: WritingContext::Email,
        pattern: r"gmail\.com|subject:|^hi|^hello|best,|regards,|sincerely,",
    },
    ContextRule {
        context: WritingContext::Creative,
        pattern: r"once upon a time|chapter|protagonist|character|story|plot",
    },
];

static COMPILED_RULES: LazyLock<Vec<(WritingContext, Regex)>> = LazyLock::new(|| {
    CONTEXT_RULES
        .iter()
        .filter_map(|rule| {
            match RegexBuilder::new(rule.pattern).case_insensitive(true).build() {
                Ok(re) => Some((rule.context, re)),
                Err(e) => {
                    tracing::error!(context = %rule.context, error = %e, "bad context rule");
                    None
                }
            }
        })
        .collect()
});

impl WritingContext {
    /// Guess the context from keywords. Defaults to `Formal`.
    pub fn detect(text: &str) -> Self {
        COMPILED_RULES
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(context, _)| *context)
            .unwrap_or(WritingContext::Formal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WritingContext::Formal => "formal",
            WritingContext::Informal => "informal",
            WritingContext::Academic => "academic",
            WritingContext::Business => "business",
            WritingContext::Email => "email",
            WritingContext::Creative => "creative",
        }
    }

    pub fn profile(self) -> ContextProfile {
        use Strictness::*;
        let (strictness, check_passive_voice, check_cliches, check_jargon) = match self {
            WritingContext::Academic => (High, false, true, false),
            WritingContext::Business => (Medium, true, true, false),
            WritingContext::Informal => (Low, false, false, false),
            WritingContext::Email => (Medium, true, false, true),
            WritingContext::Creative => (Low, false, true, false),
            WritingContext::Formal => (High, true, true, true),
        };
        ContextProfile {
            strictness,
            check_passive_voice,
            check_cliches,
            check_jargon,
        }
    }
}

impl fmt::Display for WritingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vetoes style issues where the detected context is relaxed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextFilter;

impl IssueFilter for ContextFilter {
    fn keep(&self, text: &str, issue: &Issue) -> bool {
        issue.category != Category::Style
            || WritingContext::detect(text).profile().strictness != Strictness::Low
    }

    fn apply(&self, text: &str, analysis: &mut Analysis) {
        // Detect once rather than per issue.
        let context = WritingContext::detect(text);
        if context.profile().strictness == Strictness::Low && !analysis.style.is_empty() {
            tracing::debug!(
                target: "proofmark::filter",
                %context,
                dropped = analysis.style.len(),
                "dropping style issues for relaxed context"
            );
            analysis.style.clear();
        }
    }
}
