//! Core annotation types: issue categories, issues, analysis results, marker ids.
//!
//! These types are framework-agnostic. The analysis payload is parsed leniently:
//! one malformed issue is dropped on its own without rejecting its neighbours.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::{SmolStr, format_smolstr};

/// Kind of problem an issue reports.
///
/// Declaration order is the processing priority used when two issues
/// compete for the same text: spelling wins over grammar, grammar over style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Spelling,
    Grammar,
    Style,
}

impl Category {
    /// All categories in processing priority order.
    pub const ALL: [Category; 3] = [Category::Spelling, Category::Grammar, Category::Style];

    /// Value used for the marker's `data-type` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Spelling => "spelling",
            Category::Grammar => "grammar",
            Category::Style => "style",
        }
    }

    /// Human-readable header for the suggestion popover.
    pub fn label(self) -> &'static str {
        match self {
            Category::Spelling => "Spelling",
            Category::Grammar => "Grammar",
            Category::Style => "Style",
        }
    }

    /// Underline colour, packed as 0xRRGGBBAA.
    pub fn color(self) -> u32 {
        match self {
            Category::Spelling => 0xFF6B6BFF,
            Category::Grammar => 0x4CAF50FF,
            Category::Style => 0x2196F3FF,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spelling" => Ok(Category::Spelling),
            "grammar" => Ok(Category::Grammar),
            "style" => Ok(Category::Style),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// One flagged word or phrase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Text the service flagged. Matched case-insensitively on word boundaries.
    pub word: String,
    pub category: Category,
    /// Replacement candidates, best first. May be empty, in which case the
    /// issue is never rendered.
    pub suggestions: Vec<String>,
}

impl Issue {
    pub fn new(word: impl Into<String>, category: Category, suggestions: Vec<String>) -> Self {
        Self {
            word: word.into(),
            category,
            suggestions,
        }
    }

    /// Whether this issue can produce a marker at all.
    pub fn is_renderable(&self) -> bool {
        !self.word.trim().is_empty() && !self.suggestions.is_empty()
    }

    /// Parse one service entry of the form `{word, suggestions}`.
    ///
    /// Returns `None` when the match text is missing or the suggestions are
    /// not a list. Non-string suggestions are dropped.
    fn from_value(category: Category, value: &Value) -> Option<Self> {
        let word = value.get("word")?.as_str()?;
        if word.trim().is_empty() {
            return None;
        }
        let suggestions = value
            .get("suggestions")?
            .as_array()?
            .iter()
            .filter_map(|s| s.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        Some(Self::new(word, category, suggestions))
    }
}

/// Analysis result grouped by category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub spelling: Vec<Issue>,
    pub grammar: Vec<Issue>,
    pub style: Vec<Issue>,
}

impl Analysis {
    /// Build from the service's JSON payload.
    ///
    /// Missing category arrays are treated as empty. Entries that fail to
    /// parse are skipped individually.
    pub fn from_json(payload: &Value) -> Self {
        let mut analysis = Analysis::default();
        for category in Category::ALL {
            let Some(entries) = payload.get(category.as_str()).and_then(Value::as_array) else {
                continue;
            };
            let issues = analysis.issues_mut(category);
            for entry in entries {
                match Issue::from_value(category, entry) {
                    Some(issue) => issues.push(issue),
                    None => tracing::debug!(
                        target: "proofmark::analysis",
                        %category,
                        entry = %entry,
                        "skipping malformed issue"
                    ),
                }
            }
        }
        analysis
    }

    pub fn issues(&self, category: Category) -> &[Issue] {
        match category {
            Category::Spelling => &self.spelling,
            Category::Grammar => &self.grammar,
            Category::Style => &self.style,
        }
    }

    pub fn issues_mut(&mut self, category: Category) -> &mut Vec<Issue> {
        match category {
            Category::Spelling => &mut self.spelling,
            Category::Grammar => &mut self.grammar,
            Category::Style => &mut self.style,
        }
    }

    /// Iterate every issue in processing priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        Category::ALL
            .into_iter()
            .flat_map(move |category| self.issues(category).iter())
    }

    pub fn len(&self) -> usize {
        self.spelling.len() + self.grammar.len() + self.style.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep only the issues accepted by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&Issue) -> bool) {
        for category in Category::ALL {
            self.issues_mut(category).retain(&mut keep);
        }
    }
}

/// Generator for unique marker element ids.
///
/// Ids look like `sugg-<seed>-<counter>` in base 36. The seed separates
/// generators living in different frames or page loads; the counter keeps
/// ids unique within one generator.
#[derive(Clone, Debug)]
pub struct MarkerIdGen {
    seed: SmolStr,
    counter: u64,
}

impl MarkerIdGen {
    pub fn new(seed: u64) -> Self {
        Self {
            seed: to_base36(seed),
            counter: 0,
        }
    }

    pub fn next_id(&mut self) -> SmolStr {
        self.counter += 1;
        format_smolstr!("sugg-{}-{}", self.seed, to_base36(self.counter))
    }
}

fn to_base36(mut n: u64) -> SmolStr {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return SmolStr::new_static("0");
    }
    let mut buf = Vec::with_capacity(13);
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    // Only ASCII digits were pushed.
    SmolStr::new(String::from_utf8_lossy(&buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_priority_order() {
        let mut cats = vec![Category::Style, Category::Spelling, Category::Grammar];
        cats.sort();
        assert_eq!(cats, Category::ALL.to_vec());
    }

    #[test]
    fn test_category_round_trip_str() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>(), Ok(c));
        }
        assert!("punctuation".parse::<Category>().is_err());
    }

    #[test]
    fn test_analysis_from_json() {
        let payload = json!({
            "spelling": [{"word": "Helo", "suggestions": ["Hello", "Help"]}],
            "grammar": [{"word": "a apple", "suggestions": ["an apple"]}],
            "style": []
        });
        let analysis = Analysis::from_json(&payload);
        assert_eq!(analysis.len(), 2);
        assert_eq!(analysis.spelling[0].word, "Helo");
        assert_eq!(analysis.spelling[0].category, Category::Spelling);
        assert_eq!(analysis.grammar[0].suggestions, vec!["an apple"]);
    }

    #[test]
    fn test_analysis_skips_malformed_entries_individually() {
        let payload = json!({
            "spelling": [
                {"word": "", "suggestions": ["x"]},
                {"suggestions": ["x"]},
                {"word": "teh", "suggestions": "the"},
                {"word": "wrold", "suggestions": ["world", 3, null]},
                "not an object"
            ],
            "grammar": "not a list"
        });
        let analysis = Analysis::from_json(&payload);
        assert_eq!(analysis.spelling.len(), 1);
        assert_eq!(analysis.spelling[0].word, "wrold");
        assert_eq!(analysis.spelling[0].suggestions, vec!["world"]);
        assert!(analysis.grammar.is_empty());
        assert!(analysis.style.is_empty());
    }

    #[test]
    fn test_analysis_iter_is_priority_ordered() {
        let mut analysis = Analysis::default();
        analysis.style.push(Issue::new("very", Category::Style, vec!["".into()]));
        analysis.spelling.push(Issue::new("teh", Category::Spelling, vec!["the".into()]));
        let order: Vec<_> = analysis.iter().map(|i| i.category).collect();
        assert_eq!(order, vec![Category::Spelling, Category::Style]);
    }

    #[test]
    fn test_issue_without_suggestions_is_not_renderable() {
        assert!(!Issue::new("teh", Category::Spelling, vec![]).is_renderable());
        assert!(!Issue::new("  ", Category::Spelling, vec!["a".into()]).is_renderable());
        assert!(Issue::new("teh", Category::Spelling, vec!["the".into()]).is_renderable());
    }

    #[test]
    fn test_marker_ids_are_unique() {
        let mut ids = MarkerIdGen::new(36 * 36 + 1);
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(a, "sugg-101-1");
        assert_eq!(b, "sugg-101-2");
    }
}
