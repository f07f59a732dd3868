//! Keyword heuristics turning a free-text prompt into a read-only statement.
//!
//! This is not language understanding: the prompt is lower-cased and checked
//! for literal substrings against an ordered rule list. The first matching
//! rule wins; if none match the full-table select is used.

/// The statement shapes the translator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTemplate {
    SelectAll,
    Count,
}

impl QueryTemplate {
    pub fn render(self, table: &str) -> String {
        match self {
            QueryTemplate::SelectAll => format!("SELECT * FROM {};", table),
            QueryTemplate::Count => format!("SELECT COUNT(*) AS count FROM {};", table),
        }
    }
}

struct Rule {
    keywords: &'static [&'static str],
    template: QueryTemplate,
}

impl Rule {
    fn matches(&self, prompt: &str) -> bool {
        self.keywords.iter().any(|k| prompt.contains(k))
    }
}

const RULES: &[Rule] = &[
    Rule {
        keywords: &["all", "show", "list"],
        template: QueryTemplate::SelectAll,
    },
    Rule {
        keywords: &["count"],
        template: QueryTemplate::Count,
    },
];

const FALLBACK: QueryTemplate = QueryTemplate::SelectAll;

/// Picks the template for `prompt`.
pub fn classify(prompt: &str) -> QueryTemplate {
    let prompt = prompt.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&prompt))
        .map_or(FALLBACK, |rule| rule.template)
}

/// Translates `prompt` into a statement against `table`.
pub fn prompt_to_sql(prompt: &str, table: &str) -> String {
    classify(prompt).render(table)
}
