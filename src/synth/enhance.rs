//! Answer enhancement: provenance, SQL blocks and step lists.

use once_cell::sync::Lazy;
use regex::Regex;

static SQL_STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(?:SELECT|INSERT|UPDATE|DELETE|CREATE|ALTER|DROP)\s+.*?;").unwrap()
});
static STEP_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"步骤\s*\d+[:：]").unwrap());
static STEP_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"步骤\s*\d+").unwrap());

/// Enriches an answer with its source line, SQL blocks and numbered steps.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnswerEnhancer;

impl AnswerEnhancer {
    /// Create a new enhancer.
    pub fn new() -> Self {
        Self
    }

    /// Build the enhanced answer for `answer`, prefixed by `source`.
    pub fn enhance(&self, answer: &str, source: &str) -> String {
        let mut enhanced = format!("{}\n\n{}", source, answer);

        let statements = sql_statements(answer);
        if !statements.is_empty() {
            enhanced.push_str("\n\n相关SQL语句：\n");
            for sql in statements {
                enhanced.push_str("```sql\n");
                enhanced.push_str(sql);
                enhanced.push_str("\n```\n");
            }
        }

        if answer.contains("步骤") {
            let steps = step_spans(answer);
            if !steps.is_empty() {
                enhanced.push_str("\n\n操作步骤：\n");
                for (i, step) in steps.iter().enumerate() {
                    enhanced.push_str(&format!("{}. {}\n", i + 1, step.trim()));
                }
            }
        }

        enhanced
    }
}

/// Whole SQL statements, keyword through semicolon, in order found.
pub fn sql_statements(text: &str) -> Vec<&str> {
    SQL_STATEMENT.find_iter(text).map(|m| m.as_str()).collect()
}

/// Bodies of `步骤N：` markers. Each body runs to the next `步骤N` or the end.
pub fn step_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(marker) = STEP_MARKER.find_at(text, pos) {
        let body_start = marker.end();
        let Some(first) = text[body_start..].chars().next() else {
            break;
        };
        // the body holds at least one character
        let search_from = body_start + first.len_utf8();
        let body_end = STEP_START
            .find_at(text, search_from)
            .map(|m| m.start())
            .unwrap_or(text.len());
        spans.push(&text[body_start..body_end]);
        pos = body_end;
    }

    spans
}
