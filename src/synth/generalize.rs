//! Question generalization.

use once_cell::sync::Lazy;
use regex::Regex;

static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static ESTATE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"小区\d+").unwrap());
static USER_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"用户\w+").unwrap());

/// A question containing any of these is left without a prefix.
pub const QUESTION_MARKERS: &[&str] = &["如何", "怎样", "什么", "为什么", "问题"];

/// Prefix rules in priority order: if the section text contains any trigger,
/// the prefix is prepended.
pub const PREFIX_RULES: &[(&[&str], &str)] = &[
    (&["设置", "配置"], "如何"),
    (&["错误", "故障"], "如何解决"),
    (&["步骤", "流程"], "如何进行"),
];

/// Replaces specific tokens with placeholders and adds a question prefix.
///
/// The substitutions run in a fixed order: dates, then digit runs, then
/// estate and user names. Because digits are already gone when the name
/// patterns run, `小区102` ends up as `小区[数字]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuestionGeneralizer;

impl QuestionGeneralizer {
    /// Create a new generalizer.
    pub fn new() -> Self {
        Self
    }

    /// Generalize `question`. `context` is the section text the question came from.
    pub fn generalize(&self, question: &str, context: &str) -> String {
        let generalized = DATE.replace_all(question, "[日期]");
        let generalized = DIGITS.replace_all(&generalized, "[数字]");
        let generalized = ESTATE_NAME.replace_all(&generalized, "[小区名称]");
        let generalized = USER_NAME.replace_all(&generalized, "[用户名]").into_owned();

        if QUESTION_MARKERS.iter().any(|m| generalized.contains(m)) {
            return generalized;
        }

        match prefix_for(context) {
            Some(prefix) => format!("{}{}", prefix, generalized),
            None => generalized,
        }
    }
}

/// The prefix selected by the first rule whose trigger occurs in `context`.
pub fn prefix_for(context: &str) -> Option<&'static str> {
    PREFIX_RULES
        .iter()
        .find(|(triggers, _)| triggers.iter().any(|t| context.contains(t)))
        .map(|(_, prefix)| *prefix)
}
