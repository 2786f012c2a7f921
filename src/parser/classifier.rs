//! Heading heuristics for running text.
//!
//! A paragraph is treated as a heading when any rule in [`HEADING_RULES`]
//! accepts its trimmed text. Rules are tried in priority order and the first
//! match wins.

use once_cell::sync::Lazy;
use regex::Regex;

/// Keywords that mark a short line as a heading.
pub const HEADING_KEYWORDS: &[&str] = &["问题", "解决", "步骤", "方法", "设置", "配置"];

/// Short-line threshold, in characters.
pub const SHORT_LINE_CHARS: usize = 50;

/// A named heading rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingRule {
    /// `第三章`, `第2节`, `第十部分`
    Chapter,
    /// `1. ...`, `12 ...`
    Numbered,
    /// `一、`-style lead-ins written as `一. ` or `一 `
    ChineseNumbered,
    /// `问题：`, `解决方案:`, `步骤：`, `注意：`
    Labeled,
    /// Fewer than 50 characters and contains a heading keyword
    ShortKeyword,
}

/// Rules in priority order.
pub const HEADING_RULES: &[HeadingRule] = &[
    HeadingRule::Chapter,
    HeadingRule::Numbered,
    HeadingRule::ChineseNumbered,
    HeadingRule::Labeled,
    HeadingRule::ShortKeyword,
];

static CHAPTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^第[一二三四五六七八九十\d]+(?:章|节|部分)").unwrap());
static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.\s]").unwrap());
static CHINESE_NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[一二三四五六七八九十]+[.\s]").unwrap());
static LABELED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:问题|解决方案|步骤|注意)[:：]").unwrap());

impl HeadingRule {
    /// Whether this rule accepts `text`. `text` is trimmed first.
    pub fn matches(self, text: &str) -> bool {
        let text = text.trim();
        match self {
            HeadingRule::Chapter => CHAPTER.is_match(text),
            HeadingRule::Numbered => NUMBERED.is_match(text),
            HeadingRule::ChineseNumbered => CHINESE_NUMBERED.is_match(text),
            HeadingRule::Labeled => LABELED.is_match(text),
            HeadingRule::ShortKeyword => {
                text.chars().count() < SHORT_LINE_CHARS
                    && HEADING_KEYWORDS.iter().any(|k| text.contains(k))
            }
        }
    }
}

/// The first rule that accepts `text`, if any.
pub fn matching_rule(text: &str) -> Option<HeadingRule> {
    HEADING_RULES.iter().copied().find(|rule| rule.matches(text))
}

/// Whether `text` looks like a heading.
pub fn is_heading(text: &str) -> bool {
    matching_rule(text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_rule() {
        assert!(HeadingRule::Chapter.matches("第三章 系统概述"));
        assert!(HeadingRule::Chapter.matches("第12节"));
        assert!(HeadingRule::Chapter.matches("第一部分 总则"));
        assert!(!HeadingRule::Chapter.matches("本章第三节"));
    }

    #[test]
    fn test_numbered_rules() {
        assert!(HeadingRule::Numbered.matches("1. 安装"));
        assert!(HeadingRule::Numbered.matches("2 配置数据库"));
        assert!(!HeadingRule::Numbered.matches("2024年总结"));
        assert!(HeadingRule::ChineseNumbered.matches("三. 常见故障"));
        assert!(!HeadingRule::ChineseNumbered.matches("三月份报表"));
    }

    #[test]
    fn test_labeled_rule() {
        assert!(HeadingRule::Labeled.matches("问题：无法登录"));
        assert!(HeadingRule::Labeled.matches("解决方案:重启服务"));
        assert!(HeadingRule::Labeled.matches("注意：备份"));
        assert!(!HeadingRule::Labeled.matches("方案：重启"));
    }

    #[test]
    fn test_short_keyword_rule() {
        assert!(HeadingRule::ShortKeyword.matches("打印机设置"));
        let long = format!("{}设置", "很".repeat(SHORT_LINE_CHARS));
        assert!(!HeadingRule::ShortKeyword.matches(&long));
        assert!(!HeadingRule::ShortKeyword.matches("普通的一句话"));
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(matching_rule("第一章 配置"), Some(HeadingRule::Chapter));
        assert_eq!(matching_rule("1. 配置"), Some(HeadingRule::Numbered));
        assert_eq!(matching_rule("问题：配置"), Some(HeadingRule::Labeled));
        assert_eq!(matching_rule("配置说明"), Some(HeadingRule::ShortKeyword));
        assert_eq!(matching_rule("今天天气很好。"), None);
        assert!(!is_heading(""));
    }
}
