//! Keyword extraction.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Product and technical terms, matched case-insensitively.
pub const TECH_TERMS: &[&str] = &[
    "SRMS",
    "SQL",
    "IE",
    "Edge",
    "Login",
    "Batch",
    "Journal",
    "Demand Note",
    "SPS",
    "Occupant",
    "Building ID",
    "CashType",
    "Synergis",
    "Community App",
    "Facility Booking",
];

/// Operation verbs.
pub const ACTION_TERMS: &[&str] = &[
    "设置", "配置", "登录", "删除", "更新", "导出", "列印", "解锁", "修复", "处理", "解决", "安装",
    "注册", "上传", "下载",
];

/// Default cap on CJK runs taken from the text.
pub const DEFAULT_MAX_CJK_TERMS: usize = 10;

static CJK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\x{4e00}-\x{9fff}]{2,}").unwrap());

/// Collects keywords from section text.
#[derive(Debug, Clone, Copy)]
pub struct KeywordExtractor {
    max_cjk_terms: usize,
}

impl KeywordExtractor {
    /// Create an extractor with the default CJK cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of distinct CJK runs.
    pub fn with_max_cjk_terms(mut self, max: usize) -> Self {
        self.max_cjk_terms = max;
        self
    }

    /// Fixed-list hits in list order, then the first distinct CJK runs by
    /// first occurrence. Duplicates are removed.
    pub fn extract(&self, content: &str) -> Vec<String> {
        let lowered = content.to_lowercase();
        let mut seen = HashSet::new();
        let mut keywords = Vec::new();

        let fixed = TECH_TERMS
            .iter()
            .chain(ACTION_TERMS.iter())
            .filter(|term| lowered.contains(&term.to_lowercase()))
            .map(|term| term.to_string());

        let mut runs_seen = HashSet::new();
        let runs = CJK_RUN
            .find_iter(content)
            .map(|m| m.as_str())
            .filter(|run| runs_seen.insert(*run))
            .take(self.max_cjk_terms)
            .map(str::to_string);

        for keyword in fixed.chain(runs) {
            if seen.insert(keyword.clone()) {
                keywords.push(keyword);
            }
        }
        keywords
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self {
            max_cjk_terms: DEFAULT_MAX_CJK_TERMS,
        }
    }
}
