//! Q&A synthesis from normalized document content.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{AnswerEnhancer, KeywordExtractor, QuestionGeneralizer};
use crate::model::{DocumentContent, ImageAsset, QaKind, QaPair, TableBlock};

/// Question used when a section has neither a matching pattern nor a heading.
pub const FALLBACK_QUESTION: &str = "相关问题";

/// A named pattern that pulls a question span out of section text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionRule {
    /// `问题：...` up to 解决/答案/方法/步骤
    Problem,
    /// `故障：...` up to 解决/修复/处理
    Fault,
    /// `错误：...` up to 解决/修复/处理
    Error,
    /// `如何...` to the end of the line
    HowTo,
    /// `怎样...` to the end of the line
    HowWay,
}

/// Rules in priority order.
pub const QUESTION_RULES: &[QuestionRule] = &[
    QuestionRule::Problem,
    QuestionRule::Fault,
    QuestionRule::Error,
    QuestionRule::HowTo,
    QuestionRule::HowWay,
];

// The terminator group consumes what a look-ahead would only test; with a
// lazy body the captured span is the same.
static PROBLEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)问题[:：](.+?)(?:解决|答案|方法|步骤|$)").unwrap());
static FAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)故障[:：](.+?)(?:解决|修复|处理|$)").unwrap());
static ERROR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)错误[:：](.+?)(?:解决|修复|处理|$)").unwrap());
static HOW_TO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)如何(.+?)(?:\n|$)").unwrap());
static HOW_WAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)怎样(.+?)(?:\n|$)").unwrap());
static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").unwrap());

impl QuestionRule {
    fn regex(self) -> &'static Regex {
        match self {
            QuestionRule::Problem => &*PROBLEM,
            QuestionRule::Fault => &*FAULT,
            QuestionRule::Error => &*ERROR,
            QuestionRule::HowTo => &*HOW_TO,
            QuestionRule::HowWay => &*HOW_WAY,
        }
    }

    /// The trimmed question span this rule extracts from `text`, if it matches.
    pub fn extract(self, text: &str) -> Option<String> {
        self.regex()
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    }
}

/// The first rule's extracted span, if any rule matches.
pub fn extract_question(text: &str) -> Option<String> {
    QUESTION_RULES.iter().find_map(|rule| rule.extract(text))
}

/// Trim and collapse newline runs into single newlines.
pub fn clean_text(text: &str) -> String {
    NEWLINE_RUNS.replace_all(text.trim(), "\n").into_owned()
}

/// Render a table answer: caption, pipe-joined header, separator, rows.
///
/// Tables without headers are rendered as rows only.
pub fn render_table(heading: &str, table: &TableBlock) -> String {
    let mut out = format!("表格标题：{}\n表格内容：\n", heading);
    if !table.headers.is_empty() {
        out.push_str(&table.headers.join(" | "));
        out.push('\n');
        out.push_str(&vec!["---"; table.headers.len()].join("|"));
        out.push('\n');
    }
    for row in &table.rows {
        out.push_str(&row.join(" | "));
        out.push('\n');
    }
    out
}

/// Turns a [`DocumentContent`] into an ordered list of [`QaPair`]s.
///
/// Order: for each section its text pair then one pair per table; then one
/// pair per document-level image.
#[derive(Debug, Default, Clone, Copy)]
pub struct QaSynthesizer {
    generalizer: QuestionGeneralizer,
    enhancer: AnswerEnhancer,
    keywords: KeywordExtractor,
}

impl QaSynthesizer {
    /// Create a synthesizer with default components.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom keyword extractor.
    pub fn with_keyword_extractor(mut self, keywords: KeywordExtractor) -> Self {
        self.keywords = keywords;
        self
    }

    /// Synthesize every Q&A pair for `doc`.
    pub fn synthesize(&self, doc: &DocumentContent) -> Vec<QaPair> {
        let source = doc.source_label();
        let mut pairs = Vec::new();

        for section in &doc.sections {
            if let Some(pair) = self.text_pair(&section.heading, &section.text_content, &source) {
                pairs.push(pair);
            }
            pairs.extend(
                section
                    .tables
                    .iter()
                    .filter_map(|table| self.table_pair(&section.heading, table, &source)),
            );
        }

        pairs.extend(
            doc.images
                .iter()
                .enumerate()
                .map(|(i, image)| self.image_pair(&doc.title, i, image, &source)),
        );

        log::debug!("{}: synthesized {} Q&A pairs", doc.title, pairs.len());
        pairs
    }

    /// Pair for a section's text, or `None` when the text is blank.
    pub fn text_pair(&self, heading: &str, text: &str, source: &str) -> Option<QaPair> {
        if text.trim().is_empty() {
            return None;
        }

        let content = clean_text(text);
        let question = extract_question(&content).unwrap_or_else(|| {
            if heading.is_empty() {
                FALLBACK_QUESTION.to_string()
            } else {
                heading.to_string()
            }
        });

        Some(QaPair::new(
            QaKind::Text,
            self.generalizer.generalize(&question, &content),
            self.enhancer.enhance(&content, source),
            self.keywords.extract(&content),
            source,
        ))
    }

    /// Pair for a table, or `None` when it has no body rows.
    pub fn table_pair(&self, heading: &str, table: &TableBlock, source: &str) -> Option<QaPair> {
        if table.rows.is_empty() {
            return None;
        }

        let mut keywords = table.headers.clone();
        keywords.push(heading.to_string());

        Some(QaPair::new(
            QaKind::Table,
            format!("关于{}的详细信息", heading),
            render_table(heading, table),
            keywords,
            source,
        ))
    }

    /// Pair for the image at zero-based `index`.
    pub fn image_pair(&self, title: &str, index: usize, image: &ImageAsset, source: &str) -> QaPair {
        let number = index + 1;
        let mut answer = format!("这是来自文档《{}》的第{}张图片。", title, number);
        if let Some(location) = image.position_hint.location_sentence() {
            answer.push_str(&location);
        }

        QaPair::new(
            QaKind::Image,
            format!("{}中的图片{}", title, number),
            answer,
            vec![title.to_string(), "图片".to_string(), "图像".to_string()],
            source,
        )
        .with_image(image.data.clone(), image.format.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FormatKind, PositionHint, Section};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_render_table() {
        let table = TableBlock::new(strings(&["A", "B"]), vec![strings(&["1", "2"])]);
        assert_eq!(
            render_table("X", &table),
            "表格标题：X\n表格内容：\nA | B\n---|---\n1 | 2\n"
        );
    }

    #[test]
    fn test_render_ragged_and_headerless() {
        let table = TableBlock::new(strings(&["A", "B", "C"]), vec![strings(&["1"])]);
        assert_eq!(
            render_table("X", &table),
            "表格标题：X\n表格内容：\nA | B | C\n---|---|---\n1\n"
        );

        let sheet = TableBlock::headerless(vec![strings(&["Name", "Age"]), strings(&["Bob", "30"])]);
        assert_eq!(
            render_table("工作表: Sheet1", &sheet),
            "表格标题：工作表: Sheet1\n表格内容：\nName | Age\nBob | 30\n"
        );
    }

    #[test]
    fn test_question_rules_in_order() {
        assert_eq!(
            extract_question("问题：无法登录系统解决方法如下").as_deref(),
            Some("无法登录系统")
        );
        assert_eq!(
            QuestionRule::Fault.extract("故障: 打印机卡纸 处理：取出纸张").as_deref(),
            Some("打印机卡纸")
        );
        assert_eq!(
            QuestionRule::HowTo.extract("说明\n如何导出报表\n第二行").as_deref(),
            Some("导出报表")
        );
        assert_eq!(
            extract_question("怎样重置密码").as_deref(),
            Some("重置密码")
        );
        assert_eq!(extract_question("没有匹配的内容"), None);
    }

    #[test]
    fn test_problem_rule_beats_how_to() {
        let text = "如何处理？\n问题：账号被锁定\n解决：联系管理员";
        assert_eq!(extract_question(text).as_deref(), Some("账号被锁定"));
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("\n  第一行\n\n\n第二行\n\n"), "第一行\n第二行");
    }

    #[test]
    fn test_text_pair_uses_heading() {
        let synth = QaSynthesizer::new();
        let pair = synth
            .text_pair("系统概述", "本系统用于日常管理。\n\n", "文档来源：手册")
            .unwrap();
        assert_eq!(pair.kind, QaKind::Text);
        assert_eq!(pair.question, "系统概述");
        assert_eq!(pair.answer, "文档来源：手册\n\n本系统用于日常管理。");
        assert_eq!(pair.source, "文档来源：手册");
        assert!(pair.keywords.contains(&"本系统用于日常管理".to_string()));
    }

    #[test]
    fn test_text_pair_fallback_and_blank() {
        let synth = QaSynthesizer::new();
        let pair = synth.text_pair("", "just text", "s").unwrap();
        assert_eq!(pair.question, FALLBACK_QUESTION);
        assert!(synth.text_pair("标题", "  \n ", "s").is_none());
    }

    #[test]
    fn test_table_pair() {
        let synth = QaSynthesizer::new();
        let table = TableBlock::new(strings(&["A", "B"]), vec![strings(&["1", "2"])]);
        let pair = synth.table_pair("X", &table, "s").unwrap();
        assert_eq!(pair.question, "关于X的详细信息");
        assert_eq!(pair.keywords, strings(&["A", "B", "X"]));

        let header_only = TableBlock::new(strings(&["A"]), Vec::new());
        assert!(synth.table_pair("X", &header_only, "s").is_none());
    }

    #[test]
    fn test_image_pair() {
        let synth = QaSynthesizer::new();
        let image = ImageAsset::png(vec![1, 2], PositionHint::PageNumber(4));
        let pair = synth.image_pair("手册", 1, &image, "文档来源：手册");
        assert_eq!(pair.question, "手册中的图片2");
        assert_eq!(pair.answer, "这是来自文档《手册》的第2张图片。位于第4页。");
        assert_eq!(pair.keywords, strings(&["手册", "图片", "图像"]));
        assert!(pair.has_image());
        assert_eq!(pair.image_format.as_deref(), Some("png"));

        let related = ImageAsset::new(vec![1], "jpeg", PositionHint::RelationId("rId3".into()));
        let pair = synth.image_pair("手册", 0, &related, "s");
        assert_eq!(pair.answer, "这是来自文档《手册》的第1张图片。");
    }

    #[test]
    fn test_synthesis_order() {
        let mut doc = DocumentContent::new("手册", "手册.docx", FormatKind::TextDocument);
        let mut first = Section::with_text("第一章 安装", "安装说明\n");
        first.add_table(TableBlock::new(strings(&["项"]), vec![strings(&["值"])]));
        doc.push_section(first);
        doc.push_section(Section::with_text("第二章 使用", "使用说明\n"));
        doc.add_image(ImageAsset::png(vec![0], PositionHint::None));

        let kinds: Vec<_> = QaSynthesizer::new()
            .synthesize(&doc)
            .iter()
            .map(|p| p.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![QaKind::Text, QaKind::Table, QaKind::Text, QaKind::Image]
        );
    }
}
