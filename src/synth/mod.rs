//! Heuristic Q&A synthesis.
//!
//! [`QaSynthesizer`] walks a [`DocumentContent`] and emits text, table and
//! image pairs. Text pairs run through [`QuestionGeneralizer`],
//! [`AnswerEnhancer`] and [`KeywordExtractor`].
//!
//! [`DocumentContent`]: crate::model::DocumentContent

mod enhance;
mod generalize;
mod keywords;
mod synthesizer;

pub use enhance::{sql_statements, step_spans, AnswerEnhancer};
pub use generalize::{prefix_for, QuestionGeneralizer, PREFIX_RULES, QUESTION_MARKERS};
pub use keywords::{KeywordExtractor, ACTION_TERMS, DEFAULT_MAX_CJK_TERMS, TECH_TERMS};
pub use synthesizer::{
    clean_text, extract_question, render_table, QaSynthesizer, QuestionRule, FALLBACK_QUESTION,
    QUESTION_RULES,
};
