//! Local rule-based responder
//!
//! Replies come from ordered keyword rules over the lower-cased input. The
//! first matching rule wins; categories with several canned variants pick
//! one uniformly at random.

use rand::Rng;
use std::time::Duration;

use crate::prompts;

/// What the local responder decided the user is asking about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Help,
    Basic,
    Tags,
    Div,
    Form,
    Table,
    Semantic,
    Exercise,
    Greeting,
    CodeReview,
    Fallback,
}

struct KeywordRule {
    topic: Topic,
    contains: &'static [&'static str],
    equals: &'static [&'static str],
}

impl KeywordRule {
    fn matches(&self, lowered: &str) -> bool {
        self.contains.iter().any(|k| lowered.contains(k)) || self.equals.contains(&lowered)
    }
}

/// Declaration order is match priority
const RULES: &[KeywordRule] = &[
    KeywordRule {
        topic: Topic::Help,
        contains: &["帮助", "help"],
        equals: &["?", "？"],
    },
    KeywordRule {
        topic: Topic::Basic,
        contains: &["基础", "html基础", "入门"],
        equals: &["html"],
    },
    KeywordRule {
        topic: Topic::Tags,
        contains: &["标签", "tag"],
        equals: &[],
    },
    KeywordRule {
        topic: Topic::Div,
        contains: &["div", "容器", "盒子"],
        equals: &[],
    },
    KeywordRule {
        topic: Topic::Form,
        contains: &["表单", "form", "输入"],
        equals: &[],
    },
    KeywordRule {
        topic: Topic::Table,
        contains: &["表格", "table"],
        equals: &[],
    },
    KeywordRule {
        topic: Topic::Semantic,
        contains: &["语义", "semantic", "结构"],
        equals: &[],
    },
    KeywordRule {
        topic: Topic::Exercise,
        contains: &["练习", "任务", "作业"],
        equals: &[],
    },
    KeywordRule {
        topic: Topic::Greeting,
        contains: &["你好", "嗨", "hi", "hello"],
        equals: &[],
    },
];

/// Rough "looks like markup" check: angle brackets plus a closing or
/// self-closing tag.
pub fn contains_html_code(text: &str) -> bool {
    text.contains('<') && text.contains('>') && (text.contains("</") || text.contains("/>"))
}

/// Classify raw user input
pub fn classify(input: &str) -> Topic {
    let lowered = input.to_lowercase();
    if let Some(rule) = RULES.iter().find(|rule| rule.matches(&lowered)) {
        return rule.topic;
    }
    if contains_html_code(input) {
        Topic::CodeReview
    } else {
        Topic::Fallback
    }
}

fn pick<R: Rng>(variants: &[&'static str], rng: &mut R) -> &'static str {
    variants[rng.random_range(0..variants.len())]
}

/// Canned-answer tutor used when the local model is selected
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTutor;

impl LocalTutor {
    pub fn new() -> Self {
        Self
    }

    pub fn reply<R: Rng>(&self, input: &str, rng: &mut R) -> String {
        let topic = classify(input);
        tracing::debug!(?topic, "local tutor matched");

        match topic {
            Topic::Help => prompts::HELP.to_string(),
            Topic::Basic => prompts::LESSON_BASIC.to_string(),
            Topic::Tags => prompts::LESSON_TAGS.to_string(),
            Topic::Div => prompts::LESSON_DIV.to_string(),
            Topic::Form => prompts::LESSON_FORM.to_string(),
            Topic::Table => prompts::LESSON_TABLE.to_string(),
            Topic::Semantic => prompts::LESSON_SEMANTIC.to_string(),
            Topic::Exercise => prompts::LESSON_EXERCISE.to_string(),
            Topic::Greeting => pick(&prompts::GREETINGS, rng).to_string(),
            Topic::CodeReview => {
                format!("{}{}", pick(&prompts::CODE_PRAISE, rng), prompts::CODE_FEEDBACK_BODY)
            }
            Topic::Fallback => {
                format!("{}{}", pick(&prompts::FALLBACKS, rng), prompts::SUGGESTION_FOOTER)
            }
        }
    }

    /// Pretend-thinking delay in `[500ms, 1000ms)`
    pub fn simulated_latency<R: Rng>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.random_range(500..1000))
    }
}
