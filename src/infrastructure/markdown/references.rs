// src/infrastructure/markdown/references.rs
use std::collections::HashMap;

use html_escape::{encode_double_quoted_attribute, encode_text};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use super::placeholder::Placeholders;
use super::renderer::ContentRenderer;
use crate::constants::{OPTION_LETTERS, REF_PLACEHOLDER_BASE};
use crate::domain::Question;

lazy_static! {
    static ref CITATION_REGEX: Regex =
        Regex::new(r"::ref\[([a-zA-Z0-9-]+)\]::").expect("Failed to compile citation regex");
}

/// Read access to question records for transclusion.
pub trait QuestionLookup {
    fn lookup_question(&self, id: &str) -> Option<&Question>;
}

impl QuestionLookup for [Question] {
    fn lookup_question(&self, id: &str) -> Option<&Question> {
        self.iter().find(|q| q.id == id)
    }
}

impl QuestionLookup for Vec<Question> {
    fn lookup_question(&self, id: &str) -> Option<&Question> {
        self.as_slice().lookup_question(id)
    }
}

impl QuestionLookup for HashMap<String, Question> {
    fn lookup_question(&self, id: &str) -> Option<&Question> {
        self.get(id)
    }
}

/// Citation token for a question, as inserted into note bodies.
pub fn citation_token(question_id: &str) -> String {
    format!("::ref[{}]::", question_id)
}

/// Question ids cited in `body`, in order of appearance.
pub fn extract_citations(body: &str) -> Vec<String> {
    CITATION_REGEX
        .captures_iter(body)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Render a note body, expanding `::ref[id]::` tokens into transclusion cards.
///
/// Tokens are swapped for placeholders before the Markdown pass and the
/// cards are put back afterwards, so card HTML never goes through the parser.
/// Unknown ids produce a visible "reference missing" fragment.
pub fn expand_references<L>(renderer: &ContentRenderer, body: &str, lookup: &L) -> String
where
    L: QuestionLookup + ?Sized,
{
    if !CITATION_REGEX.is_match(body) {
        return renderer.render(body);
    }

    let placeholders = match Placeholders::for_text(body, REF_PLACEHOLDER_BASE) {
        Ok(placeholders) => placeholders,
        Err(e) => {
            warn!(error = %e, "Cannot protect citations, rendering without transclusion");
            return renderer.render(body);
        }
    };

    let mut cards: Vec<String> = Vec::new();
    let mut cited: Vec<String> = Vec::new();
    let protected = CITATION_REGEX.replace_all(body, |caps: &Captures| {
        let id = &caps[1];
        cited.push(id.to_string());
        let card = match lookup.lookup_question(id) {
            Some(question) => transclusion_card(renderer, question),
            None => {
                debug!(question_id = id, "Dangling citation");
                missing_reference(id)
            }
        };
        cards.push(card);
        placeholders.token(cards.len() - 1)
    });

    let html = renderer.render_resolving(&protected, &|heading: &str| {
        placeholders.restore_bare(heading, |index, matched| {
            cited
                .get(index)
                .map_or_else(|| matched.to_string(), |id| citation_token(id))
        })
    });

    let html = placeholders.restore_wrapped(&html, |index, matched| {
        cards.get(index).cloned().unwrap_or_else(|| matched.to_string())
    });
    placeholders.restore_bare(&html, |index, matched| {
        cards.get(index).cloned().unwrap_or_else(|| matched.to_string())
    })
}

fn transclusion_card(renderer: &ContentRenderer, question: &Question) -> String {
    let body = renderer.render_fragment(&question.question_text);
    let answer = renderer.render_fragment(&question.correct_answer);
    format!(
        concat!(
            r#"<div class="ref-card" data-ref-id="{id}">"#,
            r#"<div class="ref-card-header"><span class="ref-card-badge">Referenced question</span>"#,
            r#"<span class="ref-card-subject">{subject}</span></div>"#,
            r#"<div class="ref-card-body">{body}</div>"#,
            r#"<div class="ref-card-answer">Ans: {answer}</div>"#,
            "</div>"
        ),
        id = encode_double_quoted_attribute(&question.id),
        subject = encode_text(&question.subject),
        body = body,
        answer = answer,
    )
}

fn missing_reference(id: &str) -> String {
    format!(
        r#"<div class="ref-missing" data-ref-id="{attr}">[reference missing: {text}]</div>"#,
        attr = encode_double_quoted_attribute(id),
        text = encode_text(id),
    )
}

/// Which parts of a question go into a quoted transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteOptions {
    pub question: bool,
    pub options: bool,
    pub wrong_answer: bool,
    pub correct_answer: bool,
    pub explanation: bool,
    pub reflection: bool,
}

impl Default for QuoteOptions {
    fn default() -> Self {
        Self {
            question: true,
            options: true,
            wrong_answer: true,
            correct_answer: true,
            explanation: true,
            reflection: true,
        }
    }
}

/// Markdown blockquote transcript of a question, an inline alternative to a
/// live citation token.
pub fn quote_question(question: &Question, options: QuoteOptions) -> String {
    let mut text = format!("> **Referenced question ({})**\n", question.subject);
    if options.question {
        text.push_str(&format!("> {}\n", question.question_text));
    }
    if options.options {
        if let Some(choices) = question.options.as_deref() {
            for (letter, choice) in OPTION_LETTERS.iter().zip(choices) {
                text.push_str(&format!("> {}. {}\n", letter, choice));
            }
        }
    }
    text.push_str(">\n");
    if options.wrong_answer {
        text.push_str(&format!("> *Wrong answer:* {}\n", question.wrong_answer));
    }
    if options.correct_answer {
        text.push_str(&format!("> *Correct answer:* {}\n", question.correct_answer));
    }
    if options.explanation {
        text.push_str(&format!("> *Explanation:* {}\n", question.explanation));
    }
    if options.reflection && !question.user_notes.is_empty() {
        text.push_str(&format!("> *Reflection:* {}\n", question.user_notes));
    }
    text.push('\n');
    text
}
