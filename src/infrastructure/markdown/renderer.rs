// src/infrastructure/markdown/renderer.rs
use std::panic::{self, AssertUnwindSafe};

use html_escape::encode_text;
use lazy_static::lazy_static;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use regex::{Captures, Regex};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::math::{MathEngine, MathJaxEngine, MathMode};
use super::outline::{outline, outline_with, OutlineItem};
use super::placeholder::Placeholders;
use crate::constants::{EMPTY_STATE_HTML, MATH_PLACEHOLDER_BASE};

lazy_static! {
    static ref BLOCK_MATH_REGEX: Regex =
        Regex::new(r"(?s)\$\$(.*?)\$\$").expect("Failed to compile block math regex");
    static ref INLINE_MATH_REGEX: Regex =
        Regex::new(r"\$([^$]+?)\$").expect("Failed to compile inline math regex");
}

#[derive(Error, Debug)]
enum RenderError {
    #[error("failed to build placeholder pattern: {0}")]
    Placeholder(#[from] regex::Error),
    #[error("markdown transform panicked")]
    Markdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Render raw HTML found in the Markdown as escaped text
    pub escape_raw_html: bool,
    pub empty_state_html: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            escape_raw_html: true,
            empty_state_html: EMPTY_STATE_HTML.to_string(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct MathEntry {
    tex: String,
    mode: MathMode,
    /// Original delimited source, kept for the per-expression fallback
    source: String,
}

/// Markdown to HTML with `$..$` / `$$..$$` math protected from the Markdown parser.
///
/// The output is trusted HTML; marking it safe for insertion is up to the caller.
pub struct ContentRenderer {
    engine: Box<dyn MathEngine>,
    options: RenderOptions,
}

impl ContentRenderer {
    pub fn new() -> Self {
        Self::with_engine(MathJaxEngine::new(), RenderOptions::default())
    }

    pub fn with_engine(engine: impl MathEngine + 'static, options: RenderOptions) -> Self {
        Self {
            engine: Box::new(engine),
            options,
        }
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self::with_engine(MathJaxEngine::new(), options)
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render `text`; empty input yields the empty-state fragment.
    ///
    /// Never fails: on an internal error the whole input comes back HTML-escaped.
    pub fn render(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return self.options.empty_state_html.clone();
        }
        self.render_fragment(text)
    }

    /// Like [`render`](Self::render) but empty input yields an empty string.
    /// Used for nested snippets such as the parts of a transclusion card.
    pub fn render_fragment(&self, text: &str) -> String {
        self.render_resolving(text, &|heading: &str| heading.to_string())
    }

    /// Render text whose caller already swapped parts of the source for
    /// placeholders. `source_of` maps heading text back to the source, so
    /// heading ids never carry placeholder tokens.
    #[instrument(level = "trace", skip(self, source_of))]
    pub(crate) fn render_resolving(&self, text: &str, source_of: &dyn Fn(&str) -> String) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        match self.try_render(text, source_of) {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "Rendering failed, falling back to escaped text");
                encode_text(text).into_owned()
            }
        }
    }

    fn try_render(&self, text: &str, source_of: &dyn Fn(&str) -> String) -> Result<String, RenderError> {
        let placeholders = Placeholders::for_text(text, MATH_PLACEHOLDER_BASE)?;
        let (protected, entries) = protect_math(text, &placeholders);
        let headings = outline_with(&protected, |heading| {
            source_of(&math_source(heading, &entries, &placeholders))
        });

        let options = &self.options;
        let html = panic::catch_unwind(AssertUnwindSafe(|| {
            markdown_with_headings(&protected, options, headings)
        }))
        .map_err(|_| RenderError::Markdown)?;

        if entries.is_empty() {
            return Ok(html);
        }
        Ok(self.restore_math(&html, &entries, &placeholders))
    }

    fn restore_math(&self, html: &str, entries: &[MathEntry], placeholders: &Placeholders) -> String {
        // A display expression alone in its paragraph replaces the paragraph.
        let html = placeholders.restore_wrapped(html, |index, matched| match entries.get(index) {
            Some(entry) if entry.mode == MathMode::Display => {
                self.typeset(entry, MathMode::Display)
            }
            _ => matched.to_string(),
        });

        placeholders.restore_bare(&html, |index, matched| match entries.get(index) {
            Some(entry) => self.typeset(entry, entry.mode),
            None => matched.to_string(),
        })
    }

    fn typeset(&self, entry: &MathEntry, mode: MathMode) -> String {
        match self.engine.render(&entry.tex, mode) {
            Ok(html) => html,
            Err(e) => {
                debug!(error = %e, tex = %entry.tex, "Keeping math source as text");
                encode_text(&entry.source).into_owned()
            }
        }
    }
}

impl Default for ContentRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContentRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentRenderer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Block math is extracted first so its `$$` never pairs up as inline
/// delimiters. Inline math is then matched only between block placeholders,
/// so an inline span cannot swallow a block expression.
pub(crate) fn protect_math(text: &str, placeholders: &Placeholders) -> (String, Vec<MathEntry>) {
    let mut entries = Vec::new();

    let after_block = BLOCK_MATH_REGEX.replace_all(text, |caps: &Captures| {
        entries.push(MathEntry {
            tex: caps[1].to_string(),
            mode: MathMode::Display,
            source: caps[0].to_string(),
        });
        placeholders.token(entries.len() - 1)
    });

    let mut protected = String::with_capacity(after_block.len());
    for (stretch, token) in placeholders.segments(&after_block) {
        let stretch = INLINE_MATH_REGEX.replace_all(stretch, |caps: &Captures| {
            entries.push(MathEntry {
                tex: caps[1].to_string(),
                mode: MathMode::Inline,
                source: caps[0].to_string(),
            });
            placeholders.token(entries.len() - 1)
        });
        protected.push_str(&stretch);
        if let Some(token) = token {
            protected.push_str(token);
        }
    }

    (protected, entries)
}

/// Math placeholders in `text` replaced by their delimited source.
pub(crate) fn math_source(text: &str, entries: &[MathEntry], placeholders: &Placeholders) -> String {
    placeholders.restore_bare(text, |index, matched| {
        entries
            .get(index)
            .map_or_else(|| matched.to_string(), |entry| entry.source.clone())
    })
}

/// Plain Markdown transform used by the renderer.
///
/// Headings get the anchor ids of [`outline`](super::outline::outline).
pub fn markdown_to_html(text: &str, options: &RenderOptions) -> String {
    markdown_with_headings(text, options, outline(text))
}

fn markdown_with_headings(text: &str, options: &RenderOptions, headings: Vec<OutlineItem>) -> String {
    let mut parser_options = Options::empty();
    parser_options.insert(Options::ENABLE_STRIKETHROUGH);
    parser_options.insert(Options::ENABLE_TABLES);
    parser_options.insert(Options::ENABLE_FOOTNOTES);
    parser_options.insert(Options::ENABLE_TASKLISTS);

    let escape_raw_html = options.escape_raw_html;
    let mut heading_ids = headings.into_iter().map(|item| item.id);
    let parser = Parser::new_ext(text, parser_options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) if escape_raw_html => Event::Text(raw),
        Event::Start(Tag::Heading {
            level,
            id,
            classes,
            attrs,
        }) => {
            let generated = heading_ids.next().map(CowStr::from);
            Event::Start(Tag::Heading {
                level,
                id: id.or(generated),
                classes,
                attrs,
            })
        }
        other => other,
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}
