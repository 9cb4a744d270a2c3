// src/infrastructure/markdown/math.rs
use html_escape::encode_text;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathMode {
    Inline,
    Display,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("empty math expression")]
    Empty,
    #[error("unbalanced braces in math expression: {0}")]
    UnbalancedBraces(String),
}

/// Turns one TeX expression into an HTML fragment.
pub trait MathEngine {
    fn render(&self, tex: &str, mode: MathMode) -> Result<String, MathError>;
}

/// Emits MathJax delimiters (`\(..\)` / `\[..\]`) for client-side typesetting.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathJaxEngine;

impl MathJaxEngine {
    pub fn new() -> Self {
        Self
    }
}

impl MathEngine for MathJaxEngine {
    fn render(&self, tex: &str, mode: MathMode) -> Result<String, MathError> {
        let tex = tex.trim();
        if tex.is_empty() {
            return Err(MathError::Empty);
        }
        check_braces(tex)?;

        let escaped = encode_text(tex);
        Ok(match mode {
            MathMode::Inline => format!(r#"<span class="math math-inline">\({}\)</span>"#, escaped),
            MathMode::Display => {
                format!(r#"<span class="math math-display">\[{}\]</span>"#, escaped)
            }
        })
    }
}

/// `\{` and `\}` are literal braces and do not count.
fn check_braces(tex: &str) -> Result<(), MathError> {
    let mut depth: i64 = 0;
    let mut chars = tex.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return Err(MathError::UnbalancedBraces(tex.to_string()));
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(MathError::UnbalancedBraces(tex.to_string()));
    }
    Ok(())
}
