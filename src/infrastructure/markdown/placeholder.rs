// src/infrastructure/markdown/placeholder.rs
use regex::{Captures, Regex};

/// Indexed placeholder tokens (`<namespace><index>x`) standing in for
/// protected content while the Markdown parser runs.
///
/// Tokens are ASCII alphanumeric so they come out of the parser verbatim.
pub(crate) struct Placeholders {
    namespace: String,
    bare: Regex,
    wrapped: Regex,
}

impl Placeholders {
    /// Picks a namespace that does not occur in `text`.
    pub(crate) fn for_text(text: &str, base: &str) -> Result<Self, regex::Error> {
        let namespace = unique_namespace(text, base);
        let escaped = regex::escape(&namespace);
        Ok(Self {
            bare: Regex::new(&format!(r"{}(\d+)x", escaped))?,
            wrapped: Regex::new(&format!(r"<p>\s*{}(\d+)x\s*</p>", escaped))?,
            namespace,
        })
    }

    pub(crate) fn token(&self, index: usize) -> String {
        format!("{}{}x", self.namespace, index)
    }

    /// Splits `text` into the stretches between tokens, yielding
    /// `(stretch, following_token)` pairs.
    pub(crate) fn segments<'t>(&self, text: &'t str) -> Vec<(&'t str, Option<&'t str>)> {
        let mut parts = Vec::new();
        let mut last = 0;
        for m in self.bare.find_iter(text) {
            parts.push((&text[last..m.start()], Some(m.as_str())));
            last = m.end();
        }
        parts.push((&text[last..], None));
        parts
    }

    /// Replaces tokens the parser wrapped in their own paragraph.
    pub(crate) fn restore_wrapped<F>(&self, html: &str, mut replace: F) -> String
    where
        F: FnMut(usize, &str) -> String,
    {
        self.wrapped
            .replace_all(html, |caps: &Captures| with_index(caps, &mut replace))
            .into_owned()
    }

    /// Replaces tokens wherever they remain.
    pub(crate) fn restore_bare<F>(&self, html: &str, mut replace: F) -> String
    where
        F: FnMut(usize, &str) -> String,
    {
        self.bare
            .replace_all(html, |caps: &Captures| with_index(caps, &mut replace))
            .into_owned()
    }
}

fn with_index<F>(caps: &Captures, replace: &mut F) -> String
where
    F: FnMut(usize, &str) -> String,
{
    let matched = caps.get(0).map_or("", |m| m.as_str());
    match caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok()) {
        Some(index) => replace(index, matched),
        None => matched.to_string(),
    }
}

/// Checked against the lowercased text as well, since heading slugs are lowercase.
fn unique_namespace(text: &str, base: &str) -> String {
    let lower = text.to_lowercase();
    let taken = |candidate: &str| text.contains(candidate) || lower.contains(candidate);
    if !taken(base) {
        return base.to_string();
    }
    let mut suffix = 1usize;
    loop {
        let candidate = format!("{}{}q", base, suffix);
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_text_without_base_when_choosing_namespace_then_uses_base() {
        let placeholders = Placeholders::for_text("plain text", "ph").unwrap();

        assert_eq!(placeholders.token(3), "ph3x");
    }

    #[test]
    fn given_text_containing_base_when_choosing_namespace_then_picks_unused_variant() {
        let placeholders = Placeholders::for_text("ph0x and ph1q", "ph").unwrap();

        assert_eq!(placeholders.token(0), "ph2q0x");
    }

    #[test]
    fn given_text_containing_base_in_upper_case_when_choosing_namespace_then_avoids_it() {
        let placeholders = Placeholders::for_text("PH0X", "ph").unwrap();

        assert_eq!(placeholders.token(0), "ph1q0x");
    }

    #[test]
    fn given_wrapped_and_bare_tokens_when_restoring_then_handles_both() {
        let placeholders = Placeholders::for_text("", "ph").unwrap();
        let html = "<p>ph0x</p>\n<p>see ph1x</p>";

        let html = placeholders.restore_wrapped(html, |i, _| format!("[W{}]", i));
        let html = placeholders.restore_bare(&html, |i, _| format!("[B{}]", i));

        assert_eq!(html, "[W0]\n<p>see [B1]</p>");
    }

    #[test]
    fn given_tokens_when_splitting_then_yields_stretches_between_them() {
        let placeholders = Placeholders::for_text("", "ph").unwrap();

        let parts = placeholders.segments("a ph0x b");

        assert_eq!(parts, vec![("a ", Some("ph0x")), (" b", None)]);
    }
}
