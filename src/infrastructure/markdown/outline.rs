// src/infrastructure/markdown/outline.rs
use std::collections::HashMap;

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use super::placeholder::Placeholders;
use super::renderer::{math_source, protect_math};
use crate::constants::MATH_PLACEHOLDER_BASE;
use crate::util::text::slugify;

/// One heading of a note, with an anchor id unique within the note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    pub level: usize,
    pub text: String,
    pub id: String,
}

/// Heading outline of a Markdown document.
///
/// Ids are `heading-<slug>`; repeated slugs get `-2`, `-3`, ... appended.
/// Math is protected while parsing, as in the renderer, so heading text keeps
/// its `$..$` source and ids agree with the rendered headings.
pub fn outline(markdown: &str) -> Vec<OutlineItem> {
    match Placeholders::for_text(markdown, MATH_PLACEHOLDER_BASE) {
        Ok(placeholders) => {
            let (protected, entries) = protect_math(markdown, &placeholders);
            outline_with(&protected, |heading| math_source(heading, &entries, &placeholders))
        }
        Err(_) => outline_with(markdown, |heading| heading.to_string()),
    }
}

/// Outline of protected text. `source_text` maps the parsed heading text
/// back to its source before slugging.
pub(crate) fn outline_with<F>(markdown: &str, source_text: F) -> Vec<OutlineItem>
where
    F: Fn(&str) -> String,
{
    let mut items = Vec::new();
    let mut slug_counts: HashMap<String, usize> = HashMap::new();
    let mut current: Option<(usize, String)> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((level as usize, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buffer)) = current.as_mut() {
                    buffer.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, parsed)) = current.take() {
                    let text = source_text(&parsed);
                    let base = format!("heading-{}", slugify(&text));
                    let count = slug_counts.entry(base.clone()).or_insert(0);
                    *count += 1;
                    let id = if *count == 1 {
                        base
                    } else {
                        format!("{}-{}", base, count)
                    };
                    items.push(OutlineItem { level, text, id });
                }
            }
            _ => {}
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_headings_when_building_outline_then_lists_levels_in_order() {
        let items = outline("# Intro\ntext\n## Details `code`\n### Deep");

        let levels: Vec<usize> = items.iter().map(|i| i.level).collect();
        assert_eq!(levels, vec![1, 2, 3]);
        assert_eq!(items[1].text, "Details code");
        assert_eq!(items[0].id, "heading-intro");
    }

    #[test]
    fn given_repeated_headings_when_building_outline_then_suffixes_ids() {
        let items = outline("# Notes\n# Notes\n# Notes");

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["heading-notes", "heading-notes-2", "heading-notes-3"]);
    }

    #[test]
    fn given_math_in_heading_when_building_outline_then_keeps_math_source() {
        let items = outline("# Area $a*b*c$ now");

        assert_eq!(items[0].text, "Area $a*b*c$ now");
        assert_eq!(items[0].id, "heading-area-a-b-c-now");
    }

    #[test]
    fn given_no_headings_when_building_outline_then_is_empty() {
        assert!(outline("just a paragraph").is_empty());
    }
}
