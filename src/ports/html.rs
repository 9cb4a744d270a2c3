// src/ports/html.rs
use chrono::{DateTime, Local, Utc};
use html_escape::encode_text;
use tracing::instrument;

use crate::constants::{UNCATEGORIZED_FOLDER, UNTITLED_NOTE};
use crate::domain::Note;
use crate::infrastructure::markdown::{expand_references, outline, ContentRenderer, QuestionLookup};

/// Turns notes into HTML: the rendered body alone, or a standalone page.
#[derive(Debug, Default)]
pub struct HtmlPresenter {
    renderer: ContentRenderer,
}

impl HtmlPresenter {
    pub fn new(renderer: ContentRenderer) -> Self {
        Self { renderer }
    }

    /// Note body with citations expanded into question cards.
    pub fn render_body<L>(&self, note: &Note, lookup: &L) -> String
    where
        L: QuestionLookup + ?Sized,
    {
        expand_references(&self.renderer, &note.content, lookup)
    }

    #[instrument(level = "debug", skip_all, fields(note_id = %note.id))]
    pub fn render_page<L>(&self, note: &Note, lookup: &L) -> String
    where
        L: QuestionLookup + ?Sized,
    {
        let body = self.render_body(note, lookup);
        let title = if note.title.trim().is_empty() {
            UNTITLED_NOTE
        } else {
            note.title.as_str()
        };
        let tags = if note.tags.is_empty() {
            "No tags".to_string()
        } else {
            note.tags
                .iter()
                .map(|tag| format!(r#"<span class="tag">{}</span>"#, encode_text(tag)))
                .collect::<Vec<_>>()
                .join("")
        };
        let toc: String = outline(&note.content)
            .iter()
            .map(|item| {
                format!(
                    r##"<li class="toc-level-{}"><a href="#{}">{}</a></li>"##,
                    item.level,
                    item.id,
                    encode_text(&item.text)
                )
            })
            .collect();
        let folder = if note.folder.is_empty() {
            UNCATEGORIZED_FOLDER
        } else {
            note.folder.as_str()
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <script>
        window.MathJax = {{
            tex: {{
                inlineMath: [['\\(', '\\)']],
                displayMath: [['\\[', '\\]']],
                processEscapes: true,
                packages: {{'[+]': ['ams', 'noerrors', 'noundefined']}}
            }},
            options: {{
                processHtmlClass: 'math'
            }}
        }};
    </script>
    <script src="https://cdnjs.cloudflare.com/ajax/libs/mathjax/3.2.2/es5/tex-mml-chtml.js"></script>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 2rem auto;
            padding: 0 1rem;
            background-color: #f5f5f5;
        }}
        .note {{
            background: white;
            border-radius: 8px;
            padding: 2rem;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }}
        pre {{
            white-space: pre-wrap;
            word-wrap: break-word;
            background-color: #f8f9fa;
            padding: 1rem;
            border-radius: 4px;
        }}
        .toc {{
            font-size: 0.9em;
            border-bottom: 1px solid #eee;
            margin-bottom: 1rem;
        }}
        .ref-card {{
            border-left: 4px solid #4c6ef5;
            background: #f8f9ff;
            padding: 0.5rem 1rem;
            margin: 1rem 0;
        }}
        .ref-missing {{
            color: #c92a2a;
            font-style: italic;
        }}
        .note-info {{
            margin-top: 1rem;
            padding-top: 1rem;
            border-top: 1px solid #eee;
            font-size: 0.9em;
            color: #666;
        }}
        .tag {{
            display: inline-block;
            background: #e9ecef;
            padding: 2px 8px;
            border-radius: 4px;
            margin-right: 4px;
            font-size: 0.8em;
        }}
    </style>
</head>
<body>
    <div class="note">
        <h1>{title}</h1>
        <ul class="toc">{toc}</ul>
        <div class="note-body">{body}</div>
        <div class="note-info">
            <div>Folder: {folder}</div>
            <div>Updated: {updated}</div>
            <div>Versions: {versions}</div>
            <div class="tags">Tags: {tags}</div>
        </div>
    </div>
</body>
</html>"#,
            title = encode_text(title),
            toc = toc,
            body = body,
            folder = encode_text(folder),
            updated = format_local(note.updated_at),
            versions = note.versions.len(),
            tags = tags,
        )
    }
}

fn format_local(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
