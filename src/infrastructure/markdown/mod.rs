// src/infrastructure/markdown/mod.rs
//
// Shared rendering pipeline: every display surface goes through these
// functions so math protection and citation expansion behave identically.
pub mod math;
pub mod outline;
mod placeholder;
pub mod references;
pub mod renderer;

pub use math::{MathEngine, MathError, MathJaxEngine, MathMode};
pub use outline::{outline, OutlineItem};
pub use references::{
    citation_token, expand_references, extract_citations, quote_question, QuestionLookup,
    QuoteOptions,
};
pub use renderer::{markdown_to_html, ContentRenderer, RenderOptions};
