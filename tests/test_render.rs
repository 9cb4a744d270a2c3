use nexus_study::constants::EMPTY_STATE_HTML;
use nexus_study::infrastructure::markdown::{
    expand_references, extract_citations, outline, quote_question, ContentRenderer, QuoteOptions,
    RenderOptions,
};
use nexus_study::util::testing::question;
use rstest::rstest;

#[test]
fn given_display_and_inline_math_when_rendering_then_both_are_typeset_in_order() {
    // Arrange
    let renderer = ContentRenderer::new();

    // Act
    let html = renderer.render("Area: $$\\pi r^2$$ where $r$ is the radius");

    // Assert
    let display = html.find(r"\[\pi r^2\]").expect("display math");
    let inline = html.find(r"\(r\)").expect("inline math");
    assert!(display < inline);
    assert!(!html.contains("$$"));
}

#[test]
fn given_dollar_amount_around_block_math_when_rendering_then_stray_dollars_stay_text() {
    let html = ContentRenderer::new().render("$5 is $$not$$ math$");

    assert!(html.contains("$5 is "));
    assert!(html.contains(" math$"));
    assert_eq!(html.matches("math-display").count(), 1);
    assert!(!html.contains("math-inline"));
}

#[rstest]
#[case("$a_1 * b_2 * c_3$", r"\(a_1 * b_2 * c_3\)")]
#[case("$x < y$", r"\(x &lt; y\)")]
#[case("$$\\{a\\}$$", r"\[\{a\}\]")]
fn given_markdown_syntax_inside_math_when_rendering_then_tex_is_preserved(
    #[case] input: &str,
    #[case] expected: &str,
) {
    let html = ContentRenderer::new().render(input);

    assert!(html.contains(expected), "{html}");
}

#[test]
fn given_empty_note_when_rendering_then_returns_empty_state() {
    assert_eq!(ContentRenderer::new().render(""), EMPTY_STATE_HTML);
}

#[test]
fn given_custom_empty_state_when_rendering_then_uses_it() {
    let renderer = ContentRenderer::with_options(RenderOptions {
        empty_state_html: "<p>nothing</p>".to_string(),
        ..RenderOptions::default()
    });

    assert_eq!(renderer.render("  "), "<p>nothing</p>");
}

#[test]
fn given_unbalanced_braces_when_rendering_then_keeps_source_and_rest_of_note() {
    let html = ContentRenderer::new().render("**bold** and $\\frac{1}{2$ broken");

    assert!(html.contains("<strong>bold</strong>"));
    assert!(html.contains("$\\frac{1}{2$"));
}

#[test]
fn given_script_tag_when_rendering_then_it_is_escaped() {
    let html = ContentRenderer::new().render("<script>alert(1)</script>");

    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[test]
fn given_citations_when_expanding_then_cards_follow_note_order() {
    // Arrange
    let renderer = ContentRenderer::new();
    let mut first = question("q-1");
    first.question_text = "First $x$".to_string();
    let mut second = question("q-2");
    second.question_text = "Second".to_string();
    let questions = vec![first, second];
    let body = "Intro\n\n::ref[q-2]::\n\nmiddle\n\n::ref[q-1]::";

    // Act
    let html = expand_references(&renderer, body, &questions);

    // Assert
    let second_pos = html.find(r#"data-ref-id="q-2""#).expect("second card");
    let first_pos = html.find(r#"data-ref-id="q-1""#).expect("first card");
    assert!(second_pos < first_pos);
    assert!(html.contains(r"\(x\)"));
    assert_eq!(extract_citations(body), vec!["q-2", "q-1"]);
}

#[test]
fn given_question_when_quoting_then_transcript_renders_as_blockquote() {
    let renderer = ContentRenderer::new();
    let quote = quote_question(&question("q-1"), QuoteOptions::default());

    let html = renderer.render(&quote);

    assert!(html.starts_with("<blockquote>"));
    assert!(html.contains("A. 3"));
    assert!(html.contains("Correct answer:"));
}

#[test]
fn given_headings_when_outlining_then_ids_match_rendered_anchors() {
    let markdown = "# Setup\n\n## Setup\n\ntext";
    let html = ContentRenderer::new().render(markdown);

    for item in outline(markdown) {
        assert!(html.contains(&format!(r#"id="{}""#, item.id)));
    }
}
