// src/util/text.rs
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD_REGEX: Regex =
        Regex::new(r"[^\w]+").expect("Failed to compile slug regex");
    static ref MATH_SPAN_REGEX: Regex =
        Regex::new(r"(?s)\$\$.*?\$\$|\$[^$]+?\$").expect("Failed to compile math span regex");
}

/// Lowercase slug: runs of non-word characters become a single `-`.
/// Word characters include non-ASCII letters, so CJK headings keep their text.
pub fn slugify(text: &str) -> String {
    NON_WORD_REGEX
        .replace_all(&text.trim().to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Case-insensitive substring test; an empty needle always matches.
pub fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}

/// First non-empty line of Markdown source, shortened to `max_chars`.
///
/// Heading markers and quote markers are dropped, math is shown as `[math]`.
///
/// # Examples
///
/// ```
/// use nexus_study::util::text::excerpt;
///
/// assert_eq!(excerpt("\n# What is a Tree?\nbody", 40), "What is a Tree?");
/// assert_eq!(excerpt("Solve $x^2$ now", 40), "Solve [math] now");
/// ```
pub fn excerpt(markdown: &str, max_chars: usize) -> String {
    let line = markdown
        .lines()
        .map(|line| line.trim().trim_start_matches(['#', '>']).trim())
        .find(|line| !line.is_empty())
        .unwrap_or("");
    let line = MATH_SPAN_REGEX.replace_all(line, "[math]");

    if line.chars().count() <= max_chars {
        return line.into_owned();
    }
    let mut shortened: String = line.chars().take(max_chars.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Intro", "intro")]
    #[case("Details code", "details-code")]
    #[case("  What is a Tree?  ", "what-is-a-tree")]
    #[case("函数 极限", "函数-极限")]
    fn given_heading_text_when_slugifying_then_joins_words_with_dashes(
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(slugify(input), expected);
    }

    #[test]
    fn given_mixed_case_when_matching_then_ignores_case() {
        assert!(contains_ignore_case("Linear Algebra", "algebra"));
        assert!(!contains_ignore_case("Linear Algebra", "calculus"));
        assert!(contains_ignore_case("anything", ""));
    }

    #[test]
    fn given_long_line_when_excerpting_then_truncates_with_ellipsis() {
        let text = excerpt("abcdefghij", 5);

        assert_eq!(text, "abcd…");
    }

    #[test]
    fn given_blank_text_when_excerpting_then_returns_empty_string() {
        assert_eq!(excerpt("\n  \n", 10), "");
    }
}
