use crate::parsers::text;

#[test]
fn test_empty_text() {
    assert_eq!(text::normalize(""), "");
}

#[test]
fn test_whitespace_only() {
    assert_eq!(text::normalize("   \n   \t   \r\n   "), "");
}

#[test]
fn test_single_line() {
    assert_eq!(text::normalize("Hello, world!"), "Hello, world!");
}

#[test]
fn test_lines_within_a_paragraph_joined() {
    let input = "Line 1\nLine 2\nLine 3";
    assert_eq!(text::normalize(input), "Line 1 Line 2 Line 3");
}

#[test]
fn test_paragraph_breaks_preserved() {
    let input = "Paragraph 1.\n\n\n\nParagraph 2.\n\nParagraph 3.";
    assert_eq!(
        text::normalize(input),
        "Paragraph 1.\n\nParagraph 2.\n\nParagraph 3."
    );
}

#[test]
fn test_mixed_whitespace_trimmed() {
    let input = "  Line 1  \n  Line 2  \t\r\n  Line 3  ";
    assert_eq!(text::normalize(input), "Line 1 Line 2 Line 3");
}

#[test]
fn test_multiple_spaces_collapsed() {
    let input = "Hello    world!    This    is    a    test.";
    assert_eq!(text::normalize(input), "Hello world! This is a test.");
}

#[test]
fn test_urls_kept_intact() {
    let input = "Check https://example.com/page?a=1 for details.";
    assert_eq!(
        text::normalize(input),
        "Check https://example.com/page?a=1 for details."
    );
}
