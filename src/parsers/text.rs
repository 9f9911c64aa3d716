/// Normalizes plain-text content (text, YAML, reformatted documents) by:
/// - Trimming whitespace from each line
/// - Collapsing runs of blank lines into single paragraph breaks
/// - Normalizing whitespace within each paragraph
pub fn normalize(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let paragraphs = split_into_paragraphs(text);
    paragraphs
        .iter()
        .map(|para| para.join(" "))
        .map(|para| normalize_whitespace_in_segment(&para))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Splits text into paragraphs based on empty lines.
fn split_into_paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut paragraphs: Vec<Vec<&str>> = Vec::new();
    let mut current_paragraph: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            // Empty line marks a paragraph boundary
            if !current_paragraph.is_empty() {
                paragraphs.push(current_paragraph);
                current_paragraph = Vec::new();
            }
        } else {
            current_paragraph.push(trimmed);
        }
    }

    if !current_paragraph.is_empty() {
        paragraphs.push(current_paragraph);
    }

    paragraphs
}

/// Normalizes whitespace within a single line or paragraph.
fn normalize_whitespace_in_segment(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}
