use crate::parsers::text;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Pages read from a PDF before giving up; the content cap bounds the rest.
pub const PDF_PAGE_CEILING: usize = 50;

/// Extracts text from raw PDF bytes, page by page, up to the page ceiling.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| format!("pdf extraction failed: {}", e))?;

    let text = pages
        .iter()
        .take(PDF_PAGE_CEILING)
        .map(|page| text::normalize(page))
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(text)
}

/// Decodes JSON bytes and reprints them in a stable, readable form.
pub fn extract_json(raw: &str) -> Result<String, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("json decode failed: {}", e))?;
    serde_json::to_string_pretty(&value).map_err(|e| format!("json reprint failed: {}", e))
}

/// Pulls the text content out of an XML document, dropping markup.
pub fn extract_xml(raw: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut parts: Vec<String> = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => {
                if let Ok(txt) = t.unescape() {
                    let trimmed = txt.trim();
                    if !trimmed.is_empty() {
                        parts.push(trimmed.to_string());
                    }
                }
            }
            Ok(Event::CData(c)) => {
                let txt = String::from_utf8_lossy(&c).trim().to_string();
                if !txt.is_empty() {
                    parts.push(txt);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("xml parse failed: {}", e)),
            _ => {}
        }
    }

    Ok(parts.join(" "))
}

/// YAML is kept as-is apart from whitespace normalization; its indentation
/// already reads as structure.
pub fn extract_yaml(raw: &str) -> String {
    text::normalize(raw)
}
