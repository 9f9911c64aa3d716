use crate::records::LinkRecord;
use crate::utils::{collapse_whitespace, truncate_chars};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Maximum characters retained for a page's extracted text.
pub const CONTENT_CAP: usize = 15_000;

/// Maximum characters kept of anchor text and link context.
pub const LINK_TEXT_CAP: usize = 200;

/// Minimum length for a candidate content region to be accepted.
pub const REGION_MIN_LEN: usize = 200;

/// Paragraphs concatenated when no content region qualifies.
pub const PARAGRAPH_FALLBACK_COUNT: usize = 10;

/// Subtrees that never contribute page text.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "noscript", "iframe", "form", "svg",
];

/// Class/id fragments marking ad, sidebar and comment containers.
const SKIPPED_CLASS_HINTS: &[&str] = &[
    "advert", "ad-", "sidebar", "comment", "promo", "cookie", "banner", "share-", "social",
];

/// Candidate selectors for the primary content region, tried in order.
/// The order is a tunable priority list, not a guarantee.
const CONTENT_SELECTORS: &[&str] = &[
    "main article",
    "article",
    ".post-content",
    ".entry-content",
    "[role=\"main\"]",
    "main",
    "#content",
    ".content",
];

/// Everything pulled out of one HTML document.
#[derive(Debug, Default)]
pub struct ExtractedPage {
    pub title: String,
    pub description: String,
    pub text: String,
    pub links: Vec<LinkRecord>,
}

/// Extracts readable text and outbound links from rendered HTML.
///
/// The text blob is `title + description + headings + primary content +
/// list items`, whitespace-collapsed and truncated to [`CONTENT_CAP`].
/// Links are absolute, fragment-free, http(s)-only and unique by URL.
pub fn extract(html: &str, base_url: &Url) -> ExtractedPage {
    let doc = Html::parse_document(html);

    let title = extract_title(&doc);
    let description = extract_description(&doc);
    let headings = extract_block(&doc, "h1, h2, h3");
    let list_items = extract_block(&doc, "li");
    let primary = extract_primary_content(&doc);
    let links = extract_links(&doc, base_url);

    let mut blocks: Vec<&str> = Vec::new();
    for block in [&title, &description, &headings, &primary, &list_items] {
        if !block.is_empty() {
            blocks.push(block);
        }
    }
    let text = truncate_chars(&blocks.join("\n\n"), CONTENT_CAP);

    ExtractedPage {
        title,
        description,
        text,
        links,
    }
}

fn extract_title(doc: &Html) -> String {
    let selector = Selector::parse("title").unwrap();
    doc.select(&selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

fn extract_description(doc: &Html) -> String {
    let selector = Selector::parse(r#"meta[name="description"]"#).unwrap();
    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .unwrap_or_default()
}

/// Collects the text of every element matching `selector_str` into one
/// whitespace-collapsed block.
fn extract_block(doc: &Html, selector_str: &str) -> String {
    let selector = Selector::parse(selector_str).unwrap();
    let parts: Vec<String> = doc
        .select(&selector)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();
    parts.join("\n")
}

/// Locates the primary content region by trying the selector priority list,
/// falling back to leading paragraphs and finally the whole body.
fn extract_primary_content(doc: &Html) -> String {
    for selector_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = doc.select(&selector).next() {
                let text = element_text(element);
                if text.len() >= REGION_MIN_LEN {
                    ::log::debug!("Content region matched selector: {}", selector_str);
                    return text;
                }
            }
        }
    }

    // No region qualified; concatenate the first paragraphs
    let p_selector = Selector::parse("p").unwrap();
    let paragraphs: Vec<String> = doc
        .select(&p_selector)
        .take(PARAGRAPH_FALLBACK_COUNT)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();
    let joined = paragraphs.join(" ");
    if joined.len() >= REGION_MIN_LEN {
        ::log::debug!("Content region fell back to leading paragraphs");
        return joined;
    }

    // Last resort: full body text
    let body_selector = Selector::parse("body").unwrap();
    doc.select(&body_selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// Text of an element with non-content subtrees skipped and whitespace
/// collapsed.
fn element_text(element: ElementRef) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    collapse_whitespace(&out)
}

fn collect_text(element: ElementRef, out: &mut String) {
    if is_skipped(element) {
        return;
    }
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_ref) = ElementRef::wrap(child) {
            collect_text(child_ref, out);
        }
    }
}

fn is_skipped(element: ElementRef) -> bool {
    let name = element.value().name();
    if SKIPPED_TAGS.contains(&name) {
        return true;
    }

    let mut markers = String::new();
    if let Some(class) = element.value().attr("class") {
        markers.push_str(&class.to_lowercase());
        markers.push(' ');
    }
    if let Some(id) = element.value().attr("id") {
        markers.push_str(&id.to_lowercase());
    }
    if markers.is_empty() {
        return false;
    }
    SKIPPED_CLASS_HINTS.iter().any(|hint| markers.contains(hint))
}

/// Harvests anchors with a resolvable href and visible text, deduplicated
/// by absolute URL (first occurrence wins).
fn extract_links(doc: &Html, base_url: &Url) -> Vec<LinkRecord> {
    let selector = Selector::parse("a[href]").unwrap();
    let mut seen: HashSet<String> = HashSet::new();
    let mut links = Vec::new();

    for anchor in doc.select(&selector) {
        let href = match anchor.value().attr("href") {
            Some(h) if !h.trim().is_empty() => h,
            _ => continue,
        };

        let text = element_text(anchor);
        if text.is_empty() {
            continue;
        }

        let mut resolved = match base_url.join(href) {
            Ok(u) => u,
            Err(_) => continue,
        };
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }
        resolved.set_fragment(None);

        let url_str = resolved.to_string();
        if !seen.insert(url_str.clone()) {
            continue;
        }

        let context = anchor
            .parent()
            .and_then(ElementRef::wrap)
            .map(element_text)
            .unwrap_or_default();

        links.push(LinkRecord::new(
            url_str,
            truncate_chars(&text, LINK_TEXT_CAP),
            truncate_chars(&context, LINK_TEXT_CAP),
        ));
    }

    ::log::debug!("HTML extractor found {} unique links", links.len());
    links
}
