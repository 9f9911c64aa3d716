pub mod docs;
pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

/// Document kinds a fetched URL can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    /// Rendered web page
    Html,
    /// PDF document
    Pdf,
    /// YAML file
    Yaml,
    /// JSON file
    Json,
    /// XML file
    Xml,
}

impl DocKind {
    /// Classifies a URL by path suffix. Anything unrecognized is HTML.
    pub fn from_url(url: &str) -> Self {
        // Strip query strings before looking at the suffix
        let path = url.split('?').next().unwrap_or(url).to_lowercase();

        if path.ends_with(".pdf") {
            DocKind::Pdf
        } else if path.ends_with(".yaml") || path.ends_with(".yml") {
            DocKind::Yaml
        } else if path.ends_with(".json") {
            DocKind::Json
        } else if path.ends_with(".xml") || path.ends_with(".rss") || path.ends_with(".atom") {
            DocKind::Xml
        } else {
            DocKind::Html
        }
    }

    /// Refines a classification with the response Content-Type, which wins
    /// over the suffix when the two disagree.
    pub fn refine(self, content_type: &str) -> Self {
        let ct = content_type.to_lowercase();
        if ct.contains("application/pdf") {
            DocKind::Pdf
        } else if ct.contains("application/json") {
            DocKind::Json
        } else if ct.contains("yaml") {
            DocKind::Yaml
        } else if ct.contains("xml") && !ct.contains("xhtml") {
            DocKind::Xml
        } else if ct.contains("text/html") || ct.contains("xhtml") {
            DocKind::Html
        } else {
            self
        }
    }

    /// Whether pages of this kind are loaded through the browser.
    /// Only rendered HTML carries outbound links.
    pub fn needs_browser(&self) -> bool {
        matches!(self, DocKind::Html)
    }
}
