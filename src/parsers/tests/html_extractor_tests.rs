use crate::parsers::html::{self, CONTENT_CAP, LINK_TEXT_CAP};
use url::Url;

fn base() -> Url {
    Url::parse("https://example.com/articles/one").unwrap()
}

fn long_paragraph() -> String {
    "The quick brown fox jumps over the lazy dog and keeps running. ".repeat(8)
}

#[test]
fn test_title_and_description_extracted() {
    let html = r#"<html><head>
        <title>  Crawling   the Web  </title>
        <meta name="description" content="A study of crawl frontiers">
        </head><body><p>short</p></body></html>"#;
    let page = html::extract(html, &base());

    assert_eq!(page.title, "Crawling the Web");
    assert_eq!(page.description, "A study of crawl frontiers");
    assert!(page.text.contains("Crawling the Web"));
    assert!(page.text.contains("A study of crawl frontiers"));
}

#[test]
fn test_article_region_preferred_over_body_noise() {
    let para = long_paragraph();
    let html = format!(
        r#"<html><body>
        <nav>Home About Contact</nav>
        <article><p>{}</p></article>
        <footer>Copyright 2025 Example Corp</footer>
        </body></html>"#,
        para
    );
    let page = html::extract(&html, &base());

    assert!(page.text.contains("quick brown fox"));
    // Chrome outside the region stays out of the text blob
    assert!(!page.text.contains("Copyright 2025"));
    assert!(!page.text.contains("Home About Contact"));
}

#[test]
fn test_class_selector_region() {
    let para = long_paragraph();
    let html = format!(
        r#"<html><body>
        <div class="sidebar">Trending now: celebrity news</div>
        <div class="post-content"><p>{}</p></div>
        </body></html>"#,
        para
    );
    let page = html::extract(&html, &base());

    assert!(page.text.contains("quick brown fox"));
    assert!(!page.text.contains("celebrity news"));
}

#[test]
fn test_short_region_falls_through_to_fallbacks() {
    // The article is too short to qualify, so later fallbacks win
    let para = long_paragraph();
    let html = format!(
        r#"<html><body>
        <article>tiny</article>
        <div><p>{}</p></div>
        </body></html>"#,
        para
    );
    let page = html::extract(&html, &base());

    assert!(page.text.contains("quick brown fox"));
}

#[test]
fn test_script_and_style_text_excluded() {
    let para = long_paragraph();
    let html = format!(
        r#"<html><body><main>
        <script>var tracker = "SECRET_ANALYTICS";</script>
        <style>.hidden {{ display: none; }}</style>
        <p>{}</p>
        </main></body></html>"#,
        para
    );
    let page = html::extract(&html, &base());

    assert!(!page.text.contains("SECRET_ANALYTICS"));
    assert!(!page.text.contains("display: none"));
    assert!(page.text.contains("quick brown fox"));
}

#[test]
fn test_ad_class_subtrees_excluded() {
    let para = long_paragraph();
    let html = format!(
        r#"<html><body><main>
        <div class="advert-banner">Buy one get one free!</div>
        <p>{}</p>
        </main></body></html>"#,
        para
    );
    let page = html::extract(&html, &base());

    assert!(!page.text.contains("Buy one get one"));
}

#[test]
fn test_headings_and_list_items_included() {
    let html = r#"<html><body>
        <h1>Frontier Expansion</h1>
        <h2>Visited Sets</h2>
        <ul><li>breadth first</li><li>depth budget</li></ul>
        <p>short body</p>
        </body></html>"#;
    let page = html::extract(html, &base());

    assert!(page.text.contains("Frontier Expansion"));
    assert!(page.text.contains("Visited Sets"));
    assert!(page.text.contains("breadth first"));
    assert!(page.text.contains("depth budget"));
}

#[test]
fn test_content_is_capped() {
    let huge = "word ".repeat(10_000);
    let html = format!("<html><body><article><p>{}</p></article></body></html>", huge);
    let page = html::extract(&html, &base());

    assert!(page.text.len() <= CONTENT_CAP);
}

#[test]
fn test_relative_links_resolved_and_fragments_stripped() {
    let html = r#"<html><body>
        <p><a href="/guide#setup">Setup guide</a></p>
        <p><a href="other">Sibling page</a></p>
        </body></html>"#;
    let page = html::extract(html, &base());

    let urls: Vec<&str> = page.links.iter().map(|l| l.url.as_str()).collect();
    assert!(urls.contains(&"https://example.com/guide"));
    assert!(urls.contains(&"https://example.com/articles/other"));
}

#[test]
fn test_links_deduplicated_first_wins() {
    let html = r#"<html><body>
        <a href="/target">First anchor</a>
        <a href="/target#section">Second anchor, same page</a>
        </body></html>"#;
    let page = html::extract(html, &base());

    assert_eq!(page.links.len(), 1);
    assert_eq!(page.links[0].text, "First anchor");
}

#[test]
fn test_no_two_links_share_a_url() {
    let html = r#"<html><body>
        <a href="/a">one</a><a href="/b">two</a><a href="/a">dup</a>
        <a href="/c">three</a><a href="/b#x">dup2</a>
        </body></html>"#;
    let page = html::extract(html, &base());

    let mut urls: Vec<&str> = page.links.iter().map(|l| l.url.as_str()).collect();
    let total = urls.len();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), total);
}

#[test]
fn test_non_http_and_empty_anchors_skipped() {
    let html = r#"<html><body>
        <a href="mailto:team@example.com">Email us</a>
        <a href="javascript:void(0)">Click</a>
        <a href="/real">Real link</a>
        <a href="/no-text"><img src="x.png"></a>
        <a href="">Empty href</a>
        </body></html>"#;
    let page = html::extract(html, &base());

    assert_eq!(page.links.len(), 1);
    assert_eq!(page.links[0].url, "https://example.com/real");
}

#[test]
fn test_link_context_comes_from_parent() {
    let html = r#"<html><body>
        <p>Read the <a href="/guide">full guide</a> before starting.</p>
        </body></html>"#;
    let page = html::extract(html, &base());

    assert_eq!(page.links.len(), 1);
    assert_eq!(page.links[0].text, "full guide");
    assert!(page.links[0].context.contains("before starting"));
}

#[test]
fn test_link_text_and_context_capped() {
    let long_text = "a".repeat(500);
    let html = format!(
        r#"<html><body><p><a href="/x">{}</a></p></body></html>"#,
        long_text
    );
    let page = html::extract(&html, &base());

    assert!(page.links[0].text.len() <= LINK_TEXT_CAP);
    assert!(page.links[0].context.len() <= LINK_TEXT_CAP);
}

#[test]
fn test_links_in_document_order() {
    let html = r#"<html><body>
        <a href="/first">first</a>
        <a href="/second">second</a>
        <a href="/third">third</a>
        </body></html>"#;
    let page = html::extract(html, &base());

    let urls: Vec<&str> = page.links.iter().map(|l| l.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://example.com/first",
            "https://example.com/second",
            "https://example.com/third"
        ]
    );
}
