//! Main-content extraction from raw HTML.

use scraper::{ElementRef, Html, Selector};

/// Elements whose text is never article content.
const NOISE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "aside", "form", "noscript",
];

/// Sectioning elements that own the `header` nested in them.
const HEADER_OWNERS: &[&str] = &["article", "main"];

/// Containers tried in priority order.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".story-body",
    ".article__body",
    ".content-body",
    "#article-body",
    "#content",
    ".prose",
];

const BLOCK_SELECTOR: &str = "h1, h2, h3, h4, p";

/// A container must hold more than this many characters to be chosen.
const MIN_CONTAINER_CHARS: usize = 200;

/// Text of the first substantial content container, paragraphs separated by
/// blank lines. `None` when the page has no such container.
pub fn article_body(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            if has_noise_ancestor(&element) {
                continue;
            }
            let text = block_text(&element);
            if text.chars().count() > MIN_CONTAINER_CHARS {
                return Some(text);
            }
        }
    }
    None
}

/// All visible `<body>` text, whitespace-normalised.
pub fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(body) = Selector::parse("body") else {
        return String::new();
    };
    document
        .select(&body)
        .next()
        .map(|body| visible_text(&body))
        .unwrap_or_default()
}

fn block_text(root: &ElementRef) -> String {
    let Ok(blocks) = Selector::parse(BLOCK_SELECTOR) else {
        return visible_text(root);
    };
    let paragraphs: Vec<String> = root
        .select(&blocks)
        .filter(|el| !has_noise_ancestor(el))
        .map(|el| visible_text(&el))
        .filter(|t| !t.is_empty())
        .collect();

    if paragraphs.is_empty() {
        visible_text(root)
    } else {
        paragraphs.join("\n\n")
    }
}

fn visible_text(root: &ElementRef) -> String {
    let mut out = String::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().filter_map(ElementRef::wrap).any(is_noise);
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    normalize_whitespace(&out)
}

fn has_noise_ancestor(element: &ElementRef) -> bool {
    element.ancestors().filter_map(ElementRef::wrap).any(is_noise)
}

/// Page chrome. A `header` is chrome only at page level; inside an article it
/// carries the article's own headline.
fn is_noise(element: ElementRef) -> bool {
    match element.value().name() {
        "header" => !element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| HEADER_OWNERS.contains(&a.value().name())),
        name => NOISE_TAGS.contains(&name),
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_PAGE: &str = r#"
        <!DOCTYPE html>
        <html>
        <head><title>Test</title><style>p { color: red }</style></head>
        <body>
            <nav>Navigation links here that should not appear in extracted content</nav>
            <article>
                <h1>Main Article Title</h1>
                <p>This is the main content of the article with important information that readers need to know about.
                The article contains detailed explanations and substantial text that provides value to the reader.</p>
                <script>trackPageView();</script>
                <p>More substantial content that should be extracted as part of the main article body.
                This paragraph adds additional context and information that enriches the overall article.</p>
                <footer>Share this article</footer>
            </article>
            <footer>Footer content that should not be included</footer>
        </body>
        </html>
    "#;

    #[test]
    fn article_paragraphs_are_separated_by_blank_lines() {
        let text = article_body(ARTICLE_PAGE).unwrap();
        assert!(text.starts_with("Main Article Title\n\nThis is the main content"));
        assert!(!text.contains("Navigation"));
        assert!(!text.contains("trackPageView"));
        assert!(!text.contains("Share this"));
    }

    #[test]
    fn article_header_keeps_its_headline() {
        let html = r#"<html><body>
            <header><h1>Site Name</h1><p>Subscribe now</p></header>
            <article>
                <header><h1>Pinning Explained</h1><p class="byline">By Ana</p></header>
                <p>"#
            .to_string()
            + &"Pinned values never move in memory once pinned. ".repeat(6)
            + "</p></article></body></html>";

        let text = article_body(&html).unwrap();
        assert!(text.starts_with("Pinning Explained\n\nBy Ana\n\nPinned values"));
        assert!(!text.contains("Site Name"));
        assert!(!page_text(&html).contains("Subscribe now"));
        assert!(page_text(&html).contains("Pinning Explained"));
    }

    #[test]
    fn short_containers_are_skipped() {
        let html = r#"<html><body>
            <article><p>Teaser.</p></article>
            <div class="post-content"><p>"#
            .to_string()
            + &"Real post body text. ".repeat(20)
            + "</p></div></body></html>";
        let text = article_body(&html).unwrap();
        assert!(text.starts_with("Real post body text."));
    }

    #[test]
    fn page_without_container_has_no_article_body() {
        let html = "<html><body><div>Just some text</div></body></html>";
        assert_eq!(article_body(html), None);
    }

    #[test]
    fn page_text_drops_noise_and_collapses_whitespace() {
        let html = r#"<html><body>
            <header>Logo</header>
            <div>Hello
                 <b>world</b></div>
            <script>var x = 1;</script>
        </body></html>"#;
        assert_eq!(page_text(html), "Hello world");
    }
}
