//! HTML anchor extraction
//!
//! Anchors are returned raw: resolution against the page URL, scoping and
//! classification happen in the engine.

use scraper::{Html, Selector};

/// An `<a>` element as found in the markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// The `href` attribute, unresolved
    pub href: String,

    /// Visible text with whitespace collapsed
    pub text: String,

    /// The anchor's `type` attribute (an advisory MIME type), if present
    pub type_hint: Option<String>,
}

/// Extracts anchors from an HTML document
pub trait LinkExtractor: Send + Sync {
    fn extract_anchors(&self, html: &str) -> Vec<Anchor>;
}

/// `LinkExtractor` built on the `scraper` crate
///
/// # Example
///
/// ```
/// use pdf_harvest::crawler::{HtmlLinkExtractor, LinkExtractor};
///
/// let html = r#"<body><a href="report.pdf">Annual <b>Report</b></a></body>"#;
/// let anchors = HtmlLinkExtractor::new().extract_anchors(html);
/// assert_eq!(anchors[0].href, "report.pdf");
/// assert_eq!(anchors[0].text, "Annual Report");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_anchors(&self, html: &str) -> Vec<Anchor> {
        let Ok(a_selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };
        let document = Html::parse_document(html);

        document
            .select(&a_selector)
            .filter_map(|element| {
                let href = element.value().attr("href")?.trim();
                if href.is_empty() {
                    return None;
                }

                // Same-page jumps never lead anywhere new
                if href.starts_with('#') {
                    return None;
                }

                let text = collapse_whitespace(&element.text().collect::<String>());
                let type_hint = element
                    .value()
                    .attr("type")
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string);

                Some(Anchor {
                    href: href.to_string(),
                    text,
                    type_hint,
                })
            })
            .collect()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
