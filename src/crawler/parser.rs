//! HTML link extraction
//!
//! Every `<a href>` on the page becomes a `DiscoveredLink`. The title comes
//! from the anchor's `title` attribute, falling back to its text; anchors
//! with neither are skipped, as are download links. Hrefs are returned as
//! written: deciding which ones are worth crawling is the inclusion
//! filter's job.

use crate::crawler::fetcher::DiscoveredLink;
use scraper::{ElementRef, Html, Selector};

/// Extracts all titled anchors from an HTML document
///
/// # Example
///
/// ```
/// use linkgraph::crawler::extract_links;
///
/// let html = r#"<p><a href="./Logic" title="Logic">logic</a></p>"#;
/// let links = extract_links(html);
/// assert_eq!(links[0].href, "./Logic");
/// assert_eq!(links[0].title, "Logic");
/// ```
pub fn extract_links(html: &str) -> Vec<DiscoveredLink> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            let Some(href) = element.value().attr("href").map(str::trim) else {
                continue;
            };
            if href.is_empty() {
                continue;
            }

            if let Some(title) = link_title(&element) {
                links.push(DiscoveredLink::new(href, title));
            }
        }
    }

    links
}

fn link_title(element: &ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attr("title")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| {
            let text = element.text().collect::<String>();
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
}
