//! DOM helpers shared by the source parsers.

use reqwest::Url;
use scraper::ElementRef;

/// Trimmed, non-empty text nodes under `element`, in document order
pub fn text_lines(element: ElementRef<'_>) -> Vec<String> {
    element
        .text()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rendered-text approximation: one line per text node
pub fn inner_text(element: ElementRef<'_>) -> String {
    text_lines(element).join("\n")
}

/// All text with whitespace runs collapsed to single spaces
pub fn collapsed_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Up to `max` enclosing elements, nearest first, stopping below `<body>`
pub fn ancestors<'a>(
    element: ElementRef<'a>,
    max: usize,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take_while(|ancestor| !matches!(ancestor.value().name(), "body" | "html"))
        .take(max)
}

/// Absolute form of an anchor's `href`, resolved against the page URL
pub fn resolve_link(page_url: &Url, element: ElementRef<'_>) -> Option<String> {
    let href = element.value().attr("href")?.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    page_url.join(href).ok().map(|url| url.to_string())
}
