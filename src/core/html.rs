use scraper::ElementRef;
use thiserror::Error;

/// Raised when a page lacks an element the parser requires
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Missing element: {0}")]
    MissingElement(&'static str),
}

/// Trim and collapse inner whitespace runs to a single space
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All descendant text of an element, concatenated as-is
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}
