pub mod detail;
pub mod list;

pub use detail::DetailEnricher;
pub use list::ListExtractor;

use scraper::{ElementRef, Selector};

use crate::utils::error::{CrawlError, Result};

pub(crate) fn css(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| CrawlError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{e:?}"),
    })
}

pub(crate) fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
