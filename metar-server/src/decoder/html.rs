//! HTML pages.

use scraper::{Html, Selector};

use super::{DecodeError, Decoder, LineSelection};

/// Extracts the report from the single element matching a CSS selector.
///
/// Zero matches and ambiguous (multiple) matches are both "not found".
/// On a unique match the element's first text node is the report.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlDecoder;

impl Decoder for HtmlDecoder {
    fn decode(
        &self,
        raw: &[u8],
        selector: &str,
        lines: &LineSelection,
    ) -> Result<Option<String>, DecodeError> {
        let body = std::str::from_utf8(raw)?;

        let query = Selector::parse(selector).map_err(|e| DecodeError::Selector {
            selector: selector.to_string(),
            message: e.to_string(),
        })?;

        let document = Html::parse_document(body);
        let mut matches = document.select(&query);

        let (Some(element), None) = (matches.next(), matches.next()) else {
            return Ok(None);
        };

        let Some(text) = element.text().next() else {
            return Ok(None);
        };

        Ok(Some(lines.pick(text).to_string()))
    }
}
