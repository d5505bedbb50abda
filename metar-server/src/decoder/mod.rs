//! Report extraction from raw upstream response bodies.
//!
//! Every upstream source returns a body in one of three shapes: plain text,
//! an HTML page, or a JSON document. A [`Decoder`] pulls a single report out
//! of such a body; [`DecoderKind`] selects the variant from configuration.

mod error;
mod html;
mod json;
mod raw;

use serde::Deserialize;

pub use error::DecodeError;
pub use html::HtmlDecoder;
pub use json::JsonDecoder;
pub use raw::RawDecoder;

/// Extracts one textual report from a raw response body.
///
/// Returns `Ok(None)` when the body parsed but holds no usable report, and
/// `Err` when the body or the selector is malformed.
pub trait Decoder {
    fn decode(
        &self,
        raw: &[u8],
        selector: &str,
        lines: &LineSelection,
    ) -> Result<Option<String>, DecodeError>;
}

/// Post-processing step shared by all decoders: split the extracted text on a
/// delimiter and keep the first or the last segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSelection {
    /// Keep the last segment instead of the first.
    pub reverse: bool,

    /// Segment delimiter. `None` or an empty string keeps the whole text.
    pub delimiter: Option<String>,
}

impl LineSelection {
    /// Create a selection.
    pub fn new(reverse: bool, delimiter: Option<String>) -> Self {
        Self { reverse, delimiter }
    }

    /// Apply the selection to `text`.
    ///
    /// Blank segments (such as the one after a trailing delimiter) are
    /// skipped, so `"a\nb\n"` split on `"\n"` in reverse yields `"b"`.
    pub fn pick<'a>(&self, text: &'a str) -> &'a str {
        let delimiter = match self.delimiter.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => return text,
        };

        let non_blank = |s: &&str| !s.trim().is_empty();
        let picked = if self.reverse {
            text.rsplit(delimiter).find(non_blank)
        } else {
            text.split(delimiter).find(non_blank)
        };

        picked.unwrap_or("")
    }
}

/// Decoder variant, as named in provider configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    Raw,
    Html,
    Json,
}

impl DecoderKind {
    /// Whether this decoder needs a non-empty selector to do anything useful.
    pub fn needs_selector(&self) -> bool {
        !matches!(self, DecoderKind::Raw)
    }
}

impl Decoder for DecoderKind {
    fn decode(
        &self,
        raw: &[u8],
        selector: &str,
        lines: &LineSelection,
    ) -> Result<Option<String>, DecodeError> {
        match self {
            DecoderKind::Raw => RawDecoder.decode(raw, selector, lines),
            DecoderKind::Html => HtmlDecoder.decode(raw, selector, lines),
            DecoderKind::Json => JsonDecoder.decode(raw, selector, lines),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Decoding the same body twice yields the same output
        #[test]
        fn raw_decoding_is_idempotent(body in "[A-Z0-9 \n]{0,64}", reverse in any::<bool>()) {
            let selection = LineSelection::new(reverse, Some("\n".to_string()));
            let first = DecoderKind::Raw.decode(body.as_bytes(), "", &selection).unwrap();
            let second = DecoderKind::Raw.decode(body.as_bytes(), "", &selection).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn html_decoding_is_idempotent(text in "[A-Z0-9][A-Z0-9 \n]{0,63}", reverse in any::<bool>()) {
            let body = format!("<html><body><pre>{text}</pre></body></html>");
            let selection = LineSelection::new(reverse, Some("\n".to_string()));
            let first = DecoderKind::Html.decode(body.as_bytes(), "pre", &selection).unwrap();
            let second = DecoderKind::Html.decode(body.as_bytes(), "pre", &selection).unwrap();
            prop_assert!(first.is_some());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn json_decoding_is_idempotent(
            items in prop::collection::vec("[A-Z0-9 ]{1,16}", 1..5),
            reverse in any::<bool>(),
        ) {
            let body = serde_json::json!({ "data": items }).to_string();
            let selection = LineSelection::new(reverse, Some("\n".to_string()));
            let first = DecoderKind::Json.decode(body.as_bytes(), "$.data", &selection).unwrap();
            let second = DecoderKind::Json.decode(body.as_bytes(), "$.data", &selection).unwrap();

            let expected = if reverse { items.last() } else { items.first() };
            prop_assert_eq!(first.as_ref(), expected);
            prop_assert_eq!(first, second);
        }

        /// The picked segment never contains the delimiter
        #[test]
        fn picked_segment_has_no_delimiter(text in "[a-c\n]{0,32}", reverse in any::<bool>()) {
            let selection = LineSelection::new(reverse, Some("\n".to_string()));
            prop_assert!(!selection.pick(&text).contains('\n'));
        }
    }
}
