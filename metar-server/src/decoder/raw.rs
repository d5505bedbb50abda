//! Plain-text bodies.

use super::{DecodeError, Decoder, LineSelection};

/// Treats the whole body as the report. The selector is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDecoder;

impl Decoder for RawDecoder {
    fn decode(
        &self,
        raw: &[u8],
        _selector: &str,
        lines: &LineSelection,
    ) -> Result<Option<String>, DecodeError> {
        let text = String::from_utf8_lossy(raw);
        Ok(Some(lines.pick(&text).to_string()))
    }
}
