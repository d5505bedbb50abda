//! Decoder error types.

/// A body or selector that could not be processed.
///
/// Distinct from "no report found", which decoders signal with `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Body is not valid UTF-8
    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// CSS selector failed to parse
    #[error("invalid CSS selector {selector:?}: {message}")]
    Selector { selector: String, message: String },

    /// Body is not valid JSON
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// JSONPath expression failed to parse
    #[error("invalid JSONPath {selector:?}: {message}")]
    Path { selector: String, message: String },
}
