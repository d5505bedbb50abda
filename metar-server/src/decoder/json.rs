//! JSON documents.

use jsonpath_rust::JsonPath;
use serde_json::Value;

use super::{DecodeError, Decoder, LineSelection};

/// Extracts the report at a JSONPath expression.
///
/// An array result yields its first (or, when reversed, last) element and is
/// not split further; the first element must be a string. A string result goes
/// through the usual line selection. Anything else is "not found".
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn decode(
        &self,
        raw: &[u8],
        selector: &str,
        lines: &LineSelection,
    ) -> Result<Option<String>, DecodeError> {
        let document: Value = serde_json::from_slice(raw)?;

        let path: JsonPath = JsonPath::try_from(selector).map_err(|e| DecodeError::Path {
            selector: selector.to_string(),
            message: e.to_string(),
        })?;

        let Some(resolved) = resolve(path.find(&document)) else {
            return Ok(None);
        };

        match resolved {
            Value::Array(items) => {
                let picked = if lines.reverse {
                    items.last()
                } else {
                    items.first()
                };
                match (items.first(), picked) {
                    (Some(Value::String(_)), Some(Value::String(text))) => Ok(Some(text.clone())),
                    _ => Ok(None),
                }
            }
            Value::String(text) => Ok(Some(lines.pick(&text).to_string())),
            _ => Ok(None),
        }
    }
}

/// Collapse the list of path matches into the single resolved value.
///
/// One match resolves to itself; several matches behave like an array of
/// the matched nodes.
fn resolve(found: Value) -> Option<Value> {
    match found {
        Value::Null => None,
        Value::Array(mut hits) => match hits.len() {
            0 => None,
            1 => Some(hits.remove(0)),
            _ => Some(Value::Array(hits)),
        },
        other => Some(other),
    }
}
