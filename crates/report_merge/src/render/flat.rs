//! Literal token substitution
//!
//! Tokens are written as `[[KEY]]` and replaced verbatim, with no loops and
//! no conditionals. Tokens outside the key catalogue are left in place.

use super::runs::normalize_split_tags;
use crate::model::FlatData;
use crate::text::escape_xml;

pub const TOKEN_OPEN: &str = "[[";
pub const TOKEN_CLOSE: &str = "]]";

/// `[[KEY]]`
pub fn token(key: &str) -> String {
    format!("{}{}{}", TOKEN_OPEN, key, TOKEN_CLOSE)
}

/// Escape a value for XML character data.
///
/// Newlines become character references, and so does `[`, which keeps a value
/// from ever reading as a token in the patched text.
pub fn escape_value(value: &str) -> String {
    escape_xml(value)
        .replace("\r\n", "\n")
        .replace('\n', "&#10;")
        .replace('[', "&#91;")
}

/// Replace every catalogue token in one XML part.
///
/// Tokens split across runs are joined first. The text is scanned once, left
/// to right, so inserted values are never scanned again. Keys without a value
/// are replaced with an empty string.
pub fn substitute_tokens(xml: &str, data: &FlatData, keys: &[&str]) -> String {
    let text = normalize_split_tags(xml, TOKEN_OPEN, TOKEN_CLOSE);
    let mut out = String::with_capacity(text.len());
    let mut replaced = 0usize;
    let mut rest = text.as_str();

    while let Some(open) = rest.find(TOKEN_OPEN) {
        out.push_str(&rest[..open]);
        let after = &rest[open + TOKEN_OPEN.len()..];
        let key = after
            .find(TOKEN_CLOSE)
            .map(|close| &after[..close])
            .filter(|key| keys.contains(key));
        match key {
            Some(key) => {
                out.push_str(&escape_value(data.get(key).unwrap_or_default()));
                rest = &after[key.len() + TOKEN_CLOSE.len()..];
                replaced += 1;
            }
            None => {
                // `[[[KEY]]` still holds a token one byte further on
                out.push('[');
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(rest);

    tracing::debug!(tokens = replaced, "substituted literal tokens");
    out
}
