//! Placeholder rendering over XML part text
//!
//! Two tag syntaxes are supported, never mixed within one document:
//! loop-aware `{{…}}` sections rendered against a [`TemplateScope`], and
//! literal `[[KEY]]` tokens replaced from a [`FlatData`] map.
//!
//! [`TemplateScope`]: crate::model::TemplateScope
//! [`FlatData`]: crate::model::FlatData

mod flat;
mod runs;
mod sections;

pub use flat::{escape_value, substitute_tokens, token, TOKEN_CLOSE, TOKEN_OPEN};
pub use runs::enclosing as enclosing_element;
pub use sections::{Delimiters, RenderOptions, SectionRenderer, LINE_BREAK};

/// Normalize tags split across text runs, for any delimiter pair
pub fn join_split_tags(xml: &str, open: &str, close: &str) -> String {
    runs::normalize_split_tags(xml, open, close)
}
