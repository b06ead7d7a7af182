//! Inspection Model
//!
//! Read-only access to inspection report form data as produced by the
//! editing UI.
//!
//! # Features
//!
//! - Tolerant accessors over arbitrary JSON form documents
//! - Synonym-aware field resolution across nested measurement records
//! - Flattening of component trees in any of the three stored encodings
//!
//! # Example
//!
//! ```rust
//! use inspection_model::{flatten, FormData};
//!
//! let form = FormData::from_json_str(r#"{
//!     "boards": [{ "name": "RH1", "komponenty": [
//!         { "id": 1, "nazev": "Hlavní vypínač" },
//!         { "id": 2, "nazev": "B16", "parentId": 1 }
//!     ]}]
//! }"#).unwrap();
//!
//! let components = flatten(form.list("boards.0.komponenty"));
//! assert_eq!(components[1].depth, 1);
//! ```

mod error;
pub mod form;
pub mod resolver;
pub mod tree;

pub use error::{ModelError, Result};
pub use form::{
    first_non_blank, format_number, list_at, lookup, non_blank_at, non_blank_text, text_at,
    value_text, FormData,
};
pub use resolver::{normalize_number, ComponentField, FieldResolver, ProbePath, DEFAULT_PROBES};
pub use tree::{classify, flatten, FlatComponent, TreeEncoding};
