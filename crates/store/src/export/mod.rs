//! Report documents
//!
//! Two ways to produce each report: fill a pre-authored template package, or
//! lay the whole document out in code with the [`docx`](crate::docx) writer.

pub mod layout;
mod lps;
mod rz;
mod template;


pub use lps::{build_lps_document, sketch_pixels, MAX_SKETCH_PX};
pub use rz::build_rz_document;
pub use template::{fill_lps_template, fill_rz_template, SketchOutcome};
