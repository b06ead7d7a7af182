//! Filling pre-authored report templates
//!
//! Installation reports use loop-aware `{{…}}` templates rendered over the
//! document, header and footer parts. Lightning protection reports use
//! literal `[[KEY]]` templates patched in place, followed by the sketch.

use crate::docx::{
    DocxPackage, DocxResult, EmbedOutcome, PackagePatcher, PlaceholderTarget, SketchImage,
    XmlParser, DOCUMENT_PART,
};
use report_merge::{LpsReport, RenderOptions, RzReport, SectionRenderer, LPS_KEYS};

/// What happened to the sketch placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SketchOutcome {
    Embedded { media_part: String, rel_id: String },
    /// No usable sketch; the placeholder was removed
    Removed(PlaceholderTarget),
    /// The template has no placeholder
    NoPlaceholder,
}

/// Parts that may carry template tags
fn is_template_part(name: &str) -> bool {
    if name == DOCUMENT_PART {
        return true;
    }
    name.strip_prefix("word/")
        .and_then(|rest| rest.strip_suffix(".xml"))
        .is_some_and(|stem| {
            ["header", "footer"].iter().any(|kind| {
                stem.strip_prefix(kind)
                    .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
            })
        })
}

/// Render an installation report template.
///
/// Fails before changing anything when sections are unbalanced, when a tag
/// cannot be resolved in strict mode, or when a rendered part is not
/// well-formed.
pub fn fill_rz_template(
    template: &[u8],
    report: &RzReport,
    options: &RenderOptions,
) -> DocxResult<DocxPackage> {
    let mut package = DocxPackage::from_bytes(template)?;

    let mut parts = Vec::new();
    for name in package.part_names() {
        if is_template_part(name) {
            parts.push(name.to_string());
        }
    }
    let parts = parts
        .into_iter()
        .map(|name| package.part_text(&name).map(|xml| (name, xml)))
        .collect::<DocxResult<Vec<_>>>()?;

    let rendered = SectionRenderer::new(options.clone())
        .render_parts(&parts, &report.to_template_scope())?;
    for (name, xml) in &rendered {
        XmlParser::check_well_formed(name, xml)?;
    }
    for (name, xml) in rendered {
        package.set_part_text(&name, xml);
    }

    tracing::debug!(parts = parts.len(), "filled installation report template");
    Ok(package)
}

/// Fill a lightning protection template and place the sketch.
///
/// Tokens are substituted in every XML part. A sketch that cannot be decoded
/// is logged and treated as missing; its placeholder is removed.
pub async fn fill_lps_template<P: PackagePatcher>(
    template: &[u8],
    report: &LpsReport,
    patcher: &P,
) -> DocxResult<(DocxPackage, SketchOutcome)> {
    let mut package = DocxPackage::from_bytes(template)?;
    patcher.substitute_tokens(&mut package, &report.to_flat_data(), LPS_KEYS)?;

    let sketch = match report.sketch_data_url().map(SketchImage::from_data_url) {
        Some(Ok(image)) => Some(image),
        Some(Err(e)) => {
            tracing::warn!("Ignoring unusable sketch: {}", e);
            None
        }
        None => None,
    };

    let outcome = match sketch {
        Some(image) => {
            let pixels = image.measure_dimensions().await;
            match patcher.embed_image(&mut package, &image, pixels)? {
                EmbedOutcome::Embedded { media_part, rel_id, .. } => {
                    SketchOutcome::Embedded { media_part, rel_id }
                }
                EmbedOutcome::NoPlaceholder => SketchOutcome::NoPlaceholder,
            }
        }
        None => match patcher.remove_placeholder(&mut package)? {
            Some(target) => SketchOutcome::Removed(target),
            None => SketchOutcome::NoPlaceholder,
        },
    };

    tracing::debug!(?outcome, "filled lightning protection template");
    Ok((package, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parts() {
        assert!(is_template_part("word/document.xml"));
        assert!(is_template_part("word/header1.xml"));
        assert!(is_template_part("word/footer.xml"));
        assert!(is_template_part("word/footer12.xml"));
        assert!(!is_template_part("word/styles.xml"));
        assert!(!is_template_part("word/_rels/header1.xml.rels"));
        assert!(!is_template_part("word/headers.xml"));
    }
}
