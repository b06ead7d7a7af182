//! Package Patcher
//!
//! Edits the XML parts of an already packaged document in place: literal
//! token substitution, sketch image embedding and placeholder removal. The
//! edits are textual and narrowly scoped; callers only see the
//! [`PackagePatcher`] trait.

use crate::docx::content_types::ensure_default;
use crate::docx::drawing::{next_drawing_id, InlineDrawing, PixelSize, SketchSizing};
use crate::docx::error::DocxResult;
use crate::docx::sketch::SketchImage;
use crate::docx::package::{DocxPackage, CONTENT_TYPES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART};
use crate::docx::reader::XmlParser;
use crate::docx::relationship_types;
use crate::docx::relationships::append_relationship;
use report_merge::render::{enclosing_element, join_split_tags, TOKEN_CLOSE, TOKEN_OPEN};
use report_merge::{FlatData, LPS_SKETCH_TOKEN};
use std::ops::Range;

/// Which element held the placeholder token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderTarget {
    /// The whole paragraph around the token
    Paragraph,
    /// The run around the token; it sat in no paragraph
    Run,
    /// Only the token text itself
    Token,
}

/// Result of an embedding attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedOutcome {
    Embedded {
        media_part: String,
        rel_id: String,
        doc_pr_id: u32,
        target: PlaceholderTarget,
    },
    /// The document holds no placeholder; nothing was changed
    NoPlaceholder,
}

/// Edits applied to a packaged document
pub trait PackagePatcher {
    /// Replace catalogue tokens in every XML part; returns the number of parts changed
    fn substitute_tokens(
        &self,
        package: &mut DocxPackage,
        data: &FlatData,
        keys: &[&str],
    ) -> DocxResult<usize>;

    /// Embed an image at the placeholder, all edits or none
    fn embed_image(
        &self,
        package: &mut DocxPackage,
        image: &SketchImage,
        pixels: Option<PixelSize>,
    ) -> DocxResult<EmbedOutcome>;

    /// Remove every placeholder element; `None` when there was none
    fn remove_placeholder(&self, package: &mut DocxPackage) -> DocxResult<Option<PlaceholderTarget>>;
}

/// Patcher working on part text with string splices
#[derive(Debug, Clone)]
pub struct TextualPatcher {
    token: String,
    media_stem: String,
    drawing_name: String,
    sizing: SketchSizing,
}

impl Default for TextualPatcher {
    fn default() -> Self {
        Self {
            token: LPS_SKETCH_TOKEN.to_string(),
            media_stem: "lps_sketch".to_string(),
            drawing_name: "LPS Sketch".to_string(),
            sizing: SketchSizing::default(),
        }
    }
}

impl TextualPatcher {
    pub fn new(sizing: SketchSizing) -> Self {
        Self {
            sizing,
            ..Self::default()
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Document text with the token joined into one run, if the token is present
    fn document_with_token(&self, package: &DocxPackage) -> DocxResult<Option<String>> {
        let document = package.part_text(DOCUMENT_PART)?;
        if document.contains(&self.token) {
            return Ok(Some(document));
        }
        let joined = join_split_tags(&document, TOKEN_OPEN, TOKEN_CLOSE);
        Ok(joined.contains(&self.token).then_some(joined))
    }
}

impl PackagePatcher for TextualPatcher {
    fn substitute_tokens(
        &self,
        package: &mut DocxPackage,
        data: &FlatData,
        keys: &[&str],
    ) -> DocxResult<usize> {
        let mut changed = Vec::new();
        for name in package.xml_part_names() {
            let xml = package.part_text(&name)?;
            if !xml.contains(TOKEN_OPEN) {
                continue;
            }
            let out = report_merge::substitute_tokens(&xml, data, keys);
            if out != xml {
                changed.push((name, out));
            }
        }
        let count = changed.len();
        for (name, xml) in changed {
            package.set_part_text(&name, xml);
        }
        tracing::debug!(parts = count, "substituted tokens across package");
        Ok(count)
    }

    fn embed_image(
        &self,
        package: &mut DocxPackage,
        image: &SketchImage,
        pixels: Option<PixelSize>,
    ) -> DocxResult<EmbedOutcome> {
        let Some(document) = self.document_with_token(package)? else {
            tracing::warn!(token = %self.token, "sketch placeholder not found, nothing to embed");
            return Ok(EmbedOutcome::NoPlaceholder);
        };

        let media_part = format!("word/media/{}.{}", self.media_stem, image.extension());
        let media_target = media_part.trim_start_matches("word/").to_string();

        let types = package.part_text(CONTENT_TYPES_PART)?;
        let types = ensure_default(&types, image.extension(), &image.content_type())?;

        let rels = package.optional_part_text(DOCUMENT_RELS_PART)?;
        let (rel_id, rels) = append_relationship(rels.as_deref(), relationship_types::IMAGE, &media_target)?;

        let doc_pr_id = next_drawing_id(&document)?;
        let drawing = InlineDrawing {
            rel_id: rel_id.clone(),
            doc_pr_id,
            size: self.sizing.fit(pixels),
            name: format!("{} {}", self.drawing_name, doc_pr_id),
            description: None,
        };
        let Some((document, target)) = splice_placeholder(&document, &self.token, Some(&drawing.run_xml())) else {
            return Ok(EmbedOutcome::NoPlaceholder);
        };
        let document = remove_all(&document, &self.token);

        XmlParser::check_well_formed(DOCUMENT_PART, &document)?;
        XmlParser::check_well_formed(DOCUMENT_RELS_PART, &rels)?;
        if let Some(types) = &types {
            XmlParser::check_well_formed(CONTENT_TYPES_PART, types)?;
        }

        package.set_part(&media_part, image.bytes().to_vec());
        if let Some(types) = types {
            package.set_part_text(CONTENT_TYPES_PART, types);
        }
        package.set_part_text(DOCUMENT_RELS_PART, rels);
        package.set_part_text(DOCUMENT_PART, document);

        tracing::debug!(%media_part, %rel_id, doc_pr_id, ?target, "embedded sketch image");
        Ok(EmbedOutcome::Embedded {
            media_part,
            rel_id,
            doc_pr_id,
            target,
        })
    }

    fn remove_placeholder(&self, package: &mut DocxPackage) -> DocxResult<Option<PlaceholderTarget>> {
        let Some(document) = self.document_with_token(package)? else {
            return Ok(None);
        };
        let target = splice_placeholder(&document, &self.token, None).map(|(_, target)| target);
        let document = remove_all(&document, &self.token);
        XmlParser::check_well_formed(DOCUMENT_PART, &document)?;
        package.set_part_text(DOCUMENT_PART, document);
        tracing::debug!(?target, "removed sketch placeholder");
        Ok(target)
    }
}

/// Replace the element holding the first `token`.
///
/// With a replacement run, a paragraph keeps its properties and gets the run
/// as its only content; without one the element is dropped.
fn splice_placeholder(xml: &str, token: &str, run: Option<&str>) -> Option<(String, PlaceholderTarget)> {
    let pos = xml.find(token)?;
    if let Some(span) = enclosing_element(xml, pos, "w:p") {
        let replacement = match run {
            Some(run) => format!("<w:p>{}{}</w:p>", paragraph_properties(&xml[span.clone()]), run),
            None => String::new(),
        };
        return Some((splice(xml, span, &replacement), PlaceholderTarget::Paragraph));
    }
    let replacement = run.unwrap_or_default();
    if let Some(span) = enclosing_element(xml, pos, "w:r") {
        return Some((splice(xml, span, replacement), PlaceholderTarget::Run));
    }
    Some((splice(xml, pos..pos + token.len(), replacement), PlaceholderTarget::Token))
}

fn remove_all(xml: &str, token: &str) -> String {
    let mut out = xml.to_string();
    while let Some((next, _)) = splice_placeholder(&out, token, None) {
        out = next;
    }
    out
}

fn splice(xml: &str, span: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(xml.len() + replacement.len());
    out.push_str(&xml[..span.start]);
    out.push_str(replacement);
    out.push_str(&xml[span.end..]);
    out
}

/// The `<w:pPr>` element of a paragraph, or an empty string
fn paragraph_properties(paragraph: &str) -> &str {
    let Some(start) = paragraph.find("<w:pPr") else {
        return "";
    };
    let rest = &paragraph[start..];
    if let Some(gt) = rest.find('>') {
        if rest[..gt].ends_with('/') {
            return &rest[..=gt];
        }
    }
    match rest.find("</w:pPr>") {
        Some(end) => &rest[..end + "</w:pPr>".len()],
        None => "",
    }
}
