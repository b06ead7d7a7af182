//! Inline drawing markup and drawing id allocation

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::namespaces;
use report_merge::text::escape_xml;
use serde::{Deserialize, Serialize};

/// EMUs per screen pixel at 96 DPI
pub const EMU_PER_PIXEL: i64 = 9525;

/// Natural size of an image in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

/// Size of a drawing in EMUs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawingSize {
    pub cx: i64,
    pub cy: i64,
}

impl DrawingSize {
    /// Pixels scaled at [`EMU_PER_PIXEL`]
    pub fn from_pixels(size: PixelSize) -> Self {
        Self {
            cx: i64::from(size.width) * EMU_PER_PIXEL,
            cy: i64::from(size.height) * EMU_PER_PIXEL,
        }
    }

    /// Shrink to `max_cx` keeping the aspect ratio; smaller sizes are kept
    pub fn clamp_width(self, max_cx: i64) -> Self {
        if self.cx <= max_cx || self.cx == 0 {
            return self;
        }
        Self {
            cx: max_cx,
            cy: (self.cy as f64 * max_cx as f64 / self.cx as f64).round() as i64,
        }
    }
}

/// How an embedded sketch is sized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchSizing {
    /// Used when the pixel size is unknown
    pub fallback: DrawingSize,
    /// Widest drawing that fits the printable page width
    pub max_width_emu: i64,
}

impl Default for SketchSizing {
    fn default() -> Self {
        Self {
            fallback: DrawingSize { cx: 4_572_000, cy: 3_200_400 },
            max_width_emu: 6_480_000,
        }
    }
}

impl SketchSizing {
    /// Drawing size for an image of the given pixel size, if known
    pub fn fit(&self, pixels: Option<PixelSize>) -> DrawingSize {
        let size = match pixels {
            Some(px) if px.width > 0 && px.height > 0 => DrawingSize::from_pixels(px),
            _ => self.fallback,
        };
        size.clamp_width(self.max_width_emu)
    }
}

/// An inline picture anchored in a run
#[derive(Debug, Clone)]
pub struct InlineDrawing {
    pub rel_id: String,
    pub doc_pr_id: u32,
    pub size: DrawingSize,
    pub name: String,
    pub description: Option<String>,
}

impl InlineDrawing {
    /// The `<w:drawing>` element, namespaces declared on it
    pub fn drawing_xml(&self) -> String {
        let name = escape_xml(&self.name);
        let descr = escape_xml(self.description.as_deref().unwrap_or(&self.name));
        let DrawingSize { cx, cy } = self.size;
        format!(
            concat!(
                r#"<w:drawing xmlns:wp="{wp}" xmlns:a="{a}" xmlns:pic="{pic}" xmlns:r="{r}">"#,
                r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#,
                r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
                r#"<wp:effectExtent l="0" t="0" r="0" b="0"/>"#,
                r#"<wp:docPr id="{id}" name="{name}" descr="{descr}"/>"#,
                r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
                r#"<a:graphic><a:graphicData uri="{pic}"><pic:pic>"#,
                r#"<pic:nvPicPr><pic:cNvPr id="0" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
                r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>"#,
            ),
            wp = namespaces::WP,
            a = namespaces::A,
            pic = namespaces::PIC,
            r = namespaces::R,
            cx = cx,
            cy = cy,
            id = self.doc_pr_id,
            name = name,
            descr = descr,
            rel = self.rel_id,
        )
    }

    /// A run holding the drawing
    pub fn run_xml(&self) -> String {
        format!("<w:r><w:rPr/>{}</w:r>", self.drawing_xml())
    }
}

/// Next free `wp:docPr` id, scanning the given part text.
///
/// Returns one past the highest id present, or 1 when there is none. Ids are
/// `unsignedInt`, so a part already holding `u32::MAX` (or an id beyond it)
/// has no free id left.
pub fn next_drawing_id(xml: &str) -> DocxResult<u32> {
    let re = regex_lite::Regex::new(r#"<wp:docPr\b[^>]*?\bid="(\d+)""#)
        .map_err(|e| DocxError::XmlParse(e.to_string()))?;
    let mut max: Option<u32> = None;
    for caps in re.captures_iter(xml) {
        let Some(digits) = caps.get(1) else { continue };
        let id = digits.as_str().parse::<u32>().map_err(|_| exhausted())?;
        max = max.max(Some(id));
    }
    match max {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or_else(exhausted),
    }
}

fn exhausted() -> DocxError {
    DocxError::CorruptPackage("no drawing id left above the highest one".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::reader::XmlParser;

    #[test]
    fn test_sizing_from_pixels() {
        let sizing = SketchSizing::default();
        let size = sizing.fit(Some(PixelSize { width: 400, height: 300 }));
        assert_eq!(size, DrawingSize { cx: 3_810_000, cy: 2_857_500 });
    }

    #[test]
    fn test_sizing_clamps_width_keeping_ratio() {
        let sizing = SketchSizing::default();
        let size = sizing.fit(Some(PixelSize { width: 1360, height: 680 }));
        assert_eq!(size.cx, 6_480_000);
        assert_eq!(size.cy, 3_240_000);
    }

    #[test]
    fn test_sizing_fallback() {
        let sizing = SketchSizing::default();
        assert_eq!(sizing.fit(None), sizing.fallback);
        assert_eq!(sizing.fit(Some(PixelSize { width: 0, height: 10 })), sizing.fallback);
    }

    #[test]
    fn test_next_drawing_id() {
        assert_eq!(next_drawing_id("<w:body/>").unwrap(), 1);
        let xml = r#"<wp:docPr id="3" name="a"/><wp:docPr name="b" id="11"/><pic:cNvPr id="40"/>"#;
        assert_eq!(next_drawing_id(xml).unwrap(), 12);
    }

    #[test]
    fn test_next_drawing_id_at_range_end() {
        let xml = r#"<wp:docPr id="4294967294" name="a"/>"#;
        assert_eq!(next_drawing_id(xml).unwrap(), u32::MAX);
        for id in ["4294967295", "4294967296"] {
            let xml = format!(r#"<wp:docPr id="{}" name="a"/>"#, id);
            assert!(matches!(next_drawing_id(&xml), Err(DocxError::CorruptPackage(_))));
        }
    }

    #[test]
    fn test_drawing_markup_is_well_formed() {
        let drawing = InlineDrawing {
            rel_id: "rId7".into(),
            doc_pr_id: 4,
            size: DrawingSize { cx: 100, cy: 50 },
            name: "LPS Sketch 4".into(),
            description: Some("Nákres <LPS>".into()),
        };
        let run = drawing.run_xml();
        assert!(run.contains(r#"<wp:docPr id="4" name="LPS Sketch 4" descr="Nákres &lt;LPS&gt;"/>"#));
        assert!(run.contains(r#"r:embed="rId7""#));
        let wrapped = format!(r#"<w:p xmlns:w="{}">{}</w:p>"#, namespaces::W, run);
        XmlParser::check_well_formed("test", &wrapped).unwrap();
    }
}
