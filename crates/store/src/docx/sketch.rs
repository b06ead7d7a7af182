//! Sketch images supplied as base64 data URLs

use crate::docx::content_types::image_content_type;
use crate::docx::drawing::PixelSize;
use crate::docx::error::{DocxError, DocxResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::Cursor;

/// A decoded raster image with the file extension it is stored under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SketchImage {
    extension: String,
    bytes: Vec<u8>,
}

impl SketchImage {
    pub fn new(extension: impl Into<String>, bytes: Vec<u8>) -> Self {
        let extension = extension.into().to_lowercase();
        let extension = if extension == "jpeg" { "jpg".to_string() } else { extension };
        Self { extension, bytes }
    }

    /// Decode `data:image/<format>;base64,<payload>`
    pub fn from_data_url(url: &str) -> DocxResult<Self> {
        let re = regex_lite::Regex::new(r"(?s)^data:image/([a-zA-Z0-9+]+);base64,(.+)$")
            .map_err(|e| DocxError::InvalidImage(e.to_string()))?;
        let caps = re
            .captures(url.trim())
            .ok_or_else(|| DocxError::InvalidImage("not a base64 image data URL".to_string()))?;
        let format = caps.get(1).map_or("", |m| m.as_str());
        let payload: String = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(payload.as_bytes())
            .map_err(|e| DocxError::InvalidImage(format!("bad base64 payload: {}", e)))?;
        if bytes.is_empty() {
            return Err(DocxError::InvalidImage("empty image payload".to_string()));
        }
        Ok(Self::new(format, bytes))
    }

    /// File extension, `jpg` for JPEG
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> String {
        image_content_type(&self.extension)
    }

    /// Pixel size read from the image header, `None` when it cannot be decoded
    pub fn dimensions(&self) -> Option<PixelSize> {
        probe_dimensions(&self.bytes)
    }

    /// [`dimensions`](Self::dimensions) off the async runtime threads
    pub async fn measure_dimensions(&self) -> Option<PixelSize> {
        let bytes = self.bytes.clone();
        match tokio::task::spawn_blocking(move || probe_dimensions(&bytes)).await {
            Ok(size) => size,
            Err(e) => {
                tracing::warn!("Image measurement task failed: {}", e);
                None
            }
        }
    }
}

fn probe_dimensions(bytes: &[u8]) -> Option<PixelSize> {
    let result = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| e.to_string())
        .and_then(|reader| reader.into_dimensions().map_err(|e| e.to_string()));
    match result {
        Ok((width, height)) => Some(PixelSize { width, height }),
        Err(e) => {
            tracing::warn!("Could not read sketch dimensions, using fallback size: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x3 PNG encoded with the image crate
    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::new(2, 3);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn data_url(format: &str, bytes: &[u8]) -> String {
        format!("data:image/{};base64,{}", format, STANDARD.encode(bytes))
    }

    #[test]
    fn test_from_data_url() {
        let image = SketchImage::from_data_url(&data_url("png", &png_bytes())).unwrap();
        assert_eq!(image.extension(), "png");
        assert_eq!(image.content_type(), "image/png");
        assert_eq!(image.bytes(), png_bytes().as_slice());
    }

    #[test]
    fn test_jpeg_maps_to_jpg() {
        let image = SketchImage::from_data_url(&data_url("jpeg", b"\xFF\xD8\xFF")).unwrap();
        assert_eq!(image.extension(), "jpg");
        assert_eq!(image.content_type(), "image/jpeg");
    }

    #[test]
    fn test_rejects_other_urls() {
        assert!(matches!(
            SketchImage::from_data_url("https://example.com/a.png"),
            Err(DocxError::InvalidImage(_))
        ));
        assert!(SketchImage::from_data_url("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_dimensions() {
        let image = SketchImage::new("png", png_bytes());
        assert_eq!(image.dimensions(), Some(PixelSize { width: 2, height: 3 }));
        assert_eq!(SketchImage::new("png", b"garbage".to_vec()).dimensions(), None);
    }

    #[tokio::test]
    async fn test_measure_dimensions() {
        let image = SketchImage::new("png", png_bytes());
        assert_eq!(image.measure_dimensions().await, Some(PixelSize { width: 2, height: 3 }));
        let broken = SketchImage::new("png", vec![0u8; 16]);
        assert_eq!(broken.measure_dimensions().await, None);
    }
}
