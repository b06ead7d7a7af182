//! Template package sources

use crate::docx::{DocxError, DocxResult};
use std::fmt;
use std::path::PathBuf;

/// Where a template package is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    File(PathBuf),
    Url(String),
}

impl TemplateSource {
    /// `http://` and `https://` locations are URLs, anything else a path
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }

    /// Read the whole package. One attempt, no retries.
    pub async fn fetch(&self) -> DocxResult<Vec<u8>> {
        let bytes = match self {
            Self::File(path) => tokio::fs::read(path).await.map_err(|e| DocxError::SourceFetch {
                location: self.to_string(),
                status: None,
                message: e.to_string(),
            })?,
            Self::Url(url) => self.download(url).await?,
        };
        tracing::debug!(source = %self, bytes = bytes.len(), "fetched template");
        Ok(bytes)
    }

    async fn download(&self, url: &str) -> DocxResult<Vec<u8>> {
        let fail = |status: Option<u16>, message: String| DocxError::SourceFetch {
            location: self.to_string(),
            status,
            message,
        };

        let response = reqwest::get(url).await.map_err(|e| {
            fail(e.status().map(|s| s.as_u16()), e.to_string())
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(fail(
                Some(status.as_u16()),
                status.canonical_reason().unwrap_or("request failed").to_string(),
            ));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| fail(Some(status.as_u16()), e.to_string()))?;
        Ok(body.to_vec())
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse() {
        assert_eq!(
            TemplateSource::parse(" HTTPS://example.org/t.docx "),
            TemplateSource::Url("HTTPS://example.org/t.docx".into())
        );
        assert_eq!(
            TemplateSource::parse("templates/rz.docx"),
            TemplateSource::File(PathBuf::from("templates/rz.docx"))
        );
    }

    #[tokio::test]
    async fn test_fetch_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.docx");
        std::fs::write(&path, b"PK").unwrap();
        let bytes = TemplateSource::File(path).fetch().await.unwrap();
        assert_eq!(bytes, b"PK");
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_error() {
        let dir = TempDir::new().unwrap();
        let err = TemplateSource::File(dir.path().join("none.docx")).fetch().await.unwrap_err();
        match err {
            DocxError::SourceFetch { status, .. } => assert_eq!(status, None),
            other => panic!("unexpected error: {other}"),
        }
    }
}
