//! Export settings
//!
//! Settings persistence and loading for the report exporter. A missing file
//! means defaults; a file that cannot be parsed is logged and replaced by
//! defaults as well.

use crate::docx::{DocxResult, SketchSizing};
use crate::source::TemplateSource;
use report_merge::{RenderOptions, ReportKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "export.json";

/// Exporter settings container
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportSettings {
    /// Template location per report kind; none means the built-in layout
    pub templates: TemplateSettings,
    /// Options for `{{…}}` templates
    pub render: RenderOptions,
    /// Directory generated reports are written to
    pub output_dir: PathBuf,
    /// Sizing of the sketch embedded into lightning protection templates
    pub sketch: SketchSizing,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            templates: TemplateSettings::default(),
            render: RenderOptions::default(),
            output_dir: PathBuf::from("."),
            sketch: SketchSizing::default(),
        }
    }
}

/// Template file paths or `http(s)` URLs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TemplateSettings {
    pub rz: Option<String>,
    pub lps: Option<String>,
}

impl ExportSettings {
    /// Configured template of a report kind
    pub fn template_for(&self, kind: ReportKind) -> Option<TemplateSource> {
        let location = match kind {
            ReportKind::Rz => self.templates.rz.as_deref(),
            ReportKind::Lps => self.templates.lps.as_deref(),
        };
        location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(TemplateSource::parse)
    }

    pub fn set_template(&mut self, kind: ReportKind, location: Option<String>) {
        match kind {
            ReportKind::Rz => self.templates.rz = location,
            ReportKind::Lps => self.templates.lps = location,
        }
    }
}

/// Loads and saves [`ExportSettings`] in a settings directory
pub struct SettingsManager {
    settings_path: PathBuf,
    current: ExportSettings,
}

impl SettingsManager {
    pub fn new(settings_dir: &Path) -> Self {
        Self::with_path(settings_dir.join(SETTINGS_FILE))
    }

    /// Use an explicit settings file
    pub fn with_path(settings_path: PathBuf) -> Self {
        Self {
            settings_path,
            current: ExportSettings::default(),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    fn parse(&self, content: &str) -> ExportSettings {
        match serde_json::from_str::<ExportSettings>(content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    path = %self.settings_path.display(),
                    "Failed to parse settings file, using defaults: {}",
                    e
                );
                ExportSettings::default()
            }
        }
    }

    /// Load settings from disk, or defaults if the file doesn't exist
    pub async fn load(&mut self) -> DocxResult<&ExportSettings> {
        self.current = if tokio::fs::try_exists(&self.settings_path).await? {
            let content = tokio::fs::read_to_string(&self.settings_path).await?;
            self.parse(&content)
        } else {
            ExportSettings::default()
        };
        Ok(&self.current)
    }

    pub fn load_sync(&mut self) -> DocxResult<&ExportSettings> {
        self.current = if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            self.parse(&content)
        } else {
            ExportSettings::default()
        };
        Ok(&self.current)
    }

    pub async fn save(&self) -> DocxResult<()> {
        if let Some(parent) = self.settings_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(&self.current)?;
        tokio::fs::write(&self.settings_path, content).await?;
        Ok(())
    }

    pub fn save_sync(&self) -> DocxResult<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    pub fn get(&self) -> &ExportSettings {
        &self.current
    }

    /// Replace the settings and save them
    pub async fn update(&mut self, settings: ExportSettings) -> DocxResult<()> {
        self.current = settings;
        self.save().await
    }

    pub fn update_sync(&mut self, settings: ExportSettings) -> DocxResult<()> {
        self.current = settings;
        self.save_sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = ExportSettings::default();
        assert_eq!(settings.template_for(ReportKind::Rz), None);
        assert_eq!(settings.render.delimiters.open, "{{");
        assert_eq!(settings.sketch.max_width_emu, 6_480_000);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: ExportSettings =
            serde_json::from_str(r#"{"templates": {"lps": "https://example.org/lps.docx"}}"#).unwrap();
        assert_eq!(
            settings.template_for(ReportKind::Lps),
            Some(TemplateSource::Url("https://example.org/lps.docx".into()))
        );
        assert!(settings.render.strict);
        assert_eq!(settings.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_load_save_sync() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::new(temp_dir.path());

        assert_eq!(manager.load_sync().unwrap(), &ExportSettings::default());

        let mut settings = ExportSettings::default();
        settings.set_template(ReportKind::Rz, Some("sablony/rz.docx".into()));
        settings.render.strict = false;
        manager.update_sync(settings).unwrap();

        let mut reloaded = SettingsManager::new(temp_dir.path());
        let loaded = reloaded.load_sync().unwrap();
        assert_eq!(
            loaded.template_for(ReportKind::Rz),
            Some(TemplateSource::File(PathBuf::from("sablony/rz.docx")))
        );
        assert!(!loaded.render.strict);
    }

    #[test]
    fn test_unparsable_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        let mut manager = SettingsManager::new(temp_dir.path());
        assert_eq!(manager.load_sync().unwrap(), &ExportSettings::default());
    }

    #[tokio::test]
    async fn test_load_save_async() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::with_path(temp_dir.path().join("nested/export.json"));
        manager.load().await.unwrap();

        let mut settings = ExportSettings::default();
        settings.output_dir = PathBuf::from("out");
        manager.update(settings).await.unwrap();

        let mut reloaded = SettingsManager::with_path(temp_dir.path().join("nested/export.json"));
        assert_eq!(reloaded.load().await.unwrap().output_dir, PathBuf::from("out"));
    }
}
