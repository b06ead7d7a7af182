//! Report export API
//!
//! Turns form data into finished report bytes, through a template when one is
//! configured and through the built-in layouts otherwise.

use crate::docx::{DocxResult, PackagePatcher, SketchImage, TextualPatcher};
use crate::export::{build_lps_document, build_rz_document, fill_lps_template, fill_rz_template};
use crate::settings::ExportSettings;
use inspection_model::FormData;
use report_merge::{LpsReport, RenderOptions, ReportKind, RzInput, RzReport};

/// A finished report ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Installation report, from `template` when given
pub fn generate_rz(
    input: &RzInput,
    template: Option<&[u8]>,
    options: &RenderOptions,
) -> DocxResult<GeneratedReport> {
    let report = RzReport::build(input);
    let package = match template {
        Some(bytes) => fill_rz_template(bytes, &report, options)?,
        None => build_rz_document(&report)?,
    };
    Ok(GeneratedReport {
        file_name: ReportKind::Rz.file_name(report.record_id.as_deref()),
        bytes: package.to_bytes()?,
    })
}

/// Lightning protection report, from `template` when given
pub async fn generate_lps<P: PackagePatcher>(
    report: &LpsReport,
    template: Option<&[u8]>,
    patcher: &P,
    max_width_emu: i64,
) -> DocxResult<GeneratedReport> {
    let package = match template {
        Some(bytes) => fill_lps_template(bytes, report, patcher).await?.0,
        None => {
            let sketch = match report.sketch_data_url().map(SketchImage::from_data_url) {
                Some(Ok(image)) => Some(image),
                Some(Err(e)) => {
                    tracing::warn!("Ignoring unusable sketch: {}", e);
                    None
                }
                None => None,
            };
            let pixels = match &sketch {
                Some(image) => image.measure_dimensions().await,
                None => None,
            };
            build_lps_document(report, sketch.as_ref().map(|s| (s, pixels)), max_width_emu)?
        }
    };
    Ok(GeneratedReport {
        file_name: ReportKind::Lps.file_name(report.record_id.as_deref()),
        bytes: package.to_bytes()?,
    })
}

/// Exports reports using the templates and options of [`ExportSettings`]
#[derive(Debug, Clone, Default)]
pub struct ReportExporter {
    settings: ExportSettings,
}

impl ReportExporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Fetch the configured template, if any, and generate the report.
    ///
    /// A template that cannot be fetched aborts the export.
    pub async fn export(
        &self,
        kind: ReportKind,
        form: FormData,
        revision_id: Option<&str>,
    ) -> DocxResult<GeneratedReport> {
        let template = match self.settings.template_for(kind) {
            Some(source) => Some(source.fetch().await?),
            None => None,
        };
        tracing::info!(kind = kind.as_str(), template = template.is_some(), "exporting report");

        match kind {
            ReportKind::Rz => {
                let mut input = RzInput::from_form(form);
                if input.revision_id.is_none() {
                    input.revision_id = revision_id.map(String::from);
                }
                generate_rz(&input, template.as_deref(), &self.settings.render)
            }
            ReportKind::Lps => {
                let report = LpsReport::build_with_id(&form, revision_id);
                let patcher = TextualPatcher::new(self.settings.sketch);
                generate_lps(&report, template.as_deref(), &patcher, self.settings.sketch.max_width_emu)
                    .await
            }
        }
    }
}
