//! Revize Export - inspection report exporter
//!
//! Reads inspection form data as JSON and writes the finished DOCX report.
//!
//! ```sh
//! revize-export rz formular.json -o vystup/
//! revize-export lps formular.json --template https://example.org/lps.docx
//! ```

use anyhow::Context;
use clap::{Parser, ValueEnum};
use inspection_model::FormData;
use report_merge::ReportKind;
use std::path::PathBuf;
use store::{ExportSettings, ReportExporter, SettingsManager};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    /// Electrical installation report
    Rz,
    /// Lightning protection report
    Lps,
}

impl From<KindArg> for ReportKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Rz => ReportKind::Rz,
            KindArg::Lps => ReportKind::Lps,
        }
    }
}

/// Generate an inspection report document
#[derive(Parser, Debug)]
#[command(name = "revize-export", version)]
struct Args {
    /// Report kind
    #[arg(value_enum)]
    kind: KindArg,

    /// Form data JSON file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory; overrides the settings
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Template path or http(s) URL; overrides the settings
    #[arg(short, long, value_name = "LOCATION", conflicts_with = "builtin")]
    template: Option<String>,

    /// Use the built-in layout even when a template is configured
    #[arg(long)]
    builtin: bool,

    /// Settings file
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Record identifier used when the form carries no evidence number
    #[arg(long, value_name = "ID")]
    revision_id: Option<String>,

    /// Leave unresolved `{{…}}` tags empty instead of failing
    #[arg(long)]
    lenient: bool,
}

async fn load_settings(args: &Args) -> anyhow::Result<ExportSettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            let mut manager = SettingsManager::with_path(path.clone());
            manager
                .load()
                .await
                .with_context(|| format!("Failed to load settings from {}", path.display()))?
                .clone()
        }
        None => ExportSettings::default(),
    };

    let kind = args.kind.into();
    if args.builtin {
        settings.set_template(kind, None);
    } else if let Some(template) = &args.template {
        settings.set_template(kind, Some(template.clone()));
    }
    if let Some(dir) = &args.output_dir {
        settings.output_dir = dir.clone();
    }
    if args.lenient {
        settings.render.strict = false;
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let settings = load_settings(&args).await?;

    let json = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let form = FormData::from_json_str(&json)
        .with_context(|| format!("Invalid form data in {}", args.input.display()))?;

    let exporter = ReportExporter::new(settings);
    let report = exporter
        .export(args.kind.into(), form, args.revision_id.as_deref())
        .await
        .context("Report generation failed")?;

    let output_dir = &exporter.settings().output_dir;
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let path = output_dir.join(&report.file_name);
    tokio::fs::write(&path, &report.bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), bytes = report.bytes.len(), "report written");
    println!("{}", path.display());
    Ok(())
}
