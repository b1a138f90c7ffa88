//! Timetable export to PDF and spreadsheet.
//!
//! Both paths take an immutable [`TimetableSnapshot`] (or an already
//! rendered surface), build the document off the async executor, write it
//! under a fixed file name and report the outcome through a [`Notifier`].

pub mod grid;
pub mod pdf;
pub mod raster;
pub mod xlsx;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::config::ExportConfig;
use crate::timetable::TimetableSnapshot;
use crate::traits::Notifier;

pub use grid::{DayRow, TimetableGrid};
pub use pdf::PageLayout;
pub use raster::{GridSurface, RenderSurface, flatten_on_white};

pub const PDF_FILE_NAME: &str = "class-timetable.pdf";
pub const XLSX_FILE_NAME: &str = "class-timetable.xlsx";

/// Typed export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Timetable grid is not rendered yet")]
    MissingSurface,
    #[error("Invalid page layout: {0}")]
    Layout(String),
    #[error("Rasterization failed: {0}")]
    Raster(String),
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Workbook generation failed: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Export task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Xlsx,
}

impl ExportFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Pdf => PDF_FILE_NAME,
            ExportFormat::Xlsx => XLSX_FILE_NAME,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Pdf => write!(f, "PDF"),
            ExportFormat::Xlsx => write!(f, "Excel"),
        }
    }
}

/// A finished document, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn file_name(&self) -> &'static str {
        self.format.file_name()
    }

    /// Write the artifact into `dir`, replacing any previous export.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Build the spreadsheet artifact for a snapshot.
pub fn build_xlsx(snapshot: &TimetableSnapshot, title: &str) -> Result<ExportArtifact, ExportError> {
    let grid = TimetableGrid::build(snapshot, title);
    let bytes = xlsx::render_workbook(&grid)?;
    Ok(ExportArtifact {
        format: ExportFormat::Xlsx,
        bytes,
    })
}

/// Rasterise a surface and wrap it in a landscape PDF page.
pub fn build_pdf(
    surface: &dyn RenderSurface,
    scale: f32,
    margin_mm: f32,
) -> Result<ExportArtifact, ExportError> {
    let max_margin = pdf::PAGE_WIDTH_MM / 2.0;
    if !(0.0..max_margin).contains(&margin_mm) {
        return Err(ExportError::Layout(format!(
            "page margin {} mm leaves no room for the image",
            margin_mm
        )));
    }
    let raster = surface
        .rasterize(scale)
        .map_err(|e| ExportError::Raster(format!("{:#}", e)))?;
    let flat = flatten_on_white(&raster);
    let layout = PageLayout::fit(flat.width(), flat.height(), margin_mm);
    let bytes = pdf::render_pdf(&flat, &layout)?;
    Ok(ExportArtifact {
        format: ExportFormat::Pdf,
        bytes,
    })
}

/// Runs exports and reports them as toast notifications.
pub struct TimetableExporter<N: ?Sized> {
    config: ExportConfig,
    output_dir: PathBuf,
    notifier: Arc<N>,
}

impl<N: Notifier + ?Sized> TimetableExporter<N> {
    pub fn new(config: ExportConfig, notifier: Arc<N>) -> Self {
        let output_dir = config.resolve_output_dir();
        Self {
            config,
            output_dir,
            notifier,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Export the rendered grid as `class-timetable.pdf`.
    ///
    /// A missing surface fails before any work is done.
    pub async fn export_pdf(
        &self,
        surface: Option<Arc<dyn RenderSurface>>,
    ) -> Result<PathBuf, ExportError> {
        let result = match surface {
            None => Err(ExportError::MissingSurface),
            Some(surface) => {
                let scale = self.config.scale;
                let margin = self.config.page_margin_mm;
                let dir = self.output_dir.clone();
                run_blocking(move || build_pdf(surface.as_ref(), scale, margin)?.save_to(&dir))
                    .await
            }
        };
        self.report(ExportFormat::Pdf, &result);
        result
    }

    /// Export the snapshot as `class-timetable.xlsx`.
    pub async fn export_xlsx(&self, snapshot: TimetableSnapshot) -> Result<PathBuf, ExportError> {
        let title = self.config.title.clone();
        let dir = self.output_dir.clone();
        let result = run_blocking(move || build_xlsx(&snapshot, &title)?.save_to(&dir)).await;
        self.report(ExportFormat::Xlsx, &result);
        result
    }

    fn report(&self, format: ExportFormat, result: &Result<PathBuf, ExportError>) {
        let (title, body) = match result {
            Ok(path) => {
                tracing::info!("{} export saved to {}", format, path.display());
                (
                    "Export complete".to_string(),
                    format!("Timetable exported as {}", format),
                )
            }
            Err(e) => {
                tracing::error!("{} export failed: {}", format, e);
                (
                    "Export failed".to_string(),
                    format!("Failed to export timetable as {}", format),
                )
            }
        };

        if let Err(e) = self.notifier.notify(&title, &body) {
            tracing::warn!("Failed to show notification: {:#}", e);
        }
    }
}

async fn run_blocking<F>(job: F) -> Result<PathBuf, ExportError>
where
    F: FnOnce() -> Result<PathBuf, ExportError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ExportError::Task(e.to_string()))?
}
