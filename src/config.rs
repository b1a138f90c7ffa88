use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::export::pdf::PAGE_WIDTH_MM;
use crate::timetable::{default_days, default_time_slots};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub network: NetworkConfig,
    pub pull: PullConfig,
    pub export: ExportConfig,
    pub timetable: TimetableConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub url: String,
    /// Anonymous API key sent as `apikey` and bearer token, if the backend needs one.
    pub anon_key: Option<String>,
    pub timetable_table: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: None,
            timetable_table: "timetable".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Pull-to-refresh tuning, in pixels of visible displacement.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct PullConfig {
    pub threshold: f32,
    pub max_pull: f32,
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            threshold: 80.0,
            max_pull: 120.0,
        }
    }
}

impl PullConfig {
    /// Reject settings that would make the gesture impossible to arm.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            anyhow::bail!("pull.threshold must be a positive number, got {}", self.threshold);
        }
        if !self.max_pull.is_finite() || self.max_pull < self.threshold {
            anyhow::bail!(
                "pull.max_pull ({}) must be at least pull.threshold ({})",
                self.max_pull,
                self.threshold
            );
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    /// Where exported files land. Falls back to the user's downloads directory.
    pub output_dir: Option<PathBuf>,
    pub title: String,
    pub scale: f32,
    pub page_margin_mm: f32,
    /// TrueType font for labels in the PDF raster. The bundled font is used when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            title: "Class Timetable".to_string(),
            scale: 2.0,
            page_margin_mm: 10.0,
            font_path: None,
        }
    }
}

impl ExportConfig {
    /// Reject settings that would produce an empty or mirrored PDF image.
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            anyhow::bail!("export.scale must be a positive number, got {}", self.scale);
        }
        let max_margin = PAGE_WIDTH_MM / 2.0;
        if !self.page_margin_mm.is_finite()
            || self.page_margin_mm < 0.0
            || self.page_margin_mm >= max_margin
        {
            anyhow::bail!(
                "export.page_margin_mm must be in 0..{} mm, got {}",
                max_margin,
                self.page_margin_mm
            );
        }
        Ok(())
    }

    pub fn resolve_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimetableConfig {
    pub days: Vec<String>,
    pub time_slots: Vec<String>,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            days: default_days(),
            time_slots: default_time_slots(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // Load .env file (silently ignore if not present)
        let _ = dotenvy::dotenv();

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lexboard");

        let builder = Config::builder()
            // 1. Load default values
            // Backend
            .set_default("backend.url", "http://localhost:54321")?
            .set_default("backend.anon_key", None::<String>)?
            .set_default("backend.timetable_table", "timetable")?
            // Network
            .set_default("network.request_timeout_secs", 30)?
            .set_default("network.connect_timeout_secs", 10)?
            // Pull-to-refresh
            .set_default("pull.threshold", 80.0)?
            .set_default("pull.max_pull", 120.0)?
            // Export
            .set_default("export.output_dir", None::<String>)?
            .set_default("export.title", "Class Timetable")?
            .set_default("export.scale", 2.0)?
            .set_default("export.page_margin_mm", 10.0)?
            .set_default("export.font_path", None::<String>)?
            // Timetable layout
            .set_default("timetable.days", default_days())?
            .set_default("timetable.time_slots", default_time_slots())?

            // 2. Load from local config file (optional, lowest priority)
            .add_source(File::from(PathBuf::from("config.toml")).required(false))

            // 3. Load from user config directory (optional, overrides local)
            .add_source(File::from(config_dir.join("config.toml")).required(false))

            // 4. Load from Environment variables (LEXBOARD__PULL__THRESHOLD=...)
            .add_source(Environment::with_prefix("LEXBOARD").separator("__"));

        let s = builder.build()?;
        let config: AppConfig = s.try_deserialize()?;
        config.pull.validate().context("Invalid pull-to-refresh settings")?;
        config.export.validate().context("Invalid export settings")?;
        Ok(config)
    }
}
