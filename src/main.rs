use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lexboard::{
    AppConfig, GridSurface, Notifier, PullToRefresh, RenderSurface, TimetableClient,
    TimetableExporter, TimetableGrid, TimetableRefresh, TimetableSnapshot,
    timetable::{self, ScheduleEntry},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "lexboard")]
#[command(about = "Timetable export and pull-to-refresh tooling for the law portal")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export the timetable as PDF or Excel
    Export {
        format: FormatArg,
        /// CSV file with schedule entries (fetched from the backend when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Directory for the exported file (defaults to the downloads directory)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Fetch the timetable from the backend and print it as JSON
    Fetch,
    /// Replay a pull gesture: one move per delta, then release
    Pull {
        #[arg(required = true, allow_negative_numbers = true)]
        deltas: Vec<f32>,
        /// Scroll offset of the container during the gesture
        #[arg(long, default_value_t = 0.0)]
        scroll_top: f32,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Pdf,
    Xlsx,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .parse_lossy("lexboard=debug");

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let config = Arc::new(config);

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    rt.block_on(async {
        match args.command {
            Command::Export {
                format,
                input,
                output_dir,
            } => run_export(&config, format, input, output_dir).await,
            Command::Fetch => run_fetch(&config).await,
            Command::Pull { deltas, scroll_top } => run_pull(&config, &deltas, scroll_top).await,
        }
    })
}

fn notifier() -> Arc<dyn Notifier> {
    #[cfg(feature = "desktop")]
    {
        Arc::new(lexboard::SystemNotifier)
    }
    #[cfg(not(feature = "desktop"))]
    {
        Arc::new(lexboard::LogNotifier)
    }
}

async fn load_entries(config: &AppConfig, input: Option<PathBuf>) -> Result<Vec<ScheduleEntry>> {
    match input {
        Some(path) => timetable::load_csv(&path),
        None => {
            let client = TimetableClient::new(&config.backend, &config.network)?;
            tracing::info!("Fetching timetable from {}", client.endpoint());
            client.fetch_entries().await
        }
    }
}

/// Export the timetable in the requested format.
async fn run_export(
    config: &AppConfig,
    format: FormatArg,
    input: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let entries = load_entries(config, input).await?;
    let snapshot = TimetableSnapshot::new(
        &entries,
        &config.timetable.time_slots,
        &config.timetable.days,
    );

    let mut exporter = TimetableExporter::new(config.export.clone(), notifier());
    if let Some(dir) = output_dir {
        exporter = exporter.with_output_dir(dir);
    }

    let path = match format {
        FormatArg::Xlsx => exporter.export_xlsx(snapshot).await?,
        FormatArg::Pdf => {
            let grid = TimetableGrid::build(&snapshot, &config.export.title);
            let mut surface = GridSurface::new(grid);
            if let Some(font_path) = &config.export.font_path {
                let font = std::fs::read(font_path)
                    .with_context(|| format!("Failed to read font {}", font_path.display()))?;
                surface = surface.with_font(font)?;
            }
            let surface: Arc<dyn RenderSurface> = Arc::new(surface);
            exporter.export_pdf(Some(surface)).await?
        }
    };

    println!("{}", path.display());
    Ok(())
}

async fn run_fetch(config: &AppConfig) -> Result<()> {
    let entries = load_entries(config, None).await?;
    let json = serde_json::to_string_pretty(&entries).context("Failed to encode entries")?;
    println!("{}", json);
    Ok(())
}

/// Drive a recogniser through one synthetic gesture.
async fn run_pull(config: &AppConfig, deltas: &[f32], scroll_top: f32) -> Result<()> {
    let client = TimetableClient::new(&config.backend, &config.network)?;
    let refresh = TimetableRefresh::new(client);
    let ptr = PullToRefresh::new(config.pull, refresh.clone());

    if !ptr.touch_start(0.0, scroll_top) {
        tracing::info!("Gesture rejected: container is not at the top");
    }
    for delta in deltas {
        let suppressed = ptr.touch_move(*delta, scroll_top);
        let snapshot = ptr.snapshot();
        tracing::debug!(
            delta,
            suppressed,
            pull_distance = snapshot.pull_distance,
            can_refresh = snapshot.can_refresh,
            opacity = snapshot.indicator.opacity,
            "touch move"
        );
    }

    let before = ptr.snapshot();
    let outcome = ptr.touch_end().await;
    let after = ptr.snapshot();

    println!(
        "pull_distance={:.1} can_refresh={} outcome={:?} entries={} reset={}",
        before.pull_distance,
        before.can_refresh,
        outcome,
        refresh.entries().len(),
        after.pull_distance == 0.0 && !after.can_refresh
    );
    Ok(())
}
