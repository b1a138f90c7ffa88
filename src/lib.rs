//! Lexboard Library
//!
//! Core of the portal's timetable features: the pull-to-refresh gesture
//! recogniser, the timetable export pipeline, and the backend client that
//! feeds them.

pub mod api;
pub mod config;
pub mod export;
pub mod gesture;
pub mod timetable;
pub mod traits;

// Re-export commonly used types
pub use api::{TimetableClient, TimetableRefresh};
pub use config::{AppConfig, PullConfig};
pub use export::{
    ExportArtifact, ExportError, ExportFormat, GridSurface, RenderSurface, TimetableExporter,
    TimetableGrid, build_pdf, build_xlsx,
};
pub use gesture::{
    IndicatorStyle, Phase, PullSnapshot, PullState, PullToRefresh, RefreshAction, RefreshFn,
    RefreshOutcome, ScrollContainer, TouchEvent, TouchPoint,
};
pub use timetable::{ScheduleEntry, TimetableSnapshot};
#[cfg(feature = "desktop")]
pub use traits::SystemNotifier;
pub use traits::{LogNotifier, MockNotifier, Notifier};
