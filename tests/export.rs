//! Integration tests for the timetable export pipeline.
//!
//! Files are written into temporary directories; notifications are
//! captured with MockNotifier.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use lexboard::{
    ExportError, GridSurface, MockNotifier, RenderSurface, ScheduleEntry, TimetableExporter,
    TimetableGrid, TimetableSnapshot, build_xlsx, config::ExportConfig,
};

fn entry(code: &str, day: &str, start: &str, end: &str) -> ScheduleEntry {
    ScheduleEntry {
        course_code: code.to_string(),
        course_title: "Land Law".to_string(),
        day: day.to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        location: "Faculty Hall".to_string(),
        lecturer: "Dr. Musa".to_string(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn snapshot(entries: &[ScheduleEntry]) -> TimetableSnapshot {
    TimetableSnapshot::new(
        entries,
        &strings(&["8:00 AM", "9:00 AM", "10:00 AM", "11:00 AM"]),
        &strings(&["Monday", "Tuesday", "Wednesday"]),
    )
}

fn exporter(dir: &Path) -> (TimetableExporter<MockNotifier>, Arc<MockNotifier>) {
    let notifier = Arc::new(MockNotifier::new());
    let exporter =
        TimetableExporter::new(ExportConfig::default(), Arc::clone(&notifier)).with_output_dir(dir);
    (exporter, notifier)
}

#[tokio::test]
async fn test_xlsx_export_writes_file_and_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let (exporter, notifier) = exporter(dir.path());

    let path = exporter
        .export_xlsx(snapshot(&[entry("LPU201", "Monday", "9:00 AM", "11:00 AM")]))
        .await
        .expect("export should succeed");

    assert_eq!(path, dir.path().join("class-timetable.xlsx"));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"PK"));
    assert_eq!(notifier.titles(), vec!["Export complete"]);
}

/// Read one XML part out of a written workbook.
fn workbook_part(path: &Path, name: &str) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

#[tokio::test]
async fn test_xlsx_workbook_layout() {
    let dir = tempfile::tempdir().unwrap();
    let (exporter, _) = exporter(dir.path());

    let path = exporter
        .export_xlsx(snapshot(&[entry("LPU201", "Monday", "9:00 AM", "11:00 AM")]))
        .await
        .unwrap();

    let workbook = workbook_part(&path, "xl/workbook.xml");
    assert!(workbook.contains(r#"name="Timetable""#));

    // Day column plus four slots: the title spans A..E.
    let sheet = workbook_part(&path, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<mergeCell ref="A1:E1"/>"#));

    let strings = workbook_part(&path, "xl/sharedStrings.xml");
    for text in [
        "Class Timetable",
        "Day/Time",
        "8:00 AM",
        "11:00 AM",
        "Monday",
        "Wednesday",
        "LPU201: Land Law",
        "Location: Faculty Hall",
        "Lecturer: Dr. Musa",
    ] {
        assert!(strings.contains(text), "missing {:?}", text);
    }
}

#[tokio::test]
async fn test_xlsx_exports_of_one_snapshot_match() {
    let mut entries = vec![
        entry("LPU201", "Monday", "9:00 AM", "11:00 AM"),
        entry("LPU330", "Wednesday", "8:00 AM", "9:00 AM"),
    ];
    let taken = snapshot(&entries);

    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();
    let (first_exporter, _) = exporter(first_dir.path());
    let (second_exporter, _) = exporter(second_dir.path());

    let first = first_exporter.export_xlsx(taken.clone()).await.unwrap();
    entries.push(entry("LPU999", "Tuesday", "8:00 AM", "11:00 AM"));
    let second = second_exporter.export_xlsx(taken).await.unwrap();

    for part in ["xl/sharedStrings.xml", "xl/worksheets/sheet1.xml"] {
        assert_eq!(workbook_part(&first, part), workbook_part(&second, part));
    }
    assert!(!workbook_part(&second, "xl/sharedStrings.xml").contains("LPU999"));
}

#[tokio::test]
async fn test_pdf_export_writes_file_and_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let (exporter, notifier) = exporter(dir.path());

    let grid = TimetableGrid::build(
        &snapshot(&[entry("LPU201", "Tuesday", "8:00 AM", "10:00 AM")]),
        "Class Timetable",
    );
    let surface: Arc<dyn RenderSurface> = Arc::new(GridSurface::new(grid));

    let path = exporter.export_pdf(Some(surface)).await.expect("export should succeed");

    assert_eq!(path, dir.path().join("class-timetable.pdf"));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(notifier.titles(), vec!["Export complete"]);
}

#[tokio::test]
async fn test_pdf_export_without_surface_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let (exporter, notifier) = exporter(dir.path());

    let result = exporter.export_pdf(None).await;

    assert!(matches!(result, Err(ExportError::MissingSurface)));
    assert!(!dir.path().join("class-timetable.pdf").exists());
    assert_eq!(notifier.titles(), vec!["Export failed"]);
}

#[tokio::test]
async fn test_failed_raster_leaves_no_file() {
    struct BrokenSurface;

    impl RenderSurface for BrokenSurface {
        fn rasterize(&self, _scale: f32) -> anyhow::Result<image::RgbaImage> {
            anyhow::bail!("surface detached")
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let (exporter, notifier) = exporter(dir.path());

    let surface: Arc<dyn RenderSurface> = Arc::new(BrokenSurface);
    let result = exporter.export_pdf(Some(surface)).await;

    assert!(matches!(result, Err(ExportError::Raster(_))));
    assert!(!dir.path().join("class-timetable.pdf").exists());
    assert_eq!(notifier.titles(), vec!["Export failed"]);
}

#[test]
fn test_spreadsheet_cells_follow_slot_intervals() {
    let grid = TimetableGrid::build(
        &snapshot(&[entry("LPU201", "Monday", "9:00 AM", "11:00 AM")]),
        "Class Timetable",
    );
    let text = "LPU201: Land Law\nLocation: Faculty Hall\nLecturer: Dr. Musa";

    assert_eq!(grid.cell("Monday", "8:00 AM"), Some(""));
    assert_eq!(grid.cell("Monday", "9:00 AM"), Some(text));
    assert_eq!(grid.cell("Monday", "10:00 AM"), Some(text));
    assert_eq!(grid.cell("Monday", "11:00 AM"), Some(""));
}

#[test]
fn test_entry_with_unknown_start_is_skipped() {
    let entries = [
        entry("LPU110", "Monday", "7:15 AM", "9:00 AM"),
        entry("LPU120", "Wednesday", "9:00 AM", "12:30 PM"),
    ];
    let grid = TimetableGrid::build(&snapshot(&entries), "Class Timetable");

    assert!(
        grid.days
            .iter()
            .flat_map(|row| row.cells.iter())
            .all(String::is_empty)
    );
    assert!(build_xlsx(&snapshot(&entries), "Class Timetable").is_ok());
}

#[test]
fn test_repeated_exports_have_identical_content() {
    let mut entries = vec![
        entry("LPU201", "Monday", "9:00 AM", "11:00 AM"),
        entry("LPU330", "Wednesday", "8:00 AM", "9:00 AM"),
    ];
    let taken = snapshot(&entries);

    let first = TimetableGrid::build(&taken, "Class Timetable");
    entries.push(entry("LPU999", "Tuesday", "8:00 AM", "11:00 AM"));
    let second = TimetableGrid::build(&taken, "Class Timetable");

    assert_eq!(first.rows(), second.rows());
}

#[test]
fn test_overlapping_entries_keep_first() {
    let entries = [
        entry("LPU201", "Monday", "9:00 AM", "11:00 AM"),
        entry("LPU202", "Monday", "9:00 AM", "10:00 AM"),
    ];
    let grid = TimetableGrid::build(&snapshot(&entries), "Class Timetable");

    let cell = grid.cell("Monday", "9:00 AM").unwrap();
    assert!(cell.starts_with("LPU201:"));
}
