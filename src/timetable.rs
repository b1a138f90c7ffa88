//! Schedule entries and the immutable snapshot the exporters read from.

use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// One class session as stored by the backend's timetable table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub course_code: String,
    pub course_title: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub lecturer: String,
}

impl ScheduleEntry {
    /// Cell text used by the spreadsheet export.
    pub fn cell_text(&self) -> String {
        format!(
            "{}: {}\nLocation: {}\nLecturer: {}",
            self.course_code, self.course_title, self.location, self.lecturer
        )
    }
}

/// A copy of the timetable taken at the moment an export is triggered.
///
/// Later changes to the caller's collections never reach an export that
/// already holds a snapshot, so repeated exports of the same input agree.
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableSnapshot {
    entries: Arc<[ScheduleEntry]>,
    time_slots: Arc<[String]>,
    days: Arc<[String]>,
}

impl TimetableSnapshot {
    pub fn new(entries: &[ScheduleEntry], time_slots: &[String], days: &[String]) -> Self {
        Self {
            entries: entries.into(),
            time_slots: time_slots.into(),
            days: days.into(),
        }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn time_slots(&self) -> &[String] {
        &self.time_slots
    }

    pub fn days(&self) -> &[String] {
        &self.days
    }

    /// Position of a time label within the ordered slot sequence.
    pub fn slot_index(&self, label: &str) -> Option<usize> {
        self.time_slots.iter().position(|slot| slot == label)
    }

    /// Half-open slot range `[start, end)` covered by an entry.
    ///
    /// `None` when either boundary is not a known slot label.
    pub fn entry_span(&self, entry: &ScheduleEntry) -> Option<Range<usize>> {
        let start = self.slot_index(&entry.start_time)?;
        let end = self.slot_index(&entry.end_time)?;
        Some(start..end)
    }

    /// First entry on `day` whose span contains `slot`.
    pub fn entry_at(&self, day: &str, slot: usize) -> Option<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.day == day)
            .find(|entry| {
                self.entry_span(entry)
                    .is_some_and(|span| span.contains(&slot))
            })
    }

    /// Entries that can never appear in a grid cell.
    pub fn unplaceable(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries
            .iter()
            .filter(|entry| self.entry_span(entry).is_none_or(|span| span.is_empty()))
    }
}

/// Read schedule entries from a CSV file whose headers match the field names.
pub fn load_csv(path: &Path) -> Result<Vec<ScheduleEntry>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut entries = Vec::new();
    for (line, record) in reader.deserialize::<ScheduleEntry>().enumerate() {
        let entry = record.with_context(|| format!("Invalid schedule entry at row {}", line + 1))?;
        entries.push(entry);
    }

    tracing::debug!("Loaded {} schedule entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Monday to Friday.
pub fn default_days() -> Vec<String> {
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Hourly labels from 8:00 AM to 6:00 PM, formatted like `"9:00 AM"`.
pub fn default_time_slots() -> Vec<String> {
    hourly_slots(8, 18)
}

/// Hourly labels for `first_hour..=last_hour` (24-hour clock input).
pub fn hourly_slots(first_hour: u32, last_hour: u32) -> Vec<String> {
    let Some(start) = NaiveTime::from_hms_opt(first_hour, 0, 0) else {
        return Vec::new();
    };

    (0..=last_hour.saturating_sub(first_hour))
        .map(|offset| start + TimeDelta::hours(i64::from(offset)))
        .map(|time| time.format("%-I:%M %p").to_string())
        .collect()
}
