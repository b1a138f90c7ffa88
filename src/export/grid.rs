use crate::timetable::TimetableSnapshot;

pub const CORNER_LABEL: &str = "Day/Time";

/// The spreadsheet layout as plain strings.
///
/// Row 0 is the title, row 1 a blank spacer, row 2 the header
/// (`"Day/Time"` followed by each slot) and then one row per day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableGrid {
    pub title: String,
    pub header: Vec<String>,
    pub days: Vec<DayRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRow {
    pub day: String,
    pub cells: Vec<String>,
}

impl TimetableGrid {
    pub fn build(snapshot: &TimetableSnapshot, title: &str) -> Self {
        let header = std::iter::once(CORNER_LABEL.to_string())
            .chain(snapshot.time_slots().iter().cloned())
            .collect();

        let days = snapshot
            .days()
            .iter()
            .map(|day| DayRow {
                day: day.clone(),
                cells: (0..snapshot.time_slots().len())
                    .map(|slot| {
                        snapshot
                            .entry_at(day, slot)
                            .map(|entry| entry.cell_text())
                            .unwrap_or_default()
                    })
                    .collect(),
            })
            .collect();

        let skipped = snapshot.unplaceable().count();
        if skipped > 0 {
            tracing::debug!("{} schedule entries do not fit the slot grid", skipped);
        }

        Self {
            title: title.to_string(),
            header,
            days,
        }
    }

    /// Number of columns including the day label column.
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// All rows in sheet order, each padded to [`TimetableGrid::column_count`].
    pub fn rows(&self) -> Vec<Vec<String>> {
        let width = self.column_count();
        let mut title = vec![String::new(); width];
        title[0] = self.title.clone();

        let mut rows = vec![title, vec![String::new(); width], self.header.clone()];
        rows.extend(self.days.iter().map(|row| {
            std::iter::once(row.day.clone())
                .chain(row.cells.iter().cloned())
                .collect()
        }));
        rows
    }

    pub fn cell(&self, day: &str, slot: &str) -> Option<&str> {
        let column = self.header.iter().skip(1).position(|s| s == slot)?;
        let row = self.days.iter().find(|r| r.day == day)?;
        row.cells.get(column).map(String::as_str)
    }
}
