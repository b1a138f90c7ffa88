use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, XlsxError};

use super::grid::TimetableGrid;

pub const SHEET_NAME: &str = "Timetable";

const DAY_COLUMN_WIDTH: f64 = 15.0;
const SLOT_COLUMN_WIDTH: f64 = 25.0;
const HEADER_ROW_HEIGHT: f64 = 25.0;
const DAY_ROW_HEIGHT: f64 = 75.0;

/// First day row; rows above it are title, spacer and header.
const FIRST_DAY_ROW: u32 = 3;

/// Serialise the grid into an `.xlsx` workbook with a single sheet.
pub fn render_workbook(grid: &TimetableGrid) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let title_format = Format::new()
        .set_bold()
        .set_font_size(14)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let header_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let day_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::VerticalCenter);
    let cell_format = Format::new()
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Top);

    let last_col = column_index(grid.column_count().saturating_sub(1))?;

    // Title
    if last_col > 0 {
        worksheet.merge_range(0, 0, 0, last_col, &grid.title, &title_format)?;
    } else {
        worksheet.write_string_with_format(0, 0, &grid.title, &title_format)?;
    }

    // Header
    for (col, label) in grid.header.iter().enumerate() {
        worksheet.write_string_with_format(2, column_index(col)?, label, &header_format)?;
    }

    // Day rows
    for (offset, row) in grid.days.iter().enumerate() {
        let row_idx = u32::try_from(offset)
            .ok()
            .and_then(|offset| FIRST_DAY_ROW.checked_add(offset))
            .ok_or(XlsxError::RowColumnLimitError)?;
        worksheet.write_string_with_format(row_idx, 0, &row.day, &day_format)?;
        for (slot, text) in row.cells.iter().enumerate() {
            worksheet.write_string_with_format(row_idx, column_index(slot + 1)?, text, &cell_format)?;
        }
        worksheet.set_row_height(row_idx, DAY_ROW_HEIGHT)?;
    }

    worksheet.set_column_width(0, DAY_COLUMN_WIDTH)?;
    for col in 1..=last_col {
        worksheet.set_column_width(col, SLOT_COLUMN_WIDTH)?;
    }
    for row in 0..FIRST_DAY_ROW {
        worksheet.set_row_height(row, HEADER_ROW_HEIGHT)?;
    }

    workbook.save_to_buffer()
}

fn column_index(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}
