//! In-memory sheets for unit tests.

use excelbundle_core::{CellValue, Workbook, Worksheet};

/// Build a sheet from consecutive rows starting at row 0.
///
/// `""` leaves the cell out; a cell written as `#42` becomes a number.
pub(crate) fn sheet(name: &str, rows: &[&[&str]]) -> Worksheet {
    let mut sheet = Worksheet::new(name);
    for (row, values) in rows.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let cell = match value.strip_prefix('#').and_then(|n| n.parse::<f64>().ok()) {
                Some(number) => CellValue::Number(number),
                None => CellValue::string(value),
            };
            sheet
                .set_cell_value_at(row as u32, col as u16, cell)
                .unwrap();
        }
    }
    sheet
}

pub(crate) fn workbook(sheets: Vec<Worksheet>) -> Workbook {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        workbook.add_existing_worksheet(sheet).unwrap();
    }
    workbook
}
