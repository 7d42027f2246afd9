//! # excelbundle-core
//!
//! Workbook model used by the excelbundle importer.
//!
//! This crate provides the small set of types the row scanner works on:
//! - [`CellValue`] - Typed cell values (strings, numbers, booleans, blanks, errors, formulas)
//! - [`CellAddress`] - A cell location, printed in A1 notation for diagnostics
//! - [`Row`] - An ordered, sparse set of cells
//! - [`Worksheet`], [`Workbook`] - Ordered, sparse rows grouped into sheets
//!
//! ## Example
//!
//! ```rust
//! use excelbundle_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let index = workbook.add_worksheet_with_name("Strings").unwrap();
//! let sheet = workbook.worksheet_mut(index).unwrap();
//!
//! sheet.set_cell_value("A1", "/app/messages").unwrap();
//! sheet.set_cell_value_at(1, 1, CellValue::string("en")).unwrap();
//!
//! assert_eq!(sheet.row(0).unwrap().string_value(0), Some("/app/messages"));
//! ```

pub mod cell;
pub mod error;
pub mod row;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellError, CellValue, SharedString};
pub use error::{Error, Result};
pub use row::Row;
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
