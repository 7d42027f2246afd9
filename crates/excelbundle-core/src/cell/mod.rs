//! Cell-related types
//!
//! This module contains:
//! - [`CellValue`] - The typed value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")

mod address;
mod value;

pub use address::CellAddress;
pub use value::{CellError, CellValue, SharedString};
