//! # excelbundle-xls
//!
//! XLS (BIFF8) reader for excelbundle.
//!
//! This crate reads the legacy Excel binary format (.xls) into the
//! [`excelbundle_core::Workbook`] model. Only cell values are imported;
//! formatting, charts and formulas' expressions are skipped.

pub mod biff;
pub mod error;
pub mod reader;

pub use error::{XlsError, XlsResult};
pub use reader::XlsReader;
