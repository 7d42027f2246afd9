//! # excelbundle
//!
//! Extracts localized string resources from Excel workbooks and writes them
//! as per-language `.properties` files.
//!
//! A worksheet lists one or more bundles. Each bundle starts with a row whose
//! first cell is a path beginning with `/` or `\`, followed by a header row
//! naming one language per column, followed by key rows:
//!
//! ```text
//!   /app/messages
//!                 en       fr
//!   greeting      Hello    Bonjour
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use excelbundle::{write_language_pack, ExcelImporter, WriteOptions};
//! use std::path::Path;
//!
//! let importer = ExcelImporter::open("strings.xls")?;
//! for language in importer.languages() {
//!     if let Some(pack) = importer.load_language(&language) {
//!         write_language_pack(&pack, Path::new("out"), &WriteOptions::default())?;
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod importer;
pub mod pack;
pub mod properties;
pub mod scanner;

#[cfg(test)]
mod test_util;

pub use builder::{discover_workbook_languages, LanguagePackBuilder};
pub use importer::{ExcelImporter, ImportError};
pub use pack::{LanguagePack, ResourceBlock, ResourceBlockBuilder};
pub use properties::{
    bundle_file_path, render_block, write_block, write_language_pack, Encoding, WriteError,
    WriteOptions,
};
pub use scanner::{discover_languages, is_bundle_marker, SheetScanner};

// Workbook model and reader, for callers that build or inspect workbooks
pub use excelbundle_core::{CellValue, Row, Workbook, Worksheet};
pub use excelbundle_xls::{XlsError, XlsReader};
