//! Row scanner that turns one worksheet into resource blocks.
//!
//! A sheet holds any number of blocks laid out like this:
//!
//! ```text
//!   A               B        C        D
//!   /app/messages                                <- bundle path marker
//!                   en       fr       de         <- language header
//!   greeting        Hello    Bonjour  Hallo      <- key rows
//!   farewell        Bye      Salut
//!   /app/errors                                  <- next marker ends the block
//! ```
//!
//! Only string cells take part. Rows without any cell are ignored entirely,
//! so blank lines between a marker, its header and its keys do not matter.

use excelbundle_core::{CellAddress, Row, Worksheet};
use indexmap::IndexSet;

use crate::pack::{ResourceBlock, ResourceBlockBuilder};

/// Whether a column-0 value starts a new bundle.
pub fn is_bundle_marker(value: &str) -> bool {
    value.starts_with('/') || value.starts_with('\\')
}

/// Cursor over the non-empty rows of a sheet that can step back once.
struct RowCursor<'a> {
    rows: Vec<&'a Row>,
    position: usize,
}

impl<'a> RowCursor<'a> {
    fn new(sheet: &'a Worksheet) -> Self {
        let rows = sheet.non_empty_rows();
        log::debug!(
            "sheet '{}': {} non-empty row(s)",
            sheet.name(),
            rows.len()
        );
        Self { rows, position: 0 }
    }

    /// Give back the row returned by the last `next` call.
    fn retreat(&mut self) {
        self.position = self.position.saturating_sub(1);
    }
}

impl<'a> Iterator for RowCursor<'a> {
    type Item = &'a Row;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.get(self.position).copied()?;
        self.position += 1;
        Some(row)
    }
}

/// Bundle path of a marker row
fn marker(row: &Row) -> Option<&str> {
    row.string_value(0).filter(|value| is_bundle_marker(value))
}

/// Column of the first header cell (column 1 onwards) equal to `language`
fn language_column(header: &Row, language: &str) -> Option<u16> {
    header
        .cells()
        .filter(|(col, _)| *col >= 1)
        .find(|(_, value)| value.string_value() == Some(language))
        .map(|(col, _)| col)
}

/// Extracts the blocks of one language from worksheets.
#[derive(Debug, Clone)]
pub struct SheetScanner {
    language: String,
}

impl SheetScanner {
    /// Scanner for `language`, matched exactly against header cells
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// Target language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Scan `sheet` and return its blocks in row order.
    ///
    /// Never fails: missing headers, missing languages and truncated sheets
    /// only mean fewer blocks.
    pub fn scan(&self, sheet: &Worksheet) -> Vec<ResourceBlock> {
        let mut cursor = RowCursor::new(sheet);
        let mut blocks = Vec::new();

        while let Some(row) = cursor.next() {
            let Some(bundle_path) = marker(row) else {
                log::debug!(
                    "sheet '{}' row {}: no bundle path, skipped",
                    sheet.name(),
                    row.index() + 1
                );
                continue;
            };

            let Some(header) = cursor.next() else {
                log::warn!(
                    "sheet '{}': bundle '{}' at {} has no language header row",
                    sheet.name(),
                    bundle_path,
                    CellAddress::new(row.index(), 0)
                );
                break;
            };

            let Some(value_col) = language_column(header, &self.language) else {
                log::debug!(
                    "sheet '{}': bundle '{}' has no '{}' column in header row {}",
                    sheet.name(),
                    bundle_path,
                    self.language,
                    header.index() + 1
                );
                continue;
            };

            let block = self.collect_pairs(&mut cursor, sheet, bundle_path, value_col);
            match block.finish() {
                Some(block) => {
                    log::debug!(
                        "sheet '{}': bundle '{}' with {} pair(s)",
                        sheet.name(),
                        block.bundle_path(),
                        block.len()
                    );
                    blocks.push(block);
                }
                None => log::debug!(
                    "sheet '{}': bundle '{}' has no keys, discarded",
                    sheet.name(),
                    bundle_path
                ),
            }
        }

        blocks
    }

    /// Read key rows until the next marker (left for the caller) or the end.
    fn collect_pairs(
        &self,
        cursor: &mut RowCursor<'_>,
        sheet: &Worksheet,
        bundle_path: &str,
        value_col: u16,
    ) -> ResourceBlockBuilder {
        let mut block = ResourceBlockBuilder::new(bundle_path, self.language.as_str());

        while let Some(row) = cursor.next() {
            let Some(key) = row.string_value(0) else {
                log::debug!(
                    "sheet '{}' row {}: no key, skipped",
                    sheet.name(),
                    row.index() + 1
                );
                continue;
            };

            if is_bundle_marker(key) {
                cursor.retreat();
                break;
            }

            let value = row.string_value(value_col);
            log::trace!(
                "{}: {} = {:?}",
                CellAddress::new(row.index(), value_col),
                key,
                value
            );
            block.insert(key, value.map(str::to_string));
        }

        block
    }
}

/// Languages named in the header rows of `sheet`, in first-seen order.
///
/// Every marker row that is followed by another row contributes the string
/// cells of that row from column 1 onwards.
pub fn discover_languages(sheet: &Worksheet) -> Vec<String> {
    let mut languages = IndexSet::new();
    collect_languages(sheet, &mut languages);
    languages.into_iter().collect()
}

pub(crate) fn collect_languages(sheet: &Worksheet, languages: &mut IndexSet<String>) {
    let mut cursor = RowCursor::new(sheet);

    while let Some(row) = cursor.next() {
        if marker(row).is_none() {
            continue;
        }
        let Some(header) = cursor.next() else {
            break;
        };
        for (_, value) in header.cells().filter(|(col, _)| *col >= 1) {
            if let Some(language) = value.string_value() {
                if !languages.contains(language) {
                    languages.insert(language.to_string());
                }
            }
        }
    }
}
