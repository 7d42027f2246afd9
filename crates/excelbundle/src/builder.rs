//! Language pack assembly across all sheets of a workbook.

use excelbundle_core::{Workbook, Worksheet};
use indexmap::IndexSet;

use crate::pack::{LanguagePack, ResourceBlock};
use crate::scanner::{collect_languages, SheetScanner};

/// Collects the blocks of one language, sheet after sheet.
///
/// ```rust
/// use excelbundle::LanguagePackBuilder;
/// use excelbundle_core::Workbook;
///
/// let mut workbook = Workbook::new();
/// let sheet = workbook.add_worksheet_with_name("Strings").unwrap();
/// let sheet = workbook.worksheet_mut(sheet).unwrap();
/// sheet.set_cell_value("A1", "/app/messages").unwrap();
/// sheet.set_cell_value("B2", "en").unwrap();
/// sheet.set_cell_value("A3", "greeting").unwrap();
/// sheet.set_cell_value("B3", "Hello").unwrap();
///
/// let pack = LanguagePackBuilder::build(&workbook, "en").unwrap();
/// assert_eq!(pack.blocks()[0].get("greeting"), Some("Hello"));
///
/// assert!(LanguagePackBuilder::build(&workbook, "de").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct LanguagePackBuilder {
    scanner: SheetScanner,
    blocks: Vec<ResourceBlock>,
}

impl LanguagePackBuilder {
    /// Empty builder for `language`
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            scanner: SheetScanner::new(language),
            blocks: Vec::new(),
        }
    }

    /// Target language
    pub fn language(&self) -> &str {
        self.scanner.language()
    }

    /// Scan one sheet and append its blocks. Returns how many were found.
    pub fn add_sheet(&mut self, sheet: &Worksheet) -> usize {
        let found = self.scanner.scan(sheet);
        let count = found.len();
        log::debug!(
            "sheet '{}': {} block(s) for '{}'",
            sheet.name(),
            count,
            self.language()
        );
        self.blocks.extend(found);
        count
    }

    /// Scan every sheet of `workbook` in order.
    pub fn add_workbook(&mut self, workbook: &Workbook) -> &mut Self {
        for sheet in workbook.worksheets() {
            self.add_sheet(sheet);
        }
        self
    }

    /// Finish the pack; `None` when no sheet contributed a block.
    pub fn finish(self) -> Option<LanguagePack> {
        let language = self.scanner.language().to_string();
        match LanguagePack::from_blocks(language, self.blocks) {
            Some(pack) => {
                log::info!(
                    "language '{}': {} block(s), {} pair(s)",
                    pack.language(),
                    pack.len(),
                    pack.pair_count()
                );
                Some(pack)
            }
            None => {
                log::info!("language '{}': no resources found", self.scanner.language());
                None
            }
        }
    }

    /// Build the pack of `language` from every sheet of `workbook`.
    pub fn build(workbook: &Workbook, language: &str) -> Option<LanguagePack> {
        let mut builder = Self::new(language);
        builder.add_workbook(workbook);
        builder.finish()
    }
}

/// Languages named in any header row of the workbook, in sheet order.
pub fn discover_workbook_languages(workbook: &Workbook) -> Vec<String> {
    let mut languages = IndexSet::new();
    for sheet in workbook.worksheets() {
        collect_languages(sheet, &mut languages);
    }
    languages.into_iter().collect()
}
