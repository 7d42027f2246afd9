//! Workbook-level entry point.

use std::path::{Path, PathBuf};

use excelbundle_core::Workbook;
use excelbundle_xls::{XlsError, XlsReader};
use thiserror::Error;

use crate::builder::{discover_workbook_languages, LanguagePackBuilder};
use crate::pack::LanguagePack;

/// Failure to load a workbook.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file could not be opened or is not a readable `.xls` workbook
    #[error("cannot read workbook '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: XlsError,
    },
}

/// A loaded workbook, ready to produce language packs.
///
/// The workbook is fully read into memory by [`ExcelImporter::open`]; no file
/// handle outlives that call.
#[derive(Debug, Clone)]
pub struct ExcelImporter {
    workbook: Workbook,
    path: Option<PathBuf>,
}

impl ExcelImporter {
    /// Read a legacy `.xls` workbook from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ImportError> {
        let path = path.as_ref();
        let workbook = XlsReader::read_file(path).map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "loaded '{}': {} sheet(s)",
            path.display(),
            workbook.sheet_count()
        );
        Ok(Self {
            workbook,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wrap a workbook that is already in memory.
    pub fn from_workbook(workbook: Workbook) -> Self {
        Self {
            workbook,
            path: None,
        }
    }

    /// Pack of `language`, or `None` when no sheet has resources for it.
    pub fn load_language(&self, language: &str) -> Option<LanguagePack> {
        LanguagePackBuilder::build(&self.workbook, language)
    }

    /// Every language named in a header row, in first-seen order
    pub fn languages(&self) -> Vec<String> {
        discover_workbook_languages(&self.workbook)
    }

    /// The underlying workbook
    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    /// Path the workbook was read from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl From<Workbook> for ExcelImporter {
    fn from(workbook: Workbook) -> Self {
        Self::from_workbook(workbook)
    }
}
