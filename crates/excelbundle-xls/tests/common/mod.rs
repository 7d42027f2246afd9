//! Builds small BIFF8 `.xls` fixtures in memory.
//!
//! This is not a general `.xls` writer: it emits just the records the reader
//! consumes (BOF/EOF, BOUNDSHEET, SST with CONTINUE, and cell records) inside
//! a CFB container. Other crates' tests include this file with `#[path]`.
#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;

const RECORD_BOF: u16 = 0x0809;
const RECORD_EOF: u16 = 0x000A;
const RECORD_CONTINUE: u16 = 0x003C;
const RECORD_BOUNDSHEET: u16 = 0x0085;
const RECORD_SST: u16 = 0x00FC;
const RECORD_LABELSST: u16 = 0x00FD;
const RECORD_LABEL: u16 = 0x0204;
const RECORD_NUMBER: u16 = 0x0203;
const RECORD_BLANK: u16 = 0x0201;
const RECORD_BOOLERR: u16 = 0x0205;
const RECORD_FORMULA: u16 = 0x0006;
const RECORD_STRING: u16 = 0x0207;

const BOF_VERSION_BIFF8: u16 = 0x0600;
const BOF_DT_WORKBOOK_GLOBALS: u16 = 0x0005;
const BOF_DT_WORKSHEET: u16 = 0x0010;

/// Largest record body BIFF8 allows before a CONTINUE is needed.
const MAX_RECORD_BODY: usize = 8224;

/// One fixture cell.
#[derive(Debug, Clone)]
pub enum Cell {
    /// No record at all
    None,
    /// Shared string (LABELSST)
    Text(String),
    /// Inline string (LABEL)
    Label(String),
    /// NUMBER record
    Number(f64),
    /// BOOLERR record with a boolean
    Bool(bool),
    /// BLANK record (formatting only)
    Blank,
    /// FORMULA with a cached string result (FORMULA + STRING)
    FormulaText(String),
}

/// Shared-string cell, or no cell for `""`.
pub fn text(s: &str) -> Cell {
    if s.is_empty() {
        Cell::None
    } else {
        Cell::Text(s.to_string())
    }
}

/// A sheet: a name and sparse rows of cells.
#[derive(Debug, Clone)]
pub struct SheetFixture {
    name: String,
    sheet_type: u8,
    rows: Vec<(u16, Vec<Cell>)>,
}

impl SheetFixture {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sheet_type: 0,
            rows: Vec::new(),
        }
    }

    /// A chart sheet: listed in BOUNDSHEET, never read as a worksheet.
    pub fn chart(name: &str) -> Self {
        Self {
            sheet_type: 2,
            ..Self::new(name)
        }
    }

    /// Add a row of cells starting at column 0.
    pub fn row(mut self, index: u16, cells: Vec<Cell>) -> Self {
        self.rows.push((index, cells));
        self
    }

    /// Add a row of shared strings; `""` leaves the column empty.
    pub fn text_row(self, index: u16, values: &[&str]) -> Self {
        let cells = values.iter().map(|v| text(v)).collect();
        self.row(index, cells)
    }

    /// Add consecutive text rows starting at `first`.
    pub fn text_rows(self, first: u16, rows: &[&[&str]]) -> Self {
        rows.iter()
            .enumerate()
            .fold(self, |sheet, (i, values)| sheet.text_row(first + i as u16, values))
    }
}

/// Build a complete `.xls` file for the given sheets.
pub fn build_workbook_xls(sheets: &[SheetFixture]) -> Vec<u8> {
    wrap_in_cfb(&build_workbook_stream(sheets))
}

/// Build the fixture and write it into `dir/name`.
pub fn write_workbook_xls(dir: &Path, name: &str, sheets: &[SheetFixture]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_workbook_xls(sheets)).expect("write xls fixture");
    path
}

/// Wrap a BIFF8 stream in a CFB container under the `Workbook` name.
pub fn wrap_in_cfb(workbook_stream: &[u8]) -> Vec<u8> {
    let cursor = Cursor::new(Vec::new());
    let mut ole = cfb::CompoundFile::create(cursor).expect("create cfb");
    {
        let mut stream = ole.create_stream("Workbook").expect("Workbook stream");
        stream
            .write_all(workbook_stream)
            .expect("write Workbook stream");
    }
    ole.into_inner().into_inner()
}

/// Build the raw BIFF8 `Workbook` stream.
pub fn build_workbook_stream(sheets: &[SheetFixture]) -> Vec<u8> {
    let mut sst: Vec<String> = Vec::new();
    let substreams: Vec<Vec<u8>> = sheets
        .iter()
        .map(|sheet| build_sheet_substream(sheet, &mut sst))
        .collect();

    // BOUNDSHEET bodies have a fixed size, so a first pass with zero offsets
    // gives the globals length.
    let globals_len = build_globals(sheets, &vec![0; sheets.len()], &sst).len();
    let mut offsets = Vec::with_capacity(sheets.len());
    let mut position = globals_len;
    for substream in &substreams {
        offsets.push(position as u32);
        position += substream.len();
    }

    let mut out = build_globals(sheets, &offsets, &sst);
    for substream in substreams {
        out.extend_from_slice(&substream);
    }
    out
}

fn build_globals(sheets: &[SheetFixture], offsets: &[u32], sst: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    push_record(&mut out, RECORD_BOF, &bof(BOF_DT_WORKBOOK_GLOBALS));

    for (sheet, offset) in sheets.iter().zip(offsets) {
        let mut body = Vec::new();
        body.extend_from_slice(&offset.to_le_bytes());
        body.push(0); // visible
        body.push(sheet.sheet_type);
        write_short_unicode_string(&mut body, &sheet.name);
        push_record(&mut out, RECORD_BOUNDSHEET, &body);
    }

    if !sst.is_empty() {
        push_sst(&mut out, sst);
    }

    push_record(&mut out, RECORD_EOF, &[]);
    out
}

fn build_sheet_substream(sheet: &SheetFixture, sst: &mut Vec<String>) -> Vec<u8> {
    let mut out = Vec::new();
    push_record(&mut out, RECORD_BOF, &bof(BOF_DT_WORKSHEET));

    for (row, cells) in &sheet.rows {
        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::None => {}
                Cell::Text(s) => {
                    let index = match sst.iter().position(|existing| existing == s) {
                        Some(index) => index,
                        None => {
                            sst.push(s.clone());
                            sst.len() - 1
                        }
                    };
                    let mut body = cell_header(*row, col);
                    body.extend_from_slice(&(index as u32).to_le_bytes());
                    push_record(&mut out, RECORD_LABELSST, &body);
                }
                Cell::Label(s) => {
                    let mut body = cell_header(*row, col);
                    write_unicode_string(&mut body, s);
                    push_record(&mut out, RECORD_LABEL, &body);
                }
                Cell::Number(n) => {
                    let mut body = cell_header(*row, col);
                    body.extend_from_slice(&n.to_le_bytes());
                    push_record(&mut out, RECORD_NUMBER, &body);
                }
                Cell::Bool(b) => {
                    let mut body = cell_header(*row, col);
                    body.push(u8::from(*b));
                    body.push(0);
                    push_record(&mut out, RECORD_BOOLERR, &body);
                }
                Cell::Blank => {
                    push_record(&mut out, RECORD_BLANK, &cell_header(*row, col));
                }
                Cell::FormulaText(s) => {
                    let mut body = cell_header(*row, col);
                    body.extend_from_slice(&[0x00, 0, 0, 0, 0, 0, 0xFF, 0xFF]);
                    body.extend_from_slice(&0u16.to_le_bytes()); // grbit
                    body.extend_from_slice(&0u32.to_le_bytes()); // chn
                    body.extend_from_slice(&0u16.to_le_bytes()); // cce
                    push_record(&mut out, RECORD_FORMULA, &body);

                    let mut string = Vec::new();
                    write_unicode_string(&mut string, s);
                    push_record(&mut out, RECORD_STRING, &string);
                }
            }
        }
    }

    push_record(&mut out, RECORD_EOF, &[]);
    out
}

/// Emit the SST, starting a CONTINUE record whenever the next string would
/// overflow the current body. Strings never straddle a boundary here.
fn push_sst(out: &mut Vec<u8>, sst: &[String]) {
    let mut body = Vec::new();
    body.extend_from_slice(&(sst.len() as u32).to_le_bytes());
    body.extend_from_slice(&(sst.len() as u32).to_le_bytes());
    let mut record_type = RECORD_SST;

    for s in sst {
        let mut encoded = Vec::new();
        write_unicode_string(&mut encoded, s);
        if body.len() + encoded.len() > MAX_RECORD_BODY {
            push_record(out, record_type, &body);
            body.clear();
            record_type = RECORD_CONTINUE;
        }
        body.extend_from_slice(&encoded);
    }
    push_record(out, record_type, &body);
}

fn push_record(out: &mut Vec<u8>, id: u16, data: &[u8]) {
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.extend_from_slice(data);
}

fn bof(dt: u16) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[0..2].copy_from_slice(&BOF_VERSION_BIFF8.to_le_bytes());
    out[2..4].copy_from_slice(&dt.to_le_bytes());
    out
}

fn cell_header(row: u16, col: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&row.to_le_bytes());
    out.extend_from_slice(&col.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // xf
    out
}

/// Latin-1 strings are written compressed, anything else as UTF-16LE.
fn encode_characters(out: &mut Vec<u8>, s: &str) {
    if s.chars().all(|c| (c as u32) < 0x100) {
        out.push(0x00);
        out.extend(s.chars().map(|c| c as u8));
    } else {
        out.push(0x01);
        for unit in s.encode_utf16() {
            out.extend_from_slice(&unit.to_le_bytes());
        }
    }
}

fn char_count(s: &str) -> usize {
    if s.chars().all(|c| (c as u32) < 0x100) {
        s.chars().count()
    } else {
        s.encode_utf16().count()
    }
}

fn write_short_unicode_string(out: &mut Vec<u8>, s: &str) {
    out.push(char_count(s) as u8);
    encode_characters(out, s);
}

fn write_unicode_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(char_count(s) as u16).to_le_bytes());
    encode_characters(out, s);
}
