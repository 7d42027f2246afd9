//! XLS (BIFF8) reader.
//!
//! Opens a Compound File Binary (CFB/OLE2) container, reads the `Workbook`
//! stream, parses BIFF8 records, and populates an
//! [`excelbundle_core::Workbook`] with cell values.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use excelbundle_core::{CellError, CellValue, SharedString, Workbook, Worksheet};

use crate::biff::parser::{
    read_bytes8, read_cell_header, read_f64, read_rk, read_u16, read_u32, read_u8,
};
use crate::biff::records;
use crate::biff::strings::{parse_sst, read_short_string, read_unicode_string};
use crate::biff::{self, BiffRecord};
use crate::error::{XlsError, XlsResult};

/// XLS file reader.
pub struct XlsReader;

/// Metadata for a sheet parsed from the BOUNDSHEET record.
#[derive(Debug)]
struct SheetInfo {
    /// Absolute byte offset of the sheet's BOF in the Workbook stream.
    offset: u32,
    /// Sheet type: 0 = worksheet, 2 = chart, 6 = macro/VBA.
    sheet_type: u8,
    /// Sheet name.
    name: String,
}

/// Records of one BOF..EOF substream, without the BOF/EOF themselves.
struct Substream<'a> {
    /// Stream offset of the substream's BOF record.
    bof_offset: u64,
    records: Vec<&'a BiffRecord>,
}

impl XlsReader {
    /// Read an XLS file from a filesystem path.
    ///
    /// The file handle is owned by the read and closed before this returns,
    /// whether or not parsing succeeds.
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsResult<Workbook> {
        let path = path.as_ref();
        log::debug!("opening workbook {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::read(file)
    }

    /// Read an XLS file held in memory.
    pub fn read_bytes(bytes: &[u8]) -> XlsResult<Workbook> {
        Self::read(Cursor::new(bytes))
    }

    /// Read an XLS file from any `Read + Seek` source.
    pub fn read<R: Read + Seek>(reader: R) -> XlsResult<Workbook> {
        let stream_data = Self::read_workbook_stream(reader)?;

        let mut cursor = Cursor::new(&stream_data);
        let all_records = biff::read_all_records(&mut cursor)?;

        // Phase 1: workbook globals, up to the first EOF
        let mut sst: Vec<SharedString> = Vec::new();
        let mut sheets: Vec<SheetInfo> = Vec::new();
        let mut in_globals = false;
        let mut globals_end_idx = None;

        for (idx, rec) in all_records.iter().enumerate() {
            match rec.record_type {
                records::BOF if !in_globals => {
                    let (version, dt) = biff::parse_bof(&rec.data)?;
                    if dt != records::BOF_WORKBOOK_GLOBALS {
                        return Err(XlsError::InvalidFormat(format!(
                            "expected workbook globals BOF, got substream type 0x{dt:04X}"
                        )));
                    }
                    if version != records::BIFF8_VERSION {
                        return Err(XlsError::UnsupportedVersion(format!(
                            "expected BIFF8 (0x0600), got 0x{version:04X}"
                        )));
                    }
                    in_globals = true;
                }
                records::FILEPASS if in_globals => {
                    return Err(XlsError::InvalidFormat(
                        "encrypted workbooks are not supported".into(),
                    ));
                }
                records::SST if in_globals => {
                    sst = parse_sst(&rec.data, &rec.continue_offsets)?
                        .into_iter()
                        .map(SharedString::from)
                        .collect();
                    log::debug!("shared string table: {} entries", sst.len());
                }
                records::BOUNDSHEET if in_globals => {
                    sheets.push(Self::parse_boundsheet(&rec.data)?);
                }
                records::EOF if in_globals => {
                    globals_end_idx = Some(idx);
                    break;
                }
                _ => {}
            }
        }

        let globals_end_idx = globals_end_idx.ok_or_else(|| {
            XlsError::InvalidFormat("no complete workbook globals substream found".into())
        })?;

        // Phase 2: worksheet substreams
        let substreams = Self::split_substreams(&all_records[globals_end_idx + 1..]);
        let mut workbook = Workbook::new();

        for (position, info) in sheets.iter().enumerate() {
            if info.sheet_type != records::SHEET_TYPE_WORKSHEET {
                log::debug!(
                    "skipping sheet '{}' of type {}",
                    info.name,
                    info.sheet_type
                );
                continue;
            }

            // BOUNDSHEET offsets are authoritative; fall back to stream order
            // for writers that leave them zeroed.
            let substream = substreams
                .iter()
                .find(|s| s.bof_offset == info.offset as u64)
                .or_else(|| substreams.get(position));

            let mut worksheet = Worksheet::new(info.name.as_str());
            match substream {
                Some(substream) => Self::parse_sheet_records(&substream.records, &mut worksheet, &sst)?,
                None => log::warn!("no substream found for sheet '{}'", info.name),
            }

            log::debug!(
                "read sheet '{}': {} rows, {} cells",
                worksheet.name(),
                worksheet.row_count(),
                worksheet.cell_count()
            );
            if let Err(e) = workbook.check_sheet_name(worksheet.name()) {
                log::warn!("keeping sheet '{}' as stored: {}", worksheet.name(), e);
            }
            workbook.push_worksheet(worksheet);
        }

        Ok(workbook)
    }

    /// Pull the `Workbook` (or BIFF5-era `Book`) stream out of the container.
    fn read_workbook_stream<R: Read + Seek>(reader: R) -> XlsResult<Vec<u8>> {
        let mut cfb = cfb::CompoundFile::open(reader)?;

        let stream_path = if cfb.exists("/Workbook") {
            "/Workbook"
        } else if cfb.exists("/Book") {
            "/Book"
        } else {
            return Err(XlsError::InvalidFormat(
                "no Workbook or Book stream found in CFB".into(),
            ));
        };

        let mut stream_data = Vec::new();
        cfb.open_stream(stream_path)?.read_to_end(&mut stream_data)?;
        Ok(stream_data)
    }

    /// Parse a BOUNDSHEET record body.
    fn parse_boundsheet(data: &[u8]) -> XlsResult<SheetInfo> {
        let mut offset = 0;
        let abs_offset = read_u32(data, &mut offset)?;
        let _visibility = read_u8(data, &mut offset)?;
        let sheet_type = read_u8(data, &mut offset)?;
        let name = read_short_string(data, &mut offset)?;

        Ok(SheetInfo {
            offset: abs_offset,
            sheet_type,
            name,
        })
    }

    /// Split records into top-level BOF..EOF substreams.
    ///
    /// Nested substreams (charts embedded in a worksheet) stay inside their
    /// parent and are ignored by the cell parser.
    fn split_substreams(records: &[BiffRecord]) -> Vec<Substream<'_>> {
        let mut groups = Vec::new();
        let mut current: Option<Substream<'_>> = None;
        let mut depth = 0usize;

        for rec in records {
            match rec.record_type {
                records::BOF => {
                    if depth == 0 {
                        current = Some(Substream {
                            bof_offset: rec.stream_offset,
                            records: Vec::new(),
                        });
                    }
                    depth += 1;
                }
                records::EOF => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        if let Some(group) = current.take() {
                            groups.push(group);
                        }
                    }
                }
                _ if depth == 1 => {
                    if let Some(group) = current.as_mut() {
                        group.records.push(rec);
                    }
                }
                _ => {}
            }
        }

        if let Some(group) = current {
            log::warn!(
                "substream at offset {} has no EOF, keeping {} records",
                group.bof_offset,
                group.records.len()
            );
            groups.push(group);
        }

        groups
    }

    /// Parse cell records from a sheet's record group.
    fn parse_sheet_records(
        records: &[&BiffRecord],
        ws: &mut Worksheet,
        sst: &[SharedString],
    ) -> XlsResult<()> {
        // A STRING record carries the cached text of the FORMULA just before it
        let mut pending_formula_cell: Option<(u32, u16)> = None;

        for rec in records {
            let data = rec.data.as_slice();
            match rec.record_type {
                records::LABELSST => Self::parse_labelsst(data, ws, sst)?,
                records::LABEL | records::RSTRING => Self::parse_label(data, ws)?,
                records::NUMBER => Self::parse_number(data, ws)?,
                records::RK => Self::parse_rk(data, ws)?,
                records::MULRK => Self::parse_mulrk(data, ws)?,
                records::BLANK => Self::parse_blank(data, ws)?,
                records::MULBLANK => Self::parse_mulblank(data, ws)?,
                records::BOOLERR => Self::parse_boolerr(data, ws)?,
                records::FORMULA => {
                    pending_formula_cell = Self::parse_formula(data, ws)?;
                    continue;
                }
                records::STRING => {
                    if let Some((row, col)) = pending_formula_cell.take() {
                        Self::parse_formula_string(data, ws, row, col)?;
                    }
                    continue;
                }
                _ => continue,
            }
            pending_formula_cell = None;
        }

        Ok(())
    }

    // ── Cell record parsers ──────────────────────────────────────────────

    /// LABELSST: row(2) + col(2) + xf(2) + sst_index(4)
    fn parse_labelsst(data: &[u8], ws: &mut Worksheet, sst: &[SharedString]) -> XlsResult<()> {
        let mut off = 0;
        let (row, col, _xf) = read_cell_header(data, &mut off)?;
        let sst_idx = read_u32(data, &mut off)? as usize;

        match sst.get(sst_idx) {
            Some(s) => ws.set_cell_value_at(row, col, s.clone())?,
            None => log::warn!(
                "LABELSST at row {row}, col {col} points past the shared string table ({sst_idx} >= {})",
                sst.len()
            ),
        }
        Ok(())
    }

    /// LABEL / RSTRING: row(2) + col(2) + xf(2) + unicode_string [+ runs]
    fn parse_label(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        let mut off = 0;
        let (row, col, _xf) = read_cell_header(data, &mut off)?;
        let text = read_unicode_string(data, &mut off)?;

        ws.set_cell_value_at(row, col, CellValue::string(text))?;
        Ok(())
    }

    /// NUMBER: row(2) + col(2) + xf(2) + f64(8)
    fn parse_number(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        let mut off = 0;
        let (row, col, _xf) = read_cell_header(data, &mut off)?;
        let value = read_f64(data, &mut off)?;

        ws.set_cell_value_at(row, col, CellValue::Number(value))?;
        Ok(())
    }

    /// RK: row(2) + col(2) + xf(2) + rk(4)
    fn parse_rk(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        let mut off = 0;
        let (row, col, _xf) = read_cell_header(data, &mut off)?;
        let value = read_rk(data, &mut off)?;

        ws.set_cell_value_at(row, col, CellValue::Number(value))?;
        Ok(())
    }

    /// MULRK: row(2) + first_col(2) + [xf(2) + rk(4)]* + last_col(2)
    fn parse_mulrk(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        if data.len() < 6 {
            return Err(XlsError::Parse("MULRK record too short".into()));
        }
        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let first_col = read_u16(data, &mut off)?;
        let rk_data_end = data.len() - 2;

        let mut col = first_col;
        while off + 6 <= rk_data_end {
            let _xf = read_u16(data, &mut off)?;
            let value = read_rk(data, &mut off)?;
            ws.set_cell_value_at(row, col, CellValue::Number(value))?;
            col = col.saturating_add(1);
        }

        Ok(())
    }

    /// BLANK: row(2) + col(2) + xf(2)
    fn parse_blank(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        let mut off = 0;
        let (row, col, _xf) = read_cell_header(data, &mut off)?;
        ws.set_cell_value_at(row, col, CellValue::Blank)?;
        Ok(())
    }

    /// MULBLANK: row(2) + first_col(2) + [xf(2)]* + last_col(2)
    fn parse_mulblank(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        if data.len() < 6 {
            return Err(XlsError::Parse("MULBLANK record too short".into()));
        }
        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let first_col = read_u16(data, &mut off)?;
        let xf_data_end = data.len() - 2;

        let mut col = first_col;
        while off + 2 <= xf_data_end {
            let _xf = read_u16(data, &mut off)?;
            ws.set_cell_value_at(row, col, CellValue::Blank)?;
            col = col.saturating_add(1);
        }
        Ok(())
    }

    /// BOOLERR: row(2) + col(2) + xf(2) + value(1) + is_error(1)
    fn parse_boolerr(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        let mut off = 0;
        let (row, col, _xf) = read_cell_header(data, &mut off)?;
        let val = read_u8(data, &mut off)?;
        let is_error = read_u8(data, &mut off)?;

        let cell_value = if is_error != 0 {
            CellValue::Error(CellError::from_code(val))
        } else {
            CellValue::Boolean(val != 0)
        };

        ws.set_cell_value_at(row, col, cell_value)?;
        Ok(())
    }

    /// FORMULA: row(2) + col(2) + xf(2) + result(8) + options(2) + reserved(4) + rgce
    ///
    /// Returns the cell position when the cached result is a string, which
    /// arrives in the following STRING record.
    fn parse_formula(data: &[u8], ws: &mut Worksheet) -> XlsResult<Option<(u32, u16)>> {
        let mut off = 0;
        let (row, col, _xf) = read_cell_header(data, &mut off)?;
        let result = read_bytes8(data, &mut off)?;

        // Bytes 6-7 == 0xFFFF mark a non-numeric cached result
        if result[6] != 0xFF || result[7] != 0xFF {
            let value = f64::from_le_bytes(result);
            ws.set_cell_value_at(row, col, CellValue::formula(Some(CellValue::Number(value))))?;
            return Ok(None);
        }

        let cached = match result[0] {
            0x00 => {
                ws.set_cell_value_at(row, col, CellValue::formula(None))?;
                return Ok(Some((row, col)));
            }
            0x01 => Some(CellValue::Boolean(result[2] != 0)),
            0x02 => Some(CellValue::Error(CellError::from_code(result[2]))),
            // 0x03 is an empty string result; anything else is unknown
            _ => None,
        };
        ws.set_cell_value_at(row, col, CellValue::formula(cached))?;
        Ok(None)
    }

    /// STRING record: cached string value for a preceding FORMULA.
    fn parse_formula_string(data: &[u8], ws: &mut Worksheet, row: u32, col: u16) -> XlsResult<()> {
        let mut off = 0;
        let text = read_unicode_string(data, &mut off)?;

        ws.set_cell_value_at(row, col, CellValue::formula(Some(CellValue::string(text))))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(record_type: u16, data: Vec<u8>, stream_offset: u64) -> BiffRecord {
        BiffRecord {
            record_type,
            data,
            continue_offsets: Vec::new(),
            stream_offset,
        }
    }

    fn cell_header(row: u16, col: u16) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&row.to_le_bytes());
        data.extend_from_slice(&col.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data
    }

    #[test]
    fn test_split_substreams_skips_nested_chart() {
        let recs = vec![
            record(records::BOF, vec![], 100),
            record(records::NUMBER, vec![], 120),
            record(records::BOF, vec![], 140),
            record(records::LABEL, vec![], 160),
            record(records::EOF, vec![], 180),
            record(records::EOF, vec![], 184),
            record(records::BOF, vec![], 188),
            record(records::EOF, vec![], 208),
        ];

        let groups = XlsReader::split_substreams(&recs);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].bof_offset, 100);
        assert_eq!(groups[0].records.len(), 1);
        assert_eq!(groups[0].records[0].record_type, records::NUMBER);
        assert_eq!(groups[1].bof_offset, 188);
        assert!(groups[1].records.is_empty());
    }

    #[test]
    fn test_parse_mulrk_and_mulblank() {
        let mut ws = Worksheet::new("Test");

        let mut mulrk = Vec::new();
        mulrk.extend_from_slice(&3u16.to_le_bytes());
        mulrk.extend_from_slice(&1u16.to_le_bytes());
        for n in [7u32, 9u32] {
            mulrk.extend_from_slice(&0u16.to_le_bytes());
            mulrk.extend_from_slice(&((n << 2) | 0x02).to_le_bytes());
        }
        mulrk.extend_from_slice(&2u16.to_le_bytes());
        XlsReader::parse_mulrk(&mulrk, &mut ws).unwrap();

        let mut mulblank = Vec::new();
        mulblank.extend_from_slice(&4u16.to_le_bytes());
        mulblank.extend_from_slice(&0u16.to_le_bytes());
        mulblank.extend_from_slice(&[0, 0, 0, 0]);
        mulblank.extend_from_slice(&1u16.to_le_bytes());
        XlsReader::parse_mulblank(&mulblank, &mut ws).unwrap();

        assert_eq!(ws.get_value_at(3, 1), CellValue::Number(7.0));
        assert_eq!(ws.get_value_at(3, 2), CellValue::Number(9.0));
        assert_eq!(ws.cell_at(4, 0), Some(&CellValue::Blank));
        assert_eq!(ws.cell_at(4, 1), Some(&CellValue::Blank));
    }

    #[test]
    fn test_formula_string_result_is_cached() {
        let mut ws = Worksheet::new("Test");

        let mut formula = cell_header(0, 0);
        formula.extend_from_slice(&[0x00, 0, 0, 0, 0, 0, 0xFF, 0xFF]);
        formula.extend_from_slice(&[0u8; 6]);
        let mut string = Vec::new();
        string.extend_from_slice(&[0x03, 0x00, 0x00]);
        string.extend_from_slice(b"/ab");

        let recs = [
            record(records::FORMULA, formula, 0),
            record(records::STRING, string, 0),
        ];
        let refs: Vec<&BiffRecord> = recs.iter().collect();
        XlsReader::parse_sheet_records(&refs, &mut ws, &[]).unwrap();

        let value = ws.get_value_at(0, 0);
        assert!(value.is_formula());
        // Formula results never read as plain strings
        assert_eq!(value.string_value(), None);
        assert_eq!(value.to_string(), "/ab");
    }

    #[test]
    fn test_boolerr() {
        let mut ws = Worksheet::new("Test");

        let mut data = cell_header(1, 1);
        data.extend_from_slice(&[0x07, 0x01]);
        XlsReader::parse_boolerr(&data, &mut ws).unwrap();

        let mut data = cell_header(1, 2);
        data.extend_from_slice(&[0x01, 0x00]);
        XlsReader::parse_boolerr(&data, &mut ws).unwrap();

        assert_eq!(ws.get_value_at(1, 1), CellValue::Error(CellError::Div0));
        assert_eq!(ws.get_value_at(1, 2), CellValue::Boolean(true));
    }

    #[test]
    fn test_labelsst_out_of_range_is_skipped() {
        let mut ws = Worksheet::new("Test");
        let mut data = cell_header(0, 0);
        data.extend_from_slice(&5u32.to_le_bytes());

        XlsReader::parse_labelsst(&data, &mut ws, &[SharedString::new("only")]).unwrap();
        assert!(ws.is_empty());
    }

    #[test]
    fn test_not_a_cfb_container() {
        let err = XlsReader::read_bytes(b"definitely not an xls file").unwrap_err();
        assert!(matches!(err, XlsError::Io(_)), "got {err:?}");
    }
}
