//! BIFF8 Unicode string decoding.
//!
//! BIFF8 strings are laid out as:
//! - Header: char_count (2 bytes, 1 byte for short strings) + flags (1 byte)
//! - Flags bit 0 (`fHighByte`): 0 = compressed Latin-1, 1 = uncompressed UTF-16LE
//! - Flags bit 2 (`fExtSt`): extended string data follows (Asian phonetic)
//! - Flags bit 3 (`fRichSt`): rich text run array follows
//! - If fRichSt: 2-byte run count follows the flags
//! - If fExtSt: 4-byte extended data size follows
//! - Then the character data
//! - Then the rich text runs (4 bytes each) if fRichSt
//! - Then the extended data if fExtSt
//!
//! In SST records, character data may cross a CONTINUE boundary. The
//! continuation then starts with a single flags byte that can switch between
//! compressed and uncompressed encoding for the rest of the string.

use super::parser::{read_u16, read_u32, read_u8};
use crate::error::{XlsError, XlsResult};

const FLAG_HIGH_BYTE: u8 = 0x01;
const FLAG_EXT: u8 = 0x04;
const FLAG_RICH: u8 = 0x08;

/// Read a BIFF8 "short" string (1-byte length prefix, used in BOUNDSHEET).
pub fn read_short_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    let char_count = read_u8(data, offset)? as usize;
    let flags = read_u8(data, offset)?;
    read_split_characters(data, offset, char_count, flags, &[])
}

/// Read a BIFF8 Unicode string with a 2-byte length prefix (LABEL, STRING).
///
/// The record is assumed not to be split; use [`parse_sst`] for the shared
/// string table.
pub fn read_unicode_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    read_string_with_boundaries(data, offset, &[])
}

fn read_string_with_boundaries(
    data: &[u8],
    offset: &mut usize,
    boundaries: &[usize],
) -> XlsResult<String> {
    let char_count = read_u16(data, offset)? as usize;
    let flags = read_u8(data, offset)?;

    let run_count = if flags & FLAG_RICH != 0 {
        read_u16(data, offset)? as usize
    } else {
        0
    };
    let ext_size = if flags & FLAG_EXT != 0 {
        read_u32(data, offset)? as usize
    } else {
        0
    };

    let text = read_split_characters(data, offset, char_count, flags, boundaries)?;

    // Rich text runs (char_pos u16 + font_idx u16) and phonetic data are
    // skipped; they never carry a continuation flags byte.
    *offset += run_count * 4 + ext_size;

    Ok(text)
}

/// Read `char_count` characters, honouring CONTINUE boundaries.
///
/// `boundaries` lists the offsets where merged CONTINUE bodies start. When
/// character data reaches one of them, the next byte is a fresh flags byte.
fn read_split_characters(
    data: &[u8],
    offset: &mut usize,
    char_count: usize,
    flags: u8,
    boundaries: &[usize],
) -> XlsResult<String> {
    let mut is_wide = flags & FLAG_HIGH_BYTE != 0;
    let mut units: Vec<u16> = Vec::with_capacity(char_count);

    while units.len() < char_count {
        if boundaries.binary_search(offset).is_ok() {
            is_wide = read_u8(data, offset)? & FLAG_HIGH_BYTE != 0;
        }

        let segment_end = boundaries
            .iter()
            .copied()
            .find(|b| *b > *offset)
            .unwrap_or(data.len())
            .min(data.len());
        let available = segment_end.saturating_sub(*offset);
        let fits = if is_wide { available / 2 } else { available };
        let take = fits.min(char_count - units.len());

        if take == 0 {
            return Err(XlsError::Parse(format!(
                "string data too short: need {} more character(s) at offset {}",
                char_count - units.len(),
                *offset
            )));
        }

        let bytes = &data[*offset..];
        if is_wide {
            units.extend(
                bytes[..take * 2]
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]])),
            );
            *offset += take * 2;
        } else {
            units.extend(bytes[..take].iter().map(|&b| b as u16));
            *offset += take;
        }
    }

    String::from_utf16(&units).map_err(|e| XlsError::Parse(format!("invalid UTF-16 string: {e}")))
}

/// Parse the entire SST (Shared String Table).
///
/// `data` is the SST body with all CONTINUE bodies appended, and
/// `continue_offsets` the positions where those bodies start. The body begins
/// with:
/// - `total_strings` (u32): total string refs in workbook
/// - `unique_strings` (u32): number of entries in this table
pub fn parse_sst(data: &[u8], continue_offsets: &[usize]) -> XlsResult<Vec<String>> {
    let mut offset = 0;

    let _total_strings = read_u32(data, &mut offset)?;
    let unique_count = read_u32(data, &mut offset)? as usize;

    // Cap the preallocation; the count comes straight from the file
    let mut strings = Vec::with_capacity(unique_count.min(data.len() / 3));

    for i in 0..unique_count {
        match read_string_with_boundaries(data, &mut offset, continue_offsets) {
            Ok(s) => strings.push(s),
            Err(e) => {
                // Some writers pad or truncate the SST; keep what was read.
                log::warn!("SST parse error at string {i}/{unique_count}: {e}");
                break;
            }
        }
    }

    Ok(strings)
}
