//! Low-level binary parsing helpers for BIFF8 records.
//!
//! All multi-byte integers in BIFF8 are little-endian. Every reader takes the
//! record body and a cursor offset, and advances the offset on success.

use crate::error::{XlsError, XlsResult};

/// Borrow `N` bytes at `offset`, advancing `offset`.
#[inline]
fn take<const N: usize>(data: &[u8], offset: &mut usize) -> XlsResult<[u8; N]> {
    let end = offset.checked_add(N).filter(|end| *end <= data.len());
    match end {
        Some(end) => {
            let mut buf = [0u8; N];
            buf.copy_from_slice(&data[*offset..end]);
            *offset = end;
            Ok(buf)
        }
        None => Err(XlsError::Parse(format!(
            "unexpected end of data at offset {}, need {} byte(s)",
            *offset, N
        ))),
    }
}

/// Read a `u8`.
#[inline]
pub fn read_u8(data: &[u8], offset: &mut usize) -> XlsResult<u8> {
    take::<1>(data, offset).map(|b| b[0])
}

/// Read a little-endian `u16`.
#[inline]
pub fn read_u16(data: &[u8], offset: &mut usize) -> XlsResult<u16> {
    take::<2>(data, offset).map(u16::from_le_bytes)
}

/// Read a little-endian `u32`.
#[inline]
pub fn read_u32(data: &[u8], offset: &mut usize) -> XlsResult<u32> {
    take::<4>(data, offset).map(u32::from_le_bytes)
}

/// Read an IEEE 754 double (little-endian).
#[inline]
pub fn read_f64(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    take::<8>(data, offset).map(f64::from_le_bytes)
}

/// Read 8 raw bytes (the FORMULA result field).
#[inline]
pub fn read_bytes8(data: &[u8], offset: &mut usize) -> XlsResult<[u8; 8]> {
    take::<8>(data, offset)
}

/// Decode an RK-encoded number.
///
/// RK encoding (4 bytes):
/// - Bit 0: if 1, the decoded number should be divided by 100
/// - Bit 1: if 1, bits 2..31 are a signed 30-bit integer;
///   if 0, bits 2..31 are the upper 30 bits of an IEEE 754 double
#[inline]
pub fn decode_rk(rk: u32) -> f64 {
    let div100 = (rk & 0x01) != 0;
    let is_integer = (rk & 0x02) != 0;

    let value = if is_integer {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(((rk & 0xFFFF_FFFC) as u64) << 32)
    };

    if div100 {
        value / 100.0
    } else {
        value
    }
}

/// Read an RK value from 4 bytes at `offset`.
#[inline]
pub fn read_rk(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    read_u32(data, offset).map(decode_rk)
}

/// Read the `row(2) + col(2) + xf(2)` prefix shared by cell records.
///
/// The XF index is returned too so callers can skip it explicitly.
#[inline]
pub fn read_cell_header(data: &[u8], offset: &mut usize) -> XlsResult<(u32, u16, u16)> {
    let row = read_u16(data, offset)? as u32;
    let col = read_u16(data, offset)?;
    let xf = read_u16(data, offset)?;
    Ok((row, col, xf))
}
