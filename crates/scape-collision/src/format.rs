//! Region stream encoding.
//!
//! ## Wire format
//!
//! A region stream is a flat sequence of fixed-size records:
//!
//! ```text
//! [region_id: u16 BE]
//! [flags: 4096 bytes]   packed 64x64x4x2 BitSet4D, see `bitset` for bit order
//! ```
//!
//! There is no header and no record count; the stream length must be an
//! exact multiple of [`RECORD_SIZE`].

use std::io::{self, Write};

use crate::bitset::BitSet4D;
use crate::error::CollisionError;

/// Edge length of a region, in tiles.
pub const REGION_SIZE: usize = scape_core::REGION_SIZE as usize;
/// Number of planes stored per region.
pub const PLANES: usize = 4;
/// Number of stored flags per tile.
pub const FLAGS: usize = 2;
/// Packed size of one region's flags.
pub const REGION_BYTES: usize = REGION_SIZE * REGION_SIZE * PLANES * FLAGS / 8;
/// Size of one record: region id plus packed flags.
pub const RECORD_SIZE: usize = 2 + REGION_BYTES;

/// A fresh all-closed region grid.
pub fn empty_region() -> BitSet4D {
    BitSet4D::new(REGION_SIZE, REGION_SIZE, PLANES, FLAGS)
}

/// Write one region record.
pub fn write_record<W: Write>(writer: &mut W, id: u16, region: &BitSet4D) -> io::Result<()> {
    writer.write_all(&id.to_be_bytes())?;
    region.write_to(writer)
}

/// Decode every record in `data`.
///
/// Fails without returning anything if the length is not a multiple of
/// [`RECORD_SIZE`] or a region id appears twice.
pub fn decode_records(data: &[u8]) -> Result<Vec<(u16, BitSet4D)>, CollisionError> {
    let trailing = data.len() % RECORD_SIZE;
    if trailing != 0 {
        return Err(CollisionError::Format(format!(
            "stream of {} bytes ends with a truncated {}-byte record (records are {} bytes)",
            data.len(),
            trailing,
            RECORD_SIZE
        )));
    }

    let mut seen = vec![false; 1 << 16];
    let mut out = Vec::with_capacity(data.len() / RECORD_SIZE);
    for (n, record) in data.chunks_exact(RECORD_SIZE).enumerate() {
        let id = u16::from_be_bytes([record[0], record[1]]);
        if std::mem::replace(&mut seen[id as usize], true) {
            return Err(CollisionError::Format(format!(
                "region {id} appears twice (record {n})"
            )));
        }
        let grid = BitSet4D::from_bytes(&record[2..], REGION_SIZE, REGION_SIZE, PLANES, FLAGS)?;
        out.push((id, grid));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_constants() {
        assert_eq!(REGION_BYTES, 4096);
        assert_eq!(RECORD_SIZE, 4098);
        assert_eq!(empty_region().byte_len(), REGION_BYTES);
    }

    #[test]
    fn record_starts_with_big_endian_id() {
        let mut buf = Vec::new();
        write_record(&mut buf, 0x3232, &empty_region()).unwrap();
        assert_eq!(buf.len(), RECORD_SIZE);
        assert_eq!(&buf[..2], &[0x32, 0x32]);
    }

    #[test]
    fn decode_reads_consecutive_records() {
        let mut a = empty_region();
        a.set(1, 2, 3, 1, true).unwrap();
        let mut buf = Vec::new();
        write_record(&mut buf, 7, &a).unwrap();
        write_record(&mut buf, 0x0100, &empty_region()).unwrap();

        let recs = decode_records(&buf).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].0, 7);
        assert_eq!(recs[0].1, a);
        assert_eq!(recs[1].0, 0x0100);
    }

    #[test]
    fn decode_empty_stream() {
        assert!(decode_records(&[]).unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_truncated_record() {
        let mut buf = Vec::new();
        write_record(&mut buf, 1, &empty_region()).unwrap();
        buf.truncate(RECORD_SIZE - 1);
        let err = decode_records(&buf).unwrap_err();
        assert!(matches!(err, CollisionError::Format(_)));

        let err = decode_records(&[0u8; RECORD_SIZE + 2]).unwrap_err();
        assert!(err.to_string().contains("truncated 2-byte record"));
    }

    #[test]
    fn decode_rejects_duplicate_ids() {
        let mut buf = Vec::new();
        write_record(&mut buf, 9, &empty_region()).unwrap();
        write_record(&mut buf, 9, &empty_region()).unwrap();
        let err = decode_records(&buf).unwrap_err();
        assert!(err.to_string().contains("region 9 appears twice"));
    }
}
