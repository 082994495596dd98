//! System Use Sharing Protocol (IEEE P1281)
//!
//! SUSP defines the field header shared by Rock Ridge and friends, plus a few
//! structural fields of its own. Only CE matters for decoding: it points to a
//! Continuation Area elsewhere on the disc that holds more fields for the
//! same record.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use gpt_disk_io::BlockIo;
use log::warn;

use super::{field_length, signature, SystemAreaParser};
use crate::types::{DecodedDirectoryEntry, SECTOR_SIZE};
use crate::utils::sector::sectors_for_bytes;

/// Continuation area
pub const CONTINUATION: u16 = signature(b"CE");
/// Padding
pub const PADDING: u16 = signature(b"PD");
/// SUSP indicator, only on the root's "." record
pub const INDICATOR: u16 = signature(b"SP");
/// SUSP terminator
pub const TERMINATOR: u16 = signature(b"ST");
/// Extension reference
pub const REFERENCE: u16 = signature(b"ER");
/// Extension selector
pub const SELECTOR: u16 = signature(b"ES");

/// Check bytes carried by the SP field
pub const INDICATOR_CHECK: [u8; 2] = [0xBE, 0xEF];

/// Nesting limit for continuation areas pointing to further areas
pub const MAX_CONTINUATION_DEPTH: usize = 16;

/// Largest continuation area followed
pub const MAX_CONTINUATION_LENGTH: u32 = 32 * SECTOR_SIZE as u32;

/// CE size: header, block, offset, length (each both-endian)
const CONTINUATION_SIZE: usize = 28;

impl<'r, 'a, B: BlockIo> SystemAreaParser<'r, 'a, B> {
    /// Follow a CE field and scan the area it names with the same entry
    pub(super) fn continuation(
        &mut self,
        field: &[u8],
        entry: &mut DecodedDirectoryEntry,
    ) -> Option<usize> {
        let length = field_length(field)?;
        if length < CONTINUATION_SIZE {
            return Some(length);
        }

        let block = LittleEndian::read_u32(&field[4..8]);
        let offset = LittleEndian::read_u32(&field[12..16]);
        let area_length = LittleEndian::read_u32(&field[20..24]);

        if self.depth >= MAX_CONTINUATION_DEPTH {
            warn!(
                "continuation chain of {:?} exceeds {} areas",
                entry.filename, MAX_CONTINUATION_DEPTH
            );
            return Some(length);
        }

        if !self.visited.insert((block, offset)) {
            warn!("continuation area {}:{} of {:?} visited twice", block, offset, entry.filename);
            return Some(length);
        }

        if area_length == 0 || area_length > MAX_CONTINUATION_LENGTH {
            warn!("ignoring continuation area of {} bytes", area_length);
            return Some(length);
        }

        let intra_offset = offset % SECTOR_SIZE as u32;
        let sector = block as u64 + (offset / SECTOR_SIZE as u32) as u64;
        let count = sectors_for_bytes(intra_offset as u64 + area_length as u64);

        match self.reader.read(sector, count) {
            Ok(area) => {
                let start = intra_offset as usize;
                self.depth += 1;
                self.walk(&area, start, start + area_length as usize, entry);
                self.depth -= 1;
            }
            Err(e) => warn!("unreadable continuation area at {}: {}", sector, e),
        }

        Some(length)
    }
}

/// Does this System Use area announce SUSP or Rock Ridge?
///
/// Looks for SP (with its check bytes), RR or ER fields, walking by length
/// only. Used on the root directory's "." record at mount.
pub fn announces_rock_ridge(data: &[u8], start: usize, end: usize) -> bool {
    use super::rock_ridge::signatures as rr;

    let end = end.min(data.len());
    let mut offset = start;

    while offset + 4 <= end {
        let field = &data[offset..end];
        let tag = BigEndian::read_u16(&field[0..2]);

        if tag == INDICATOR && field.len() >= 6 && field[4..6] == INDICATOR_CHECK {
            return true;
        }
        if tag == rr::RRIP || tag == REFERENCE || tag == rr::POSIX_ATTRS {
            return true;
        }

        match field_length(field) {
            Some(length) => offset += length,
            None => break,
        }
    }

    false
}
