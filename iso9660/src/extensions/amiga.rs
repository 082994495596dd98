//! Amiga "AS" extension: protection bits and file comments

use super::{field_length, signature};
use crate::types::{AmigaProtection, DecodedDirectoryEntry};

/// Amiga extension signature
pub const AMIGA_MAGIC: u16 = signature(b"AS");
/// AAIP (libisofs ACL / xattr) signature, not interpreted
pub const AAIP_MAGIC: u16 = signature(b"AL");

const PROTECTION: u8 = 0x01;
const COMMENT: u8 = 0x02;

/// Decode an AS field
///
/// Comments may be split across several AS fields and are concatenated.
pub fn decode(field: &[u8], entry: &mut DecodedDirectoryEntry) -> Option<usize> {
    let length = field_length(field)?;
    if length < 5 {
        return Some(length);
    }

    let as_flags = field[4];
    let mut offset = 5;

    if as_flags & PROTECTION != 0 {
        if offset + 4 > length {
            return Some(length);
        }
        entry.amiga_protection = Some(AmigaProtection {
            user: field[offset],
            zero: field[offset + 1],
            multiuser: field[offset + 2],
            protection: field[offset + 3],
        });
        offset += 4;
    }

    if as_flags & COMMENT != 0 && offset < length {
        // The comment length counts its own byte
        let comment_length = field[offset] as usize;
        let end = (offset + comment_length).min(length);
        if comment_length > 1 {
            entry
                .amiga_comment
                .get_or_insert_with(Default::default)
                .extend_from_slice(&field[offset + 1..end]);
        }
    }

    Some(length)
}
