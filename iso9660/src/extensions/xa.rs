//! CD-ROM XA system use information
//!
//! A fixed 14-byte structure recognised by the "XA" bytes at offset 6.

use byteorder::{BigEndian, ByteOrder};

use super::signature;
use crate::types::{CdromXa, DecodedDirectoryEntry};

/// XA signature, found at offset 6 of the structure
pub const XA_MAGIC: u16 = signature(b"XA");

/// Size of the XA structure
pub const XA_LENGTH: usize = 14;

/// Decode the XA structure at the start of `field`
pub fn decode(field: &[u8], entry: &mut DecodedDirectoryEntry) -> Option<usize> {
    if field.len() < XA_LENGTH {
        return None;
    }

    entry.xa = Some(CdromXa {
        group: BigEndian::read_u16(&field[0..2]),
        user: BigEndian::read_u16(&field[2..4]),
        attributes: BigEndian::read_u16(&field[4..6]),
        file_number: field[8],
    });

    Some(XA_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_xa() {
        let field = [0, 1, 0, 2, 0x8D, 0x55, b'X', b'A', 3, 0, 0, 0, 0, 0];
        let mut entry = DecodedDirectoryEntry::default();

        assert_eq!(decode(&field, &mut entry), Some(XA_LENGTH));

        let xa = entry.xa.expect("xa decoded");
        assert_eq!(xa.group, 1);
        assert_eq!(xa.user, 2);
        assert_eq!(xa.attributes, 0x8D55);
        assert_eq!(xa.file_number, 3);
    }

    #[test]
    fn test_truncated_xa() {
        let mut entry = DecodedDirectoryEntry::default();
        assert_eq!(decode(&[0, 0, 0, 0, 0, 0, b'X', b'A'], &mut entry), None);
        assert!(entry.xa.is_none());
    }
}
