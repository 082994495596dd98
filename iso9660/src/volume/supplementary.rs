//! Supplementary Volume Descriptor (Joliet)
//!
//! Joliet is a type 2 descriptor whose escape sequences announce UCS-2
//! level 1, 2 or 3. Its root and path table describe a second directory
//! hierarchy with UTF-16BE names over the same file data.

use byteorder::{ByteOrder, LittleEndian};

use super::primary::root_record;
use crate::error::Result;
use crate::types::{DirectoryLayout, VolumeRoot};

/// Joliet escape sequences, UCS-2 levels 1 to 3
pub const JOLIET_ESCAPES: [&[u8; 3]; 3] = [b"%/@", b"%/C", b"%/E"];

/// Does this supplementary descriptor announce Joliet?
pub fn is_joliet(sector: &[u8]) -> bool {
    JOLIET_ESCAPES.iter().any(|escape| &sector[88..91] == *escape)
}

/// Root of the Joliet hierarchy, `None` for a non-Joliet descriptor
pub fn parse(sector: &[u8]) -> Result<Option<VolumeRoot>> {
    if !is_joliet(sector) {
        return Ok(None);
    }

    let root = root_record(DirectoryLayout::Iso9660, sector, 156)?;

    Ok(Some(VolumeRoot {
        extent_lba: root.extent_lba,
        extent_len: root.data_length,
        xattr_length: root.extended_attr_length,
        path_table_lba: LittleEndian::read_u32(&sector[140..144]),
        path_table_size: LittleEndian::read_u32(&sector[132..136]),
    }))
}
