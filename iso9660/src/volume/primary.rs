//! Primary Volume Descriptor parsing
//!
//! The Primary Volume Descriptor (PVD) is always present and describes
//! the basic filesystem structure. High Sierra and CD-i discs carry an
//! equivalent descriptor at a different layout:
//!
//! | Field             | ISO9660 | High Sierra | CD-i (BE) |
//! |-------------------|---------|-------------|-----------|
//! | standard id       | 1       | 9           | 1         |
//! | volume id         | 40      | 48          | 40        |
//! | volume space size | 80      | 88          | 84        |
//! | logical block     | 128     | 136         | 130       |
//! | path table size   | 132     | 140         | 136       |
//! | path table        | 140 (L) | 148 (L)     | 148 (M)   |
//! | root record       | 156     | 180         | -         |

use alloc::string::String;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::directory::record::DirectoryRecord;
use crate::error::{Iso9660Error, Result};
use crate::options::TextEncoding;
use crate::types::{DirectoryLayout, VolumeRoot};
use crate::utils::string::{decode_text, trim_trailing_spaces};

/// ISO9660 standard identifier
pub const ISO_MAGIC: &[u8; 5] = b"CD001";
/// High Sierra standard identifier
pub const HIGH_SIERRA_MAGIC: &[u8; 5] = b"CDROM";
/// CD-i standard identifier
pub const CDI_MAGIC: &[u8; 5] = b"CD-I ";

/// Root directory record size inside a descriptor
const ROOT_RECORD_SIZE: usize = 34;

/// Fields of a primary descriptor needed to mount
#[derive(Debug, Clone)]
pub struct PrimaryDescriptor {
    /// Volume identifier, trailing spaces removed
    pub volume_id: String,
    /// Logical block size
    pub logical_block_size: u16,
    /// Volume space size in sectors
    pub volume_space_size: u32,
    /// Root directory and path table; CD-i leaves the root extent to the
    /// path table
    pub root: VolumeRoot,
}

fn volume_id(sector: &[u8], offset: usize) -> String {
    decode_text(trim_trailing_spaces(&sector[offset..offset + 32]), TextEncoding::Iso8859_1, false)
}

/// Decode the root record embedded at `offset`
pub(crate) fn root_record(
    layout: DirectoryLayout,
    sector: &[u8],
    offset: usize,
) -> Result<DirectoryRecord> {
    DirectoryRecord::parse(layout, &sector[offset..offset + ROOT_RECORD_SIZE])
}

/// Parse an ISO9660 Primary Volume Descriptor (type 1)
pub fn parse_iso(sector: &[u8]) -> Result<PrimaryDescriptor> {
    if sector[6] != 1 {
        return Err(Iso9660Error::UnsupportedVersion);
    }

    let root = root_record(DirectoryLayout::Iso9660, sector, 156)?;

    Ok(PrimaryDescriptor {
        volume_id: volume_id(sector, 40),
        logical_block_size: LittleEndian::read_u16(&sector[128..130]),
        volume_space_size: LittleEndian::read_u32(&sector[80..84]),
        root: VolumeRoot {
            extent_lba: root.extent_lba,
            extent_len: root.data_length,
            xattr_length: root.extended_attr_length,
            path_table_lba: LittleEndian::read_u32(&sector[140..144]),
            path_table_size: LittleEndian::read_u32(&sector[132..136]),
        },
    })
}

/// Parse a High Sierra Standard File Structure Volume Descriptor
pub fn parse_high_sierra(sector: &[u8]) -> Result<PrimaryDescriptor> {
    let root = root_record(DirectoryLayout::HighSierra, sector, 180)?;

    Ok(PrimaryDescriptor {
        volume_id: volume_id(sector, 48),
        logical_block_size: LittleEndian::read_u16(&sector[136..138]),
        volume_space_size: LittleEndian::read_u32(&sector[88..92]),
        root: VolumeRoot {
            extent_lba: root.extent_lba,
            extent_len: root.data_length,
            xattr_length: root.extended_attr_length,
            path_table_lba: LittleEndian::read_u32(&sector[148..152]),
            path_table_size: LittleEndian::read_u32(&sector[140..144]),
        },
    })
}

/// Parse a CD-i Disc Label
///
/// The label holds no root record; the caller takes it from the first
/// path table record.
pub fn parse_cdi(sector: &[u8]) -> Result<PrimaryDescriptor> {
    Ok(PrimaryDescriptor {
        volume_id: volume_id(sector, 40),
        logical_block_size: BigEndian::read_u16(&sector[130..132]),
        volume_space_size: BigEndian::read_u32(&sector[84..88]),
        root: VolumeRoot {
            path_table_lba: BigEndian::read_u32(&sector[148..152]),
            path_table_size: BigEndian::read_u32(&sector[136..140]),
            ..VolumeRoot::default()
        },
    })
}
