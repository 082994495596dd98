//! Directory Record structure
//!
//! Directory records describe files and subdirectories. Three layouts exist:
//!
//! | Field            | ISO9660        | High Sierra    | CD-i (BE)  |
//! |------------------|----------------|----------------|------------|
//! | length / xattr   | 0 / 1          | 0 / 1          | 0 / 1      |
//! | extent           | 2 (both-endian)| 2 (both-endian)| 6          |
//! | data length      | 10             | 10             | 14         |
//! | date             | 18, 7 bytes    | 18, 6 bytes    | 18, 6 bytes|
//! | flags            | 25             | 24             | 25         |
//! | unit size / gap  | 26 / 27        | 26 / 27        | 26 (u16)   |
//! | volume sequence  | 28             | 28             | 30         |
//! | name length      | 32             | 32             | 32         |

use alloc::vec;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Iso9660Error, Result};
use crate::types::{
    DecodedDirectoryEntry, DirectoryLayout, Extent, FileFlags, DIRECTORY_RECORD_SIZE,
};
use crate::utils::datetime::DateTime7;

/// Fixed part of a directory record, decoded
#[derive(Debug, Clone, Copy)]
pub struct DirectoryRecord {
    /// Length of directory record
    pub length: u8,

    /// Extended attribute record length
    pub extended_attr_length: u8,

    /// Extent location
    pub extent_lba: u32,

    /// Data length
    pub data_length: u32,

    /// Recording date and time
    pub recording_datetime: DateTime7,

    /// File flags; CD-i only records the hidden bit here
    pub file_flags: FileFlags,

    /// File unit size (interleaved files)
    pub file_unit_size: u16,

    /// Interleave gap size
    pub interleave_gap: u8,

    /// Volume sequence number
    pub volume_sequence: u16,

    /// File identifier length
    pub file_id_len: u8,
}

impl DirectoryRecord {
    /// Parse directory record from bytes starting at the record
    ///
    /// The caller has already checked that the declared length is non-zero
    /// and fits in `data`.
    pub fn parse(layout: DirectoryLayout, data: &[u8]) -> Result<Self> {
        if data.len() < DIRECTORY_RECORD_SIZE {
            return Err(Iso9660Error::InvalidDirectoryRecord);
        }

        let record = match layout {
            DirectoryLayout::Iso9660 => Self::parse_iso(data),
            DirectoryLayout::HighSierra => Self::parse_high_sierra(data),
            DirectoryLayout::Cdi => Self::parse_cdi(data),
        };

        // Validate file identifier length
        if DIRECTORY_RECORD_SIZE + record.file_id_len as usize > record.length as usize
            || record.length as usize > data.len()
        {
            return Err(Iso9660Error::InvalidDirectoryRecord);
        }

        Ok(record)
    }

    fn parse_iso(data: &[u8]) -> Self {
        let mut date = [0u8; 7];
        date.copy_from_slice(&data[18..25]);

        Self {
            length: data[0],
            extended_attr_length: data[1],
            extent_lba: LittleEndian::read_u32(&data[2..6]),
            data_length: LittleEndian::read_u32(&data[10..14]),
            recording_datetime: DateTime7::from_bytes(&date),
            file_flags: FileFlags::from_byte(data[25]),
            file_unit_size: data[26] as u16,
            interleave_gap: data[27],
            volume_sequence: LittleEndian::read_u16(&data[28..30]),
            file_id_len: data[32],
        }
    }

    fn parse_high_sierra(data: &[u8]) -> Self {
        let mut date = [0u8; 6];
        date.copy_from_slice(&data[18..24]);

        Self {
            length: data[0],
            extended_attr_length: data[1],
            extent_lba: LittleEndian::read_u32(&data[2..6]),
            data_length: LittleEndian::read_u32(&data[10..14]),
            recording_datetime: DateTime7::from_high_sierra(&date),
            file_flags: FileFlags::from_byte(data[24]),
            file_unit_size: data[26] as u16,
            interleave_gap: data[27],
            volume_sequence: LittleEndian::read_u16(&data[28..30]),
            file_id_len: data[32],
        }
    }

    fn parse_cdi(data: &[u8]) -> Self {
        let mut date = [0u8; 6];
        date.copy_from_slice(&data[18..24]);

        Self {
            length: data[0],
            extended_attr_length: data[1],
            extent_lba: BigEndian::read_u32(&data[6..10]),
            data_length: BigEndian::read_u32(&data[14..18]),
            recording_datetime: DateTime7::from_high_sierra(&date),
            file_flags: FileFlags {
                hidden: data[25] & FileFlags::HIDDEN != 0,
                ..FileFlags::default()
            },
            file_unit_size: BigEndian::read_u16(&data[26..28]),
            interleave_gap: 0,
            volume_sequence: BigEndian::read_u16(&data[30..32]),
            file_id_len: data[32],
        }
    }

    /// Get file identifier bytes from the record's own bytes
    pub fn file_identifier<'d>(&self, data: &'d [u8]) -> &'d [u8] {
        let start = DIRECTORY_RECORD_SIZE;
        &data[start..start + self.file_id_len as usize]
    }

    /// Is this the "." or ".." record?
    pub fn is_self_or_parent(&self, data: &[u8]) -> bool {
        let id = self.file_identifier(data);
        id.len() == 1 && (id[0] == 0x00 || id[0] == 0x01)
    }

    /// Byte range of the System Use area, relative to the record start
    ///
    /// The area follows the name, padded to an even offset.
    pub fn system_use_range(&self) -> (usize, usize) {
        let mut start = DIRECTORY_RECORD_SIZE + self.file_id_len as usize;
        if start % 2 != 0 {
            start += 1;
        }
        let end = self.length as usize;
        (start.min(end), end)
    }

    /// Build an entry from the fixed fields, name left empty
    pub fn to_entry(&self) -> DecodedDirectoryEntry {
        let extents = if self.data_length != 0 {
            vec![Extent::new(self.extent_lba, self.data_length)]
        } else {
            vec![]
        };

        DecodedDirectoryEntry {
            size: self.data_length as u64,
            flags: self.file_flags,
            extents,
            timestamp: self.recording_datetime,
            xattr_length: self.extended_attr_length,
            file_unit_size: self.file_unit_size,
            interleave_gap: self.interleave_gap,
            volume_sequence_number: self.volume_sequence,
            ..DecodedDirectoryEntry::default()
        }
    }
}
