//! Path table parsing
//!
//! The path table lists every directory of the volume in breadth-first
//! order. Records are numbered from 1; each names its parent by number and
//! the root is its own parent.
//!
//! | Field       | ISO9660 (L) | CD-i (M, BE) | High Sierra |
//! |-------------|-------------|--------------|-------------|
//! | name length | 0           | 0            | 5           |
//! | xattr       | 1           | 1            | 4           |
//! | extent      | 2, u32      | 2, u32       | 0, u32      |
//! | parent      | 6, u16      | 6, u16       | 6, u16      |
//! | name        | 8           | 8            | 8           |
//!
//! Names are padded to an even length.

use alloc::string::String;
use alloc::vec::Vec;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use gpt_disk_io::BlockIo;
use log::{debug, warn};

use crate::error::{Iso9660Error, Result};
use crate::options::DecodeSettings;
use crate::types::{DirectoryLayout, PathTableEntry};
use crate::utils::sector::{sectors_for_bytes, SectorReader};
use crate::utils::string::decode_text;

/// Fixed part of a path table record
const RECORD_HEADER: usize = 8;

/// Number of the root directory record
const ROOT_INDEX: u16 = 1;

/// Directory index of a volume
#[derive(Debug, Clone, Default)]
pub struct PathTable {
    entries: Vec<PathTableEntry>,
}

impl PathTable {
    /// Read and parse `size` bytes of path table at `lba`
    pub fn load<B: BlockIo>(
        reader: &mut SectorReader<'_, B>,
        lba: u32,
        size: u32,
        settings: &DecodeSettings,
    ) -> Result<Self> {
        let mut data = reader.read(lba as u64, sectors_for_bytes(size as u64))?;
        data.truncate(size as usize);

        let table = Self::parse(&data, settings)?;
        debug!("path table at {} lists {} directories", lba, table.len());

        Ok(table)
    }

    /// Parse a path table image
    pub fn parse(data: &[u8], settings: &DecodeSettings) -> Result<Self> {
        let mut entries = Vec::new();
        let mut offset = 0;

        while offset + RECORD_HEADER <= data.len() {
            let record = &data[offset..];
            let (name_length, xattr_length, extent, parent_index) = match settings.layout {
                DirectoryLayout::Iso9660 => (
                    record[0] as usize,
                    record[1],
                    LittleEndian::read_u32(&record[2..6]),
                    LittleEndian::read_u16(&record[6..8]),
                ),
                DirectoryLayout::Cdi => (
                    record[0] as usize,
                    record[1],
                    BigEndian::read_u32(&record[2..6]),
                    BigEndian::read_u16(&record[6..8]),
                ),
                DirectoryLayout::HighSierra => (
                    record[5] as usize,
                    record[4],
                    LittleEndian::read_u32(&record[0..4]),
                    LittleEndian::read_u16(&record[6..8]),
                ),
            };

            // Zero padding after the last record
            if name_length == 0 {
                break;
            }

            if RECORD_HEADER + name_length > record.len() {
                warn!("path table record at {} runs past the table", offset);
                return Err(Iso9660Error::InvalidPathTable);
            }

            let name = if entries.is_empty() {
                String::new()
            } else {
                let raw = &record[RECORD_HEADER..RECORD_HEADER + name_length];
                decode_text(raw, settings.encoding, settings.joliet)
            };

            entries.push(PathTableEntry {
                name,
                extent,
                xattr_length,
                parent_index,
            });

            offset += RECORD_HEADER + name_length + name_length % 2;
        }

        Ok(Self { entries })
    }

    /// All records, root first
    pub fn entries(&self) -> &[PathTableEntry] {
        &self.entries
    }

    /// Root directory record
    pub fn root(&self) -> Option<&PathTableEntry> {
        self.entries.first()
    }

    /// Number of directories
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Directories whose parent is `path`
    ///
    /// `path` is `/`-separated and matched case-insensitively. A component
    /// missing from the table yields no children.
    pub fn children_of(&self, path: &str) -> Vec<&PathTableEntry> {
        let mut parent = ROOT_INDEX;

        for component in path.split('/').filter(|c| !c.is_empty()) {
            let component = component.to_lowercase();
            let found = self.numbered().find(|(number, entry)| {
                *number != ROOT_INDEX
                    && entry.parent_index == parent
                    && entry.name.to_lowercase() == component
            });

            match found {
                Some((number, _)) => parent = number,
                None => return Vec::new(),
            }
        }

        self.numbered()
            .filter(|(number, entry)| {
                *number != parent && *number != ROOT_INDEX && entry.parent_index == parent
            })
            .map(|(_, entry)| entry)
            .collect()
    }

    fn numbered(&self) -> impl Iterator<Item = (u16, &PathTableEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| ((index + 1) as u16, entry))
    }
}
