//! Directory decoding
//!
//! A directory is a run of sectors holding directory records. Decoding turns
//! them into a [`DirectoryListing`]: one [`DecodedDirectoryEntry`] per
//! logical name, with multi-extent records merged and associated files or
//! resource forks folded into their primary entry.

pub mod cache;
pub mod flags;
pub mod path_table;
pub mod record;
pub mod trans_tbl;

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;

use byteorder::{BigEndian, ByteOrder};
use gpt_disk_io::BlockIo;
use log::{debug, trace, warn};

use crate::error::Result;
use crate::extensions::SystemAreaParser;
use crate::options::{DecodeSettings, Namespace};
use crate::types::{
    CdiSystemArea, DecodedDirectoryEntry, DirectoryLayout, ForkEntry, DIRECTORY_RECORD_SIZE,
};
use crate::utils::sector::SectorReader;
use crate::utils::string::{decode_text, normalize_filename, strip_version};

use path_table::PathTable;
use record::DirectoryRecord;

/// Decoded entries of one directory, keyed by filename
pub type DirectoryListing = BTreeMap<String, DecodedDirectoryEntry>;

/// Size of the CD-i system use area
const CDI_SYSTEM_AREA_SIZE: usize = 10;

/// Name shown to the caller for an entry
///
/// The Normal name space hides the `;1` version suffix; every other name
/// space shows the decoded name as is.
pub fn display_name(entry: &DecodedDirectoryEntry, namespace: Namespace) -> &str {
    match namespace {
        Namespace::Normal => strip_version(&entry.filename),
        _ => &entry.filename,
    }
}

/// Find an entry by a lowercase path component
///
/// Matches either the stored filename or its display name.
pub fn find_entry<'l>(
    listing: &'l DirectoryListing,
    component: &str,
    namespace: Namespace,
) -> Option<&'l DecodedDirectoryEntry> {
    listing.values().find(|entry| {
        entry.filename.to_lowercase() == component
            || display_name(entry, namespace).to_lowercase() == component
    })
}

/// Decodes directory extents of one mounted volume
pub struct DirectoryDecoder<'a, B: BlockIo> {
    reader: SectorReader<'a, B>,
    settings: &'a DecodeSettings,
}

impl<'a, B: BlockIo> DirectoryDecoder<'a, B> {
    /// Create a decoder over an image starting at `start_sector`
    pub fn new(
        block_io: &'a mut B,
        start_sector: u64,
        settings: &'a DecodeSettings,
    ) -> Result<Self> {
        Ok(Self {
            reader: SectorReader::new(block_io, start_sector, settings.volume_sectors)?,
            settings,
        })
    }

    /// Decode `sector_count` sectors of directory records starting at `start`
    ///
    /// The first record of the first sector starts after `xattr_length`
    /// bytes of extended attributes.
    pub fn decode(
        &mut self,
        start: u32,
        sector_count: u32,
        xattr_length: u8,
    ) -> Result<DirectoryListing> {
        let mut listing = DirectoryListing::new();
        let mut placeholders = BTreeSet::new();

        for index in 0..sector_count {
            let lba = start as u64 + index as u64;
            let sector = self.reader.read_sector(lba)?;
            let mut offset = if index == 0 { xattr_length as usize } else { 0 };

            while offset + DIRECTORY_RECORD_SIZE < sector.len() {
                let length = sector[offset] as usize;
                if length == 0 || offset + length > sector.len() {
                    trace!("end of directory sector {} at offset {}", lba, offset);
                    break;
                }

                let data = &sector[offset..offset + length];
                offset += length;

                let record = DirectoryRecord::parse(self.settings.layout, data)?;
                if record.is_self_or_parent(data) {
                    continue;
                }

                let (entry, has_resource_fork) = self.decode_entry(&record, data);

                // Subdirectories are listed from the path table instead
                if self.settings.use_path_table && entry.is_directory() {
                    continue;
                }

                merge(&mut listing, &mut placeholders, entry, has_resource_fork);
            }
        }

        if self.settings.use_trans_tbl {
            trans_tbl::translate(&mut self.reader, self.settings, &mut listing);
        }

        if self.settings.rock_ridge() {
            listing.retain(|_, entry| !entry.relocated);
        }

        debug!("decoded {} entries from directory at {}", listing.len(), start);

        Ok(listing)
    }

    /// Entries for the subdirectories the path table records under `path`
    ///
    /// Each entry is built from the subdirectory's own "." record and named
    /// after its path table record.
    pub fn path_table_subdirectories(
        &mut self,
        table: &PathTable,
        path: &str,
    ) -> Result<Vec<DecodedDirectoryEntry>> {
        let mut entries = Vec::new();

        for child in table.children_of(path) {
            let sector = self.reader.read_sector(child.extent as u64)?;
            let offset = child.xattr_length as usize;
            let length = sector.get(offset).copied().unwrap_or(0) as usize;
            if length == 0 || offset + length > sector.len() {
                warn!("directory {:?} at {} has no self record", child.name, child.extent);
                continue;
            }

            let data = &sector[offset..offset + length];
            let record = DirectoryRecord::parse(self.settings.layout, data)?;
            let (mut entry, _) = self.decode_entry(&record, data);
            entry.filename = child.name.clone();
            entry.flags.directory = true;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// Name and enrich one record
    fn decode_entry(
        &mut self,
        record: &DirectoryRecord,
        data: &[u8]) -> (DecodedDirectoryEntry, bool,
    ) {
        let mut entry = record.to_entry();
        let name = decode_text(
            record.file_identifier(data),
            self.settings.encoding,
            self.settings.joliet,
        );
        entry.filename = normalize_filename(&name, self.settings.joliet);

        let (start, end) = record.system_use_range();
        let has_resource_fork = match self.settings.layout {
            DirectoryLayout::Cdi => {
                decode_cdi_system_area(&data[start..end], &mut entry);
                false
            }
            DirectoryLayout::Iso9660 | DirectoryLayout::HighSierra => {
                SystemAreaParser::new(&mut self.reader, self.settings)
                    .parse(data, start, end, &mut entry)
            }
        };

        (entry, has_resource_fork)
    }
}

/// CD-i records keep ownership and the directory bit in a fixed area
fn decode_cdi_system_area(area: &[u8], entry: &mut DecodedDirectoryEntry) {
    if area.len() < CDI_SYSTEM_AREA_SIZE {
        return;
    }

    let system_area = CdiSystemArea {
        group: BigEndian::read_u16(&area[0..2]),
        owner: BigEndian::read_u16(&area[2..4]),
        attributes: BigEndian::read_u16(&area[4..6]),
        file_number: area[8],
    };

    entry.flags.directory = system_area.is_directory();
    entry.cdi_system_area = Some(system_area);
}

fn add_fork(fork: &mut Option<ForkEntry>, entry: DecodedDirectoryEntry) {
    let fork = fork.get_or_insert_with(ForkEntry::default);
    fork.size += entry.size;
    fork.extents.extend(entry.extents);
}

/// Fold one decoded record into the listing
///
/// Records sharing a name are extents of one file. Associated records
/// become the primary's associated file or, when an Apple HFS field was
/// seen, its resource fork. An associated record seen before its primary
/// leaves a placeholder that the primary later completes.
fn merge(
    listing: &mut DirectoryListing,
    placeholders: &mut BTreeSet<String>,
    entry: DecodedDirectoryEntry,
    has_resource_fork: bool,
) {
    if entry.flags.associated {
        let primary = listing.entry(entry.filename.clone()).or_insert_with(|| {
            placeholders.insert(entry.filename.clone());
            DecodedDirectoryEntry {
                filename: entry.filename.clone(),
                flags: entry.flags.without_associated(),
                timestamp: entry.timestamp,
                volume_sequence_number: entry.volume_sequence_number,
                ..DecodedDirectoryEntry::default()
            }
        });

        if has_resource_fork {
            add_fork(&mut primary.resource_fork, entry);
        } else {
            add_fork(&mut primary.associated_file, entry);
        }
        return;
    }

    if !listing.contains_key(&entry.filename) {
        listing.insert(entry.filename.clone(), entry);
        return;
    }
    let Some(existing) = listing.get_mut(&entry.filename) else {
        return;
    };

    if placeholders.remove(&entry.filename) {
        let associated_file = existing.associated_file.take();
        let resource_fork = existing.resource_fork.take();
        *existing = DecodedDirectoryEntry {
            associated_file,
            resource_fork,
            ..entry
        };
        return;
    }

    existing.size += entry.size;
    if entry.size != 0 {
        existing.extents.extend(entry.extents);
    }
}
