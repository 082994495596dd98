//! Volume descriptor parsing
//!
//! ISO9660 volume descriptors start at sector 16 and describe the filesystem layout.
//! Multiple descriptors may be present (Primary, Supplementary, Boot Record).
//! High Sierra and CD-i discs keep their descriptor at the same place with
//! their own identifiers.

pub mod primary;
pub mod supplementary;

use byteorder::{BigEndian, ByteOrder};
use gpt_disk_io::BlockIo;
use log::{debug, warn};

use crate::directory::record::DirectoryRecord;
use crate::error::{Iso9660Error, Result};
use crate::extensions::susp;
use crate::types::{
    DirectoryLayout, VolumeDescriptorType, VolumeInfo, VolumeRoot, SECTOR_SIZE,
    VOLUME_DESCRIPTOR_START,
};
use crate::utils::sector::SectorReader;

use primary::{PrimaryDescriptor, CDI_MAGIC, HIGH_SIERRA_MAGIC, ISO_MAGIC};

/// Descriptors examined before giving up on a terminator
const MAX_DESCRIPTORS: u64 = 100;

/// Mount a volume from a block device
///
/// Reads volume descriptors starting at sector 16 and builds VolumeInfo.
///
/// # Arguments
/// * `block_io` - Block device containing the image
/// * `start_sector` - Starting logical sector of the image (0 if raw image)
///
/// # Returns
/// Parsed volume information
pub fn mount<B: BlockIo>(block_io: &mut B, start_sector: u64) -> Result<VolumeInfo> {
    let mut reader = SectorReader::new(block_io, start_sector, 0)?;
    let first = reader.read_sector(VOLUME_DESCRIPTOR_START)?;

    let mut volume = if &first[1..6] == ISO_MAGIC {
        probe_iso(&mut reader)?
    } else if &first[9..14] == HIGH_SIERRA_MAGIC {
        probe_high_sierra(&mut reader)?
    } else if &first[1..6] == CDI_MAGIC {
        probe_cdi(&mut reader, &first)?
    } else {
        return Err(Iso9660Error::InvalidSignature);
    };

    if volume.logical_block_size != SECTOR_SIZE as u16 {
        warn!("logical block size {} read as {}", volume.logical_block_size, SECTOR_SIZE);
    }

    if volume.layout != DirectoryLayout::Cdi {
        volume.has_rock_ridge = detect_rock_ridge(&mut reader, volume.layout, &volume.primary);
    }

    debug!(
        "mounted {:?} volume {:?}: {} sectors, joliet {}, rock ridge {}",
        volume.layout,
        volume.volume_id,
        volume.volume_space_size,
        volume.has_joliet(),
        volume.has_rock_ridge
    );

    Ok(volume)
}

fn volume_info(layout: DirectoryLayout, descriptor: PrimaryDescriptor) -> VolumeInfo {
    VolumeInfo {
        layout,
        volume_id: descriptor.volume_id,
        logical_block_size: descriptor.logical_block_size,
        volume_space_size: descriptor.volume_space_size,
        primary: descriptor.root,
        joliet: None,
        has_rock_ridge: false,
    }
}

fn probe_iso<B: BlockIo>(reader: &mut SectorReader<'_, B>) -> Result<VolumeInfo> {
    let mut primary = None;
    let mut joliet = None;

    for sector in VOLUME_DESCRIPTOR_START..VOLUME_DESCRIPTOR_START + MAX_DESCRIPTORS {
        let buffer = reader.read_sector(sector)?;
        if &buffer[1..6] != ISO_MAGIC {
            break;
        }

        match VolumeDescriptorType::from_code(buffer[0]) {
            Some(VolumeDescriptorType::Primary) if primary.is_none() => {
                primary = Some(primary::parse_iso(&buffer)?);
            }
            Some(VolumeDescriptorType::Supplementary) if joliet.is_none() => {
                joliet = supplementary::parse(&buffer)?;
            }
            Some(VolumeDescriptorType::Terminator) => break,
            _ => {}
        }
    }

    let descriptor = primary.ok_or(Iso9660Error::InvalidSignature)?;
    let mut volume = volume_info(DirectoryLayout::Iso9660, descriptor);
    volume.joliet = joliet;

    Ok(volume)
}

fn probe_high_sierra<B: BlockIo>(reader: &mut SectorReader<'_, B>) -> Result<VolumeInfo> {
    for sector in VOLUME_DESCRIPTOR_START..VOLUME_DESCRIPTOR_START + MAX_DESCRIPTORS {
        let buffer = reader.read_sector(sector)?;
        if &buffer[9..14] != HIGH_SIERRA_MAGIC {
            break;
        }

        match VolumeDescriptorType::from_code(buffer[8]) {
            Some(VolumeDescriptorType::Primary) => {
                let descriptor = primary::parse_high_sierra(&buffer)?;
                return Ok(volume_info(DirectoryLayout::HighSierra, descriptor));
            }
            Some(VolumeDescriptorType::Terminator) => break,
            _ => {}
        }
    }

    Err(Iso9660Error::InvalidSignature)
}

/// CD-i: the root comes from the first path table record and its own "."
fn probe_cdi<B: BlockIo>(reader: &mut SectorReader<'_, B>, label: &[u8]) -> Result<VolumeInfo> {
    let descriptor = primary::parse_cdi(label)?;
    let mut volume = volume_info(DirectoryLayout::Cdi, descriptor);

    let table = reader.read_sector(volume.primary.path_table_lba as u64)?;
    if table[0] == 0 {
        return Err(Iso9660Error::InvalidPathTable);
    }
    let root_lba = BigEndian::read_u32(&table[2..6]);
    let xattr_length = table[1];

    let directory = reader.read_sector(root_lba as u64)?;
    let offset = xattr_length as usize;
    let length = directory[offset] as usize;
    if length == 0 || offset + length > directory.len() {
        return Err(Iso9660Error::InvalidDirectoryRecord);
    }
    let root = DirectoryRecord::parse(DirectoryLayout::Cdi, &directory[offset..offset + length])?;

    volume.primary = VolumeRoot {
        extent_lba: root_lba,
        extent_len: root.data_length,
        xattr_length,
        ..volume.primary
    };

    Ok(volume)
}

/// Look for SUSP / Rock Ridge markers in the root's "." record
fn detect_rock_ridge<B: BlockIo>(
    reader: &mut SectorReader<'_, B>,
    layout: DirectoryLayout,
    root: &VolumeRoot,
) -> bool {
    let directory = match reader.read_sector(root.extent_lba as u64) {
        Ok(directory) => directory,
        Err(e) => {
            warn!("root directory at {} unreadable: {}", root.extent_lba, e);
            return false;
        }
    };

    let offset = root.xattr_length as usize;
    let length = directory[offset] as usize;
    if length == 0 || offset + length > directory.len() {
        return false;
    }

    let data = &directory[offset..offset + length];
    match DirectoryRecord::parse(layout, data) {
        Ok(record) => {
            let (start, end) = record.system_use_range();
            susp::announces_rock_ridge(data, start, end)
        }
        Err(_) => false,
    }
}
