//! Rock Ridge extension support
//!
//! Rock Ridge (RRIP) adds POSIX filesystem semantics on top of SUSP: file
//! modes and ownership, device numbers, symbolic links, long mixed-case names,
//! timestamps and relocation of directories nested deeper than eight levels.
//!
//! Numeric fields are both-endian; only the little-endian half is read.

use alloc::string::String;
use alloc::vec::Vec;

use byteorder::{ByteOrder, LittleEndian};
use gpt_disk_io::BlockIo;
use log::{debug, warn};

use super::{field_length, SystemAreaParser};
use crate::directory::record::DirectoryRecord;
use crate::types::{DecodedDirectoryEntry, PosixAttributes, PosixDeviceNumber};
use crate::utils::string::{decode_text, SLASH_SUBSTITUTE};

/// Signature constants
pub mod signatures {
    use crate::extensions::signature;

    /// POSIX file attributes signature
    pub const POSIX_ATTRS: u16 = signature(b"PX");
    /// POSIX device number signature
    pub const POSIX_DEV: u16 = signature(b"PN");
    /// Symbolic link signature
    pub const SYMLINK: u16 = signature(b"SL");
    /// Alternate name signature
    pub const ALTERNATE_NAME: u16 = signature(b"NM");
    /// Child link signature
    pub const CHILD_LINK: u16 = signature(b"CL");
    /// Parent link signature
    pub const PARENT_LINK: u16 = signature(b"PL");
    /// Relocated directory signature
    pub const RELOCATED_DIR: u16 = signature(b"RE");
    /// Timestamps signature
    pub const TIMESTAMPS: u16 = signature(b"TF");
    /// Sparse file signature
    pub const SPARSE: u16 = signature(b"SF");
    /// Rock Ridge presence marker (RRIP 1.09)
    pub const RRIP: u16 = signature(b"RR");
    /// zisofs compressed file signature
    pub const ZISOFS: u16 = signature(b"ZF");
}

/// SL and NM flag bits
mod flags {
    pub const CONTINUE: u8 = 0x01;
    pub const CURRENT: u8 = 0x02;
    pub const PARENT: u8 = 0x04;
    pub const ROOT: u8 = 0x08;
    pub const HOST: u8 = 0x20;
}

/// TF flag bits, in the order the stamps are recorded
const TF_CREATION: u8 = 0x01;
const TF_MODIFY: u8 = 0x02;
const TF_ACCESS: u8 = 0x04;
const TF_ATTRIBUTES: u8 = 0x08;
const TF_BACKUP: u8 = 0x10;
const TF_EXPIRATION: u8 = 0x20;
const TF_EFFECTIVE: u8 = 0x40;
const TF_LONG_FORM: u8 = 0x80;

const PX_LENGTH: usize = 36;
const PX_SERIAL_LENGTH: usize = 44;
const PN_LENGTH: usize = 20;

/// Decode a PX field
pub fn posix_attributes(field: &[u8], entry: &mut DecodedDirectoryEntry) -> Option<usize> {
    let length = field_length(field)?;
    if length < PX_LENGTH {
        return Some(length);
    }

    entry.posix_attributes = Some(PosixAttributes {
        mode: LittleEndian::read_u32(&field[4..8]),
        links: LittleEndian::read_u32(&field[12..16]),
        uid: LittleEndian::read_u32(&field[20..24]),
        gid: LittleEndian::read_u32(&field[28..32]),
        serial_number: (length >= PX_SERIAL_LENGTH).then(|| LittleEndian::read_u32(&field[36..40])),
    });

    Some(length)
}

/// Decode a PN field
pub fn device_number(field: &[u8], entry: &mut DecodedDirectoryEntry) -> Option<usize> {
    let length = field_length(field)?;
    if length < PN_LENGTH {
        return Some(length);
    }

    entry.posix_device = Some(PosixDeviceNumber {
        high: LittleEndian::read_u32(&field[4..8]),
        low: LittleEndian::read_u32(&field[12..16]),
    });

    Some(length)
}

/// Decode a TF field into the raw per-kind stamps
///
/// Stamps that would run past the field are dropped.
pub fn timestamps(field: &[u8], entry: &mut DecodedDirectoryEntry) -> Option<usize> {
    let length = field_length(field)?;
    if length < 5 {
        return Some(length);
    }

    let tf_flags = field[4];
    let size = if tf_flags & TF_LONG_FORM != 0 { 17 } else { 7 };
    let stamps = &mut entry.rrip_timestamps;
    let slots: [(u8, &mut Option<Vec<u8>>); 7] = [
        (TF_CREATION, &mut stamps.creation),
        (TF_MODIFY, &mut stamps.modification),
        (TF_ACCESS, &mut stamps.access),
        (TF_ATTRIBUTES, &mut stamps.attribute_change),
        (TF_BACKUP, &mut stamps.backup),
        (TF_EXPIRATION, &mut stamps.expiration),
        (TF_EFFECTIVE, &mut stamps.effective),
    ];

    let mut offset = 5;
    for (bit, slot) in slots {
        if tf_flags & bit == 0 {
            continue;
        }
        if offset + size > length {
            break;
        }
        *slot = Some(field[offset..offset + size].to_vec());
        offset += size;
    }

    Some(length)
}

/// Text for the ".", ".." and host name components, in the active encoding
fn special_component(text: &str, joliet: bool) -> Vec<u8> {
    if joliet {
        text.encode_utf16().flat_map(u16::to_be_bytes).collect()
    } else {
        text.as_bytes().to_vec()
    }
}

impl<'r, 'a, B: BlockIo> SystemAreaParser<'r, 'a, B> {
    fn decode(&self, bytes: &[u8]) -> String {
        decode_text(bytes, self.settings.encoding, self.settings.joliet)
    }

    /// Decode an SL field, appending to a link begun by an earlier SL
    pub(super) fn symbolic_link(
        &mut self,
        field: &[u8],
        entry: &mut DecodedDirectoryEntry,
    ) -> Option<usize> {
        let length = field_length(field)?;
        if length < 5 {
            return Some(length);
        }

        let record_flags = field[4];
        let mut link = match entry.symbolic_link.take() {
            Some(link) if self.continue_symlink => link,
            _ => {
                self.continue_component = false;
                String::new()
            }
        };

        let mut offset = 5;
        while offset + 2 <= length {
            let component_flags = field[offset];
            let component_length = field[offset + 1] as usize;
            let start = offset + 2;
            let end = start + component_length;
            if end > length {
                debug!("symbolic link component of {:?} overruns its field", entry.filename);
                break;
            }
            offset = end;

            if component_flags & flags::ROOT != 0 {
                link.clear();
                link.push('/');
                self.continue_component = false;
                continue;
            }

            if !self.continue_component && !link.is_empty() && !link.ends_with('/') {
                link.push('/');
            }

            if component_flags & flags::CURRENT != 0 {
                link.push('.');
                self.continue_component = false;
            } else if component_flags & flags::PARENT != 0 {
                link.push_str("..");
                self.continue_component = false;
            } else if component_flags & flags::HOST != 0 {
                link.push_str(&self.settings.host_name);
                self.continue_component = false;
            } else {
                let text = self.decode(&field[start..end]);
                link.push_str(&text);
                self.continue_component = component_flags & flags::CONTINUE != 0;
            }
        }

        self.continue_symlink = record_flags & flags::CONTINUE != 0;
        entry.symbolic_link = Some(link);

        Some(length)
    }

    /// Decode an NM field, replacing the entry's name once complete
    pub(super) fn alternate_name(
        &mut self,
        field: &[u8],
        entry: &mut DecodedDirectoryEntry,
    ) -> Option<usize> {
        let length = field_length(field)?;
        if !self.settings.rock_ridge() || length < 5 {
            return Some(length);
        }

        let name_flags = field[4];
        let joliet = self.settings.joliet;
        let pending = entry.pending_alternate_name.get_or_insert_with(Vec::new);

        if name_flags & flags::CURRENT != 0 {
            pending.extend(special_component(".", joliet));
        } else if name_flags & flags::PARENT != 0 {
            pending.extend(special_component("..", joliet));
        } else if name_flags & flags::HOST != 0 {
            pending.extend(special_component(&self.settings.host_name, joliet));
        } else {
            pending.extend_from_slice(&field[5..length]);
        }

        if name_flags & flags::CONTINUE == 0 {
            if let Some(bytes) = entry.pending_alternate_name.take() {
                entry.filename = self
                    .decode(&bytes)
                    .chars()
                    .map(|c| if c == '/' { SLASH_SUBSTITUTE } else { c })
                    .collect();
            }
        }

        Some(length)
    }

    /// Decode a CL field: the real directory lives at the child location
    ///
    /// The entry keeps its name and takes its placement from the child
    /// directory's own "." record.
    pub(super) fn child_link(
        &mut self,
        field: &[u8],
        entry: &mut DecodedDirectoryEntry,
    ) -> Option<usize> {
        let length = field_length(field)?;
        if !self.settings.rock_ridge() || self.settings.use_path_table || length < 12 {
            return Some(length);
        }

        let child = LittleEndian::read_u32(&field[4..8]);
        let sector = match self.reader.read_sector(child as u64) {
            Ok(sector) => sector,
            Err(e) => {
                warn!("unreadable child link target {} of {:?}: {}", child, entry.filename, e);
                return Some(length);
            }
        };

        let record_length = sector[0] as usize;
        let self_record = &sector[..record_length.min(sector.len())];
        let record = match DirectoryRecord::parse(self.settings.layout, self_record) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "child link target {} of {:?} has no self record: {}",
                    child, entry.filename, e
                );
                return Some(length);
            }
        };

        let relinked = record.to_entry();
        entry.extents = relinked.extents;
        entry.size = relinked.size;
        entry.flags = relinked.flags;
        entry.timestamp = relinked.timestamp;
        entry.file_unit_size = relinked.file_unit_size;
        entry.interleave_gap = relinked.interleave_gap;
        entry.volume_sequence_number = relinked.volume_sequence_number;
        entry.xattr_length = relinked.xattr_length;

        debug!("{:?} relinked to directory at {}", entry.filename, child);

        Some(length)
    }
}
