//! System Use area extensions
//!
//! After the name of every directory record comes a System Use area holding a
//! chain of tagged fields. Most follow SUSP (IEEE P1281): a two byte
//! signature, a length byte and a version byte. Apple's old extension and
//! CD-ROM XA do not carry a length byte and are sized by their signature.
//!
//! The scan is best effort: an unknown signature, a zero length or a field
//! running past the area ends the scan for that record, leaving whatever was
//! already decoded in place.

pub mod amiga;
pub mod apple;
pub mod rock_ridge;
pub mod susp;
pub mod xa;

use alloc::collections::BTreeSet;

use byteorder::{BigEndian, ByteOrder};
use gpt_disk_io::BlockIo;
use log::trace;

use crate::options::DecodeSettings;
use crate::types::DecodedDirectoryEntry;
use crate::utils::sector::SectorReader;

/// Build a signature constant from its two ASCII bytes
pub const fn signature(bytes: &[u8; 2]) -> u16 {
    u16::from_be_bytes(*bytes)
}

/// Length byte of a SUSP-style field, if it is usable
///
/// A field must be at least as long as its 4-byte header and must not run
/// past the end of the area.
pub(crate) fn field_length(field: &[u8]) -> Option<usize> {
    let length = *field.get(2)? as usize;
    (length >= 4 && length <= field.len()).then_some(length)
}

/// Walks the System Use area of one directory record
///
/// One parser is created per directory record; its state (symbolic link
/// continuation, continuation areas already visited) spans the record's
/// whole chain, including continuation areas.
pub struct SystemAreaParser<'r, 'a, B: BlockIo> {
    reader: &'r mut SectorReader<'a, B>,
    settings: &'r DecodeSettings,
    has_resource_fork: bool,
    continue_symlink: bool,
    continue_component: bool,
    visited: BTreeSet<(u32, u32)>,
    depth: usize,
}

impl<'r, 'a, B: BlockIo> SystemAreaParser<'r, 'a, B> {
    /// Create a parser for one directory record
    pub fn new(reader: &'r mut SectorReader<'a, B>, settings: &'r DecodeSettings) -> Self {
        Self {
            reader,
            settings,
            has_resource_fork: false,
            continue_symlink: false,
            continue_component: false,
            visited: BTreeSet::new(),
            depth: 0,
        }
    }

    /// Decode `data[start..end]` into `entry`
    ///
    /// Returns whether an Apple HFS field announced a resource fork, in which
    /// case an associated record of the same name is that fork.
    pub fn parse(
        mut self,
        data: &[u8],
        start: usize,
        end: usize,
        entry: &mut DecodedDirectoryEntry,
    ) -> bool {
        self.walk(data, start, end, entry);
        self.has_resource_fork
    }

    fn walk(&mut self, data: &[u8], start: usize, end: usize, entry: &mut DecodedDirectoryEntry) {
        let end = end.min(data.len());
        let mut offset = start;

        while offset + 4 <= end {
            let field = &data[offset..end];

            // CD-ROM XA is recognised by its magic, not by its first bytes
            let tag = if field.len() >= 8 && BigEndian::read_u16(&field[6..8]) == xa::XA_MAGIC {
                xa::XA_MAGIC
            } else {
                BigEndian::read_u16(&field[0..2])
            };

            let advance = self.dispatch(tag, field, entry);

            match advance {
                Some(length) if length > 0 => offset += length,
                _ => {
                    trace!(
                        "system use scan of {:?} stopped at {:#06x} (offset {})",
                        entry.filename,
                        tag,
                        offset
                    );
                    break;
                }
            }
        }
    }

    fn dispatch(
        &mut self,
        tag: u16,
        field: &[u8],
        entry: &mut DecodedDirectoryEntry,
    ) -> Option<usize> {
        use rock_ridge::signatures as rr;

        match tag {
            xa::XA_MAGIC => xa::decode(field, entry),
            apple::APPLE_MAGIC => self.apple(field, entry),
            apple::APPLE_MAGIC_OLD => self.apple_old(field, entry),
            amiga::AMIGA_MAGIC => amiga::decode(field, entry),
            amiga::AAIP_MAGIC => field_length(field),
            susp::CONTINUATION => self.continuation(field, entry),
            susp::PADDING
            | susp::INDICATOR
            | susp::TERMINATOR
            | susp::REFERENCE
            | susp::SELECTOR => field_length(field),
            rr::POSIX_ATTRS => rock_ridge::posix_attributes(field, entry),
            rr::POSIX_DEV => rock_ridge::device_number(field, entry),
            rr::SYMLINK => self.symbolic_link(field, entry),
            rr::ALTERNATE_NAME => self.alternate_name(field, entry),
            rr::CHILD_LINK => self.child_link(field, entry),
            rr::RELOCATED_DIR => {
                entry.relocated = true;
                field_length(field)
            }
            rr::TIMESTAMPS => rock_ridge::timestamps(field, entry),
            // Presence markers and payloads not interpreted here
            rr::PARENT_LINK | rr::SPARSE | rr::RRIP | rr::ZISOFS => field_length(field),
            // Cannot continue as we don't know this structure size
            _ => None,
        }
    }
}
