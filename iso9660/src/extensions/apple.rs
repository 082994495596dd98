//! Apple ISO9660 extensions
//!
//! Two generations exist. The newer one is SUSP-shaped ("AA", length,
//! version, id); the older one starts with the bytes `BA AC` and has no
//! length byte, its size follows from the id.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use gpt_disk_io::BlockIo;

use super::{signature, SystemAreaParser};
use crate::types::{DecodedDirectoryEntry, FinderInfo, ProDosInfo};

/// New Apple extension signature
pub const APPLE_MAGIC: u16 = signature(b"AA");
/// Old Apple extension signature
pub const APPLE_MAGIC_OLD: u16 = 0xBAAC;

const NEW_PRODOS: u8 = 1;
const NEW_HFS: u8 = 2;
const NEW_PRODOS_LENGTH: usize = 7;
const NEW_HFS_LENGTH: usize = 14;

const OLD_PRODOS: u8 = 0;
const OLD_TYPE_CREATOR: u8 = 1;
const OLD_TYPE_CREATOR_BUNDLE: u8 = 2;
const OLD_ICON: u8 = 3;
const OLD_ICON_BUNDLE: u8 = 4;
const OLD_HFS: u8 = 5;

fn four_cc(bytes: &[u8]) -> [u8; 4] {
    let mut code = [0u8; 4];
    code.copy_from_slice(&bytes[..4]);
    code
}

impl<'r, 'a, B: BlockIo> SystemAreaParser<'r, 'a, B> {
    /// New-style field ("AA")
    ///
    /// A ProDOS id with an unexpected length is an AAIP field sharing the
    /// signature and is stepped over.
    pub(super) fn apple(
        &mut self,
        field: &[u8],
        entry: &mut DecodedDirectoryEntry,
    ) -> Option<usize> {
        let length = *field.get(2)? as usize;
        if length < 4 || length > field.len() {
            return None;
        }

        match field[3] {
            NEW_PRODOS if length == NEW_PRODOS_LENGTH => {
                entry.prodos = Some(ProDosInfo {
                    file_type: field[4],
                    aux_type: LittleEndian::read_u16(&field[5..7]),
                });
            }
            NEW_HFS if length >= NEW_HFS_LENGTH => {
                entry.finder_info = Some(FinderInfo {
                    file_type: four_cc(&field[4..8]),
                    creator: four_cc(&field[8..12]),
                    flags: BigEndian::read_u16(&field[12..14]),
                    icon: None,
                });
                self.has_resource_fork = true;
            }
            _ => {}
        }

        Some(length)
    }

    /// Old-style field (`BA AC`, id), sized by id
    pub(super) fn apple_old(
        &mut self,
        field: &[u8],
        entry: &mut DecodedDirectoryEntry,
    ) -> Option<usize> {
        let id = *field.get(2)?;
        let length = match id {
            OLD_PRODOS => 6,
            OLD_TYPE_CREATOR | OLD_TYPE_CREATOR_BUNDLE => 11,
            OLD_ICON | OLD_ICON_BUNDLE => 43,
            OLD_HFS => 13,
            _ => return None,
        };
        if length > field.len() {
            return None;
        }

        match id {
            OLD_PRODOS => {
                entry.prodos = Some(ProDosInfo {
                    file_type: field[3],
                    aux_type: LittleEndian::read_u16(&field[4..6]),
                });
            }
            _ => {
                let mut info = FinderInfo {
                    file_type: four_cc(&field[3..7]),
                    creator: four_cc(&field[7..11]),
                    flags: 0,
                    icon: None,
                };
                if id == OLD_ICON || id == OLD_ICON_BUNDLE {
                    let mut icon = [0u8; 32];
                    icon.copy_from_slice(&field[11..43]);
                    info.icon = Some(icon);
                }
                if id == OLD_HFS {
                    info.flags = BigEndian::read_u16(&field[11..13]);
                }
                entry.finder_info = Some(info);
                self.has_resource_fork = true;
            }
        }

        Some(length)
    }
}
