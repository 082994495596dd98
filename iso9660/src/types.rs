//! Common types and constants for ISO9660

use alloc::string::String;
use alloc::vec::Vec;

use crate::utils::datetime::DateTime7;

/// ISO9660 logical sector size (always 2048 bytes)
pub const SECTOR_SIZE: usize = 2048;

/// Volume descriptor set starts at sector 16
pub const VOLUME_DESCRIPTOR_START: u64 = 16;

/// Size of the fixed part of a directory record, up to the name length byte
pub const DIRECTORY_RECORD_SIZE: usize = 33;

/// Volume descriptor type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VolumeDescriptorType {
    /// Boot Record (El Torito)
    BootRecord = 0,
    /// Primary Volume Descriptor
    Primary = 1,
    /// Supplementary Volume Descriptor (Joliet)
    Supplementary = 2,
    /// Volume Partition Descriptor
    Partition = 3,
    /// Volume Descriptor Set Terminator
    Terminator = 255,
}

impl VolumeDescriptorType {
    /// Map a raw type code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::BootRecord),
            1 => Some(Self::Primary),
            2 => Some(Self::Supplementary),
            3 => Some(Self::Partition),
            255 => Some(Self::Terminator),
            _ => None,
        }
    }
}

/// On-disk directory record layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryLayout {
    /// ECMA-119 records (ISO9660, Joliet, Romeo, Rock Ridge)
    #[default]
    Iso9660,
    /// High Sierra records (6-byte dates, flags at byte 24)
    HighSierra,
    /// CD-i records (big-endian, attributes in the system area)
    Cdi,
}

/// Root directory and path table location of one directory hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VolumeRoot {
    /// Root directory extent location (LBA)
    pub extent_lba: u32,

    /// Root directory extent length (bytes)
    pub extent_len: u32,

    /// Root directory extended attribute record length
    pub xattr_length: u8,

    /// Path table location (LBA), 0 if absent
    pub path_table_lba: u32,

    /// Path table size (bytes)
    pub path_table_size: u32,
}

/// Parsed volume information
#[derive(Debug, Clone, Default)]
pub struct VolumeInfo {
    /// Directory record layout of this volume
    pub layout: DirectoryLayout,

    /// Volume identifier, trailing spaces removed
    pub volume_id: String,

    /// Logical block size (usually 2048)
    pub logical_block_size: u16,

    /// Volume space size (total sectors)
    pub volume_space_size: u32,

    /// Hierarchy described by the primary (or High Sierra / CD-i) descriptor
    pub primary: VolumeRoot,

    /// Hierarchy described by a Joliet supplementary descriptor
    pub joliet: Option<VolumeRoot>,

    /// Whether the root directory carries Rock Ridge / SUSP markers
    pub has_rock_ridge: bool,
}

impl VolumeInfo {
    /// Whether Joliet extensions are present
    pub fn has_joliet(&self) -> bool {
        self.joliet.is_some()
    }
}

/// File extent (contiguous data region)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// Starting LBA
    pub lba: u32,

    /// Length in bytes
    pub length: u32,
}

impl Extent {
    /// Create new extent
    pub fn new(lba: u32, length: u32) -> Self {
        Self { lba, length }
    }
}

/// File flags from directory record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileFlags {
    /// Hidden file
    pub hidden: bool,

    /// Directory (not a file)
    pub directory: bool,

    /// Associated file
    pub associated: bool,

    /// Record format in extended attributes
    pub record: bool,

    /// Owner/group permissions in extended attributes
    pub protection: bool,

    /// Not final directory record for this file
    pub multi_extent: bool,
}

/// Size and extents of an associated file or resource fork
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForkEntry {
    /// Accumulated size in bytes
    pub size: u64,

    /// Extents in encounter order
    pub extents: Vec<Extent>,
}

/// Rock Ridge POSIX attributes (PX)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PosixAttributes {
    /// File mode (st_mode)
    pub mode: u32,
    /// Number of links (st_nlink)
    pub links: u32,
    /// Owner (st_uid)
    pub uid: u32,
    /// Group (st_gid)
    pub gid: u32,
    /// File serial number (st_ino), only in the 44-byte form
    pub serial_number: Option<u32>,
}

/// Rock Ridge device number (PN)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PosixDeviceNumber {
    /// High 32 bits of dev_t
    pub high: u32,
    /// Low 32 bits of dev_t
    pub low: u32,
}

/// Macintosh Finder information carried by Apple extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderInfo {
    /// File type code (e.g. `TEXT`)
    pub file_type: [u8; 4],
    /// Creator code
    pub creator: [u8; 4],
    /// Finder flags
    pub flags: u16,
    /// 32-byte icon bitmap, old Apple extension only
    pub icon: Option<[u8; 32]>,
}

/// ProDOS file type information carried by Apple extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProDosInfo {
    /// ProDOS file type
    pub file_type: u8,
    /// ProDOS auxiliary type
    pub aux_type: u16,
}

/// CD-ROM XA system use information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdromXa {
    /// Owner group id
    pub group: u16,
    /// Owner user id
    pub user: u16,
    /// XA attribute bits
    pub attributes: u16,
    /// File number for interleaved files
    pub file_number: u8,
}

/// CD-i system use area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdiSystemArea {
    /// Owner group id
    pub group: u16,
    /// Owner user id
    pub owner: u16,
    /// CD-i attribute bits
    pub attributes: u16,
    /// File number
    pub file_number: u8,
}

impl CdiSystemArea {
    /// Directory attribute bit
    pub const DIRECTORY: u16 = 0x8000;

    /// Is the directory attribute set?
    pub fn is_directory(&self) -> bool {
        self.attributes & Self::DIRECTORY != 0
    }
}

/// Amiga protection bits (AS)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmigaProtection {
    /// User-defined bits
    pub user: u8,
    /// Reserved, always zero
    pub zero: u8,
    /// Multiuser protection bits
    pub multiuser: u8,
    /// Classic protection bits
    pub protection: u8,
}

/// Raw Rock Ridge timestamps (TF), 7-byte or 17-byte encoding each
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RripTimestamps {
    /// Creation time
    pub creation: Option<Vec<u8>>,
    /// Modification time
    pub modification: Option<Vec<u8>>,
    /// Last access time
    pub access: Option<Vec<u8>>,
    /// Attribute change time
    pub attribute_change: Option<Vec<u8>>,
    /// Last backup time
    pub backup: Option<Vec<u8>>,
    /// Expiration time
    pub expiration: Option<Vec<u8>>,
    /// Effective time
    pub effective: Option<Vec<u8>>,
}

/// One logical file or subdirectory within a directory listing
#[derive(Debug, Clone, Default)]
pub struct DecodedDirectoryEntry {
    /// Decoded and normalised name
    pub filename: String,

    /// Size in bytes, summed across merged extents
    pub size: u64,

    /// File flags
    pub flags: FileFlags,

    /// Extents in encounter order
    pub extents: Vec<Extent>,

    /// Recording date and time
    pub timestamp: DateTime7,

    /// Extended attribute record length
    pub xattr_length: u8,

    /// File unit size (interleaved files)
    pub file_unit_size: u16,

    /// Interleave gap size
    pub interleave_gap: u8,

    /// Volume sequence number
    pub volume_sequence_number: u16,

    /// Associated file payload
    pub associated_file: Option<ForkEntry>,

    /// Apple resource fork payload
    pub resource_fork: Option<ForkEntry>,

    /// Rock Ridge symbolic link target
    pub symbolic_link: Option<String>,

    /// Rock Ridge POSIX attributes
    pub posix_attributes: Option<PosixAttributes>,

    /// Rock Ridge device number
    pub posix_device: Option<PosixDeviceNumber>,

    /// Apple Finder information
    pub finder_info: Option<FinderInfo>,

    /// Apple ProDOS type information
    pub prodos: Option<ProDosInfo>,

    /// CD-ROM XA information
    pub xa: Option<CdromXa>,

    /// CD-i system area
    pub cdi_system_area: Option<CdiSystemArea>,

    /// Amiga protection bits
    pub amiga_protection: Option<AmigaProtection>,

    /// Amiga file comment
    pub amiga_comment: Option<Vec<u8>>,

    /// Rock Ridge timestamps
    pub rrip_timestamps: RripTimestamps,

    /// Rock Ridge alternate name still being assembled from NM records
    pub pending_alternate_name: Option<Vec<u8>>,

    /// Rock Ridge relocated directory (RE)
    pub relocated: bool,
}

impl DecodedDirectoryEntry {
    /// Is this a directory?
    pub fn is_directory(&self) -> bool {
        self.flags.directory
    }

    /// Is this a regular file?
    pub fn is_file(&self) -> bool {
        !self.flags.directory && self.symbolic_link.is_none()
    }

    /// Is this a symbolic link?
    pub fn is_symlink(&self) -> bool {
        self.symbolic_link.is_some()
    }

    /// Is this hidden?
    pub fn is_hidden(&self) -> bool {
        self.flags.hidden
    }
}

/// Path table record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTableEntry {
    /// Directory identifier
    pub name: String,

    /// First sector of the directory
    pub extent: u32,

    /// Extended attribute record length
    pub xattr_length: u8,

    /// 1-based index of the parent directory
    pub parent_index: u16,
}
