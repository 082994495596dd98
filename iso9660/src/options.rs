//! Mount configuration
//!
//! [`MountOptions`] is what a caller hands to [`crate::Iso9660Fs::mount`].
//! It is resolved against the probed volume into [`DecodeSettings`], which
//! every decoder takes by reference.

use alloc::string::String;

use crate::types::{DirectoryLayout, VolumeInfo};

/// Name space presented to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Primary volume names, `;1` version suffix hidden
    Normal,
    /// Primary volume names with VMS version numbers kept
    Vms,
    /// Joliet UCS-2 names from the supplementary volume
    Joliet,
    /// Rock Ridge alternate names
    Rrip,
    /// Romeo long single-byte names
    Romeo,
}

/// Single-byte text encoding for non-Joliet names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// ISO-8859-1, every byte maps to the code point of the same value
    #[default]
    Iso8859_1,
    /// UTF-8, invalid sequences replaced (Rock Ridge names on Linux media)
    Utf8,
}

/// Caller-supplied mount configuration
#[derive(Debug, Clone)]
pub struct MountOptions {
    /// Name space to present, `None` to choose from what the volume carries
    pub namespace: Option<Namespace>,

    /// List subdirectories from the path table instead of directory records
    pub use_path_table: bool,

    /// Apply TRANS.TBL translation files
    pub use_trans_tbl: bool,

    /// Encoding of single-byte names
    pub encoding: TextEncoding,

    /// Host name substituted for network-name link and name components
    pub host_name: String,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            namespace: None,
            use_path_table: false,
            use_trans_tbl: false,
            encoding: TextEncoding::default(),
            host_name: String::from("localhost"),
        }
    }
}

/// Resolved configuration consumed by the decoders
#[derive(Debug, Clone)]
pub struct DecodeSettings {
    /// Record layout
    pub layout: DirectoryLayout,

    /// Active name space
    pub namespace: Namespace,

    /// Names are UTF-16BE (Joliet hierarchy)
    pub joliet: bool,

    /// Subdirectories come from the path table
    pub use_path_table: bool,

    /// Apply TRANS.TBL translation files
    pub use_trans_tbl: bool,

    /// Encoding of single-byte names
    pub encoding: TextEncoding,

    /// Host name for network-name components
    pub host_name: String,

    /// Volume size in sectors, 0 if unknown
    pub volume_sectors: u32,
}

impl Default for DecodeSettings {
    fn default() -> Self {
        Self::resolve(&MountOptions::default(), &VolumeInfo::default())
    }
}

impl DecodeSettings {
    /// Resolve caller options against a probed volume
    pub fn resolve(options: &MountOptions, volume: &VolumeInfo) -> Self {
        let namespace = options.namespace.unwrap_or({
            if volume.has_joliet() && volume.layout == DirectoryLayout::Iso9660 {
                Namespace::Joliet
            } else if volume.has_rock_ridge {
                Namespace::Rrip
            } else {
                Namespace::Normal
            }
        });

        // Joliet names only exist on ECMA-119 volumes with a Joliet descriptor
        let joliet = namespace == Namespace::Joliet
            && volume.has_joliet()
            && volume.layout == DirectoryLayout::Iso9660;

        Self {
            layout: volume.layout,
            namespace,
            joliet,
            use_path_table: options.use_path_table,
            use_trans_tbl: options.use_trans_tbl,
            encoding: options.encoding,
            host_name: options.host_name.clone(),
            volume_sectors: volume.volume_space_size,
        }
    }

    /// Rock Ridge alternate names and relocation are honoured
    pub fn rock_ridge(&self) -> bool {
        self.namespace == Namespace::Rrip
    }
}
