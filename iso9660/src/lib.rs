//! ISO9660 Family Directory Decoder
//!
//! A `no_std` reader for the directory structures of the ISO9660 filesystem
//! family: plain ISO9660, Joliet, Romeo, VMS, Rock Ridge (RRIP), High Sierra
//! and CD-i.
//!
//! # Overview
//!
//! This crate turns raw 2048-byte logical sectors into a navigable, cached
//! directory hierarchy for read-only browsing of disc images:
//! - Volume descriptor probing (Primary, Joliet Supplementary, High Sierra, CD-i)
//! - Directory record decoding for the three on-disk record layouts
//! - System Use area parsing (SUSP, Rock Ridge, Apple, CD-ROM XA, Amiga)
//! - Path table loading and path-table driven subdirectory discovery
//! - Optional TRANS.TBL long name translation
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Sector layer** - [`utils::sector::SectorReader`] over any [`gpt_disk_io::BlockIo`]
//! 2. **Volume layer** - Parses volume descriptors from sectors 16+
//! 3. **Directory layer** - Decodes directory records and path tables
//! 4. **Extension layer** - Enriches entries from their System Use area
//! 5. **Filesystem layer** - [`Iso9660Fs`] resolves paths through a directory cache
//!
//! # Usage
//!
//! ```ignore
//! use iso9660::{Iso9660Fs, MountOptions, Namespace};
//!
//! let options = MountOptions {
//!     namespace: Some(Namespace::Rrip),
//!     ..MountOptions::default()
//! };
//!
//! // Mount ISO from block device at given start sector
//! let mut fs = Iso9660Fs::mount(block_io, 0, options)?;
//!
//! for name in fs.read_dir("/isolinux")? {
//!     let entry = fs.stat(&format!("/isolinux/{}", name))?;
//!     println!("{} {} bytes", name, entry.size);
//! }
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

pub mod error;
pub mod types;
pub mod options;
pub mod volume;
pub mod directory;
pub mod extensions;
pub mod fs;
pub mod utils;

pub use error::{Errno, Iso9660Error, Result};
pub use options::{DecodeSettings, MountOptions, Namespace, TextEncoding};
pub use types::{
    DecodedDirectoryEntry, DirectoryLayout, Extent, FileFlags, PathTableEntry, VolumeInfo,
};

// High-level API exports
pub use volume::mount;
pub use directory::{DirectoryDecoder, DirectoryListing};
pub use fs::Iso9660Fs;
