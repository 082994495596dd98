//! Mounted filesystem session
//!
//! [`Iso9660Fs`] owns the block device, the resolved mount settings and a
//! [`DirectoryCache`]. Directories are decoded lazily the first time a path
//! through them is resolved and served from the cache afterwards.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use gpt_disk_io::BlockIo;
use log::debug;

use crate::directory::cache::{cache_key, DirectoryCache};
use crate::directory::path_table::PathTable;
use crate::directory::{display_name, find_entry, DirectoryDecoder, DirectoryListing};
use crate::error::{Iso9660Error, Result};
use crate::options::{DecodeSettings, MountOptions, Namespace};
use crate::types::{DecodedDirectoryEntry, Extent, FileFlags, VolumeInfo, VolumeRoot};
use crate::utils::sector::{sectors_for_bytes, SectorReader};
use crate::volume;

/// A mounted ISO9660-family volume
///
/// # Example
/// ```ignore
/// let mut fs = Iso9660Fs::mount(device, 0, MountOptions::default())?;
/// let names = fs.read_dir("/")?;
/// ```
pub struct Iso9660Fs<B: BlockIo> {
    block_io: B,
    start_sector: u64,
    volume: VolumeInfo,
    settings: DecodeSettings,
    root: VolumeRoot,
    path_table: Option<PathTable>,
    cache: DirectoryCache,
    mounted: bool,
}

impl<B: BlockIo> Iso9660Fs<B> {
    /// Probe the volume at `start_sector` and mount it
    pub fn mount(mut block_io: B, start_sector: u64, options: MountOptions) -> Result<Self> {
        let volume = volume::mount(&mut block_io, start_sector)?;
        Self::open(block_io, start_sector, volume, options)
    }

    /// Mount an already probed volume
    ///
    /// Loads the path table when enabled and decodes the root directory.
    pub fn open(
        mut block_io: B,
        start_sector: u64,
        volume: VolumeInfo,
        options: MountOptions,
    ) -> Result<Self> {
        let settings = DecodeSettings::resolve(&options, &volume);
        let root = match volume.joliet {
            Some(joliet) if settings.joliet => joliet,
            _ => volume.primary,
        };

        let path_table = if settings.use_path_table && root.path_table_size != 0 {
            let mut reader =
                SectorReader::new(&mut block_io, start_sector, settings.volume_sectors)?;
            Some(PathTable::load(
                &mut reader,
                root.path_table_lba,
                root.path_table_size,
                &settings,
            )?)
        } else {
            None
        };

        let mut fs = Self {
            block_io,
            start_sector,
            volume,
            settings,
            root,
            path_table,
            cache: DirectoryCache::new(),
            mounted: true,
        };

        let root_sectors = sectors_for_bytes(root.extent_len as u64);
        let listing = fs.load_directory(root.extent_lba, root_sectors, root.xattr_length, "")?;
        fs.cache.insert(String::new(), listing);

        debug!(
            "mounted {:?} in {:?} name space, {} root entries",
            fs.volume.volume_id,
            fs.settings.namespace,
            fs.cache.get("").map_or(0, |root| root.len())
        );

        Ok(fs)
    }

    /// List the names in the directory at `path`
    ///
    /// Names are in the active name space, in listing order.
    pub fn read_dir(&mut self, path: &str) -> Result<Vec<String>> {
        let namespace = self.settings.namespace;
        let listing = self.directory(path)?;

        Ok(listing
            .values()
            .map(|entry| String::from(display_name(entry, namespace)))
            .collect())
    }

    /// Decoded listing of the directory at `path`, decoding it if needed
    pub fn directory(&mut self, path: &str) -> Result<&DirectoryListing> {
        if !self.mounted {
            return Err(Iso9660Error::AccessDenied);
        }

        let key = cache_key(path);
        if !self.cache.contains(&key) {
            self.resolve(&key)?;
        }

        self.cache.get(&key).ok_or(Iso9660Error::InternalError)
    }

    /// Entry at `path`; `/` yields a synthetic root entry
    pub fn stat(&mut self, path: &str) -> Result<DecodedDirectoryEntry> {
        if !self.mounted {
            return Err(Iso9660Error::AccessDenied);
        }

        let key = cache_key(path);
        let Some((parent, name)) = split_last(&key) else {
            return Ok(self.root_entry());
        };

        let namespace = self.settings.namespace;
        let listing = self.directory(parent)?;
        find_entry(listing, name, namespace)
            .cloned()
            .ok_or(Iso9660Error::NoSuchFile)
    }

    /// Drop the cache; later calls fail with `AccessDenied`
    pub fn unmount(&mut self) {
        self.cache.clear();
        self.path_table = None;
        self.mounted = false;
        debug!("unmounted {:?}", self.volume.volume_id);
    }

    /// Is the volume mounted?
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Active name space
    pub fn namespace(&self) -> Namespace {
        self.settings.namespace
    }

    /// Probed volume information
    pub fn volume(&self) -> &VolumeInfo {
        &self.volume
    }

    /// Resolved mount settings
    pub fn settings(&self) -> &DecodeSettings {
        &self.settings
    }

    /// Number of directories decoded so far
    pub fn cached_directories(&self) -> usize {
        self.cache.len()
    }

    /// Give the block device back
    pub fn into_inner(self) -> B {
        self.block_io
    }

    fn root_entry(&self) -> DecodedDirectoryEntry {
        DecodedDirectoryEntry {
            filename: String::from("/"),
            size: self.root.extent_len as u64,
            flags: FileFlags {
                directory: true,
                ..FileFlags::default()
            },
            extents: vec![Extent::new(self.root.extent_lba, self.root.extent_len)],
            xattr_length: self.root.xattr_length,
            ..DecodedDirectoryEntry::default()
        }
    }

    /// Decode and cache every directory along `key`
    fn resolve(&mut self, key: &str) -> Result<()> {
        let namespace = self.settings.namespace;
        let mut current = String::new();

        for component in key.split('/').filter(|c| !c.is_empty()) {
            let next = if current.is_empty() {
                String::from(component)
            } else {
                format!("{}/{}", current, component)
            };

            if !self.cache.contains(&next) {
                let (extent, size, xattr_length) = {
                    let parent = self
                        .cache
                        .get(&current)
                        .ok_or(Iso9660Error::InternalError)?;
                    let entry =
                        find_entry(parent, component, namespace).ok_or(Iso9660Error::NoSuchFile)?;
                    if !entry.is_directory() {
                        return Err(Iso9660Error::NotDirectory);
                    }
                    let extent = entry
                        .extents
                        .first()
                        .copied()
                        .ok_or(Iso9660Error::InvalidArgument)?;
                    (extent, entry.size, entry.xattr_length)
                };

                let listing =
                    self.load_directory(extent.lba, sectors_for_bytes(size), xattr_length, &next)?;
                self.cache.insert(next.clone(), listing);
            }

            current = next;
        }

        Ok(())
    }

    /// Decode a directory and overlay the subdirectories the path table records
    fn load_directory(
        &mut self,
        lba: u32,
        sector_count: u32,
        xattr_length: u8,
        path: &str,
    ) -> Result<DirectoryListing> {
        let mut decoder =
            DirectoryDecoder::new(&mut self.block_io, self.start_sector, &self.settings)?;
        let mut listing = decoder.decode(lba, sector_count, xattr_length)?;

        if let Some(table) = &self.path_table {
            for entry in decoder.path_table_subdirectories(table, path)? {
                listing.insert(entry.filename.clone(), entry);
            }
        }

        Ok(listing)
    }
}

/// Split a cache key into parent key and last component
fn split_last(key: &str) -> Option<(&str, &str)> {
    if key.is_empty() {
        return None;
    }

    Some(match key.rsplit_once('/') {
        Some((parent, name)) => (parent, name),
        None => ("", key),
    })
}
