//! Sector alignment, calculation and reading utilities

use alloc::vec;
use alloc::vec::Vec;

use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;
use log::warn;

use crate::error::{Iso9660Error, Result};
use crate::types::SECTOR_SIZE;

/// Calculate number of sectors needed for byte count
pub fn sectors_for_bytes(byte_count: u64) -> u32 {
    byte_count.div_ceil(SECTOR_SIZE as u64) as u32
}

/// Reads 2048-byte logical sectors of an ISO image from a block device
///
/// Sector numbers are relative to `start_sector`, the logical sector where
/// the image begins on the device (0 for a raw image). Devices with smaller
/// blocks are read several blocks per logical sector.
pub struct SectorReader<'a, B: BlockIo> {
    block_io: &'a mut B,
    start_sector: u64,
    blocks_per_sector: u64,
    volume_sectors: u32,
}

impl<'a, B: BlockIo> SectorReader<'a, B> {
    /// Create a reader, `volume_sectors` 0 disables range checks
    pub fn new(block_io: &'a mut B, start_sector: u64, volume_sectors: u32) -> Result<Self> {
        let block_size = block_io.block_size().to_u32() as usize;
        if block_size == 0 || block_size > SECTOR_SIZE || SECTOR_SIZE % block_size != 0 {
            return Err(Iso9660Error::UnsupportedBlockSize);
        }

        Ok(Self {
            block_io,
            start_sector,
            blocks_per_sector: (SECTOR_SIZE / block_size) as u64,
            volume_sectors,
        })
    }

    /// Read `count` consecutive logical sectors starting at `lba`
    pub fn read(&mut self, lba: u64, count: u32) -> Result<Vec<u8>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        if self.volume_sectors != 0 && lba + count as u64 > self.volume_sectors as u64 {
            warn!(
                "sectors {}..{} lie past the end of a {} sector volume",
                lba,
                lba + count as u64,
                self.volume_sectors
            );
            return Err(Iso9660Error::ExtentOutOfBounds);
        }

        let mut buffer = vec![0u8; count as usize * SECTOR_SIZE];
        let block = (self.start_sector + lba) * self.blocks_per_sector;
        self.block_io
            .read_blocks(Lba(block), &mut buffer)
            .map_err(|e| {
                warn!("read of {} sectors at {} failed: {:?}", count, lba, e);
                Iso9660Error::IoError
            })?;

        Ok(buffer)
    }

    /// Read a single logical sector
    pub fn read_sector(&mut self, lba: u64) -> Result<Vec<u8>> {
        self.read(lba, 1)
    }
}
