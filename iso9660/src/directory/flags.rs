//! File flag bits

use crate::types::FileFlags;

impl FileFlags {
    /// Hidden (existence) bit
    pub const HIDDEN: u8 = 0x01;
    /// Directory bit
    pub const DIRECTORY: u8 = 0x02;
    /// Associated file bit
    pub const ASSOCIATED: u8 = 0x04;
    /// Record format bit
    pub const RECORD: u8 = 0x08;
    /// Protection bit
    pub const PROTECTION: u8 = 0x10;
    /// Multi-extent bit
    pub const MULTI_EXTENT: u8 = 0x80;

    /// Parse from raw byte
    pub fn from_byte(byte: u8) -> Self {
        Self {
            hidden: byte & Self::HIDDEN != 0,
            directory: byte & Self::DIRECTORY != 0,
            associated: byte & Self::ASSOCIATED != 0,
            record: byte & Self::RECORD != 0,
            protection: byte & Self::PROTECTION != 0,
            multi_extent: byte & Self::MULTI_EXTENT != 0,
        }
    }

    /// Same flags with the associated bit cleared
    pub fn without_associated(self) -> Self {
        Self {
            associated: false,
            ..self
        }
    }
}
