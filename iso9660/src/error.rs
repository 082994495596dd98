//! Error types for ISO9660 operations

use thiserror::Error;

/// Result type for ISO9660 operations
pub type Result<T> = core::result::Result<T, Iso9660Error>;

/// Errors that can occur during ISO9660 operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Iso9660Error {
    /// Operation attempted on a filesystem that is not mounted
    #[error("Filesystem is not mounted")]
    AccessDenied,

    /// A path component is absent from its parent listing
    #[error("No such file or directory")]
    NoSuchFile,

    /// A non-terminal path component is not a directory
    #[error("Not a directory")]
    NotDirectory,

    /// A directory's recorded extents are empty or unusable
    #[error("Invalid argument")]
    InvalidArgument,

    /// I/O error reading from block device
    #[error("I/O error reading block device")]
    IoError,

    /// Sector range lies outside the volume
    #[error("Extent out of bounds")]
    ExtentOutOfBounds,

    /// Corrupted directory record
    #[error("Corrupted directory record")]
    InvalidDirectoryRecord,

    /// Invalid path table record
    #[error("Corrupted path table")]
    InvalidPathTable,

    /// No recognised volume descriptor
    #[error("Invalid volume descriptor signature")]
    InvalidSignature,

    /// Unsupported volume descriptor version
    #[error("Unsupported ISO9660 version")]
    UnsupportedVersion,

    /// Device block size does not evenly divide the 2048-byte logical sector
    #[error("Unsupported device block size")]
    UnsupportedBlockSize,

    /// Internal error (should not occur)
    #[error("Internal error")]
    InternalError,
}

/// Status codes returned by the directory listing operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    /// Success
    NoError,
    /// Not mounted
    AccessDenied,
    /// Missing path component
    NoSuchFile,
    /// Path component is not a directory
    NotDirectory,
    /// Unreadable or inconsistent metadata
    InvalidArgument,
}

impl Iso9660Error {
    /// Project this error onto the listing status codes
    pub fn errno(&self) -> Errno {
        match self {
            Self::AccessDenied => Errno::AccessDenied,
            Self::NoSuchFile => Errno::NoSuchFile,
            Self::NotDirectory => Errno::NotDirectory,
            _ => Errno::InvalidArgument,
        }
    }
}

impl Errno {
    /// Status code of a listing result
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Errno::NoError,
            Err(e) => e.errno(),
        }
    }
}
