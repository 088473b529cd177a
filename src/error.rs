use embedded_storage::nor_flash::NorFlashErrorKind;
use thiserror::Error;

use crate::config::Version;

/// Header and payload validation failures reported by the record codec
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// The record does not start with the userdata key
    #[error("userdata key mismatch")]
    MagicMismatch,

    /// The record was written by a different firmware version
    #[error("data version {found} does not match fw {expected}")]
    VersionMismatch { expected: Version, found: Version },

    /// The record type is unknown or does not belong in the slot
    #[error("unknown userdata entry type {0}")]
    UnknownType(u32),

    /// A payload length field does not match the compiled-in layout
    #[error("payload length {found} does not match expected {expected}")]
    LengthMismatch { expected: u16, found: u16 },
}

/// Errors returned by userdata store and transfer operations.
///
/// `NotFound` is the normal first-boot condition for a slot and does not
/// indicate a fault.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The userdata area has to start on an erase sector and page boundary
    #[error("invalid userdata offset {0:#x}")]
    InvalidOffset(u32),

    /// Slots have to be a non-zero multiple of the erase sector and page sizes
    #[error("invalid userdata slot size {0:#x}")]
    InvalidSectorSize(u32),

    /// Slot index exceeds the last userdata entry
    #[error("invalid userdata entry {0}")]
    InvalidSlot(u8),

    /// The encoded record does not fit in one slot
    #[error("record of {len} bytes exceeds slot size {sector_size}")]
    RecordTooLarge { len: u32, sector_size: u32 },

    /// The flash driver failed to read
    #[error("flash read error at offset {offset:#x}: {kind:?}")]
    FlashRead { offset: u32, kind: NorFlashErrorKind },

    /// The flash driver failed to erase or program a page
    #[error("flash write error at page {page}: {kind:?}")]
    FlashWrite { page: u32, kind: NorFlashErrorKind },

    /// No userdata was ever written to the slot, or it holds foreign data
    #[error("no userdata found")]
    NotFound,

    /// Userdata exists but belongs to a different firmware version
    #[error("data version {found} does not match fw {expected}")]
    IncompatibleVersion { expected: Version, found: Version },

    /// Record type is unknown or does not belong in the slot
    #[error("unknown userdata entry type {0}")]
    UnknownType(u32),

    /// Record is present but its payload layout is stale
    #[error("payload length {found} does not match expected {expected}")]
    LengthMismatch { expected: u16, found: u16 },

    /// A caller supplied buffer cannot hold the encoded record
    #[error("buffer too small")]
    BufferTooSmall,

    /// A fixed layout could not be packed or unpacked
    #[error("fixed layout encoding failed")]
    Layout,
}

impl From<RecordError> for Error {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::MagicMismatch => Error::NotFound,
            RecordError::VersionMismatch { expected, found } => {
                Error::IncompatibleVersion { expected, found }
            }
            RecordError::UnknownType(t) => Error::UnknownType(t),
            RecordError::LengthMismatch { expected, found } => {
                Error::LengthMismatch { expected, found }
            }
        }
    }
}
