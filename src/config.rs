use core::fmt;

/// Highest slot index holding a profile record
pub const MAX_PROFILE: u8 = 11;

/// Highest userdata slot index
pub const MAX_USERDATA_ENTRY: u8 = 15;

/// Slot holding the init configuration record
pub const INIT_CONFIG_SLOT: u8 = MAX_USERDATA_ENTRY;

/// Profiles per input group when grouped profile mode is active
pub const PROFILE_GROUP_SIZE: u8 = 4;

/// Number of remembered profile selections (one per input group)
pub const PROFILE_GROUPS: usize = 3;

/// Number of remote control key codes in the key map
pub const REMOTE_MAX_KEYS: usize = 27;

/// Key marking the start of every userdata record
pub const USERDATA_KEY: [u8; 8] = *b"USRDATA\0";

/// Default flash page size in bytes
pub const PAGE_SIZE: usize = 256;

/// Firmware version stamped into record headers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Userdata area configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Byte offset of slot 0 in flash, must be sector aligned
    pub base_offset: u32,
    /// Size of one slot (flash erase sector), defaults to 64 KiB
    pub sector_size: u32,
    /// Firmware version written to and expected from records
    pub version: Version,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_offset: 0x0010_0000,
            sector_size: 0x0001_0000,
            version: Version::new(0, 0),
        }
    }
}

impl StoreConfig {
    /// Byte offset of a slot in flash
    pub const fn slot_offset(&self, slot: u8) -> u32 {
        self.base_offset + slot as u32 * self.sector_size
    }

    /// Index of the first flash page of a slot
    pub const fn slot_page<const PAGE: usize>(&self, slot: u8) -> u32 {
        self.slot_offset(slot) / PAGE as u32
    }

    /// Total size of the userdata area in bytes
    pub const fn area_size(&self) -> u32 {
        (MAX_USERDATA_ENTRY as u32 + 1) * self.sector_size
    }
}
