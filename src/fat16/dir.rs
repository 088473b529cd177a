use packing::{Packed, PackedSize};

use super::{FIRST_CLUSTER, PROFILE_VOLUME};

bitflags::bitflags! {
    pub struct Attrs: u8 {
        const READ_ONLY = 0x01;
        const HIDDEN = 0x02;
        const SYSTEM = 0x04;
        const VOLUME_LABEL=0x08;
        const SUBDIR = 0x10;
        const ARCHIVE = 0x20;
        const DEVICE = 0x40;
    }
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Packed)]
#[packed(little_endian, lsb0)]
pub struct DirectoryEntry {
    /// 8.3 name, space padded, without the dot
    #[pkd(7, 0, 0, 10)]
    pub name: [u8; 11],

    #[pkd(7, 0, 11, 11)]
    pub attrs: u8,

    #[pkd(7, 0, 12, 12)]
    _reserved: u8,

    /// Creation time in 10 ms units
    #[pkd(7, 0, 13, 13)]
    pub create_time_fine: u8,

    #[pkd(7, 0, 14, 15)]
    pub create_time: u16,

    #[pkd(7, 0, 16, 17)]
    pub create_date: u16,

    #[pkd(7, 0, 18, 19)]
    pub last_access_date: u16,

    #[pkd(7, 0, 20, 21)]
    pub high_start_cluster: u16,

    #[pkd(7, 0, 22, 23)]
    pub update_time: u16,

    #[pkd(7, 0, 24, 25)]
    pub update_date: u16,

    #[pkd(7, 0, 26, 27)]
    pub start_cluster: u16,

    #[pkd(7, 0, 28, 31)]
    pub size: u32,
}

/// Encode a date in FAT format
pub const fn fat_date(year: u16, month: u16, day: u16) -> u16 {
    ((year - 1980) << 9) | (month << 5) | day
}

/// Encode a time of day in FAT format (two second resolution)
pub const fn fat_time(hours: u16, minutes: u16, seconds: u16) -> u16 {
    (hours << 11) | (minutes << 5) | (seconds / 2)
}

/// Directory entry of the exported profile file
pub const PROFILE_DIRENT: DirectoryEntry = DirectoryEntry {
    name: *b"OSSCPROFBIN",
    attrs: Attrs::ARCHIVE.bits(),
    _reserved: 0,
    create_time_fine: 142,
    create_time: fat_time(22, 40, 8),
    create_date: fat_date(2020, 11, 15),
    last_access_date: fat_date(2020, 11, 15),
    high_start_cluster: 0,
    update_time: fat_time(17, 8, 46),
    update_date: fat_date(2020, 11, 15),
    start_cluster: FIRST_CLUSTER,
    size: PROFILE_VOLUME.file_size(),
};

/// Encoded profile directory entry
pub fn profile_dirent() -> [u8; <DirectoryEntry as PackedSize>::BYTES] {
    let mut b = [0u8; <DirectoryEntry as PackedSize>::BYTES];

    let packed = PROFILE_DIRENT.pack(&mut b);
    debug_assert!(packed.is_ok(), "directory entry layout");

    b
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const REFERENCE: [u8; 32] = [
        0x4f, 0x53, 0x53, 0x43, 0x50, 0x52, 0x4f, 0x46, 0x42, 0x49, 0x4e, 0x20,
        0x00, 0x8e, 0x04, 0xb5, 0x6f, 0x51, 0x6f, 0x51, 0x00, 0x00, 0x17, 0x89,
        0x6f, 0x51, 0x02, 0x00, 0x00, 0x00, 0x10, 0x00,
    ];

    #[test]
    fn profile_entry_bytes() {
        assert_eq!(profile_dirent(), REFERENCE);
    }

    #[test]
    fn fat_timestamps() {
        assert_eq!(fat_date(2020, 11, 15), 0x516F);
        assert_eq!(fat_time(22, 40, 8), 0xB504);
        assert_eq!(fat_time(17, 8, 46), 0x8917);
    }
}
