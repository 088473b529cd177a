use packing::{Packed, PackedSize};

use super::{PROFILE_VOLUME, SECTOR_SIZE};

/// Encodable Boot Block object
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[cfg_attr(feature="defmt", derive(defmt::Format))]
#[packed(little_endian, lsb0)]
pub struct FatBootBlock {
    #[pkd(7, 0, 0, 2)]
    pub jump_instruction: [u8; 3],

    #[pkd(7, 0, 3, 10)]
    pub oem_info: [u8; 8],

    #[pkd(7, 0, 11, 12)]
    pub bytes_per_sector: u16,

    #[pkd(7, 0, 13, 13)]
    pub sectors_per_cluster: u8,

    #[pkd(7, 0, 14, 15)]
    pub reserved_sectors: u16,

    #[pkd(7, 0, 16, 16)]
    pub fat_copies: u8,

    #[pkd(7, 0, 17, 18)]
    pub root_directory_entries: u16,

    #[pkd(7, 0, 19, 20)]
    pub total_sectors16: u16,

    #[pkd(7, 0, 21, 21)]
    pub media_descriptor: u8,

    #[pkd(7, 0, 22, 23)]
    pub sectors_per_fat: u16,

    #[pkd(7, 0, 24, 25)]
    pub sectors_per_track: u16,

    #[pkd(7, 0, 26, 27)]
    pub heads: u16,

    #[pkd(7, 0, 28, 31)]
    pub hidden_sectors: u32,

    #[pkd(7, 0, 32, 35)]
    pub total_sectors32: u32,

    #[pkd(7, 0, 36, 36)]
    pub physical_drive_num: u8,

    #[pkd(7, 0, 37, 37)]
    _reserved: u8,

    #[pkd(7, 0, 38, 38)]
    pub extended_boot_sig: u8,

    #[pkd(7, 0, 39, 42)]
    pub volume_serial_number: u32,

    #[pkd(7, 0, 43, 53)]
    pub volume_label: [u8; 11],

    #[pkd(7, 0, 54, 61)]
    pub filesystem_identifier: [u8; 8],
}

/// Boot block of the exported profile volume.
///
/// The jump instruction is left zeroed, the volume is never booted.
pub const PROFILE_BOOT_BLOCK: FatBootBlock = FatBootBlock {
    jump_instruction: [0x00; 3],
    oem_info: *b"MSWIN4.1",
    bytes_per_sector: SECTOR_SIZE as u16,
    sectors_per_cluster: PROFILE_VOLUME.sectors_per_cluster,
    reserved_sectors: PROFILE_VOLUME.reserved_sectors,
    fat_copies: PROFILE_VOLUME.fat_copies,
    root_directory_entries: PROFILE_VOLUME.root_entries,
    total_sectors16: PROFILE_VOLUME.total_sectors,
    media_descriptor: 0xF8,
    sectors_per_fat: PROFILE_VOLUME.sectors_per_fat,
    sectors_per_track: 63,
    heads: 255,
    hidden_sectors: 0,
    total_sectors32: 0,
    physical_drive_num: 0x80,
    _reserved: 0,
    extended_boot_sig: 0x29,
    volume_serial_number: 0x04C6_CFF4,
    volume_label: *b"OSSCPROFILS",
    filesystem_identifier: *b"FAT16   ",
};

/// Fill a sector with the profile volume boot sector
///
/// The boot code region is zeroed and the `0xAA55` signature written at 510.
pub fn generate_boot_sector(block: &mut [u8; SECTOR_SIZE]) {
    let packed = PROFILE_BOOT_BLOCK.pack(&mut block[..FatBootBlock::BYTES]);
    debug_assert!(packed.is_ok(), "boot block layout");

    for b in &mut block[FatBootBlock::BYTES..510] {
        *b = 0;
    }

    block[510..].copy_from_slice(&0xAA55u16.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Bytes 0x003..=0x01a of the reference sector
    const BEG_BPB: [u8; 24] = [
        0x4d, 0x53, 0x57, 0x49, 0x4e, 0x34, 0x2e, 0x31,
        0x00, 0x02, 0x04, 0x80, 0x00, 0x02, 0x00, 0x08,
        0x00, 0x80, 0xf8, 0x20, 0x00, 0x3f, 0x00, 0xff,
    ];

    /// Bytes 0x024..=0x03d of the reference sector
    const AFTER_BPB: [u8; 26] = [
        0x80, 0x00, 0x29, 0xf4, 0xcf, 0xc6, 0x04, 0x4f, 0x53, 0x53, 0x43, 0x50,
        0x52, 0x4f, 0x46, 0x49, 0x4c, 0x53, 0x46, 0x41, 0x54, 0x31, 0x36, 0x20,
        0x20, 0x20,
    ];

    #[test]
    fn boot_sector_bytes() {
        let mut block = [0u8; SECTOR_SIZE];
        generate_boot_sector(&mut block);

        let mut expected = [0u8; SECTOR_SIZE];
        expected[3..27].copy_from_slice(&BEG_BPB);
        expected[36..62].copy_from_slice(&AFTER_BPB);
        expected[510] = 0x55;
        expected[511] = 0xAA;

        assert_eq!(&block[..], &expected[..]);
    }

    #[test]
    fn boot_sector_is_deterministic() {
        let mut a = [0u8; SECTOR_SIZE];
        let mut b = [0xA5u8; SECTOR_SIZE];
        generate_boot_sector(&mut a);
        generate_boot_sector(&mut b);

        assert_eq!(&a[..], &b[..]);
        assert_eq!(&a[510..], &[0x55, 0xAA]);
    }

    #[test]
    fn boot_block_roundtrip() {
        let mut block = [0u8; SECTOR_SIZE];
        generate_boot_sector(&mut block);

        let bb = FatBootBlock::unpack(&block[..FatBootBlock::BYTES]).unwrap();
        assert_eq!(bb, PROFILE_BOOT_BLOCK);
        assert_eq!(bb.bytes_per_sector, 512);
        assert_eq!(bb.root_directory_entries, 2048);
        assert_eq!(bb.total_sectors16, 32768);
    }
}
