use core::cell::RefCell;

use embedded_storage::nor_flash::ReadNorFlash;
use packing::PackedSize;
use usbd_scsi::{BlockDevice, BlockDeviceError};

use super::{
    generate_boot_sector, profile_dirent, DirectoryEntry, FatChunks, PROFILE_VOLUME, SECTOR_SIZE,
};
use crate::flash::read_page;

/// Read only FAT16 volume presenting a flash region as `OSSCPROF.BIN`
///
/// Blocks are generated on request: the boot sector, both FAT copies and the
/// root directory come from the fixed geometry, data clusters are read from
/// flash starting at `data_offset`.
pub struct ProfileVolume<F> {
    flash: RefCell<F>,
    data_offset: u32,
}

impl<F: ReadNorFlash> ProfileVolume<F> {
    /// Create a volume exporting the flash region starting at `data_offset`
    pub fn new(flash: F, data_offset: u32) -> Self {
        Self {
            flash: RefCell::new(flash),
            data_offset,
        }
    }

    /// Release the underlying flash
    pub fn into_inner(self) -> F {
        self.flash.into_inner()
    }
}

/// [`BlockDevice`] implementation for use with [`usbd_scsi`]
impl<F: ReadNorFlash> BlockDevice for ProfileVolume<F> {
    const BLOCK_BYTES: usize = SECTOR_SIZE;

    /// Read a file system block
    fn read_block(&self, lba: u32, block: &mut [u8]) -> Result<(), BlockDeviceError> {
        let block: &mut [u8; SECTOR_SIZE] = block
            .try_into()
            .map_err(|_| BlockDeviceError::InvalidAddress)?;

        if lba > self.max_lba() {
            crate::warn!("Read past end of volume, lba: {}", lba);
            return Err(BlockDeviceError::InvalidAddress);
        }

        crate::trace!("Volume reading lba: {}", lba);

        // Clear the buffer since we're sending all of it
        for b in block.iter_mut() {
            *b = 0
        }

        let g = PROFILE_VOLUME;

        // Block 0 is the fat boot block
        if lba == 0 {
            generate_boot_sector(block);

        } else if lba < g.start_fat0() {
            // Reserved sectors stay empty

        // File allocation table copies follow the reserved area
        } else if lba < g.start_rootdir() {
            let section_index = (lba - g.start_fat0()) % g.sectors_per_fat as u32;

            crate::debug!("Read FAT section index: {}", section_index);

            // Sectors past the file chain are free
            if let Some(chunk) = FatChunks::new().nth(section_index as usize) {
                *block = chunk;
            }

        // Directory entries follow
        } else if lba < g.start_clusters() {
            if lba == g.start_rootdir() {
                block[..DirectoryEntry::BYTES].copy_from_slice(&profile_dirent());
            }

        // Then finally clusters (containing actual data)
        } else {
            let offset = (lba - g.start_clusters()) * SECTOR_SIZE as u32;

            if offset < g.file_size() {
                crate::debug!("Read file offset: 0x{:06x} (lba: 0x{:04x})", offset, lba);

                let mut flash = self.flash.borrow_mut();
                read_page(&mut *flash, self.data_offset + offset, block).map_err(|_| {
                    crate::error!("Failed to read profile data at 0x{:06x}", offset);
                    BlockDeviceError::HardwareError
                })?;
            }
        }

        Ok(())
    }

    /// Write a file system block
    fn write_block(&mut self, lba: u32, _block: &[u8]) -> Result<(), BlockDeviceError> {
        crate::warn!("Attempted write to read only volume, lba: {}", lba);
        Err(BlockDeviceError::WriteError)
    }

    /// Report the maximum block index for the file system
    fn max_lba(&self) -> u32 {
        PROFILE_VOLUME.total_sectors as u32 - 1
    }
}
