//! Page level access to the external flash driver
//!
//! Any [`NorFlash`] implementation can back the userdata area. Pages are
//! programmed whole, and the erase sector containing a page is cleared when
//! its first page is written, so a record rewrite always starts from erased
//! flash.

use embedded_storage::nor_flash::{NorFlash, NorFlashError, ReadNorFlash};

use crate::Error;

/// Read `buf.len()` bytes starting at a byte offset
pub fn read_page<F: ReadNorFlash>(flash: &mut F, offset: u32, buf: &mut [u8]) -> Result<(), Error> {
    crate::trace!("Flash read offset: 0x{:08x} ({} bytes)", offset, buf.len());

    flash.read(offset, buf).map_err(|e| {
        crate::error!("Flash read error at offset 0x{:08x}", offset);
        Error::FlashRead { offset, kind: e.kind() }
    })
}

/// Program one page, erasing its sector first when the page opens a sector
pub fn write_page<F: NorFlash, const PAGE: usize>(
    flash: &mut F,
    page: u32,
    data: &[u8; PAGE],
) -> Result<(), Error> {
    let offset = page * PAGE as u32;

    if offset % F::ERASE_SIZE as u32 == 0 {
        crate::debug!("Erase sector at 0x{:08x}", offset);

        flash
            .erase(offset, offset + F::ERASE_SIZE as u32)
            .map_err(|e| {
                crate::error!("Flash erase error at page {}", page);
                Error::FlashWrite { page, kind: e.kind() }
            })?;
    }

    crate::trace!("Flash write page: {} (offset 0x{:08x})", page, offset);

    flash.write(offset, data).map_err(|e| {
        crate::error!("Flash write error at page {}", page);
        Error::FlashWrite { page, kind: e.kind() }
    })
}
