use embedded_storage::nor_flash::NorFlash;

use crate::config::{StoreConfig, MAX_USERDATA_ENTRY, PAGE_SIZE};
use crate::persist::Persist;
use crate::record::{self, RecordType};
use crate::state::ConfigState;
use crate::transfer::{PageReader, PageWriter};
use crate::Error;

/// Slot indexed userdata store over a flash device
///
/// Slots `0..=MAX_PROFILE` hold profile records, the last slot holds the
/// init configuration. Each slot starts on an erase sector boundary.
pub struct Userdata<F, const PAGE: usize = { PAGE_SIZE }> {
    flash: F,
    config: StoreConfig,
}

impl<F: NorFlash, const PAGE: usize> Userdata<F, PAGE> {
    /// Create a store over the provided flash with the provided configuration
    ///
    /// Slots must start on an erase sector boundary and span whole pages.
    pub fn new(flash: F, config: StoreConfig) -> Result<Self, Error> {
        let align = |v: u32| v % F::ERASE_SIZE as u32 == 0 && v % PAGE as u32 == 0;

        if !align(config.base_offset) {
            crate::error!("Userdata offset 0x{:08x} is not sector aligned", config.base_offset);
            return Err(Error::InvalidOffset(config.base_offset));
        }

        if config.sector_size == 0 || !align(config.sector_size) {
            crate::error!("Userdata slot size 0x{:08x} is not a sector multiple", config.sector_size);
            return Err(Error::InvalidSectorSize(config.sector_size));
        }

        Ok(Self { flash, config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Release the underlying flash
    pub fn into_inner(self) -> F {
        self.flash
    }

    fn check_slot(slot: u8) -> Result<RecordType, Error> {
        if slot > MAX_USERDATA_ENTRY {
            crate::warn!("Invalid userdata entry {}", slot);
            return Err(Error::InvalidSlot(slot));
        }

        Ok(RecordType::for_slot(slot))
    }

    /// Persist the live state into a slot
    ///
    /// Pages already programmed when a write fails are not rolled back.
    pub fn save<A, V, const MODES: usize>(
        &mut self,
        slot: u8,
        state: &ConfigState<A, V, MODES>,
    ) -> Result<usize, Error>
    where
        A: Persist,
        V: Persist,
    {
        let kind = Self::check_slot(slot)?;

        let len = record::record_len::<A, V, MODES>(kind) as u32;
        if len > self.config.sector_size {
            crate::error!("Entry {} record of {} bytes does not fit slot", slot, len);
            return Err(Error::RecordTooLarge {
                len,
                sector_size: self.config.sector_size,
            });
        }

        let page = self.config.slot_page::<PAGE>(slot);

        let mut w = PageWriter::<F, PAGE>::new(&mut self.flash, page);
        record::encode(&mut w, self.config.version, kind, state)?;
        let n = w.finish()?;

        match kind {
            RecordType::InitConfig => crate::info!("Initconfig data written ({} bytes)", n),
            RecordType::Profile => crate::info!("Profile {} data written ({} bytes)", slot, n),
        }

        Ok(n)
    }

    /// Restore the live state from a slot
    ///
    /// Returns [`Error::NotFound`] for slots never written. Any validation
    /// failure leaves the live state untouched.
    pub fn load<A, V, const MODES: usize>(
        &mut self,
        slot: u8,
        state: &mut ConfigState<A, V, MODES>,
    ) -> Result<RecordType, Error>
    where
        A: Persist + Clone,
        V: Persist + Clone,
    {
        let kind = Self::check_slot(slot)?;
        let offset = self.config.slot_offset(slot);

        let mut r = PageReader::<F, PAGE>::open(&mut self.flash, offset)?;

        match record::decode(&mut r, self.config.version, kind, state) {
            Ok(()) => (),
            Err(Error::NotFound) => {
                crate::debug!("No userdata found on entry {}", slot);
                return Err(Error::NotFound);
            }
            Err(Error::IncompatibleVersion { expected, found }) => {
                crate::warn!(
                    "Entry {} data version {}.{} does not match fw {}.{}",
                    slot,
                    found.major,
                    found.minor,
                    expected.major,
                    expected.minor
                );
                return Err(Error::IncompatibleVersion { expected, found });
            }
            Err(e) => {
                crate::warn!("Entry {} rejected", slot);
                return Err(e);
            }
        }

        let n = record::record_len::<A, V, MODES>(kind);
        match kind {
            RecordType::InitConfig => crate::info!("Initconfig data read ({} bytes)", n),
            RecordType::Profile => crate::info!("Profile {} data read ({} bytes)", slot, n),
        }

        Ok(kind)
    }
}
