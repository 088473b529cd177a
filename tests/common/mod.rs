#![allow(dead_code)]

use embedded_storage::nor_flash::{
    ErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};

use osscfg::{AvInput, ConfigState, Error, Persist, Sink, Source, StoreConfig, Version};

pub const ERASE_SIZE: usize = 4096;

/// Store configuration over the mock flash, one erase sector per slot
pub fn store_config(version: Version) -> StoreConfig {
    StoreConfig {
        base_offset: 0,
        sector_size: ERASE_SIZE as u32,
        version,
    }
}

pub fn init_logging() {
    let _ = simplelog::TermLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
}

/// In memory NOR flash recording every operation
pub struct Flash {
    pub buf: Vec<u8>,
    pub fail_after_operation: usize,
    pub operations: Vec<Operation>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Operation {
    Read { offset: u32, len: usize },
    Write { offset: u32, len: usize },
    Erase { offset: u32, len: usize },
}

impl Flash {
    pub fn new(sectors: usize) -> Self {
        Self {
            buf: vec![0xFFu8; ERASE_SIZE * sectors],
            fail_after_operation: usize::MAX,
            operations: Vec::new(),
        }
    }

    pub fn new_with_fault(sectors: usize, fail_after_operation: usize) -> Self {
        Self {
            fail_after_operation,
            ..Self::new(sectors)
        }
    }

    pub fn writes(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, Operation::Write { .. }))
            .count()
    }

    pub fn reads(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, Operation::Read { .. }))
            .count()
    }

    pub fn clear_operations(&mut self) {
        self.operations.clear();
    }

    fn check_fault(&self) -> Result<(), FlashError> {
        if self.operations.len() >= self.fail_after_operation {
            println!("    flash: FAULT");
            return Err(FlashError);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct FlashError;

impl NorFlashError for FlashError {
    fn kind(&self) -> NorFlashErrorKind {
        NorFlashErrorKind::Other
    }
}

impl ErrorType for Flash {
    type Error = FlashError;
}

impl ReadNorFlash for Flash {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.check_fault()?;
        self.operations.push(Operation::Read {
            offset,
            len: bytes.len(),
        });

        let offset = offset as usize;
        bytes.copy_from_slice(&self.buf[offset..offset + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.buf.len()
    }
}

impl NorFlash for Flash {
    const WRITE_SIZE: usize = 1;

    const ERASE_SIZE: usize = ERASE_SIZE;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        assert!(from as usize % ERASE_SIZE == 0);
        assert!(to as usize % ERASE_SIZE == 0);

        self.check_fault()?;
        self.operations.push(Operation::Erase {
            offset: from,
            len: (to - from) as usize,
        });

        for b in &mut self.buf[from as usize..to as usize] {
            *b = 0xFF;
        }
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        self.check_fault()?;
        self.operations.push(Operation::Write {
            offset,
            len: bytes.len(),
        });

        // NOR flash can only clear bits
        let offset = offset as usize;
        for (i, &val) in bytes.iter().enumerate() {
            self.buf[offset + i] &= val;
        }
        Ok(())
    }
}

/// AV configuration block used by the tests
#[derive(Clone, Debug, PartialEq, Default)]
pub struct AvConfig {
    pub sl_mode: u8,
    pub sl_str: u8,
    pub h_mask: u16,
    pub v_mask: u16,
    pub tvp_hpll2x: bool,
    pub sync_vth: u8,
    pub vsync_thold: u8,
    pub pre_coast: u8,
    pub post_coast: u8,
    pub col: [u8; 6],
}

impl Persist for AvConfig {
    const SIZE: usize = 17;

    fn persist<S: Sink>(&self, sink: &mut S) -> Result<(), Error> {
        self.sl_mode.persist(sink)?;
        self.sl_str.persist(sink)?;
        self.h_mask.persist(sink)?;
        self.v_mask.persist(sink)?;
        self.tvp_hpll2x.persist(sink)?;
        self.sync_vth.persist(sink)?;
        self.vsync_thold.persist(sink)?;
        self.pre_coast.persist(sink)?;
        self.post_coast.persist(sink)?;
        self.col.persist(sink)
    }

    fn restore<S: Source>(&mut self, source: &mut S) -> Result<(), Error> {
        self.sl_mode.restore(source)?;
        self.sl_str.restore(source)?;
        self.h_mask.restore(source)?;
        self.v_mask.restore(source)?;
        self.tvp_hpll2x.restore(source)?;
        self.sync_vth.restore(source)?;
        self.vsync_thold.restore(source)?;
        self.pre_coast.restore(source)?;
        self.post_coast.restore(source)?;
        self.col.restore(source)
    }
}

impl AvConfig {
    pub fn random() -> Self {
        Self {
            sl_mode: rand::random(),
            sl_str: rand::random(),
            h_mask: rand::random(),
            v_mask: rand::random(),
            tvp_hpll2x: rand::random(),
            sync_vth: rand::random(),
            vsync_thold: rand::random(),
            pre_coast: rand::random(),
            post_coast: rand::random(),
            col: rand::random(),
        }
    }
}

/// Video mode descriptor used by the tests
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct VideoMode {
    pub name: [u8; 10],
    pub h_active: u16,
    pub v_active: u16,
    pub h_total: u16,
    pub v_total: u16,
    pub h_backporch: u8,
    pub v_backporch: u8,
    pub h_synclen: u8,
    pub v_synclen: u8,
    pub flags: u32,
}

impl Persist for VideoMode {
    const SIZE: usize = 26;

    fn persist<S: Sink>(&self, sink: &mut S) -> Result<(), Error> {
        sink.put(&self.name)?;
        sink.put_u16(self.h_active)?;
        sink.put_u16(self.v_active)?;
        sink.put_u16(self.h_total)?;
        sink.put_u16(self.v_total)?;
        sink.put(&[self.h_backporch, self.v_backporch, self.h_synclen, self.v_synclen])?;
        sink.put_u32(self.flags)
    }

    fn restore<S: Source>(&mut self, source: &mut S) -> Result<(), Error> {
        source.take(&mut self.name)?;
        self.h_active = source.take_u16()?;
        self.v_active = source.take_u16()?;
        self.h_total = source.take_u16()?;
        self.v_total = source.take_u16()?;
        self.h_backporch = source.take_u8()?;
        self.v_backporch = source.take_u8()?;
        self.h_synclen = source.take_u8()?;
        self.v_synclen = source.take_u8()?;
        self.flags = source.take_u32()?;
        Ok(())
    }
}

impl VideoMode {
    pub fn random() -> Self {
        Self {
            name: rand::random(),
            h_active: rand::random(),
            v_active: rand::random(),
            h_total: rand::random(),
            v_total: rand::random(),
            h_backporch: rand::random(),
            v_backporch: rand::random(),
            h_synclen: rand::random(),
            v_synclen: rand::random(),
            flags: rand::random(),
        }
    }
}

/// Number of video modes in the test table, spans several 256 byte pages
pub const VIDEO_MODES: usize = 30;

pub type State = ConfigState<AvConfig, VideoMode, VIDEO_MODES>;

pub fn empty_state() -> State {
    State::new(AvConfig::default(), [VideoMode::default(); VIDEO_MODES])
}

pub fn random_state() -> State {
    let mut s = State::new(AvConfig::random(), [(); VIDEO_MODES].map(|_| VideoMode::random()));

    s.profile_mode = true;
    s.profile_sel = [2, 6, 11];
    s.target_input = AvInput::Av3Rgbhv;
    s.keymap = rand::random();

    s
}
