//! Paged transfer of records larger than one flash page
//!
//! A record is streamed through a single page sized scratch buffer. The
//! writer flushes the buffer to flash each time it fills and once more for a
//! trailing partial page; the reader fetches the next page only when the
//! buffer is exhausted and more bytes are requested. A record ending exactly
//! on a page boundary therefore touches no extra page.

use embedded_storage::nor_flash::{NorFlash, ReadNorFlash};

use crate::flash::{read_page, write_page};
use crate::persist::{Sink, Source};
use crate::Error;

/// Fill value for the unused tail of the last page (erased flash)
const ERASED: u8 = 0xFF;

/// Streams bytes into consecutive flash pages
pub struct PageWriter<'f, F, const PAGE: usize> {
    flash: &'f mut F,
    buf: [u8; PAGE],
    /// Bytes buffered for the current page
    fill: usize,
    /// Page the buffer will be written to
    page: u32,
    /// Total bytes accepted
    total: usize,
}

impl<'f, F: NorFlash, const PAGE: usize> PageWriter<'f, F, PAGE> {
    /// Start a transfer at the provided page index
    pub fn new(flash: &'f mut F, first_page: u32) -> Self {
        Self {
            flash,
            buf: [ERASED; PAGE],
            fill: 0,
            page: first_page,
            total: 0,
        }
    }

    fn flush(&mut self) -> Result<(), Error> {
        // Pad whatever is left of the page
        for b in &mut self.buf[self.fill..] {
            *b = ERASED;
        }

        write_page(self.flash, self.page, &self.buf)?;

        self.page += 1;
        self.fill = 0;

        Ok(())
    }

    /// Write out a partially filled page, returning the total bytes written
    pub fn finish(mut self) -> Result<usize, Error> {
        if self.fill > 0 {
            self.flush()?;
        }

        Ok(self.total)
    }
}

impl<'f, F: NorFlash, const PAGE: usize> Sink for PageWriter<'f, F, PAGE> {
    fn put(&mut self, mut bytes: &[u8]) -> Result<(), Error> {
        while !bytes.is_empty() {
            let n = usize::min(PAGE - self.fill, bytes.len());

            self.buf[self.fill..][..n].copy_from_slice(&bytes[..n]);
            self.fill += n;
            self.total += n;
            bytes = &bytes[n..];

            if self.fill == PAGE {
                self.flush()?;
            }
        }

        Ok(())
    }
}

/// Streams bytes out of consecutive flash pages
pub struct PageReader<'f, F, const PAGE: usize> {
    flash: &'f mut F,
    buf: [u8; PAGE],
    /// Read position within the buffer
    pos: usize,
    /// Flash offset of the next page to fetch
    next: u32,
}

impl<'f, F: ReadNorFlash, const PAGE: usize> PageReader<'f, F, PAGE> {
    /// Start a transfer at the provided byte offset, fetching the first page
    pub fn open(flash: &'f mut F, offset: u32) -> Result<Self, Error> {
        let mut r = Self {
            flash,
            buf: [0u8; PAGE],
            pos: PAGE,
            next: offset,
        };

        r.fetch()?;

        Ok(r)
    }

    fn fetch(&mut self) -> Result<(), Error> {
        read_page(self.flash, self.next, &mut self.buf)?;

        self.next += PAGE as u32;
        self.pos = 0;

        Ok(())
    }
}

impl<'f, F: ReadNorFlash, const PAGE: usize> Source for PageReader<'f, F, PAGE> {
    fn take(&mut self, mut out: &mut [u8]) -> Result<(), Error> {
        while !out.is_empty() {
            if self.pos == PAGE {
                self.fetch()?;
            }

            let n = usize::min(PAGE - self.pos, out.len());

            out[..n].copy_from_slice(&self.buf[self.pos..][..n]);
            self.pos += n;
            out = &mut out[n..];
        }

        Ok(())
    }
}

/// Write a contiguous record starting at `first_page`
pub fn write_record<F: NorFlash, const PAGE: usize>(
    flash: &mut F,
    first_page: u32,
    record: &[u8],
) -> Result<usize, Error> {
    let mut w = PageWriter::<F, PAGE>::new(flash, first_page);
    w.put(record)?;
    w.finish()
}

/// Read `out.len()` record bytes starting at a byte offset
pub fn read_record<F: ReadNorFlash, const PAGE: usize>(
    flash: &mut F,
    offset: u32,
    out: &mut [u8],
) -> Result<(), Error> {
    let mut r = PageReader::<F, PAGE>::open(flash, offset)?;
    r.take(out)
}
