//! Streaming field codec for persisted configuration blocks
//!
//! Payload blocks (AV configuration, video mode descriptors) are written
//! field by field in little endian order through a [`Sink`] and read back
//! through a [`Source`]. Neither side ever sees the whole record, which
//! lets the paged transfer engine split a block at any page boundary.

use crate::Error;

/// Byte stream destination
pub trait Sink {
    fn put(&mut self, bytes: &[u8]) -> Result<(), Error>;

    fn put_u8(&mut self, v: u8) -> Result<(), Error> {
        self.put(&[v])
    }

    fn put_u16(&mut self, v: u16) -> Result<(), Error> {
        self.put(&v.to_le_bytes())
    }

    fn put_u32(&mut self, v: u32) -> Result<(), Error> {
        self.put(&v.to_le_bytes())
    }
}

/// Byte stream origin
pub trait Source {
    fn take(&mut self, out: &mut [u8]) -> Result<(), Error>;

    fn take_u8(&mut self) -> Result<u8, Error> {
        let mut b = [0u8; 1];
        self.take(&mut b)?;
        Ok(b[0])
    }

    fn take_u16(&mut self) -> Result<u16, Error> {
        let mut b = [0u8; 2];
        self.take(&mut b)?;
        Ok(u16::from_le_bytes(b))
    }

    fn take_u32(&mut self) -> Result<u32, Error> {
        let mut b = [0u8; 4];
        self.take(&mut b)?;
        Ok(u32::from_le_bytes(b))
    }
}

/// Fixed-size value with an explicit persisted layout.
///
/// `SIZE` must equal the number of bytes `persist` emits and `restore`
/// consumes; it is the value recorded in record length fields.
pub trait Persist {
    const SIZE: usize;

    /// Write all fields to the sink
    fn persist<S: Sink>(&self, sink: &mut S) -> Result<(), Error>;

    /// Overwrite all fields from the source
    fn restore<S: Source>(&mut self, source: &mut S) -> Result<(), Error>;
}

impl Persist for u8 {
    const SIZE: usize = 1;

    fn persist<S: Sink>(&self, sink: &mut S) -> Result<(), Error> {
        sink.put_u8(*self)
    }

    fn restore<S: Source>(&mut self, source: &mut S) -> Result<(), Error> {
        *self = source.take_u8()?;
        Ok(())
    }
}

impl Persist for i8 {
    const SIZE: usize = 1;

    fn persist<S: Sink>(&self, sink: &mut S) -> Result<(), Error> {
        sink.put_u8(*self as u8)
    }

    fn restore<S: Source>(&mut self, source: &mut S) -> Result<(), Error> {
        *self = source.take_u8()? as i8;
        Ok(())
    }
}

impl Persist for bool {
    const SIZE: usize = 1;

    fn persist<S: Sink>(&self, sink: &mut S) -> Result<(), Error> {
        sink.put_u8(*self as u8)
    }

    fn restore<S: Source>(&mut self, source: &mut S) -> Result<(), Error> {
        *self = source.take_u8()? != 0;
        Ok(())
    }
}

impl Persist for u16 {
    const SIZE: usize = 2;

    fn persist<S: Sink>(&self, sink: &mut S) -> Result<(), Error> {
        sink.put_u16(*self)
    }

    fn restore<S: Source>(&mut self, source: &mut S) -> Result<(), Error> {
        *self = source.take_u16()?;
        Ok(())
    }
}

impl Persist for u32 {
    const SIZE: usize = 4;

    fn persist<S: Sink>(&self, sink: &mut S) -> Result<(), Error> {
        sink.put_u32(*self)
    }

    fn restore<S: Source>(&mut self, source: &mut S) -> Result<(), Error> {
        *self = source.take_u32()?;
        Ok(())
    }
}

impl<T: Persist, const N: usize> Persist for [T; N] {
    const SIZE: usize = T::SIZE * N;

    fn persist<S: Sink>(&self, sink: &mut S) -> Result<(), Error> {
        for v in self.iter() {
            v.persist(sink)?;
        }
        Ok(())
    }

    fn restore<S: Source>(&mut self, source: &mut S) -> Result<(), Error> {
        for v in self.iter_mut() {
            v.restore(source)?;
        }
        Ok(())
    }
}

/// [`Sink`] over a caller supplied byte buffer
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceSink<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }
}

impl<'a> Sink for SliceSink<'a> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let end = self.pos + bytes.len();
        if end > self.buf.len() {
            return Err(Error::BufferTooSmall);
        }

        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;

        Ok(())
    }
}

/// [`Source`] over a byte buffer
pub struct SliceSource<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Source for SliceSource<'a> {
    fn take(&mut self, out: &mut [u8]) -> Result<(), Error> {
        let end = self.pos + out.len();
        if end > self.buf.len() {
            return Err(Error::BufferTooSmall);
        }

        out.copy_from_slice(&self.buf[self.pos..end]);
        self.pos = end;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_little_endian() {
        let mut buf = [0u8; 8];
        let mut sink = SliceSink::new(&mut buf);

        0x1234u16.persist(&mut sink).unwrap();
        0xAABBCCDDu32.persist(&mut sink).unwrap();
        true.persist(&mut sink).unwrap();
        (-2i8).persist(&mut sink).unwrap();
        assert_eq!(sink.len(), 8);

        assert_eq!(buf, [0x34, 0x12, 0xDD, 0xCC, 0xBB, 0xAA, 0x01, 0xFE]);

        let mut source = SliceSource::new(&buf);
        let (mut a, mut b, mut c, mut d) = (0u16, 0u32, false, 0i8);
        a.restore(&mut source).unwrap();
        b.restore(&mut source).unwrap();
        c.restore(&mut source).unwrap();
        d.restore(&mut source).unwrap();

        assert_eq!((a, b, c, d), (0x1234, 0xAABBCCDD, true, -2));
    }

    #[test]
    fn array_size_accumulates() {
        assert_eq!(<[u16; 27] as Persist>::SIZE, 54);
        assert_eq!(<[[u8; 3]; 4] as Persist>::SIZE, 12);
    }

    #[test]
    fn short_buffers_are_rejected() {
        let mut buf = [0u8; 3];
        let mut sink = SliceSink::new(&mut buf);
        assert_eq!(0u32.persist(&mut sink), Err(Error::BufferTooSmall));

        let mut source = SliceSource::new(&buf[..1]);
        assert_eq!(source.take_u16(), Err(Error::BufferTooSmall));
    }
}
