use std::mem;

use bytemuck::AnyBitPattern;

use crate::error::{Error, Result};

/// Big-endian cursor over an in-memory JPEG stream.
///
/// A reader can be confined to a single marker segment (see [`Reader::segment`]). Running out of
/// data in a confined reader means the segment's contents exceed its declared length, which is
/// reported as a malformed segment instead of a truncated stream.
#[derive(Debug, Clone)]
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    position: usize,
    segment: Option<&'static str>,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            position: 0,
            segment: None,
        }
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub(crate) fn remaining(&self) -> &'a [u8] {
        &self.buf[self.position..]
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.position >= self.buf.len()
    }

    fn out_of_data(&self) -> Error {
        match self.segment {
            Some(name) => Error::malformed(format!(
                "{name} segment contents exceed its declared length"
            )),
            None => Error::end_of_stream(),
        }
    }

    pub(crate) fn peek_u8(&self, offset: usize) -> Result<u8> {
        match self.buf.get(self.position + offset) {
            Some(&byte) => Ok(byte),
            None => Err(self.out_of_data()),
        }
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        let byte = self.peek_u8(0)?;
        self.position += 1;
        Ok(byte)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        let b = [self.read_u8()?, self.read_u8()?];
        Ok(u16::from_be_bytes(b))
    }

    pub(crate) fn read_slice(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining().len() < count {
            Err(self.out_of_data())
        } else {
            let slice = &self.remaining()[..count];
            self.position += count;
            Ok(slice)
        }
    }

    pub(crate) fn read_obj<T: AnyBitPattern>(&mut self) -> Result<&'a T> {
        assert_eq!(mem::align_of::<T>(), 1);

        let bytes = self.read_slice(mem::size_of::<T>())?;
        Ok(bytemuck::from_bytes(bytes))
    }

    pub(crate) fn read_objs<T: AnyBitPattern>(&mut self, count: usize) -> Result<&'a [T]> {
        assert_eq!(mem::align_of::<T>(), 1);

        let bytes = self.read_slice(count * mem::size_of::<T>())?;
        Ok(bytemuck::cast_slice(bytes))
    }

    pub(crate) fn skip(&mut self, count: usize) -> Result<()> {
        self.read_slice(count).map(drop)
    }

    /// Moves the cursor `count` bytes backwards, over data that has already been read.
    pub(crate) fn rewind(&mut self, count: usize) {
        assert!(count <= self.position, "cannot rewind past the start of the data");
        self.position -= count;
    }

    /// Reads a segment length field.
    ///
    /// The length counts the length field itself, but not the `0xFF 0xXX` marker preceding it.
    /// Returns the full length, after checking that the rest of the segment is available.
    pub(crate) fn read_length(&mut self) -> Result<u16> {
        let len = self.read_u16()?;
        if len < 2 {
            return Err(Error::malformed(format!("invalid segment length {len}")));
        }
        if self.remaining().len() < usize::from(len - 2) {
            return Err(self.out_of_data());
        }
        Ok(len)
    }

    /// Returns a reader over the next `len` bytes that reports reads beyond them as a malformed
    /// `name` segment.
    ///
    /// `self` is not advanced.
    pub(crate) fn segment(&self, name: &'static str, len: usize) -> Result<Reader<'a>> {
        let end = self.position + len;
        if end > self.buf.len() {
            return Err(self.out_of_data());
        }
        Ok(Reader {
            buf: &self.buf[..end],
            position: self.position,
            segment: Some(name),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ErrorKind;

    use super::*;

    #[test]
    fn big_endian() {
        let mut reader = Reader::new(&[0x12, 0x34, 0x56]);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u8().unwrap(), 0x56);
        assert!(reader.is_empty());
        assert_eq!(
            reader.read_u8().unwrap_err().kind(),
            ErrorKind::UnexpectedEndOfStream
        );
    }

    #[test]
    fn rewind() {
        let mut reader = Reader::new(&[1, 2, 3, 4]);
        reader.skip(3).unwrap();
        reader.rewind(2);
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.read_u8().unwrap(), 2);
    }

    #[test]
    fn lengths() {
        let mut reader = Reader::new(&[0x00, 0x01]);
        assert_eq!(
            reader.read_length().unwrap_err().kind(),
            ErrorKind::MalformedSegment
        );

        let mut reader = Reader::new(&[0x00, 0x05, 0xAA, 0xBB]);
        assert_eq!(
            reader.read_length().unwrap_err().kind(),
            ErrorKind::UnexpectedEndOfStream
        );

        let mut reader = Reader::new(&[0x00, 0x04, 0xAA, 0xBB]);
        assert_eq!(reader.read_length().unwrap(), 4);
    }

    #[test]
    fn confined() {
        let reader = Reader::new(&[0xAA, 0xBB, 0xCC]);
        let mut segment = reader.segment("DRI", 2).unwrap();
        assert_eq!(segment.read_u16().unwrap(), 0xAABB);
        let err = segment.read_u8().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSegment);
        assert_eq!(
            err.to_string(),
            "DRI segment contents exceed its declared length"
        );
        assert_eq!(reader.position(), 0);
    }
}
