//! Entropy-coded scan data extraction.
//!
//! The entropy-coded data following an SOS header runs until the next marker that is neither a
//! stuffed `0xFF 0x00` byte nor an `RSTn` marker. While walking it, this module:
//!
//! - replaces `0xFF 0x00` byte stuffing sequences with `0xFF`,
//! - splits the data into one [`EntropyChunk`] per restart interval, recording the `RST` markers
//!   between them.

use std::{fmt, mem};

use crate::{marker::Marker, reader::Reader};

/// Destuffed entropy-coded data of one restart interval.
pub struct EntropyChunk {
    offset: usize,
    data: Vec<u8>,
}

impl EntropyChunk {
    fn new(offset: usize) -> Self {
        Self {
            offset,
            data: Vec::new(),
        }
    }

    /// Returns the offset of the first byte of the chunk in the input.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the chunk data, with byte stuffing removed.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for EntropyChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntropyChunk")
            .field("offset", &self.offset)
            .field("len", &self.data.len())
            .finish()
    }
}

/// An `RSTn` marker separating two restart intervals of a scan.
#[derive(Clone, Copy)]
pub struct Restart {
    offset: usize,
    n: u8,
    fill_bytes: u32,
}

impl Restart {
    /// Returns the offset of the marker's `0xFF` byte.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the modulo-8 restart count (the `n` in `RSTn`).
    #[inline]
    pub fn n(&self) -> u8 {
        self.n
    }

    #[inline]
    pub fn marker(&self) -> Marker {
        Marker::rst(self.n)
    }

    #[inline]
    pub fn fill_bytes(&self) -> u32 {
        self.fill_bytes
    }
}

impl fmt::Debug for Restart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.marker(), self.offset)
    }
}

/// An element of a scan's entropy-coded data.
#[derive(Debug)]
pub enum ScanItem {
    Entropy(EntropyChunk),
    Restart(Restart),
}

pub(crate) struct ScanData {
    pub(crate) items: Vec<ScanItem>,
    /// Offset of the first byte after the scan data.
    pub(crate) end: usize,
    /// Whether the input ended before the scan was terminated by a marker.
    pub(crate) truncated: bool,
}

/// Reads entropy-coded data starting at the current position of `reader`.
///
/// On return, `reader` is positioned at the first `0xFF` (fill) byte of the marker terminating the
/// scan, or at the end of the input.
pub(crate) fn read_scan_data(reader: &mut Reader<'_>) -> ScanData {
    let mut items = Vec::new();
    let mut chunk = EntropyChunk::new(reader.position());
    let mut next_rst = 0;

    let truncated = loop {
        match reader.read_u8().ok() {
            Some(0xFF) => {}
            Some(byte) => {
                chunk.data.push(byte);
                continue;
            }
            None => break true,
        }

        // Either a stuffed `0xFF`, or a marker (possibly preceded by fill bytes).
        let mut fill = 0;
        let byte = loop {
            match reader.read_u8().ok() {
                Some(0xFF) => fill += 1,
                byte => break byte,
            }
        };

        match byte {
            Some(0x00) if fill == 0 => {
                // Byte stuffing sequence, push only `0xFF` to the output.
                chunk.data.push(0xFF);
            }
            Some(byte @ 0xD0..=0xD7) => {
                let n = byte - 0xD0;
                if n != next_rst {
                    log::warn!("expected RST{next_rst}, found RST{n} in scan data");
                }
                next_rst = (n + 1) % 8;

                let offset = reader.position() - 2;
                let next = EntropyChunk::new(reader.position());
                items.push(ScanItem::Entropy(mem::replace(&mut chunk, next)));
                items.push(ScanItem::Restart(Restart {
                    offset,
                    n,
                    fill_bytes: fill,
                }));
            }
            Some(_) => {
                // Start of the next marker segment. Back up so that it can be read normally.
                reader.rewind(2 + fill as usize);
                break false;
            }
            None => break true,
        }
    };

    items.push(ScanItem::Entropy(chunk));

    if truncated {
        log::debug!("reached end of data inside entropy-coded segment");
    }

    ScanData {
        items,
        end: reader.position(),
        truncated,
    }
}
