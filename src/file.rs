//! JPEG marker stream scanner.

#[cfg(test)]
mod tests;

use crate::{
    error::{Error, Result},
    jpeg::Jpeg,
    marker::Marker,
    reader::Reader,
    scan::read_scan_data,
    segment::{read_segment, Segment, SegmentKind},
};

/// Settings for [`JpegParser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    strict: bool,
}

impl ParseOptions {
    /// Returns the default (lenient) options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables strict mode.
    ///
    /// In strict mode, input that ends inside of entropy-coded data is reported as an error instead
    /// of producing a truncated [`Jpeg`], and marker segments that declare more bytes than their
    /// contents need are rejected instead of being skipped with a warning.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[inline]
    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

enum State {
    Soi { offset: usize, fill_bytes: u32 },
    Segments,
    Done,
}

/// Skips leading fill bytes and reads the SOI marker.
///
/// Returns the offset of the marker and the number of fill bytes preceding it.
pub(crate) fn read_soi(reader: &mut Reader<'_>) -> Result<(usize, u32)> {
    let mut ff = 0;
    while reader.peek_u8(0).ok() == Some(0xFF) {
        reader.skip(1)?;
        ff += 1;
    }

    if ff == 0 || reader.read_u8().ok() != Some(0xD8) {
        return Err(Error::not_a_jpeg(
            "JPEG data does not start with an SOI marker",
        ));
    }

    Ok((reader.position() - 2, ff - 1))
}

/// Streaming parser producing the [`Segment`]s of a JPEG image.
pub struct JpegParser<'a> {
    reader: Reader<'a>,
    options: ParseOptions,
    state: State,
    truncated: bool,
}

impl<'a> JpegParser<'a> {
    /// Creates a parser with the default options.
    ///
    /// Fails if `buf` does not start with an SOI marker (optionally preceded by fill bytes).
    pub fn new(buf: &'a [u8]) -> Result<Self> {
        Self::with_options(buf, ParseOptions::default())
    }

    pub fn with_options(buf: &'a [u8], options: ParseOptions) -> Result<Self> {
        let mut reader = Reader::new(buf);
        let (offset, fill_bytes) = read_soi(&mut reader)?;
        Ok(Self {
            reader,
            options,
            state: State::Soi { offset, fill_bytes },
            truncated: false,
        })
    }

    /// Reads the next [`Segment`] from the JPEG data.
    ///
    /// The first segment is always SOI. Returns `Ok(None)` once the EOI marker has been returned,
    /// or after an SOS segment whose entropy-coded data was cut off by the end of the input (see
    /// [`JpegParser::is_truncated`]). There may be data stored after the EOI marker, which can be
    /// retrieved by calling [`JpegParser::remaining`].
    pub fn next_segment(&mut self) -> Result<Option<Segment>> {
        match self.state {
            State::Soi { offset, fill_bytes } => {
                self.state = State::Segments;
                return Ok(Some(Segment {
                    marker: Marker::SOI,
                    offset,
                    fill_bytes,
                    length: None,
                    kind: SegmentKind::Soi,
                }));
            }
            State::Segments => {}
            State::Done => return Ok(None),
        }

        let start = self.reader.position();
        let mut ff = 0u32;
        let byte = loop {
            match self.reader.read_u8()? {
                0xFF => ff += 1,
                byte => break byte,
            }
        };
        // The last `0xFF` belongs to the marker, the ones before it are fill bytes.
        let offset = start + (ff as usize).saturating_sub(1);

        let marker = match Marker::from_byte(byte) {
            Some(marker) if ff > 0 => marker,
            _ => {
                let code = if ff > 0 {
                    0xFF00 | u16::from(byte)
                } else {
                    u16::from(byte)
                };
                return Err(Error::unknown_marker(code, offset));
            }
        };
        let fill_bytes = ff - 1;

        let (length, mut kind) = match marker.codec() {
            Some(codec) => {
                let (length, kind) = read_segment(&mut self.reader, marker, codec, &self.options)?;
                (Some(length), kind)
            }
            None if marker == Marker::SOI => {
                return Err(Error::malformed(format!(
                    "unexpected SOI marker at offset {offset}"
                )));
            }
            None if marker == Marker::EOI => {
                if !self.reader.remaining().is_empty() {
                    log::warn!(
                        "ignoring {} trailing bytes after EOI",
                        self.reader.remaining().len()
                    );
                }
                self.state = State::Done;
                (None, SegmentKind::Eoi)
            }
            None if !marker.has_length() => {
                log::debug!("standalone {marker} marker at offset {offset} outside of scan data");
                (None, SegmentKind::Unparsed)
            }
            None => {
                let length = self.reader.read_length()?;
                self.reader.skip(usize::from(length - 2))?;
                log::debug!("skipped {marker} segment of length {length} at offset {offset}");
                (Some(length), SegmentKind::Unparsed)
            }
        };

        if let SegmentKind::Sos(sos) = &mut kind {
            let data_start = self.reader.position();
            let scan = read_scan_data(&mut self.reader);
            sos.items = scan.items;
            sos.data = data_start..scan.end;

            if scan.truncated {
                if self.options.is_strict() {
                    return Err(Error::end_of_stream());
                }
                log::warn!("JPEG data ends inside of scan data starting at offset {data_start}");
                self.truncated = true;
                self.state = State::Done;
            }
        }

        log::trace!("{marker} at offset {offset}, length {length:?}");

        Ok(Some(Segment {
            marker,
            offset,
            fill_bytes,
            length,
            kind,
        }))
    }

    /// Returns whether the input ended inside of entropy-coded scan data.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Returns the remaining (unparsed) bytes of the input data.
    ///
    /// After retrieving a segment via [`JpegParser::next_segment`], the result of this method is
    /// the data immediately following that segment.
    pub fn remaining(&self) -> &'a [u8] {
        self.reader.remaining()
    }

    /// Reads all remaining segments and assembles them into a [`Jpeg`].
    pub fn finish(mut self) -> Result<Jpeg> {
        let mut segments = Vec::new();
        while let Some(segment) = self.next_segment()? {
            segments.push(segment);
        }
        Ok(Jpeg::new(segments, self.truncated))
    }
}
