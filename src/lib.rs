//! A structural scanner for ISO/IEC 10918-1 (JPEG) bitstreams.
//!
//! This crate splits a JPEG stream into its marker segments, decodes the headers and tables they
//! carry, and extracts the entropy-coded data of each scan (with byte stuffing removed, split at
//! restart markers). It does not decode pixel data.
//!
//! The parsed [`Jpeg`] can classify the image's coding process, and [`render`] produces a
//! human-readable dump of every segment.
//!
//! ```no_run
//! let jpeg = s10918::read_file("image.jpg")?;
//! println!("{}x{}, process {}", jpeg.columns().unwrap_or(0), jpeg.rows().unwrap_or(0), jpeg.process()?);
//! println!("{jpeg}");
//! # Ok::<_, s10918::Error>(())
//! ```

mod bits;
mod error;
mod file;
mod jpeg;
mod marker;
mod print;
mod reader;
mod scan;
mod segment;

use std::{fs, io::Read, path::Path};

use reader::Reader;

pub use bits::{get_bit, split_byte};
pub use error::{Error, ErrorKind, Result};
pub use file::{JpegParser, ParseOptions};
pub use jpeg::Jpeg;
pub use marker::{Codec, Marker, MarkerInfo};
pub use print::render;
pub use scan::{EntropyChunk, Restart, ScanItem};
pub use segment::{
    App, AppKind, Com, Conditioning, Dac, DensityUnit, Dht, Dnl, Dqt, Dri, Exp, FrameComponent,
    HuffmanTable, Jfif, QuantizationTable, ScanComponent, Segment, SegmentKind, Sof, Sos,
};

/// Name returned by [`sniff`] for ISO/IEC 10918-1 streams.
const FORMAT: &str = "10918";

/// Checks whether `data` looks like an ISO/IEC 10918-1 JPEG stream.
///
/// Leading `0xFF` fill bytes are skipped, then an SOI marker must follow. On success, the name of
/// the format (`"10918"`) is returned.
pub fn sniff(data: &[u8]) -> Result<&'static str> {
    file::read_soi(&mut Reader::new(data))?;
    Ok(FORMAT)
}

/// Parses an in-memory JPEG stream with the default (lenient) [`ParseOptions`].
pub fn parse(data: &[u8]) -> Result<Jpeg> {
    parse_with_options(data, ParseOptions::default())
}

pub fn parse_with_options(data: &[u8], options: ParseOptions) -> Result<Jpeg> {
    JpegParser::with_options(data, options)?.finish()
}

/// Reads a whole JPEG stream from `reader` and parses it.
pub fn read_from<R: Read>(mut reader: R) -> Result<Jpeg> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    parse(&data)
}

/// Reads and parses a JPEG file.
///
/// The file is checked with [`sniff`] before parsing it.
pub fn read_file(path: impl AsRef<Path>) -> Result<Jpeg> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let format = sniff(&data)?;
    log::debug!(
        "parsing {} ({} bytes, format {})",
        path.display(),
        data.len(),
        format
    );
    parse(&data)
}
