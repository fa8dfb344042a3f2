//! Marker segment decoders (ISO/IEC 10918-1 Annex B).
//!
//! Field accessors use the parameter symbols of the standard (`Pq`, `Tq`, `Qk`, ...).

#![allow(non_snake_case)]

use std::{fmt, ops::Range};

use bytemuck::{AnyBitPattern, Pod, Zeroable};

use crate::{
    bits::split_byte,
    error::{Error, Result},
    file::ParseOptions,
    marker::{Codec, Marker},
    reader::Reader,
    scan::{EntropyChunk, Restart, ScanItem},
};

/// Decodes the marker segment whose length field `reader` is positioned at.
///
/// On success, `reader` is positioned exactly `Lx` bytes past where it started (the first byte
/// after the segment), and the length field is returned along with the decoded segment.
pub(crate) fn read_segment(
    reader: &mut Reader<'_>,
    marker: Marker,
    codec: Codec,
    options: &ParseOptions,
) -> Result<(u16, SegmentKind)> {
    let length = reader.read_length()?;
    let payload_len = usize::from(length - 2);
    let mut payload = reader.segment(marker.name(), payload_len)?;

    let kind = match codec {
        Codec::App => SegmentKind::App(App::read(marker, &mut payload)?),
        Codec::Com => SegmentKind::Com(Com::read(&mut payload)?),
        Codec::Dac => SegmentKind::Dac(Dac::read(&mut payload)?),
        Codec::Dht => SegmentKind::Dht(Dht::read(&mut payload)?),
        Codec::Dnl => SegmentKind::Dnl(Dnl::read(&mut payload)?),
        Codec::Dqt => SegmentKind::Dqt(Dqt::read(&mut payload)?),
        Codec::Dri => SegmentKind::Dri(Dri::read(&mut payload)?),
        Codec::Exp => SegmentKind::Exp(Exp::read(&mut payload)?),
        Codec::Sof if marker == Marker::DHP => SegmentKind::Dhp(Sof::read(marker, &mut payload)?),
        Codec::Sof => SegmentKind::Sof(Sof::read(marker, &mut payload)?),
        Codec::Sos => SegmentKind::Sos(Sos::read(&mut payload)?),
    };

    // The segment specified a bigger length than what we ended up reading.
    let remaining = payload.remaining().len();
    if remaining != 0 {
        if options.is_strict() {
            return Err(Error::malformed(format!(
                "{} segment specified a length of {} bytes, but {} remain after decoding",
                marker, length, remaining,
            )));
        }
        log::warn!(
            "{} segment specified a length of {} bytes, but {} remain after decoding",
            marker,
            length,
            remaining,
        );
    }

    reader.skip(payload_len)?;
    Ok((length, kind))
}

/// A marker, and the marker segment it introduces (if any).
#[derive(Debug)]
pub struct Segment {
    pub(crate) marker: Marker,
    pub(crate) offset: usize,
    pub(crate) fill_bytes: u32,
    pub(crate) length: Option<u16>,
    pub(crate) kind: SegmentKind,
}

impl Segment {
    /// Returns the offset of the segment's `0xFF 0xXX` marker in the input buffer.
    ///
    /// This is the position of the marker's own `0xFF` byte, after any fill bytes.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn marker(&self) -> Marker {
        self.marker
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.marker.name()
    }

    /// Returns the number of `0xFF` fill bytes preceding the marker.
    #[inline]
    pub fn fill_bytes(&self) -> u32 {
        self.fill_bytes
    }

    /// Returns the value of the segment length field.
    ///
    /// The length includes the length field itself, but not the marker. Standalone markers (SOI,
    /// EOI, TEM and RSTn) have no length.
    #[inline]
    pub fn length(&self) -> Option<u16> {
        self.length
    }

    #[inline]
    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    /// Returns the offset of the first byte after the marker segment.
    ///
    /// For SOS segments, this is the first byte of the entropy-coded data.
    pub fn end(&self) -> usize {
        self.offset + 2 + self.length.map_or(0, usize::from)
    }
}

/// Decoded contents of a [`Segment`].
#[derive(Debug)]
pub enum SegmentKind {
    Soi,
    Eoi,
    App(App),
    Com(Com),
    Dac(Dac),
    Dht(Dht),
    Dnl(Dnl),
    Dqt(Dqt),
    Dri(Dri),
    Exp(Exp),
    Sof(Sof),
    /// DHP uses the same layout as a frame header.
    Dhp(Sof),
    Sos(Sos),
    /// A reserved marker whose payload was skipped, or a standalone marker outside of any scan.
    Unparsed,
}

/// An application-specific segment (`APPn`).
pub struct App {
    n: u8,
    payload: Vec<u8>,
}

impl App {
    fn read(marker: Marker, reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            n: marker.byte() - 0xE0,
            payload: reader.read_slice(reader.remaining().len())?.to_vec(),
        })
    }

    /// Returns the type of APP marker (the `n` in `APPn`), in range `0..=15`.
    #[inline]
    pub fn n(&self) -> u8 {
        self.n
    }

    /// Returns the application data following the length field.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Identifies the payload by its signature.
    ///
    /// APPn markers are shared by many applications, so the identification ignores `n` and only
    /// looks at the magic string the payload starts with.
    pub fn kind(&self) -> Option<AppKind<'_>> {
        const EXIF: &[u8] = b"Exif\0\0";
        const ADOBE: &[u8] = b"Adobe\0";

        if let Some(jfif) = Jfif::parse(&self.payload) {
            Some(AppKind::Jfif(jfif))
        } else if let Some(data) = self.payload.strip_prefix(EXIF) {
            Some(AppKind::Exif(data))
        } else if let Some(data) = self.payload.strip_prefix(ADOBE) {
            let version = *data.first()?;
            Some(AppKind::Adobe { version, data })
        } else {
            None
        }
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("n", &self.n)
            .field(
                "payload",
                &format_args!("b\"{}\"", self.payload.escape_ascii()),
            )
            .finish()
    }
}

/// Enumeration of the `APPn` payloads recognized by [`App::kind`].
#[derive(Debug)]
pub enum AppKind<'a> {
    Jfif(Jfif<'a>),
    /// EXIF data, without the `Exif\0\0` signature.
    Exif(&'a [u8]),
    /// Adobe segment; `data` excludes the `Adobe\0` signature, but includes the version byte.
    Adobe { version: u8, data: &'a [u8] },
}

#[derive(Debug)]
pub struct Jfif<'a> {
    major_version: u8,
    minor_version: u8,
    unit: DensityUnit,
    xdensity: u16,
    ydensity: u16,
    xthumbnail: u8,
    ythumbnail: u8,
    thumbnail: &'a [u8],
}

impl<'a> Jfif<'a> {
    fn parse(payload: &'a [u8]) -> Option<Self> {
        const JFIF: &[u8] = b"JFIF\0";

        let mut reader = Reader::new(payload.strip_prefix(JFIF)?);
        let major_version = reader.read_u8().ok()?;
        let minor_version = reader.read_u8().ok()?;
        let unit = match reader.read_u8().ok()? {
            0 => DensityUnit::None,
            1 => DensityUnit::DotsPerInch,
            2 => DensityUnit::DotsPerCm,
            e => DensityUnit::Unknown(e),
        };
        let xdensity = reader.read_u16().ok()?;
        let ydensity = reader.read_u16().ok()?;
        let xthumbnail = reader.read_u8().ok()?;
        let ythumbnail = reader.read_u8().ok()?;
        Some(Self {
            major_version,
            minor_version,
            unit,
            xdensity,
            ydensity,
            xthumbnail,
            ythumbnail,
            thumbnail: reader.remaining(),
        })
    }

    #[inline]
    pub fn major_version(&self) -> u8 {
        self.major_version
    }

    #[inline]
    pub fn minor_version(&self) -> u8 {
        self.minor_version
    }

    #[inline]
    pub fn unit(&self) -> DensityUnit {
        self.unit
    }

    #[inline]
    pub fn density_x(&self) -> u16 {
        self.xdensity
    }

    #[inline]
    pub fn density_y(&self) -> u16 {
        self.ydensity
    }

    #[inline]
    pub fn thumbnail_width(&self) -> u8 {
        self.xthumbnail
    }

    #[inline]
    pub fn thumbnail_height(&self) -> u8 {
        self.ythumbnail
    }

    /// Returns the bytes following the JFIF header fields (the RGB thumbnail, if any).
    #[inline]
    pub fn thumbnail_data(&self) -> &'a [u8] {
        self.thumbnail
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityUnit {
    None,
    DotsPerInch,
    DotsPerCm,
    Unknown(u8),
}

/// Comment segment.
pub struct Com {
    com: Vec<u8>,
}

impl Com {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            com: reader.read_slice(reader.remaining().len())?.to_vec(),
        })
    }

    #[inline]
    pub fn comment(&self) -> &[u8] {
        &self.com
    }
}

impl fmt::Debug for Com {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Com(\"{}\")", self.com.escape_ascii())
    }
}

#[derive(Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct Conditioning {
    TcTb: u8,
    Cs: u8,
}

impl Conditioning {
    /// Returns the table class (0 = DC or lossless, 1 = AC).
    #[inline]
    pub fn Tc(&self) -> u8 {
        split_byte(self.TcTb).0
    }

    /// Returns the conditioning table destination identifier.
    #[inline]
    pub fn Tb(&self) -> u8 {
        split_byte(self.TcTb).1
    }

    /// Returns the conditioning table value.
    #[inline]
    pub fn Cs(&self) -> u8 {
        self.Cs
    }
}

impl fmt::Debug for Conditioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conditioning")
            .field("Tc", &self.Tc())
            .field("Tb", &self.Tb())
            .field("Cs", &self.Cs)
            .finish()
    }
}

/// **D**efine **A**rithmetic coding **C**onditioning(s).
#[derive(Debug)]
pub struct Dac(Vec<Conditioning>);

impl Dac {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let mut conditionings = Vec::new();
        while !reader.is_empty() {
            conditionings.push(*reader.read_obj::<Conditioning>()?);
        }
        Ok(Self(conditionings))
    }

    #[inline]
    pub fn conditionings(&self) -> &[Conditioning] {
        &self.0
    }
}

#[derive(Clone, Copy, AnyBitPattern)]
#[repr(C)]
struct DhtHeader {
    TcTh: u8,
    Li: [u8; 16],
}

impl DhtHeader {
    fn num_values(&self) -> usize {
        self.Li.iter().map(|l| *l as usize).sum()
    }
}

pub struct HuffmanTable {
    header: DhtHeader,
    Vij: Vec<u8>,
}

impl HuffmanTable {
    /// Returns the table class (0 = DC or lossless, 1 = AC).
    #[inline]
    pub fn Tc(&self) -> u8 {
        split_byte(self.header.TcTh).0
    }

    /// Returns the table destination identifier (0-3).
    #[inline]
    pub fn Th(&self) -> u8 {
        split_byte(self.header.TcTh).1
    }

    /// Returns an array containing the number of codes of each length.
    #[inline]
    pub fn Li(&self) -> &[u8; 16] {
        &self.header.Li
    }

    /// Returns the values associated with each huffman code.
    #[inline]
    pub fn Vij(&self) -> &[u8] {
        &self.Vij
    }

    /// Returns the symbols for each code length 1 to 16, in order.
    pub fn values_by_length(&self) -> impl Iterator<Item = (u8, &[u8])> {
        let mut rest = &self.Vij[..];
        self.header.Li.iter().enumerate().map(move |(i, &count)| {
            let (values, tail) = rest.split_at(usize::from(count));
            rest = tail;
            (i as u8 + 1, values)
        })
    }
}

impl fmt::Debug for HuffmanTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuffmanTable")
            .field("Tc", &self.Tc())
            .field("Th", &self.Th())
            .field("Li", &self.Li())
            .field("Vij", &self.Vij)
            .finish()
    }
}

/// **D**efine **H**uffman **T**ables – defines one or more [`HuffmanTable`]s.
#[derive(Debug)]
pub struct Dht {
    tables: Vec<HuffmanTable>,
}

impl Dht {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let mut tables = Vec::new();

        while !reader.is_empty() {
            let header: DhtHeader = *reader.read_obj()?;
            let values = reader.read_slice(header.num_values())?;
            tables.push(HuffmanTable {
                header,
                Vij: values.to_vec(),
            });
        }

        Ok(Self { tables })
    }

    pub fn tables(&self) -> &[HuffmanTable] {
        &self.tables
    }
}

/// **D**efine **N**umber of **L**ines.
#[derive(Clone, Copy)]
pub struct Dnl {
    NL: u16,
}

impl Dnl {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            NL: reader.read_u16()?,
        })
    }

    /// Returns the number of lines in the frame.
    #[inline]
    pub fn NL(&self) -> u16 {
        self.NL
    }
}

impl fmt::Debug for Dnl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dnl").field("NL", &self.NL).finish()
    }
}

pub struct QuantizationTable {
    PqTq: u8,
    Qk: [u16; 64],
}

impl QuantizationTable {
    /// Returns the quantization table element precision.
    ///
    /// - 0: 8-bit `Qk` values
    /// - 1: 16-bit `Qk` values
    #[inline]
    pub fn Pq(&self) -> u8 {
        split_byte(self.PqTq).0
    }

    /// Returns the destination identifier (0-3).
    #[inline]
    pub fn Tq(&self) -> u8 {
        split_byte(self.PqTq).1
    }

    /// Returns the quantization table elements, in the order they are stored in (zigzag).
    #[inline]
    pub fn Qk(&self) -> &[u16; 64] {
        &self.Qk
    }
}

impl fmt::Debug for QuantizationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuantizationTable")
            .field("Pq", &self.Pq())
            .field("Tq", &self.Tq())
            .field("Qk", &self.Qk)
            .finish()
    }
}

/// **D**efine **Q**uantization **T**ables – sets one or more [`QuantizationTable`]s.
#[derive(Debug)]
pub struct Dqt(Vec<QuantizationTable>);

impl Dqt {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let mut tables = Vec::new();
        while !reader.is_empty() {
            let PqTq = reader.read_u8()?;
            let mut Qk = [0; 64];
            match split_byte(PqTq).0 {
                0 => {
                    let values: &[u8; 64] = reader.read_obj()?;
                    for (dest, src) in Qk.iter_mut().zip(values) {
                        *dest = u16::from(*src);
                    }
                }
                1 => {
                    for dest in &mut Qk {
                        *dest = reader.read_u16()?;
                    }
                }
                pq => {
                    return Err(Error::malformed(format!(
                        "invalid quantization table precision Pq={pq} (only 0 and 1 are valid)"
                    )))
                }
            }
            tables.push(QuantizationTable { PqTq, Qk });
        }
        Ok(Self(tables))
    }

    #[inline]
    pub fn tables(&self) -> &[QuantizationTable] {
        &self.0
    }
}

/// **D**efine **R**estart **I**nterval.
///
/// This segment enables the use of *Restart Intervals* and sets the number of MCUs contained in
/// each of them ([`Dri::Ri`]).
#[derive(Clone, Copy)]
pub struct Dri {
    Ri: u16,
}

impl Dri {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            Ri: reader.read_u16()?,
        })
    }

    /// Returns the number of MCUs contained in each restart interval.
    #[inline]
    pub fn Ri(&self) -> u16 {
        self.Ri
    }
}

impl fmt::Debug for Dri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dri").field("Ri", &self.Ri).finish()
    }
}

/// **EXP**and reference components.
#[derive(Clone, Copy)]
pub struct Exp {
    EhEv: u8,
}

impl Exp {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            EhEv: reader.read_u8()?,
        })
    }

    /// Returns the horizontal expansion flag.
    #[inline]
    pub fn Eh(&self) -> u8 {
        split_byte(self.EhEv).0
    }

    /// Returns the vertical expansion flag.
    #[inline]
    pub fn Ev(&self) -> u8 {
        split_byte(self.EhEv).1
    }
}

impl fmt::Debug for Exp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exp")
            .field("Eh", &self.Eh())
            .field("Ev", &self.Ev())
            .finish()
    }
}

/// **SOF** Start Of Frame (or **DHP**, which uses the same layout).
#[derive(Debug)]
pub struct Sof {
    /// The SOFn or DHP marker.
    marker: Marker,
    /// Sample precision in bits.
    P: u8,
    Y: u16,
    X: u16,
    components: Vec<FrameComponent>,
}

impl Sof {
    fn read(marker: Marker, reader: &mut Reader<'_>) -> Result<Self> {
        let P = reader.read_u8()?;
        let Y = reader.read_u16()?;
        let X = reader.read_u16()?;
        let num_components = reader.read_u8()?;
        let components = reader.read_objs::<FrameComponent>(num_components.into())?;
        Ok(Self {
            marker,
            P,
            Y,
            X,
            components: components.to_vec(),
        })
    }

    #[inline]
    pub fn marker(&self) -> Marker {
        self.marker
    }

    /// Returns the sample precision in bits.
    #[inline]
    pub fn P(&self) -> u8 {
        self.P
    }

    /// Returns the number of lines in the image (the height of the frame).
    #[inline]
    pub fn Y(&self) -> u16 {
        self.Y
    }

    /// Returns the number of samples per line (the width of the frame).
    #[inline]
    pub fn X(&self) -> u16 {
        self.X
    }

    /// Returns the number of image components in the frame.
    #[inline]
    pub fn Nf(&self) -> u8 {
        self.components.len() as u8
    }

    #[inline]
    pub fn components(&self) -> &[FrameComponent] {
        &self.components
    }

    /// Looks up a component by its identifier.
    pub fn component(&self, Ci: u8) -> Option<&FrameComponent> {
        self.components.iter().find(|c| c.Ci == Ci)
    }
}

#[derive(Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct FrameComponent {
    Ci: u8,
    HiVi: u8,
    Tqi: u8,
}

impl FrameComponent {
    /// Returns this component's component identifier.
    ///
    /// The scan header ([`Sos`]) refers to components using their identifier.
    #[inline]
    pub fn Ci(&self) -> u8 {
        self.Ci
    }

    /// Returns the horizontal sampling factor for this component.
    #[inline]
    pub fn Hi(&self) -> u8 {
        split_byte(self.HiVi).0
    }

    /// Returns the vertical sampling factor for this component.
    #[inline]
    pub fn Vi(&self) -> u8 {
        split_byte(self.HiVi).1
    }

    /// Returns the quantization table destination selector.
    #[inline]
    pub fn Tqi(&self) -> u8 {
        self.Tqi
    }
}

impl fmt::Debug for FrameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameComponent")
            .field("Ci", &self.Ci)
            .field("Hi", &self.Hi())
            .field("Vi", &self.Vi())
            .field("Tqi", &self.Tqi)
            .finish()
    }
}

/// **SOS** Start Of Scan – a scan header, followed by entropy-coded scan data.
pub struct Sos {
    components: Vec<ScanComponent>,
    Ss: u8,
    Se: u8,
    AhAl: u8,
    pub(crate) items: Vec<ScanItem>,
    pub(crate) data: Range<usize>,
}

impl Sos {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let num_components = reader.read_u8()?;
        let components = reader.read_objs::<ScanComponent>(num_components.into())?;
        let Ss = reader.read_u8()?;
        let Se = reader.read_u8()?;
        let AhAl = reader.read_u8()?;

        Ok(Self {
            components: components.to_vec(),
            Ss,
            Se,
            AhAl,
            items: Vec::new(),
            data: 0..0,
        })
    }

    #[inline]
    pub fn components(&self) -> &[ScanComponent] {
        &self.components
    }

    /// Returns the number of image components in the scan.
    #[inline]
    pub fn Ns(&self) -> u8 {
        self.components.len() as u8
    }

    /// Returns the start of spectral selection, or the predictor selection value in lossless
    /// mode.
    #[inline]
    pub fn Ss(&self) -> u8 {
        self.Ss
    }

    #[inline]
    pub fn Se(&self) -> u8 {
        self.Se
    }

    #[inline]
    pub fn Ah(&self) -> u8 {
        split_byte(self.AhAl).0
    }

    #[inline]
    pub fn Al(&self) -> u8 {
        split_byte(self.AhAl).1
    }

    /// Returns the entropy-coded chunks and restart markers of the scan, in stream order.
    #[inline]
    pub fn items(&self) -> &[ScanItem] {
        &self.items
    }

    pub fn entropy_chunks(&self) -> impl Iterator<Item = &EntropyChunk> {
        self.items.iter().filter_map(|item| match item {
            ScanItem::Entropy(chunk) => Some(chunk),
            ScanItem::Restart(_) => None,
        })
    }

    pub fn restarts(&self) -> impl Iterator<Item = &Restart> {
        self.items.iter().filter_map(|item| match item {
            ScanItem::Restart(rst) => Some(rst),
            ScanItem::Entropy(_) => None,
        })
    }

    /// Returns the location of the raw scan data in the input, including any contained `RST`
    /// markers and stuffed bytes.
    #[inline]
    pub fn data_range(&self) -> Range<usize> {
        self.data.clone()
    }
}

impl fmt::Debug for Sos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sos")
            .field("components", &self.components)
            .field("Ss", &self.Ss)
            .field("Se", &self.Se)
            .field("Ah", &self.Ah())
            .field("Al", &self.Al())
            .field("items", &self.items)
            .finish()
    }
}

#[derive(Clone, Copy, AnyBitPattern)]
#[repr(C)]
pub struct ScanComponent {
    Csj: u8,
    TdjTaj: u8,
}

impl ScanComponent {
    /// Returns the scan component selector.
    #[inline]
    pub fn Csj(&self) -> u8 {
        self.Csj
    }

    /// Returns the DC entropy coding table destination selector.
    #[inline]
    pub fn Tdj(&self) -> u8 {
        split_byte(self.TdjTaj).0
    }

    /// Returns the AC entropy coding table destination selector.
    #[inline]
    pub fn Taj(&self) -> u8 {
        split_byte(self.TdjTaj).1
    }
}

impl fmt::Debug for ScanComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanComponent")
            .field("Csj", &self.Csj)
            .field("Tdj", &self.Tdj())
            .field("Taj", &self.Taj())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::ErrorKind;

    use super::*;

    /// Decodes `bytes` (starting at the length field) and checks that exactly the declared length
    /// was consumed.
    fn decode(marker: Marker, bytes: &[u8]) -> Result<SegmentKind> {
        let mut reader = Reader::new(bytes);
        let codec = marker.codec().unwrap();
        let (length, kind) = read_segment(&mut reader, marker, codec, &ParseOptions::new())?;
        assert_eq!(reader.position(), usize::from(length));
        Ok(kind)
    }

    #[test]
    fn dqt_8_and_16_bit() {
        let mut bytes = vec![0x00, 2 + 65 + 129, 0x01];
        bytes.extend(0..64);
        bytes.push(0x12);
        for i in 0..64u16 {
            bytes.extend((i * 300).to_be_bytes());
        }
        bytes.extend([0xAA, 0xBB]); // following data

        let SegmentKind::Dqt(dqt) = decode(Marker::DQT, &bytes).unwrap() else {
            panic!()
        };
        let [t0, t1] = dqt.tables() else { panic!() };
        assert_eq!((t0.Pq(), t0.Tq()), (0, 1));
        assert_eq!(t0.Qk()[63], 63);
        assert_eq!((t1.Pq(), t1.Tq()), (1, 2));
        assert_eq!(t1.Qk()[1], 300);
        assert_eq!(t1.Qk()[63], 63 * 300);
    }

    #[test]
    fn dqt_invalid_precision() {
        let mut bytes = vec![0x00, 67, 0x20];
        bytes.extend([0; 64]);
        let err = decode(Marker::DQT, &bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSegment);
        assert_eq!(
            err.to_string(),
            "invalid quantization table precision Pq=2 (only 0 and 1 are valid)"
        );
    }

    #[test]
    fn dqt_overrun() {
        // 16-bit table needs 129 bytes, but the segment only declares 65.
        let mut bytes = vec![0x00, 67, 0x10];
        bytes.extend([0; 200]);
        let err = decode(Marker::DQT, &bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSegment);
    }

    #[test]
    fn dht_multiple_tables() {
        let mut bytes = vec![0x00, 2 + 17 + 3 + 17 + 1];
        bytes.push(0x00);
        bytes.extend([1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        bytes.extend([0x05, 0x06, 0x07]);
        bytes.push(0x13);
        bytes.extend([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        bytes.push(0xF0);

        let SegmentKind::Dht(dht) = decode(Marker::DHT, &bytes).unwrap() else {
            panic!()
        };
        let [dc, ac] = dht.tables() else { panic!() };
        assert_eq!((dc.Tc(), dc.Th()), (0, 0));
        assert_eq!(dc.Vij(), &[5, 6, 7]);
        let by_length = dc.values_by_length().collect::<Vec<_>>();
        assert_eq!(by_length.len(), 16);
        assert_eq!(by_length[0], (1, &[5][..]));
        assert_eq!(by_length[1], (2, &[6, 7][..]));
        assert!(by_length[2].1.is_empty());
        assert_eq!((ac.Tc(), ac.Th()), (1, 3));
        assert_eq!(ac.values_by_length().last(), Some((16, &[0xF0][..])));
    }

    #[test]
    fn dht_truncated_values() {
        let mut bytes = vec![0x00, 2 + 17 + 1, 0x00];
        bytes.extend([0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        bytes.extend([0x05, 0xFF, 0xD9]);
        let err = decode(Marker::DHT, &bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSegment);
    }

    #[test]
    fn dac_records() {
        let SegmentKind::Dac(dac) = decode(Marker::DAC, &[0x00, 0x06, 0x01, 0x10, 0x11, 0x05])
            .unwrap()
        else {
            panic!()
        };
        let [a, b] = dac.conditionings() else {
            panic!()
        };
        assert_eq!((a.Tc(), a.Tb(), a.Cs()), (0, 1, 0x10));
        assert_eq!((b.Tc(), b.Tb(), b.Cs()), (1, 1, 5));

        let err = decode(Marker::DAC, &[0x00, 0x05, 0x01, 0x10, 0x11]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSegment);
    }

    #[test]
    fn fixed_layouts() {
        let SegmentKind::Dnl(dnl) = decode(Marker::DNL, &[0x00, 0x04, 0x01, 0xE0]).unwrap() else {
            panic!()
        };
        assert_eq!(dnl.NL(), 480);

        let SegmentKind::Exp(exp) = decode(Marker::EXP, &[0x00, 0x03, 0x10]).unwrap() else {
            panic!()
        };
        assert_eq!((exp.Eh(), exp.Ev()), (1, 0));

        // Extra bytes are skipped, so the reader still ends up after the segment.
        let SegmentKind::Dri(dri) = decode(Marker::DRI, &[0x00, 0x05, 0x00, 0x20, 0x99]).unwrap()
        else {
            panic!()
        };
        assert_eq!(dri.Ri(), 32);

        let err = decode(Marker::DRI, &[0x00, 0x03, 0x00]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSegment);
    }

    #[test]
    fn strict_rejects_leftover_bytes() {
        let mut reader = Reader::new(&[0x00, 0x05, 0x00, 0x20, 0x99]);
        let err = read_segment(
            &mut reader,
            Marker::DRI,
            Codec::Dri,
            &ParseOptions::new().strict(true),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSegment);
    }

    #[test]
    fn sof_and_dhp() {
        let bytes = [
            0x00, 0x11, // Lf
            0x0C, // P
            0x00, 0x20, // Y
            0x00, 0x40, // X
            0x03, // Nf
            1, 0x22, 0, //
            2, 0x11, 1, //
            3, 0x11, 1,
        ];
        let SegmentKind::Sof(sof) = decode(Marker::SOF1, &bytes).unwrap() else {
            panic!()
        };
        assert_eq!(sof.marker(), Marker::SOF1);
        assert_eq!((sof.P(), sof.Y(), sof.X(), sof.Nf()), (12, 32, 64, 3));
        let y = sof.component(1).unwrap();
        assert_eq!((y.Hi(), y.Vi(), y.Tqi()), (2, 2, 0));
        assert_eq!(sof.component(3).unwrap().Tqi(), 1);
        assert!(sof.component(4).is_none());

        let SegmentKind::Dhp(dhp) = decode(Marker::DHP, &bytes).unwrap() else {
            panic!()
        };
        assert_eq!(dhp.marker(), Marker::DHP);

        // Nf claims more components than the segment holds.
        let err = decode(Marker::SOF0, &[0x00, 0x0B, 8, 0, 1, 0, 1, 4, 1, 0x11, 0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSegment);
    }

    #[test]
    fn sos_header() {
        let bytes = [
            0x00, 0x0A, // Ls
            0x02, // Ns
            1, 0x00, //
            2, 0x11, //
            0x01, 0x3F, 0x21,
        ];
        let SegmentKind::Sos(sos) = decode(Marker::SOS, &bytes).unwrap() else {
            panic!()
        };
        assert_eq!(sos.Ns(), 2);
        assert_eq!(sos.components()[1].Csj(), 2);
        assert_eq!(sos.components()[1].Tdj(), 1);
        assert_eq!(sos.components()[1].Taj(), 1);
        assert_eq!((sos.Ss(), sos.Se(), sos.Ah(), sos.Al()), (1, 63, 2, 1));
        assert!(sos.items().is_empty());
    }

    #[test]
    fn app_kinds() {
        let mut bytes = vec![0x00, 0x10];
        bytes.extend(b"JFIF\0");
        bytes.extend([1, 2, 1, 0, 72, 0, 72, 0, 0]);
        let SegmentKind::App(app) = decode(Marker::APP0, &bytes).unwrap() else {
            panic!()
        };
        assert_eq!(app.n(), 0);
        let Some(AppKind::Jfif(jfif)) = app.kind() else {
            panic!()
        };
        assert_eq!((jfif.major_version(), jfif.minor_version()), (1, 2));
        assert_eq!(jfif.unit(), DensityUnit::DotsPerInch);
        assert_eq!((jfif.density_x(), jfif.density_y()), (72, 72));
        assert!(jfif.thumbnail_data().is_empty());

        let mut bytes = vec![0x00, 0x0A];
        bytes.extend(b"Adobe\0");
        bytes.extend([100, 0]);
        let SegmentKind::App(app) = decode(Marker::from_byte(0xEE).unwrap(), &bytes).unwrap() else {
            panic!()
        };
        assert_eq!(app.n(), 14);
        assert!(matches!(
            app.kind(),
            Some(AppKind::Adobe { version: 100, .. })
        ));

        let SegmentKind::App(app) = decode(Marker::APP15, &[0x00, 0x04, 1, 2]).unwrap() else {
            panic!()
        };
        assert!(app.kind().is_none());
        assert_eq!(app.payload(), &[1, 2]);
    }

    #[test]
    fn com() {
        let SegmentKind::Com(com) = decode(Marker::COM, b"\x00\x07hello").unwrap() else {
            panic!()
        };
        assert_eq!(com.comment(), b"hello");
        assert_eq!(format!("{com:?}"), "Com(\"hello\")");
    }
}
