//! Human-readable dump of the marker segments of a [`Jpeg`].

use std::fmt::{self, Write};

use crate::{
    jpeg::Jpeg,
    marker::Marker,
    scan::ScanItem,
    segment::{
        App, AppKind, Com, Dac, DensityUnit, Dht, Dqt, FrameComponent, Segment, SegmentKind, Sof,
        Sos,
    },
};

/// Maps positions in an 8x8 row-major grid to the zigzag index of the coefficient stored there.
const ZIGZAG: [usize; 64] = [
    0, 1, 5, 6, 14, 15, 27, 28, //
    2, 4, 7, 13, 16, 26, 29, 42, //
    3, 8, 12, 17, 25, 30, 41, 43, //
    9, 11, 18, 24, 31, 40, 44, 53, //
    10, 19, 23, 32, 39, 45, 52, 54, //
    20, 22, 33, 38, 46, 51, 55, 60, //
    21, 34, 37, 47, 50, 56, 59, 61, //
    35, 36, 48, 49, 57, 58, 62, 63, //
];

const WIDTH: usize = 63;

/// Renders all segments of `jpeg` as text.
///
/// This is the same as `jpeg.to_string()`.
pub fn render(jpeg: &Jpeg) -> String {
    jpeg.to_string()
}

impl fmt::Display for Jpeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments().iter().enumerate() {
            if i != 0 {
                f.write_char('\n')?;
            }
            write_segment(f, segment)?;
        }
        Ok(())
    }
}

/// Component identifier, printed as a letter if it is the ASCII code of a common channel name.
struct ComponentId(u8);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            b'B' | b'C' | b'G' | b'K' | b'M' | b'R' | b'Y' => f.write_char(char::from(self.0)),
            id => write!(f, "{id}"),
        }
    }
}

fn write_segment(f: &mut dyn Write, segment: &Segment) -> fmt::Result {
    let title = match segment.length() {
        Some(length) => format!(
            " {} marker at offset {}, length {} ",
            segment.name(),
            segment.offset(),
            u32::from(length) + 2,
        ),
        None => format!(" {} marker at offset {} ", segment.name(), segment.offset()),
    };
    match segment.kind() {
        SegmentKind::Soi | SegmentKind::Eoi => write!(f, "\n{title:=^WIDTH$}")?,
        _ => write!(f, "\n{title:-^WIDTH$}")?,
    }

    match segment.kind() {
        SegmentKind::Soi | SegmentKind::Eoi | SegmentKind::Unparsed => Ok(()),
        SegmentKind::App(app) => write_app(f, app),
        SegmentKind::Com(com) => write_com(f, com),
        SegmentKind::Dac(dac) => write_dac(f, dac),
        SegmentKind::Dht(dht) => write_dht(f, dht),
        SegmentKind::Dnl(dnl) => write!(f, "\nNL={}", dnl.NL()),
        SegmentKind::Dqt(dqt) => write_dqt(f, dqt),
        SegmentKind::Dri(dri) => write!(f, "\nRi={}", dri.Ri()),
        SegmentKind::Exp(exp) => write!(f, "\nEh={}, Ev={}", exp.Eh(), exp.Ev()),
        SegmentKind::Sof(sof) => {
            match frame_type(sof.marker()) {
                Some(desc) => write!(f, "\n{desc}")?,
                None => write!(f, "\nUnknown SOF type: {:#x}", sof.marker().code())?,
            }
            write_frame(f, sof)
        }
        SegmentKind::Dhp(dhp) => write_frame(f, dhp),
        SegmentKind::Sos(sos) => write_sos(f, sos),
    }
}

fn frame_type(marker: Marker) -> Option<&'static str> {
    Some(match marker {
        Marker::SOF0 => "Baseline sequential DCT",
        Marker::SOF1 => "Extended sequential DCT, Huffman coding",
        Marker::SOF2 => "Progressive DCT, Huffman coding",
        Marker::SOF3 => "Lossless (sequential), Huffman coding",
        Marker::SOF5 => "Differential sequential DCT, Huffman coding",
        Marker::SOF6 => "Differential progressive DCT, Huffman coding",
        Marker::SOF7 => "Differential lossless (sequential), Huffman coding",
        Marker::SOF9 => "Extended sequential DCT, arithmetic coding",
        Marker::SOF10 => "Progressive DCT, arithmetic coding",
        Marker::SOF11 => "Lossless (sequential), arithmetic coding",
        Marker::SOF13 => "Differential sequential DCT, arithmetic coding",
        Marker::SOF14 => "Differential progressive DCT, arithmetic coding",
        Marker::SOF15 => "Differential lossless (sequential), arithmetic coding",
        _ => return None,
    })
}

/// Writes `data` as indented lines of 20 space-separated hex bytes.
fn write_hex(f: &mut dyn Write, data: &[u8]) -> fmt::Result {
    for line in data.chunks(20) {
        f.write_str("\n ")?;
        for byte in line {
            write!(f, " {byte:02x}")?;
        }
    }
    Ok(())
}

fn write_app(f: &mut dyn Write, app: &App) -> fmt::Result {
    match app.kind() {
        Some(AppKind::Jfif(jfif)) => {
            let (major, minor) = (jfif.major_version(), jfif.minor_version());
            if jfif.thumbnail_width() != 0 && jfif.thumbnail_height() != 0 {
                let unit = match jfif.unit() {
                    DensityUnit::None => "unitless".to_string(),
                    DensityUnit::DotsPerInch => "px/inch".to_string(),
                    DensityUnit::DotsPerCm => "px/cm".to_string(),
                    DensityUnit::Unknown(u) => u.to_string(),
                };
                write!(
                    f,
                    "\nJFIF v{major}.{minor}, {unit}, ({}, {}), {} by {} px",
                    jfif.density_x(),
                    jfif.density_y(),
                    jfif.thumbnail_width(),
                    jfif.thumbnail_height(),
                )?;
            } else {
                write!(f, "\nJFIF v{major}.{minor}, no thumbnail")?;
            }
            write_hex(f, jfif.thumbnail_data())
        }
        Some(AppKind::Exif(data)) => {
            f.write_str("\nEXIF:")?;
            write_hex(f, data)
        }
        Some(AppKind::Adobe { version, data }) => {
            write!(f, "\nAdobe v{version}:")?;
            write_hex(f, data)
        }
        None => {
            f.write_str("\nUnknown APP data")?;
            write_hex(f, app.payload())
        }
    }
}

fn write_com(f: &mut dyn Write, com: &Com) -> fmt::Result {
    let comment = format!("'{}'", String::from_utf8_lossy(com.comment()));
    let chars = comment.chars().collect::<Vec<_>>();

    let (first, rest) = chars.split_at(chars.len().min(47));
    write!(f, "\n{}", first.iter().collect::<String>())?;
    for line in rest.chunks(WIDTH) {
        write!(f, "\n         {}", line.iter().collect::<String>())?;
    }
    Ok(())
}

fn write_dac(f: &mut dyn Write, dac: &Dac) -> fmt::Result {
    for c in dac.conditionings() {
        write!(f, "\nTc={}, Tb={}, Cs={}", c.Tc(), c.Tb(), c.Cs())?;
    }
    Ok(())
}

fn write_dht(f: &mut dyn Write, dht: &Dht) -> fmt::Result {
    for table in dht.tables() {
        match table.Tc() {
            0 => write!(f, "\nLossless/DC Huffman, table ID: {}", table.Th())?,
            1 => write!(f, "\nAC Huffman, table ID: {}", table.Th())?,
            tc => write!(f, "\nHuffman table class {tc}, table ID: {}", table.Th())?,
        }

        f.write_str("\n   1  2  3  4  5  6  7  8  9 10 11 12 13 14 15 16")?;
        let counts = table
            .Li()
            .iter()
            .map(|n| format!("{n:02x}"))
            .collect::<Vec<_>>();
        write!(f, "\n  {} : # codes", counts.join(" "))?;

        for (len, values) in table.values_by_length() {
            for row in values.chunks(16) {
                let row = row
                    .iter()
                    .map(|v| format!("{v:02x}"))
                    .collect::<Vec<_>>();
                write!(f, "\n  {:<47} : L = {}", row.join(" "), len)?;
            }
        }
    }
    Ok(())
}

fn write_dqt(f: &mut dyn Write, dqt: &Dqt) -> fmt::Result {
    for table in dqt.tables() {
        write!(f, "\nTable destination ID: {}", table.Tq())?;
        let (bits, width) = match table.Pq() {
            0 => (8, 2),
            _ => (16, 3),
        };
        write!(f, "\nTable precision: {} ({}-bit)", table.Pq(), bits)?;

        f.write_str("\nQuantization table:")?;
        for row in ZIGZAG.chunks(8) {
            let row = row
                .iter()
                .map(|&k| format!("{:>width$}", table.Qk()[k]))
                .collect::<Vec<_>>();
            write!(f, "\n  {}", row.join("  "))?;
        }
    }
    Ok(())
}

fn write_frame(f: &mut dyn Write, sof: &Sof) -> fmt::Result {
    write!(f, "\nSample size (px): {} x {}", sof.X(), sof.Y())?;
    write!(f, "\nSample precision (bits): {}", sof.P())?;
    write!(f, "\nNumber of component images: {}", sof.Nf())?;
    for component in sof.components() {
        write_frame_component(f, component)?;
    }
    Ok(())
}

fn write_frame_component(f: &mut dyn Write, c: &FrameComponent) -> fmt::Result {
    write!(f, "\n  Component ID: {}", ComponentId(c.Ci()))?;
    write!(f, "\n    Horizontal sampling factor: {}", c.Hi())?;
    write!(f, "\n    Vertical sampling factor: {}", c.Vi())?;
    write!(f, "\n    Quantization table destination: {}", c.Tqi())
}

fn write_sos(f: &mut dyn Write, sos: &Sos) -> fmt::Result {
    write!(f, "\nNumber of image components: {}", sos.Ns())?;
    for c in sos.components() {
        write!(
            f,
            "\n  Component: {}, DC table: {}, AC table: {}",
            ComponentId(c.Csj()),
            c.Tdj(),
            c.Taj(),
        )?;
    }
    write!(f, "\nSpectral selectors start-end: {}-{}", sos.Ss(), sos.Se())?;
    write!(
        f,
        "\nSuccessive approximation bit high-low: {}-{}",
        sos.Ah(),
        sos.Al()
    )?;

    for item in sos.items() {
        match item {
            ScanItem::Entropy(chunk) => {
                let title = format!(" ENC marker at offset {}", chunk.offset());
                write!(f, "\n\n{title:.^WIDTH$}")?;
                write!(f, "\n\n{} bytes of entropy-coded data", chunk.data().len())?;
            }
            ScanItem::Restart(rst) => {
                write!(
                    f,
                    "\n{:<7}{}(ffd{})",
                    rst.offset(),
                    rst.marker().name(),
                    rst.n()
                )?;
            }
        }
    }
    Ok(())
}
