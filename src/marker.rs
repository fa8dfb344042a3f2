//! The table of ISO/IEC 10918-1 marker codes (Table B.1).

use std::fmt;

/// Decoder used for the payload of a marker segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    App,
    Com,
    Dac,
    Dht,
    Dnl,
    Dqt,
    Dri,
    Exp,
    /// Frame header; also used for `DHP`, which has the same layout.
    Sof,
    Sos,
}

/// Static description of a marker code.
#[derive(Debug, Clone, Copy)]
pub struct MarkerInfo {
    name: &'static str,
    description: &'static str,
    codec: Option<Codec>,
}

impl MarkerInfo {
    /// Returns the short marker name, eg. `SOF0` or `APP14`.
    ///
    /// All reserved markers in the range `0xFF02..=0xFFBF` are named `RES`.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Returns the codec for the marker's payload, or `None` if the payload (if any) is not
    /// decoded.
    #[inline]
    pub fn codec(&self) -> Option<Codec> {
        self.codec
    }
}

const fn entry(
    name: &'static str,
    description: &'static str,
    codec: Option<Codec>,
) -> Option<MarkerInfo> {
    Some(MarkerInfo {
        name,
        description,
        codec,
    })
}

const fn describe(byte: u8) -> Option<MarkerInfo> {
    const APP: &str = "Reserved for application segments";
    const JPG: &str = "Reserved for JPEG extensions";

    match byte {
        0x01 => entry(
            "TEM",
            "For temporary private use in arithmetic coding",
            None,
        ),
        0x02..=0xBF => entry("RES", "Reserved", None),

        // Start Of Frame markers, non-differential, Huffman coding
        0xC0 => entry("SOF0", "Baseline DCT", Some(Codec::Sof)),
        0xC1 => entry("SOF1", "Extended sequential DCT", Some(Codec::Sof)),
        0xC2 => entry("SOF2", "Progressive DCT", Some(Codec::Sof)),
        0xC3 => entry("SOF3", "Lossless (sequential)", Some(Codec::Sof)),
        0xC4 => entry("DHT", "Define Huffman table(s)", Some(Codec::Dht)),
        // Start Of Frame markers, differential, Huffman coding
        0xC5 => entry("SOF5", "Differential sequential DCT", Some(Codec::Sof)),
        0xC6 => entry("SOF6", "Differential progressive DCT", Some(Codec::Sof)),
        0xC7 => entry(
            "SOF7",
            "Differential lossless (sequential)",
            Some(Codec::Sof),
        ),
        // Start Of Frame markers, non-differential, arithmetic coding
        0xC8 => entry("JPG", JPG, None),
        0xC9 => entry("SOF9", "Extended sequential DCT", Some(Codec::Sof)),
        0xCA => entry("SOF10", "Progressive DCT", Some(Codec::Sof)),
        0xCB => entry("SOF11", "Lossless (sequential)", Some(Codec::Sof)),
        0xCC => entry(
            "DAC",
            "Define arithmetic coding conditioning(s)",
            Some(Codec::Dac),
        ),
        // Start Of Frame markers, differential, arithmetic coding
        0xCD => entry("SOF13", "Differential sequential DCT", Some(Codec::Sof)),
        0xCE => entry("SOF14", "Differential progressive DCT", Some(Codec::Sof)),
        0xCF => entry(
            "SOF15",
            "Differential lossless (sequential)",
            Some(Codec::Sof),
        ),

        0xD0 => entry("RST0", "Restart with modulo 8 count \"0\"", None),
        0xD1 => entry("RST1", "Restart with modulo 8 count \"1\"", None),
        0xD2 => entry("RST2", "Restart with modulo 8 count \"2\"", None),
        0xD3 => entry("RST3", "Restart with modulo 8 count \"3\"", None),
        0xD4 => entry("RST4", "Restart with modulo 8 count \"4\"", None),
        0xD5 => entry("RST5", "Restart with modulo 8 count \"5\"", None),
        0xD6 => entry("RST6", "Restart with modulo 8 count \"6\"", None),
        0xD7 => entry("RST7", "Restart with modulo 8 count \"7\"", None),

        0xD8 => entry("SOI", "Start of image", None),
        0xD9 => entry("EOI", "End of image", None),
        0xDA => entry("SOS", "Start of scan", Some(Codec::Sos)),
        0xDB => entry("DQT", "Define quantization table(s)", Some(Codec::Dqt)),
        0xDC => entry("DNL", "Define number of lines", Some(Codec::Dnl)),
        0xDD => entry("DRI", "Define restart interval", Some(Codec::Dri)),
        0xDE => entry(
            "DHP",
            "Define hierarchical progression",
            Some(Codec::Sof),
        ),
        0xDF => entry("EXP", "Expand reference component(s)", Some(Codec::Exp)),

        0xE0 => entry("APP0", APP, Some(Codec::App)),
        0xE1 => entry("APP1", APP, Some(Codec::App)),
        0xE2 => entry("APP2", APP, Some(Codec::App)),
        0xE3 => entry("APP3", APP, Some(Codec::App)),
        0xE4 => entry("APP4", APP, Some(Codec::App)),
        0xE5 => entry("APP5", APP, Some(Codec::App)),
        0xE6 => entry("APP6", APP, Some(Codec::App)),
        0xE7 => entry("APP7", APP, Some(Codec::App)),
        0xE8 => entry("APP8", APP, Some(Codec::App)),
        0xE9 => entry("APP9", APP, Some(Codec::App)),
        0xEA => entry("APP10", APP, Some(Codec::App)),
        0xEB => entry("APP11", APP, Some(Codec::App)),
        0xEC => entry("APP12", APP, Some(Codec::App)),
        0xED => entry("APP13", APP, Some(Codec::App)),
        0xEE => entry("APP14", APP, Some(Codec::App)),
        0xEF => entry("APP15", APP, Some(Codec::App)),

        0xF0 => entry("JPG0", JPG, None),
        0xF1 => entry("JPG1", JPG, None),
        0xF2 => entry("JPG2", JPG, None),
        0xF3 => entry("JPG3", JPG, None),
        0xF4 => entry("JPG4", JPG, None),
        0xF5 => entry("JPG5", JPG, None),
        0xF6 => entry("JPG6", JPG, None),
        0xF7 => entry("JPG7", JPG, None),
        0xF8 => entry("JPG8", JPG, None),
        0xF9 => entry("JPG9", JPG, None),
        0xFA => entry("JPG10", JPG, None),
        0xFB => entry("JPG11", JPG, None),
        0xFC => entry("JPG12", JPG, None),
        0xFD => entry("JPG13", JPG, None),
        0xFE => entry("COM", "Comment", Some(Codec::Com)),

        // `0xFF 0x00` is a stuffed data byte and `0xFF 0xFF` is fill, neither is a marker.
        0x00 | 0xFF => None,
    }
}

static MARKERS: [Option<MarkerInfo>; 256] = {
    let mut table = [None; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = describe(i as u8);
        i += 1;
    }
    table
};

/// A JPEG marker, identified by the byte following its `0xFF` prefix.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Marker(u8);

impl Marker {
    /// Baseline DCT.
    pub const SOF0: Self = Self(0xC0);
    /// Extended Sequential DCT.
    pub const SOF1: Self = Self(0xC1);
    /// Progressive DCT.
    pub const SOF2: Self = Self(0xC2);
    /// Lossless sequential.
    pub const SOF3: Self = Self(0xC3);
    pub const DHT: Self = Self(0xC4);
    /// Differential sequential DCT.
    pub const SOF5: Self = Self(0xC5);
    /// Differential progressive DCT.
    pub const SOF6: Self = Self(0xC6);
    /// Differential lossless (sequential).
    pub const SOF7: Self = Self(0xC7);
    /// Reserved for JPEG extensions.
    pub const JPG: Self = Self(0xC8);
    /// Extended sequential DCT.
    pub const SOF9: Self = Self(0xC9);
    /// Progressive DCT.
    pub const SOF10: Self = Self(0xCA);
    /// Lossless (sequential).
    pub const SOF11: Self = Self(0xCB);
    pub const DAC: Self = Self(0xCC);
    /// Differential sequential DCT.
    pub const SOF13: Self = Self(0xCD);
    /// Differential progressive DCT.
    pub const SOF14: Self = Self(0xCE);
    /// Differential lossless (sequential).
    pub const SOF15: Self = Self(0xCF);
    pub const RST0: Self = Self(0xD0);
    pub const RST7: Self = Self(0xD7);
    pub const SOI: Self = Self(0xD8);
    pub const EOI: Self = Self(0xD9);
    pub const SOS: Self = Self(0xDA);
    pub const DQT: Self = Self(0xDB);
    pub const DNL: Self = Self(0xDC);
    pub const DRI: Self = Self(0xDD);
    pub const DHP: Self = Self(0xDE);
    pub const EXP: Self = Self(0xDF);
    pub const APP0: Self = Self(0xE0);
    pub const APP15: Self = Self(0xEF);
    pub const COM: Self = Self(0xFE);
    pub const TEM: Self = Self(0x01);

    /// Looks up the marker identified by `byte` (the `0xXX` in `0xFF 0xXX`).
    ///
    /// Returns `None` for `0x00` and `0xFF`, which do not identify markers.
    pub fn from_byte(byte: u8) -> Option<Self> {
        MARKERS[usize::from(byte)].map(|_| Self(byte))
    }

    /// Looks up the marker with the 16-bit code `code`.
    pub fn from_code(code: u16) -> Option<Self> {
        match code.to_be_bytes() {
            [0xFF, byte] => Self::from_byte(byte),
            _ => None,
        }
    }

    /// Returns the restart marker `RSTn`.
    ///
    /// # Panics
    ///
    /// Panics if `n` is greater than 7.
    pub fn rst(n: u8) -> Self {
        assert!(n < 8, "invalid restart marker RST{n}");
        Self(0xD0 + n)
    }

    /// Returns the second byte of the marker.
    #[inline]
    pub fn byte(self) -> u8 {
        self.0
    }

    /// Returns the 16-bit marker code, eg. `0xFFD8` for SOI.
    #[inline]
    pub fn code(self) -> u16 {
        0xFF00 | u16::from(self.0)
    }

    #[inline]
    pub fn info(self) -> &'static MarkerInfo {
        // Markers can only be constructed from bytes that have a table entry.
        MARKERS[usize::from(self.0)]
            .as_ref()
            .expect("marker without table entry")
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    #[inline]
    pub fn description(self) -> &'static str {
        self.info().description
    }

    #[inline]
    pub fn codec(self) -> Option<Codec> {
        self.info().codec
    }

    /// Returns whether the marker is followed by a segment length field.
    ///
    /// The standalone markers are SOI, EOI, TEM and RSTn. Every other marker, even a reserved one,
    /// is followed by the segment length.
    pub fn has_length(self) -> bool {
        !matches!(self.0, 0x01 | 0xD0..=0xD9)
    }

    /// Returns whether this is one of the 13 SOFn markers (`DHP` excluded).
    pub fn is_sof(self) -> bool {
        matches!(self.0, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF)
    }

    /// Returns whether this is an SOFn marker of a frame using arithmetic coding.
    pub fn is_arithmetic(self) -> bool {
        matches!(self.0, 0xC9..=0xCB | 0xCD..=0xCF)
    }

    /// Returns whether this is a differential (hierarchical) SOFn marker.
    pub fn is_differential(self) -> bool {
        matches!(self.0, 0xC5..=0xC7 | 0xCD..=0xCF)
    }

    /// If this is a restart marker, returns its modulo-8 count.
    pub fn restart_count(self) -> Option<u8> {
        match self.0 {
            0xD0..=0xD7 => Some(self.0 - 0xD0),
            _ => None,
        }
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
