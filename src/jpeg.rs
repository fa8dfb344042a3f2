//! The parsed representation of a JPEG image and its coding process classification.
//!
//! ISO/IEC 10918-1 defines 29 coding processes. The non-hierarchical ones are:
//!
//! | Process | Mode                                  | Coding     | Precision |
//! |---------|---------------------------------------|------------|-----------|
//! | 1       | Baseline sequential DCT               | Huffman    | 8         |
//! | 2, 3    | Extended sequential DCT               | Huff/Arith | 8         |
//! | 4, 5    | Extended sequential DCT               | Huff/Arith | 12        |
//! | 6, 7    | Progressive DCT, spectral selection   | Huff/Arith | 8         |
//! | 8, 9    | Progressive DCT, spectral selection   | Huff/Arith | 12        |
//! | 10, 11  | Progressive DCT, full progression     | Huff/Arith | 8         |
//! | 12, 13  | Progressive DCT, full progression     | Huff/Arith | 12        |
//! | 14, 15  | Lossless                              | Huff/Arith | 2-16      |
//!
//! Processes 16 to 29 are the hierarchical counterparts of processes 2 to 15.

use crate::{
    error::{Error, Result},
    marker::Marker,
    segment::{FrameComponent, Segment, SegmentKind, Sof, Sos},
};

/// DICOM transfer syntax UID for process 1.
const JPEG_BASELINE: &str = "1.2.840.10008.1.2.4.50";
/// DICOM transfer syntax UID for processes 2 and 4.
const JPEG_EXTENDED: &str = "1.2.840.10008.1.2.4.51";
/// DICOM transfer syntax UID for process 14 with selection value 1.
const JPEG_LOSSLESS_SV1: &str = "1.2.840.10008.1.2.4.70";
/// DICOM transfer syntax UID for process 14.
const JPEG_LOSSLESS: &str = "1.2.840.10008.1.2.4.57";

/// A parsed JPEG image: every marker segment in stream order.
///
/// The first segment is always SOI. Unless [`Jpeg::is_truncated`] returns `true`, the last segment
/// is EOI.
#[derive(Debug)]
pub struct Jpeg {
    segments: Vec<Segment>,
    truncated: bool,
}

impl Jpeg {
    pub(crate) fn new(segments: Vec<Segment>, truncated: bool) -> Self {
        Self {
            segments,
            truncated,
        }
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the markers of all segments, in stream order.
    pub fn markers(&self) -> impl Iterator<Item = Marker> + '_ {
        self.segments.iter().map(Segment::marker)
    }

    /// Returns the headers of all scans, in stream order.
    pub fn scans(&self) -> impl Iterator<Item = &Sos> {
        self.segments.iter().filter_map(|seg| match seg.kind() {
            SegmentKind::Sos(sos) => Some(sos),
            _ => None,
        })
    }

    /// Returns the first frame header (SOFn segment).
    ///
    /// DHP segments are not considered frame headers.
    pub fn frame(&self) -> Option<&Sof> {
        self.segments.iter().find_map(|seg| match seg.kind() {
            SegmentKind::Sof(sof) => Some(sof),
            _ => None,
        })
    }

    /// Returns whether the input ended inside of entropy-coded data, before an EOI marker.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Returns the number of lines in the image.
    pub fn rows(&self) -> Option<u16> {
        self.frame().map(Sof::Y)
    }

    /// Returns the number of samples per line.
    pub fn columns(&self) -> Option<u16> {
        self.frame().map(Sof::X)
    }

    /// Returns the number of image components in the frame.
    pub fn num_components(&self) -> Option<u8> {
        self.frame().map(Sof::Nf)
    }

    /// Returns the sample precision in bits.
    pub fn precision(&self) -> Option<u8> {
        self.frame().map(Sof::P)
    }

    pub fn component_table(&self) -> Option<&[FrameComponent]> {
        self.frame().map(Sof::components)
    }

    /// Returns the predictor selection value of a lossless image.
    ///
    /// This is `Ss` of the first scan. Returns `None` if the image is not lossless, or has no
    /// scans.
    pub fn selection_value(&self) -> Option<u8> {
        if !self.is_lossless() {
            return None;
        }
        self.scans().next().map(Sos::Ss)
    }

    fn has_any(&self, markers: &[Marker]) -> bool {
        self.markers().any(|m| markers.contains(&m))
    }

    pub fn is_baseline(&self) -> bool {
        self.has_any(&[Marker::SOF0])
    }

    pub fn is_extended(&self) -> bool {
        self.has_any(&[Marker::SOF1, Marker::SOF5, Marker::SOF9, Marker::SOF13])
    }

    pub fn is_progressive(&self) -> bool {
        self.has_any(&[Marker::SOF2, Marker::SOF6, Marker::SOF10, Marker::SOF14])
    }

    pub fn is_lossless(&self) -> bool {
        self.has_any(&[Marker::SOF3, Marker::SOF11])
    }

    pub fn is_hierarchical(&self) -> bool {
        self.has_any(&[Marker::DHP])
    }

    #[inline]
    pub fn is_sequential(&self) -> bool {
        !self.is_hierarchical()
    }

    /// Returns whether the image uses arithmetic coding, as declared by its first frame header.
    pub fn is_arithmetic(&self) -> bool {
        self.frame().map_or(false, |sof| sof.marker().is_arithmetic())
    }

    /// Returns whether a progressive image uses successive approximation in any of its scans.
    ///
    /// Progressive images that don't are spectral selection only.
    pub fn is_full_progression(&self) -> bool {
        self.is_progressive() && self.scans().any(|sos| sos.Ah() != 0 || sos.Al() != 0)
    }

    /// Determines the coding process (1 to 29) of the image.
    ///
    /// Fails with [`ErrorKind::IndeterminateProcess`] if the image has no frame header, or its
    /// combination of frame type and sample precision does not correspond to any process.
    ///
    /// [`ErrorKind::IndeterminateProcess`]: crate::ErrorKind::IndeterminateProcess
    pub fn process(&self) -> Result<u8> {
        let precision = self
            .precision()
            .ok_or_else(|| Error::indeterminate("image has no frame header"))?;
        let hierarchical = self.is_hierarchical();
        let arithmetic = u8::from(self.is_arithmetic());

        let dct = |first: u8| match precision {
            8 => Some(first + arithmetic),
            12 => Some(first + 2 + arithmetic),
            _ => None,
        };

        let process = if self.is_baseline() {
            match (precision, hierarchical) {
                (8, false) => Some(1),
                // Hierarchical baseline frames belong to process 16.
                (8, true) => Some(2),
                _ => None,
            }
        } else if self.is_extended() {
            dct(2)
        } else if self.is_progressive() {
            if self.is_full_progression() {
                dct(10)
            } else {
                dct(6)
            }
        } else if self.is_lossless() {
            (2..=16).contains(&precision).then_some(14 + arithmetic)
        } else {
            None
        };

        match process {
            Some(p) if hierarchical => Ok(p + 14),
            Some(p) => Ok(p),
            None => Err(Error::indeterminate(format!(
                "unable to determine the coding process of a {}-bit image with markers {:?}",
                precision,
                self.markers().filter(|m| m.is_sof() || *m == Marker::DHP).collect::<Vec<_>>(),
            ))),
        }
    }

    /// Returns the DICOM transfer syntax UID matching the image's coding process, if there is
    /// one.
    pub fn dicom_transfer_syntax(&self) -> Option<&'static str> {
        match self.process().ok()? {
            1 => Some(JPEG_BASELINE),
            2 | 4 => Some(JPEG_EXTENDED),
            14 if self.selection_value() == Some(1) => Some(JPEG_LOSSLESS_SV1),
            14 => Some(JPEG_LOSSLESS),
            _ => None,
        }
    }
}
