use core::fmt;
use std::io;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type returned when scanning a JPEG stream fails.
pub struct Error {
    repr: Repr,
}

/// Categories of [`Error`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The data does not begin with an SOI marker.
    NotAJpegStream,
    /// A marker code without an entry in the marker table was encountered.
    UnknownMarker,
    /// A marker segment is structurally invalid (eg. it contains more data than its declared
    /// length allows).
    MalformedSegment,
    /// The coding process could not be determined.
    IndeterminateProcess,
    /// The input ended before the JPEG structure was complete.
    UnexpectedEndOfStream,
    /// Reading the input failed.
    Io,
}

pub(crate) enum Repr {
    NotAJpegStream(String),
    UnknownMarker { code: u16, offset: usize },
    MalformedSegment(String),
    IndeterminateProcess(String),
    UnexpectedEndOfStream,
    Io(io::Error),
}

impl Error {
    pub(crate) fn not_a_jpeg(msg: impl Into<String>) -> Self {
        Self {
            repr: Repr::NotAJpegStream(msg.into()),
        }
    }

    pub(crate) fn unknown_marker(code: u16, offset: usize) -> Self {
        Self {
            repr: Repr::UnknownMarker { code, offset },
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self {
            repr: Repr::MalformedSegment(msg.into()),
        }
    }

    pub(crate) fn indeterminate(msg: impl Into<String>) -> Self {
        Self {
            repr: Repr::IndeterminateProcess(msg.into()),
        }
    }

    pub(crate) fn end_of_stream() -> Self {
        Self {
            repr: Repr::UnexpectedEndOfStream,
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            Repr::NotAJpegStream(_) => ErrorKind::NotAJpegStream,
            Repr::UnknownMarker { .. } => ErrorKind::UnknownMarker,
            Repr::MalformedSegment(_) => ErrorKind::MalformedSegment,
            Repr::IndeterminateProcess(_) => ErrorKind::IndeterminateProcess,
            Repr::UnexpectedEndOfStream => ErrorKind::UnexpectedEndOfStream,
            Repr::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self { repr: Repr::Io(e) }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Io(e) => e.fmt(f),
            _ => fmt::Display::fmt(self, f),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::NotAJpegStream(s) | Repr::MalformedSegment(s) | Repr::IndeterminateProcess(s) => {
                s.fmt(f)
            }
            Repr::UnknownMarker { code, offset } => {
                write!(f, "unknown marker 0x{code:04X} at offset {offset}")
            }
            Repr::UnexpectedEndOfStream => {
                f.write_str("reached end of data while decoding JPEG stream")
            }
            Repr::Io(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.repr {
            Repr::Io(e) => Some(e),
            _ => None,
        }
    }
}
