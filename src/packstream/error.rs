//! PackStream codec errors.
use std::fmt;

use crate::value::Kind;

/// An error when decoding a PackStream value.
///
/// Decoders never read past the end of the buffer and never panic; a marker
/// that does not match the requested type, or a declared size larger than the
/// remaining buffer, is reported here. A marker mismatch leaves the cursor at
/// the offending marker.
pub enum DecodeError {
    /// The marker at the cursor encodes a different type.
    Unexpected {
        expected: Kind,
        found: u8,
    },
    /// Fewer bytes remain than the value declares.
    UnexpectedEof {
        requested: usize,
        available: usize,
    },
    /// The marker byte has no assigned meaning.
    Reserved {
        marker: u8,
    },
    /// A structure signature outside the protocol's message set.
    UnknownSignature {
        signature: u8,
    },
    /// An end-of-stream marker where a value was expected.
    UnexpectedEndOfStream,
    /// Containers nested past [`MAX_DEPTH`][crate::packstream::decode::MAX_DEPTH].
    TooDeep,
    /// Text payload is not valid UTF-8.
    Utf8(std::str::Utf8Error),
}

impl std::error::Error for DecodeError { }

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DecodeError::Unexpected { expected, found } => {
                write!(f, "expected `{expected}` found marker `{found:#04X}` ({})", Kind::of(found))
            }
            DecodeError::UnexpectedEof { requested, available } => {
                write!(f, "buffer exhausted: {requested} bytes requested, {available} available")
            }
            DecodeError::Reserved { marker } => {
                write!(f, "reserved marker `{marker:#04X}`")
            }
            DecodeError::UnknownSignature { signature } => {
                write!(f, "unknown message signature `{signature:#04X}`")
            }
            DecodeError::UnexpectedEndOfStream => {
                f.write_str("end-of-stream marker outside a streamed container")
            }
            DecodeError::TooDeep => {
                write!(f, "containers nested deeper than {}", super::decode::MAX_DEPTH)
            }
            DecodeError::Utf8(ref err) => err.fmt(f),
        }
    }
}

impl fmt::Debug for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<bytes::TryGetError> for DecodeError {
    fn from(err: bytes::TryGetError) -> Self {
        DecodeError::UnexpectedEof {
            requested: err.requested,
            available: err.available,
        }
    }
}

impl From<std::str::Utf8Error> for DecodeError {
    fn from(err: std::str::Utf8Error) -> Self {
        DecodeError::Utf8(err)
    }
}

/// An error when encoding a PackStream value.
///
/// Encoding never silently drops bytes; a value too large for the widest
/// header is reported here.
pub enum EncodeError {
    /// No header width can carry the value's size.
    TooLarge {
        what: &'static str,
        size: usize,
        max: usize,
    },
}

impl std::error::Error for EncodeError { }

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            EncodeError::TooLarge { what, size, max } => {
                write!(f, "{what} size {size} exceeds the wire maximum {max}")
            }
        }
    }
}

impl fmt::Debug for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
