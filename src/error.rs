//! `boltro` error types.
use std::{backtrace::Backtrace, fmt, io};

use crate::{
    connection::HandshakeError,
    frame::OverflowError,
    packstream::{DecodeError, EncodeError},
};

/// A specialized [`Result`] type for `boltro` operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All possible error from `boltro` library.
pub struct Error {
    context: String,
    backtrace: Backtrace,
    kind: ErrorKind,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

/// All possible error kind from `boltro` library.
pub enum ErrorKind {
    /// The channel failed to open, send or receive. Fatal; the connection
    /// must be discarded.
    Io(io::Error),
    /// The version exchange did not complete. Fatal.
    Handshake(HandshakeError),
    /// The current message is corrupt; recoverable at the message boundary.
    Decode(DecodeError),
    /// The request cannot be represented on the wire.
    Encode(EncodeError),
    /// A chunk or message outgrew a hard size limit. Fatal for that message.
    Overflow(OverflowError),
}

macro_rules! from {
    (<$ty:ty>$pat:pat => $body:expr) => {
        impl From<$ty> for Error {
            fn from($pat: $ty) -> Self {
                let backtrace = std::backtrace::Backtrace::capture();
                Self { context: String::new(), backtrace, kind: $body }
            }
        }
    };
}

from!(<ErrorKind>e => e);
from!(<io::Error>e => ErrorKind::Io(e));
from!(<HandshakeError>e => ErrorKind::Handshake(e));
from!(<DecodeError>e => ErrorKind::Decode(e));
from!(<EncodeError>e => ErrorKind::Encode(e));
from!(<OverflowError>e => ErrorKind::Overflow(e));

impl std::error::Error for Error { }

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.context.is_empty() {
            write!(f, "{}: ", self.context)?;
        }

        fmt::Display::fmt(&self.kind, f)?;

        if let std::backtrace::BacktraceStatus::Captured = self.backtrace.status() {
            let mut backtrace = self.backtrace.to_string();
            write!(f, "\n\n")?;
            writeln!(f, "Stack backtrace:")?;
            backtrace.truncate(backtrace.trim_end().len());
            write!(f, "{}", backtrace)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl std::error::Error for ErrorKind { }

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => e.fmt(f),
            Self::Handshake(e) => e.fmt(f),
            Self::Decode(e) => e.fmt(f),
            Self::Encode(e) => e.fmt(f),
            Self::Overflow(e) => e.fmt(f),
        }
    }
}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
