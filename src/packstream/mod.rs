//! PackStream serialization format.
//!
//! PackStream is the compact, self-describing binary format carrying every
//! protocol value. The first byte of an encoded value, the *marker*, encodes
//! its type and, for small values, its size:
//!
//! ```text
//! | marker |  size?  | payload..
//! |--------|---------|----------
//! |   D1   | 01 | 2C | 300 UTF-8 bytes
//!
//! Marker -> optional explicit size -> payload
//! ```
//!
//! Small sizes ride in the marker's low nibble (`0x80–0x8F` is text of 0–15
//! bytes); larger values use a distinct marker followed by an explicit
//! 8/16/32-bit big-endian size. Tiny integers occupy `0x00–0x7F` (the value
//! itself) and `0xF0–0xFF` (-16..=-1), so most integers cost a single byte.
//!
//! Structures carry a field count and a 1-byte signature identifying their
//! semantic kind; protocol messages are structures at the top level.
//!
//! Lists and maps may alternatively be *streamed*: a dedicated marker opens a
//! container of unknown size which runs until an end-of-stream marker
//! (`0xDF`). The header decoders report this as [`Size::Streamed`] rather
//! than a fake element count.

pub mod marker;
pub mod decode;
pub mod encode;

mod error;

pub use decode::Size;
pub use error::{DecodeError, EncodeError};
