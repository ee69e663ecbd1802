//! PackStream marker bytes.
//!
//! The `TINY_*` constants are the high nibble of the inline forms; the low
//! nibble carries the size (0–15).

pub const TINY_TEXT: u8 = 0x80;
pub const TINY_LIST: u8 = 0x90;
pub const TINY_MAP: u8 = 0xA0;
pub const TINY_STRUCT: u8 = 0xB0;

pub const NULL: u8 = 0xC0;
pub const FLOAT_64: u8 = 0xC1;
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;

pub const INT_8: u8 = 0xC8;
pub const INT_16: u8 = 0xC9;
pub const INT_32: u8 = 0xCA;
pub const INT_64: u8 = 0xCB;

pub const BYTES_8: u8 = 0xCC;
pub const BYTES_16: u8 = 0xCD;
pub const BYTES_32: u8 = 0xCE;

pub const TEXT_8: u8 = 0xD0;
pub const TEXT_16: u8 = 0xD1;
pub const TEXT_32: u8 = 0xD2;

pub const LIST_8: u8 = 0xD4;
pub const LIST_16: u8 = 0xD5;
pub const LIST_32: u8 = 0xD6;
/// A list of unknown size, terminated by [`END_OF_STREAM`].
pub const LIST_STREAM: u8 = 0xD7;

pub const MAP_8: u8 = 0xD8;
pub const MAP_16: u8 = 0xD9;
pub const MAP_32: u8 = 0xDA;
/// A map of unknown size, terminated by [`END_OF_STREAM`].
pub const MAP_STREAM: u8 = 0xDB;

pub const STRUCT_8: u8 = 0xDC;
pub const STRUCT_16: u8 = 0xDD;

pub const END_OF_STREAM: u8 = 0xDF;

/// Largest size encodable in the low nibble of a tiny marker.
pub const TINY_SIZE_MAX: usize = 0x0F;
