//! PackStream decoders.
//!
//! Each decoder takes the message buffer as its cursor and consumes exactly
//! the bytes of one value (or one header). Container decoders return only the
//! declared size; the caller pulls that many child values through the same
//! entry points, so arbitrarily nested data can be walked without
//! materializing a tree. [`read_value`] is the eager convenience built on top.
use bytes::{Buf, Bytes};

use super::{error::DecodeError, marker};
use crate::{
    common::ByteStr,
    value::{Kind, Value},
};

/// Declared size of a list or map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Size {
    /// Exactly this many elements (entries, for a map) follow.
    Counted(usize),
    /// Elements follow until an end-of-stream marker.
    Streamed,
}

fn peek(buf: &Bytes) -> Result<u8, DecodeError> {
    buf.first()
        .copied()
        .ok_or(DecodeError::UnexpectedEof { requested: 1, available: 0 })
}

/// Split `size` payload bytes off the cursor, or fail without reading.
fn split_payload(buf: &mut Bytes, size: usize) -> Result<Bytes, DecodeError> {
    if buf.remaining() < size {
        return Err(DecodeError::UnexpectedEof {
            requested: size,
            available: buf.remaining(),
        });
    }
    Ok(buf.split_to(size))
}

pub fn read_null(buf: &mut Bytes) -> Result<(), DecodeError> {
    match peek(buf)? {
        marker::NULL => {
            buf.advance(1);
            Ok(())
        }
        found => Err(DecodeError::Unexpected { expected: Kind::Null, found }),
    }
}

pub fn read_boolean(buf: &mut Bytes) -> Result<bool, DecodeError> {
    match peek(buf)? {
        marker::TRUE => {
            buf.advance(1);
            Ok(true)
        }
        marker::FALSE => {
            buf.advance(1);
            Ok(false)
        }
        found => Err(DecodeError::Unexpected { expected: Kind::Boolean, found }),
    }
}

pub fn read_integer(buf: &mut Bytes) -> Result<i64, DecodeError> {
    let marker = peek(buf)?;
    match marker {
        // tiny positive, value embedded in the marker
        0x00..=0x7F => {
            buf.advance(1);
            Ok(marker as i64)
        }
        // tiny negative, the marker read as i8 (-16..=-1)
        0xF0..=0xFF => {
            buf.advance(1);
            Ok(marker as i8 as i64)
        }
        marker::INT_8 => {
            buf.advance(1);
            Ok(buf.try_get_i8()? as i64)
        }
        marker::INT_16 => {
            buf.advance(1);
            Ok(buf.try_get_i16()? as i64)
        }
        marker::INT_32 => {
            buf.advance(1);
            Ok(buf.try_get_i32()? as i64)
        }
        marker::INT_64 => {
            buf.advance(1);
            Ok(buf.try_get_i64()?)
        }
        found => Err(DecodeError::Unexpected { expected: Kind::Integer, found }),
    }
}

pub fn read_float(buf: &mut Bytes) -> Result<f64, DecodeError> {
    match peek(buf)? {
        marker::FLOAT_64 => {
            buf.advance(1);
            Ok(buf.try_get_f64()?)
        }
        found => Err(DecodeError::Unexpected { expected: Kind::Float, found }),
    }
}

/// Read a byte-array header, leaving the cursor at the first payload byte.
pub fn read_bytes_header(buf: &mut Bytes) -> Result<usize, DecodeError> {
    let marker = peek(buf)?;
    match marker {
        marker::BYTES_8 => {
            buf.advance(1);
            Ok(buf.try_get_u8()? as usize)
        }
        marker::BYTES_16 => {
            buf.advance(1);
            Ok(buf.try_get_u16()? as usize)
        }
        marker::BYTES_32 => {
            buf.advance(1);
            Ok(buf.try_get_u32()? as usize)
        }
        found => Err(DecodeError::Unexpected { expected: Kind::Bytes, found }),
    }
}

/// Read a whole byte array, header and payload.
pub fn read_bytes(buf: &mut Bytes) -> Result<Bytes, DecodeError> {
    let size = read_bytes_header(buf)?;
    split_payload(buf, size)
}

/// Read a text header, leaving the cursor at the first byte of the UTF-8
/// payload.
pub fn read_text_header(buf: &mut Bytes) -> Result<usize, DecodeError> {
    let marker = peek(buf)?;
    match marker {
        0x80..=0x8F => {
            buf.advance(1);
            Ok((marker & 0x0F) as usize)
        }
        marker::TEXT_8 => {
            buf.advance(1);
            Ok(buf.try_get_u8()? as usize)
        }
        marker::TEXT_16 => {
            buf.advance(1);
            Ok(buf.try_get_u16()? as usize)
        }
        marker::TEXT_32 => {
            buf.advance(1);
            Ok(buf.try_get_u32()? as usize)
        }
        found => Err(DecodeError::Unexpected { expected: Kind::Text, found }),
    }
}

/// Read a whole text value as a slice of the message buffer.
pub fn read_text(buf: &mut Bytes) -> Result<ByteStr, DecodeError> {
    let size = read_text_header(buf)?;
    let payload = split_payload(buf, size)?;
    Ok(ByteStr::from_utf8(payload)?)
}

pub fn read_list_header(buf: &mut Bytes) -> Result<Size, DecodeError> {
    let marker = peek(buf)?;
    match marker {
        0x90..=0x9F => {
            buf.advance(1);
            Ok(Size::Counted((marker & 0x0F) as usize))
        }
        marker::LIST_8 => {
            buf.advance(1);
            Ok(Size::Counted(buf.try_get_u8()? as usize))
        }
        marker::LIST_16 => {
            buf.advance(1);
            Ok(Size::Counted(buf.try_get_u16()? as usize))
        }
        marker::LIST_32 => {
            buf.advance(1);
            Ok(Size::Counted(buf.try_get_u32()? as usize))
        }
        marker::LIST_STREAM => {
            buf.advance(1);
            Ok(Size::Streamed)
        }
        found => Err(DecodeError::Unexpected { expected: Kind::List, found }),
    }
}

pub fn read_map_header(buf: &mut Bytes) -> Result<Size, DecodeError> {
    let marker = peek(buf)?;
    match marker {
        0xA0..=0xAF => {
            buf.advance(1);
            Ok(Size::Counted((marker & 0x0F) as usize))
        }
        marker::MAP_8 => {
            buf.advance(1);
            Ok(Size::Counted(buf.try_get_u8()? as usize))
        }
        marker::MAP_16 => {
            buf.advance(1);
            Ok(Size::Counted(buf.try_get_u16()? as usize))
        }
        marker::MAP_32 => {
            buf.advance(1);
            Ok(Size::Counted(buf.try_get_u32()? as usize))
        }
        marker::MAP_STREAM => {
            buf.advance(1);
            Ok(Size::Streamed)
        }
        found => Err(DecodeError::Unexpected { expected: Kind::Map, found }),
    }
}

/// Read a structure header, returning `(field_count, signature)`.
pub fn read_structure_header(buf: &mut Bytes) -> Result<(usize, u8), DecodeError> {
    let marker = peek(buf)?;
    match marker {
        0xB0..=0xBF => {
            buf.advance(1);
            let signature = buf.try_get_u8()?;
            Ok(((marker & 0x0F) as usize, signature))
        }
        marker::STRUCT_8 => {
            buf.advance(1);
            let size = buf.try_get_u8()? as usize;
            let signature = buf.try_get_u8()?;
            Ok((size, signature))
        }
        marker::STRUCT_16 => {
            buf.advance(1);
            let size = buf.try_get_u16()? as usize;
            let signature = buf.try_get_u8()?;
            Ok((size, signature))
        }
        found => Err(DecodeError::Unexpected { expected: Kind::Structure, found }),
    }
}

/// Consume the end-of-stream marker that terminates a streamed list or map.
pub fn read_end_of_stream(buf: &mut Bytes) -> Result<(), DecodeError> {
    match peek(buf)? {
        marker::END_OF_STREAM => {
            buf.advance(1);
            Ok(())
        }
        found => Err(DecodeError::Unexpected { expected: Kind::EndOfStream, found }),
    }
}

/// Container nesting past this depth is refused by [`read_value`].
pub const MAX_DEPTH: usize = 128;

/// Eagerly decode the next value into a [`Value`] tree.
///
/// Streamed lists and maps are drained to their end-of-stream marker. Text
/// and bytes payloads stay slices of the message buffer. Recursion is capped
/// at [`MAX_DEPTH`], so a deeply nested wire value is a [`DecodeError`]
/// rather than a stack overflow.
pub fn read_value(buf: &mut Bytes) -> Result<Value, DecodeError> {
    read_value_at(buf, 0)
}

fn read_value_at(buf: &mut Bytes, depth: usize) -> Result<Value, DecodeError> {
    if depth >= MAX_DEPTH {
        return Err(DecodeError::TooDeep);
    }
    let marker = peek(buf)?;
    match Kind::of(marker) {
        Kind::Null => read_null(buf).map(|()| Value::Null),
        Kind::Boolean => read_boolean(buf).map(Value::Boolean),
        Kind::Integer => read_integer(buf).map(Value::Integer),
        Kind::Float => read_float(buf).map(Value::Float),
        Kind::Bytes => read_bytes(buf).map(Value::Bytes),
        Kind::Text => read_text(buf).map(Value::Text),
        Kind::List => {
            let mut items = Vec::new();
            match read_list_header(buf)? {
                Size::Counted(size) => {
                    // each element takes at least one byte, which bounds a
                    // hostile declared size by the remaining buffer
                    items.reserve(size.min(buf.remaining()));
                    for _ in 0..size {
                        items.push(read_value_at(buf, depth + 1)?);
                    }
                }
                Size::Streamed => {
                    while Kind::of(peek(buf)?) != Kind::EndOfStream {
                        items.push(read_value_at(buf, depth + 1)?);
                    }
                    read_end_of_stream(buf)?;
                }
            }
            Ok(Value::List(items))
        }
        Kind::Map => {
            let mut entries = Vec::new();
            match read_map_header(buf)? {
                Size::Counted(size) => {
                    entries.reserve(size.min(buf.remaining()));
                    for _ in 0..size {
                        let key = read_text(buf)?;
                        let value = read_value_at(buf, depth + 1)?;
                        entries.push((key, value));
                    }
                }
                Size::Streamed => {
                    while Kind::of(peek(buf)?) != Kind::EndOfStream {
                        let key = read_text(buf)?;
                        let value = read_value_at(buf, depth + 1)?;
                        entries.push((key, value));
                    }
                    read_end_of_stream(buf)?;
                }
            }
            Ok(Value::Map(entries))
        }
        Kind::Structure => {
            let (size, signature) = read_structure_header(buf)?;
            let mut fields = Vec::with_capacity(size.min(buf.remaining()));
            for _ in 0..size {
                fields.push(read_value_at(buf, depth + 1)?);
            }
            Ok(Value::Structure(signature, fields))
        }
        Kind::EndOfStream => Err(DecodeError::UnexpectedEndOfStream),
        Kind::Reserved => Err(DecodeError::Reserved { marker }),
    }
}
