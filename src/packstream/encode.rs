//! PackStream encoders.
//!
//! Each encoder appends one value (or one header) to the write buffer and
//! returns the number of bytes written, always choosing the most compact
//! marker width the value fits in. A size no header width can carry is an
//! [`EncodeError`]; bytes are never silently dropped.
use bytes::{BufMut, BytesMut};

use super::{error::EncodeError, marker};
use crate::value::Value;

pub fn write_null(buf: &mut BytesMut) -> Result<usize, EncodeError> {
    buf.put_u8(marker::NULL);
    Ok(1)
}

pub fn write_boolean(buf: &mut BytesMut, value: bool) -> Result<usize, EncodeError> {
    buf.put_u8(if value { marker::TRUE } else { marker::FALSE });
    Ok(1)
}

/// Write an integer in the most compact width: a single tiny byte for
/// `-16..=127`, otherwise an explicit 8/16/32/64-bit encoding.
pub fn write_integer(buf: &mut BytesMut, value: i64) -> Result<usize, EncodeError> {
    if (-16..=127).contains(&value) {
        // tiny positives are the marker itself, tiny negatives 0xF0..=0xFF
        buf.put_i8(value as i8);
        Ok(1)
    } else if let Ok(value) = i8::try_from(value) {
        buf.put_u8(marker::INT_8);
        buf.put_i8(value);
        Ok(2)
    } else if let Ok(value) = i16::try_from(value) {
        buf.put_u8(marker::INT_16);
        buf.put_i16(value);
        Ok(3)
    } else if let Ok(value) = i32::try_from(value) {
        buf.put_u8(marker::INT_32);
        buf.put_i32(value);
        Ok(5)
    } else {
        buf.put_u8(marker::INT_64);
        buf.put_i64(value);
        Ok(9)
    }
}

pub fn write_float(buf: &mut BytesMut, value: f64) -> Result<usize, EncodeError> {
    buf.put_u8(marker::FLOAT_64);
    buf.put_f64(value);
    Ok(9)
}

pub fn write_bytes(buf: &mut BytesMut, value: &[u8]) -> Result<usize, EncodeError> {
    let size = value.len();
    let header = if size <= 0xFF {
        buf.put_u8(marker::BYTES_8);
        buf.put_u8(size as u8);
        2
    } else if size <= 0xFFFF {
        buf.put_u8(marker::BYTES_16);
        buf.put_u16(size as u16);
        3
    } else if size <= u32::MAX as usize {
        buf.put_u8(marker::BYTES_32);
        buf.put_u32(size as u32);
        5
    } else {
        return Err(EncodeError::TooLarge { what: "bytes", size, max: u32::MAX as usize });
    };
    buf.put_slice(value);
    Ok(header + size)
}

pub fn write_text(buf: &mut BytesMut, value: &str) -> Result<usize, EncodeError> {
    let size = value.len();
    let header = if size <= marker::TINY_SIZE_MAX {
        buf.put_u8(marker::TINY_TEXT | size as u8);
        1
    } else if size <= 0xFF {
        buf.put_u8(marker::TEXT_8);
        buf.put_u8(size as u8);
        2
    } else if size <= 0xFFFF {
        buf.put_u8(marker::TEXT_16);
        buf.put_u16(size as u16);
        3
    } else if size <= u32::MAX as usize {
        buf.put_u8(marker::TEXT_32);
        buf.put_u32(size as u32);
        5
    } else {
        return Err(EncodeError::TooLarge { what: "text", size, max: u32::MAX as usize });
    };
    buf.put_slice(value.as_bytes());
    Ok(header + size)
}

pub fn write_list_header(buf: &mut BytesMut, size: usize) -> Result<usize, EncodeError> {
    if size <= marker::TINY_SIZE_MAX {
        buf.put_u8(marker::TINY_LIST | size as u8);
        Ok(1)
    } else if size <= 0xFF {
        buf.put_u8(marker::LIST_8);
        buf.put_u8(size as u8);
        Ok(2)
    } else if size <= 0xFFFF {
        buf.put_u8(marker::LIST_16);
        buf.put_u16(size as u16);
        Ok(3)
    } else if size <= u32::MAX as usize {
        buf.put_u8(marker::LIST_32);
        buf.put_u32(size as u32);
        Ok(5)
    } else {
        Err(EncodeError::TooLarge { what: "list", size, max: u32::MAX as usize })
    }
}

pub fn write_map_header(buf: &mut BytesMut, size: usize) -> Result<usize, EncodeError> {
    if size <= marker::TINY_SIZE_MAX {
        buf.put_u8(marker::TINY_MAP | size as u8);
        Ok(1)
    } else if size <= 0xFF {
        buf.put_u8(marker::MAP_8);
        buf.put_u8(size as u8);
        Ok(2)
    } else if size <= 0xFFFF {
        buf.put_u8(marker::MAP_16);
        buf.put_u16(size as u16);
        Ok(3)
    } else if size <= u32::MAX as usize {
        buf.put_u8(marker::MAP_32);
        buf.put_u32(size as u32);
        Ok(5)
    } else {
        Err(EncodeError::TooLarge { what: "map", size, max: u32::MAX as usize })
    }
}

/// Write a structure header: marker, field count, then the signature byte.
pub fn write_struct_header(buf: &mut BytesMut, size: usize, signature: u8) -> Result<usize, EncodeError> {
    let header = if size <= marker::TINY_SIZE_MAX {
        buf.put_u8(marker::TINY_STRUCT | size as u8);
        1
    } else if size <= 0xFF {
        buf.put_u8(marker::STRUCT_8);
        buf.put_u8(size as u8);
        2
    } else if size <= 0xFFFF {
        buf.put_u8(marker::STRUCT_16);
        buf.put_u16(size as u16);
        3
    } else {
        return Err(EncodeError::TooLarge { what: "structure", size, max: 0xFFFF });
    };
    buf.put_u8(signature);
    Ok(header + 1)
}

/// Write a map: header, then each entry's key and value in caller order.
pub fn write_map<'a, I>(buf: &mut BytesMut, len: usize, entries: I) -> Result<usize, EncodeError>
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut written = write_map_header(buf, len)?;
    for (key, value) in entries {
        written += write_text(buf, key)?;
        written += write_value(buf, value)?;
    }
    Ok(written)
}

/// Dispatch on the value's variant to the specific writer.
pub fn write_value(buf: &mut BytesMut, value: &Value) -> Result<usize, EncodeError> {
    match value {
        Value::Null => write_null(buf),
        Value::Boolean(value) => write_boolean(buf, *value),
        Value::Integer(value) => write_integer(buf, *value),
        Value::Float(value) => write_float(buf, *value),
        Value::Bytes(value) => write_bytes(buf, value),
        Value::Text(value) => write_text(buf, value),
        Value::List(items) => {
            let mut written = write_list_header(buf, items.len())?;
            for item in items {
                written += write_value(buf, item)?;
            }
            Ok(written)
        }
        Value::Map(entries) => {
            write_map(buf, entries.len(), entries.iter().map(|(k, v)| (k.as_str(), v)))
        }
        Value::Structure(signature, fields) => {
            let mut written = write_struct_header(buf, fields.len(), *signature)?;
            for field in fields {
                written += write_value(buf, field)?;
            }
            Ok(written)
        }
    }
}
