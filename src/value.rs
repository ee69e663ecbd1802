//! The PackStream value model.
//!
//! Every value that can travel over the wire is one [`Value`] variant, and
//! every encoded value opens with a single marker byte that identifies its
//! wire type, classified by [`Kind::of`].
use bytes::Bytes;

use crate::common::ByteStr;

/// Any value transmittable over the wire.
///
/// Container variants own their children; decoded [`Text`][Value::Text] and
/// [`Bytes`][Value::Bytes] values are cheap slices of the message buffer they
/// were decoded from.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Bytes(Bytes),
    Text(ByteStr),
    /// Ordered sequence of values.
    List(Vec<Value>),
    /// Ordered key/value entries. Keys are unique within a given map;
    /// insertion order is preserved.
    Map(Vec<(ByteStr, Value)>),
    /// A composite value tagged with a 1-byte signature.
    Structure(u8, Vec<Value>),
}

impl Value {
    /// Returns the wire type of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Boolean(_) => Kind::Boolean,
            Value::Integer(_) => Kind::Integer,
            Value::Float(_) => Kind::Float,
            Value::Bytes(_) => Kind::Bytes,
            Value::Text(_) => Kind::Text,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
            Value::Structure(..) => Kind::Structure,
        }
    }
}

macro_rules! from {
    (<$ty:ty>$pat:pat => $body:expr) => {
        impl From<$ty> for Value {
            fn from($pat: $ty) -> Self {
                $body
            }
        }
    };
}

from!(<bool>v => Value::Boolean(v));
from!(<i64>v => Value::Integer(v));
from!(<i32>v => Value::Integer(v.into()));
from!(<f64>v => Value::Float(v));
from!(<&'static str>v => Value::Text(v.into()));
from!(<String>v => Value::Text(v.into()));
from!(<ByteStr>v => Value::Text(v));
from!(<Vec<Value>>v => Value::List(v));

/// The wire type identified by a marker byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Null,
    Boolean,
    Integer,
    Float,
    Bytes,
    Text,
    List,
    Map,
    Structure,
    /// Terminates a streamed list or map.
    EndOfStream,
    /// Marker byte with no assigned meaning.
    Reserved,
}

impl Kind {
    /// Classify a marker byte.
    ///
    /// Total over all 256 byte values. The tiny-integer bands cover most of
    /// the byte space and are matched before the high-nibble collection
    /// patterns, so e.g. `0x90` is a tiny list while `0x10` is the integer 16.
    pub const fn of(marker: u8) -> Kind {
        match marker {
            // tiny positive and tiny negative integers
            0x00..=0x7F | 0xF0..=0xFF => Kind::Integer,
            0xC0 => Kind::Null,
            0xC1 => Kind::Float,
            0xC2 | 0xC3 => Kind::Boolean,
            // explicit-width integers
            0xC8..=0xCB => Kind::Integer,
            0xCC..=0xCE => Kind::Bytes,
            0x80..=0x8F | 0xD0..=0xD2 => Kind::Text,
            0x90..=0x9F | 0xD4..=0xD7 => Kind::List,
            0xA0..=0xAF | 0xD8..=0xDB => Kind::Map,
            0xB0..=0xBF | 0xDC | 0xDD => Kind::Structure,
            0xDF => Kind::EndOfStream,
            // 0xC4..=0xC7, 0xCF, 0xD3, 0xDE
            _ => Kind::Reserved,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Kind::Null => "Null",
            Kind::Boolean => "Boolean",
            Kind::Integer => "Integer",
            Kind::Float => "Float",
            Kind::Bytes => "Bytes",
            Kind::Text => "Text",
            Kind::List => "List",
            Kind::Map => "Map",
            Kind::Structure => "Structure",
            Kind::EndOfStream => "EndOfStream",
            Kind::Reserved => "Reserved",
        })
    }
}
