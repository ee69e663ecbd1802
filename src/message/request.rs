//! Request messages.
use bytes::BytesMut;

use super::Signature;
use crate::{
    packstream::{encode, EncodeError},
    value::Value,
};

/// Write a request message to `buf`: structure header, signature, fields.
pub fn write<R: Request>(message: R, buf: &mut BytesMut) -> Result<(), EncodeError> {
    encode::write_struct_header(buf, R::FIELDS, R::SIGNATURE.as_u8())?;
    message.encode(buf)
}

/// A type which can be encoded into a request message.
pub trait Request {
    /// Message kind.
    const SIGNATURE: Signature;

    /// Number of structure fields the message carries.
    const FIELDS: usize;

    /// Write the message fields.
    ///
    /// Must write exactly [`FIELDS`][Request::FIELDS] PackStream values.
    fn encode(self, buf: &mut BytesMut) -> Result<(), EncodeError>;
}

/// Identifies the client to the server; the first request on a fresh
/// connection, acknowledged with SUCCESS before anything else is accepted.
#[derive(Debug)]
pub struct Init<'a> {
    /// Client name and version, e.g. `boltro/0.1`.
    pub user_agent: &'a str,
}

impl Request for Init<'_> {
    const SIGNATURE: Signature = Signature::Init;

    const FIELDS: usize = 1;

    fn encode(self, buf: &mut BytesMut) -> Result<(), EncodeError> {
        encode::write_text(buf, self.user_agent)?;
        Ok(())
    }
}

/// Submit a statement for execution.
///
/// Answered with a SUCCESS header whose metadata describes the result
/// columns; the records themselves are requested separately with
/// [`PullAll`].
#[derive(Debug)]
pub struct Run<'a> {
    /// The statement text.
    pub statement: &'a str,
    /// Named statement parameters, written in the given order.
    pub parameters: &'a [(&'a str, Value)],
}

impl Request for Run<'_> {
    const SIGNATURE: Signature = Signature::Run;

    const FIELDS: usize = 2;

    fn encode(self, buf: &mut BytesMut) -> Result<(), EncodeError> {
        encode::write_text(buf, self.statement)?;
        encode::write_map(
            buf,
            self.parameters.len(),
            self.parameters.iter().map(|(key, value)| (*key, value)),
        )?;
        Ok(())
    }
}

/// Stream every record of the current result, terminated by a summary
/// SUCCESS (or FAILURE) message.
#[derive(Debug)]
pub struct PullAll;

impl Request for PullAll {
    const SIGNATURE: Signature = Signature::PullAll;

    const FIELDS: usize = 0;

    fn encode(self, _: &mut BytesMut) -> Result<(), EncodeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_encodes_one_text_field() {
        let mut buf = BytesMut::new();
        write(Init { user_agent: "boltro/0.1" }, &mut buf).unwrap();
        assert_eq!(&buf[..2], [0xB1, 0x01]);
        assert_eq!(&buf[2..], [&[0x8A][..], b"boltro/0.1"].concat());
    }

    #[test]
    fn run_encodes_statement_and_parameter_map() {
        let mut buf = BytesMut::new();
        let parameters = [("n", Value::Integer(1))];
        write(Run { statement: "RETURN $n", parameters: &parameters }, &mut buf).unwrap();
        // B2 10, tiny text statement, tiny map {n: 1}
        assert_eq!(&buf[..2], [0xB2, 0x10]);
        assert_eq!(&buf[2..12], [&[0x89][..], b"RETURN $n"].concat());
        assert_eq!(&buf[12..], [0xA1, 0x81, b'n', 0x01]);
    }

    #[test]
    fn pull_all_is_a_bare_structure() {
        let mut buf = BytesMut::new();
        write(PullAll, &mut buf).unwrap();
        assert_eq!(&buf[..], [0xB0, 0x3F]);
    }
}
