//! Bolt connection.
use bytes::Bytes;

use crate::{
    channel::{self, Channel, TcpChannel},
    common::{span, verbose},
    config::Config,
    error::Result,
    frame::{self, MessageWriter},
    message::{request, Init, PullAll, Request, Run, Signature},
    packstream::{decode, DecodeError},
    value::Value,
};

/// The single wire-format revision this client speaks.
pub const BOLT_VERSION: u32 = 1;

/// Version proposal: one real version and three empty alternatives.
const HANDSHAKE: [u8; 16] = [
    0x00, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00,
];

const DEFAULT_BUF_CAPACITY: usize = 1024;

/// A connection to a Bolt server.
///
/// Requests are queued with [`init`][Connection::init],
/// [`run`][Connection::run] and [`pull_all`][Connection::pull_all], flushed
/// together with one [`send`][Connection::send], and answered strictly in
/// request order: [`receive`][Connection::receive] reads one response per
/// queued request. To drain a result stream, loop `receive` while it returns
/// [`Signature::Record`]; the first non-RECORD message is the summary.
///
/// All I/O is synchronous and blocking; a `Connection` is single-threaded
/// state and performs no retries.
///
/// # Examples
///
/// ```no_run
/// use boltro::{Config, Connection, Signature};
///
/// # fn app() -> boltro::Result<()> {
/// let config = Config::default();
/// let mut conn = Connection::connect(&config)?;
///
/// conn.init(&config.user_agent)?;
/// conn.send()?;
/// conn.receive()?;
///
/// conn.run("RETURN 1", &[])?;
/// conn.pull_all()?;
/// conn.send()?;
///
/// conn.receive()?; // RUN summary
/// while conn.receive()? == Signature::Record {
///     println!("{:?}", conn.next_value()?);
/// }
///
/// conn.disconnect();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Connection<C = TcpChannel> {
    channel: C,
    version: u32,
    writer: MessageWriter,
    /// The most recently reassembled message, cursor past the structure
    /// header. Freshly owned per message, so values decoded from an earlier
    /// message never alias newly received data.
    message: Bytes,
    field_count: usize,
    remaining_fields: usize,
    signature: Option<Signature>,
    max_message_size: usize,
}

impl Connection {
    /// Open a TCP channel and perform the handshake.
    pub fn connect(config: &Config) -> Result<Connection> {
        let channel = TcpChannel::connect(&config.host, config.port)?;
        Connection::handshake(channel, config)
    }
}

impl<C: Channel> Connection<C> {
    /// Perform the version handshake over an open channel.
    ///
    /// Sends the 16-byte proposal and reads the 4-byte big-endian agreed
    /// version. A zero or unknown version is fatal; there is no retry.
    pub fn handshake(mut channel: C, config: &Config) -> Result<Connection<C>> {
        span!("handshake");
        channel::send_all(&mut channel, &HANDSHAKE)?;

        let mut buf = [0u8; 4];
        channel::recv_exact(&mut channel, &mut buf)?;
        let version = u32::from_be_bytes(buf);

        match version {
            0 => Err(HandshakeError::Rejected)?,
            BOLT_VERSION => {}
            version => Err(HandshakeError::UnsupportedVersion { version })?,
        }

        verbose!("handshake agreed version {version}");

        Ok(Connection {
            channel,
            version,
            writer: MessageWriter::with_capacity(DEFAULT_BUF_CAPACITY),
            message: Bytes::new(),
            field_count: 0,
            remaining_fields: 0,
            signature: None,
            max_message_size: config.max_message_size,
        })
    }

    /// The version agreed at handshake time.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Queue a request message as one chunk, not yet sent.
    pub fn queue<R: Request>(&mut self, message: R) -> Result<()> {
        self.writer.start_chunk();
        if let Err(err) = request::write(message, self.writer.buf()) {
            self.writer.abort_chunk();
            return Err(err.into());
        }
        self.writer.end_chunk()?;
        self.writer.end_message();
        Ok(())
    }

    /// Queue an INIT message carrying the client identifier.
    pub fn init(&mut self, user_agent: &str) -> Result<()> {
        self.queue(Init { user_agent })
    }

    /// Queue a RUN message carrying the statement and its parameter map.
    pub fn run(&mut self, statement: &str, parameters: &[(&str, Value)]) -> Result<()> {
        self.queue(Run { statement, parameters })
    }

    /// Queue a PULL_ALL message.
    pub fn pull_all(&mut self) -> Result<()> {
        self.queue(PullAll)
    }

    /// Flush every queued message to the channel and reset the write state.
    pub fn send(&mut self) -> Result<()> {
        span!("send");
        let buf = self.writer.split();
        channel::send_all(&mut self.channel, &buf)?;
        verbose!("sent {} bytes", buf.len());
        Ok(())
    }

    /// Read and classify exactly one response message.
    ///
    /// Reassembles the message from its chunks, decodes the leading
    /// structure header and records the field count and signature; the
    /// fields stay in the message buffer until pulled with
    /// [`next_value`][Connection::next_value].
    pub fn receive(&mut self) -> Result<Signature> {
        span!("receive");
        let mut message = frame::read_message(&mut self.channel, self.max_message_size)?;
        let (field_count, signature) = decode::read_structure_header(&mut message)?;
        let signature = Signature::from_u8(signature)
            .ok_or(DecodeError::UnknownSignature { signature })?;

        verbose!("received {signature} with {field_count} fields");

        self.message = message;
        self.field_count = field_count;
        self.remaining_fields = field_count;
        self.signature = Some(signature);
        Ok(signature)
    }

    /// Field count of the last received message.
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    /// Signature of the last received message, if any.
    pub fn signature(&self) -> Option<Signature> {
        self.signature
    }

    /// Decode the next field of the last received message.
    ///
    /// Fails once every declared field has been consumed.
    pub fn next_value(&mut self) -> Result<Value> {
        if self.remaining_fields == 0 {
            return Err(DecodeError::UnexpectedEof { requested: 1, available: 0 }.into());
        }
        let value = decode::read_value(&mut self.message)?;
        self.remaining_fields -= 1;
        Ok(value)
    }

    /// Decode every remaining field of the last received message.
    pub fn fields(&mut self) -> Result<Vec<Value>> {
        let mut fields = Vec::with_capacity(self.remaining_fields);
        while self.remaining_fields > 0 {
            fields.push(self.next_value()?);
        }
        Ok(fields)
    }

    /// Half-close the channel. Idempotent; never fails.
    pub fn disconnect(&mut self) {
        if let Err(_err) = self.channel.close() {
            #[cfg(feature = "log")]
            log::error!("close error: {_err}");
        }
    }
}

/// The version exchange did not complete.
pub enum HandshakeError {
    /// The server replied with version zero, declining every proposal.
    Rejected,
    /// The server agreed a version this client does not speak.
    UnsupportedVersion { version: u32 },
}

impl std::error::Error for HandshakeError { }

impl std::fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            HandshakeError::Rejected => f.write_str("server rejected the proposed protocol version"),
            HandshakeError::UnsupportedVersion { version } => {
                write!(f, "server agreed unsupported protocol version {version}")
            }
        }
    }
}

impl std::fmt::Debug for HandshakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use bytes::{Bytes, BytesMut};

    use super::*;
    use crate::{
        channel::testing::ScriptedChannel,
        error::ErrorKind,
        packstream::encode,
    };

    /// Frame one server message the way the server would.
    fn server_message(signature: Signature, fields: &[Value]) -> Bytes {
        let mut writer = MessageWriter::default();
        writer.start_chunk();
        encode::write_struct_header(writer.buf(), fields.len(), signature.as_u8()).unwrap();
        for field in fields {
            encode::write_value(writer.buf(), field).unwrap();
        }
        writer.end_chunk().unwrap();
        writer.end_message();
        writer.split()
    }

    fn success(metadata: Vec<(&'static str, Value)>) -> Bytes {
        let entries = metadata.into_iter().map(|(k, v)| (k.into(), v)).collect();
        server_message(Signature::Success, &[Value::Map(entries)])
    }

    fn handshake_reply(version: u32) -> [u8; 4] {
        version.to_be_bytes()
    }

    /// The expected wire bytes for one queued request.
    fn request_frame<R: Request>(message: R) -> BytesMut {
        let mut writer = MessageWriter::default();
        writer.start_chunk();
        request::write(message, writer.buf()).unwrap();
        writer.end_chunk().unwrap();
        writer.end_message();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&writer.split());
        buf
    }

    #[test]
    fn handshake_sends_the_fixed_proposal() {
        let mut channel = ScriptedChannel::new();
        channel.serve(&handshake_reply(1));

        let conn = Connection::handshake(&mut channel, &Config::default()).unwrap();
        assert_eq!(conn.version(), 1);
        drop(conn);

        assert_eq!(
            channel.sent,
            [0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        );
    }

    #[test]
    fn handshake_rejection_is_fatal() {
        let mut channel = ScriptedChannel::new();
        channel.serve(&handshake_reply(0));
        let err = Connection::handshake(&mut channel, &Config::default()).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Handshake(HandshakeError::Rejected)
        ));
    }

    #[test]
    fn handshake_unknown_version_is_fatal() {
        let mut channel = ScriptedChannel::new();
        channel.serve(&handshake_reply(2));
        let err = Connection::handshake(&mut channel, &Config::default()).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Handshake(HandshakeError::UnsupportedVersion { version: 2 })
        ));
    }

    #[test]
    fn handshake_on_a_dead_channel_is_a_transport_error() {
        let mut channel = ScriptedChannel::new();
        let err = Connection::handshake(&mut channel, &Config::default()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io(_)));
    }

    #[test]
    fn init_run_pull_all_end_to_end() {
        let mut channel = ScriptedChannel::new();
        channel.serve(&handshake_reply(1));
        channel.serve(&success(vec![("server", "neo4j/3.0".into())]));
        channel.serve(&success(vec![(
            "fields",
            Value::List(vec![Value::Text("1".into())]),
        )]));
        channel.serve(&server_message(
            Signature::Record,
            &[Value::List(vec![Value::Integer(1)])],
        ));
        channel.serve(&success(vec![("type", "r".into())]));

        let mut conn = Connection::handshake(&mut channel, &Config::default()).unwrap();

        conn.init("test-agent").unwrap();
        conn.send().unwrap();
        assert_eq!(conn.receive().unwrap(), Signature::Success);

        conn.run("RETURN 1", &[]).unwrap();
        conn.pull_all().unwrap();
        conn.send().unwrap();

        // RUN summary carries the column names
        assert_eq!(conn.receive().unwrap(), Signature::Success);
        assert_eq!(conn.field_count(), 1);
        match conn.next_value().unwrap() {
            Value::Map(metadata) => {
                let fields = metadata.iter().find(|(k, _)| k == "fields");
                assert_eq!(
                    fields.map(|(_, v)| v),
                    Some(&Value::List(vec![Value::Text("1".into())])),
                );
            }
            other => panic!("expected metadata map, got {other:?}"),
        }

        // one record, then the footer
        assert_eq!(conn.receive().unwrap(), Signature::Record);
        assert_eq!(
            conn.fields().unwrap(),
            [Value::List(vec![Value::Integer(1)])],
        );
        assert_eq!(conn.receive().unwrap(), Signature::Success);

        conn.disconnect();
        drop(conn);
        assert!(channel.closed);
    }

    #[test]
    fn queued_requests_are_flushed_in_order() {
        let mut channel = ScriptedChannel::new();
        channel.serve(&handshake_reply(1));
        channel.serve(&success(vec![]));
        channel.serve(&success(vec![(
            "fields",
            Value::List(vec![Value::Text("n".into())]),
        )]));
        channel.serve(&server_message(
            Signature::Record,
            &[Value::List(vec![Value::Integer(42)])],
        ));
        channel.serve(&success(vec![]));

        let mut conn = Connection::handshake(&mut channel, &Config::default()).unwrap();

        // pipeline everything before a single send
        conn.init("test-agent").unwrap();
        let parameters = [("n", Value::Integer(42))];
        conn.run("RETURN $n", &parameters).unwrap();
        conn.pull_all().unwrap();
        conn.send().unwrap();

        // responses come back in request order
        assert_eq!(conn.receive().unwrap(), Signature::Success);
        assert_eq!(conn.receive().unwrap(), Signature::Success);
        assert_eq!(conn.receive().unwrap(), Signature::Record);
        assert_eq!(conn.receive().unwrap(), Signature::Success);
        drop(conn);

        let mut expected = request_frame(Init { user_agent: "test-agent" });
        let parameters = [("n", Value::Integer(42))];
        expected.extend_from_slice(&request_frame(Run {
            statement: "RETURN $n",
            parameters: &parameters,
        }));
        expected.extend_from_slice(&request_frame(PullAll));
        assert_eq!(channel.sent[16..], expected[..]);
    }

    #[test]
    fn record_stream_is_drained_by_looping_on_the_signature() {
        let mut channel = ScriptedChannel::new();
        channel.serve(&handshake_reply(1));
        for n in 0..3 {
            channel.serve(&server_message(
                Signature::Record,
                &[Value::List(vec![Value::Integer(n)])],
            ));
        }
        channel.serve(&success(vec![]));

        let mut conn = Connection::handshake(&mut channel, &Config::default()).unwrap();

        let mut records = Vec::new();
        while conn.receive().unwrap() == Signature::Record {
            records.push(conn.next_value().unwrap());
        }
        assert_eq!(conn.signature(), Some(Signature::Success));
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[2],
            Value::List(vec![Value::Integer(2)]),
        );
    }

    #[test]
    fn ignored_and_failure_are_classified() {
        let mut channel = ScriptedChannel::new();
        channel.serve(&handshake_reply(1));
        channel.serve(&server_message(Signature::Failure, &[Value::Map(vec![
            ("code".into(), "Neo.ClientError".into()),
            ("message".into(), "boom".into()),
        ])]));
        channel.serve(&server_message(Signature::Ignored, &[]));

        let mut conn = Connection::handshake(&mut channel, &Config::default()).unwrap();
        assert_eq!(conn.receive().unwrap(), Signature::Failure);
        assert_eq!(conn.receive().unwrap(), Signature::Ignored);
        assert_eq!(conn.field_count(), 0);
    }

    #[test]
    fn unknown_signature_is_a_decode_error() {
        // hand-build a message with an unassigned signature
        let mut writer = MessageWriter::default();
        writer.start_chunk();
        encode::write_struct_header(writer.buf(), 0, 0x42).unwrap();
        writer.end_chunk().unwrap();
        writer.end_message();
        let bogus = writer.split();

        let mut channel = ScriptedChannel::new();
        channel.serve(&handshake_reply(1));
        channel.serve(&bogus);

        let mut conn = Connection::handshake(&mut channel, &Config::default()).unwrap();
        let err = conn.receive().unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Decode(DecodeError::UnknownSignature { signature: 0x42 })
        ));
    }

    #[test]
    fn pulling_past_the_declared_fields_fails() {
        let mut channel = ScriptedChannel::new();
        channel.serve(&handshake_reply(1));
        channel.serve(&server_message(Signature::Record, &[Value::Integer(7)]));

        let mut conn = Connection::handshake(&mut channel, &Config::default()).unwrap();
        conn.receive().unwrap();
        assert_eq!(conn.next_value().unwrap(), Value::Integer(7));
        assert!(conn.next_value().is_err());
    }
}
