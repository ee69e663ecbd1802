//! Message framing: length-prefixed chunks over the channel.
//!
//! A message's encoded bytes travel as chunks, each a 2-byte big-endian
//! length followed by that many payload bytes. A zero-length chunk marks the
//! end of a message:
//!
//! ```text
//! |   u16   | payload  |   u16   | payload  | 00 | 00 |
//! |---------|----------|---------|----------|---------|
//! | 00 | 03 | B0 3F .. | .. | .. | ........ | end     |
//!
//! chunk length -> payload (repeat) -> end-of-message
//! ```
//!
//! Chunk boundaries need not align with value boundaries, and a message
//! carries no overall length prefix; the reader accumulates payloads until
//! the end-of-message marker.
use bytes::{Bytes, BytesMut};

use crate::{
    channel::{self, Channel},
    error::Result,
};

/// Largest payload a single chunk's 16-bit length can carry.
pub const MAX_CHUNK_SIZE: usize = 0xFFFF;

/// Default cap on one reassembled message, configurable per connection.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 0x10_0000;

const CHUNK_HEADER: usize = 2;

/// Writer for outgoing chunked messages.
///
/// The chunk length is not known until the chunk body has been written, so
/// [`start_chunk`][MessageWriter::start_chunk] reserves the 2 header bytes
/// and [`end_chunk`][MessageWriter::end_chunk] patches them afterwards.
/// Splitting an oversized message across chunks is the caller's policy; the
/// driver emits one chunk per message.
#[derive(Debug, Default)]
pub struct MessageWriter {
    buf: BytesMut,
    chunk_start: Option<usize>,
}

impl MessageWriter {
    pub fn with_capacity(capacity: usize) -> MessageWriter {
        MessageWriter {
            buf: BytesMut::with_capacity(capacity),
            chunk_start: None,
        }
    }

    /// Record the chunk start and reserve its length prefix.
    pub fn start_chunk(&mut self) {
        debug_assert!(self.chunk_start.is_none(), "chunk already open");
        self.chunk_start = Some(self.buf.len());
        self.buf.extend_from_slice(&[0, 0]);
    }

    /// Body buffer for the open chunk.
    pub fn buf(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Patch the reserved length prefix with the chunk's payload size.
    ///
    /// # Panics
    ///
    /// Panics when no chunk is open, i.e. without a matching
    /// [`start_chunk`][MessageWriter::start_chunk].
    pub fn end_chunk(&mut self) -> Result<(), OverflowError> {
        let start = self.chunk_start.take().expect("no open chunk");
        let size = self.buf.len() - start - CHUNK_HEADER;
        if size > MAX_CHUNK_SIZE {
            // drop the unsendable chunk rather than leave a corrupt buffer
            self.buf.truncate(start);
            return Err(OverflowError::ChunkTooLarge { size });
        }
        self.buf[start..start + CHUNK_HEADER].copy_from_slice(&(size as u16).to_be_bytes());
        Ok(())
    }

    /// Discard the open chunk and everything written into it.
    pub fn abort_chunk(&mut self) {
        if let Some(start) = self.chunk_start.take() {
            self.buf.truncate(start);
        }
    }

    /// Append the zero-length end-of-message marker.
    pub fn end_message(&mut self) {
        debug_assert!(self.chunk_start.is_none(), "chunk still open");
        self.buf.extend_from_slice(&[0, 0]);
    }

    /// Take every buffered message, leaving the writer empty.
    pub fn split(&mut self) -> Bytes {
        self.chunk_start = None;
        self.buf.split().freeze()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Reassemble exactly one message from the channel.
///
/// Loops reading a chunk header then its payload until the zero-length
/// header, accumulating payloads into a freshly owned buffer. Fails with
/// [`OverflowError::MessageTooLarge`] before the accumulated size would pass
/// `max_message_size`.
pub fn read_message<C: Channel>(channel: &mut C, max_message_size: usize) -> Result<Bytes> {
    let mut message = BytesMut::new();
    loop {
        let mut header = [0u8; CHUNK_HEADER];
        channel::recv_exact(channel, &mut header)?;
        let chunk_size = u16::from_be_bytes(header) as usize;
        if chunk_size == 0 {
            break;
        }
        if message.len() + chunk_size > max_message_size {
            return Err(OverflowError::MessageTooLarge {
                size: message.len() + chunk_size,
                max: max_message_size,
            }
            .into());
        }
        let offset = message.len();
        message.resize(offset + chunk_size, 0);
        channel::recv_exact(channel, &mut message[offset..])?;
    }
    Ok(message.freeze())
}

/// A chunk or message outgrew the framing layer's hard limits.
pub enum OverflowError {
    /// A single chunk's payload cannot exceed [`MAX_CHUNK_SIZE`].
    ChunkTooLarge { size: usize },
    /// A reassembled message passed the configured maximum.
    MessageTooLarge { size: usize, max: usize },
}

impl std::error::Error for OverflowError { }

impl std::fmt::Display for OverflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            OverflowError::ChunkTooLarge { size } => {
                write!(f, "chunk payload of {size} bytes exceeds {MAX_CHUNK_SIZE}")
            }
            OverflowError::MessageTooLarge { size, max } => {
                write!(f, "message of {size} bytes exceeds the {max} byte maximum")
            }
        }
    }
}

impl std::fmt::Debug for OverflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{channel::testing::ScriptedChannel, error::ErrorKind};

    /// Split `body` into chunks of at most `capacity` and frame one message.
    fn frame(body: &[u8], capacity: usize) -> Bytes {
        let mut writer = MessageWriter::default();
        let mut rest = body;
        loop {
            let take = rest.len().min(capacity);
            writer.start_chunk();
            writer.buf().extend_from_slice(&rest[..take]);
            writer.end_chunk().unwrap();
            rest = &rest[take..];
            if rest.is_empty() {
                break;
            }
        }
        writer.end_message();
        writer.split()
    }

    fn reassemble(wire: &[u8]) -> Bytes {
        let mut channel = ScriptedChannel::new();
        channel.serve(wire);
        read_message(&mut channel, DEFAULT_MAX_MESSAGE_SIZE).unwrap()
    }

    #[test]
    fn chunk_header_is_patched_big_endian() {
        let mut writer = MessageWriter::default();
        writer.start_chunk();
        writer.buf().extend_from_slice(&[0xB0, 0x3F, 0xAA]);
        writer.end_chunk().unwrap();
        writer.end_message();
        assert_eq!(&writer.split()[..], [0x00, 0x03, 0xB0, 0x3F, 0xAA, 0x00, 0x00]);
    }

    #[test]
    fn chunking_roundtrip_across_capacity_boundaries() {
        const CAPACITY: usize = 64;
        for len in [0, 1, CAPACITY - 1, CAPACITY, CAPACITY + 1, CAPACITY * 5] {
            let body: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let wire = frame(&body, CAPACITY);
            assert_eq!(&reassemble(&wire)[..], &body[..], "length {len}");
        }
    }

    #[test]
    fn only_a_zero_length_header_terminates_reassembly() {
        // a one-byte chunk whose payload is 0x00 must not terminate
        let wire = [0x00, 0x01, 0x00, 0x00, 0x01, 0x07, 0x00, 0x00];
        assert_eq!(&reassemble(&wire)[..], [0x00, 0x07]);
    }

    #[test]
    fn short_reads_do_not_corrupt_reassembly() {
        let body: Vec<u8> = (0..200).map(|i| i as u8).collect();
        let wire = frame(&body, 50);

        let mut channel = ScriptedChannel::new();
        channel.serve(&wire);
        channel.recv_limit = 3;
        let message = read_message(&mut channel, DEFAULT_MAX_MESSAGE_SIZE).unwrap();
        assert_eq!(&message[..], &body[..]);
    }

    #[test]
    fn oversized_chunk_is_rejected_and_dropped() {
        let mut writer = MessageWriter::default();
        writer.start_chunk();
        writer.buf().extend_from_slice(&vec![0u8; MAX_CHUNK_SIZE + 1]);
        let err = writer.end_chunk().unwrap_err();
        assert!(matches!(err, OverflowError::ChunkTooLarge { size } if size == MAX_CHUNK_SIZE + 1));
        assert!(writer.is_empty(), "rejected chunk must not linger in the buffer");
    }

    #[test]
    fn chunk_at_the_limit_is_accepted() {
        let body = vec![0u8; MAX_CHUNK_SIZE];
        let wire = frame(&body, MAX_CHUNK_SIZE);
        assert_eq!(reassemble(&wire).len(), MAX_CHUNK_SIZE);
    }

    #[test]
    fn message_over_the_configured_maximum_is_an_overflow() {
        let wire = frame(&[0xAB; 100], 10);
        let mut channel = ScriptedChannel::new();
        channel.serve(&wire);
        let err = read_message(&mut channel, 64).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Overflow(OverflowError::MessageTooLarge { .. })));
    }

    #[test]
    fn truncated_stream_is_a_transport_error() {
        let mut channel = ScriptedChannel::new();
        channel.serve(&[0x00, 0x05, 0xAA]); // promises 5 bytes, delivers 1
        let err = read_message(&mut channel, DEFAULT_MAX_MESSAGE_SIZE).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io(_)));
    }
}
