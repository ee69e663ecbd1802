//! The [`Channel`] trait and the TCP channel.
use std::{
    io,
    net::{Shutdown, TcpStream},
};

/// A duplex byte-stream the driver talks through.
///
/// Both transfers may move fewer bytes than requested; callers loop. All
/// calls block until the transport completes or errors. A channel is not
/// retried by the driver: any error is surfaced and the connection should be
/// discarded.
pub trait Channel {
    /// Send bytes, returning how many were accepted.
    fn send(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Receive at most `buf.len()` bytes, returning how many arrived.
    /// Returns `Ok(0)` once the peer has closed.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Half-close the sending side. Idempotent.
    fn close(&mut self) -> io::Result<()>;
}

impl<C> Channel for &mut C
where
    C: Channel,
{
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        C::send(self, buf)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        C::recv(self, buf)
    }

    fn close(&mut self) -> io::Result<()> {
        C::close(self)
    }
}

/// Send the whole buffer, looping over short writes.
pub(crate) fn send_all<C: Channel>(channel: &mut C, mut buf: &[u8]) -> io::Result<()> {
    while !buf.is_empty() {
        let sent = channel.send(buf)?;
        if sent == 0 {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "channel stopped accepting bytes",
            ));
        }
        buf = &buf[sent..];
    }
    Ok(())
}

/// Fill the whole buffer, looping over short reads.
pub(crate) fn recv_exact<C: Channel>(channel: &mut C, mut buf: &mut [u8]) -> io::Result<()> {
    while !buf.is_empty() {
        let received = channel.recv(buf)?;
        if received == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "channel closed mid-message",
            ));
        }
        buf = &mut buf[received..];
    }
    Ok(())
}

/// A [`Channel`] over a TCP stream.
pub struct TcpChannel {
    stream: TcpStream,
}

impl TcpChannel {
    pub fn connect(host: &str, port: u16) -> io::Result<TcpChannel> {
        let stream = TcpStream::connect((host, port))?;
        stream.set_nodelay(true)?;
        Ok(TcpChannel { stream })
    }
}

impl Channel for TcpChannel {
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut self.stream, buf)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut self.stream, buf)
    }

    fn close(&mut self) -> io::Result<()> {
        match self.stream.shutdown(Shutdown::Write) {
            // already closed
            Err(err) if err.kind() == io::ErrorKind::NotConnected => Ok(()),
            res => res,
        }
    }
}

impl std::fmt::Debug for TcpChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.stream, f)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{collections::VecDeque, io};

    use super::Channel;

    /// In-memory channel double: serves scripted server bytes and records
    /// everything the driver sends.
    #[derive(Debug)]
    pub(crate) struct ScriptedChannel {
        incoming: VecDeque<u8>,
        pub(crate) sent: Vec<u8>,
        /// Upper bound per `recv` call, to exercise short reads.
        pub(crate) recv_limit: usize,
        pub(crate) closed: bool,
    }

    impl ScriptedChannel {
        pub(crate) fn new() -> Self {
            Self {
                incoming: VecDeque::new(),
                sent: Vec::new(),
                recv_limit: usize::MAX,
                closed: false,
            }
        }

        pub(crate) fn serve(&mut self, bytes: &[u8]) {
            self.incoming.extend(bytes);
        }
    }

    impl Channel for ScriptedChannel {
        fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.sent.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(self.recv_limit).min(self.incoming.len());
            for slot in &mut buf[..len] {
                *slot = self.incoming.pop_front().unwrap();
            }
            Ok(len)
        }

        fn close(&mut self) -> io::Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    #[test]
    fn recv_exact_loops_over_short_reads() {
        let mut channel = ScriptedChannel::new();
        channel.serve(b"abcdef");
        channel.recv_limit = 2;

        let mut buf = [0u8; 6];
        super::recv_exact(&mut channel, &mut buf).unwrap();
        assert_eq!(&buf, b"abcdef");
    }

    #[test]
    fn recv_exact_reports_eof_mid_read() {
        let mut channel = ScriptedChannel::new();
        channel.serve(b"ab");

        let mut buf = [0u8; 4];
        let err = super::recv_exact(&mut channel, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
