//! Blocking byte transport under the frame reader and writer.
//!
//! A stream is split into an owned read half (driven by the connection's
//! reader thread) and an owned write half (guarded by the connection's
//! write lock), plus a control handle both sides share for timeouts and
//! teardown. `TcpStream` splits by cloning the socket handle; a TLS
//! stream cannot be cloned, so its halves share the session behind a
//! mutex.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tracing::trace;
use warren_types::constants::{FRAME_OVERHEAD, PROTOCOL_HEADER};
use warren_types::properties::BasicProperties;
use warren_types::{Frame, Method};

use crate::Error;

#[cfg(feature = "native-tls")]
mod tls;

/// The read half of a split stream.
pub trait ReadHalf: Read + Send + 'static {}
impl<T: Read + Send + 'static> ReadHalf for T {}

/// The write half of a split stream.
pub trait WriteHalf: Write + Send + 'static {}
impl<T: Write + Send + 'static> WriteHalf for T {}

/// Timeout control and teardown for a stream whose halves are owned by
/// different threads.
pub trait StreamControl: Send + Sync + 'static {
    /// Set the read timeout observed by the read half.
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Set the write timeout observed by the write half.
    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Tear the stream down. Idempotent; blocked reads and writes fail
    /// afterwards.
    fn shutdown(&self) -> io::Result<()>;
}

/// A byte stream a connection can run over.
///
/// Implemented for [`TcpStream`] and, with the `native-tls` feature, for
/// `native_tls::TlsStream<TcpStream>`. Test harnesses implement it for
/// in-memory pipes.
pub trait IoStream: Send + 'static {
    /// Split into independently owned halves plus a shared control
    /// handle.
    fn split(
        self,
    ) -> io::Result<(Box<dyn ReadHalf>, Box<dyn WriteHalf>, Arc<dyn StreamControl>)>;
}

struct TcpControl(TcpStream);

impl StreamControl for TcpControl {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.0.set_read_timeout(timeout)
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.0.set_write_timeout(timeout)
    }

    fn shutdown(&self) -> io::Result<()> {
        match self.0.shutdown(Shutdown::Both) {
            Err(err) if err.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

impl IoStream for TcpStream {
    fn split(
        self,
    ) -> io::Result<(Box<dyn ReadHalf>, Box<dyn WriteHalf>, Arc<dyn StreamControl>)> {
        self.set_nodelay(true)?;
        let reader = self.try_clone()?;
        let control = self.try_clone()?;
        Ok((
            Box::new(reader),
            Box::new(self),
            Arc::new(TcpControl(control)),
        ))
    }
}

/// Reads frames off the transport, buffering partial input.
///
/// A read timeout on the underlying stream surfaces as `Ok(None)`; the
/// partially read frame stays in the buffer, so framing integrity is
/// never lost to a timeout.
pub(crate) struct FrameReader {
    io: Box<dyn ReadHalf>,
    buf: BytesMut,
    frame_max: u32,
}

const READ_CHUNK: usize = 8 * 1024;

impl FrameReader {
    pub(crate) fn new(io: Box<dyn ReadHalf>) -> Self {
        Self {
            io,
            buf: BytesMut::with_capacity(READ_CHUNK),
            frame_max: 0,
        }
    }

    /// Enforce the negotiated frame-max on inbound frames; 0 means
    /// unlimited.
    pub(crate) fn set_frame_max(&mut self, frame_max: u32) {
        self.frame_max = frame_max;
    }

    /// Read one frame, blocking up to the stream's read timeout.
    ///
    /// Returns `Ok(None)` when the timeout elapses without a complete
    /// frame.
    pub(crate) fn read_frame(&mut self) -> Result<Option<Frame>, Error> {
        loop {
            if let Some(frame) = Frame::decode(&mut self.buf, self.frame_max)? {
                trace!(
                    kind = ?frame.kind,
                    channel = frame.channel,
                    len = frame.payload.len(),
                    "frame received"
                );
                return Ok(Some(frame));
            }
            let mut chunk = [0u8; READ_CHUNK];
            match self.io.read(&mut chunk) {
                Ok(0) => {
                    return Err(Error::Io(Arc::new(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "server closed the connection",
                    ))))
                }
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(err)
                    if err.kind() == io::ErrorKind::WouldBlock
                        || err.kind() == io::ErrorKind::TimedOut =>
                {
                    return Ok(None)
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Read one frame, treating a timeout as an error. Used during the
    /// handshake, where silence past the deadline is fatal.
    pub(crate) fn expect_frame(&mut self) -> Result<Frame, Error> {
        self.read_frame()?.ok_or(Error::Timeout)
    }
}

/// Writes frames to the transport.
///
/// The owner wraps this in the connection's write lock; `send_content`
/// emits a whole publish (method, header, body chunks) in one call so a
/// single lock acquisition keeps the frames contiguous on the wire.
pub(crate) struct FrameWriter {
    io: Box<dyn WriteHalf>,
    buf: BytesMut,
}

impl FrameWriter {
    pub(crate) fn new(io: Box<dyn WriteHalf>) -> Self {
        Self {
            io,
            buf: BytesMut::with_capacity(READ_CHUNK),
        }
    }

    /// Write the 8-byte protocol header that opens the conversation.
    pub(crate) fn send_protocol_header(&mut self) -> Result<(), Error> {
        self.io.write_all(&PROTOCOL_HEADER)?;
        self.io.flush()?;
        Ok(())
    }

    /// Write one frame.
    pub(crate) fn send_frame(&mut self, frame: &Frame) -> Result<(), Error> {
        self.buf.clear();
        frame.encode(&mut self.buf);
        trace!(
            kind = ?frame.kind,
            channel = frame.channel,
            len = frame.payload.len(),
            "frame sent"
        );
        self.io.write_all(&self.buf)?;
        self.io.flush()?;
        Ok(())
    }

    /// Write a method frame.
    pub(crate) fn send_method(&mut self, channel: u16, method: &Method) -> Result<(), Error> {
        self.send_frame(&Frame::method(channel, method.to_payload()?))
    }

    /// Write a content-bearing method: METHOD, HEADER, then BODY frames
    /// chunked to `frame_max - 8` payload bytes each (unlimited when
    /// `frame_max` is 0), all in one write.
    pub(crate) fn send_content(
        &mut self,
        channel: u16,
        method: &Method,
        properties: &BasicProperties,
        body: &Bytes,
        frame_max: u32,
    ) -> Result<(), Error> {
        self.buf.clear();
        Frame::method(channel, method.to_payload()?).encode(&mut self.buf);

        let mut header = BytesMut::new();
        header.extend_from_slice(&method.class_id().to_be_bytes());
        header.extend_from_slice(&0u16.to_be_bytes());
        header.extend_from_slice(&(body.len() as u64).to_be_bytes());
        properties.encode(&mut header)?;
        Frame::header(channel, header.freeze()).encode(&mut self.buf);

        let chunk = if frame_max == 0 {
            body.len()
        } else {
            frame_max as usize - FRAME_OVERHEAD
        };
        let mut offset = 0;
        while offset < body.len() {
            let end = usize::min(offset + chunk, body.len());
            Frame::body(channel, body.slice(offset..end)).encode(&mut self.buf);
            offset = end;
        }

        trace!(channel, body_len = body.len(), "content sent");
        self.io.write_all(&self.buf)?;
        self.io.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Buf;
    use warren_types::methods::basic;
    use warren_types::FrameType;

    use super::*;

    /// Write half that appends to a shared byte vector.
    #[derive(Clone)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn drain_frames(wire: &[u8]) -> Vec<Frame> {
        let mut buf = BytesMut::from(wire);
        let mut frames = Vec::new();
        while let Some(frame) = Frame::decode(&mut buf, 0).unwrap() {
            frames.push(frame);
        }
        assert!(buf.is_empty());
        frames
    }

    #[test]
    fn content_is_chunked_to_frame_max_minus_overhead() {
        let wire = Arc::new(Mutex::new(Vec::new()));
        let mut writer = FrameWriter::new(Box::new(Sink(wire.clone())));
        let method = Method::BasicPublish(basic::Publish {
            reserved_1: 0,
            exchange: "t.e".into(),
            routing_key: "t.q".into(),
            mandatory: false,
            immediate: false,
        });
        let body = Bytes::from(vec![0x42u8; 10_000]);
        writer
            .send_content(7, &method, &BasicProperties::default(), &body, 4096)
            .unwrap();

        let frames = drain_frames(&wire.lock().unwrap());
        assert_eq!(frames.len(), 5);
        assert!(frames.iter().all(|f| f.channel == 7));
        assert_eq!(frames[0].kind, FrameType::Method);
        assert_eq!(frames[1].kind, FrameType::Header);
        let mut header = frames[1].payload.clone();
        assert_eq!(header.get_u16(), 60);
        assert_eq!(header.get_u16(), 0);
        assert_eq!(header.get_u64(), 10_000);
        let body_sizes: Vec<_> = frames[2..]
            .iter()
            .map(|f| {
                assert_eq!(f.kind, FrameType::Body);
                f.payload.len()
            })
            .collect();
        assert_eq!(body_sizes, [4088, 4088, 1824]);
    }

    #[test]
    fn unlimited_frame_max_sends_one_body_frame() {
        let wire = Arc::new(Mutex::new(Vec::new()));
        let mut writer = FrameWriter::new(Box::new(Sink(wire.clone())));
        let method = Method::BasicPublish(basic::Publish {
            reserved_1: 0,
            exchange: String::new(),
            routing_key: "q".into(),
            mandatory: false,
            immediate: false,
        });
        let body = Bytes::from(vec![1u8; 300_000]);
        writer
            .send_content(1, &method, &BasicProperties::default(), &body, 0)
            .unwrap();
        let frames = drain_frames(&wire.lock().unwrap());
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].payload.len(), 300_000);
    }

    #[test]
    fn empty_body_sends_no_body_frames() {
        let wire = Arc::new(Mutex::new(Vec::new()));
        let mut writer = FrameWriter::new(Box::new(Sink(wire.clone())));
        let method = Method::BasicPublish(basic::Publish {
            reserved_1: 0,
            exchange: String::new(),
            routing_key: "q".into(),
            mandatory: false,
            immediate: false,
        });
        writer
            .send_content(1, &method, &BasicProperties::default(), &Bytes::new(), 4096)
            .unwrap();
        let frames = drain_frames(&wire.lock().unwrap());
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn reader_buffers_partial_frames_across_reads() {
        struct Script {
            chunks: Vec<Vec<u8>>,
        }
        impl Read for Script {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.chunks.is_empty() {
                    return Err(io::Error::new(io::ErrorKind::WouldBlock, "drained"));
                }
                let chunk = self.chunks.remove(0);
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
        }

        let mut wire = BytesMut::new();
        Frame::heartbeat().encode(&mut wire);
        let (first, second) = wire.split_at(3);
        let mut reader = FrameReader::new(Box::new(Script {
            chunks: vec![first.to_vec(), second.to_vec()],
        }));
        let frame = reader.read_frame().unwrap().unwrap();
        assert_eq!(frame.kind, FrameType::Heartbeat);
        assert_eq!(reader.read_frame().unwrap(), None);
    }
}
