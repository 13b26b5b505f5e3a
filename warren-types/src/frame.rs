//! AMQP 0.9.1 frame type and the corresponding encoder and decoder.
//!
//! On the wire a frame is `type(1) | channel(2) | size(4) | payload | 0xCE`.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::constants::{
    FRAME_BODY, FRAME_END, FRAME_HEADER, FRAME_HEARTBEAT, FRAME_METHOD, FRAME_OVERHEAD,
};
use crate::Error;

/// The frame type octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    /// A method frame (`class_id | method_id | arguments`).
    Method,
    /// A content header frame.
    Header,
    /// A content body frame.
    Body,
    /// An empty heartbeat frame.
    Heartbeat,
}

impl FrameType {
    /// Map a wire octet to a frame type.
    pub fn from_octet(octet: u8) -> Result<Self, Error> {
        match octet {
            FRAME_METHOD => Ok(FrameType::Method),
            FRAME_HEADER => Ok(FrameType::Header),
            FRAME_BODY => Ok(FrameType::Body),
            FRAME_HEARTBEAT => Ok(FrameType::Heartbeat),
            other => Err(Error::UnknownFrameType(other)),
        }
    }

    /// The wire octet for this frame type.
    pub fn to_octet(self) -> u8 {
        match self {
            FrameType::Method => FRAME_METHOD,
            FrameType::Header => FRAME_HEADER,
            FrameType::Body => FRAME_BODY,
            FrameType::Heartbeat => FRAME_HEARTBEAT,
        }
    }
}

/// A single protocol frame addressed to one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Frame type.
    pub kind: FrameType,
    /// Channel the frame belongs to; 0 is the connection itself.
    pub channel: u16,
    /// Frame payload, without the frame header or end marker.
    pub payload: Bytes,
}

impl Frame {
    /// Creates a method frame.
    pub fn method(channel: u16, payload: Bytes) -> Self {
        Self {
            kind: FrameType::Method,
            channel,
            payload,
        }
    }

    /// Creates a content header frame.
    pub fn header(channel: u16, payload: Bytes) -> Self {
        Self {
            kind: FrameType::Header,
            channel,
            payload,
        }
    }

    /// Creates a content body frame.
    pub fn body(channel: u16, payload: Bytes) -> Self {
        Self {
            kind: FrameType::Body,
            channel,
            payload,
        }
    }

    /// Creates the empty heartbeat frame. Heartbeats always travel on
    /// channel 0.
    pub fn heartbeat() -> Self {
        Self {
            kind: FrameType::Heartbeat,
            channel: 0,
            payload: Bytes::new(),
        }
    }

    /// Total size of the frame on the wire, including header and end
    /// marker.
    pub fn wire_size(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// Encode the frame into `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(self.wire_size());
        dst.put_u8(self.kind.to_octet());
        dst.put_u16(self.channel);
        dst.put_u32(self.payload.len() as u32);
        dst.put_slice(&self.payload);
        dst.put_u8(FRAME_END);
    }

    /// Incrementally decode one frame from `src`.
    ///
    /// Returns `Ok(None)` until a complete frame is buffered; decoded bytes
    /// are consumed from `src`, partial frames are left in place. A
    /// `frame_max` of 0 disables the size check.
    pub fn decode(src: &mut BytesMut, frame_max: u32) -> Result<Option<Frame>, Error> {
        if src.len() < 7 {
            return Ok(None);
        }
        let mut header = &src[..7];
        let kind = FrameType::from_octet(header.get_u8())?;
        let channel = header.get_u16();
        let size = header.get_u32();
        if frame_max != 0 && size > frame_max {
            return Err(Error::Oversized { size, frame_max });
        }
        let total = 7 + size as usize + 1;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }
        src.advance(7);
        let payload = src.split_to(size as usize).freeze();
        let end = src.get_u8();
        if end != FRAME_END {
            return Err(Error::BadFrameEnd { found: end });
        }
        Ok(Some(Frame {
            kind,
            channel,
            payload,
        }))
    }

    /// Decode a frame from a buffer known to hold it completely.
    pub fn parse(src: &mut BytesMut) -> Result<Frame, Error> {
        match Self::decode(src, 0)? {
            Some(frame) => Ok(frame),
            None => Err(Error::Truncated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_frame_bytes() {
        let mut buf = BytesMut::new();
        Frame::heartbeat().encode(&mut buf);
        assert_eq!(&buf[..], &[8, 0, 0, 0, 0, 0, 0, 0xCE]);
    }

    #[test]
    fn heartbeat_on_channel_one_decodes() {
        let mut src = BytesMut::from(&[8, 0, 1, 0, 0, 0, 0, 0xCE][..]);
        let frame = Frame::decode(&mut src, 0).unwrap().unwrap();
        assert_eq!(frame.kind, FrameType::Heartbeat);
        assert_eq!(frame.channel, 1);
        assert!(frame.payload.is_empty());
        assert!(src.is_empty());
    }

    #[test]
    fn round_trip_preserves_bytes() {
        let frame = Frame::body(42, Bytes::from_static(b"hello"));
        let mut buf = BytesMut::new();
        frame.encode(&mut buf);
        let wire = buf.clone();
        let decoded = Frame::decode(&mut buf, 0).unwrap().unwrap();
        assert_eq!(decoded, frame);
        let mut again = BytesMut::new();
        decoded.encode(&mut again);
        assert_eq!(again, wire);
    }

    #[test]
    fn partial_input_yields_none() {
        let frame = Frame::method(1, Bytes::from_static(b"\x00\x0a\x00\x29"));
        let mut buf = BytesMut::new();
        frame.encode(&mut buf);
        for cut in 0..buf.len() {
            let mut partial = BytesMut::from(&buf[..cut]);
            assert_eq!(Frame::decode(&mut partial, 0).unwrap(), None);
            assert_eq!(partial.len(), cut);
        }
    }

    #[test]
    fn bad_end_marker_is_rejected() {
        let mut src = BytesMut::from(&[3, 0, 1, 0, 0, 0, 1, b'x', 0xCD][..]);
        assert_eq!(
            Frame::decode(&mut src, 0),
            Err(Error::BadFrameEnd { found: 0xCD })
        );
    }

    #[test]
    fn unknown_frame_type_is_rejected() {
        let mut src = BytesMut::from(&[9, 0, 0, 0, 0, 0, 0, 0xCE][..]);
        assert_eq!(Frame::decode(&mut src, 0), Err(Error::UnknownFrameType(9)));
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let mut src = BytesMut::from(&[3, 0, 1, 0, 0, 0x20, 0][..]);
        assert_eq!(
            Frame::decode(&mut src, 4096),
            Err(Error::Oversized {
                size: 0x2000,
                frame_max: 4096
            })
        );
    }
}
